//! Stream endpoint
//!
//! One per buffer-producing element. The delivery queue is created lazily on
//! the first consumption request; the stop flag and the queue share one lock
//! so a delivery can never observe a half-stopped endpoint.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bytes::Bytes;

use crate::registry::EndpointId;
use crate::stats::{DeliveryCounters, DeliveryStats};

use super::queue::{DeliveryQueue, QueueReceiver, SendOutcome};

/// Lifecycle phase of a stream endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamPhase {
    /// Registered, nobody has asked for buffers yet
    Created,
    /// Queue exists and the engine is producing into it
    Consuming,
    /// Terminal: end-of-stream or stopped by the consumer
    Stopped,
}

struct StreamSlot {
    phase: StreamPhase,
    queue: Option<Arc<DeliveryQueue<Bytes>>>,
}

/// Endpoint receiving raw buffers from one engine element
pub struct StreamEndpoint {
    id: EndpointId,
    capacity: usize,
    slot: Mutex<StreamSlot>,
    counters: DeliveryCounters,
}

impl StreamEndpoint {
    pub(crate) fn new(id: EndpointId, capacity: usize) -> Self {
        Self {
            id,
            capacity: capacity.max(1),
            slot: Mutex::new(StreamSlot {
                phase: StreamPhase::Created,
                queue: None,
            }),
            counters: DeliveryCounters::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, StreamSlot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registry identifier of this endpoint
    pub fn id(&self) -> EndpointId {
        self.id
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> StreamPhase {
        self.lock().phase
    }

    /// Check if the endpoint has been stopped or reached end-of-stream
    pub fn is_stopped(&self) -> bool {
        self.phase() == StreamPhase::Stopped
    }

    /// Get delivery counters for this endpoint
    pub fn stats(&self) -> DeliveryStats {
        self.counters.snapshot()
    }

    /// Get the consumer queue, creating it on first use
    ///
    /// The flag is `true` only for the call that created the queue; the
    /// caller must then ask the engine to start producing. An endpoint that
    /// was stopped before anyone consumed it hands out a closed queue and
    /// reports `false`.
    pub fn start_consuming(&self) -> (QueueReceiver<Bytes>, bool) {
        let mut slot = self.lock();

        if let Some(ref queue) = slot.queue {
            return (queue.receiver(), false);
        }

        if slot.phase == StreamPhase::Stopped {
            let queue = Arc::new(DeliveryQueue::closed());
            let rx = queue.receiver();
            slot.queue = Some(queue);
            return (rx, false);
        }

        let queue = Arc::new(DeliveryQueue::bounded(self.capacity));
        let rx = queue.receiver();
        slot.queue = Some(queue);
        slot.phase = StreamPhase::Consuming;

        tracing::debug!(endpoint = %self.id, capacity = self.capacity, "Stream consumption started");

        (rx, true)
    }

    /// Hand a buffer to the consumer
    ///
    /// Called only by the dispatcher. Buffers arriving after stop, or before
    /// consumption started, are dropped. When the queue is full this blocks
    /// the calling engine thread until the consumer catches up or the
    /// endpoint is stopped; that stall is the price of bounded memory.
    pub fn deliver(&self, data: Bytes) -> bool {
        let (phase, queue) = {
            let slot = self.lock();
            (slot.phase, slot.queue.clone())
        };

        let queue = match (phase, queue) {
            (StreamPhase::Stopped, _) => {
                self.counters.record_dropped();
                tracing::debug!(
                    endpoint = %self.id,
                    len = data.len(),
                    "Dropping buffer, stream stopped"
                );
                return false;
            }
            (_, None) => {
                self.counters.record_dropped();
                tracing::warn!(
                    endpoint = %self.id,
                    len = data.len(),
                    "Dropping buffer, stream is not being consumed"
                );
                return false;
            }
            (_, Some(queue)) => queue,
        };

        let len = data.len();
        match queue.send(data) {
            SendOutcome::Queued => {
                self.counters.record_delivered(len);
                true
            }
            outcome => {
                self.counters.record_dropped();
                tracing::debug!(
                    endpoint = %self.id,
                    len = len,
                    outcome = ?outcome,
                    "Dropping buffer, queue closed during delivery"
                );
                false
            }
        }
    }

    /// Mark end-of-stream
    ///
    /// Sets the stop flag and closes the queue if one exists. Returns `false`
    /// if the endpoint was already stopped.
    pub fn signal_end_of_stream(&self) -> bool {
        let stopped = self.terminate();
        if stopped {
            tracing::debug!(endpoint = %self.id, "Stream reached end-of-stream");
        }
        stopped
    }

    /// Stop the endpoint from the consumer side
    ///
    /// The controller must deregister the endpoint before calling this.
    /// Idempotent; safe whether or not consumption ever started.
    pub fn stop(&self) -> bool {
        let stopped = self.terminate();
        if stopped {
            tracing::debug!(endpoint = %self.id, "Stream stopped");
        }
        stopped
    }

    fn terminate(&self) -> bool {
        let mut slot = self.lock();
        if slot.phase == StreamPhase::Stopped {
            return false;
        }
        slot.phase = StreamPhase::Stopped;
        if let Some(ref queue) = slot.queue {
            queue.close();
        }
        true
    }
}

impl std::fmt::Debug for StreamEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamEndpoint")
            .field("id", &self.id)
            .field("phase", &self.phase())
            .field("capacity", &self.capacity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Duration;

    use super::*;

    fn endpoint(capacity: usize) -> StreamEndpoint {
        StreamEndpoint::new(EndpointId::new(10_001), capacity)
    }

    #[test]
    fn test_start_consuming_once() {
        let stream = endpoint(4);
        assert_eq!(stream.phase(), StreamPhase::Created);

        let (rx1, first) = stream.start_consuming();
        assert!(first);
        assert_eq!(stream.phase(), StreamPhase::Consuming);

        let (rx2, again) = stream.start_consuming();
        assert!(!again);

        // Both receivers drain the same queue
        assert!(stream.deliver(Bytes::from_static(b"a")));
        assert_eq!(rx2.recv(), Some(Bytes::from_static(b"a")));
        assert!(rx1.is_empty());
    }

    #[test]
    fn test_deliver_preserves_order_and_content() {
        let stream = endpoint(8);
        let (rx, _) = stream.start_consuming();

        let payloads: Vec<Bytes> = (0u8..8).map(|i| Bytes::from(vec![i; i as usize + 1])).collect();
        for payload in &payloads {
            assert!(stream.deliver(payload.clone()));
        }
        stream.signal_end_of_stream();

        assert_eq!(rx.into_iter().collect::<Vec<_>>(), payloads);
    }

    #[test]
    fn test_deliver_before_consuming_is_dropped() {
        let stream = endpoint(4);

        assert!(!stream.deliver(Bytes::from_static(&[1, 2, 3])));
        assert_eq!(stream.stats().dropped, 1);

        // Nothing leaks into a queue created later
        let (rx, _) = stream.start_consuming();
        assert!(rx.is_empty());
    }

    #[test]
    fn test_no_delivery_after_end_of_stream() {
        let stream = endpoint(4);
        let (rx, _) = stream.start_consuming();

        assert!(stream.deliver(Bytes::from_static(&[1])));
        assert!(stream.signal_end_of_stream());
        assert!(!stream.deliver(Bytes::from_static(&[2])));
        assert!(!stream.signal_end_of_stream());

        assert_eq!(rx.recv(), Some(Bytes::from_static(&[1])));
        assert_eq!(rx.recv(), None);

        let stats = stream.stats();
        assert_eq!(stats.delivered, 1);
        assert_eq!(stats.dropped, 1);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let stream = endpoint(4);
        let (rx, _) = stream.start_consuming();

        assert!(stream.stop());
        assert!(!stream.stop());
        assert!(!stream.signal_end_of_stream());
        assert_eq!(rx.recv(), None);
    }

    #[test]
    fn test_stop_without_consuming() {
        let stream = endpoint(4);

        assert!(stream.stop());
        assert_eq!(stream.phase(), StreamPhase::Stopped);

        // Late consumers see end-of-stream and production is not requested
        let (rx, first) = stream.start_consuming();
        assert!(!first);
        assert_eq!(rx.recv(), None);
    }

    #[test]
    fn test_stop_releases_blocked_delivery() {
        let stream = Arc::new(endpoint(1));
        let (rx, _) = stream.start_consuming();
        assert!(stream.deliver(Bytes::from_static(b"fill")));

        let producer = {
            let stream = Arc::clone(&stream);
            thread::spawn(move || stream.deliver(Bytes::from_static(b"blocked")))
        };

        thread::sleep(Duration::from_millis(50));
        assert!(stream.stop());

        assert!(!producer.join().unwrap());
        assert_eq!(rx.recv(), Some(Bytes::from_static(b"fill")));
        assert_eq!(rx.recv(), None);
    }
}
