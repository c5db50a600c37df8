//! Bus endpoint
//!
//! One per pipeline. Carries status messages from the engine's bus watch to
//! a single consumer queue.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::message::StatusMessage;
use crate::registry::EndpointId;
use crate::stats::{DeliveryCounters, DeliveryStats};

use super::queue::{DeliveryQueue, QueueReceiver, SendOutcome};

struct BusSlot {
    closed: bool,
    queue: Option<Arc<DeliveryQueue<StatusMessage>>>,
}

/// Endpoint receiving status messages from one pipeline's bus
pub struct BusEndpoint {
    id: EndpointId,
    capacity: usize,
    slot: Mutex<BusSlot>,
    counters: DeliveryCounters,
}

impl BusEndpoint {
    pub(crate) fn new(id: EndpointId, capacity: usize) -> Self {
        Self {
            id,
            capacity: capacity.max(1),
            slot: Mutex::new(BusSlot {
                closed: false,
                queue: None,
            }),
            counters: DeliveryCounters::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BusSlot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registry identifier of the owning pipeline
    pub fn id(&self) -> EndpointId {
        self.id
    }

    /// Check if the bus has been closed
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Check if a consumer queue exists and is still open
    pub fn is_watching(&self) -> bool {
        let slot = self.lock();
        !slot.closed && slot.queue.is_some()
    }

    /// Get delivery counters for this bus
    pub fn stats(&self) -> DeliveryStats {
        self.counters.snapshot()
    }

    /// Get the message queue, creating it on first use
    ///
    /// The flag is `true` only for the call that created the queue, which is
    /// when the caller registers the bus watch with the engine. After
    /// [`close`](Self::close) a closed queue is returned.
    pub fn start_watching(&self) -> (QueueReceiver<StatusMessage>, bool) {
        let mut slot = self.lock();

        if let Some(ref queue) = slot.queue {
            return (queue.receiver(), false);
        }

        if slot.closed {
            let queue = Arc::new(DeliveryQueue::closed());
            let rx = queue.receiver();
            slot.queue = Some(queue);
            return (rx, false);
        }

        let queue = Arc::new(DeliveryQueue::bounded(self.capacity));
        let rx = queue.receiver();
        slot.queue = Some(queue);

        tracing::debug!(endpoint = %self.id, capacity = self.capacity, "Bus watch started");

        (rx, true)
    }

    /// Hand a message to the consumer
    ///
    /// Called only by the dispatcher. Blocks while the queue is full; a
    /// concurrent close releases the call and discards the message.
    pub fn deliver(&self, message: StatusMessage) -> bool {
        let (closed, queue) = {
            let slot = self.lock();
            (slot.closed, slot.queue.clone())
        };

        let queue = match queue {
            Some(queue) if !closed => queue,
            _ => {
                self.counters.record_dropped();
                tracing::debug!(
                    endpoint = %self.id,
                    kind = %message.kind(),
                    closed = closed,
                    "Dropping bus message, nobody is watching"
                );
                return false;
            }
        };

        let kind = message.kind();
        match queue.send(message) {
            SendOutcome::Queued => {
                self.counters.record_delivered_item();
                true
            }
            outcome => {
                self.counters.record_dropped();
                tracing::debug!(
                    endpoint = %self.id,
                    kind = %kind,
                    outcome = ?outcome,
                    "Dropping bus message, queue closed during delivery"
                );
                false
            }
        }
    }

    /// Close the bus queue
    ///
    /// The controller must deregister the endpoint before calling this.
    /// Returns `false` if already closed.
    pub fn close(&self) -> bool {
        let mut slot = self.lock();
        if slot.closed {
            return false;
        }
        slot.closed = true;
        if let Some(ref queue) = slot.queue {
            queue.close();
        }
        tracing::debug!(endpoint = %self.id, "Bus closed");
        true
    }
}

impl std::fmt::Debug for BusEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BusEndpoint")
            .field("id", &self.id)
            .field("closed", &self.is_closed())
            .field("capacity", &self.capacity)
            .finish()
    }
}
