//! Bounded close-once delivery queue
//!
//! Carries items from engine threads to consumer threads. The producer half
//! lives inside an endpoint; consumers hold cloneable [`QueueReceiver`]s.
//!
//! Closing is a state-checked operation: the sender is taken out of an
//! `Option` under the queue lock, so a second close finds nothing to close.
//! Closing also drops the shutdown sender, which wakes any producer parked on
//! a full queue.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TryRecvError, TrySendError};

/// Result of handing an item to a delivery queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Item is in the queue
    Queued,
    /// Queue was closed before or while sending; item discarded
    Closed,
    /// Every receiver is gone; item discarded
    Disconnected,
}

struct Senders<T> {
    data: Sender<T>,
    // Never sent on; dropping it disconnects `shutdown_rx`
    _shutdown: Sender<()>,
}

/// Producer half of a delivery queue
pub struct DeliveryQueue<T> {
    senders: Mutex<Option<Senders<T>>>,
    shutdown_rx: Receiver<()>,
    receiver: Receiver<T>,
    capacity: usize,
}

impl<T> DeliveryQueue<T> {
    /// Create an open queue with room for `capacity` items (at least 1)
    pub fn bounded(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (data, receiver) = bounded(capacity);
        let (shutdown, shutdown_rx) = bounded(0);

        Self {
            senders: Mutex::new(Some(Senders {
                data,
                _shutdown: shutdown,
            })),
            shutdown_rx,
            receiver,
            capacity,
        }
    }

    /// Create a queue that is already closed
    pub fn closed() -> Self {
        let queue = Self::bounded(1);
        queue.close();
        queue
    }

    fn lock(&self) -> MutexGuard<'_, Option<Senders<T>>> {
        self.senders.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A receiver for this queue
    ///
    /// All receivers share one stream of items; each item is observed by
    /// exactly one of them.
    pub fn receiver(&self) -> QueueReceiver<T> {
        QueueReceiver {
            inner: self.receiver.clone(),
            capacity: self.capacity,
        }
    }

    /// Hand an item to the queue
    ///
    /// Tries a non-blocking send first. If the queue is full the calling
    /// thread blocks until a consumer frees a slot, which is how a slow
    /// consumer pushes back on the producing engine thread. A concurrent
    /// [`close`](Self::close) releases the blocked call and the item is
    /// discarded.
    pub fn send(&self, item: T) -> SendOutcome {
        let (data, item) = {
            let guard = self.lock();
            let Some(senders) = guard.as_ref() else {
                return SendOutcome::Closed;
            };
            match senders.data.try_send(item) {
                Ok(()) => return SendOutcome::Queued,
                Err(TrySendError::Disconnected(_)) => return SendOutcome::Disconnected,
                Err(TrySendError::Full(item)) => (senders.data.clone(), item),
            }
        };

        // Shutdown is checked first so a close that is already visible wins
        crossbeam_channel::select_biased! {
            recv(self.shutdown_rx) -> _ => SendOutcome::Closed,
            send(data, item) -> res => match res {
                Ok(()) => SendOutcome::Queued,
                Err(_) => SendOutcome::Disconnected,
            },
        }
    }

    /// Close the queue
    ///
    /// Returns `true` if this call closed it, `false` if it was already
    /// closed. Items already queued stay available to receivers, which see
    /// end-of-stream once they are drained.
    pub fn close(&self) -> bool {
        self.lock().take().is_some()
    }

    /// Check whether the queue has been closed
    pub fn is_closed(&self) -> bool {
        self.lock().is_none()
    }

    /// Number of queued items
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    /// Check whether the queue holds no items
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    /// Queue capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Consumer half of a delivery queue
pub struct QueueReceiver<T> {
    inner: Receiver<T>,
    capacity: usize,
}

impl<T> Clone for QueueReceiver<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            capacity: self.capacity,
        }
    }
}

impl<T> QueueReceiver<T> {
    /// Block until an item arrives
    ///
    /// Returns `None` once the queue is closed and drained.
    pub fn recv(&self) -> Option<T> {
        self.inner.recv().ok()
    }

    /// Take an item if one is ready
    pub fn try_recv(&self) -> Result<T, TryRecvError> {
        self.inner.try_recv()
    }

    /// Block for at most `timeout`
    pub fn recv_timeout(&self, timeout: Duration) -> Result<T, RecvTimeoutError> {
        self.inner.recv_timeout(timeout)
    }

    /// Blocking iterator that ends at end-of-stream
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        self.inner.iter()
    }

    /// Number of queued items
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Check whether no item is queued
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Queue capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn into_inner(self) -> Receiver<T> {
        self.inner
    }
}

impl<T> IntoIterator for QueueReceiver<T> {
    type Item = T;
    type IntoIter = crossbeam_channel::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.into_iter()
    }
}

impl<T> std::fmt::Debug for QueueReceiver<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueReceiver")
            .field("len", &self.inner.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}
