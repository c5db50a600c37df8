//! Async adapter for delivery queues
//!
//! Delivery queues are blocking by nature because engine threads are not
//! async. Async consumers get a tokio channel fed by a forwarding thread.

use std::thread;

use tokio::sync::mpsc;

use super::queue::QueueReceiver;

impl<T: Send + 'static> QueueReceiver<T> {
    /// Forward this queue into a tokio channel
    ///
    /// The returned receiver yields every item in order and then `None` once
    /// the delivery queue ends. Dropping it stops the forwarder after at most
    /// one more item; items it has not yet taken stay in the delivery queue.
    pub fn into_async(self, capacity: usize) -> mpsc::Receiver<T> {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let source = self.into_inner();

        let spawned = thread::Builder::new()
            .name("delivery-forward".into())
            .spawn(move || {
                for item in source.iter() {
                    if tx.blocking_send(item).is_err() {
                        tracing::debug!("Async receiver dropped, stopping forwarder");
                        break;
                    }
                }
            });

        if let Err(e) = spawned {
            // The sender was moved into the failed closure and dropped, so the
            // async side simply sees end-of-stream
            tracing::error!(error = %e, "Failed to spawn delivery forwarder");
        }

        rx
    }
}
