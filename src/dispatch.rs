//! Callback dispatcher
//!
//! The three entry points the engine calls from its own worker threads. Each
//! one looks the identifier up in the registry, releases the registry lock,
//! and only then touches the endpoint's queue, so a consumer that is slow on
//! one endpoint never stalls dispatch to another.
//!
//! Callbacks for identifiers that are no longer registered are the expected
//! outcome of a teardown race: they are logged and counted, never returned.

use std::sync::Arc;

use bytes::Bytes;

use crate::message::{NativeMessage, StatusMessage};
use crate::registry::{EndpointId, EndpointRegistry};
use crate::stats::{DispatchCounters, DispatchStats};

/// Handle the engine uses to deliver callbacks
///
/// Cheap to clone; every clone routes through the same registry.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<EndpointRegistry>,
    counters: Arc<DispatchCounters>,
}

impl Dispatcher {
    /// Create a dispatcher routing through `registry`
    pub fn new(registry: Arc<EndpointRegistry>) -> Self {
        Self {
            registry,
            counters: Arc::new(DispatchCounters::new()),
        }
    }

    /// The registry callbacks are routed through
    pub fn registry(&self) -> &Arc<EndpointRegistry> {
        &self.registry
    }

    /// Snapshot of dispatch counters
    pub fn stats(&self) -> DispatchStats {
        self.counters.snapshot()
    }

    /// A buffer produced by the element registered under `id`
    ///
    /// Ownership of `payload` passes to the dispatcher. It is copied into an
    /// owned buffer when a matching endpoint exists and is released before
    /// this call returns either way. May block while the endpoint's queue is
    /// full.
    pub fn on_buffer<P: AsRef<[u8]>>(&self, payload: P, id: EndpointId) {
        let Some(stream) = self.registry.lookup_stream(id) else {
            DispatchCounters::bump(&self.counters.buffers_discarded);
            tracing::debug!(
                endpoint = %id,
                len = payload.as_ref().len(),
                "Discarding buffer, no element registered"
            );
            drop(payload);
            return;
        };

        let data = Bytes::copy_from_slice(payload.as_ref());
        drop(payload);

        DispatchCounters::bump(&self.counters.buffers_dispatched);
        tracing::trace!(endpoint = %id, len = data.len(), "Dispatching buffer");
        stream.deliver(data);
    }

    /// The element registered under `id` reached end-of-stream
    pub fn on_end_of_stream(&self, id: EndpointId) {
        match self.registry.lookup_stream(id) {
            Some(stream) => {
                DispatchCounters::bump(&self.counters.eos_dispatched);
                stream.signal_end_of_stream();
            }
            None => {
                DispatchCounters::bump(&self.counters.eos_discarded);
                tracing::trace!(endpoint = %id, "Ignoring end-of-stream, no element registered");
            }
        }
    }

    /// A bus message from the pipeline registered under `id`
    ///
    /// `message` is only borrowed for this call; everything the consumer
    /// needs is copied out before any queue operation.
    pub fn on_bus_message<M: NativeMessage + ?Sized>(&self, message: &M, id: EndpointId) {
        let Some(bus) = self.registry.lookup_bus(id) else {
            DispatchCounters::bump(&self.counters.messages_discarded);
            tracing::debug!(
                pipeline = %id,
                kind = %message.kind(),
                "Discarding message, no pipeline registered"
            );
            return;
        };

        let message = StatusMessage::from_native(message);
        DispatchCounters::bump(&self.counters.messages_dispatched);
        tracing::trace!(pipeline = %id, kind = %message.kind(), "Dispatching bus message");
        bus.deliver(message);
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("endpoints", &self.registry.len())
            .finish()
    }
}
