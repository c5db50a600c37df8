//! Element facade
//!
//! Wraps one engine element together with the stream endpoint registered
//! for it.

use std::sync::Arc;

use crate::bridge::Bridge;
use crate::endpoint::{BufferReceiver, StreamEndpoint, StreamPhase};
use crate::engine::Engine;
use crate::registry::EndpointId;
use crate::stats::DeliveryStats;

/// A media element whose output can be pulled as raw buffers
///
/// Dropping an element stops it.
pub struct Element<E: Engine> {
    bridge: Bridge<E>,
    handle: E::Element,
    endpoint: Arc<StreamEndpoint>,
}

impl<E: Engine> Element<E> {
    /// Register `handle` as a new stream endpoint
    pub(crate) fn attach(bridge: Bridge<E>, handle: E::Element) -> Self {
        let endpoint = bridge
            .registry()
            .create_stream(bridge.config().stream_queue_capacity);

        Self {
            bridge,
            handle,
            endpoint,
        }
    }

    pub(crate) fn handle(&self) -> &E::Element {
        &self.handle
    }

    pub fn id(&self) -> EndpointId {
        self.endpoint.id()
    }

    pub fn phase(&self) -> StreamPhase {
        self.endpoint.phase()
    }

    pub fn stats(&self) -> DeliveryStats {
        self.endpoint.stats()
    }

    pub fn set_caps(&self, caps: &str) {
        self.bridge.engine().set_caps(&self.handle, caps);
    }

    pub fn set_property_float(&self, key: &str, value: f32) {
        self.bridge
            .engine()
            .set_property_float(&self.handle, key, value);
    }

    pub fn set_property_string(&self, key: &str, value: &str) {
        self.bridge
            .engine()
            .set_property_string(&self.handle, key, value);
    }

    /// Push an input buffer into the element
    ///
    /// Runs synchronously on the caller's thread and is not affected by
    /// [`stop`](Self::stop).
    pub fn push(&self, data: &[u8]) {
        self.bridge.engine().push_buffer(&self.handle, data);
    }

    /// Queue of buffers produced by this element
    ///
    /// The first call asks the engine to start producing; later calls return
    /// the same queue. The queue ends when the element reaches end-of-stream
    /// or is stopped.
    pub fn poll(&self) -> BufferReceiver {
        let (rx, first) = self.endpoint.start_consuming();
        if first {
            tracing::debug!(element = %self.id(), "Pulling buffers");
            self.bridge
                .engine()
                .pull_buffers(&self.handle, self.id(), self.bridge.dispatcher().clone());
        }
        rx
    }

    /// Stop delivering buffers
    ///
    /// Deregisters first so racing callbacks are discarded, then closes the
    /// queue. Idempotent.
    pub fn stop(&self) {
        self.bridge.registry().deregister(self.id());
        if self.endpoint.stop() {
            tracing::debug!(element = %self.id(), "Element stopped");
        }
    }

    /// Duration in nanoseconds, negative if unknown
    pub fn query_duration(&self) -> i64 {
        self.bridge.engine().query_duration(&self.handle)
    }

    /// Position in nanoseconds, negative if unknown
    pub fn query_position(&self) -> i64 {
        self.bridge.engine().query_position(&self.handle)
    }
}

impl<E: Engine> Drop for Element<E> {
    fn drop(&mut self) {
        self.stop();
    }
}

impl<E: Engine> std::fmt::Debug for Element<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Element")
            .field("id", &self.id())
            .field("phase", &self.phase())
            .finish()
    }
}
