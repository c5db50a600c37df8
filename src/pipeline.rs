//! Pipeline facade
//!
//! Wraps one engine pipeline together with the bus endpoint registered for
//! it. Control calls are forwarded to the engine synchronously.

use std::sync::Arc;

use crate::bin::Bin;
use crate::bridge::Bridge;
use crate::element::Element;
use crate::endpoint::{BusEndpoint, MessageReceiver};
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::registry::EndpointId;
use crate::stats::DeliveryStats;

/// A media pipeline with a pull-based status message stream
///
/// Dropping a pipeline deregisters and closes its bus; it does not stop the
/// engine pipeline.
pub struct Pipeline<E: Engine> {
    bridge: Bridge<E>,
    handle: E::Pipeline,
    bus: Arc<BusEndpoint>,
}

impl<E: Engine> Pipeline<E> {
    /// Register `handle` with a new bus endpoint
    pub(crate) fn attach(bridge: Bridge<E>, handle: E::Pipeline) -> Self {
        let bus = bridge
            .registry()
            .create_bus(bridge.config().bus_queue_capacity);

        tracing::info!(pipeline = %bus.id(), "Pipeline created");

        Self {
            bridge,
            handle,
            bus,
        }
    }

    pub fn id(&self) -> EndpointId {
        self.bus.id()
    }

    /// Counters for the bus queue
    pub fn bus_stats(&self) -> DeliveryStats {
        self.bus.stats()
    }

    /// Queue of status messages from this pipeline's bus
    ///
    /// The first call registers the bus watch with the engine; later calls
    /// return the same queue. The queue ends when the pipeline is stopped.
    pub fn pull_messages(&self) -> MessageReceiver {
        let (rx, first) = self.bus.start_watching();
        if first {
            self.bridge
                .engine()
                .watch_bus(&self.handle, self.id(), self.bridge.dispatcher().clone());
        }
        rx
    }

    pub fn start(&self) {
        tracing::info!(pipeline = %self.id(), "Starting pipeline");
        self.bridge.engine().start(&self.handle);
    }

    pub fn pause(&self) {
        tracing::debug!(pipeline = %self.id(), "Pausing pipeline");
        self.bridge.engine().pause(&self.handle);
    }

    /// Stop the pipeline
    ///
    /// Deregisters the bus, closes its queue, then stops the engine
    /// pipeline. Elements obtained from this pipeline keep their own
    /// endpoints until they are stopped or dropped.
    pub fn stop(&self) {
        self.detach();
        tracing::info!(pipeline = %self.id(), "Stopping pipeline");
        self.bridge.engine().stop(&self.handle);
    }

    fn detach(&self) {
        self.bridge.registry().deregister(self.id());
        self.bus.close();
    }

    /// Ask the pipeline to drain and emit end-of-stream
    pub fn send_eos(&self) {
        self.bridge.engine().send_eos(&self.handle);
    }

    pub fn set_auto_flush_bus(&self, flush: bool) {
        self.bridge.engine().set_auto_flush_bus(&self.handle, flush);
    }

    pub fn auto_flush_bus(&self) -> bool {
        self.bridge.engine().auto_flush_bus(&self.handle)
    }

    /// Set the pipeline delay in nanoseconds
    pub fn set_delay(&self, delay: u64) {
        self.bridge.engine().set_delay(&self.handle, delay);
    }

    pub fn delay(&self) -> u64 {
        self.bridge.engine().delay(&self.handle)
    }

    /// Set the pipeline latency in nanoseconds
    pub fn set_latency(&self, latency: u64) {
        self.bridge.engine().set_latency(&self.handle, latency);
    }

    pub fn latency(&self) -> u64 {
        self.bridge.engine().latency(&self.handle)
    }

    /// Find a named element and register it as a stream endpoint
    pub fn find_element(&self, name: &str) -> Option<Element<E>> {
        let handle = self.bridge.engine().find_element(&self.handle, name)?;
        let element = Element::attach(self.bridge.clone(), handle);

        tracing::debug!(pipeline = %self.id(), element = %element.id(), name = name, "Element found");
        Some(element)
    }

    /// Instantiate an element and add it to this pipeline
    pub fn add_element(&self, factory: &str, name: &str) -> Result<Element<E>> {
        let handle = self
            .bridge
            .engine()
            .make_element(factory, name)
            .ok_or_else(|| Error::ElementCreate {
                factory: factory.to_owned(),
                name: name.to_owned(),
            })?;
        self.bridge.engine().add_element(&self.handle, &handle);

        Ok(Element::attach(self.bridge.clone(), handle))
    }

    pub fn add_bin(&self, bin: &Bin<E>) {
        self.bridge.engine().add_bin(&self.handle, bin.handle());
    }
}

impl<E: Engine> Drop for Pipeline<E> {
    fn drop(&mut self) {
        self.detach();
    }
}

impl<E: Engine> std::fmt::Debug for Pipeline<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("id", &self.id())
            .field("bus", &self.bus)
            .finish()
    }
}
