//! Bridge context
//!
//! Ties an [`Engine`] backend to one registry and dispatcher. Every pipeline,
//! element and bin created through a bridge routes its callbacks through that
//! bridge's registry; two bridges never see each other's identifiers.

use std::sync::Arc;

use crate::bin::Bin;
use crate::config::BridgeConfig;
use crate::dispatch::Dispatcher;
use crate::element::Element;
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::pipeline::Pipeline;
use crate::registry::EndpointRegistry;
use crate::stats::DispatchStats;

struct Shared<E> {
    engine: E,
    dispatcher: Dispatcher,
    config: BridgeConfig,
}

/// Entry point for creating pipelines, elements and bins
pub struct Bridge<E: Engine> {
    shared: Arc<Shared<E>>,
}

impl<E: Engine> Clone for Bridge<E> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<E: Engine> Bridge<E> {
    /// Create a bridge with default configuration
    pub fn new(engine: E) -> Self {
        Self::with_config(engine, BridgeConfig::default())
    }

    /// Create a bridge with custom configuration
    pub fn with_config(engine: E, config: BridgeConfig) -> Self {
        let registry = Arc::new(EndpointRegistry::with_base(config.id_base));

        Self {
            shared: Arc::new(Shared {
                engine,
                dispatcher: Dispatcher::new(registry),
                config,
            }),
        }
    }

    /// Get the wrapped engine
    pub fn engine(&self) -> &E {
        &self.shared.engine
    }

    /// Dispatcher handed to the engine for callbacks
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.shared.dispatcher
    }

    /// Get the endpoint registry
    pub fn registry(&self) -> &Arc<EndpointRegistry> {
        self.shared.dispatcher.registry()
    }

    /// Get the bridge configuration
    pub fn config(&self) -> &BridgeConfig {
        &self.shared.config
    }

    /// Get dispatcher-wide counters
    pub fn stats(&self) -> DispatchStats {
        self.shared.dispatcher.stats()
    }

    /// Build a pipeline from a textual description
    ///
    /// The pipeline's bus is registered immediately; messages become
    /// deliverable once [`Pipeline::pull_messages`] is called.
    pub fn pipeline(&self, description: &str) -> Result<Pipeline<E>> {
        let handle = self
            .engine()
            .parse_pipeline(description)
            .ok_or_else(|| Error::PipelineCreate(description.to_owned()))?;

        Ok(Pipeline::attach(self.clone(), handle))
    }

    /// Instantiate an element of a named factory type
    ///
    /// The element is registered as a stream endpoint immediately.
    pub fn element(&self, factory: &str, name: &str) -> Result<Element<E>> {
        let handle = self
            .engine()
            .make_element(factory, name)
            .ok_or_else(|| Error::ElementCreate {
                factory: factory.to_owned(),
                name: name.to_owned(),
            })?;

        Ok(Element::attach(self.clone(), handle))
    }

    /// Create an empty bin
    pub fn bin(&self, name: &str) -> Result<Bin<E>> {
        let handle = self
            .engine()
            .make_bin(name)
            .ok_or_else(|| Error::BinCreate(name.to_owned()))?;

        Ok(Bin::attach(self.clone(), handle))
    }
}

impl<E: Engine> std::fmt::Debug for Bridge<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bridge")
            .field("config", &self.shared.config)
            .field("endpoints", &self.registry().len())
            .finish()
    }
}
