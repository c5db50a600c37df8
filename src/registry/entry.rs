//! Registry entries
//!
//! An identifier maps to exactly one live endpoint of either kind.

use std::sync::Arc;

use crate::endpoint::{BusEndpoint, StreamEndpoint};

use super::id::EndpointId;

/// A registered endpoint
#[derive(Clone)]
pub enum Endpoint {
    /// Buffer-producing element
    Stream(Arc<StreamEndpoint>),
    /// Pipeline status-message stream
    Bus(Arc<BusEndpoint>),
}

impl Endpoint {
    /// Identifier the endpoint was registered under
    pub fn id(&self) -> EndpointId {
        match self {
            Endpoint::Stream(stream) => stream.id(),
            Endpoint::Bus(bus) => bus.id(),
        }
    }

    /// Short name of the endpoint kind, for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Endpoint::Stream(_) => "stream",
            Endpoint::Bus(_) => "bus",
        }
    }

    /// The stream endpoint, if this is one
    pub fn as_stream(&self) -> Option<&Arc<StreamEndpoint>> {
        match self {
            Endpoint::Stream(stream) => Some(stream),
            Endpoint::Bus(_) => None,
        }
    }

    /// The bus endpoint, if this is one
    pub fn as_bus(&self) -> Option<&Arc<BusEndpoint>> {
        match self {
            Endpoint::Bus(bus) => Some(bus),
            Endpoint::Stream(_) => None,
        }
    }
}

impl std::fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Endpoint")
            .field("kind", &self.kind())
            .field("id", &self.id())
            .finish()
    }
}
