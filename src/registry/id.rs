//! Endpoint identifiers
//!
//! Identifiers cross the engine boundary as plain integers: the engine stores
//! them in its callback user data and hands them back on every dispatch.

/// Unique identifier for a registered endpoint (pipeline bus or stream)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EndpointId(u64);

impl EndpointId {
    /// Wrap a raw identifier received from the engine
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw value to hand to the engine
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for EndpointId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl std::fmt::Display for EndpointId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
