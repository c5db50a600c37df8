//! Error types
//!
//! Only construction-time failures surface as errors. Dispatch-time discards
//! are logged and counted, never returned.

/// Error type for bridge operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The engine rejected a textual pipeline description
    PipelineCreate(String),
    /// The engine could not build an element from a factory type
    ElementCreate {
        /// Factory type requested
        factory: String,
        /// Instance name requested
        name: String,
    },
    /// The engine could not build a bin
    BinCreate(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::PipelineCreate(description) => {
                write!(f, "Failed to create pipeline: {}", description)
            }
            Error::ElementCreate { factory, name } => {
                write!(f, "Failed to create element {} of type {}", name, factory)
            }
            Error::BinCreate(name) => write!(f, "Failed to create bin: {}", name),
        }
    }
}

impl std::error::Error for Error {}

/// Result alias for bridge operations
pub type Result<T> = std::result::Result<T, Error>;
