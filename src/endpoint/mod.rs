//! Delivery endpoints
//!
//! An endpoint is the consumer-facing side of one registered identifier:
//! a [`StreamEndpoint`] for an element producing raw buffers, or a
//! [`BusEndpoint`] for a pipeline's status messages. Both own a bounded
//! [`DeliveryQueue`] that is closed at most once.

pub mod bus;
pub mod forward;
pub mod queue;
pub mod stream;

pub use bus::BusEndpoint;
pub use queue::{DeliveryQueue, QueueReceiver, SendOutcome};
pub use stream::{StreamEndpoint, StreamPhase};

/// Consumer queue of raw buffers
pub type BufferReceiver = QueueReceiver<bytes::Bytes>;

/// Consumer queue of bus messages
pub type MessageReceiver = QueueReceiver<crate::message::StatusMessage>;
