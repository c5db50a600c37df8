//! Bridge between a callback-driven media engine and pull-based consumers
//!
//! Media engines produce buffers, end-of-stream notices and bus messages on
//! their own worker threads. This crate routes those callbacks, keyed by
//! integer identifier, into bounded per-endpoint queues that consumers drain
//! from any thread, and keeps teardown race-free: once an endpoint is
//! stopped, late callbacks are discarded instead of resurrecting it.
//!
//! ```text
//! engine thread ──► Dispatcher ──► EndpointRegistry lookup ──► endpoint queue ──► consumer
//!                                       ▲
//! consumer ──► Bridge / Pipeline / Element (create, start, stop)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use pipeline_bridge::Bridge;
//!
//! let bridge = Bridge::new(engine);
//! let pipeline = bridge.pipeline("videotestsrc ! appsink name=sink")?;
//! let sink = pipeline.find_element("sink").expect("sink in description");
//!
//! let buffers = sink.poll();
//! pipeline.start();
//! for buffer in buffers {
//!     println!("{} bytes", buffer.len());
//! }
//! pipeline.stop();
//! ```

pub mod bin;
pub mod bridge;
pub mod config;
pub mod dispatch;
pub mod element;
pub mod endpoint;
pub mod engine;
pub mod error;
pub mod message;
pub mod pipeline;
pub mod registry;
pub mod stats;

#[cfg(test)]
pub(crate) mod testing;

pub use bin::Bin;
pub use bridge::Bridge;
pub use config::BridgeConfig;
pub use dispatch::Dispatcher;
pub use element::Element;
pub use endpoint::{BufferReceiver, MessageReceiver, QueueReceiver, StreamPhase};
pub use engine::Engine;
pub use error::{Error, Result};
pub use message::{MessageKind, NativeMessage, StatusMessage};
pub use pipeline::Pipeline;
pub use registry::{EndpointId, EndpointRegistry};
pub use stats::{DeliveryStats, DispatchStats};
