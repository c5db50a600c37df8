//! External engine seam
//!
//! The media engine is an external collaborator: it builds pipelines from
//! textual descriptions, owns its worker threads, and reports back through a
//! [`Dispatcher`]. Backends implement [`Engine`] over their native handles.
//! Handles are owned by the wrapping [`Pipeline`](crate::Pipeline),
//! [`Element`](crate::Element) or [`Bin`](crate::Bin) and never handed out.

use crate::dispatch::Dispatcher;
use crate::registry::EndpointId;

/// A callback-driven streaming engine
///
/// Every method is a plain synchronous call. The only asynchronous traffic
/// flows the other way, from engine threads into the [`Dispatcher`] passed to
/// [`pull_buffers`](Engine::pull_buffers) and [`watch_bus`](Engine::watch_bus).
pub trait Engine: Send + Sync + 'static {
    /// Native pipeline handle
    type Pipeline: Send + Sync + 'static;
    /// Native element handle
    type Element: Send + Sync + 'static;
    /// Native bin handle
    type Bin: Send + Sync + 'static;

    /// Build a pipeline from a textual description
    fn parse_pipeline(&self, description: &str) -> Option<Self::Pipeline>;

    /// Instantiate an element of a named factory type
    fn make_element(&self, factory: &str, name: &str) -> Option<Self::Element>;

    /// Create an empty bin
    fn make_bin(&self, name: &str) -> Option<Self::Bin>;

    // Element

    /// Set the stream capabilities of an element, e.g. on an appsrc
    fn set_caps(&self, element: &Self::Element, caps: &str);

    /// Set a float property on an element
    fn set_property_float(&self, element: &Self::Element, key: &str, value: f32);

    /// Set a string property on an element
    fn set_property_string(&self, element: &Self::Element, key: &str, value: &str);

    /// Push one input buffer into an element; the engine copies `data`
    fn push_buffer(&self, element: &Self::Element, data: &[u8]);

    /// Start producing buffers from an element
    ///
    /// From now on the engine calls [`Dispatcher::on_buffer`] and
    /// [`Dispatcher::on_end_of_stream`] with `id` from its own threads.
    fn pull_buffers(&self, element: &Self::Element, id: EndpointId, dispatcher: Dispatcher);

    /// Stream duration in nanoseconds, negative if unknown
    fn query_duration(&self, element: &Self::Element) -> i64;

    /// Stream position in nanoseconds, negative if unknown
    fn query_position(&self, element: &Self::Element) -> i64;

    // Pipeline

    /// Watch a pipeline's bus
    ///
    /// From now on the engine calls [`Dispatcher::on_bus_message`] with `id`.
    fn watch_bus(&self, pipeline: &Self::Pipeline, id: EndpointId, dispatcher: Dispatcher);

    /// Set a pipeline playing
    fn start(&self, pipeline: &Self::Pipeline);

    /// Pause a pipeline
    fn pause(&self, pipeline: &Self::Pipeline);

    /// Stop a pipeline and release its resources
    fn stop(&self, pipeline: &Self::Pipeline);

    /// Send end-of-stream into a pipeline
    fn send_eos(&self, pipeline: &Self::Pipeline);

    /// Set whether the bus is flushed when the pipeline stops
    fn set_auto_flush_bus(&self, pipeline: &Self::Pipeline, flush: bool);

    /// Whether the bus is flushed when the pipeline stops
    fn auto_flush_bus(&self, pipeline: &Self::Pipeline) -> bool;

    /// Set the pipeline delay in nanoseconds
    fn set_delay(&self, pipeline: &Self::Pipeline, delay: u64);

    /// Pipeline delay in nanoseconds
    fn delay(&self, pipeline: &Self::Pipeline) -> u64;

    /// Set the pipeline latency in nanoseconds
    fn set_latency(&self, pipeline: &Self::Pipeline, latency: u64);

    /// Pipeline latency in nanoseconds
    fn latency(&self, pipeline: &Self::Pipeline) -> u64;

    /// Find a named element inside a pipeline
    fn find_element(&self, pipeline: &Self::Pipeline, name: &str) -> Option<Self::Element>;

    /// Add an element to a pipeline
    fn add_element(&self, pipeline: &Self::Pipeline, element: &Self::Element);

    /// Add a bin to a pipeline
    fn add_bin(&self, pipeline: &Self::Pipeline, bin: &Self::Bin);

    // Bin

    /// Add an element to a bin
    fn bin_add_element(&self, bin: &Self::Bin, element: &Self::Element);

    /// Find a named element inside a bin
    fn bin_find_element(&self, bin: &Self::Bin, name: &str) -> Option<Self::Element>;
}
