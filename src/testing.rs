//! Recording engine for unit tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use crate::dispatch::Dispatcher;
use crate::engine::Engine;
use crate::registry::EndpointId;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    PullBuffers(EndpointId),
    WatchBus(EndpointId),
    SetCaps(String),
    SetFloat(String, f32),
    SetString(String, String),
    Push(Vec<u8>),
    Start,
    Pause,
    Stop,
    SendEos,
    AddElement(String),
    AddBin(String),
    BinAdd(String, String),
}

pub(crate) struct MockPipeline {
    description: String,
}

pub(crate) struct MockElement {
    name: String,
}

pub(crate) struct MockBin {
    name: String,
}

/// Engine that records every call
///
/// Descriptions containing `invalid` and the factory `missing` fail to
/// build. `find_element` succeeds for names appearing as `name=<name>` in the
/// pipeline description.
pub(crate) struct MockEngine {
    calls: Mutex<Vec<Call>>,
    auto_flush: AtomicBool,
    delay: AtomicU64,
    latency: AtomicU64,
    bins: Mutex<HashMap<String, Vec<String>>>,
}

impl MockEngine {
    pub(crate) fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            auto_flush: AtomicBool::new(true),
            delay: AtomicU64::new(0),
            latency: AtomicU64::new(0),
            bins: Mutex::new(HashMap::new()),
        }
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    pub(crate) fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

impl Engine for MockEngine {
    type Pipeline = MockPipeline;
    type Element = MockElement;
    type Bin = MockBin;

    fn parse_pipeline(&self, description: &str) -> Option<MockPipeline> {
        if description.contains("invalid") {
            return None;
        }
        Some(MockPipeline {
            description: description.to_owned(),
        })
    }

    fn make_element(&self, factory: &str, name: &str) -> Option<MockElement> {
        if factory == "missing" {
            return None;
        }
        Some(MockElement {
            name: name.to_owned(),
        })
    }

    fn make_bin(&self, name: &str) -> Option<MockBin> {
        if name.is_empty() {
            return None;
        }
        Some(MockBin {
            name: name.to_owned(),
        })
    }

    fn set_caps(&self, _element: &MockElement, caps: &str) {
        self.record(Call::SetCaps(caps.to_owned()));
    }

    fn set_property_float(&self, _element: &MockElement, key: &str, value: f32) {
        self.record(Call::SetFloat(key.to_owned(), value));
    }

    fn set_property_string(&self, _element: &MockElement, key: &str, value: &str) {
        self.record(Call::SetString(key.to_owned(), value.to_owned()));
    }

    fn push_buffer(&self, _element: &MockElement, data: &[u8]) {
        self.record(Call::Push(data.to_vec()));
    }

    fn pull_buffers(&self, _element: &MockElement, id: EndpointId, _dispatcher: Dispatcher) {
        self.record(Call::PullBuffers(id));
    }

    fn query_duration(&self, _element: &MockElement) -> i64 {
        5_000_000_000
    }

    fn query_position(&self, _element: &MockElement) -> i64 {
        0
    }

    fn watch_bus(&self, _pipeline: &MockPipeline, id: EndpointId, _dispatcher: Dispatcher) {
        self.record(Call::WatchBus(id));
    }

    fn start(&self, _pipeline: &MockPipeline) {
        self.record(Call::Start);
    }

    fn pause(&self, _pipeline: &MockPipeline) {
        self.record(Call::Pause);
    }

    fn stop(&self, _pipeline: &MockPipeline) {
        self.record(Call::Stop);
    }

    fn send_eos(&self, _pipeline: &MockPipeline) {
        self.record(Call::SendEos);
    }

    fn set_auto_flush_bus(&self, _pipeline: &MockPipeline, flush: bool) {
        self.auto_flush.store(flush, Ordering::SeqCst);
    }

    fn auto_flush_bus(&self, _pipeline: &MockPipeline) -> bool {
        self.auto_flush.load(Ordering::SeqCst)
    }

    fn set_delay(&self, _pipeline: &MockPipeline, delay: u64) {
        self.delay.store(delay, Ordering::SeqCst);
    }

    fn delay(&self, _pipeline: &MockPipeline) -> u64 {
        self.delay.load(Ordering::SeqCst)
    }

    fn set_latency(&self, _pipeline: &MockPipeline, latency: u64) {
        self.latency.store(latency, Ordering::SeqCst);
    }

    fn latency(&self, _pipeline: &MockPipeline) -> u64 {
        self.latency.load(Ordering::SeqCst)
    }

    fn find_element(&self, pipeline: &MockPipeline, name: &str) -> Option<MockElement> {
        let needle = format!("name={}", name);
        pipeline
            .description
            .split_whitespace()
            .any(|token| token == needle)
            .then(|| MockElement {
                name: name.to_owned(),
            })
    }

    fn add_element(&self, _pipeline: &MockPipeline, element: &MockElement) {
        self.record(Call::AddElement(element.name.clone()));
    }

    fn add_bin(&self, _pipeline: &MockPipeline, bin: &MockBin) {
        self.record(Call::AddBin(bin.name.clone()));
    }

    fn bin_add_element(&self, bin: &MockBin, element: &MockElement) {
        self.bins
            .lock()
            .unwrap()
            .entry(bin.name.clone())
            .or_default()
            .push(element.name.clone());
        self.record(Call::BinAdd(bin.name.clone(), element.name.clone()));
    }

    fn bin_find_element(&self, bin: &MockBin, name: &str) -> Option<MockElement> {
        let bins = self.bins.lock().unwrap();
        bins.get(&bin.name)
            .filter(|members| members.iter().any(|m| m == name))
            .map(|_| MockElement {
                name: name.to_owned(),
            })
    }
}
