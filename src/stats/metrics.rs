//! Delivery and dispatch counters
//!
//! Counters are bumped lock-free from engine threads and read as plain
//! snapshots.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Snapshot of one endpoint's delivery counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryStats {
    /// Items handed to the consumer queue
    pub delivered: u64,
    /// Items discarded (stopped, not consuming, or closed mid-send)
    pub dropped: u64,
    /// Bytes handed to the consumer queue (stream endpoints only)
    pub bytes_delivered: u64,
}

/// Live counters owned by an endpoint
#[derive(Debug, Default)]
pub struct DeliveryCounters {
    delivered: AtomicU64,
    dropped: AtomicU64,
    bytes_delivered: AtomicU64,
}

impl DeliveryCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a delivered buffer and its size
    pub(crate) fn record_delivered(&self, bytes: usize) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
        self.bytes_delivered
            .fetch_add(bytes as u64, Ordering::Relaxed);
    }

    /// Count a delivered item that carries no byte size (bus messages)
    pub(crate) fn record_delivered_item(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Read the current values
    pub fn snapshot(&self) -> DeliveryStats {
        DeliveryStats {
            delivered: self.delivered.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            bytes_delivered: self.bytes_delivered.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of dispatcher-wide counters
#[derive(Debug, Clone, Default)]
pub struct DispatchStats {
    /// Buffers routed to a registered stream endpoint
    pub buffers_dispatched: u64,
    /// Buffers whose identifier was not registered
    pub buffers_discarded: u64,
    /// End-of-stream notices routed to a registered endpoint
    pub eos_dispatched: u64,
    /// End-of-stream notices whose identifier was not registered
    pub eos_discarded: u64,
    /// Bus messages routed to a registered pipeline
    pub messages_dispatched: u64,
    /// Bus messages whose pipeline was not registered
    pub messages_discarded: u64,
    /// Time since the dispatcher was created
    pub uptime: Duration,
}

impl DispatchStats {
    /// Total callbacks dropped because their identifier was not registered
    pub fn total_discarded(&self) -> u64 {
        self.buffers_discarded + self.eos_discarded + self.messages_discarded
    }
}

/// Live dispatcher counters
#[derive(Debug)]
pub(crate) struct DispatchCounters {
    pub(crate) buffers_dispatched: AtomicU64,
    pub(crate) buffers_discarded: AtomicU64,
    pub(crate) eos_dispatched: AtomicU64,
    pub(crate) eos_discarded: AtomicU64,
    pub(crate) messages_dispatched: AtomicU64,
    pub(crate) messages_discarded: AtomicU64,
    started_at: Instant,
}

impl DispatchCounters {
    pub(crate) fn new() -> Self {
        Self {
            buffers_dispatched: AtomicU64::new(0),
            buffers_discarded: AtomicU64::new(0),
            eos_dispatched: AtomicU64::new(0),
            eos_discarded: AtomicU64::new(0),
            messages_dispatched: AtomicU64::new(0),
            messages_discarded: AtomicU64::new(0),
            started_at: Instant::now(),
        }
    }

    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> DispatchStats {
        DispatchStats {
            buffers_dispatched: self.buffers_dispatched.load(Ordering::Relaxed),
            buffers_discarded: self.buffers_discarded.load(Ordering::Relaxed),
            eos_dispatched: self.eos_dispatched.load(Ordering::Relaxed),
            eos_discarded: self.eos_discarded.load(Ordering::Relaxed),
            messages_dispatched: self.messages_dispatched.load(Ordering::Relaxed),
            messages_discarded: self.messages_discarded.load(Ordering::Relaxed),
            uptime: self.started_at.elapsed(),
        }
    }
}
