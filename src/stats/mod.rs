//! Statistics for endpoints and the dispatcher

pub mod metrics;

pub use metrics::{DeliveryCounters, DeliveryStats, DispatchStats};
pub(crate) use metrics::DispatchCounters;
