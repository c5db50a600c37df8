//! Bridge configuration

/// Identifiers are issued strictly above this value
pub const DEFAULT_ID_BASE: u64 = 10_000;

/// Slots in each stream endpoint's delivery queue
pub const DEFAULT_STREAM_QUEUE_CAPACITY: usize = 10;

/// Slots in each pipeline's bus message queue
pub const DEFAULT_BUS_QUEUE_CAPACITY: usize = 5;

/// Bridge configuration options
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Base for the identifier generator; the first issued id is `id_base + 1`
    pub id_base: u64,

    /// Capacity of stream endpoint queues (back-pressure threshold)
    pub stream_queue_capacity: usize,

    /// Capacity of bus endpoint queues
    pub bus_queue_capacity: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            id_base: DEFAULT_ID_BASE,
            stream_queue_capacity: DEFAULT_STREAM_QUEUE_CAPACITY,
            bus_queue_capacity: DEFAULT_BUS_QUEUE_CAPACITY,
        }
    }
}

impl BridgeConfig {
    /// Set the identifier base
    pub fn id_base(mut self, base: u64) -> Self {
        self.id_base = base;
        self
    }

    /// Set the stream queue capacity (at least 1)
    pub fn stream_queue_capacity(mut self, capacity: usize) -> Self {
        self.stream_queue_capacity = capacity.max(1);
        self
    }

    /// Set the bus queue capacity (at least 1)
    pub fn bus_queue_capacity(mut self, capacity: usize) -> Self {
        self.bus_queue_capacity = capacity.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BridgeConfig::default();

        assert_eq!(config.id_base, 10_000);
        assert_eq!(config.stream_queue_capacity, 10);
        assert_eq!(config.bus_queue_capacity, 5);
    }

    #[test]
    fn test_builder_capacity_clamped() {
        // A zero-capacity queue would turn every delivery into a rendezvous
        let config = BridgeConfig::default()
            .stream_queue_capacity(0)
            .bus_queue_capacity(0);

        assert_eq!(config.stream_queue_capacity, 1);
        assert_eq!(config.bus_queue_capacity, 1);
    }

    #[test]
    fn test_builder_chaining() {
        let config = BridgeConfig::default()
            .id_base(500)
            .stream_queue_capacity(2)
            .bus_queue_capacity(3);

        assert_eq!(config.id_base, 500);
        assert_eq!(config.stream_queue_capacity, 2);
        assert_eq!(config.bus_queue_capacity, 3);
    }
}
