//! Hub configuration

/// Configuration for the broadcast hub's queues
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Capacity of the inbound broadcast queue. Publishers suspend when the
    /// queue is full (backpressure, never drop).
    pub inbound_capacity: usize,

    /// Capacity of each sink's outbound conduit. The default of 1 makes a
    /// fan-out delivery suspend until the paired connection handler has
    /// taken the previous message.
    pub sink_capacity: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            inbound_capacity: 99,
            sink_capacity: 1,
        }
    }
}

impl HubConfig {
    /// Set the inbound queue capacity (floored at 1)
    pub fn inbound_capacity(mut self, capacity: usize) -> Self {
        self.inbound_capacity = capacity.max(1);
        self
    }

    /// Set the per-sink conduit capacity (floored at 1)
    pub fn sink_capacity(mut self, capacity: usize) -> Self {
        self.sink_capacity = capacity.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HubConfig::default();

        assert_eq!(config.inbound_capacity, 99);
        assert_eq!(config.sink_capacity, 1);
    }

    #[test]
    fn test_builder_inbound_capacity() {
        let config = HubConfig::default().inbound_capacity(10);

        assert_eq!(config.inbound_capacity, 10);
    }

    #[test]
    fn test_builder_capacity_floor() {
        // Zero-capacity channels are invalid; the builder floors at 1
        let config = HubConfig::default().inbound_capacity(0).sink_capacity(0);

        assert_eq!(config.inbound_capacity, 1);
        assert_eq!(config.sink_capacity, 1);
    }

    #[test]
    fn test_builder_chaining() {
        let config = HubConfig::default().inbound_capacity(5).sink_capacity(4);

        assert_eq!(config.inbound_capacity, 5);
        assert_eq!(config.sink_capacity, 4);
    }
}
