//! Job configuration.

use crate::error::{AggError, Result};

/// Default number of partitions, one worker task each.
pub const DEFAULT_PARTITIONS: usize = 1000;

/// Default read-ahead buffer size per worker (512 KiB).
pub const DEFAULT_BUFFER_CAPACITY: usize = 1 << 19;

/// Tuning knobs for one aggregation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateConfig {
    /// Requested partition count. The realized count may be lower for small inputs.
    pub partitions: usize,

    /// Size of each worker's read buffer in bytes.
    pub buffer_capacity: usize,

    /// Maximum number of idle buffers kept in the pool between checkouts.
    pub pool_capacity: usize,
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self {
            partitions: DEFAULT_PARTITIONS,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            pool_capacity: num_cpus::get(),
        }
    }
}

impl AggregateConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_partitions(mut self, partitions: usize) -> Self {
        self.partitions = partitions;
        self
    }

    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    pub fn with_pool_capacity(mut self, capacity: usize) -> Self {
        self.pool_capacity = capacity;
        self
    }

    /// Rejects values the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.partitions == 0 {
            return Err(AggError::Config("partition count must be positive".into()));
        }
        if self.buffer_capacity == 0 {
            return Err(AggError::Config("buffer capacity must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AggregateConfig::default();
        assert_eq!(config.partitions, 1000);
        assert_eq!(config.buffer_capacity, 524_288);
        assert!(config.pool_capacity >= 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = AggregateConfig::new()
            .with_partitions(8)
            .with_buffer_capacity(64)
            .with_pool_capacity(2);
        assert_eq!(config.partitions, 8);
        assert_eq!(config.buffer_capacity, 64);
        assert_eq!(config.pool_capacity, 2);
    }

    #[test]
    fn test_zero_values_rejected() {
        let err = AggregateConfig::new().with_partitions(0).validate();
        assert!(matches!(err, Err(AggError::Config(_))));

        let err = AggregateConfig::new().with_buffer_capacity(0).validate();
        assert!(matches!(err, Err(AggError::Config(_))));
    }
}
