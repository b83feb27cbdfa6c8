//! Grouped min/max/mean/count over large `key;value` files.
//!
//! The input is cut into line-aligned partitions, each partition is scanned
//! on its own task into a slot-indexed aggregate store, and the partial
//! results are folded into one [`Report`].

use std::sync::Arc;
use std::time::Instant;

use tracing::info;

pub mod aggregator;
pub mod config;
pub mod error;
pub mod executor;
pub mod interner;
pub mod partition;
pub mod pool;
pub mod report;
pub mod source;
pub mod store;

pub use aggregator::PartitionAggregator;
pub use config::AggregateConfig;
pub use error::{AggError, Result};
pub use report::{Report, StationSummary};
pub use source::{ByteSource, FileSource, MemorySource};

/// Runs the whole pipeline over `source`.
///
/// Either every record is folded into the report or an error is returned;
/// partial results are never surfaced.
pub async fn process<S: ByteSource>(source: S, config: &AggregateConfig) -> Result<Report> {
    config.validate()?;
    let started = Instant::now();
    let size = source.len();
    let source = Arc::new(source);

    let ranges = partition::split(&*source, config.partitions).await?;
    info!(
        size,
        requested = config.partitions,
        partitions = ranges.len(),
        "starting aggregation"
    );

    let aggregators = ranges.into_iter().map(PartitionAggregator::new).collect();
    let pool = pool::BufferPool::new(config.buffer_capacity, config.pool_capacity);
    let finished = executor::execute(source, aggregators, &pool).await?;

    let report = match report::merge_all(finished) {
        Some(merged) => {
            info!(
                lines = merged.lines(),
                keys = merged.keys(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "aggregation complete"
            );
            Report::from_aggregator(&merged)
        }
        None => Report::default(),
    };
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(partitions: usize) -> AggregateConfig {
        AggregateConfig::new()
            .with_partitions(partitions)
            .with_buffer_capacity(16)
            .with_pool_capacity(2)
    }

    #[tokio::test]
    async fn test_single_partition_example() {
        let source = MemorySource::new(&b"A;1.0\nB;2.0\nA;3.0\n"[..]);
        let report = process(source, &config(1)).await.unwrap();
        assert_eq!(report.to_string(), "\"A\";1;3;2;2\n\"B\";2;2;2;1");
    }

    #[tokio::test]
    async fn test_malformed_record_produces_no_report() {
        let source = MemorySource::new(&b"A;notanumber\n"[..]);
        let err = process(source, &config(1)).await.unwrap_err();
        assert!(matches!(err, AggError::MalformedRecord { offset: 0, .. }));
    }

    #[tokio::test]
    async fn test_invalid_config_rejected_before_scan() {
        let source = MemorySource::new(&b"A;1.0\n"[..]);
        let err = process(source, &config(0)).await.unwrap_err();
        assert!(matches!(err, AggError::Config(_)));
    }

    #[tokio::test]
    async fn test_empty_source_rejected() {
        let err = process(MemorySource::new(Vec::new()), &config(4))
            .await
            .unwrap_err();
        assert!(matches!(err, AggError::Config(_)));
    }
}
