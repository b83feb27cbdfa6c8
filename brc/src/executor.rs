//! Runs every partition on its own tokio task.

use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::aggregator::PartitionAggregator;
use crate::error::{AggError, Result};
use crate::pool::BufferPool;
use crate::source::ByteSource;

/// Scans all `aggregators` concurrently and returns them in partition
/// order.
///
/// Each task opens its own reader on `source` and checks a buffer out of
/// `pool` for the duration of its scan. The first failure aborts the other
/// tasks and is returned alone.
pub async fn execute<S: ByteSource>(
    source: Arc<S>,
    aggregators: Vec<PartitionAggregator>,
    pool: &Arc<BufferPool>,
) -> Result<Vec<PartitionAggregator>> {
    let total = aggregators.len();
    let mut tasks = JoinSet::new();

    for (index, mut aggregator) in aggregators.into_iter().enumerate() {
        let source = Arc::clone(&source);
        let pool = Arc::clone(pool);
        tasks.spawn(async move {
            let reader = source.open().await?;
            let mut buf = pool.checkout();
            aggregator.run(reader, &mut buf).await?;
            Ok::<_, AggError>((index, aggregator))
        });
    }

    let mut finished: Vec<Option<PartitionAggregator>> = (0..total).map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        match joined.map_err(AggError::from).and_then(|result| result) {
            Ok((index, aggregator)) => {
                debug!(
                    partition = index,
                    start = aggregator.range().start,
                    end = aggregator.range().end,
                    lines = aggregator.lines(),
                    keys = aggregator.keys(),
                    "partition scanned"
                );
                finished[index] = Some(aggregator);
            }
            Err(e) => {
                warn!(error = %e, "partition failed, aborting remaining tasks");
                tasks.abort_all();
                return Err(e);
            }
        }
    }

    Ok(finished.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;

    fn aggregators(ranges: &[std::ops::Range<u64>]) -> Vec<PartitionAggregator> {
        ranges.iter().cloned().map(PartitionAggregator::new).collect()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_results_keep_partition_order() {
        let data = b"A;1.0\nB;2.0\nC;3.0\nD;4.0\n";
        let source = Arc::new(MemorySource::new(&data[..]));
        let pool = BufferPool::new(8, 4);

        let done = execute(source, aggregators(&[0..6, 6..12, 12..18, 18..24]), &pool)
            .await
            .unwrap();

        let keys: Vec<Vec<u8>> = done
            .iter()
            .flat_map(|agg| agg.stats().map(|(k, _)| k.to_vec()))
            .collect();
        assert_eq!(keys, vec![b"A".to_vec(), b"B".to_vec(), b"C".to_vec(), b"D".to_vec()]);
        assert!(pool.idle() >= 1);
    }

    #[tokio::test]
    async fn test_first_error_fails_the_job() {
        let data = b"A;1.0\nB;oops\nC;3.0\n";
        let source = Arc::new(MemorySource::new(&data[..]));
        let pool = BufferPool::new(64, 2);

        let err = execute(source, aggregators(&[0..6, 6..13, 13..19]), &pool)
            .await
            .unwrap_err();
        assert!(matches!(err, AggError::MalformedRecord { offset: 6, .. }));
    }
}
