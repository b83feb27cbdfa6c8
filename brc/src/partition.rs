//! Line-aligned splitting of a byte source into worker partitions.

use std::ops::Range;

use tokio::io::{AsyncBufReadExt, AsyncSeekExt, BufReader, SeekFrom};

use crate::error::{AggError, Result};
use crate::source::ByteSource;

const SCAN_CAPACITY: usize = 4096;

/// Splits `source` into at most `partitions` contiguous byte ranges.
///
/// Each range starts at offset 0 or right after a `\n` and ends right after
/// a `\n` or at the end of input. The last range absorbs the remainder, so it
/// is between one and two steps long; small inputs therefore yield fewer
/// ranges than requested.
pub async fn split<S: ByteSource>(source: &S, partitions: usize) -> Result<Vec<Range<u64>>> {
    if partitions == 0 {
        return Err(AggError::Config("partition count must be positive".into()));
    }
    let size = source.len();
    if size == 0 {
        return Err(AggError::Config("input is empty".into()));
    }

    let step = (size / partitions as u64).max(1);
    let mut reader = source.open().await?;
    let mut ranges = Vec::with_capacity(partitions.min((size / step) as usize));
    let mut line = Vec::new();
    let mut base = 0u64;

    loop {
        let mut target_end = base + step;
        if target_end + step >= size {
            ranges.push(base..size);
            break;
        }

        reader.seek(SeekFrom::Start(target_end)).await?;
        line.clear();
        let read = BufReader::with_capacity(SCAN_CAPACITY, &mut reader)
            .read_until(b'\n', &mut line)
            .await?;
        target_end += read as u64;

        if target_end >= size || line.last() != Some(&b'\n') {
            ranges.push(base..size);
            break;
        }
        ranges.push(base..target_end);
        base = target_end;
    }

    tracing::debug!(size, step, requested = partitions, realized = ranges.len(), "split input");
    Ok(ranges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;

    const DATA: &[u8] = b"Hamburg;12.0\nBulawayo;8.9\nPalembang;38.8\nSt. John's;15.2\n\
Cracow;12.6\nBridgetown;26.9\nIstanbul;6.2\nRoseau;34.4\nConakry;31.2\nIstanbul;23.0\n";

    fn assert_line_aligned(data: &[u8], ranges: &[Range<u64>]) {
        assert!(!ranges.is_empty());
        assert_eq!(ranges[0].start, 0);
        assert_eq!(ranges.last().unwrap().end, data.len() as u64);
        for pair in ranges.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        for range in ranges {
            assert!(range.start < range.end, "empty range {range:?}");
            assert!(range.start == 0 || data[range.start as usize - 1] == b'\n');
            assert!(range.end as usize == data.len() || data[range.end as usize - 1] == b'\n');
        }
    }

    #[tokio::test]
    async fn test_every_partition_count_covers_input() {
        let source = MemorySource::new(DATA);
        for partitions in 1..=DATA.len() {
            let ranges = split(&source, partitions).await.unwrap();
            assert_line_aligned(DATA, &ranges);
            assert!(ranges.len() <= partitions);
        }
    }

    #[tokio::test]
    async fn test_single_partition() {
        let source = MemorySource::new(DATA);
        let ranges = split(&source, 1).await.unwrap();
        assert_eq!(ranges, vec![0..DATA.len() as u64]);
    }

    #[tokio::test]
    async fn test_large_partition_count_collapses() {
        let data = b"A;1.0\nB;2.0\nA;3.0\n";
        let source = MemorySource::new(&data[..]);
        let ranges = split(&source, 1000).await.unwrap();
        assert_line_aligned(data, &ranges);
        assert!(ranges.len() <= 3);
    }

    #[tokio::test]
    async fn test_missing_trailing_newline() {
        let data = b"Hamburg;1.0\nRoseau;2.0\nConakry;3.0";
        let source = MemorySource::new(&data[..]);
        for partitions in 1..=data.len() {
            let ranges = split(&source, partitions).await.unwrap();
            assert_eq!(ranges.last().unwrap().end, data.len() as u64);
            for pair in ranges.windows(2) {
                assert_eq!(pair[0].end, pair[1].start);
            }
        }
    }

    #[tokio::test]
    async fn test_invalid_inputs_rejected() {
        let source = MemorySource::new(DATA);
        assert!(matches!(split(&source, 0).await, Err(AggError::Config(_))));

        let empty = MemorySource::new(Vec::new());
        assert!(matches!(split(&empty, 4).await, Err(AggError::Config(_))));
    }
}
