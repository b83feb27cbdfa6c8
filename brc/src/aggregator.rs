//! Per-partition streaming aggregation.

use std::ops::Range;

use memchr::{memchr, memchr_iter};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeek, AsyncSeekExt, SeekFrom};

use crate::error::{AggError, Result};
use crate::interner::KeyInterner;
use crate::store::{AggregateStore, SlotStats};

/// Splits one record into its key and value.
///
/// The key is everything before the first `;` and borrows from `line`.
/// One trailing `\r` is dropped, so CRLF files parse like LF files.
pub fn parse_line(line: &[u8]) -> std::result::Result<(&[u8], f32), &'static str> {
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    let sep = memchr(b';', line).ok_or("missing ';' separator")?;
    let value = std::str::from_utf8(&line[sep + 1..])
        .ok()
        .and_then(|v| v.parse::<f32>().ok())
        .ok_or("invalid number")?;
    Ok((&line[..sep], value))
}

/// Owns the interner and aggregate arrays for one byte range of the input.
#[derive(Debug)]
pub struct PartitionAggregator {
    range: Range<u64>,
    interner: KeyInterner,
    store: AggregateStore,
    lines: u64,
}

impl PartitionAggregator {
    pub fn new(range: Range<u64>) -> Self {
        Self {
            range,
            interner: KeyInterner::new(),
            store: AggregateStore::new(),
            lines: 0,
        }
    }

    pub fn range(&self) -> &Range<u64> {
        &self.range
    }

    /// Records folded into this aggregator, merged partitions included.
    pub fn lines(&self) -> u64 {
        self.lines
    }

    pub fn keys(&self) -> usize {
        self.interner.len()
    }

    /// Per-key statistics in the order keys were first interned here.
    pub fn stats(&self) -> impl Iterator<Item = (&[u8], SlotStats)> + '_ {
        self.interner
            .iter()
            .filter_map(|(slot, key)| self.store.get(slot).map(|stats| (key, stats)))
    }

    /// Scans the assigned range of `reader` line by line.
    ///
    /// `buf` is the read-ahead buffer; its length is the read size. A record
    /// longer than the buffer grows it. The first malformed record aborts the
    /// scan.
    pub async fn run<R>(&mut self, mut reader: R, buf: &mut Vec<u8>) -> Result<()>
    where
        R: AsyncRead + AsyncSeek + Unpin,
    {
        reader.seek(SeekFrom::Start(self.range.start)).await?;
        let mut reader = reader.take(self.range.end - self.range.start);

        let mut filled = 0;
        let mut offset = self.range.start;
        loop {
            if filled == buf.len() {
                let grown = buf.len().max(1) * 2;
                buf.resize(grown, 0);
            }

            let read = reader.read(&mut buf[filled..]).await?;
            if read == 0 {
                if filled > 0 {
                    self.consume_line(&buf[..filled], offset)?;
                }
                break;
            }
            filled += read;

            let consumed = self.consume_lines(&buf[..filled], offset)?;
            buf.copy_within(consumed..filled, 0);
            filled -= consumed;
            offset += consumed as u64;
        }
        Ok(())
    }

    /// Consumes every complete line in `chunk`, returning the bytes used.
    fn consume_lines(&mut self, chunk: &[u8], offset: u64) -> Result<usize> {
        let mut start = 0;
        for end in memchr_iter(b'\n', chunk) {
            self.consume_line(&chunk[start..end], offset + start as u64)?;
            start = end + 1;
        }
        Ok(start)
    }

    fn consume_line(&mut self, line: &[u8], offset: u64) -> Result<()> {
        let (key, value) =
            parse_line(line).map_err(|reason| AggError::malformed(offset, line, reason))?;
        let slot = self.interner.alloc(key);
        self.store.record(slot, value);
        self.lines += 1;
        Ok(())
    }

    /// Folds `other` into this aggregator.
    ///
    /// Keys are re-allocated through this interner, so slot numbering of the
    /// two sides never has to agree.
    pub fn merge(&mut self, other: PartitionAggregator) {
        for (their_slot, key) in other.interner.iter() {
            let Some(stats) = other.store.get(their_slot) else {
                continue;
            };
            let slot = self.interner.alloc(key);
            self.store.merge_slot(slot, stats);
        }
        self.lines += other.lines;
        self.range = self.range.start.min(other.range.start)..self.range.end.max(other.range.end);
    }
}
