//! Final reduction and text rendering.

use std::fmt::{self, Write};

use crate::aggregator::PartitionAggregator;

/// Folds every aggregator into the first, in order.
pub fn merge_all(aggregators: Vec<PartitionAggregator>) -> Option<PartitionAggregator> {
    let mut rest = aggregators.into_iter();
    let mut first = rest.next()?;
    for other in rest {
        first.merge(other);
    }
    Some(first)
}

/// One decimal digit, with a trailing `.0` dropped.
pub fn format_value(value: f32) -> String {
    let formatted = format!("{value:.1}");
    match formatted.strip_suffix(".0") {
        Some(integral) => integral.to_string(),
        None => formatted,
    }
}

/// Writes `key` double-quoted with Go `%q` escaping: `\"` and `\\`, the
/// short C escapes, `\xNN` for other ASCII control bytes and for bytes that
/// are not valid UTF-8, `\uNNNN` for non-ASCII control characters. Other
/// characters Go treats as non-printable (format characters, unassigned
/// code points) are written unescaped.
pub fn write_quoted(f: &mut impl Write, key: &[u8]) -> fmt::Result {
    f.write_char('"')?;
    let mut rest = key;
    while !rest.is_empty() {
        let (valid, invalid) = match std::str::from_utf8(rest) {
            Ok(text) => (text, 0),
            Err(e) => {
                let good = e.valid_up_to();
                let bad = e.error_len().unwrap_or(rest.len() - good);
                (std::str::from_utf8(&rest[..good]).unwrap_or_default(), bad)
            }
        };
        for c in valid.chars() {
            match c {
                '"' => f.write_str("\\\"")?,
                '\\' => f.write_str("\\\\")?,
                '\x07' => f.write_str("\\a")?,
                '\x08' => f.write_str("\\b")?,
                '\x0c' => f.write_str("\\f")?,
                '\n' => f.write_str("\\n")?,
                '\r' => f.write_str("\\r")?,
                '\t' => f.write_str("\\t")?,
                '\x0b' => f.write_str("\\v")?,
                c if c.is_ascii_control() => write!(f, "\\x{:02x}", c as u32)?,
                c if c.is_control() => write!(f, "\\u{:04x}", c as u32)?,
                c => f.write_char(c)?,
            }
        }
        let consumed = valid.len();
        for byte in &rest[consumed..consumed + invalid] {
            write!(f, "\\x{byte:02x}")?;
        }
        rest = &rest[consumed + invalid..];
    }
    f.write_char('"')
}

#[derive(Debug, Clone, PartialEq)]
pub struct StationSummary {
    pub key: Vec<u8>,
    pub min: f32,
    pub max: f32,
    /// `sum / count`, narrowed to `f32`.
    pub mean: f32,
    pub sum: f64,
    pub count: u32,
}

impl fmt::Display for StationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_quoted(f, &self.key)?;
        write!(
            f,
            ";{};{};{};{}",
            format_value(self.min),
            format_value(self.max),
            format_value(self.mean),
            self.count
        )
    }
}

/// Per-key results in first-seen order. `Display` renders one line per key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    rows: Vec<StationSummary>,
}

impl Report {
    pub fn from_aggregator(aggregator: &PartitionAggregator) -> Self {
        let rows = aggregator
            .stats()
            .map(|(key, stats)| StationSummary {
                key: key.to_vec(),
                min: stats.min,
                max: stats.max,
                mean: stats.mean() as f32,
                sum: stats.sum,
                count: stats.count,
            })
            .collect();
        Self { rows }
    }

    pub fn rows(&self) -> &[StationSummary] {
        &self.rows
    }

    pub fn get(&self, key: &[u8]) -> Option<&StationSummary> {
        self.rows.iter().find(|row| row.key == key)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.rows.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{row}")?;
        }
        Ok(())
    }
}
