//! Error types for the aggregation pipeline

use thiserror::Error;

/// Every failure is fatal to the whole job; nothing here is recovered locally.
#[derive(Debug, Error)]
pub enum AggError {
    #[error("Malformed record at byte {offset}: {reason} ({line:?})")]
    MalformedRecord {
        offset: u64,
        line: String,
        reason: &'static str,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Worker task failed: {0}")]
    Task(String),
}

impl AggError {
    pub(crate) fn malformed(offset: u64, line: &[u8], reason: &'static str) -> Self {
        AggError::MalformedRecord {
            offset,
            line: String::from_utf8_lossy(line).into_owned(),
            reason,
        }
    }
}

impl From<tokio::task::JoinError> for AggError {
    fn from(e: tokio::task::JoinError) -> Self {
        AggError::Task(e.to_string())
    }
}

/// Result type alias for aggregation operations
pub type Result<T> = std::result::Result<T, AggError>;
