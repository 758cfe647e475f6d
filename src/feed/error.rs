//! Feed-specific error types.

use thiserror::Error;

/// Errors that can occur while parsing a stats feed.
#[derive(Debug, Error)]
pub enum FeedError {
    /// No parsable header line.
    #[error("invalid stats data: no header line found")]
    InvalidFeed,

    /// Header present but zero data records.
    #[error("no stats data found")]
    NoData,

    /// Header field outside the safe identifier character class.
    #[error("illegal column name: {0:?}")]
    IllegalColumnName(String),

    /// Data record narrower than the header.
    #[error("line {line}: expected {expected} fields, found {found}")]
    ShortRow {
        line: u64,
        expected: usize,
        found: usize,
    },

    /// Malformed record (bad quoting, invalid UTF-8).
    #[error("malformed stats record: {0}")]
    Csv(#[from] csv::Error),
}
