use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Fatal failures. Any of these aborts the run before output is written.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when the authority table cannot be decoded as CSV.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Raised when an authority row lacks the advertiser or authority column.
    #[error("malformed authority row at line {line}: expected at least 2 fields, found {fields}")]
    MalformedAuthority { line: u64, fields: usize },

    /// Raised when the user provides a file path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when the fragment directory does not exist or is not a directory.
    #[error("fragment directory not found: {0}")]
    MissingDirectory(PathBuf),

    /// Raised when a single fragment file cannot be opened or read.
    #[error("failed to read fragment {path}: {source}")]
    Fragment {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

/// Recoverable failure for a single fragment line. The line is skipped and
/// reported, processing continues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed parsing line")]
pub struct RowError {
    /// Number of comma separated fields that were found.
    pub fields: usize,
}
