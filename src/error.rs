//! Error taxonomy for datadash operations.
//!
//! Every failure is local to the action that triggered it: a load, a merge,
//! or a recompute either succeeds completely or returns one of these errors
//! and leaves the session untouched.
//!
//! ```
//! use datadash::error::DashError;
//!
//! fn report(err: &DashError) -> String {
//!     match err {
//!         DashError::RowCountMismatch { source, .. } => format!("cannot align {source}"),
//!         DashError::Type(msg) => format!("wrong column type: {msg}"),
//!         other => other.to_string(),
//!     }
//! }
//! ```
//!
//! The `ResultExt` trait adds `.context()` to any result whose error converts
//! into [`DashError`]:
//!
//! ```no_run
//! use datadash::error::ResultExt as _;
//!
//! fn read_upload(path: &str) -> datadash::error::Result<Vec<u8>> {
//!     std::fs::read(path).context("Failed to read upload")
//! }
//! ```

use std::fmt;

/// Main error type for datadash operations.
#[derive(Debug)]
pub enum DashError {
    /// Origin content could not be parsed into a table
    Format(String),

    /// Relational origin is unreachable
    Connection(String),

    /// Named table does not exist in the relational origin
    NotFound(String),

    /// A transform was requested on a column of the wrong type
    Type(String),

    /// Merge sources do not share a row count
    RowCountMismatch {
        source: String,
        expected: usize,
        found: usize,
    },

    /// Unknown column, unknown source, empty selection or invalid bounds
    InvalidSelection(String),

    /// Polars computation errors
    DataProcessing(String),

    /// Configuration errors
    Config(String),

    /// I/O errors
    Io(std::io::Error),

    /// Generic error with context
    Other(String),
}

impl fmt::Display for DashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Format(msg) => write!(f, "Format error: {msg}"),
            Self::Connection(msg) => write!(f, "Connection error: {msg}"),
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
            Self::Type(msg) => write!(f, "Type error: {msg}"),
            Self::RowCountMismatch {
                source,
                expected,
                found,
            } => write!(
                f,
                "Row count mismatch: '{source}' has {found} rows, expected {expected}"
            ),
            Self::InvalidSelection(msg) => write!(f, "Invalid selection: {msg}"),
            Self::DataProcessing(msg) => write!(f, "Data processing error: {msg}"),
            Self::Config(msg) => write!(f, "Configuration error: {msg}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for DashError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for DashError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<anyhow::Error> for DashError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

impl From<serde_json::Error> for DashError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(format!("JSON error: {err}"))
    }
}

impl From<polars::error::PolarsError> for DashError {
    fn from(err: polars::error::PolarsError) -> Self {
        Self::DataProcessing(err.to_string())
    }
}

impl From<sqlx::Error> for DashError {
    fn from(err: sqlx::Error) -> Self {
        Self::Connection(err.to_string())
    }
}

impl From<DashError> for String {
    fn from(err: DashError) -> Self {
        err.to_string()
    }
}

/// Result type alias for datadash operations.
pub type Result<T> = std::result::Result<T, DashError>;

/// Extension trait to add context to results.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, msg: impl Into<String>) -> Result<T>;

    /// Add context using a closure (lazy evaluation).
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<DashError>,
{
    fn context(self, msg: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err: DashError = e.into();
            DashError::Other(format!("{}: {}", msg.into(), err))
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err: DashError = e.into();
            DashError::Other(format!("{}: {}", f(), err))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DashError::Type("'city' is not numeric".to_owned());
        assert_eq!(err.to_string(), "Type error: 'city' is not numeric");
    }

    #[test]
    fn test_row_count_mismatch_display() {
        let err = DashError::RowCountMismatch {
            source: "orders".to_owned(),
            expected: 10,
            found: 12,
        };
        assert_eq!(
            err.to_string(),
            "Row count mismatch: 'orders' has 12 rows, expected 10"
        );
    }

    #[test]
    fn test_error_conversion_to_string() {
        let err = DashError::NotFound("table 'ghost'".to_owned());
        let s: String = err.into();
        assert_eq!(s, "Not found: table 'ghost'");
    }

    #[test]
    fn test_result_context() {
        let result: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "file.csv",
        ));

        let result: Result<()> = result.context("Failed to open upload");
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to open upload")
        );
    }
}
