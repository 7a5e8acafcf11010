//! Error types for sleepstat
//!
//! This module defines the error types used throughout the sleepstat library.
//! All errors are derived from `thiserror` for convenient error handling
//! and automatic `From` implementations.
//!
//! The reconstruction engine itself is infallible: malformed intervals are
//! dropped and missing data simply produces an empty result. Errors only
//! arise at the edges (loading exports, parsing arguments, validating
//! configuration).
//!
//! # Example
//!
//! ```
//! use sleepstat_core::error::{SleepstatError, Result};
//!
//! fn example_function() -> Result<()> {
//!     // This will automatically convert io::Error to SleepstatError
//!     let _file = std::fs::read_to_string("nonexistent.jsonl")?;
//!     Ok(())
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for sleepstat operations
#[derive(Error, Debug)]
pub enum SleepstatError {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// No sleep data files were found in any searched location
    #[error("No sleep data found (searched: {0})")]
    NoDataFound(String),

    /// Invalid date format
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    /// Invalid timezone
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    /// Parse error with file context
    #[error("Parse error in {file}: {error}")]
    Parse {
        /// The file that caused the error
        file: PathBuf,
        /// The error message
        error: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Convenience type alias for Results in sleepstat
///
/// ```
/// use sleepstat_core::Result;
///
/// fn hours_slept() -> Result<f64> {
///     Ok(7.5)
/// }
/// ```
pub type Result<T> = std::result::Result<T, SleepstatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = SleepstatError::NoDataFound("/tmp/sleep".to_string());
        assert_eq!(error.to_string(), "No sleep data found (searched: /tmp/sleep)");

        let error = SleepstatError::Config("gap threshold must be positive".to_string());
        assert_eq!(
            error.to_string(),
            "Configuration error: gap threshold must be positive"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let sleepstat_error: SleepstatError = io_error.into();
        assert!(matches!(sleepstat_error, SleepstatError::Io(_)));
    }

    #[test]
    fn test_parse_error_display() {
        let error = SleepstatError::Parse {
            file: PathBuf::from("export.json"),
            error: "expected array".to_string(),
        };
        assert_eq!(error.to_string(), "Parse error in export.json: expected array");
    }
}
