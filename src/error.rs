//! Error types for the Verdict library.
//!
//! All fallible operations return [`Result`], whose error side is the
//! [`VerdictError`] enum.
//!
//! # Examples
//!
//! ```
//! use verdict::error::{Result, VerdictError};
//!
//! fn example_operation() -> Result<()> {
//!     Err(VerdictError::invalid_input("review text is empty"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for Verdict operations.
#[derive(Error, Debug)]
pub enum VerdictError {
    /// I/O errors (artifact files, corpus files, terminal)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV decoding errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Analysis-related errors (invalid patterns, broken pipelines)
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Configuration values that cannot work together
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Caller supplied input that fails validation
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A component was used before it was fitted
    #[error("Model not trained: {0}")]
    ModelNotTrained(String),

    /// Training run could not produce any model
    #[error("Training error: {0}")]
    Training(String),

    /// An optimizer produced non-finite parameters
    #[error("Convergence failure: {0}")]
    Convergence(String),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with VerdictError.
pub type Result<T> = std::result::Result<T, VerdictError>;

impl VerdictError {
    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        VerdictError::Analysis(msg.into())
    }

    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        VerdictError::InvalidConfig(msg.into())
    }

    /// Create a new invalid input error.
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        VerdictError::InvalidInput(msg.into())
    }

    /// Create a new not-trained error.
    pub fn not_trained<S: Into<String>>(msg: S) -> Self {
        VerdictError::ModelNotTrained(msg.into())
    }

    /// Create a new training error.
    pub fn training<S: Into<String>>(msg: S) -> Self {
        VerdictError::Training(msg.into())
    }

    /// Create a new convergence error.
    pub fn convergence<S: Into<String>>(msg: S) -> Self {
        VerdictError::Convergence(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        VerdictError::Other(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = VerdictError::analysis("bad pattern");
        assert_eq!(error.to_string(), "Analysis error: bad pattern");

        let error = VerdictError::invalid_config("min_df must be positive");
        assert_eq!(
            error.to_string(),
            "Invalid configuration: min_df must be positive"
        );

        let error = VerdictError::training("all families failed");
        assert_eq!(error.to_string(), "Training error: all families failed");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let verdict_error = VerdictError::from(io_error);

        match verdict_error {
            VerdictError::Io(_) => {}
            _ => panic!("Expected IO error variant"),
        }
    }
}
