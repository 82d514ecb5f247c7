//! Error types for the CLI

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Images differ
    #[error("Images differ: {message}")]
    Mismatch {
        /// Error message
        message: String,
    },

    /// Run report contains failures (`summary --strict`)
    #[error("Run failed: {message}")]
    RunFailed {
        /// Error message
        message: String,
    },

    /// Invalid argument
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Error message
        message: String,
    },

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Inkcheck library error
    #[error("Inkcheck error: {0}")]
    Inkcheck(#[from] inkcheck::InkcheckError),
}

impl CliError {
    /// Create a mismatch error
    #[must_use]
    pub fn mismatch(message: impl Into<String>) -> Self {
        Self::Mismatch {
            message: message.into(),
        }
    }

    /// Create a run-failed error
    #[must_use]
    pub fn run_failed(message: impl Into<String>) -> Self {
        Self::RunFailed {
            message: message.into(),
        }
    }

    /// Create an invalid argument error
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatch_error() {
        let err = CliError::mismatch("0.04% of pixels");
        assert!(err.to_string().contains("Images differ"));
        assert!(err.to_string().contains("0.04%"));
    }

    #[test]
    fn test_invalid_argument_error() {
        let err = CliError::invalid_argument("threshold out of range");
        assert!(err.to_string().contains("Invalid argument"));
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let cli_err: CliError = io_err.into();
        assert!(cli_err.to_string().contains("I/O"));
    }

    #[test]
    fn test_library_error_from() {
        let err: CliError = inkcheck::InkcheckError::config("browser name must not be empty").into();
        assert!(err.to_string().contains("browser name"));
    }
}
