//! Result and error types for Inkcheck.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for Inkcheck operations
pub type InkcheckResult<T> = Result<T, InkcheckError>;

/// Errors that can occur in Inkcheck
///
/// A dimension mismatch is deliberately absent: it is reported as a
/// [`crate::ComparisonResult`] with `matches == false`, never as an error.
#[derive(Debug, Error)]
pub enum InkcheckError {
    /// Screenshot capture failed (element never visible, or the driver rejected)
    #[error("Screenshot '{name}' could not be captured: {message}")]
    Capture {
        /// Normalized screenshot name
        name: String,
        /// Underlying cause
        message: String,
    },

    /// Baseline absent and auto-creation disabled
    #[error("Baseline not found and auto-create disabled: {}", path.display())]
    BaselineMissing {
        /// Expected baseline location
        path: PathBuf,
    },

    /// No actual screenshot exists for the requested name
    #[error("No actual screenshot to compare: {}", path.display())]
    ActualMissing {
        /// Expected actual location
        path: PathBuf,
    },

    /// Visual comparison did not match
    #[error("Visual mismatch for '{name}': {message}")]
    VisualMismatch {
        /// Screenshot name
        name: String,
        /// Human readable detail (percentage, dimensions, diff path)
        message: String,
    },

    /// Image could not be decoded
    #[error("Image decoding failed: {message}")]
    ImageDecode {
        /// Error message
        message: String,
    },

    /// Image could not be encoded
    #[error("Image encoding failed: {message}")]
    ImageEncode {
        /// Error message
        message: String,
    },

    /// Operation timed out
    #[error("Operation timed out after {ms}ms")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
    },

    /// Browser driver call failed
    #[error("Driver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// Invalid configuration
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl InkcheckError {
    /// Wrap any driver-level failure as a capture error for `name`
    #[must_use]
    pub fn capture(name: impl Into<String>, cause: &Self) -> Self {
        Self::Capture {
            name: name.into(),
            message: cause.to_string(),
        }
    }

    /// Create a driver error
    #[must_use]
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_wraps_cause() {
        let err = InkcheckError::capture("hero", &InkcheckError::Timeout { ms: 5000 });
        let text = err.to_string();
        assert!(text.contains("hero"));
        assert!(text.contains("5000ms"));
    }

    #[test]
    fn test_baseline_missing_message() {
        let err = InkcheckError::BaselineMissing {
            path: PathBuf::from("visual/baseline/chromium/home_hero.png"),
        };
        assert!(err.to_string().contains("auto-create disabled"));
        assert!(err.to_string().contains("home_hero.png"));
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: InkcheckError = io.into();
        assert!(matches!(err, InkcheckError::Io(_)));
    }
}
