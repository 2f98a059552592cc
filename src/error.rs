//! Error types for the tasar serving pipeline
//!
//! One crate-level enum covers the full taxonomy: startup configuration
//! failures, per-request validation failures, internal assembly failures,
//! and model invocation failures. Display output is the exact message the
//! HTTP layer surfaces to callers, so variants format themselves fully.

use thiserror::Error;

/// Error type for all tasar operations
#[derive(Debug, Error)]
pub enum TasarError {
    /// Startup artifact (schema or model) missing, unreadable, or malformed.
    /// Fatal: the process refuses to start without a complete schema and model.
    #[error("{reason}")]
    Config {
        /// What went wrong during startup
        reason: String,
    },

    /// A request record failed presence checks or type/value coercion
    #[error("{message}")]
    Validation {
        /// Caller-facing message, already formatted with the record index
        message: String,
    },

    /// Validated records could not be assembled into a feature table.
    /// Internal-consistency failure; validation should have caught the cause.
    #[error("Invalid input format: {detail}")]
    Assembly {
        /// Description of the structural anomaly
        detail: String,
    },

    /// The model rejected the assembled feature table
    #[error("Prediction failed: {reason}")]
    Prediction {
        /// Underlying model error message
        reason: String,
    },

    /// Request body was not parsable JSON or had the wrong top-level shape
    #[error("{message}")]
    MalformedRequest {
        /// Caller-facing message
        message: String,
    },
}

impl TasarError {
    /// Build a validation error from a formatted message
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Build a startup configuration error
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }
}

/// Result alias using [`TasarError`]
pub type Result<T> = std::result::Result<T, TasarError>;
