//! Sanitizer error types.

use thiserror::Error;

/// Errors that can occur while sanitizing input.
#[derive(Debug, Error)]
pub enum SanitizeError {
    /// The submission was rejected as a whole. The reason names the rule
    /// that fired and never echoes the input.
    #[error("rejected input: {reason}")]
    RejectedInput {
        /// Human-readable reason.
        reason: String,
    },

    /// The sanitizer configuration is unusable.
    #[error("invalid sanitizer configuration: {0}")]
    InvalidConfig(String),
}

impl SanitizeError {
    pub(crate) fn rejected(reason: impl Into<String>) -> Self {
        Self::RejectedInput {
            reason: reason.into(),
        }
    }
}
