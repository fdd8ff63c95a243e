//! Policy error types.

use thiserror::Error;

/// Errors raised while building a password policy.
///
/// A weak password is not an error: [`crate::PasswordPolicy::evaluate`]
/// simply returns `false`.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// The policy configuration is unusable.
    #[error("invalid policy configuration: {0}")]
    InvalidConfig(String),
}
