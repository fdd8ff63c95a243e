//! # Vigil Sanitize
//!
//! Defensive sanitization of untrusted text (comments, form fields).
//!
//! Processing order:
//!
//! 1. Reject input longer than `max_length` characters.
//! 2. HTML-escape the text.
//! 3. Scan the escaped text, and the same text with character references
//!    decoded, for forbidden patterns (ASCII case-insensitive). Any match
//!    rejects the whole submission.
//!
//! Scanning after escaping means encoded variants such as `&lt;script` or
//! `&#60;script` are caught along with the raw `<script`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
mod escape;

pub use error::SanitizeError;
pub use escape::escape_html;

use tracing::{debug, warn};

/// Maximum input length of the reference configuration, in characters.
pub const DEFAULT_MAX_LENGTH: usize = 500;

/// Forbidden patterns of the reference configuration.
pub const DEFAULT_FORBIDDEN_PATTERNS: &[&str] = &["http://", "https://", "<script"];

/// Sanitizer limits and blocklist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizerConfig {
    /// Longest accepted input, in characters.
    pub max_length: usize,
    /// Substrings that reject the input wherever they appear.
    pub forbidden_patterns: Vec<String>,
}

impl Default for SanitizerConfig {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_LENGTH,
            forbidden_patterns: DEFAULT_FORBIDDEN_PATTERNS
                .iter()
                .map(|p| p.to_string())
                .collect(),
        }
    }
}

impl SanitizerConfig {
    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), SanitizeError> {
        if self.max_length == 0 {
            return Err(SanitizeError::InvalidConfig(
                "max_length must be > 0".to_string(),
            ));
        }
        if self.forbidden_patterns.iter().any(|p| p.is_empty()) {
            return Err(SanitizeError::InvalidConfig(
                "forbidden patterns cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Text that passed sanitization. Only [`Sanitizer`] constructs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedText(String);

impl SanitizedText {
    /// Returns the escaped text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for SanitizedText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SanitizedText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Escapes and blocklist-filters untrusted text.
#[derive(Debug, Clone)]
pub struct Sanitizer {
    config: SanitizerConfig,
    needles: Vec<String>,
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::build(SanitizerConfig::default())
    }
}

impl Sanitizer {
    /// Creates a sanitizer from a validated configuration.
    pub fn new(config: SanitizerConfig) -> Result<Self, SanitizeError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: SanitizerConfig) -> Self {
        let needles = config
            .forbidden_patterns
            .iter()
            .map(|p| p.to_ascii_lowercase())
            .collect();
        Self { config, needles }
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &SanitizerConfig {
        &self.config
    }

    /// Sanitizes `raw`.
    ///
    /// # Errors
    ///
    /// Returns [`SanitizeError::RejectedInput`] if the input is too long or
    /// contains a forbidden pattern after escaping.
    pub fn sanitize(&self, raw: &str) -> Result<SanitizedText, SanitizeError> {
        let len = raw.chars().count();
        if len > self.config.max_length {
            warn!(len, max = self.config.max_length, "input rejected: too long");
            return Err(SanitizeError::rejected(format!(
                "input exceeds maximum length of {} characters",
                self.config.max_length
            )));
        }

        let escaped = escape_html(raw);

        let views = [
            escaped.to_ascii_lowercase(),
            escape::decode_references(&escaped).to_ascii_lowercase(),
        ];
        for (needle, pattern) in self.needles.iter().zip(&self.config.forbidden_patterns) {
            if views.iter().any(|view| view.contains(needle.as_str())) {
                warn!(pattern = %pattern, "input rejected: forbidden content");
                return Err(SanitizeError::rejected(format!(
                    "forbidden content: {:?} is not allowed",
                    pattern
                )));
            }
        }

        debug!(len, "input sanitized");
        Ok(SanitizedText(escaped))
    }
}

/// Sanitizes `raw` with the reference configuration.
pub fn sanitize(raw: &str) -> Result<SanitizedText, SanitizeError> {
    Sanitizer::default().sanitize(raw)
}
