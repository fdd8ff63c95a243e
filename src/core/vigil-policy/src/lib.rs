//! # Vigil Policy
//!
//! Password strength policy engine.
//!
//! A candidate is secure when every rule holds:
//!
//! - at least `min_length` characters (default 8)
//! - no whitespace
//! - at least one ASCII uppercase letter, one ASCII lowercase letter and one
//!   ASCII digit
//! - at least one symbol from the allow-list (default `@$!%*?&`)
//!
//! Characters outside the allow-list never count as symbols. Evaluation is
//! pure, so a single [`PasswordPolicy`] can be shared across threads.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;

pub use error::PolicyError;

use tracing::debug;

/// Minimum length of the reference policy.
pub const DEFAULT_MIN_LENGTH: usize = 8;

/// Symbol allow-list of the reference policy.
pub const DEFAULT_SYMBOLS: &str = "@$!%*?&";

/// Outcome of each rule for one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyReport {
    /// Long enough.
    pub min_length: bool,
    /// Contains no whitespace.
    pub no_whitespace: bool,
    /// Contains an uppercase letter.
    pub has_upper: bool,
    /// Contains a lowercase letter.
    pub has_lower: bool,
    /// Contains a digit.
    pub has_digit: bool,
    /// Contains an allowed symbol.
    pub has_symbol: bool,
}

impl PolicyReport {
    /// Returns `true` when every rule holds.
    pub fn is_secure(&self) -> bool {
        self.min_length
            && self.no_whitespace
            && self.has_upper
            && self.has_lower
            && self.has_digit
            && self.has_symbol
    }

    /// Names of the rules that failed, in a stable order.
    pub fn failures(&self) -> Vec<&'static str> {
        [
            (self.min_length, "min_length"),
            (self.no_whitespace, "no_whitespace"),
            (self.has_upper, "uppercase"),
            (self.has_lower, "lowercase"),
            (self.has_digit, "digit"),
            (self.has_symbol, "symbol"),
        ]
        .into_iter()
        .filter_map(|(ok, name)| (!ok).then_some(name))
        .collect()
    }
}

/// A fixed password strength policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordPolicy {
    min_length: usize,
    symbols: Vec<char>,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: DEFAULT_MIN_LENGTH,
            symbols: normalize_symbols(DEFAULT_SYMBOLS),
        }
    }
}

impl PasswordPolicy {
    /// Creates a policy with a custom minimum length and symbol allow-list.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::InvalidConfig`] if `min_length` is zero, the
    /// allow-list is empty, or it holds anything but ASCII punctuation.
    pub fn new(min_length: usize, symbols: &str) -> Result<Self, PolicyError> {
        if min_length == 0 {
            return Err(PolicyError::InvalidConfig(
                "min_length must be > 0".to_string(),
            ));
        }
        if symbols.is_empty() {
            return Err(PolicyError::InvalidConfig(
                "symbol allow-list cannot be empty".to_string(),
            ));
        }
        if let Some(c) = symbols.chars().find(|c| !c.is_ascii_punctuation()) {
            return Err(PolicyError::InvalidConfig(format!(
                "symbol allow-list may only contain ASCII punctuation, found {:?}",
                c
            )));
        }

        Ok(Self {
            min_length,
            symbols: normalize_symbols(symbols),
        })
    }

    /// Minimum number of characters.
    pub fn min_length(&self) -> usize {
        self.min_length
    }

    /// The allowed symbols as a string.
    pub fn symbols(&self) -> String {
        self.symbols.iter().collect()
    }

    /// Evaluates every rule against `candidate`.
    pub fn check(&self, candidate: &str) -> PolicyReport {
        let mut report = PolicyReport {
            min_length: candidate.chars().count() >= self.min_length,
            no_whitespace: true,
            has_upper: false,
            has_lower: false,
            has_digit: false,
            has_symbol: false,
        };

        for c in candidate.chars() {
            if c.is_whitespace() {
                report.no_whitespace = false;
            } else if c.is_ascii_uppercase() {
                report.has_upper = true;
            } else if c.is_ascii_lowercase() {
                report.has_lower = true;
            } else if c.is_ascii_digit() {
                report.has_digit = true;
            } else if self.symbols.contains(&c) {
                report.has_symbol = true;
            }
        }

        report
    }

    /// Returns `true` if `candidate` satisfies the policy.
    pub fn evaluate(&self, candidate: &str) -> bool {
        let report = self.check(candidate);
        let secure = report.is_secure();
        if !secure {
            debug!(failed = ?report.failures(), "password rejected by policy");
        }
        secure
    }
}

fn normalize_symbols(symbols: &str) -> Vec<char> {
    let mut symbols: Vec<char> = symbols.chars().collect();
    symbols.sort_unstable();
    symbols.dedup();
    symbols
}
