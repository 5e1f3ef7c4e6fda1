//! Anchored regex tag patterns.
//!
//! # Responsibility
//! - Compile caller-supplied subscription patterns with anchored-at-start
//!   semantics.
//! - Build the canonical "literal subtag at a fixed position" matchstring.
//!
//! # Invariants
//! - Matching succeeds when the regex matches a prefix of the tag starting
//!   at offset zero; trailing tag content never disqualifies a match.
//! - A malformed pattern is rejected at compile time, never at dispatch.

use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Error for subscription patterns that do not compile.
#[derive(Debug, Clone)]
pub enum MatcherError {
    /// The pattern is not a valid regular expression.
    InvalidPattern { pattern: String, message: String },
}

impl Display for MatcherError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPattern { pattern, message } => {
                write!(f, "invalid match pattern `{pattern}`: {message}")
            }
        }
    }
}

impl Error for MatcherError {}

/// Builds a matchstring requiring a literal subtag at segment `position`
/// with all other segments unconstrained.
///
/// e.g. `subtag_matchstring(2, "Well")` → `([^|]+\|){2}Well.*`.
pub fn subtag_matchstring(position: usize, subtag: &str) -> String {
    format!(r"([^\|]+\|){{{position}}}{subtag}.*")
}

/// Compiles `pattern` for anchored-at-start matching.
pub fn compile_anchored(pattern: &str) -> Result<Regex, MatcherError> {
    Regex::new(&format!("^(?:{pattern})")).map_err(|err| MatcherError::InvalidPattern {
        pattern: pattern.to_string(),
        message: err.to_string(),
    })
}

/// Whether an anchored-compiled regex matches `tag`.
pub fn anchored_match(regex: &Regex, tag: &str) -> bool {
    regex.is_match(tag)
}
