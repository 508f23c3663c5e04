//! Sub-path validation.

use regex::Regex;

use super::error::ProxyError;

/// Pattern that accepts every sub-path.
pub const MATCH_ANY: &str = ".*";

/// Checks requested sub-paths against a configured regular expression.
///
/// The pattern is searched, not anchored: `^/api/` must be written out if
/// the whole path should be constrained.
#[derive(Debug, Clone)]
pub struct PathValidator {
    pattern: Regex,
}

impl PathValidator {
    pub fn new(pattern: &str) -> Result<Self, ProxyError> {
        let compiled = Regex::new(pattern).map_err(|source| ProxyError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self { pattern: compiled })
    }

    pub fn permits(&self, sub_path: &str) -> bool {
        self.pattern.is_match(sub_path)
    }

    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }
}

impl Default for PathValidator {
    fn default() -> Self {
        Self {
            pattern: Regex::new(MATCH_ANY).expect("match-any pattern compiles"),
        }
    }
}
