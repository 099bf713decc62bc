//! `StringMatchSpec`: string conditions as written in configuration
//!
//! This type is the operator's *intent* ("prefix match on /api"). It compiles
//! to the runtime [`StringMatcher`] at table construction, where pattern
//! limits and regex syntax are checked once.
//!
//! - [`StringMatchSpec`] = what the config says
//! - [`StringMatcher`] = what evaluates at match time

use crate::{
    ConfigError, DataInput, Predicate, SinglePredicate, StringMatcher, MAX_PATTERN_LENGTH,
    MAX_REGEX_PATTERN_LENGTH,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A string condition as written in configuration.
///
/// Serialized externally tagged, e.g. `{ "prefix": "/api" }` or
/// `{ "safe_regex": "^/v[0-9]+/" }`.
///
/// # Example
///
/// ```
/// use routa::StringMatchSpec;
///
/// let spec = StringMatchSpec::Prefix("/api".into());
/// let matcher = spec.compile(false).unwrap();
/// assert!(matcher.matches_str("/api/users"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StringMatchSpec {
    /// Exact string equality.
    Exact(String),
    /// String starts with prefix.
    Prefix(String),
    /// String ends with suffix.
    Suffix(String),
    /// String contains substring.
    Contains(String),
    /// Full-string regular expression (Rust `regex` syntax, linear time).
    SafeRegex(String),
}

impl StringMatchSpec {
    /// Compile into a runtime [`StringMatcher`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::PatternTooLong`] if the pattern exceeds its limit,
    /// or [`ConfigError::InvalidPattern`] if the regex does not compile.
    pub fn compile(&self, ignore_case: bool) -> Result<StringMatcher, ConfigError> {
        match self {
            Self::Exact(v) => literal(v).map(|v| StringMatcher::exact(v, ignore_case)),
            Self::Prefix(v) => literal(v).map(|v| StringMatcher::prefix(v, ignore_case)),
            Self::Suffix(v) => literal(v).map(|v| StringMatcher::suffix(v, ignore_case)),
            Self::Contains(v) => literal(v).map(|v| StringMatcher::contains(v, ignore_case)),
            Self::SafeRegex(v) => {
                check_regex_len(v)?;
                let pattern = if ignore_case {
                    format!("(?i){v}")
                } else {
                    v.clone()
                };
                StringMatcher::regex(&pattern).map_err(|e| invalid_pattern(v, &e))
            }
        }
    }

    /// Compile into a [`Predicate`] over the given [`DataInput`].
    ///
    /// # Errors
    ///
    /// Same as [`compile()`](Self::compile).
    pub fn to_predicate<Ctx: 'static>(
        &self,
        input: Box<dyn DataInput<Ctx>>,
        ignore_case: bool,
    ) -> Result<Predicate<Ctx>, ConfigError> {
        let matcher = self.compile(ignore_case)?;
        Ok(Predicate::Single(SinglePredicate::new(
            input,
            Box::new(matcher),
        )))
    }
}

impl fmt::Display for StringMatchSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(v) => write!(f, "Exact(\"{v}\")"),
            Self::Prefix(v) => write!(f, "Prefix(\"{v}\")"),
            Self::Suffix(v) => write!(f, "Suffix(\"{v}\")"),
            Self::Contains(v) => write!(f, "Contains(\"{v}\")"),
            Self::SafeRegex(v) => write!(f, "SafeRegex(\"{v}\")"),
        }
    }
}

fn literal(value: &str) -> Result<&str, ConfigError> {
    if value.len() > MAX_PATTERN_LENGTH {
        return Err(ConfigError::PatternTooLong {
            len: value.len(),
            max: MAX_PATTERN_LENGTH,
        });
    }
    Ok(value)
}

fn check_regex_len(pattern: &str) -> Result<(), ConfigError> {
    if pattern.len() > MAX_REGEX_PATTERN_LENGTH {
        return Err(ConfigError::PatternTooLong {
            len: pattern.len(),
            max: MAX_REGEX_PATTERN_LENGTH,
        });
    }
    Ok(())
}

fn invalid_pattern(pattern: &str, err: &regex::Error) -> ConfigError {
    ConfigError::InvalidPattern {
        pattern: pattern.to_owned(),
        reason: err.to_string(),
    }
}

/// Compile an unanchored regex used for rewriting, after the length check.
pub(crate) fn compile_rewrite_regex(pattern: &str) -> Result<regex::Regex, ConfigError> {
    check_regex_len(pattern)?;
    regex::Regex::new(pattern).map_err(|e| invalid_pattern(pattern, &e))
}

/// Compile a full-string regex, after the length check.
pub(crate) fn compile_full_regex(pattern: &str) -> Result<StringMatcher, ConfigError> {
    check_regex_len(pattern)?;
    StringMatcher::regex(pattern).map_err(|e| invalid_pattern(pattern, &e))
}
