//! `InputMatcher`: Domain-agnostic value matching
//!
//! `InputMatcher` is intentionally **non-generic**: the same [`StringMatcher`]
//! serves path matching, header matching and query-parameter matching.
//!
//! # Available Matchers
//!
//! - [`StringMatcher`]: exact / prefix / suffix / contains / regex, optionally case-insensitive
//! - [`PresentMatcher`]: matches whenever the input produced a value

use crate::MatchingData;
use std::fmt::{self, Debug};

/// Matches against erased [`MatchingData`].
///
/// All implementations must be `Send + Sync`; compiled matchers live inside a
/// shared, immutable route table.
///
/// # Example
///
/// ```
/// use routa::{InputMatcher, MatchingData, StringMatcher};
///
/// let matcher = StringMatcher::exact("hello", false);
/// assert!(matcher.matches(&MatchingData::Str("hello")));
/// assert!(!matcher.matches(&MatchingData::Str("world")));
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `InputMatcher`",
    label = "this type cannot match against MatchingData",
    note = "use StringMatcher or PresentMatcher, or implement `matches(&self, &MatchingData) -> bool`"
)]
pub trait InputMatcher: Send + Sync + Debug {
    /// Check if the given value matches.
    fn matches(&self, value: &MatchingData<'_>) -> bool;
}

#[diagnostic::do_not_recommend]
impl InputMatcher for Box<dyn InputMatcher> {
    fn matches(&self, value: &MatchingData<'_>) -> bool {
        (**self).matches(value)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// StringMatcher
// ═══════════════════════════════════════════════════════════════════════════════

/// Unified string matcher.
///
/// Regex matching is a **full-string** match: the pattern is anchored at
/// compile time, so `/api/\d+` does not match `/api/12/extra`.
///
/// # Example
///
/// ```
/// use routa::{InputMatcher, MatchingData, StringMatcher};
///
/// // Case-insensitive prefix match
/// let matcher = StringMatcher::prefix("/API/", true);
/// assert!(matcher.matches(&"/api/users".into()));
///
/// // Regex match (full string)
/// let matcher = StringMatcher::regex(r"user-\d+").unwrap();
/// assert!(matcher.matches(&"user-123".into()));
/// assert!(!matcher.matches(&"user-123-x".into()));
/// ```
#[derive(Clone)]
pub enum StringMatcher {
    /// Exact string equality.
    Exact { value: String, ignore_case: bool },
    /// String prefix match.
    Prefix { value: String, ignore_case: bool },
    /// String suffix match.
    Suffix { value: String, ignore_case: bool },
    /// Substring contains match.
    Contains { value: String, ignore_case: bool },
    /// Anchored regular expression. `source` keeps the pattern as written.
    Regex {
        source: String,
        regex: regex::Regex,
    },
}

impl StringMatcher {
    /// Create an exact match.
    #[must_use]
    pub fn exact(value: impl Into<String>, ignore_case: bool) -> Self {
        Self::Exact {
            value: value.into(),
            ignore_case,
        }
    }

    /// Create a prefix match.
    #[must_use]
    pub fn prefix(value: impl Into<String>, ignore_case: bool) -> Self {
        Self::Prefix {
            value: value.into(),
            ignore_case,
        }
    }

    /// Create a suffix match.
    #[must_use]
    pub fn suffix(value: impl Into<String>, ignore_case: bool) -> Self {
        Self::Suffix {
            value: value.into(),
            ignore_case,
        }
    }

    /// Create a contains match.
    ///
    /// When `ignore_case` is true, the pattern is pre-lowercased here so each
    /// match only lowercases the input.
    #[must_use]
    pub fn contains(value: impl Into<String>, ignore_case: bool) -> Self {
        let value = value.into();
        Self::Contains {
            value: if ignore_case {
                value.to_ascii_lowercase()
            } else {
                value
            },
            ignore_case,
        }
    }

    /// Create a full-string regex match.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the regex pattern is invalid.
    pub fn regex(pattern: &str) -> Result<Self, regex::Error> {
        regex::Regex::new(&format!("^(?:{pattern})$")).map(|regex| Self::Regex {
            source: pattern.to_owned(),
            regex,
        })
    }

    /// Match a plain string. Shared by [`InputMatcher::matches`] and callers
    /// that already hold a `&str`.
    #[must_use]
    pub fn matches_str(&self, input: &str) -> bool {
        match self {
            Self::Exact { value, ignore_case } => {
                if *ignore_case {
                    input.eq_ignore_ascii_case(value)
                } else {
                    input == value
                }
            }
            Self::Prefix { value, ignore_case } => {
                if *ignore_case {
                    input
                        .get(..value.len())
                        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(value))
                } else {
                    input.starts_with(value.as_str())
                }
            }
            Self::Suffix { value, ignore_case } => {
                if *ignore_case {
                    input
                        .len()
                        .checked_sub(value.len())
                        .and_then(|start| input.get(start..))
                        .is_some_and(|suffix| suffix.eq_ignore_ascii_case(value))
                } else {
                    input.ends_with(value.as_str())
                }
            }
            Self::Contains { value, ignore_case } => {
                if *ignore_case {
                    input.to_ascii_lowercase().contains(value.as_str())
                } else {
                    input.contains(value.as_str())
                }
            }
            Self::Regex { regex, .. } => regex.is_match(input),
        }
    }
}

impl InputMatcher for StringMatcher {
    fn matches(&self, value: &MatchingData<'_>) -> bool {
        value.as_str().is_some_and(|s| self.matches_str(s))
    }
}

impl Debug for StringMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact { value, ignore_case } => {
                write!(f, "Exact({value:?}, ignore_case={ignore_case})")
            }
            Self::Prefix { value, ignore_case } => {
                write!(f, "Prefix({value:?}, ignore_case={ignore_case})")
            }
            Self::Suffix { value, ignore_case } => {
                write!(f, "Suffix({value:?}, ignore_case={ignore_case})")
            }
            Self::Contains { value, ignore_case } => {
                write!(f, "Contains({value:?}, ignore_case={ignore_case})")
            }
            Self::Regex { source, .. } => write!(f, "Regex({source:?})"),
        }
    }
}

/// Matches any present value.
///
/// Used for `present_match` header and query-parameter matchers: the
/// predicate fails only when the input returns [`MatchingData::None`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PresentMatcher;

impl InputMatcher for PresentMatcher {
    fn matches(&self, value: &MatchingData<'_>) -> bool {
        !value.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_is_case_sensitive_by_default() {
        let m = StringMatcher::exact("hello", false);
        assert!(m.matches(&"hello".into()));
        assert!(!m.matches(&"Hello".into()));
        assert!(!m.matches(&"hello ".into()));
    }

    #[test]
    fn exact_ignore_case() {
        let m = StringMatcher::exact("hello", true);
        assert!(m.matches(&"HeLLo".into()));
    }

    #[test]
    fn prefix_ignore_case_handles_short_input() {
        let m = StringMatcher::prefix("/API/", true);
        assert!(m.matches(&"/api/users".into()));
        assert!(!m.matches(&"/ap".into()));
    }

    #[test]
    fn suffix_and_contains() {
        assert!(StringMatcher::suffix(".json", false).matches(&"a.json".into()));
        assert!(!StringMatcher::suffix(".json", false).matches(&"a.xml".into()));
        assert!(StringMatcher::contains("ERR", true).matches(&"an error".into()));
    }

    #[test]
    fn regex_is_anchored() {
        let m = StringMatcher::regex(r"/users/\d+").unwrap();
        assert!(m.matches(&"/users/42".into()));
        assert!(!m.matches(&"/users/42/posts".into()));
        assert!(!m.matches(&"/v1/users/42".into()));
    }

    #[test]
    fn regex_alternation_stays_anchored() {
        let m = StringMatcher::regex("a|b").unwrap();
        assert!(m.matches(&"a".into()));
        assert!(!m.matches(&"ab".into()));
    }

    #[test]
    fn invalid_regex_errors() {
        assert!(StringMatcher::regex("[bad").is_err());
    }

    #[test]
    fn none_never_matches_string_matcher() {
        assert!(!StringMatcher::prefix("", false).matches(&MatchingData::None));
    }

    #[test]
    fn present_matcher() {
        assert!(PresentMatcher.matches(&"".into()));
        assert!(!PresentMatcher.matches(&MatchingData::None));
    }

    #[test]
    fn regex_debug_shows_source() {
        let m = StringMatcher::regex("^mcp").unwrap();
        assert_eq!(format!("{m:?}"), r#"Regex("^mcp")"#);
    }
}
