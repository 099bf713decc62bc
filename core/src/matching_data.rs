//! `MatchingData`: Erased value that flows between `DataInput` and `InputMatcher`
//!
//! Route predicates look at strings pulled out of a request (the path, a header,
//! a query parameter). The data borrows from the request, so evaluation never
//! allocates on the hot path.

/// The erased data type that flows between `DataInput` and `InputMatcher`.
///
/// # Variants
///
/// - `None`: The input had nothing to extract (missing header, absent parameter)
/// - `Str`: A string borrowed from the request
///
/// # Example
///
/// ```
/// use routa::MatchingData;
///
/// let data = MatchingData::Str("/api");
/// assert_eq!(data.as_str(), Some("/api"));
/// assert!(MatchingData::None.is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchingData<'a> {
    /// No data available.
    /// A predicate that receives this evaluates to `false`.
    None,

    /// String data borrowed from the request.
    Str(&'a str),
}

impl<'a> MatchingData<'a> {
    /// Returns `true` if this is the `None` variant.
    #[inline]
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Returns the string value, if any.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            Self::Str(s) => Some(s),
            Self::None => None,
        }
    }
}

impl<'a> From<&'a str> for MatchingData<'a> {
    fn from(s: &'a str) -> Self {
        Self::Str(s)
    }
}

impl<'a> From<Option<&'a str>> for MatchingData<'a> {
    fn from(value: Option<&'a str>) -> Self {
        value.map_or(Self::None, Self::Str)
    }
}
