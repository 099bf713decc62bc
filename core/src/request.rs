//! Request attributes: the per-lookup input to the matching engine.
//!
//! A [`RequestAttributes`] is what the HTTP codec (or the verification
//! harness) hands to [`RouteTable::route`](crate::RouteTable::route). It
//! exposes a header view with the pseudo-headers a route can match on:
//!
//! | Header | Value |
//! |--------|-------|
//! | `:authority` / `host` | authority |
//! | `:path` | path, query included |
//! | `:method` | method |
//! | `:scheme` / `x-forwarded-proto` | `https` when secure, else `http` |
//! | `x-envoy-internal` | `true` when the internal flag is set |
//!
//! Additional headers follow; lookup is case-insensitive on names.

use crate::{DataInput, MatchingData};

/// Header name for the internal-origin flag.
pub const INTERNAL_HEADER: &str = "x-envoy-internal";

/// Attributes of a single inbound request.
#[derive(Debug, Clone)]
pub struct RequestAttributes {
    authority: String,
    path: String,
    method: String,
    secure: bool,
    internal: bool,
    headers: Vec<(String, String)>,
    random_value: u64,
    active_runtime_key: Option<String>,
}

impl Default for RequestAttributes {
    fn default() -> Self {
        Self {
            authority: String::new(),
            path: String::new(),
            method: "GET".to_owned(),
            secure: false,
            internal: false,
            headers: Vec::new(),
            random_value: 0,
            active_runtime_key: None,
        }
    }
}

impl RequestAttributes {
    /// Create a builder. The method defaults to `GET`.
    #[must_use]
    pub fn builder() -> RequestAttributesBuilder {
        RequestAttributesBuilder::default()
    }

    /// The `:authority` value as received.
    #[must_use]
    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// The full `:path`, query string included.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The path with any query string removed.
    #[must_use]
    pub fn path_without_query(&self) -> &str {
        split_query(&self.path).0
    }

    /// The HTTP method.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Whether the request arrived over TLS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.secure
    }

    /// Whether the request originated inside the mesh.
    #[must_use]
    pub fn is_internal(&self) -> bool {
        self.internal
    }

    /// `https` or `http`, from the secure flag.
    #[must_use]
    pub fn scheme(&self) -> &'static str {
        if self.secure {
            "https"
        } else {
            "http"
        }
    }

    /// The caller-supplied random value used for weighted and runtime decisions.
    #[must_use]
    pub fn random_value(&self) -> u64 {
        self.random_value
    }

    /// The active runtime key, used only by the harness's runtime mock.
    #[must_use]
    pub fn active_runtime_key(&self) -> Option<&str> {
        self.active_runtime_key.as_deref()
    }

    /// The additional (non-pseudo) headers, names lowercased.
    #[must_use]
    pub fn additional_headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Look up a header in the request's header view (case-insensitive name).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        if name.eq_ignore_ascii_case(":authority") || name.eq_ignore_ascii_case("host") {
            return Some(&self.authority);
        }
        if name.eq_ignore_ascii_case(":path") {
            return Some(&self.path);
        }
        if name.eq_ignore_ascii_case(":method") {
            return Some(&self.method);
        }
        if name.eq_ignore_ascii_case(":scheme") || name.eq_ignore_ascii_case("x-forwarded-proto") {
            return Some(self.scheme());
        }
        if self.internal && name.eq_ignore_ascii_case(INTERNAL_HEADER) {
            return Some("true");
        }
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Look up a query parameter by exact name.
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<&str> {
        split_query(&self.path).1?.split('&').find_map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (key == name).then_some(value)
        })
    }

    /// Snapshot the header view into a mutable [`HeaderMap`].
    #[must_use]
    pub fn to_header_map(&self) -> HeaderMap {
        let mut entries = vec![
            (":authority".to_owned(), self.authority.clone()),
            (":path".to_owned(), self.path.clone()),
            (":method".to_owned(), self.method.clone()),
            ("x-forwarded-proto".to_owned(), self.scheme().to_owned()),
        ];
        if self.internal {
            entries.push((INTERNAL_HEADER.to_owned(), "true".to_owned()));
        }
        entries.extend(self.headers.iter().cloned());
        HeaderMap {
            entries,
            finalized: false,
        }
    }
}

/// Split a path into `(path, Some(query))` at the first `?`.
pub(crate) fn split_query(path: &str) -> (&str, Option<&str>) {
    match path.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (path, None),
    }
}

/// Builder for [`RequestAttributes`].
#[derive(Debug, Default)]
pub struct RequestAttributesBuilder {
    request: RequestAttributes,
}

impl RequestAttributesBuilder {
    /// Set the `:authority`.
    #[must_use]
    pub fn authority(mut self, authority: impl Into<String>) -> Self {
        self.request.authority = authority.into();
        self
    }

    /// Set the `:path`.
    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.request.path = path.into();
        self
    }

    /// Set the method.
    #[must_use]
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.request.method = method.into();
        self
    }

    /// Mark the request as arriving over TLS.
    #[must_use]
    pub fn secure(mut self, secure: bool) -> Self {
        self.request.secure = secure;
        self
    }

    /// Mark the request as internal.
    #[must_use]
    pub fn internal(mut self, internal: bool) -> Self {
        self.request.internal = internal;
        self
    }

    /// Add a header (name lowercased).
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.request
            .headers
            .push((name.into().to_ascii_lowercase(), value.into()));
        self
    }

    /// Set the random value.
    #[must_use]
    pub fn random_value(mut self, random_value: u64) -> Self {
        self.request.random_value = random_value;
        self
    }

    /// Set the active runtime key.
    #[must_use]
    pub fn active_runtime_key(mut self, key: impl Into<String>) -> Self {
        self.request.active_runtime_key = Some(key.into());
        self
    }

    /// Build the attributes.
    #[must_use]
    pub fn build(self) -> RequestAttributes {
        self.request
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// HeaderMap
// ═══════════════════════════════════════════════════════════════════════════════

/// An ordered, mutable header list used for header finalization.
///
/// Names are stored lowercased; `host` is an alias for `:authority`. The
/// `finalized` flag makes rewriting a once-per-map operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderMap {
    entries: Vec<(String, String)>,
    finalized: bool,
}

impl HeaderMap {
    fn canonical(name: &str) -> String {
        if name.eq_ignore_ascii_case("host") {
            ":authority".to_owned()
        } else {
            name.to_ascii_lowercase()
        }
    }

    /// Get the first value for a header.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        let name = Self::canonical(name);
        self.entries
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Replace every value of a header with one value.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let name = Self::canonical(name);
        let value = value.into();
        match self.entries.iter().position(|(k, _)| *k == name) {
            Some(first) => {
                self.entries[first].1 = value;
                let mut index = 0;
                self.entries.retain(|(k, _)| {
                    let keep = *k != name || index == first;
                    index += 1;
                    keep
                });
            }
            None => self.entries.push((name, value)),
        }
    }

    /// Append a value, joining onto an existing header with `,`.
    pub fn append(&mut self, name: &str, value: &str) {
        let name = Self::canonical(name);
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some((_, existing)) if !existing.is_empty() => {
                existing.push(',');
                existing.push_str(value);
            }
            Some((_, existing)) => value.clone_into(existing),
            None => self.entries.push((name, value.to_owned())),
        }
    }

    /// Remove every value of a header.
    pub fn remove(&mut self, name: &str) {
        let name = Self::canonical(name);
        self.entries.retain(|(k, _)| *k != name);
    }

    /// Whether route finalization has already run on this map.
    #[must_use]
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    pub(crate) fn mark_finalized(&mut self) {
        self.finalized = true;
    }

    /// Iterate over `(name, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// DataInputs
// ═══════════════════════════════════════════════════════════════════════════════

/// Extracts the full `:path`, query string included.
#[derive(Debug, Clone, Copy)]
pub struct PathInput;

impl DataInput<RequestAttributes> for PathInput {
    fn get<'a>(&self, ctx: &'a RequestAttributes) -> MatchingData<'a> {
        MatchingData::Str(ctx.path())
    }
}

/// Extracts the path with the query string removed.
#[derive(Debug, Clone, Copy)]
pub struct PathWithoutQueryInput;

impl DataInput<RequestAttributes> for PathWithoutQueryInput {
    fn get<'a>(&self, ctx: &'a RequestAttributes) -> MatchingData<'a> {
        MatchingData::Str(ctx.path_without_query())
    }
}

/// Extracts a header from the request's header view.
#[derive(Debug, Clone)]
pub struct HeaderInput {
    name: String,
}

impl HeaderInput {
    /// Create a header input (name is case-insensitive).
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into().to_ascii_lowercase(),
        }
    }
}

impl DataInput<RequestAttributes> for HeaderInput {
    fn get<'a>(&self, ctx: &'a RequestAttributes) -> MatchingData<'a> {
        ctx.header(&self.name).into()
    }
}

/// Extracts a query parameter by name.
#[derive(Debug, Clone)]
pub struct QueryParamInput {
    name: String,
}

impl QueryParamInput {
    /// Create a query parameter input.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl DataInput<RequestAttributes> for QueryParamInput {
    fn get<'a>(&self, ctx: &'a RequestAttributes) -> MatchingData<'a> {
        ctx.query_param(&self.name).into()
    }
}
