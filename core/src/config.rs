//! Route table configuration schema.
//!
//! These types are the serde-facing shape of a route table, deserialized
//! from YAML or JSON by the loader and compiled by
//! [`RouteTable::build`](crate::RouteTable::build).
//!
//! | Config type | Runtime type |
//! |-------------|--------------|
//! | [`RouteConfiguration`] | [`RouteTable`](crate::RouteTable) |
//! | [`VirtualHostConfig`] | [`VirtualHost`](crate::VirtualHost) |
//! | [`RouteConfig`] | [`Route`](crate::Route) |
//! | [`RouteActionConfig`] | [`ClusterAction`](crate::ClusterAction) |
//! | [`RedirectActionConfig`] | [`RedirectAction`](crate::RedirectAction) |
//!
//! Every type also derives `Serialize` without skipping absent fields, so a
//! re-serialized value lists every key the schema knows. [`unknown_fields`]
//! relies on that to find keys a document carries that the schema ignores.

use crate::{FractionalPercent, StringMatchSpec};
use serde::{Deserialize, Serialize};

/// A whole route table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteConfiguration {
    /// Optional table name, used only in logs.
    #[serde(default)]
    pub name: Option<String>,

    /// Virtual hosts, in declaration order.
    #[serde(default)]
    pub virtual_hosts: Vec<VirtualHostConfig>,
}

/// A named group of routes selected by request authority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualHostConfig {
    /// Stats name, reported as `virtual_host_name`.
    pub name: String,

    /// Domain patterns: exact, `*.suffix`, `prefix.*`, or `*`.
    #[serde(default)]
    pub domains: Vec<String>,

    /// TLS enforcement for this virtual host.
    #[serde(default)]
    pub require_tls: TlsRequirement,

    /// Headers added to every request routed through this virtual host.
    #[serde(default)]
    pub request_headers_to_add: Vec<HeaderValueOption>,

    /// Routes, first match wins.
    #[serde(default)]
    pub routes: Vec<RouteConfig>,
}

/// Which requests a virtual host redirects to HTTPS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TlsRequirement {
    /// No enforcement.
    #[default]
    None,
    /// Redirect non-TLS requests that are not internal.
    ExternalOnly,
    /// Redirect every non-TLS request.
    All,
}

/// A header to add during request finalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderValueOption {
    /// Header name.
    pub key: String,
    /// Header value.
    pub value: String,
    /// `true` joins onto an existing value with `,`; `false` replaces it.
    #[serde(default)]
    pub append: bool,
}

/// One route: a match and exactly one action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteConfig {
    /// Route name; defaults to `<virtual host>/<index>`.
    #[serde(default)]
    pub name: Option<String>,

    /// Match conditions.
    #[serde(rename = "match")]
    pub route_match: RouteMatchConfig,

    /// Forward to a cluster.
    #[serde(default)]
    pub route: Option<RouteActionConfig>,

    /// Redirect.
    #[serde(default)]
    pub redirect: Option<RedirectActionConfig>,

    /// Answer directly.
    #[serde(default)]
    pub direct_response: Option<DirectResponseConfig>,

    /// Headers added after the virtual host's own.
    #[serde(default)]
    pub request_headers_to_add: Vec<HeaderValueOption>,

    /// Headers removed last.
    #[serde(default)]
    pub request_headers_to_remove: Vec<String>,
}

/// Route match conditions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteMatchConfig {
    /// Path prefix, compared against the full path including the query.
    #[serde(default)]
    pub prefix: Option<String>,

    /// Exact path, compared against the path without the query.
    #[serde(default)]
    pub path: Option<String>,

    /// Full-string regex over the path without the query.
    #[serde(default)]
    pub safe_regex: Option<String>,

    /// Applies to `prefix` and `path`.
    #[serde(default = "default_true")]
    pub case_sensitive: bool,

    /// All must match.
    #[serde(default)]
    pub headers: Vec<HeaderMatcherConfig>,

    /// All must match.
    #[serde(default)]
    pub query_parameters: Vec<QueryParameterMatcherConfig>,

    /// Optional runtime gate.
    #[serde(default)]
    pub runtime_fraction: Option<RuntimeFractionConfig>,
}

fn default_true() -> bool {
    true
}

/// A header condition. Exactly one match kind must be set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderMatcherConfig {
    /// Header name (case-insensitive).
    pub name: String,
    #[serde(default)]
    pub exact_match: Option<String>,
    #[serde(default)]
    pub safe_regex_match: Option<String>,
    #[serde(default)]
    pub prefix_match: Option<String>,
    #[serde(default)]
    pub suffix_match: Option<String>,
    #[serde(default)]
    pub contains_match: Option<String>,
    /// `true` requires presence, `false` requires absence.
    #[serde(default)]
    pub present_match: Option<bool>,
    /// Negate the result.
    #[serde(default)]
    pub invert_match: bool,
}

impl HeaderMatcherConfig {
    /// Number of match kinds set.
    #[must_use]
    pub fn kind_count(&self) -> usize {
        [
            self.exact_match.is_some(),
            self.safe_regex_match.is_some(),
            self.prefix_match.is_some(),
            self.suffix_match.is_some(),
            self.contains_match.is_some(),
            self.present_match.is_some(),
        ]
        .into_iter()
        .filter(|set| *set)
        .count()
    }
}

/// A query parameter condition.
///
/// With neither `string_match` nor `present_match`, the parameter only has
/// to be present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParameterMatcherConfig {
    /// Parameter name (case-sensitive).
    pub name: String,
    #[serde(default)]
    pub string_match: Option<StringMatchSpec>,
    #[serde(default)]
    pub ignore_case: bool,
    #[serde(default)]
    pub present_match: Option<bool>,
}

/// Runtime gate configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeFractionConfig {
    /// Flag key.
    pub runtime_key: String,
    /// Fraction used when the flag service has no override.
    pub default_value: FractionalPercent,
}

/// Forward to a cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteActionConfig {
    /// A single cluster.
    #[serde(default)]
    pub cluster: Option<String>,

    /// Weighted cluster split.
    #[serde(default)]
    pub weighted_clusters: Option<WeightedClustersConfig>,

    /// Replace the matched prefix (or exact path).
    #[serde(default)]
    pub prefix_rewrite: Option<String>,

    /// Regex substitution over the path.
    #[serde(default)]
    pub regex_rewrite: Option<RegexRewriteConfig>,

    /// Replace `:authority`.
    #[serde(default)]
    pub host_rewrite: Option<String>,

    /// Stats sub-groups, first match wins.
    #[serde(default)]
    pub virtual_clusters: Vec<VirtualClusterConfig>,
}

/// A weighted cluster split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightedClustersConfig {
    /// Clusters in selection order.
    pub clusters: Vec<ClusterWeight>,
    /// Must equal the sum of weights.
    #[serde(default = "default_total_weight")]
    pub total_weight: u32,
}

fn default_total_weight() -> u32 {
    100
}

/// One entry of a weighted cluster split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterWeight {
    /// Cluster name.
    pub name: String,
    /// Relative weight.
    pub weight: u32,
}

/// Regex path rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegexRewriteConfig {
    /// Unanchored pattern.
    pub pattern: String,
    /// Replacement, with `$1` / `${name}` group references.
    pub substitution: String,
}

/// A virtual cluster: a named path regex used for stats attribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualClusterConfig {
    /// Stats name.
    pub name: String,
    /// Full-string regex over the path.
    pub pattern: String,
    /// Optional method restriction.
    #[serde(default)]
    pub method: Option<String>,
}

/// Redirect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectActionConfig {
    #[serde(default)]
    pub host_redirect: Option<String>,
    #[serde(default)]
    pub path_redirect: Option<String>,
    #[serde(default)]
    pub prefix_rewrite: Option<String>,
    #[serde(default)]
    pub https_redirect: bool,
    #[serde(default)]
    pub strip_query: bool,
    #[serde(default)]
    pub response_code: RedirectResponseCode,
}

/// Redirect status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RedirectResponseCode {
    /// 301
    #[default]
    MovedPermanently,
    /// 302
    Found,
    /// 303
    SeeOther,
    /// 307
    TemporaryRedirect,
    /// 308
    PermanentRedirect,
}

impl RedirectResponseCode {
    /// The HTTP status code.
    #[must_use]
    pub fn status(self) -> u16 {
        match self {
            Self::MovedPermanently => 301,
            Self::Found => 302,
            Self::SeeOther => 303,
            Self::TemporaryRedirect => 307,
            Self::PermanentRedirect => 308,
        }
    }
}

/// Fixed response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectResponseConfig {
    /// HTTP status.
    pub status: u16,
    /// Optional inline body.
    #[serde(default)]
    pub body: Option<String>,
}

/// Paths of keys present in `raw` but absent from `typed`.
///
/// `typed` is the re-serialization of the deserialized schema type, so every
/// known key appears in it. Paths are `/`-separated, with array indices.
///
/// ```
/// use routa::config::{unknown_fields, RouteConfiguration};
///
/// let raw = serde_json::json!({ "virtual_hosts": [], "retry_policy": {} });
/// let typed: RouteConfiguration = serde_json::from_value(raw.clone()).unwrap();
/// let typed = serde_json::to_value(&typed).unwrap();
/// assert_eq!(unknown_fields(&raw, &typed), vec!["/retry_policy".to_string()]);
/// ```
#[must_use]
pub fn unknown_fields(raw: &serde_json::Value, typed: &serde_json::Value) -> Vec<String> {
    let mut found = Vec::new();
    collect_unknown(raw, typed, &mut String::new(), &mut found);
    found
}

fn collect_unknown(
    raw: &serde_json::Value,
    typed: &serde_json::Value,
    path: &mut String,
    found: &mut Vec<String>,
) {
    use serde_json::Value;

    match (raw, typed) {
        (Value::Object(raw), Value::Object(typed)) => {
            for (key, raw_value) in raw {
                let len = path.len();
                path.push('/');
                path.push_str(key);
                match typed.get(key) {
                    Some(typed_value) => collect_unknown(raw_value, typed_value, path, found),
                    None => found.push(path.clone()),
                }
                path.truncate(len);
            }
        }
        (Value::Array(raw), Value::Array(typed)) => {
            for (index, (raw_value, typed_value)) in raw.iter().zip(typed).enumerate() {
                let len = path.len();
                path.push('/');
                path.push_str(&index.to_string());
                collect_unknown(raw_value, typed_value, path, found);
                path.truncate(len);
            }
        }
        _ => {}
    }
}
