//! Route actions, compiled.
//!
//! [`Action`] is a closed union: adding a kind means touching every
//! exhaustive `match` in the resolver and the harness.

use crate::{ConfigError, StringMatcher};
use std::fmt;

/// What a matched route does.
#[derive(Debug, Clone)]
pub enum Action {
    /// Forward to a cluster.
    Cluster(ClusterAction),
    /// Redirect the client.
    Redirect(RedirectAction),
    /// Answer without an upstream.
    DirectResponse(DirectResponseAction),
}

/// Forward to a single or weighted cluster, with optional rewrites.
#[derive(Debug, Clone)]
pub struct ClusterAction {
    pub(crate) cluster: ClusterSpecifier,
    pub(crate) path_rewrite: Option<PathRewrite>,
    pub(crate) host_rewrite: Option<String>,
    pub(crate) virtual_clusters: Vec<VirtualCluster>,
}

impl ClusterAction {
    /// Cluster selection.
    #[must_use]
    pub fn cluster(&self) -> &ClusterSpecifier {
        &self.cluster
    }

    /// Path rewrite rule, if any.
    #[must_use]
    pub fn path_rewrite(&self) -> Option<&PathRewrite> {
        self.path_rewrite.as_ref()
    }

    /// Host rewrite value, if any.
    #[must_use]
    pub fn host_rewrite(&self) -> Option<&str> {
        self.host_rewrite.as_deref()
    }

    /// Virtual clusters in match order.
    #[must_use]
    pub fn virtual_clusters(&self) -> &[VirtualCluster] {
        &self.virtual_clusters
    }
}

/// Single cluster or weighted split.
#[derive(Debug, Clone)]
pub enum ClusterSpecifier {
    /// One named cluster.
    Single(String),
    /// Weighted split.
    Weighted(WeightedClusters),
}

impl ClusterSpecifier {
    /// The cluster chosen for `random_value`.
    #[must_use]
    pub fn select(&self, random_value: u64) -> &str {
        match self {
            Self::Single(name) => name,
            Self::Weighted(weighted) => weighted.select(random_value),
        }
    }
}

/// Clusters with cumulative weight ranges in declared order.
#[derive(Debug, Clone)]
pub struct WeightedClusters {
    /// `(name, exclusive upper bound of the cumulative range)`.
    ranges: Vec<(String, u64)>,
    total_weight: u64,
}

impl WeightedClusters {
    /// Build from `(name, weight)` pairs.
    ///
    /// # Errors
    ///
    /// Empty list, zero total, or a total that differs from the sum of weights.
    pub fn new(
        route: &str,
        clusters: impl IntoIterator<Item = (String, u32)>,
        total_weight: u32,
    ) -> Result<Self, ConfigError> {
        let mut ranges = Vec::new();
        let mut upper = 0u64;
        for (name, weight) in clusters {
            upper += u64::from(weight);
            ranges.push((name, upper));
        }

        if ranges.is_empty() {
            return Err(ConfigError::EmptyWeightedClusters {
                route: route.to_owned(),
            });
        }
        if total_weight == 0 {
            return Err(ConfigError::ZeroTotalWeight {
                route: route.to_owned(),
            });
        }
        if upper != u64::from(total_weight) {
            return Err(ConfigError::WeightMismatch {
                route: route.to_owned(),
                declared: u64::from(total_weight),
                actual: upper,
            });
        }

        Ok(Self {
            ranges,
            total_weight: upper,
        })
    }

    /// Declared total weight.
    #[must_use]
    pub fn total_weight(&self) -> u64 {
        self.total_weight
    }

    /// Cluster names in declared order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.ranges.iter().map(|(name, _)| name.as_str())
    }

    /// The cluster whose range contains `random_value mod total_weight`.
    #[must_use]
    pub fn select(&self, random_value: u64) -> &str {
        let point = random_value % self.total_weight;
        self.ranges
            .iter()
            .find(|(_, upper)| point < *upper)
            .or_else(|| self.ranges.last())
            .map_or("", |(name, _)| name.as_str())
    }
}

/// How a path is rewritten before forwarding.
#[derive(Clone)]
pub enum PathRewrite {
    /// Replace the route's matched prefix (or exact path).
    Prefix {
        matched: String,
        replacement: String,
        ignore_case: bool,
    },
    /// `replace_all` over the path, query string preserved.
    Regex {
        regex: regex::Regex,
        substitution: String,
    },
}

impl PathRewrite {
    /// Rewrite `path`. A prefix rule that does not apply returns the path unchanged.
    ///
    /// ```
    /// use routa::PathRewrite;
    ///
    /// let rule = PathRewrite::Prefix {
    ///     matched: "/foo".into(),
    ///     replacement: "/baz".into(),
    ///     ignore_case: false,
    /// };
    /// assert_eq!(rule.apply("/foo/bar"), "/baz/bar");
    /// ```
    #[must_use]
    pub fn apply(&self, path: &str) -> String {
        match self {
            Self::Prefix {
                matched,
                replacement,
                ignore_case,
            } => {
                let head = path.get(..matched.len());
                let applies = head.is_some_and(|head| {
                    if *ignore_case {
                        head.eq_ignore_ascii_case(matched)
                    } else {
                        head == matched
                    }
                });
                if applies {
                    format!("{replacement}{}", &path[matched.len()..])
                } else {
                    path.to_owned()
                }
            }
            Self::Regex {
                regex,
                substitution,
            } => {
                let (only_path, query) = crate::request::split_query(path);
                let rewritten = regex.replace_all(only_path, substitution.as_str());
                match query {
                    Some(query) => format!("{rewritten}?{query}"),
                    None => rewritten.into_owned(),
                }
            }
        }
    }
}

impl fmt::Debug for PathRewrite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prefix {
                matched,
                replacement,
                ..
            } => write!(f, "Prefix({matched:?} -> {replacement:?})"),
            Self::Regex {
                regex,
                substitution,
            } => write!(f, "Regex({:?} -> {substitution:?})", regex.as_str()),
        }
    }
}

/// A named path pattern for stats attribution.
#[derive(Debug, Clone)]
pub struct VirtualCluster {
    pub(crate) name: String,
    pub(crate) pattern: StringMatcher,
    pub(crate) method: Option<String>,
}

impl VirtualCluster {
    /// Stats name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the pattern (and method, if set) matches.
    #[must_use]
    pub fn matches(&self, path: &str, method: &str) -> bool {
        self.method.as_deref().map_or(true, |m| m == method) && self.pattern.matches_str(path)
    }
}

/// Redirect rule.
#[derive(Debug, Clone)]
pub struct RedirectAction {
    pub(crate) host_redirect: Option<String>,
    pub(crate) path_redirect: Option<String>,
    pub(crate) prefix_rewrite: Option<PathRewrite>,
    pub(crate) https_redirect: bool,
    pub(crate) strip_query: bool,
    pub(crate) response_code: u16,
}

impl RedirectAction {
    /// Redirect status code.
    #[must_use]
    pub fn response_code(&self) -> u16 {
        self.response_code
    }
}

/// Fixed response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectResponseAction {
    pub(crate) status: u16,
    pub(crate) body: Option<String>,
}

impl DirectResponseAction {
    /// HTTP status.
    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Inline body.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }
}
