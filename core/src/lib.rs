//! routa - route matching core for an L7 proxy data plane
//!
//! Given a [`RouteTable`] (virtual hosts, ordered routes, matchers, actions)
//! and one request's [`RequestAttributes`], decide deterministically whether
//! the request is forwarded to a cluster, redirected, or answered directly.
//!
//! # Architecture
//!
//! Route predicates reuse a small matcher vocabulary:
//!
//! - [`MatchingData`]: Erased value extracted from a request
//! - [`DataInput<Ctx>`]: Domain-specific extraction, returns `MatchingData`
//! - [`InputMatcher`]: Domain-agnostic matching (non-generic, shareable)
//! - [`Predicate<Ctx>`]: Boolean composition (And, Not)
//!
//! On top of that sit the routing layers:
//!
//! - [`config`]: serde schema for route tables
//! - [`RouteTable`]: immutable, validated, compiled once per load
//! - [`RouteTable::route`]: the matching engine, returns a [`RoutingDecision`]
//! - [`ResolvedAction`]: cluster / redirect / direct-response outcome
//! - [`SharedRouteTable`]: lock-free handle for reload-by-swap
//!
//! # Key invariants
//!
//! 1. **First match wins**: routes are evaluated in declared order.
//! 2. **`DataInput` None → false**: a missing header or query parameter fails
//!    its predicate unless the predicate is inverted.
//! 3. **Determinism**: weighted selection and runtime gates depend only on the
//!    request's `random_value`.
//!
//! # Example
//!
//! ```
//! use routa::prelude::*;
//!
//! let config: RouteConfiguration = serde_json::from_value(serde_json::json!({
//!     "virtual_hosts": [{
//!         "name": "www",
//!         "domains": ["www.example.com"],
//!         "routes": [
//!             { "match": { "prefix": "/api" }, "route": { "cluster": "api" } },
//!             { "match": { "prefix": "/" }, "route": { "cluster": "web" } }
//!         ]
//!     }]
//! }))
//! .unwrap();
//! let table = RouteTable::build(&config).unwrap();
//!
//! let request = RequestAttributes::builder()
//!     .authority("www.example.com")
//!     .path("/api/users")
//!     .build();
//! let decision = table.route(&request, &DefaultRuntime);
//! assert_eq!(decision.cluster_name(), Some("api"));
//! ```

// ═══════════════════════════════════════════════════════════════════════════════
// Modules
// ═══════════════════════════════════════════════════════════════════════════════

mod action;
mod data_input;
mod domains;
mod engine;
mod input_matcher;
mod matching_data;
mod predicate;
mod radix_tree;
mod request;
mod resolve;
mod runtime;
mod shared;
mod string_match;
mod table;

pub mod config;

// ═══════════════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════════════

// Matcher vocabulary
pub use data_input::DataInput;
pub use input_matcher::{InputMatcher, PresentMatcher, StringMatcher};
pub use matching_data::MatchingData;
pub use predicate::{Predicate, SinglePredicate};
pub use radix_tree::RadixTree;
pub use string_match::StringMatchSpec;

// Request model
pub use request::{
    HeaderInput, HeaderMap, PathInput, PathWithoutQueryInput, QueryParamInput,
    RequestAttributes, RequestAttributesBuilder, INTERNAL_HEADER,
};

// Route table model
pub use action::{
    Action, ClusterAction, ClusterSpecifier, DirectResponseAction, PathRewrite, RedirectAction,
    VirtualCluster, WeightedClusters,
};
pub use domains::DomainIndex;
pub use table::{PathMatcher, Route, RouteKey, RouteTable, VirtualHost};

// Engine and resolver
pub use engine::{match_request, MatchedRoute, RoutingDecision};
pub use resolve::{ResolvedAction, ResolvedCluster, ResolvedRedirect};

// Runtime flags
pub use runtime::{
    DefaultRuntime, Denominator, FractionalPercent, RuntimeGate, RuntimeSource, StaticRuntime,
};

// Reload
pub use shared::SharedRouteTable;

// ═══════════════════════════════════════════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════════════════════════════════════════

/// Prelude module for convenient imports.
///
/// ```
/// use routa::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::RouteConfiguration;
    pub use crate::{
        // Errors
        ConfigError,
        // Matcher vocabulary
        DataInput,
        // Runtime
        DefaultRuntime,
        HeaderMap,
        InputMatcher,
        MatchedRoute,
        MatchingData,
        Predicate,
        // Request
        RequestAttributes,
        ResolvedAction,
        // Table and engine
        RouteKey,
        RouteTable,
        RoutingDecision,
        RuntimeSource,
        SharedRouteTable,
        SinglePredicate,
        StaticRuntime,
        StringMatchSpec,
        StringMatcher,
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════════════════════════

/// Maximum length for non-regex string match patterns (exact, prefix, suffix, contains).
pub const MAX_PATTERN_LENGTH: usize = 8192;

/// Maximum length for regex patterns.
///
/// Shorter limit than [`MAX_PATTERN_LENGTH`] because regex compilation cost
/// scales faster than literal matching.
pub const MAX_REGEX_PATTERN_LENGTH: usize = 4096;

// ═══════════════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// Errors from route table construction.
///
/// These are caught at config load time, never at match time. Fix the
/// configuration and rebuild the table; no partial table is produced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A virtual host declares no domains.
    #[error("virtual host \"{virtual_host}\" has no domains")]
    NoDomains {
        /// The offending virtual host.
        virtual_host: String,
    },

    /// A virtual host declares an empty domain string.
    #[error("virtual host \"{virtual_host}\" has an empty domain")]
    EmptyDomain {
        /// The offending virtual host.
        virtual_host: String,
    },

    /// The same domain pattern appears twice in the table.
    #[error("domain \"{domain}\" is declared by both \"{first}\" and \"{second}\"")]
    DuplicateDomain {
        /// The normalized domain pattern.
        domain: String,
        /// The virtual host that declared it first.
        first: String,
        /// The virtual host that declared it again.
        second: String,
    },

    /// Weighted cluster weights do not add up to the declared total.
    #[error("route \"{route}\": cluster weights sum to {actual}, but total_weight is {declared}")]
    WeightMismatch {
        /// The offending route.
        route: String,
        /// Declared `total_weight`.
        declared: u64,
        /// Sum of individual weights.
        actual: u64,
    },

    /// A weighted cluster list is empty.
    #[error("route \"{route}\": weighted_clusters has no clusters")]
    EmptyWeightedClusters {
        /// The offending route.
        route: String,
    },

    /// A weighted cluster total is zero.
    #[error("route \"{route}\": total_weight must be greater than zero")]
    ZeroTotalWeight {
        /// The offending route.
        route: String,
    },

    /// A regex pattern failed to compile.
    #[error("invalid pattern \"{pattern}\": {reason}")]
    InvalidPattern {
        /// The pattern that failed to compile.
        pattern: String,
        /// The compiler's message.
        reason: String,
    },

    /// A pattern exceeds its length limit.
    #[error("pattern length is {len}, but maximum allowed is {max}")]
    PatternTooLong {
        /// Actual length of the pattern.
        len: usize,
        /// Maximum allowed length.
        max: usize,
    },

    /// A route has zero or several of `route` / `redirect` / `direct_response`.
    #[error("route \"{route}\" must have exactly one action, found {count}")]
    ActionCount {
        /// The offending route.
        route: String,
        /// Number of actions declared.
        count: usize,
    },

    /// A route match has zero or several of `prefix` / `path` / `safe_regex`.
    #[error("route \"{route}\" must have exactly one path specifier, found {count}")]
    PathSpecifierCount {
        /// The offending route.
        route: String,
        /// Number of path specifiers declared.
        count: usize,
    },

    /// A route action has zero or both of `cluster` / `weighted_clusters`.
    #[error("route \"{route}\" must have exactly one cluster specifier, found {count}")]
    ClusterSpecifierCount {
        /// The offending route.
        route: String,
        /// Number of cluster specifiers declared.
        count: usize,
    },

    /// A header matcher has zero or several match kinds.
    #[error("route \"{route}\": header matcher \"{header}\" must have exactly one match kind, found {count}")]
    HeaderMatchKindCount {
        /// The offending route.
        route: String,
        /// The header being matched.
        header: String,
        /// Number of match kinds declared.
        count: usize,
    },

    /// A query parameter matcher has both `string_match` and `present_match`.
    #[error("route \"{route}\": query parameter \"{parameter}\" cannot set both string_match and present_match")]
    QueryMatchKindConflict {
        /// The offending route.
        route: String,
        /// The query parameter being matched.
        parameter: String,
    },

    /// A route action has both `prefix_rewrite` and `regex_rewrite`.
    #[error("route \"{route}\" cannot set both prefix_rewrite and regex_rewrite")]
    ConflictingRewrites {
        /// The offending route.
        route: String,
    },

    /// A `prefix_rewrite` on a route matched by `safe_regex`.
    #[error("route \"{route}\": prefix_rewrite requires a prefix or path match")]
    PrefixRewriteWithRegex {
        /// The offending route.
        route: String,
    },

    /// A redirect has both `path_redirect` and `prefix_rewrite`.
    #[error("route \"{route}\": redirect cannot set both path_redirect and prefix_rewrite")]
    ConflictingRedirectPath {
        /// The offending route.
        route: String,
    },
}
