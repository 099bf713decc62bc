//! Matching Engine: `(table, request, runtime) → RoutingDecision`.
//!
//! Pure and synchronous: the table is only borrowed, so any number of
//! threads may route against the same table at once.

use crate::resolve::{resolve, tls_redirect};
use crate::{
    RequestAttributes, ResolvedAction, Route, RouteKey, RouteTable, RuntimeSource, VirtualHost,
};

/// Which entry of a virtual host produced a match.
#[derive(Debug, Clone, Copy)]
pub enum MatchedRoute<'t> {
    /// A configured route.
    Route(&'t Route),
    /// The virtual host's TLS requirement, enforced before any route.
    TlsRedirect,
}

/// The outcome of routing one request.
#[derive(Debug, Clone)]
pub enum RoutingDecision<'t> {
    /// No virtual host or no route matched. Not an error.
    NoMatch,
    /// A route (or the TLS requirement) matched.
    Matched {
        /// The selected virtual host.
        virtual_host: &'t VirtualHost,
        /// The entry that matched.
        route: MatchedRoute<'t>,
        /// The resolved outcome.
        action: ResolvedAction,
    },
}

impl<'t> RoutingDecision<'t> {
    /// Whether anything matched.
    #[must_use]
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Matched { .. })
    }

    /// The selected virtual host.
    #[must_use]
    pub fn virtual_host(&self) -> Option<&'t VirtualHost> {
        match self {
            Self::Matched { virtual_host, .. } => Some(*virtual_host),
            Self::NoMatch => None,
        }
    }

    /// The matched route, unless the match was a TLS redirect.
    #[must_use]
    pub fn route(&self) -> Option<&'t Route> {
        match self {
            Self::Matched {
                route: MatchedRoute::Route(route),
                ..
            } => Some(*route),
            _ => None,
        }
    }

    /// Position of the matched route.
    #[must_use]
    pub fn route_key(&self) -> Option<RouteKey> {
        self.route().map(Route::key)
    }

    /// The resolved action.
    #[must_use]
    pub fn action(&self) -> Option<&ResolvedAction> {
        match self {
            Self::Matched { action, .. } => Some(action),
            Self::NoMatch => None,
        }
    }

    /// Selected cluster, for a cluster action.
    #[must_use]
    pub fn cluster_name(&self) -> Option<&str> {
        match self.action()? {
            ResolvedAction::Cluster(c) => Some(&c.cluster),
            _ => None,
        }
    }

    /// Selected virtual cluster, for a cluster action.
    #[must_use]
    pub fn virtual_cluster_name(&self) -> Option<&str> {
        match self.action()? {
            ResolvedAction::Cluster(c) => c.virtual_cluster.as_deref(),
            _ => None,
        }
    }

    /// Redirect location, for a redirect.
    #[must_use]
    pub fn redirect_location(&self) -> Option<&str> {
        match self.action()? {
            ResolvedAction::Redirect(r) => Some(&r.location),
            _ => None,
        }
    }
}

/// Route one request.
///
/// 1. Select the virtual host by authority (exact, suffix, prefix, `*`).
/// 2. Enforce `require_tls`.
/// 3. First route whose path, header, query and runtime conditions all hold.
/// 4. Resolve its action.
pub fn match_request<'t>(
    table: &'t RouteTable,
    request: &RequestAttributes,
    runtime: &dyn RuntimeSource,
) -> RoutingDecision<'t> {
    let Some(virtual_host) = table.virtual_host_for(request.authority()) else {
        tracing::trace!(authority = request.authority(), "no virtual host");
        return RoutingDecision::NoMatch;
    };

    if virtual_host.requires_tls_redirect(request) {
        tracing::trace!(virtual_host = virtual_host.name(), "tls redirect");
        return RoutingDecision::Matched {
            virtual_host,
            route: MatchedRoute::TlsRedirect,
            action: tls_redirect(request),
        };
    }

    let Some(route) = virtual_host
        .routes()
        .iter()
        .find(|route| route.matches(request, runtime))
    else {
        tracing::trace!(
            virtual_host = virtual_host.name(),
            path = request.path(),
            "no route"
        );
        return RoutingDecision::NoMatch;
    };

    tracing::trace!(
        virtual_host = virtual_host.name(),
        route = route.name(),
        key = %route.key(),
        "matched"
    );
    RoutingDecision::Matched {
        virtual_host,
        route: MatchedRoute::Route(route),
        action: resolve(route.action(), request),
    }
}

impl RouteTable {
    /// Route one request. See [`match_request`].
    pub fn route<'t>(
        &'t self,
        request: &RequestAttributes,
        runtime: &dyn RuntimeSource,
    ) -> RoutingDecision<'t> {
        match_request(self, request, runtime)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RouteConfiguration;
    use crate::{DefaultRuntime, Denominator, FractionalPercent, StaticRuntime};
    use serde_json::json;

    fn table(value: serde_json::Value) -> RouteTable {
        let config: RouteConfiguration = serde_json::from_value(value).unwrap();
        RouteTable::build(&config).unwrap()
    }

    fn get(authority: &str, path: &str) -> RequestAttributes {
        RequestAttributes::builder()
            .authority(authority)
            .path(path)
            .build()
    }

    #[test]
    fn exact_domain_beats_wildcard_declared_first() {
        let t = table(json!({ "virtual_hosts": [
            { "name": "wild", "domains": ["*.example.com"], "routes": [
                { "match": { "prefix": "/" }, "route": { "cluster": "wild" } }
            ]},
            { "name": "exact", "domains": ["www.example.com"], "routes": [
                { "match": { "prefix": "/" }, "route": { "cluster": "exact" } }
            ]}
        ]}));
        let d = t.route(&get("www.example.com", "/"), &DefaultRuntime);
        assert_eq!(d.cluster_name(), Some("exact"));
        assert_eq!(d.virtual_host().map(VirtualHost::name), Some("exact"));
    }

    #[test]
    fn first_match_wins() {
        let t = table(json!({ "virtual_hosts": [{ "name": "vh", "domains": ["*"], "routes": [
            { "match": { "prefix": "/foo" }, "route": { "cluster": "a" } },
            { "match": { "prefix": "/" }, "route": { "cluster": "b" } }
        ]}]}));
        assert_eq!(t.route(&get("x", "/foo/bar"), &DefaultRuntime).cluster_name(), Some("a"));
        assert_eq!(t.route(&get("x", "/bar"), &DefaultRuntime).cluster_name(), Some("b"));
    }

    #[test]
    fn no_virtual_host_or_route_is_no_match() {
        let t = table(json!({ "virtual_hosts": [{ "name": "vh", "domains": ["a.com"], "routes": [
            { "match": { "path": "/only" }, "route": { "cluster": "a" } }
        ]}]}));
        assert!(!t.route(&get("b.com", "/only"), &DefaultRuntime).is_match());
        let d = t.route(&get("a.com", "/other"), &DefaultRuntime);
        assert!(!d.is_match());
        assert_eq!(d.cluster_name(), None);
        assert_eq!(d.route_key(), None);
    }

    #[test]
    fn weighted_selection_by_random_value() {
        let t = table(json!({ "virtual_hosts": [{ "name": "vh", "domains": ["*"], "routes": [
            { "match": { "prefix": "/" }, "route": { "weighted_clusters": { "clusters": [
                { "name": "c1", "weight": 30 }, { "name": "c2", "weight": 70 }
            ]}}}
        ]}]}));
        let pick = |r: u64| {
            let req = RequestAttributes::builder().authority("x").path("/").random_value(r).build();
            t.route(&req, &DefaultRuntime).cluster_name().map(str::to_owned)
        };
        assert_eq!(pick(25).as_deref(), Some("c1"));
        assert_eq!(pick(30).as_deref(), Some("c2"));
        assert_eq!(pick(99).as_deref(), Some("c2"));
        assert_eq!(pick(130), pick(30));
    }

    #[test]
    fn runtime_gate_falls_through() {
        let t = table(json!({ "virtual_hosts": [{ "name": "vh", "domains": ["*"], "routes": [
            { "match": { "prefix": "/", "runtime_fraction": {
                "runtime_key": "canary", "default_value": { "numerator": 50 }
            }}, "route": { "cluster": "canary" } },
            { "match": { "prefix": "/" }, "route": { "cluster": "stable" } }
        ]}]}));
        let req = |r: u64| RequestAttributes::builder().authority("x").path("/").random_value(r).build();

        assert_eq!(t.route(&req(49), &DefaultRuntime).cluster_name(), Some("canary"));
        assert_eq!(t.route(&req(50), &DefaultRuntime).cluster_name(), Some("stable"));

        let off = StaticRuntime::new()
            .with_override("canary", FractionalPercent::new(0, Denominator::Hundred));
        assert_eq!(t.route(&req(0), &off).cluster_name(), Some("stable"));
    }

    #[test]
    fn tls_redirect_precedes_routes() {
        let t = table(json!({ "virtual_hosts": [{ "name": "vh", "domains": ["*"], "require_tls": "ALL", "routes": [
            { "match": { "prefix": "/" }, "route": { "cluster": "a" } }
        ]}]}));
        let d = t.route(&get("api.com", "/x?y=1"), &DefaultRuntime);
        assert!(matches!(d, RoutingDecision::Matched { route: MatchedRoute::TlsRedirect, .. }));
        assert_eq!(d.redirect_location(), Some("https://api.com/x?y=1"));
        assert!(d.route().is_none());

        let secure = RequestAttributes::builder().authority("api.com").path("/").secure(true).build();
        assert_eq!(t.route(&secure, &DefaultRuntime).cluster_name(), Some("a"));
    }

    #[test]
    fn table_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RouteTable>();
    }
}
