//! Route Table Model: immutable, validated, compiled once per load.
//!
//! [`RouteTable::build`] turns a [`RouteConfiguration`] into compiled
//! predicates and actions. Any [`ConfigError`] aborts the build; there is no
//! partial table. After construction nothing mutates: a reload builds a new
//! table and swaps it in (see [`SharedRouteTable`](crate::SharedRouteTable)).

use crate::action::{
    Action, ClusterAction, ClusterSpecifier, DirectResponseAction, PathRewrite, RedirectAction,
    VirtualCluster, WeightedClusters,
};
use crate::config::{
    HeaderMatcherConfig, HeaderValueOption, QueryParameterMatcherConfig, RedirectActionConfig,
    RouteActionConfig, RouteConfig, RouteConfiguration, RouteMatchConfig, TlsRequirement,
    VirtualHostConfig,
};
use crate::string_match::{compile_full_regex, compile_rewrite_regex};
use crate::{
    ConfigError, DataInput, DomainIndex, HeaderInput, PathInput, PathWithoutQueryInput,
    Predicate, PresentMatcher, QueryParamInput, RequestAttributes, RuntimeGate, RuntimeSource,
    SinglePredicate, StringMatchSpec,
};
use std::fmt;

/// Position of a route: `(virtual host index, route index)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteKey {
    /// Index of the virtual host in the table.
    pub virtual_host: usize,
    /// Index of the route within its virtual host.
    pub route: usize,
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.virtual_host, self.route)
    }
}

/// The path condition of a route, as configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathMatcher {
    /// Equality with the path, query excluded.
    Exact(String),
    /// Prefix of the full path, query included.
    Prefix(String),
    /// Full-string regex over the path, query excluded.
    Regex(String),
}

impl PathMatcher {
    fn from_config(route: &str, m: &RouteMatchConfig) -> Result<Self, ConfigError> {
        match (&m.prefix, &m.path, &m.safe_regex) {
            (Some(p), None, None) => Ok(Self::Prefix(p.clone())),
            (None, Some(p), None) => Ok(Self::Exact(p.clone())),
            (None, None, Some(p)) => Ok(Self::Regex(p.clone())),
            (a, b, c) => Err(ConfigError::PathSpecifierCount {
                route: route.to_owned(),
                count: [a.is_some(), b.is_some(), c.is_some()]
                    .into_iter()
                    .filter(|set| *set)
                    .count(),
            }),
        }
    }

    fn to_predicate(&self, case_sensitive: bool) -> Result<Predicate<RequestAttributes>, ConfigError> {
        let ignore_case = !case_sensitive;
        match self {
            Self::Prefix(p) => {
                StringMatchSpec::Prefix(p.clone()).to_predicate(Box::new(PathInput), ignore_case)
            }
            Self::Exact(p) => StringMatchSpec::Exact(p.clone())
                .to_predicate(Box::new(PathWithoutQueryInput), ignore_case),
            Self::Regex(p) => StringMatchSpec::SafeRegex(p.clone())
                .to_predicate(Box::new(PathWithoutQueryInput), false),
        }
    }
}

/// One compiled route.
#[derive(Debug)]
pub struct Route {
    key: RouteKey,
    name: String,
    path: PathMatcher,
    predicate: Predicate<RequestAttributes>,
    runtime: Option<RuntimeGate>,
    action: Action,
    headers_to_add: Vec<HeaderValueOption>,
    headers_to_remove: Vec<String>,
}

impl Route {
    /// Position in the table.
    #[must_use]
    pub fn key(&self) -> RouteKey {
        self.key
    }

    /// Route name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path condition.
    #[must_use]
    pub fn path_matcher(&self) -> &PathMatcher {
        &self.path
    }

    /// Runtime gate, if any.
    #[must_use]
    pub fn runtime_gate(&self) -> Option<&RuntimeGate> {
        self.runtime.as_ref()
    }

    /// The action.
    #[must_use]
    pub fn action(&self) -> &Action {
        &self.action
    }

    /// Headers added during finalization.
    #[must_use]
    pub fn headers_to_add(&self) -> &[HeaderValueOption] {
        &self.headers_to_add
    }

    /// Headers removed during finalization.
    #[must_use]
    pub fn headers_to_remove(&self) -> &[String] {
        &self.headers_to_remove
    }

    /// Path, then headers and query parameters in order, then the runtime gate.
    pub fn matches(&self, request: &RequestAttributes, runtime: &dyn RuntimeSource) -> bool {
        self.predicate.evaluate(request)
            && self
                .runtime
                .as_ref()
                .map_or(true, |gate| runtime.feature_enabled(gate, request))
    }
}

/// A virtual host and its ordered routes.
#[derive(Debug)]
pub struct VirtualHost {
    name: String,
    domains: Vec<String>,
    require_tls: TlsRequirement,
    headers_to_add: Vec<HeaderValueOption>,
    routes: Vec<Route>,
}

impl VirtualHost {
    /// Stats name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Domain patterns, lowercased.
    #[must_use]
    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    /// TLS enforcement.
    #[must_use]
    pub fn require_tls(&self) -> TlsRequirement {
        self.require_tls
    }

    /// Headers added to every request routed here.
    #[must_use]
    pub fn headers_to_add(&self) -> &[HeaderValueOption] {
        &self.headers_to_add
    }

    /// Routes in match order.
    #[must_use]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Whether a request must be redirected to HTTPS before route matching.
    #[must_use]
    pub fn requires_tls_redirect(&self, request: &RequestAttributes) -> bool {
        if request.is_secure() {
            return false;
        }
        match self.require_tls {
            TlsRequirement::None => false,
            TlsRequirement::ExternalOnly => !request.is_internal(),
            TlsRequirement::All => true,
        }
    }
}

/// The immutable route table.
#[derive(Debug)]
pub struct RouteTable {
    name: Option<String>,
    virtual_hosts: Vec<VirtualHost>,
    domains: DomainIndex,
}

impl RouteTable {
    /// Validate and compile a configuration.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found, in declaration order.
    pub fn build(config: &RouteConfiguration) -> Result<Self, ConfigError> {
        let mut domains = DomainIndex::new();
        let mut virtual_hosts = Vec::with_capacity(config.virtual_hosts.len());

        for (index, vh) in config.virtual_hosts.iter().enumerate() {
            register_domains(&mut domains, config, index, vh)?;
            virtual_hosts.push(build_virtual_host(index, vh)?);
        }

        let table = Self {
            name: config.name.clone(),
            virtual_hosts,
            domains,
        };
        tracing::debug!(
            name = table.name.as_deref().unwrap_or(""),
            virtual_hosts = table.virtual_hosts.len(),
            routes = table.route_count(),
            "built route table"
        );
        Ok(table)
    }

    /// Table name, if configured.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Virtual hosts in declaration order.
    #[must_use]
    pub fn virtual_hosts(&self) -> &[VirtualHost] {
        &self.virtual_hosts
    }

    /// Every route, virtual host by virtual host.
    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.virtual_hosts.iter().flat_map(|vh| vh.routes.iter())
    }

    /// Total number of routes.
    #[must_use]
    pub fn route_count(&self) -> usize {
        self.virtual_hosts.iter().map(|vh| vh.routes.len()).sum()
    }

    /// Look up a route by position.
    #[must_use]
    pub fn get(&self, key: RouteKey) -> Option<&Route> {
        self.virtual_hosts.get(key.virtual_host)?.routes.get(key.route)
    }

    /// Select the virtual host for an authority.
    #[must_use]
    pub fn virtual_host_for(&self, authority: &str) -> Option<&VirtualHost> {
        self.domains
            .find(authority)
            .and_then(|index| self.virtual_hosts.get(index))
    }
}

fn register_domains(
    index: &mut DomainIndex,
    config: &RouteConfiguration,
    position: usize,
    vh: &VirtualHostConfig,
) -> Result<(), ConfigError> {
    if vh.domains.is_empty() {
        return Err(ConfigError::NoDomains {
            virtual_host: vh.name.clone(),
        });
    }
    for domain in &vh.domains {
        if domain.is_empty() {
            return Err(ConfigError::EmptyDomain {
                virtual_host: vh.name.clone(),
            });
        }
        if let Err(owner) = index.insert(domain, position) {
            return Err(ConfigError::DuplicateDomain {
                domain: domain.to_ascii_lowercase(),
                first: config.virtual_hosts[owner].name.clone(),
                second: vh.name.clone(),
            });
        }
    }
    Ok(())
}

fn build_virtual_host(index: usize, vh: &VirtualHostConfig) -> Result<VirtualHost, ConfigError> {
    let routes = vh
        .routes
        .iter()
        .enumerate()
        .map(|(route_index, route)| {
            let key = RouteKey {
                virtual_host: index,
                route: route_index,
            };
            let name = route
                .name
                .clone()
                .unwrap_or_else(|| format!("{}/{route_index}", vh.name));
            build_route(key, name, route)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(VirtualHost {
        name: vh.name.clone(),
        domains: vh.domains.iter().map(|d| d.to_ascii_lowercase()).collect(),
        require_tls: vh.require_tls,
        headers_to_add: vh.request_headers_to_add.clone(),
        routes,
    })
}

fn build_route(key: RouteKey, name: String, config: &RouteConfig) -> Result<Route, ConfigError> {
    let m = &config.route_match;
    let path = PathMatcher::from_config(&name, m)?;

    let mut predicates = vec![path.to_predicate(m.case_sensitive)?];
    for header in &m.headers {
        predicates.push(header_predicate(&name, header)?);
    }
    for param in &m.query_parameters {
        predicates.push(query_predicate(&name, param)?);
    }
    let predicate = Predicate::from_all(predicates, present(Box::new(PathInput)));

    let runtime = m
        .runtime_fraction
        .as_ref()
        .map(|gate| RuntimeGate::new(gate.runtime_key.clone(), gate.default_value));

    let action = match (&config.route, &config.redirect, &config.direct_response) {
        (Some(route), None, None) => {
            Action::Cluster(cluster_action(&name, &path, m.case_sensitive, route)?)
        }
        (None, Some(redirect), None) => {
            Action::Redirect(redirect_action(&name, &path, m.case_sensitive, redirect)?)
        }
        (None, None, Some(direct)) => Action::DirectResponse(DirectResponseAction {
            status: direct.status,
            body: direct.body.clone(),
        }),
        (a, b, c) => {
            return Err(ConfigError::ActionCount {
                route: name,
                count: [a.is_some(), b.is_some(), c.is_some()]
                    .into_iter()
                    .filter(|set| *set)
                    .count(),
            })
        }
    };

    Ok(Route {
        key,
        name,
        path,
        predicate,
        runtime,
        action,
        headers_to_add: config.request_headers_to_add.clone(),
        headers_to_remove: config.request_headers_to_remove.clone(),
    })
}

fn present(input: Box<dyn DataInput<RequestAttributes>>) -> Predicate<RequestAttributes> {
    Predicate::Single(SinglePredicate::new(input, Box::new(PresentMatcher)))
}

fn header_predicate(
    route: &str,
    header: &HeaderMatcherConfig,
) -> Result<Predicate<RequestAttributes>, ConfigError> {
    let count = header.kind_count();
    if count != 1 {
        return Err(ConfigError::HeaderMatchKindCount {
            route: route.to_owned(),
            header: header.name.clone(),
            count,
        });
    }

    let input = Box::new(HeaderInput::new(&header.name));
    let spec = if let Some(v) = &header.exact_match {
        StringMatchSpec::Exact(v.clone())
    } else if let Some(v) = &header.safe_regex_match {
        StringMatchSpec::SafeRegex(v.clone())
    } else if let Some(v) = &header.prefix_match {
        StringMatchSpec::Prefix(v.clone())
    } else if let Some(v) = &header.suffix_match {
        StringMatchSpec::Suffix(v.clone())
    } else if let Some(v) = &header.contains_match {
        StringMatchSpec::Contains(v.clone())
    } else {
        // present_match: `false` asks for absence
        let must_exist = header.present_match.unwrap_or(true);
        return Ok(present(input)
            .inverted_if(!must_exist)
            .inverted_if(header.invert_match));
    };

    Ok(spec
        .to_predicate(input, false)?
        .inverted_if(header.invert_match))
}

fn query_predicate(
    route: &str,
    param: &QueryParameterMatcherConfig,
) -> Result<Predicate<RequestAttributes>, ConfigError> {
    let input = Box::new(QueryParamInput::new(&param.name));
    match (&param.string_match, param.present_match) {
        (Some(_), Some(_)) => Err(ConfigError::QueryMatchKindConflict {
            route: route.to_owned(),
            parameter: param.name.clone(),
        }),
        (Some(spec), None) => spec.to_predicate(input, param.ignore_case),
        (None, present_match) => {
            Ok(present(input).inverted_if(!present_match.unwrap_or(true)))
        }
    }
}

fn prefix_rewrite(
    route: &str,
    path: &PathMatcher,
    case_sensitive: bool,
    replacement: &str,
) -> Result<PathRewrite, ConfigError> {
    match path {
        PathMatcher::Prefix(matched) | PathMatcher::Exact(matched) => Ok(PathRewrite::Prefix {
            matched: matched.clone(),
            replacement: replacement.to_owned(),
            ignore_case: !case_sensitive,
        }),
        PathMatcher::Regex(_) => Err(ConfigError::PrefixRewriteWithRegex {
            route: route.to_owned(),
        }),
    }
}

fn cluster_action(
    route: &str,
    path: &PathMatcher,
    case_sensitive: bool,
    config: &RouteActionConfig,
) -> Result<ClusterAction, ConfigError> {
    let cluster = match (&config.cluster, &config.weighted_clusters) {
        (Some(name), None) => ClusterSpecifier::Single(name.clone()),
        (None, Some(weighted)) => ClusterSpecifier::Weighted(WeightedClusters::new(
            route,
            weighted.clusters.iter().map(|c| (c.name.clone(), c.weight)),
            weighted.total_weight,
        )?),
        (a, b) => {
            return Err(ConfigError::ClusterSpecifierCount {
                route: route.to_owned(),
                count: usize::from(a.is_some()) + usize::from(b.is_some()),
            })
        }
    };

    let path_rewrite = match (&config.prefix_rewrite, &config.regex_rewrite) {
        (Some(_), Some(_)) => {
            return Err(ConfigError::ConflictingRewrites {
                route: route.to_owned(),
            })
        }
        (Some(replacement), None) => Some(prefix_rewrite(route, path, case_sensitive, replacement)?),
        (None, Some(rewrite)) => Some(PathRewrite::Regex {
            regex: compile_rewrite_regex(&rewrite.pattern)?,
            substitution: rewrite.substitution.clone(),
        }),
        (None, None) => None,
    };

    let virtual_clusters = config
        .virtual_clusters
        .iter()
        .map(|vc| {
            Ok(VirtualCluster {
                name: vc.name.clone(),
                pattern: compile_full_regex(&vc.pattern)?,
                method: vc.method.clone(),
            })
        })
        .collect::<Result<Vec<_>, ConfigError>>()?;

    Ok(ClusterAction {
        cluster,
        path_rewrite,
        host_rewrite: config.host_rewrite.clone(),
        virtual_clusters,
    })
}

fn redirect_action(
    route: &str,
    path: &PathMatcher,
    case_sensitive: bool,
    config: &RedirectActionConfig,
) -> Result<RedirectAction, ConfigError> {
    let prefix_rewrite = match (&config.path_redirect, &config.prefix_rewrite) {
        (Some(_), Some(_)) => {
            return Err(ConfigError::ConflictingRedirectPath {
                route: route.to_owned(),
            })
        }
        (None, Some(replacement)) => Some(prefix_rewrite(route, path, case_sensitive, replacement)?),
        _ => None,
    };

    Ok(RedirectAction {
        host_redirect: config.host_redirect.clone(),
        path_redirect: config.path_redirect.clone(),
        prefix_rewrite,
        https_redirect: config.https_redirect,
        strip_query: config.strip_query,
        response_code: config.response_code.status(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DefaultRuntime;
    use serde_json::json;

    fn build(value: serde_json::Value) -> Result<RouteTable, ConfigError> {
        let config: RouteConfiguration = serde_json::from_value(value).unwrap();
        RouteTable::build(&config)
    }

    fn single_route(route: serde_json::Value) -> Result<RouteTable, ConfigError> {
        build(json!({
            "virtual_hosts": [{ "name": "vh", "domains": ["*"], "routes": [route] }]
        }))
    }

    fn request(path: &str) -> RequestAttributes {
        RequestAttributes::builder().authority("any").path(path).build()
    }

    #[test]
    fn builds_and_indexes() {
        let table = build(json!({
            "virtual_hosts": [
                { "name": "a", "domains": ["a.com"], "routes": [
                    { "match": { "prefix": "/" }, "route": { "cluster": "c" } },
                    { "match": { "path": "/x" }, "direct_response": { "status": 404 } }
                ]},
                { "name": "b", "domains": ["B.com"], "routes": [] }
            ]
        }))
        .unwrap();

        assert_eq!(table.route_count(), 2);
        assert_eq!(table.virtual_hosts()[1].domains(), ["b.com"]);
        let key = RouteKey { virtual_host: 0, route: 1 };
        assert_eq!(table.get(key).unwrap().name(), "a/1");
        assert_eq!(table.virtual_host_for("b.com").unwrap().name(), "b");
        assert!(table.virtual_host_for("c.com").is_none());
    }

    #[test]
    fn zero_domains_rejected() {
        let err = build(json!({ "virtual_hosts": [{ "name": "x", "domains": [] }] })).unwrap_err();
        assert_eq!(err, ConfigError::NoDomains { virtual_host: "x".into() });
    }

    #[test]
    fn empty_domain_rejected() {
        let err = build(json!({ "virtual_hosts": [{ "name": "x", "domains": [""] }] })).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyDomain { .. }));
    }

    #[test]
    fn duplicate_default_rejected() {
        let err = build(json!({ "virtual_hosts": [
            { "name": "a", "domains": ["*"] },
            { "name": "b", "domains": ["*"] }
        ]}))
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::DuplicateDomain {
                domain: "*".into(),
                first: "a".into(),
                second: "b".into()
            }
        );
    }

    #[test]
    fn invalid_regex_rejected() {
        let err = single_route(json!({ "match": { "safe_regex": "(" }, "route": { "cluster": "c" } }))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPattern { .. }));
    }

    #[test]
    fn weight_mismatch_rejected() {
        let err = single_route(json!({
            "match": { "prefix": "/" },
            "route": { "weighted_clusters": {
                "clusters": [{ "name": "a", "weight": 10 }], "total_weight": 20
            }}
        }))
        .unwrap_err();
        assert!(matches!(err, ConfigError::WeightMismatch { declared: 20, actual: 10, .. }));
    }

    #[test]
    fn action_and_specifier_counts() {
        let err = single_route(json!({ "match": { "prefix": "/" } })).unwrap_err();
        assert!(matches!(err, ConfigError::ActionCount { count: 0, .. }));

        let err = single_route(json!({
            "match": { "prefix": "/" },
            "route": { "cluster": "c" },
            "direct_response": { "status": 200 }
        }))
        .unwrap_err();
        assert!(matches!(err, ConfigError::ActionCount { count: 2, .. }));

        let err = single_route(json!({ "match": { "prefix": "/", "path": "/" }, "route": { "cluster": "c" } }))
            .unwrap_err();
        assert!(matches!(err, ConfigError::PathSpecifierCount { count: 2, .. }));

        let err = single_route(json!({ "match": { "prefix": "/" }, "route": {} })).unwrap_err();
        assert!(matches!(err, ConfigError::ClusterSpecifierCount { count: 0, .. }));

        let err = single_route(json!({
            "match": { "prefix": "/", "headers": [{ "name": "a" }] },
            "route": { "cluster": "c" }
        }))
        .unwrap_err();
        assert!(matches!(err, ConfigError::HeaderMatchKindCount { count: 0, .. }));
    }

    #[test]
    fn rewrite_conflicts() {
        let err = single_route(json!({
            "match": { "prefix": "/" },
            "route": { "cluster": "c", "prefix_rewrite": "/a",
                       "regex_rewrite": { "pattern": "x", "substitution": "y" } }
        }))
        .unwrap_err();
        assert!(matches!(err, ConfigError::ConflictingRewrites { .. }));

        let err = single_route(json!({
            "match": { "safe_regex": "/.*" },
            "route": { "cluster": "c", "prefix_rewrite": "/a" }
        }))
        .unwrap_err();
        assert!(matches!(err, ConfigError::PrefixRewriteWithRegex { .. }));

        let err = single_route(json!({
            "match": { "prefix": "/" },
            "redirect": { "path_redirect": "/a", "prefix_rewrite": "/b" }
        }))
        .unwrap_err();
        assert!(matches!(err, ConfigError::ConflictingRedirectPath { .. }));
    }

    #[test]
    fn path_semantics() {
        let table = build(json!({ "virtual_hosts": [{ "name": "vh", "domains": ["*"], "routes": [
            { "match": { "path": "/exact" }, "route": { "cluster": "exact" } },
            { "match": { "safe_regex": "/users/[0-9]+" }, "route": { "cluster": "regex" } },
            { "match": { "prefix": "/CI", "case_sensitive": false }, "route": { "cluster": "ci" } }
        ]}]}))
        .unwrap();
        let routes = table.virtual_hosts()[0].routes();
        let rt = DefaultRuntime;

        assert!(routes[0].matches(&request("/exact?q=1"), &rt));
        assert!(!routes[0].matches(&request("/exact/more"), &rt));
        assert!(routes[1].matches(&request("/users/12?x"), &rt));
        assert!(!routes[1].matches(&request("/users/12/posts"), &rt));
        assert!(routes[2].matches(&request("/ci/build"), &rt));
    }

    #[test]
    fn header_and_query_matchers() {
        let table = single_route(json!({
            "match": {
                "prefix": "/",
                "headers": [
                    { "name": "x-tenant", "exact_match": "acme" },
                    { "name": "x-debug", "present_match": true, "invert_match": true },
                    { "name": ":method", "safe_regex_match": "GET|HEAD" }
                ],
                "query_parameters": [
                    { "name": "v", "string_match": { "prefix": "2" } }
                ]
            },
            "route": { "cluster": "c" }
        }))
        .unwrap();
        let route = &table.virtual_hosts()[0].routes()[0];
        let rt = DefaultRuntime;

        let ok = RequestAttributes::builder()
            .path("/?v=2.1")
            .header("X-Tenant", "acme")
            .build();
        assert!(route.matches(&ok, &rt));

        let debug = RequestAttributes::builder()
            .path("/?v=2.1")
            .header("x-tenant", "acme")
            .header("x-debug", "1")
            .build();
        assert!(!route.matches(&debug, &rt));

        let wrong_case = RequestAttributes::builder()
            .path("/?v=2")
            .header("x-tenant", "ACME")
            .build();
        assert!(!route.matches(&wrong_case, &rt));

        let post = RequestAttributes::builder()
            .path("/?v=2")
            .method("POST")
            .header("x-tenant", "acme")
            .build();
        assert!(!route.matches(&post, &rt));

        let no_query = RequestAttributes::builder()
            .path("/")
            .header("x-tenant", "acme")
            .build();
        assert!(!route.matches(&no_query, &rt));
    }

    #[test]
    fn present_match_false_requires_absence() {
        let table = single_route(json!({
            "match": { "prefix": "/", "headers": [{ "name": "x-a", "present_match": false }] },
            "route": { "cluster": "c" }
        }))
        .unwrap();
        let route = &table.virtual_hosts()[0].routes()[0];
        assert!(route.matches(&request("/"), &DefaultRuntime));
        let with = RequestAttributes::builder().path("/").header("x-a", "").build();
        assert!(!route.matches(&with, &DefaultRuntime));
    }

    #[test]
    fn tls_requirement() {
        let table = build(json!({ "virtual_hosts": [
            { "name": "all", "domains": ["all"], "require_tls": "ALL" },
            { "name": "ext", "domains": ["ext"], "require_tls": "EXTERNAL_ONLY" }
        ]}))
        .unwrap();
        let all = &table.virtual_hosts()[0];
        let ext = &table.virtual_hosts()[1];

        let plain = RequestAttributes::builder().build();
        let internal = RequestAttributes::builder().internal(true).build();
        let secure = RequestAttributes::builder().secure(true).build();

        assert!(all.requires_tls_redirect(&plain));
        assert!(all.requires_tls_redirect(&internal));
        assert!(!all.requires_tls_redirect(&secure));
        assert!(ext.requires_tls_redirect(&plain));
        assert!(!ext.requires_tls_redirect(&internal));
    }
}
