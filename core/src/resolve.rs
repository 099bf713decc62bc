//! Action Resolver: turns a matched route into a concrete outcome.
//!
//! Resolution never fails: data that does not apply (no matching virtual
//! cluster, no rewrite rule) leaves the corresponding field empty.

use crate::action::{Action, ClusterAction, DirectResponseAction, RedirectAction};
use crate::request::split_query;
use crate::{HeaderMap, MatchedRoute, RequestAttributes, RoutingDecision};

/// The concrete outcome of a matched route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedAction {
    /// Forward upstream.
    Cluster(ResolvedCluster),
    /// Send a redirect.
    Redirect(ResolvedRedirect),
    /// Answer directly.
    DirectResponse(DirectResponseAction),
}

/// A resolved cluster action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCluster {
    /// Selected cluster, after weighted selection.
    pub cluster: String,
    /// First virtual cluster matching the (rewritten) path.
    pub virtual_cluster: Option<String>,
    /// Rewritten `:path`, when a rewrite rule is configured.
    pub path_rewrite: Option<String>,
    /// Rewritten `:authority`, when configured.
    pub host_rewrite: Option<String>,
}

/// A resolved redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRedirect {
    /// Absolute location, `scheme://host/path`.
    pub location: String,
    /// HTTP status.
    pub response_code: u16,
}

pub(crate) fn resolve(action: &Action, request: &RequestAttributes) -> ResolvedAction {
    match action {
        Action::Cluster(cluster) => ResolvedAction::Cluster(resolve_cluster(cluster, request)),
        Action::Redirect(redirect) => ResolvedAction::Redirect(resolve_redirect(redirect, request)),
        Action::DirectResponse(direct) => ResolvedAction::DirectResponse(direct.clone()),
    }
}

fn resolve_cluster(action: &ClusterAction, request: &RequestAttributes) -> ResolvedCluster {
    let cluster = action.cluster.select(request.random_value()).to_owned();
    let path_rewrite = action
        .path_rewrite
        .as_ref()
        .map(|rule| rule.apply(request.path()));

    let effective_path = path_rewrite.as_deref().unwrap_or(request.path());
    let virtual_cluster = action
        .virtual_clusters
        .iter()
        .find(|vc| vc.matches(effective_path, request.method()))
        .map(|vc| vc.name.clone());

    ResolvedCluster {
        cluster,
        virtual_cluster,
        path_rewrite,
        host_rewrite: action.host_rewrite.clone(),
    }
}

fn resolve_redirect(action: &RedirectAction, request: &RequestAttributes) -> ResolvedRedirect {
    let scheme = if action.https_redirect || request.is_secure() {
        "https"
    } else {
        "http"
    };
    let host = action
        .host_redirect
        .as_deref()
        .unwrap_or(request.authority());

    let (path, query) = split_query(request.path());
    let query = query.filter(|_| !action.strip_query);
    let with_query = |path: String| match query {
        Some(query) => format!("{path}?{query}"),
        None => path,
    };

    let path = match (&action.path_redirect, &action.prefix_rewrite) {
        // A query written into path_redirect replaces the request's.
        (Some(replacement), _) if replacement.contains('?') => replacement.clone(),
        (Some(replacement), _) => with_query(replacement.clone()),
        (None, Some(rule)) => with_query(rule.apply(path)),
        (None, None) => with_query(path.to_owned()),
    };

    ResolvedRedirect {
        location: format!("{scheme}://{host}{path}"),
        response_code: action.response_code,
    }
}

/// The redirect issued when a virtual host requires TLS.
pub(crate) fn tls_redirect(request: &RequestAttributes) -> ResolvedAction {
    ResolvedAction::Redirect(ResolvedRedirect {
        location: format!("https://{}{}", request.authority(), request.path()),
        response_code: 301,
    })
}

impl RoutingDecision<'_> {
    /// Apply the matched route's header changes to `headers`, at most once.
    ///
    /// In order: path rewrite, host rewrite, virtual-host then route
    /// `request_headers_to_add`, then route `request_headers_to_remove`.
    /// Only cluster actions carry header changes. Returns whether anything
    /// ran; a map that is already finalized is left alone.
    pub fn finalize_request_headers(&self, headers: &mut HeaderMap) -> bool {
        if headers.is_finalized() {
            return false;
        }
        let RoutingDecision::Matched {
            virtual_host,
            route: MatchedRoute::Route(route),
            action: ResolvedAction::Cluster(cluster),
        } = self
        else {
            return false;
        };

        if let Some(path) = &cluster.path_rewrite {
            headers.set(":path", path.as_str());
        }
        if let Some(host) = &cluster.host_rewrite {
            headers.set(":authority", host.as_str());
        }
        for option in virtual_host
            .headers_to_add()
            .iter()
            .chain(route.headers_to_add())
        {
            if option.append {
                headers.append(&option.key, &option.value);
            } else {
                headers.set(&option.key, option.value.as_str());
            }
        }
        for name in route.headers_to_remove() {
            headers.remove(name);
        }
        headers.mark_finalized();
        true
    }
}
