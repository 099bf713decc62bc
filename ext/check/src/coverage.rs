//! Coverage Tracker: which route-table entities a run exercised.
//!
//! Entities are identified by kind and route position. The table decides
//! what each route declares:
//!
//! | Action | Declared kinds | Basic-policy primary |
//! |--------|----------------|----------------------|
//! | cluster | `cluster`, `virtual_host`, plus `virtual_cluster` / `path_rewrite` / `host_rewrite` when configured | `cluster` |
//! | redirect | `virtual_host`, `redirect_path` | `redirect_path` |
//! | direct response | `virtual_host` | `virtual_host` |
//!
//! Marking is idempotent and monotonic. One tracker lives for one run;
//! parallel workers each own one and [`CoverageState::merge`] the results.

use routa::{Action, RouteKey, RouteTable};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A kind of coverable entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Cluster,
    VirtualCluster,
    VirtualHost,
    PathRewrite,
    HostRewrite,
    RedirectPath,
}

impl EntityKind {
    /// Every kind.
    pub const ALL: [EntityKind; 6] = [
        Self::Cluster,
        Self::VirtualCluster,
        Self::VirtualHost,
        Self::PathRewrite,
        Self::HostRewrite,
        Self::RedirectPath,
    ];

    /// Snake-case name, as used in test-suite `validate` fields.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cluster => "cluster",
            Self::VirtualCluster => "virtual_cluster",
            Self::VirtualHost => "virtual_host",
            Self::PathRewrite => "path_rewrite",
            Self::HostRewrite => "host_rewrite",
            Self::RedirectPath => "redirect_path",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How coverage is scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoveragePolicy {
    /// One primary entity per route.
    #[default]
    Basic,
    /// Per-route fraction of every declared entity, averaged.
    Comprehensive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Declared {
    primary: EntityKind,
    kinds: BTreeSet<EntityKind>,
}

/// Covered entities for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageState {
    declared: BTreeMap<RouteKey, Declared>,
    covered: BTreeSet<(RouteKey, EntityKind)>,
}

impl CoverageState {
    /// A fresh tracker for `table`, nothing covered.
    #[must_use]
    pub fn new(table: &RouteTable) -> Self {
        let declared = table
            .routes()
            .map(|route| {
                let mut kinds = BTreeSet::from([EntityKind::VirtualHost]);
                let primary = match route.action() {
                    Action::Cluster(cluster) => {
                        kinds.insert(EntityKind::Cluster);
                        if !cluster.virtual_clusters().is_empty() {
                            kinds.insert(EntityKind::VirtualCluster);
                        }
                        if cluster.path_rewrite().is_some() {
                            kinds.insert(EntityKind::PathRewrite);
                        }
                        if cluster.host_rewrite().is_some() {
                            kinds.insert(EntityKind::HostRewrite);
                        }
                        EntityKind::Cluster
                    }
                    Action::Redirect(_) => {
                        kinds.insert(EntityKind::RedirectPath);
                        EntityKind::RedirectPath
                    }
                    Action::DirectResponse(_) => EntityKind::VirtualHost,
                };
                (route.key(), Declared { primary, kinds })
            })
            .collect();

        Self {
            declared,
            covered: BTreeSet::new(),
        }
    }

    /// Whether `route` declares `kind`.
    #[must_use]
    pub fn declares(&self, kind: EntityKind, route: RouteKey) -> bool {
        self.declared
            .get(&route)
            .is_some_and(|d| d.kinds.contains(&kind))
    }

    /// Mark an entity covered. Undeclared entities are ignored.
    ///
    /// Returns whether the entity was newly covered.
    pub fn mark_covered(&mut self, kind: EntityKind, route: RouteKey) -> bool {
        self.declares(kind, route) && self.covered.insert((route, kind))
    }

    /// Whether an entity has been covered.
    #[must_use]
    pub fn is_covered(&self, kind: EntityKind, route: RouteKey) -> bool {
        self.covered.contains(&(route, kind))
    }

    /// Covered ratio in `[0, 1]` over the given kinds.
    ///
    /// Routes that declare none of `kinds` do not count. With nothing to
    /// count the ratio is `1.0`.
    #[must_use]
    pub fn percentage(&self, kinds: &[EntityKind], policy: CoveragePolicy) -> f64 {
        let mut total = 0usize;
        let mut score = 0.0;

        for (route, declared) in &self.declared {
            match policy {
                CoveragePolicy::Basic => {
                    if kinds.contains(&declared.primary) {
                        total += 1;
                        if self.is_covered(declared.primary, *route) {
                            score += 1.0;
                        }
                    }
                }
                CoveragePolicy::Comprehensive => {
                    let relevant: Vec<_> = declared
                        .kinds
                        .iter()
                        .filter(|kind| kinds.contains(kind))
                        .collect();
                    if relevant.is_empty() {
                        continue;
                    }
                    let hit = relevant
                        .iter()
                        .filter(|kind| self.is_covered(***kind, *route))
                        .count();
                    total += 1;
                    score += hit as f64 / relevant.len() as f64;
                }
            }
        }

        if total == 0 {
            1.0
        } else {
            score / total as f64
        }
    }

    /// Union another tracker's covered set into this one.
    ///
    /// Both must come from the same table; entities `other` covers that this
    /// table does not declare are dropped.
    pub fn merge(&mut self, other: &CoverageState) {
        for (route, kind) in &other.covered {
            self.mark_covered(*kind, *route);
        }
    }
}
