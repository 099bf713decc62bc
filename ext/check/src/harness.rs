//! Verification Harness: replays test cases against a route table.
//!
//! Per case: build the request, route it, then compare every declared
//! expectation in a fixed order. A request that matches nothing still has
//! every expectation compared, against `""`. Mismatches are recorded and never
//! stop the run; exact matches mark the corresponding coverage entity.

use crate::coverage::{CoverageState, EntityKind};
use crate::report::{HarnessOptions, Report};
use crate::runtime::ActiveKeyRuntime;
use crate::suite::{HeaderField, TestCase, TestSuite};
use routa::{HeaderMap, ResolvedAction, RouteKey, RouteTable, RoutingDecision, RuntimeSource};
use std::fmt;

static ACTIVE_KEY_RUNTIME: ActiveKeyRuntime = ActiveKeyRuntime;

// ═══════════════════════════════════════════════════════════════════════════════
// Results
// ═══════════════════════════════════════════════════════════════════════════════

/// One failed comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    /// The value the test case declared.
    pub expected: String,
    /// The value routing produced, `""` when there was none.
    pub actual: String,
    /// The expectation that failed, e.g. `cluster_name` or `check_header`.
    pub test_type: &'static str,
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "expected: [{}], actual: [{}], test type: {}",
            self.expected, self.actual, self.test_type
        )
    }
}

/// The result of one test case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseOutcome {
    /// The case's `test_name`, possibly empty.
    pub test_name: String,
    /// The route the request reached, if any.
    pub route: Option<RouteKey>,
    /// Failed comparisons, in comparison order.
    pub failures: Vec<Failure>,
}

impl CaseOutcome {
    /// Whether every comparison matched.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RouterCheckTool
// ═══════════════════════════════════════════════════════════════════════════════

/// Runs test cases against one table and accumulates results and coverage.
///
/// One tool is one run. Cases are processed in order on the calling thread.
#[derive(Debug)]
pub struct RouterCheckTool<'t> {
    table: &'t RouteTable,
    runtime: &'t dyn RuntimeSource,
    coverage: CoverageState,
    outcomes: Vec<CaseOutcome>,
}

impl<'t> RouterCheckTool<'t> {
    /// A fresh run against `table`, using [`ActiveKeyRuntime`].
    #[must_use]
    pub fn new(table: &'t RouteTable) -> Self {
        Self {
            table,
            runtime: &ACTIVE_KEY_RUNTIME,
            coverage: CoverageState::new(table),
            outcomes: Vec::new(),
        }
    }

    /// Replace the runtime used to evaluate route gates.
    #[must_use]
    pub fn with_runtime(mut self, runtime: &'t dyn RuntimeSource) -> Self {
        self.runtime = runtime;
        self
    }

    /// Run every case of a suite.
    pub fn run_suite(&mut self, suite: &TestSuite) {
        for case in &suite.tests {
            self.run_case(case);
        }
    }

    /// Run one case and record its outcome.
    pub fn run_case(&mut self, case: &TestCase) -> &CaseOutcome {
        let request = case.input.to_request();
        let decision = self.table.route(&request, self.runtime);
        let received = request.to_header_map();
        let finalized = finalized_headers(&decision, &received);

        let mut check = Comparison {
            coverage: &mut self.coverage,
            route: decision.route_key(),
            failures: Vec::new(),
        };
        let expected = &case.validate;
        let finalized_get = |name: &str| {
            finalized
                .as_ref()
                .and_then(|headers| headers.get(name))
                .unwrap_or("")
        };

        if let Some(want) = &expected.cluster_name {
            let actual = decision.cluster_name().unwrap_or("");
            check.compare("cluster_name", want, actual, Some(EntityKind::Cluster));
        }
        if let Some(want) = &expected.virtual_cluster_name {
            let actual = decision.virtual_cluster_name().unwrap_or("");
            check.compare(
                "virtual_cluster_name",
                want,
                actual,
                Some(EntityKind::VirtualCluster),
            );
        }
        if let Some(want) = &expected.virtual_host_name {
            let actual = decision
                .route()
                .and(decision.virtual_host())
                .map_or("", |vh| vh.name());
            check.compare(
                "virtual_host_name",
                want,
                actual,
                Some(EntityKind::VirtualHost),
            );
        }
        if let Some(want) = &expected.path_rewrite {
            let actual = finalized_get(":path");
            check.compare("path_rewrite", want, actual, Some(EntityKind::PathRewrite));
        }
        if let Some(want) = &expected.host_rewrite {
            let actual = finalized_get(":authority");
            check.compare("host_rewrite", want, actual, Some(EntityKind::HostRewrite));
        }
        if let Some(want) = &expected.path_redirect {
            let actual = decision.redirect_location().unwrap_or("");
            check.compare(
                "path_redirect",
                want,
                actual,
                Some(EntityKind::RedirectPath),
            );
        }
        for HeaderField { key, value } in &expected.header_fields {
            let actual = received.get(key).unwrap_or("");
            check.compare("check_header", value, actual, None);
        }
        for HeaderField { key, value } in &expected.custom_header_fields {
            let actual = finalized_get(key);
            check.compare("custom_header", value, actual, None);
        }

        let outcome = CaseOutcome {
            test_name: case.test_name.clone(),
            route: check.route,
            failures: check.failures,
        };
        for failure in &outcome.failures {
            tracing::warn!(test = %outcome.test_name, %failure, "comparison failed");
        }
        tracing::debug!(
            test = %outcome.test_name,
            route = ?outcome.route,
            passed = outcome.passed(),
            "test case"
        );

        self.outcomes.push(outcome);
        let last = self.outcomes.len() - 1;
        &self.outcomes[last]
    }

    /// Outcomes so far, in run order.
    #[must_use]
    pub fn outcomes(&self) -> &[CaseOutcome] {
        &self.outcomes
    }

    /// Coverage so far.
    #[must_use]
    pub fn coverage(&self) -> &CoverageState {
        &self.coverage
    }

    /// Fold in coverage gathered by another run over the same table.
    pub fn merge_coverage(&mut self, other: &CoverageState) {
        self.coverage.merge(other);
    }

    /// Whether every case so far passed.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.outcomes.iter().all(CaseOutcome::passed)
    }

    /// End the run and score it.
    #[must_use]
    pub fn finish(self, options: HarnessOptions) -> Report {
        let coverage = self
            .coverage
            .percentage(&EntityKind::ALL, options.policy)
            * 100.0;
        Report::new(self.outcomes, coverage, options)
    }
}

/// Finalized headers for a cluster action; other outcomes carry no header
/// changes.
fn finalized_headers(decision: &RoutingDecision<'_>, received: &HeaderMap) -> Option<HeaderMap> {
    match decision.action() {
        Some(ResolvedAction::Cluster(_)) => {
            let mut headers = received.clone();
            decision.finalize_request_headers(&mut headers);
            Some(headers)
        }
        _ => None,
    }
}

struct Comparison<'a> {
    coverage: &'a mut CoverageState,
    route: Option<RouteKey>,
    failures: Vec<Failure>,
}

impl Comparison<'_> {
    fn compare(
        &mut self,
        test_type: &'static str,
        expected: &str,
        actual: &str,
        entity: Option<EntityKind>,
    ) {
        if expected == actual {
            if let (Some(kind), Some(route)) = (entity, self.route) {
                self.coverage.mark_covered(kind, route);
            }
        } else {
            self.failures.push(Failure {
                expected: expected.to_owned(),
                actual: actual.to_owned(),
                test_type,
            });
        }
    }
}
