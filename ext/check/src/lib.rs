//! routa-check: route table verification harness
//!
//! Replays a test suite of synthesized requests against a route table,
//! compares what the router decided with what each case expects, and tracks
//! which parts of the table the suite exercised.
//!
//! # Example
//!
//! ```
//! use routa::config::RouteConfiguration;
//! use routa::RouteTable;
//! use routa_check::prelude::*;
//!
//! let config: RouteConfiguration = serde_yaml::from_str(r#"
//! virtual_hosts:
//!   - name: www
//!     domains: ["www.example.com"]
//!     routes:
//!       - match: { prefix: / }
//!         route: { cluster: web }
//! "#).unwrap();
//! let table = RouteTable::build(&config).unwrap();
//!
//! let suite: TestSuite = serde_yaml::from_str(r#"
//! - test_name: root
//!   input: { authority: www.example.com, path: / }
//!   validate: { cluster_name: web }
//! "#).unwrap();
//!
//! let mut tool = RouterCheckTool::new(&table);
//! tool.run_suite(&suite);
//! let report = tool.finish(HarnessOptions::default());
//! assert!(report.passed());
//! assert_eq!(report.coverage_percent(), 100.0);
//! ```

mod coverage;
mod harness;
mod load;
mod report;
mod runtime;
mod suite;

pub use coverage::{CoveragePolicy, CoverageState, EntityKind};
pub use harness::{CaseOutcome, Failure, RouterCheckTool};
pub use load::{load_route_config, load_route_table, load_test_suite, CheckError};
pub use report::{HarnessOptions, Report};
pub use runtime::ActiveKeyRuntime;
pub use suite::{HeaderField, TestCase, TestInput, TestSuite, Validate};

/// Common imports for running suites.
pub mod prelude {
    pub use crate::{
        load_route_table, load_test_suite, CheckError, CoveragePolicy, HarnessOptions, Report,
        RouterCheckTool, TestSuite,
    };
}
