//! routa-check: verify a route table against a test suite.
//!
//! ```text
//! routa-check [OPTIONS] [CONFIG] [TESTS]
//! routa-check -c routes.yaml -t tests.yaml --details --fail-under 90
//! ```
//!
//! Exit status is 0 when every comparison passed and coverage meets the
//! floor, 1 otherwise. Logs go to stderr, filtered by `RUST_LOG`
//! (default `warn`).

use anyhow::{Context, Result};
use clap::Parser;
use routa_check::prelude::*;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug, Clone)]
#[command(name = "routa-check", version)]
#[command(about = "Check a route table against a test suite", long_about = None)]
struct Options {
    /// Route table file (YAML, or JSON by extension)
    #[arg(short = 'c', long = "config-path", value_name = "PATH")]
    config_path: Option<PathBuf>,

    /// Test suite file (YAML, or JSON by extension)
    #[arg(short = 't', long = "test-path", value_name = "PATH")]
    test_path: Option<PathBuf>,

    /// Route table file, when --config-path is not given
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Test suite file, when --test-path is not given
    #[arg(value_name = "TESTS")]
    tests: Option<PathBuf>,

    /// Print every test name, with failure details
    #[arg(short = 'd', long)]
    details: bool,

    /// Print only failing tests
    #[arg(long)]
    only_show_failures: bool,

    /// Fail when route coverage is below this percentage
    #[arg(short = 'f', long, value_name = "PERCENT", value_parser = parse_percent)]
    fail_under: Option<f64>,

    /// Score coverage over every declared entity, not just the route
    #[arg(long)]
    covall: bool,

    /// Accept route tables with fields the schema does not know
    #[arg(long)]
    disable_deprecation_check: bool,
}

impl Options {
    fn config_path(&self) -> Result<&PathBuf> {
        self.config_path
            .as_ref()
            .or(self.config.as_ref())
            .context("no route table given (use --config-path or CONFIG)")
    }

    fn test_path(&self) -> Result<&PathBuf> {
        self.test_path
            .as_ref()
            .or(self.tests.as_ref())
            .context("no test suite given (use --test-path or TESTS)")
    }

    fn harness_options(&self) -> HarnessOptions {
        HarnessOptions {
            details: self.details,
            only_show_failures: self.only_show_failures,
            policy: if self.covall {
                CoveragePolicy::Comprehensive
            } else {
                CoveragePolicy::Basic
            },
            fail_under: self.fail_under,
        }
    }
}

fn parse_percent(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|_| format!("`{s}` is not a number"))?;
    if (0.0..=100.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is not within 0-100"))
    }
}

/// Load, run and report. Returns whether the run passed.
fn run(options: &Options, out: &mut impl Write, err: &mut impl Write) -> Result<bool> {
    let config_path = options.config_path()?;
    let test_path = options.test_path()?;

    let table = load_route_table(config_path, !options.disable_deprecation_check)?;
    let suite = load_test_suite(test_path)?;
    tracing::debug!(
        config = %config_path.display(),
        tests = %test_path.display(),
        cases = suite.tests.len(),
        "checking route table"
    );

    let mut tool = RouterCheckTool::new(&table);
    tool.run_suite(&suite);
    let report = tool.finish(options.harness_options());
    report.render(out, err).context("failed to write report")?;
    Ok(report.passed())
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .try_init();
}

fn main() -> ExitCode {
    let options = Options::parse();
    init_tracing();

    let stdout = io::stdout();
    let stderr = io::stderr();
    match run(&options, &mut stdout.lock(), &mut stderr.lock()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
