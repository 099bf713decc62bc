//! Run report: per-case lines, coverage and the overall verdict.

use crate::coverage::CoveragePolicy;
use crate::harness::CaseOutcome;
use std::io::{self, Write};

/// Reporting and scoring options for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HarnessOptions {
    /// Print every test name.
    pub details: bool,
    /// Print only failing test names.
    pub only_show_failures: bool,
    /// How route coverage is scored.
    pub policy: CoveragePolicy,
    /// Coverage floor in percent, `0..=100`.
    pub fail_under: Option<f64>,
}

/// The scored result of a finished run.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    outcomes: Vec<CaseOutcome>,
    coverage_percent: f64,
    options: HarnessOptions,
}

impl Report {
    /// Score outcomes already gathered. `coverage_percent` is in `0..=100`.
    #[must_use]
    pub fn new(outcomes: Vec<CaseOutcome>, coverage_percent: f64, options: HarnessOptions) -> Self {
        Self {
            outcomes,
            coverage_percent,
            options,
        }
    }

    /// Per-case outcomes, in run order.
    #[must_use]
    pub fn outcomes(&self) -> &[CaseOutcome] {
        &self.outcomes
    }

    /// Route coverage in percent.
    #[must_use]
    pub fn coverage_percent(&self) -> f64 {
        self.coverage_percent
    }

    /// Number of failed comparisons across all cases.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.outcomes.iter().map(|o| o.failures.len()).sum()
    }

    /// Whether the coverage floor, if any, is met.
    #[must_use]
    pub fn coverage_met(&self) -> bool {
        self.options
            .fail_under
            .map_or(true, |floor| self.coverage_percent >= floor)
    }

    /// No failed comparison and the coverage floor met.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.failure_count() == 0 && self.coverage_met()
    }

    /// Write the human-readable report.
    ///
    /// Test names go to `out`, each followed by its failure lines on `err`.
    /// Which names are printed depends on `details` and
    /// `only_show_failures`. The coverage line always goes to `out`.
    ///
    /// # Errors
    ///
    /// Returns the first write error.
    pub fn render(&self, out: &mut impl Write, err: &mut impl Write) -> io::Result<()> {
        let HarnessOptions {
            details,
            only_show_failures,
            ..
        } = self.options;

        for outcome in &self.outcomes {
            let show = (details && !only_show_failures) || (only_show_failures && !outcome.passed());
            if !show {
                continue;
            }
            writeln!(out, "{}", outcome.test_name)?;
            for failure in &outcome.failures {
                writeln!(err, "{failure}")?;
            }
        }

        writeln!(
            out,
            "Current route coverage: {}%",
            format_percent(self.coverage_percent)
        )?;
        if let Some(floor) = self.options.fail_under {
            if !self.coverage_met() {
                tracing::warn!(
                    coverage = self.coverage_percent,
                    floor,
                    "coverage below floor"
                );
                writeln!(
                    err,
                    "Failed to meet coverage requirement: {}%",
                    format_percent(floor)
                )?;
            }
        }
        Ok(())
    }
}

/// Six significant digits, trailing zeros dropped: `100`, `66.6667`, `12.5`.
fn format_percent(value: f64) -> String {
    let int_digits = if value >= 1.0 {
        // percentages stay within 0..=100
        value.log10().floor() as usize + 1
    } else {
        1
    };
    let decimals = 6usize.saturating_sub(int_digits);
    let text = format!("{value:.decimals$}");
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_owned()
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::Failure;

    fn outcome(name: &str, failures: usize) -> CaseOutcome {
        CaseOutcome {
            test_name: name.to_owned(),
            route: None,
            failures: (0..failures)
                .map(|_| Failure {
                    expected: "a".into(),
                    actual: "b".into(),
                    test_type: "cluster_name",
                })
                .collect(),
        }
    }

    fn render(report: &Report) -> (String, String) {
        let mut out = Vec::new();
        let mut err = Vec::new();
        report.render(&mut out, &mut err).unwrap();
        (String::from_utf8(out).unwrap(), String::from_utf8(err).unwrap())
    }

    #[test]
    fn percent_formatting() {
        assert_eq!(format_percent(100.0), "100");
        assert_eq!(format_percent(200.0 / 3.0), "66.6667");
        assert_eq!(format_percent(12.5), "12.5");
        assert_eq!(format_percent(0.0), "0");
        assert_eq!(format_percent(0.5), "0.5");
    }

    #[test]
    fn quiet_by_default() {
        let report = Report::new(vec![outcome("ok", 0), outcome("bad", 1)], 50.0, HarnessOptions::default());
        let (out, err) = render(&report);
        assert_eq!(out, "Current route coverage: 50%\n");
        assert_eq!(err, "");
        assert!(!report.passed());
        assert_eq!(report.failure_count(), 1);
    }

    #[test]
    fn details_prints_every_name() {
        let options = HarnessOptions {
            details: true,
            ..HarnessOptions::default()
        };
        let report = Report::new(vec![outcome("ok", 0), outcome("bad", 1)], 100.0, options);
        let (out, err) = render(&report);
        assert_eq!(out, "ok\nbad\nCurrent route coverage: 100%\n");
        assert_eq!(err, "expected: [a], actual: [b], test type: cluster_name\n");
    }

    #[test]
    fn only_failures_wins_over_details() {
        let options = HarnessOptions {
            details: true,
            only_show_failures: true,
            ..HarnessOptions::default()
        };
        let report = Report::new(vec![outcome("ok", 0), outcome("bad", 2)], 100.0, options);
        let (out, err) = render(&report);
        assert_eq!(out, "bad\nCurrent route coverage: 100%\n");
        assert_eq!(err.lines().count(), 2);
    }

    #[test]
    fn coverage_floor() {
        let options = HarnessOptions {
            fail_under: Some(80.0),
            ..HarnessOptions::default()
        };
        let report = Report::new(vec![outcome("ok", 0)], 75.0, options);
        assert!(!report.coverage_met());
        assert!(!report.passed());
        let (_, err) = render(&report);
        assert_eq!(err, "Failed to meet coverage requirement: 80%\n");

        let report = Report::new(vec![outcome("ok", 0)], 80.0, options);
        assert!(report.passed());
    }
}
