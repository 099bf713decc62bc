//! Replays the fixture suites in `tests/fixtures` end to end.
//!
//! Each `<name>.tests.{yaml,json}` runs against `<name>.routes.{yaml,json}`.

use routa_check::prelude::*;
use routa_check::{CheckError, EntityKind};
use std::fs;
use std::path::{Path, PathBuf};

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}

/// Find the route table that pairs with a suite file.
fn routes_for(suite: &Path) -> PathBuf {
    let name = suite.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    let stem = name.split(".tests.").next().unwrap_or(name);
    ["yaml", "json"]
        .iter()
        .map(|ext| suite.with_file_name(format!("{stem}.routes.{ext}")))
        .find(|p| p.exists())
        .unwrap_or_else(|| panic!("no route table for {}", suite.display()))
}

fn run(name: &str, options: HarnessOptions) -> Report {
    let dir = fixtures_dir();
    let suite_path = ["yaml", "json"]
        .iter()
        .map(|ext| dir.join(format!("{name}.tests.{ext}")))
        .find(|p| p.exists())
        .unwrap_or_else(|| panic!("no suite named {name}"));

    let table = load_route_table(&routes_for(&suite_path), true)
        .unwrap_or_else(|e| panic!("{}: {e}", suite_path.display()));
    let suite = load_test_suite(&suite_path).unwrap_or_else(|e| panic!("{e}"));

    let mut tool = RouterCheckTool::new(&table);
    tool.run_suite(&suite);
    tool.finish(options)
}

fn assert_passed(report: &Report) {
    for outcome in report.outcomes() {
        for failure in &outcome.failures {
            println!("  {}: {failure}", outcome.test_name);
        }
    }
    assert!(report.passed(), "{} failed comparisons", report.failure_count());
}

#[test]
fn every_passing_fixture() {
    for entry in fs::read_dir(fixtures_dir()).expect("read fixtures") {
        let path = entry.expect("dir entry").path();
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        let Some((stem, _)) = name.split_once(".tests.") else {
            continue;
        };
        if stem == "mismatch" {
            continue;
        }
        println!("Running fixture: {}", path.display());
        assert_passed(&run(stem, HarnessOptions::default()));
    }
}

#[test]
fn basic_suite_covers_every_route() {
    let report = run("basic", HarnessOptions::default());
    assert_passed(&report);
    assert_eq!(report.coverage_percent(), 100.0);

    let comprehensive = run(
        "basic",
        HarnessOptions {
            policy: CoveragePolicy::Comprehensive,
            fail_under: Some(100.0),
            ..HarnessOptions::default()
        },
    );
    assert_passed(&comprehensive);
    assert_eq!(comprehensive.coverage_percent(), 100.0);
}

#[test]
fn legacy_json_suite() {
    let report = run("legacy", HarnessOptions::default());
    assert_passed(&report);
    assert_eq!(report.coverage_percent(), 100.0);
}

#[test]
fn mismatch_is_reported_and_run_continues() {
    let report = run(
        "mismatch",
        HarnessOptions {
            only_show_failures: true,
            ..HarnessOptions::default()
        },
    );
    assert!(!report.passed());
    assert_eq!(report.failure_count(), 1);
    assert_eq!(report.outcomes().len(), 2);
    assert!(report.outcomes()[1].passed());

    let mut out = Vec::new();
    let mut err = Vec::new();
    report.render(&mut out, &mut err).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "case differs\nCurrent route coverage: 50%\n"
    );
    assert_eq!(
        String::from_utf8(err).unwrap(),
        "expected: [A], actual: [a], test type: cluster_name\n"
    );
}

#[test]
fn coverage_floor_fails_the_run() {
    let report = run(
        "mismatch",
        HarnessOptions {
            fail_under: Some(75.0),
            ..HarnessOptions::default()
        },
    );
    assert!(!report.coverage_met());
}

#[test]
fn parallel_runs_merge_coverage() {
    let dir = fixtures_dir();
    let table = load_route_table(&dir.join("basic.routes.yaml"), true).unwrap();
    let suite = load_test_suite(&dir.join("basic.tests.yaml")).unwrap();
    let (left, right) = suite.tests.split_at(suite.tests.len() / 2);

    let [mut first, second] = std::thread::scope(|scope| {
        [left, right]
            .map(|cases| {
                let table = &table;
                scope.spawn(move || {
                    let mut tool = RouterCheckTool::new(table);
                    for case in cases {
                        tool.run_case(case);
                    }
                    tool
                })
            })
            .map(|handle| handle.join().unwrap())
    });

    let alone = first
        .coverage()
        .percentage(&EntityKind::ALL, CoveragePolicy::Comprehensive);
    assert!(alone < 1.0, "half the suite covered everything");

    first.merge_coverage(second.coverage());
    assert!(first.all_passed() && second.all_passed());
    assert_eq!(
        first
            .coverage()
            .percentage(&EntityKind::ALL, CoveragePolicy::Comprehensive),
        1.0
    );

    let report = first.finish(HarnessOptions {
        policy: CoveragePolicy::Comprehensive,
        ..HarnessOptions::default()
    });
    assert_eq!(report.coverage_percent(), 100.0);
}

#[test]
fn strict_check_rejects_unknown_fields() {
    let err = load_route_table(&fixtures_dir().join("unknown_field.routes.yaml"), true)
        .unwrap_err();
    assert!(matches!(err, CheckError::UnknownFields { .. }), "{err}");
}
