//! Loading route tables and test suites from disk.
//!
//! `.json` files are read as JSON, everything else as YAML. Both go through a
//! [`serde_json::Value`] first so the strict check can see the raw document.

use crate::suite::TestSuite;
use routa::config::{unknown_fields, RouteConfiguration};
use routa::{ConfigError, RouteTable};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Failure to load a route table or test suite.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("{}: unknown fields: {}", path.display(), fields.join(", "))]
    UnknownFields { path: PathBuf, fields: Vec<String> },

    #[error("invalid route table {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: ConfigError,
    },
}

/// Read a route configuration.
///
/// With `strict`, keys the schema does not know are an error instead of
/// being ignored.
///
/// # Errors
///
/// I/O, parse, or (when strict) unknown-field failures, with the path.
pub fn load_route_config(path: &Path, strict: bool) -> Result<RouteConfiguration, CheckError> {
    let raw = read_value(path)?;
    let config: RouteConfiguration = from_value(path, raw.clone())?;

    if strict {
        let typed = serde_json::to_value(&config).map_err(|err| CheckError::Parse {
            path: path.to_owned(),
            message: err.to_string(),
        })?;
        let fields = unknown_fields(&raw, &typed);
        if !fields.is_empty() {
            return Err(CheckError::UnknownFields {
                path: path.to_owned(),
                fields,
            });
        }
    }
    Ok(config)
}

/// Read a route configuration and build its table.
///
/// # Errors
///
/// As [`load_route_config`], plus [`CheckError::Config`] when the table
/// cannot be built.
pub fn load_route_table(path: &Path, strict: bool) -> Result<RouteTable, CheckError> {
    let config = load_route_config(path, strict)?;
    let table = RouteTable::build(&config).map_err(|source| CheckError::Config {
        path: path.to_owned(),
        source,
    })?;
    tracing::debug!(
        path = %path.display(),
        routes = table.route_count(),
        "route table loaded"
    );
    Ok(table)
}

/// Read a test suite.
///
/// # Errors
///
/// I/O or parse failures, with the path.
pub fn load_test_suite(path: &Path) -> Result<TestSuite, CheckError> {
    let suite: TestSuite = from_value(path, read_value(path)?)?;
    tracing::debug!(path = %path.display(), cases = suite.tests.len(), "test suite loaded");
    Ok(suite)
}

fn read_value(path: &Path) -> Result<serde_json::Value, CheckError> {
    let text = std::fs::read_to_string(path).map_err(|source| CheckError::Io {
        path: path.to_owned(),
        source,
    })?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let parsed = if is_json {
        serde_json::from_str(&text).map_err(|err| err.to_string())
    } else {
        serde_yaml::from_str(&text).map_err(|err| err.to_string())
    };
    parsed.map_err(|message| CheckError::Parse {
        path: path.to_owned(),
        message,
    })
}

fn from_value<T: DeserializeOwned>(path: &Path, value: serde_json::Value) -> Result<T, CheckError> {
    serde_json::from_value(value).map_err(|err| CheckError::Parse {
        path: path.to_owned(),
        message: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("tests/fixtures")
            .join(name)
    }

    #[test]
    fn loads_yaml_fixture() {
        let table = load_route_table(&fixture("basic.routes.yaml"), true).unwrap();
        assert!(table.route_count() > 0);
        let suite = load_test_suite(&fixture("basic.tests.yaml")).unwrap();
        assert!(!suite.tests.is_empty());
    }

    #[test]
    fn loads_legacy_json_fixture() {
        let table = load_route_table(&fixture("legacy.routes.json"), true).unwrap();
        assert!(table.route_count() > 0);
        let suite = load_test_suite(&fixture("legacy.tests.json")).unwrap();
        assert!(!suite.tests.is_empty());
    }

    #[test]
    fn missing_file_names_path() {
        let err = load_test_suite(Path::new("/nonexistent/suite.yaml")).unwrap_err();
        assert!(matches!(err, CheckError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/suite.yaml"));
    }

    #[test]
    fn unknown_fields_only_when_strict() {
        let path = fixture("unknown_field.routes.yaml");
        let err = load_route_config(&path, true).unwrap_err();
        let CheckError::UnknownFields { fields, .. } = &err else {
            panic!("expected unknown fields, got {err}");
        };
        assert_eq!(*fields, ["/virtual_hosts/0/routes/0/route/retry_policy"]);

        assert!(load_route_config(&path, false).is_ok());
    }
}
