//! Test-suite schema.
//!
//! ```yaml
//! tests:
//!   - test_name: api goes to backend
//!     input:
//!       authority: api.example.com
//!       path: /api/users
//!       additional_headers:
//!         - { key: x-tenant, value: acme }
//!     validate:
//!       cluster_name: backend
//!       header_fields:
//!         - { key: x-tenant, value: acme }
//! ```
//!
//! A bare list of cases is accepted too, as are the legacy `:authority`,
//! `:path`, `:method` and `field` spellings.

use routa::RequestAttributes;
use serde::de::value::{MapAccessDeserializer, SeqAccessDeserializer};
use serde::de::{MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;

/// An ordered list of test cases.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestSuite {
    pub tests: Vec<TestCase>,
}

#[derive(Deserialize)]
struct SuiteObject {
    tests: Vec<TestCase>,
}

// Shape is picked from the first token; errors inside a case surface as-is.
impl<'de> Deserialize<'de> for TestSuite {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(SuiteVisitor)
    }
}

struct SuiteVisitor;

impl<'de> Visitor<'de> for SuiteVisitor {
    type Value = TestSuite;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map with `tests` or a list of test cases")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, seq: A) -> Result<TestSuite, A::Error> {
        let tests = Vec::deserialize(SeqAccessDeserializer::new(seq))?;
        Ok(TestSuite { tests })
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<TestSuite, A::Error> {
        let SuiteObject { tests } = SuiteObject::deserialize(MapAccessDeserializer::new(map))?;
        Ok(TestSuite { tests })
    }
}

/// One test case: a request and what routing it must produce.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TestCase {
    #[serde(default)]
    pub test_name: String,
    pub input: TestInput,
    #[serde(default)]
    pub validate: Validate,
}

/// The synthesized request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TestInput {
    #[serde(alias = ":authority")]
    pub authority: String,
    #[serde(alias = ":path")]
    pub path: String,
    #[serde(default = "default_method", alias = ":method")]
    pub method: String,
    #[serde(default)]
    pub ssl: bool,
    #[serde(default)]
    pub internal: bool,
    #[serde(default)]
    pub random_value: u64,
    /// The one runtime key active for this case. Empty means none.
    #[serde(default)]
    pub runtime: Option<String>,
    #[serde(default)]
    pub additional_headers: Vec<HeaderField>,
}

impl Default for TestInput {
    fn default() -> Self {
        Self {
            authority: String::new(),
            path: String::new(),
            method: default_method(),
            ssl: false,
            internal: false,
            random_value: 0,
            runtime: None,
            additional_headers: Vec::new(),
        }
    }
}

fn default_method() -> String {
    "GET".to_owned()
}

impl TestInput {
    /// Build the request the router will see.
    #[must_use]
    pub fn to_request(&self) -> RequestAttributes {
        let mut builder = RequestAttributes::builder()
            .authority(&self.authority)
            .path(&self.path)
            .method(&self.method)
            .secure(self.ssl)
            .internal(self.internal)
            .random_value(self.random_value);
        if let Some(key) = self.runtime.as_deref().filter(|key| !key.is_empty()) {
            builder = builder.active_runtime_key(key);
        }
        for header in &self.additional_headers {
            builder = builder.header(&header.key, &header.value);
        }
        builder.build()
    }
}

/// A header name and value.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeaderField {
    #[serde(alias = "field")]
    pub key: String,
    pub value: String,
}

/// Expected values. Absent fields are not checked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Validate {
    pub cluster_name: Option<String>,
    pub virtual_cluster_name: Option<String>,
    pub virtual_host_name: Option<String>,
    pub path_rewrite: Option<String>,
    pub host_rewrite: Option<String>,
    pub path_redirect: Option<String>,
    /// Checked against the request as received.
    pub header_fields: Vec<HeaderField>,
    /// Checked against the request after route header changes.
    pub custom_header_fields: Vec<HeaderField>,
}

impl Validate {
    /// Whether nothing is asserted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_form() {
        let suite: TestSuite = serde_yaml::from_str(
            r#"
tests:
  - test_name: one
    input:
      authority: www.example.com
      path: /api
      ssl: true
      random_value: 7
      runtime: canary
      additional_headers:
        - { key: X-Tenant, value: acme }
    validate:
      cluster_name: backend
      header_fields:
        - { key: x-tenant, value: acme }
"#,
        )
        .unwrap();

        assert_eq!(suite.tests.len(), 1);
        let case = &suite.tests[0];
        assert_eq!(case.test_name, "one");
        assert_eq!(case.input.method, "GET");
        assert_eq!(case.validate.cluster_name.as_deref(), Some("backend"));
        assert_eq!(case.validate.header_fields.len(), 1);

        let req = case.input.to_request();
        assert!(req.is_secure());
        assert_eq!(req.random_value(), 7);
        assert_eq!(req.active_runtime_key(), Some("canary"));
        assert_eq!(req.header("x-tenant"), Some("acme"));
    }

    #[test]
    fn legacy_list_form() {
        let suite: TestSuite = serde_json::from_str(
            r#"[{
                "test_name": "legacy",
                "input": {
                    ":authority": "api.com",
                    ":path": "/",
                    ":method": "POST",
                    "additional_headers": [{ "field": "x-a", "value": "1" }]
                },
                "validate": { "custom_header_fields": [{ "field": "x-b", "value": "2" }] }
            }]"#,
        )
        .unwrap();

        let case = &suite.tests[0];
        assert_eq!(case.input.authority, "api.com");
        assert_eq!(case.input.method, "POST");
        assert_eq!(case.input.additional_headers[0].key, "x-a");
        assert_eq!(case.validate.custom_header_fields[0].key, "x-b");
    }

    #[test]
    fn validate_defaults_to_empty() {
        let suite: TestSuite =
            serde_yaml::from_str("- input: { authority: a, path: / }").unwrap();
        assert!(suite.tests[0].validate.is_empty());
        assert_eq!(suite.tests[0].test_name, "");
    }

    #[test]
    fn unknown_validate_field_is_rejected() {
        let err = serde_yaml::from_str::<TestSuite>(
            "- input: { authority: a, path: / }\n  validate: { cluster: x }",
        );
        assert!(err.is_err());
    }

    #[test]
    fn field_errors_name_the_field() {
        let err = serde_yaml::from_str::<TestSuite>(
            "tests:\n  - input: { authority: a, path: / }\n    validate: { clustername: x }",
        )
        .unwrap_err();
        assert!(err.to_string().contains("clustername"), "{err}");

        let err = serde_json::from_str::<TestSuite>(
            r#"[{ "input": { "authority": "a", "path": "/", "methd": "GET" } }]"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("methd"), "{err}");
    }

    #[test]
    fn scalar_suite_is_rejected() {
        let err = serde_yaml::from_str::<TestSuite>("just text").unwrap_err();
        assert!(err.to_string().contains("list of test cases"), "{err}");
    }

    #[test]
    fn empty_runtime_key_is_no_key() {
        let input = TestInput {
            runtime: Some(String::new()),
            ..TestInput::default()
        };
        assert_eq!(input.to_request().active_runtime_key(), None);
    }
}
