//! # Schema Validation
//!
//! Validates each configuration document against the embedded JSON Schema
//! (Draft 2020-12) before any typed deserialization happens. Violations are
//! collected across all documents so an operator sees every problem at once.

use jsonschema::Validator;
use serde_json::Value;

use crate::document::Document;
use crate::error::{ConfigError, ConfigIssue};

/// The configuration schema, embedded at compile time.
pub const CONFIG_SCHEMA: &str = include_str!("../schema/config.schema.json");

/// A compiled validator for configuration documents.
pub struct ConfigValidator {
    validator: Validator,
}

impl std::fmt::Debug for ConfigValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigValidator").finish_non_exhaustive()
    }
}

impl ConfigValidator {
    /// Compile the embedded schema.
    pub fn new() -> Result<Self, ConfigError> {
        let schema: Value =
            serde_json::from_str(CONFIG_SCHEMA).map_err(|e| ConfigError::Schema(e.to_string()))?;
        let validator = jsonschema::options()
            .with_draft(jsonschema::Draft::Draft202012)
            .build(&schema)
            .map_err(|e| ConfigError::Schema(e.to_string()))?;
        Ok(Self { validator })
    }

    /// Every violation in one document.
    pub fn issues(&self, document: &Document) -> Vec<ConfigIssue> {
        self.validator
            .iter_errors(&document.value)
            .map(|err| ConfigIssue {
                document: document.name.clone(),
                pointer: err.instance_path.to_string(),
                message: err.to_string(),
            })
            .collect()
    }

    /// Validate every document, failing with all violations found.
    pub fn validate_all(&self, documents: &[Document]) -> Result<(), ConfigError> {
        let issues: Vec<ConfigIssue> = documents.iter().flat_map(|d| self.issues(d)).collect();
        if issues.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(issues))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn issues(value: Value) -> Vec<ConfigIssue> {
        ConfigValidator::new()
            .unwrap()
            .issues(&Document::new("test", value))
    }

    #[test]
    fn schema_compiles() {
        assert!(ConfigValidator::new().is_ok());
    }

    #[test]
    fn accepts_minimal_and_full_documents() {
        assert!(issues(json!({})).is_empty());
        assert!(issues(json!({
            "port": 8080,
            "anonymousFallback": false,
            "users": [{"name": "alice", "password": "secret"}],
            "repositories": [{
                "name": "releases",
                "path": "/srv/releases",
                "prefixes": ["com.example"],
                "users": [
                    {"name": "alice", "permissions": "rw"},
                    {"type": "anonymous", "permissions": "ro"}
                ]
            }],
            "groups": [{"name": "all", "repositories": "all"}]
        }))
        .is_empty());
    }

    #[test]
    fn rejects_bad_prefixes() {
        for prefixes in [json!(""), json!("x"), json!([])] {
            let found = issues(json!({
                "repositories": [{"name": "r", "path": "/", "prefixes": prefixes}]
            }));
            assert!(!found.is_empty(), "accepted prefixes {prefixes}");
            assert!(found
                .iter()
                .any(|i| i.pointer.starts_with("/repositories/0")));
        }
    }

    #[test]
    fn rejects_non_object_root() {
        assert!(!issues(json!(["repositories"])).is_empty());
        assert!(!issues(Value::Null).is_empty());
    }

    #[test]
    fn rejects_unknown_keys_and_bad_names() {
        assert!(!issues(json!({"prot": 8080})).is_empty());
        assert!(!issues(json!({"repositories": [{"name": "a/b", "path": "/"}]})).is_empty());
        assert!(!issues(json!({"repositories": [{"name": "..", "path": "/"}]})).is_empty());
        assert!(!issues(json!({"users": [{"name": "a:b", "password": "p"}]})).is_empty());
    }

    #[test]
    fn collects_violations_across_documents() {
        let validator = ConfigValidator::new().unwrap();
        let docs = [
            Document::new("a.yaml", json!({"port": 0})),
            Document::new("b.yaml", json!({"repositories": []})),
        ];
        let err = validator.validate_all(&docs).unwrap_err();
        let found = err.issues();
        assert!(found.iter().any(|i| i.document == "a.yaml" && i.pointer == "/port"));
        assert!(found
            .iter()
            .any(|i| i.document == "b.yaml" && i.pointer == "/repositories"));
    }
}
