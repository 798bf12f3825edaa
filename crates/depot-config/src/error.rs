//! Configuration errors.
//!
//! Every variant is fatal: the gateway refuses to start on any of them.

use std::fmt;
use std::path::PathBuf;

use depot_core::ModelError;
use thiserror::Error;

/// A single schema violation, located by document and JSON Pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    /// The document the violation was found in (usually a file path).
    pub document: String,
    /// JSON Pointer to the offending value; empty for the document root.
    pub pointer: String,
    /// Human-readable description.
    pub message: String,
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pointer = if self.pointer.is_empty() {
            "/"
        } else {
            self.pointer.as_str()
        };
        write!(f, "{} at {}: {}", self.document, pointer, self.message)
    }
}

/// Errors returned while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A configuration file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// The file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A document is not well-formed YAML.
    #[error("failed to parse {document}: {reason}")]
    Parse {
        /// The document.
        document: String,
        /// Parser message.
        reason: String,
    },

    /// The embedded schema failed to compile.
    #[error("failed to compile configuration schema: {0}")]
    Schema(String),

    /// One or more schema violations, across every document.
    #[error("{}", summarize(.0))]
    Invalid(Vec<ConfigIssue>),

    /// A repository path is missing or not a directory.
    #[error("repository {repository}: {} {reason}", path.display())]
    RepositoryPath {
        /// Repository name.
        repository: String,
        /// The configured path.
        path: PathBuf,
        /// What is wrong with it.
        reason: String,
    },

    /// A group names a repository that is not declared.
    #[error("group {group} references unknown repository {repository}")]
    UnknownRepository {
        /// Group name.
        group: String,
        /// The missing repository.
        repository: String,
    },

    /// A permission entry names a user that is not declared.
    #[error("{container} grants permissions to unknown user {user}")]
    UnknownUser {
        /// Container holding the entry.
        container: String,
        /// The missing user.
        user: String,
    },

    /// A model invariant was violated while building the registry.
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl ConfigError {
    /// The schema violations, if this is an [`Invalid`](Self::Invalid) error.
    pub fn issues(&self) -> &[ConfigIssue] {
        match self {
            Self::Invalid(issues) => issues,
            _ => &[],
        }
    }
}

fn summarize(issues: &[ConfigIssue]) -> String {
    let joined = issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ");
    format!("invalid configuration ({} issue(s)): {joined}", issues.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_lists_every_issue() {
        let err = ConfigError::Invalid(vec![
            ConfigIssue {
                document: "a.yaml".into(),
                pointer: "/port".into(),
                message: "0 is less than the minimum of 1".into(),
            },
            ConfigIssue {
                document: "b.yaml".into(),
                pointer: String::new(),
                message: "\"repositories\" is a required property".into(),
            },
        ]);
        let msg = err.to_string();
        assert!(msg.starts_with("invalid configuration (2 issue(s))"));
        assert!(msg.contains("a.yaml at /port: 0 is less"));
        assert!(msg.contains("b.yaml at /: \"repositories\""));
        assert_eq!(err.issues().len(), 2);
    }

    #[test]
    fn model_errors_pass_through() {
        let err = ConfigError::from(ModelError::DuplicateUser("bob".into()));
        assert_eq!(err.to_string(), "duplicate user name: bob");
        assert!(err.issues().is_empty());
    }
}
