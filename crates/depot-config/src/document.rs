//! # Configuration Documents
//!
//! A [`Document`] is one parsed YAML (or JSON) source. Each is validated on
//! its own, deserialized into a [`ConfigFragment`], and the fragments are
//! folded together with [`ConfigFragment::merge`]: a top-level key present
//! in a later fragment replaces the earlier value wholesale.

use std::fmt;
use std::path::PathBuf;

use depot_core::Permission;
use serde::Deserialize;
use serde_json::Value;

use crate::error::ConfigError;

/// A named, parsed configuration source.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Where the document came from, used in error messages.
    pub name: String,
    /// The parsed content.
    pub value: Value,
}

impl Document {
    /// Wrap an already-parsed value.
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// Parse YAML text. JSON is accepted as a subset of YAML.
    pub fn parse(name: impl Into<String>, content: &str) -> Result<Self, ConfigError> {
        let name = name.into();
        let value: Value = serde_yaml::from_str(content).map_err(|e| ConfigError::Parse {
            document: name.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self { name, value })
    }
}

/// The typed content of one document. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfigFragment {
    /// Listen port.
    pub port: Option<u16>,
    /// Declared users.
    pub users: Option<Vec<UserSpec>>,
    /// Declared repositories.
    pub repositories: Option<Vec<RepositorySpec>>,
    /// Declared groups.
    pub groups: Option<Vec<GroupSpec>>,
    /// Whether `anonymous` grants also apply to authenticated users.
    pub anonymous_fallback: Option<bool>,
}

impl ConfigFragment {
    /// Overlay `later` on top of `self`, key by key.
    pub fn merge(self, later: ConfigFragment) -> ConfigFragment {
        ConfigFragment {
            port: later.port.or(self.port),
            users: later.users.or(self.users),
            repositories: later.repositories.or(self.repositories),
            groups: later.groups.or(self.groups),
            anonymous_fallback: later.anonymous_fallback.or(self.anonymous_fallback),
        }
    }
}

/// A user and their plaintext password.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserSpec {
    /// User name.
    pub name: String,
    /// Plaintext password; hashed when the registry is built.
    pub password: String,
}

impl fmt::Debug for UserSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserSpec")
            .field("name", &self.name)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// A repository declaration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepositorySpec {
    /// Container name.
    pub name: String,
    /// Backing directory, absolute or relative to the working directory.
    pub path: PathBuf,
    /// Routing prefixes; absent means catch-all.
    #[serde(default)]
    pub prefixes: Option<PrefixesSpec>,
    /// Permission entries.
    #[serde(default)]
    pub users: Vec<GrantSpec>,
}

/// The `prefixes` value of a repository.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PrefixesSpec {
    /// `any` or `all`.
    Keyword(String),
    /// Explicit prefixes such as `com.example`.
    List(Vec<String>),
}

/// A group declaration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupSpec {
    /// Container name.
    pub name: String,
    /// Member repositories.
    pub repositories: MembersSpec,
    /// Permission entries.
    #[serde(default)]
    pub users: Vec<GrantSpec>,
}

/// The `repositories` value of a group.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum MembersSpec {
    /// `all`: every repository, in declared order.
    Keyword(String),
    /// Repository names.
    List(Vec<String>),
}

/// One permission entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum GrantSpec {
    /// `{name, permissions}`.
    User {
        /// User name.
        name: String,
        /// Granted level.
        permissions: Permission,
    },
    /// `{type, permissions}`.
    Pseudo {
        /// `anonymous` or `authenticated`.
        #[serde(rename = "type")]
        kind: PseudoPrincipal,
        /// Granted level.
        permissions: Permission,
    },
}

/// The pseudo-principals a grant may name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PseudoPrincipal {
    /// Every caller.
    Anonymous,
    /// Every caller with valid credentials.
    Authenticated,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fragment(value: Value) -> ConfigFragment {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn later_keys_replace_earlier_ones_wholesale() {
        let first = fragment(json!({
            "port": 9000,
            "users": [{"name": "a", "password": "x"}],
            "repositories": [{"name": "r1", "path": "/srv/r1"}],
        }));
        let second = fragment(json!({
            "users": [{"name": "b", "password": "y"}, {"name": "c", "password": "z"}],
        }));

        let merged = first.merge(second);
        assert_eq!(merged.port, Some(9000));
        let users = merged.users.unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].name, "b");
        assert_eq!(merged.repositories.unwrap()[0].name, "r1");
        assert_eq!(merged.groups, None);
    }

    #[test]
    fn merge_with_empty_is_identity() {
        let only = fragment(json!({"port": 1, "anonymousFallback": false}));
        assert_eq!(only.clone().merge(ConfigFragment::default()), only);
        assert_eq!(ConfigFragment::default().merge(only.clone()), only);
    }

    #[test]
    fn grants_deserialize_both_shapes() {
        let repo: RepositorySpec = serde_json::from_value(json!({
            "name": "r",
            "path": "/srv/r",
            "prefixes": "any",
            "users": [
                {"name": "alice", "permissions": "rw"},
                {"type": "anonymous", "permissions": "ro"},
            ],
        }))
        .unwrap();
        assert_eq!(repo.prefixes, Some(PrefixesSpec::Keyword("any".into())));
        assert_eq!(
            repo.users,
            vec![
                GrantSpec::User {
                    name: "alice".into(),
                    permissions: Permission::ReadWrite
                },
                GrantSpec::Pseudo {
                    kind: PseudoPrincipal::Anonymous,
                    permissions: Permission::ReadOnly
                },
            ]
        );
    }

    #[test]
    fn parses_yaml() {
        let doc = Document::parse(
            "inline",
            "port: 8081\nrepositories:\n  - name: r\n    path: /srv/r\n    prefixes: [com.example]\n",
        )
        .unwrap();
        let parsed: ConfigFragment = serde_json::from_value(doc.value).unwrap();
        assert_eq!(parsed.port, Some(8081));
        assert_eq!(
            parsed.repositories.unwrap()[0].prefixes,
            Some(PrefixesSpec::List(vec!["com.example".into()]))
        );
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        let err = Document::parse("bad.yaml", "repositories: [").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { ref document, .. } if document == "bad.yaml"));
    }

    #[test]
    fn passwords_are_not_debug_printed() {
        let user = UserSpec {
            name: "alice".into(),
            password: "hunter2".into(),
        };
        assert!(!format!("{user:?}").contains("hunter2"));
    }
}
