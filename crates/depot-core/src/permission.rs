//! # Permissions
//!
//! Permission levels, request verbs, and the per-container grant table.
//!
//! ## Lookup precedence
//!
//! For a named user the first match wins among:
//!
//! 1. the entry keyed by the user's own name,
//! 2. the `authenticated` entry,
//! 3. the `anonymous` entry (only under [`AnonymousScope::Everyone`]).
//!
//! An anonymous caller only ever sees the `anonymous` entry. If nothing
//! matches, the caller has no permission at all.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::identity::{Identity, Principal};

/// Access level granted to a principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    /// `ro`: read only.
    #[serde(rename = "ro")]
    ReadOnly,
    /// `rw`: read and write.
    #[serde(rename = "rw")]
    ReadWrite,
}

impl Permission {
    /// Whether this level covers the given verb.
    pub fn allows(self, verb: Verb) -> bool {
        match (self, verb) {
            (Self::ReadWrite, _) => true,
            (Self::ReadOnly, Verb::Read) => true,
            (Self::ReadOnly, Verb::Write) => false,
        }
    }

    /// The configuration spelling of this level.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ReadOnly => "ro",
            Self::ReadWrite => "rw",
        }
    }
}

/// The operation class of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    /// GET and HEAD.
    Read,
    /// PUT.
    Write,
}

impl Verb {
    /// Map an HTTP method name to a verb. Unsupported methods return `None`.
    pub fn from_method(method: &str) -> Option<Self> {
        match method {
            "GET" | "HEAD" => Some(Self::Read),
            "PUT" => Some(Self::Write),
            _ => None,
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => f.write_str("read"),
            Self::Write => f.write_str("write"),
        }
    }
}

/// Whom an `anonymous` grant applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnonymousScope {
    /// `anonymous` is the universal fallback for every caller.
    #[default]
    Everyone,
    /// `anonymous` applies only to callers without a valid credential.
    UnauthenticatedOnly,
}

/// The permission table of a single repository or group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionTable {
    users: HashMap<String, Permission>,
    authenticated: Option<Permission>,
    anonymous: Option<Permission>,
}

impl PermissionTable {
    /// Create an empty table that denies everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a grant. The first grant for a principal wins; returns `false`
    /// if the principal already had one and the new grant was ignored.
    pub fn grant(&mut self, principal: Principal, permission: Permission) -> bool {
        let slot = match principal {
            Principal::User(name) => {
                if self.users.contains_key(&name) {
                    return false;
                }
                self.users.insert(name, permission);
                return true;
            }
            Principal::Authenticated => &mut self.authenticated,
            Principal::Anonymous => &mut self.anonymous,
        };
        if slot.is_some() {
            return false;
        }
        *slot = Some(permission);
        true
    }

    /// Builder-style variant of [`grant`](Self::grant).
    pub fn with(mut self, principal: Principal, permission: Permission) -> Self {
        self.grant(principal, permission);
        self
    }

    /// Resolve the effective permission of `identity`.
    pub fn lookup(&self, identity: &Identity, scope: AnonymousScope) -> Option<Permission> {
        match identity {
            Identity::Anonymous => self.anonymous,
            Identity::User(name) => self
                .users
                .get(name)
                .copied()
                .or(self.authenticated)
                .or(match scope {
                    AnonymousScope::Everyone => self.anonymous,
                    AnonymousScope::UnauthenticatedOnly => None,
                }),
        }
    }

    /// Names of the concrete users referenced by this table.
    pub fn user_names(&self) -> impl Iterator<Item = &str> {
        self.users.keys().map(String::as_str)
    }

    /// Number of grants in the table.
    pub fn len(&self) -> usize {
        self.users.len()
            + usize::from(self.authenticated.is_some())
            + usize::from(self.anonymous.is_some())
    }

    /// Whether the table holds no grants.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Identity {
        Identity::User("alice".into())
    }

    #[test]
    fn read_only_allows_reads_only() {
        assert!(Permission::ReadOnly.allows(Verb::Read));
        assert!(!Permission::ReadOnly.allows(Verb::Write));
        assert!(Permission::ReadWrite.allows(Verb::Read));
        assert!(Permission::ReadWrite.allows(Verb::Write));
    }

    #[test]
    fn verbs_from_methods() {
        assert_eq!(Verb::from_method("GET"), Some(Verb::Read));
        assert_eq!(Verb::from_method("HEAD"), Some(Verb::Read));
        assert_eq!(Verb::from_method("PUT"), Some(Verb::Write));
        assert_eq!(Verb::from_method("POST"), None);
        assert_eq!(Verb::from_method("DELETE"), None);
    }

    #[test]
    fn permission_serde_spelling() {
        let p: Permission = serde_json::from_str("\"rw\"").unwrap();
        assert_eq!(p, Permission::ReadWrite);
        assert_eq!(serde_json::to_string(&Permission::ReadOnly).unwrap(), "\"ro\"");
        assert!(serde_json::from_str::<Permission>("\"none\"").is_err());
    }

    #[test]
    fn user_entry_beats_authenticated_and_anonymous() {
        let table = PermissionTable::new()
            .with(Principal::Anonymous, Permission::ReadWrite)
            .with(Principal::Authenticated, Permission::ReadWrite)
            .with(Principal::User("alice".into()), Permission::ReadOnly);
        assert_eq!(
            table.lookup(&alice(), AnonymousScope::Everyone),
            Some(Permission::ReadOnly)
        );
    }

    #[test]
    fn authenticated_beats_anonymous_for_users() {
        let table = PermissionTable::new()
            .with(Principal::Anonymous, Permission::ReadWrite)
            .with(Principal::Authenticated, Permission::ReadOnly);
        assert_eq!(
            table.lookup(&alice(), AnonymousScope::Everyone),
            Some(Permission::ReadOnly)
        );
        assert_eq!(
            table.lookup(&Identity::Anonymous, AnonymousScope::Everyone),
            Some(Permission::ReadWrite)
        );
    }

    #[test]
    fn anonymous_is_universal_fallback_by_default() {
        let table = PermissionTable::new().with(Principal::Anonymous, Permission::ReadOnly);
        assert_eq!(
            table.lookup(&alice(), AnonymousScope::Everyone),
            Some(Permission::ReadOnly)
        );
        assert_eq!(table.lookup(&alice(), AnonymousScope::UnauthenticatedOnly), None);
        assert_eq!(
            table.lookup(&Identity::Anonymous, AnonymousScope::UnauthenticatedOnly),
            Some(Permission::ReadOnly)
        );
    }

    #[test]
    fn anonymous_caller_ignores_authenticated_entry() {
        let table = PermissionTable::new().with(Principal::Authenticated, Permission::ReadWrite);
        assert_eq!(table.lookup(&Identity::Anonymous, AnonymousScope::Everyone), None);
    }

    #[test]
    fn empty_table_denies() {
        let table = PermissionTable::new();
        assert!(table.is_empty());
        assert_eq!(table.lookup(&alice(), AnonymousScope::Everyone), None);
        assert_eq!(table.lookup(&Identity::Anonymous, AnonymousScope::Everyone), None);
    }

    #[test]
    fn first_grant_wins() {
        let mut table = PermissionTable::new();
        assert!(table.grant(Principal::User("alice".into()), Permission::ReadOnly));
        assert!(!table.grant(Principal::User("alice".into()), Permission::ReadWrite));
        assert!(table.grant(Principal::Anonymous, Permission::ReadOnly));
        assert!(!table.grant(Principal::Anonymous, Permission::ReadWrite));
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.lookup(&alice(), AnonymousScope::Everyone),
            Some(Permission::ReadOnly)
        );
    }
}
