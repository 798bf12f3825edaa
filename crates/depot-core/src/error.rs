//! # Error Hierarchy
//!
//! Structured error types for routing, access control, and model
//! construction, built with `thiserror`.
//!
//! The per-request errors ([`RoutingError`], [`AccessError`]) are mapped to
//! HTTP status codes by the gateway. [`ModelError`] only occurs while the
//! registry is being assembled at startup and is always fatal.

use thiserror::Error;

use crate::permission::Verb;

/// Failure to map a request path onto a repository.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoutingError {
    /// No repository or group is registered under this name.
    #[error("repository or group not found: {0}")]
    UnknownContainer(String),

    /// The container exists but none of its prefixes match the path and it
    /// has no fallback repository.
    #[error("no repository in {container} serves {path}")]
    NoRoute {
        /// The container that was searched.
        container: String,
        /// The sub-path that failed to match.
        path: String,
    },

    /// The sub-path would leave the container's root.
    #[error("path {path} escapes the root of {container}")]
    OutsideRoot {
        /// The container addressed by the request.
        container: String,
        /// The offending sub-path.
        path: String,
    },
}

/// Access decision failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// The caller is anonymous and anonymous access does not cover the verb.
    #[error("authentication required for {container}")]
    Unauthenticated {
        /// The container that was addressed.
        container: String,
    },

    /// The caller is a known user without sufficient permission.
    #[error("user {user} is not permitted to {verb} {container}")]
    Forbidden {
        /// The authenticated user name.
        user: String,
        /// The container that was addressed.
        container: String,
        /// The verb that was denied.
        verb: Verb,
    },

    /// The verb can never be applied to this kind of container.
    #[error("{verb} is not supported on group {container}")]
    Unsupported {
        /// The container that was addressed.
        container: String,
        /// The rejected verb.
        verb: Verb,
    },
}

/// Violations detected while assembling the registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// A routing prefix could not be normalized.
    #[error("invalid prefix \"{prefix}\": {reason}")]
    InvalidPrefix {
        /// The prefix as written in the configuration.
        prefix: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A user name collides with a pseudo-principal.
    #[error("user name \"{0}\" is reserved")]
    ReservedUserName(String),

    /// Two users share a name.
    #[error("duplicate user name: {0}")]
    DuplicateUser(String),

    /// Two containers share a name.
    #[error("duplicate container name: {0}")]
    DuplicateContainer(String),

    /// Two member repositories of a group declare overlapping prefixes.
    #[error(
        "ambiguous routing in group {group}: prefix {first_prefix} of {first_repository} \
         overlaps prefix {second_prefix} of {second_repository}"
    )]
    AmbiguousRoute {
        /// The group being built.
        group: String,
        /// Repository owning the earlier prefix.
        first_repository: String,
        /// The earlier prefix.
        first_prefix: String,
        /// Repository owning the later prefix.
        second_repository: String,
        /// The later prefix.
        second_prefix: String,
    },

    /// More than one member repository of a group is a catch-all.
    #[error("group {group} has more than one fallback repository: {first} and {second}")]
    MultipleFallbacks {
        /// The group being built.
        group: String,
        /// The first catch-all repository.
        first: String,
        /// The second catch-all repository.
        second: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routing_error_messages_carry_context() {
        let err = RoutingError::NoRoute {
            container: "all".into(),
            path: "/org/example".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("all"));
        assert!(msg.contains("/org/example"));
    }

    #[test]
    fn forbidden_names_the_verb() {
        let err = AccessError::Forbidden {
            user: "alice".into(),
            container: "releases".into(),
            verb: Verb::Write,
        };
        assert_eq!(
            err.to_string(),
            "user alice is not permitted to write releases"
        );
    }

    #[test]
    fn ambiguous_route_names_both_sides() {
        let err = ModelError::AmbiguousRoute {
            group: "g".into(),
            first_repository: "a".into(),
            first_prefix: "/com/".into(),
            second_repository: "b".into(),
            second_prefix: "/com/example/".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/com/") && msg.contains("/com/example/"));
        assert!(msg.contains("of a") && msg.contains("of b"));
    }
}
