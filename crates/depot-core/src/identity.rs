//! # Identities and Principals
//!
//! An [`Identity`] is who a request acts as after authentication. A
//! [`Principal`] is a key in a container's permission table. The two
//! pseudo-principals are reserved words that no configured user may take.

use std::fmt;

/// Reserved permission key matching every caller (see [`crate::AnonymousScope`]).
pub const ANONYMOUS: &str = "anonymous";

/// Reserved permission key matching every successfully authenticated user.
pub const AUTHENTICATED: &str = "authenticated";

/// Returns `true` if `name` is one of the pseudo-principal keywords.
pub fn is_reserved(name: &str) -> bool {
    name == ANONYMOUS || name == AUTHENTICATED
}

/// The identity a request is performed as.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identity {
    /// No credential, or a credential that matched no user.
    Anonymous,
    /// A configured user whose credential matched.
    User(String),
}

impl Identity {
    /// The user name, if the identity is not anonymous.
    pub fn user_name(&self) -> Option<&str> {
        match self {
            Self::Anonymous => None,
            Self::User(name) => Some(name),
        }
    }

    /// Whether this is the anonymous identity.
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anonymous => f.write_str(ANONYMOUS),
            Self::User(name) => f.write_str(name),
        }
    }
}

/// A key in a container permission table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Principal {
    /// The `anonymous` pseudo-principal.
    Anonymous,
    /// The `authenticated` pseudo-principal.
    Authenticated,
    /// A concrete configured user.
    User(String),
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anonymous => f.write_str(ANONYMOUS),
            Self::Authenticated => f.write_str(AUTHENTICATED),
            Self::User(name) => write!(f, "user {name}"),
        }
    }
}
