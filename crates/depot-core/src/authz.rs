//! # Authorization
//!
//! Decides whether an identity may apply a verb to a container. The check
//! order is fixed:
//!
//! 1. Writes to a group are never supported, whoever asks.
//! 2. The container's permission table is consulted (see
//!    [`PermissionTable::lookup`](crate::PermissionTable::lookup)).
//! 3. A denial is reported as [`AccessError::Unauthenticated`] for anonymous
//!    callers, so clients know to retry with a credential, and as
//!    [`AccessError::Forbidden`] for named users.

use crate::container::Container;
use crate::error::AccessError;
use crate::identity::Identity;
use crate::permission::{AnonymousScope, Verb};

/// Authorize `verb` on `container` for `identity`.
pub fn authorize(
    container: &Container,
    identity: &Identity,
    verb: Verb,
    scope: AnonymousScope,
) -> Result<(), AccessError> {
    if verb == Verb::Write && matches!(container, Container::Group(_)) {
        return Err(AccessError::Unsupported {
            container: container.name().to_string(),
            verb,
        });
    }

    let granted = container
        .permissions()
        .lookup(identity, scope)
        .is_some_and(|p| p.allows(verb));
    if granted {
        return Ok(());
    }

    match identity {
        Identity::Anonymous => Err(AccessError::Unauthenticated {
            container: container.name().to_string(),
        }),
        Identity::User(user) => Err(AccessError::Forbidden {
            user: user.clone(),
            container: container.name().to_string(),
            verb,
        }),
    }
}
