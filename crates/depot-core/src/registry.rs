//! # Registry
//!
//! The single immutable snapshot of gateway state: every container by name,
//! the credential store, and the anonymous-grant scope. Built once at
//! startup, then shared read-only (behind an `Arc`) by every request.

use std::collections::HashMap;

use crate::authz;
use crate::container::Container;
use crate::credential::{Credential, CredentialStore};
use crate::error::{AccessError, ModelError, RoutingError};
use crate::identity::Identity;
use crate::permission::{AnonymousScope, Verb};

/// Containers and users known to the gateway.
#[derive(Debug, Clone)]
pub struct Registry {
    containers: HashMap<String, Container>,
    order: Vec<String>,
    credentials: CredentialStore,
    anonymous_scope: AnonymousScope,
}

impl Registry {
    /// Assemble a registry.
    ///
    /// # Errors
    ///
    /// [`ModelError::DuplicateContainer`] if two containers share a name.
    pub fn new(
        containers: impl IntoIterator<Item = Container>,
        credentials: CredentialStore,
        anonymous_scope: AnonymousScope,
    ) -> Result<Self, ModelError> {
        let mut by_name = HashMap::new();
        let mut order = Vec::new();
        for container in containers {
            let name = container.name().to_string();
            if by_name.contains_key(&name) {
                return Err(ModelError::DuplicateContainer(name));
            }
            order.push(name.clone());
            by_name.insert(name, container);
        }
        Ok(Self {
            containers: by_name,
            order,
            credentials,
            anonymous_scope,
        })
    }

    /// Look up a container by name.
    pub fn container(&self, name: &str) -> Result<&Container, RoutingError> {
        self.containers
            .get(name)
            .ok_or_else(|| RoutingError::UnknownContainer(name.to_string()))
    }

    /// All containers, in the order they were registered.
    pub fn containers(&self) -> impl Iterator<Item = &Container> {
        self.order.iter().filter_map(|n| self.containers.get(n))
    }

    /// Number of containers.
    pub fn len(&self) -> usize {
        self.containers.len()
    }

    /// Whether the registry holds no containers.
    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }

    /// The credential store.
    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// The configured reach of `anonymous` grants.
    pub fn anonymous_scope(&self) -> AnonymousScope {
        self.anonymous_scope
    }

    /// Resolve an optional `Authorization` header value to an identity.
    pub fn authenticate(&self, authorization: Option<&str>) -> Identity {
        let credential = authorization.and_then(Credential::from_authorization);
        self.credentials.authenticate(credential.as_ref())
    }

    /// Authorize `verb` on `container` for `identity` under this registry's
    /// anonymous scope.
    pub fn authorize(
        &self,
        container: &Container,
        identity: &Identity,
        verb: Verb,
    ) -> Result<(), AccessError> {
        authz::authorize(container, identity, verb, self.anonymous_scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{Group, Repository};
    use crate::identity::Principal;
    use crate::permission::{Permission, PermissionTable};
    use std::sync::Arc;

    fn registry() -> Registry {
        let repo = Arc::new(Repository::new(
            "repo1",
            "/srv/repo1",
            vec![],
            PermissionTable::new().with(Principal::User("user".into()), Permission::ReadWrite),
        ));
        let group = Group::new("all", vec![Arc::clone(&repo)], PermissionTable::new()).unwrap();
        let mut credentials = CredentialStore::new();
        credentials.add_user("user", "password").unwrap();
        Registry::new(
            [Container::Repository(repo), Container::Group(group)],
            credentials,
            AnonymousScope::Everyone,
        )
        .unwrap()
    }

    #[test]
    fn looks_up_containers() {
        let reg = registry();
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.container("repo1").unwrap().name(), "repo1");
        assert_eq!(
            reg.container("nope").unwrap_err(),
            RoutingError::UnknownContainer("nope".into())
        );
        let names: Vec<_> = reg.containers().map(Container::name).collect();
        assert_eq!(names, ["repo1", "all"]);
    }

    #[test]
    fn rejects_duplicate_container_names() {
        let a = Arc::new(Repository::new("x", "/a", vec![], PermissionTable::new()));
        let b = Arc::new(Repository::new("x", "/b", vec![], PermissionTable::new()));
        let err = Registry::new(
            [Container::Repository(a), Container::Repository(b)],
            CredentialStore::new(),
            AnonymousScope::Everyone,
        )
        .unwrap_err();
        assert_eq!(err, ModelError::DuplicateContainer("x".into()));
    }

    #[test]
    fn authenticates_from_header() {
        let reg = registry();
        assert_eq!(
            reg.authenticate(Some("Basic dXNlcjpwYXNzd29yZA==")),
            Identity::User("user".into())
        );
        assert_eq!(reg.authenticate(Some("Basic abc")), Identity::Anonymous);
        assert_eq!(reg.authenticate(None), Identity::Anonymous);
    }

    #[test]
    fn authorizes_with_registry_scope() {
        let reg = registry();
        let repo = reg.container("repo1").unwrap();
        let user = Identity::User("user".into());
        assert!(reg.authorize(repo, &user, Verb::Write).is_ok());
        assert!(matches!(
            reg.authorize(repo, &Identity::Anonymous, Verb::Read),
            Err(AccessError::Unauthenticated { .. })
        ));
    }
}
