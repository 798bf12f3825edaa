//! # Registry Construction
//!
//! Turns validated, merged configuration into a [`Registry`]:
//!
//! ```text
//! users → repositories (paths checked) → groups → named-grant cross-check
//!   → registry → startup summary
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use depot_core::{
    AnonymousScope, Container, CredentialStore, Group, ModelError, PermissionTable, Prefix,
    Principal, Registry, Repository,
};

use crate::document::{
    ConfigFragment, Document, GrantSpec, GroupSpec, MembersSpec, PrefixesSpec, PseudoPrincipal,
    RepositorySpec, UserSpec,
};
use crate::error::{ConfigError, ConfigIssue};
use crate::validate::ConfigValidator;

/// Listen port when none is configured.
pub const DEFAULT_PORT: u16 = 8080;

/// The outcome of a successful load.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// The immutable registry.
    pub registry: Registry,
    /// Listen port.
    pub port: u16,
}

/// Read, merge, and validate configuration files in order.
pub fn load_files<P: AsRef<Path>>(paths: &[P]) -> Result<LoadedConfig, ConfigError> {
    let mut documents = Vec::with_capacity(paths.len());
    for path in paths {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        documents.push(Document::parse(path.display().to_string(), &content)?);
    }
    load_documents(&documents)
}

/// Validate, merge, and build already-parsed documents.
pub fn load_documents(documents: &[Document]) -> Result<LoadedConfig, ConfigError> {
    ConfigValidator::new()?.validate_all(documents)?;

    let mut merged = ConfigFragment::default();
    for document in documents {
        let fragment: ConfigFragment =
            serde_json::from_value(document.value.clone()).map_err(|e| {
                ConfigError::Invalid(vec![ConfigIssue {
                    document: document.name.clone(),
                    pointer: String::new(),
                    message: e.to_string(),
                }])
            })?;
        merged = merged.merge(fragment);
    }

    build(merged, documents)
}

fn build(config: ConfigFragment, documents: &[Document]) -> Result<LoadedConfig, ConfigError> {
    let Some(repository_specs) = config.repositories else {
        let document = documents
            .last()
            .map_or_else(|| "<none>".to_string(), |d| d.name.clone());
        return Err(ConfigError::Invalid(vec![ConfigIssue {
            document,
            pointer: String::new(),
            message: "\"repositories\" is a required property".to_string(),
        }]));
    };

    let credentials = build_credentials(config.users.as_deref().unwrap_or_default())?;

    let mut repositories: Vec<Arc<Repository>> = Vec::with_capacity(repository_specs.len());
    for spec in &repository_specs {
        if repositories.iter().any(|r| r.name() == spec.name) {
            return Err(ModelError::DuplicateContainer(spec.name.clone()).into());
        }
        repositories.push(Arc::new(build_repository(spec)?));
    }

    let mut containers: Vec<Container> = repositories
        .iter()
        .map(|r| Container::Repository(Arc::clone(r)))
        .collect();
    for spec in config.groups.as_deref().unwrap_or_default() {
        containers.push(Container::Group(build_group(spec, &repositories)?));
    }

    for container in &containers {
        let mut unknown: Vec<&str> = container
            .permissions()
            .user_names()
            .filter(|name| !credentials.contains_user(name))
            .collect();
        unknown.sort_unstable();
        if let Some(user) = unknown.first() {
            return Err(ConfigError::UnknownUser {
                container: container.name().to_string(),
                user: user.to_string(),
            });
        }
    }

    let scope = if config.anonymous_fallback.unwrap_or(true) {
        AnonymousScope::Everyone
    } else {
        AnonymousScope::UnauthenticatedOnly
    };
    let registry = Registry::new(containers, credentials, scope)?;
    let port = config.port.unwrap_or(DEFAULT_PORT);

    log_summary(&registry, port);
    Ok(LoadedConfig { registry, port })
}

fn build_credentials(users: &[UserSpec]) -> Result<CredentialStore, ConfigError> {
    let mut store = CredentialStore::new();
    for user in users {
        store.add_user(&user.name, &user.password)?;
    }
    Ok(store)
}

fn build_repository(spec: &RepositorySpec) -> Result<Repository, ConfigError> {
    let root = check_root(&spec.name, &spec.path)?;
    let prefixes = match &spec.prefixes {
        None => Vec::new(),
        Some(PrefixesSpec::Keyword(k)) if k == "any" || k == "all" => vec![Prefix::catch_all()],
        Some(PrefixesSpec::Keyword(other)) => {
            return Err(ModelError::InvalidPrefix {
                prefix: other.clone(),
                reason: "expected a list of prefixes, \"any\" or \"all\"".to_string(),
            }
            .into())
        }
        Some(PrefixesSpec::List(raw)) => raw
            .iter()
            .map(|p| Prefix::parse(p))
            .collect::<Result<Vec<_>, _>>()?,
    };
    let permissions = build_permissions(&spec.name, &spec.users);
    Ok(Repository::new(spec.name.clone(), root, prefixes, permissions))
}

fn check_root(repository: &str, path: &Path) -> Result<PathBuf, ConfigError> {
    let failure = |reason: String| ConfigError::RepositoryPath {
        repository: repository.to_string(),
        path: path.to_path_buf(),
        reason,
    };
    let root = std::fs::canonicalize(path).map_err(|e| failure(format!("does not exist: {e}")))?;
    if !root.is_dir() {
        return Err(failure("is not a directory".to_string()));
    }
    Ok(root)
}

fn build_group(
    spec: &GroupSpec,
    repositories: &[Arc<Repository>],
) -> Result<Group, ConfigError> {
    let members: Vec<Arc<Repository>> = match &spec.repositories {
        MembersSpec::Keyword(k) if k == "all" => repositories.to_vec(),
        MembersSpec::Keyword(other) => {
            return Err(ConfigError::UnknownRepository {
                group: spec.name.clone(),
                repository: other.clone(),
            })
        }
        MembersSpec::List(names) => {
            let mut members = Vec::with_capacity(names.len());
            for name in names {
                let repository = find_repository(&spec.name, name, repositories)?;
                if !members.iter().any(|m: &Arc<Repository>| m.name() == name) {
                    members.push(repository);
                }
            }
            members
        }
    };
    let permissions = build_permissions(&spec.name, &spec.users);
    Ok(Group::new(spec.name.clone(), members, permissions)?)
}

fn find_repository(
    group: &str,
    name: &str,
    repositories: &[Arc<Repository>],
) -> Result<Arc<Repository>, ConfigError> {
    repositories
        .iter()
        .find(|r| r.name() == name)
        .cloned()
        .ok_or_else(|| ConfigError::UnknownRepository {
            group: group.to_string(),
            repository: name.to_string(),
        })
}

fn build_permissions(container: &str, grants: &[GrantSpec]) -> PermissionTable {
    let mut table = PermissionTable::new();
    for grant in grants {
        let (principal, permission) = match grant {
            GrantSpec::User { name, permissions } => (Principal::User(name.clone()), *permissions),
            GrantSpec::Pseudo {
                kind: PseudoPrincipal::Anonymous,
                permissions,
            } => (Principal::Anonymous, *permissions),
            GrantSpec::Pseudo {
                kind: PseudoPrincipal::Authenticated,
                permissions,
            } => (Principal::Authenticated, *permissions),
        };
        let label = principal.to_string();
        if !table.grant(principal, permission) {
            tracing::warn!(
                container,
                principal = %label,
                ignored = permission.as_str(),
                "duplicate permission entry ignored; the first one applies"
            );
        }
    }
    table
}

fn log_summary(registry: &Registry, port: u16) {
    tracing::info!(
        containers = registry.len(),
        users = registry.credentials().len(),
        anonymous_scope = ?registry.anonymous_scope(),
        port,
        "configuration loaded"
    );
    for container in registry.containers() {
        let routes = match container {
            Container::Repository(repo) => repo.prefixes().len(),
            Container::Group(group) => group.routes().len() + usize::from(group.fallback().is_some()),
        };
        tracing::info!(
            container = container.name(),
            kind = container.kind().as_str(),
            routes,
            grants = container.permissions().len(),
            "container registered"
        );
    }
}
