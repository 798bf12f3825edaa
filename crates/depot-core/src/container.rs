//! # Containers
//!
//! A container is the first path segment of every request. It is either a
//! single filesystem-backed [`Repository`] or a [`Group`] that routes into
//! several repositories by path prefix.
//!
//! ## Prefixes
//!
//! Prefixes are written in configuration as dotted package names
//! (`com.example`) and normalized to slash-delimited form with a leading and
//! trailing separator (`/com/example/`). The catch-all prefix is `/`. A
//! request sub-path matches a prefix when the sub-path with a `/` appended
//! starts with the prefix, so `/com/example` and `/com/example/a.jar` both
//! match `/com/example/` but `/com/examples` does not.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::ModelError;
use crate::permission::PermissionTable;

// ---------------------------------------------------------------------------
// Prefix
// ---------------------------------------------------------------------------

/// A normalized routing prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Prefix(String);

impl Prefix {
    /// The catch-all prefix `/`.
    pub fn catch_all() -> Self {
        Self("/".to_string())
    }

    /// Normalize a configured prefix.
    ///
    /// Accepts dotted (`com.example`) or slashed (`com/example`) forms.
    /// Leading and trailing separators are ignored; an input with no
    /// segments at all is the catch-all.
    ///
    /// # Errors
    ///
    /// Rejects empty inner segments (`com..example`) and `..` segments.
    pub fn parse(raw: &str) -> Result<Self, ModelError> {
        let invalid = |reason: &str| ModelError::InvalidPrefix {
            prefix: raw.to_string(),
            reason: reason.to_string(),
        };

        let unified = raw.replace('.', "/");
        let trimmed = unified.trim_matches('/');
        if trimmed.is_empty() {
            if raw.contains("..") {
                return Err(invalid("parent-directory segments are not allowed"));
            }
            return Ok(Self::catch_all());
        }

        let mut normalized = String::with_capacity(trimmed.len() + 2);
        normalized.push('/');
        for segment in trimmed.split('/') {
            if segment.is_empty() {
                return Err(invalid("empty path segment"));
            }
            if segment.contains('\\') {
                return Err(invalid("backslashes are not allowed"));
            }
            normalized.push_str(segment);
            normalized.push('/');
        }
        Ok(Self(normalized))
    }

    /// Whether this is the catch-all prefix.
    pub fn is_catch_all(&self) -> bool {
        self.0 == "/"
    }

    /// Whether `rest + "/"` starts with this prefix.
    pub fn matches(&self, rest: &str) -> bool {
        let prefix = self.0.as_str();
        rest.starts_with(prefix) || rest == &prefix[..prefix.len() - 1]
    }

    /// Whether either prefix is a prefix of the other (equality included).
    pub fn overlaps(&self, other: &Prefix) -> bool {
        self.0.starts_with(&other.0) || other.0.starts_with(&self.0)
    }

    /// The normalized form, e.g. `/com/example/`.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Repository
// ---------------------------------------------------------------------------

/// A filesystem-backed artifact repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    name: String,
    root: PathBuf,
    prefixes: Vec<Prefix>,
    permissions: PermissionTable,
}

impl Repository {
    /// Create a repository. An empty prefix list means catch-all.
    ///
    /// `root` is expected to be absolute and to exist; the configuration
    /// loader checks both before calling this.
    pub fn new(
        name: impl Into<String>,
        root: impl Into<PathBuf>,
        prefixes: Vec<Prefix>,
        permissions: PermissionTable,
    ) -> Self {
        let mut unique: Vec<Prefix> = Vec::with_capacity(prefixes.len().max(1));
        for prefix in prefixes {
            if !unique.contains(&prefix) {
                unique.push(prefix);
            }
        }
        if unique.is_empty() {
            unique.push(Prefix::catch_all());
        }
        Self {
            name: name.into(),
            root: root.into(),
            prefixes: unique,
            permissions,
        }
    }

    /// Repository name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Absolute filesystem root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Routing prefixes in declared order.
    pub fn prefixes(&self) -> &[Prefix] {
        &self.prefixes
    }

    /// Permission table used when the repository is addressed directly.
    pub fn permissions(&self) -> &PermissionTable {
        &self.permissions
    }

    /// Whether the repository serves every path.
    pub fn is_catch_all(&self) -> bool {
        self.prefixes.iter().any(Prefix::is_catch_all)
    }

    /// Whether any prefix matches `rest`.
    pub fn matches(&self, rest: &str) -> bool {
        self.prefixes.iter().any(|p| p.matches(rest))
    }
}

// ---------------------------------------------------------------------------
// Group
// ---------------------------------------------------------------------------

/// One entry of a group's routing table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// The prefix that selects this route.
    pub prefix: Prefix,
    /// The repository the prefix routes to.
    pub repository: Arc<Repository>,
}

/// A named aggregation of repositories sharing one namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    name: String,
    members: Vec<Arc<Repository>>,
    routes: Vec<Route>,
    fallback: Option<Arc<Repository>>,
    permissions: PermissionTable,
}

impl Group {
    /// Build a group over `members`, in the given order.
    ///
    /// Non-catch-all prefixes become ordered routes. A catch-all member
    /// becomes the fallback.
    ///
    /// # Errors
    ///
    /// - [`ModelError::AmbiguousRoute`] if prefixes of two different member
    ///   repositories are equal or nested.
    /// - [`ModelError::MultipleFallbacks`] if more than one member is a
    ///   catch-all.
    pub fn new(
        name: impl Into<String>,
        members: Vec<Arc<Repository>>,
        permissions: PermissionTable,
    ) -> Result<Self, ModelError> {
        let name = name.into();
        let mut routes: Vec<Route> = Vec::new();
        let mut fallback: Option<Arc<Repository>> = None;

        for repository in &members {
            for prefix in repository.prefixes() {
                if prefix.is_catch_all() {
                    if let Some(existing) = &fallback {
                        if existing.name() != repository.name() {
                            return Err(ModelError::MultipleFallbacks {
                                group: name,
                                first: existing.name().to_string(),
                                second: repository.name().to_string(),
                            });
                        }
                        continue;
                    }
                    fallback = Some(Arc::clone(repository));
                    continue;
                }

                if let Some(clash) = routes.iter().find(|r| {
                    r.repository.name() != repository.name() && r.prefix.overlaps(prefix)
                }) {
                    return Err(ModelError::AmbiguousRoute {
                        group: name,
                        first_repository: clash.repository.name().to_string(),
                        first_prefix: clash.prefix.to_string(),
                        second_repository: repository.name().to_string(),
                        second_prefix: prefix.to_string(),
                    });
                }
                if routes
                    .iter()
                    .any(|r| r.repository.name() == repository.name() && r.prefix == *prefix)
                {
                    continue;
                }
                routes.push(Route {
                    prefix: prefix.clone(),
                    repository: Arc::clone(repository),
                });
            }
        }

        Ok(Self {
            name,
            members,
            routes,
            fallback,
            permissions,
        })
    }

    /// Group name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Member repositories in declared order.
    pub fn members(&self) -> &[Arc<Repository>] {
        &self.members
    }

    /// Ordered prefix routes, excluding the fallback.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// The catch-all member, if any.
    pub fn fallback(&self) -> Option<&Arc<Repository>> {
        self.fallback.as_ref()
    }

    /// Permission table of the group itself.
    pub fn permissions(&self) -> &PermissionTable {
        &self.permissions
    }

    /// Select the repository serving `rest`: first matching route, then the
    /// fallback.
    pub fn route(&self, rest: &str) -> Option<&Arc<Repository>> {
        self.routes
            .iter()
            .find(|r| r.prefix.matches(rest))
            .map(|r| &r.repository)
            .or(self.fallback.as_ref())
    }
}

// ---------------------------------------------------------------------------
// Container
// ---------------------------------------------------------------------------

/// Discriminant of a [`Container`], for logging and responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    /// A single repository.
    Repository,
    /// A group of repositories.
    Group,
}

impl ContainerKind {
    /// Lowercase name of the kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Repository => "repository",
            Self::Group => "group",
        }
    }
}

/// A routable unit: a repository or a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Container {
    /// A repository addressed directly.
    Repository(Arc<Repository>),
    /// A group of repositories.
    Group(Group),
}

impl Container {
    /// Container name (the first request path segment).
    pub fn name(&self) -> &str {
        match self {
            Self::Repository(r) => r.name(),
            Self::Group(g) => g.name(),
        }
    }

    /// Which variant this is.
    pub fn kind(&self) -> ContainerKind {
        match self {
            Self::Repository(_) => ContainerKind::Repository,
            Self::Group(_) => ContainerKind::Group,
        }
    }

    /// Permission table governing access through this container.
    pub fn permissions(&self) -> &PermissionTable {
        match self {
            Self::Repository(r) => r.permissions(),
            Self::Group(g) => g.permissions(),
        }
    }

    /// Select the repository serving `rest`, if any.
    pub fn route(&self, rest: &str) -> Option<&Arc<Repository>> {
        match self {
            Self::Repository(r) => r.matches(rest).then_some(r),
            Self::Group(g) => g.route(rest),
        }
    }

    /// Repositories whose roots make up this container's root listing.
    pub fn repositories(&self) -> &[Arc<Repository>] {
        match self {
            Self::Repository(r) => std::slice::from_ref(r),
            Self::Group(g) => g.members(),
        }
    }
}
