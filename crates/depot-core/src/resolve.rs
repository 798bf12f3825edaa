//! # Path Resolution
//!
//! Maps `/{container}/{rest...}` request paths onto a concrete repository
//! and a filesystem path inside that repository's root.
//!
//! Resolution is two-phase so that authorization can run in between:
//! [`split_request_path`] extracts the container name, then [`resolve`]
//! picks the backing repository and joins the filesystem path.

use std::path::{Path, PathBuf};

use crate::container::{Container, Repository};
use crate::error::RoutingError;

/// A request path split into container name and remainder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTarget<'a> {
    /// First path segment.
    pub container: &'a str,
    /// Everything after the container name, starting with `/`. `None` when
    /// the request addresses the container root (`/name` or `/name/`).
    pub rest: Option<&'a str>,
}

impl RequestTarget<'_> {
    /// Whether the request addresses the container root.
    pub fn is_root(&self) -> bool {
        self.rest.is_none()
    }
}

/// Split a request path into container name and remainder.
///
/// Returns `None` when the path does not start with `/` or names no
/// container (`/` or `//x`).
pub fn split_request_path(path: &str) -> Option<RequestTarget<'_>> {
    let trimmed = path.strip_prefix('/')?;
    let (container, rest) = match trimmed.find('/') {
        Some(idx) => (&trimmed[..idx], &trimmed[idx..]),
        None => (trimmed, ""),
    };
    if container.is_empty() {
        return None;
    }
    let rest = if rest.is_empty() || rest == "/" {
        None
    } else {
        Some(rest)
    };
    Some(RequestTarget { container, rest })
}

/// Outcome of a successful resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution<'a> {
    /// Repository that serves the path.
    pub repository: &'a Repository,
    /// The sub-path with `.` and `..` segments removed, e.g. `/com/acme/a.jar`.
    /// Routing, overwrite policy, and the filesystem path all derive from it.
    pub relative_path: String,
    /// Repository root joined with the sub-path.
    pub file_path: PathBuf,
}

/// Resolve `rest` within `container`.
///
/// `rest` is normalized before any prefix is matched, so a path like
/// `/com/example/../../org/x.jar` routes as `/org/x.jar`.
///
/// # Errors
///
/// - [`RoutingError::OutsideRoot`] if a `..` climbs above the root or a
///   segment is unusable.
/// - [`RoutingError::NoRoute`] if no prefix matches the normalized path and
///   there is no fallback.
pub fn resolve<'a>(container: &'a Container, rest: &str) -> Result<Resolution<'a>, RoutingError> {
    let relative_path = normalize_path(rest).ok_or_else(|| RoutingError::OutsideRoot {
        container: container.name().to_string(),
        path: rest.to_string(),
    })?;

    let repository = container
        .route(&relative_path)
        .ok_or_else(|| RoutingError::NoRoute {
            container: container.name().to_string(),
            path: relative_path.clone(),
        })?;

    let file_path = push_segments(repository.root(), &relative_path);
    Ok(Resolution {
        repository: repository.as_ref(),
        relative_path,
        file_path,
    })
}

/// Normalize `relative` lexically into `/seg/seg...` form.
///
/// `.` and empty segments are skipped, `..` pops one segment. Returns `None`
/// if a `..` would climb above the start or a segment contains a NUL byte
/// or a backslash. The empty path normalizes to `/`.
pub fn normalize_path(relative: &str) -> Option<String> {
    let mut segments: Vec<&str> = Vec::new();
    for segment in relative.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            s if s.contains('\0') || s.contains('\\') => return None,
            s => segments.push(s),
        }
    }
    Some(format!("/{}", segments.join("/")))
}

/// Join `relative` onto `root` lexically, refusing to leave `root`.
///
/// See [`normalize_path`] for the segment rules.
pub fn contained_join(root: &Path, relative: &str) -> Option<PathBuf> {
    normalize_path(relative).map(|normalized| push_segments(root, &normalized))
}

fn push_segments(root: &Path, normalized: &str) -> PathBuf {
    let mut joined = root.to_path_buf();
    joined.extend(normalized.split('/').filter(|s| !s.is_empty()));
    joined
}
