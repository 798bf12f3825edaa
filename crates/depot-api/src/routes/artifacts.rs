//! # Artifact Routes
//!
//! Every request path has the shape `/{container}/{path...}`, and container
//! names are configuration data, so there is no static route table: a
//! single fallback handler serves the whole namespace.
//!
//! ```text
//! split path → container (404) → method → verb (405) → authorize (401/403/405)
//!   → root listing | resolve (404/400) → store
//! ```
//!
//! | Method | Target       | Result                                        |
//! |--------|--------------|-----------------------------------------------|
//! | GET    | root or dir  | JSON array of child names                     |
//! | GET    | file         | file bytes                                    |
//! | HEAD   | any          | 200 with `Content-Length`, no body            |
//! | PUT    | file         | atomic write; groups answer 405               |

use std::path::Path;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use depot_core::{resolve, split_request_path, Container, Resolution, Verb};
use depot_store::{OverwritePolicy, StoreError};

use crate::auth::CallerIdentity;
use crate::error::{AppError, GROUP_METHODS, REPOSITORY_METHODS};
use crate::state::AppState;

/// Build the artifact router.
pub fn router() -> Router<AppState> {
    Router::new().fallback(serve)
}

async fn serve(
    State(state): State<AppState>,
    CallerIdentity(identity): CallerIdentity,
    method: Method,
    uri: Uri,
    body: Body,
) -> Result<Response, AppError> {
    let target = split_request_path(uri.path())
        .ok_or_else(|| AppError::NotFound("request path names no repository or group".into()))?;
    let container = state.registry.container(target.container)?;

    let verb = Verb::from_method(method.as_str()).ok_or_else(|| AppError::MethodNotAllowed {
        message: format!("{method} is not supported on {}", container.name()),
        allow: allowed_methods(container),
    })?;
    state.registry.authorize(container, &identity, verb)?;

    let head = method == Method::HEAD;
    match (target.rest, verb) {
        (None, Verb::Read) => list_root(&state, container, head).await,
        (None, Verb::Write) => Err(AppError::MethodNotAllowed {
            message: format!("cannot write to the root of {}", container.name()),
            allow: GROUP_METHODS,
        }),
        (Some(rest), Verb::Read) => {
            let resolution = resolve(container, rest)?;
            read(&state, &resolution, head).await
        }
        (Some(rest), Verb::Write) => {
            let resolution = resolve(container, rest)?;
            write(&state, container, &resolution, &identity.to_string(), body).await
        }
    }
}

fn allowed_methods(container: &Container) -> &'static str {
    match container {
        Container::Repository(_) => REPOSITORY_METHODS,
        Container::Group(_) => GROUP_METHODS,
    }
}

async fn list_root(
    state: &AppState,
    container: &Container,
    head: bool,
) -> Result<Response, AppError> {
    let names = match container {
        Container::Repository(repo) => state.store.list(repo.root()).await?,
        Container::Group(group) => {
            let roots: Vec<&Path> = group.members().iter().map(|r| r.root()).collect();
            state.store.list_merged(&roots).await?
        }
    };
    listing(names, head)
}

async fn read(
    state: &AppState,
    resolution: &Resolution<'_>,
    head: bool,
) -> Result<Response, AppError> {
    let path = &resolution.file_path;
    let meta = state
        .store
        .stat(path)
        .await
        .map_err(|e| with_path(e, &resolution.relative_path))?;

    if meta.is_dir() {
        let names = state.store.list(path).await?;
        return listing(names, head);
    }
    if head {
        return Ok(head_response(meta.len, content_type(&resolution.relative_path)));
    }

    let bytes = state
        .store
        .read(path)
        .await
        .map_err(|e| with_path(e, &resolution.relative_path))?;
    Ok((
        [(header::CONTENT_TYPE, content_type(&resolution.relative_path))],
        bytes,
    )
        .into_response())
}

async fn write(
    state: &AppState,
    container: &Container,
    resolution: &Resolution<'_>,
    caller: &str,
    body: Body,
) -> Result<Response, AppError> {
    let relative = resolution.relative_path.as_str();
    if let Ok(meta) = state.store.stat(&resolution.file_path).await {
        if meta.is_dir() {
            return Err(AppError::BadRequest(format!("{relative} is a directory")));
        }
    }

    let policy = OverwritePolicy::for_artifact(relative);
    let outcome = state
        .store
        .write(&resolution.file_path, policy, body.into_data_stream())
        .await
        .map_err(|e| with_path(e, relative))?;

    tracing::info!(
        container = container.name(),
        repository = resolution.repository.name(),
        path = relative,
        bytes = outcome.bytes,
        replaced = outcome.replaced,
        caller,
        "artifact stored"
    );
    Ok(StatusCode::OK.into_response())
}

fn listing(names: Vec<String>, head: bool) -> Result<Response, AppError> {
    let json = serde_json::to_vec(&names).map_err(|e| AppError::Internal(e.to_string()))?;
    if head {
        return Ok(head_response(json.len() as u64, "application/json"));
    }
    Ok(([(header::CONTENT_TYPE, "application/json")], json).into_response())
}

fn head_response(len: u64, content_type: &'static str) -> Response {
    (
        [
            (header::CONTENT_LENGTH, HeaderValue::from(len)),
            (header::CONTENT_TYPE, HeaderValue::from_static(content_type)),
        ],
        Body::empty(),
    )
        .into_response()
}

/// Rewrite store errors so the client sees the request path, not the
/// filesystem path.
fn with_path(err: StoreError, relative: &str) -> AppError {
    match err {
        StoreError::NotFound(_) => AppError::NotFound(format!("artifact not found: {relative}")),
        StoreError::Conflict(_) => {
            AppError::Conflict(format!("cannot overwrite release artifact: {relative}"))
        }
        other => other.into(),
    }
}

fn content_type(relative: &str) -> &'static str {
    let extension = relative.rsplit_once('.').map(|(_, ext)| ext);
    match extension {
        Some("pom" | "xml") => "application/xml",
        Some("jar" | "war" | "ear") => "application/java-archive",
        Some("sha1" | "sha256" | "sha512" | "md5" | "asc") => "text/plain",
        Some("json" | "module") => "application/json",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_types_follow_extension() {
        assert_eq!(content_type("/com/acme/lib.pom"), "application/xml");
        assert_eq!(content_type("/com/acme/lib.jar"), "application/java-archive");
        assert_eq!(content_type("/com/acme/lib.jar.sha1"), "text/plain");
        assert_eq!(content_type("/com/acme/README"), "application/octet-stream");
    }

    #[test]
    fn store_errors_name_the_request_path() {
        let err = with_path(
            StoreError::Conflict("/srv/releases/a.jar".into()),
            "/com/acme/a.jar",
        );
        assert!(matches!(err, AppError::Conflict(ref m) if m.ends_with("/com/acme/a.jar")));
        assert!(!err.to_string().contains("/srv"));
    }
}
