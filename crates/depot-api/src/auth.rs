//! # Identity Middleware
//!
//! Resolves the HTTP Basic `Authorization` header to a
//! [`depot_core::Identity`] before any handler runs.
//!
//! Authentication never rejects a request by itself: a missing, malformed,
//! or wrong credential simply yields [`Identity::Anonymous`]. Whether that is
//! enough is decided later, per container, by the authorization engine.
//!
//! ## CallerIdentity
//!
//! The resolved identity is injected into the request extensions as a
//! [`CallerIdentity`]. Handlers extract it via the `FromRequestParts` impl.

use axum::extract::{Request, State};
use axum::http::header;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use depot_core::Identity;

use crate::error::AppError;
use crate::state::AppState;

/// Identity of the caller, resolved from the `Authorization` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity(pub Identity);

/// Axum `FromRequestParts` implementation for `CallerIdentity`.
///
/// Extracts the identity that the middleware injected into extensions.
#[axum::async_trait]
impl<S: Send + Sync> axum::extract::FromRequestParts<S> for CallerIdentity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CallerIdentity>()
            .cloned()
            .ok_or_else(|| AppError::Internal("identity middleware is not installed".into()))
    }
}

/// Resolve the caller and inject a [`CallerIdentity`] into the request.
pub async fn identity_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let authorization = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let identity = state.registry.authenticate(authorization);
    if authorization.is_some() && identity.is_anonymous() {
        tracing::debug!("credentials presented but not recognized; continuing as anonymous");
    }

    request.extensions_mut().insert(CallerIdentity(identity));
    next.run(request).await
}
