//! # depot-api — HTTP Gateway for the Depot Artifact Repository
//!
//! Exposes a filesystem-backed store of versioned build artifacts over
//! HTTP, routed through named containers (repositories and groups) with
//! per-container, per-user access control.
//!
//! ## API Surface
//!
//! | Request                     | Result                                   |
//! |-----------------------------|------------------------------------------|
//! | `GET /{container}/`         | JSON array of root entries               |
//! | `GET /{container}/{path}`   | file bytes, or JSON listing of a dir     |
//! | `HEAD /{container}/{path}`  | 200 with `Content-Length`                |
//! | `PUT /{container}/{path}`   | atomic write (repositories only)         |
//!
//! There are no fixed routes such as health probes: the first path segment
//! always names a container.
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → IdentityMiddleware → Handler
//! ```

pub mod auth;
pub mod error;
pub mod routes;
pub mod state;

use axum::middleware::from_fn_with_state;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    routes::artifacts::router()
        .layer(from_fn_with_state(state.clone(), auth::identity_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
