#![deny(missing_docs)]

//! # depot-core — Routing and Access Control for the Depot Gateway
//!
//! This crate holds the process-wide, read-only model of the gateway and the
//! pure decisions made against it on every request. It performs no I/O.
//!
//! ## Components
//!
//! | Module            | Responsibility                                        |
//! |-------------------|-------------------------------------------------------|
//! | [`credential`]    | Credential hashing, HTTP Basic parsing, user lookup   |
//! | [`permission`]    | Permission levels, verbs, per-container grant tables  |
//! | [`container`]     | Repositories, groups, and their prefix routing tables |
//! | [`registry`]      | The immutable snapshot shared by all requests         |
//! | [`resolve`]       | Request path → repository and filesystem path         |
//! | [`authz`]         | Container + identity + verb → allow / deny            |
//!
//! ## Design Principles
//!
//! 1. **Invariants live in constructors.** A [`Group`] cannot be built with
//!    ambiguous routes, a [`Registry`] cannot hold two containers with the
//!    same name, and a [`CredentialStore`] rejects reserved user names.
//!
//! 2. **One tagged union for containers.** [`Container`] is matched
//!    exhaustively; there is no string-typed container kind.
//!
//! 3. **No suspension points.** Resolution and authorization are synchronous
//!    and never touch the filesystem, so they can run inline on any task.

pub mod authz;
pub mod container;
pub mod credential;
pub mod error;
pub mod identity;
pub mod permission;
pub mod registry;
pub mod resolve;

// Re-export primary types at crate root for ergonomic imports.
pub use authz::authorize;
pub use container::{Container, ContainerKind, Group, Prefix, Repository, Route};
pub use credential::{Credential, CredentialHash, CredentialStore};
pub use error::{AccessError, ModelError, RoutingError};
pub use identity::{Identity, Principal, ANONYMOUS, AUTHENTICATED};
pub use permission::{AnonymousScope, Permission, PermissionTable, Verb};
pub use registry::Registry;
pub use resolve::{
    contained_join, normalize_path, resolve, split_request_path, RequestTarget, Resolution,
};
