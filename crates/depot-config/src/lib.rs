#![deny(missing_docs)]

//! # depot-config — Configuration Loading
//!
//! Runs once at startup. Reads one or more YAML documents, validates each
//! against the embedded JSON Schema, merges them key by key, and builds the
//! [`depot_core::Registry`] the gateway serves from. This is the only part
//! of the system allowed to fail the whole process.
//!
//! ## Example
//!
//! ```yaml
//! port: 8080
//! users:
//!   - { name: deploy, password: s3cret }
//! repositories:
//!   - name: releases
//!     path: /srv/maven/releases
//!     prefixes: [com.example]
//!     users:
//!       - { name: deploy, permissions: rw }
//!       - { type: anonymous, permissions: ro }
//!   - name: mirror
//!     path: /srv/maven/mirror
//! groups:
//!   - name: public
//!     repositories: all
//!     users:
//!       - { type: anonymous, permissions: ro }
//! ```

pub mod document;
pub mod error;
pub mod loader;
pub mod validate;

pub use document::{ConfigFragment, Document};
pub use error::{ConfigError, ConfigIssue};
pub use loader::{load_documents, load_files, LoadedConfig, DEFAULT_PORT};
pub use validate::ConfigValidator;
