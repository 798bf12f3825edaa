//! # API Route Modules
//!
//! - `artifacts`: listing, download, existence checks, and upload of
//!   artifacts under `/{container}/...`.

pub mod artifacts;
