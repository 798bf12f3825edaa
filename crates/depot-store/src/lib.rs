//! # depot-store — Filesystem Artifact Store
//!
//! Performs the actual reads and writes behind the gateway. The store knows
//! nothing about containers or users: it is handed an already-resolved
//! filesystem path.
//!
//! ## Write protocol
//!
//! ```text
//! policy check → create parent dirs → stream into .{name}.{uuid}.depot-tmp
//!   → flush + fsync → rename (mutable) | hard link (immutable) → done
//! ```
//!
//! Readers only ever observe the previous complete file or the new complete
//! file. Any failure, including the write future being dropped mid-stream,
//! removes the temporary file and leaves the destination untouched.
//!
//! ## Immutability
//!
//! See [`policy::OverwritePolicy`]. Released artifacts are write-once;
//! snapshots and `maven-metadata.xml` files may be replaced.

pub mod error;
pub mod policy;
pub mod store;

pub use error::StoreError;
pub use policy::OverwritePolicy;
pub use store::{ArtifactStore, EntryKind, EntryMeta, WriteOutcome};
