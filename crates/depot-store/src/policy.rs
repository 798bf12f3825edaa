//! # Overwrite Policy
//!
//! Released artifacts are immutable: once `com/acme/lib/1.0/lib-1.0.jar`
//! exists it can never be replaced. Two kinds of path are exempt:
//!
//! - Maven repository metadata (`maven-metadata.xml` and its `.sha1` and
//!   `.md5` checksums), which is rewritten on every publish.
//! - Anything under a directory segment ending in `-SNAPSHOT`.
//!
//! The policy is computed from the repository-relative path, so a
//! repository root that happens to live under a `-SNAPSHOT` directory does
//! not make every artifact in it mutable.

/// File names that may always be overwritten.
pub const MUTABLE_FILE_NAMES: [&str; 3] = [
    "maven-metadata.xml",
    "maven-metadata.xml.sha1",
    "maven-metadata.xml.md5",
];

/// Directory-segment suffix marking snapshot versions.
pub const SNAPSHOT_SUFFIX: &str = "-SNAPSHOT";

/// Whether a write may replace an existing file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverwritePolicy {
    /// Replace atomically; last writer wins.
    Allow,
    /// Fail with a conflict if the destination exists.
    Deny,
}

impl OverwritePolicy {
    /// Policy for a repository-relative artifact path such as
    /// `/com/acme/lib/1.0-SNAPSHOT/lib.jar`.
    pub fn for_artifact(relative: &str) -> Self {
        let mut segments: Vec<&str> = relative.split('/').filter(|s| !s.is_empty()).collect();
        let Some(file_name) = segments.pop() else {
            return Self::Deny;
        };
        let mutable = MUTABLE_FILE_NAMES.contains(&file_name)
            || segments.iter().any(|s| s.ends_with(SNAPSHOT_SUFFIX));
        if mutable {
            Self::Allow
        } else {
            Self::Deny
        }
    }
}
