//! # Artifact Store
//!
//! `stat`, `list`, `read`, and `write` over resolved filesystem paths using
//! `tokio::fs`. No lock is held between requests; concurrent writers to a
//! mutable path race on `rename` and the last one wins.

use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio_stream::{Stream, StreamExt};
use uuid::Uuid;

use crate::error::StoreError;
use crate::policy::OverwritePolicy;

/// Suffix of in-flight temporary files. Entries carrying it are hidden from
/// listings.
pub const TEMP_SUFFIX: &str = ".depot-tmp";

/// Whether an entry is a file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A regular file.
    File,
    /// A directory.
    Directory,
}

/// Result of [`ArtifactStore::stat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryMeta {
    /// File or directory.
    pub kind: EntryKind,
    /// Size in bytes (as reported by the filesystem for directories).
    pub len: u64,
}

impl EntryMeta {
    /// Whether the entry is a directory.
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// Result of a successful [`ArtifactStore::write`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOutcome {
    /// Bytes written.
    pub bytes: u64,
    /// Whether an existing file was replaced.
    pub replaced: bool,
}

/// Filesystem-backed artifact store.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    sync_data: bool,
}

impl Default for ArtifactStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ArtifactStore {
    /// A store that fsyncs every temporary file before publishing it.
    pub fn new() -> Self {
        Self { sync_data: true }
    }

    /// Skip the fsync before publish. Readers still never see torn files,
    /// but a crash may lose the most recent writes.
    pub fn without_sync(mut self) -> Self {
        self.sync_data = false;
        self
    }

    /// Stat a path.
    pub async fn stat(&self, path: &Path) -> Result<EntryMeta, StoreError> {
        let meta = fs::metadata(path)
            .await
            .map_err(|e| StoreError::io(path, e))?;
        let kind = if meta.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        };
        Ok(EntryMeta {
            kind,
            len: meta.len(),
        })
    }

    /// Names of the direct children of a directory, sorted.
    pub async fn list(&self, path: &Path) -> Result<Vec<String>, StoreError> {
        let mut names = BTreeSet::new();
        self.collect_children(path, &mut names).await?;
        Ok(names.into_iter().collect())
    }

    /// Sorted, de-duplicated union of the children of several directories.
    ///
    /// Directories that do not exist contribute nothing.
    pub async fn list_merged(&self, paths: &[&Path]) -> Result<Vec<String>, StoreError> {
        let mut names = BTreeSet::new();
        for path in paths {
            match self.collect_children(path, &mut names).await {
                Ok(()) | Err(StoreError::NotFound(_)) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(names.into_iter().collect())
    }

    async fn collect_children(
        &self,
        path: &Path,
        names: &mut BTreeSet<String>,
    ) -> Result<(), StoreError> {
        let mut entries = fs::read_dir(path)
            .await
            .map_err(|e| StoreError::io(path, e))?;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::io(path, e))?
        {
            let name = entry.file_name().to_string_lossy().into_owned();
            if is_temp_name(&name) {
                continue;
            }
            names.insert(name);
        }
        Ok(())
    }

    /// Read a whole file.
    pub async fn read(&self, path: &Path) -> Result<Vec<u8>, StoreError> {
        fs::read(path).await.map_err(|e| StoreError::io(path, e))
    }

    /// Write a byte stream to `path` atomically.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Conflict`] if `policy` is [`OverwritePolicy::Deny`]
    ///   and `path` exists, checked up front and again at publish time.
    /// - [`StoreError::Interrupted`] if the stream yields an error.
    /// - [`StoreError::Io`] for filesystem failures.
    pub async fn write<S, D, E>(
        &self,
        path: &Path,
        policy: OverwritePolicy,
        mut chunks: S,
    ) -> Result<WriteOutcome, StoreError>
    where
        S: Stream<Item = Result<D, E>> + Unpin,
        D: AsRef<[u8]>,
        E: std::fmt::Display,
    {
        let existed = fs::try_exists(path)
            .await
            .map_err(|e| StoreError::io(path, e))?;
        if existed && policy == OverwritePolicy::Deny {
            return Err(StoreError::Conflict(path.to_path_buf()));
        }

        let (parent, file_name) = split_destination(path)?;
        fs::create_dir_all(parent)
            .await
            .map_err(|e| StoreError::io(parent, e))?;

        let mut temp = TempFile::new(parent, file_name);
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(temp.path())
            .await
            .map_err(|e| StoreError::io(temp.path(), e))?;

        let mut bytes = 0u64;
        while let Some(chunk) = chunks.next().await {
            let chunk = chunk.map_err(|e| StoreError::Interrupted(e.to_string()))?;
            let chunk = chunk.as_ref();
            file.write_all(chunk)
                .await
                .map_err(|e| StoreError::io(temp.path(), e))?;
            bytes += chunk.len() as u64;
        }
        file.flush()
            .await
            .map_err(|e| StoreError::io(temp.path(), e))?;
        if self.sync_data {
            file.sync_all()
                .await
                .map_err(|e| StoreError::io(temp.path(), e))?;
        }
        drop(file);

        match policy {
            OverwritePolicy::Allow => {
                fs::rename(temp.path(), path)
                    .await
                    .map_err(|e| StoreError::io(path, e))?;
                temp.disarm();
            }
            OverwritePolicy::Deny => publish_no_clobber(&mut temp, path).await?,
        }

        tracing::debug!(path = %path.display(), bytes, replaced = existed, "artifact written");
        Ok(WriteOutcome {
            bytes,
            replaced: existed,
        })
    }
}

/// Link the temp file into place without replacing an existing destination.
async fn publish_no_clobber(temp: &mut TempFile, path: &Path) -> Result<(), StoreError> {
    match fs::hard_link(temp.path(), path).await {
        Ok(()) => {
            if let Err(e) = fs::remove_file(temp.path()).await {
                tracing::warn!(path = %temp.path().display(), error = %e, "failed to remove temp file");
            }
            temp.disarm();
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            Err(StoreError::Conflict(path.to_path_buf()))
        }
        // Filesystems without hard links fall back to the up-front check.
        Err(e) if e.kind() == io::ErrorKind::Unsupported => rename_if_absent(temp, path).await,
        Err(e) => Err(StoreError::io(path, e)),
    }
}

async fn rename_if_absent(temp: &mut TempFile, path: &Path) -> Result<(), StoreError> {
    if fs::try_exists(path)
        .await
        .map_err(|e| StoreError::io(path, e))?
    {
        return Err(StoreError::Conflict(path.to_path_buf()));
    }
    fs::rename(temp.path(), path)
        .await
        .map_err(|e| StoreError::io(path, e))?;
    temp.disarm();
    Ok(())
}

fn split_destination(path: &Path) -> Result<(&Path, &str), StoreError> {
    let invalid = || StoreError::Io {
        path: path.to_path_buf(),
        source: io::Error::new(io::ErrorKind::InvalidInput, "not a file path"),
    };
    let parent = path.parent().ok_or_else(invalid)?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(invalid)?;
    Ok((parent, file_name))
}

fn is_temp_name(name: &str) -> bool {
    name.starts_with('.') && name.ends_with(TEMP_SUFFIX)
}

/// A temporary file next to its destination, removed on drop unless
/// disarmed. Dropping covers early returns and cancelled futures alike.
struct TempFile {
    path: PathBuf,
    armed: bool,
}

impl TempFile {
    fn new(dir: &Path, file_name: &str) -> Self {
        let path = dir.join(format!(".{file_name}.{}{TEMP_SUFFIX}", Uuid::new_v4().simple()));
        Self { path, armed: true }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "removed temp file"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to remove temp file")
            }
        }
    }
}
