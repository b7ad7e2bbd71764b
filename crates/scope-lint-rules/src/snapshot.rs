//! Directory snapshots with a per-run read-through cache.
//!
//! A snapshot lists a directory once and classifies each entry. The
//! provider shares snapshots between all files of a run; concurrent first
//! requests for the same directory wait on a single read.

use moka::sync::Cache;
use scope_lint_core::specifier::{self, is_index_file};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

const DEFAULT_CAPACITY: u64 = 10_000;

/// Error reading a directory.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The directory listing could not be read.
    #[error("failed to read directory {path}: {source}")]
    Read {
        /// Directory that failed.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
}

/// Classification of a directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A regular file.
    File,
    /// A directory containing its own index file.
    SubPackage,
    /// Hidden, unreadable, or a directory without an index file.
    Ignored,
}

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// Entry name.
    pub name: String,
    /// Entry classification.
    pub kind: EntryKind,
}

/// Classified listing of one directory, sorted by name.
#[derive(Debug, Clone)]
pub struct DirectorySnapshot {
    /// The directory listed.
    pub dir: PathBuf,
    /// Entries, sorted by name.
    pub entries: Vec<DirectoryEntry>,
}

impl DirectorySnapshot {
    /// Lists and classifies `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if `dir` itself cannot be listed. Failures on
    /// individual entries classify them as [`EntryKind::Ignored`].
    pub fn read(dir: &Path) -> Result<Self, SnapshotError> {
        let read_error = |source| SnapshotError::Read {
            path: dir.to_path_buf(),
            source,
        };

        let mut entries = Vec::new();
        for entry in fs::read_dir(dir).map_err(read_error)? {
            let entry = entry.map_err(read_error)?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let kind = classify(&entry.path(), &name);
            entries.push(DirectoryEntry { name, kind });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(Self {
            dir: dir.to_path_buf(),
            entries,
        })
    }

    /// Iterates entries of the given kind.
    pub fn entries_of(&self, kind: EntryKind) -> impl Iterator<Item = &DirectoryEntry> {
        self.entries.iter().filter(move |e| e.kind == kind)
    }

    /// Returns true if the directory holds a namespace file.
    #[must_use]
    pub fn has_namespace_file(&self) -> bool {
        self.entries_of(EntryKind::File)
            .any(|e| specifier::is_namespace_file(&e.name))
    }
}

fn classify(path: &Path, name: &str) -> EntryKind {
    if name.starts_with('.') {
        return EntryKind::Ignored;
    }

    // Follows symlinks, like a stat would.
    let Ok(metadata) = fs::metadata(path) else {
        return EntryKind::Ignored;
    };

    if metadata.is_file() {
        EntryKind::File
    } else if metadata.is_dir() && contains_index_file(path) {
        EntryKind::SubPackage
    } else {
        EntryKind::Ignored
    }
}

fn contains_index_file(dir: &Path) -> bool {
    let Ok(entries) = fs::read_dir(dir) else {
        return false;
    };
    entries
        .filter_map(Result::ok)
        .any(|e| is_index_file(&e.file_name().to_string_lossy()))
}

/// Shared result of a snapshot request.
pub type SnapshotResult = Arc<Result<DirectorySnapshot, SnapshotError>>;

/// Read-through snapshot cache keyed by canonicalized directory path.
///
/// Failed reads are cached too, so each unreadable directory is warned
/// about once per provider.
pub struct SnapshotProvider {
    cache: Cache<PathBuf, SnapshotResult>,
}

impl SnapshotProvider {
    /// Creates a provider with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a provider holding at most `max_entries` directories.
    #[must_use]
    pub fn with_capacity(max_entries: u64) -> Self {
        Self {
            cache: Cache::builder().max_capacity(max_entries).build(),
        }
    }

    /// Returns the snapshot of `dir`, reading it on first request.
    pub fn snapshot(&self, dir: &Path) -> SnapshotResult {
        let key = dir
            .canonicalize()
            .unwrap_or_else(|_| specifier::normalize_path(dir));

        self.cache.get_with(key.clone(), || {
            debug!("Reading directory snapshot: {}", key.display());
            let result = DirectorySnapshot::read(&key);
            if let Err(e) = &result {
                warn!("{e}; skipping structural checks for files in it");
            }
            Arc::new(result)
        })
    }

    /// Drops all cached snapshots.
    pub fn clear(&self) {
        self.cache.invalidate_all();
    }
}

impl Default for SnapshotProvider {
    fn default() -> Self {
        Self::new()
    }
}
