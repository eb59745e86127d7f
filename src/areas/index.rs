//! Staging index
//!
//! The index records the deltas queued for the next commit:
//!
//! - `staged_add`: paths whose new content (a blob id) should appear in the next snapshot
//! - `staged_remove`: paths that should disappear from the next snapshot
//!
//! A path is never in both at once. The index is persisted as a JSON record
//! (`.twig/index`) and flushed after every mutation, so a restarted process
//! observes the last staging state.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::io::{Read, Write};
use std::ops::DerefMut;
use std::path::{Path, PathBuf};

use crate::artifacts::objects::object_id::ObjectId;

/// On-disk schema of the staging index
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct StagingRecord {
    #[serde(default)]
    staged_add: BTreeMap<PathBuf, ObjectId>,
    #[serde(default)]
    staged_remove: BTreeSet<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct Index {
    /// Path to the index file (typically `.twig/index`)
    path: Box<Path>,
    record: StagingRecord,
    /// Flag indicating if the index has been modified since loading
    changed: bool,
}

impl Index {
    pub fn new(path: Box<Path>) -> Self {
        Index {
            path,
            record: StagingRecord::default(),
            changed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the index from disk
    ///
    /// A missing or empty index file is an empty index.
    ///
    /// # Locking
    ///
    /// Acquires a shared lock on the index file during reading.
    pub fn rehydrate(&mut self) -> anyhow::Result<()> {
        self.record = StagingRecord::default();
        self.changed = false;

        if !self.path().exists() {
            return Ok(());
        }

        let mut index_file = std::fs::OpenOptions::new().read(true).open(self.path())?;
        let mut lock = file_guard::lock(&mut index_file, file_guard::Lock::Shared, 0, 1)?;

        let mut content = String::new();
        lock.deref_mut().read_to_string(&mut content)?;

        if content.trim().is_empty() {
            return Ok(());
        }

        let record: StagingRecord = serde_json::from_str(&content).map_err(|e| {
            anyhow::anyhow!("Invalid index file {}: {e}", self.path.display())
        })?;
        self.record = record;

        Ok(())
    }

    /// Persist the index if anything changed since the last load or write
    pub fn write_updates(&mut self) -> anyhow::Result<()> {
        if !self.changed && self.path().exists() {
            return Ok(());
        }

        let content = serde_json::to_vec_pretty(&self.record)?;

        let mut index_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(self.path())?;
        let mut lock = file_guard::lock(&mut index_file, file_guard::Lock::Exclusive, 0, 1)?;
        lock.deref_mut().write_all(&content)?;

        self.changed = false;
        tracing::trace!(
            staged = self.record.staged_add.len(),
            removed = self.record.staged_remove.len(),
            "index written"
        );

        Ok(())
    }

    /// Queue `path` with new content, cancelling any pending removal of it
    pub fn add(&mut self, path: PathBuf, oid: ObjectId) {
        self.record.staged_remove.remove(&path);
        self.record.staged_add.insert(path, oid);
        self.changed = true;
    }

    /// Queue `path` for removal, dropping any staged content for it
    pub fn remove(&mut self, path: PathBuf) {
        self.record.staged_add.remove(&path);
        self.record.staged_remove.insert(path);
        self.changed = true;
    }

    /// Drop `path` from staged-add; returns whether it was there
    pub fn unstage(&mut self, path: &Path) -> bool {
        let removed = self.record.staged_add.remove(path).is_some();
        self.changed |= removed;
        removed
    }

    /// Drop `path` from staged-remove; returns whether it was there
    pub fn cancel_removal(&mut self, path: &Path) -> bool {
        let removed = self.record.staged_remove.remove(path);
        self.changed |= removed;
        removed
    }

    pub fn staged_entry(&self, path: &Path) -> Option<&ObjectId> {
        self.record.staged_add.get(path)
    }

    pub fn is_staged(&self, path: &Path) -> bool {
        self.record.staged_add.contains_key(path)
    }

    pub fn is_removed(&self, path: &Path) -> bool {
        self.record.staged_remove.contains(path)
    }

    pub fn staged_additions(&self) -> &BTreeMap<PathBuf, ObjectId> {
        &self.record.staged_add
    }

    pub fn staged_removals(&self) -> &BTreeSet<PathBuf> {
        &self.record.staged_remove
    }

    pub fn is_empty(&self) -> bool {
        self.record.staged_add.is_empty() && self.record.staged_remove.is_empty()
    }

    /// Empty both maps and persist the empty state
    pub fn clear(&mut self) -> anyhow::Result<()> {
        self.record = StagingRecord::default();
        self.changed = true;

        self.write_updates()
    }
}
