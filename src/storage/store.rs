//! Store operations
//!
//! One `Store` handle per path. Opening is free and creates nothing; the
//! directory, record files, and manifest appear with the first non-empty
//! batch. Counting or reading a store that was never written succeeds with
//! zero records.
//!
//! A batch commits in one atomic step: the record file is rewritten through
//! a temp-fsync-rename swap containing the old content plus the whole batch,
//! then the manifest generation advances through the same swap. An I/O
//! failure at any point leaves the previously visible records intact:
//! either all records of a batch become visible or none do.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::manifest::Manifest;
use super::record::{decode_record, encode_record, RecordEncoding};
use crate::errors::{LoreError, LoreResult};
use crate::model::{EntityColumn, EntityRelationship, HistoryItem, RecordKind};

/// Handle on the store rooted at one path.
///
/// The handle itself holds no locks and no open files; writers to the same
/// path must be serialized by the caller (the protocol layer's path
/// registry does this).
pub struct Store {
    root: PathBuf,
}

impl Store {
    /// Opens a handle on the store at `root`. No filesystem access happens
    /// until the first operation.
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the store path.
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Returns the store generation: 0 for a store never written, otherwise
    /// the number of batches committed so far.
    pub fn generation(&self) -> LoreResult<u64> {
        Ok(Manifest::load(&self.root)?.map_or(0, |m| m.generation))
    }

    /// Appends a batch of entity columns. All or nothing.
    pub fn append_entity_columns(&self, records: &[EntityColumn]) -> LoreResult<()> {
        self.append_batch(records)
    }

    /// Appends a batch of history items. All or nothing.
    pub fn append_history_items(&self, records: &[HistoryItem]) -> LoreResult<()> {
        self.append_batch(records)
    }

    /// Appends a batch of relationships. All or nothing.
    pub fn append_relationships(&self, records: &[EntityRelationship]) -> LoreResult<()> {
        self.append_batch(records)
    }

    /// Reads all entity columns in insertion order.
    pub fn read_entity_columns(&self) -> LoreResult<Vec<EntityColumn>> {
        self.read_all()
    }

    /// Reads all history items in insertion order.
    pub fn read_history_items(&self) -> LoreResult<Vec<HistoryItem>> {
        self.read_all()
    }

    /// Reads all relationships in insertion order.
    pub fn read_relationships(&self) -> LoreResult<Vec<EntityRelationship>> {
        self.read_all()
    }

    fn record_file(&self, kind: RecordKind) -> PathBuf {
        self.root.join(kind.file_name())
    }

    fn append_batch<T: RecordEncoding>(&self, records: &[T]) -> LoreResult<()> {
        // An empty batch succeeds without creating the store.
        if records.is_empty() {
            return Ok(());
        }

        // Validate the whole batch before any byte reaches disk.
        for record in records {
            record.validate()?;
        }

        fs::create_dir_all(&self.root)
            .map_err(|e| LoreError::io(format!("creating store {}", self.root.display()), e))?;

        let path = self.record_file(T::kind());
        let mut content = match fs::read(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(LoreError::io(format!("reading {}", path.display()), e)),
        };
        for record in records {
            content.extend_from_slice(&encode_record(record));
        }

        self.swap_in(&path, &content)?;

        // The generation advances only after the records are visible, so a
        // failure in between can only make a stale count look fresh-but-
        // conservative, never hide committed records.
        let mut manifest = Manifest::load(&self.root)?.unwrap_or_default();
        manifest.generation += 1;
        manifest.store(&self.root)
    }

    fn read_all<T: RecordEncoding>(&self) -> LoreResult<Vec<T>> {
        let path = self.record_file(T::kind());
        let content = match fs::read(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(LoreError::io(format!("reading {}", path.display()), e)),
        };

        let mut records = Vec::new();
        let mut offset = 0;
        while offset < content.len() {
            let (record, consumed) = decode_record::<T>(&content[offset..])?;
            records.push(record);
            offset += consumed;
        }
        Ok(records)
    }

    /// Replaces `path` with `content` atomically: temp file, fsync, rename,
    /// directory fsync.
    fn swap_in(&self, path: &Path, content: &[u8]) -> LoreResult<()> {
        let temp_path = path.with_extension("dat.tmp");

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .map_err(|e| LoreError::io(format!("creating {}", temp_path.display()), e))?;
        file.write_all(content)
            .map_err(|e| LoreError::io(format!("writing {}", temp_path.display()), e))?;
        file.sync_all()
            .map_err(|e| LoreError::io(format!("syncing {}", temp_path.display()), e))?;

        fs::rename(&temp_path, path)
            .map_err(|e| LoreError::io(format!("committing {}", path.display()), e))?;

        if let Ok(dir) = File::open(&self.root) {
            let _ = dir.sync_all();
        }

        Ok(())
    }
}
