//! Store manifest
//!
//! `<store>/manifest.json` identifies the store format and carries the
//! generation counter the two-phase read checks for staleness. The manifest
//! is rewritten atomically (temp file, fsync, rename) after every committed
//! batch, so its generation never runs ahead of visible data.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{LoreError, LoreResult};

/// Current on-disk format version.
const FORMAT_VERSION: u32 = 1;

const MANIFEST_FILE_NAME: &str = "manifest.json";

/// Durable store identity and state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// On-disk format version; readers refuse versions they do not know.
    pub format_version: u32,
    /// Advances by one per committed batch, across all record kinds.
    pub generation: u64,
}

impl Manifest {
    /// Manifest of a freshly created store.
    pub fn new() -> Self {
        Self {
            format_version: FORMAT_VERSION,
            generation: 0,
        }
    }

    /// Loads the manifest of the store rooted at `store_root`.
    ///
    /// Returns `None` when no manifest exists (the store has never been
    /// written). An unreadable or unsupported manifest is an error.
    pub fn load(store_root: &Path) -> LoreResult<Option<Self>> {
        let path = manifest_path(store_root);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(LoreError::io(format!("reading {}", path.display()), e)),
        };

        let manifest: Manifest = serde_json::from_str(&content).map_err(|e| {
            LoreError::serialization(format!("undecodable manifest {}: {}", path.display(), e))
        })?;

        if manifest.format_version != FORMAT_VERSION {
            return Err(LoreError::serialization(format!(
                "unsupported store format version {} (supported: {})",
                manifest.format_version, FORMAT_VERSION
            )));
        }

        Ok(Some(manifest))
    }

    /// Writes the manifest atomically into the store rooted at `store_root`.
    ///
    /// Write to a temp file, fsync it, rename over the live manifest, fsync
    /// the directory so the rename is durable.
    pub fn store(&self, store_root: &Path) -> LoreResult<()> {
        let path = manifest_path(store_root);
        let temp_path = temp_manifest_path(store_root);

        let content = serde_json::to_string_pretty(self).map_err(|e| {
            LoreError::serialization(format!("encoding manifest: {}", e))
        })?;

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .map_err(|e| LoreError::io(format!("creating {}", temp_path.display()), e))?;
        file.write_all(content.as_bytes())
            .map_err(|e| LoreError::io(format!("writing {}", temp_path.display()), e))?;
        file.sync_all()
            .map_err(|e| LoreError::io(format!("syncing {}", temp_path.display()), e))?;

        fs::rename(&temp_path, &path)
            .map_err(|e| LoreError::io(format!("committing {}", path.display()), e))?;

        if let Ok(dir) = File::open(store_root) {
            let _ = dir.sync_all();
        }

        Ok(())
    }
}

impl Default for Manifest {
    fn default() -> Self {
        Self::new()
    }
}

fn manifest_path(store_root: &Path) -> PathBuf {
    store_root.join(MANIFEST_FILE_NAME)
}

fn temp_manifest_path(store_root: &Path) -> PathBuf {
    store_root.join(format!("{}.tmp", MANIFEST_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_absent_manifest_loads_as_none() {
        let dir = TempDir::new().unwrap();
        assert_eq!(Manifest::load(dir.path()).unwrap(), None);
    }

    #[test]
    fn test_store_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let mut manifest = Manifest::new();
        manifest.generation = 7;
        manifest.store(dir.path()).unwrap();

        let loaded = Manifest::load(dir.path()).unwrap().unwrap();
        assert_eq!(loaded, manifest);
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let dir = TempDir::new().unwrap();
        Manifest::new().store(dir.path()).unwrap();
        assert!(!temp_manifest_path(dir.path()).exists());
    }

    #[test]
    fn test_unsupported_version_is_rejected() {
        let dir = TempDir::new().unwrap();
        fs::write(
            manifest_path(dir.path()),
            "{\"format_version\": 99, \"generation\": 0}",
        )
        .unwrap();
        let err = Manifest::load(dir.path()).unwrap_err();
        assert!(err.to_string().contains("format version"));
    }

    #[test]
    fn test_garbage_manifest_is_rejected() {
        let dir = TempDir::new().unwrap();
        fs::write(manifest_path(dir.path()), "not json").unwrap();
        assert!(Manifest::load(dir.path()).is_err());
    }
}
