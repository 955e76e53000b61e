//! Shard layout catalog
//!
//! The catalog is the persisted file-to-slice index: for every stored
//! file it records where that file's slice begins within each shard
//! file and how long the slice is. It is loaded once at startup into an
//! owned value and threaded explicitly through the store operations in
//! [`crate::ec::store`] — never kept as global/process-wide state.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Per-file slice bookkeeping.
///
/// Invariant: `disk_size * d >= size` and `disk_size * d - size < d`
/// (padding only enough to align to a multiple of `d`), enforced by the
/// caller that constructs a descriptor ([`crate::ec::store::store`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    pub name: String,
    /// Byte position within each shard file where this file's slice begins.
    pub offset: u64,
    /// Per-shard slice length, identical across all `d+c` shards.
    pub disk_size: u64,
    /// Original logical byte length before padding.
    pub size: u64,
}

/// The persisted file-to-slice index.
///
/// Invariant: `disk_size == sum(descriptor.disk_size for descriptor in files)`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    pub files: BTreeMap<String, FileDescriptor>,
    /// Running per-shard cursor: the next free offset at which a new
    /// file's slice would be appended.
    pub disk_size: u64,
}

impl Catalog {
    /// Loads the catalog from `path`. If the file does not exist, an
    /// empty catalog is created and persisted at `path` before being
    /// returned, matching the source's "create on first use" behavior.
    pub fn load(path: &Path) -> Result<Catalog> {
        match std::fs::read(path) {
            Ok(bytes) => {
                let catalog: Catalog = serde_json::from_slice(&bytes)
                    .map_err(|e| Error::CatalogIo(format!("parsing {}: {e}", path.display())))?;
                debug!(path = %path.display(), files = catalog.files.len(), "loaded catalog");
                Ok(catalog)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no catalog found, creating an empty one");
                let catalog = Catalog::default();
                catalog.persist(path)?;
                Ok(catalog)
            }
            Err(e) => Err(Error::CatalogIo(format!("reading {}: {e}", path.display()))),
        }
    }

    /// Persists the catalog to `path`, crash-safely: serializes to a
    /// temporary file in the same directory, flushes and syncs it, then
    /// atomically renames it over `path`. A crash at any point before the
    /// rename leaves the previous catalog (or no catalog) intact; it
    /// never leaves a truncated or half-written document.
    pub fn persist(&self, path: &Path) -> Result<()> {
        let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
        if let Some(dir) = dir {
            std::fs::create_dir_all(dir)?;
        }

        let tmp_path = temp_path_for(path);
        let body = serde_json::to_vec_pretty(self)
            .map_err(|e| Error::CatalogIo(format!("serializing catalog: {e}")))?;

        let mut tmp = File::create(&tmp_path)?;
        tmp.write_all(&body)?;
        tmp.sync_all()?;
        drop(tmp);

        std::fs::rename(&tmp_path, path)?;
        debug!(path = %path.display(), files = self.files.len(), "persisted catalog");
        Ok(())
    }

    /// Registers a newly stored file's descriptor and advances the
    /// running `disk_size` cursor. Does not persist; callers persist
    /// once after the shard writes for the new file succeed.
    pub fn insert(&mut self, descriptor: FileDescriptor) {
        self.disk_size += descriptor.disk_size;
        self.files.insert(descriptor.name.clone(), descriptor);
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(name),
        _ => PathBuf::from(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn load_creates_empty_catalog_when_missing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("raid.json");
        assert!(!path.exists());

        let catalog = Catalog::load(&path).unwrap();
        assert!(catalog.files.is_empty());
        assert_eq!(catalog.disk_size, 0);
        assert!(path.exists());
    }

    #[test]
    fn persist_then_load_roundtrips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("raid.json");

        let mut catalog = Catalog::default();
        catalog.insert(FileDescriptor {
            name: "foo".to_string(),
            offset: 0,
            disk_size: 10,
            size: 60,
        });
        catalog.persist(&path).unwrap();

        let loaded = Catalog::load(&path).unwrap();
        assert_eq!(loaded.disk_size, 10);
        assert_eq!(loaded.files["foo"].size, 60);
    }

    #[test]
    fn insert_tracks_running_disk_size_invariant() {
        let mut catalog = Catalog::default();
        catalog.insert(FileDescriptor {
            name: "a".to_string(),
            offset: 0,
            disk_size: 5,
            size: 25,
        });
        catalog.insert(FileDescriptor {
            name: "b".to_string(),
            offset: 5,
            disk_size: 7,
            size: 40,
        });

        let sum: u64 = catalog.files.values().map(|d| d.disk_size).sum();
        assert_eq!(catalog.disk_size, sum);
    }

    #[test]
    fn persist_leaves_original_untouched_if_temp_write_observed_before_rename() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("raid.json");

        let mut original = Catalog::default();
        original.insert(FileDescriptor {
            name: "first".to_string(),
            offset: 0,
            disk_size: 3,
            size: 3,
        });
        original.persist(&path).unwrap();
        let original_bytes = std::fs::read(&path).unwrap();

        // Simulate a writer that got as far as writing the temp file but
        // crashed before the rename: the target path must still hold the
        // previous, fully-written catalog.
        let tmp_path = temp_path_for(&path);
        std::fs::write(&tmp_path, b"not json at all, simulating a half write").unwrap();

        let still_there = std::fs::read(&path).unwrap();
        assert_eq!(still_there, original_bytes);
    }
}
