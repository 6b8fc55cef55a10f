//! Local reprint store: one `<identifier>.pdf` per article in a flat
//! directory.
//!
//! The store is checked before any network activity and written to after a
//! successful resolution. Writes go through a temp file in the same
//! directory followed by an atomic rename, so a concurrent reader never
//! observes a truncated file; concurrent writers for the same identifier
//! race harmlessly — the last rename wins and every reader sees a complete
//! file.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::Serialize;
use serde::ser::SerializeStruct;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

use crate::ident::Identifier;

/// Errors from store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem operation failed
    #[error("store I/O error at '{path}'")]
    Io {
        /// Path involved in the failed operation
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Background write task was cancelled or panicked
    #[error("store write task failed: {reason}")]
    Background {
        /// Join error description
        reason: String,
    },
}

/// One stored reprint: identifier, file path, size, and retrieval time.
///
/// Never mutated; overwriting a reprint recreates the entry.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    /// The identifier the file is filed under
    pub identifier: Identifier,
    /// Absolute or store-relative path of the PDF
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Retrieval timestamp (file modification time)
    pub retrieved: SystemTime,
}

impl Serialize for CatalogEntry {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let retrieved_unix = self
            .retrieved
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let mut state = serializer.serialize_struct("CatalogEntry", 4)?;
        state.serialize_field("identifier", self.identifier.as_str())?;
        state.serialize_field("path", &self.path)?;
        state.serialize_field("size", &self.size)?;
        state.serialize_field("retrieved_unix", &retrieved_unix)?;
        state.end()
    }
}

/// Flat-directory reprint store.
#[derive(Debug, Clone)]
pub struct Store {
    dir: PathBuf,
}

impl Store {
    /// Opens a store rooted at `dir`. The directory is created lazily on the
    /// first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The store's root directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path a reprint for `id` is (or would be) stored at.
    #[must_use]
    pub fn path_for(&self, id: &Identifier) -> PathBuf {
        self.dir.join(format!("{}.pdf", id.file_stem()))
    }

    /// Returns true when a reprint for `id` is already stored.
    #[must_use]
    pub fn has(&self, id: &Identifier) -> bool {
        self.path_for(id).is_file()
    }

    /// Looks up the catalog entry for `id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] when the file exists but its metadata
    /// cannot be read.
    pub fn get(&self, id: &Identifier) -> Result<Option<CatalogEntry>, StoreError> {
        let path = self.path_for(id);
        match std::fs::metadata(&path) {
            Ok(meta) if meta.is_file() => Ok(Some(CatalogEntry {
                identifier: id.clone(),
                size: meta.len(),
                retrieved: meta.modified().map_err(|source| StoreError::Io {
                    path: path.clone(),
                    source,
                })?,
                path,
            })),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    /// Stores `bytes` as the reprint for `id`, overwriting any previous
    /// file, and returns the new catalog entry.
    ///
    /// The write is published atomically: bytes land in a `NamedTempFile`
    /// inside the store directory and are renamed over the target in one
    /// step.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write or rename fails.
    pub async fn put(&self, id: &Identifier, bytes: &[u8]) -> Result<CatalogEntry, StoreError> {
        let dir = self.dir.clone();
        let target = self.path_for(id);
        let payload = bytes.to_vec();
        let rename_target = target.clone();

        tokio::task::spawn_blocking(move || -> Result<(), StoreError> {
            std::fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
                path: dir.clone(),
                source,
            })?;
            let mut tmp = NamedTempFile::new_in(&dir).map_err(|source| StoreError::Io {
                path: dir.clone(),
                source,
            })?;
            tmp.write_all(&payload).map_err(|source| StoreError::Io {
                path: tmp.path().to_path_buf(),
                source,
            })?;
            tmp.as_file().sync_all().map_err(|source| StoreError::Io {
                path: tmp.path().to_path_buf(),
                source,
            })?;
            tmp.persist(&rename_target)
                .map_err(|e| StoreError::Io {
                    path: rename_target.clone(),
                    source: e.error,
                })?;
            Ok(())
        })
        .await
        .map_err(|e| StoreError::Background {
            reason: e.to_string(),
        })??;

        debug!(identifier = %id, path = %target.display(), "reprint stored");
        self.get(id)?.ok_or_else(|| StoreError::Io {
            path: target,
            source: std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "stored file disappeared before it could be cataloged",
            ),
        })
    }

    /// Enumerates every stored reprint whose file stem parses as an
    /// identifier, in directory order. Files with foreign names are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] when the directory cannot be read. A
    /// missing directory is an empty catalog, not an error.
    pub fn entries(&self) -> Result<Vec<CatalogEntry>, StoreError> {
        let read_dir = match std::fs::read_dir(&self.dir) {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.dir.clone(),
                    source,
                });
            }
        };

        let mut entries = Vec::new();
        for dir_entry in read_dir {
            let dir_entry = dir_entry.map_err(|source| StoreError::Io {
                path: self.dir.clone(),
                source,
            })?;
            let path = dir_entry.path();
            if path.extension().is_none_or(|ext| !ext.eq_ignore_ascii_case("pdf")) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let Some(identifier) = Identifier::from_file_stem(stem) else {
                debug!(path = %path.display(), "skipping file with non-identifier name");
                continue;
            };
            if let Some(entry) = self.get(&identifier)? {
                entries.push(entry);
            }
        }
        Ok(entries)
    }

    /// Deletes the reprint for `id`; returns true when a file was removed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] when the delete fails for a reason other
    /// than the file being absent.
    pub fn remove(&self, id: &Identifier) -> Result<bool, StoreError> {
        let path = self.path_for(id);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }
}
