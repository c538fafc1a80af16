//! Local document cache
//!
//! Handles saving and loading the JSON document to/from the filesystem.
//! Uses atomic writes (write to temp file, then rename) to prevent corruption.
//!
//! Storage location: `~/.local/share/minutebook/document.json` (configurable
//! via `Config`). The cache is a mirror of the remote document; when no
//! remote is configured it is the only copy.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::document::Document;
use crate::storage::error::{StorageError, StorageResult};

/// Persistence layer for the JSON document
///
/// Provides atomic file operations for saving/loading the document.
pub struct DocumentCache {
    path: PathBuf,
}

impl DocumentCache {
    /// Create a cache handler for the given file path
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Path of the cache file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if a cached document exists on disk
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Save a document to disk using atomic write
    ///
    /// This writes to a temporary file first, then renames it to the target
    /// path, so the file is never left in a partially-written state.
    pub fn save(&self, doc: &Document) -> StorageResult<()> {
        let json = serde_json::to_vec_pretty(doc).map_err(|e| StorageError::InvalidFormat {
            path: self.path.clone(),
            details: e.to_string(),
        })?;
        atomic_write(&self.path, &json)
    }

    /// Replace the cache with already-validated raw bytes
    ///
    /// Used after a pull: the remote bytes land on disk exactly as fetched,
    /// so the cache stays byte-identical to the remote copy.
    pub fn replace_bytes(&self, bytes: &[u8]) -> StorageResult<()> {
        atomic_write(&self.path, bytes)
    }

    /// Load the document from disk
    ///
    /// Returns `None` if the cache file doesn't exist.
    /// Returns an error if the file exists but can't be read or parsed.
    pub fn load(&self) -> StorageResult<Option<Document>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let bytes = fs::read(&self.path).map_err(|e| StorageError::ReadError {
            path: self.path.clone(),
            source: e,
        })?;

        let mut doc: Document =
            serde_json::from_slice(&bytes).map_err(|e| StorageError::InvalidFormat {
                path: self.path.clone(),
                details: e.to_string(),
            })?;
        doc.normalize();

        Ok(Some(doc))
    }

    /// Load the document, falling back to an empty one
    ///
    /// A missing cache yields an empty document. An unreadable or
    /// unparsable cache also yields an empty document, but the file on
    /// disk is left untouched so its contents can still be recovered.
    pub fn load_or_default(&self) -> Document {
        match self.load() {
            Ok(Some(doc)) => doc,
            Ok(None) => Document::new(),
            Err(e) => {
                warn!("Could not load cached document, starting empty: {}", e);
                Document::new()
            }
        }
    }
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
///
/// This ensures the target file is never left in a partially-written state.
fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| StorageError::CreateDirectory {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    // Create temp file in the same directory (for atomic rename)
    let temp_path = path.with_extension("tmp");

    // Write to temp file
    let mut file =
        File::create(&temp_path).map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    file.write_all(data)
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    // Sync to disk before rename
    file.sync_all()
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    // Atomic rename
    fs::rename(&temp_path, path).map_err(|e| StorageError::AtomicWriteFailed {
        from: temp_path.clone(),
        to: path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}
