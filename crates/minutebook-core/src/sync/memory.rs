//! In-memory remote host
//!
//! Behaves like the real host without the network: versioned files with
//! token-guarded writes. Clones share the same storage, so several
//! stores can sync against one instance the way several devices share
//! one repository.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::sync::host::{RemoteFile, RemoteHost, RemoteToken, StoredFile, SyncError};

#[derive(Debug, Default)]
struct HostState {
    files: HashMap<String, Entry>,
    offline: bool,
}

#[derive(Debug)]
struct Entry {
    bytes: Vec<u8>,
    revision: u64,
}

/// A remote host held entirely in memory
#[derive(Clone, Default)]
pub struct InMemoryHost {
    state: Arc<Mutex<HostState>>,
}

impl InMemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the host being unreachable
    ///
    /// While offline every operation fails with a transport error.
    pub async fn set_offline(&self, offline: bool) {
        self.state.lock().await.offline = offline;
    }

    /// Current contents of a stored file (test inspection)
    pub async fn contents(&self, path: &str) -> Option<Vec<u8>> {
        self.state
            .lock()
            .await
            .files
            .get(path)
            .map(|entry| entry.bytes.clone())
    }

    /// Number of stored files (test inspection)
    pub async fn file_count(&self) -> usize {
        self.state.lock().await.files.len()
    }

    /// Replace a file directly, bypassing token checks
    ///
    /// Stands in for an out-of-band writer such as a manual commit.
    pub async fn seed(&self, path: &str, bytes: &[u8]) {
        let mut state = self.state.lock().await;
        let revision = state.files.get(path).map(|e| e.revision).unwrap_or(0) + 1;
        state.files.insert(
            path.to_string(),
            Entry {
                bytes: bytes.to_vec(),
                revision,
            },
        );
    }

    fn token_for(path: &str, revision: u64) -> RemoteToken {
        RemoteToken::new(format!("{path}@{revision}"))
    }

    fn url_for(path: &str) -> String {
        format!("memory://{path}")
    }
}

#[async_trait]
impl RemoteHost for InMemoryHost {
    async fn fetch(&self, path: &str) -> Result<Option<RemoteFile>, SyncError> {
        let state = self.state.lock().await;
        if state.offline {
            return Err(SyncError::Transport("host offline".to_string()));
        }

        Ok(state.files.get(path).map(|entry| RemoteFile {
            bytes: entry.bytes.clone(),
            token: Self::token_for(path, entry.revision),
            download_url: Self::url_for(path),
        }))
    }

    async fn put(
        &self,
        path: &str,
        bytes: &[u8],
        prior: Option<&RemoteToken>,
        _message: &str,
    ) -> Result<StoredFile, SyncError> {
        let mut state = self.state.lock().await;
        if state.offline {
            return Err(SyncError::Transport("host offline".to_string()));
        }

        let revision = match (state.files.get(path), prior) {
            // Replacing the exact version the caller read
            (Some(entry), Some(token)) if *token == Self::token_for(path, entry.revision) => {
                entry.revision + 1
            }
            // Creating a file that does not exist yet
            (None, None) => 1,
            // Stale token, token for a missing file, or blind overwrite
            _ => return Err(SyncError::Conflict),
        };

        state.files.insert(
            path.to_string(),
            Entry {
                bytes: bytes.to_vec(),
                revision,
            },
        );

        Ok(StoredFile {
            token: Self::token_for(path, revision),
            download_url: Self::url_for(path),
        })
    }
}
