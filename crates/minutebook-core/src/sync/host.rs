//! Remote host abstraction
//!
//! The sync layer talks to any host that can store versioned files. A
//! host addresses files by path within one repository and branch, and
//! guards every write with an opaque version token: a put naming a stale
//! token is rejected, which is how a concurrent writer is detected.

use async_trait::async_trait;
use thiserror::Error;

use crate::storage::StorageError;

/// Opaque version token for a remote file
///
/// The token identifies one version of one file. It is never parsed,
/// only handed back to the host on the next write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteToken(String);

impl RemoteToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A file fetched from the remote host
#[derive(Debug, Clone)]
pub struct RemoteFile {
    /// Decoded file contents
    pub bytes: Vec<u8>,
    /// Version token of this copy
    pub token: RemoteToken,
    /// Stable retrieval URL for the file
    pub download_url: String,
}

/// Receipt for a completed write
#[derive(Debug, Clone)]
pub struct StoredFile {
    /// Version token of the newly stored copy
    pub token: RemoteToken,
    /// Stable retrieval URL for the file
    pub download_url: String,
}

/// Errors from remote host operations
#[derive(Debug, Error)]
pub enum SyncError {
    /// No remote is configured
    #[error("no remote is configured")]
    NotConfigured,

    /// Network-level failure reaching the host
    #[error("could not reach remote host: {0}")]
    Transport(String),

    /// The host answered with an unexpected status
    #[error("remote host returned status {status}")]
    Remote { status: u16 },

    /// Another writer replaced the file since our token was issued
    #[error("remote copy was updated by another writer")]
    Conflict,

    /// The fetched payload could not be decoded
    #[error("remote content could not be decoded: {0}")]
    InvalidContent(String),

    /// The fetched document is not valid JSON
    #[error("remote document is malformed: {0}")]
    InvalidDocument(String),

    /// The local cache could not be updated
    #[error("could not update local cache: {0}")]
    Cache(#[from] StorageError),
}

impl From<reqwest::Error> for SyncError {
    fn from(error: reqwest::Error) -> Self {
        SyncError::Transport(error.to_string())
    }
}

/// A remote host that stores versioned files
#[async_trait]
pub trait RemoteHost: Send + Sync {
    /// Fetch a file, returning `None` when it does not exist
    async fn fetch(&self, path: &str) -> Result<Option<RemoteFile>, SyncError>;

    /// Create or replace a file
    ///
    /// `prior` must name the token of the version being replaced, or be
    /// `None` when the file is being created. A mismatch yields
    /// [`SyncError::Conflict`].
    async fn put(
        &self,
        path: &str,
        bytes: &[u8],
        prior: Option<&RemoteToken>,
        message: &str,
    ) -> Result<StoredFile, SyncError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_round_trip() {
        let token = RemoteToken::new("abc123");
        assert_eq!(token.as_str(), "abc123");
        assert_eq!(token, RemoteToken::new("abc123".to_string()));
        assert_ne!(token, RemoteToken::new("def456"));
    }

    #[test]
    fn test_error_display() {
        let err = SyncError::Remote { status: 503 };
        assert!(err.to_string().contains("503"));

        let err = SyncError::Conflict;
        assert!(err.to_string().contains("another writer"));
    }
}
