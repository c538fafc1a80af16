//! Sync client implementation
//!
//! One-shot pull/push of the JSON document against a remote host, plus
//! attachment uploads. There is no session or retry loop: every call is
//! a single exchange, and callers decide how to treat failures (the
//! store treats them all as soft).

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::config::{Config, RemoteConfig};
use crate::document::Document;
use crate::models::{Attachment, Upload};
use crate::storage::DocumentCache;
use crate::sync::github::GitHubHost;
use crate::sync::host::{RemoteHost, StoredFile, SyncError};

/// Commit message used for document pushes
const DOCUMENT_MESSAGE: &str = "minutebook: update data";

/// Result of a pull
#[derive(Debug, PartialEq)]
pub enum PullOutcome {
    /// The remote copy was fetched, validated, and written to the cache
    Updated(Document),
    /// The remote has no document yet; the cache was left alone
    NoDocument,
}

/// Client for mirroring the document and attachments to a remote host
pub struct SyncClient {
    host: Box<dyn RemoteHost>,
    document_path: String,
    attachment_dir: String,
}

impl SyncClient {
    /// Build a client from configuration
    ///
    /// Returns `None` when no usable remote is configured; the store
    /// then runs local-only.
    pub fn from_config(config: &Config) -> Option<Self> {
        let remote = config.remote.as_ref()?;
        if !remote.is_configured() {
            return None;
        }

        match GitHubHost::new(remote) {
            Ok(host) => Some(Self::new(Box::new(host), remote)),
            Err(e) => {
                warn!("Remote is configured but unusable, running local-only: {}", e);
                None
            }
        }
    }

    /// Build a client over an explicit host
    pub fn new(host: Box<dyn RemoteHost>, remote: &RemoteConfig) -> Self {
        Self {
            host,
            document_path: remote.document_path.clone(),
            attachment_dir: remote.attachment_dir.trim_matches('/').to_string(),
        }
    }

    /// Fetch the remote document and refresh the local cache
    ///
    /// The fetched bytes are validated as a document before anything is
    /// written; a malformed remote copy leaves the cache untouched.
    pub async fn pull_document(&self, cache: &DocumentCache) -> Result<PullOutcome, SyncError> {
        let Some(file) = self.host.fetch(&self.document_path).await? else {
            debug!("No document on remote yet");
            return Ok(PullOutcome::NoDocument);
        };

        let mut doc: Document = serde_json::from_slice(&file.bytes)
            .map_err(|e| SyncError::InvalidDocument(e.to_string()))?;
        doc.normalize();

        cache.replace_bytes(&file.bytes)?;
        debug!("Pulled document ({} bytes)", file.bytes.len());
        Ok(PullOutcome::Updated(doc))
    }

    /// Push the document to the remote host
    ///
    /// The current version token is fetched fresh for every push, never
    /// cached across operations; the put then replaces exactly the copy
    /// that was just observed. A write that lands in between surfaces as
    /// [`SyncError::Conflict`].
    pub async fn push_document(&self, doc: &Document) -> Result<(), SyncError> {
        let bytes = serde_json::to_vec_pretty(doc)
            .map_err(|e| SyncError::InvalidDocument(e.to_string()))?;

        self.put_current(&self.document_path, &bytes, DOCUMENT_MESSAGE)
            .await?;
        debug!("Pushed document ({} bytes)", bytes.len());
        Ok(())
    }

    /// Upload an attachment under a freshly generated name
    ///
    /// The stored name is `{timestamp}-{random}-{sanitized original}`,
    /// so repeated uploads of the same file never collide; an occupied
    /// destination is still replaced under its current version token.
    pub async fn upload_attachment(&self, upload: &Upload) -> Result<Attachment, SyncError> {
        let name = unique_name(&upload.filename);
        let path = if self.attachment_dir.is_empty() {
            name.clone()
        } else {
            format!("{}/{}", self.attachment_dir, name)
        };
        let message = format!("minutebook: add attachment {name}");

        let stored = self.put_current(&path, &upload.bytes, &message).await?;
        info!("Uploaded attachment '{}' as {}", upload.filename, path);

        let display = base_name(&upload.filename);
        Ok(Attachment {
            filename: if display.is_empty() {
                "file".to_string()
            } else {
                display.to_string()
            },
            path,
            url: stored.download_url,
        })
    }

    /// Write a file under the current version token for its path
    ///
    /// The token is fetched fresh immediately before the put; an absent
    /// file is written without one. A write landing in between surfaces
    /// as [`SyncError::Conflict`].
    async fn put_current(
        &self,
        path: &str,
        bytes: &[u8],
        message: &str,
    ) -> Result<StoredFile, SyncError> {
        let prior = self.host.fetch(path).await?.map(|file| file.token);
        self.host.put(path, bytes, prior.as_ref(), message).await
    }
}

/// Generate a unique stored name for an uploaded file
fn unique_name(original: &str) -> String {
    let stamp = Utc::now().format("%Y%m%d%H%M%S");
    let nonce = uuid::Uuid::new_v4().simple().to_string();
    format!("{}-{}-{}", stamp, &nonce[..8], sanitize_filename(original))
}

/// Final path component of a caller-supplied file name
fn base_name(original: &str) -> &str {
    original.rsplit(['/', '\\']).next().unwrap_or(original)
}

/// Reduce a file name to characters safe for a repository path
///
/// Keeps ASCII alphanumerics, dot, underscore, and hyphen; everything
/// else becomes an underscore. Only the final path component survives.
fn sanitize_filename(original: &str) -> String {
    let cleaned: String = base_name(original)
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MeetingFields;
    use crate::sync::memory::InMemoryHost;
    use tempfile::TempDir;

    fn remote() -> RemoteConfig {
        RemoteConfig {
            token: "unused".to_string(),
            repository: "unused/unused".to_string(),
            ..RemoteConfig::default()
        }
    }

    fn client_over(host: &InMemoryHost) -> SyncClient {
        SyncClient::new(Box::new(host.clone()), &remote())
    }

    fn cache_in(temp_dir: &TempDir) -> DocumentCache {
        DocumentCache::new(temp_dir.path().join("document.json"))
    }

    fn sample_doc() -> Document {
        let mut doc = Document::new();
        doc.add_meeting(
            MeetingFields {
                title: "Kickoff".to_string(),
                date: "2024-01-02".to_string(),
                time: "10:00".to_string(),
                brief: String::new(),
                minutes: String::new(),
            },
            None,
            None,
        );
        doc
    }

    #[test]
    fn test_from_config_without_remote() {
        let config = Config::default();
        assert!(SyncClient::from_config(&config).is_none());
    }

    #[test]
    fn test_from_config_with_blank_token() {
        let config = Config {
            remote: Some(RemoteConfig {
                token: String::new(),
                repository: "alice/minutes".to_string(),
                ..RemoteConfig::default()
            }),
            ..Config::default()
        };
        assert!(SyncClient::from_config(&config).is_none());
    }

    #[tokio::test]
    async fn test_pull_no_document() {
        let temp_dir = TempDir::new().unwrap();
        let cache = cache_in(&temp_dir);
        let host = InMemoryHost::new();
        let client = client_over(&host);

        let outcome = client.pull_document(&cache).await.unwrap();
        assert_eq!(outcome, PullOutcome::NoDocument);
        assert!(!cache.exists());
    }

    #[tokio::test]
    async fn test_pull_updates_cache() {
        let temp_dir = TempDir::new().unwrap();
        let cache = cache_in(&temp_dir);
        let host = InMemoryHost::new();
        let client = client_over(&host);

        let bytes = serde_json::to_vec_pretty(&sample_doc()).unwrap();
        host.seed("data.json", &bytes).await;

        match client.pull_document(&cache).await.unwrap() {
            PullOutcome::Updated(doc) => {
                assert_eq!(doc.meeting(0).unwrap().title, "Kickoff");
            }
            other => panic!("expected update, got {other:?}"),
        }

        // Cache holds the remote bytes verbatim
        assert_eq!(std::fs::read(cache.path()).unwrap(), bytes);
    }

    #[tokio::test]
    async fn test_pull_malformed_remote_keeps_cache() {
        let temp_dir = TempDir::new().unwrap();
        let cache = cache_in(&temp_dir);
        cache.save(&sample_doc()).unwrap();
        let before = std::fs::read(cache.path()).unwrap();

        let host = InMemoryHost::new();
        host.seed("data.json", b"{definitely not json").await;
        let client = client_over(&host);

        let err = client.pull_document(&cache).await.unwrap_err();
        assert!(matches!(err, SyncError::InvalidDocument(_)));
        assert_eq!(std::fs::read(cache.path()).unwrap(), before);
    }

    #[tokio::test]
    async fn test_pull_unreachable_host_keeps_cache() {
        let temp_dir = TempDir::new().unwrap();
        let cache = cache_in(&temp_dir);
        cache.save(&sample_doc()).unwrap();
        let before = std::fs::read(cache.path()).unwrap();

        let host = InMemoryHost::new();
        host.set_offline(true).await;
        let client = client_over(&host);

        let err = client.pull_document(&cache).await.unwrap_err();
        assert!(matches!(err, SyncError::Transport(_)));
        assert_eq!(std::fs::read(cache.path()).unwrap(), before);
    }

    #[tokio::test]
    async fn test_push_creates_then_updates() {
        let host = InMemoryHost::new();
        let client = client_over(&host);

        let mut doc = sample_doc();
        client.push_document(&doc).await.unwrap();
        assert!(host.contents("data.json").await.is_some());

        // Second push must pick up the new token and succeed
        doc.record_hit();
        client.push_document(&doc).await.unwrap();

        let stored: Document =
            serde_json::from_slice(&host.contents("data.json").await.unwrap()).unwrap();
        assert_eq!(stored.hits(), 1);
    }

    #[tokio::test]
    async fn test_push_then_pull_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let cache = cache_in(&temp_dir);
        let host = InMemoryHost::new();

        let writer = client_over(&host);
        writer.push_document(&sample_doc()).await.unwrap();

        let reader = client_over(&host);
        match reader.pull_document(&cache).await.unwrap() {
            PullOutcome::Updated(doc) => {
                assert_eq!(doc.meetings().len(), 1);
            }
            other => panic!("expected update, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_upload_attachment() {
        let host = InMemoryHost::new();
        let client = client_over(&host);

        let upload = Upload::new("report.pdf", b"pdf bytes".to_vec());
        let attachment = client.upload_attachment(&upload).await.unwrap();

        assert_eq!(attachment.filename, "report.pdf");
        assert!(attachment.path.starts_with("attachments/"));
        assert!(attachment.path.ends_with("-report.pdf"));
        assert_eq!(attachment.url, format!("memory://{}", attachment.path));
        assert_eq!(
            host.contents(&attachment.path).await.unwrap(),
            b"pdf bytes"
        );
    }

    #[tokio::test]
    async fn test_repeated_uploads_get_distinct_names() {
        let host = InMemoryHost::new();
        let client = client_over(&host);

        let upload = Upload::new("report.pdf", b"v1".to_vec());
        let first = client.upload_attachment(&upload).await.unwrap();
        let second = client.upload_attachment(&upload).await.unwrap();

        assert_ne!(first.path, second.path);
        assert_eq!(host.file_count().await, 2);
    }

    #[tokio::test]
    async fn test_upload_strips_directories_from_name() {
        let host = InMemoryHost::new();
        let client = client_over(&host);

        let upload = Upload::new("../../etc/passwd", b"nope".to_vec());
        let attachment = client.upload_attachment(&upload).await.unwrap();

        assert_eq!(attachment.filename, "passwd");
        assert!(attachment.path.starts_with("attachments/"));
        assert!(attachment.path.ends_with("-passwd"));
        assert!(!attachment.path.contains(".."));
    }

    #[tokio::test]
    async fn test_put_current_replaces_occupied_path() {
        let host = InMemoryHost::new();
        let client = client_over(&host);
        host.seed("attachments/taken.pdf", b"old").await;

        // An existing destination is rewritten under its live token
        // rather than rejected as a blind overwrite
        client
            .put_current("attachments/taken.pdf", b"new", "replace")
            .await
            .unwrap();

        assert_eq!(
            host.contents("attachments/taken.pdf").await.unwrap(),
            b"new"
        );
    }

    #[test]
    fn test_unique_name_shape() {
        let name = unique_name("report.pdf");
        let mut parts = name.splitn(3, '-');

        let stamp = parts.next().unwrap();
        assert_eq!(stamp.len(), 14);
        assert!(stamp.chars().all(|c| c.is_ascii_digit()));

        let nonce = parts.next().unwrap();
        assert_eq!(nonce.len(), 8);
        assert!(nonce.chars().all(|c| c.is_ascii_hexdigit()));

        assert_eq!(parts.next().unwrap(), "report.pdf");
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("report.pdf"), "report.pdf");
        assert_eq!(
            sanitize_filename("q1 report (final).pdf"),
            "q1_report__final_.pdf"
        );
        assert_eq!(sanitize_filename("minutes/2024/jan.md"), "jan.md");
        assert_eq!(sanitize_filename(r"C:\notes\jan.md"), "jan.md");
        assert_eq!(sanitize_filename("über.txt"), "_ber.txt");
        assert_eq!(sanitize_filename(""), "file");
    }
}
