//! GitHub-backed remote host
//!
//! Stores the document and attachments as files in a GitHub repository
//! through the contents API. The blob `sha` returned by the API serves
//! as the version token: updates must name the sha they replace, and
//! GitHub rejects the write when the file moved on since then.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose;
use base64::Engine;
use reqwest::{header, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::config::RemoteConfig;
use crate::sync::host::{RemoteFile, RemoteHost, RemoteToken, StoredFile, SyncError};

/// Media type the contents API expects
const GITHUB_ACCEPT: &str = "application/vnd.github+json";

/// A remote host backed by a GitHub repository
pub struct GitHubHost {
    client: reqwest::Client,
    api_url: String,
    repository: String,
    branch: String,
    token: String,
}

/// Body of a GET /contents response for a file
#[derive(Debug, Deserialize)]
struct ContentsResponse {
    sha: String,
    /// Base64 with embedded newlines, per the API
    content: String,
    download_url: Option<String>,
}

/// Body of a PUT /contents response
#[derive(Debug, Deserialize)]
struct UpdateResponse {
    content: UpdatedContent,
}

#[derive(Debug, Deserialize)]
struct UpdatedContent {
    sha: String,
    download_url: Option<String>,
}

impl GitHubHost {
    /// Build a host from remote settings
    pub fn new(remote: &RemoteConfig) -> Result<Self, SyncError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(remote.timeout_secs))
            .user_agent(concat!("minutebook/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_url: remote.api_url.trim_end_matches('/').to_string(),
            repository: remote.repository.clone(),
            branch: remote.branch.clone(),
            token: remote.token.clone(),
        })
    }

    fn contents_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/contents/{}",
            self.api_url,
            self.repository,
            path.trim_start_matches('/')
        )
    }

    /// Fallback retrieval URL when the API omits one
    fn raw_url(&self, path: &str) -> String {
        format!(
            "https://raw.githubusercontent.com/{}/{}/{}",
            self.repository,
            self.branch,
            path.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl RemoteHost for GitHubHost {
    async fn fetch(&self, path: &str) -> Result<Option<RemoteFile>, SyncError> {
        let url = self.contents_url(path);
        debug!("Fetching {} from {}", path, self.repository);

        let response = self
            .client
            .get(&url)
            .query(&[("ref", self.branch.as_str())])
            .bearer_auth(&self.token)
            .header(header::ACCEPT, GITHUB_ACCEPT)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!("{} does not exist on remote", path);
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(SyncError::Remote {
                status: response.status().as_u16(),
            });
        }

        let body: ContentsResponse = response.json().await?;
        let bytes = decode_content(&body.content)?;

        Ok(Some(RemoteFile {
            bytes,
            token: RemoteToken::new(body.sha),
            download_url: body.download_url.unwrap_or_else(|| self.raw_url(path)),
        }))
    }

    async fn put(
        &self,
        path: &str,
        bytes: &[u8],
        prior: Option<&RemoteToken>,
        message: &str,
    ) -> Result<StoredFile, SyncError> {
        let url = self.contents_url(path);
        debug!(
            "Putting {} ({} bytes) to {}",
            path,
            bytes.len(),
            self.repository
        );

        let mut payload = serde_json::json!({
            "message": message,
            "content": general_purpose::STANDARD.encode(bytes),
            "branch": self.branch,
        });
        if let Some(token) = prior {
            payload["sha"] = serde_json::Value::String(token.as_str().to_string());
        }

        let response = self
            .client
            .put(&url)
            .bearer_auth(&self.token)
            .header(header::ACCEPT, GITHUB_ACCEPT)
            .json(&payload)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {
                let body: UpdateResponse = response.json().await?;
                Ok(StoredFile {
                    token: RemoteToken::new(body.content.sha),
                    download_url: body
                        .content
                        .download_url
                        .unwrap_or_else(|| self.raw_url(path)),
                })
            }
            // Returned when the named sha is stale (or missing for an
            // existing file): someone else committed in between.
            StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => Err(SyncError::Conflict),
            status => Err(SyncError::Remote {
                status: status.as_u16(),
            }),
        }
    }
}

/// Decode base64 file content from the API
///
/// The contents API wraps base64 at 60 columns, so whitespace has to be
/// stripped before decoding.
fn decode_content(encoded: &str) -> Result<Vec<u8>, SyncError> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    general_purpose::STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| SyncError::InvalidContent(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote() -> RemoteConfig {
        RemoteConfig {
            token: "ghp_test".to_string(),
            repository: "alice/minutes".to_string(),
            ..RemoteConfig::default()
        }
    }

    #[test]
    fn test_contents_url() {
        let host = GitHubHost::new(&remote()).unwrap();
        assert_eq!(
            host.contents_url("data.json"),
            "https://api.github.com/repos/alice/minutes/contents/data.json"
        );
        assert_eq!(
            host.contents_url("/attachments/a.pdf"),
            "https://api.github.com/repos/alice/minutes/contents/attachments/a.pdf"
        );
    }

    #[test]
    fn test_contents_url_with_custom_api() {
        let mut cfg = remote();
        cfg.api_url = "https://github.example.com/api/v3/".to_string();
        let host = GitHubHost::new(&cfg).unwrap();
        assert_eq!(
            host.contents_url("data.json"),
            "https://github.example.com/api/v3/repos/alice/minutes/contents/data.json"
        );
    }

    #[test]
    fn test_raw_url() {
        let host = GitHubHost::new(&remote()).unwrap();
        assert_eq!(
            host.raw_url("attachments/a.pdf"),
            "https://raw.githubusercontent.com/alice/minutes/main/attachments/a.pdf"
        );
    }

    #[test]
    fn test_decode_content_strips_line_breaks() {
        // "hello world" wrapped the way the API wraps long blobs
        let wrapped = "aGVsbG8g\nd29ybGQ=\n";
        assert_eq!(decode_content(wrapped).unwrap(), b"hello world");
    }

    #[test]
    fn test_decode_content_rejects_garbage() {
        let err = decode_content("not base64 at all!!!").unwrap_err();
        assert!(matches!(err, SyncError::InvalidContent(_)));
    }

    #[tokio::test]
    async fn test_fetch_unreachable_host() {
        let mut cfg = remote();
        cfg.api_url = "http://127.0.0.1:1".to_string();
        cfg.timeout_secs = 1;
        let host = GitHubHost::new(&cfg).unwrap();

        let err = host.fetch("data.json").await.unwrap_err();
        assert!(matches!(err, SyncError::Transport(_)));
    }
}
