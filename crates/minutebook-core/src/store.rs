//! Unified record store
//!
//! The `RecordStore` manages the meeting document and coordinates between:
//! - Local cache (JSON document on disk, the working copy)
//! - Remote mirror (optional, via the sync client)
//!
//! ## Read/write weave
//!
//! Reads pull the remote copy first when `pull_on_read` is set. Writes
//! always pull first, apply the change, save the cache, then push. Every
//! sync step is best-effort: a failed pull or push is logged and the
//! operation continues against the local copy. Only local cache writes
//! can fail an operation.
//!
//! ## Usage
//!
//! ```ignore
//! let mut store = RecordStore::open().await?;
//!
//! // Add a record
//! let meeting = store.add_meeting(fields, None, None).await?;
//!
//! // Query records
//! let meetings = store.list_meetings().await;
//! ```

use anyhow::{Context, Result};
use tracing::warn;

use crate::config::Config;
use crate::document::{Document, DocumentError};
use crate::models::{Attachment, Meeting, MeetingFields, Upload};
use crate::storage::DocumentCache;
use crate::sync::{PullOutcome, RemoteHost, SyncClient, SyncError};

/// Unified interface over the meeting document
///
/// Holds the working copy in memory and keeps the cache file and the
/// remote mirror aligned around every operation.
pub struct RecordStore {
    /// Working copy of the document
    document: Document,
    /// Cache file handler
    cache: DocumentCache,
    /// Remote sync client, when configured
    sync: Option<SyncClient>,
    /// Configuration
    config: Config,
}

impl RecordStore {
    /// Open the store, creating an empty document if none exists
    pub async fn open() -> Result<Self> {
        let config = Config::load().context("Failed to load configuration")?;
        Self::open_with_config(config).await
    }

    /// Open the store with a specific configuration
    pub async fn open_with_config(config: Config) -> Result<Self> {
        let sync = SyncClient::from_config(&config);
        Self::open_inner(config, sync).await
    }

    /// Open the store against an explicit remote host
    ///
    /// Used by tests and local tooling; the remote paths come from the
    /// configuration's remote section, falling back to defaults.
    pub async fn open_with_host(config: Config, host: Box<dyn RemoteHost>) -> Result<Self> {
        let remote = config.remote.clone().unwrap_or_default();
        let sync = Some(SyncClient::new(host, &remote));
        Self::open_inner(config, sync).await
    }

    async fn open_inner(config: Config, sync: Option<SyncClient>) -> Result<Self> {
        let cache = DocumentCache::new(config.cache_path());
        let mut store = Self {
            document: Document::new(),
            cache,
            sync,
            config,
        };

        store.refresh(store.config.pull_on_read).await;

        // First run with no remote copy: materialize the empty cache.
        // An existing-but-unreadable cache is deliberately left alone.
        if !store.cache.exists() {
            store
                .cache
                .save(&store.document)
                .context("Failed to create document cache")?;
        }

        Ok(store)
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Whether a remote mirror is in use
    pub fn sync_enabled(&self) -> bool {
        self.sync.is_some()
    }

    /// Read access to the working copy (for reporting)
    pub fn document(&self) -> &Document {
        &self.document
    }

    // ==================== Meeting Operations ====================

    /// All meetings in record order
    pub async fn list_meetings(&mut self) -> Vec<Meeting> {
        self.refresh(self.config.pull_on_read).await;
        self.document.meetings().to_vec()
    }

    /// Meetings ordered by calendar date, oldest first
    pub async fn meetings_by_date(&mut self) -> Vec<Meeting> {
        self.refresh(self.config.pull_on_read).await;
        self.document
            .sorted_by_date()
            .into_iter()
            .cloned()
            .collect()
    }

    /// Look up a single meeting
    pub async fn get_meeting(&mut self, id: u64) -> Option<Meeting> {
        self.refresh(self.config.pull_on_read).await;
        self.document.meeting(id).cloned()
    }

    /// Case-insensitive search over titles, briefs, and minutes
    pub async fn search(&mut self, query: &str) -> Vec<Meeting> {
        self.refresh(self.config.pull_on_read).await;
        self.document
            .search(query)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Add a new meeting, uploading any attachments first
    ///
    /// A failed upload is logged and the record is saved without that
    /// attachment; the add itself still succeeds.
    pub async fn add_meeting(
        &mut self,
        fields: MeetingFields,
        brief_upload: Option<Upload>,
        minutes_upload: Option<Upload>,
    ) -> Result<Meeting> {
        self.refresh(true).await;

        let brief_file = self.upload_or_skip(brief_upload).await;
        let minutes_file = self.upload_or_skip(minutes_upload).await;

        let meeting = self
            .document
            .add_meeting(fields, brief_file, minutes_file)
            .clone();
        self.persist().await?;
        Ok(meeting)
    }

    /// Replace the text fields of an existing meeting
    ///
    /// Stored attachments are kept unless a new upload replaces them.
    pub async fn update_meeting(
        &mut self,
        id: u64,
        fields: MeetingFields,
        brief_upload: Option<Upload>,
        minutes_upload: Option<Upload>,
    ) -> Result<Meeting> {
        self.refresh(true).await;

        // Verify the record exists before spending uploads on it
        if self.document.meeting(id).is_none() {
            return Err(DocumentError::MeetingNotFound { id }.into());
        }

        let brief_file = self.upload_or_skip(brief_upload).await;
        let minutes_file = self.upload_or_skip(minutes_upload).await;

        let meeting = self
            .document
            .update_meeting(id, fields, brief_file, minutes_file)?
            .clone();
        self.persist().await?;
        Ok(meeting)
    }

    /// Delete a meeting
    ///
    /// Remaining records are renumbered to keep ids dense. Deleting an
    /// absent id is a no-op that writes nothing, locally or remotely,
    /// and returns `None`.
    pub async fn delete_meeting(&mut self, id: u64) -> Result<Option<Meeting>> {
        self.refresh(true).await;

        let Some(removed) = self.document.delete_meeting(id) else {
            return Ok(None);
        };
        self.persist().await?;
        Ok(Some(removed))
    }

    // ==================== User Operations ====================

    /// Check a username/password pair
    pub async fn authenticate(&mut self, username: &str, password: &str) -> bool {
        self.refresh(self.config.pull_on_read).await;
        self.document.authenticate(username, password)
    }

    /// Add a user or change an existing user's password
    pub async fn set_password(
        &mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<()> {
        self.refresh(true).await;
        self.document.set_password(username, password);
        self.persist().await
    }

    /// Remove a user
    pub async fn remove_user(&mut self, username: &str) -> Result<()> {
        self.refresh(true).await;
        self.document.remove_user(username)?;
        self.persist().await
    }

    /// Known usernames
    pub async fn usernames(&mut self) -> Vec<String> {
        self.refresh(self.config.pull_on_read).await;
        self.document
            .usernames()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    // ==================== Visit Counter ====================

    /// Count a visit and persist the new total immediately
    pub async fn record_hit(&mut self) -> Result<u64> {
        self.refresh(true).await;
        let count = self.document.record_hit();
        self.persist().await?;
        Ok(count)
    }

    /// Current visit count
    pub async fn hit_count(&mut self) -> u64 {
        self.refresh(self.config.pull_on_read).await;
        self.document.hits()
    }

    // ==================== Sync Operations ====================

    /// Pull from the remote now, regardless of `pull_on_read`
    ///
    /// Returns `true` when a remote copy was fetched and applied.
    pub async fn pull_now(&mut self) -> Result<bool, SyncError> {
        let sync = self.sync.as_ref().ok_or(SyncError::NotConfigured)?;
        match sync.pull_document(&self.cache).await? {
            PullOutcome::Updated(doc) => {
                self.document = doc;
                Ok(true)
            }
            PullOutcome::NoDocument => Ok(false),
        }
    }

    /// Push the working copy to the remote now
    pub async fn push_now(&mut self) -> Result<(), SyncError> {
        let sync = self.sync.as_ref().ok_or(SyncError::NotConfigured)?;
        sync.push_document(&self.document).await
    }

    // ==================== Internals ====================

    /// Reload the working copy, optionally pulling the remote first
    ///
    /// Never fails: a broken pull or cache falls back to whatever can
    /// still be read, down to an empty document.
    async fn refresh(&mut self, pull: bool) {
        if pull {
            if let Some(doc) = self.pull_best_effort().await {
                self.document = doc;
                return;
            }
        }
        self.document = self.cache.load_or_default();
    }

    async fn pull_best_effort(&self) -> Option<Document> {
        let sync = self.sync.as_ref()?;
        match sync.pull_document(&self.cache).await {
            Ok(PullOutcome::Updated(doc)) => Some(doc),
            Ok(PullOutcome::NoDocument) => None,
            Err(e) => {
                warn!("Sync pull failed, continuing with local copy: {}", e);
                None
            }
        }
    }

    async fn upload_or_skip(&self, upload: Option<Upload>) -> Option<Attachment> {
        let upload = upload?;
        match &self.sync {
            None => {
                warn!(
                    "No remote configured, skipping attachment '{}'",
                    upload.filename
                );
                None
            }
            Some(sync) => match sync.upload_attachment(&upload).await {
                Ok(attachment) => Some(attachment),
                Err(e) => {
                    warn!(
                        "Attachment upload failed, saving record without '{}': {}",
                        upload.filename, e
                    );
                    None
                }
            },
        }
    }

    /// Save the cache, then push best-effort
    ///
    /// The cache write is the one hard failure point of every mutation;
    /// a failed push leaves the change local and is only logged.
    async fn persist(&mut self) -> Result<()> {
        self.cache
            .save(&self.document)
            .context("Failed to save document cache")?;

        if let Some(sync) = &self.sync {
            if let Err(e) = sync.push_document(&self.document).await {
                warn!("Sync push failed, local copy saved: {}", e);
            }
        }
        Ok(())
    }
}
