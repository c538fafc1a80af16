//! Minutebook Core Library
//!
//! This crate provides the core functionality for minutebook, a meeting
//! record keeper whose data lives in one JSON document mirrored to a
//! remote content host.
//!
//! # Architecture
//!
//! - **Document**: One JSON value holding meetings, users, and the visit
//!   counter; the unit of persistence and sync
//! - **Cache**: Local working copy of the document, written atomically
//! - **Remote mirror**: Optional GitHub-backed copy, pulled before reads
//!   and pushed after writes, with token-guarded updates
//!
//! # Quick Start
//!
//! ```text
//! let mut store = RecordStore::open().await?;
//!
//! // Add a meeting
//! let meeting = store.add_meeting(fields, None, None).await?;
//!
//! // Query meetings
//! let meetings = store.list_meetings().await;
//! ```
//!
//! # Modules
//!
//! - `store`: Unified record store (main entry point)
//! - `models`: Data structures for meetings and attachments
//! - `document`: Document-level CRUD and invariants
//! - `storage`: Cache file persistence
//! - `sync`: Remote host client
//! - `config`: Application configuration

pub mod config;
pub mod document;
pub mod models;
pub mod storage;
pub mod store;
pub mod sync;

pub use config::{Config, RemoteConfig};
pub use document::{Document, DocumentError};
pub use models::{Attachment, Meeting, MeetingFields, Upload};
pub use storage::{DocumentCache, StorageError};
pub use store::RecordStore;
pub use sync::{GitHubHost, InMemoryHost, PullOutcome, RemoteHost, SyncClient, SyncError};
