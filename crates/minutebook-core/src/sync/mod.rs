//! Sync against a remote content host
//!
//! Keeps the local document cache aligned with a copy stored on a
//! version-controlled file host (GitHub by default).
//!
//! ## Protocol
//!
//! 1. Pull: fetch the remote document, validate it, overwrite the cache
//! 2. Push: fetch the current version token, then put the new bytes
//!    naming that token; the host rejects the put if the token is stale
//! 3. Attachments: put once under a generated unique name, never updated
//!
//! Every exchange is one-shot; there are no sessions, retries, or
//! background tasks. Failures are reported to the caller, who decides
//! whether they are fatal (the store never treats them as fatal).

mod client;
mod github;
mod host;
mod memory;

pub use client::{PullOutcome, SyncClient};
pub use github::GitHubHost;
pub use host::{RemoteFile, RemoteHost, RemoteToken, StoredFile, SyncError};
pub use memory::InMemoryHost;
