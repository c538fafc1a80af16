//! Storage layer
//!
//! Handles persistence of the JSON document to the local cache file.
//!
//! ## Architecture
//!
//! - **Cache file**: One JSON document on disk, written atomically
//! - **Remote mirror**: The sync layer keeps the cache aligned with the
//!   remote copy; storage itself never talks to the network
//!
//! The cache is read in full on open and rewritten in full on every
//! mutation; the document is small enough that this stays cheap.

pub mod cache;
pub mod error;

pub use cache::DocumentCache;
pub use error::{StorageError, StorageResult};
