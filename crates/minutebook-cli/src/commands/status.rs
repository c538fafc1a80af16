//! Status command handler

use std::fs;

use anyhow::Result;

use minutebook_core::RecordStore;

use crate::output::{Output, OutputFormat};

/// Show status information
///
/// Reports the local copy as loaded at startup; does not hit the remote.
pub fn show(store: &RecordStore, output: &Output) -> Result<()> {
    let config = store.config();
    let cache_path = config.cache_path();
    let cache_size = fs::metadata(&cache_path).map(|m| m.len()).unwrap_or(0);

    let document = store.document();
    let meetings = document.meetings().len();
    let users = document.usernames().len();
    let hits = document.hits();

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "sync_enabled": store.sync_enabled(),
                    "pull_on_read": config.pull_on_read,
                    "remote": config.remote.as_ref().map(|r| serde_json::json!({
                        "repository": r.repository,
                        "branch": r.branch,
                        "document_path": r.document_path,
                    })),
                    "storage": {
                        "cache_path": cache_path,
                        "cache_size": cache_size,
                    },
                    "counts": {
                        "meetings": meetings,
                        "users": users,
                        "hits": hits,
                    }
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", meetings);
        }
        OutputFormat::Human => {
            println!("Minutebook Status");
            println!("=================");
            println!();
            println!("Sync:");
            println!(
                "  Status: {}",
                if store.sync_enabled() {
                    "configured"
                } else {
                    "local-only"
                }
            );
            if let Some(ref remote) = config.remote {
                println!("  Repository: {}", remote.repository);
                println!("  Branch:     {}", remote.branch);
                println!("  Document:   {}", remote.document_path);
            }
            println!(
                "  Pull on read: {}",
                if config.pull_on_read { "yes" } else { "no" }
            );
            println!();
            println!("Storage:");
            println!("  Location: {}", cache_path.display());
            println!("  Size:     {}", format_size(cache_size));
            println!();
            println!("Contents:");
            println!("  Meetings: {}", meetings);
            println!("  Users:    {}", users);
            println!("  Hits:     {}", hits);
        }
    }

    Ok(())
}

/// Format a byte count for humans
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
