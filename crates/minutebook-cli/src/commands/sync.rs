//! Sync command handler

use anyhow::{bail, Context, Result};
use clap::ValueEnum;

use minutebook_core::{RecordStore, SyncError};

use crate::output::Output;

/// Direction for an explicit sync run
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SyncDirection {
    /// Fetch the remote document and replace the local copy
    Pull,
    /// Upload the local document to the remote
    Push,
}

/// Sync with the remote repository
///
/// With no direction, pulls first and then pushes the merged result.
pub async fn run(
    store: &mut RecordStore,
    direction: Option<SyncDirection>,
    output: &Output,
) -> Result<()> {
    if !store.sync_enabled() {
        bail!(
            "No remote configured. Set one with:\n  \
             minutebook config set remote.repository owner/repo\n  \
             minutebook config set remote.token <token>"
        );
    }

    match direction {
        Some(SyncDirection::Pull) => pull(store, output).await,
        Some(SyncDirection::Push) => push(store, output).await,
        None => {
            pull(store, output).await?;
            push(store, output).await
        }
    }
}

async fn pull(store: &mut RecordStore, output: &Output) -> Result<()> {
    output.message("Pulling from remote...");

    match store.pull_now().await {
        Ok(true) => {
            output.success("Pull complete - document updated");
            output.message(&format!(
                "  Meetings: {}, Users: {}",
                store.document().meetings().len(),
                store.document().usernames().len()
            ));
            Ok(())
        }
        Ok(false) => {
            output.success("Pull complete - no document on the remote yet");
            Ok(())
        }
        Err(e) => Err(e).context("Pull failed"),
    }
}

async fn push(store: &mut RecordStore, output: &Output) -> Result<()> {
    output.message("Pushing to remote...");

    match store.push_now().await {
        Ok(()) => {
            output.success("Push complete");
            Ok(())
        }
        Err(SyncError::Conflict) => {
            bail!("Push rejected: the remote copy changed. Pull first, then push again.");
        }
        Err(e) => Err(e).context("Push failed"),
    }
}
