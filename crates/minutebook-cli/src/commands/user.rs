//! User command handlers

use anyhow::{bail, Context, Result};

use minutebook_core::RecordStore;

use crate::output::Output;

/// Add a user or change an existing user's password
pub async fn set(
    store: &mut RecordStore,
    username: String,
    password: String,
    output: &Output,
) -> Result<()> {
    if username.trim().is_empty() {
        bail!("Username must not be empty");
    }

    store
        .set_password(&username, &password)
        .await
        .context("Failed to save user")?;

    output.success(&format!("Saved user: {}", username));
    Ok(())
}

/// List usernames
pub async fn list(store: &mut RecordStore, output: &Output) -> Result<()> {
    let users = store.usernames().await;
    output.print_users(&users);
    Ok(())
}

/// Remove a user
pub async fn remove(store: &mut RecordStore, username: String, output: &Output) -> Result<()> {
    store
        .remove_user(&username)
        .await
        .with_context(|| format!("Failed to remove user: {}", username))?;

    output.success(&format!("Removed user: {}", username));
    Ok(())
}

/// Verify a username/password pair
///
/// Exits non-zero on a failed check so scripts can branch on it.
pub async fn check(
    store: &mut RecordStore,
    username: String,
    password: String,
    output: &Output,
) -> Result<()> {
    if store.authenticate(&username, &password).await {
        output.success(&format!("Credentials valid for: {}", username));
        Ok(())
    } else {
        bail!("Invalid credentials for: {}", username);
    }
}
