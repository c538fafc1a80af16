//! Visit counter command handlers

use anyhow::{Context, Result};

use minutebook_core::RecordStore;

use crate::output::{Output, OutputFormat};

/// Show the visit count
pub async fn show(store: &mut RecordStore, output: &Output) -> Result<()> {
    let count = store.hit_count().await;
    print_count(count, output);
    Ok(())
}

/// Record a visit and show the new total
pub async fn record(store: &mut RecordStore, output: &Output) -> Result<()> {
    let count = store
        .record_hit()
        .await
        .context("Failed to record visit")?;

    output.success(&format!("Recorded visit {}", count));
    Ok(())
}

fn print_count(count: u64, output: &Output) {
    match output.format {
        OutputFormat::Human => println!("Hits: {}", count),
        OutputFormat::Json => println!("{}", serde_json::json!({ "hits": count })),
        OutputFormat::Quiet => println!("{}", count),
    }
}
