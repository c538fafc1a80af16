//! Meeting command handlers

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use minutebook_core::{MeetingFields, RecordStore, Upload};

use crate::editor::{confirm, edit_text};
use crate::output::Output;

/// Field flags given on the command line for `meeting edit`
///
/// All-`None` means no flags were given and the edit runs interactively.
pub struct FieldOverrides {
    pub title: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub brief: Option<String>,
    pub minutes: Option<String>,
}

impl FieldOverrides {
    fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.date.is_none()
            && self.time.is_none()
            && self.brief.is_none()
            && self.minutes.is_none()
    }

    fn apply(self, fields: &mut MeetingFields) {
        if let Some(title) = self.title {
            fields.title = title;
        }
        if let Some(date) = self.date {
            fields.date = date;
        }
        if let Some(time) = self.time {
            fields.time = time;
        }
        if let Some(brief) = self.brief {
            fields.brief = brief;
        }
        if let Some(minutes) = self.minutes {
            fields.minutes = minutes;
        }
    }
}

/// Create a new meeting record
pub async fn create(
    store: &mut RecordStore,
    fields: MeetingFields,
    brief_file: Option<PathBuf>,
    minutes_file: Option<PathBuf>,
    output: &Output,
) -> Result<()> {
    let brief_upload = load_upload(brief_file.as_deref())?;
    let minutes_upload = load_upload(minutes_file.as_deref())?;

    let meeting = store
        .add_meeting(fields, brief_upload, minutes_upload)
        .await
        .context("Failed to create meeting")?;

    output.success(&format!("Created meeting {}", meeting.id));
    output.print_meeting(&meeting);

    Ok(())
}

/// List all meetings, optionally ordered by date
pub async fn list(store: &mut RecordStore, by_date: bool, output: &Output) -> Result<()> {
    let meetings = if by_date {
        store.meetings_by_date().await
    } else {
        store.list_meetings().await
    };

    output.print_meetings(&meetings);
    Ok(())
}

/// Show a single meeting
pub async fn show(store: &mut RecordStore, id: u64, output: &Output) -> Result<()> {
    let meeting = store
        .get_meeting(id)
        .await
        .ok_or_else(|| anyhow::anyhow!("Meeting not found: {}", id))?;

    output.print_meeting(&meeting);
    Ok(())
}

/// Edit a meeting
///
/// With field flags, applies them over the current values. Without any,
/// prompts for each field and opens $EDITOR for the minutes text.
pub async fn edit(
    store: &mut RecordStore,
    id: u64,
    overrides: FieldOverrides,
    brief_file: Option<PathBuf>,
    minutes_file: Option<PathBuf>,
    output: &Output,
) -> Result<()> {
    let meeting = store
        .get_meeting(id)
        .await
        .ok_or_else(|| anyhow::anyhow!("Meeting not found: {}", id))?;

    let mut fields = meeting.fields();

    if overrides.is_empty() && brief_file.is_none() && minutes_file.is_none() {
        // Interactive editing
        println!("Editing meeting {}: {}", meeting.id, meeting.title);
        println!("Press Enter to keep current value, or type new value.\n");

        if let Some(title) = prompt_with_default("Title", &fields.title)? {
            fields.title = title;
        }
        if let Some(date) = prompt_with_default("Date (YYYY-MM-DD)", &fields.date)? {
            fields.date = date;
        }
        if let Some(time) = prompt_with_default("Time", &fields.time)? {
            fields.time = time;
        }
        if let Some(brief) = prompt_with_default("Brief", &fields.brief)? {
            fields.brief = brief;
        }
        if confirm("Edit minutes in $EDITOR?")? {
            fields.minutes = edit_text(&fields.minutes)?;
        }
    } else {
        overrides.apply(&mut fields);
    }

    let brief_upload = load_upload(brief_file.as_deref())?;
    let minutes_upload = load_upload(minutes_file.as_deref())?;

    let updated = store
        .update_meeting(id, fields, brief_upload, minutes_upload)
        .await
        .context("Failed to update meeting")?;

    output.success("Meeting updated");
    output.print_meeting(&updated);

    Ok(())
}

/// Delete a meeting
pub async fn delete(store: &mut RecordStore, id: u64, force: bool, output: &Output) -> Result<()> {
    let meeting = store
        .get_meeting(id)
        .await
        .ok_or_else(|| anyhow::anyhow!("Meeting not found: {}", id))?;

    // Confirm deletion
    if !force && output.should_prompt() {
        println!("Delete meeting {}: {}", meeting.id, meeting.title);
        println!("Later meetings will be renumbered.");
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let removed = store
        .delete_meeting(id)
        .await
        .context("Failed to delete meeting")?;

    // A pull inside the delete can find the record already removed
    match removed {
        Some(removed) => output.success(&format!("Deleted meeting {}: {}", id, removed.title)),
        None => output.message(&format!("Meeting {} is already gone", id)),
    }

    Ok(())
}

/// Search meetings
pub async fn search(store: &mut RecordStore, query: String, output: &Output) -> Result<()> {
    let meetings = store.search(&query).await;
    output.print_meetings(&meetings);
    Ok(())
}

/// Open a meeting's attachment in the browser
pub async fn open_attachment(
    store: &mut RecordStore,
    id: u64,
    minutes: bool,
    output: &Output,
) -> Result<()> {
    let meeting = store
        .get_meeting(id)
        .await
        .ok_or_else(|| anyhow::anyhow!("Meeting not found: {}", id))?;

    let (label, attachment) = if minutes {
        ("minutes", &meeting.minutes_file)
    } else {
        ("brief", &meeting.brief_file)
    };

    let Some(attachment) = attachment else {
        bail!("Meeting {} has no {} attachment", id, label);
    };

    open::that(&attachment.url)
        .with_context(|| format!("Failed to open: {}", attachment.url))?;

    output.success(&format!("Opened {}", attachment.url));
    Ok(())
}

/// Read a local file into a pending upload
fn load_upload(path: Option<&Path>) -> Result<Option<Upload>> {
    let Some(path) = path else {
        return Ok(None);
    };

    let bytes =
        fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "file".to_string());

    Ok(Some(Upload::new(filename, bytes)))
}

/// Prompt with a default value, returns None if user keeps default
fn prompt_with_default(prompt: &str, default: &str) -> Result<Option<String>> {
    use std::io::{self, Write};

    if default.is_empty() {
        print!("{}: ", prompt);
    } else {
        print!("{} [{}]: ", prompt, default);
    }
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();

    if input.is_empty() {
        Ok(None)
    } else {
        Ok(Some(input.to_string()))
    }
}
