//! Meeting document management
//!
//! The document is the unit of persistence and sync: one JSON value
//! holding every meeting record, the user table, and the visit counter.
//! All mutation goes through this type so the id invariant (dense,
//! zero-based, matching list position) holds after every operation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Attachment, Meeting, MeetingFields};

/// Errors from document operations
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("meeting {id} not found")]
    MeetingNotFound { id: u64 },

    #[error("user '{username}' not found")]
    UserNotFound { username: String },
}

/// The complete application state persisted as one JSON document
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Document {
    #[serde(default)]
    meetings: Vec<Meeting>,
    #[serde(default)]
    users: BTreeMap<String, String>,
    #[serde(default)]
    hits: u64,
}

impl Document {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore positional ids after parsing externally produced data
    ///
    /// Position in the list is authoritative; the stored id is derived
    /// from it. A document edited by hand (or written by an older
    /// revision) may carry stray ids, which this repairs.
    pub fn normalize(&mut self) {
        self.renumber();
    }

    /// All meeting records in insertion order
    pub fn meetings(&self) -> &[Meeting] {
        &self.meetings
    }

    /// Look up a meeting by id
    pub fn meeting(&self, id: u64) -> Option<&Meeting> {
        self.meetings.get(id as usize)
    }

    /// Append a new meeting, assigning the next dense id
    pub fn add_meeting(
        &mut self,
        fields: MeetingFields,
        brief_file: Option<Attachment>,
        minutes_file: Option<Attachment>,
    ) -> &Meeting {
        let index = self.meetings.len();
        let mut meeting = Meeting::new(index as u64, fields);
        meeting.brief_file = brief_file;
        meeting.minutes_file = minutes_file;
        self.meetings.push(meeting);
        &self.meetings[index]
    }

    /// Replace the text fields of an existing meeting
    ///
    /// Attachment arguments replace the stored attachment only when
    /// `Some`; passing `None` preserves whatever the record already has.
    pub fn update_meeting(
        &mut self,
        id: u64,
        fields: MeetingFields,
        brief_file: Option<Attachment>,
        minutes_file: Option<Attachment>,
    ) -> Result<&Meeting, DocumentError> {
        let meeting = self
            .meetings
            .get_mut(id as usize)
            .ok_or(DocumentError::MeetingNotFound { id })?;
        meeting.apply_fields(fields);
        if let Some(attachment) = brief_file {
            meeting.brief_file = Some(attachment);
        }
        if let Some(attachment) = minutes_file {
            meeting.minutes_file = Some(attachment);
        }
        Ok(&self.meetings[id as usize])
    }

    /// Remove a meeting and renumber the remainder
    ///
    /// Every record after the removed one shifts down by one id; order
    /// is preserved. Deleting an id with no record is a no-op that
    /// returns `None`.
    pub fn delete_meeting(&mut self, id: u64) -> Option<Meeting> {
        let index = id as usize;
        if index >= self.meetings.len() {
            return None;
        }
        let removed = self.meetings.remove(index);
        self.renumber();
        Some(removed)
    }

    /// Case-insensitive substring search over title, brief, and minutes
    pub fn search(&self, query: &str) -> Vec<&Meeting> {
        let needle = query.to_lowercase();
        self.meetings
            .iter()
            .filter(|m| {
                m.title.to_lowercase().contains(&needle)
                    || m.brief.to_lowercase().contains(&needle)
                    || m.minutes.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Meetings ordered by calendar date, oldest first
    ///
    /// A presentation view; storage order stays insertion order. Records
    /// whose date field does not parse sort after all dated records,
    /// keeping their insertion order.
    pub fn sorted_by_date(&self) -> Vec<&Meeting> {
        let mut sorted: Vec<&Meeting> = self.meetings.iter().collect();
        sorted.sort_by(|a, b| match (a.calendar_date(), b.calendar_date()) {
            (Some(da), Some(db)) => da.cmp(&db),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        sorted
    }

    /// Check a username/password pair against the user table
    pub fn authenticate(&self, username: &str, password: &str) -> bool {
        self.users
            .get(username)
            .map(|stored| stored == password)
            .unwrap_or(false)
    }

    /// Add a user or replace an existing user's password
    pub fn set_password(&mut self, username: impl Into<String>, password: impl Into<String>) {
        self.users.insert(username.into(), password.into());
    }

    /// Remove a user from the user table
    pub fn remove_user(&mut self, username: &str) -> Result<(), DocumentError> {
        self.users
            .remove(username)
            .map(|_| ())
            .ok_or_else(|| DocumentError::UserNotFound {
                username: username.to_string(),
            })
    }

    /// Known usernames in sorted order
    pub fn usernames(&self) -> Vec<&str> {
        self.users.keys().map(String::as_str).collect()
    }

    /// Increment the visit counter, returning the new total
    pub fn record_hit(&mut self) -> u64 {
        self.hits += 1;
        self.hits
    }

    /// Current visit count
    pub fn hits(&self) -> u64 {
        self.hits
    }

    fn renumber(&mut self) {
        for (index, meeting) in self.meetings.iter_mut().enumerate() {
            meeting.id = index as u64;
        }
    }
}
