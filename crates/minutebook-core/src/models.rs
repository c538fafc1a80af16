//! Data models for minutebook
//!
//! Defines the core data structures: Meeting, MeetingFields, Attachment,
//! and Upload. These models serialize to the JSON document format shared
//! by the local cache and the remote mirror.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Metadata for a file stored on the remote content host
///
/// Present on a meeting only after an upload has succeeded; a failed or
/// skipped upload leaves the field `None` rather than referencing a
/// broken link.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Attachment {
    /// Original file name as supplied by the caller
    pub filename: String,
    /// Path of the stored object on the remote host
    pub path: String,
    /// Stable retrieval URL
    pub url: String,
}

/// A pending attachment supplied by a caller
///
/// Carries the raw bytes to upload; never persisted itself.
#[derive(Debug, Clone)]
pub struct Upload {
    /// Original file name (only its final path component is kept)
    pub filename: String,
    /// File contents
    pub bytes: Vec<u8>,
}

impl Upload {
    /// Create an upload from a file name and its contents
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }
}

/// The free-text fields of a meeting record
///
/// Used for both add (all fields of the new record) and update (the
/// replacement values for an existing record).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeetingFields {
    pub title: String,
    /// ISO 8601 calendar date, e.g. "2024-01-02"
    pub date: String,
    pub time: String,
    pub brief: String,
    pub minutes: String,
}

/// A meeting record
///
/// The id is a position, not a stable key: ids are dense and zero-based
/// across the current record set and are reassigned on every deletion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Meeting {
    /// Position in the record set (0..N-1, reassigned on delete)
    pub id: u64,
    pub title: String,
    /// ISO 8601 calendar date string
    pub date: String,
    pub time: String,
    pub brief: String,
    pub minutes: String,
    /// Attachment for the meeting brief, if one was uploaded
    #[serde(default)]
    pub brief_file: Option<Attachment>,
    /// Attachment for the meeting minutes, if one was uploaded
    #[serde(default)]
    pub minutes_file: Option<Attachment>,
}

impl Meeting {
    /// Create a new meeting with the given id and text fields
    pub fn new(id: u64, fields: MeetingFields) -> Self {
        Self {
            id,
            title: fields.title,
            date: fields.date,
            time: fields.time,
            brief: fields.brief,
            minutes: fields.minutes,
            brief_file: None,
            minutes_file: None,
        }
    }

    /// Overwrite the text fields, leaving attachments untouched
    pub fn apply_fields(&mut self, fields: MeetingFields) {
        self.title = fields.title;
        self.date = fields.date;
        self.time = fields.time;
        self.brief = fields.brief;
        self.minutes = fields.minutes;
    }

    /// Copy of the text fields (for edit flows that start from current values)
    pub fn fields(&self) -> MeetingFields {
        MeetingFields {
            title: self.title.clone(),
            date: self.date.clone(),
            time: self.time.clone(),
            brief: self.brief.clone(),
            minutes: self.minutes.clone(),
        }
    }

    /// Parse the date field as a calendar date
    ///
    /// Returns `None` when the field is not a valid ISO date; callers that
    /// order by date sort unparsable dates last.
    pub fn calendar_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(title: &str, date: &str) -> MeetingFields {
        MeetingFields {
            title: title.to_string(),
            date: date.to_string(),
            time: "09:00".to_string(),
            brief: "agenda".to_string(),
            minutes: "".to_string(),
        }
    }

    #[test]
    fn test_meeting_new() {
        let meeting = Meeting::new(0, fields("Standup", "2024-01-02"));
        assert_eq!(meeting.id, 0);
        assert_eq!(meeting.title, "Standup");
        assert_eq!(meeting.date, "2024-01-02");
        assert!(meeting.brief_file.is_none());
        assert!(meeting.minutes_file.is_none());
    }

    #[test]
    fn test_apply_fields_keeps_attachments() {
        let mut meeting = Meeting::new(3, fields("Kickoff", "2024-01-02"));
        meeting.brief_file = Some(Attachment {
            filename: "brief.pdf".to_string(),
            path: "attachments/brief.pdf".to_string(),
            url: "https://example.com/brief.pdf".to_string(),
        });

        meeting.apply_fields(fields("Kickoff v2", "2024-01-03"));

        assert_eq!(meeting.id, 3);
        assert_eq!(meeting.title, "Kickoff v2");
        assert_eq!(meeting.date, "2024-01-03");
        assert!(meeting.brief_file.is_some());
    }

    #[test]
    fn test_fields_round_trip() {
        let original = fields("Review", "2024-02-10");
        let meeting = Meeting::new(1, original.clone());
        assert_eq!(meeting.fields(), original);
    }

    #[test]
    fn test_calendar_date() {
        let meeting = Meeting::new(0, fields("Standup", "2024-01-02"));
        assert_eq!(
            meeting.calendar_date(),
            NaiveDate::from_ymd_opt(2024, 1, 2)
        );

        let bad = Meeting::new(0, fields("Standup", "next tuesday"));
        assert!(bad.calendar_date().is_none());
    }

    #[test]
    fn test_meeting_serialization() {
        let mut meeting = Meeting::new(2, fields("Board", "2024-03-01"));
        meeting.minutes_file = Some(Attachment {
            filename: "minutes.pdf".to_string(),
            path: "attachments/20240301-minutes.pdf".to_string(),
            url: "https://example.com/minutes.pdf".to_string(),
        });

        let json = serde_json::to_string(&meeting).unwrap();
        let parsed: Meeting = serde_json::from_str(&json).unwrap();
        assert_eq!(meeting, parsed);
    }

    #[test]
    fn test_absent_attachments_serialize_as_null() {
        let meeting = Meeting::new(0, fields("Standup", "2024-01-02"));
        let value = serde_json::to_value(&meeting).unwrap();
        assert!(value.get("brief_file").unwrap().is_null());
        assert!(value.get("minutes_file").unwrap().is_null());
    }

    #[test]
    fn test_missing_attachment_keys_parse_as_none() {
        // Older documents wrote records without the attachment keys at all.
        let json = r#"{
            "id": 0,
            "title": "Standup",
            "date": "2024-01-02",
            "time": "09:00",
            "brief": "agenda",
            "minutes": ""
        }"#;
        let meeting: Meeting = serde_json::from_str(json).unwrap();
        assert!(meeting.brief_file.is_none());
        assert!(meeting.minutes_file.is_none());
    }
}
