//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use minutebook_core::Meeting;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print a single meeting in full
    pub fn print_meeting(&self, meeting: &Meeting) {
        match self.format {
            OutputFormat::Human => {
                println!("Id:      {}", meeting.id);
                println!("Title:   {}", meeting.title);
                println!("Date:    {}", meeting.date);
                if !meeting.time.is_empty() {
                    println!("Time:    {}", meeting.time);
                }
                if !meeting.brief.is_empty() {
                    println!("Brief:   {}", meeting.brief);
                }
                if let Some(ref file) = meeting.brief_file {
                    println!("Brief file:   {} ({})", file.filename, file.url);
                }
                if let Some(ref file) = meeting.minutes_file {
                    println!("Minutes file: {} ({})", file.filename, file.url);
                }
                if !meeting.minutes.is_empty() {
                    println!();
                    println!("{}", meeting.minutes);
                }
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(meeting).unwrap());
            }
            OutputFormat::Quiet => {
                println!("{}", meeting.id);
            }
        }
    }

    /// Print a list of meetings, one row each
    pub fn print_meetings(&self, meetings: &[Meeting]) {
        match self.format {
            OutputFormat::Human => {
                if meetings.is_empty() {
                    println!("No meetings found.");
                    return;
                }
                for meeting in meetings {
                    let files = usize::from(meeting.brief_file.is_some())
                        + usize::from(meeting.minutes_file.is_some());
                    let file_indicator = if files == 0 {
                        String::new()
                    } else {
                        format!(" [{}]", files)
                    };
                    println!(
                        "{:>3} | {} | {}{} | {}",
                        meeting.id,
                        meeting.date,
                        truncate(&meeting.title, 35),
                        file_indicator,
                        truncate_line(&meeting.brief, 45)
                    );
                }
                println!("\n{} meeting(s)", meetings.len());
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(meetings).unwrap());
            }
            OutputFormat::Quiet => {
                for meeting in meetings {
                    println!("{}", meeting.id);
                }
            }
        }
    }

    /// Print a list of usernames
    pub fn print_users(&self, users: &[String]) {
        match self.format {
            OutputFormat::Human => {
                if users.is_empty() {
                    println!("No users found.");
                    return;
                }
                for username in users {
                    println!("{}", username);
                }
                println!("\n{} user(s)", users.len());
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(users).unwrap());
            }
            OutputFormat::Quiet => {
                for username in users {
                    println!("{}", username);
                }
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

/// Truncate a string to max length, adding "..." if truncated
///
/// The cut is backed up to a char boundary so multi-byte text never
/// splits mid-character.
fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let mut cut = max_len.saturating_sub(3);
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}...", &s[..cut])
}

/// Truncate to first line and max length
fn truncate_line(s: &str, max_len: usize) -> String {
    let first_line = s.lines().next().unwrap_or("");
    truncate(first_line, max_len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_flags() {
        assert_eq!(OutputFormat::from_flags(false, false), OutputFormat::Human);
        assert_eq!(OutputFormat::from_flags(true, false), OutputFormat::Json);
        assert_eq!(OutputFormat::from_flags(false, true), OutputFormat::Quiet);
        // Quiet takes precedence
        assert_eq!(OutputFormat::from_flags(true, true), OutputFormat::Quiet);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("this is a long string", 10), "this is...");
    }

    #[test]
    fn test_truncate_line() {
        assert_eq!(truncate_line("single line", 20), "single line");
        assert_eq!(truncate_line("meeting ran long\nsecond line", 20), "meeting ran long");
        assert_eq!(
            truncate_line("very long single line here", 10),
            "very lo..."
        );
    }

    #[test]
    fn test_truncate_multibyte() {
        // The cut may not land mid-character
        assert_eq!(truncate("日本語テキスト", 10), "日本...");

        let title = "会議の議事録のタイトルが長い場合の取り扱いについて";
        let cut = truncate(title, 35);
        assert!(cut.ends_with("..."));
        assert!(cut.len() <= 35);
        assert_eq!(truncate("短い", 10), "短い");
    }

    #[test]
    fn test_print_meetings_with_multibyte_fields() {
        use minutebook_core::MeetingFields;

        let fields = MeetingFields {
            title: "会議の議事録のタイトルが長い場合の取り扱いについて".to_string(),
            date: "2024-01-02".to_string(),
            time: "10:00".to_string(),
            brief: "野外活動の計画と持ち物の確認を詳しく話し合った記録".to_string(),
            minutes: String::new(),
        };
        let output = Output::new(OutputFormat::Human);

        // Both the title and brief columns overflow their widths
        output.print_meetings(&[Meeting::new(0, fields)]);
    }
}
