use chrono::{DateTime, Local};

/// Header timestamp layout, e.g. `2024-03-09 14:05:00`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One labelled block of captured text, as written to the target file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub timestamp: DateTime<Local>,
    pub invocation: String,
    pub text: String,
}

impl Record {
    /// Stamp `text` with the current local time.
    pub fn new(invocation: impl Into<String>, text: impl Into<String>) -> Self {
        Self::at(Local::now(), invocation, text)
    }

    pub fn at(
        timestamp: DateTime<Local>,
        invocation: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            invocation: invocation.into(),
            text: text.into(),
        }
    }

    /// Render as `[<timestamp> "<invocation>"]:\n<text>\n`.
    pub fn render(&self) -> String {
        format!(
            "[{} \"{}\"]:\n{}\n",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.invocation,
            self.text
        )
    }
}
