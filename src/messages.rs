//! Append-only log of what the user typed and what the system answered.

use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    User,
    Info,
    Success,
    Error,
}

#[derive(Clone, Debug, Serialize)]
pub struct LogEntry {
    pub ts: String,
    pub kind: EntryKind,
    pub text: String,
}

#[derive(Debug, Default)]
pub struct MessageLog {
    entries: Vec<LogEntry>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, kind: EntryKind, text: String) {
        self.entries.push(LogEntry {
            ts: now_ts(),
            kind,
            text,
        });
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.push(EntryKind::User, text.into());
    }

    pub fn push_info(&mut self, text: impl Into<String>) {
        self.push(EntryKind::Info, text.into());
    }

    pub fn push_success(&mut self, text: impl Into<String>) {
        self.push(EntryKind::Success, text.into());
    }

    pub fn push_error(&mut self, text: impl Into<String>) {
        self.push(EntryKind::Error, text.into());
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries appended at or after `index`.
    pub fn since(&self, index: usize) -> &[LogEntry] {
        &self.entries[index.min(self.entries.len())..]
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.last()
    }

    /// Only the shell's `/clear` uses this; the engine never removes entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

fn now_ts() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "<time>".to_string())
}
