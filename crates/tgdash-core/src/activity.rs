//! Activity log shown under the dashboard

use tgdash_types::{LogLine, Severity};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityEntry {
    pub text: String,
    pub severity: Severity,
}

/// Append-only list of rendered entries. Not capped on the client; the
/// backend's auto-clear bounds the source log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityLog {
    entries: Vec<ActivityEntry>,
    /// Entries ever pushed, including cleared ones
    total: u64,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, text: impl Into<String>, severity: Severity) {
        let text = text.into();
        tracing::trace!(severity = severity.as_str(), "activity: {}", text);
        self.entries.push(ActivityEntry { text, severity });
        self.total += 1;
    }

    pub fn push_line(&mut self, line: LogLine) {
        match line {
            LogLine::Text(text) => self.push(text, Severity::Plain),
            LogLine::Structured { text, severity } => self.push(text, severity),
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[ActivityEntry] {
        &self.entries
    }

    pub fn total_pushed(&self) -> u64 {
        self.total
    }

    /// Entries pushed after the log had `seen` pushes, oldest first. Entries
    /// removed by a clear in between are gone.
    pub fn since(&self, seen: u64) -> &[ActivityEntry] {
        let new = usize::try_from(self.total.saturating_sub(seen)).unwrap_or(usize::MAX);
        let start = self.entries.len().saturating_sub(new);
        &self.entries[start..]
    }

    pub fn last(&self) -> Option<&ActivityEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn since_survives_clears() {
        let mut log = ActivityLog::new();
        log.push("one", Severity::Info);
        let seen = log.total_pushed();

        log.push("two", Severity::Info);
        assert_eq!(log.since(seen).len(), 1);

        log.clear();
        log.push("cleared", Severity::System);
        let texts: Vec<_> = log.since(seen).iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["cleared"]);
        assert!(log.since(log.total_pushed()).is_empty());
    }

    #[test]
    fn structured_lines_keep_severity() {
        let mut log = ActivityLog::new();
        log.push_line(LogLine::Structured {
            text: "boom".into(),
            severity: Severity::Critical,
        });
        log.push_line(LogLine::Text("plain".into()));

        assert_eq!(log.entries()[0].severity, Severity::Critical);
        assert_eq!(log.last().map(|e| &e.severity), Some(&Severity::Plain));
    }
}
