//! Pieces of UI state owned by the controller

use tgdash_types::UserInfo;

/// Outcome of applying a connectivity value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Unchanged,
    Connected,
    Disconnected,
}

/// Telegram connection as last reported by the backend
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionState {
    pub connected: bool,
    pub user_label: Option<String>,
    pub disconnect_pending: bool,
}

impl ConnectionState {
    /// Overwrite with a fetched or pushed value
    pub fn apply(&mut self, connected: bool, user: Option<&UserInfo>) -> Transition {
        let was_connected = self.connected;
        self.connected = connected;

        if connected {
            if let Some(label) = user.and_then(UserInfo::label) {
                self.user_label = Some(label);
            }
        } else {
            self.user_label = None;
        }

        match (was_connected, connected) {
            (false, true) => Transition::Connected,
            (true, false) => Transition::Disconnected,
            _ => Transition::Unchanged,
        }
    }

    pub fn connect_enabled(&self) -> bool {
        !self.connected
    }

    pub fn disconnect_enabled(&self) -> bool {
        self.connected && !self.disconnect_pending
    }

    pub fn status_text(&self) -> &'static str {
        if self.connected {
            "Connected"
        } else {
            "Disconnected"
        }
    }

    pub fn user_text(&self) -> String {
        match (&self.user_label, self.connected) {
            (Some(label), true) => format!("User: {}", label),
            (None, true) => "Connected".to_string(),
            (_, false) => "Disconnected".to_string(),
        }
    }
}

/// One row of the manage-sessions list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEntry {
    pub name: String,
    pub is_current: bool,
    pub can_connect: bool,
    pub can_remove: bool,
}

/// Stored sessions known to the backend
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionRegistry {
    pub current: Option<String>,
    pub known: Vec<String>,
}

impl SessionRegistry {
    /// Apply a fetched session list. The reply's current session wins when
    /// it names one; a current session the server does not list is dropped.
    pub fn replace_known(&mut self, sessions: Vec<String>, current: Option<String>) {
        self.known = sessions;
        if let Some(current) = current.filter(|s| !s.is_empty()) {
            self.current = Some(current);
        }
        if !self.is_consistent() {
            tracing::debug!("dropping unlisted current session {:?}", self.current);
            self.current = None;
        }
    }

    /// Returns true when the current session changed
    pub fn set_current(&mut self, session: Option<String>) -> bool {
        let session = session.filter(|s| !s.is_empty());
        let changed = self.current != session;
        self.current = session;
        changed
    }

    pub fn current_label(&self) -> &str {
        self.current.as_deref().unwrap_or("none")
    }

    /// `current` is unset or one of the known sessions
    pub fn is_consistent(&self) -> bool {
        match &self.current {
            Some(current) => self.known.iter().any(|s| s == current),
            None => true,
        }
    }

    /// Connect is offered unless already connected as that session, remove
    /// is never offered for the current session.
    pub fn entries(&self, connected: bool) -> Vec<SessionEntry> {
        self.known
            .iter()
            .map(|name| {
                let is_current = self.current.as_deref() == Some(name.as_str());
                SessionEntry {
                    name: name.clone(),
                    is_current,
                    can_connect: !(connected && is_current),
                    can_remove: !is_current,
                }
            })
            .collect()
    }
}

pub const MIN_CLEAR_INTERVAL: u32 = 1;
pub const MAX_CLEAR_INTERVAL: u32 = 60;
pub const DEFAULT_CLEAR_INTERVAL: u32 = 5;

/// Backend log auto-clear settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoClearSettings {
    pub enabled: bool,
    pub interval_minutes: u32,
}

impl Default for AutoClearSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_minutes: DEFAULT_CLEAR_INTERVAL,
        }
    }
}

impl AutoClearSettings {
    pub fn clamp_interval(minutes: i64) -> u32 {
        minutes.clamp(MIN_CLEAR_INTERVAL as i64, MAX_CLEAR_INTERVAL as i64) as u32
    }

    /// Reads a leading integer like a number input does ("12", " 7.5", "30min").
    /// Input without one falls back to the default interval.
    pub fn parse_interval(raw: &str) -> u32 {
        let trimmed = raw.trim();
        let sign_len = usize::from(trimmed.starts_with('-') || trimmed.starts_with('+'));
        let digits_end = trimmed[sign_len..]
            .find(|c: char| !c.is_ascii_digit())
            .map(|i| i + sign_len)
            .unwrap_or(trimmed.len());

        match trimmed[..digits_end].parse::<i64>() {
            Ok(minutes) => Self::clamp_interval(minutes),
            Err(_) => DEFAULT_CLEAR_INTERVAL,
        }
    }

    /// Server values win; the interval arrives in seconds
    pub fn apply_server(&mut self, enabled: Option<bool>, interval_secs: Option<u64>) {
        if let Some(enabled) = enabled {
            self.enabled = enabled;
        }
        if let Some(secs) = interval_secs {
            let minutes = i64::try_from(secs / 60).unwrap_or(i64::MAX);
            self.interval_minutes = Self::clamp_interval(minutes);
        }
    }
}

/// Cached id of the TheReconquestMap group
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupReference {
    pub id: Option<String>,
    /// At least one refresh finished, so the panel is shown
    pub fetched: bool,
    pub refresh_pending: bool,
}

impl GroupReference {
    pub fn clear(&mut self) {
        self.id = None;
    }

    pub fn display(&self) -> &str {
        self.id.as_deref().unwrap_or("not found")
    }

    pub fn can_copy(&self) -> bool {
        self.id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str, id: &str) -> UserInfo {
        UserInfo {
            first_name: Some(name.to_string()),
            id: Some(id.to_string()),
        }
    }

    #[test]
    fn connection_transitions() {
        let mut connection = ConnectionState::default();
        assert_eq!(
            connection.apply(true, Some(&user("Ana", "42"))),
            Transition::Connected
        );
        assert_eq!(connection.user_text(), "User: Ana (ID: 42)");
        assert!(!connection.connect_enabled());
        assert!(connection.disconnect_enabled());

        assert_eq!(connection.apply(true, None), Transition::Unchanged);
        assert_eq!(connection.user_label.as_deref(), Some("Ana (ID: 42)"));

        assert_eq!(connection.apply(false, None), Transition::Disconnected);
        assert_eq!(connection.user_text(), "Disconnected");
    }

    #[test]
    fn refreshed_list_reconciles_current() {
        let mut registry = SessionRegistry::default();
        registry.set_current(Some("ghost".into()));
        registry.replace_known(vec!["A".into()], None);
        assert_eq!(registry.current, None);

        registry.replace_known(vec!["A".into(), "B".into()], Some("B".into()));
        assert_eq!(registry.current.as_deref(), Some("B"));

        registry.replace_known(vec!["B".into()], Some(String::new()));
        assert_eq!(registry.current.as_deref(), Some("B"));
        assert!(registry.is_consistent());
    }

    #[test]
    fn session_entries_follow_render_rule() {
        let registry = SessionRegistry {
            current: Some("A".into()),
            known: vec!["A".into(), "B".into()],
        };

        let entries = registry.entries(true);
        assert_eq!(
            entries[0],
            SessionEntry {
                name: "A".into(),
                is_current: true,
                can_connect: false,
                can_remove: false,
            }
        );
        assert!(entries[1].can_connect && entries[1].can_remove);

        // Disconnected: the current session may be reconnected but not removed
        let entries = registry.entries(false);
        assert!(entries[0].can_connect);
        assert!(!entries[0].can_remove);
    }

    #[test]
    fn set_current_reports_changes() {
        let mut registry = SessionRegistry::default();
        assert!(registry.set_current(Some("main".into())));
        assert!(!registry.set_current(Some("main".into())));
        assert!(registry.set_current(None));
        assert!(!registry.set_current(Some(String::new())));
        assert_eq!(registry.current_label(), "none");
    }

    #[test]
    fn interval_parsing_clamps() {
        assert_eq!(AutoClearSettings::parse_interval("12"), 12);
        assert_eq!(AutoClearSettings::parse_interval("0"), 1);
        assert_eq!(AutoClearSettings::parse_interval("-4"), 1);
        assert_eq!(AutoClearSettings::parse_interval("500"), 60);
        assert_eq!(AutoClearSettings::parse_interval(" 7.5"), 7);
        assert_eq!(AutoClearSettings::parse_interval("abc"), DEFAULT_CLEAR_INTERVAL);
        assert_eq!(AutoClearSettings::parse_interval(""), DEFAULT_CLEAR_INTERVAL);
    }

    #[test]
    fn server_interval_is_in_seconds() {
        let mut settings = AutoClearSettings::default();
        settings.apply_server(Some(false), Some(600));
        assert!(!settings.enabled);
        assert_eq!(settings.interval_minutes, 10);

        settings.apply_server(None, Some(30));
        assert_eq!(settings.interval_minutes, 1);
    }
}
