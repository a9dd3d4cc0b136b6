use std::fmt;
use std::time::Duration;

use serde::Deserialize;

const DEFAULT_DURATION_MS: i64 = 2000;

/// Process-wide monotonic notification id. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NotificationId(u64);

impl NotificationId {
    pub(crate) const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Severity shown by the notification accent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    #[default]
    Info,
    Warning,
    Error,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Info => "info",
            NotificationKind::Warning => "warning",
            NotificationKind::Error => "error",
        }
    }
}

/// Lifecycle state of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationState {
    Pending,
    Visible,
    Hiding,
    Removed,
}

/// Host request for a new notification.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NotificationSpec {
    pub title: Option<String>,
    pub message: String,
    pub kind: NotificationKind,
    /// Auto-dismiss delay counted from the entrance. Zero or negative keeps
    /// the notification until it is dismissed.
    pub duration_ms: i64,
    pub highlight: bool,
    pub dismissible: bool,
}

impl Default for NotificationSpec {
    fn default() -> Self {
        Self {
            title: None,
            message: String::new(),
            kind: NotificationKind::Info,
            duration_ms: DEFAULT_DURATION_MS,
            highlight: false,
            dismissible: true,
        }
    }
}

impl NotificationSpec {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn kind(mut self, kind: NotificationKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn duration_ms(mut self, duration_ms: i64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    /// Keep the notification until it is dismissed.
    pub fn persistent(self) -> Self {
        self.duration_ms(0)
    }

    pub fn highlight(mut self, highlight: bool) -> Self {
        self.highlight = highlight;
        self
    }

    pub fn dismissible(mut self, dismissible: bool) -> Self {
        self.dismissible = dismissible;
        self
    }

    /// Delay before automatic dismissal, `None` when persistent.
    pub fn auto_dismiss(&self) -> Option<Duration> {
        u64::try_from(self.duration_ms)
            .ok()
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }

    pub(crate) fn display_title(&self) -> Option<&str> {
        self.title.as_deref().filter(|title| !title.is_empty())
    }
}

impl From<&str> for NotificationSpec {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for NotificationSpec {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

/// Animation windows of the notification lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NotificationTimings {
    /// Delay between creation and the entrance.
    pub settle_ms: u64,
    /// Length of the emphasis pulse.
    pub highlight_ms: u64,
    /// Exit animation window before the node is removed.
    pub exit_ms: u64,
}

impl Default for NotificationTimings {
    fn default() -> Self {
        Self {
            settle_ms: 10,
            highlight_ms: 1000,
            exit_ms: 400,
        }
    }
}

impl NotificationTimings {
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn highlight(&self) -> Duration {
        Duration::from_millis(self.highlight_ms)
    }

    pub fn exit(&self) -> Duration {
        Duration::from_millis(self.exit_ms)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{NotificationKind, NotificationSpec};

    #[test]
    fn given_bare_message_when_converted_then_defaults_apply() {
        let spec = NotificationSpec::from("saved");

        assert_eq!(spec.message, "saved");
        assert_eq!(spec.kind, NotificationKind::Info);
        assert_eq!(spec.auto_dismiss(), Some(Duration::from_millis(2000)));
        assert!(spec.dismissible);
        assert!(!spec.highlight);
    }

    #[test]
    fn given_non_positive_duration_when_resolving_then_spec_persists() {
        assert_eq!(NotificationSpec::new("a").persistent().auto_dismiss(), None);
        assert_eq!(NotificationSpec::new("b").duration_ms(-5).auto_dismiss(), None);
    }

    #[test]
    fn given_json_spec_when_decoding_then_camel_case_fields_are_read() {
        let spec: NotificationSpec = serde_json::from_str(
            r#"{"message":"disk low","kind":"warning","durationMs":0,"dismissible":false}"#,
        )
        .unwrap();

        assert_eq!(spec.kind, NotificationKind::Warning);
        assert_eq!(spec.auto_dismiss(), None);
        assert!(!spec.dismissible);
        assert_eq!(spec.title, None);
    }

    #[test]
    fn given_empty_title_when_displayed_then_title_is_skipped() {
        let spec = NotificationSpec::new("body").title("");

        assert_eq!(spec.display_title(), None);
    }
}
