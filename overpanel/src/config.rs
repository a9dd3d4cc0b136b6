use std::time::Duration;

use serde::Deserialize;

use overpanel_surface::NodeId;

use crate::error::Result;
use crate::notification::{
    NotificationKind, NotificationSpec, NotificationTimings,
};
use crate::scale::{ScaleCalculator, Viewport};
use crate::section::Category;

const DEFAULT_LOGO: &str = "OVERPANEL";
const DEFAULT_TOGGLE_KEY: &str = "ShiftRight";

/// Delays of the panel-level deferred continuations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PanelTimings {
    /// Delay between `open()` and the structural rebuild.
    pub open_settle_ms: u64,
    /// Delay between construction and the greeting notification.
    pub greeting_delay_ms: u64,
}

impl Default for PanelTimings {
    fn default() -> Self {
        Self {
            open_settle_ms: 10,
            greeting_delay_ms: 1000,
        }
    }
}

impl PanelTimings {
    pub fn open_settle(&self) -> Duration {
        Duration::from_millis(self.open_settle_ms)
    }

    pub fn greeting_delay(&self) -> Duration {
        Duration::from_millis(self.greeting_delay_ms)
    }
}

/// Construction options of a panel instance.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PanelConfig {
    /// Node the panel is mounted under; the surface root when unset.
    #[serde(skip)]
    pub container: Option<NodeId>,
    pub logo_text: String,
    pub categories: Vec<Category>,
    /// Key code that toggles the panel.
    pub toggle_key: String,
    /// Notification shown once after construction; `null` disables it.
    pub greeting: Option<NotificationSpec>,
    /// Last known viewport; the scale stays at `1.0` until one is known.
    pub viewport: Option<Viewport>,
    pub timings: PanelTimings,
    pub notifications: NotificationTimings,
    pub scale: ScaleCalculator,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            container: None,
            logo_text: String::from(DEFAULT_LOGO),
            categories: Vec::new(),
            toggle_key: String::from(DEFAULT_TOGGLE_KEY),
            greeting: Some(default_greeting()),
            viewport: None,
            timings: PanelTimings::default(),
            notifications: NotificationTimings::default(),
            scale: ScaleCalculator::default(),
        }
    }
}

impl PanelConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn container(mut self, container: NodeId) -> Self {
        self.container = Some(container);
        self
    }

    pub fn logo_text(mut self, logo: impl Into<String>) -> Self {
        self.logo_text = logo.into();
        self
    }

    pub fn category(mut self, category: Category) -> Self {
        self.categories.push(category);
        self
    }

    pub fn toggle_key(mut self, code: impl Into<String>) -> Self {
        self.toggle_key = code.into();
        self
    }

    pub fn greeting(mut self, greeting: Option<NotificationSpec>) -> Self {
        self.greeting = greeting;
        self
    }

    pub fn viewport(mut self, width: f32, height: f32) -> Self {
        self.viewport = Some(Viewport::new(width, height));
        self
    }

    pub fn timings(mut self, timings: PanelTimings) -> Self {
        self.timings = timings;
        self
    }

    pub fn notification_timings(mut self, timings: NotificationTimings) -> Self {
        self.notifications = timings;
        self
    }
}

fn default_greeting() -> NotificationSpec {
    NotificationSpec::new("Press Right Shift to open the panel")
        .title("Injected")
        .kind(NotificationKind::Info)
        .duration_ms(2000)
        .highlight(true)
}

#[cfg(test)]
mod tests {
    use super::PanelConfig;
    use crate::notification::NotificationKind;

    #[test]
    fn given_empty_json_when_decoding_then_defaults_apply() {
        let config = PanelConfig::from_json("{}").unwrap();

        assert_eq!(config, PanelConfig::default());
        assert_eq!(config.logo_text, "OVERPANEL");
        assert_eq!(config.toggle_key, "ShiftRight");
        assert!(config.greeting.as_ref().is_some_and(|g| g.highlight));
    }

    #[test]
    fn given_partial_json_when_decoding_then_overrides_are_applied() {
        let config = PanelConfig::from_json(
            r#"{
                "logoText": "HOST",
                "greeting": null,
                "viewport": {"width": 800, "height": 600},
                "timings": {"openSettleMs": 0},
                "notifications": {"exitMs": 100},
                "scale": {"maxScale": 1.0},
                "categories": [{"name": "Main", "options": [{"sectionId": "a", "label": "A"}]}]
            }"#,
        )
        .unwrap();

        assert_eq!(config.logo_text, "HOST");
        assert!(config.greeting.is_none());
        assert_eq!(config.timings.open_settle_ms, 0);
        assert_eq!(config.timings.greeting_delay_ms, 1000);
        assert_eq!(config.notifications.exit_ms, 100);
        assert_eq!(config.notifications.settle_ms, 10);
        assert_eq!(config.scale.max_scale, 1.0);
        assert_eq!(config.scale.min_scale, 0.6);
        assert_eq!(config.categories[0].options[0].section_id, "a");
        assert!(config.container.is_none());
    }

    #[test]
    fn given_greeting_override_when_decoding_then_kind_is_parsed() {
        let config = PanelConfig::from_json(
            r#"{"greeting": {"message": "hi", "kind": "error"}}"#,
        )
        .unwrap();

        let greeting = config.greeting.unwrap();
        assert_eq!(greeting.kind, NotificationKind::Error);
        assert_eq!(greeting.duration_ms, 2000);
    }
}
