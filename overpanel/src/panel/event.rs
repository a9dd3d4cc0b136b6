use overpanel_surface::NodeId;

use crate::notification::NotificationEvent;
use crate::section::UpsertOutcome;

/// Host input forwarded to [`PanelController::handle_signal`].
///
/// [`PanelController::handle_signal`]: super::PanelController::handle_signal
#[derive(Debug, Clone, PartialEq)]
pub enum PanelSignal {
    /// Key press; `repeat` is set for auto-repeat presses.
    Key { code: String, repeat: bool },
    /// Viewport size changed.
    Resize { width: f32, height: f32 },
    /// Pointer activation of a surface node.
    Click { target: NodeId },
}

impl PanelSignal {
    pub fn key(code: impl Into<String>) -> Self {
        Self::Key {
            code: code.into(),
            repeat: false,
        }
    }

    pub fn key_repeat(code: impl Into<String>) -> Self {
        Self::Key {
            code: code.into(),
            repeat: true,
        }
    }

    pub fn resize(width: f32, height: f32) -> Self {
        Self::Resize { width, height }
    }

    pub fn click(target: NodeId) -> Self {
        Self::Click { target }
    }
}

/// Observable panel transitions, drained with
/// [`PanelController::drain_events`].
///
/// [`PanelController::drain_events`]: super::PanelController::drain_events
#[derive(Debug, Clone, PartialEq)]
pub enum PanelEvent {
    Opened,
    Closed,
    ScaleChanged(f32),
    SectionRendered { id: String, outcome: UpsertOutcome },
    SectionSelected(String),
    SidebarRebuilt,
    Notification(NotificationEvent),
    Destroyed,
}
