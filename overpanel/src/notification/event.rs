use super::model::NotificationId;

/// Lifecycle transitions emitted by the notification queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationEvent {
    /// Node created, entrance pending.
    Enqueued(NotificationId),
    /// Entrance applied; auto-dismiss countdown started if any.
    Shown(NotificationId),
    /// Emphasis pulse ended.
    HighlightCleared(NotificationId),
    /// Exit started; the record left the active list.
    Hiding(NotificationId),
    /// Node removed from the surface.
    Removed(NotificationId),
}

impl NotificationEvent {
    pub fn id(&self) -> NotificationId {
        match self {
            NotificationEvent::Enqueued(id)
            | NotificationEvent::Shown(id)
            | NotificationEvent::HighlightCleared(id)
            | NotificationEvent::Hiding(id)
            | NotificationEvent::Removed(id) => *id,
        }
    }
}
