mod event;
mod model;
mod queue;

pub use event::NotificationEvent;
pub use model::{
    NotificationId, NotificationKind, NotificationSpec, NotificationState,
    NotificationTimings,
};
pub use queue::NotificationQueue;
