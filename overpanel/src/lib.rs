//! Render-state engine for an embeddable overlay control panel.
//!
//! The crate keeps everything a host needs to draw a toggleable settings
//! panel on top of its own UI:
//! - a single [`PanelController`] instance per host, owned through a
//!   [`PanelRegistry`],
//! - a sidebar of [`Category`] entries that select registered sections,
//! - [`SectionDecl`] cards with toggles and settings affordances bound to
//!   named host callbacks,
//! - a [`NotificationQueue`] of timed toasts,
//! - a [`ScaleCalculator`] fitting the window to the viewport.
//!
//! Nothing here draws pixels or reads a clock. The presentation tree is
//! written through the [`surface::Surface`] trait and time advances only
//! when the host calls [`PanelController::advance`].
//!
//! Hosts usually:
//! 1. Construct the panel with [`PanelRegistry::construct`].
//! 2. Register callbacks, categories and sections.
//! 3. Forward key, resize and click input as [`PanelSignal`]s, advance time
//!    from their frame loop and drain [`PanelEvent`]s.

mod callbacks;
mod config;
mod error;
mod notification;
mod panel;
mod scale;
mod section;
pub mod timer;

pub use callbacks::CallbackRegistry;
pub use config::{PanelConfig, PanelTimings};
pub use error::{PanelError, Result};
pub use notification::{
    NotificationEvent, NotificationId, NotificationKind, NotificationQueue,
    NotificationSpec, NotificationState, NotificationTimings,
};
pub use panel::{
    DismissHandle, PanelController, PanelEvent, PanelHandle, PanelRegistry,
    PanelSignal, PanelState, Sidebar,
};
pub use scale::{ScaleCalculator, Viewport};
pub use section::{
    CardDecl, CardHeader, CardRenderer, Category, ContentRow, ControlBinding,
    ControlHit, RenderedCard, SectionDecl, SectionTree, SettingsDecl,
    SidebarOption, ToggleDecl, ToggleSlot, UpsertOutcome,
};

pub use overpanel_surface as surface;
