mod controller;
mod event;
mod registry;
mod sidebar;

pub use controller::{PanelController, PanelState};
pub use event::{PanelEvent, PanelSignal};
pub use registry::{DismissHandle, PanelHandle, PanelRegistry};
pub use sidebar::Sidebar;
