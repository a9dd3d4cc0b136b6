mod card;
mod model;
mod tree;

pub use card::{CardRenderer, ControlBinding, RenderedCard};
pub use model::{
    CardDecl, CardHeader, Category, ContentRow, SectionDecl, SettingsDecl,
    SidebarOption, ToggleDecl, ToggleSlot,
};
pub use tree::{ControlHit, SectionTree, UpsertOutcome};
