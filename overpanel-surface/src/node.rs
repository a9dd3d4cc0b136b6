use std::fmt;

use bitflags::bitflags;

/// Opaque identity of a node created on a [`crate::Surface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    /// Build an id from its raw value.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Return the raw value backing this id.
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Structural role of a node inside the panel or notification stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRole {
    /// Document root equivalent owned by the host.
    Root,
    /// Generic host-provided container.
    Container,
    Overlay,
    Window,
    WindowBody,
    Sidebar,
    Logo,
    CategoryLabel,
    SidebarOption,
    SidebarIcon,
    SidebarLabel,
    MainContent,
    TopControls,
    Divider,
    SectionsContainer,
    Section,
    SectionTitle,
    Card,
    CardHeader,
    CardTitle,
    CardControls,
    CardDivider,
    ContentRow,
    ContentTitle,
    ContentControls,
    SettingsIcon,
    Toggle,
    NotificationStack,
    Notification,
    NotificationTitle,
    NotificationBody,
    NotificationClose,
}

bitflags! {
    /// Visual state bits projected onto a node.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct NodeFlags: u8 {
        /// Node is not displayed.
        const HIDDEN = 1 << 0;
        /// Selected sidebar option or switched-on toggle.
        const ACTIVE = 1 << 1;
        /// Entrance animation applied.
        const SHOWN = 1 << 2;
        /// Exit animation applied.
        const HIDING = 1 << 3;
        /// Transient emphasis pulse.
        const HIGHLIGHT = 1 << 4;
        /// Node ignores pointer interaction.
        const DISABLED = 1 << 5;
    }
}
