use std::collections::HashMap;

use overpanel_surface::{NodeFlags, NodeId, NodeRole, Surface};

use crate::error::Result;
use crate::section::{Category, SidebarOption};

const SECTION_ATTR: &str = "section";

/// Presentation of the category navigation column.
///
/// Every option is keyed by the section id it selects, so lookups in both
/// directions stay cheap while the tree is rebuilt wholesale on change.
#[derive(Debug, Default)]
pub struct Sidebar {
    node: Option<NodeId>,
    options: HashMap<String, NodeId>,
    targets: HashMap<NodeId, String>,
}

impl Sidebar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    pub fn is_built(&self) -> bool {
        self.node.is_some()
    }

    /// Replace the column under `parent` with one built from `categories`.
    ///
    /// The node is appended to `parent`; callers build it before the main
    /// content so it comes first.
    pub fn build<S: Surface>(
        &mut self,
        surface: &mut S,
        parent: NodeId,
        logo: &str,
        categories: &[Category],
    ) -> Result<NodeId> {
        self.remove(surface);

        let node = surface.create(parent, NodeRole::Sidebar)?;
        self.node = Some(node);
        let logo_node = surface.create(node, NodeRole::Logo)?;
        surface.set_text(logo_node, logo);

        for category in categories {
            let label = surface.create(node, NodeRole::CategoryLabel)?;
            surface.set_text(label, &category.name);
            for option in &category.options {
                let option_node = self.build_option(surface, node, option)?;
                self.options.insert(option.section_id.clone(), option_node);
                self.targets.insert(option_node, option.section_id.clone());
            }
        }

        log::debug!(
            "sidebar built with {} categories and {} options",
            categories.len(),
            self.options.len()
        );
        Ok(node)
    }

    /// Drop the column and forget its options.
    pub fn remove<S: Surface>(&mut self, surface: &mut S) {
        if let Some(node) = self.node.take() {
            surface.remove(node);
        }
        self.options.clear();
        self.targets.clear();
    }

    /// Section id selected by the option `node`, if it is one.
    pub fn section_at(&self, node: NodeId) -> Option<&str> {
        self.targets.get(&node).map(String::as_str)
    }

    pub fn option_node(&self, section_id: &str) -> Option<NodeId> {
        self.options.get(section_id).copied()
    }

    /// Mark the option of `active` and clear every other one.
    pub fn mark_active<S: Surface>(&self, surface: &mut S, active: Option<&str>) {
        for (section_id, node) in &self.options {
            let on = active == Some(section_id.as_str());
            surface.set_flags(*node, NodeFlags::ACTIVE, on);
        }
    }

    /// Disable options whose section has not been registered yet.
    pub fn refresh_availability<S, F>(&self, surface: &mut S, is_registered: F)
    where
        S: Surface,
        F: Fn(&str) -> bool,
    {
        for (section_id, node) in &self.options {
            let missing = !is_registered(section_id);
            surface.set_flags(*node, NodeFlags::DISABLED, missing);
        }
    }

    fn build_option<S: Surface>(
        &self,
        surface: &mut S,
        parent: NodeId,
        option: &SidebarOption,
    ) -> Result<NodeId> {
        let node = surface.create(parent, NodeRole::SidebarOption)?;
        surface.set_attr(node, SECTION_ATTR, &option.section_id);
        if let Some(icon) = &option.icon {
            let icon_node = surface.create(node, NodeRole::SidebarIcon)?;
            surface.set_text(icon_node, icon);
        }
        let label = surface.create(node, NodeRole::SidebarLabel)?;
        surface.set_text(label, &option.label);
        Ok(node)
    }
}

/// Drop options of `category` whose section id is already navigable.
///
/// Each section id maps to at most one option across all categories; the
/// first declaration wins.
pub(crate) fn retain_unique_options(
    existing: &[Category],
    mut category: Category,
) -> Category {
    let mut seen: Vec<String> = existing
        .iter()
        .flat_map(|c| c.options.iter().map(|o| o.section_id.clone()))
        .collect();
    category.options.retain(|option| {
        if seen.contains(&option.section_id) {
            log::warn!(
                "category `{}` repeats option for section `{}`; dropped",
                category.name,
                option.section_id
            );
            return false;
        }
        seen.push(option.section_id.clone());
        true
    });
    category
}
