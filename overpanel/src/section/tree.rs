use std::collections::HashMap;

use overpanel_surface::{NodeFlags, NodeId, NodeRole, Surface};

use super::card::{CardRenderer, ControlBinding};
use super::model::SectionDecl;
use crate::error::{PanelError, Result};

const SECTION_ATTR: &str = "section";

/// Whether an upsert built a new section node or refreshed an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

/// Result of clicking a rendered control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlHit {
    Toggle {
        active: bool,
        callback: Option<String>,
    },
    Settings {
        callback: Option<String>,
    },
}

#[derive(Debug)]
struct RenderedSection {
    node: NodeId,
    bindings: HashMap<NodeId, ControlBinding>,
}

/// Registered section declarations and their presentation nodes.
///
/// Declarations are kept in registration order whether or not a content area
/// is attached, so a rebuilt content area can replay them. Visibility of a
/// rendered section is owned by [`SectionTree::select`]; re-rendering an
/// existing section never touches it.
#[derive(Debug, Default)]
pub struct SectionTree {
    decls: Vec<SectionDecl>,
    container: Option<NodeId>,
    rendered: HashMap<String, RenderedSection>,
}

impl SectionTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind to a freshly built content area.
    ///
    /// Nodes of the previous area are forgotten; the caller removed them
    /// together with that area.
    pub fn attach(&mut self, container: NodeId) {
        self.container = Some(container);
        self.rendered.clear();
    }

    pub fn detach(&mut self) {
        self.container = None;
        self.rendered.clear();
    }

    pub fn container(&self) -> Option<NodeId> {
        self.container
    }

    /// Store `decl`, replacing any declaration with the same id in place.
    pub fn register(&mut self, decl: SectionDecl) -> bool {
        match self.decls.iter_mut().find(|existing| existing.id == decl.id) {
            Some(existing) => {
                *existing = decl;
                true
            },
            None => {
                self.decls.push(decl);
                false
            },
        }
    }

    /// Store `decl` and render it when a content area is attached.
    ///
    /// `active` is the currently selected section id; a newly created
    /// section starts hidden unless it is that section.
    pub fn upsert<S: Surface>(
        &mut self,
        surface: &mut S,
        decl: SectionDecl,
        active: Option<&str>,
    ) -> Option<UpsertOutcome> {
        let id = decl.id.clone();
        let _ = self.register(decl);
        self.container?;
        match self.render(surface, &id, active) {
            Ok(outcome) => Some(outcome),
            Err(err) => {
                log::error!("section `{id}` could not be rendered: {err}");
                None
            },
        }
    }

    /// Render every stored declaration in registration order.
    pub fn replay<S: Surface>(
        &mut self,
        surface: &mut S,
        active: Option<&str>,
    ) -> Vec<(String, UpsertOutcome)> {
        let ids: Vec<String> =
            self.decls.iter().map(|decl| decl.id.clone()).collect();
        let mut outcomes = Vec::with_capacity(ids.len());
        for id in ids {
            match self.render(surface, &id, active) {
                Ok(outcome) => outcomes.push((id, outcome)),
                Err(err) => {
                    log::error!("section `{id}` could not be replayed: {err}");
                },
            }
        }
        outcomes
    }

    /// Show `id` and hide every other rendered section.
    ///
    /// Returns `false`, changing nothing, when `id` is not rendered.
    pub fn select<S: Surface>(&self, surface: &mut S, id: &str) -> bool {
        if !self.rendered.contains_key(id) {
            return false;
        }
        for (section_id, section) in &self.rendered {
            surface.set_visible(section.node, section_id == id);
        }
        true
    }

    /// Apply a click on `node` if it is a rendered control.
    ///
    /// Toggles flip the stored declaration first and then project the new
    /// state onto the node.
    pub fn activate<S: Surface>(
        &mut self,
        surface: &mut S,
        node: NodeId,
    ) -> Option<ControlHit> {
        let (section_id, binding) =
            self.rendered.iter().find_map(|(id, section)| {
                section.bindings.get(&node).map(|b| (id.clone(), b.clone()))
            })?;

        match binding {
            ControlBinding::Settings(callback) => {
                Some(ControlHit::Settings { callback })
            },
            ControlBinding::Toggle(slot) => {
                let decl =
                    self.decls.iter_mut().find(|decl| decl.id == section_id)?;
                let toggle = decl.toggle_mut(slot)?;
                toggle.active = !toggle.active;
                surface.set_flags(node, NodeFlags::ACTIVE, toggle.active);
                Some(ControlHit::Toggle {
                    active: toggle.active,
                    callback: toggle.callback.clone(),
                })
            },
        }
    }

    pub fn decl(&self, id: &str) -> Option<&SectionDecl> {
        self.decls.iter().find(|decl| decl.id == id)
    }

    pub fn decls(&self) -> &[SectionDecl] {
        &self.decls
    }

    pub fn is_registered(&self, id: &str) -> bool {
        self.decl(id).is_some()
    }

    pub fn is_rendered(&self, id: &str) -> bool {
        self.rendered.contains_key(id)
    }

    pub fn section_node(&self, id: &str) -> Option<NodeId> {
        self.rendered.get(id).map(|section| section.node)
    }

    /// First rendered section in registration order.
    pub fn first_rendered(&self) -> Option<&str> {
        self.decls
            .iter()
            .map(|decl| decl.id.as_str())
            .find(|id| self.rendered.contains_key(*id))
    }

    fn render<S: Surface>(
        &mut self,
        surface: &mut S,
        id: &str,
        active: Option<&str>,
    ) -> Result<UpsertOutcome> {
        let Some(container) = self.container else {
            return Err(PanelError::Detached);
        };
        let Some(decl) = self.decls.iter().find(|decl| decl.id == id) else {
            return Err(PanelError::UnknownSection(id.to_string()));
        };

        let existing = self
            .rendered
            .get(id)
            .map(|section| section.node)
            .filter(|node| surface.contains(*node));
        let (node, outcome) = match existing {
            Some(node) => {
                surface.clear_children(node);
                (node, UpsertOutcome::Updated)
            },
            None => {
                let node = surface.create(container, NodeRole::Section)?;
                surface.set_attr(node, SECTION_ATTR, id);
                surface.set_visible(node, active == Some(id));
                (node, UpsertOutcome::Created)
            },
        };
        // Track the node before building children; a failed card must not
        // orphan it.
        let entry = self
            .rendered
            .entry(id.to_string())
            .or_insert_with(|| RenderedSection {
                node,
                bindings: HashMap::new(),
            });
        entry.node = node;
        entry.bindings.clear();

        if let Some(title) = &decl.title {
            let title_node = surface.create(node, NodeRole::SectionTitle)?;
            surface.set_text(title_node, title);
        }
        for (index, card) in decl.cards.iter().enumerate() {
            let rendered = CardRenderer::render(surface, node, index, card)?;
            entry.bindings.extend(rendered.bindings);
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use overpanel_surface::{MemorySurface, NodeFlags, NodeRole, Surface};

    use super::{ControlHit, SectionTree, UpsertOutcome};
    use crate::section::{
        CardDecl, CardHeader, ContentRow, SectionDecl, ToggleDecl,
    };

    fn attached() -> (MemorySurface, SectionTree) {
        let mut surface = MemorySurface::new();
        let root = surface.root();
        let container =
            surface.create(root, NodeRole::SectionsContainer).unwrap();
        let mut tree = SectionTree::new();
        tree.attach(container);
        (surface, tree)
    }

    fn section(id: &str, rows: &[&str]) -> SectionDecl {
        let mut card = CardDecl::new().header(CardHeader::new(id));
        for row in rows {
            card = card.row(ContentRow::new(*row));
        }
        SectionDecl::new(id).title(id.to_uppercase()).card(card)
    }

    fn row_titles(surface: &MemorySurface, tree: &SectionTree, id: &str) -> Vec<String> {
        let node = tree.section_node(id).unwrap();
        surface
            .descendants(node)
            .into_iter()
            .filter_map(|n| surface.node(n))
            .filter(|n| n.role() == NodeRole::ContentTitle)
            .filter_map(|n| n.text().map(str::to_string))
            .collect()
    }

    #[test]
    fn given_same_id_twice_when_upserting_then_one_node_holds_new_content() {
        let (mut surface, mut tree) = attached();

        let first = tree.upsert(&mut surface, section("aim", &["a", "b"]), None);
        let second = tree.upsert(&mut surface, section("aim", &["c"]), None);

        assert_eq!(first, Some(UpsertOutcome::Created));
        assert_eq!(second, Some(UpsertOutcome::Updated));
        assert_eq!(surface.find_by_attr("section", "aim").len(), 1);
        assert_eq!(row_titles(&surface, &tree, "aim"), vec!["c"]);
        assert_eq!(tree.decls().len(), 1);
    }

    #[test]
    fn given_inactive_section_when_upserted_then_it_stays_hidden() {
        let (mut surface, mut tree) = attached();
        let _ = tree.upsert(&mut surface, section("aim", &[]), Some("misc"));
        let node = tree.section_node("aim").unwrap();
        assert!(surface.flags(node).contains(NodeFlags::HIDDEN));

        let _ = tree.upsert(&mut surface, section("aim", &["x"]), Some("misc"));

        assert!(surface.flags(node).contains(NodeFlags::HIDDEN));
    }

    #[test]
    fn given_active_section_when_upserted_then_it_stays_visible() {
        let (mut surface, mut tree) = attached();
        let _ = tree.upsert(&mut surface, section("aim", &[]), Some("aim"));
        let _ = tree.upsert(&mut surface, section("misc", &[]), Some("aim"));
        let node = tree.section_node("aim").unwrap();
        assert!(!surface.flags(node).contains(NodeFlags::HIDDEN));

        let _ = tree.upsert(&mut surface, section("aim", &["x"]), Some("aim"));

        assert!(!surface.flags(node).contains(NodeFlags::HIDDEN));
        let misc = tree.section_node("misc").unwrap();
        assert!(surface.flags(misc).contains(NodeFlags::HIDDEN));
    }

    #[test]
    fn given_detached_tree_when_upserting_then_decl_is_only_stored() {
        let mut surface = MemorySurface::new();
        let mut tree = SectionTree::new();

        let outcome = tree.upsert(&mut surface, section("aim", &[]), None);

        assert_eq!(outcome, None);
        assert!(tree.is_registered("aim"));
        assert!(!tree.is_rendered("aim"));
        assert_eq!(surface.len(), 1);
    }

    #[test]
    fn given_rendered_sections_when_selecting_then_exactly_one_is_visible() {
        let (mut surface, mut tree) = attached();
        for id in ["aim", "visuals", "misc"] {
            let _ = tree.upsert(&mut surface, section(id, &[]), None);
        }

        assert!(tree.select(&mut surface, "visuals"));

        let visible: Vec<_> = ["aim", "visuals", "misc"]
            .into_iter()
            .filter(|id| {
                let node = tree.section_node(id).unwrap();
                !surface.flags(node).contains(NodeFlags::HIDDEN)
            })
            .collect();
        assert_eq!(visible, vec!["visuals"]);
    }

    #[test]
    fn given_unknown_id_when_selecting_then_visibility_is_unchanged() {
        let (mut surface, mut tree) = attached();
        let _ = tree.upsert(&mut surface, section("aim", &[]), Some("aim"));

        assert!(!tree.select(&mut surface, "ghost"));

        let node = tree.section_node("aim").unwrap();
        assert!(!surface.flags(node).contains(NodeFlags::HIDDEN));
    }

    #[test]
    fn given_toggle_when_activated_then_decl_and_projection_flip() {
        let (mut surface, mut tree) = attached();
        let decl = SectionDecl::new("aim").card(
            CardDecl::new()
                .row(ContentRow::new("Smooth").toggle(ToggleDecl::new(false).callback("smooth"))),
        );
        let _ = tree.upsert(&mut surface, decl, Some("aim"));
        let toggle = surface.find_by_role(NodeRole::Toggle)[0];

        let hit = tree.activate(&mut surface, toggle);

        assert_eq!(
            hit,
            Some(ControlHit::Toggle {
                active: true,
                callback: Some(String::from("smooth")),
            })
        );
        assert!(surface.flags(toggle).contains(NodeFlags::ACTIVE));
        let stored = tree.decl("aim").unwrap().cards[0].content[0].toggle.clone();
        assert_eq!(stored.map(|t| t.active), Some(true));
    }

    #[test]
    fn given_flipped_toggle_when_replayed_then_state_is_preserved() {
        let (mut surface, mut tree) = attached();
        let decl = SectionDecl::new("aim").card(
            CardDecl::new().header(CardHeader::new("Aim").toggle(ToggleDecl::new(false))),
        );
        let _ = tree.upsert(&mut surface, decl, Some("aim"));
        let toggle = surface.find_by_role(NodeRole::Toggle)[0];
        let _ = tree.activate(&mut surface, toggle);

        let root = surface.root();
        let old = tree.container().unwrap();
        surface.remove(old);
        let fresh = surface.create(root, NodeRole::SectionsContainer).unwrap();
        tree.attach(fresh);
        let outcomes = tree.replay(&mut surface, Some("aim"));

        assert_eq!(outcomes, vec![(String::from("aim"), UpsertOutcome::Created)]);
        let toggle = surface.find_by_role(NodeRole::Toggle)[0];
        assert!(surface.flags(toggle).contains(NodeFlags::ACTIVE));
    }

    #[test]
    fn given_non_control_node_when_activated_then_nothing_happens() {
        let (mut surface, mut tree) = attached();
        let _ = tree.upsert(&mut surface, section("aim", &["row"]), None);
        let title = surface.find_by_role(NodeRole::ContentTitle)[0];

        assert_eq!(tree.activate(&mut surface, title), None);
    }

    #[test]
    fn given_sections_when_queried_then_first_rendered_follows_registration() {
        let mut surface = MemorySurface::new();
        let mut tree = SectionTree::new();
        let _ = tree.upsert(&mut surface, section("b", &[]), None);
        let _ = tree.upsert(&mut surface, section("a", &[]), None);
        assert_eq!(tree.first_rendered(), None);

        let root = surface.root();
        let container =
            surface.create(root, NodeRole::SectionsContainer).unwrap();
        tree.attach(container);
        let _ = tree.replay(&mut surface, None);

        assert_eq!(tree.first_rendered(), Some("b"));
    }
}
