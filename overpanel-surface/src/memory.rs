use std::collections::{BTreeMap, HashMap};

use crate::node::{NodeFlags, NodeId, NodeRole};
use crate::surface::{Surface, SurfaceError};

/// Single retained node of a [`MemorySurface`].
#[derive(Debug, Clone)]
pub struct MemoryNode {
    role: NodeRole,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    text: Option<String>,
    attrs: BTreeMap<&'static str, String>,
    flags: NodeFlags,
    scale: Option<f32>,
}

impl MemoryNode {
    fn new(role: NodeRole, parent: Option<NodeId>) -> Self {
        Self {
            role,
            parent,
            children: Vec::new(),
            text: None,
            attrs: BTreeMap::new(),
            flags: NodeFlags::empty(),
            scale: None,
        }
    }

    pub fn role(&self) -> NodeRole {
        self.role
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    pub fn flags(&self) -> NodeFlags {
        self.flags
    }

    pub fn scale(&self) -> Option<f32> {
        self.scale
    }
}

/// Retained in-memory node tree implementing [`Surface`].
#[derive(Debug)]
pub struct MemorySurface {
    root: NodeId,
    next_id: u64,
    nodes: HashMap<NodeId, MemoryNode>,
}

impl Default for MemorySurface {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySurface {
    /// Create a surface holding only the root node.
    pub fn new() -> Self {
        let root = NodeId::from_raw(0);
        let mut nodes = HashMap::new();
        nodes.insert(root, MemoryNode::new(NodeRole::Root, None));
        Self {
            root,
            next_id: 1,
            nodes,
        }
    }

    /// Return a node by id.
    pub fn node(&self, id: NodeId) -> Option<&MemoryNode> {
        self.nodes.get(&id)
    }

    /// Number of attached nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Children of `id` in insertion order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(&id)
            .map(|node| node.children.as_slice())
            .unwrap_or_default()
    }

    /// Every attached node with `role`, in depth-first document order.
    pub fn find_by_role(&self, role: NodeRole) -> Vec<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .filter(|id| self.nodes.get(id).is_some_and(|n| n.role == role))
            .collect()
    }

    /// Every attached node whose attribute `key` equals `value`.
    pub fn find_by_attr(&self, key: &str, value: &str) -> Vec<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .filter(|id| {
                self.nodes
                    .get(id)
                    .is_some_and(|node| node.attr(key) == Some(value))
            })
            .collect()
    }

    /// First descendant of `ancestor` (excluding itself) with `role`.
    pub fn find_within(
        &self,
        ancestor: NodeId,
        role: NodeRole,
    ) -> Option<NodeId> {
        self.descendants(ancestor).into_iter().skip(1).find(|id| {
            self.nodes.get(id).is_some_and(|node| node.role == role)
        })
    }

    /// Depth-first list of `id` and everything below it.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get(&current) else {
                continue;
            };
            out.push(current);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut MemoryNode> {
        let node = self.nodes.get_mut(&id);
        if node.is_none() {
            log::trace!("surface mutation ignored for detached node {id}");
        }
        node
    }
}

impl Surface for MemorySurface {
    fn root(&self) -> NodeId {
        self.root
    }

    fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(&node).and_then(|node| node.parent)
    }

    fn create(
        &mut self,
        parent: NodeId,
        role: NodeRole,
    ) -> Result<NodeId, SurfaceError> {
        let id = NodeId::from_raw(self.next_id);
        let Some(parent_node) = self.nodes.get_mut(&parent) else {
            return Err(SurfaceError::UnknownNode(parent));
        };
        parent_node.children.push(id);
        self.next_id += 1;
        self.nodes.insert(id, MemoryNode::new(role, Some(parent)));
        Ok(id)
    }

    fn remove(&mut self, node: NodeId) {
        if node == self.root {
            self.clear_children(node);
            return;
        }

        let Some(parent) = self.parent(node) else {
            return;
        };
        if let Some(parent_node) = self.nodes.get_mut(&parent) {
            parent_node.children.retain(|child| *child != node);
        }
        for id in self.descendants(node) {
            self.nodes.remove(&id);
        }
    }

    fn clear_children(&mut self, node: NodeId) {
        let Some(children) =
            self.node_mut(node).map(|n| std::mem::take(&mut n.children))
        else {
            return;
        };
        for child in children {
            for id in self.descendants(child) {
                self.nodes.remove(&id);
            }
        }
    }

    fn set_text(&mut self, node: NodeId, text: &str) {
        if let Some(node) = self.node_mut(node) {
            node.text = Some(text.to_string());
        }
    }

    fn set_attr(&mut self, node: NodeId, key: &'static str, value: &str) {
        if let Some(node) = self.node_mut(node) {
            node.attrs.insert(key, value.to_string());
        }
    }

    fn set_flags(&mut self, node: NodeId, flags: NodeFlags, enabled: bool) {
        if let Some(node) = self.node_mut(node) {
            node.flags.set(flags, enabled);
        }
    }

    fn flags(&self, node: NodeId) -> NodeFlags {
        self.nodes
            .get(&node)
            .map(|node| node.flags)
            .unwrap_or_default()
    }

    fn set_scale(&mut self, node: NodeId, scale: f32) {
        if let Some(node) = self.node_mut(node) {
            node.scale = Some(scale);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::MemorySurface;
    use crate::{NodeFlags, NodeId, NodeRole, Surface, SurfaceError};

    #[test]
    fn given_unknown_parent_when_creating_then_error_is_returned() {
        let mut surface = MemorySurface::new();
        let missing = NodeId::from_raw(99);

        let result = surface.create(missing, NodeRole::Card);

        assert_eq!(result, Err(SurfaceError::UnknownNode(missing)));
        assert_eq!(surface.len(), 1);
    }

    #[test]
    fn given_nested_nodes_when_removing_parent_then_subtree_is_dropped() {
        let mut surface = MemorySurface::new();
        let root = surface.root();
        let card = surface.create(root, NodeRole::Card).unwrap();
        let row = surface.create(card, NodeRole::ContentRow).unwrap();
        let title = surface.create(row, NodeRole::ContentTitle).unwrap();

        surface.remove(card);

        assert!(!surface.contains(card));
        assert!(!surface.contains(row));
        assert!(!surface.contains(title));
        assert!(surface.children(root).is_empty());
    }

    #[test]
    fn given_children_when_clearing_then_node_itself_survives() {
        let mut surface = MemorySurface::new();
        let root = surface.root();
        let section = surface.create(root, NodeRole::Section).unwrap();
        surface.set_flags(section, NodeFlags::HIDDEN, true);
        let _ = surface.create(section, NodeRole::Card).unwrap();
        let _ = surface.create(section, NodeRole::Card).unwrap();

        surface.clear_children(section);

        assert!(surface.contains(section));
        assert!(surface.children(section).is_empty());
        assert!(surface.flags(section).contains(NodeFlags::HIDDEN));
        assert_eq!(surface.len(), 2);
    }

    #[test]
    fn given_deep_node_when_walking_ancestors_then_chain_ends_at_root() {
        let mut surface = MemorySurface::new();
        let root = surface.root();
        let card = surface.create(root, NodeRole::Card).unwrap();
        let header = surface.create(card, NodeRole::CardHeader).unwrap();
        let toggle = surface.create(header, NodeRole::Toggle).unwrap();

        assert_eq!(surface.ancestors(toggle), vec![toggle, header, card, root]);
        assert!(surface.ancestors(NodeId::from_raw(77)).is_empty());
    }

    #[test]
    fn given_detached_node_when_mutating_then_call_is_ignored() {
        let mut surface = MemorySurface::new();
        let root = surface.root();
        let node = surface.create(root, NodeRole::Toggle).unwrap();
        surface.remove(node);

        surface.set_text(node, "late");
        surface.set_flags(node, NodeFlags::ACTIVE, true);

        assert!(surface.node(node).is_none());
        assert_eq!(surface.flags(node), NodeFlags::empty());
    }

    #[test]
    fn given_attributes_when_searching_then_matching_nodes_are_found() {
        let mut surface = MemorySurface::new();
        let root = surface.root();
        let first = surface.create(root, NodeRole::SidebarOption).unwrap();
        let second = surface.create(root, NodeRole::SidebarOption).unwrap();
        surface.set_attr(first, "section", "aim");
        surface.set_attr(second, "section", "visuals");

        assert_eq!(surface.find_by_attr("section", "visuals"), vec![second]);
        assert_eq!(
            surface.find_by_role(NodeRole::SidebarOption),
            vec![first, second]
        );
    }
}
