use thiserror::Error;

use crate::node::{NodeFlags, NodeId, NodeRole};

/// Errors emitted by surface node creation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
    #[error("surface node {0} does not exist")]
    UnknownNode(NodeId),
}

/// Capability the engine draws through.
///
/// Only [`Surface::create`] reports failure. Every other mutation addressed
/// to a node that no longer exists is a no-op, since the engine may hold ids
/// of subtrees the host already tore down.
pub trait Surface {
    /// Node that stands for the document root.
    fn root(&self) -> NodeId;

    /// Whether `node` is currently attached to the surface.
    fn contains(&self, node: NodeId) -> bool;

    /// Parent of `node`, `None` for the root or unknown nodes.
    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Append a new child with the given role under `parent`.
    fn create(
        &mut self,
        parent: NodeId,
        role: NodeRole,
    ) -> Result<NodeId, SurfaceError>;

    /// Remove `node` and its whole subtree.
    fn remove(&mut self, node: NodeId);

    /// Remove every child of `node`, keeping the node itself.
    fn clear_children(&mut self, node: NodeId);

    /// Replace the text attached to `node`.
    fn set_text(&mut self, node: NodeId, text: &str);

    /// Set or replace a named attribute on `node`.
    fn set_attr(&mut self, node: NodeId, key: &'static str, value: &str);

    /// Turn the given flags on or off.
    fn set_flags(&mut self, node: NodeId, flags: NodeFlags, enabled: bool);

    /// Current flags of `node`, empty for unknown nodes.
    fn flags(&self, node: NodeId) -> NodeFlags;

    /// Apply a uniform scale factor to `node`.
    fn set_scale(&mut self, node: NodeId, scale: f32);

    /// Convenience wrapper toggling [`NodeFlags::HIDDEN`].
    fn set_visible(&mut self, node: NodeId, visible: bool) {
        self.set_flags(node, NodeFlags::HIDDEN, !visible);
    }

    /// Walk from `node` up to the root, yielding `node` first.
    fn ancestors(&self, node: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut current = self.contains(node).then_some(node);
        while let Some(id) = current {
            chain.push(id);
            current = self.parent(id);
        }
        chain
    }
}
