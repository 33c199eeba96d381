//! Process-wide (per-compilation) ownership of every AST node.
//!
//! The original compiler's pointer-graph AST, freed en masse through a
//! process-wide registry, becomes an arena+index model here — every node
//! lives in a `Vec<Node>` owned by [`AstRegistry`] and is referred to by a
//! small [`NodeId`], trading pointer-chasing and manual frees for a single
//! flat allocation and plain-integer handles.

use crate::ast::node::Node;

/// Non-owning index into an [`AstRegistry`]. Stable identity for the
/// lifetime of the registry (indices are never reused), which is what
/// backs the dump/reparse round-trip identity check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Owns every node allocated during one compilation.
#[derive(Default)]
pub struct AstRegistry {
    nodes: Vec<Node>,
}

impl AstRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a node for later bulk release and returns a stable,
    /// non-owning reference to it.
    pub fn register(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Releases every registered node at once. Safe to call only after all
    /// analysis passes holding non-owning [`NodeId`]s have completed;
    /// nothing enforces this at the type level because `NodeId` carries no
    /// borrow of the registry (the whole point of the arena+index model is
    /// that references are copyable plain indices).
    pub fn free_all(&mut self) {
        self.nodes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::node::NodeKind;
    use crate::ast::token::TokenId;

    fn dummy_token() -> TokenId {
        let mut reg = crate::ast::token::TokenRegistry::new();
        let file = reg.register_file("t.tau", "x");
        reg.token_init(file, crate::ast::token::TokenKind::Ident, crate::ast::token::BytePos(0))
    }

    #[test]
    fn register_returns_stable_increasing_ids() {
        let mut registry = AstRegistry::new();
        let tok = dummy_token();
        let a = registry.register(Node::new(NodeKind::Poison, tok));
        let b = registry.register(Node::new(NodeKind::Poison, tok));
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn free_all_drops_every_node() {
        let mut registry = AstRegistry::new();
        let tok = dummy_token();
        registry.register(Node::new(NodeKind::Poison, tok));
        registry.free_all();
        assert!(registry.is_empty());
    }
}
