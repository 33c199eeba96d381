//! AST-node → [`TypeId`] side table.
//!
//! Kept separate from the `ty` slot on [`crate::ast::node::Node`] itself:
//! the node's own `Cell<Option<TypeId>>` is the fast path the typecheck
//! pass writes and later passes read, while this table is what constant
//! folding uses to *rewrite* a type after the fact without touching the
//! node's other annotation slots. Insert overwrites silently, matching a
//! re-typechecked node simply getting a new answer.

use crate::ast::registry::NodeId;
use crate::types::desc::TypeId;
use rustc_hash::FxHashMap;

#[derive(Default)]
pub struct TypeTable {
    types: FxHashMap<NodeId, TypeId>,
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, node: NodeId, ty: TypeId) {
        self.types.insert(node, ty);
    }

    pub fn get(&self, node: NodeId) -> Option<TypeId> {
        self.types.get(&node).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::node::{Node, NodeKind, PrimKind};
    use crate::ast::registry::AstRegistry;
    use crate::ast::token::{BytePos, TokenKind, TokenRegistry};
    use crate::types::builder::TypeBuilder;

    #[test]
    fn insert_overwrites_existing_entry() {
        let mut registry = AstRegistry::new();
        let mut tokens = TokenRegistry::new();
        let file = tokens.register_file("t.tau", "x");
        let tok = tokens.token_init(file, TokenKind::Ident, BytePos(0));
        let node = registry.register(Node::new(NodeKind::Poison, tok));

        let mut builder = TypeBuilder::new();
        let i32t = builder.build_prim(PrimKind::I32);
        let i64t = builder.build_prim(PrimKind::I64);

        let mut table = TypeTable::new();
        table.insert(node, i32t);
        assert_eq!(table.get(node), Some(i32t));
        table.insert(node, i64t);
        assert_eq!(table.get(node), Some(i64t));
    }
}
