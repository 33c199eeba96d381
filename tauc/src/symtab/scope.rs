//! Lexical scopes: a hash-bucket symbol table with parent links.
//!
//! Every nested block, function body, composite-type body, generic-argument
//! binding, and module gets its own [`Scope`], and lookup across the
//! hierarchy walks `parent` until it hits a definition or the root.

use crate::ast::registry::NodeId;
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(u32);

impl ScopeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// An entry in a scope: the identifier, the AST declaration it names, and
/// the scope that owns it.
#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub decl: NodeId,
    pub scope: ScopeId,
}

#[derive(Debug)]
pub struct Scope {
    parent: Option<ScopeId>,
    symbols: FxHashMap<String, Symbol>,
}

impl Scope {
    fn new(parent: Option<ScopeId>) -> Self {
        Self {
            parent,
            symbols: FxHashMap::default(),
        }
    }

    pub fn parent(&self) -> Option<ScopeId> {
        self.parent
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values()
    }
}

/// Owns every [`Scope`] allocated during one compilation, the same
/// arena+index ownership model [`crate::ast::registry::AstRegistry`] uses
/// for nodes — "a scope's destruction frees all its symbols" falls out for
/// free since symbols live inside their owning `Scope`, which lives inside
/// this arena.
#[derive(Default)]
pub struct ScopeArena {
    scopes: Vec<Scope>,
}

impl ScopeArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a child scope (or a root scope, when `parent` is `None`).
    pub fn init(&mut self, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope::new(parent));
        id
    }

    /// Inserts `sym` into `scope`. Returns `None` on success, or a clone of
    /// the colliding symbol on clash — the caller reports the collision;
    /// this layer never emits diagnostics itself.
    pub fn insert(&mut self, scope: ScopeId, name: String, decl: NodeId) -> Option<Symbol> {
        let existing = self.scopes[scope.index()].symbols.get(&name).cloned();
        if existing.is_some() {
            return existing;
        }
        self.scopes[scope.index()].symbols.insert(
            name.clone(),
            Symbol {
                name,
                decl,
                scope,
            },
        );
        None
    }

    /// Local lookup: never climbs to `parent`.
    pub fn get(&self, scope: ScopeId, name: &str) -> Option<&Symbol> {
        self.scopes[scope.index()].symbols.get(name)
    }

    /// Hierarchical lookup: walks `parent` until a hit or the root.
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<&Symbol> {
        let mut current = Some(scope);
        while let Some(id) = current {
            if let Some(sym) = self.get(id, name) {
                return Some(sym);
            }
            current = self.scopes[id.index()].parent();
        }
        None
    }

    pub fn parent_of(&self, scope: ScopeId) -> Option<ScopeId> {
        self.scopes[scope.index()].parent()
    }

    pub fn scope(&self, scope: ScopeId) -> &Scope {
        &self.scopes[scope.index()]
    }

    pub fn free_all(&mut self) {
        self.scopes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(i: u32) -> NodeId {
        // NodeId has no public constructor outside the registry; tests
        // here only care about scope behavior, so we fabricate ids via a
        // throwaway registry.
        let mut registry = crate::ast::registry::AstRegistry::new();
        let mut tokens = crate::ast::token::TokenRegistry::new();
        let file = tokens.register_file("t.tau", "x");
        let tok = tokens.token_init(file, crate::ast::token::TokenKind::Ident, crate::ast::token::BytePos(0));
        let mut last = registry.register(crate::ast::node::Node::new(crate::ast::node::NodeKind::Poison, tok));
        for _ in 0..i {
            last = registry.register(crate::ast::node::Node::new(crate::ast::node::NodeKind::Poison, tok));
        }
        last
    }

    #[test]
    fn insert_succeeds_once_and_collides_on_repeat() {
        let mut arena = ScopeArena::new();
        let root = arena.init(None);
        let decl_a = node(0);
        let decl_b = node(1);

        assert!(arena.insert(root, "x".to_string(), decl_a).is_none());
        let collision = arena.insert(root, "x".to_string(), decl_b);
        assert!(collision.is_some());
        assert_eq!(collision.unwrap().decl, decl_a);
    }

    #[test]
    fn lookup_climbs_parents_but_get_does_not() {
        let mut arena = ScopeArena::new();
        let root = arena.init(None);
        let child = arena.init(Some(root));
        let decl = node(0);
        arena.insert(root, "outer".to_string(), decl);

        assert!(arena.get(child, "outer").is_none());
        assert!(arena.lookup(child, "outer").is_some());
    }
}
