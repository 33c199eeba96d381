//! Post-analysis mangling/lowering sweep.
//!
//! The last pass before handoff to the external code generator: it walks
//! every declaration reachable from `prog`, builds its fully-qualified
//! path from nested module/composite-type names, and derives a mangled
//! name codegen can emit directly as a backend symbol. The dotted path is
//! only an intermediate value here — what actually leaves the pass is the
//! mangled form, since that's the one codegen needs as a linker-visible
//! symbol.

use crate::ast::node::{Node, NodeKind};
use crate::ast::registry::{AstRegistry, NodeId};
use rustc_hash::FxHashMap;

/// A declaration's position in the module/composite-type nesting, as a
/// list of path segments ending in its own identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedPath {
    pub segments: Vec<String>,
}

impl QualifiedPath {
    fn child(&self, name: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Self { segments }
    }

    pub fn dotted(&self) -> String {
        self.segments.join(".")
    }

    /// The linker-visible symbol: a `_T`-prefixed, length-prefixed
    /// encoding of each segment, matching the original compiler's
    /// `mangle.c` scheme (`_T<len><segment>...`) closely enough to be
    /// collision-free across arbitrary nesting without needing a
    /// demangler in this crate.
    pub fn mangled(&self) -> String {
        let mut out = String::from("_T");
        for seg in &self.segments {
            out.push_str(&seg.len().to_string());
            out.push_str(seg);
        }
        out
    }
}

/// AST-node → mangled-name side table, populated by [`Mangler::run`] and
/// read by the (external) codegen collaborator.
#[derive(Default)]
pub struct MangleTable {
    names: FxHashMap<NodeId, QualifiedPath>,
}

impl MangleTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, decl: NodeId) -> Option<&QualifiedPath> {
        self.names.get(&decl)
    }

    fn insert(&mut self, decl: NodeId, path: QualifiedPath) {
        self.names.insert(decl, path);
    }
}

pub struct Mangler<'a> {
    registry: &'a AstRegistry,
    table: &'a mut MangleTable,
}

impl<'a> Mangler<'a> {
    pub fn new(registry: &'a AstRegistry, table: &'a mut MangleTable) -> Self {
        Self { registry, table }
    }

    fn node(&self, id: NodeId) -> &'a Node {
        self.registry.get(id)
    }

    fn ident_name(&self, id: NodeId) -> String {
        match &self.node(id).kind {
            NodeKind::Ident(i) => i.name.clone(),
            other => panic!("expected ident node, found {}", other.name()),
        }
    }

    pub fn run(&mut self, prog: NodeId) {
        let NodeKind::Prog(p) = &self.node(prog).kind else {
            panic!("mangle::run expects a prog node");
        };
        let decls = p.decls.clone();
        let root = QualifiedPath { segments: Vec::new() };
        self.visit_decls(&decls, &root);
    }

    fn visit_decls(&mut self, decls: &[NodeId], enclosing: &QualifiedPath) {
        for &decl in decls {
            self.visit_decl(decl, enclosing);
        }
    }

    fn visit_decl(&mut self, decl: NodeId, enclosing: &QualifiedPath) {
        match &self.node(decl).kind {
            NodeKind::DeclVar(d) => {
                let path = enclosing.child(&self.ident_name(d.id));
                self.table.insert(decl, path);
            }
            NodeKind::DeclFun(d) => {
                let path = enclosing.child(&self.ident_name(d.id));
                self.table.insert(decl, path.clone());
                // Parameters mangle under the function's own path, giving
                // codegen stable per-parameter debug-symbol names without
                // a separate table.
                let params = d.params.clone();
                for param in params {
                    if let NodeKind::DeclParam(p) = &self.node(param).kind {
                        let pname = self.ident_name(p.id);
                        self.table.insert(param, path.child(&pname));
                    }
                }
            }
            NodeKind::DeclStruct(d) => {
                let path = enclosing.child(&self.ident_name(d.id));
                self.table.insert(decl, path.clone());
                let fields = d.fields.clone();
                self.visit_fields(&fields, &path);
            }
            NodeKind::DeclUnion(d) => {
                let path = enclosing.child(&self.ident_name(d.id));
                self.table.insert(decl, path.clone());
                let fields = d.fields.clone();
                self.visit_fields(&fields, &path);
            }
            NodeKind::DeclEnum(d) => {
                let path = enclosing.child(&self.ident_name(d.id));
                self.table.insert(decl, path.clone());
                let constants = d.constants.clone();
                for c in constants {
                    if let NodeKind::DeclEnumConstant(ec) = &self.node(c).kind {
                        let cname = self.ident_name(ec.id);
                        self.table.insert(c, path.child(&cname));
                    }
                }
            }
            NodeKind::DeclMod(d) => {
                let path = enclosing.child(&self.ident_name(d.id));
                self.table.insert(decl, path.clone());
                let inner = d.decls.clone();
                self.visit_decls(&inner, &path);
            }
            NodeKind::DeclGeneric(d) => {
                let path = enclosing.child(&self.ident_name(d.id));
                self.table.insert(decl, path.clone());
                self.visit_decl(d.inner, &path);
            }
            _ => {}
        }
    }

    fn visit_fields(&mut self, fields: &[NodeId], enclosing: &QualifiedPath) {
        for &field in fields {
            if let NodeKind::DeclField(f) = &self.node(field).kind {
                let fname = self.ident_name(f.id);
                self.table.insert(field, enclosing.child(&fname));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::node::{DeclFun, DeclMod, Ident, Node, Visibility};
    use crate::ast::token::{BytePos, TokenKind, TokenRegistry};
    use std::cell::Cell;

    #[test]
    fn nested_function_mangles_through_its_module_path() {
        let mut registry = AstRegistry::new();
        let mut tokens = TokenRegistry::new();
        let file = tokens.register_file("t.tau", "x");
        let tok = tokens.token_init(file, TokenKind::Ident, BytePos(0));

        let fn_name = registry.register(Node::new(NodeKind::Ident(Ident { name: "greet".into() }), tok));
        let fun = registry.register(Node::new(
            NodeKind::DeclFun(DeclFun {
                id: fn_name,
                is_pub: Visibility::Public,
                params: Default::default(),
                ret_ty: None,
                body: None,
                scope: Cell::new(None),
            }),
            tok,
        ));
        let mod_name = registry.register(Node::new(NodeKind::Ident(Ident { name: "greeter".into() }), tok));
        let module = registry.register(Node::new(
            NodeKind::DeclMod(DeclMod {
                id: mod_name,
                is_pub: Visibility::Public,
                decls: smallvec::smallvec![fun],
                scope: Cell::new(None),
            }),
            tok,
        ));

        let mut table = MangleTable::new();
        let mut mangler = Mangler::new(&registry, &mut table);
        mangler.visit_decl(module, &QualifiedPath { segments: Vec::new() });

        let path = table.get(fun).unwrap();
        assert_eq!(path.dotted(), "greeter.greet");
        assert_eq!(path.mangled(), "_T7greeter5greet");
    }
}
