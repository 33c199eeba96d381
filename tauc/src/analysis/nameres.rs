//! Name resolution pass.
//!
//! A depth-first visitor keyed on node kind, carrying a scope stack.
//! Entering a node that introduces a scope (module, composite type body,
//! function body, block) pushes a fresh [`ScopeId`]; leaving it pops back
//! to the enclosing one. Declarations insert themselves before their
//! children are visited; module- and composite-type-level declaration
//! lists are hoisted (every signature inserted before any body is
//! recursed into) so forward references between siblings resolve, while
//! block scopes keep strict lexical order.

use crate::ast::node::{Node, NodeKind, Visibility};
use crate::ast::registry::{AstRegistry, NodeId};
use crate::ast::token::TokenRegistry;
use crate::diagnostics::bag::ErrorBag;
use crate::diagnostics::kind::DiagnosticKind;
use crate::symtab::scope::{ScopeArena, ScopeId};

pub struct NameRes<'a> {
    registry: &'a AstRegistry,
    tokens: &'a TokenRegistry,
    scopes: &'a mut ScopeArena,
    bag: &'a mut ErrorBag,
}

impl<'a> NameRes<'a> {
    pub fn new(
        registry: &'a AstRegistry,
        tokens: &'a TokenRegistry,
        scopes: &'a mut ScopeArena,
        bag: &'a mut ErrorBag,
    ) -> Self {
        Self {
            registry,
            tokens,
            scopes,
            bag,
        }
    }

    /// Runs the pass over a `prog` node and returns its opened top scope.
    pub fn run(&mut self, prog: NodeId) -> ScopeId {
        let top = self.scopes.init(None);
        let NodeKind::Prog(p) = &self.node(prog).kind else {
            panic!("nameres::run expects a prog node");
        };
        p.scope.set(Some(top));
        self.visit_hoisted(&p.decls, top);
        top
    }

    /// Resolves a cloned generic specialization's declaration in
    /// `binding_scope`. Entry point used by
    /// [`crate::analysis::generics::GenericInstantiations::instantiate`];
    /// behaves like any other top-level declaration visit.
    pub fn analyze_clone(&mut self, clone: NodeId, binding_scope: ScopeId) {
        self.declare(clone, binding_scope);
        self.visit_decl(clone, binding_scope);
    }

    fn node(&self, id: NodeId) -> &'a Node {
        self.registry.get(id)
    }

    fn ident_name(&self, id: NodeId) -> String {
        match &self.node(id).kind {
            NodeKind::Ident(ident) => ident.name.clone(),
            other => panic!("expected ident node, found {}", other.name()),
        }
    }

    fn report(&mut self, kind: DiagnosticKind, at: NodeId) {
        let loc = self.tokens.locate(self.node(at).token);
        self.bag.push(kind, loc);
    }

    /// Returns the scope a declaration opens for its members, if any.
    fn decl_scope(&self, decl: NodeId) -> Option<ScopeId> {
        match &self.node(decl).kind {
            NodeKind::DeclMod(d) => d.scope.get(),
            NodeKind::DeclStruct(d) => d.scope.get(),
            NodeKind::DeclUnion(d) => d.scope.get(),
            NodeKind::DeclEnum(d) => d.scope.get(),
            NodeKind::DeclFun(d) => d.scope.get(),
            NodeKind::DeclGeneric(d) => d.scope.get(),
            _ => None,
        }
    }

    fn decl_visibility(&self, decl: NodeId) -> Visibility {
        match &self.node(decl).kind {
            NodeKind::DeclVar(d) => d.is_pub,
            NodeKind::DeclFun(d) => d.is_pub,
            NodeKind::DeclField(d) => d.is_pub,
            NodeKind::DeclStruct(d) => d.is_pub,
            NodeKind::DeclUnion(d) => d.is_pub,
            NodeKind::DeclEnum(d) => d.is_pub,
            NodeKind::DeclMod(d) => d.is_pub,
            NodeKind::DeclGeneric(d) => d.is_pub,
            // Parameters, enum constants and generic params have no
            // visibility of their own; treat as public for lookup purposes.
            _ => Visibility::Public,
        }
    }

    fn decl_ident(&self, decl: NodeId) -> Option<NodeId> {
        match &self.node(decl).kind {
            NodeKind::DeclVar(d) => Some(d.id),
            NodeKind::DeclParam(d) => Some(d.id),
            NodeKind::DeclFun(d) => Some(d.id),
            NodeKind::DeclField(d) => Some(d.id),
            NodeKind::DeclStruct(d) => Some(d.id),
            NodeKind::DeclUnion(d) => Some(d.id),
            NodeKind::DeclEnum(d) => Some(d.id),
            NodeKind::DeclEnumConstant(d) => Some(d.id),
            NodeKind::DeclMod(d) => Some(d.id),
            NodeKind::DeclGeneric(d) => Some(d.id),
            NodeKind::DeclGenericParam(d) => Some(d.id),
            _ => None,
        }
    }

    /// Inserts `decl`'s own identifier into `scope`, reporting a collision
    /// against the first occurrence on failure.
    fn declare(&mut self, decl: NodeId, scope: ScopeId) {
        let Some(ident) = self.decl_ident(decl) else {
            return;
        };
        let name = self.ident_name(ident);
        if let Some(existing) = self.scopes.insert(scope, name.clone(), decl) {
            let first = self.tokens.locate(self.node(existing.decl).token);
            self.report(
                DiagnosticKind::SymbolCollision {
                    name,
                    first,
                },
                decl,
            );
        }
    }

    /// Hoists every declaration's signature into `scope` before recursing
    /// into any of their bodies, so siblings can forward-reference each
    /// other. `use` directives among the items are left for the second
    /// pass, in list order, same as bodies.
    fn visit_hoisted(&mut self, items: &[NodeId], scope: ScopeId) {
        for &item in items {
            if self.is_decl(item) {
                self.declare(item, scope);
            }
        }
        for &item in items {
            self.visit_item(item, scope);
        }
    }

    /// Dispatches a module/block member to the right visitor: a
    /// declaration, a `use` directive, or (inside blocks) a statement.
    fn visit_item(&mut self, id: NodeId, scope: ScopeId) {
        if self.is_decl(id) {
            self.visit_decl(id, scope);
        } else if matches!(self.node(id).kind, NodeKind::Use(_)) {
            self.visit_use(id, scope);
        } else {
            self.visit_stmt(id, scope);
        }
    }

    fn visit_decl(&mut self, id: NodeId, scope: ScopeId) {
        tracing::trace!(kind = self.node(id).kind.name(), "nameres: visiting declaration");
        match &self.node(id).kind {
            NodeKind::DeclVar(d) => {
                let (ty, init) = (d.ty, d.init);
                if let Some(ty) = ty {
                    self.visit_type(ty, scope);
                }
                if let Some(init) = init {
                    self.visit_expr(init, scope);
                }
            }
            NodeKind::DeclParam(d) => {
                let (ty, default) = (d.ty, d.default);
                self.visit_type(ty, scope);
                if let Some(default) = default {
                    self.visit_expr(default, scope);
                }
            }
            NodeKind::DeclFun(d) => {
                let fun_scope = self.scopes.init(Some(scope));
                d.scope.set(Some(fun_scope));
                let params = d.params.clone();
                let ret_ty = d.ret_ty;
                let body = d.body;
                for &p in &params {
                    self.declare(p, fun_scope);
                    self.visit_decl(p, fun_scope);
                }
                if let Some(ret_ty) = ret_ty {
                    self.visit_type(ret_ty, fun_scope);
                }
                if let Some(body) = body {
                    self.visit_stmt(body, fun_scope);
                }
            }
            NodeKind::DeclField(d) => {
                self.visit_type(d.ty, scope);
            }
            NodeKind::DeclStruct(d) => {
                let body_scope = self.scopes.init(Some(scope));
                d.scope.set(Some(body_scope));
                let fields = d.fields.clone();
                self.visit_hoisted(&fields, body_scope);
            }
            NodeKind::DeclUnion(d) => {
                let body_scope = self.scopes.init(Some(scope));
                d.scope.set(Some(body_scope));
                let fields = d.fields.clone();
                self.visit_hoisted(&fields, body_scope);
            }
            NodeKind::DeclEnum(d) => {
                let body_scope = self.scopes.init(Some(scope));
                d.scope.set(Some(body_scope));
                let constants = d.constants.clone();
                self.visit_hoisted(&constants, body_scope);
            }
            NodeKind::DeclEnumConstant(d) => {
                if let Some(value) = d.value {
                    self.visit_expr(value, scope);
                }
            }
            NodeKind::DeclMod(d) => {
                let body_scope = self.scopes.init(Some(scope));
                d.scope.set(Some(body_scope));
                let decls = d.decls.clone();
                self.visit_hoisted(&decls, body_scope);
            }
            NodeKind::DeclGeneric(d) => {
                let generic_scope = self.scopes.init(Some(scope));
                d.scope.set(Some(generic_scope));
                let params = d.params.clone();
                let inner = d.inner;
                for &p in &params {
                    self.declare(p, generic_scope);
                }
                self.visit_decl(inner, generic_scope);
            }
            NodeKind::DeclGenericParam(d) => {
                if let Some(constraint) = d.constraint {
                    self.visit_type(constraint, scope);
                }
            }
            other => panic!("visit_decl called on non-decl node {}", other.name()),
        }
    }

    fn visit_stmt(&mut self, id: NodeId, scope: ScopeId) {
        match &self.node(id).kind {
            NodeKind::StmtIf(s) => {
                let (cond, then_b, else_b) = (s.cond, s.then_branch, s.else_branch);
                self.visit_expr(cond, scope);
                self.visit_stmt(then_b, scope);
                if let Some(else_b) = else_b {
                    self.visit_stmt(else_b, scope);
                }
            }
            NodeKind::StmtFor(s) => {
                let loop_scope = self.scopes.init(Some(scope));
                let (init, cond, step, body) = (s.init, s.cond, s.step, s.body);
                if let Some(init) = init {
                    self.declare(init, loop_scope);
                    self.visit_decl(init, loop_scope);
                }
                if let Some(cond) = cond {
                    self.visit_expr(cond, loop_scope);
                }
                if let Some(step) = step {
                    self.visit_expr(step, loop_scope);
                }
                self.visit_stmt(body, loop_scope);
            }
            NodeKind::StmtWhile(s) => {
                let (cond, body) = (s.cond, s.body);
                self.visit_expr(cond, scope);
                self.visit_stmt(body, scope);
            }
            NodeKind::StmtDoWhile(s) => {
                let (body, cond) = (s.body, s.cond);
                self.visit_stmt(body, scope);
                self.visit_expr(cond, scope);
            }
            NodeKind::StmtLoop(s) => {
                self.visit_stmt(s.body, scope);
            }
            NodeKind::StmtBreak(_) | NodeKind::StmtContinue(_) => {}
            NodeKind::StmtReturn(s) => {
                if let Some(value) = s.value {
                    self.visit_expr(value, scope);
                }
            }
            NodeKind::StmtDefer(s) => {
                self.visit_stmt(s.body, scope);
            }
            NodeKind::StmtBlock(s) => {
                let block_scope = self.scopes.init(Some(scope));
                s.scope.set(Some(block_scope));
                let stmts = s.stmts.clone();
                // Strict lexical order: no hoisting inside blocks, each
                // item is declared then immediately visited in place.
                for &stmt in &stmts {
                    if self.is_decl(stmt) {
                        self.declare(stmt, block_scope);
                    }
                    self.visit_item(stmt, block_scope);
                }
            }
            NodeKind::StmtExpr(s) => {
                self.visit_expr(s.expr, scope);
            }
            other => panic!("visit_stmt called on non-stmt node {}", other.name()),
        }
    }

    fn is_decl(&self, id: NodeId) -> bool {
        matches!(
            self.node(id).kind,
            NodeKind::DeclVar(_)
                | NodeKind::DeclFun(_)
                | NodeKind::DeclStruct(_)
                | NodeKind::DeclUnion(_)
                | NodeKind::DeclEnum(_)
                | NodeKind::DeclMod(_)
                | NodeKind::DeclGeneric(_)
        )
    }

    fn visit_expr(&mut self, id: NodeId, scope: ScopeId) {
        match &self.node(id).kind {
            NodeKind::ExprId(e) => {
                let ident = e.id;
                let name = self.ident_name(ident);
                if let Some(sym) = self.scopes.lookup(scope, &name) {
                    self.node(id).resolved.set(Some(sym.decl));
                } else {
                    self.report(DiagnosticKind::UndefinedSymbol { name }, id);
                }
            }
            NodeKind::ExprLitInt(_)
            | NodeKind::ExprLitFlt(_)
            | NodeKind::ExprLitStr(_)
            | NodeKind::ExprLitChar(_)
            | NodeKind::ExprLitBool(_)
            | NodeKind::ExprLitNull => {}
            NodeKind::ExprLitVec(e) => {
                let elems = e.elems.clone();
                for elem in elems {
                    self.visit_expr(elem, scope);
                }
            }
            NodeKind::ExprLitMat(e) => {
                let elems = e.elems.clone();
                for elem in elems {
                    self.visit_expr(elem, scope);
                }
            }
            NodeKind::ExprUnaryOp(e) => {
                self.visit_expr(e.operand, scope);
            }
            NodeKind::ExprBinaryOp(e) => {
                let (lhs, rhs) = (e.lhs, e.rhs);
                self.visit_expr(lhs, scope);
                self.visit_expr(rhs, scope);
            }
            NodeKind::ExprCall(e) => {
                let (callee, args) = (e.callee, e.args.clone());
                self.visit_expr(callee, scope);
                for arg in args {
                    self.visit_expr(arg, scope);
                }
            }
            NodeKind::ExprGenericSpec(e) => {
                let (callee, args) = (e.callee, e.args.clone());
                self.visit_expr(callee, scope);
                for arg in args {
                    self.visit_generic_arg(arg, scope);
                }
            }
            NodeKind::ExprDecl(e) => {
                let decl = e.decl;
                self.declare(decl, scope);
                self.visit_decl(decl, scope);
            }
            other => panic!("visit_expr called on non-expr node {}", other.name()),
        }
    }

    /// A generic-spec argument may be a type or a constant expression;
    /// nameres treats both uniformly since only lookup matters here.
    fn visit_generic_arg(&mut self, id: NodeId, scope: ScopeId) {
        if self.is_type(id) {
            self.visit_type(id, scope);
        } else {
            self.visit_expr(id, scope);
        }
    }

    fn is_type(&self, id: NodeId) -> bool {
        matches!(
            self.node(id).kind,
            NodeKind::TypePrim(_)
                | NodeKind::TypePtr(_)
                | NodeKind::TypeRef(_)
                | NodeKind::TypeMut(_)
                | NodeKind::TypeOpt(_)
                | NodeKind::TypeArray(_)
                | NodeKind::TypeVec(_)
                | NodeKind::TypeMat(_)
                | NodeKind::TypeFun(_)
                | NodeKind::TypeMember(_)
                | NodeKind::TypeDeclRef(_)
                | NodeKind::TypeGenericSpec(_)
        )
    }

    fn visit_type(&mut self, id: NodeId, scope: ScopeId) {
        match &self.node(id).kind {
            NodeKind::TypePrim(_) => {}
            NodeKind::TypePtr(t) => self.visit_type(t.base, scope),
            NodeKind::TypeRef(t) => self.visit_type(t.base, scope),
            NodeKind::TypeMut(t) => self.visit_type(t.base, scope),
            NodeKind::TypeOpt(t) => self.visit_type(t.base, scope),
            NodeKind::TypeArray(t) => {
                let (base, size) = (t.base, t.size);
                self.visit_type(base, scope);
                self.visit_expr(size, scope);
            }
            NodeKind::TypeVec(t) => self.visit_type(t.base, scope),
            NodeKind::TypeMat(t) => self.visit_type(t.base, scope),
            NodeKind::TypeFun(t) => {
                let (params, ret) = (t.params.clone(), t.ret);
                for p in params {
                    self.visit_type(p, scope);
                }
                self.visit_type(ret, scope);
            }
            NodeKind::TypeMember(t) => {
                let (owner, member) = (t.owner, t.member);
                self.visit_type(owner, scope);
                self.visit_type(member, scope);
            }
            NodeKind::TypeDeclRef(t) => {
                let path = t.path;
                self.resolve_path(path, scope, None, false);
            }
            NodeKind::TypeGenericSpec(t) => {
                let (callee, args) = (t.callee, t.args.clone());
                self.visit_type(callee, scope);
                for arg in args {
                    self.visit_generic_arg(arg, scope);
                }
            }
            other => panic!("visit_type called on non-type node {}", other.name()),
        }
    }

    /// Resolves a path node (segment/access chain), storing each
    /// sub-node's resolved declaration. `context` is the scope the
    /// previous segment's declaration opened — `None` means look up
    /// hierarchically from `scope` (used only by the first segment).
    /// Returns the final resolved declaration.
    fn resolve_path(
        &mut self,
        id: NodeId,
        scope: ScopeId,
        context: Option<ScopeId>,
        is_use: bool,
    ) -> Option<NodeId> {
        match &self.node(id).kind {
            NodeKind::PathSegment(p) => {
                let ident = p.id;
                let name = self.ident_name(ident);
                let found = match context {
                    Some(ctx) => self.scopes.get(ctx, &name).cloned(),
                    None => self.scopes.lookup(scope, &name).cloned(),
                };
                match found {
                    Some(sym) => {
                        if context.is_some() && self.decl_visibility(sym.decl) == Visibility::Private {
                            self.report(
                                DiagnosticKind::PrivateMember {
                                    owner: String::new(),
                                    member: name,
                                },
                                id,
                            );
                            return None;
                        }
                        self.node(id).resolved.set(Some(sym.decl));
                        Some(sym.decl)
                    }
                    None => {
                        let kind = if is_use {
                            DiagnosticKind::UsePathNotFound { path: name }
                        } else if context.is_some() {
                            DiagnosticKind::NoMember {
                                owner: String::new(),
                                member: name,
                            }
                        } else {
                            DiagnosticKind::UndefinedSymbol { name }
                        };
                        self.report(kind, id);
                        None
                    }
                }
            }
            NodeKind::PathAccess(p) => {
                let (lhs, rhs) = (p.lhs, p.rhs);
                let lhs_decl = self.resolve_path(lhs, scope, context, is_use);
                let Some(lhs_decl) = lhs_decl else {
                    return None;
                };
                let Some(next_scope) = self.decl_scope(lhs_decl) else {
                    self.report(
                        DiagnosticKind::WildcardOnNonScope {
                            path: String::new(),
                        },
                        id,
                    );
                    return None;
                };
                let rhs_decl = self.resolve_path(rhs, scope, Some(next_scope), is_use);
                if let Some(rhs_decl) = rhs_decl {
                    self.node(id).resolved.set(Some(rhs_decl));
                }
                rhs_decl
            }
            NodeKind::PathAlias(p) => self.resolve_path(p.path, scope, context, is_use),
            NodeKind::PathWildcard => None,
            NodeKind::PathList(p) => {
                let paths = p.paths.clone();
                let mut last = None;
                for path in paths {
                    last = self.resolve_path(path, scope, context, is_use);
                }
                last
            }
            other => panic!("resolve_path called on non-path node {}", other.name()),
        }
    }

    /// Handles a `use` directive: imports the resolved symbol(s) into
    /// `scope` under the appropriate name(s).
    fn visit_use(&mut self, id: NodeId, scope: ScopeId) {
        let NodeKind::Use(u) = &self.node(id).kind else {
            panic!("visit_use called on non-use node");
        };
        let path = u.path;
        self.import_path(path, scope, None);
    }

    fn import_path(&mut self, path: NodeId, scope: ScopeId, context: Option<ScopeId>) {
        match &self.node(path).kind {
            NodeKind::PathAlias(p) => {
                let (inner, alias_id) = (p.path, p.id);
                if let Some(decl) = self.resolve_path(inner, scope, context, true) {
                    let alias_name = self.ident_name(alias_id);
                    self.scopes.insert(scope, alias_name, decl);
                }
            }
            NodeKind::PathAccess(p) if matches!(self.node(p.rhs).kind, NodeKind::PathWildcard) => {
                let lhs = p.lhs;
                if let Some(decl) = self.resolve_path(lhs, scope, context, true) {
                    match self.decl_scope(decl) {
                        Some(target_scope) => {
                            let raw: Vec<(String, NodeId)> = self
                                .scopes
                                .scope(target_scope)
                                .iter()
                                .map(|s| (s.name.clone(), s.decl))
                                .collect();
                            let members: Vec<_> = raw
                                .into_iter()
                                .filter(|(_, d)| self.decl_visibility(*d) == Visibility::Public)
                                .collect();
                            for (name, decl) in members {
                                self.scopes.insert(scope, name, decl);
                            }
                        }
                        None => {
                            self.report(
                                DiagnosticKind::WildcardOnNonScope { path: String::new() },
                                path,
                            );
                        }
                    }
                }
            }
            NodeKind::PathAccess(p) if matches!(self.node(p.rhs).kind, NodeKind::PathList(_)) => {
                let (lhs, rhs) = (p.lhs, p.rhs);
                let Some(lhs_decl) = self.resolve_path(lhs, scope, context, true) else {
                    return;
                };
                let Some(next_scope) = self.decl_scope(lhs_decl) else {
                    self.report(
                        DiagnosticKind::WildcardOnNonScope { path: String::new() },
                        path,
                    );
                    return;
                };
                let NodeKind::PathList(list) = &self.node(rhs).kind else {
                    unreachable!()
                };
                let sub_paths = list.paths.clone();
                for sub in sub_paths {
                    self.import_path(sub, scope, Some(next_scope));
                }
            }
            NodeKind::PathList(p) => {
                let sub_paths = p.paths.clone();
                for sub in sub_paths {
                    self.import_path(sub, scope, context);
                }
            }
            _ => {
                // Plain segment or access chain: imports the tail name.
                if let Some(decl) = self.resolve_path(path, scope, context, true) {
                    if let Some(ident) = self.decl_ident(decl) {
                        let name = self.ident_name(ident);
                        self.scopes.insert(scope, name, decl);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::node::{
        DeclEnum, DeclEnumConstant, DeclVar, ExprId, Ident, Node, NodeKind, StmtBlock, StmtExpr,
        Visibility,
    };
    use crate::ast::registry::AstRegistry;
    use crate::ast::token::{BytePos, TokenKind, TokenRegistry};
    use std::cell::Cell;

    fn ident(registry: &mut AstRegistry, tok: crate::ast::token::TokenId, name: &str) -> NodeId {
        registry.register(Node::new(
            NodeKind::Ident(Ident { name: name.to_string() }),
            tok,
        ))
    }

    #[test]
    fn undefined_identifier_reports_and_leaves_unresolved() {
        let mut tokens = TokenRegistry::new();
        let file = tokens.register_file("t.tau", "x");
        let tok = tokens.token_init(file, TokenKind::Ident, BytePos(0));

        let mut registry = AstRegistry::new();
        let use_id = ident(&mut registry, tok, "missing");
        let expr_id = registry.register(Node::new(NodeKind::ExprId(ExprId { id: use_id }), tok));
        let stmt = registry.register(Node::new(
            NodeKind::StmtExpr(StmtExpr { expr: expr_id }),
            tok,
        ));
        let block = registry.register(Node::new(
            NodeKind::StmtBlock(StmtBlock {
                stmts: smallvec::smallvec![stmt],
                scope: Cell::new(None),
            }),
            tok,
        ));

        let mut scopes = ScopeArena::new();
        let mut bag = ErrorBag::new();
        let mut nameres = NameRes::new(&registry, &tokens, &mut scopes, &mut bag);
        let top = scopes_init_root(&mut nameres);
        nameres.visit_stmt(block, top);

        assert!(bag.has_errors());
        assert!(registry.get(expr_id).resolved.get().is_none());
    }

    fn scopes_init_root(nameres: &mut NameRes<'_>) -> ScopeId {
        nameres.scopes.init(None)
    }

    #[test]
    fn forward_reference_resolves_via_hoisting() {
        let mut tokens = TokenRegistry::new();
        let file = tokens.register_file("t.tau", "x");
        let tok = tokens.token_init(file, TokenKind::Ident, BytePos(0));

        let mut registry = AstRegistry::new();

        // enum Color { Red }
        let red_ident = ident(&mut registry, tok, "Red");
        let red_const = registry.register(Node::new(
            NodeKind::DeclEnumConstant(DeclEnumConstant {
                id: red_ident,
                value: None,
            }),
            tok,
        ));
        let color_ident = ident(&mut registry, tok, "Color");
        let color_decl = registry.register(Node::new(
            NodeKind::DeclEnum(DeclEnum {
                id: color_ident,
                is_pub: Visibility::Public,
                constants: smallvec::smallvec![red_const],
                scope: Cell::new(None),
            }),
            tok,
        ));

        // var c = <reference to Color, forward, appears before Color in
        // declaration order>
        let use_ident = ident(&mut registry, tok, "Color");
        let use_expr = registry.register(Node::new(NodeKind::ExprId(ExprId { id: use_ident }), tok));
        let var_ident = ident(&mut registry, tok, "c");
        let var_decl = registry.register(Node::new(
            NodeKind::DeclVar(DeclVar {
                id: var_ident,
                is_pub: Visibility::Private,
                is_mut: false,
                ty: None,
                init: Some(use_expr),
            }),
            tok,
        ));

        let mut scopes = ScopeArena::new();
        let mut bag = ErrorBag::new();
        let mut nameres = NameRes::new(&registry, &tokens, &mut scopes, &mut bag);
        let top = nameres.scopes.init(None);
        nameres.visit_hoisted(&[var_decl, color_decl], top);

        assert!(!bag.has_errors());
        assert_eq!(registry.get(use_expr).resolved.get(), Some(color_decl));
    }
}
