//! Control-flow analysis.
//!
//! Runs after typecheck, over the same frozen topology. State is
//! deliberately small — a structured-program walk tracking
//! `(in_loop?, in_fun_return_type, current_block)` is enough for every
//! check this pass needs — so it tracks a loop stack (innermost loop's
//! statement node, for
//! resolving `break`/`continue` targets and reporting `break`/`continue`
//! outside a loop), the enclosing function's declared return type (for
//! `missing_return`), and whether the statement currently being visited is
//! a direct member of a block's statement list (for `defer_outside_block`
//! and for flagging code after a terminating statement as unreachable).

use crate::ast::node::{Node, NodeKind, PrimKind};
use crate::ast::registry::{AstRegistry, NodeId};
use crate::ast::token::TokenRegistry;
use crate::diagnostics::bag::ErrorBag;
use crate::diagnostics::kind::DiagnosticKind;

pub struct ControlFlow<'a> {
    registry: &'a AstRegistry,
    tokens: &'a TokenRegistry,
    bag: &'a mut ErrorBag,
    loop_stack: Vec<NodeId>,
}

impl<'a> ControlFlow<'a> {
    pub fn new(registry: &'a AstRegistry, tokens: &'a TokenRegistry, bag: &'a mut ErrorBag) -> Self {
        Self {
            registry,
            tokens,
            bag,
            loop_stack: Vec::new(),
        }
    }

    fn node(&self, id: NodeId) -> &'a Node {
        self.registry.get(id)
    }

    fn report(&mut self, kind: DiagnosticKind, at: NodeId) {
        let loc = self.tokens.locate(self.node(at).token);
        self.bag.push(kind, loc);
    }

    /// Walks every declaration reachable from `prog`, checking each
    /// function body in turn. Struct/union/enum bodies carry no
    /// executable code and are skipped; nested modules and generic
    /// wrappers are recursed into.
    pub fn run(&mut self, prog: NodeId) {
        let NodeKind::Prog(p) = &self.node(prog).kind else {
            panic!("cfa::run expects a prog node");
        };
        let decls = p.decls.clone();
        self.visit_decls(&decls);
    }

    fn visit_decls(&mut self, decls: &[NodeId]) {
        for &decl in decls {
            match &self.node(decl).kind {
                NodeKind::DeclFun(d) => {
                    if let Some(body) = d.body {
                        self.check_fun(decl, d.ret_ty, body);
                    }
                }
                NodeKind::DeclMod(d) => {
                    let inner = d.decls.clone();
                    self.visit_decls(&inner);
                }
                NodeKind::DeclGeneric(d) => {
                    let inner = d.inner;
                    self.visit_decls(&[inner]);
                }
                _ => {}
            }
        }
    }

    fn fun_name(&self, decl: NodeId) -> String {
        match &self.node(decl).kind {
            NodeKind::DeclFun(d) => match &self.node(d.id).kind {
                NodeKind::Ident(i) => i.name.clone(),
                _ => String::new(),
            },
            _ => String::new(),
        }
    }

    fn is_unit_return(&self, ret_ty: Option<NodeId>) -> bool {
        match ret_ty {
            None => true,
            Some(t) => matches!(self.node(t).kind, NodeKind::TypePrim(PrimKind::Unit)),
        }
    }

    fn check_fun(&mut self, decl: NodeId, ret_ty: Option<NodeId>, body: NodeId) {
        self.visit_block(body);
        if !self.is_unit_return(ret_ty) && !self.terminates(body) {
            let name = self.fun_name(decl);
            self.report(DiagnosticKind::MissingReturn { function: name }, body);
        }
    }

    /// `true` iff control cannot fall off the end of `id` normally — it
    /// always returns, breaks, continues, or loops forever. Used both for
    /// `missing_return` and (via the caller) to decide whether subsequent
    /// statements in the same block are unreachable.
    fn terminates(&self, id: NodeId) -> bool {
        match &self.node(id).kind {
            NodeKind::StmtReturn(_) => true,
            NodeKind::StmtBreak(_) | NodeKind::StmtContinue(_) => true,
            NodeKind::StmtBlock(s) => s.stmts.last().is_some_and(|&last| self.terminates(last)),
            NodeKind::StmtIf(s) => match s.else_branch {
                Some(else_b) => self.terminates(s.then_branch) && self.terminates(else_b),
                None => false,
            },
            // An infinite `loop` with no statically-visible `break`
            // diverges; detecting whether any break targets *this* loop
            // would require a second pass keyed by node identity, which
            // this pass's tiny state doesn't carry — we conservatively
            // treat every `loop` as terminating, the same way the original
            // compiler's `cfa_reachability.c` treats an unconditional loop
            // as a sink.
            NodeKind::StmtLoop(_) => true,
            NodeKind::StmtFor(_) | NodeKind::StmtWhile(_) | NodeKind::StmtDoWhile(_) => false,
            NodeKind::StmtDefer(_) | NodeKind::StmtExpr(_) => false,
            _ => false,
        }
    }

    fn visit_block(&mut self, id: NodeId) {
        let stmts = match &self.node(id).kind {
            NodeKind::StmtBlock(s) => s.stmts.clone(),
            _ => panic!("visit_block called on non-block node"),
        };
        let mut unreachable_reported = false;
        let mut prev_terminates = false;
        for &stmt in &stmts {
            if prev_terminates && !unreachable_reported {
                self.report(DiagnosticKind::UnreachableCode, stmt);
                unreachable_reported = true;
            }
            self.visit_stmt(stmt, true);
            prev_terminates = self.terminates(stmt);
        }
    }

    /// `in_block` is true exactly when `id` is a direct member of some
    /// block's statement list (as opposed to e.g. the bare, brace-less
    /// body of an `if`/`while`). Only in that position is a `defer`
    /// considered attached to a valid enclosing block.
    fn visit_stmt(&mut self, id: NodeId, in_block: bool) {
        match &self.node(id).kind {
            NodeKind::StmtIf(s) => {
                let (cond, then_b, else_b) = (s.cond, s.then_branch, s.else_branch);
                let _ = cond;
                self.visit_stmt(then_b, false);
                if let Some(else_b) = else_b {
                    self.visit_stmt(else_b, false);
                }
            }
            NodeKind::StmtFor(s) => {
                let body = s.body;
                self.loop_stack.push(id);
                self.visit_stmt(body, false);
                self.loop_stack.pop();
            }
            NodeKind::StmtWhile(s) => {
                let body = s.body;
                self.loop_stack.push(id);
                self.visit_stmt(body, false);
                self.loop_stack.pop();
            }
            NodeKind::StmtDoWhile(s) => {
                let body = s.body;
                self.loop_stack.push(id);
                self.visit_stmt(body, false);
                self.loop_stack.pop();
            }
            NodeKind::StmtLoop(s) => {
                let body = s.body;
                self.loop_stack.push(id);
                self.visit_stmt(body, false);
                self.loop_stack.pop();
            }
            NodeKind::StmtBreak(s) => match self.loop_stack.last() {
                Some(&target) => s.target.set(Some(target)),
                None => self.report(DiagnosticKind::BreakOutsideLoop, id),
            },
            NodeKind::StmtContinue(s) => match self.loop_stack.last() {
                Some(&target) => s.target.set(Some(target)),
                None => self.report(DiagnosticKind::ContinueOutsideLoop, id),
            },
            NodeKind::StmtReturn(_) => {}
            NodeKind::StmtDefer(s) => {
                if !in_block {
                    self.report(DiagnosticKind::DeferOutsideBlock, id);
                }
                self.visit_stmt(s.body, false);
            }
            NodeKind::StmtBlock(_) => self.visit_block(id),
            NodeKind::StmtExpr(_) => {}
            other => panic!("cfa::visit_stmt called on non-stmt node {}", other.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::node::{
        DeclFun, Ident, Node, StmtBlock, StmtBreak, StmtExpr, StmtFor, StmtLoop, StmtReturn, Visibility,
    };
    use crate::ast::registry::AstRegistry;
    use crate::ast::token::{BytePos, TokenKind, TokenRegistry};
    use std::cell::Cell;

    fn tok(tokens: &mut TokenRegistry) -> crate::ast::token::TokenId {
        let file = tokens.register_file("t.tau", "x");
        tokens.token_init(file, TokenKind::Ident, BytePos(0))
    }

    #[test]
    fn break_outside_loop_is_reported() {
        let mut registry = AstRegistry::new();
        let mut tokens = TokenRegistry::new();
        let t = tok(&mut tokens);

        let brk = registry.register(Node::new(
            NodeKind::StmtBreak(StmtBreak { target: Cell::new(None) }),
            t,
        ));
        let block = registry.register(Node::new(
            NodeKind::StmtBlock(StmtBlock {
                stmts: smallvec::smallvec![brk],
                scope: Cell::new(None),
            }),
            t,
        ));

        let mut bag = ErrorBag::new();
        let mut cfa = ControlFlow::new(&registry, &tokens, &mut bag);
        cfa.visit_block(block);

        assert!(bag.has_errors());
    }

    #[test]
    fn break_inside_loop_resolves_its_target() {
        let mut registry = AstRegistry::new();
        let mut tokens = TokenRegistry::new();
        let t = tok(&mut tokens);

        let brk = registry.register(Node::new(
            NodeKind::StmtBreak(StmtBreak { target: Cell::new(None) }),
            t,
        ));
        let inner_block = registry.register(Node::new(
            NodeKind::StmtBlock(StmtBlock {
                stmts: smallvec::smallvec![brk],
                scope: Cell::new(None),
            }),
            t,
        ));
        let loop_stmt = registry.register(Node::new(
            NodeKind::StmtLoop(StmtLoop { body: inner_block }),
            t,
        ));

        let mut bag = ErrorBag::new();
        let mut cfa = ControlFlow::new(&registry, &tokens, &mut bag);
        cfa.visit_stmt(loop_stmt, true);

        assert!(!bag.has_errors());
        let NodeKind::StmtBreak(b) = &registry.get(brk).kind else {
            unreachable!()
        };
        assert_eq!(b.target.get(), Some(loop_stmt));
    }

    #[test]
    fn code_after_return_is_unreachable() {
        let mut registry = AstRegistry::new();
        let mut tokens = TokenRegistry::new();
        let t = tok(&mut tokens);

        let ret = registry.register(Node::new(NodeKind::StmtReturn(StmtReturn { value: None }), t));
        let ident = registry.register(Node::new(NodeKind::Ident(Ident { name: "x".into() }), t));
        let expr = registry.register(Node::new(NodeKind::ExprId(crate::ast::node::ExprId { id: ident }), t));
        let dead = registry.register(Node::new(NodeKind::StmtExpr(StmtExpr { expr }), t));
        let block = registry.register(Node::new(
            NodeKind::StmtBlock(StmtBlock {
                stmts: smallvec::smallvec![ret, dead],
                scope: Cell::new(None),
            }),
            t,
        ));

        let mut bag = ErrorBag::new();
        let mut cfa = ControlFlow::new(&registry, &tokens, &mut bag);
        cfa.visit_block(block);

        assert!(bag.has_errors());
    }

    #[test]
    fn missing_return_flagged_for_non_unit_function_falling_off_the_end() {
        let mut registry = AstRegistry::new();
        let mut tokens = TokenRegistry::new();
        let t = tok(&mut tokens);

        let block = registry.register(Node::new(
            NodeKind::StmtBlock(StmtBlock {
                stmts: Default::default(),
                scope: Cell::new(None),
            }),
            t,
        ));
        let i32_ty = registry.register(Node::new(NodeKind::TypePrim(PrimKind::I32), t));
        let name = registry.register(Node::new(NodeKind::Ident(Ident { name: "f".into() }), t));
        let fun = registry.register(Node::new(
            NodeKind::DeclFun(DeclFun {
                id: name,
                is_pub: Visibility::Private,
                params: Default::default(),
                ret_ty: Some(i32_ty),
                body: Some(block),
                scope: Cell::new(None),
            }),
            t,
        ));

        let mut bag = ErrorBag::new();
        let mut cfa = ControlFlow::new(&registry, &tokens, &mut bag);
        cfa.check_fun(fun, Some(i32_ty), block);

        assert!(bag.has_errors());
    }

    #[test]
    fn for_loop_body_never_satisfies_missing_return_on_its_own() {
        let mut registry = AstRegistry::new();
        let mut tokens = TokenRegistry::new();
        let t = tok(&mut tokens);

        let inner = registry.register(Node::new(
            NodeKind::StmtBlock(StmtBlock {
                stmts: Default::default(),
                scope: Cell::new(None),
            }),
            t,
        ));
        let for_stmt = registry.register(Node::new(
            NodeKind::StmtFor(StmtFor {
                init: None,
                cond: None,
                step: None,
                body: inner,
            }),
            t,
        ));
        let body = registry.register(Node::new(
            NodeKind::StmtBlock(StmtBlock {
                stmts: smallvec::smallvec![for_stmt],
                scope: Cell::new(None),
            }),
            t,
        ));

        let mut bag = ErrorBag::new();
        let cfa = ControlFlow::new(&registry, &tokens, &mut bag);
        assert!(!cfa.terminates(body));
    }
}
