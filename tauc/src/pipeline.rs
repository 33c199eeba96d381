//! Compilation orchestrator.
//!
//! Owns every registry/arena a compilation needs and drives the four
//! analysis passes in their fixed order: nameres, typecheck, control-flow,
//! mangle. Nothing here re-enters an earlier pass; each stage runs exactly
//! once, sequentially, over the stores this struct owns.

use crate::analysis::cfa::ControlFlow;
use crate::analysis::mangle::{MangleTable, Mangler};
use crate::analysis::nameres::NameRes;
use crate::analysis::typecheck::TypeCheck;
use crate::ast::registry::{AstRegistry, NodeId};
use crate::ast::token::TokenRegistry;
use crate::config::CompilerConfig;
use crate::diagnostics::bag::ErrorBag;
use crate::symtab::scope::{ScopeArena, ScopeId};
use crate::types::builder::TypeBuilder;
use crate::types::table::TypeTable;

/// Everything a single compilation needs, held in one place so each pass
/// can be constructed fresh against it without the caller juggling six
/// separate `&mut` borrows by hand.
pub struct CompilationContext {
    pub registry: AstRegistry,
    pub tokens: TokenRegistry,
    scopes: ScopeArena,
    builder: TypeBuilder,
    table: TypeTable,
    bag: ErrorBag,
    mangled: MangleTable,
    config: CompilerConfig,
}

impl CompilationContext {
    pub fn new(config: CompilerConfig) -> Self {
        Self {
            registry: AstRegistry::new(),
            tokens: TokenRegistry::new(),
            scopes: ScopeArena::new(),
            builder: TypeBuilder::new(),
            table: TypeTable::new(),
            bag: ErrorBag::new(),
            mangled: MangleTable::new(),
            config,
        }
    }

    /// Runs nameres, typecheck, control-flow analysis, and mangling, in
    /// that fixed order, over `prog`. Returns the top-level scope nameres
    /// opened, mirroring `NameRes::run`'s own return value.
    pub fn compile(&mut self, prog: NodeId) -> ScopeId {
        let top = NameRes::new(&self.registry, &self.tokens, &mut self.scopes, &mut self.bag).run(prog);

        TypeCheck::new(
            &mut self.registry,
            &self.tokens,
            &mut self.scopes,
            &mut self.builder,
            &mut self.table,
            &mut self.bag,
        )
        .with_config(self.config.clone())
        .run(prog);

        ControlFlow::new(&self.registry, &self.tokens, &mut self.bag).run(prog);

        Mangler::new(&self.registry, &mut self.mangled).run(prog);

        top
    }

    pub fn bag(&self) -> &ErrorBag {
        &self.bag
    }

    /// Whether the compilation should be reported as failed: any hard
    /// error, or a warning whose kind appears in the config's deny list
    /// (`tauc.toml`'s `deny`). [`ErrorBag::retain_undenied`] is a separate,
    /// printer-facing filter — it trims the listing shown to the user, it
    /// does not decide the exit code.
    pub fn fails_build(&self) -> bool {
        self.bag.has_errors()
            || self.bag.iter().any(|d| self.config.is_denied(d.kind.name()))
    }

    pub fn scopes(&self) -> &ScopeArena {
        &self.scopes
    }

    pub fn type_builder(&self) -> &TypeBuilder {
        &self.builder
    }

    pub fn types(&self) -> &TypeTable {
        &self.table
    }

    pub fn mangled(&self) -> &MangleTable {
        &self.mangled
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::node::{
        DeclFun, DeclVar, ExprLitInt, Ident, IntSuffix, Node, NodeKind, PrimKind, Prog,
        StmtBlock, StmtReturn, Visibility,
    };
    use crate::ast::token::{BytePos, TokenKind};
    use std::cell::Cell;

    fn ident(registry: &mut AstRegistry, tok: crate::ast::token::TokenId, name: &str) -> NodeId {
        registry.register(Node::new(NodeKind::Ident(Ident { name: name.into() }), tok))
    }

    /// `fun main() -> i32 { return 0; }` end to end through every pass.
    #[test]
    fn compiles_a_trivial_function_with_no_diagnostics() {
        let mut registry = AstRegistry::new();
        let mut tokens = TokenRegistry::new();
        let file = tokens.register_file("main.tau", "fun main() -> i32 { return 0; }");
        let tok = tokens.token_init(file, TokenKind::Ident, BytePos(0));

        let ret_ty = registry.register(Node::new(NodeKind::TypePrim(PrimKind::I32), tok));
        let zero = registry.register(Node::new(
            NodeKind::ExprLitInt(ExprLitInt { value: 0, suffix: IntSuffix::None }),
            tok,
        ));
        let ret_stmt = registry.register(Node::new(
            NodeKind::StmtReturn(StmtReturn { value: Some(zero) }),
            tok,
        ));
        let body = registry.register(Node::new(
            NodeKind::StmtBlock(StmtBlock { stmts: smallvec::smallvec![ret_stmt], scope: Cell::new(None) }),
            tok,
        ));
        let fn_name = ident(&mut registry, tok, "main");
        let fun = registry.register(Node::new(
            NodeKind::DeclFun(DeclFun {
                id: fn_name,
                is_pub: Visibility::Public,
                params: Default::default(),
                ret_ty: Some(ret_ty),
                body: Some(body),
                scope: Cell::new(None),
            }),
            tok,
        ));
        let prog = registry.register(Node::new(
            NodeKind::Prog(Prog { decls: smallvec::smallvec![fun], scope: Cell::new(None) }),
            tok,
        ));

        let mut ctx = CompilationContext::new(CompilerConfig::default());
        ctx.registry = registry;
        ctx.tokens = tokens;
        ctx.compile(prog);

        assert!(!ctx.bag().has_errors());
        assert_eq!(ctx.mangled().get(fun).unwrap().dotted(), "main");
    }

    #[test]
    fn missing_return_is_reported_through_the_full_pipeline() {
        let mut registry = AstRegistry::new();
        let mut tokens = TokenRegistry::new();
        let file = tokens.register_file("main.tau", "fun f() -> i32 { }");
        let tok = tokens.token_init(file, TokenKind::Ident, BytePos(0));

        let ret_ty = registry.register(Node::new(NodeKind::TypePrim(PrimKind::I32), tok));
        let body = registry.register(Node::new(
            NodeKind::StmtBlock(StmtBlock { stmts: Default::default(), scope: Cell::new(None) }),
            tok,
        ));
        let fn_name = ident(&mut registry, tok, "f");
        let fun = registry.register(Node::new(
            NodeKind::DeclFun(DeclFun {
                id: fn_name,
                is_pub: Visibility::Public,
                params: Default::default(),
                ret_ty: Some(ret_ty),
                body: Some(body),
                scope: Cell::new(None),
            }),
            tok,
        ));
        let prog = registry.register(Node::new(
            NodeKind::Prog(Prog { decls: smallvec::smallvec![fun], scope: Cell::new(None) }),
            tok,
        ));

        let mut ctx = CompilationContext::new(CompilerConfig::default());
        ctx.registry = registry;
        ctx.tokens = tokens;
        ctx.compile(prog);

        assert!(ctx.bag().has_errors());
    }

    /// `fun f() { var a: i32 = 1; var b: u32 = 2; a + b; }` has exactly one
    /// `mixed_signedness` warning and no hard error. Denying that warning
    /// must flip [`CompilationContext::fails_build`] without touching
    /// [`ErrorBag::has_errors`], which only ever counts hard errors.
    #[test]
    fn deny_listing_a_warning_flips_fails_build_without_becoming_a_hard_error() {
        use crate::ast::node::{BinaryOpKind, ExprBinaryOp, ExprId};

        let build = |deny: Vec<String>| {
            let mut registry = AstRegistry::new();
            let mut tokens = TokenRegistry::new();
            let file = tokens.register_file("main.tau", "fun f() { var a: i32 = 1; var b: u32 = 2; a + b; }");
            let tok = tokens.token_init(file, TokenKind::Ident, BytePos(0));

            let i32_ty = registry.register(Node::new(NodeKind::TypePrim(PrimKind::I32), tok));
            let u32_ty = registry.register(Node::new(NodeKind::TypePrim(PrimKind::U32), tok));
            let one = registry.register(Node::new(
                NodeKind::ExprLitInt(ExprLitInt { value: 1, suffix: IntSuffix::I32 }),
                tok,
            ));
            let two = registry.register(Node::new(
                NodeKind::ExprLitInt(ExprLitInt { value: 2, suffix: IntSuffix::U32 }),
                tok,
            ));
            let a_name = ident(&mut registry, tok, "a");
            let a_decl = registry.register(Node::new(
                NodeKind::DeclVar(DeclVar {
                    id: a_name,
                    is_pub: Visibility::Private,
                    is_mut: false,
                    ty: Some(i32_ty),
                    init: Some(one),
                }),
                tok,
            ));
            let b_name = ident(&mut registry, tok, "b");
            let b_decl = registry.register(Node::new(
                NodeKind::DeclVar(DeclVar {
                    id: b_name,
                    is_pub: Visibility::Private,
                    is_mut: false,
                    ty: Some(u32_ty),
                    init: Some(two),
                }),
                tok,
            ));
            let a_use = registry.register(Node::new(NodeKind::ExprId(ExprId { id: a_name }), tok));
            let b_use = registry.register(Node::new(NodeKind::ExprId(ExprId { id: b_name }), tok));
            let sum = registry.register(Node::new(
                NodeKind::ExprBinaryOp(ExprBinaryOp { op: BinaryOpKind::Add, lhs: a_use, rhs: b_use }),
                tok,
            ));
            let sum_stmt = registry.register(Node::new(
                NodeKind::StmtExpr(crate::ast::node::StmtExpr { expr: sum }),
                tok,
            ));
            let body = registry.register(Node::new(
                NodeKind::StmtBlock(StmtBlock {
                    stmts: smallvec::smallvec![a_decl, b_decl, sum_stmt],
                    scope: Cell::new(None),
                }),
                tok,
            ));
            let fn_name = ident(&mut registry, tok, "f");
            let fun = registry.register(Node::new(
                NodeKind::DeclFun(DeclFun {
                    id: fn_name,
                    is_pub: Visibility::Public,
                    params: Default::default(),
                    ret_ty: None,
                    body: Some(body),
                    scope: Cell::new(None),
                }),
                tok,
            ));
            let prog = registry.register(Node::new(
                NodeKind::Prog(Prog { decls: smallvec::smallvec![fun], scope: Cell::new(None) }),
                tok,
            ));

            let mut config = CompilerConfig::default();
            config.deny = deny;
            let mut ctx = CompilationContext::new(config);
            ctx.registry = registry;
            ctx.tokens = tokens;
            ctx.compile(prog);
            ctx
        };

        let allowed = build(Vec::new());
        assert!(!allowed.bag().has_errors());
        assert!(!allowed.fails_build());

        let denied = build(vec!["mixed_signedness".to_string()]);
        assert!(!denied.bag().has_errors());
        assert!(denied.fails_build());
    }
}
