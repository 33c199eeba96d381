//! A small, hand-built fixture program.
//!
//! Lexing and parsing are kept external to this crate, so there is no
//! source text to feed `tauc` from a file yet — only the builder API
//! ([`crate::ast::registry::AstRegistry::register`]) a future parser would
//! call into. This module is a known-good tree the binary and the
//! benchmark harness can both drive through the pipeline without depending
//! on a parser that doesn't exist yet.

use crate::ast::node::{
    BinaryOpKind, DeclField, DeclFun, DeclParam, DeclStruct, DeclVar, ExprBinaryOp, ExprCall,
    ExprId, ExprLitInt, Ident, IntSuffix, Node, NodeKind, PrimKind, Prog, StmtBlock, StmtReturn,
    Visibility,
};
use crate::ast::registry::{AstRegistry, NodeId};
use crate::ast::token::TokenRegistry;
use std::cell::Cell;

/// Builds:
///
/// ```text
/// struct point { x: i32, y: i32 }
///
/// fun add(a: i32, b: i32) -> i32 {
///     return a + b;
/// }
///
/// fun main() -> i32 {
///     var sum: i32 = add(1, 2);
///     return sum;
/// }
/// ```
///
/// and registers it into `registry`/`tokens`, returning the root `prog`
/// node. Every token shares one dummy source position since nothing here
/// is meant to be located precisely — diagnostics raised against this
/// fixture exist only to exercise the pipeline, not to be read by a human.
pub fn fixture_program(registry: &mut AstRegistry, tokens: &mut TokenRegistry) -> NodeId {
    let file = tokens.register_file(
        "demo.tau",
        "struct point { x: i32, y: i32 }\n\
         fun add(a: i32, b: i32) -> i32 { return a + b; }\n\
         fun main() -> i32 { var sum: i32 = add(1, 2); return sum; }\n",
    );
    let tok = tokens.token_init(file, crate::ast::token::TokenKind::Ident, crate::ast::token::BytePos(0));

    let ident = |registry: &mut AstRegistry, name: &str| {
        registry.register(Node::new(NodeKind::Ident(Ident { name: name.into() }), tok))
    };
    let i32_ty = |registry: &mut AstRegistry| registry.register(Node::new(NodeKind::TypePrim(PrimKind::I32), tok));

    // struct point { x: i32, y: i32 }
    let x_id = ident(registry, "x");
    let x_ty = i32_ty(registry);
    let x_field = registry.register(Node::new(
        NodeKind::DeclField(DeclField { id: x_id, is_pub: Visibility::Public, ty: x_ty }),
        tok,
    ));
    let y_id = ident(registry, "y");
    let y_ty = i32_ty(registry);
    let y_field = registry.register(Node::new(
        NodeKind::DeclField(DeclField { id: y_id, is_pub: Visibility::Public, ty: y_ty }),
        tok,
    ));
    let point_id = ident(registry, "point");
    let point_struct = registry.register(Node::new(
        NodeKind::DeclStruct(DeclStruct {
            id: point_id,
            is_pub: Visibility::Public,
            fields: smallvec::smallvec![x_field, y_field],
            scope: Cell::new(None),
        }),
        tok,
    ));

    // fun add(a: i32, b: i32) -> i32 { return a + b; }
    let a_id = ident(registry, "a");
    let a_ty = i32_ty(registry);
    let a_param = registry.register(Node::new(
        NodeKind::DeclParam(DeclParam { id: a_id, ty: a_ty, default: None, variadic: false }),
        tok,
    ));
    let b_id = ident(registry, "b");
    let b_ty = i32_ty(registry);
    let b_param = registry.register(Node::new(
        NodeKind::DeclParam(DeclParam { id: b_id, ty: b_ty, default: None, variadic: false }),
        tok,
    ));
    let a_use = registry.register(Node::new(NodeKind::ExprId(ExprId { id: a_id }), tok));
    let b_use = registry.register(Node::new(NodeKind::ExprId(ExprId { id: b_id }), tok));
    let sum_expr = registry.register(Node::new(
        NodeKind::ExprBinaryOp(ExprBinaryOp { op: BinaryOpKind::Add, lhs: a_use, rhs: b_use }),
        tok,
    ));
    let add_ret = registry.register(Node::new(NodeKind::StmtReturn(StmtReturn { value: Some(sum_expr) }), tok));
    let add_ret_ty = i32_ty(registry);
    let add_body = registry.register(Node::new(
        NodeKind::StmtBlock(StmtBlock { stmts: smallvec::smallvec![add_ret], scope: Cell::new(None) }),
        tok,
    ));
    let add_id = ident(registry, "add");
    let add_fun = registry.register(Node::new(
        NodeKind::DeclFun(DeclFun {
            id: add_id,
            is_pub: Visibility::Public,
            params: smallvec::smallvec![a_param, b_param],
            ret_ty: Some(add_ret_ty),
            body: Some(add_body),
            scope: Cell::new(None),
        }),
        tok,
    ));

    // fun main() -> i32 { var sum: i32 = add(1, 2); return sum; }
    let add_callee = registry.register(Node::new(NodeKind::ExprId(ExprId { id: add_id }), tok));
    let one = registry.register(Node::new(NodeKind::ExprLitInt(ExprLitInt { value: 1, suffix: IntSuffix::None }), tok));
    let two = registry.register(Node::new(NodeKind::ExprLitInt(ExprLitInt { value: 2, suffix: IntSuffix::None }), tok));
    let call = registry.register(Node::new(
        NodeKind::ExprCall(ExprCall { callee: add_callee, args: smallvec::smallvec![one, two] }),
        tok,
    ));
    let sum_id = ident(registry, "sum");
    let sum_ty = i32_ty(registry);
    let sum_decl = registry.register(Node::new(
        NodeKind::DeclVar(DeclVar { id: sum_id, is_pub: Visibility::Private, is_mut: false, ty: Some(sum_ty), init: Some(call) }),
        tok,
    ));
    let sum_use = registry.register(Node::new(NodeKind::ExprId(ExprId { id: sum_id }), tok));
    let main_ret = registry.register(Node::new(NodeKind::StmtReturn(StmtReturn { value: Some(sum_use) }), tok));
    let main_ret_ty = i32_ty(registry);
    let main_body = registry.register(Node::new(
        NodeKind::StmtBlock(StmtBlock { stmts: smallvec::smallvec![sum_decl, main_ret], scope: Cell::new(None) }),
        tok,
    ));
    let main_id = ident(registry, "main");
    let main_fun = registry.register(Node::new(
        NodeKind::DeclFun(DeclFun {
            id: main_id,
            is_pub: Visibility::Public,
            params: Default::default(),
            ret_ty: Some(main_ret_ty),
            body: Some(main_body),
            scope: Cell::new(None),
        }),
        tok,
    ));

    registry.register(Node::new(
        NodeKind::Prog(Prog { decls: smallvec::smallvec![point_struct, add_fun, main_fun], scope: Cell::new(None) }),
        tok,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompilerConfig;
    use crate::pipeline::CompilationContext;

    #[test]
    fn fixture_program_compiles_without_diagnostics() {
        let mut ctx = CompilationContext::new(CompilerConfig::default());
        let prog = fixture_program(&mut ctx.registry, &mut ctx.tokens);
        ctx.compile(prog);
        assert!(!ctx.bag().has_errors(), "{:?}", ctx.bag().iter().collect::<Vec<_>>());
    }
}
