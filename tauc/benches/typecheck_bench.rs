//! Interning and typecheck throughput benchmark, run as a standalone
//! `criterion` harness (`harness = false` in `Cargo.toml`).

use criterion::{criterion_group, criterion_main, Criterion};
use std::cell::Cell;
use std::hint::black_box;
use tauc::ast::node::{
    BinaryOpKind, DeclVar, ExprBinaryOp, ExprId, ExprLitInt, Ident, IntSuffix, Node, NodeKind,
    PrimKind, Prog, StmtBlock, Visibility,
};
use tauc::ast::registry::{AstRegistry, NodeId};
use tauc::ast::token::{BytePos, TokenKind, TokenRegistry};
use tauc::config::CompilerConfig;
use tauc::pipeline::CompilationContext;
use tauc::types::builder::TypeBuilder;

/// Re-builds the same chain of primitive/`ptr`/`ref`/`mut`/`opt` wrappers
/// `width` times over a single [`TypeBuilder`], so every call after the
/// first is a pure hash-cons lookup.
fn benchmark_repeated_interning(c: &mut Criterion) {
    c.bench_function("intern_repeated_modifier_chain", |b| {
        b.iter(|| {
            let mut builder = TypeBuilder::new();
            for _ in 0..black_box(2_000) {
                let base = builder.build_prim(PrimKind::I32);
                let mutt = builder.build_mut(base).unwrap();
                let reft = builder.build_ref(mutt).unwrap();
                let opt = builder.build_opt(base).unwrap();
                black_box((reft, opt));
            }
        });
    });

    c.bench_function("intern_distinct_array_shapes", |b| {
        b.iter(|| {
            let mut builder = TypeBuilder::new();
            let base = builder.build_prim(PrimKind::I64);
            for len in 0..black_box(2_000u64) {
                black_box(builder.build_array(base, len));
            }
        });
    });
}

/// Builds `fun f() { var v0 = 0; var v1 = v0 + 1; ...; var vN = v(N-1) + 1; }`
/// — a chain of `width` arithmetic additions — and runs it through the full
/// pipeline, exercising nameres + typecheck + cfa + mangle together the way
/// a real translation unit would.
fn build_addition_chain(width: usize) -> (AstRegistry, TokenRegistry, NodeId) {
    let mut registry = AstRegistry::new();
    let mut tokens = TokenRegistry::new();
    let file = tokens.register_file("bench.tau", "fun f() { ... }");
    let tok = tokens.token_init(file, TokenKind::Ident, BytePos(0));

    let mut stmts = smallvec::SmallVec::<[NodeId; 4]>::new();
    let mut prev_name: Option<NodeId> = None;
    for i in 0..width {
        let var_name = registry.register(Node::new(
            NodeKind::Ident(Ident { name: format!("v{i}") }),
            tok,
        ));
        let init = match prev_name {
            None => registry.register(Node::new(
                NodeKind::ExprLitInt(ExprLitInt { value: 0, suffix: IntSuffix::I32 }),
                tok,
            )),
            Some(prev) => {
                let prev_use = registry.register(Node::new(NodeKind::ExprId(ExprId { id: prev }), tok));
                let one = registry.register(Node::new(
                    NodeKind::ExprLitInt(ExprLitInt { value: 1, suffix: IntSuffix::I32 }),
                    tok,
                ));
                registry.register(Node::new(
                    NodeKind::ExprBinaryOp(ExprBinaryOp { op: BinaryOpKind::Add, lhs: prev_use, rhs: one }),
                    tok,
                ))
            }
        };
        let decl = registry.register(Node::new(
            NodeKind::DeclVar(DeclVar {
                id: var_name,
                is_pub: Visibility::Private,
                is_mut: false,
                ty: None,
                init: Some(init),
            }),
            tok,
        ));
        stmts.push(decl);
        prev_name = Some(var_name);
    }

    let body = registry.register(Node::new(
        NodeKind::StmtBlock(StmtBlock { stmts, scope: Cell::new(None) }),
        tok,
    ));
    let fn_name = registry.register(Node::new(NodeKind::Ident(Ident { name: "f".into() }), tok));
    let fun = registry.register(Node::new(
        NodeKind::DeclFun(tauc::ast::node::DeclFun {
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
    (registry, tokens, prog)
}

fn benchmark_pipeline_over_addition_chain(c: &mut Criterion) {
    c.bench_function("pipeline_addition_chain_500", |b| {
        b.iter(|| {
            let (registry, tokens, prog) = build_addition_chain(black_box(500));
            let mut ctx = CompilationContext::new(CompilerConfig::default());
            ctx.registry = registry;
            ctx.tokens = tokens;
            ctx.compile(prog);
            black_box(ctx.bag().len());
        });
    });
}

criterion_group!(
    benches,
    benchmark_repeated_interning,
    benchmark_pipeline_over_addition_chain
);
criterion_main!(benches);
