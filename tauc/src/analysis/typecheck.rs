//! Type-checking pass.
//!
//! Depth-first post-order: every node consumes its already-computed
//! children types and produces its own, which is written both to the
//! node's own `ty` slot (the annotation every AST node header carries) and
//! to the [`TypeTable`] (a separate side-table keyed by `NodeId`, useful
//! for later passes that want a type without holding a node reference).
//! Poison propagates silently: once any operand's type is `poison`, the
//! parent's type is `poison` too and no further diagnostic fires for that
//! subtree.

use crate::ast::node::{
    BinaryOpKind, FloatSuffix, IntSuffix, Node, NodeKind, PrimKind, UnaryOpKind, Visibility,
};
use crate::ast::registry::{AstRegistry, NodeId};
use crate::ast::token::TokenRegistry;
use crate::config::CompilerConfig;
use crate::diagnostics::bag::ErrorBag;
use crate::diagnostics::kind::DiagnosticKind;
use crate::symtab::scope::ScopeArena;
use crate::types::builder::TypeBuilder;
use crate::types::desc::{TypeDesc, TypeId};
use crate::types::table::TypeTable;

pub struct TypeCheck<'a> {
    registry: &'a mut AstRegistry,
    tokens: &'a TokenRegistry,
    scopes: &'a mut ScopeArena,
    builder: &'a mut TypeBuilder,
    table: &'a mut TypeTable,
    bag: &'a mut ErrorBag,
    config: CompilerConfig,
    generics: crate::analysis::generics::GenericInstantiations,
}

impl<'a> TypeCheck<'a> {
    pub fn new(
        registry: &'a mut AstRegistry,
        tokens: &'a TokenRegistry,
        scopes: &'a mut ScopeArena,
        builder: &'a mut TypeBuilder,
        table: &'a mut TypeTable,
        bag: &'a mut ErrorBag,
    ) -> Self {
        Self {
            registry,
            tokens,
            scopes,
            builder,
            table,
            bag,
            config: CompilerConfig::default(),
            generics: crate::analysis::generics::GenericInstantiations::new(),
        }
    }

    pub fn with_config(mut self, config: CompilerConfig) -> Self {
        self.config = config;
        self
    }

    fn node(&self, id: NodeId) -> &Node {
        self.registry.get(id)
    }

    fn report(&mut self, kind: DiagnosticKind, at: NodeId) {
        let loc = self.tokens.locate(self.node(at).token);
        self.bag.push(kind, loc);
    }

    fn set_ty(&mut self, id: NodeId, ty: TypeId) {
        self.node(id).ty.set(Some(ty));
        self.table.insert(id, ty);
    }

    fn ty_of(&self, id: NodeId) -> TypeId {
        self.node(id)
            .ty
            .get()
            .expect("typecheck visits children before their parent")
    }

    fn poison(&mut self) -> TypeId {
        self.builder.build_poison()
    }

    /// Runs the pass over the declarations held by a `prog`/module-body
    /// scope, in the same pre-order-over-declarations / post-order-over-
    /// expressions split the AST contract requires.
    pub fn run(&mut self, prog: NodeId) {
        let NodeKind::Prog(p) = &self.node(prog).kind else {
            panic!("typecheck::run expects a prog node");
        };
        let decls = p.decls.clone();
        for decl in decls {
            self.eval_decl_type(decl);
        }
    }

    // -- Declaration / nominal type evaluation -----------------------------

    /// Computes (and memoizes in the type table) the type a declaration
    /// denotes when referenced: a composite's own nominal type, a
    /// function's signature type, or a variable's stored type. Safe to
    /// call repeatedly — a cache hit short-circuits immediately, which is
    /// what lets type-declaration references forward-reference freely.
    pub fn eval_decl_type(&mut self, decl: NodeId) -> TypeId {
        if let Some(ty) = self.table.get(decl) {
            return ty;
        }

        let ty = match &self.node(decl).kind {
            NodeKind::DeclStruct(d) => {
                let fields = d.fields.clone();
                let field_tys: Vec<TypeId> = fields
                    .iter()
                    .map(|&f| self.eval_field_type(f))
                    .collect();
                self.builder.build_struct(decl, field_tys)
            }
            NodeKind::DeclUnion(d) => {
                let fields = d.fields.clone();
                let field_tys: Vec<TypeId> = fields
                    .iter()
                    .map(|&f| self.eval_field_type(f))
                    .collect();
                self.builder.build_union(decl, field_tys)
            }
            NodeKind::DeclEnum(d) => {
                let constants = d.constants.clone();
                let ty = self.builder.build_enum(decl);
                for c in constants {
                    self.set_ty(c, ty);
                    if let NodeKind::DeclEnumConstant(ec) = &self.node(c).kind {
                        if let Some(value) = ec.value {
                            self.visit_expr(value);
                        }
                    }
                }
                ty
            }
            NodeKind::DeclFun(d) => {
                let params = d.params.clone();
                let ret_ty = d.ret_ty;
                let param_tys: Vec<TypeId> = params
                    .iter()
                    .map(|&p| self.eval_param_type(p))
                    .collect();
                let ret = match ret_ty {
                    Some(t) => self.eval_type_node(t),
                    None => self.builder.build_prim(PrimKind::Unit),
                };
                self.builder.build_fun(param_tys, ret)
            }
            NodeKind::DeclVar(d) => {
                let (explicit_ty, init) = (d.ty, d.init);
                let ty = match explicit_ty {
                    Some(t) => {
                        let declared = self.eval_type_node(t);
                        if let Some(init) = init {
                            self.visit_expr(init);
                            let init_ty = self.ty_of(init);
                            if !self.builder.is_implicitly_direct_convertible(init_ty, declared) {
                                self.report(
                                    DiagnosticKind::TypeMismatch {
                                        expected: declared,
                                        actual: init_ty,
                                    },
                                    init,
                                );
                            }
                        }
                        declared
                    }
                    None => {
                        let init = init.expect("var without a type annotation must have an initializer");
                        self.visit_expr(init);
                        self.ty_of(init)
                    }
                };
                ty
            }
            NodeKind::DeclParam(_) => self.eval_param_type(decl),
            NodeKind::DeclGenericParam(_) => self.poison(),
            _ => self.poison(),
        };
        self.set_ty(decl, ty);
        ty
    }

    fn eval_field_type(&mut self, field: NodeId) -> TypeId {
        let ty_node = match &self.node(field).kind {
            NodeKind::DeclField(f) => f.ty,
            other => panic!("expected a struct/union field, found {}", other.name()),
        };
        let ty = self.eval_type_node(ty_node);
        self.set_ty(field, ty);
        ty
    }

    fn eval_param_type(&mut self, param: NodeId) -> TypeId {
        let (ty_node, default) = match &self.node(param).kind {
            NodeKind::DeclParam(p) => (p.ty, p.default),
            other => panic!("expected a parameter, found {}", other.name()),
        };
        let ty = self.eval_type_node(ty_node);
        self.set_ty(param, ty);
        if let Some(default) = default {
            self.visit_expr(default);
            let default_ty = self.ty_of(default);
            if !self.builder.is_implicitly_direct_convertible(default_ty, ty) {
                self.report(
                    DiagnosticKind::TypeMismatch {
                        expected: ty,
                        actual: default_ty,
                    },
                    default,
                );
            }
        }
        ty
    }

    /// Parameters have no dedicated mutability flag in the AST (unlike
    /// `var`, which carries `is_mut`); a parameter binding is mutable only
    /// when its declared type is itself written `mut T`.
    fn param_is_mut(&self, param: NodeId) -> bool {
        let ty = self.table.get(param).unwrap_or_else(|| {
            panic!("param_is_mut requires the parameter's type to already be computed")
        });
        self.builder.is_mut(ty)
    }

    // -- Type-annotation AST -> TypeId --------------------------------------

    /// Evaluates a `type_*` AST node into an interned [`TypeId`]. The
    /// surface grammar is assumed to reject modifier nestings the builder
    /// would otherwise refuse (`ptr(ref _)` etc.); a refusal here falls
    /// back to `poison` defensively rather than inventing a diagnostic
    /// kind outside the taxonomy.
    fn eval_type_node(&mut self, id: NodeId) -> TypeId {
        match &self.node(id).kind {
            NodeKind::TypePrim(p) => self.builder.build_prim(*p),
            NodeKind::TypePtr(t) => {
                let base = self.eval_type_node(t.base);
                self.builder.build_ptr(base).unwrap_or_else(|| self.poison())
            }
            NodeKind::TypeRef(t) => {
                let base = self.eval_type_node(t.base);
                self.builder.build_ref(base).unwrap_or_else(|| self.poison())
            }
            NodeKind::TypeMut(t) => {
                let base = self.eval_type_node(t.base);
                self.builder.build_mut(base).unwrap_or_else(|| self.poison())
            }
            NodeKind::TypeOpt(t) => {
                let base = self.eval_type_node(t.base);
                self.builder.build_opt(base).unwrap_or_else(|| self.poison())
            }
            NodeKind::TypeArray(t) => {
                let (base_node, size_node) = (t.base, t.size);
                let base = self.eval_type_node(base_node);
                self.visit_expr(size_node);
                let len = self.const_int_value(size_node).unwrap_or(0);
                self.builder.build_array(base, len)
            }
            NodeKind::TypeVec(t) => {
                let (base_node, size) = (t.base, t.size);
                let base = self.eval_type_node(base_node);
                self.builder.build_vec(base, size)
            }
            NodeKind::TypeMat(t) => {
                let (base_node, rows, cols) = (t.base, t.rows, t.cols);
                let base = self.eval_type_node(base_node);
                self.builder.build_mat(base, rows, cols)
            }
            NodeKind::TypeFun(t) => {
                let (params, ret) = (t.params.clone(), t.ret);
                let param_tys: Vec<TypeId> = params.iter().map(|&p| self.eval_type_node(p)).collect();
                let ret_ty = self.eval_type_node(ret);
                self.builder.build_fun(param_tys, ret_ty)
            }
            NodeKind::TypeMember(t) => {
                // Scoping for `owner.Member` type paths is already fully
                // resolved by nameres (through the owner's own path
                // structure); the member node alone carries the answer.
                self.eval_type_node(t.member)
            }
            NodeKind::TypeDeclRef(t) => {
                let path = t.path;
                match self.node(path).resolved.get() {
                    Some(decl) => self.eval_decl_type(decl),
                    None => self.poison(),
                }
            }
            NodeKind::TypeGenericSpec(t) => {
                let (callee, args) = (t.callee, t.args.clone());
                self.eval_generic_spec(callee, &args)
            }
            other => panic!("eval_type_node called on non-type node {}", other.name()),
        }
    }

    /// Best-effort constant-expression evaluation for array lengths. Only
    /// literal integers are folded; anything else is out of scope for
    /// this pass (no dedicated constant-folding module is specified) and
    /// falls back to a zero-length placeholder.
    fn const_int_value(&self, id: NodeId) -> Option<u64> {
        match &self.node(id).kind {
            NodeKind::ExprLitInt(lit) => u64::try_from(lit.value).ok(),
            _ => None,
        }
    }

    fn eval_generic_spec(&mut self, callee: NodeId, args: &[NodeId]) -> TypeId {
        let Some(generic_decl) = self.node(callee).resolved.get() else {
            return self.poison();
        };
        if !matches!(self.node(generic_decl).kind, NodeKind::DeclGeneric(_)) {
            self.report(
                DiagnosticKind::NotGeneric {
                    name: String::new(),
                },
                callee,
            );
            return self.poison();
        }
        let expected_arity = match &self.node(generic_decl).kind {
            NodeKind::DeclGeneric(g) => g.params.len(),
            _ => unreachable!(),
        };
        if args.len() != expected_arity {
            self.report(
                DiagnosticKind::GenericArityMismatch {
                    expected: expected_arity,
                    actual: args.len(),
                },
                callee,
            );
            return self.poison();
        }
        let arg_tys: Vec<TypeId> = args.iter().map(|&a| self.eval_generic_arg(a)).collect();

        // Clones the generic's inner declaration into a fresh scope (on a
        // cache miss) keyed by (generic, canonical argument tuple), then
        // re-runs nameres/typecheck over just the clone. Structural
        // substitution of the type parameters themselves into the clone's
        // body is deferred to codegen, which reads the argument list
        // directly off the `generic_spec` node; this memoizes the
        // specialization's own nominal type.
        let clone = self.generics.instantiate(
            self.registry,
            self.tokens,
            self.scopes,
            self.builder,
            self.table,
            self.bag,
            generic_decl,
            arg_tys,
        );
        self.eval_decl_type(clone)
    }

    fn eval_generic_arg(&mut self, id: NodeId) -> TypeId {
        if self.is_type_node(id) {
            self.eval_type_node(id)
        } else {
            self.visit_expr(id);
            self.ty_of(id)
        }
    }

    fn is_type_node(&self, id: NodeId) -> bool {
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

    // -- Statements ----------------------------------------------------------

    pub fn visit_stmt(&mut self, id: NodeId) {
        match &self.node(id).kind {
            NodeKind::StmtIf(s) => {
                let (cond, then_b, else_b) = (s.cond, s.then_branch, s.else_branch);
                self.visit_expr(cond);
                self.check_bool(cond);
                self.visit_stmt(then_b);
                if let Some(else_b) = else_b {
                    self.visit_stmt(else_b);
                }
            }
            NodeKind::StmtFor(s) => {
                let (init, cond, step, body) = (s.init, s.cond, s.step, s.body);
                if let Some(init) = init {
                    self.eval_decl_type(init);
                }
                if let Some(cond) = cond {
                    self.visit_expr(cond);
                    self.check_bool(cond);
                }
                if let Some(step) = step {
                    self.visit_expr(step);
                }
                self.visit_stmt(body);
            }
            NodeKind::StmtWhile(s) => {
                let (cond, body) = (s.cond, s.body);
                self.visit_expr(cond);
                self.check_bool(cond);
                self.visit_stmt(body);
            }
            NodeKind::StmtDoWhile(s) => {
                let (body, cond) = (s.body, s.cond);
                self.visit_stmt(body);
                self.visit_expr(cond);
                self.check_bool(cond);
            }
            NodeKind::StmtLoop(s) => self.visit_stmt(s.body),
            NodeKind::StmtBreak(_) | NodeKind::StmtContinue(_) => {}
            NodeKind::StmtReturn(s) => {
                if let Some(value) = s.value {
                    self.visit_expr(value);
                }
            }
            NodeKind::StmtDefer(s) => self.visit_stmt(s.body),
            NodeKind::StmtBlock(s) => {
                let stmts = s.stmts.clone();
                for stmt in stmts {
                    self.visit_item(stmt);
                }
            }
            NodeKind::StmtExpr(s) => self.visit_expr(s.expr),
            other => panic!("visit_stmt called on non-stmt node {}", other.name()),
        }
    }

    fn visit_item(&mut self, id: NodeId) {
        match &self.node(id).kind {
            NodeKind::DeclVar(_)
            | NodeKind::DeclFun(_)
            | NodeKind::DeclStruct(_)
            | NodeKind::DeclUnion(_)
            | NodeKind::DeclEnum(_)
            | NodeKind::DeclMod(_)
            | NodeKind::DeclGeneric(_) => {
                self.eval_decl_type(id);
            }
            NodeKind::Use(_) => {}
            _ => self.visit_stmt(id),
        }
    }

    fn check_bool(&mut self, id: NodeId) {
        let ty = self.ty_of(id);
        if self.builder.is_poison(ty) {
            return;
        }
        if self.builder.get(ty) != &TypeDesc::Prim(PrimKind::Bool) {
            self.report(DiagnosticKind::ExpectedBool { actual: ty }, id);
        }
    }

    // -- Expressions -----------------------------------------------------------

    pub fn visit_expr(&mut self, id: NodeId) {
        let ty = match &self.node(id).kind {
            NodeKind::ExprId(e) => self.visit_expr_id(id, e.id),
            NodeKind::ExprLitInt(lit) => {
                let (value, suffix) = (lit.value, lit.suffix);
                self.builder.build_prim(int_lit_prim(value, suffix))
            }
            NodeKind::ExprLitFlt(lit) => self.builder.build_prim(flt_lit_prim(lit.suffix)),
            NodeKind::ExprLitStr(_) => {
                let u8t = self.builder.build_prim(PrimKind::U8);
                self.builder.build_ptr(u8t).expect("ptr(u8) is always well-formed")
            }
            NodeKind::ExprLitChar(_) => self.builder.build_prim(PrimKind::Char),
            NodeKind::ExprLitBool(_) => self.builder.build_prim(PrimKind::Bool),
            NodeKind::ExprLitNull => self.builder.build_null(),
            NodeKind::ExprLitVec(e) => {
                let elems = e.elems.clone();
                self.visit_lit_aggregate(id, &elems, AggregateShape::Vec)
            }
            NodeKind::ExprLitMat(e) => {
                let (rows, cols, elems) = (e.rows, e.cols, e.elems.clone());
                self.visit_lit_mat(id, rows, cols, &elems)
            }
            NodeKind::ExprUnaryOp(e) => {
                let (op, operand, _postfix) = (e.op, e.operand, e.postfix);
                self.visit_unary(id, op, operand)
            }
            NodeKind::ExprBinaryOp(e) => {
                let (op, lhs, rhs) = (e.op, e.lhs, e.rhs);
                self.visit_binary(id, op, lhs, rhs)
            }
            NodeKind::ExprCall(e) => {
                let (callee, args) = (e.callee, e.args.clone());
                self.visit_call(id, callee, &args)
            }
            NodeKind::ExprGenericSpec(e) => {
                let (callee, args) = (e.callee, e.args.clone());
                let args_vec: Vec<NodeId> = args.into_iter().collect();
                self.eval_generic_spec(callee, &args_vec)
            }
            NodeKind::ExprDecl(e) => {
                let decl = e.decl;
                self.eval_decl_type(decl)
            }
            other => panic!("visit_expr called on non-expr node {}", other.name()),
        };
        self.set_ty(id, ty);
    }

    fn visit_expr_id(&mut self, id: NodeId, ident: NodeId) -> TypeId {
        let _ = ident;
        let Some(decl) = self.node(id).resolved.get() else {
            // Already diagnosed by nameres as `undefined_symbol`.
            return self.poison();
        };
        match &self.node(decl).kind {
            NodeKind::DeclVar(d) => {
                let base = self.eval_decl_type(decl);
                self.wrap_ref(base, d.is_mut)
            }
            NodeKind::DeclParam(_) => {
                let base = self.eval_decl_type(decl);
                let is_mut = self.param_is_mut(decl);
                self.wrap_ref(base, is_mut)
            }
            NodeKind::DeclFun(_) | NodeKind::DeclStruct(_) | NodeKind::DeclUnion(_) | NodeKind::DeclEnum(_) => {
                let base = self.eval_decl_type(decl);
                self.wrap_ref(base, false)
            }
            NodeKind::DeclEnumConstant(_) => self.eval_decl_type(decl),
            _ => self.poison(),
        }
    }

    fn wrap_ref(&mut self, base: TypeId, is_mut: bool) -> TypeId {
        let inner = if is_mut {
            self.builder.build_mut(base).unwrap_or(base)
        } else {
            base
        };
        self.builder.build_ref(inner).unwrap_or(inner)
    }

    fn visit_lit_aggregate(&mut self, _id: NodeId, elems: &[NodeId], _shape: AggregateShape) -> TypeId {
        if elems.is_empty() {
            return self.poison();
        }
        for &e in elems {
            self.visit_expr(e);
        }
        let base = self.promote_all(elems);
        let size = elems.len() as u32;
        self.builder.build_vec(base, size)
    }

    fn visit_lit_mat(&mut self, _id: NodeId, rows: u32, cols: u32, elems: &[NodeId]) -> TypeId {
        if elems.is_empty() {
            return self.poison();
        }
        for &e in elems {
            self.visit_expr(e);
        }
        let base = self.promote_all(elems);
        self.builder.build_mat(base, rows, cols)
    }

    fn promote_all(&mut self, elems: &[NodeId]) -> TypeId {
        let mut acc = self.ty_of(elems[0]);
        for &e in &elems[1..] {
            let ty = self.ty_of(e);
            if self.builder.is_poison(acc) || self.builder.is_poison(ty) {
                acc = self.poison();
                continue;
            }
            if !self.builder.is_arithmetic(acc) || !self.builder.is_arithmetic(ty) {
                self.report(DiagnosticKind::ExpectedArithmetic { actual: ty }, e);
                acc = self.poison();
                continue;
            }
            let (promoted, warn) = self.builder.build_promoted_arithmetic(acc, ty);
            if warn && self.config.warn_mixed_signedness {
                self.report(DiagnosticKind::MixedSignedness { lhs: acc, rhs: ty }, e);
            }
            acc = promoted;
        }
        acc
    }

    fn visit_unary(&mut self, id: NodeId, op: UnaryOpKind, operand: NodeId) -> TypeId {
        self.visit_expr(operand);
        let operand_ty = self.ty_of(operand);
        if self.builder.is_poison(operand_ty) {
            return self.poison();
        }
        match op {
            UnaryOpKind::Pos | UnaryOpKind::Neg => {
                if !self.builder.is_arithmetic(self.builder.remove_ref_mut(operand_ty)) {
                    self.report(DiagnosticKind::ExpectedArithmetic { actual: operand_ty }, id);
                    return self.poison();
                }
                self.builder.remove_ref_mut(operand_ty)
            }
            UnaryOpKind::Not => {
                let stripped = self.builder.remove_ref_mut(operand_ty);
                if self.builder.get(stripped) != &TypeDesc::Prim(PrimKind::Bool) {
                    self.report(DiagnosticKind::ExpectedBool { actual: operand_ty }, id);
                    return self.poison();
                }
                stripped
            }
            UnaryOpKind::BitNot => {
                let stripped = self.builder.remove_ref_mut(operand_ty);
                if !self.builder.is_integer(stripped) {
                    self.report(DiagnosticKind::ExpectedInteger { actual: operand_ty }, id);
                    return self.poison();
                }
                stripped
            }
            UnaryOpKind::Inc | UnaryOpKind::Dec => {
                if !self.builder.is_ref(operand_ty) || !self.builder.is_mut(self.builder.remove_ref(operand_ty)) {
                    self.report(DiagnosticKind::ExpectedMutable { actual: operand_ty }, id);
                    return self.poison();
                }
                let base = self.builder.remove_ref_mut(operand_ty);
                if !self.builder.is_arithmetic(base) {
                    self.report(DiagnosticKind::ExpectedArithmetic { actual: operand_ty }, id);
                    return self.poison();
                }
                base
            }
            UnaryOpKind::Deref => {
                if !self.builder.is_ptr(operand_ty) {
                    self.report(DiagnosticKind::ExpectedPointer { actual: operand_ty }, id);
                    return self.poison();
                }
                let base = match self.builder.get(operand_ty) {
                    TypeDesc::Ptr(b) => *b,
                    _ => unreachable!(),
                };
                self.builder.build_ref(base).unwrap_or(base)
            }
            UnaryOpKind::AddrOf => {
                if !self.builder.is_ref(operand_ty) {
                    self.report(DiagnosticKind::ExpectedReference { actual: operand_ty }, id);
                    return self.poison();
                }
                let base = match self.builder.get(operand_ty) {
                    TypeDesc::Ref(b) => *b,
                    _ => unreachable!(),
                };
                self.builder.build_ptr(base).unwrap_or(base)
            }
            UnaryOpKind::Sizeof | UnaryOpKind::Alignof => self.builder.build_prim(PrimKind::Usize),
            UnaryOpKind::UnwrapUnsafe => {
                let stripped = self.builder.remove_ref_mut(operand_ty);
                if !self.builder.is_opt(stripped) {
                    self.report(DiagnosticKind::ExpectedOptional { actual: operand_ty }, id);
                    return self.poison();
                }
                match self.builder.get(stripped) {
                    TypeDesc::Opt(b) => *b,
                    _ => unreachable!(),
                }
            }
        }
    }

    fn visit_binary(&mut self, id: NodeId, op: BinaryOpKind, lhs: NodeId, rhs: NodeId) -> TypeId {
        if op == BinaryOpKind::DirectAccess {
            return self.visit_direct_access(id, lhs, rhs);
        }
        if op == BinaryOpKind::Subscript {
            self.visit_expr(lhs);
            self.visit_expr(rhs);
            return self.visit_subscript(id, lhs, rhs);
        }

        self.visit_expr(lhs);
        self.visit_expr(rhs);
        let (lty, rty) = (self.ty_of(lhs), self.ty_of(rhs));
        if self.builder.is_poison(lty) || self.builder.is_poison(rty) {
            return self.poison();
        }

        use BinaryOpKind::*;
        match op {
            Add | Sub | Mul | Div | Rem => self.check_promoted_arithmetic(id, lty, rty, false),
            BitAnd | BitOr | BitXor | Shl | Shr => self.check_promoted_arithmetic(id, lty, rty, true),
            Eq | Ne | Lt | Le | Gt | Ge => self.check_comparison(id, lty, rty),
            And | Or => {
                let bool_ty = self.builder.build_prim(PrimKind::Bool);
                if self.builder.get(lty) != &TypeDesc::Prim(PrimKind::Bool) {
                    self.report(DiagnosticKind::ExpectedBool { actual: lty }, lhs);
                    return self.poison();
                }
                if self.builder.get(rty) != &TypeDesc::Prim(PrimKind::Bool) {
                    self.report(DiagnosticKind::ExpectedBool { actual: rty }, rhs);
                    return self.poison();
                }
                bool_ty
            }
            Assign | AddAssign | SubAssign | MulAssign | DivAssign | RemAssign | BitAndAssign
            | BitOrAssign | BitXorAssign | ShlAssign | ShrAssign => {
                self.check_assignment(id, lhs, rhs, lty, rty)
            }
            Subscript | DirectAccess => unreachable!("handled above"),
        }
    }

    fn check_promoted_arithmetic(&mut self, id: NodeId, lty: TypeId, rty: TypeId, integer_only: bool) -> TypeId {
        let check = if integer_only {
            TypeBuilder::is_integer
        } else {
            TypeBuilder::is_arithmetic
        };
        let stripped_l = self.builder.remove_ref_mut(lty);
        let stripped_r = self.builder.remove_ref_mut(rty);
        if !check(self.builder, stripped_l) {
            self.report(
                if integer_only {
                    DiagnosticKind::ExpectedInteger { actual: lty }
                } else {
                    DiagnosticKind::ExpectedArithmetic { actual: lty }
                },
                id,
            );
            return self.poison();
        }
        if !check(self.builder, stripped_r) {
            self.report(
                if integer_only {
                    DiagnosticKind::ExpectedInteger { actual: rty }
                } else {
                    DiagnosticKind::ExpectedArithmetic { actual: rty }
                },
                id,
            );
            return self.poison();
        }
        let (promoted, warn) = self.builder.build_promoted_arithmetic(stripped_l, stripped_r);
        if warn && self.config.warn_mixed_signedness {
            self.report(
                DiagnosticKind::MixedSignedness {
                    lhs: stripped_l,
                    rhs: stripped_r,
                },
                id,
            );
        }
        promoted
    }

    fn check_comparison(&mut self, id: NodeId, lty: TypeId, rty: TypeId) -> TypeId {
        let bool_ty = self.builder.build_prim(PrimKind::Bool);
        let stripped_l = self.builder.remove_ref_mut(lty);
        let stripped_r = self.builder.remove_ref_mut(rty);
        if self.builder.is_arithmetic(stripped_l) && self.builder.is_arithmetic(stripped_r) {
            return bool_ty;
        }
        if let (TypeDesc::Vec(base_l, n_l), TypeDesc::Vec(base_r, n_r)) =
            (self.builder.get(stripped_l).clone(), self.builder.get(stripped_r).clone())
        {
            if base_l == base_r && n_l == n_r {
                return bool_ty;
            }
        }
        self.report(
            DiagnosticKind::TypeMismatch {
                expected: stripped_l,
                actual: stripped_r,
            },
            id,
        );
        self.poison()
    }

    fn check_assignment(&mut self, id: NodeId, lhs: NodeId, _rhs: NodeId, lty: TypeId, rty: TypeId) -> TypeId {
        if !self.builder.is_ref(lty) || !self.builder.is_mut(self.builder.remove_ref(lty)) {
            self.report(DiagnosticKind::ExpectedMutable { actual: lty }, lhs);
            return self.poison();
        }
        let target = self.builder.remove_ref_mut(lty);
        if !self.builder.is_implicitly_direct_convertible(rty, target) {
            self.report(
                DiagnosticKind::TypeMismatch {
                    expected: target,
                    actual: rty,
                },
                id,
            );
            return self.poison();
        }
        lty
    }

    fn visit_subscript(&mut self, id: NodeId, lhs: NodeId, rhs: NodeId) -> TypeId {
        let (lty, rty) = (self.ty_of(lhs), self.ty_of(rhs));
        if self.builder.is_poison(lty) || self.builder.is_poison(rty) {
            return self.poison();
        }
        let stripped = self.builder.remove_ref_mut(lty);
        let elem = match self.builder.get(stripped) {
            TypeDesc::Array(base, _) => *base,
            _ => {
                self.report(DiagnosticKind::ExpectedArray { actual: lty }, lhs);
                return self.poison();
            }
        };
        if !self.builder.is_integer(self.builder.remove_ref_mut(rty)) {
            self.report(DiagnosticKind::ExpectedInteger { actual: rty }, rhs);
            return self.poison();
        }
        self.builder.build_ref(elem).unwrap_or(elem)
    }

    fn visit_direct_access(&mut self, id: NodeId, lhs: NodeId, rhs: NodeId) -> TypeId {
        self.visit_expr(lhs);
        let lty = self.ty_of(lhs);
        if self.builder.is_poison(lty) {
            return self.poison();
        }
        let is_mut_access = self.builder.is_mut(self.builder.remove_ref(lty));
        let stripped = self.builder.remove_ref_mut(lty);

        let member_name = match &self.node(rhs).kind {
            NodeKind::Ident(i) => i.name.clone(),
            other => panic!("direct-access member must be a bare ident, found {}", other.name()),
        };

        match self.builder.get(stripped).clone() {
            TypeDesc::Struct(decl, _) | TypeDesc::Union(decl, _) => {
                self.access_field(id, decl, &member_name, is_mut_access)
            }
            TypeDesc::Enum(decl) => self.access_enum_constant(id, decl, &member_name),
            _ => {
                self.report(
                    DiagnosticKind::UnknownMember {
                        owner: String::new(),
                        member: member_name,
                    },
                    id,
                );
                self.poison()
            }
        }
    }

    fn access_field(&mut self, id: NodeId, decl: NodeId, name: &str, is_mut_access: bool) -> TypeId {
        let fields = match &self.node(decl).kind {
            NodeKind::DeclStruct(d) => d.fields.clone(),
            NodeKind::DeclUnion(d) => d.fields.clone(),
            _ => unreachable!("only struct/union decls reach access_field"),
        };
        for field in fields {
            let (ident, is_pub) = match &self.node(field).kind {
                NodeKind::DeclField(f) => (f.id, f.is_pub),
                _ => continue,
            };
            let field_name = match &self.node(ident).kind {
                NodeKind::Ident(i) => i.name.as_str(),
                _ => continue,
            };
            if field_name == name {
                if is_pub == Visibility::Private {
                    self.report(
                        DiagnosticKind::PrivateMember {
                            owner: String::new(),
                            member: name.to_string(),
                        },
                        id,
                    );
                    return self.poison();
                }
                let base = self.eval_decl_type(field);
                return self.wrap_ref(base, is_mut_access);
            }
        }
        self.report(
            DiagnosticKind::UnknownMember {
                owner: String::new(),
                member: name.to_string(),
            },
            id,
        );
        self.poison()
    }

    fn access_enum_constant(&mut self, id: NodeId, decl: NodeId, name: &str) -> TypeId {
        let constants = match &self.node(decl).kind {
            NodeKind::DeclEnum(d) => d.constants.clone(),
            _ => unreachable!(),
        };
        for c in constants {
            let ident = match &self.node(c).kind {
                NodeKind::DeclEnumConstant(ec) => ec.id,
                _ => continue,
            };
            let cname = match &self.node(ident).kind {
                NodeKind::Ident(i) => i.name.as_str(),
                _ => continue,
            };
            if cname == name {
                return self.eval_decl_type(decl);
            }
        }
        self.report(
            DiagnosticKind::UnknownMember {
                owner: String::new(),
                member: name.to_string(),
            },
            id,
        );
        self.poison()
    }

    fn visit_call(&mut self, id: NodeId, callee: NodeId, args: &[NodeId]) -> TypeId {
        self.visit_expr(callee);
        for &arg in args {
            self.visit_expr(arg);
        }
        let callee_ty = self.ty_of(callee);
        if self.builder.is_poison(callee_ty) {
            return self.poison();
        }
        let stripped = self.builder.remove_ref_mut(callee_ty);
        let (param_tys, ret) = match self.builder.get(stripped).clone() {
            TypeDesc::Fun(params, ret) => (params, ret),
            _ => {
                self.report(DiagnosticKind::ExpectedCallable { actual: callee_ty }, callee);
                return self.poison();
            }
        };

        let variadic = self
            .node(callee)
            .resolved
            .get()
            .map(|decl| self.is_variadic_fun(decl))
            .unwrap_or(false);

        if variadic {
            if args.len() + 1 < param_tys.len() {
                self.report(
                    DiagnosticKind::ArityMismatch {
                        expected: param_tys.len(),
                        actual: args.len(),
                    },
                    id,
                );
                return self.poison();
            }
        } else if args.len() != param_tys.len() {
            self.report(
                DiagnosticKind::ArityMismatch {
                    expected: param_tys.len(),
                    actual: args.len(),
                },
                id,
            );
            return self.poison();
        }

        let fixed = if variadic { param_tys.len().saturating_sub(1) } else { param_tys.len() };
        for (i, &arg) in args.iter().enumerate().take(fixed) {
            let arg_ty = self.ty_of(arg);
            let expected = param_tys[i];
            if !self.builder.is_poison(arg_ty) && !self.builder.is_implicitly_direct_convertible(arg_ty, expected) {
                self.report(
                    DiagnosticKind::TypeMismatch {
                        expected,
                        actual: arg_ty,
                    },
                    arg,
                );
            }
        }
        ret
    }

    fn is_variadic_fun(&self, decl: NodeId) -> bool {
        match &self.node(decl).kind {
            NodeKind::DeclFun(d) => d
                .params
                .last()
                .map(|&p| matches!(&self.node(p).kind, NodeKind::DeclParam(dp) if dp.variadic))
                .unwrap_or(false),
            _ => false,
        }
    }
}

enum AggregateShape {
    Vec,
}

fn int_lit_prim(value: i128, suffix: IntSuffix) -> PrimKind {
    match suffix {
        IntSuffix::I8 => PrimKind::I8,
        IntSuffix::I16 => PrimKind::I16,
        IntSuffix::I32 => PrimKind::I32,
        IntSuffix::I64 => PrimKind::I64,
        IntSuffix::Isize => PrimKind::Isize,
        IntSuffix::U8 => PrimKind::U8,
        IntSuffix::U16 => PrimKind::U16,
        IntSuffix::U32 => PrimKind::U32,
        IntSuffix::U64 => PrimKind::U64,
        IntSuffix::Usize => PrimKind::Usize,
        IntSuffix::None => {
            if value >= i32::MIN as i128 && value <= i32::MAX as i128 {
                PrimKind::I32
            } else {
                PrimKind::I64
            }
        }
    }
}

fn flt_lit_prim(suffix: FloatSuffix) -> PrimKind {
    match suffix {
        FloatSuffix::F32 => PrimKind::F32,
        FloatSuffix::F64 | FloatSuffix::None => PrimKind::F64,
    }
}
