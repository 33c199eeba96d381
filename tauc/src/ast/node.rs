//! The AST node model.
//!
//! The original Tau compiler expresses its ~110 node kinds with a C
//! header-macro (`AST_NODE_HEADER`) expanded into every node struct — a
//! closed-world polymorphic hierarchy. This is re-architected here as a
//! tagged sum instead: [`Node`] carries the shared header fields (kind tag,
//! originating token, annotation slots), and [`NodeKind`] is the sum over
//! concrete node shapes, grouped into `Decl*`/`Expr*`/`Stmt*`/`Type*`
//! families with nested sub-kind enums rather than one variant per
//! concrete construct.

use crate::ast::registry::NodeId;
use crate::ast::token::TokenId;
use crate::types::desc::TypeId;
use smallvec::SmallVec;
use std::cell::Cell;

/// A declaration's own identifier, or a path segment's name. Not resolved
/// itself — it is the name *being declared* or *referenced through a path*,
/// as opposed to [`NodeKind::ExprId`], which is a use-site that does get a
/// resolved-declaration back-reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub name: String,
}

/// Small, typically 0-4 element child lists (parameters, block statements,
/// struct members). `SmallVec` avoids a heap allocation for the common
/// case.
pub type Children = SmallVec<[NodeId; 4]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Private,
    Public,
}

// ---------------------------------------------------------------------
// Declarations
// ---------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct DeclVar {
    pub id: NodeId,
    pub is_pub: Visibility,
    pub is_mut: bool,
    pub ty: Option<NodeId>,
    pub init: Option<NodeId>,
}

#[derive(Debug, Clone)]
pub struct DeclParam {
    pub id: NodeId,
    pub ty: NodeId,
    pub default: Option<NodeId>,
    pub variadic: bool,
}

#[derive(Debug, Clone)]
pub struct DeclFun {
    pub id: NodeId,
    pub is_pub: Visibility,
    pub params: Children,
    pub ret_ty: Option<NodeId>,
    pub body: Option<NodeId>,
    /// Scope opened for parameters + body, populated by nameres.
    pub scope: Cell<Option<crate::symtab::scope::ScopeId>>,
}

#[derive(Debug, Clone)]
pub struct DeclField {
    pub id: NodeId,
    pub is_pub: Visibility,
    pub ty: NodeId,
}

#[derive(Debug, Clone)]
pub struct DeclStruct {
    pub id: NodeId,
    pub is_pub: Visibility,
    pub fields: Children,
    pub scope: Cell<Option<crate::symtab::scope::ScopeId>>,
}

#[derive(Debug, Clone)]
pub struct DeclUnion {
    pub id: NodeId,
    pub is_pub: Visibility,
    pub fields: Children,
    pub scope: Cell<Option<crate::symtab::scope::ScopeId>>,
}

#[derive(Debug, Clone)]
pub struct DeclEnum {
    pub id: NodeId,
    pub is_pub: Visibility,
    pub constants: Children,
    pub scope: Cell<Option<crate::symtab::scope::ScopeId>>,
}

#[derive(Debug, Clone)]
pub struct DeclEnumConstant {
    pub id: NodeId,
    pub value: Option<NodeId>,
}

#[derive(Debug, Clone)]
pub struct DeclMod {
    pub id: NodeId,
    pub is_pub: Visibility,
    pub decls: Children,
    pub scope: Cell<Option<crate::symtab::scope::ScopeId>>,
}

#[derive(Debug, Clone)]
pub struct DeclGeneric {
    pub id: NodeId,
    pub is_pub: Visibility,
    pub params: Children,
    /// The wrapped declaration (fun/struct/union/enum) this generic clones
    /// and re-analyzes per specialization (§4.8).
    pub inner: NodeId,
    pub scope: Cell<Option<crate::symtab::scope::ScopeId>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenericParamKind {
    Type,
    Const,
}

#[derive(Debug, Clone)]
pub struct DeclGenericParam {
    pub id: NodeId,
    pub kind: GenericParamKind,
    /// Constraint type for const params; bound for type params (unused in
    /// the current surface beyond presence).
    pub constraint: Option<NodeId>,
}

// ---------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ExprId {
    pub id: NodeId,
}

#[derive(Debug, Clone, Copy)]
pub enum IntSuffix {
    None,
    I8,
    I16,
    I32,
    I64,
    Isize,
    U8,
    U16,
    U32,
    U64,
    Usize,
}

#[derive(Debug, Clone)]
pub struct ExprLitInt {
    pub value: i128,
    pub suffix: IntSuffix,
}

#[derive(Debug, Clone, Copy)]
pub enum FloatSuffix {
    None,
    F32,
    F64,
}

#[derive(Debug, Clone)]
pub struct ExprLitFlt {
    pub value: f64,
    pub suffix: FloatSuffix,
}

#[derive(Debug, Clone)]
pub struct ExprLitStr {
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct ExprLitChar {
    pub value: char,
}

#[derive(Debug, Clone)]
pub struct ExprLitBool {
    pub value: bool,
}

#[derive(Debug, Clone)]
pub struct ExprLitVec {
    pub elems: Children,
}

#[derive(Debug, Clone)]
pub struct ExprLitMat {
    pub rows: u32,
    pub cols: u32,
    pub elems: Children,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOpKind {
    Pos,
    Neg,
    Not,
    BitNot,
    Inc,
    Dec,
    Deref,
    AddrOf,
    Sizeof,
    Alignof,
    UnwrapUnsafe,
}

#[derive(Debug, Clone)]
pub struct ExprUnaryOp {
    pub op: UnaryOpKind,
    pub operand: NodeId,
    /// `inc`/`dec` can be prefix or postfix; irrelevant to typing, kept for
    /// codegen fidelity.
    pub postfix: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOpKind {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    RemAssign,
    BitAndAssign,
    BitOrAssign,
    BitXorAssign,
    ShlAssign,
    ShrAssign,
    Subscript,
    DirectAccess,
}

#[derive(Debug, Clone)]
pub struct ExprBinaryOp {
    pub op: BinaryOpKind,
    pub lhs: NodeId,
    pub rhs: NodeId,
}

#[derive(Debug, Clone)]
pub struct ExprCall {
    pub callee: NodeId,
    pub args: Children,
}

#[derive(Debug, Clone)]
pub struct ExprGenericSpec {
    pub callee: NodeId,
    pub args: Children,
}

/// An expression that wraps a locally-introduced declaration (e.g. an
/// inline `var` used as a sub-expression context). Mirrors the original
/// compiler's `ast/expr/decl.h`.
#[derive(Debug, Clone)]
pub struct ExprDecl {
    pub decl: NodeId,
}

// ---------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct StmtIf {
    pub cond: NodeId,
    pub then_branch: NodeId,
    pub else_branch: Option<NodeId>,
}

#[derive(Debug, Clone)]
pub struct StmtFor {
    pub init: Option<NodeId>,
    pub cond: Option<NodeId>,
    pub step: Option<NodeId>,
    pub body: NodeId,
}

#[derive(Debug, Clone)]
pub struct StmtWhile {
    pub cond: NodeId,
    pub body: NodeId,
}

#[derive(Debug, Clone)]
pub struct StmtDoWhile {
    pub body: NodeId,
    pub cond: NodeId,
}

#[derive(Debug, Clone)]
pub struct StmtLoop {
    pub body: NodeId,
}

#[derive(Debug, Clone)]
pub struct StmtBreak {
    /// Resolved by CFA to the enclosing loop's statement node.
    pub target: Cell<Option<NodeId>>,
}

#[derive(Debug, Clone)]
pub struct StmtContinue {
    pub target: Cell<Option<NodeId>>,
}

#[derive(Debug, Clone)]
pub struct StmtReturn {
    pub value: Option<NodeId>,
}

#[derive(Debug, Clone)]
pub struct StmtDefer {
    pub body: NodeId,
}

#[derive(Debug, Clone)]
pub struct StmtBlock {
    pub stmts: Children,
    pub scope: Cell<Option<crate::symtab::scope::ScopeId>>,
}

#[derive(Debug, Clone)]
pub struct StmtExpr {
    pub expr: NodeId,
}

// ---------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimKind {
    I8,
    I16,
    I32,
    I64,
    Isize,
    U8,
    U16,
    U32,
    U64,
    Usize,
    F32,
    F64,
    C64,
    C128,
    Char,
    Bool,
    Unit,
}

#[derive(Debug, Clone)]
pub struct TypePtr {
    pub base: NodeId,
}

#[derive(Debug, Clone)]
pub struct TypeRef {
    pub base: NodeId,
}

#[derive(Debug, Clone)]
pub struct TypeMut {
    pub base: NodeId,
}

#[derive(Debug, Clone)]
pub struct TypeOpt {
    pub base: NodeId,
}

#[derive(Debug, Clone)]
pub struct TypeArray {
    pub base: NodeId,
    pub size: NodeId,
}

#[derive(Debug, Clone)]
pub struct TypeVec {
    pub base: NodeId,
    pub size: u32,
}

#[derive(Debug, Clone)]
pub struct TypeMat {
    pub base: NodeId,
    pub rows: u32,
    pub cols: u32,
}

#[derive(Debug, Clone)]
pub struct TypeFun {
    pub params: Children,
    pub ret: NodeId,
}

#[derive(Debug, Clone)]
pub struct TypeMember {
    pub owner: NodeId,
    pub member: NodeId,
}

/// A type that is just a reference to a declaration (struct/union/enum/
/// generic-param name used in type position).
#[derive(Debug, Clone)]
pub struct TypeDeclRef {
    pub path: NodeId,
}

#[derive(Debug, Clone)]
pub struct TypeGenericSpec {
    pub callee: NodeId,
    pub args: Children,
}

// ---------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct PathSegment {
    pub id: NodeId,
}

#[derive(Debug, Clone)]
pub struct PathAccess {
    pub lhs: NodeId,
    pub rhs: NodeId,
}

#[derive(Debug, Clone)]
pub struct PathAlias {
    pub path: NodeId,
    pub id: NodeId,
}

#[derive(Debug, Clone)]
pub struct PathList {
    pub paths: Children,
}

// ---------------------------------------------------------------------
// Misc
// ---------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Use {
    pub path: NodeId,
}

#[derive(Debug, Clone)]
pub struct Prog {
    pub decls: Children,
    pub scope: Cell<Option<crate::symtab::scope::ScopeId>>,
}

/// The tagged sum over every concrete AST node shape.
#[derive(Debug, Clone)]
pub enum NodeKind {
    Ident(Ident),

    DeclVar(DeclVar),
    DeclParam(DeclParam),
    DeclFun(DeclFun),
    DeclField(DeclField),
    DeclStruct(DeclStruct),
    DeclUnion(DeclUnion),
    DeclEnum(DeclEnum),
    DeclEnumConstant(DeclEnumConstant),
    DeclMod(DeclMod),
    DeclGeneric(DeclGeneric),
    DeclGenericParam(DeclGenericParam),

    ExprId(ExprId),
    ExprLitInt(ExprLitInt),
    ExprLitFlt(ExprLitFlt),
    ExprLitStr(ExprLitStr),
    ExprLitChar(ExprLitChar),
    ExprLitBool(ExprLitBool),
    ExprLitNull,
    ExprLitVec(ExprLitVec),
    ExprLitMat(ExprLitMat),
    ExprUnaryOp(ExprUnaryOp),
    ExprBinaryOp(ExprBinaryOp),
    ExprCall(ExprCall),
    ExprGenericSpec(ExprGenericSpec),
    ExprDecl(ExprDecl),

    StmtIf(StmtIf),
    StmtFor(StmtFor),
    StmtWhile(StmtWhile),
    StmtDoWhile(StmtDoWhile),
    StmtLoop(StmtLoop),
    StmtBreak(StmtBreak),
    StmtContinue(StmtContinue),
    StmtReturn(StmtReturn),
    StmtDefer(StmtDefer),
    StmtBlock(StmtBlock),
    StmtExpr(StmtExpr),

    TypePrim(PrimKind),
    TypePtr(TypePtr),
    TypeRef(TypeRef),
    TypeMut(TypeMut),
    TypeOpt(TypeOpt),
    TypeArray(TypeArray),
    TypeVec(TypeVec),
    TypeMat(TypeMat),
    TypeFun(TypeFun),
    TypeMember(TypeMember),
    TypeDeclRef(TypeDeclRef),
    TypeGenericSpec(TypeGenericSpec),

    PathSegment(PathSegment),
    PathAccess(PathAccess),
    PathAlias(PathAlias),
    PathWildcard,
    PathList(PathList),

    Use(Use),
    Prog(Prog),
    Poison,
}

impl NodeKind {
    /// Short, stable name used by the JSON dumper and by diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Ident(_) => "ident",
            NodeKind::DeclVar(_) => "decl_var",
            NodeKind::DeclParam(_) => "decl_param",
            NodeKind::DeclFun(_) => "decl_fun",
            NodeKind::DeclField(_) => "decl_field",
            NodeKind::DeclStruct(_) => "decl_struct",
            NodeKind::DeclUnion(_) => "decl_union",
            NodeKind::DeclEnum(_) => "decl_enum",
            NodeKind::DeclEnumConstant(_) => "decl_enum_constant",
            NodeKind::DeclMod(_) => "decl_mod",
            NodeKind::DeclGeneric(_) => "decl_generic",
            NodeKind::DeclGenericParam(_) => "decl_generic_param",
            NodeKind::ExprId(_) => "expr_id",
            NodeKind::ExprLitInt(_) => "expr_lit_int",
            NodeKind::ExprLitFlt(_) => "expr_lit_flt",
            NodeKind::ExprLitStr(_) => "expr_lit_str",
            NodeKind::ExprLitChar(_) => "expr_lit_char",
            NodeKind::ExprLitBool(_) => "expr_lit_bool",
            NodeKind::ExprLitNull => "expr_lit_null",
            NodeKind::ExprLitVec(_) => "expr_lit_vec",
            NodeKind::ExprLitMat(_) => "expr_lit_mat",
            NodeKind::ExprUnaryOp(_) => "expr_op_un",
            NodeKind::ExprBinaryOp(_) => "expr_op_bin",
            NodeKind::ExprCall(_) => "expr_op_call",
            NodeKind::ExprGenericSpec(_) => "expr_op_spec",
            NodeKind::ExprDecl(_) => "expr_decl",
            NodeKind::StmtIf(_) => "stmt_if",
            NodeKind::StmtFor(_) => "stmt_for",
            NodeKind::StmtWhile(_) => "stmt_while",
            NodeKind::StmtDoWhile(_) => "stmt_do_while",
            NodeKind::StmtLoop(_) => "stmt_loop",
            NodeKind::StmtBreak(_) => "stmt_break",
            NodeKind::StmtContinue(_) => "stmt_continue",
            NodeKind::StmtReturn(_) => "stmt_return",
            NodeKind::StmtDefer(_) => "stmt_defer",
            NodeKind::StmtBlock(_) => "stmt_block",
            NodeKind::StmtExpr(_) => "stmt_expr",
            NodeKind::TypePrim(_) => "type_prim",
            NodeKind::TypePtr(_) => "type_ptr",
            NodeKind::TypeRef(_) => "type_ref",
            NodeKind::TypeMut(_) => "type_mut",
            NodeKind::TypeOpt(_) => "type_opt",
            NodeKind::TypeArray(_) => "type_array",
            NodeKind::TypeVec(_) => "type_vec",
            NodeKind::TypeMat(_) => "type_mat",
            NodeKind::TypeFun(_) => "type_fun",
            NodeKind::TypeMember(_) => "type_member",
            NodeKind::TypeDeclRef(_) => "type_decl_ref",
            NodeKind::TypeGenericSpec(_) => "type_generic_spec",
            NodeKind::PathSegment(_) => "path_segment",
            NodeKind::PathAccess(_) => "path_access",
            NodeKind::PathAlias(_) => "path_alias",
            NodeKind::PathWildcard => "path_wildcard",
            NodeKind::PathList(_) => "path_list",
            NodeKind::Use(_) => "use",
            NodeKind::Prog(_) => "prog",
            NodeKind::Poison => "poison",
        }
    }

    pub fn is_poison(&self) -> bool {
        matches!(self, NodeKind::Poison)
    }
}

/// The uniform AST node wrapper. Shared header fields live here; the
/// kind-specific payload lives in [`NodeKind`]. `ty`/`resolved` are the
/// annotation slots later passes populate in place — the only mutation the
/// tree ever undergoes after parsing.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub token: TokenId,
    /// Populated by typecheck for every expression and type-bearing decl.
    pub ty: Cell<Option<TypeId>>,
    /// Populated by nameres for `expr_id` and path segments.
    pub resolved: Cell<Option<NodeId>>,
    /// Opaque codegen-value slot; this crate never reads it.
    pub codegen_value: Cell<Option<CodegenValue>>,
}

/// Opaque placeholder for the backend value codegen attaches to a node.
/// This crate has no opinion on backend IR shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodegenValue(pub u64);

impl Node {
    pub fn new(kind: NodeKind, token: TokenId) -> Self {
        Self {
            kind,
            token,
            ty: Cell::new(None),
            resolved: Cell::new(None),
            codegen_value: Cell::new(None),
        }
    }

    pub fn is_poison(&self) -> bool {
        self.kind.is_poison()
    }
}
