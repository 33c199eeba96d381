//! Debugging-aid JSON AST dumper.
//!
//! Format: `{"kind": "<kind-name>", ...kind-specific fields...}`, with
//! child nodes emitted recursively and child lists as JSON arrays. This is
//! explicitly *not* part of the semantic contract — annotation slots
//! (`ty`, `resolved`, codegen value) are omitted so that dump → reparse
//! round-trips compare only topology.

use crate::ast::node::{BinaryOpKind, GenericParamKind, NodeKind, PrimKind, UnaryOpKind, Visibility};
use crate::ast::registry::{AstRegistry, NodeId};
use serde_json::{json, Value};

fn vis_str(v: Visibility) -> &'static str {
    match v {
        Visibility::Private => "private",
        Visibility::Public => "public",
    }
}

fn prim_str(p: PrimKind) -> &'static str {
    match p {
        PrimKind::I8 => "i8",
        PrimKind::I16 => "i16",
        PrimKind::I32 => "i32",
        PrimKind::I64 => "i64",
        PrimKind::Isize => "isize",
        PrimKind::U8 => "u8",
        PrimKind::U16 => "u16",
        PrimKind::U32 => "u32",
        PrimKind::U64 => "u64",
        PrimKind::Usize => "usize",
        PrimKind::F32 => "f32",
        PrimKind::F64 => "f64",
        PrimKind::C64 => "c64",
        PrimKind::C128 => "c128",
        PrimKind::Char => "char",
        PrimKind::Bool => "bool",
        PrimKind::Unit => "unit",
    }
}

fn unary_str(op: UnaryOpKind) -> &'static str {
    match op {
        UnaryOpKind::Pos => "pos",
        UnaryOpKind::Neg => "neg",
        UnaryOpKind::Not => "not",
        UnaryOpKind::BitNot => "bitnot",
        UnaryOpKind::Inc => "inc",
        UnaryOpKind::Dec => "dec",
        UnaryOpKind::Deref => "deref",
        UnaryOpKind::AddrOf => "addrof",
        UnaryOpKind::Sizeof => "sizeof",
        UnaryOpKind::Alignof => "alignof",
        UnaryOpKind::UnwrapUnsafe => "unwrap_unsafe",
    }
}

fn binary_str(op: BinaryOpKind) -> &'static str {
    match op {
        BinaryOpKind::Add => "add",
        BinaryOpKind::Sub => "sub",
        BinaryOpKind::Mul => "mul",
        BinaryOpKind::Div => "div",
        BinaryOpKind::Rem => "rem",
        BinaryOpKind::BitAnd => "bitand",
        BinaryOpKind::BitOr => "bitor",
        BinaryOpKind::BitXor => "bitxor",
        BinaryOpKind::Shl => "shl",
        BinaryOpKind::Shr => "shr",
        BinaryOpKind::Eq => "eq",
        BinaryOpKind::Ne => "ne",
        BinaryOpKind::Lt => "lt",
        BinaryOpKind::Le => "le",
        BinaryOpKind::Gt => "gt",
        BinaryOpKind::Ge => "ge",
        BinaryOpKind::And => "and",
        BinaryOpKind::Or => "or",
        BinaryOpKind::Assign => "assign",
        BinaryOpKind::AddAssign => "add_assign",
        BinaryOpKind::SubAssign => "sub_assign",
        BinaryOpKind::MulAssign => "mul_assign",
        BinaryOpKind::DivAssign => "div_assign",
        BinaryOpKind::RemAssign => "rem_assign",
        BinaryOpKind::BitAndAssign => "bitand_assign",
        BinaryOpKind::BitOrAssign => "bitor_assign",
        BinaryOpKind::BitXorAssign => "bitxor_assign",
        BinaryOpKind::ShlAssign => "shl_assign",
        BinaryOpKind::ShrAssign => "shr_assign",
        BinaryOpKind::Subscript => "subscript",
        BinaryOpKind::DirectAccess => "direct_access",
    }
}

fn children(registry: &AstRegistry, ids: &[NodeId]) -> Value {
    Value::Array(ids.iter().map(|&id| dump_node(registry, id)).collect())
}

/// Recursively dumps the subtree rooted at `id` to a `serde_json::Value`.
pub fn dump_node(registry: &AstRegistry, id: NodeId) -> Value {
    let node = registry.get(id);
    let kind_name = node.kind.name();

    let mut obj = match &node.kind {
        NodeKind::Ident(i) => json!({ "name": i.name }),
        NodeKind::DeclVar(d) => json!({
            "id": dump_node(registry, d.id),
            "is_pub": vis_str(d.is_pub),
            "is_mut": d.is_mut,
            "ty": d.ty.map(|t| dump_node(registry, t)),
            "init": d.init.map(|e| dump_node(registry, e)),
        }),
        NodeKind::DeclParam(d) => json!({
            "id": dump_node(registry, d.id),
            "ty": dump_node(registry, d.ty),
            "default": d.default.map(|e| dump_node(registry, e)),
            "variadic": d.variadic,
        }),
        NodeKind::DeclFun(d) => json!({
            "id": dump_node(registry, d.id),
            "is_pub": vis_str(d.is_pub),
            "params": children(registry, &d.params),
            "ret_ty": d.ret_ty.map(|t| dump_node(registry, t)),
            "body": d.body.map(|b| dump_node(registry, b)),
        }),
        NodeKind::DeclField(d) => json!({
            "id": dump_node(registry, d.id),
            "is_pub": vis_str(d.is_pub),
            "ty": dump_node(registry, d.ty),
        }),
        NodeKind::DeclStruct(d) => json!({
            "id": dump_node(registry, d.id),
            "is_pub": vis_str(d.is_pub),
            "fields": children(registry, &d.fields),
        }),
        NodeKind::DeclUnion(d) => json!({
            "id": dump_node(registry, d.id),
            "is_pub": vis_str(d.is_pub),
            "fields": children(registry, &d.fields),
        }),
        NodeKind::DeclEnum(d) => json!({
            "id": dump_node(registry, d.id),
            "is_pub": vis_str(d.is_pub),
            "constants": children(registry, &d.constants),
        }),
        NodeKind::DeclEnumConstant(d) => json!({
            "id": dump_node(registry, d.id),
            "value": d.value.map(|v| dump_node(registry, v)),
        }),
        NodeKind::DeclMod(d) => json!({
            "id": dump_node(registry, d.id),
            "is_pub": vis_str(d.is_pub),
            "decls": children(registry, &d.decls),
        }),
        NodeKind::DeclGeneric(d) => json!({
            "id": dump_node(registry, d.id),
            "is_pub": vis_str(d.is_pub),
            "params": children(registry, &d.params),
            "inner": dump_node(registry, d.inner),
        }),
        NodeKind::DeclGenericParam(d) => json!({
            "id": dump_node(registry, d.id),
            "param_kind": match d.kind {
                GenericParamKind::Type => "type",
                GenericParamKind::Const => "const",
            },
            "constraint": d.constraint.map(|c| dump_node(registry, c)),
        }),
        NodeKind::ExprId(e) => json!({ "id": dump_node(registry, e.id) }),
        NodeKind::ExprLitInt(e) => json!({ "value": e.value.to_string() }),
        NodeKind::ExprLitFlt(e) => json!({ "value": e.value }),
        NodeKind::ExprLitStr(e) => json!({ "value": e.value }),
        NodeKind::ExprLitChar(e) => json!({ "value": e.value.to_string() }),
        NodeKind::ExprLitBool(e) => json!({ "value": e.value }),
        NodeKind::ExprLitNull => json!({}),
        NodeKind::ExprLitVec(e) => json!({ "elems": children(registry, &e.elems) }),
        NodeKind::ExprLitMat(e) => json!({
            "rows": e.rows,
            "cols": e.cols,
            "elems": children(registry, &e.elems),
        }),
        NodeKind::ExprUnaryOp(e) => json!({
            "op": unary_str(e.op),
            "operand": dump_node(registry, e.operand),
            "postfix": e.postfix,
        }),
        NodeKind::ExprBinaryOp(e) => json!({
            "op": binary_str(e.op),
            "lhs": dump_node(registry, e.lhs),
            "rhs": dump_node(registry, e.rhs),
        }),
        NodeKind::ExprCall(e) => json!({
            "callee": dump_node(registry, e.callee),
            "args": children(registry, &e.args),
        }),
        NodeKind::ExprGenericSpec(e) => json!({
            "callee": dump_node(registry, e.callee),
            "args": children(registry, &e.args),
        }),
        NodeKind::ExprDecl(e) => json!({ "decl": dump_node(registry, e.decl) }),
        NodeKind::StmtIf(s) => json!({
            "cond": dump_node(registry, s.cond),
            "then": dump_node(registry, s.then_branch),
            "else": s.else_branch.map(|e| dump_node(registry, e)),
        }),
        NodeKind::StmtFor(s) => json!({
            "init": s.init.map(|n| dump_node(registry, n)),
            "cond": s.cond.map(|n| dump_node(registry, n)),
            "step": s.step.map(|n| dump_node(registry, n)),
            "body": dump_node(registry, s.body),
        }),
        NodeKind::StmtWhile(s) => json!({
            "cond": dump_node(registry, s.cond),
            "body": dump_node(registry, s.body),
        }),
        NodeKind::StmtDoWhile(s) => json!({
            "body": dump_node(registry, s.body),
            "cond": dump_node(registry, s.cond),
        }),
        NodeKind::StmtLoop(s) => json!({ "body": dump_node(registry, s.body) }),
        NodeKind::StmtBreak(_) => json!({}),
        NodeKind::StmtContinue(_) => json!({}),
        NodeKind::StmtReturn(s) => json!({ "value": s.value.map(|v| dump_node(registry, v)) }),
        NodeKind::StmtDefer(s) => json!({ "body": dump_node(registry, s.body) }),
        NodeKind::StmtBlock(s) => json!({ "stmts": children(registry, &s.stmts) }),
        NodeKind::StmtExpr(s) => json!({ "expr": dump_node(registry, s.expr) }),
        NodeKind::TypePrim(p) => json!({ "prim": prim_str(*p) }),
        NodeKind::TypePtr(t) => json!({ "base": dump_node(registry, t.base) }),
        NodeKind::TypeRef(t) => json!({ "base": dump_node(registry, t.base) }),
        NodeKind::TypeMut(t) => json!({ "base": dump_node(registry, t.base) }),
        NodeKind::TypeOpt(t) => json!({ "base": dump_node(registry, t.base) }),
        NodeKind::TypeArray(t) => json!({
            "base": dump_node(registry, t.base),
            "size": dump_node(registry, t.size),
        }),
        NodeKind::TypeVec(t) => json!({
            "base": dump_node(registry, t.base),
            "size": t.size,
        }),
        NodeKind::TypeMat(t) => json!({
            "base": dump_node(registry, t.base),
            "rows": t.rows,
            "cols": t.cols,
        }),
        NodeKind::TypeFun(t) => json!({
            "params": children(registry, &t.params),
            "ret": dump_node(registry, t.ret),
        }),
        NodeKind::TypeMember(t) => json!({
            "owner": dump_node(registry, t.owner),
            "member": dump_node(registry, t.member),
        }),
        NodeKind::TypeDeclRef(t) => json!({ "path": dump_node(registry, t.path) }),
        NodeKind::TypeGenericSpec(t) => json!({
            "callee": dump_node(registry, t.callee),
            "args": children(registry, &t.args),
        }),
        NodeKind::PathSegment(p) => json!({ "id": dump_node(registry, p.id) }),
        NodeKind::PathAccess(p) => json!({
            "lhs": dump_node(registry, p.lhs),
            "rhs": dump_node(registry, p.rhs),
        }),
        NodeKind::PathAlias(p) => json!({
            "path": dump_node(registry, p.path),
            "id": dump_node(registry, p.id),
        }),
        NodeKind::PathWildcard => json!({}),
        NodeKind::PathList(p) => json!({ "paths": children(registry, &p.paths) }),
        NodeKind::Use(u) => json!({ "path": dump_node(registry, u.path) }),
        NodeKind::Prog(p) => json!({ "decls": children(registry, &p.decls) }),
        NodeKind::Poison => json!({}),
    };

    obj.as_object_mut()
        .expect("all arms build a JSON object")
        .insert("kind".to_string(), Value::String(kind_name.to_string()));
    obj
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::node::{ExprLitBool, Node};
    use crate::ast::token::{BytePos, TokenKind, TokenRegistry};

    #[test]
    fn dump_includes_kind_tag() {
        let mut tokens = TokenRegistry::new();
        let file = tokens.register_file("t.tau", "true");
        let tok = tokens.token_init(file, TokenKind::Keyword("true"), BytePos(0));

        let mut registry = AstRegistry::new();
        let id = registry.register(Node::new(
            NodeKind::ExprLitBool(ExprLitBool { value: true }),
            tok,
        ));

        let dumped = dump_node(&registry, id);
        assert_eq!(dumped["kind"], "expr_lit_bool");
        assert_eq!(dumped["value"], true);
    }
}
