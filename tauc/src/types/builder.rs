//! Hash-consing type-descriptor interner.
//!
//! A dedicated interning store keyed by a structural hash plus a
//! deep-equality tiebreaker on collision: `build_*` either returns the
//! existing representative for a structurally equal descriptor or
//! allocates a fresh one, never both, so two structurally equal types
//! always end up as one `TypeId`.
//!
//! Modifier well-formedness (no `mut(mut _)`, `ref(ref _)`, `opt(opt _)`,
//! `ptr(ref _)`) and the three convertibility predicates are ported from
//! the original Tau compiler's `typedesc_mut.c` / `typedesc_ref.c` /
//! `typedesc_prim.c`.

use crate::ast::node::PrimKind;
use crate::ast::registry::NodeId;
use crate::types::desc::{TypeDesc, TypeId};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::hash::{Hash, Hasher};

fn structural_hash(desc: &TypeDesc) -> u64 {
    let mut hasher = rustc_hash::FxHasher::default();
    desc.hash(&mut hasher);
    hasher.finish()
}

pub struct TypeBuilder {
    descs: Vec<TypeDesc>,
    interner: FxHashMap<u64, SmallVec<[TypeId; 2]>>,
}

impl Default for TypeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeBuilder {
    pub fn new() -> Self {
        Self {
            descs: Vec::new(),
            interner: FxHashMap::default(),
        }
    }

    pub fn get(&self, id: TypeId) -> &TypeDesc {
        &self.descs[id.index()]
    }

    /// Returns the canonical representative for `desc`, allocating one if
    /// this is the first time a structurally equal descriptor is built.
    fn intern(&mut self, desc: TypeDesc) -> TypeId {
        let hash = structural_hash(&desc);
        if let Some(bucket) = self.interner.get(&hash) {
            for &candidate in bucket {
                if self.descs[candidate.index()] == desc {
                    return candidate;
                }
            }
        }
        let id = TypeId::new(self.descs.len() as u32);
        self.descs.push(desc);
        self.interner.entry(hash).or_default().push(id);
        id
    }

    // -- Primitives and special singletons ------------------------------

    pub fn build_prim(&mut self, kind: PrimKind) -> TypeId {
        self.intern(TypeDesc::Prim(kind))
    }

    pub fn build_null(&mut self) -> TypeId {
        self.intern(TypeDesc::Null)
    }

    pub fn build_poison(&mut self) -> TypeId {
        self.intern(TypeDesc::Poison)
    }

    // -- Modifiers, with well-formedness enforced at construction --------
    //
    // Returning `None` means the caller asked for an ill-formed modifier
    // combination; the typecheck pass is expected to treat that the same
    // way it treats any other local type error (emit a diagnostic, poison
    // the node) rather than ever reaching the interner with it.

    /// `mut` may not wrap another `mut`, `ref`, or `opt`.
    pub fn build_mut(&mut self, base: TypeId) -> Option<TypeId> {
        match self.get(base) {
            TypeDesc::Mut(_) | TypeDesc::Ref(_) | TypeDesc::Opt(_) => None,
            _ => Some(self.intern(TypeDesc::Mut(base))),
        }
    }

    /// `ref` may wrap `mut` but not `ref`.
    pub fn build_ref(&mut self, base: TypeId) -> Option<TypeId> {
        match self.get(base) {
            TypeDesc::Ref(_) => None,
            _ => Some(self.intern(TypeDesc::Ref(base))),
        }
    }

    /// `opt` may wrap `mut` but not `opt`.
    pub fn build_opt(&mut self, base: TypeId) -> Option<TypeId> {
        match self.get(base) {
            TypeDesc::Opt(_) => None,
            _ => Some(self.intern(TypeDesc::Opt(base))),
        }
    }

    /// `ptr` may wrap anything except `ref`.
    pub fn build_ptr(&mut self, base: TypeId) -> Option<TypeId> {
        match self.get(base) {
            TypeDesc::Ref(_) => None,
            _ => Some(self.intern(TypeDesc::Ptr(base))),
        }
    }

    // -- Aggregates and nominals ------------------------------------------

    pub fn build_array(&mut self, base: TypeId, len: u64) -> TypeId {
        self.intern(TypeDesc::Array(base, len))
    }

    pub fn build_vec(&mut self, base: TypeId, size: u32) -> TypeId {
        self.intern(TypeDesc::Vec(base, size))
    }

    pub fn build_mat(&mut self, base: TypeId, rows: u32, cols: u32) -> TypeId {
        self.intern(TypeDesc::Mat(base, rows, cols))
    }

    pub fn build_fun(&mut self, params: Vec<TypeId>, ret: TypeId) -> TypeId {
        self.intern(TypeDesc::Fun(params, ret))
    }

    pub fn build_struct(&mut self, node: NodeId, fields: Vec<TypeId>) -> TypeId {
        self.intern(TypeDesc::Struct(node, fields))
    }

    pub fn build_union(&mut self, node: NodeId, fields: Vec<TypeId>) -> TypeId {
        self.intern(TypeDesc::Union(node, fields))
    }

    pub fn build_enum(&mut self, node: NodeId) -> TypeId {
        self.intern(TypeDesc::Enum(node))
    }

    // -- Stripping helpers -------------------------------------------------

    pub fn is_mut(&self, id: TypeId) -> bool {
        matches!(self.get(id), TypeDesc::Mut(_))
    }

    pub fn is_ref(&self, id: TypeId) -> bool {
        matches!(self.get(id), TypeDesc::Ref(_))
    }

    pub fn is_opt(&self, id: TypeId) -> bool {
        matches!(self.get(id), TypeDesc::Opt(_))
    }

    pub fn is_ptr(&self, id: TypeId) -> bool {
        matches!(self.get(id), TypeDesc::Ptr(_))
    }

    pub fn is_poison(&self, id: TypeId) -> bool {
        matches!(self.get(id), TypeDesc::Poison)
    }

    pub fn remove_mut(&self, id: TypeId) -> TypeId {
        match self.get(id) {
            TypeDesc::Mut(base) => *base,
            _ => id,
        }
    }

    pub fn remove_ref(&self, id: TypeId) -> TypeId {
        match self.get(id) {
            TypeDesc::Ref(base) => *base,
            _ => id,
        }
    }

    pub fn remove_opt(&self, id: TypeId) -> TypeId {
        match self.get(id) {
            TypeDesc::Opt(base) => *base,
            _ => id,
        }
    }

    pub fn remove_ref_mut(&self, id: TypeId) -> TypeId {
        self.remove_mut(self.remove_ref(id))
    }

    fn as_prim(&self, id: TypeId) -> Option<PrimKind> {
        match self.get(self.remove_mut(id)) {
            TypeDesc::Prim(p) => Some(*p),
            _ => None,
        }
    }

    pub fn is_arithmetic(&self, id: TypeId) -> bool {
        self.as_prim(id).is_some_and(PrimKind::is_arithmetic)
    }

    pub fn is_integer(&self, id: TypeId) -> bool {
        self.as_prim(id).is_some_and(PrimKind::is_integer)
    }

    // -- Arithmetic promotion -----------------------------------------------

    /// Returns the canonical common type of two arithmetic operands, plus
    /// whether a `mixed_signedness` warning should be raised.
    pub fn build_promoted_arithmetic(&mut self, a: TypeId, b: TypeId) -> (TypeId, bool) {
        let pa = self
            .as_prim(a)
            .expect("build_promoted_arithmetic requires arithmetic operands");
        let pb = self
            .as_prim(b)
            .expect("build_promoted_arithmetic requires arithmetic operands");

        if pa.is_complex() || pb.is_complex() {
            let width = pa.bits().max(pb.bits()).max(64);
            let kind = if width > 64 { PrimKind::C128 } else { PrimKind::C64 };
            return (self.build_prim(kind), false);
        }

        if pa.is_float() || pb.is_float() {
            let width = pa.bits().max(pb.bits());
            let kind = if width > 32 { PrimKind::F64 } else { PrimKind::F32 };
            return (self.build_prim(kind), false);
        }

        if pa.is_signed() == pb.is_signed() {
            let wider = if pa.bits() >= pb.bits() { pa } else { pb };
            return (self.build_prim(wider), false);
        }

        // Mixed signedness: promote to the signed side if it is strictly
        // wider, else to the unsigned side, and flag the warning either way.
        let (signed, unsigned) = if pa.is_signed() { (pa, pb) } else { (pb, pa) };
        let kind = if signed.bits() > unsigned.bits() { signed } else { unsigned };
        (self.build_prim(kind), true)
    }

    // -- Convertibility -------------------------------------------------

    /// Assignment/initialization/return convertibility: widening
    /// arithmetic, adding `opt`, identity; never narrows; a value-`mut`
    /// converts to a plain value of the same base but not through a
    /// reference.
    pub fn is_implicitly_direct_convertible(&self, src: TypeId, dst: TypeId) -> bool {
        if self.is_poison(src) || self.is_poison(dst) {
            return true;
        }
        if self.is_ref(src) {
            if !self.is_ref(dst) {
                return self.is_implicitly_direct_convertible(self.remove_ref(src), dst);
            }
            let src_base = self.remove_ref(src);
            let dst_base = self.remove_ref(dst);
            if !self.is_mut(src_base) && self.is_mut(dst_base) {
                return false;
            }
            return self
                .is_implicitly_indirect_convertible(self.remove_mut(src_base), self.remove_mut(dst_base));
        }
        if self.is_opt(dst) {
            let inner = self.remove_opt(dst);
            if matches!(self.get(src), TypeDesc::Null) {
                return true;
            }
            return self.is_implicitly_direct_convertible(src, inner);
        }
        if self.is_ref(dst) {
            return false;
        }

        let src_stripped = self.remove_mut(src);
        let dst_stripped = self.remove_mut(dst);

        if src_stripped == dst_stripped {
            return true;
        }

        if let (Some(sp), Some(dp)) = (self.as_prim(src_stripped), self.as_prim(dst_stripped)) {
            return Self::prim_widens(sp, dp);
        }

        false
    }

    fn prim_widens(src: PrimKind, dst: PrimKind) -> bool {
        if src.is_float() {
            if dst.is_float() {
                // Only f64 -> f32 narrows; every other float pair widens.
                return !(src == PrimKind::F64 && dst == PrimKind::F32);
            }
            if dst.is_complex() {
                // Only f64 -> c64 narrows; every other float/complex pair widens.
                return !(src == PrimKind::F64 && dst == PrimKind::C64);
            }
            return false;
        }

        if src.is_integer() {
            if dst.is_integer() {
                if src.is_signed() == dst.is_signed() {
                    return src.bits() <= dst.bits();
                }
                if src.is_signed() && !dst.is_signed() {
                    return false;
                }
                return src.bits() < dst.bits();
            }
            return match dst {
                PrimKind::F32 => src.bits() <= 16,
                PrimKind::F64 => src.bits() <= 32,
                PrimKind::C64 => src.bits() <= 16,
                PrimKind::C128 => src.bits() <= 32,
                _ => false,
            };
        }

        if src.is_complex() {
            return dst.is_complex() && src.bits() <= dst.bits();
        }

        false
    }

    /// Through-reference convertibility: requires structural identity of
    /// the base with the same-or-narrower `mut` qualification. `ref mut T`
    /// is indirectly convertible to `ref T`, never the reverse.
    pub fn is_implicitly_indirect_convertible(&self, src: TypeId, dst: TypeId) -> bool {
        if self.is_poison(src) || self.is_poison(dst) {
            return true;
        }
        if !self.is_ref(src) || !self.is_ref(dst) {
            return src == dst;
        }
        let src_base = self.remove_ref(src);
        let dst_base = self.remove_ref(dst);

        if !self.is_mut(src_base) && self.is_mut(dst_base) {
            return false;
        }

        self.remove_mut(src_base) == self.remove_mut(dst_base)
    }

    /// Explicit (`cast`) convertibility: arithmetic↔arithmetic,
    /// reference↔pointer of the same base, pointer↔pointer freely; never
    /// drops `mut` when the target is a mutable reference.
    pub fn is_explicitly_convertible(&self, src: TypeId, dst: TypeId) -> bool {
        if self.is_poison(src) || self.is_poison(dst) {
            return true;
        }
        if self.is_opt(dst) {
            return self.is_explicitly_convertible(src, self.remove_opt(dst));
        }

        if self.is_ref(dst) {
            let dst_base = self.remove_ref(dst);
            if self.is_mut(dst_base) {
                let src_base = if self.is_ref(src) {
                    self.remove_ref(src)
                } else {
                    src
                };
                if !self.is_mut(src_base) {
                    return false;
                }
            }
            let dst_plain = self.remove_mut(dst_base);
            let src_plain = if self.is_ref(src) {
                self.remove_mut(self.remove_ref(src))
            } else {
                self.remove_mut(src)
            };
            return src_plain == dst_plain;
        }

        if self.is_ptr(dst) {
            if self.is_ptr(src) {
                return true;
            }
            if self.is_ref(src) {
                return self.remove_mut(self.remove_ref(src)) == self.remove_mut(self.remove_ptr(dst));
            }
            return false;
        }

        let src_stripped = self.remove_mut(src);
        let dst_stripped = self.remove_mut(dst);
        if let (Some(sp), Some(dp)) = (self.as_prim(src_stripped), self.as_prim(dst_stripped)) {
            let _ = (sp, dp);
            return true;
        }

        src_stripped == dst_stripped
    }

    fn remove_ptr(&self, id: TypeId) -> TypeId {
        match self.get(id) {
            TypeDesc::Ptr(base) => *base,
            _ => id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structurally_equal_descriptors_intern_to_one_representative() {
        let mut b = TypeBuilder::new();
        let i32a = b.build_prim(PrimKind::I32);
        let i32b = b.build_prim(PrimKind::I32);
        assert_eq!(i32a, i32b);

        let ptr_a = b.build_ptr(i32a).unwrap();
        let ptr_b = b.build_ptr(i32b).unwrap();
        assert_eq!(ptr_a, ptr_b);
    }

    #[test]
    fn mut_may_not_wrap_mut_ref_or_opt() {
        let mut b = TypeBuilder::new();
        let i32t = b.build_prim(PrimKind::I32);
        let mutt = b.build_mut(i32t).unwrap();
        assert!(b.build_mut(mutt).is_none());

        let reft = b.build_ref(i32t).unwrap();
        assert!(b.build_mut(reft).is_none());

        let optt = b.build_opt(i32t).unwrap();
        assert!(b.build_mut(optt).is_none());
    }

    #[test]
    fn ref_may_wrap_mut_but_not_ref() {
        let mut b = TypeBuilder::new();
        let i32t = b.build_prim(PrimKind::I32);
        let mutt = b.build_mut(i32t).unwrap();
        assert!(b.build_ref(mutt).is_some());

        let reft = b.build_ref(i32t).unwrap();
        assert!(b.build_ref(reft).is_none());
    }

    #[test]
    fn ptr_may_not_wrap_ref() {
        let mut b = TypeBuilder::new();
        let i32t = b.build_prim(PrimKind::I32);
        let reft = b.build_ref(i32t).unwrap();
        assert!(b.build_ptr(reft).is_none());
        assert!(b.build_ptr(i32t).is_some());
    }

    #[test]
    fn widening_integer_conversion_succeeds_but_narrowing_fails() {
        let mut b = TypeBuilder::new();
        let i32t = b.build_prim(PrimKind::I32);
        let i64t = b.build_prim(PrimKind::I64);
        assert!(b.is_implicitly_direct_convertible(i32t, i64t));
        assert!(!b.is_implicitly_direct_convertible(i64t, i32t));
    }

    #[test]
    fn mixed_signedness_promotes_to_wider_signed_side() {
        let mut b = TypeBuilder::new();
        let i32t = b.build_prim(PrimKind::I32);
        let u32t = b.build_prim(PrimKind::U32);
        let (promoted, warn) = b.build_promoted_arithmetic(i32t, u32t);
        assert!(warn);
        assert_eq!(b.get(promoted), &TypeDesc::Prim(PrimKind::U32));
    }

    #[test]
    fn float_dominates_integer_and_f64_dominates_f32() {
        let mut b = TypeBuilder::new();
        let i32t = b.build_prim(PrimKind::I32);
        let f32t = b.build_prim(PrimKind::F32);
        let f64t = b.build_prim(PrimKind::F64);

        let (p1, w1) = b.build_promoted_arithmetic(i32t, f32t);
        assert!(!w1);
        assert_eq!(b.get(p1), &TypeDesc::Prim(PrimKind::F32));

        let (p2, _) = b.build_promoted_arithmetic(f32t, f64t);
        assert_eq!(b.get(p2), &TypeDesc::Prim(PrimKind::F64));
    }

    #[test]
    fn ref_wrapped_source_still_widens_into_a_plain_destination() {
        // An identifier expression types as `ref [mut] T`; assigning it
        // into a wider plain binding must strip that `ref` before
        // comparing bases, not just the `mut`.
        let mut b = TypeBuilder::new();
        let i32t = b.build_prim(PrimKind::I32);
        let i64t = b.build_prim(PrimKind::I64);
        let mut_i32 = b.build_mut(i32t).unwrap();
        let ref_mut_i32 = b.build_ref(mut_i32).unwrap();
        let ref_i32 = b.build_ref(i32t).unwrap();

        assert!(b.is_implicitly_direct_convertible(ref_mut_i32, i64t));
        assert!(b.is_implicitly_direct_convertible(ref_i32, i64t));
        assert!(b.is_implicitly_direct_convertible(ref_i32, i32t));
        assert!(!b.is_implicitly_direct_convertible(ref_i32, b.build_prim(PrimKind::I16)));
    }

    #[test]
    fn int_to_float_and_complex_widening_is_gated_per_destination_width() {
        let mut b = TypeBuilder::new();
        let i16t = b.build_prim(PrimKind::I16);
        let i32t = b.build_prim(PrimKind::I32);
        let f32t = b.build_prim(PrimKind::F32);
        let f64t = b.build_prim(PrimKind::F64);
        let c64t = b.build_prim(PrimKind::C64);
        let c128t = b.build_prim(PrimKind::C128);

        assert!(b.is_implicitly_direct_convertible(i16t, f32t));
        assert!(!b.is_implicitly_direct_convertible(i32t, f32t));
        assert!(b.is_implicitly_direct_convertible(i32t, f64t));

        assert!(b.is_implicitly_direct_convertible(i16t, c64t));
        assert!(!b.is_implicitly_direct_convertible(i32t, c64t));
        assert!(b.is_implicitly_direct_convertible(i32t, c128t));
    }

    #[test]
    fn f64_to_c64_is_the_one_float_to_complex_pair_that_does_not_widen() {
        let mut b = TypeBuilder::new();
        let f32t = b.build_prim(PrimKind::F32);
        let f64t = b.build_prim(PrimKind::F64);
        let c64t = b.build_prim(PrimKind::C64);
        let c128t = b.build_prim(PrimKind::C128);

        assert!(!b.is_implicitly_direct_convertible(f64t, c64t));
        assert!(b.is_implicitly_direct_convertible(f32t, c64t));
        assert!(b.is_implicitly_direct_convertible(f64t, c128t));
    }

    #[test]
    fn ref_mut_converts_indirectly_to_ref_but_not_reverse() {
        let mut b = TypeBuilder::new();
        let i32t = b.build_prim(PrimKind::I32);
        let mutt = b.build_mut(i32t).unwrap();
        let ref_mut = b.build_ref(mutt).unwrap();
        let ref_plain = b.build_ref(i32t).unwrap();

        assert!(b.is_implicitly_indirect_convertible(ref_mut, ref_plain));
        assert!(!b.is_implicitly_indirect_convertible(ref_plain, ref_mut));
    }
}
