//! Interned type descriptors.

use crate::ast::node::PrimKind;
use crate::ast::registry::NodeId;

/// Handle to a canonical, hash-consed [`TypeDesc`] inside a
/// [`crate::types::builder::TypeBuilder`]. Two `TypeId`s compare equal iff
/// the descriptors they name are structurally equal — this is the
/// pointer-equality-decidable type identity the hash-consing interner
/// exists to provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(u32);

impl TypeId {
    pub(crate) fn new(index: u32) -> Self {
        Self(index)
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeDesc {
    Prim(PrimKind),

    Mut(TypeId),
    Ptr(TypeId),
    Ref(TypeId),
    Opt(TypeId),

    Array(TypeId, u64),
    Vec(TypeId, u32),
    Mat(TypeId, u32, u32),
    Fun(Vec<TypeId>, TypeId),

    Struct(NodeId, Vec<TypeId>),
    Union(NodeId, Vec<TypeId>),
    Enum(NodeId),

    Null,
    Poison,
    /// Reserved for future inference support; unused in the current
    /// surface.
    TypeVar(u32),
}

impl PrimKind {
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            PrimKind::I8
                | PrimKind::I16
                | PrimKind::I32
                | PrimKind::I64
                | PrimKind::Isize
                | PrimKind::U8
                | PrimKind::U16
                | PrimKind::U32
                | PrimKind::U64
                | PrimKind::Usize
        )
    }

    pub fn is_signed(self) -> bool {
        matches!(
            self,
            PrimKind::I8 | PrimKind::I16 | PrimKind::I32 | PrimKind::I64 | PrimKind::Isize
        )
    }

    pub fn is_float(self) -> bool {
        matches!(self, PrimKind::F32 | PrimKind::F64)
    }

    pub fn is_complex(self) -> bool {
        matches!(self, PrimKind::C64 | PrimKind::C128)
    }

    pub fn is_arithmetic(self) -> bool {
        self.is_integer() || self.is_float() || self.is_complex()
    }

    /// Bit width used to order widening conversions. Complex widths use the
    /// width of their real/imaginary component pair (c64 = two f32s, c128 =
    /// two f64s), matching the original compiler's `typedesc_integer_bits`/
    /// float-width comparisons.
    pub fn bits(self) -> u32 {
        match self {
            PrimKind::I8 | PrimKind::U8 => 8,
            PrimKind::I16 | PrimKind::U16 => 16,
            PrimKind::I32 | PrimKind::U32 | PrimKind::F32 => 32,
            PrimKind::I64 | PrimKind::U64 | PrimKind::F64 | PrimKind::C64 => 64,
            PrimKind::Isize | PrimKind::Usize => usize::BITS,
            PrimKind::C128 => 128,
            PrimKind::Char => 32,
            PrimKind::Bool => 1,
            PrimKind::Unit => 0,
        }
    }
}
