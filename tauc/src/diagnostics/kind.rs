//! The flat diagnostic taxonomy.
//!
//! Deliberately separate from [`crate::error::Error`]: these are data about
//! the Tau program under compilation, never routed through `tracing` or
//! `?`, only ever pushed into an [`crate::diagnostics::bag::ErrorBag`] and
//! handed to an external printer. Severity is a plain classification
//! method rather than a type split, so one `DiagnosticKind` enum can carry
//! both warnings and hard errors without a parallel hierarchy.

use crate::ast::token::SourceLocation;
use crate::types::desc::TypeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// One entry per diagnosable condition, carrying exactly the payload its
/// message needs and nothing more.
#[derive(Debug, Clone)]
pub enum DiagnosticKind {
    // -- Nameres -----------------------------------------------------------
    SymbolCollision {
        name: String,
        first: SourceLocation,
    },
    UndefinedSymbol {
        name: String,
    },
    NoMember {
        owner: String,
        member: String,
    },
    PrivateMember {
        owner: String,
        member: String,
    },
    UsePathNotFound {
        path: String,
    },
    WildcardOnNonScope {
        path: String,
    },

    // -- Typecheck -----------------------------------------------------------
    TypeMismatch {
        expected: TypeId,
        actual: TypeId,
    },
    ExpectedReference {
        actual: TypeId,
    },
    ExpectedMutable {
        actual: TypeId,
    },
    ExpectedArithmetic {
        actual: TypeId,
    },
    ExpectedInteger {
        actual: TypeId,
    },
    ExpectedIntegerOrFloat {
        actual: TypeId,
    },
    ExpectedBool {
        actual: TypeId,
    },
    ExpectedPointer {
        actual: TypeId,
    },
    ExpectedArray {
        actual: TypeId,
    },
    ExpectedVector {
        actual: TypeId,
    },
    ExpectedOptional {
        actual: TypeId,
    },
    ExpectedCallable {
        actual: TypeId,
    },
    ArityMismatch {
        expected: usize,
        actual: usize,
    },
    UnknownMember {
        owner: String,
        member: String,
    },
    GenericArityMismatch {
        expected: usize,
        actual: usize,
    },
    NotGeneric {
        name: String,
    },

    // -- Control-flow -----------------------------------------------------------
    MissingReturn {
        function: String,
    },
    UnreachableCode,
    BreakOutsideLoop,
    ContinueOutsideLoop,
    DeferOutsideBlock,

    // -- Warnings -----------------------------------------------------------
    MixedSignedness {
        lhs: TypeId,
        rhs: TypeId,
    },
    NarrowingConversion {
        from: TypeId,
        to: TypeId,
    },
}

impl DiagnosticKind {
    /// Stable name used in config deny-lists (`tauc.toml`'s `deny` list)
    /// and in rendered diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            DiagnosticKind::SymbolCollision { .. } => "symbol_collision",
            DiagnosticKind::UndefinedSymbol { .. } => "undefined_symbol",
            DiagnosticKind::NoMember { .. } => "no_member",
            DiagnosticKind::PrivateMember { .. } => "private_member",
            DiagnosticKind::UsePathNotFound { .. } => "use_path_not_found",
            DiagnosticKind::WildcardOnNonScope { .. } => "wildcard_on_non_scope",
            DiagnosticKind::TypeMismatch { .. } => "type_mismatch",
            DiagnosticKind::ExpectedReference { .. } => "expected_reference",
            DiagnosticKind::ExpectedMutable { .. } => "expected_mutable",
            DiagnosticKind::ExpectedArithmetic { .. } => "expected_arithmetic",
            DiagnosticKind::ExpectedInteger { .. } => "expected_integer",
            DiagnosticKind::ExpectedIntegerOrFloat { .. } => "expected_integer_or_float",
            DiagnosticKind::ExpectedBool { .. } => "expected_bool",
            DiagnosticKind::ExpectedPointer { .. } => "expected_pointer",
            DiagnosticKind::ExpectedArray { .. } => "expected_array",
            DiagnosticKind::ExpectedVector { .. } => "expected_vector",
            DiagnosticKind::ExpectedOptional { .. } => "expected_optional",
            DiagnosticKind::ExpectedCallable { .. } => "expected_callable",
            DiagnosticKind::ArityMismatch { .. } => "arity_mismatch",
            DiagnosticKind::UnknownMember { .. } => "unknown_member",
            DiagnosticKind::GenericArityMismatch { .. } => "generic_arity_mismatch",
            DiagnosticKind::NotGeneric { .. } => "not_generic",
            DiagnosticKind::MissingReturn { .. } => "missing_return",
            DiagnosticKind::UnreachableCode => "unreachable_code",
            DiagnosticKind::BreakOutsideLoop => "break_outside_loop",
            DiagnosticKind::ContinueOutsideLoop => "continue_outside_loop",
            DiagnosticKind::DeferOutsideBlock => "defer_outside_block",
            DiagnosticKind::MixedSignedness { .. } => "mixed_signedness",
            DiagnosticKind::NarrowingConversion { .. } => "narrowing_conversion",
        }
    }

    /// Only `mixed_signedness` and `narrowing_conversion` are warnings;
    /// everything else is a hard error.
    pub fn severity(&self) -> Severity {
        match self {
            DiagnosticKind::MixedSignedness { .. } | DiagnosticKind::NarrowingConversion { .. } => {
                Severity::Warning
            }
            _ => Severity::Error,
        }
    }
}
