//! The append-only error bag.

use crate::ast::token::SourceLocation;
use crate::diagnostics::kind::{DiagnosticKind, Severity};

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub primary: SourceLocation,
    pub secondary: Vec<SourceLocation>,
}

impl Diagnostic {
    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }
}

/// Single append-only container for the current compilation. Entries stay
/// in insertion order, which is AST traversal order — the printer relies
/// on this instead of sorting by location.
#[derive(Debug, Default)]
pub struct ErrorBag {
    entries: Vec<Diagnostic>,
}

impl ErrorBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: DiagnosticKind, primary: SourceLocation) {
        self.entries.push(Diagnostic {
            kind,
            primary,
            secondary: Vec::new(),
        });
    }

    pub fn push_with_secondary(
        &mut self,
        kind: DiagnosticKind,
        primary: SourceLocation,
        secondary: Vec<SourceLocation>,
    ) {
        self.entries.push(Diagnostic {
            kind,
            primary,
            secondary,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// Whether the bag has anything beyond warnings; a non-warning entry
    /// is what drives the compiler's non-zero exit code.
    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|d| d.severity() == Severity::Error)
    }

    /// Drops every diagnostic whose kind name matches a config deny-list
    /// entry, demoting the rest to a terminal listing for the printer.
    pub fn retain_undenied(&mut self, is_denied: impl Fn(&str) -> bool) {
        self.entries.retain(|d| !is_denied(d.kind.name()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::token::{BytePos, TokenKind, TokenRegistry};

    fn loc() -> SourceLocation {
        let mut tokens = TokenRegistry::new();
        let file = tokens.register_file("t.tau", "x");
        let tok = tokens.token_init(file, TokenKind::Ident, BytePos(0));
        tokens.locate(tok)
    }

    #[test]
    fn warnings_do_not_count_as_errors() {
        let mut bag = ErrorBag::new();
        bag.push(
            DiagnosticKind::MixedSignedness {
                lhs: crate::types::desc::TypeId::new(0),
                rhs: crate::types::desc::TypeId::new(1),
            },
            loc(),
        );
        assert!(!bag.has_errors());
        assert_eq!(bag.len(), 1);
    }

    #[test]
    fn hard_errors_count_and_insertion_order_is_preserved() {
        let mut bag = ErrorBag::new();
        bag.push(DiagnosticKind::UndefinedSymbol { name: "a".into() }, loc());
        bag.push(DiagnosticKind::UndefinedSymbol { name: "b".into() }, loc());
        assert!(bag.has_errors());
        let names: Vec<_> = bag
            .iter()
            .map(|d| match &d.kind {
                DiagnosticKind::UndefinedSymbol { name } => name.as_str(),
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn deny_list_filters_by_kind_name() {
        let mut bag = ErrorBag::new();
        bag.push(DiagnosticKind::UnreachableCode, loc());
        bag.push(DiagnosticKind::BreakOutsideLoop, loc());
        bag.retain_undenied(|name| name == "unreachable_code");
        assert_eq!(bag.len(), 1);
    }
}
