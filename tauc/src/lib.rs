//! Semantic analysis core for the Tau systems programming language.
//!
//! This crate turns a parsed AST (built node-by-node through
//! [`ast::registry::AstRegistry::register`]) into a fully type-checked,
//! scope-resolved program: [`analysis::nameres`] binds
//! every identifier to a declaration, [`analysis::typecheck`] populates the
//! [`types::table::TypeTable`], [`analysis::cfa`] verifies reachability and
//! return coverage, and [`analysis::mangle`] prepares final names for
//! handoff to an external code generator. [`pipeline`] drives the four
//! passes in order over a [`pipeline::CompilationContext`].
//!
//! Lexing, parsing, code generation, and the CLI driver proper are treated
//! as external collaborators — this crate defines the seams they seat
//! into, not their implementations.

pub mod analysis;
pub mod ast;
pub mod config;
pub mod demo;
pub mod diagnostics;
pub mod error;
pub mod pipeline;
pub mod symtab;
pub mod types;
