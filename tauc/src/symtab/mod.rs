//! Lexical scope/symbol table tree backing the nameres pass.

pub mod scope;
