//! AST model: node kinds, the owning registry, token storage, and the
//! debugging-aid JSON dumper.

pub mod dump;
pub mod node;
pub mod registry;
pub mod token;
