//! The four analysis passes plus the generic-instantiation machinery they
//! share. Passes run strictly in
//! order and never re-enter an earlier one: [`nameres`] binds identifiers
//! and paths, [`typecheck`] populates the type table, [`cfa`] verifies
//! reachability and return coverage, and [`mangle`] prepares final names
//! for the (external) codegen handoff. [`generics`] backs both nameres
//! and typecheck when a generic specialization is encountered.

pub mod cfa;
pub mod generics;
pub mod mangle;
pub mod nameres;
pub mod typecheck;
