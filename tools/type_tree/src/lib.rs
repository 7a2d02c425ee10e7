//! Builds the type forest of a translation unit.
//!
//! [TypeTreeBuilder] starts at the typedefs of the translation unit and follows each one into
//! the types it names: struct, union and enum declarations are descended into member by member,
//! arrays into their element type. Every cursor/type pair it meets becomes a [TypeEvent] and goes
//! through [classify], which places the resulting node in a [TypeArena].
//!
//! The front end is abstracted by [AstProvider].

pub mod arena;
pub mod classify;
pub mod provider;
pub mod test_util;
mod traversal;

#[cfg(test)]
mod tests;

pub use arena::{NodeId, TypeArena};
pub use classify::{TypeEvent, classify};
pub use provider::{AstProvider, CTypeKind, CursorKind, LayoutError};
pub use traversal::{TypeTreeBuilder, build_types};
