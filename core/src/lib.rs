//! Shared data model, configuration, and binary codec for the type database extractor.
//!
//! The type database is a forest of [TypeNode]s (one tree per global type discovered in a
//! translation unit) plus the list of `#define NAME VALUE` pairs recovered from the token stream.
//! [codec] turns a [TypeDatabase] into the on-disk byte layout consumed by code generators and
//! back.

pub mod codec;
pub mod config;
mod model;
pub mod test_util;

pub use model::{DefineEntry, LoadError, TypeDatabase, TypeKind, TypeNode};
