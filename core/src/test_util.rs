//! Place to put utilities that are only used by tests.

use crate::{DefineEntry, TypeDatabase, TypeKind, TypeNode};

/// Returns a new temporary directory. Unlike the defaults in the `tempdir` and `tempfile` crates,
/// this directory is not world-accessible by default.
#[cfg(not(miri))]
pub fn tempdir() -> std::io::Result<tempfile::TempDir> {
    use std::fs::Permissions;
    let mut builder = tempfile::Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(Permissions::from_mode(0o700));
    }
    builder.tempdir()
}

/// A builtin scalar node as the builder would emit it for a member or typedef named `member`.
pub fn scalar(type_name: &str, member: &str, size: u32) -> TypeNode {
    TypeNode::new(type_name, TypeKind::Simple)
        .member(member)
        .layout(size, size)
}

/// A database resembling what a small header produces:
///
/// ```c
/// #define VERSION 3
/// #define NAME_LEN (16)
/// typedef unsigned int u32;
/// typedef struct point { int x; int y; } point_t;
/// typedef enum color { RED, GREEN = 5 } color_t;
/// typedef struct point line_t[2];
/// typedef union word { u32 raw; char bytes[4]; } word_t;
/// typedef void nothing_t;
/// ```
pub fn sample_database() -> TypeDatabase {
    let point = TypeNode::new("struct point", TypeKind::Struct)
        .member("point_t")
        .layout(8, 4)
        .child(scalar("Int", "x", 4))
        .child(scalar("Int", "y", 4));
    let color = TypeNode::new("enum color", TypeKind::Enum)
        .member("color_t")
        .layout(4, 4)
        .child(scalar("UInt", "RED", 4).constant(0))
        .child(scalar("UInt", "GREEN", 4).constant(5));
    let line = TypeNode::new("line_t", TypeKind::Array)
        .member("line_t")
        .layout(16, 4)
        .child(
            TypeNode::new("struct point", TypeKind::Struct)
                .member("point")
                .layout(8, 4)
                .child(scalar("Int", "x", 4))
                .child(scalar("Int", "y", 4)),
        );
    let word = TypeNode::new("union word", TypeKind::Union)
        .member("word_t")
        .layout(4, 4)
        .child(TypeNode::new("u32", TypeKind::Simple).member("raw").layout(4, 4))
        .child(
            TypeNode::new("bytes", TypeKind::Array)
                .member("bytes")
                .layout(4, 1)
                .child(scalar("Char_S", "", 1)),
        );
    TypeDatabase {
        types: vec![
            scalar("UInt", "u32", 4),
            point,
            color,
            line,
            word,
            TypeNode::new("Void", TypeKind::Simple).member("nothing_t"),
        ],
        defines: vec![
            DefineEntry::new("VERSION", "3"),
            DefineEntry::new("NAME_LEN", "(16)"),
        ],
    }
}

/// A single chain of `depth` nested single-element arrays ending in an `Int`.
pub fn nested_arrays(depth: usize) -> TypeNode {
    let mut node = scalar("Int", "", 4);
    for level in 0..depth {
        node = TypeNode::new(format!("level{level}"), TypeKind::Array)
            .member(format!("level{level}"))
            .layout(4, 4)
            .child(node);
    }
    node
}
