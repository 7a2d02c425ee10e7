use crate::build_types;
use crate::provider::{CTypeKind, CursorKind, LayoutError};
use crate::test_util::{MockAst, MockType};
use typedb_core::config::DedupPolicy;
use typedb_core::{TypeKind, TypeNode};

fn int_member(name: &str) -> TypeNode {
    TypeNode::new("Int", TypeKind::Simple)
        .member(name)
        .layout(4, 4)
}

/// `struct point { int x; int y; };`
fn declare_point(ast: &mut MockAst) -> MockType {
    let int = ast.builtin(CTypeKind::Int, "int", 4, 4);
    let point = ast.record(ast.unit(), CursorKind::StructDecl, "point");
    ast.field(point, "x", int);
    ast.field(point, "y", int);
    ast.elaborated(point, "struct point", 8, 4)
}

#[test]
fn array_of_struct() {
    let mut ast = MockAst::new();
    let point = declare_point(&mut ast);
    let line = ast.array(point, 4);
    ast.typedef(ast.unit(), "line_t", line);

    let forest = build_types(&ast, DedupPolicy::Keep);
    assert_eq!(
        forest,
        [TypeNode::new("line_t", TypeKind::Array)
            .member("line_t")
            .layout(32, 4)
            .child(
                TypeNode::new("struct point", TypeKind::Struct)
                    .member("point")
                    .layout(8, 4)
                    .child(int_member("x"))
                    .child(int_member("y"))
            )]
    );
}

#[test]
fn enum_constants() {
    let mut ast = MockAst::new();
    let int = ast.builtin(CTypeKind::Int, "int", 4, 4);
    let flags = ast.record(ast.unit(), CursorKind::EnumDecl, "flags");
    ast.enumerator(flags, "A", 0, int);
    ast.enumerator(flags, "B", 5, int);
    let flags = ast.elaborated(flags, "enum flags", 4, 4);
    ast.typedef(ast.unit(), "flags_t", flags);

    let forest = build_types(&ast, DedupPolicy::Keep);
    assert_eq!(
        forest,
        [TypeNode::new("enum flags", TypeKind::Enum)
            .member("flags_t")
            .layout(4, 4)
            .child(int_member("A").constant(0))
            .child(int_member("B").constant(5))]
    );
    assert!(forest[0].children.iter().all(|child| child.is_const_value));
}

#[test]
fn duplicate_roots_are_kept_by_default() {
    let mut ast = MockAst::new();
    let uint = ast.builtin(CTypeKind::UInt, "unsigned int", 4, 4);
    ast.typedef(ast.unit(), "u32", uint);
    ast.typedef(ast.unit(), "u32", uint);

    let u32_node = TypeNode::new("UInt", TypeKind::Simple)
        .member("u32")
        .layout(4, 4);
    assert_eq!(
        build_types(&ast, DedupPolicy::Keep),
        [u32_node.clone(), u32_node.clone()]
    );
    assert_eq!(build_types(&ast, DedupPolicy::ByTypeName), [u32_node]);
}

#[test]
fn dedup_discards_whole_subtree() {
    let mut ast = MockAst::new();
    let point = declare_point(&mut ast);
    ast.typedef(ast.unit(), "point_t", point);
    ast.typedef(ast.unit(), "pt", point);

    let kept = build_types(&ast, DedupPolicy::Keep);
    assert_eq!(kept.len(), 2);
    assert_eq!(kept[1].member_name, "pt");
    assert_eq!(kept[1].children.len(), 2);

    let deduped = build_types(&ast, DedupPolicy::ByTypeName);
    assert_eq!(deduped.len(), 1);
    assert_eq!(deduped[0].member_name, "point_t");
    assert_eq!(deduped[0].children, [int_member("x"), int_member("y")]);
}

#[test]
fn void_has_zero_layout() {
    let mut ast = MockAst::new();
    let void = ast.builtin(CTypeKind::Void, "void", 1, 1);
    ast.typedef(ast.unit(), "nothing_t", void);
    assert_eq!(
        build_types(&ast, DedupPolicy::Keep),
        [TypeNode::new("Void", TypeKind::Simple).member("nothing_t")]
    );
}

#[test]
fn unsupported_kinds_are_dropped() {
    let mut ast = MockAst::new();
    let int = ast.builtin(CTypeKind::Int, "int", 4, 4);
    let reference = ast.builtin("LValueReference".parse().unwrap(), "int &", 8, 8);
    let function = ast.builtin("FunctionProto".parse().unwrap(), "int (int)", 1, 4);
    ast.typedef(ast.unit(), "ref_t", reference);
    ast.typedef(ast.unit(), "fn_t", function);
    let holder = ast.record(ast.unit(), CursorKind::StructDecl, "holder");
    ast.field(holder, "r", reference);
    ast.field(holder, "n", int);
    let holder = ast.elaborated(holder, "struct holder", 16, 8);
    ast.typedef(ast.unit(), "holder_t", holder);

    assert_eq!(
        build_types(&ast, DedupPolicy::Keep),
        [TypeNode::new("struct holder", TypeKind::Struct)
            .member("holder_t")
            .layout(16, 8)
            .child(int_member("n"))]
    );
}

#[test]
fn layout_errors_keep_sentinels() {
    let mut ast = MockAst::new();
    let opaque = ast.record(ast.unit(), CursorKind::StructDecl, "opaque");
    let opaque = ast.elaborated(
        opaque,
        "struct opaque",
        LayoutError::Incomplete.raw(),
        LayoutError::Incomplete.raw(),
    );
    ast.typedef(ast.unit(), "opaque_t", opaque);

    assert_eq!(
        build_types(&ast, DedupPolicy::Keep),
        [TypeNode::new("struct opaque", TypeKind::Struct)
            .member("opaque_t")
            .layout(0xFFFF_FFFE, 0xFFFF_FFFE)]
    );
}

#[test]
fn typedef_of_typedef() {
    let mut ast = MockAst::new();
    let int = ast.builtin(CTypeKind::Int, "int", 4, 4);
    let a = ast.typedef(ast.unit(), "a_t", int);
    let a = ast.typedef_type(a);
    ast.typedef(ast.unit(), "b_t", a);

    assert_eq!(
        build_types(&ast, DedupPolicy::Keep),
        [
            int_member("a_t"),
            TypeNode::new("a_t", TypeKind::Simple)
                .member("b_t")
                .layout(4, 4),
        ]
    );
}

#[test]
fn typedef_children_are_declarations() {
    // A typedef declared inside another typedef's declaration is attached to the outer node.
    let mut ast = MockAst::new();
    let int = ast.builtin(CTypeKind::Int, "int", 4, 4);
    let a = ast.typedef(ast.unit(), "a_t", int);
    let a_type = ast.typedef_type(a);
    let b = ast.typedef(ast.unit(), "b_t", a_type);
    ast.typedef(b, "inner_t", int);
    ast.other(b, "a_t");

    let forest = build_types(&ast, DedupPolicy::Keep);
    assert_eq!(forest.len(), 2);
    assert_eq!(forest[1].children, [int_member("inner_t")]);
}

#[test]
fn member_arrays_and_nested_records() {
    let mut ast = MockAst::new();
    let point = declare_point(&mut ast);
    let char_s = ast.builtin(CTypeKind::CharS, "char", 1, 1);
    let name = ast.array(char_s, 16);
    let shape = ast.record(ast.unit(), CursorKind::UnionDecl, "shape");
    ast.field(shape, "name", name);
    ast.field(shape, "origin", point);
    // Anonymous members are skipped.
    ast.field(shape, "", char_s);
    let shape = ast.elaborated(shape, "union shape", 16, 4);
    ast.typedef(ast.unit(), "shape_t", shape);

    assert_eq!(
        build_types(&ast, DedupPolicy::Keep),
        [TypeNode::new("union shape", TypeKind::Union)
            .member("shape_t")
            .layout(16, 4)
            .child(
                TypeNode::new("name", TypeKind::Array)
                    .member("name")
                    .layout(16, 1)
                    .child(TypeNode::new("Char_S", TypeKind::Simple).layout(1, 1))
            )
            .child(
                TypeNode::new("struct point", TypeKind::Struct)
                    .member("origin")
                    .layout(8, 4)
                    .child(int_member("x"))
                    .child(int_member("y"))
            )]
    );
}

#[test]
fn only_typedefs_start_root_types() {
    let mut ast = MockAst::new();
    declare_point(&mut ast);
    ast.other(ast.unit(), "main");
    assert!(build_types(&ast, DedupPolicy::Keep).is_empty());
}
