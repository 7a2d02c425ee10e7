use crate::arena::{NodeId, TypeArena};
use crate::provider::{CTypeKind, CursorKind, LayoutError};
use tracing::{debug, warn};
use typedb_core::{TypeKind, TypeNode};

/// Everything the builder needs to know about one cursor/type pair, already queried from the
/// provider.
#[derive(Clone, Debug, PartialEq)]
pub struct TypeEvent {
    /// Name supplied by the caller: the typedef or member name, or the declaration spelling for
    /// array elements. Arrays are named by it.
    pub name: String,
    pub type_spelling: String,
    /// Spelling of the owning cursor; becomes the node's member name.
    pub cursor_spelling: String,
    pub size: Result<i64, LayoutError>,
    pub align: Result<i64, LayoutError>,
    pub kind: CTypeKind,
    /// Declaration kind of the type, used to tell structs, unions and enums apart.
    pub declaration: CursorKind,
    /// Set for enumerator constants.
    pub enum_value: Option<i64>,
}

/// Creates the node described by `event` under `parent` (or as a root type), without descending
/// into it.
///
/// Returns `None` when no node is created: the type kind is unsupported, or the dedup policy
/// rejected a root. In both cases the caller must not descend.
pub fn classify(
    arena: &mut TypeArena,
    event: &TypeEvent,
    parent: Option<NodeId>,
) -> Option<NodeId> {
    let size = layout_value(event.size, "size", event);
    let align = layout_value(event.align, "alignment", event);
    let mut node = TypeNode::new("", TypeKind::Simple)
        .member(event.cursor_spelling.as_str())
        .layout(size, align);
    if let Some(value) = event.enum_value {
        debug!("enum constant {} = {value}", event.cursor_spelling);
        node = node.constant(value);
    }

    match &event.kind {
        CTypeKind::Void => {
            node.type_name = "Void".into();
            node.size_bytes = 0;
            node.align_bytes = 0;
        }
        CTypeKind::Typedef => node.type_name = event.type_spelling.clone(),
        CTypeKind::ConstantArray => {
            node.type_name = event.name.clone();
            node.kind = TypeKind::Array;
        }
        CTypeKind::Elaborated => {
            node.type_name = event.type_spelling.clone();
            node.kind = match event.declaration {
                CursorKind::StructDecl => TypeKind::Struct,
                CursorKind::UnionDecl => TypeKind::Union,
                CursorKind::EnumDecl => TypeKind::Enum,
                _ => TypeKind::Simple,
            };
        }
        kind => match kind.builtin_name() {
            Some(name) => node.type_name = name.into(),
            None => {
                debug!(
                    "Skipping {:?} ({}) of unsupported kind {kind:?}",
                    event.name, event.type_spelling
                );
                return None;
            }
        },
    }
    arena.add(node, parent)
}

/// Logs a failed layout query and returns the raw sentinel, reinterpreted as unsigned.
fn layout_value(result: Result<i64, LayoutError>, what: &str, event: &TypeEvent) -> u32 {
    match result {
        Ok(value) => value as u32,
        Err(error) => {
            warn!(
                "Cannot query {what} of {:?} ({}): {error}",
                event.name, event.type_spelling
            );
            error.raw() as u32
        }
    }
}
