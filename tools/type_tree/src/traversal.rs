use crate::arena::{NodeId, TypeArena};
use crate::classify::{TypeEvent, classify};
use crate::provider::{AstProvider, CTypeKind, CursorKind};
use tracing::{debug, info, warn};
use typedb_core::TypeNode;
use typedb_core::config::DedupPolicy;

/// Walks a translation unit through an [AstProvider] and collects every type reachable from its
/// typedefs.
///
/// The parent node is passed down explicitly through each descent; a builder holds no other
/// traversal state, so it can be driven from any provider callback.
pub struct TypeTreeBuilder<'p, P: AstProvider> {
    provider: &'p P,
    arena: TypeArena,
}

impl<'p, P: AstProvider> TypeTreeBuilder<'p, P> {
    pub fn new(provider: &'p P, policy: DedupPolicy) -> Self {
        TypeTreeBuilder {
            provider,
            arena: TypeArena::new(policy),
        }
    }

    /// Runs the traversal from the translation unit cursor and returns the root types in
    /// declaration order.
    pub fn build(mut self) -> Vec<TypeNode> {
        let unit = self.provider.translation_unit();
        self.visit_declarations(unit, None);
        info!(
            "Found {} root types ({} nodes)",
            self.arena.roots().len(),
            self.arena.len()
        );
        self.arena.into_forest()
    }

    /// Classifies the aliased type of every typedef among the children of `cursor`.
    fn visit_declarations(&mut self, cursor: P::Cursor, parent: Option<NodeId>) {
        let provider = self.provider;
        provider.visit_children(cursor, &mut |child| {
            if provider.cursor_kind(child) != CursorKind::TypedefDecl {
                return;
            }
            let name = provider.cursor_spelling(child);
            match provider.typedef_underlying_type(child) {
                Some(underlying) => {
                    debug!("typedef {name:?}");
                    self.handle_type(child, name, underlying, parent);
                }
                None => warn!("typedef {name:?} has no underlying type"),
            }
        });
    }

    /// Classifies the type of every named child of a struct, union or enum declaration.
    fn visit_members(&mut self, declaration: P::Cursor, parent: NodeId) {
        let provider = self.provider;
        provider.visit_children(declaration, &mut |child| {
            let name = provider.cursor_spelling(child);
            if name.is_empty() {
                return;
            }
            match provider.cursor_type(child) {
                Some(ty) => self.handle_type(child, name, ty, Some(parent)),
                None => debug!("member {name:?} has no type"),
            }
        });
    }

    fn handle_type(
        &mut self,
        cursor: P::Cursor,
        name: String,
        ty: P::Type,
        parent: Option<NodeId>,
    ) {
        let provider = self.provider;
        let declaration = provider.type_declaration(ty);
        let event = TypeEvent {
            name,
            type_spelling: provider.type_spelling(ty),
            cursor_spelling: provider.cursor_spelling(cursor),
            size: provider.size_of(ty),
            align: provider.align_of(ty),
            kind: provider.type_kind(ty),
            declaration: provider.cursor_kind(declaration),
            enum_value: (provider.cursor_kind(cursor) == CursorKind::EnumConstantDecl)
                .then(|| provider.enum_constant_value(cursor)),
        };
        let Some(id) = classify(&mut self.arena, &event, parent) else {
            return;
        };
        match event.kind {
            CTypeKind::Typedef => self.visit_declarations(cursor, Some(id)),
            CTypeKind::ConstantArray => match provider.array_element_type(ty) {
                Some(element) => {
                    let element_declaration = provider.type_declaration(element);
                    let element_name = provider.cursor_spelling(element_declaration);
                    self.handle_type(element_declaration, element_name, element, Some(id));
                    if self.arena.children(id).is_empty() {
                        warn!(
                            "Array {:?} has an element type without a mapping: {}",
                            event.name,
                            provider.type_spelling(element)
                        );
                    }
                }
                None => warn!("Array {:?} has no element type", event.name),
            },
            CTypeKind::Elaborated => self.visit_members(declaration, id),
            _ => {}
        }
    }
}

/// Builds the type forest of the translation unit behind `provider`.
pub fn build_types<P: AstProvider>(provider: &P, policy: DedupPolicy) -> Vec<TypeNode> {
    TypeTreeBuilder::new(provider, policy).build()
}
