use crate::{AstSnapshot, CType, Decl, SnapshotError};
use clang_ast::{Id, Node};
use std::collections::HashMap;
use type_tree::{AstProvider, CTypeKind, CursorKind, LayoutError};

/// A cursor into a snapshot's declaration tree. `SnapshotCursor(None)` is the null cursor.
#[derive(Clone, Copy, Debug)]
pub struct SnapshotCursor<'a>(pub Option<&'a Node<Decl>>);

impl<'a> SnapshotCursor<'a> {
    fn decl(self) -> Option<&'a Decl> {
        self.0.map(|node| &node.kind)
    }
}

/// Answers [AstProvider] queries from an [AstSnapshot].
pub struct AstIndex<'a> {
    snapshot: &'a AstSnapshot,
    declarations: HashMap<Id, &'a Node<Decl>>,
}

impl<'a> AstIndex<'a> {
    /// Indexes the declarations of `snapshot` by id and checks that every type's declaration
    /// reference resolves.
    pub fn new(snapshot: &'a AstSnapshot) -> Result<AstIndex<'a>, SnapshotError> {
        let mut declarations = HashMap::new();
        let mut types = Vec::new();
        let mut stack = vec![&snapshot.ast];
        while let Some(node) = stack.pop() {
            declarations.insert(node.id, node);
            match &node.kind {
                Decl::TypedefDecl {
                    underlying_type: ty,
                    ..
                }
                | Decl::FieldDecl { ty, .. }
                | Decl::EnumConstantDecl { ty, .. } => types.push(ty),
                _ => {}
            }
            stack.extend(node.inner.iter().rev());
        }
        while let Some(ty) = types.pop() {
            match ty.decl_id {
                Some(id) if !declarations.contains_key(&id) => {
                    return Err(SnapshotError::DanglingDeclaration {
                        id,
                        spelling: ty.spelling.clone(),
                    });
                }
                _ => {}
            }
            types.extend(ty.element_type.as_deref());
        }
        Ok(AstIndex {
            snapshot,
            declarations,
        })
    }
}

impl<'a> AstProvider for AstIndex<'a> {
    type Cursor = SnapshotCursor<'a>;
    type Type = &'a CType;

    fn translation_unit(&self) -> SnapshotCursor<'a> {
        SnapshotCursor(Some(&self.snapshot.ast))
    }

    fn visit_children(
        &self,
        cursor: SnapshotCursor<'a>,
        visitor: &mut dyn FnMut(SnapshotCursor<'a>),
    ) {
        if let Some(node) = cursor.0 {
            for child in &node.inner {
                visitor(SnapshotCursor(Some(child)));
            }
        }
    }

    fn cursor_kind(&self, cursor: SnapshotCursor<'a>) -> CursorKind {
        match cursor.decl() {
            None => CursorKind::NoDeclFound,
            Some(Decl::TranslationUnitDecl) => CursorKind::TranslationUnit,
            Some(Decl::TypedefDecl { .. }) => CursorKind::TypedefDecl,
            Some(Decl::StructDecl { .. }) => CursorKind::StructDecl,
            Some(Decl::UnionDecl { .. }) => CursorKind::UnionDecl,
            Some(Decl::EnumDecl { .. }) => CursorKind::EnumDecl,
            Some(Decl::FieldDecl { .. }) => CursorKind::FieldDecl,
            Some(Decl::EnumConstantDecl { .. }) => CursorKind::EnumConstantDecl,
            Some(Decl::Other { .. }) => CursorKind::Other,
        }
    }

    fn cursor_spelling(&self, cursor: SnapshotCursor<'a>) -> String {
        match cursor.decl() {
            Some(Decl::TranslationUnitDecl) => self.snapshot.file.display().to_string(),
            Some(decl) => decl.name().to_owned(),
            None => String::new(),
        }
    }

    fn cursor_type(&self, cursor: SnapshotCursor<'a>) -> Option<&'a CType> {
        match cursor.decl()? {
            Decl::FieldDecl { ty, .. } | Decl::EnumConstantDecl { ty, .. } => Some(ty),
            _ => None,
        }
    }

    fn typedef_underlying_type(&self, cursor: SnapshotCursor<'a>) -> Option<&'a CType> {
        match cursor.decl()? {
            Decl::TypedefDecl {
                underlying_type, ..
            } => Some(underlying_type),
            _ => None,
        }
    }

    fn type_kind(&self, ty: &'a CType) -> CTypeKind {
        CTypeKind::from_spelling(&ty.kind)
    }

    fn type_spelling(&self, ty: &'a CType) -> String {
        ty.spelling.clone()
    }

    fn size_of(&self, ty: &'a CType) -> Result<i64, LayoutError> {
        LayoutError::check(ty.size)
    }

    fn align_of(&self, ty: &'a CType) -> Result<i64, LayoutError> {
        LayoutError::check(ty.align)
    }

    fn type_declaration(&self, ty: &'a CType) -> SnapshotCursor<'a> {
        SnapshotCursor(ty.decl_id.and_then(|id| self.declarations.get(&id).copied()))
    }

    fn array_element_type(&self, ty: &'a CType) -> Option<&'a CType> {
        ty.element_type.as_deref()
    }

    fn enum_constant_value(&self, cursor: SnapshotCursor<'a>) -> i64 {
        match cursor.decl() {
            Some(Decl::EnumConstantDecl { value, .. }) => *value,
            _ => 0,
        }
    }
}
