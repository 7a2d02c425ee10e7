//! Place to put utilities that are only used by tests.

use crate::provider::{AstProvider, CTypeKind, CursorKind, LayoutError};

/// Handle to a cursor of a [MockAst]. `MockCursor(None)` is the null cursor.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MockCursor(Option<usize>);

/// Handle to a type of a [MockAst].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MockType(usize);

struct CursorData {
    kind: CursorKind,
    spelling: String,
    ty: Option<MockType>,
    underlying: Option<MockType>,
    value: i64,
    children: Vec<MockCursor>,
}

struct TypeData {
    kind: CTypeKind,
    spelling: String,
    size: i64,
    align: i64,
    declaration: MockCursor,
    element: Option<MockType>,
}

/// An in-memory translation unit that can be assembled declaration by declaration, for testing
/// code that walks an [AstProvider].
///
/// # Example
/// ```
/// use type_tree::provider::CTypeKind;
/// use type_tree::test_util::MockAst;
/// let mut ast = MockAst::new();
/// let int = ast.builtin(CTypeKind::Int, "int", 4, 4);
/// ast.typedef(ast.unit(), "my_int", int);
/// ```
pub struct MockAst {
    cursors: Vec<CursorData>,
    types: Vec<TypeData>,
}

impl Default for MockAst {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAst {
    /// Creates an empty translation unit.
    pub fn new() -> MockAst {
        MockAst {
            cursors: vec![CursorData {
                kind: CursorKind::TranslationUnit,
                spelling: "mock.h".into(),
                ty: None,
                underlying: None,
                value: 0,
                children: Vec::new(),
            }],
            types: Vec::new(),
        }
    }

    pub fn unit(&self) -> MockCursor {
        MockCursor(Some(0))
    }

    /// Adds a type without a declaration. `size` and `align` are raw layout answers, so negative
    /// values act as layout errors.
    pub fn builtin(&mut self, kind: CTypeKind, spelling: &str, size: i64, align: i64) -> MockType {
        self.add_type(kind, spelling, size, align, MockCursor(None))
    }

    /// Declares `typedef <underlying> name;` under `parent`.
    pub fn typedef(&mut self, parent: MockCursor, name: &str, underlying: MockType) -> MockCursor {
        let cursor = self.add_cursor(parent, CursorKind::TypedefDecl, name);
        self.cursor_mut(cursor).underlying = Some(underlying);
        cursor
    }

    /// The type that names `typedef_decl`, laid out like its underlying type.
    pub fn typedef_type(&mut self, typedef_decl: MockCursor) -> MockType {
        let data = self.cursor(typedef_decl);
        let spelling = data.spelling.clone();
        let (size, align) = match data.underlying {
            Some(underlying) => (self.ty(underlying).size, self.ty(underlying).align),
            None => (LayoutError::Invalid.raw(), LayoutError::Invalid.raw()),
        };
        self.add_type(CTypeKind::Typedef, &spelling, size, align, typedef_decl)
    }

    /// Declares a struct, union or enum named `name` (empty for anonymous) under `parent`.
    pub fn record(&mut self, parent: MockCursor, kind: CursorKind, name: &str) -> MockCursor {
        self.add_cursor(parent, kind, name)
    }

    /// The elaborated type referring to `declaration`, e.g. `struct point`.
    pub fn elaborated(
        &mut self,
        declaration: MockCursor,
        spelling: &str,
        size: i64,
        align: i64,
    ) -> MockType {
        self.add_type(CTypeKind::Elaborated, spelling, size, align, declaration)
    }

    /// Adds a member of type `ty` to a struct or union declaration.
    pub fn field(&mut self, record: MockCursor, name: &str, ty: MockType) -> MockCursor {
        let cursor = self.add_cursor(record, CursorKind::FieldDecl, name);
        self.cursor_mut(cursor).ty = Some(ty);
        cursor
    }

    /// Adds an enumerator of type `ty` with the given value to an enum declaration.
    pub fn enumerator(
        &mut self,
        enum_decl: MockCursor,
        name: &str,
        value: i64,
        ty: MockType,
    ) -> MockCursor {
        let cursor = self.add_cursor(enum_decl, CursorKind::EnumConstantDecl, name);
        let data = self.cursor_mut(cursor);
        data.ty = Some(ty);
        data.value = value;
        cursor
    }

    /// Adds a cursor the builder has no interest in, such as a function declaration.
    pub fn other(&mut self, parent: MockCursor, name: &str) -> MockCursor {
        self.add_cursor(parent, CursorKind::Other, name)
    }

    /// The type `element[len]`.
    pub fn array(&mut self, element: MockType, len: i64) -> MockType {
        let data = self.ty(element);
        let spelling = format!("{}[{len}]", data.spelling);
        let (size, align) = (data.size * len, data.align);
        let array = self.add_type(
            CTypeKind::ConstantArray,
            &spelling,
            size,
            align,
            MockCursor(None),
        );
        self.types[array.0].element = Some(element);
        array
    }

    fn add_cursor(&mut self, parent: MockCursor, kind: CursorKind, spelling: &str) -> MockCursor {
        let cursor = MockCursor(Some(self.cursors.len()));
        self.cursors.push(CursorData {
            kind,
            spelling: spelling.into(),
            ty: None,
            underlying: None,
            value: 0,
            children: Vec::new(),
        });
        self.cursor_mut(parent).children.push(cursor);
        cursor
    }

    fn add_type(
        &mut self,
        kind: CTypeKind,
        spelling: &str,
        size: i64,
        align: i64,
        declaration: MockCursor,
    ) -> MockType {
        self.types.push(TypeData {
            kind,
            spelling: spelling.into(),
            size,
            align,
            declaration,
            element: None,
        });
        MockType(self.types.len() - 1)
    }

    fn cursor(&self, cursor: MockCursor) -> &CursorData {
        &self.cursors[cursor.0.expect("null cursor")]
    }

    fn cursor_mut(&mut self, cursor: MockCursor) -> &mut CursorData {
        &mut self.cursors[cursor.0.expect("null cursor")]
    }

    fn ty(&self, ty: MockType) -> &TypeData {
        &self.types[ty.0]
    }
}

impl AstProvider for MockAst {
    type Cursor = MockCursor;
    type Type = MockType;

    fn translation_unit(&self) -> MockCursor {
        self.unit()
    }

    fn visit_children(&self, cursor: MockCursor, visitor: &mut dyn FnMut(MockCursor)) {
        if let Some(index) = cursor.0 {
            self.cursors[index].children.iter().copied().for_each(visitor);
        }
    }

    fn cursor_kind(&self, cursor: MockCursor) -> CursorKind {
        cursor
            .0
            .map_or(CursorKind::NoDeclFound, |index| self.cursors[index].kind)
    }

    fn cursor_spelling(&self, cursor: MockCursor) -> String {
        cursor
            .0
            .map(|index| self.cursors[index].spelling.clone())
            .unwrap_or_default()
    }

    fn cursor_type(&self, cursor: MockCursor) -> Option<MockType> {
        self.cursors[cursor.0?].ty
    }

    fn typedef_underlying_type(&self, cursor: MockCursor) -> Option<MockType> {
        self.cursors[cursor.0?].underlying
    }

    fn type_kind(&self, ty: MockType) -> CTypeKind {
        self.ty(ty).kind.clone()
    }

    fn type_spelling(&self, ty: MockType) -> String {
        self.ty(ty).spelling.clone()
    }

    fn size_of(&self, ty: MockType) -> Result<i64, LayoutError> {
        LayoutError::check(self.ty(ty).size)
    }

    fn align_of(&self, ty: MockType) -> Result<i64, LayoutError> {
        LayoutError::check(self.ty(ty).align)
    }

    fn type_declaration(&self, ty: MockType) -> MockCursor {
        self.ty(ty).declaration
    }

    fn array_element_type(&self, ty: MockType) -> Option<MockType> {
        self.ty(ty).element
    }

    fn enum_constant_value(&self, cursor: MockCursor) -> i64 {
        cursor.0.map_or(0, |index| self.cursors[index].value)
    }
}
