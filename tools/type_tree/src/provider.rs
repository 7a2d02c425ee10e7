//! The interface the builder needs from a C/C++ front end. The vocabulary mirrors libclang's
//! cursor and type API, so a libclang binding or a recorded snapshot of its answers can both sit
//! behind it.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// The cursor kinds the builder distinguishes. Everything else is [CursorKind::Other].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CursorKind {
    TranslationUnit,
    TypedefDecl,
    StructDecl,
    UnionDecl,
    EnumDecl,
    FieldDecl,
    EnumConstantDecl,
    /// The null cursor, e.g. the declaration of a builtin type.
    NoDeclFound,
    Other,
}

/// Structural kind of a type, named after libclang's `CXTypeKind` spellings.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum CTypeKind {
    Void,
    Bool,
    CharU,
    UChar,
    Char16,
    Char32,
    UShort,
    UInt,
    ULong,
    ULongLong,
    UInt128,
    CharS,
    SChar,
    WChar,
    Short,
    Int,
    Long,
    LongLong,
    Int128,
    Float,
    Double,
    LongDouble,
    Pointer,
    Typedef,
    ConstantArray,
    Elaborated,
    /// Any kind the builder has no mapping for (references, records, functions, vectors, ...),
    /// carrying the front end's spelling for diagnostics.
    Unsupported(String),
}

impl CTypeKind {
    /// Parses a libclang type-kind spelling (`clang_getTypeKindSpelling`). Unknown spellings
    /// become [CTypeKind::Unsupported].
    pub fn from_spelling(spelling: &str) -> CTypeKind {
        use CTypeKind::*;
        match spelling {
            "Void" => Void,
            "Bool" => Bool,
            "Char_U" => CharU,
            "UChar" => UChar,
            "Char16" => Char16,
            "Char32" => Char32,
            "UShort" => UShort,
            "UInt" => UInt,
            "ULong" => ULong,
            "ULongLong" => ULongLong,
            "UInt128" => UInt128,
            "Char_S" => CharS,
            "SChar" => SChar,
            "WChar" => WChar,
            "Short" => Short,
            "Int" => Int,
            "Long" => Long,
            "LongLong" => LongLong,
            "Int128" => Int128,
            "Float" => Float,
            "Double" => Double,
            "LongDouble" => LongDouble,
            "Pointer" => Pointer,
            "Typedef" => Typedef,
            "ConstantArray" => ConstantArray,
            "Elaborated" => Elaborated,
            other => Unsupported(other.to_owned()),
        }
    }

    /// Returns the `Simple` type name for builtin scalar and pointer kinds.
    pub fn builtin_name(&self) -> Option<&'static str> {
        use CTypeKind::*;
        Some(match self {
            Void => "Void",
            Bool => "Bool",
            CharU => "Char",
            UChar => "UChar",
            Char16 => "Char16",
            Char32 => "Char32",
            UShort => "UShort",
            UInt => "UInt",
            ULong => "ULong",
            ULongLong => "ULongLong",
            UInt128 => "UInt128",
            CharS => "Char_S",
            SChar => "SChar",
            WChar => "WChar",
            Short => "Short",
            Int => "Int",
            Long => "Long",
            LongLong => "LongLong",
            Int128 => "Int128",
            Float => "Float",
            Double => "Double",
            LongDouble => "LongDouble",
            Pointer => "Pointer",
            Typedef | ConstantArray | Elaborated | Unsupported(_) => return None,
        })
    }
}

impl FromStr for CTypeKind {
    type Err = std::convert::Infallible;

    fn from_str(spelling: &str) -> Result<CTypeKind, Self::Err> {
        Ok(CTypeKind::from_spelling(spelling))
    }
}

/// The named failures of a layout (size or alignment) query. Front ends report these as negative
/// numbers; [LayoutError::raw] gives that number back.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum LayoutError {
    Invalid,
    Incomplete,
    Dependent,
    NotConstantSize,
    InvalidFieldName,
}

impl LayoutError {
    /// The value libclang returns in place of a size or alignment.
    pub fn raw(self) -> i64 {
        match self {
            LayoutError::Invalid => -1,
            LayoutError::Incomplete => -2,
            LayoutError::Dependent => -3,
            LayoutError::NotConstantSize => -4,
            LayoutError::InvalidFieldName => -5,
        }
    }

    /// Splits a raw layout query result into a value or a named failure. Negative values without
    /// a name are treated as [LayoutError::Invalid].
    pub fn check(raw: i64) -> Result<i64, LayoutError> {
        match raw {
            0.. => Ok(raw),
            -2 => Err(LayoutError::Incomplete),
            -3 => Err(LayoutError::Dependent),
            -4 => Err(LayoutError::NotConstantSize),
            -5 => Err(LayoutError::InvalidFieldName),
            _ => Err(LayoutError::Invalid),
        }
    }
}

impl Display for LayoutError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LayoutError::Invalid => "invalid type",
            LayoutError::Incomplete => "incomplete type",
            LayoutError::Dependent => "dependent type",
            LayoutError::NotConstantSize => "not constant size type",
            LayoutError::InvalidFieldName => "invalid field name",
        })
    }
}

/// Read-only access to a parsed translation unit.
///
/// Cursors and types are cheap handles owned by the provider. Queries on a handle the provider
/// considers meaningless (the type of the null cursor, the element type of a scalar) answer with
/// `None`, an empty string, or a [LayoutError] rather than failing.
pub trait AstProvider {
    type Cursor: Copy;
    type Type: Copy;

    /// The root cursor of the translation unit.
    fn translation_unit(&self) -> Self::Cursor;

    /// Calls `visitor` once for each direct child of `cursor`, in source order.
    fn visit_children(&self, cursor: Self::Cursor, visitor: &mut dyn FnMut(Self::Cursor));

    fn cursor_kind(&self, cursor: Self::Cursor) -> CursorKind;

    /// The cursor's name; empty for anonymous declarations and the null cursor.
    fn cursor_spelling(&self, cursor: Self::Cursor) -> String;

    /// The declared type of the cursor.
    fn cursor_type(&self, cursor: Self::Cursor) -> Option<Self::Type>;

    /// The aliased type, if `cursor` is a typedef declaration.
    fn typedef_underlying_type(&self, cursor: Self::Cursor) -> Option<Self::Type>;

    fn type_kind(&self, ty: Self::Type) -> CTypeKind;

    fn type_spelling(&self, ty: Self::Type) -> String;

    fn size_of(&self, ty: Self::Type) -> Result<i64, LayoutError>;

    fn align_of(&self, ty: Self::Type) -> Result<i64, LayoutError>;

    /// The cursor declaring `ty`, or the null cursor (kind [CursorKind::NoDeclFound]) for types
    /// without a declaration.
    fn type_declaration(&self, ty: Self::Type) -> Self::Cursor;

    /// The element type, if `ty` is an array type.
    fn array_element_type(&self, ty: Self::Type) -> Option<Self::Type>;

    /// The value of an enumerator. Only meaningful for [CursorKind::EnumConstantDecl] cursors.
    fn enum_constant_value(&self, cursor: Self::Cursor) -> i64;
}
