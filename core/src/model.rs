use crate::codec::{self, DecodeError, EncodeError};
use std::fmt::{self, Display, Formatter};
use std::fs::{File, read};
use std::io::{BufWriter, Write as _};
use std::path::Path;

/// Structural classification of a [TypeNode]. The discriminants are the values written to the
/// binary format.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[repr(u32)]
pub enum TypeKind {
    /// A leaf whose interpretation is entirely by type name (`Int`, `Pointer`, a typedef name,
    /// ...).
    #[default]
    Simple = 0,
    /// Children are the struct members in declaration order.
    Struct = 1,
    /// Children are the union members in declaration order.
    Union = 2,
    /// Children are the enumerator constants.
    Enum = 3,
    /// Exactly one child: the element type.
    Array = 4,
}

impl TypeKind {
    /// The upper-case label used by the human-readable dump.
    pub fn label(self) -> &'static str {
        match self {
            TypeKind::Simple => "SIMPLE",
            TypeKind::Struct => "STRUCT",
            TypeKind::Union => "UNION",
            TypeKind::Enum => "ENUM",
            TypeKind::Array => "ARRAY",
        }
    }
}

impl From<TypeKind> for u32 {
    fn from(kind: TypeKind) -> u32 {
        kind as u32
    }
}

impl TryFrom<u32> for TypeKind {
    type Error = u32;

    fn try_from(value: u32) -> Result<TypeKind, u32> {
        match value {
            0 => Ok(TypeKind::Simple),
            1 => Ok(TypeKind::Struct),
            2 => Ok(TypeKind::Union),
            3 => Ok(TypeKind::Enum),
            4 => Ok(TypeKind::Array),
            other => Err(other),
        }
    }
}

impl Display for TypeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One node of the type forest. A node owns its children exclusively.
///
/// Dropping, cloning, comparing, counting and printing walk the tree with an explicit stack, so a
/// decoded tree may be nested deeper than the call stack would allow.
#[derive(Debug, Default, Eq)]
pub struct TypeNode {
    /// Canonical spelling of the type, e.g. `Int` or `struct point`.
    pub type_name: String,
    /// Name of the declaration this node was found through (typedef name, struct member,
    /// enumerator). Empty when there is none.
    pub member_name: String,
    /// Size in bytes as answered by the layout query. `0` means "not applicable".
    pub size_bytes: u32,
    /// Alignment in bytes as answered by the layout query. `0` means "not applicable".
    pub align_bytes: u32,
    pub kind: TypeKind,
    /// Only set for enumerator constants.
    pub is_const_value: bool,
    /// Meaningful only when `is_const_value` is set.
    pub const_value: i64,
    pub children: Vec<TypeNode>,
}

impl TypeNode {
    /// Creates a childless node with no member name and a zero layout.
    pub fn new<S: Into<String>>(type_name: S, kind: TypeKind) -> TypeNode {
        TypeNode {
            type_name: type_name.into(),
            member_name: String::new(),
            size_bytes: 0,
            align_bytes: 0,
            kind,
            is_const_value: false,
            const_value: 0,
            children: Vec::new(),
        }
    }

    /// Sets the member name.
    pub fn member<S: Into<String>>(mut self, member_name: S) -> TypeNode {
        self.member_name = member_name.into();
        self
    }

    /// Sets size and alignment.
    pub fn layout(mut self, size_bytes: u32, align_bytes: u32) -> TypeNode {
        self.size_bytes = size_bytes;
        self.align_bytes = align_bytes;
        self
    }

    /// Marks this node as an enumerator constant with the given value.
    pub fn constant(mut self, value: i64) -> TypeNode {
        self.is_const_value = true;
        self.const_value = value;
        self
    }

    /// Appends a child.
    pub fn child(mut self, child: TypeNode) -> TypeNode {
        self.children.push(child);
        self
    }

    /// Returns the member name, or `None` if it is empty.
    pub fn member_name(&self) -> Option<&str> {
        match self.member_name.as_str() {
            "" => None,
            name => Some(name),
        }
    }

    /// Number of nodes in the subtree rooted at this node, including itself.
    pub fn subtree_len(&self) -> usize {
        let mut len = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            len += 1;
            stack.extend(&node.children);
        }
        len
    }

    /// A copy of this node's own fields, with no children.
    fn shallow_clone(&self) -> TypeNode {
        TypeNode {
            type_name: self.type_name.clone(),
            member_name: self.member_name.clone(),
            size_bytes: self.size_bytes,
            align_bytes: self.align_bytes,
            kind: self.kind,
            is_const_value: self.is_const_value,
            const_value: self.const_value,
            children: Vec::with_capacity(self.children.len()),
        }
    }

    /// Compares the node's own fields and its number of children.
    fn same_record(&self, other: &TypeNode) -> bool {
        self.type_name == other.type_name
            && self.member_name == other.member_name
            && self.size_bytes == other.size_bytes
            && self.align_bytes == other.align_bytes
            && self.kind == other.kind
            && self.is_const_value == other.is_const_value
            && self.const_value == other.const_value
            && self.children.len() == other.children.len()
    }

    fn fmt_record(&self, f: &mut Formatter<'_>, depth: usize) -> fmt::Result {
        write!(
            f,
            "{:depth$}{} type \"{}\" of size {}, align {}, member \"{}\"",
            "",
            self.kind,
            self.type_name,
            self.size_bytes,
            self.align_bytes,
            self.member_name,
        )?;
        if self.is_const_value {
            write!(f, ", value {}", self.const_value)?;
        }
        writeln!(f)
    }
}

impl Drop for TypeNode {
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.children);
        while let Some(mut node) = stack.pop() {
            stack.append(&mut node.children);
        }
    }
}

impl Clone for TypeNode {
    fn clone(&self) -> TypeNode {
        // Copies in pre-order; a copy is attached to its parent once all its children are.
        let mut open: Vec<(TypeNode, std::slice::Iter<'_, TypeNode>)> = Vec::new();
        let mut node = self.shallow_clone();
        let mut children = self.children.iter();
        loop {
            match children.next() {
                Some(child) => {
                    open.push((node, children));
                    node = child.shallow_clone();
                    children = child.children.iter();
                }
                None => match open.pop() {
                    None => return node,
                    Some((mut parent, rest)) => {
                        parent.children.push(node);
                        node = parent;
                        children = rest;
                    }
                },
            }
        }
    }
}

impl PartialEq for TypeNode {
    fn eq(&self, other: &TypeNode) -> bool {
        let mut stack = vec![(self, other)];
        while let Some((a, b)) = stack.pop() {
            if !a.same_record(b) {
                return false;
            }
            stack.extend(a.children.iter().zip(&b.children));
        }
        true
    }
}

/// Renders the subtree in the human-readable dump format, one node per line.
impl Display for TypeNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut stack = vec![(self, 0)];
        while let Some((node, depth)) = stack.pop() {
            node.fmt_record(f, depth)?;
            stack.extend(node.children.iter().rev().map(|child| (child, depth + 1)));
        }
        Ok(())
    }
}

/// A macro object recovered from the token stream.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct DefineEntry {
    pub identifier: String,
    /// Concatenated spellings of the replacement tokens. Never empty for scanned entries.
    pub literal: String,
}

impl DefineEntry {
    pub fn new<I: Into<String>, L: Into<String>>(identifier: I, literal: L) -> DefineEntry {
        DefineEntry {
            identifier: identifier.into(),
            literal: literal.into(),
        }
    }
}

impl Display for DefineEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#define {} {}", self.identifier, self.literal)
    }
}

/// Everything extracted from one translation unit.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TypeDatabase {
    /// Root types in discovery order.
    pub types: Vec<TypeNode>,
    pub defines: Vec<DefineEntry>,
}

impl TypeDatabase {
    /// Total number of type records, i.e. the number of nodes across the whole forest.
    pub fn record_count(&self) -> usize {
        self.types.iter().map(TypeNode::subtree_len).sum()
    }

    /// Writes the encoded database to `path`, replacing any existing file.
    pub fn materialize(&self, path: &Path) -> Result<(), EncodeError> {
        let mut writer = BufWriter::new(File::create(path)?);
        codec::write_database(&mut writer, &self.types, &self.defines)?;
        writer.flush()?;
        Ok(())
    }

    /// Reads and decodes the database stored at `path`.
    pub fn load(path: &Path) -> Result<TypeDatabase, LoadError> {
        let bytes = read(path)?;
        Ok(codec::decode(&bytes)?)
    }
}

impl Display for TypeDatabase {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for node in &self.types {
            write!(f, "{node}")?;
        }
        for define in &self.defines {
            writeln!(f, "{define}")?;
        }
        Ok(())
    }
}

/// An error returned from [TypeDatabase::load].
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read type database: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed type database: {0}")]
    Decode(#[from] DecodeError),
}
