use super::Section;
use crate::{DefineEntry, TypeDatabase, TypeKind, TypeNode};
use std::str::from_utf8;
use thiserror::Error;

/// An error returned from [decode]. Every variant carries the byte offset at which the input
/// stopped matching the format.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum DecodeError {
    #[error(
        "bad {section} section magic at offset {offset:#x}: expected {expected:#010x}, found {found:#010x}"
    )]
    BadMagic {
        section: Section,
        offset: usize,
        expected: u32,
        found: u32,
    },
    #[error("input truncated at offset {offset:#x} while reading {field}")]
    Truncated { field: &'static str, offset: usize },
    #[error("unterminated {field} starting at offset {offset:#x}")]
    UnterminatedString { field: &'static str, offset: usize },
    #[error("{field} at offset {offset:#x} is not valid UTF-8")]
    InvalidUtf8 { field: &'static str, offset: usize },
    #[error("type record at offset {offset:#x} has unknown kind {value}")]
    UnknownKind { offset: usize, value: u32 },
    #[error("type record at offset {offset:#x} has const-value flag {value}, expected 0 or 1")]
    InvalidConstFlag { offset: usize, value: u32 },
    #[error("{count} trailing bytes after the define section at offset {offset:#x}")]
    TrailingBytes { offset: usize, count: usize },
}

/// Cursor over an encoded database. Sections must be read in file order: [Decoder::read_types],
/// then [Decoder::read_defines], then [Decoder::finish].
pub struct Decoder<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(bytes: &'a [u8]) -> Decoder<'a> {
        Decoder { bytes, pos: 0 }
    }

    /// Offset of the next unread byte.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Reads the type section and returns the root types in file order.
    pub fn read_types(&mut self) -> Result<Vec<TypeNode>, DecodeError> {
        self.read_magic(Section::Types)?;
        let root_count = self.read_u32("root type count")?;
        // Counts are untrusted, so nothing is pre-allocated from them.
        let mut roots = Vec::new();
        for _ in 0..root_count {
            roots.push(self.read_tree()?);
        }
        Ok(roots)
    }

    /// Reads the define section.
    pub fn read_defines(&mut self) -> Result<Vec<DefineEntry>, DecodeError> {
        self.read_magic(Section::Defines)?;
        let count = self.read_u32("define count")?;
        let mut defines = Vec::new();
        for _ in 0..count {
            let identifier = self.read_cstr("define identifier")?;
            let literal = self.read_cstr("define literal")?;
            defines.push(DefineEntry { identifier, literal });
        }
        Ok(defines)
    }

    /// Fails if any input is left over.
    pub fn finish(self) -> Result<(), DecodeError> {
        match self.bytes.len() - self.pos {
            0 => Ok(()),
            count => Err(DecodeError::TrailingBytes {
                offset: self.pos,
                count,
            }),
        }
    }

    /// Reads one complete tree in pre-order. Nodes whose children are still being read are kept
    /// on an explicit stack together with the number of children they are still missing.
    fn read_tree(&mut self) -> Result<TypeNode, DecodeError> {
        let mut open: Vec<(TypeNode, u32)> = Vec::new();
        loop {
            let (mut node, mut missing) = self.read_record()?;
            while missing == 0 {
                match open.pop() {
                    None => return Ok(node),
                    Some((mut parent, parent_missing)) => {
                        parent.children.push(node);
                        node = parent;
                        missing = parent_missing - 1;
                    }
                }
            }
            open.push((node, missing));
        }
    }

    /// Reads one node record (without its children) and its child count.
    fn read_record(&mut self) -> Result<(TypeNode, u32), DecodeError> {
        let offset = self.pos;
        let member_name = self.read_cstr("member name")?;
        let type_name = self.read_cstr("type name")?;
        let kind = self.read_u32("type kind")?;
        let kind = TypeKind::try_from(kind)
            .map_err(|value| DecodeError::UnknownKind { offset, value })?;
        let size_bytes = self.read_u32("type size")?;
        let align_bytes = self.read_u32("type alignment")?;
        let is_const_value = match self.read_u32("const-value flag")? {
            0 => false,
            1 => true,
            value => return Err(DecodeError::InvalidConstFlag { offset, value }),
        };
        let const_value = i64::from_le_bytes(self.read_array("const value")?);
        let child_count = self.read_u32("child count")?;
        let node = TypeNode {
            type_name,
            member_name,
            size_bytes,
            align_bytes,
            kind,
            is_const_value,
            const_value,
            children: Vec::new(),
        };
        Ok((node, child_count))
    }

    fn read_magic(&mut self, section: Section) -> Result<(), DecodeError> {
        let offset = self.pos;
        let found = self.read_u32("section magic")?;
        let expected = section.magic();
        if found != expected {
            return Err(DecodeError::BadMagic {
                section,
                offset,
                expected,
                found,
            });
        }
        Ok(())
    }

    fn read_u32(&mut self, field: &'static str) -> Result<u32, DecodeError> {
        Ok(u32::from_le_bytes(self.read_array(field)?))
    }

    fn read_array<const N: usize>(&mut self, field: &'static str) -> Result<[u8; N], DecodeError> {
        let truncated = DecodeError::Truncated {
            field,
            offset: self.pos,
        };
        let bytes = self.bytes.get(self.pos..self.pos + N).ok_or(truncated)?;
        self.pos += N;
        // The slice has exactly N bytes.
        let mut array = [0; N];
        array.copy_from_slice(bytes);
        Ok(array)
    }

    fn read_cstr(&mut self, field: &'static str) -> Result<String, DecodeError> {
        let offset = self.pos;
        let rest = &self.bytes[self.pos..];
        let len = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or(DecodeError::UnterminatedString { field, offset })?;
        let value = from_utf8(&rest[..len])
            .map_err(|_| DecodeError::InvalidUtf8 { field, offset })?
            .to_owned();
        self.pos += len + 1;
        Ok(value)
    }
}

/// Decodes a complete database. The whole input must be consumed.
pub fn decode(bytes: &[u8]) -> Result<TypeDatabase, DecodeError> {
    let mut decoder = Decoder::new(bytes);
    let types = decoder.read_types()?;
    let defines = decoder.read_defines()?;
    decoder.finish()?;
    Ok(TypeDatabase { types, defines })
}
