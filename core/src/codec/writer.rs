use super::{DEFINE_MAGIC, TYPE_MAGIC};
use crate::{DefineEntry, TypeNode};
use std::io::{self, Write};
use thiserror::Error;
use tracing::debug;

/// An error returned while encoding a database.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("{field} {value:?} contains a NUL byte and cannot be null-terminated")]
    InteriorNul { field: &'static str, value: String },
    #[error("{what} count {count} does not fit in 32 bits")]
    CountOverflow { what: &'static str, count: usize },
    #[error("failed to write type database: {0}")]
    Io(#[from] io::Error),
}

/// Streams the database layout into a [Write]r. The type section must be written before the
/// define section; [write_database] does both in the right order.
pub struct Encoder<W: Write> {
    writer: W,
    written: usize,
}

impl<W: Write> Encoder<W> {
    pub fn new(writer: W) -> Encoder<W> {
        Encoder { writer, written: 0 }
    }

    /// Number of bytes written so far.
    pub fn position(&self) -> usize {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Writes the type section: magic, root count, then every tree in pre-order.
    pub fn write_types(&mut self, roots: &[TypeNode]) -> Result<(), EncodeError> {
        self.write_u32(TYPE_MAGIC)?;
        self.write_count("root type", roots.len())?;
        // Explicit stack of sibling iterators, so nesting depth is not limited by the call stack.
        let mut stack = vec![roots.iter()];
        while let Some(siblings) = stack.last_mut() {
            let Some(node) = siblings.next() else {
                stack.pop();
                continue;
            };
            self.write_record(node)?;
            stack.push(node.children.iter());
        }
        Ok(())
    }

    /// Writes the define section: magic, count, then each identifier/literal pair.
    pub fn write_defines(&mut self, defines: &[DefineEntry]) -> Result<(), EncodeError> {
        self.write_u32(DEFINE_MAGIC)?;
        self.write_count("define", defines.len())?;
        for define in defines {
            self.write_cstr("define identifier", &define.identifier)?;
            self.write_cstr("define literal", &define.literal)?;
        }
        Ok(())
    }

    /// Writes one node record, up to and including its child count.
    fn write_record(&mut self, node: &TypeNode) -> Result<(), EncodeError> {
        self.write_cstr("member name", &node.member_name)?;
        self.write_cstr("type name", &node.type_name)?;
        self.write_u32(node.kind.into())?;
        self.write_u32(node.size_bytes)?;
        self.write_u32(node.align_bytes)?;
        self.write_u32(node.is_const_value.into())?;
        self.write_bytes(&node.const_value.to_le_bytes())?;
        self.write_count("child", node.children.len())
    }

    fn write_count(&mut self, what: &'static str, count: usize) -> Result<(), EncodeError> {
        let count = u32::try_from(count).map_err(|_| EncodeError::CountOverflow { what, count })?;
        self.write_u32(count)
    }

    fn write_cstr(&mut self, field: &'static str, value: &str) -> Result<(), EncodeError> {
        if value.as_bytes().contains(&0) {
            return Err(EncodeError::InteriorNul {
                field,
                value: value.to_owned(),
            });
        }
        self.write_bytes(value.as_bytes())?;
        self.write_bytes(&[0])
    }

    fn write_u32(&mut self, value: u32) -> Result<(), EncodeError> {
        self.write_bytes(&value.to_le_bytes())
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), EncodeError> {
        self.writer.write_all(bytes)?;
        self.written += bytes.len();
        Ok(())
    }
}

/// Writes both sections of the database into `writer`, types first.
pub fn write_database<W: Write>(
    writer: W,
    types: &[TypeNode],
    defines: &[DefineEntry],
) -> Result<(), EncodeError> {
    let mut encoder = Encoder::new(writer);
    encoder.write_types(types)?;
    let type_section_len = encoder.position();
    encoder.write_defines(defines)?;
    debug!(
        "Encoded {} root types ({type_section_len} bytes) and {} defines ({} bytes)",
        types.len(),
        defines.len(),
        encoder.position() - type_section_len
    );
    Ok(())
}

/// Encodes the database into a freshly allocated buffer.
pub fn encode(types: &[TypeNode], defines: &[DefineEntry]) -> Result<Vec<u8>, EncodeError> {
    let mut bytes = Vec::new();
    write_database(&mut bytes, types, defines)?;
    Ok(bytes)
}
