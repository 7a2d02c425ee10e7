//! Binary encoding of a [TypeDatabase](crate::TypeDatabase).
//!
//! The file consists of two sections written back to back, all integers little-endian and no
//! padding anywhere:
//!
//! ```text
//! type section:    u32 TYPE_MAGIC, u32 root_count, root_count × node record
//! node record:     member_name\0, type_name\0, u32 kind, u32 size, u32 align,
//!                  u32 is_const_value, i64 const_value, u32 child_count,
//!                  child_count × node record
//! define section:  u32 DEFINE_MAGIC, u32 count, count × (identifier\0, literal\0)
//! ```
//!
//! Node records are in pre-order; there is no terminator, so a reader relies on `child_count` to
//! know when a node's children end. The magic numbers are the only versioning.

#[cfg(all(test, not(miri)))]
mod tests;

mod reader;
mod writer;

pub use reader::{DecodeError, Decoder, decode};
pub use writer::{EncodeError, Encoder, encode, write_database};

use std::fmt::{self, Display, Formatter};

/// First word of the type section.
pub const TYPE_MAGIC: u32 = 0x23C0_FFEE;

/// First word of the define section.
pub const DEFINE_MAGIC: u32 = 0x1202_1984;

/// The two sections of a database file.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Section {
    Types,
    Defines,
}

impl Section {
    /// The magic number that opens this section.
    pub fn magic(self) -> u32 {
        match self {
            Section::Types => TYPE_MAGIC,
            Section::Defines => DEFINE_MAGIC,
        }
    }
}

impl Display for Section {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Section::Types => f.write_str("type"),
            Section::Defines => f.write_str("define"),
        }
    }
}
