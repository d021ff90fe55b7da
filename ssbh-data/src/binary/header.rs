//! SSBH container header and version dispatch
//!
//! # Layout
//! ```text
//! 0x00: magic [u8; 4]
//! 0x04: major_version u16
//! 0x06: minor_version u16
//! 0x08: root_size u32            size of the root block in bytes
//! 0x0C: string_table_offset u32  absolute offset of the string table
//! 0x10: string_table_size u32
//! 0x14: reserved u32
//! 0x18: root block
//! ```

use std::io::{Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt};

use super::reader::push_le;
use crate::error::{Result, SsbhError};

/// Container header (24 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    pub magic: [u8; 4],
    pub major_version: u16,
    pub minor_version: u16,
    pub root_size: u32,
    pub string_table_offset: u32,
    pub string_table_size: u32,
}

impl FileHeader {
    pub const SIZE: usize = 24;

    /// Append the header to `out`
    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.magic);
        push_le(out, self.major_version);
        push_le(out, self.minor_version);
        push_le(out, self.root_size);
        push_le(out, self.string_table_offset);
        push_le(out, self.string_table_size);
        // reserved
        push_le(out, 0u32);
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(Self::SIZE);
        self.write_to(&mut bytes);
        bytes
    }

    /// Read header from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let mut cursor = Cursor::new(bytes);
        let mut magic = [0u8; 4];
        cursor.read_exact(&mut magic).ok()?;
        let header = Self {
            magic,
            major_version: cursor.read_u16::<LittleEndian>().ok()?,
            minor_version: cursor.read_u16::<LittleEndian>().ok()?,
            root_size: cursor.read_u32::<LittleEndian>().ok()?,
            string_table_offset: cursor.read_u32::<LittleEndian>().ok()?,
            string_table_size: cursor.read_u32::<LittleEndian>().ok()?,
        };
        cursor.read_u32::<LittleEndian>().ok()?;
        Some(header)
    }
}

/// Pick the layout used to read or write a `(major, minor)` version.
///
/// An exact match wins. Within a known major the nearest known minor is
/// used, with ties going to the lower minor. An unknown major is rejected.
pub fn resolve_version(
    format: &'static str,
    known: &[(u16, u16)],
    major: u16,
    minor: u16,
) -> Result<(u16, u16)> {
    known
        .iter()
        .filter(|(known_major, _)| *known_major == major)
        .min_by_key(|(_, known_minor)| (known_minor.abs_diff(minor), *known_minor))
        .copied()
        .ok_or(SsbhError::UnsupportedVersion {
            format,
            major,
            minor,
        })
}
