//! Binary cursor, container reader, and two-pass container writer
//!
//! Every SSBH document shares the same container: a [`FileHeader`], a root
//! block, child blocks reached through relative offsets, and a deduplicated
//! string table at the end.

mod header;
mod reader;
mod string_table;
mod writer;

pub use header::{FileHeader, resolve_version};
pub use reader::{
    Endian, NULL_STRING, Primitive, SsbhReader, push_le, read_primitive, read_relative_offset,
    read_string_from_table,
};
pub use string_table::StringTable;
pub use writer::{ArrayRef, BLOCK_ALIGN, Block, BlockId, ContainerWriter};

use crate::error::{Result, SsbhError};

/// A container whose header has been validated, positioned at its root block
pub struct Container<'a> {
    pub header: FileHeader,
    /// Version whose layout is used to read the root block
    pub layout: (u16, u16),
    pub reader: SsbhReader<'a>,
}

impl<'a> Container<'a> {
    /// Validate the header and resolve the layout version
    pub fn open(
        bytes: &'a [u8],
        magic: [u8; 4],
        format: &'static str,
        known_versions: &[(u16, u16)],
    ) -> Result<Self> {
        let header = FileHeader::from_bytes(bytes)
            .ok_or_else(|| SsbhError::malformed(bytes.len() as u64, "file too small for header"))?;
        if header.magic != magic {
            return Err(SsbhError::malformed(0, "magic does not match format"));
        }

        let layout = resolve_version(
            format,
            known_versions,
            header.major_version,
            header.minor_version,
        )?;
        if layout != (header.major_version, header.minor_version) {
            tracing::warn!(
                "{} version {}.{} is not known, reading with the {}.{} layout",
                format,
                header.major_version,
                header.minor_version,
                layout.0,
                layout.1
            );
        }

        let root_end = FileHeader::SIZE as u64 + u64::from(header.root_size);
        if root_end > bytes.len() as u64 {
            return Err(SsbhError::malformed(8, "root block extends past end of buffer"));
        }

        let mut reader = SsbhReader::new(
            bytes,
            u64::from(header.string_table_offset),
            u64::from(header.string_table_size),
        )?;
        reader.seek(FileHeader::SIZE as u64)?;

        Ok(Self {
            header,
            layout,
            reader,
        })
    }

    /// Root bytes past the fields read so far.
    ///
    /// Call after reading every root field of the layout. The bytes belong to
    /// fields of a newer minor version and are written back unchanged.
    pub fn trailing_data(&self) -> Result<Vec<u8>> {
        let known_end = self.reader.position();
        let root_end = FileHeader::SIZE as u64 + u64::from(self.header.root_size);
        if known_end > root_end {
            return Err(SsbhError::malformed(
                8,
                "root block is smaller than its version layout",
            ));
        }
        let trailing = self.reader.bytes()[known_end as usize..root_end as usize].to_vec();
        if !trailing.is_empty() {
            tracing::warn!(
                "preserving {} unknown trailing bytes in the root block",
                trailing.len()
            );
        }
        Ok(trailing)
    }

    pub fn version(&self) -> (u16, u16) {
        (self.header.major_version, self.header.minor_version)
    }
}
