//! Two-pass container writer
//!
//! Format codecs build a tree of [`Block`]s whose offset fields are left as
//! placeholders. [`ContainerWriter::finish`] lays the blocks out breadth-first
//! after the root so every offset points forward, interns strings into one
//! deduplicated table, and only then emits bytes with all offsets patched.

use std::collections::VecDeque;

use byteorder::{ByteOrder, LittleEndian};

use super::header::FileHeader;
use super::reader::{NULL_STRING, Primitive, push_le};
use super::string_table::StringTable;

/// Alignment of every block and of the string table
pub const BLOCK_ALIGN: usize = 4;

/// Handle to a block registered with a [`ContainerWriter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockId(usize);

/// Array field contents: the child block (if any) and the element count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrayRef {
    block: Option<BlockId>,
    count: u32,
}

impl ArrayRef {
    pub const EMPTY: Self = Self {
        block: None,
        count: 0,
    };
}

#[derive(Debug)]
enum Target {
    Block(BlockId),
    String(String),
}

#[derive(Debug)]
struct Patch {
    at: usize,
    target: Target,
}

/// Bytes of one block plus the offset fields still to be resolved
#[derive(Debug, Default)]
pub struct Block {
    bytes: Vec<u8>,
    patches: Vec<Patch>,
}

impl Block {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn write<T: Primitive>(&mut self, value: T) {
        push_le(&mut self.bytes, value);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.write(value);
    }

    pub fn write_i16(&mut self, value: i16) {
        self.write(value);
    }

    pub fn write_u32(&mut self, value: u32) {
        self.write(value);
    }

    pub fn write_i32(&mut self, value: i32) {
        self.write(value);
    }

    pub fn write_u64(&mut self, value: u64) {
        self.write(value);
    }

    pub fn write_f32(&mut self, value: f32) {
        self.write(value);
    }

    pub fn write_f32s(&mut self, values: &[f32]) {
        for &v in values {
            self.write(v);
        }
    }

    pub fn write_bool(&mut self, value: bool) {
        self.write(u32::from(value));
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    /// String field, resolved to a string table offset on finish
    pub fn write_string(&mut self, value: &str) {
        self.patches.push(Patch {
            at: self.bytes.len(),
            target: Target::String(value.to_string()),
        });
        self.write(0u32);
    }

    pub fn write_optional_string(&mut self, value: Option<&str>) {
        match value {
            Some(value) => self.write_string(value),
            None => self.write(NULL_STRING),
        }
    }

    /// Array field: relative offset placeholder followed by the element count
    pub fn write_array(&mut self, array: ArrayRef) {
        if let Some(block) = array.block {
            self.patches.push(Patch {
                at: self.bytes.len(),
                target: Target::Block(block),
            });
        }
        self.write(0u32);
        self.write(array.count);
    }
}

/// Accumulates child blocks for one container
#[derive(Debug, Default)]
pub struct ContainerWriter {
    blocks: Vec<Option<Block>>,
}

impl ContainerWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a block holding `count` elements
    pub fn array(&mut self, block: Block, count: usize) -> ArrayRef {
        if count == 0 {
            return ArrayRef::EMPTY;
        }
        let id = BlockId(self.blocks.len());
        self.blocks.push(Some(block));
        ArrayRef {
            block: Some(id),
            count: count as u32,
        }
    }

    /// Register a raw byte buffer; its count is the length in bytes
    pub fn byte_buffer(&mut self, bytes: Vec<u8>) -> ArrayRef {
        let count = bytes.len();
        self.array(
            Block {
                bytes,
                patches: Vec::new(),
            },
            count,
        )
    }

    /// Register one element per item, each built by `write_element`
    pub fn array_of<T>(
        &mut self,
        items: &[T],
        mut write_element: impl FnMut(&mut Self, &mut Block, &T),
    ) -> ArrayRef {
        let mut block = Block::new();
        for item in items {
            write_element(self, &mut block, item);
        }
        self.array(block, items.len())
    }

    /// Lay out all blocks and emit the finished container.
    ///
    /// `trailing` is appended to the root block so unknown fields from a newer
    /// minor version survive a round trip.
    pub fn finish(
        mut self,
        magic: [u8; 4],
        version: (u16, u16),
        mut root: Block,
        trailing: &[u8],
    ) -> Vec<u8> {
        root.bytes.extend_from_slice(trailing);
        let root_size = root.bytes.len() as u32;
        let root_id = BlockId(self.blocks.len());
        self.blocks.push(Some(root));

        // Pass 1: breadth-first layout from the root.
        let mut order = Vec::new();
        let mut queue = VecDeque::from([root_id]);
        while let Some(id) = queue.pop_front() {
            order.push(id);
            if let Some(block) = &self.blocks[id.0] {
                for patch in &block.patches {
                    if let Target::Block(child) = patch.target {
                        queue.push_back(child);
                    }
                }
            }
        }

        let mut positions = vec![0usize; self.blocks.len()];
        let mut strings = StringTable::new();
        let mut end = FileHeader::SIZE;
        for id in &order {
            if let Some(block) = &self.blocks[id.0] {
                end = align(end);
                positions[id.0] = end;
                end += block.len();
                for patch in &block.patches {
                    if let Target::String(value) = &patch.target {
                        strings.insert(value);
                    }
                }
            }
        }
        let string_table_offset = align(end);

        // Pass 2: emit with offsets resolved.
        let header = FileHeader {
            magic,
            major_version: version.0,
            minor_version: version.1,
            root_size,
            string_table_offset: string_table_offset as u32,
            string_table_size: strings.len() as u32,
        };
        let mut output = Vec::with_capacity(string_table_offset + strings.len());
        header.write_to(&mut output);

        for id in &order {
            let Some(mut block) = self.blocks[id.0].take() else {
                continue;
            };
            let start = positions[id.0];
            for patch in &block.patches {
                let value = match &patch.target {
                    Target::Block(child) => (positions[child.0] - (start + patch.at)) as u32,
                    Target::String(value) => strings.insert(value),
                };
                LittleEndian::write_u32(&mut block.bytes[patch.at..patch.at + 4], value);
            }
            output.resize(start, 0);
            output.extend_from_slice(&block.bytes);
        }

        output.resize(string_table_offset, 0);
        output.extend_from_slice(&strings.into_bytes());
        output
    }
}

#[inline]
fn align(position: usize) -> usize {
    position.next_multiple_of(BLOCK_ALIGN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binary::reader::SsbhReader;

    fn open(bytes: &[u8]) -> SsbhReader<'_> {
        let header = FileHeader::from_bytes(bytes).unwrap();
        let mut reader = SsbhReader::new(
            bytes,
            u64::from(header.string_table_offset),
            u64::from(header.string_table_size),
        )
        .unwrap();
        reader.seek(FileHeader::SIZE as u64).unwrap();
        reader
    }

    #[test]
    fn test_nested_arrays_resolve_forward() {
        let mut writer = ContainerWriter::new();

        // Build the inner array first so its block id precedes the outer one.
        let mut inner = Block::new();
        inner.write_u32(7);
        inner.write_u32(9);
        let inner = writer.array(inner, 2);

        let mut outer = Block::new();
        outer.write_string("node");
        outer.write_array(inner);
        let outer = writer.array(outer, 1);

        let mut root = Block::new();
        root.write_array(outer);
        let bytes = writer.finish(*b"TEST", (1, 0), root, &[]);

        let mut reader = open(&bytes);
        let nodes = reader
            .read_array(12, |r| {
                let name = r.read_string()?;
                let values = r.read_array(4, |r| r.read_u32())?;
                Ok((name, values))
            })
            .unwrap();
        assert_eq!(nodes, vec![("node".to_string(), vec![7, 9])]);
    }

    #[test]
    fn test_strings_written_once() {
        let writer = ContainerWriter::new();
        let mut root = Block::new();
        root.write_string("shared");
        root.write_string("shared");
        root.write_optional_string(None);
        let bytes = writer.finish(*b"TEST", (1, 0), root, &[]);

        let header = FileHeader::from_bytes(&bytes).unwrap();
        assert_eq!(header.string_table_size, 7);

        let mut reader = open(&bytes);
        assert_eq!(reader.read_string().unwrap(), "shared");
        assert_eq!(reader.read_string().unwrap(), "shared");
        assert_eq!(reader.read_optional_string().unwrap(), None);
    }

    #[test]
    fn test_empty_array_has_null_offset() {
        let writer = ContainerWriter::new();
        let mut root = Block::new();
        root.write_array(ArrayRef::EMPTY);
        let bytes = writer.finish(*b"TEST", (1, 0), root, &[]);
        assert_eq!(&bytes[24..32], &[0u8; 8]);

        let mut reader = open(&bytes);
        let empty: Vec<u32> = reader.read_array(4, |r| r.read_u32()).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_trailing_bytes_extend_root() {
        let writer = ContainerWriter::new();
        let mut root = Block::new();
        root.write_u32(1);
        let bytes = writer.finish(*b"TEST", (1, 3), root, &[0xAA, 0xBB]);

        let header = FileHeader::from_bytes(&bytes).unwrap();
        assert_eq!(header.root_size, 6);
        assert_eq!(&bytes[28..30], &[0xAA, 0xBB]);
        assert_eq!(header.string_table_offset % 4, 0);
    }
}
