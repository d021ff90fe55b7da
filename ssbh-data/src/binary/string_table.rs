//! Deduplicated string table written after all blocks of a container

use hashbrown::HashMap;

/// Strings stored once per container, NUL-terminated, in insertion order
#[derive(Debug, Default)]
pub struct StringTable {
    bytes: Vec<u8>,
    offsets: HashMap<String, u32>,
}

impl StringTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offset of `value` within the table, inserting it if this is the first use
    pub fn insert(&mut self, value: &str) -> u32 {
        if let Some(&offset) = self.offsets.get(value) {
            return offset;
        }
        let offset = self.bytes.len() as u32;
        self.bytes.extend_from_slice(value.as_bytes());
        self.bytes.push(0);
        self.offsets.insert(value.to_string(), offset);
        offset
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strings_are_deduplicated() {
        let mut table = StringTable::new();
        let a = table.insert("Hip");
        let b = table.insert("Waist");
        let c = table.insert("Hip");
        assert_eq!(a, 0);
        assert_eq!(b, 4);
        assert_eq!(a, c);
        assert_eq!(table.into_bytes(), b"Hip\0Waist\0");
    }

    #[test]
    fn test_empty_string_takes_one_byte() {
        let mut table = StringTable::new();
        assert_eq!(table.insert(""), 0);
        assert_eq!(table.insert("a"), 1);
        assert_eq!(table.len(), 3);
    }
}
