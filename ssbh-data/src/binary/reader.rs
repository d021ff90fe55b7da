//! Cursor helpers for reading SSBH containers
//!
//! Primitive reads take an explicit [`Endian`]. Offsets are resolved relative
//! to the position of the field that stores them, and every resolved position
//! is checked against the buffer before it is used.

use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};

use byteorder::{BigEndian, ByteOrder, LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{Result, SsbhError};

/// Byte order of a primitive value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

/// Fixed-width value that can be read from and written to a byte stream
pub trait Primitive: Copy {
    fn read_from<B: ByteOrder, R: Read>(reader: &mut R) -> io::Result<Self>;

    fn write_to<B: ByteOrder, W: Write>(self, writer: &mut W) -> io::Result<()>;
}

impl Primitive for u8 {
    #[inline]
    fn read_from<B: ByteOrder, R: Read>(reader: &mut R) -> io::Result<Self> {
        reader.read_u8()
    }

    #[inline]
    fn write_to<B: ByteOrder, W: Write>(self, writer: &mut W) -> io::Result<()> {
        writer.write_u8(self)
    }
}

macro_rules! impl_primitive {
    ($($ty:ty => $read:ident, $write:ident;)*) => {
        $(
            impl Primitive for $ty {
                #[inline]
                fn read_from<B: ByteOrder, R: Read>(reader: &mut R) -> io::Result<Self> {
                    reader.$read::<B>()
                }

                #[inline]
                fn write_to<B: ByteOrder, W: Write>(self, writer: &mut W) -> io::Result<()> {
                    writer.$write::<B>(self)
                }
            }
        )*
    };
}

impl_primitive! {
    u16 => read_u16, write_u16;
    i16 => read_i16, write_i16;
    u32 => read_u32, write_u32;
    i32 => read_i32, write_i32;
    u64 => read_u64, write_u64;
    f32 => read_f32, write_f32;
}

/// Read one primitive at the cursor position
pub fn read_primitive<T: Primitive>(cursor: &mut Cursor<&[u8]>, endian: Endian) -> Result<T> {
    let offset = cursor.position();
    let value = match endian {
        Endian::Little => T::read_from::<LittleEndian, _>(cursor),
        Endian::Big => T::read_from::<BigEndian, _>(cursor),
    };
    value.map_err(|_| SsbhError::malformed(offset, "unexpected end of buffer"))
}

/// Append a little-endian primitive to a byte vector
pub fn push_le<T: Primitive>(out: &mut Vec<u8>, value: T) {
    // Writes into a Vec cannot fail.
    let _ = value.write_to::<LittleEndian, _>(out);
}

/// Read a u32 offset and resolve it against `base`.
///
/// A stored offset of zero means "no data" and returns `None`.
pub fn read_relative_offset(cursor: &mut Cursor<&[u8]>, base: u64) -> Result<Option<u64>> {
    let field = cursor.position();
    let relative: u32 = read_primitive(cursor, Endian::Little)?;
    if relative == 0 {
        return Ok(None);
    }
    let absolute = base + u64::from(relative);
    if absolute > cursor.get_ref().len() as u64 {
        return Err(SsbhError::malformed(field, "offset points past end of buffer"));
    }
    Ok(Some(absolute))
}

/// Read a NUL-terminated UTF-8 string starting at `offset` within `table`
pub fn read_string_from_table(table: &[u8], table_start: u64, offset: u32) -> Result<String> {
    let start = offset as usize;
    let location = table_start + u64::from(offset);
    let tail = table
        .get(start..)
        .ok_or_else(|| SsbhError::malformed(location, "string offset past end of table"))?;
    let len = tail
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| SsbhError::malformed(location, "unterminated string"))?;
    std::str::from_utf8(&tail[..len])
        .map(str::to_string)
        .map_err(|_| SsbhError::malformed(location, "string is not valid UTF-8"))
}

/// Marker stored in place of a string offset for an absent optional string
pub const NULL_STRING: u32 = u32::MAX;

/// Block reader over a whole container
///
/// Wraps the cursor together with the file's string table so format codecs
/// can read strings, arrays and buffers without threading both around.
pub struct SsbhReader<'a> {
    cursor: Cursor<&'a [u8]>,
    bytes: &'a [u8],
    strings: &'a [u8],
    strings_start: u64,
}

impl<'a> SsbhReader<'a> {
    pub fn new(bytes: &'a [u8], strings_start: u64, strings_len: u64) -> Result<Self> {
        let end = strings_start
            .checked_add(strings_len)
            .filter(|end| *end <= bytes.len() as u64)
            .ok_or_else(|| SsbhError::malformed(strings_start, "string table outside buffer"))?;
        Ok(Self {
            cursor: Cursor::new(bytes),
            bytes,
            strings: &bytes[strings_start as usize..end as usize],
            strings_start,
        })
    }

    pub fn position(&self) -> u64 {
        self.cursor.position()
    }

    pub fn seek(&mut self, position: u64) -> Result<()> {
        if position > self.bytes.len() as u64 {
            return Err(SsbhError::malformed(position, "seek past end of buffer"));
        }
        self.cursor
            .seek(SeekFrom::Start(position))
            .map_err(|_| SsbhError::malformed(position, "seek failed"))?;
        Ok(())
    }

    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn read<T: Primitive>(&mut self) -> Result<T> {
        read_primitive(&mut self.cursor, Endian::Little)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.read()
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.read()
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        self.read()
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.read()
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.read()
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        self.read()
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        self.read()
    }

    pub fn read_f32s<const N: usize>(&mut self) -> Result<[f32; N]> {
        let mut values = [0.0; N];
        for v in values.iter_mut() {
            *v = self.read_f32()?;
        }
        Ok(values)
    }

    /// Read a u32 boolean (any nonzero value is true)
    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u32()? != 0)
    }

    pub fn read_string(&mut self) -> Result<String> {
        let offset = self.read_u32()?;
        read_string_from_table(self.strings, self.strings_start, offset)
    }

    pub fn read_optional_string(&mut self) -> Result<Option<String>> {
        let offset = self.read_u32()?;
        if offset == NULL_STRING {
            return Ok(None);
        }
        read_string_from_table(self.strings, self.strings_start, offset).map(Some)
    }

    /// Read an array field: u32 relative offset followed by u32 element count.
    ///
    /// `min_element_size` bounds the count against the remaining bytes before
    /// anything is allocated. The cursor ends up just after the field.
    pub fn read_array<T>(
        &mut self,
        min_element_size: usize,
        mut read_element: impl FnMut(&mut Self) -> Result<T>,
    ) -> Result<Vec<T>> {
        let field = self.position();
        let start = read_relative_offset(&mut self.cursor, field)?;
        let count = self.read_u32()? as usize;
        let after = self.position();

        let Some(start) = start else {
            if count != 0 {
                return Err(SsbhError::malformed(field, "array has elements but no offset"));
            }
            return Ok(Vec::new());
        };
        let needed = count
            .checked_mul(min_element_size)
            .and_then(|n| n.checked_add(start as usize))
            .ok_or_else(|| SsbhError::malformed(field, "array size overflows"))?;
        if needed > self.bytes.len() {
            return Err(SsbhError::malformed(field, "array extends past end of buffer"));
        }

        self.seek(start)?;
        let mut elements = Vec::with_capacity(count);
        for _ in 0..count {
            elements.push(read_element(self)?);
        }
        self.seek(after)?;
        Ok(elements)
    }

    /// Read a byte buffer field and borrow its bytes
    pub fn read_byte_buffer(&mut self) -> Result<&'a [u8]> {
        let field = self.position();
        let start = read_relative_offset(&mut self.cursor, field)?;
        let len = self.read_u32()? as usize;
        match start {
            None if len == 0 => Ok(&[]),
            None => Err(SsbhError::malformed(field, "buffer has length but no offset")),
            Some(start) => self
                .bytes
                .get(start as usize..start as usize + len)
                .ok_or_else(|| SsbhError::malformed(field, "buffer extends past end of buffer")),
        }
    }
}
