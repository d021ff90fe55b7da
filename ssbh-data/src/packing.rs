//! Vertex attribute element packing
//!
//! Converts f32 attribute components to the on-disk element formats:
//! - f32 (Float1 to Float4)
//! - f32 → f16 (HalfFloat2, HalfFloat4)
//! - f32 → unorm8 (Byte4, 0.0 to 1.0)

use byteorder::{ByteOrder, LittleEndian};
use half::f16;
use serde::{Deserialize, Serialize};

use crate::binary::push_le;
use crate::error::{Result, SsbhError};

// ============================================================================
// Element Formats
// ============================================================================

/// Storage format of one vertex attribute element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeDataType {
    Float1,
    Float2,
    Float3,
    Float4,
    HalfFloat2,
    HalfFloat4,
    Byte4,
}

impl AttributeDataType {
    /// Number of f32 components carried by one element
    pub const fn component_count(self) -> usize {
        match self {
            Self::Float1 => 1,
            Self::Float2 | Self::HalfFloat2 => 2,
            Self::Float3 => 3,
            Self::Float4 | Self::HalfFloat4 | Self::Byte4 => 4,
        }
    }

    /// Size of one packed element in bytes
    pub const fn size_in_bytes(self) -> usize {
        match self {
            Self::Float1 => 4,
            Self::Float2 => 8,
            Self::Float3 => 12,
            Self::Float4 => 16,
            Self::HalfFloat2 => 4,
            Self::HalfFloat4 => 8,
            Self::Byte4 => 4,
        }
    }

    pub const fn to_u32(self) -> u32 {
        match self {
            Self::Float1 => 0,
            Self::Float2 => 1,
            Self::Float3 => 2,
            Self::Float4 => 3,
            Self::HalfFloat2 => 4,
            Self::HalfFloat4 => 5,
            Self::Byte4 => 6,
        }
    }

    pub fn from_u32(value: u32, offset: u64) -> Result<Self> {
        Ok(match value {
            0 => Self::Float1,
            1 => Self::Float2,
            2 => Self::Float3,
            3 => Self::Float4,
            4 => Self::HalfFloat2,
            5 => Self::HalfFloat4,
            6 => Self::Byte4,
            _ => return Err(SsbhError::malformed(offset, "unknown attribute data type")),
        })
    }
}

// ============================================================================
// Scalar Conversions
// ============================================================================

/// Convert f32 to unsigned normalized 8-bit integer (unorm8)
///
/// Maps f32 range [0.0, 1.0] to u8 range [0, 255].
#[inline]
pub fn f32_to_unorm8(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[inline]
pub fn unorm8_to_f32(value: u8) -> f32 {
    value as f32 / 255.0
}

/// Convert f32 to f16 bits
#[inline]
pub fn f32_to_f16(value: f32) -> u16 {
    f16::from_f32(value).to_bits()
}

/// Convert f16 bits to f32
#[inline]
pub fn f16_to_f32(bits: u16) -> f32 {
    f16::from_bits(bits).to_f32()
}

// ============================================================================
// Element Packing
// ============================================================================

/// Append one element to `out`.
///
/// `components` may be shorter than the format's component count; missing
/// components are written as zero.
pub fn pack_element(data_type: AttributeDataType, components: &[f32], out: &mut Vec<u8>) {
    let count = data_type.component_count();
    let component = |i: usize| components.get(i).copied().unwrap_or(0.0);
    match data_type {
        AttributeDataType::Float1
        | AttributeDataType::Float2
        | AttributeDataType::Float3
        | AttributeDataType::Float4 => {
            for i in 0..count {
                push_le(out, component(i));
            }
        }
        AttributeDataType::HalfFloat2 | AttributeDataType::HalfFloat4 => {
            for i in 0..count {
                push_le(out, f32_to_f16(component(i)));
            }
        }
        AttributeDataType::Byte4 => {
            for i in 0..count {
                out.push(f32_to_unorm8(component(i)));
            }
        }
    }
}

/// Decode one element from the start of `bytes` into `out`
pub fn unpack_element(data_type: AttributeDataType, bytes: &[u8], out: &mut [f32]) {
    let count = data_type.component_count().min(out.len());
    match data_type {
        AttributeDataType::Float1
        | AttributeDataType::Float2
        | AttributeDataType::Float3
        | AttributeDataType::Float4 => {
            for (i, value) in out.iter_mut().enumerate().take(count) {
                *value = LittleEndian::read_f32(&bytes[i * 4..]);
            }
        }
        AttributeDataType::HalfFloat2 | AttributeDataType::HalfFloat4 => {
            for (i, value) in out.iter_mut().enumerate().take(count) {
                *value = f16_to_f32(LittleEndian::read_u16(&bytes[i * 2..]));
            }
        }
        AttributeDataType::Byte4 => {
            for (i, value) in out.iter_mut().enumerate().take(count) {
                *value = unorm8_to_f32(bytes[i]);
            }
        }
    }
}
