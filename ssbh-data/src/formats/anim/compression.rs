//! Track data block encoding
//!
//! Every block starts with a 4-byte header followed by one of three bodies:
//!
//! ```text
//! 0x00: component_count u16
//! 0x02: reserved u16
//!
//! constant:   component_count × f32 (repeated for every frame)
//! direct:     frame_count × component_count × f32
//! compressed: component_count × { min f32, max f32, bit_count u32 }
//!             then frame_count × component_count quantized values,
//!             LSB-first, padded to 4 bytes
//! ```
//!
//! A compressed value decodes as `min + q / (2^bit_count - 1) * (max - min)`.
//! Components with `bit_count == 0` store no bits and decode to `min`.

use std::io::Cursor;

use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};

use super::classify::TrackKind;
use crate::binary::push_le;
use crate::config::AnimConfig;
use crate::error::{Result, SsbhError};

const BLOCK_HEADER_SIZE: usize = 4;
const COMPONENT_HEADER_SIZE: usize = 12;

/// Largest bit count accepted when decoding
const MAX_BIT_COUNT: u32 = 32;

/// Upper bound on frames and on decoded values for one track
pub const MAX_TRACK_VALUES: usize = 1 << 24;

/// How a track's frames are stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionType {
    Constant,
    Direct,
    Compressed,
}

impl CompressionType {
    pub const fn to_u32(self) -> u32 {
        match self {
            Self::Constant => 1,
            Self::Direct => 2,
            Self::Compressed => 4,
        }
    }

    pub fn from_u32(value: u32, offset: u64) -> Result<Self> {
        match value {
            1 => Ok(Self::Constant),
            2 => Ok(Self::Direct),
            4 => Ok(Self::Compressed),
            _ => Err(SsbhError::malformed(offset, "unknown track compression type")),
        }
    }
}

/// Frame values flattened frame by frame
#[derive(Debug, Clone, PartialEq)]
pub struct Frames {
    pub frame_count: usize,
    pub component_count: usize,
    pub values: Vec<f32>,
}

impl Frames {
    fn frame(&self, i: usize) -> &[f32] {
        let c = self.component_count;
        self.values.get(i * c..(i + 1) * c).unwrap_or(&[])
    }

    fn is_constant(&self) -> bool {
        self.frame_count > 0 && (1..self.frame_count).all(|i| self.frame(i) == self.frame(0))
    }
}

/// A data block ready to be appended to the track buffer
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedTrack {
    pub compression: CompressionType,
    pub frame_count: u32,
    pub data: Vec<u8>,
}

// ============================================================================
// Quantization
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
struct ComponentRange {
    min: f32,
    max: f32,
    bit_count: u32,
}

fn max_quantized(bit_count: u32) -> f64 {
    ((1u64 << bit_count) - 1) as f64
}

/// Map `value` in `[min, max]` onto `0..=2^bit_count - 1`
fn quantize(value: f32, range: &ComponentRange) -> u64 {
    let max_q = max_quantized(range.bit_count);
    let span = f64::from(range.max) - f64::from(range.min);
    let t = (f64::from(value) - f64::from(range.min)) / span;
    (t * max_q).round().clamp(0.0, max_q) as u64
}

fn dequantize(q: u64, range: &ComponentRange) -> f32 {
    let max_q = max_quantized(range.bit_count);
    let span = f64::from(range.max) - f64::from(range.min);
    (f64::from(range.min) + q as f64 / max_q * span) as f32
}

/// Bits used for a varying component of the given track kind
fn component_bits(kind: TrackKind, min: f32, max: f32, config: &AnimConfig) -> u32 {
    match kind {
        TrackKind::Boolean => 1,
        TrackKind::PatternIndex => {
            let range = (max - min).round().max(1.0) as u64;
            (u64::BITS - range.leading_zeros()).min(MAX_BIT_COUNT)
        }
        _ => config.float_bits(),
    }
}

fn component_ranges(kind: TrackKind, frames: &Frames, config: &AnimConfig) -> Vec<ComponentRange> {
    (0..frames.component_count)
        .map(|c| {
            let (min, max) = (0..frames.frame_count)
                .filter_map(|f| frames.frame(f).get(c).copied())
                .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| {
                    (lo.min(v), hi.max(v))
                });
            let bit_count = if min < max {
                component_bits(kind, min, max, config)
            } else {
                0
            };
            ComponentRange {
                min,
                max,
                bit_count,
            }
        })
        .collect()
}

// ============================================================================
// Bitstream
// ============================================================================

#[derive(Debug, Default)]
struct BitWriter {
    bytes: Vec<u8>,
    bit_len: usize,
}

impl BitWriter {
    fn write(&mut self, value: u64, bit_count: u32) {
        for i in 0..bit_count {
            if self.bit_len % 8 == 0 {
                self.bytes.push(0);
            }
            if (value >> i) & 1 == 1 {
                let last = self.bytes.len() - 1;
                self.bytes[last] |= 1 << (self.bit_len % 8);
            }
            self.bit_len += 1;
        }
    }

    fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

struct BitReader<'a> {
    bytes: &'a [u8],
    bit_pos: usize,
}

impl<'a> BitReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, bit_pos: 0 }
    }

    fn read(&mut self, bit_count: u32) -> Option<u64> {
        let mut value = 0u64;
        for i in 0..bit_count {
            let byte = *self.bytes.get(self.bit_pos / 8)?;
            if (byte >> (self.bit_pos % 8)) & 1 == 1 {
                value |= 1 << i;
            }
            self.bit_pos += 1;
        }
        Some(value)
    }
}

// ============================================================================
// Encode / Decode
// ============================================================================

/// Encode one track's frames.
///
/// Identical frames become a constant block. Otherwise frames are quantized
/// unless `config.compress_tracks` is off, in which case they are stored
/// as raw floats.
pub fn encode_track(kind: TrackKind, frames: &Frames, config: &AnimConfig) -> EncodedTrack {
    let mut data = Vec::new();
    push_le(&mut data, frames.component_count as u16);
    push_le(&mut data, 0u16);

    let compression = if frames.is_constant() {
        CompressionType::Constant
    } else if frames.frame_count > 1 && config.compress_tracks {
        CompressionType::Compressed
    } else {
        CompressionType::Direct
    };

    match compression {
        CompressionType::Constant => {
            for &v in frames.frame(0) {
                push_le(&mut data, v);
            }
        }
        CompressionType::Direct => {
            for &v in &frames.values {
                push_le(&mut data, v);
            }
        }
        CompressionType::Compressed => {
            let ranges = component_ranges(kind, frames, config);
            for range in &ranges {
                push_le(&mut data, range.min);
                push_le(&mut data, range.max);
                push_le(&mut data, range.bit_count);
            }

            let mut bits = BitWriter::default();
            for f in 0..frames.frame_count {
                for (&v, range) in frames.frame(f).iter().zip(&ranges) {
                    if range.bit_count > 0 {
                        bits.write(quantize(v, range), range.bit_count);
                    }
                }
            }
            data.extend_from_slice(&bits.into_bytes());
            data.resize(data.len().next_multiple_of(4), 0);
        }
    }

    tracing::trace!(
        "encoded {:?} track with {} frames as {:?} ({} bytes)",
        kind,
        frames.frame_count,
        compression,
        data.len()
    );

    EncodedTrack {
        compression,
        frame_count: frames.frame_count as u32,
        data,
    }
}

/// Empty value buffer with room for `value_count` floats
fn reserve_values(value_count: usize, offset: u64) -> Result<Vec<f32>> {
    let mut values = Vec::new();
    values
        .try_reserve_exact(value_count)
        .map_err(|_| SsbhError::malformed(offset, "track values do not fit in memory"))?;
    Ok(values)
}

/// Decode one track data block. `offset` locates the block in the file for errors.
///
/// Tracks with more than [`MAX_TRACK_VALUES`] frames or values are rejected
/// before anything is allocated.
pub fn decode_track(
    compression: CompressionType,
    frame_count: usize,
    bytes: &[u8],
    offset: u64,
) -> Result<Frames> {
    if bytes.len() < BLOCK_HEADER_SIZE {
        return Err(SsbhError::malformed(offset, "track data smaller than its header"));
    }
    let component_count = LittleEndian::read_u16(bytes) as usize;
    let value_count = frame_count
        .checked_mul(component_count)
        .filter(|&n| n <= MAX_TRACK_VALUES && frame_count <= MAX_TRACK_VALUES)
        .ok_or_else(|| SsbhError::malformed(offset, "track has too many values"))?;
    let mut body = Cursor::new(&bytes[BLOCK_HEADER_SIZE..]);

    let values = match compression {
        CompressionType::Constant => {
            let truncated =
                |_: std::io::Error| SsbhError::malformed(offset, "constant track data truncated");
            let mut frame = Vec::with_capacity(component_count);
            for _ in 0..component_count {
                frame.push(body.read_f32::<LittleEndian>().map_err(truncated)?);
            }
            let mut values = reserve_values(value_count, offset)?;
            for _ in 0..frame_count {
                values.extend_from_slice(&frame);
            }
            values
        }
        CompressionType::Direct => {
            if value_count * 4 > body.get_ref().len() {
                return Err(SsbhError::malformed(offset, "direct track data truncated"));
            }
            let mut values = reserve_values(value_count, offset)?;
            for _ in 0..value_count {
                values.push(
                    body.read_f32::<LittleEndian>()
                        .map_err(|_| SsbhError::malformed(offset, "direct track data truncated"))?,
                );
            }
            values
        }
        CompressionType::Compressed => {
            let truncated = |_: std::io::Error| {
                SsbhError::malformed(offset, "compressed track header truncated")
            };
            let mut ranges = Vec::with_capacity(component_count);
            for _ in 0..component_count {
                let min = body.read_f32::<LittleEndian>().map_err(truncated)?;
                let max = body.read_f32::<LittleEndian>().map_err(truncated)?;
                let bit_count_at = offset + BLOCK_HEADER_SIZE as u64 + body.position();
                let bit_count = body.read_u32::<LittleEndian>().map_err(truncated)?;
                if bit_count > MAX_BIT_COUNT {
                    return Err(SsbhError::malformed(
                        bit_count_at,
                        "compressed bit count too large",
                    ));
                }
                ranges.push(ComponentRange {
                    min,
                    max,
                    bit_count,
                });
            }

            let stream = &body.get_ref()[component_count * COMPONENT_HEADER_SIZE..];
            let bits_per_frame: usize = ranges.iter().map(|r| r.bit_count as usize).sum();
            if frame_count
                .checked_mul(bits_per_frame)
                .is_none_or(|bits| bits.div_ceil(8) > stream.len())
            {
                return Err(SsbhError::malformed(offset, "compressed track bits truncated"));
            }

            let mut reader = BitReader::new(stream);
            let mut values = reserve_values(value_count, offset)?;
            for _ in 0..frame_count {
                for range in &ranges {
                    let value = if range.bit_count == 0 {
                        range.min
                    } else {
                        let q = reader.read(range.bit_count).ok_or_else(|| {
                            SsbhError::malformed(offset, "compressed track bits truncated")
                        })?;
                        dequantize(q, range)
                    };
                    values.push(value);
                }
            }
            values
        }
    };

    Ok(Frames {
        frame_count,
        component_count,
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames(component_count: usize, values: Vec<f32>) -> Frames {
        Frames {
            frame_count: values.len() / component_count,
            component_count,
            values,
        }
    }

    #[test]
    fn test_bitstream_is_lsb_first() {
        let mut bits = BitWriter::default();
        bits.write(0b1, 1);
        bits.write(0b10, 2);
        bits.write(0b11111, 5);
        bits.write(0b1, 1);
        assert_eq!(bits.into_bytes(), vec![0b1111_1101, 0b0000_0001]);

        let bytes = [0b1111_1101, 0b0000_0001];
        let mut reader = BitReader::new(&bytes);
        assert_eq!(reader.read(1), Some(1));
        assert_eq!(reader.read(2), Some(2));
        assert_eq!(reader.read(5), Some(31));
        assert_eq!(reader.read(1), Some(1));
        assert_eq!(reader.read(8), None);
    }

    #[test]
    fn test_quantize_endpoints() {
        let range = ComponentRange {
            min: -2.0,
            max: 6.0,
            bit_count: 4,
        };
        assert_eq!(quantize(-2.0, &range), 0);
        assert_eq!(quantize(6.0, &range), 15);
        assert_eq!(dequantize(0, &range), -2.0);
        assert_eq!(dequantize(15, &range), 6.0);
        // Out of range values clamp.
        assert_eq!(quantize(100.0, &range), 15);
    }

    #[test]
    fn test_pattern_index_bits() {
        let config = AnimConfig::default();
        assert_eq!(component_bits(TrackKind::PatternIndex, 0.0, 1.0, &config), 1);
        assert_eq!(component_bits(TrackKind::PatternIndex, 3.0, 10.0, &config), 3);
        assert_eq!(component_bits(TrackKind::PatternIndex, 0.0, 8.0, &config), 4);
        assert_eq!(component_bits(TrackKind::Boolean, 0.0, 1.0, &config), 1);
        assert_eq!(component_bits(TrackKind::Float, 0.0, 1.0, &config), 24);
    }

    #[test]
    fn test_identical_frames_are_constant() {
        let input = frames(2, vec![1.0, 2.0, 1.0, 2.0, 1.0, 2.0]);
        let encoded = encode_track(TrackKind::Unknown, &input, &AnimConfig::default());
        assert_eq!(encoded.compression, CompressionType::Constant);
        assert_eq!(encoded.data.len(), 4 + 8);
        let decoded = decode_track(encoded.compression, 3, &encoded.data, 0).unwrap();
        assert_eq!(decoded, input);
    }

    #[test]
    fn test_direct_when_compression_disabled() {
        let config = AnimConfig {
            compress_tracks: false,
            ..Default::default()
        };
        let input = frames(1, vec![0.1, 0.2, 0.3]);
        let encoded = encode_track(TrackKind::Float, &input, &config);
        assert_eq!(encoded.compression, CompressionType::Direct);
        let decoded = decode_track(encoded.compression, 3, &encoded.data, 0).unwrap();
        assert_eq!(decoded, input);
    }

    #[test]
    fn test_compressed_within_one_step() {
        let config = AnimConfig {
            compression_bits: 8,
            ..Default::default()
        };
        let values: Vec<f32> = (0..20).map(|i| (i as f32 * 0.37).sin() * 5.0).collect();
        let input = frames(1, values.clone());
        let encoded = encode_track(TrackKind::Float, &input, &config);
        assert_eq!(encoded.compression, CompressionType::Compressed);
        assert_eq!(encoded.data.len() % 4, 0);

        let decoded = decode_track(encoded.compression, 20, &encoded.data, 0).unwrap();
        let min = values.iter().copied().fold(f32::INFINITY, f32::min);
        let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let step = (max - min) / 255.0;
        for (a, b) in decoded.values.iter().zip(&values) {
            assert!((a - b).abs() <= step, "{a} vs {b}");
        }
    }

    #[test]
    fn test_constant_component_stores_no_bits() {
        // Component 0 varies and component 1 does not.
        let input = frames(2, vec![0.0, 7.0, 1.0, 7.0, 0.0, 7.0]);
        let encoded = encode_track(TrackKind::Boolean, &input, &AnimConfig::default());
        assert_eq!(encoded.compression, CompressionType::Compressed);
        // Header, two component headers, one padded byte of bits.
        assert_eq!(encoded.data.len(), 4 + 24 + 4);
        let decoded = decode_track(encoded.compression, 3, &encoded.data, 0).unwrap();
        assert_eq!(decoded, input);
    }

    #[test]
    fn test_truncated_blocks_fail() {
        assert!(decode_track(CompressionType::Direct, 1, &[1, 0], 0).is_err());
        assert!(decode_track(CompressionType::Direct, 2, &[1, 0, 0, 0, 0, 0, 0, 0], 0).is_err());
        assert!(decode_track(CompressionType::Constant, 2, &[2, 0, 0, 0, 0, 0, 0, 0], 0).is_err());

        let input = frames(1, vec![0.0, 1.0, 2.0, 3.0]);
        let encoded = encode_track(TrackKind::Float, &input, &AnimConfig::default());
        let truncated = &encoded.data[..encoded.data.len() - 8];
        assert!(decode_track(encoded.compression, 4, truncated, 0).is_err());
    }

    #[test]
    fn test_huge_frame_counts_are_rejected() {
        let mut constant = vec![1, 0, 0, 0];
        constant.extend_from_slice(&2.5f32.to_le_bytes());
        assert!(matches!(
            decode_track(CompressionType::Constant, usize::MAX / 2, &constant, 0x80),
            Err(SsbhError::MalformedInput { offset: 0x80, .. })
        ));

        // Zero components still cannot claim unbounded frames.
        assert!(decode_track(CompressionType::Constant, usize::MAX / 2, &[0, 0, 0, 0], 0).is_err());

        // A component with bit_count 0 stores no bits to check against.
        let mut compressed = vec![1, 0, 0, 0];
        compressed.extend_from_slice(&1.0f32.to_le_bytes());
        compressed.extend_from_slice(&1.0f32.to_le_bytes());
        compressed.extend_from_slice(&0u32.to_le_bytes());
        assert!(matches!(
            decode_track(CompressionType::Compressed, usize::MAX / 2, &compressed, 0x80),
            Err(SsbhError::MalformedInput { offset: 0x80, .. })
        ));

        let decoded = decode_track(CompressionType::Compressed, 3, &compressed, 0).unwrap();
        assert_eq!(decoded.values, vec![1.0; 3]);
    }

    #[test]
    fn test_bit_count_above_limit() {
        let mut compressed = vec![1, 0, 0, 0];
        compressed.extend_from_slice(&0.0f32.to_le_bytes());
        compressed.extend_from_slice(&1.0f32.to_le_bytes());
        compressed.extend_from_slice(&33u32.to_le_bytes());
        compressed.extend_from_slice(&[0u8; 16]);
        assert!(matches!(
            decode_track(CompressionType::Compressed, 2, &compressed, 0x80),
            Err(SsbhError::MalformedInput { offset: 0x8C, .. })
        ));
    }

    #[test]
    fn test_compression_type_values() {
        for t in [
            CompressionType::Constant,
            CompressionType::Direct,
            CompressionType::Compressed,
        ] {
            assert_eq!(CompressionType::from_u32(t.to_u32(), 0).unwrap(), t);
        }
        assert!(CompressionType::from_u32(3, 0).is_err());
    }
}
