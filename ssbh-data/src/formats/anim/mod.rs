//! Animation format (.nuanmb)
//!
//! Groups of nodes, each owning named tracks of per-frame values. Track data
//! lives in one shared buffer. Value types are not stored: they are derived
//! from the group type and track name when reading (see [`classify_track`]).
//!
//! # Layout
//! ```text
//! Root (24 bytes):
//! 0x00: final_frame_index f32
//! 0x04: reserved u32
//! 0x08: groups array (12 bytes each)
//! 0x10: track data byte buffer
//!
//! Group: group_type u32, nodes array (12 bytes each)
//! Node:  name string, tracks array (20 bytes each)
//! Track: name string, flags u32, frame_count u32, data_offset u32, data_size u32
//!
//! Track flags:
//! bits 0-4:   compression (1 = constant, 2 = direct, 4 = compressed)
//! bit 8:      inherit_scale
//! bit 9:      compensate_scale
//! bits 16-19: override translation, rotation, scale, compensate_scale (2.1)
//! ```
//!
//! Compressed tracks are lossy. Values read back after a save lie within one
//! quantization step of what was written.

mod classify;
mod compression;


use rayon::prelude::*;
use serde::{Deserialize, Serialize};

pub use classify::{TrackKind, classify_track};
pub use compression::{
    CompressionType, EncodedTrack, Frames, MAX_TRACK_VALUES, decode_track, encode_track,
};

use super::SsbhFormat;
use crate::binary::{Block, Container, ContainerWriter, SsbhReader, resolve_version};
use crate::config::AnimConfig;
use crate::error::{Result, SsbhError};

const GROUP_ENTRY_SIZE: usize = 12;
const NODE_ENTRY_SIZE: usize = 12;
const TRACK_ENTRY_SIZE: usize = 20;

const COMPRESSION_MASK: u32 = 0x1F;
const INHERIT_SCALE: u32 = 1 << 8;
const COMPENSATE_SCALE: u32 = 1 << 9;
const OVERRIDE_TRANSLATION: u32 = 1 << 16;
const OVERRIDE_ROTATION: u32 = 1 << 17;
const OVERRIDE_SCALE: u32 = 1 << 18;
const OVERRIDE_COMPENSATE_SCALE: u32 = 1 << 19;

/// First version that stores transform override flags
const OVERRIDE_FLAGS_VERSION: (u16, u16) = (2, 1);

/// Animation document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimData {
    pub major_version: u16,
    pub minor_version: u16,
    pub final_frame_index: f32,
    pub groups: Vec<GroupData>,
    #[serde(default)]
    pub trailing_data: Vec<u8>,
}

impl Default for AnimData {
    fn default() -> Self {
        Self {
            major_version: 2,
            minor_version: 0,
            final_frame_index: 0.0,
            groups: Vec::new(),
            trailing_data: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupData {
    pub group_type: GroupType,
    pub nodes: Vec<NodeData>,
}

/// What the nodes of a group animate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupType {
    Transform,
    Visibility,
    Material,
    Camera,
}

impl GroupType {
    pub const fn to_u32(self) -> u32 {
        match self {
            Self::Transform => 1,
            Self::Visibility => 2,
            Self::Material => 4,
            Self::Camera => 5,
        }
    }

    pub fn from_u32(value: u32, offset: u64) -> Result<Self> {
        match value {
            1 => Ok(Self::Transform),
            2 => Ok(Self::Visibility),
            4 => Ok(Self::Material),
            5 => Ok(Self::Camera),
            _ => Err(SsbhError::malformed(offset, "unknown animation group type")),
        }
    }
}

/// Animation target, such as a bone or material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    pub name: String,
    pub tracks: Vec<TrackData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackData {
    pub name: String,
    /// Only affects transform tracks
    #[serde(default)]
    pub scale_options: ScaleOptions,
    /// Stored in version 2.1 and later
    #[serde(default)]
    pub transform_flags: TransformFlags,
    pub values: TrackValues,
}

/// Scale settings stored for the whole track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScaleOptions {
    pub inherit_scale: bool,
    pub compensate_scale: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TransformFlags {
    pub override_translation: bool,
    pub override_rotation: bool,
    pub override_scale: bool,
    pub override_compensate_scale: bool,
}

/// Bone transform for one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub scale: [f32; 3],
    /// Quaternion as xyzw
    pub rotation: [f32; 4],
    pub translation: [f32; 3],
    pub compensate_scale: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            scale: [1.0; 3],
            rotation: [0.0, 0.0, 0.0, 1.0],
            translation: [0.0; 3],
            compensate_scale: 0.0,
        }
    }
}

/// Texture coordinate transform for one frame
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct UvTransform {
    pub scale_u: f32,
    pub scale_v: f32,
    pub rotation: f32,
    pub translate_u: f32,
    pub translate_v: f32,
}

/// Frame values of one track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TrackValues {
    Transform(Vec<Transform>),
    UvTransform(Vec<UvTransform>),
    Float(Vec<f32>),
    PatternIndex(Vec<u32>),
    Boolean(Vec<bool>),
    Vector4(Vec<[f32; 4]>),
    /// Raw components of a track whose name has no known type
    Unknown(Vec<Vec<f32>>),
}

impl TrackValues {
    pub fn len(&self) -> usize {
        match self {
            Self::Transform(v) => v.len(),
            Self::UvTransform(v) => v.len(),
            Self::Float(v) => v.len(),
            Self::PatternIndex(v) => v.len(),
            Self::Boolean(v) => v.len(),
            Self::Vector4(v) => v.len(),
            Self::Unknown(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Kind matching these values, independent of any track name
    pub fn kind(&self) -> TrackKind {
        match self {
            Self::Transform(_) => TrackKind::Transform,
            Self::UvTransform(_) => TrackKind::UvTransform,
            Self::Float(_) => TrackKind::Float,
            Self::PatternIndex(_) => TrackKind::PatternIndex,
            Self::Boolean(_) => TrackKind::Boolean,
            Self::Vector4(_) => TrackKind::Vector4,
            Self::Unknown(_) => TrackKind::Unknown,
        }
    }

    /// Flatten to per-frame components.
    ///
    /// Unknown frames of uneven length are padded with zeros to the longest.
    pub fn to_frames(&self) -> Frames {
        let component_count = match self {
            Self::Unknown(v) => v.iter().map(Vec::len).max().unwrap_or(0),
            _ => self.kind().component_count().unwrap_or(0),
        };
        let mut values = Vec::with_capacity(self.len() * component_count);
        match self {
            Self::Transform(v) => {
                for t in v {
                    values.extend_from_slice(&t.scale);
                    values.extend_from_slice(&t.rotation);
                    values.extend_from_slice(&t.translation);
                    values.push(t.compensate_scale);
                }
            }
            Self::UvTransform(v) => {
                for t in v {
                    values.extend([t.scale_u, t.scale_v, t.rotation, t.translate_u, t.translate_v]);
                }
            }
            Self::Float(v) => values.extend_from_slice(v),
            Self::PatternIndex(v) => values.extend(v.iter().map(|&i| i as f32)),
            Self::Boolean(v) => values.extend(v.iter().map(|&b| if b { 1.0 } else { 0.0 })),
            Self::Vector4(v) => values.extend(v.iter().flatten()),
            Self::Unknown(v) => {
                if v.iter().any(|frame| frame.len() != component_count) {
                    tracing::warn!(
                        "padding unknown track frames to {} components",
                        component_count
                    );
                }
                for frame in v {
                    values.extend_from_slice(frame);
                    values.resize(values.len() + component_count - frame.len(), 0.0);
                }
            }
        }
        Frames {
            frame_count: self.len(),
            component_count,
            values,
        }
    }

    /// Rebuild typed values from decoded frames.
    ///
    /// Frames whose component count does not fit `kind` become [`TrackValues::Unknown`].
    pub fn from_frames(kind: TrackKind, frames: Frames) -> Self {
        let kind = if kind.component_count() == Some(frames.component_count) {
            kind
        } else {
            TrackKind::Unknown
        };

        let chunks = || frame_chunks(&frames);

        match kind {
            TrackKind::Transform => Self::Transform(
                chunks()
                    .map(|c| Transform {
                        scale: [c[0], c[1], c[2]],
                        rotation: [c[3], c[4], c[5], c[6]],
                        translation: [c[7], c[8], c[9]],
                        compensate_scale: c[10],
                    })
                    .collect(),
            ),
            TrackKind::UvTransform => Self::UvTransform(
                chunks()
                    .map(|c| UvTransform {
                        scale_u: c[0],
                        scale_v: c[1],
                        rotation: c[2],
                        translate_u: c[3],
                        translate_v: c[4],
                    })
                    .collect(),
            ),
            TrackKind::Float => Self::Float(frames.values.clone()),
            TrackKind::PatternIndex => {
                Self::PatternIndex(frames.values.iter().map(|v| v.round() as u32).collect())
            }
            TrackKind::Boolean => Self::Boolean(frames.values.iter().map(|&v| v > 0.5).collect()),
            TrackKind::Vector4 => {
                Self::Vector4(chunks().map(|c| [c[0], c[1], c[2], c[3]]).collect())
            }
            TrackKind::Unknown => Self::Unknown(chunks().map(<[f32]>::to_vec).collect()),
        }
    }
}

fn frame_chunks(frames: &Frames) -> impl Iterator<Item = &[f32]> {
    let c = frames.component_count;
    (0..frames.frame_count).filter_map(move |i| frames.values.get(i * c..(i + 1) * c))
}

// ============================================================================
// Track Flags
// ============================================================================

fn track_flags(track: &TrackData, compression: CompressionType, overrides: bool) -> u32 {
    let mut flags = compression.to_u32();
    if track.scale_options.inherit_scale {
        flags |= INHERIT_SCALE;
    }
    if track.scale_options.compensate_scale {
        flags |= COMPENSATE_SCALE;
    }
    if overrides {
        let f = &track.transform_flags;
        for (set, bit) in [
            (f.override_translation, OVERRIDE_TRANSLATION),
            (f.override_rotation, OVERRIDE_ROTATION),
            (f.override_scale, OVERRIDE_SCALE),
            (f.override_compensate_scale, OVERRIDE_COMPENSATE_SCALE),
        ] {
            if set {
                flags |= bit;
            }
        }
    }
    flags
}

fn scale_options(flags: u32) -> ScaleOptions {
    ScaleOptions {
        inherit_scale: flags & INHERIT_SCALE != 0,
        compensate_scale: flags & COMPENSATE_SCALE != 0,
    }
}

fn transform_flags(flags: u32) -> TransformFlags {
    TransformFlags {
        override_translation: flags & OVERRIDE_TRANSLATION != 0,
        override_rotation: flags & OVERRIDE_ROTATION != 0,
        override_scale: flags & OVERRIDE_SCALE != 0,
        override_compensate_scale: flags & OVERRIDE_COMPENSATE_SCALE != 0,
    }
}

// ============================================================================
// Reading
// ============================================================================

struct TrackEntry {
    name: String,
    flags: u32,
    frame_count: u32,
    data_offset: u32,
    data_size: u32,
    position: u64,
}

fn read_track_entry(r: &mut SsbhReader) -> Result<TrackEntry> {
    let position = r.position();
    Ok(TrackEntry {
        name: r.read_string()?,
        flags: r.read_u32()?,
        frame_count: r.read_u32()?,
        data_offset: r.read_u32()?,
        data_size: r.read_u32()?,
        position,
    })
}

impl TrackEntry {
    fn decode(
        self,
        group_type: GroupType,
        buffer: &[u8],
        buffer_offset: u64,
        overrides: bool,
    ) -> Result<TrackData> {
        let compression =
            CompressionType::from_u32(self.flags & COMPRESSION_MASK, self.position + 4)?;
        let start = self.data_offset as usize;
        let bytes = buffer
            .get(start..start + self.data_size as usize)
            .ok_or_else(|| {
                SsbhError::malformed(self.position + 12, "track data outside track buffer")
            })?;
        let frames = decode_track(
            compression,
            self.frame_count as usize,
            bytes,
            buffer_offset + start as u64,
        )?;

        let kind = classify_track(group_type, &self.name);
        if kind.component_count().is_some_and(|n| n != frames.component_count) {
            tracing::warn!(
                "track {:?} has {} components, expected {:?}; keeping raw values",
                self.name,
                frames.component_count,
                kind
            );
        }

        Ok(TrackData {
            values: TrackValues::from_frames(kind, frames),
            scale_options: scale_options(self.flags),
            transform_flags: if overrides {
                transform_flags(self.flags)
            } else {
                TransformFlags::default()
            },
            name: self.name,
        })
    }
}

// ============================================================================
// Writing
// ============================================================================

impl AnimData {
    /// Compress every track and encode the document
    pub fn to_bytes_with(&self, config: &AnimConfig) -> Result<Vec<u8>> {
        let layout = resolve_version(
            AnimData::FORMAT_NAME,
            AnimData::KNOWN_VERSIONS,
            self.major_version,
            self.minor_version,
        )?;
        let overrides = layout >= OVERRIDE_FLAGS_VERSION;

        let tracks: Vec<&TrackData> = self
            .groups
            .iter()
            .flat_map(|g| g.nodes.iter().flat_map(|n| n.tracks.iter()))
            .collect();
        let encode = |track: &&TrackData| {
            encode_track(track.values.kind(), &track.values.to_frames(), config)
        };
        let encoded: Vec<EncodedTrack> = if config.parallel {
            tracks.par_iter().map(encode).collect()
        } else {
            tracks.iter().map(encode).collect()
        };

        let mut track_buffer = Vec::new();
        let mut offsets = Vec::with_capacity(encoded.len());
        for e in &encoded {
            offsets.push(track_buffer.len() as u32);
            track_buffer.extend_from_slice(&e.data);
        }

        let mut writer = ContainerWriter::new();
        let mut groups = Block::new();
        let mut next_track = 0;
        for group in &self.groups {
            let mut nodes = Block::new();
            for node in &group.nodes {
                let mut entries = Block::new();
                for track in &node.tracks {
                    let e = &encoded[next_track];
                    entries.write_string(&track.name);
                    entries.write_u32(track_flags(track, e.compression, overrides));
                    entries.write_u32(e.frame_count);
                    entries.write_u32(offsets[next_track]);
                    entries.write_u32(e.data.len() as u32);
                    next_track += 1;
                }
                nodes.write_string(&node.name);
                nodes.write_array(writer.array(entries, node.tracks.len()));
            }
            groups.write_u32(group.group_type.to_u32());
            groups.write_array(writer.array(nodes, group.nodes.len()));
        }

        let mut root = Block::new();
        root.write_f32(self.final_frame_index);
        root.write_u32(0);
        root.write_array(writer.array(groups, self.groups.len()));
        root.write_array(writer.byte_buffer(track_buffer));

        tracing::debug!(
            "writing anim {}.{} with {} groups and {} tracks",
            self.major_version,
            self.minor_version,
            self.groups.len(),
            encoded.len()
        );
        Ok(writer.finish(
            Self::MAGIC,
            (self.major_version, self.minor_version),
            root,
            &self.trailing_data,
        ))
    }
}

impl SsbhFormat for AnimData {
    const MAGIC: [u8; 4] = *b"ANIM";
    const FORMAT_NAME: &'static str = "anim";
    const KNOWN_VERSIONS: &'static [(u16, u16)] = &[(2, 0), (2, 1)];

    fn read(bytes: &[u8]) -> Result<Self> {
        let mut container =
            Container::open(bytes, Self::MAGIC, Self::FORMAT_NAME, Self::KNOWN_VERSIONS)?;
        let overrides = container.layout >= OVERRIDE_FLAGS_VERSION;
        let r = &mut container.reader;

        let final_frame_index = r.read_f32()?;
        let _reserved = r.read_u32()?;
        let groups = r.read_array(GROUP_ENTRY_SIZE, |r| {
            let offset = r.position();
            let group_type = GroupType::from_u32(r.read_u32()?, offset)?;
            let nodes = r.read_array(NODE_ENTRY_SIZE, |r| {
                let name = r.read_string()?;
                let tracks = r.read_array(TRACK_ENTRY_SIZE, read_track_entry)?;
                Ok((name, tracks))
            })?;
            Ok((group_type, nodes))
        })?;
        let buffer_field = r.position();
        let buffer_offset = buffer_field + u64::from(r.read_u32()?);
        r.seek(buffer_field)?;
        let buffer = r.read_byte_buffer()?;
        let trailing_data = container.trailing_data()?;

        let groups = groups
            .into_iter()
            .map(|(group_type, nodes)| {
                let nodes = nodes
                    .into_iter()
                    .map(|(name, tracks)| {
                        let tracks = tracks
                            .into_iter()
                            .map(|t| t.decode(group_type, buffer, buffer_offset, overrides))
                            .collect::<Result<Vec<_>>>()?;
                        Ok(NodeData { name, tracks })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(GroupData { group_type, nodes })
            })
            .collect::<Result<Vec<_>>>()?;

        let (major_version, minor_version) = container.version();
        tracing::debug!(
            "read anim {}.{} with {} groups (track buffer at 0x{:X})",
            major_version,
            minor_version,
            groups.len(),
            buffer_offset
        );
        Ok(Self {
            major_version,
            minor_version,
            final_frame_index,
            groups,
            trailing_data,
        })
    }

    fn to_bytes(&self) -> Result<Vec<u8>> {
        self.to_bytes_with(&AnimConfig::default())
    }
}
