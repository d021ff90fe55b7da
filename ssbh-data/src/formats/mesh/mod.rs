//! Mesh geometry format (.numshb)
//!
//! Vertex attributes of every mesh object are packed into two shared,
//! interleaved vertex buffers and one shared index buffer. Bone weights are
//! stored per object in rigging groups.
//!
//! # Layout
//! ```text
//! Root (136 bytes):
//! 0x00: model_name string
//! 0x04: bounding_info (25 × f32)
//! 0x68: objects array (172 bytes each)
//! 0x70: vertex_buffers array of byte buffers (2)
//! 0x78: index_buffer byte buffer
//! 0x80: rigging_groups array (24 bytes each)
//!
//! Object:
//! 0x00: name string
//! 0x04: sub_index u64
//! 0x0C: parent_bone_name string
//! 0x10: vertex_count u32
//! 0x14: vertex_index_count u32
//! 0x18: vertex_offset0 u32, vertex_offset1 u32
//! 0x20: index_offset u32
//! 0x24: stride0 u32, stride1 u32
//! 0x2C: index_type u32 (0 = u16, 1 = u32)
//! 0x30: rigging_type u32 (0 = single bound, 1 = weighted)
//! 0x34: sort_bias i32
//! 0x38: depth_flags u32 (bit 0 = disable test, bit 1 = disable write)
//! 0x3C: bounding_info (25 × f32)
//! 0xA0: attributes array (24 bytes each)
//!
//! Attribute:
//! 0x00: usage u32, data_type u32, buffer_index u32, buffer_offset u32
//! 0x10: sub_index u32, name string
//!
//! Rigging group:
//! 0x00: mesh_object_name string
//! 0x04: sub_index u64
//! 0x0C: max_influences u32
//! 0x10: bone buffers array of { bone_name string, weights byte buffer }
//! ```
//!
//! Weights are `(u32 vertex_index, f32 weight)` in version 1.8 and
//! `(u16 vertex_index, f32 weight)` in 1.10.

mod buffers;

#[cfg(test)]
mod tests;

use std::collections::VecDeque;
use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt};
use glam::{Vec3A, Vec4};
use hashbrown::{HashMap, HashSet};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

pub use buffers::{
    AttributeUsage, IndexType, MeshAttribute, ObjectBuffers, build_object_buffers,
    calculate_vertex_count, infer_data_type,
};
pub use crate::packing::AttributeDataType;

use self::buffers::{
    LAYOUT_1_8, ObjectBufferRange, positions_of, read_attribute, read_vertex_indices,
};
use super::SsbhFormat;
use crate::binary::{Block, Container, ContainerWriter, SsbhReader, push_le, resolve_version};
use crate::config::MeshConfig;
use crate::error::{Result, SsbhError};
use crate::geometry::{
    Aabb, BoundingInfo, BoundingSphere, Matrix4x4, OrientedBoundingBox, calculate_bounding_info,
    transform_row_vectors,
};

const OBJECT_ENTRY_SIZE: usize = 172;
const ATTRIBUTE_ENTRY_SIZE: usize = 24;
const RIGGING_GROUP_SIZE: usize = 24;
const BONE_BUFFER_SIZE: usize = 12;

/// Mesh document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshData {
    pub major_version: u16,
    pub minor_version: u16,
    pub objects: Vec<MeshObjectData>,
    /// Unknown root fields from a newer minor version
    #[serde(default)]
    pub trailing_data: Vec<u8>,
}

impl Default for MeshData {
    fn default() -> Self {
        Self {
            major_version: 1,
            minor_version: 10,
            objects: Vec::new(),
            trailing_data: Vec::new(),
        }
    }
}

/// One drawable piece of geometry.
///
/// `name` and `sub_index` together identify the object. When
/// `bone_influences` is non-empty the object is skin-bound and consumers
/// ignore `parent_bone_name`; both fields are stored as given.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MeshObjectData {
    pub name: String,
    pub sub_index: u64,
    /// Bone for single-bind objects, or empty
    pub parent_bone_name: String,
    pub sort_bias: i32,
    pub disable_depth_test: bool,
    pub disable_depth_write: bool,
    pub vertex_indices: Vec<u32>,
    pub positions: Vec<AttributeData>,
    pub normals: Vec<AttributeData>,
    pub binormals: Vec<AttributeData>,
    pub tangents: Vec<AttributeData>,
    pub texture_coordinates: Vec<AttributeData>,
    pub color_sets: Vec<AttributeData>,
    pub bone_influences: Vec<BoneInfluence>,
}

impl MeshObjectData {
    /// Number of vertices shared by every attribute list
    pub fn vertex_count(&self) -> Result<usize> {
        calculate_vertex_count(self)
    }
}

/// Named list of per-vertex vectors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeData {
    pub name: String,
    pub data: VectorData,
}

/// Per-vertex vectors with a fixed component count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VectorData {
    Vector1(Vec<f32>),
    Vector2(Vec<[f32; 2]>),
    Vector3(Vec<[f32; 3]>),
    Vector4(Vec<[f32; 4]>),
}

impl VectorData {
    pub fn len(&self) -> usize {
        match self {
            Self::Vector1(v) => v.len(),
            Self::Vector2(v) => v.len(),
            Self::Vector3(v) => v.len(),
            Self::Vector4(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn component_count(&self) -> usize {
        match self {
            Self::Vector1(_) => 1,
            Self::Vector2(_) => 2,
            Self::Vector3(_) => 3,
            Self::Vector4(_) => 4,
        }
    }

    /// Element `i` padded with zeros, plus the real component count
    pub fn element(&self, i: usize) -> ([f32; 4], usize) {
        match self {
            Self::Vector1(v) => ([v[i], 0.0, 0.0, 0.0], 1),
            Self::Vector2(v) => ([v[i][0], v[i][1], 0.0, 0.0], 2),
            Self::Vector3(v) => ([v[i][0], v[i][1], v[i][2], 0.0], 3),
            Self::Vector4(v) => (v[i], 4),
        }
    }

    /// Build from padded elements, keeping the first `component_count` components
    pub fn from_elements(component_count: usize, elements: Vec<[f32; 4]>) -> Self {
        match component_count {
            1 => Self::Vector1(elements.iter().map(|e| e[0]).collect()),
            2 => Self::Vector2(elements.iter().map(|e| [e[0], e[1]]).collect()),
            3 => Self::Vector3(elements.iter().map(|e| [e[0], e[1], e[2]]).collect()),
            _ => Self::Vector4(elements),
        }
    }

    /// Points with missing components set to zero
    pub fn to_vec3a(&self) -> Vec<Vec3A> {
        (0..self.len())
            .map(|i| {
                let (e, _) = self.element(i);
                Vec3A::new(e[0], e[1], e[2])
            })
            .collect()
    }

    fn to_vec4_with_w(&self, w: f32) -> Vec<Vec4> {
        (0..self.len())
            .map(|i| {
                let (e, _) = self.element(i);
                Vec4::new(e[0], e[1], e[2], w)
            })
            .collect()
    }
}

/// Skin weights from one bone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoneInfluence {
    pub bone_name: String,
    pub vertex_weights: Vec<VertexWeight>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VertexWeight {
    pub vertex_index: u32,
    pub vertex_weight: f32,
}

// ============================================================================
// Point and Vector Transforms
// ============================================================================

fn transform_inner(data: &VectorData, transform: &Matrix4x4, w: f32) -> VectorData {
    let mut points = data.to_vec4_with_w(w);
    transform_row_vectors(&mut points, transform);
    match data {
        VectorData::Vector1(_) => VectorData::Vector1(points.iter().map(|p| p.x).collect()),
        VectorData::Vector2(_) => VectorData::Vector2(points.iter().map(|p| [p.x, p.y]).collect()),
        VectorData::Vector3(_) => {
            VectorData::Vector3(points.iter().map(|p| [p.x, p.y, p.z]).collect())
        }
        VectorData::Vector4(original) => VectorData::Vector4(
            original
                .iter()
                .zip(points)
                .map(|(old, new)| [new.x, new.y, new.z, old[3]])
                .collect(),
        ),
    }
}

/// Transform positions by a row-major matrix, including its translation.
///
/// Elements are treated as points with a 4th component of 1.0. The result
/// has the same component count; for [`VectorData::Vector4`] the original 4th
/// component is kept.
///
/// ```
/// use ssbh_data::formats::mesh::{VectorData, transform_points};
///
/// let transform = [
///     [1.0, 0.0, 0.0, 0.0],
///     [0.0, 2.0, 0.0, 0.0],
///     [0.0, 0.0, 3.0, 0.0],
///     [1.0, 1.0, 1.0, 1.0],
/// ];
/// let points = VectorData::Vector3(vec![[1.0, 1.0, 1.0]]);
/// assert_eq!(
///     transform_points(&points, &transform),
///     VectorData::Vector3(vec![[2.0, 3.0, 4.0]])
/// );
/// ```
pub fn transform_points(data: &VectorData, transform: &Matrix4x4) -> VectorData {
    transform_inner(data, transform, 1.0)
}

/// Transform directions by a row-major matrix, ignoring its translation.
///
/// Elements are treated as vectors with a 4th component of 0.0.
pub fn transform_vectors(data: &VectorData, transform: &Matrix4x4) -> VectorData {
    transform_inner(data, transform, 0.0)
}

// ============================================================================
// Reading
// ============================================================================

/// Object entry as stored, before attribute data is unpacked
struct MeshObjectEntry {
    offset: u64,
    name: String,
    sub_index: u64,
    parent_bone_name: String,
    range: ObjectBufferRange,
    sort_bias: i32,
    depth_flags: u32,
    attributes: Vec<MeshAttribute>,
}

struct RiggingGroup {
    mesh_object_name: String,
    sub_index: u64,
    influences: Vec<BoneInfluence>,
}

fn read_bounding_info(r: &mut SsbhReader) -> Result<BoundingInfo> {
    let [cx, cy, cz, radius] = r.read_f32s::<4>()?;
    let min = r.read_f32s::<3>()?;
    let max = r.read_f32s::<3>()?;
    let center = r.read_f32s::<3>()?;
    let t = r.read_f32s::<9>()?;
    let size = r.read_f32s::<3>()?;
    Ok(BoundingInfo {
        sphere: BoundingSphere {
            center: [cx, cy, cz],
            radius,
        },
        aabb: Aabb { min, max },
        obb: OrientedBoundingBox {
            center,
            transform: [[t[0], t[1], t[2]], [t[3], t[4], t[5]], [t[6], t[7], t[8]]],
            size,
        },
    })
}

fn write_bounding_info(block: &mut Block, info: &BoundingInfo) {
    block.write_f32s(&info.sphere.center);
    block.write_f32(info.sphere.radius);
    block.write_f32s(&info.aabb.min);
    block.write_f32s(&info.aabb.max);
    block.write_f32s(&info.obb.center);
    for row in &info.obb.transform {
        block.write_f32s(row);
    }
    block.write_f32s(&info.obb.size);
}

fn read_attribute_entry(r: &mut SsbhReader) -> Result<MeshAttribute> {
    let offset = r.position();
    let usage = AttributeUsage::from_u32(r.read_u32()?, offset)?;
    let data_type = AttributeDataType::from_u32(r.read_u32()?, offset + 4)?;
    let buffer_index = r.read_u32()?;
    if buffer_index > 1 {
        return Err(SsbhError::malformed(offset + 8, "attribute buffer index out of range"));
    }
    Ok(MeshAttribute {
        usage,
        data_type,
        buffer_index,
        buffer_offset: r.read_u32()?,
        sub_index: r.read_u32()?,
        name: r.read_string()?,
    })
}

fn read_object_entry(r: &mut SsbhReader) -> Result<MeshObjectEntry> {
    let offset = r.position();
    let name = r.read_string()?;
    let sub_index = r.read_u64()?;
    let parent_bone_name = r.read_string()?;
    let vertex_count = r.read_u32()? as usize;
    let index_count = r.read_u32()? as usize;
    let vertex_offsets = [r.read_u32()?, r.read_u32()?];
    let index_offset = r.read_u32()?;
    let strides = [r.read_u32()?, r.read_u32()?];
    let index_type = IndexType::from_u32(r.read_u32()?, offset + 0x2C)?;
    let _rigging_type = r.read_u32()?;
    let sort_bias = r.read_i32()?;
    let depth_flags = r.read_u32()?;
    let _bounding_info = read_bounding_info(r)?;
    let attributes = r.read_array(ATTRIBUTE_ENTRY_SIZE, read_attribute_entry)?;

    Ok(MeshObjectEntry {
        offset,
        name,
        sub_index,
        parent_bone_name,
        range: ObjectBufferRange {
            vertex_count,
            vertex_offsets,
            strides,
            index_count,
            index_offset,
            index_type,
        },
        sort_bias,
        depth_flags,
        attributes,
    })
}

fn read_vertex_weights(bytes: &[u8], layout: (u16, u16), offset: u64) -> Result<Vec<VertexWeight>> {
    let wide_index = layout <= LAYOUT_1_8;
    let size = if wide_index { 8 } else { 6 };
    if bytes.len() % size != 0 {
        return Err(SsbhError::malformed(offset, "weight buffer has a partial element"));
    }
    let ended = |_: std::io::Error| SsbhError::malformed(offset, "weight buffer ended early");
    let mut cursor = Cursor::new(bytes);
    let mut weights = Vec::with_capacity(bytes.len() / size);
    for _ in 0..bytes.len() / size {
        let vertex_index = if wide_index {
            cursor.read_u32::<LittleEndian>().map_err(ended)?
        } else {
            u32::from(cursor.read_u16::<LittleEndian>().map_err(ended)?)
        };
        let vertex_weight = cursor.read_f32::<LittleEndian>().map_err(ended)?;
        weights.push(VertexWeight {
            vertex_index,
            vertex_weight,
        });
    }
    Ok(weights)
}

fn read_rigging_group(r: &mut SsbhReader, layout: (u16, u16)) -> Result<RiggingGroup> {
    let mesh_object_name = r.read_string()?;
    let sub_index = r.read_u64()?;
    let _max_influences = r.read_u32()?;
    let influences = r.read_array(BONE_BUFFER_SIZE, |r| {
        let bone_name = r.read_string()?;
        let offset = r.position();
        let bytes = r.read_byte_buffer()?;
        Ok(BoneInfluence {
            bone_name,
            vertex_weights: read_vertex_weights(bytes, layout, offset)?,
        })
    })?;
    Ok(RiggingGroup {
        mesh_object_name,
        sub_index,
        influences,
    })
}

impl MeshObjectEntry {
    fn into_object(
        self,
        vertex_buffers: &[&[u8]],
        index_buffer: &[u8],
        bone_influences: Vec<BoneInfluence>,
    ) -> Result<MeshObjectData> {
        let mut object = MeshObjectData {
            vertex_indices: read_vertex_indices(index_buffer, &self.range, self.offset)?,
            bone_influences,
            name: self.name,
            sub_index: self.sub_index,
            parent_bone_name: self.parent_bone_name,
            sort_bias: self.sort_bias,
            disable_depth_test: self.depth_flags & 1 != 0,
            disable_depth_write: self.depth_flags & 2 != 0,
            ..Default::default()
        };

        let mut attributes = self.attributes;
        attributes.sort_by_key(|a| (a.usage.to_u32(), a.sub_index));
        for attribute in &attributes {
            let buffer = vertex_buffers
                .get(attribute.buffer_index as usize)
                .ok_or_else(|| SsbhError::malformed(self.offset, "missing vertex buffer"))?;
            let data = read_attribute(attribute, buffer, &self.range, self.offset)?;
            let group = match attribute.usage {
                AttributeUsage::Position => &mut object.positions,
                AttributeUsage::Normal => &mut object.normals,
                AttributeUsage::Binormal => &mut object.binormals,
                AttributeUsage::Tangent => &mut object.tangents,
                AttributeUsage::TextureCoordinate => &mut object.texture_coordinates,
                AttributeUsage::ColorSet => &mut object.color_sets,
            };
            group.push(AttributeData {
                name: attribute.name.clone(),
                data,
            });
        }
        Ok(object)
    }
}

// ============================================================================
// Writing
// ============================================================================

/// Distinct bones influencing the most heavily weighted vertex
fn calculate_max_influences(influences: &[BoneInfluence]) -> usize {
    let mut bones_by_vertex: HashMap<u32, HashSet<&str>> = HashMap::new();
    for influence in influences {
        for weight in &influence.vertex_weights {
            bones_by_vertex
                .entry(weight.vertex_index)
                .or_default()
                .insert(&influence.bone_name);
        }
    }
    bones_by_vertex.values().map(|s| s.len()).max().unwrap_or(0)
}

fn write_vertex_weights(object: &MeshObjectData, weights: &[VertexWeight], layout: (u16, u16)) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    for (position, weight) in weights.iter().enumerate() {
        if layout <= LAYOUT_1_8 {
            push_le(&mut bytes, weight.vertex_index);
        } else {
            let index = u16::try_from(weight.vertex_index).map_err(|_| SsbhError::IndexOutOfRange {
                mesh_object: object.name.clone(),
                index: weight.vertex_index,
                position,
                vertex_count: u16::MAX as usize + 1,
            })?;
            push_le(&mut bytes, index);
        }
        push_le(&mut bytes, weight.vertex_weight);
    }
    Ok(bytes)
}

fn write_rigging_groups(
    writer: &mut ContainerWriter,
    objects: &[MeshObjectData],
    layout: (u16, u16),
) -> Result<Block> {
    let mut sorted: Vec<&MeshObjectData> = objects.iter().collect();
    sorted.sort_by(|a, b| (&a.name, a.sub_index).cmp(&(&b.name, b.sub_index)));

    let mut groups = Block::new();
    for object in &sorted {
        let mut bone_buffers = Block::new();
        for influence in &object.bone_influences {
            let weights = write_vertex_weights(object, &influence.vertex_weights, layout)?;
            bone_buffers.write_string(&influence.bone_name);
            let weights = writer.byte_buffer(weights);
            bone_buffers.write_array(weights);
        }
        let bone_buffers = writer.array(bone_buffers, object.bone_influences.len());

        groups.write_string(&object.name);
        groups.write_u64(object.sub_index);
        groups.write_u32(calculate_max_influences(&object.bone_influences) as u32);
        groups.write_array(bone_buffers);
    }
    Ok(groups)
}

impl MeshData {
    /// Rebuild vertex buffers and bounding data, then encode
    pub fn to_bytes_with(&self, config: &MeshConfig) -> Result<Vec<u8>> {
        let layout = resolve_version(
            Self::FORMAT_NAME,
            Self::KNOWN_VERSIONS,
            self.major_version,
            self.minor_version,
        )?;

        let build = |object: &MeshObjectData| {
            build_object_buffers(object, layout, config.prefer_u16_indices)
        };
        let built: Vec<ObjectBuffers> = if config.parallel {
            self.objects.par_iter().map(build).collect::<Result<_>>()?
        } else {
            self.objects.iter().map(build).collect::<Result<_>>()?
        };

        let mut writer = ContainerWriter::new();
        let mut vertex_buffers = [Vec::new(), Vec::new()];
        let mut index_buffer = Vec::new();
        let mut entries = Block::new();

        for (object, buffers) in self.objects.iter().zip(&built) {
            let vertex_offsets = [vertex_buffers[0].len() as u32, vertex_buffers[1].len() as u32];
            vertex_buffers[0].extend_from_slice(&buffers.vertex_buffers[0]);
            vertex_buffers[1].extend_from_slice(&buffers.vertex_buffers[1]);

            let index_offset = index_buffer.len() as u32;
            index_buffer.extend_from_slice(&buffers.index_bytes);
            index_buffer.resize(index_buffer.len().next_multiple_of(4), 0);

            let attributes = writer.array_of(&buffers.attributes, |_, block, a| {
                block.write_u32(a.usage.to_u32());
                block.write_u32(a.data_type.to_u32());
                block.write_u32(a.buffer_index);
                block.write_u32(a.buffer_offset);
                block.write_u32(a.sub_index);
                block.write_string(&a.name);
            });

            let depth_flags =
                u32::from(object.disable_depth_test) | (u32::from(object.disable_depth_write) << 1);
            let rigging_type = u32::from(!object.bone_influences.is_empty());

            entries.write_string(&object.name);
            entries.write_u64(object.sub_index);
            entries.write_string(&object.parent_bone_name);
            entries.write_u32(buffers.vertex_count as u32);
            entries.write_u32(object.vertex_indices.len() as u32);
            entries.write_u32(vertex_offsets[0]);
            entries.write_u32(vertex_offsets[1]);
            entries.write_u32(index_offset);
            entries.write_u32(buffers.strides[0]);
            entries.write_u32(buffers.strides[1]);
            entries.write_u32(buffers.index_type.to_u32());
            entries.write_u32(rigging_type);
            entries.write_i32(object.sort_bias);
            entries.write_u32(depth_flags);
            write_bounding_info(&mut entries, &buffers.bounding_info);
            entries.write_array(attributes);
        }

        let all_positions: Vec<Vec3A> = self.objects.iter().flat_map(positions_of).collect();

        let mut root = Block::new();
        root.write_string("");
        write_bounding_info(&mut root, &calculate_bounding_info(&all_positions));
        let entries = writer.array(entries, self.objects.len());
        root.write_array(entries);

        let mut buffer_fields = Block::new();
        for buffer in vertex_buffers {
            let buffer = writer.byte_buffer(buffer);
            buffer_fields.write_array(buffer);
        }
        let buffer_fields = writer.array(buffer_fields, 2);
        root.write_array(buffer_fields);

        let index_buffer = writer.byte_buffer(index_buffer);
        root.write_array(index_buffer);

        let groups = write_rigging_groups(&mut writer, &self.objects, layout)?;
        let groups = writer.array(groups, self.objects.len());
        root.write_array(groups);

        tracing::debug!(
            "writing mesh {}.{} with {} objects",
            self.major_version,
            self.minor_version,
            self.objects.len()
        );
        Ok(writer.finish(
            Self::MAGIC,
            (self.major_version, self.minor_version),
            root,
            &self.trailing_data,
        ))
    }
}

impl SsbhFormat for MeshData {
    const MAGIC: [u8; 4] = *b"MESH";
    const FORMAT_NAME: &'static str = "mesh";
    const KNOWN_VERSIONS: &'static [(u16, u16)] = &[(1, 8), (1, 10)];

    fn read(bytes: &[u8]) -> Result<Self> {
        let mut container = Container::open(bytes, Self::MAGIC, Self::FORMAT_NAME, Self::KNOWN_VERSIONS)?;
        let layout = container.layout;
        let r = &mut container.reader;

        let _model_name = r.read_string()?;
        let _bounding_info = read_bounding_info(r)?;
        let entries = r.read_array(OBJECT_ENTRY_SIZE, read_object_entry)?;
        let vertex_buffers = r.read_array(8, |r| r.read_byte_buffer())?;
        let index_buffer = r.read_byte_buffer()?;
        let groups = r.read_array(RIGGING_GROUP_SIZE, |r| read_rigging_group(r, layout))?;
        let trailing_data = container.trailing_data()?;

        // Objects sharing a name and sub index take their groups in order.
        let mut influences: HashMap<(String, u64), VecDeque<&[BoneInfluence]>> = HashMap::new();
        for group in &groups {
            influences
                .entry((group.mesh_object_name.clone(), group.sub_index))
                .or_default()
                .push_back(&group.influences);
        }
        let objects = entries
            .into_iter()
            .map(|e| {
                let bone_influences = influences
                    .get_mut(&(e.name.clone(), e.sub_index))
                    .and_then(VecDeque::pop_front)
                    .map(<[BoneInfluence]>::to_vec)
                    .unwrap_or_default();
                e.into_object(&vertex_buffers, index_buffer, bone_influences)
            })
            .collect::<Result<Vec<_>>>()?;

        let unmatched: usize = influences.values().map(VecDeque::len).sum();
        if unmatched > 0 {
            tracing::warn!("ignoring {} rigging groups with no matching mesh object", unmatched);
        }

        let (major_version, minor_version) = container.version();
        tracing::debug!(
            "read mesh {}.{} with {} objects",
            major_version,
            minor_version,
            objects.len()
        );
        Ok(Self {
            major_version,
            minor_version,
            objects,
            trailing_data,
        })
    }

    fn to_bytes(&self) -> Result<Vec<u8>> {
        self.to_bytes_with(&MeshConfig::default())
    }
}
