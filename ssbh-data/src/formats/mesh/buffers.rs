//! Geometry buffer builder
//!
//! Turns a mesh object's independent attribute lists into interleaved vertex
//! buffers plus index data, and splits stored buffers back into attributes.
//!
//! Buffer 0 holds positions, normals, tangents, then binormals. Buffer 1 holds
//! texture coordinates, then color sets. Within each usage, attributes keep
//! their declaration order.

use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt};
use glam::Vec3A;
use serde::{Deserialize, Serialize};

use super::{AttributeData, MeshObjectData, VectorData};
use crate::binary::push_le;
use crate::error::{Result, SsbhError};
use crate::geometry::{BoundingInfo, calculate_bounding_info};
use crate::packing::{AttributeDataType, pack_element, unpack_element};

/// Layout version 1.8
pub(super) const LAYOUT_1_8: (u16, u16) = (1, 8);

/// What an attribute is used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeUsage {
    Position,
    Normal,
    Binormal,
    Tangent,
    TextureCoordinate,
    ColorSet,
}

impl AttributeUsage {
    pub const fn to_u32(self) -> u32 {
        match self {
            Self::Position => 0,
            Self::Normal => 1,
            Self::Binormal => 2,
            Self::Tangent => 3,
            Self::TextureCoordinate => 4,
            Self::ColorSet => 5,
        }
    }

    pub fn from_u32(value: u32, offset: u64) -> Result<Self> {
        Ok(match value {
            0 => Self::Position,
            1 => Self::Normal,
            2 => Self::Binormal,
            3 => Self::Tangent,
            4 => Self::TextureCoordinate,
            5 => Self::ColorSet,
            _ => return Err(SsbhError::malformed(offset, "unknown attribute usage")),
        })
    }

    /// Vertex buffer the usage is packed into
    pub const fn buffer_index(self) -> u32 {
        match self {
            Self::Position | Self::Normal | Self::Binormal | Self::Tangent => 0,
            Self::TextureCoordinate | Self::ColorSet => 1,
        }
    }
}

/// Stored metadata locating one attribute inside a vertex buffer
#[derive(Debug, Clone, PartialEq)]
pub struct MeshAttribute {
    pub name: String,
    pub usage: AttributeUsage,
    pub data_type: AttributeDataType,
    pub buffer_index: u32,
    /// Byte offset of the element within one vertex
    pub buffer_offset: u32,
    /// Index among attributes with the same usage
    pub sub_index: u32,
}

/// Storage width of a vertex index buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexType {
    U16,
    U32,
}

impl IndexType {
    pub const fn to_u32(self) -> u32 {
        match self {
            Self::U16 => 0,
            Self::U32 => 1,
        }
    }

    pub fn from_u32(value: u32, offset: u64) -> Result<Self> {
        match value {
            0 => Ok(Self::U16),
            1 => Ok(Self::U32),
            _ => Err(SsbhError::malformed(offset, "unknown index type")),
        }
    }

    pub const fn size_in_bytes(self) -> usize {
        match self {
            Self::U16 => 2,
            Self::U32 => 4,
        }
    }
}

/// Packed data for one mesh object
#[derive(Debug, Clone)]
pub struct ObjectBuffers {
    pub attributes: Vec<MeshAttribute>,
    pub strides: [u32; 2],
    pub vertex_buffers: [Vec<u8>; 2],
    pub vertex_count: usize,
    pub index_type: IndexType,
    pub index_bytes: Vec<u8>,
    pub bounding_info: BoundingInfo,
}

/// Element format for an attribute, chosen from its usage and component count.
///
/// Layout 1.8 has no full precision four component format outside color sets,
/// so every other `Vector4` is stored as half floats there.
pub fn infer_data_type(
    usage: AttributeUsage,
    data: &VectorData,
    layout: (u16, u16),
) -> AttributeDataType {
    use AttributeDataType as T;
    use AttributeUsage as U;

    if layout <= LAYOUT_1_8 {
        if let (U::Position, VectorData::Vector4(_)) = (usage, data) {
            tracing::warn!(
                "mesh 1.8 stores Vector4 positions as half floats, precision will be lost"
            );
        }
        return match (usage, data) {
            (U::ColorSet, VectorData::Vector4(_)) => T::Byte4,
            (_, VectorData::Vector1(_)) => T::Float1,
            (_, VectorData::Vector2(_)) => T::Float2,
            (_, VectorData::Vector3(_)) => T::Float3,
            (_, VectorData::Vector4(_)) => T::HalfFloat4,
        };
    }

    match (usage, data) {
        (U::ColorSet, VectorData::Vector4(_)) => T::Byte4,
        (U::Normal | U::Tangent | U::TextureCoordinate | U::ColorSet, VectorData::Vector2(_)) => {
            T::HalfFloat2
        }
        (U::Normal | U::Tangent | U::TextureCoordinate, VectorData::Vector4(_)) => T::HalfFloat4,
        (_, VectorData::Vector1(_)) => T::Float1,
        (_, VectorData::Vector2(_)) => T::Float2,
        (_, VectorData::Vector3(_)) => T::Float3,
        (_, VectorData::Vector4(_)) => T::Float4,
    }
}

/// Attribute groups in packing order
fn attribute_groups(object: &MeshObjectData) -> [(AttributeUsage, &[AttributeData]); 6] {
    [
        (AttributeUsage::Position, &object.positions),
        (AttributeUsage::Normal, &object.normals),
        (AttributeUsage::Tangent, &object.tangents),
        (AttributeUsage::Binormal, &object.binormals),
        (AttributeUsage::TextureCoordinate, &object.texture_coordinates),
        (AttributeUsage::ColorSet, &object.color_sets),
    ]
}

/// Shared attribute length, or the first attribute that disagrees
pub fn calculate_vertex_count(object: &MeshObjectData) -> Result<usize> {
    let mut expected: Option<(usize, &str)> = None;
    for (_, group) in attribute_groups(object) {
        for attribute in group {
            match expected {
                None => expected = Some((attribute.data.len(), &attribute.name)),
                Some((len, _)) if len != attribute.data.len() => {
                    return Err(SsbhError::InvalidAttributeLength {
                        mesh_object: object.name.clone(),
                        attribute: attribute.name.clone(),
                        expected: len,
                        actual: attribute.data.len(),
                    });
                }
                Some(_) => (),
            }
        }
    }
    Ok(expected.map(|(len, _)| len).unwrap_or(0))
}

/// Fail on the first vertex index that is not below `vertex_count`
pub fn validate_vertex_indices(object: &MeshObjectData, vertex_count: usize) -> Result<()> {
    match object
        .vertex_indices
        .iter()
        .enumerate()
        .find(|(_, index)| **index as usize >= vertex_count)
    {
        Some((position, &index)) => Err(SsbhError::IndexOutOfRange {
            mesh_object: object.name.clone(),
            index,
            position,
            vertex_count,
        }),
        None => Ok(()),
    }
}

/// Pack one mesh object's attributes and indices and compute its bounds
pub fn build_object_buffers(
    object: &MeshObjectData,
    layout: (u16, u16),
    prefer_u16_indices: bool,
) -> Result<ObjectBuffers> {
    let vertex_count = calculate_vertex_count(object)?;
    validate_vertex_indices(object, vertex_count)?;

    // Assign formats and offsets in packing order.
    let mut attributes = Vec::new();
    let mut sources = Vec::new();
    let mut strides = [0u32; 2];
    for (usage, group) in attribute_groups(object) {
        for (sub_index, attribute) in group.iter().enumerate() {
            let data_type = infer_data_type(usage, &attribute.data, layout);
            let buffer_index = usage.buffer_index();
            attributes.push(MeshAttribute {
                name: attribute.name.clone(),
                usage,
                data_type,
                buffer_index,
                buffer_offset: strides[buffer_index as usize],
                sub_index: sub_index as u32,
            });
            sources.push(&attribute.data);
            strides[buffer_index as usize] += data_type.size_in_bytes() as u32;
        }
    }

    // Interleave: every attribute of a buffer for vertex 0, then vertex 1, ...
    let mut vertex_buffers = [
        Vec::with_capacity(strides[0] as usize * vertex_count),
        Vec::with_capacity(strides[1] as usize * vertex_count),
    ];
    for i in 0..vertex_count {
        for (attribute, data) in attributes.iter().zip(&sources) {
            let (components, count) = data.element(i);
            pack_element(
                attribute.data_type,
                &components[..count],
                &mut vertex_buffers[attribute.buffer_index as usize],
            );
        }
    }

    let fits_u16 = object.vertex_indices.iter().all(|&i| i <= u16::MAX as u32);
    let index_type = if prefer_u16_indices && fits_u16 {
        IndexType::U16
    } else {
        IndexType::U32
    };
    let mut index_bytes = Vec::with_capacity(object.vertex_indices.len() * index_type.size_in_bytes());
    for &index in &object.vertex_indices {
        match index_type {
            IndexType::U16 => push_le(&mut index_bytes, index as u16),
            IndexType::U32 => push_le(&mut index_bytes, index),
        }
    }

    let positions = positions_of(object);

    Ok(ObjectBuffers {
        attributes,
        strides,
        vertex_buffers,
        vertex_count,
        index_type,
        index_bytes,
        bounding_info: calculate_bounding_info(&positions),
    })
}

/// Location of one object's data within the shared buffers
#[derive(Debug, Clone, Copy)]
pub struct ObjectBufferRange {
    pub vertex_count: usize,
    pub vertex_offsets: [u32; 2],
    pub strides: [u32; 2],
    pub index_count: usize,
    pub index_offset: u32,
    pub index_type: IndexType,
}

/// Split one attribute out of an interleaved buffer
pub fn read_attribute(
    attribute: &MeshAttribute,
    buffer: &[u8],
    range: &ObjectBufferRange,
    entry_offset: u64,
) -> Result<VectorData> {
    let b = attribute.buffer_index as usize;
    let stride = range.strides[b] as usize;
    let start = range.vertex_offsets[b] as usize + attribute.buffer_offset as usize;
    let size = attribute.data_type.size_in_bytes();

    if stride == 0 && range.vertex_count > 1 {
        return Err(SsbhError::malformed(
            entry_offset,
            "vertex buffer stride is zero for more than one vertex",
        ));
    }
    if range.vertex_count > 0 {
        let end = (range.vertex_count - 1)
            .checked_mul(stride)
            .and_then(|n| n.checked_add(start + size));
        if end.is_none_or(|end| end > buffer.len()) {
            return Err(SsbhError::malformed(
                entry_offset,
                "attribute data extends past end of vertex buffer",
            ));
        }
    }

    let count = attribute.data_type.component_count();
    let mut elements = Vec::with_capacity(range.vertex_count);
    for i in 0..range.vertex_count {
        let offset = start + i * stride;
        let mut components = [0.0f32; 4];
        unpack_element(attribute.data_type, &buffer[offset..offset + size], &mut components);
        elements.push(components);
    }
    Ok(VectorData::from_elements(count, elements))
}

/// Read an object's vertex indices from the shared index buffer
pub fn read_vertex_indices(
    buffer: &[u8],
    range: &ObjectBufferRange,
    entry_offset: u64,
) -> Result<Vec<u32>> {
    let size = range.index_type.size_in_bytes();
    let start = range.index_offset as usize;
    let past_end =
        || SsbhError::malformed(entry_offset, "vertex indices extend past end of index buffer");
    let bytes = range
        .index_count
        .checked_mul(size)
        .and_then(|len| start.checked_add(len))
        .and_then(|end| buffer.get(start..end))
        .ok_or_else(past_end)?;

    let mut cursor = Cursor::new(bytes);
    let mut indices = Vec::with_capacity(range.index_count);
    for _ in 0..range.index_count {
        let index = match range.index_type {
            IndexType::U16 => cursor.read_u16::<LittleEndian>().map(u32::from),
            IndexType::U32 => cursor.read_u32::<LittleEndian>(),
        };
        indices.push(index.map_err(|_| past_end())?);
    }
    Ok(indices)
}

/// Positions of the first position attribute, used for bounding data
pub fn positions_of(object: &MeshObjectData) -> Vec<Vec3A> {
    object
        .positions
        .first()
        .map(|a| a.data.to_vec3a())
        .unwrap_or_default()
}
