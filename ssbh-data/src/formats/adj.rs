//! Vertex adjacency format (.adjb)
//!
//! For every vertex of a mesh object, the vertex pairs of up to nine faces
//! that touch it. Used for shading that needs neighboring geometry.
//!
//! # Layout
//! ```text
//! Root (8 bytes):
//! 0x00: entries array (12 bytes each)
//!
//! Entry:
//! 0x00: mesh_object_index u32
//! 0x04: vertex_adjacency array (i16 each)
//! ```
//!
//! Vertex `v` owns `vertex_adjacency[v * 18..v * 18 + 18]`. Each face adds the
//! two other corners in winding order, and unused slots are `-1`.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::SsbhFormat;
use super::mesh::MeshObjectData;
use crate::binary::{Block, Container, ContainerWriter, resolve_version};
use crate::config::{AdjConfig, MAX_ADJACENT_FACES};
use crate::error::{Result, SsbhError};

/// Values stored per vertex
pub const ADJACENCY_STRIDE: usize = MAX_ADJACENT_FACES * 2;

const ENTRY_SIZE: usize = 12;
const UNUSED: i16 = -1;

/// Adjacency document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjData {
    pub major_version: u16,
    pub minor_version: u16,
    pub entries: Vec<AdjEntryData>,
    #[serde(default)]
    pub trailing_data: Vec<u8>,
}

impl Default for AdjData {
    fn default() -> Self {
        Self {
            major_version: 1,
            minor_version: 0,
            entries: Vec::new(),
            trailing_data: Vec::new(),
        }
    }
}

/// Adjacency of one mesh object
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AdjEntryData {
    /// Index into the mesh's object list
    pub mesh_object_index: usize,
    /// [`ADJACENCY_STRIDE`] values per vertex
    pub vertex_adjacency: Vec<i16>,
}

type FacePairs = SmallVec<[[i16; 2]; MAX_ADJACENT_FACES]>;

impl AdjEntryData {
    /// Build adjacency from a triangle list with the default face limit.
    ///
    /// ```
    /// use ssbh_data::formats::adj::AdjEntryData;
    ///
    /// let entry = AdjEntryData::new(0, &[0, 1, 2], 3).unwrap();
    /// assert_eq!(entry.vertex_adjacency.len(), 3 * 18);
    /// assert_eq!(&entry.vertex_adjacency[..4], &[1, 2, -1, -1]);
    /// ```
    pub fn new(mesh_object_index: usize, vertex_indices: &[u32], vertex_count: usize) -> Result<Self> {
        Self::new_with(mesh_object_index, vertex_indices, vertex_count, &AdjConfig::default())
    }

    pub fn new_with(
        mesh_object_index: usize,
        vertex_indices: &[u32],
        vertex_count: usize,
        config: &AdjConfig,
    ) -> Result<Self> {
        let vertex_adjacency = triangle_adjacency("", vertex_indices, vertex_count, config)?;
        Ok(Self {
            mesh_object_index,
            vertex_adjacency,
        })
    }

    /// Build adjacency from a mesh object's indices and attribute length
    pub fn from_mesh_object(mesh_object_index: usize, object: &MeshObjectData) -> Result<Self> {
        Self::from_mesh_object_with(mesh_object_index, object, &AdjConfig::default())
    }

    pub fn from_mesh_object_with(
        mesh_object_index: usize,
        object: &MeshObjectData,
        config: &AdjConfig,
    ) -> Result<Self> {
        let vertex_count = object.vertex_count()?;
        let vertex_adjacency =
            triangle_adjacency(&object.name, &object.vertex_indices, vertex_count, config)?;
        Ok(Self {
            mesh_object_index,
            vertex_adjacency,
        })
    }

    /// Adjacent values of `vertex`, or `None` past the end
    pub fn adjacent_vertices(&self, vertex: usize) -> Option<&[i16]> {
        let start = vertex.checked_mul(ADJACENCY_STRIDE)?;
        self.vertex_adjacency.get(start..start + ADJACENCY_STRIDE)
    }
}

fn checked_index(
    mesh_object: &str,
    index: u32,
    position: usize,
    vertex_count: usize,
) -> Result<i16> {
    let limit = vertex_count.min(i16::MAX as usize + 1);
    if (index as usize) < limit {
        Ok(index as i16)
    } else {
        Err(SsbhError::IndexOutOfRange {
            mesh_object: mesh_object.to_string(),
            index,
            position,
            vertex_count: limit,
        })
    }
}

fn triangle_adjacency(
    mesh_object: &str,
    vertex_indices: &[u32],
    vertex_count: usize,
    config: &AdjConfig,
) -> Result<Vec<i16>> {
    if vertex_indices.len() % 3 != 0 {
        return Err(SsbhError::IncompleteTriangle {
            mesh_object: mesh_object.to_string(),
            index_count: vertex_indices.len(),
        });
    }

    let face_limit = config.face_limit();
    let mut adjacent: Vec<FacePairs> = vec![FacePairs::new(); vertex_count];
    let mut dropped = 0usize;

    for (face, indices) in vertex_indices.chunks_exact(3).enumerate() {
        let mut corners = [0i16; 3];
        for (i, (corner, &index)) in corners.iter_mut().zip(indices).enumerate() {
            *corner = checked_index(mesh_object, index, face * 3 + i, vertex_count)?;
        }
        let [a, b, c] = corners;

        // Rotations keep the face winding.
        for (vertex, pair) in [(a, [b, c]), (b, [c, a]), (c, [a, b])] {
            let slots = &mut adjacent[vertex as usize];
            if slots.contains(&pair) {
                continue;
            }
            if slots.len() < face_limit {
                slots.push(pair);
            } else {
                dropped += 1;
            }
        }
    }

    if dropped > 0 {
        tracing::warn!(
            "mesh object {:?}: dropped {} faces past the limit of {} adjacent faces",
            mesh_object,
            dropped,
            face_limit
        );
    }

    let mut vertex_adjacency = Vec::with_capacity(vertex_count * ADJACENCY_STRIDE);
    for slots in &adjacent {
        for i in 0..MAX_ADJACENT_FACES {
            let pair = slots.get(i).copied().unwrap_or([UNUSED, UNUSED]);
            vertex_adjacency.extend_from_slice(&pair);
        }
    }
    Ok(vertex_adjacency)
}

impl SsbhFormat for AdjData {
    const MAGIC: [u8; 4] = *b"ADJB";
    const FORMAT_NAME: &'static str = "adj";
    const KNOWN_VERSIONS: &'static [(u16, u16)] = &[(1, 0)];

    fn read(bytes: &[u8]) -> Result<Self> {
        let mut container =
            Container::open(bytes, Self::MAGIC, Self::FORMAT_NAME, Self::KNOWN_VERSIONS)?;
        let entries = container.reader.read_array(ENTRY_SIZE, |r| {
            let mesh_object_index = r.read_u32()? as usize;
            let vertex_adjacency = r.read_array(2, |r| r.read_i16())?;
            Ok(AdjEntryData {
                mesh_object_index,
                vertex_adjacency,
            })
        })?;
        let trailing_data = container.trailing_data()?;

        let (major_version, minor_version) = container.version();
        tracing::debug!("read adj with {} entries", entries.len());
        Ok(Self {
            major_version,
            minor_version,
            entries,
            trailing_data,
        })
    }

    fn to_bytes(&self) -> Result<Vec<u8>> {
        resolve_version(
            Self::FORMAT_NAME,
            Self::KNOWN_VERSIONS,
            self.major_version,
            self.minor_version,
        )?;

        let entries = self
            .entries
            .iter()
            .map(|entry| {
                let index = u32::try_from(entry.mesh_object_index).map_err(|_| {
                    SsbhError::ValueOutOfRange {
                        field: "mesh_object_index",
                        value: entry.mesh_object_index as u64,
                        max: u32::MAX.into(),
                    }
                })?;
                Ok((index, entry))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut writer = ContainerWriter::new();
        let mut root = Block::new();
        let entries = writer.array_of(&entries, |writer, block, &(index, entry)| {
            block.write_u32(index);
            let values = writer.array_of(&entry.vertex_adjacency, |_, b, v| b.write_i16(*v));
            block.write_array(values);
        });
        root.write_array(entries);

        Ok(writer.finish(
            Self::MAGIC,
            (self.major_version, self.minor_version),
            root,
            &self.trailing_data,
        ))
    }
}
