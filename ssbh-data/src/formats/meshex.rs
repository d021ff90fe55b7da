//! Mesh exchange format (.numshexb)
//!
//! Groups mesh objects that share a full name and stores a bounding sphere
//! and draw flags for each group.
//!
//! # Layout
//! ```text
//! Root (24 bytes):
//! 0x00: all_data bounding sphere (center xyz, radius)
//! 0x10: groups array (32 bytes each)
//!
//! Group:
//! 0x00: bounding sphere (center xyz, radius)
//! 0x10: mesh_object_full_name string
//! 0x14: mesh_object_name string
//! 0x18: entry_flags array (u16 each)
//! ```
//!
//! The file sphere is the union of the group spheres and is rebuilt on save.

use glam::Vec3A;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use super::SsbhFormat;
use super::mesh::MeshObjectData;
use crate::binary::{Block, Container, ContainerWriter, SsbhReader, resolve_version};
use crate::error::Result;
use crate::geometry::{BoundingSphere, calculate_bounding_sphere, union_spheres};

const GROUP_SIZE: usize = 32;

const DRAW_MODEL: u16 = 1 << 0;
const CAST_SHADOW: u16 = 1 << 1;

/// Mesh exchange document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshExData {
    pub major_version: u16,
    pub minor_version: u16,
    pub mesh_object_groups: Vec<MeshObjectGroupData>,
    #[serde(default)]
    pub trailing_data: Vec<u8>,
}

impl Default for MeshExData {
    fn default() -> Self {
        Self {
            major_version: 1,
            minor_version: 0,
            mesh_object_groups: Vec::new(),
            trailing_data: Vec::new(),
        }
    }
}

/// Mesh objects sharing one full name
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MeshObjectGroupData {
    pub bounding_sphere: BoundingSphere,
    /// Name without visibility tags or a `Shape` suffix
    pub mesh_object_name: String,
    pub mesh_object_full_name: String,
    /// One entry per mesh object in the group
    pub entry_flags: Vec<EntryFlags>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryFlags {
    pub draw_model: bool,
    pub cast_shadow: bool,
}

impl Default for EntryFlags {
    fn default() -> Self {
        Self {
            draw_model: true,
            cast_shadow: true,
        }
    }
}

impl EntryFlags {
    pub fn to_u16(self) -> u16 {
        let mut bits = 0;
        if self.draw_model {
            bits |= DRAW_MODEL;
        }
        if self.cast_shadow {
            bits |= CAST_SHADOW;
        }
        bits
    }

    pub fn from_u16(bits: u16) -> Self {
        Self {
            draw_model: bits & DRAW_MODEL != 0,
            cast_shadow: bits & CAST_SHADOW != 0,
        }
    }
}

/// Strip a `_VIS` visibility tag and a trailing `Shape` from a mesh object name.
///
/// ```
/// use ssbh_data::formats::meshex::strip_mesh_object_name;
///
/// assert_eq!(strip_mesh_object_name("body_VIS_O_OBJShape"), "body");
/// assert_eq!(strip_mesh_object_name("eyeShape"), "eye");
/// assert_eq!(strip_mesh_object_name("hair"), "hair");
/// ```
pub fn strip_mesh_object_name(full_name: &str) -> &str {
    let name = match full_name.find("_VIS") {
        Some(i) => &full_name[..i],
        None => full_name,
    };
    name.strip_suffix("Shape").unwrap_or(name)
}

impl MeshExData {
    /// Group `objects` by full name in order of first appearance.
    ///
    /// Each group's sphere encloses the positions of all its members.
    pub fn from_mesh_objects(objects: &[MeshObjectData]) -> Self {
        let mut group_indices: HashMap<&str, usize> = HashMap::new();
        let mut groups: Vec<(&str, Vec<Vec3A>, usize)> = Vec::new();

        for object in objects {
            let positions = object
                .positions
                .first()
                .map(|a| a.data.to_vec3a())
                .unwrap_or_default();
            match group_indices.get(object.name.as_str()) {
                Some(&i) => {
                    let (_, points, count) = &mut groups[i];
                    points.extend(positions);
                    *count += 1;
                }
                None => {
                    group_indices.insert(object.name.as_str(), groups.len());
                    groups.push((object.name.as_str(), positions, 1));
                }
            }
        }

        let mesh_object_groups = groups
            .into_iter()
            .map(|(full_name, points, count)| MeshObjectGroupData {
                bounding_sphere: calculate_bounding_sphere(&points),
                mesh_object_name: strip_mesh_object_name(full_name).to_string(),
                mesh_object_full_name: full_name.to_string(),
                entry_flags: vec![EntryFlags::default(); count],
            })
            .collect();

        Self {
            mesh_object_groups,
            ..Default::default()
        }
    }

    /// Sphere enclosing every group
    pub fn calculate_bounding_sphere(&self) -> BoundingSphere {
        let spheres: Vec<_> = self
            .mesh_object_groups
            .iter()
            .map(|g| g.bounding_sphere)
            .collect();
        union_spheres(&spheres)
    }
}

fn read_sphere(r: &mut SsbhReader) -> Result<BoundingSphere> {
    let [x, y, z, radius] = r.read_f32s::<4>()?;
    Ok(BoundingSphere {
        center: [x, y, z],
        radius,
    })
}

fn write_sphere(block: &mut Block, sphere: &BoundingSphere) {
    block.write_f32s(&sphere.center);
    block.write_f32(sphere.radius);
}

impl SsbhFormat for MeshExData {
    const MAGIC: [u8; 4] = *b"MSEX";
    const FORMAT_NAME: &'static str = "meshex";
    const KNOWN_VERSIONS: &'static [(u16, u16)] = &[(1, 0)];

    fn read(bytes: &[u8]) -> Result<Self> {
        let mut container =
            Container::open(bytes, Self::MAGIC, Self::FORMAT_NAME, Self::KNOWN_VERSIONS)?;
        let r = &mut container.reader;

        let _all_data = read_sphere(r)?;
        let mesh_object_groups = r.read_array(GROUP_SIZE, |r| {
            let bounding_sphere = read_sphere(r)?;
            let mesh_object_full_name = r.read_string()?;
            let mesh_object_name = r.read_string()?;
            let entry_flags = r.read_array(2, |r| Ok(EntryFlags::from_u16(r.read_u16()?)))?;
            Ok(MeshObjectGroupData {
                bounding_sphere,
                mesh_object_name,
                mesh_object_full_name,
                entry_flags,
            })
        })?;
        let trailing_data = container.trailing_data()?;

        let (major_version, minor_version) = container.version();
        tracing::debug!("read meshex with {} groups", mesh_object_groups.len());
        Ok(Self {
            major_version,
            minor_version,
            mesh_object_groups,
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

        let mut writer = ContainerWriter::new();
        let mut root = Block::new();
        write_sphere(&mut root, &self.calculate_bounding_sphere());

        let groups = writer.array_of(&self.mesh_object_groups, |writer, block, group| {
            write_sphere(block, &group.bounding_sphere);
            block.write_string(&group.mesh_object_full_name);
            block.write_string(&group.mesh_object_name);
            let flags = writer.array_of(&group.entry_flags, |_, b, f| b.write_u16(f.to_u16()));
            block.write_array(flags);
        });
        root.write_array(groups);

        Ok(writer.finish(
            Self::MAGIC,
            (self.major_version, self.minor_version),
            root,
            &self.trailing_data,
        ))
    }
}
