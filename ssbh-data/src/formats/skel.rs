//! Skeleton format (.nusktb)
//!
//! Local bone transforms plus world and inverse transforms derived from them.
//! Matrices are row-major and apply to row vectors.
//!
//! # Layout
//! ```text
//! Root (40 bytes):
//! 0x00: bones array (12 bytes each)
//! 0x08: world_transforms array (16 × f32 each)
//! 0x10: inv_world_transforms array
//! 0x18: transforms array (local)
//! 0x20: inv_transforms array
//!
//! Bone:
//! 0x00: name string
//! 0x04: index u16
//! 0x06: parent_index i16 (-1 = root)
//! 0x08: billboard_type u16
//! 0x0A: flags u16
//! ```
//!
//! Only names, parents, billboard types and local transforms are read back.
//! The other matrix arrays are recomputed on save.

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use super::SsbhFormat;
use crate::binary::{Block, Container, ContainerWriter, SsbhReader};
use crate::error::{Result, SsbhError};
use crate::geometry::{Matrix4x4, flatten, invert_rows, mul_rows, rows_from_mat4, mat4_from_rows, unflatten};

const BONE_ENTRY_SIZE: usize = 12;
const MATRIX_SIZE: usize = 64;
const BONE_FLAGS: u16 = 1;

/// Skeleton document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkelData {
    pub major_version: u16,
    pub minor_version: u16,
    pub bones: Vec<BoneData>,
    #[serde(default)]
    pub trailing_data: Vec<u8>,
}

impl Default for SkelData {
    fn default() -> Self {
        Self {
            major_version: 1,
            minor_version: 0,
            bones: Vec::new(),
            trailing_data: Vec::new(),
        }
    }
}

/// A named joint with a transform relative to its parent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoneData {
    pub name: String,
    /// Row-major transform relative to the parent bone
    pub transform: Matrix4x4,
    /// Index of the parent in [`SkelData::bones`], or `None` for a root
    pub parent_index: Option<usize>,
    #[serde(default)]
    pub billboard_type: BillboardType,
}

/// How a bone rotates to face the camera
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BillboardType {
    #[default]
    Disabled,
    XAxisViewPointAligned,
    YAxisViewPointAligned,
    Unk3,
    XYAxisViewPointAligned,
    YAxisViewPlaneAligned,
    XYAxisViewPlaneAligned,
}

impl BillboardType {
    pub const fn to_u16(self) -> u16 {
        match self {
            Self::Disabled => 0,
            Self::XAxisViewPointAligned => 1,
            Self::YAxisViewPointAligned => 2,
            Self::Unk3 => 3,
            Self::XYAxisViewPointAligned => 4,
            Self::YAxisViewPlaneAligned => 6,
            Self::XYAxisViewPlaneAligned => 8,
        }
    }

    pub fn from_u16(value: u16, offset: u64) -> Result<Self> {
        Ok(match value {
            0 => Self::Disabled,
            1 => Self::XAxisViewPointAligned,
            2 => Self::YAxisViewPointAligned,
            3 => Self::Unk3,
            4 => Self::XYAxisViewPointAligned,
            6 => Self::YAxisViewPlaneAligned,
            8 => Self::XYAxisViewPlaneAligned,
            _ => return Err(SsbhError::malformed(offset, "unknown billboard type")),
        })
    }
}

impl SkelData {
    /// World transform of `bone`, composed through every ancestor.
    ///
    /// Each step computes `child.local * parent.world`. The walk costs one
    /// matrix product per ancestor and fails instead of looping when the
    /// parent chain revisits a bone.
    ///
    /// ```
    /// use ssbh_data::formats::skel::{BoneData, SkelData};
    /// use ssbh_data::geometry::IDENTITY;
    ///
    /// let mut translated = IDENTITY;
    /// translated[3] = [1.0, 2.0, 3.0, 1.0];
    /// let skel = SkelData {
    ///     bones: vec![
    ///         BoneData { name: "Trans".into(), transform: translated, parent_index: None, billboard_type: Default::default() },
    ///         BoneData { name: "Rot".into(), transform: translated, parent_index: Some(0), billboard_type: Default::default() },
    ///     ],
    ///     ..Default::default()
    /// };
    /// let world = skel.calculate_world_transform(&skel.bones[1]).unwrap();
    /// assert_eq!(world[3], [2.0, 4.0, 6.0, 1.0]);
    /// ```
    pub fn calculate_world_transform(&self, bone: &BoneData) -> Result<Matrix4x4> {
        let start = self.bones.iter().position(|b| std::ptr::eq(b, bone));

        let mut visited = HashSet::new();
        if let Some(index) = start {
            visited.insert(index);
        }

        let mut transform = bone.transform;
        let mut child_name = &bone.name;
        let mut parent = bone.parent_index;
        while let Some(parent_index) = parent {
            let parent_bone =
                self.bones
                    .get(parent_index)
                    .ok_or_else(|| SsbhError::InvalidParentIndex {
                        bone: child_name.clone(),
                        parent_index,
                        bone_count: self.bones.len(),
                    })?;
            if !visited.insert(parent_index) {
                return Err(SsbhError::CyclicHierarchy {
                    bone: bone.name.clone(),
                    index: start.unwrap_or(parent_index),
                });
            }
            transform = mul_rows(&transform, &parent_bone.transform);
            child_name = &parent_bone.name;
            parent = parent_bone.parent_index;
        }
        Ok(transform)
    }

    /// World transform of the bone at `index`
    pub fn calculate_world_transform_at(&self, index: usize) -> Result<Matrix4x4> {
        let bone = self
            .bones
            .get(index)
            .ok_or_else(|| SsbhError::InvalidParentIndex {
                bone: String::new(),
                parent_index: index,
                bone_count: self.bones.len(),
            })?;
        self.calculate_world_transform(bone)
    }
}

/// Transform of `world_transform` relative to `parent_world_transform`.
///
/// Returns `parent_world⁻¹ * world`, or a copy of `world_transform` when
/// there is no parent. All matrices are row-major.
///
/// World transforms compose as `local * parent_world` for row vectors, so the
/// result equals the bone's local transform only when it commutes with the
/// parent's world transform, as pure translations do.
///
/// ```
/// use ssbh_data::formats::skel::calculate_relative_transform;
///
/// let world = [
///     [2.0, 0.0, 0.0, 0.0],
///     [0.0, 4.0, 0.0, 0.0],
///     [0.0, 0.0, 8.0, 0.0],
///     [0.0, 0.0, 0.0, 1.0],
/// ];
/// let parent_world = [
///     [1.0, 0.0, 0.0, 0.0],
///     [0.0, 1.0, 0.0, 0.0],
///     [0.0, 0.0, 1.0, 0.0],
///     [1.0, 2.0, 3.0, 1.0],
/// ];
/// assert_eq!(
///     calculate_relative_transform(&world, Some(&parent_world)),
///     [
///         [2.0, 0.0, 0.0, 0.0],
///         [0.0, 4.0, 0.0, 0.0],
///         [0.0, 0.0, 8.0, 0.0],
///         [-2.0, -8.0, -24.0, 1.0],
///     ]
/// );
/// assert_eq!(calculate_relative_transform(&world, None), world);
/// ```
pub fn calculate_relative_transform(
    world_transform: &Matrix4x4,
    parent_world_transform: Option<&Matrix4x4>,
) -> Matrix4x4 {
    match parent_world_transform {
        Some(parent_world_transform) => {
            let world = mat4_from_rows(world_transform);
            let parent_world = mat4_from_rows(parent_world_transform);
            // Row-major parent⁻¹ * world, built from the transposed glam forms.
            rows_from_mat4(world * parent_world.inverse())
        }
        None => *world_transform,
    }
}

fn read_matrix(r: &mut SsbhReader) -> Result<Matrix4x4> {
    Ok(unflatten(r.read_f32s::<16>()?))
}

fn write_matrices(writer: &mut ContainerWriter, root: &mut Block, matrices: &[Matrix4x4]) {
    let array = writer.array_of(matrices, |_, block, m| block.write_f32s(&flatten(m)));
    root.write_array(array);
}

impl SsbhFormat for SkelData {
    const MAGIC: [u8; 4] = *b"SKEL";
    const FORMAT_NAME: &'static str = "skel";
    const KNOWN_VERSIONS: &'static [(u16, u16)] = &[(1, 0)];

    fn read(bytes: &[u8]) -> Result<Self> {
        let mut container =
            Container::open(bytes, Self::MAGIC, Self::FORMAT_NAME, Self::KNOWN_VERSIONS)?;
        let r = &mut container.reader;

        let entries_offset = r.position();
        let entries = r.read_array(BONE_ENTRY_SIZE, |r| {
            let offset = r.position();
            let name = r.read_string()?;
            let _index = r.read_u16()?;
            let parent_index = match r.read_i16()? {
                -1 => None,
                i if i >= 0 => Some(i as usize),
                _ => return Err(SsbhError::malformed(offset + 6, "negative parent index")),
            };
            let billboard_type = BillboardType::from_u16(r.read_u16()?, offset + 8)?;
            let _flags = r.read_u16()?;
            Ok((name, parent_index, billboard_type))
        })?;
        let _world_transforms = r.read_array(MATRIX_SIZE, read_matrix)?;
        let _inv_world_transforms = r.read_array(MATRIX_SIZE, read_matrix)?;
        let transforms = r.read_array(MATRIX_SIZE, read_matrix)?;
        let _inv_transforms = r.read_array(MATRIX_SIZE, read_matrix)?;
        let trailing_data = container.trailing_data()?;

        if transforms.len() != entries.len() {
            return Err(SsbhError::malformed(
                entries_offset,
                "bone count does not match transform count",
            ));
        }

        let bones: Vec<BoneData> = entries
            .into_iter()
            .zip(transforms)
            .map(|((name, parent_index, billboard_type), transform)| BoneData {
                name,
                transform,
                parent_index,
                billboard_type,
            })
            .collect();

        let (major_version, minor_version) = container.version();
        tracing::debug!("read skel {}.{} with {} bones", major_version, minor_version, bones.len());
        Ok(Self {
            major_version,
            minor_version,
            bones,
            trailing_data,
        })
    }

    fn to_bytes(&self) -> Result<Vec<u8>> {
        crate::binary::resolve_version(
            Self::FORMAT_NAME,
            Self::KNOWN_VERSIONS,
            self.major_version,
            self.minor_version,
        )?;

        let world_transforms = self
            .bones
            .iter()
            .map(|b| self.calculate_world_transform(b))
            .collect::<Result<Vec<_>>>()?;
        let inv_world_transforms: Vec<_> = world_transforms.iter().map(invert_rows).collect();
        let transforms: Vec<_> = self.bones.iter().map(|b| b.transform).collect();
        let inv_transforms: Vec<_> = transforms.iter().map(invert_rows).collect();

        let mut writer = ContainerWriter::new();
        let mut root = Block::new();

        let mut entries = Block::new();
        for (i, bone) in self.bones.iter().enumerate() {
            let parent_index = match bone.parent_index {
                Some(p) => i16::try_from(p).map_err(|_| SsbhError::InvalidParentIndex {
                    bone: bone.name.clone(),
                    parent_index: p,
                    bone_count: self.bones.len(),
                })?,
                None => -1,
            };
            entries.write_string(&bone.name);
            entries.write_u16(i as u16);
            entries.write_i16(parent_index);
            entries.write_u16(bone.billboard_type.to_u16());
            entries.write_u16(BONE_FLAGS);
        }
        let entries = writer.array(entries, self.bones.len());
        root.write_array(entries);

        write_matrices(&mut writer, &mut root, &world_transforms);
        write_matrices(&mut writer, &mut root, &inv_world_transforms);
        write_matrices(&mut writer, &mut root, &transforms);
        write_matrices(&mut writer, &mut root, &inv_transforms);

        tracing::debug!("writing skel with {} bones", self.bones.len());
        Ok(writer.finish(
            Self::MAGIC,
            (self.major_version, self.minor_version),
            root,
            &self.trailing_data,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::IDENTITY;

    fn bone(name: &str, transform: Matrix4x4, parent_index: Option<usize>) -> BoneData {
        BoneData {
            name: name.into(),
            transform,
            parent_index,
            billboard_type: BillboardType::Disabled,
        }
    }

    fn scale_translate(s: f32, t: [f32; 3]) -> Matrix4x4 {
        [
            [s, 0.0, 0.0, 0.0],
            [0.0, s, 0.0, 0.0],
            [0.0, 0.0, s, 0.0],
            [t[0], t[1], t[2], 1.0],
        ]
    }

    fn chain() -> SkelData {
        SkelData {
            bones: vec![
                bone("Root", scale_translate(2.0, [1.0, 0.0, 0.0]), None),
                bone("A", scale_translate(1.0, [0.0, 1.0, 0.0]), Some(0)),
                bone("B", scale_translate(3.0, [0.0, 0.0, 1.0]), Some(1)),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_root_world_is_local() {
        let skel = chain();
        assert_eq!(
            skel.calculate_world_transform(&skel.bones[0]).unwrap(),
            skel.bones[0].transform
        );
    }

    #[test]
    fn test_world_transform_of_chain() {
        let skel = chain();
        let [root, a, b] = [0, 1, 2].map(|i| skel.bones[i].transform);
        let expected = mul_rows(&mul_rows(&b, &a), &root);
        assert_eq!(skel.calculate_world_transform(&skel.bones[2]).unwrap(), expected);

        // B's origin: (0,0,1) moves by A to (0,1,1), then root scales and offsets.
        assert_eq!(expected[3], [1.0, 2.0, 2.0, 1.0]);
        assert_eq!(expected[0], [6.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_world_transform_at() {
        let skel = chain();
        assert_eq!(
            skel.calculate_world_transform_at(1).unwrap(),
            skel.calculate_world_transform(&skel.bones[1]).unwrap()
        );
        assert!(matches!(
            skel.calculate_world_transform_at(5),
            Err(SsbhError::InvalidParentIndex { parent_index: 5, .. })
        ));
    }

    #[test]
    fn test_self_parent_is_cyclic() {
        let mut skel = chain();
        skel.bones[2].parent_index = Some(2);
        assert_eq!(
            skel.calculate_world_transform(&skel.bones[2]),
            Err(SsbhError::CyclicHierarchy {
                bone: "B".into(),
                index: 2
            })
        );
    }

    #[test]
    fn test_longer_cycle() {
        let mut skel = chain();
        skel.bones[0].parent_index = Some(2);
        assert!(matches!(
            skel.calculate_world_transform(&skel.bones[1]),
            Err(SsbhError::CyclicHierarchy { .. })
        ));
        assert!(matches!(skel.to_bytes(), Err(SsbhError::CyclicHierarchy { .. })));
    }

    #[test]
    fn test_cycle_for_detached_bone() {
        let mut skel = chain();
        skel.bones[1].parent_index = Some(1);
        let detached = bone("Extra", IDENTITY, Some(1));
        assert!(matches!(
            skel.calculate_world_transform(&detached),
            Err(SsbhError::CyclicHierarchy { .. })
        ));
    }

    #[test]
    fn test_parent_out_of_range() {
        let mut skel = chain();
        skel.bones[1].parent_index = Some(7);
        assert_eq!(
            skel.calculate_world_transform(&skel.bones[2]),
            Err(SsbhError::InvalidParentIndex {
                bone: "A".into(),
                parent_index: 7,
                bone_count: 3
            })
        );
    }

    #[test]
    fn test_relative_transform_applies_parent_inverse_first() {
        let world = [
            [2.0, 0.0, 0.0, 0.0],
            [0.0, 4.0, 0.0, 0.0],
            [0.0, 0.0, 8.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ];
        let parent_world = scale_translate(1.0, [1.0, 2.0, 3.0]);
        assert_eq!(
            calculate_relative_transform(&world, Some(&parent_world)),
            [
                [2.0, 0.0, 0.0, 0.0],
                [0.0, 4.0, 0.0, 0.0],
                [0.0, 0.0, 8.0, 0.0],
                [-2.0, -8.0, -24.0, 1.0],
            ]
        );
    }

    #[test]
    fn test_relative_transform_of_translations_is_local() {
        let skel = SkelData {
            bones: vec![
                bone("Root", scale_translate(1.0, [1.0, 0.0, 0.0]), None),
                bone("A", scale_translate(1.0, [0.0, 2.0, 0.0]), Some(0)),
                bone("B", scale_translate(1.0, [0.5, 0.0, -3.0]), Some(1)),
            ],
            ..Default::default()
        };
        let parent_world = skel.calculate_world_transform(&skel.bones[1]).unwrap();
        let world = skel.calculate_world_transform(&skel.bones[2]).unwrap();
        assert_eq!(world[3], [1.5, 2.0, -3.0, 1.0]);
        assert_eq!(
            calculate_relative_transform(&world, Some(&parent_world)),
            skel.bones[2].transform
        );
    }

    #[test]
    fn test_skel_roundtrip() {
        let mut skel = chain();
        skel.bones[1].billboard_type = BillboardType::YAxisViewPlaneAligned;
        let bytes = skel.to_bytes().unwrap();
        assert_eq!(&bytes[0..4], b"SKEL");
        assert_eq!(SkelData::read(&bytes).unwrap(), skel);
    }

    #[test]
    fn test_stored_world_transforms() {
        let skel = chain();
        let bytes = skel.to_bytes().unwrap();
        let mut container =
            Container::open(&bytes, SkelData::MAGIC, "skel", SkelData::KNOWN_VERSIONS).unwrap();
        let r = &mut container.reader;
        let _ = r.read_array(BONE_ENTRY_SIZE, |r| r.read_f32s::<3>()).unwrap();
        let world = r.read_array(MATRIX_SIZE, read_matrix).unwrap();
        let inv_world = r.read_array(MATRIX_SIZE, read_matrix).unwrap();
        assert_eq!(world[2], skel.calculate_world_transform(&skel.bones[2]).unwrap());
        assert_eq!(inv_world[0], invert_rows(&skel.bones[0].transform));
    }

    #[test]
    fn test_billboard_type_values() {
        for value in [0, 1, 2, 3, 4, 6, 8] {
            assert_eq!(BillboardType::from_u16(value, 0).unwrap().to_u16(), value);
        }
        assert!(BillboardType::from_u16(5, 0).is_err());
    }
}
