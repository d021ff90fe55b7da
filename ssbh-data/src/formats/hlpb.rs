//! Helper bone constraint format (.nuhlpb)
//!
//! Aim and orient constraints that drive helper bones from other bones.
//!
//! # Layout
//! ```text
//! Root (32 bytes):
//! 0x00: aim_constraints array (92 bytes each)
//! 0x08: orient_constraints array (92 bytes each)
//! 0x10: constraint_indices array (u32 each)
//! 0x18: constraint_types array (u32 each, 0 = aim, 1 = orient)
//!
//! Aim constraint:
//! 0x00: name, aim_bone_name1, aim_bone_name2, aim_type1, aim_type2,
//!       target_bone_name1, target_bone_name2 (strings)
//! 0x1C: unk1 u32, unk2 u32
//! 0x24: aim [f32; 3], up [f32; 3]
//! 0x3C: quat1 [f32; 4], quat2 [f32; 4]
//!
//! Orient constraint:
//! 0x00: name, parent_bone_name1, parent_bone_name2, source_bone_name,
//!       target_bone_name (strings)
//! 0x14: unk_type u32
//! 0x18: constraint_axes [f32; 3]
//! 0x24: quat1 [f32; 4], quat2 [f32; 4]
//! 0x44: range_min [f32; 3], range_max [f32; 3]
//! ```
//!
//! The index and type arrays list every aim constraint and then every orient
//! constraint. They are rebuilt from the two constraint lists on save.

use serde::{Deserialize, Serialize};

use super::SsbhFormat;
use crate::binary::{Block, Container, ContainerWriter, SsbhReader, resolve_version};
use crate::error::Result;

const CONSTRAINT_SIZE: usize = 92;

const AIM_TYPE: u32 = 0;
const ORIENT_TYPE: u32 = 1;

/// Helper bone document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HlpbData {
    pub major_version: u16,
    pub minor_version: u16,
    pub aim_constraints: Vec<AimConstraintData>,
    pub orient_constraints: Vec<OrientConstraintData>,
    #[serde(default)]
    pub trailing_data: Vec<u8>,
}

impl Default for HlpbData {
    fn default() -> Self {
        Self {
            major_version: 1,
            minor_version: 1,
            aim_constraints: Vec::new(),
            orient_constraints: Vec::new(),
            trailing_data: Vec::new(),
        }
    }
}

/// Points a bone at a target bone
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AimConstraintData {
    pub name: String,
    pub aim_bone_name1: String,
    pub aim_bone_name2: String,
    pub aim_type1: String,
    pub aim_type2: String,
    pub target_bone_name1: String,
    pub target_bone_name2: String,
    pub unk1: u32,
    pub unk2: u32,
    pub aim: [f32; 3],
    pub up: [f32; 3],
    pub quat1: [f32; 4],
    pub quat2: [f32; 4],
}

/// Copies a source bone's rotation onto a target bone within limits
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OrientConstraintData {
    pub name: String,
    pub parent_bone_name1: String,
    pub parent_bone_name2: String,
    pub source_bone_name: String,
    pub target_bone_name: String,
    pub unk_type: u32,
    pub constraint_axes: [f32; 3],
    pub quat1: [f32; 4],
    pub quat2: [f32; 4],
    pub range_min: [f32; 3],
    pub range_max: [f32; 3],
}

fn read_aim(r: &mut SsbhReader) -> Result<AimConstraintData> {
    Ok(AimConstraintData {
        name: r.read_string()?,
        aim_bone_name1: r.read_string()?,
        aim_bone_name2: r.read_string()?,
        aim_type1: r.read_string()?,
        aim_type2: r.read_string()?,
        target_bone_name1: r.read_string()?,
        target_bone_name2: r.read_string()?,
        unk1: r.read_u32()?,
        unk2: r.read_u32()?,
        aim: r.read_f32s()?,
        up: r.read_f32s()?,
        quat1: r.read_f32s()?,
        quat2: r.read_f32s()?,
    })
}

fn write_aim(block: &mut Block, aim: &AimConstraintData) {
    block.write_string(&aim.name);
    block.write_string(&aim.aim_bone_name1);
    block.write_string(&aim.aim_bone_name2);
    block.write_string(&aim.aim_type1);
    block.write_string(&aim.aim_type2);
    block.write_string(&aim.target_bone_name1);
    block.write_string(&aim.target_bone_name2);
    block.write_u32(aim.unk1);
    block.write_u32(aim.unk2);
    block.write_f32s(&aim.aim);
    block.write_f32s(&aim.up);
    block.write_f32s(&aim.quat1);
    block.write_f32s(&aim.quat2);
}

fn read_orient(r: &mut SsbhReader) -> Result<OrientConstraintData> {
    Ok(OrientConstraintData {
        name: r.read_string()?,
        parent_bone_name1: r.read_string()?,
        parent_bone_name2: r.read_string()?,
        source_bone_name: r.read_string()?,
        target_bone_name: r.read_string()?,
        unk_type: r.read_u32()?,
        constraint_axes: r.read_f32s()?,
        quat1: r.read_f32s()?,
        quat2: r.read_f32s()?,
        range_min: r.read_f32s()?,
        range_max: r.read_f32s()?,
    })
}

fn write_orient(block: &mut Block, orient: &OrientConstraintData) {
    block.write_string(&orient.name);
    block.write_string(&orient.parent_bone_name1);
    block.write_string(&orient.parent_bone_name2);
    block.write_string(&orient.source_bone_name);
    block.write_string(&orient.target_bone_name);
    block.write_u32(orient.unk_type);
    block.write_f32s(&orient.constraint_axes);
    block.write_f32s(&orient.quat1);
    block.write_f32s(&orient.quat2);
    block.write_f32s(&orient.range_min);
    block.write_f32s(&orient.range_max);
}

impl HlpbData {
    /// Per-type index and type of every constraint, aims first
    pub fn constraint_order(&self) -> (Vec<u32>, Vec<u32>) {
        let aims = (0..self.aim_constraints.len()).map(|i| (i as u32, AIM_TYPE));
        let orients = (0..self.orient_constraints.len()).map(|i| (i as u32, ORIENT_TYPE));
        aims.chain(orients).unzip()
    }
}

impl SsbhFormat for HlpbData {
    const MAGIC: [u8; 4] = *b"HLPB";
    const FORMAT_NAME: &'static str = "hlpb";
    const KNOWN_VERSIONS: &'static [(u16, u16)] = &[(1, 1)];

    fn read(bytes: &[u8]) -> Result<Self> {
        let mut container =
            Container::open(bytes, Self::MAGIC, Self::FORMAT_NAME, Self::KNOWN_VERSIONS)?;
        let r = &mut container.reader;

        let aim_constraints = r.read_array(CONSTRAINT_SIZE, read_aim)?;
        let orient_constraints = r.read_array(CONSTRAINT_SIZE, read_orient)?;
        let constraint_indices = r.read_array(4, |r| r.read_u32())?;
        let constraint_types = r.read_array(4, |r| r.read_u32())?;
        let trailing_data = container.trailing_data()?;

        let total = aim_constraints.len() + orient_constraints.len();
        if constraint_indices.len() != total || constraint_types.len() != total {
            tracing::warn!(
                "hlpb lists {} constraint indices and {} types for {} constraints",
                constraint_indices.len(),
                constraint_types.len(),
                total
            );
        }

        let (major_version, minor_version) = container.version();
        tracing::debug!(
            "read hlpb with {} aim and {} orient constraints",
            aim_constraints.len(),
            orient_constraints.len()
        );
        Ok(Self {
            major_version,
            minor_version,
            aim_constraints,
            orient_constraints,
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

        let (indices, types) = self.constraint_order();

        let mut writer = ContainerWriter::new();
        let mut root = Block::new();
        let aims = writer.array_of(&self.aim_constraints, |_, b, aim| write_aim(b, aim));
        root.write_array(aims);
        let orients = writer.array_of(&self.orient_constraints, |_, b, o| write_orient(b, o));
        root.write_array(orients);
        let indices = writer.array_of(&indices, |_, b, i| b.write_u32(*i));
        root.write_array(indices);
        let types = writer.array_of(&types, |_, b, t| b.write_u32(*t));
        root.write_array(types);

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

    fn hlpb() -> HlpbData {
        HlpbData {
            aim_constraints: vec![AimConstraintData {
                name: "nuHelperBoneRotateAim1".into(),
                aim_bone_name1: "ArmL".into(),
                aim_bone_name2: "ArmL".into(),
                aim_type1: "DEFAULT".into(),
                aim_type2: "DEFAULT".into(),
                target_bone_name1: "HandL".into(),
                target_bone_name2: "HandL".into(),
                unk1: 0,
                unk2: 1,
                aim: [1.0, 0.0, 0.0],
                up: [0.0, 1.0, 0.0],
                quat1: [0.0, 0.0, 0.0, 1.0],
                quat2: [0.0, 0.0, 0.0, 1.0],
            }],
            orient_constraints: vec![
                OrientConstraintData {
                    name: "nuHelperBoneRotateInterp1".into(),
                    parent_bone_name1: "ArmL".into(),
                    parent_bone_name2: "ArmL".into(),
                    source_bone_name: "HandL".into(),
                    target_bone_name: "H_WristL".into(),
                    unk_type: 2,
                    constraint_axes: [0.5, 0.5, 0.5],
                    quat1: [0.0, 0.0, 0.0, 1.0],
                    quat2: [0.0, 0.0, 0.0, 1.0],
                    range_min: [-180.0; 3],
                    range_max: [180.0; 3],
                },
                OrientConstraintData {
                    name: "nuHelperBoneRotateInterp2".into(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_constraint_order() {
        let (indices, types) = hlpb().constraint_order();
        assert_eq!(indices, [0, 0, 1]);
        assert_eq!(types, [AIM_TYPE, ORIENT_TYPE, ORIENT_TYPE]);
    }

    #[test]
    fn test_round_trip() {
        let hlpb = hlpb();
        let bytes = hlpb.to_bytes().unwrap();
        assert_eq!(&bytes[0..4], b"HLPB");
        assert_eq!(HlpbData::read(&bytes).unwrap(), hlpb);
    }

    #[test]
    fn test_saved_index_arrays() {
        let bytes = hlpb().to_bytes().unwrap();
        let mut container = Container::open(
            &bytes,
            HlpbData::MAGIC,
            HlpbData::FORMAT_NAME,
            HlpbData::KNOWN_VERSIONS,
        )
        .unwrap();
        let r = &mut container.reader;
        r.seek(0x18 + 0x10).unwrap();
        assert_eq!(r.read_array(4, |r| r.read_u32()).unwrap(), [0, 0, 1]);
        assert_eq!(r.read_array(4, |r| r.read_u32()).unwrap(), [0, 1, 1]);
    }

    #[test]
    fn test_empty() {
        let hlpb = HlpbData::default();
        let bytes = hlpb.to_bytes().unwrap();
        assert_eq!(HlpbData::read(&bytes).unwrap(), hlpb);
    }
}
