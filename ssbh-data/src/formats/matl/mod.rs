//! Material format (.numatb)
//!
//! Each entry binds a shader to typed parameters keyed by [`ParamId`].
//!
//! # Layout
//! ```text
//! Root:
//! 0x00: entries array (16 bytes each)
//!
//! Entry:
//! 0x00: material_label string
//! 0x04: shader_label string
//! 0x08: attributes array (20 bytes each)
//!
//! Attribute:
//! 0x00: param_id u64
//! 0x08: param_type u32
//! 0x0C: data array (exactly one payload)
//!
//! Payloads:
//! float (0x01):       f32
//! boolean (0x02):     u32
//! vector4 (0x05):     4 × f32
//! texture (0x0B):     string
//! sampler (0x0E):     wraps, wrapt, wrapr, min_filter, mag_filter u32,
//!                     border_color 4 × f32, lod_bias f32, max_anisotropy u32
//! uv transform (0x10): 5 × f32
//! blend state (0x11): source_color, destination_color u32,
//!                     alpha_sample_to_coverage u32 (1.6 only)
//! rasterizer (0x12):  fill_mode, cull_mode u32, depth_bias f32
//! ```

mod param;

use serde::{Deserialize, Serialize};

pub use param::ParamId;

use super::SsbhFormat;
use crate::binary::{Block, Container, ContainerWriter, SsbhReader, resolve_version};
use crate::error::{Result, SsbhError};

const ENTRY_SIZE: usize = 16;
const ATTRIBUTE_SIZE: usize = 20;

/// First version whose blend states store alpha_sample_to_coverage
const ALPHA_COVERAGE_VERSION: (u16, u16) = (1, 6);

/// Material document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatlData {
    pub major_version: u16,
    pub minor_version: u16,
    pub entries: Vec<MatlEntryData>,
    #[serde(default)]
    pub trailing_data: Vec<u8>,
}

impl Default for MatlData {
    fn default() -> Self {
        Self {
            major_version: 1,
            minor_version: 6,
            entries: Vec::new(),
            trailing_data: Vec::new(),
        }
    }
}

/// One material.
///
/// Only one blend state and one rasterizer state are used by the shader.
/// Replace the existing value instead of appending a second one.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MatlEntryData {
    pub material_label: String,
    pub shader_label: String,
    pub blend_states: Vec<ParamData<BlendStateData>>,
    pub floats: Vec<ParamData<f32>>,
    pub booleans: Vec<ParamData<bool>>,
    pub vectors: Vec<ParamData<[f32; 4]>>,
    pub rasterizer_states: Vec<ParamData<RasterizerStateData>>,
    pub samplers: Vec<ParamData<SamplerData>>,
    /// Texture file names
    pub textures: Vec<ParamData<String>>,
    pub uv_transforms: Vec<ParamData<UvTransform>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamData<T> {
    pub param_id: ParamId,
    pub data: T,
}

impl<T> ParamData<T> {
    pub fn new(param_id: ParamId, data: T) -> Self {
        Self { param_id, data }
    }
}

// ============================================================================
// Enums
// ============================================================================

macro_rules! u32_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident = $value:literal,)* } $reason:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($variant,)*
        }

        impl $name {
            pub const fn to_u32(self) -> u32 {
                match self {
                    $(Self::$variant => $value,)*
                }
            }

            pub fn from_u32(value: u32, offset: u64) -> Result<Self> {
                match value {
                    $($value => Ok(Self::$variant),)*
                    _ => Err(SsbhError::malformed(offset, $reason)),
                }
            }
        }
    };
}

u32_enum!(BlendFactor {
    Zero = 0,
    One = 1,
    SourceAlpha = 2,
    DestinationAlpha = 3,
    SourceColor = 4,
    DestinationColor = 5,
    OneMinusSourceAlpha = 6,
    OneMinusDestinationAlpha = 7,
    OneMinusSourceColor = 8,
    OneMinusDestinationColor = 9,
    SourceAlphaSaturate = 10,
} "unknown blend factor");

u32_enum!(FillMode {
    Line = 0,
    Solid = 1,
} "unknown fill mode");

u32_enum!(CullMode {
    Back = 0,
    Front = 1,
    Disabled = 2,
} "unknown cull mode");

u32_enum!(WrapMode {
    Repeat = 0,
    ClampToEdge = 1,
    MirroredRepeat = 2,
    ClampToBorder = 3,
} "unknown wrap mode");

u32_enum!(MinFilter {
    Nearest = 0,
    LinearMipmapLinear = 1,
    LinearMipmapLinear2 = 2,
} "unknown min filter");

u32_enum!(MagFilter {
    Nearest = 0,
    Linear = 1,
    Linear2 = 2,
} "unknown mag filter");

u32_enum!(
    /// Stored as 0 when anisotropic filtering is off
    MaxAnisotropy {
        One = 1,
        Two = 2,
        Four = 4,
        Eight = 8,
        Sixteen = 16,
    } "unknown max anisotropy"
);

u32_enum!(ParamType {
    Float = 0x01,
    Boolean = 0x02,
    Vector4 = 0x05,
    Texture = 0x0B,
    Sampler = 0x0E,
    UvTransform = 0x10,
    BlendState = 0x11,
    RasterizerState = 0x12,
} "unknown material parameter type");

// ============================================================================
// Parameter Data
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlendStateData {
    pub source_color: BlendFactor,
    pub destination_color: BlendFactor,
    /// Not stored before version 1.6
    pub alpha_sample_to_coverage: bool,
}

impl Default for BlendStateData {
    fn default() -> Self {
        Self {
            source_color: BlendFactor::One,
            destination_color: BlendFactor::Zero,
            alpha_sample_to_coverage: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RasterizerStateData {
    pub fill_mode: FillMode,
    pub cull_mode: CullMode,
    pub depth_bias: f32,
}

impl Default for RasterizerStateData {
    fn default() -> Self {
        Self {
            fill_mode: FillMode::Solid,
            cull_mode: CullMode::Back,
            depth_bias: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplerData {
    pub wraps: WrapMode,
    pub wrapt: WrapMode,
    pub wrapr: WrapMode,
    pub min_filter: MinFilter,
    pub mag_filter: MagFilter,
    pub border_color: [f32; 4],
    pub lod_bias: f32,
    pub max_anisotropy: Option<MaxAnisotropy>,
}

impl Default for SamplerData {
    fn default() -> Self {
        Self {
            wraps: WrapMode::ClampToEdge,
            wrapt: WrapMode::ClampToEdge,
            wrapr: WrapMode::ClampToEdge,
            min_filter: MinFilter::LinearMipmapLinear,
            mag_filter: MagFilter::Linear,
            border_color: [0.0; 4],
            lod_bias: 0.0,
            max_anisotropy: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct UvTransform {
    pub scale_u: f32,
    pub scale_v: f32,
    pub rotation: f32,
    pub translate_u: f32,
    pub translate_v: f32,
}

// ============================================================================
// Reading
// ============================================================================

fn read_blend_state(r: &mut SsbhReader, layout: (u16, u16)) -> Result<BlendStateData> {
    let offset = r.position();
    let source_color = BlendFactor::from_u32(r.read_u32()?, offset)?;
    let destination_color = BlendFactor::from_u32(r.read_u32()?, offset + 4)?;
    let alpha_sample_to_coverage = if layout >= ALPHA_COVERAGE_VERSION {
        r.read_bool()?
    } else {
        false
    };
    Ok(BlendStateData {
        source_color,
        destination_color,
        alpha_sample_to_coverage,
    })
}

fn read_rasterizer_state(r: &mut SsbhReader) -> Result<RasterizerStateData> {
    let offset = r.position();
    Ok(RasterizerStateData {
        fill_mode: FillMode::from_u32(r.read_u32()?, offset)?,
        cull_mode: CullMode::from_u32(r.read_u32()?, offset + 4)?,
        depth_bias: r.read_f32()?,
    })
}

fn read_sampler(r: &mut SsbhReader) -> Result<SamplerData> {
    let offset = r.position();
    Ok(SamplerData {
        wraps: WrapMode::from_u32(r.read_u32()?, offset)?,
        wrapt: WrapMode::from_u32(r.read_u32()?, offset + 4)?,
        wrapr: WrapMode::from_u32(r.read_u32()?, offset + 8)?,
        min_filter: MinFilter::from_u32(r.read_u32()?, offset + 12)?,
        mag_filter: MagFilter::from_u32(r.read_u32()?, offset + 16)?,
        border_color: r.read_f32s()?,
        lod_bias: r.read_f32()?,
        max_anisotropy: match r.read_u32()? {
            0 => None,
            v => Some(MaxAnisotropy::from_u32(v, offset + 40)?),
        },
    })
}

fn read_uv_transform(r: &mut SsbhReader) -> Result<UvTransform> {
    let [scale_u, scale_v, rotation, translate_u, translate_v] = r.read_f32s()?;
    Ok(UvTransform {
        scale_u,
        scale_v,
        rotation,
        translate_u,
        translate_v,
    })
}

/// Read the single payload behind an attribute's data field
fn read_payload<T>(
    r: &mut SsbhReader,
    size: usize,
    read: impl FnMut(&mut SsbhReader) -> Result<T>,
) -> Result<T> {
    let field = r.position();
    let mut values = r.read_array(size, read)?;
    match (values.pop(), values.is_empty()) {
        (Some(value), true) => Ok(value),
        _ => Err(SsbhError::malformed(
            field,
            "material attribute must hold exactly one value",
        )),
    }
}

fn read_attribute(
    r: &mut SsbhReader,
    entry: &mut MatlEntryData,
    layout: (u16, u16),
) -> Result<()> {
    let offset = r.position();
    let raw_id = r.read_u64()?;
    let param_id = ParamId::from_u64(raw_id)
        .ok_or_else(|| SsbhError::malformed(offset, "unknown material parameter id"))?;
    let param_type = ParamType::from_u32(r.read_u32()?, offset + 8)?;
    tracing::trace!(
        "material {:?} parameter {} is {:?}",
        entry.material_label,
        param_id.name(),
        param_type
    );

    match param_type {
        ParamType::Float => entry
            .floats
            .push(ParamData::new(param_id, read_payload(r, 4, |r| r.read_f32())?)),
        ParamType::Boolean => entry
            .booleans
            .push(ParamData::new(param_id, read_payload(r, 4, |r| r.read_bool())?)),
        ParamType::Vector4 => entry
            .vectors
            .push(ParamData::new(param_id, read_payload(r, 16, |r| r.read_f32s())?)),
        ParamType::Texture => entry
            .textures
            .push(ParamData::new(param_id, read_payload(r, 4, |r| r.read_string())?)),
        ParamType::Sampler => entry
            .samplers
            .push(ParamData::new(param_id, read_payload(r, 44, read_sampler)?)),
        ParamType::UvTransform => entry
            .uv_transforms
            .push(ParamData::new(param_id, read_payload(r, 20, read_uv_transform)?)),
        ParamType::BlendState => entry.blend_states.push(ParamData::new(
            param_id,
            read_payload(r, 8, |r| read_blend_state(r, layout))?,
        )),
        ParamType::RasterizerState => entry
            .rasterizer_states
            .push(ParamData::new(param_id, read_payload(r, 12, read_rasterizer_state)?)),
    }
    Ok(())
}

fn read_entry(r: &mut SsbhReader, layout: (u16, u16)) -> Result<MatlEntryData> {
    let mut entry = MatlEntryData {
        material_label: r.read_string()?,
        shader_label: r.read_string()?,
        ..Default::default()
    };
    r.read_array(ATTRIBUTE_SIZE, |r| read_attribute(r, &mut entry, layout))?;
    Ok(entry)
}

// ============================================================================
// Writing
// ============================================================================

fn push_attribute(
    attributes: &mut Block,
    writer: &mut ContainerWriter,
    param_id: ParamId,
    param_type: ParamType,
    payload: Block,
) {
    attributes.write_u64(param_id.to_u64());
    attributes.write_u32(param_type.to_u32());
    attributes.write_array(writer.array(payload, 1));
}

impl MatlEntryData {
    /// Number of parameters across every list
    pub fn parameter_count(&self) -> usize {
        self.blend_states.len()
            + self.floats.len()
            + self.booleans.len()
            + self.vectors.len()
            + self.rasterizer_states.len()
            + self.samplers.len()
            + self.textures.len()
            + self.uv_transforms.len()
    }

    fn write_attributes(
        &self,
        writer: &mut ContainerWriter,
        layout: (u16, u16),
    ) -> (Block, usize) {
        let mut attributes = Block::new();

        for p in &self.blend_states {
            let mut b = Block::new();
            b.write_u32(p.data.source_color.to_u32());
            b.write_u32(p.data.destination_color.to_u32());
            if layout >= ALPHA_COVERAGE_VERSION {
                b.write_bool(p.data.alpha_sample_to_coverage);
            }
            push_attribute(&mut attributes, writer, p.param_id, ParamType::BlendState, b);
        }
        for p in &self.floats {
            let mut b = Block::new();
            b.write_f32(p.data);
            push_attribute(&mut attributes, writer, p.param_id, ParamType::Float, b);
        }
        for p in &self.booleans {
            let mut b = Block::new();
            b.write_bool(p.data);
            push_attribute(&mut attributes, writer, p.param_id, ParamType::Boolean, b);
        }
        for p in &self.vectors {
            let mut b = Block::new();
            b.write_f32s(&p.data);
            push_attribute(&mut attributes, writer, p.param_id, ParamType::Vector4, b);
        }
        for p in &self.rasterizer_states {
            let mut b = Block::new();
            b.write_u32(p.data.fill_mode.to_u32());
            b.write_u32(p.data.cull_mode.to_u32());
            b.write_f32(p.data.depth_bias);
            push_attribute(&mut attributes, writer, p.param_id, ParamType::RasterizerState, b);
        }
        for p in &self.samplers {
            let s = &p.data;
            let mut b = Block::new();
            for wrap in [s.wraps, s.wrapt, s.wrapr] {
                b.write_u32(wrap.to_u32());
            }
            b.write_u32(s.min_filter.to_u32());
            b.write_u32(s.mag_filter.to_u32());
            b.write_f32s(&s.border_color);
            b.write_f32(s.lod_bias);
            b.write_u32(s.max_anisotropy.map_or(0, MaxAnisotropy::to_u32));
            push_attribute(&mut attributes, writer, p.param_id, ParamType::Sampler, b);
        }
        for p in &self.textures {
            let mut b = Block::new();
            b.write_string(&p.data);
            push_attribute(&mut attributes, writer, p.param_id, ParamType::Texture, b);
        }
        for p in &self.uv_transforms {
            let t = &p.data;
            let mut b = Block::new();
            b.write_f32s(&[t.scale_u, t.scale_v, t.rotation, t.translate_u, t.translate_v]);
            push_attribute(&mut attributes, writer, p.param_id, ParamType::UvTransform, b);
        }

        (attributes, self.parameter_count())
    }
}

impl SsbhFormat for MatlData {
    const MAGIC: [u8; 4] = *b"MATL";
    const FORMAT_NAME: &'static str = "matl";
    const KNOWN_VERSIONS: &'static [(u16, u16)] = &[(1, 5), (1, 6)];

    fn read(bytes: &[u8]) -> Result<Self> {
        let mut container =
            Container::open(bytes, Self::MAGIC, Self::FORMAT_NAME, Self::KNOWN_VERSIONS)?;
        let layout = container.layout;
        let entries = container
            .reader
            .read_array(ENTRY_SIZE, |r| read_entry(r, layout))?;
        let trailing_data = container.trailing_data()?;

        let (major_version, minor_version) = container.version();
        tracing::debug!(
            "read matl {}.{} with {} entries",
            major_version,
            minor_version,
            entries.len()
        );
        Ok(Self {
            major_version,
            minor_version,
            entries,
            trailing_data,
        })
    }

    fn to_bytes(&self) -> Result<Vec<u8>> {
        let layout = resolve_version(
            Self::FORMAT_NAME,
            Self::KNOWN_VERSIONS,
            self.major_version,
            self.minor_version,
        )?;

        let mut writer = ContainerWriter::new();
        let entries = writer.array_of(&self.entries, |writer, block, entry| {
            block.write_string(&entry.material_label);
            block.write_string(&entry.shader_label);
            let (attributes, count) = entry.write_attributes(writer, layout);
            block.write_array(writer.array(attributes, count));
        });
        let mut root = Block::new();
        root.write_array(entries);

        tracing::debug!("writing matl with {} entries", self.entries.len());
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

    fn entry() -> MatlEntryData {
        MatlEntryData {
            material_label: "skin".into(),
            shader_label: "SFX_PBS_0100000008008269_opaque".into(),
            blend_states: vec![ParamData::new(
                ParamId::BlendState0,
                BlendStateData {
                    source_color: BlendFactor::SourceAlpha,
                    destination_color: BlendFactor::OneMinusSourceAlpha,
                    alpha_sample_to_coverage: true,
                },
            )],
            floats: vec![ParamData::new(ParamId::CustomFloat8, 0.4)],
            booleans: vec![
                ParamData::new(ParamId::CustomBoolean1, true),
                ParamData::new(ParamId::CustomBoolean3, false),
            ],
            vectors: vec![ParamData::new(ParamId::CustomVector0, [1.0, 0.0, 0.5, 1.0])],
            rasterizer_states: vec![ParamData::new(
                ParamId::RasterizerState0,
                RasterizerStateData {
                    fill_mode: FillMode::Solid,
                    cull_mode: CullMode::Disabled,
                    depth_bias: 0.25,
                },
            )],
            samplers: vec![ParamData::new(
                ParamId::Sampler0,
                SamplerData {
                    wraps: WrapMode::Repeat,
                    max_anisotropy: Some(MaxAnisotropy::Four),
                    border_color: [1.0, 1.0, 1.0, 0.0],
                    ..Default::default()
                },
            )],
            textures: vec![
                ParamData::new(ParamId::Texture0, "alp_body_col".into()),
                ParamData::new(ParamId::Texture4, "alp_body_nor".into()),
            ],
            uv_transforms: vec![ParamData::new(
                ParamId::UvTransform0,
                UvTransform {
                    scale_u: 1.0,
                    scale_v: 2.0,
                    ..Default::default()
                },
            )],
        }
    }

    #[test]
    fn test_matl_roundtrip() {
        let matl = MatlData {
            entries: vec![entry(), MatlEntryData::default()],
            ..Default::default()
        };
        let bytes = matl.to_bytes().unwrap();
        assert_eq!(&bytes[0..4], b"MATL");
        assert_eq!(MatlData::read(&bytes).unwrap(), matl);
    }

    #[test]
    fn test_matl_reencode_is_idempotent() {
        let matl = MatlData {
            entries: vec![entry()],
            ..Default::default()
        };
        let bytes = matl.to_bytes().unwrap();
        let reencoded = MatlData::read(&bytes).unwrap().to_bytes().unwrap();
        assert_eq!(reencoded, bytes);
    }

    #[test]
    fn test_appended_float_param() {
        let matl = MatlData {
            entries: vec![entry()],
            ..Default::default()
        };
        let mut matl = MatlData::read(&matl.to_bytes().unwrap()).unwrap();
        matl.entries[0]
            .floats
            .push(ParamData::new(ParamId::CustomFloat10, 0.9));

        let result = MatlData::read(&matl.to_bytes().unwrap()).unwrap();
        let found: Vec<_> = result.entries[0]
            .floats
            .iter()
            .filter(|p| p.param_id == ParamId::CustomFloat10)
            .collect();
        assert_eq!(found.len(), 1);
        assert!((found[0].data - 0.9).abs() <= f32::EPSILON);
    }

    #[test]
    fn test_version_1_5_has_no_alpha_coverage() {
        let matl = MatlData {
            minor_version: 5,
            entries: vec![entry()],
            ..Default::default()
        };
        let result = MatlData::read(&matl.to_bytes().unwrap()).unwrap();
        assert_eq!(result.minor_version, 5);
        assert!(!result.entries[0].blend_states[0].data.alpha_sample_to_coverage);
        assert_eq!(
            result.entries[0].blend_states[0].data.source_color,
            BlendFactor::SourceAlpha
        );
        assert_eq!(result.entries[0].textures, entry().textures);
    }

    #[test]
    fn test_unknown_param_id() {
        let matl = MatlData {
            entries: vec![MatlEntryData {
                floats: vec![ParamData::new(ParamId::CustomFloat0, 1.0)],
                ..Default::default()
            }],
            ..Default::default()
        };
        let mut bytes = matl.to_bytes().unwrap();
        let offset_at = |at: usize| {
            at + u32::from_le_bytes(bytes[at..at + 4].try_into().unwrap()) as usize
        };
        // Root entries field, then the entry's attributes field.
        let entry = offset_at(0x18);
        let attribute = offset_at(entry + 8);
        bytes[attribute..attribute + 8].copy_from_slice(&0xFFFF_u64.to_le_bytes());
        assert!(matches!(
            MatlData::read(&bytes),
            Err(SsbhError::MalformedInput { .. })
        ));
    }

    #[test]
    fn test_enum_values() {
        assert_eq!(BlendFactor::SourceAlphaSaturate.to_u32(), 10);
        assert_eq!(CullMode::from_u32(2, 0).unwrap(), CullMode::Disabled);
        assert!(WrapMode::from_u32(4, 0).is_err());
        assert!(MaxAnisotropy::from_u32(3, 0).is_err());
        assert_eq!(ParamType::from_u32(0x11, 0).unwrap(), ParamType::BlendState);
    }
}
