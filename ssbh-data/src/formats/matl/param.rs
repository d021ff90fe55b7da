//! Material parameter ids
//!
//! Every material parameter is keyed by one id from a closed table. The same
//! id space covers every parameter type, so the stored type tag decides
//! which list of an entry a parameter belongs to.

use serde::{Deserialize, Serialize};

macro_rules! param_ids {
    ($($name:ident = $value:literal,)*) => {
        /// Named material parameter
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum ParamId {
            $($name,)*
        }

        impl ParamId {
            pub const fn to_u64(self) -> u64 {
                match self {
                    $(Self::$name => $value,)*
                }
            }

            pub const fn from_u64(value: u64) -> Option<Self> {
                match value {
                    $($value => Some(Self::$name),)*
                    _ => None,
                }
            }

            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$name => stringify!($name),)*
                }
            }
        }
    };
}

param_ids! {
    BlendState0 = 0x0,
    RasterizerState0 = 0x1,
    CustomVector8 = 0x2,
    Texture4 = 0x3,
    CustomVector0 = 0x4,
    CustomBoolean1 = 0x5,
    CustomVector13 = 0x6,
    CustomBoolean3 = 0x7,
    CustomBoolean4 = 0x8,
    Texture7 = 0x9,
    CustomVector14 = 0xA,
    CustomFloat8 = 0xB,
    Texture0 = 0xC,
    Texture6 = 0xD,
    CustomVector3 = 0xE,
    Texture5 = 0xF,
    CustomVector30 = 0x10,
    CustomBoolean2 = 0x11,
    CustomVector31 = 0x12,
    CustomBoolean11 = 0x13,
    Texture14 = 0x14,
    CustomVector27 = 0x15,
    Texture9 = 0x16,
    CustomVector29 = 0x17,
    CustomVector6 = 0x18,
    CustomVector11 = 0x19,
    CustomBoolean5 = 0x1A,
    CustomBoolean12 = 0x1B,
    CustomBoolean6 = 0x1C,
    Texture2 = 0x1D,
    Texture1 = 0x1E,
    CustomVector7 = 0x1F,
    CustomFloat1 = 0x20,
    Texture3 = 0x21,
    CustomFloat19 = 0x22,
    CustomVector18 = 0x23,
    CustomBoolean9 = 0x24,
    CustomVector42 = 0x25,
    CustomVector32 = 0x26,
    CustomBoolean7 = 0x27,
    CustomFloat4 = 0x28,
    CustomFloat10 = 0x29,
    Texture11 = 0x2A,
    Texture16 = 0x2B,
    CustomVector47 = 0x2C,
    Texture10 = 0x2D,
    CustomVector34 = 0x2E,
    CustomFloat11 = 0x2F,
    CustomFloat12 = 0x30,
    CustomVector35 = 0x31,
    CustomFloat6 = 0x32,
    CustomFloat18 = 0x33,
    CustomVector37 = 0x34,
    CustomVector38 = 0x35,
    CustomVector39 = 0x36,
    CustomVector19 = 0x37,
    CustomVector23 = 0x38,
    Texture13 = 0x39,
    CustomVector21 = 0x3A,
    CustomBoolean0 = 0x3B,
    CustomVector20 = 0x3C,
    CustomBoolean10 = 0x3D,
    CustomVector40 = 0x3E,
    Texture12 = 0x3F,
    CustomVector22 = 0x40,
    Texture8 = 0x41,
    CustomVector46 = 0x42,
    CustomFloat17 = 0x43,
    CustomVector24 = 0x44,
    CustomBoolean8 = 0x45,
    CustomVector33 = 0x46,
    CustomVector4 = 0x47,
    CustomFloat0 = 0x48,
    CustomVector1 = 0x49,
    CustomVector2 = 0x4A,
    CustomVector5 = 0x4B,
    CustomVector15 = 0x4C,
    CustomVector16 = 0x4D,
    CustomVector43 = 0x4E,
    CustomVector44 = 0x4F,
    CustomVector45 = 0x50,
    CustomVector9 = 0x51,
    CustomVector10 = 0x52,
    Diffuse = 0x53,
    Specular = 0x54,
    Ambient = 0x55,
    BlendMap = 0x56,
    Transparency = 0x57,
    DiffuseMapLayer1 = 0x58,
    CosinePower = 0x59,
    SpecularPower = 0x5A,
    Fresnel = 0x5B,
    Roughness = 0x5C,
    EmissiveScale = 0x5D,
    EnableDiffuse = 0x5E,
    EnableSpecular = 0x5F,
    EnableAmbient = 0x60,
    DiffuseMapLayer2 = 0x61,
    EnableTransparency = 0x62,
    EnableOpacity = 0x63,
    EnableCosinePower = 0x64,
    EnableSpecularPower = 0x65,
    EnableFresnel = 0x66,
    EnableRoughness = 0x67,
    EnableEmissiveScale = 0x68,
    WorldMatrix = 0x69,
    ViewMatrix = 0x6A,
    ProjectionMatrix = 0x6B,
    WorldViewMatrix = 0x6C,
    ViewInverseMatrix = 0x6D,
    ViewProjectionMatrix = 0x6E,
    WorldViewProjectionMatrix = 0x6F,
    WorldInverseTransposeMatrix = 0x70,
    DiffuseMap = 0x71,
    SpecularMap = 0x72,
    AmbientMap = 0x73,
    EmissiveMap = 0x74,
    SpecularMapLayer1 = 0x75,
    TransparencyMap = 0x76,
    NormalMap = 0x77,
    DiffuseCubeMap = 0x78,
    ReflectionMap = 0x79,
    ReflectionCubeMap = 0x7A,
    RefractionMap = 0x7B,
    AmbientOcclusionMap = 0x7C,
    LightMap = 0x7D,
    AnisotropicMap = 0x7E,
    RoughnessMap = 0x7F,
    ReflectionMask = 0x80,
    OpacityMask = 0x81,
    UseDiffuseMap = 0x82,
    UseSpecularMap = 0x83,
    UseAmbientMap = 0x84,
    UseEmissiveMap = 0x85,
    UseTranslucencyMap = 0x86,
    UseTransparencyMap = 0x87,
    UseNormalMap = 0x88,
    UseDiffuseCubeMap = 0x89,
    UseReflectionMap = 0x8A,
    UseReflectionCubeMap = 0x8B,
    UseRefractionMap = 0x8C,
    UseAmbientOcclusionMap = 0x8D,
    UseLightMap = 0x8E,
    UseAnisotropicMap = 0x8F,
    UseRoughnessMap = 0x90,
    UseReflectionMask = 0x91,
    UseOpacityMask = 0x92,
    DiffuseSampler = 0x93,
    SpecularSampler = 0x94,
    NormalSampler = 0x95,
    ReflectionSampler = 0x96,
    SpecularMapLayer2 = 0x97,
    NormalMapLayer1 = 0x98,
    NormalMapBc5 = 0x99,
    NormalMapLayer2 = 0x9A,
    RoughnessMapLayer1 = 0x9B,
    RoughnessMapLayer2 = 0x9C,
    UseDiffuseUvTransform1 = 0x9D,
    UseDiffuseUvTransform2 = 0x9E,
    UseSpecularUvTransform1 = 0x9F,
    UseSpecularUvTransform2 = 0xA0,
    UseNormalUvTransform1 = 0xA1,
    UseNormalUvTransform2 = 0xA2,
    ShadowDepthBias = 0xA3,
    ShadowMap0 = 0xA4,
    ShadowMap1 = 0xA5,
    ShadowMap2 = 0xA6,
    ShadowMap3 = 0xA7,
    ShadowMap4 = 0xA8,
    ShadowMap5 = 0xA9,
    ShadowMap6 = 0xAA,
    ShadowMap7 = 0xAB,
    CastShadow = 0xAC,
    ReceiveShadow = 0xAD,
    ShadowMapSampler = 0xAE,
    Texture15 = 0xAF,
    Sampler0 = 0xB0,
    Sampler1 = 0xB1,
    Sampler2 = 0xB2,
    Sampler3 = 0xB3,
    Sampler4 = 0xB4,
    Sampler5 = 0xB5,
    Sampler6 = 0xB6,
    Sampler7 = 0xB7,
    Sampler8 = 0xB8,
    Sampler9 = 0xB9,
    Sampler10 = 0xBA,
    Sampler11 = 0xBB,
    Sampler12 = 0xBC,
    Sampler13 = 0xBD,
    Sampler14 = 0xBE,
    Sampler15 = 0xBF,
    CustomBuffer0 = 0xC0,
    CustomBuffer1 = 0xC1,
    CustomBuffer2 = 0xC2,
    CustomBuffer3 = 0xC3,
    CustomBuffer4 = 0xC4,
    CustomBuffer5 = 0xC5,
    CustomBuffer6 = 0xC6,
    CustomBuffer7 = 0xC7,
    CustomMatrix0 = 0xC8,
    CustomMatrix1 = 0xC9,
    CustomMatrix2 = 0xCA,
    CustomMatrix3 = 0xCB,
    CustomMatrix4 = 0xCC,
    CustomMatrix5 = 0xCD,
    CustomMatrix6 = 0xCE,
    CustomMatrix7 = 0xCF,
    CustomMatrix8 = 0xD0,
    CustomMatrix9 = 0xD1,
    CustomMatrix10 = 0xD2,
    CustomMatrix11 = 0xD3,
    CustomMatrix12 = 0xD4,
    CustomMatrix13 = 0xD5,
    CustomMatrix14 = 0xD6,
    CustomMatrix15 = 0xD7,
    CustomMatrix16 = 0xD8,
    CustomMatrix17 = 0xD9,
    CustomMatrix18 = 0xDA,
    CustomMatrix19 = 0xDB,
    CustomVector12 = 0xDC,
    CustomVector17 = 0xDD,
    CustomColor0 = 0xDE,
    CustomColor1 = 0xDF,
    CustomColor2 = 0xE0,
    CustomColor3 = 0xE1,
    CustomColor4 = 0xE2,
    CustomColor5 = 0xE3,
    CustomColor6 = 0xE4,
    CustomColor7 = 0xE5,
    CustomColor8 = 0xE6,
    CustomColor9 = 0xE7,
    CustomColor10 = 0xE8,
    CustomColor11 = 0xE9,
    CustomColor12 = 0xEA,
    CustomColor13 = 0xEB,
    CustomColor14 = 0xEC,
    CustomColor15 = 0xED,
    CustomColor16 = 0xEE,
    CustomColor17 = 0xEF,
    CustomColor18 = 0xF0,
    CustomColor19 = 0xF1,
    CustomFloat2 = 0xF2,
    CustomFloat3 = 0xF3,
    CustomFloat5 = 0xF4,
    CustomFloat7 = 0xF5,
    CustomFloat9 = 0xF6,
    CustomFloat13 = 0xF7,
    CustomFloat14 = 0xF8,
    CustomFloat15 = 0xF9,
    CustomFloat16 = 0xFA,
    CustomInteger0 = 0xFB,
    CustomInteger1 = 0xFC,
    CustomInteger2 = 0xFD,
    CustomInteger3 = 0xFE,
    CustomInteger4 = 0xFF,
    CustomInteger5 = 0x100,
    CustomInteger6 = 0x101,
    CustomInteger7 = 0x102,
    CustomInteger8 = 0x103,
    CustomInteger9 = 0x104,
    CustomInteger10 = 0x105,
    CustomInteger11 = 0x106,
    CustomInteger12 = 0x107,
    CustomInteger13 = 0x108,
    CustomInteger14 = 0x109,
    CustomInteger15 = 0x10A,
    CustomInteger16 = 0x10B,
    CustomInteger17 = 0x10C,
    CustomInteger18 = 0x10D,
    CustomInteger19 = 0x10E,
    CustomBoolean13 = 0x10F,
    CustomBoolean14 = 0x110,
    CustomBoolean15 = 0x111,
    CustomBoolean16 = 0x112,
    CustomBoolean17 = 0x113,
    CustomBoolean18 = 0x114,
    CustomBoolean19 = 0x115,
    UvTransform0 = 0x116,
    UvTransform1 = 0x117,
    UvTransform2 = 0x118,
    UvTransform3 = 0x119,
    UvTransform4 = 0x11A,
    UvTransform5 = 0x11B,
    UvTransform6 = 0x11C,
    UvTransform7 = 0x11D,
    UvTransform8 = 0x11E,
    UvTransform9 = 0x11F,
    UvTransform10 = 0x120,
    UvTransform11 = 0x121,
    UvTransform12 = 0x122,
    UvTransform13 = 0x123,
    UvTransform14 = 0x124,
    UvTransform15 = 0x125,
    DiffuseUvTransform1 = 0x126,
    DiffuseUvTransform2 = 0x127,
    SpecularUvTransform1 = 0x128,
    SpecularUvTransform2 = 0x129,
    NormalUvTransform1 = 0x12A,
    NormalUvTransform2 = 0x12B,
    DiffuseUvTransform = 0x12C,
    SpecularUvTransform = 0x12D,
    NormalUvTransform = 0x12E,
    UseDiffuseUvTransform = 0x12F,
    UseSpecularUvTransform = 0x130,
    UseNormalUvTransform = 0x131,
    BlendState1 = 0x132,
    BlendState2 = 0x133,
    BlendState3 = 0x134,
    BlendState4 = 0x135,
    BlendState5 = 0x136,
    BlendState6 = 0x137,
    BlendState7 = 0x138,
    BlendState8 = 0x139,
    BlendState9 = 0x13A,
    BlendState10 = 0x13B,
    RasterizerState1 = 0x13C,
    RasterizerState2 = 0x13D,
    RasterizerState3 = 0x13E,
    RasterizerState4 = 0x13F,
    RasterizerState5 = 0x140,
    RasterizerState6 = 0x141,
    RasterizerState7 = 0x142,
    RasterizerState8 = 0x143,
    RasterizerState9 = 0x144,
    RasterizerState10 = 0x145,
    ShadowColor = 0x146,
    EmissiveMapLayer1 = 0x147,
    EmissiveMapLayer2 = 0x148,
    AlphaTestFunc = 0x149,
    AlphaTestRef = 0x14A,
    Texture17 = 0x14B,
    Texture18 = 0x14C,
    Texture19 = 0x14D,
    Sampler16 = 0x14E,
    Sampler17 = 0x14F,
    Sampler18 = 0x150,
    Sampler19 = 0x151,
    CustomVector25 = 0x152,
    CustomVector26 = 0x153,
    CustomVector28 = 0x154,
    CustomVector36 = 0x155,
    CustomVector41 = 0x156,
    CustomVector48 = 0x157,
    CustomVector49 = 0x158,
    CustomVector50 = 0x159,
    CustomVector51 = 0x15A,
    CustomVector52 = 0x15B,
    CustomVector53 = 0x15C,
    CustomVector54 = 0x15D,
    CustomVector55 = 0x15E,
    CustomVector56 = 0x15F,
    CustomVector57 = 0x160,
    CustomVector58 = 0x161,
    CustomVector59 = 0x162,
    CustomVector60 = 0x163,
    CustomVector61 = 0x164,
    CustomVector62 = 0x165,
    CustomVector63 = 0x166,
    UseBaseColorMap = 0x167,
    UseMetallicMap = 0x168,
    BaseColorMap = 0x169,
    BaseColorMapLayer1 = 0x16A,
    MetallicMap = 0x16B,
    MetallicMapLayer1 = 0x16C,
    DiffuseLightingAoOffset = 0x16D,
}
