//! Read, edit and rebuild SSBH model files
//!
//! Each supported file kind parses into a plain, fully mutable document.
//! Saving recomputes derived data (packed vertex buffers, bounding volumes,
//! world transforms, compressed animation tracks) from the document.
//!
//! # Modules
//!
//! - [`binary`] - Container header, cursor helpers and the two-pass writer
//! - [`formats`] - One codec per file kind
//! - [`geometry`] - Bounding volumes and row-major matrix helpers
//! - [`packing`] - Vertex attribute element encoders (f32, f16, unorm8)
//! - [`config`] - Codec options loaded from TOML
//!
//! # Example
//!
//! ```
//! use ssbh_data::{MeshData, SsbhFormat};
//! use ssbh_data::formats::mesh::{AttributeData, MeshObjectData, VectorData};
//!
//! let mesh = MeshData {
//!     objects: vec![MeshObjectData {
//!         name: "body".into(),
//!         vertex_indices: vec![0, 1, 2],
//!         positions: vec![AttributeData {
//!             name: "Position0".into(),
//!             data: VectorData::Vector3(vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]),
//!         }],
//!         ..Default::default()
//!     }],
//!     ..Default::default()
//! };
//!
//! let bytes = mesh.to_bytes().unwrap();
//! assert_eq!(MeshData::read(&bytes).unwrap(), mesh);
//! ```

pub mod binary;
pub mod config;
pub mod error;
pub mod formats;
pub mod geometry;
pub mod packing;

pub use config::{AdjConfig, AnimConfig, Config, ConfigError, MeshConfig};
pub use error::{Result, SsbhError};
pub use formats::SsbhFormat;

// Re-export the document types
pub use formats::{
    adj::AdjData, anim::AnimData, hlpb::HlpbData, matl::MatlData, mesh::MeshData,
    meshex::MeshExData, modl::ModlData, skel::SkelData,
};
