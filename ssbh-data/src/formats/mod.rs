//! SSBH document formats
//!
//! Each module maps one binary layout to a mutable document:
//!
//! | module | file | magic |
//! |---|---|---|
//! | [`mesh`] | `.numshb` | `MESH` |
//! | [`skel`] | `.nusktb` | `SKEL` |
//! | [`matl`] | `.numatb` | `MATL` |
//! | [`anim`] | `.nuanmb` | `ANIM` |
//! | [`adj`] | `.adjb` | `ADJB` |
//! | [`meshex`] | `.numshexb` | `MSEX` |
//! | [`modl`] | `.numdlb` | `MODL` |
//! | [`hlpb`] | `.nuhlpb` | `HLPB` |
//!
//! Formats reference each other only by file name or object name. No codec
//! parses another format's bytes.

pub mod adj;
pub mod anim;
pub mod hlpb;
pub mod matl;
pub mod mesh;
pub mod meshex;
pub mod modl;
pub mod skel;

use crate::error::Result;

/// Shared read/save interface implemented by every document type.
///
/// # Example
///
/// ```
/// use ssbh_data::formats::SsbhFormat;
/// use ssbh_data::formats::modl::ModlData;
///
/// let modl = ModlData {
///     model_name: "model".into(),
///     ..Default::default()
/// };
/// let bytes = modl.to_bytes().unwrap();
/// assert_eq!(&bytes[0..4], ModlData::MAGIC.as_slice());
/// assert_eq!(ModlData::read(&bytes).unwrap(), modl);
/// ```
pub trait SsbhFormat: Sized {
    /// Four magic bytes at the start of the file
    const MAGIC: [u8; 4];

    /// Name used in errors and logs
    const FORMAT_NAME: &'static str;

    /// Versions with a known layout
    const KNOWN_VERSIONS: &'static [(u16, u16)];

    /// Parse a document from file bytes
    fn read(bytes: &[u8]) -> Result<Self>;

    /// Rebuild derived data and encode the document with default settings
    fn to_bytes(&self) -> Result<Vec<u8>>;
}
