//! Model binding format (.numdlb)
//!
//! Names the files that make up a model and assigns a material label to
//! each mesh object.
//!
//! # Layout
//! ```text
//! Root (32 bytes):
//! 0x00: model_name string
//! 0x04: skeleton_file_name string
//! 0x08: material_file_names array (string each)
//! 0x10: animation_file_name optional string
//! 0x14: mesh_file_name string
//! 0x18: entries array (16 bytes each)
//!
//! Entry:
//! 0x00: mesh_object_name string
//! 0x04: mesh_object_sub_index u64
//! 0x0C: material_label string
//! ```

use serde::{Deserialize, Serialize};

use super::SsbhFormat;
use crate::binary::{Block, Container, ContainerWriter, resolve_version};
use crate::error::Result;

const ENTRY_SIZE: usize = 16;

/// Model document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModlData {
    pub major_version: u16,
    pub minor_version: u16,
    pub model_name: String,
    pub skeleton_file_name: String,
    pub material_file_names: Vec<String>,
    pub animation_file_name: Option<String>,
    pub mesh_file_name: String,
    pub entries: Vec<ModlEntryData>,
    #[serde(default)]
    pub trailing_data: Vec<u8>,
}

impl Default for ModlData {
    fn default() -> Self {
        Self {
            major_version: 1,
            minor_version: 7,
            model_name: String::new(),
            skeleton_file_name: String::new(),
            material_file_names: Vec::new(),
            animation_file_name: None,
            mesh_file_name: String::new(),
            entries: Vec::new(),
            trailing_data: Vec::new(),
        }
    }
}

/// Material assignment for one mesh object
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModlEntryData {
    pub mesh_object_name: String,
    pub mesh_object_sub_index: u64,
    pub material_label: String,
}

impl ModlData {
    /// Material label assigned to a mesh object, if any
    pub fn material_label(&self, mesh_object_name: &str, sub_index: u64) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.mesh_object_name == mesh_object_name && e.mesh_object_sub_index == sub_index)
            .map(|e| e.material_label.as_str())
    }
}

impl SsbhFormat for ModlData {
    const MAGIC: [u8; 4] = *b"MODL";
    const FORMAT_NAME: &'static str = "modl";
    const KNOWN_VERSIONS: &'static [(u16, u16)] = &[(1, 7)];

    fn read(bytes: &[u8]) -> Result<Self> {
        let mut container =
            Container::open(bytes, Self::MAGIC, Self::FORMAT_NAME, Self::KNOWN_VERSIONS)?;
        let r = &mut container.reader;

        let model_name = r.read_string()?;
        let skeleton_file_name = r.read_string()?;
        let material_file_names = r.read_array(4, |r| r.read_string())?;
        let animation_file_name = r.read_optional_string()?;
        let mesh_file_name = r.read_string()?;
        let entries = r.read_array(ENTRY_SIZE, |r| {
            Ok(ModlEntryData {
                mesh_object_name: r.read_string()?,
                mesh_object_sub_index: r.read_u64()?,
                material_label: r.read_string()?,
            })
        })?;
        let trailing_data = container.trailing_data()?;

        let (major_version, minor_version) = container.version();
        tracing::debug!("read modl {:?} with {} entries", model_name, entries.len());
        Ok(Self {
            major_version,
            minor_version,
            model_name,
            skeleton_file_name,
            material_file_names,
            animation_file_name,
            mesh_file_name,
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

        let mut writer = ContainerWriter::new();
        let mut root = Block::new();
        root.write_string(&self.model_name);
        root.write_string(&self.skeleton_file_name);
        let materials = writer.array_of(&self.material_file_names, |_, b, name| b.write_string(name));
        root.write_array(materials);
        root.write_optional_string(self.animation_file_name.as_deref());
        root.write_string(&self.mesh_file_name);
        let entries = writer.array_of(&self.entries, |_, b, entry| {
            b.write_string(&entry.mesh_object_name);
            b.write_u64(entry.mesh_object_sub_index);
            b.write_string(&entry.material_label);
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
