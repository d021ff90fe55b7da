//! Error types for reading and writing SSBH documents

/// Errors that can occur when reading, rebuilding, or writing a document
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SsbhError {
    /// A read ran past the buffer, an offset points outside it, or a stored value is invalid
    #[error("malformed input at offset 0x{offset:X}: {reason}")]
    MalformedInput { offset: u64, reason: &'static str },

    /// The major version is not known for this format
    #[error("unsupported {format} version {major}.{minor}")]
    UnsupportedVersion {
        format: &'static str,
        major: u16,
        minor: u16,
    },

    /// Attribute lists within one mesh object have different lengths
    #[error(
        "mesh object {mesh_object:?} attribute {attribute:?} has {actual} elements but expected {expected}"
    )]
    InvalidAttributeLength {
        mesh_object: String,
        attribute: String,
        expected: usize,
        actual: usize,
    },

    /// A vertex index does not refer to a vertex of the mesh object
    #[error(
        "mesh object {mesh_object:?} has vertex index {index} at position {position}, but the limit is {vertex_count}"
    )]
    IndexOutOfRange {
        mesh_object: String,
        index: u32,
        position: usize,
        vertex_count: usize,
    },

    /// A triangle list whose length is not a multiple of three
    #[error(
        "mesh object {mesh_object:?} has {index_count} vertex indices, which is not a multiple of 3"
    )]
    IncompleteTriangle {
        mesh_object: String,
        index_count: usize,
    },

    /// A value is too large for the field that stores it
    #[error("{field} {value} is larger than the stored maximum {max}")]
    ValueOutOfRange {
        field: &'static str,
        value: u64,
        max: u64,
    },

    /// A bone's parent chain revisits a bone
    #[error("bone {bone:?} at index {index} has a cyclic parent chain")]
    CyclicHierarchy { bone: String, index: usize },

    /// A bone's parent index is past the end of the bone list
    #[error("bone {bone:?} has parent index {parent_index}, but the skeleton has {bone_count} bones")]
    InvalidParentIndex {
        bone: String,
        parent_index: usize,
        bone_count: usize,
    },
}

impl SsbhError {
    pub(crate) fn malformed(offset: u64, reason: &'static str) -> Self {
        Self::MalformedInput { offset, reason }
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, SsbhError>;
