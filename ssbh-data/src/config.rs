//! Codec options
//!
//! Every save path has a `to_bytes_with` variant that takes one section of
//! this configuration. Settings can be stored as TOML:
//!
//! ```toml
//! [anim]
//! compression_bits = 16
//!
//! [mesh]
//! parallel = false
//! ```

use serde::{Deserialize, Serialize};

/// Largest bit width used for one quantized animation component
pub const MAX_COMPRESSION_BITS: u32 = 24;

/// Largest number of adjacent faces stored per vertex
pub const MAX_ADJACENT_FACES: usize = 9;

/// Errors from loading or storing a [`Config`]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Codec configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Animation compression settings
    #[serde(default)]
    pub anim: AnimConfig,
    /// Mesh buffer rebuilding settings
    #[serde(default)]
    pub mesh: MeshConfig,
    /// Adjacency settings
    #[serde(default)]
    pub adj: AdjConfig,
}

/// Animation track compression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimConfig {
    /// Bits per quantized float component (default: 24, range: 1-24)
    #[serde(default = "default_compression_bits")]
    pub compression_bits: u32,
    /// Quantize keyframed tracks; when false they are stored as raw floats (default: true)
    #[serde(default = "default_true")]
    pub compress_tracks: bool,
    /// Compress tracks on the rayon pool (default: true)
    #[serde(default = "default_true")]
    pub parallel: bool,
}

/// Mesh buffer rebuilding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshConfig {
    /// Build per-object buffers and bounds on the rayon pool (default: true)
    #[serde(default = "default_true")]
    pub parallel: bool,
    /// Store indices as u16 when every index fits (default: true)
    #[serde(default = "default_true")]
    pub prefer_u16_indices: bool,
}

/// Adjacency building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjConfig {
    /// Adjacent faces kept per vertex (default: 9, range: 1-9)
    #[serde(default = "default_max_adjacent_faces")]
    pub max_adjacent_faces: usize,
}

fn default_true() -> bool {
    true
}

fn default_compression_bits() -> u32 {
    MAX_COMPRESSION_BITS
}

fn default_max_adjacent_faces() -> usize {
    MAX_ADJACENT_FACES
}

impl Default for AnimConfig {
    fn default() -> Self {
        Self {
            compression_bits: default_compression_bits(),
            compress_tracks: true,
            parallel: true,
        }
    }
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            prefer_u16_indices: true,
        }
    }
}

impl Default for AdjConfig {
    fn default() -> Self {
        Self {
            max_adjacent_faces: default_max_adjacent_faces(),
        }
    }
}

impl AnimConfig {
    /// Bit width clamped to the supported range
    pub fn float_bits(&self) -> u32 {
        self.compression_bits.clamp(1, MAX_COMPRESSION_BITS)
    }
}

impl AdjConfig {
    pub fn face_limit(&self) -> usize {
        self.max_adjacent_faces.clamp(1, MAX_ADJACENT_FACES)
    }
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.anim.compression_bits, 24);
        assert!(config.anim.compress_tracks);
        assert!(config.mesh.parallel);
        assert!(config.mesh.prefer_u16_indices);
        assert_eq!(config.adj.max_adjacent_faces, 9);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = Config::from_toml_str("[anim]\ncompression_bits = 12\n").unwrap();
        assert_eq!(config.anim.compression_bits, 12);
        assert!(config.anim.compress_tracks);
        assert_eq!(config.mesh, MeshConfig::default());
    }

    #[test]
    fn test_empty_toml() {
        assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
    }

    #[test]
    fn test_toml_roundtrip() {
        let mut config = Config::default();
        config.mesh.parallel = false;
        config.adj.max_adjacent_faces = 4;
        let text = config.to_toml_string().unwrap();
        assert_eq!(Config::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let anim = AnimConfig {
            compression_bits: 40,
            ..Default::default()
        };
        assert_eq!(anim.float_bits(), 24);

        let adj = AdjConfig {
            max_adjacent_faces: 0,
        };
        assert_eq!(adj.face_limit(), 1);
    }

    #[test]
    fn test_invalid_toml() {
        assert!(Config::from_toml_str("[anim]\ncompression_bits = \"many\"").is_err());
    }
}
