//=========================================================================
// Audio Manifest
//=========================================================================
//
// TOML list of sounds to load in one call:
//
// ```toml
// [[sound]]
// kind = "music_stream"
// id = "theme"
// path = "assets/music.mp3"
// ```
//
// Kinds are validated while parsing, so a manifest that names an
// unknown kind never reaches the service.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

//=== Internal Dependencies ===============================================

use super::types::AudioKind;
use crate::error::{ConfigError, Result};

//=== Raw File Layout =====================================================

#[derive(Debug, Deserialize)]
struct RawManifest {
    #[serde(default)]
    sound: Vec<RawEntry>,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    kind: String,
    id: String,
    path: PathBuf,
}

//=== AudioManifest =======================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub kind: AudioKind,
    pub id: String,
    pub path: PathBuf,
}

/// Validated list of sounds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AudioManifest {
    entries: Vec<ManifestEntry>,
}

impl AudioManifest {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let raw: RawManifest = toml::from_str(source).map_err(ConfigError::from)?;

        let entries = raw
            .sound
            .into_iter()
            .map(|entry| {
                Ok(ManifestEntry {
                    kind: entry.kind.parse()?,
                    id: entry.id,
                    path: entry.path,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { entries })
    }

    /// Reads and parses a manifest file. Relative sound paths are kept
    /// as written.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
