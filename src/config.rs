//=========================================================================
// Engine Configuration
//=========================================================================
//
// TOML-backed settings for the window, both services and the frame loop.
//
// Every section is `#[serde(default)]`, so a config file only needs the
// keys it wants to override:
//
// ```toml
// [window]
// title = "Strata"
// width = 1024
//
// [frame]
// target_fps = 60.0
// ```
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};

//=== Internal Dependencies ===============================================

use crate::core::video::ShaderStage;
use crate::error::ConfigError;

//=== WindowConfig ========================================================

/// Host window settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Strata Engine".to_string(),
            width: 800,
            height: 600,
            fullscreen: false,
        }
    }
}

//=== AudioConfig =========================================================

/// Audio service settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Maximum number of simultaneously playing voices.
    pub max_channels: u32,

    /// Initial volume of every channel group.
    pub default_volume: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            max_channels: 100,
            default_volume: 1.0,
        }
    }
}

//=== ShaderConfig ========================================================

/// A shader loaded and enabled while the video service allocates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShaderConfig {
    pub id: String,
    pub path: PathBuf,
    pub stage: ShaderStage,
}

//=== VideoConfig =========================================================

/// Video service settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    /// Logical surface width in pixels (quad coordinates use this space).
    pub width: u32,

    /// Logical surface height in pixels.
    pub height: u32,

    /// Seconds between frame-rate recomputations.
    pub frame_rate_window: f64,

    /// Shaders compiled, attached and linked during allocation.
    pub default_shaders: Vec<ShaderConfig>,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            frame_rate_window: 0.25,
            default_shaders: Vec::new(),
        }
    }
}

//=== FrameConfig =========================================================

/// Frame loop settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Frames per second the loop sleeps towards. `None` runs unpaced.
    pub target_fps: Option<f64>,

    /// Capacity of the platform → core event channel.
    pub channel_capacity: usize,

    /// Upper bound of platform events drained in a single frame.
    pub max_events_per_frame: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            target_fps: None,
            channel_capacity: 128,
            max_events_per_frame: 100,
        }
    }
}

//=== EngineConfig ========================================================

/// Complete runtime configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub window: WindowConfig,
    pub audio: AudioConfig,
    pub video: VideoConfig,
    pub frame: FrameConfig,
}

impl EngineConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::from_toml_str(&source)?;
        info!(target: "config", "Loaded engine config from {:?}", path);
        Ok(config)
    }

    /// Rejects values the runtime cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.video.width == 0 || self.video.height == 0 {
            return Err(ConfigError::Invalid {
                field: "video.width/height",
                reason: "surface dimensions must be non-zero".into(),
            });
        }

        if let Some(fps) = self.frame.target_fps {
            if !(fps > 0.0) {
                return Err(ConfigError::Invalid {
                    field: "frame.target_fps",
                    reason: format!("must be positive, got {}", fps),
                });
            }
        }

        if self.frame.channel_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "frame.channel_capacity",
                reason: "must be positive".into(),
            });
        }

        if self.frame.max_events_per_frame == 0 {
            return Err(ConfigError::Invalid {
                field: "frame.max_events_per_frame",
                reason: "must be positive".into(),
            });
        }

        if !(self.video.frame_rate_window > 0.0) {
            return Err(ConfigError::Invalid {
                field: "video.frame_rate_window",
                reason: "must be positive".into(),
            });
        }

        if !(0.0..=1.0).contains(&self.audio.default_volume) {
            return Err(ConfigError::Invalid {
                field: "audio.default_volume",
                reason: format!("must be within 0.0..=1.0, got {}", self.audio.default_volume),
            });
        }

        Ok(())
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
