//=========================================================================
// Audio Types
//=========================================================================
//
// Vocabulary shared by the audio service and its backends.
//
//   AudioKind     what a sound is (sfx/music × sample/stream)
//   ChannelGroup  the bus it plays on (master ⊃ sfx, music)
//   PlayOptions   per-voice parameters
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

//=== Internal Dependencies ===============================================

use crate::error::AssetError;

//=== SoundMode ===========================================================

/// How a backend should hold the sound data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundMode {
    /// Fully decoded into memory. Cheap to trigger, suits short effects.
    Sample,
    /// Decoded incrementally while playing. Suits long music tracks.
    Stream,
}

//=== AudioKind ===========================================================

/// Registry a sound id lives in.
///
/// Ids are unique per kind, so `"hit"` may exist both as an effect sample
/// and as a music stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioKind {
    SfxSample,
    SfxStream,
    MusicSample,
    MusicStream,
}

impl AudioKind {
    /// Every valid kind.
    pub const ALL: [AudioKind; 4] = [
        AudioKind::SfxSample,
        AudioKind::SfxStream,
        AudioKind::MusicSample,
        AudioKind::MusicStream,
    ];

    /// Channel group voices of this kind are routed to.
    pub fn group(self) -> ChannelGroup {
        match self {
            Self::SfxSample | Self::SfxStream => ChannelGroup::Sfx,
            Self::MusicSample | Self::MusicStream => ChannelGroup::Music,
        }
    }

    /// Default load mode for this kind.
    pub fn mode(self) -> SoundMode {
        match self {
            Self::SfxSample | Self::MusicSample => SoundMode::Sample,
            Self::SfxStream | Self::MusicStream => SoundMode::Stream,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::SfxSample => "sfx_sample",
            Self::SfxStream => "sfx_stream",
            Self::MusicSample => "music_sample",
            Self::MusicStream => "music_stream",
        }
    }
}

impl fmt::Display for AudioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses the snake_case name; anything else is the invalid sentinel.
impl FromStr for AudioKind {
    type Err = AssetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| AssetError::InvalidKind(s.to_string()))
    }
}

/// Numeric form used by packed asset tables: 0..=3 in declaration order.
impl TryFrom<u8> for AudioKind {
    type Error = AssetError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(usize::from(value))
            .copied()
            .ok_or_else(|| AssetError::InvalidKind(value.to_string()))
    }
}

//=== ChannelGroup ========================================================

/// Logical audio bus.
///
/// `Master` is the parent of `Sfx` and `Music`: pausing or muting it
/// affects every voice, and its volume scales both children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelGroup {
    Master,
    Sfx,
    Music,
}

impl ChannelGroup {
    pub const COUNT: usize = 3;

    pub const ALL: [ChannelGroup; Self::COUNT] =
        [ChannelGroup::Master, ChannelGroup::Sfx, ChannelGroup::Music];

    pub(crate) fn index(self) -> usize {
        match self {
            Self::Master => 0,
            Self::Sfx => 1,
            Self::Music => 2,
        }
    }
}

//=== ChannelGroupState ===================================================

/// Pause/mute/volume of one channel group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelGroupState {
    pub paused: bool,
    pub muted: bool,
    pub volume: f32,
}

impl ChannelGroupState {
    pub fn with_volume(volume: f32) -> Self {
        Self {
            paused: false,
            muted: false,
            volume: volume.clamp(0.0, 1.0),
        }
    }

    /// Gain this group contributes, zero while muted.
    pub fn gain(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.volume
        }
    }
}

impl Default for ChannelGroupState {
    fn default() -> Self {
        Self::with_volume(1.0)
    }
}

/// A single property write on a channel group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GroupProperty {
    Paused(bool),
    Muted(bool),
    /// Clamped to `0.0..=1.0`.
    Volume(f32),
}

//=== Playback Options ====================================================

/// How many times a voice repeats after its first play-through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopMode {
    #[default]
    Once,
    Count(u32),
    Infinite,
}

/// Voice slot selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelSelect {
    /// Any free slot, stealing a less important voice when full.
    #[default]
    Free,
    /// A specific slot, replacing whatever plays there.
    Reuse(u32),
}

/// Per-voice playback parameters.
///
/// Priority follows the usual mixer convention: 0 is most important,
/// 255 least; a full mixer steals the least important voice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayOptions {
    pub volume: f32,
    pub pitch: f32,
    pub pan: f32,
    pub looping: LoopMode,
    pub priority: u8,
    pub channel: ChannelSelect,
}

impl Default for PlayOptions {
    fn default() -> Self {
        Self {
            volume: 1.0,
            pitch: 1.0,
            pan: 0.0,
            looping: LoopMode::Once,
            priority: 128,
            channel: ChannelSelect::Free,
        }
    }
}

impl PlayOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn volume(mut self, volume: f32) -> Self {
        self.volume = volume.clamp(0.0, 1.0);
        self
    }

    /// Playback rate multiplier; non-positive values are ignored.
    pub fn pitch(mut self, pitch: f32) -> Self {
        if pitch > 0.0 {
            self.pitch = pitch;
        }
        self
    }

    /// -1.0 is full left, 1.0 full right.
    pub fn pan(mut self, pan: f32) -> Self {
        self.pan = pan.clamp(-1.0, 1.0);
        self
    }

    pub fn looping(mut self, looping: LoopMode) -> Self {
        self.looping = looping;
        self
    }

    pub fn priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    pub fn channel(mut self, channel: ChannelSelect) -> Self {
        self.channel = channel;
        self
    }
}

/// Overrides applied when a sound is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadOptions {
    /// Forces sample or stream mode instead of the kind's default.
    pub mode: Option<SoundMode>,
}

//=========================================================================
// Unit Tests
//=========================================================================
