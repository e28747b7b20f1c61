//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use strata_engine::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Engine entry point and configuration
pub use crate::config::EngineConfig;
pub use crate::engine::{Engine, EngineBuilder};
pub use crate::error::{Error, Result};

// Game states
pub use crate::core::app::{AppManager, GameState, RenderContext, StateContext};
pub use crate::states::{Gameplay, PauseMenu, StaticTile, TitleScreen};

// Audio
pub use crate::core::audio::{
    AudioKind, AudioManifest, AudioService, ChannelGroup, GroupProperty, LoadOptions, LoopMode,
    PlayOptions,
};

// Video
pub use crate::core::video::{Quad, VideoService, UNTEXTURED};

// Input and host boundary
pub use crate::core::input::{InputState, KeyCode, Modifiers, MouseButton};
pub use crate::core::platform_bridge::{HostEvents, TickControl};
