//=========================================================================
// Gameplay
//=========================================================================
//
// A ground strip and a player block that slides left and right.
//
// Controls:
//   ArrowLeft / ArrowRight   move while held
//   Escape                   push the pause menu
//
// Background music, when configured, is loaded on enter, paused together
// with its channel group while the pause menu sits on top, and released
// on exit.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::path::PathBuf;

use log::{debug, info, warn};

//=== Internal Dependencies ===============================================

use super::layers;
use super::PauseMenu;
use crate::core::app::{GameState, RenderContext, StateContext};
use crate::core::audio::{AudioKind, ChannelGroup, GroupProperty, LoadOptions, LoopMode, PlayOptions};
use crate::core::input::KeyCode;
use crate::core::video::{Quad, UNTEXTURED};
use crate::error::Result;

//=== Constants ===========================================================

pub(crate) const MUSIC_ID: &str = "music";

const GROUND_HEIGHT: i32 = 64;
const GROUND_COLOR: u32 = 0x00BF00FF;

const PLAYER_SIZE: i32 = 32;
/// Distance from the bottom of the screen to the top of the player.
const PLAYER_LIFT: i32 = 95;
const PLAYER_COLOR: u32 = 0xBFBFBFFF;
const PLAYER_SPEED: i32 = 5;

//=== Gameplay ============================================================

pub struct Gameplay {
    player_x: i32,
    speed: i32,
    music: Option<PathBuf>,
    music_loaded: bool,
}

impl Gameplay {
    pub fn new() -> Self {
        Self {
            player_x: 0,
            speed: PLAYER_SPEED,
            music: None,
            music_loaded: false,
        }
    }

    /// Streams `path` on the music group, looping, while this state lives.
    pub fn with_music(mut self, path: impl Into<PathBuf>) -> Self {
        self.music = Some(path.into());
        self
    }

    /// Pixels moved per frame while an arrow key is held.
    pub fn with_speed(mut self, speed: i32) -> Self {
        self.speed = speed;
        self
    }

    pub fn player_x(&self) -> i32 {
        self.player_x
    }

    fn max_x(screen_width: u32) -> i32 {
        (screen_width as i32 - PLAYER_SIZE).max(0)
    }
}

impl Default for Gameplay {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState for Gameplay {
    fn name(&self) -> &str {
        "Gameplay"
    }

    fn enter(&mut self, ctx: &mut StateContext<'_>) -> Result<()> {
        if let Some(path) = &self.music {
            let audio = ctx.audio();
            audio.load(AudioKind::MusicStream, MUSIC_ID, path, LoadOptions::default())?;
            let played = audio.play(
                AudioKind::MusicStream,
                MUSIC_ID,
                &PlayOptions::new().looping(LoopMode::Infinite),
            );
            if played.is_err() {
                if let Err(e) = audio.unload(AudioKind::MusicStream, MUSIC_ID) {
                    warn!(target: "states", "Could not release music: {}", e);
                }
            }
            played?;
            self.music_loaded = true;
        }
        info!(target: "states", "Gameplay started");
        Ok(())
    }

    fn exit(&mut self, ctx: &mut StateContext<'_>) -> Result<()> {
        if self.music_loaded {
            ctx.audio().unload(AudioKind::MusicStream, MUSIC_ID)?;
            self.music_loaded = false;
        }
        Ok(())
    }

    fn pause(&mut self, ctx: &mut StateContext<'_>) -> Result<()> {
        debug!(target: "states", "Gameplay paused at x={}", self.player_x);
        ctx.audio().set_group_property(ChannelGroup::Music, GroupProperty::Paused(true));
        Ok(())
    }

    fn resume(&mut self, ctx: &mut StateContext<'_>) -> Result<()> {
        ctx.audio().set_group_property(ChannelGroup::Music, GroupProperty::Paused(false));
        Ok(())
    }

    fn logic(&mut self, ctx: &mut StateContext<'_>) -> Result<()> {
        let input = ctx.input();

        if input.is_key_pressed(KeyCode::Escape) {
            ctx.push_state(PauseMenu::new());
            return Ok(());
        }

        let mut step = 0;
        if input.is_key_down(KeyCode::ArrowLeft) {
            step -= self.speed;
        }
        if input.is_key_down(KeyCode::ArrowRight) {
            step += self.speed;
        }

        let max_x = Self::max_x(ctx.video().screen_width());
        self.player_x = (self.player_x + step).clamp(0, max_x);
        Ok(())
    }

    fn render(&self, ctx: &mut RenderContext<'_>) {
        let width = ctx.screen_width() as i32;
        let height = ctx.screen_height() as i32;

        ctx.queue_quad(
            layers::WORLD,
            UNTEXTURED,
            Quad::solid(0, height - GROUND_HEIGHT, width, GROUND_HEIGHT, GROUND_COLOR),
        );
        ctx.queue_quad(
            layers::ACTORS,
            UNTEXTURED,
            Quad::solid(self.player_x, height - PLAYER_LIFT, PLAYER_SIZE, PLAYER_SIZE, PLAYER_COLOR),
        );
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
