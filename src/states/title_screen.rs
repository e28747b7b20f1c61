//=========================================================================
// Title Screen
//=========================================================================
//
// Opening state: plays the startup jingle and waits for the player.
//
// Controls:
//   Enter / Space   change to gameplay
//   Escape          quit
//
//=========================================================================

//=== External Dependencies ===============================================

use std::path::PathBuf;
use std::time::Duration;

use log::info;

//=== Internal Dependencies ===============================================

use super::layers;
use super::Gameplay;
use crate::core::app::{GameState, RenderContext, StateContext};
use crate::core::audio::{AudioKind, LoadOptions, PlayOptions};
use crate::core::input::KeyCode;
use crate::core::video::{Quad, UNTEXTURED};
use crate::error::Result;

//=== Constants ===========================================================

pub(crate) const STARTUP_ID: &str = "startup";

const BACKGROUND_COLOR: u32 = 0x101830FF;
const BANNER_COLOR: u32 = 0xD0A020FF;
const PROMPT_COLOR: u32 = 0xE0E0E0FF;
const PROMPT_BLINK: Duration = Duration::from_millis(500);

//=== TitleScreen =========================================================

#[derive(Default)]
pub struct TitleScreen {
    startup_sound: Option<PathBuf>,
    music: Option<PathBuf>,
    sound_loaded: bool,
    elapsed: Duration,
}

impl TitleScreen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sample played once when the title appears.
    pub fn with_startup_sound(mut self, path: impl Into<PathBuf>) -> Self {
        self.startup_sound = Some(path.into());
        self
    }

    /// Music handed on to the gameplay state.
    pub fn with_music(mut self, path: impl Into<PathBuf>) -> Self {
        self.music = Some(path.into());
        self
    }

    fn prompt_visible(&self) -> bool {
        (self.elapsed.as_millis() / PROMPT_BLINK.as_millis()) % 2 == 0
    }

    fn next_state(&self) -> Gameplay {
        match &self.music {
            Some(path) => Gameplay::new().with_music(path.clone()),
            None => Gameplay::new(),
        }
    }
}

impl GameState for TitleScreen {
    fn name(&self) -> &str {
        "TitleScreen"
    }

    fn enter(&mut self, ctx: &mut StateContext<'_>) -> Result<()> {
        if let Some(path) = &self.startup_sound {
            let audio = ctx.audio();
            audio.load(AudioKind::SfxSample, STARTUP_ID, path, LoadOptions::default())?;
            audio.play(AudioKind::SfxSample, STARTUP_ID, &PlayOptions::default())?;
            self.sound_loaded = true;
        }
        Ok(())
    }

    fn exit(&mut self, ctx: &mut StateContext<'_>) -> Result<()> {
        if self.sound_loaded {
            ctx.audio().unload(AudioKind::SfxSample, STARTUP_ID)?;
            self.sound_loaded = false;
        }
        Ok(())
    }

    fn logic(&mut self, ctx: &mut StateContext<'_>) -> Result<()> {
        self.elapsed += ctx.delta();

        let input = ctx.input();
        if input.is_key_pressed(KeyCode::Escape) {
            info!(target: "states", "Quit from title screen");
            ctx.request_quit();
        } else if input.is_key_pressed(KeyCode::Enter) || input.is_key_pressed(KeyCode::Space) {
            ctx.change_state(self.next_state());
        }
        Ok(())
    }

    fn render(&self, ctx: &mut RenderContext<'_>) {
        let width = ctx.screen_width() as i32;
        let height = ctx.screen_height() as i32;

        ctx.queue_quad(layers::BACKGROUND, UNTEXTURED, Quad::solid(0, 0, width, height, BACKGROUND_COLOR));
        ctx.queue_quad(
            layers::WORLD,
            UNTEXTURED,
            Quad::solid(width / 8, height / 4, width * 3 / 4, height / 6, BANNER_COLOR),
        );
        if self.prompt_visible() {
            ctx.queue_quad(
                layers::WORLD,
                UNTEXTURED,
                Quad::solid(width / 3, height * 2 / 3, width / 3, 24, PROMPT_COLOR),
            );
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::audio::HeadlessAudioBackend;
    use crate::core::platform_bridge::TickControl;
    use crate::core::video::HeadlessVideoBackend;
    use crate::states::gameplay::MUSIC_ID;
    use crate::states::testing::{frames, run, Script};

    #[test]
    fn enter_changes_to_gameplay() {
        let mut app = run(TitleScreen::new());
        frames(&mut app, &mut Script::idle().tap(KeyCode::Enter), 2);

        assert_eq!(app.state_names(), vec!["Gameplay"]);
    }

    #[test]
    fn space_also_starts_the_game() {
        let mut app = run(TitleScreen::new());
        frames(&mut app, &mut Script::idle().tap(KeyCode::Space), 2);

        assert_eq!(app.active_state_name(), Some("Gameplay"));
    }

    #[test]
    fn escape_quits() {
        let mut app = run(TitleScreen::new());
        let control = frames(&mut app, &mut Script::idle().tap(KeyCode::Escape), 5);

        assert_eq!(control, TickControl::Exit);
        assert_eq!(app.active_state_name(), Some("TitleScreen"));
    }

    #[test]
    fn draws_background_banner_and_prompt() {
        let mut app = run(TitleScreen::new());
        frames(&mut app, &mut Script::idle(), 1);

        let backend = app.video().backend_as::<HeadlessVideoBackend>().unwrap();
        assert_eq!(backend.last_frame().len(), 3);
    }

    #[test]
    fn prompt_blinks() {
        let mut title = TitleScreen::new();
        assert!(title.prompt_visible());
        title.elapsed = Duration::from_millis(600);
        assert!(!title.prompt_visible());
        title.elapsed = Duration::from_millis(1100);
        assert!(title.prompt_visible());
    }

    #[test]
    fn startup_sound_lives_with_the_title() {
        let title = TitleScreen::new()
            .with_startup_sound("assets/startup.wav")
            .with_music("assets/music.ogg");
        let mut app = run(title);

        assert!(app.audio().is_loaded(AudioKind::SfxSample, STARTUP_ID));
        let backend = app.audio().backend_as::<HeadlessAudioBackend>().unwrap();
        assert_eq!(backend.active_voices(), 1);

        frames(&mut app, &mut Script::idle().tap(KeyCode::Enter), 2);

        assert!(!app.audio().is_loaded(AudioKind::SfxSample, STARTUP_ID));
        assert!(app.audio().is_loaded(AudioKind::MusicStream, MUSIC_ID));
    }
}
