//=========================================================================
// Pause Menu
//=========================================================================
//
// Transparent overlay pushed over gameplay.
//
// Controls:
//   Escape   pop back to the paused state
//   Q        quit
//
//=========================================================================

//=== Internal Dependencies ===============================================

use super::layers;
use crate::core::app::{GameState, RenderContext, StateContext};
use crate::core::input::KeyCode;
use crate::core::video::{Quad, UNTEXTURED};
use crate::error::Result;

//=== Constants ===========================================================

const SHADE_COLOR: u32 = 0x00000099;
const PANEL_COLOR: u32 = 0x303048E0;
const PANEL_WIDTH: i32 = 320;
const PANEL_HEIGHT: i32 = 160;

//=== PauseMenu ===========================================================

#[derive(Debug, Default)]
pub struct PauseMenu;

impl PauseMenu {
    pub fn new() -> Self {
        Self
    }
}

impl GameState for PauseMenu {
    fn name(&self) -> &str {
        "PauseMenu"
    }

    fn logic(&mut self, ctx: &mut StateContext<'_>) -> Result<()> {
        let input = ctx.input();
        let resume = input.is_key_pressed(KeyCode::Escape);
        let quit = input.is_key_pressed(KeyCode::KeyQ);

        if quit {
            ctx.request_quit();
        } else if resume {
            ctx.pop_state();
        }
        Ok(())
    }

    fn render(&self, ctx: &mut RenderContext<'_>) {
        let width = ctx.screen_width() as i32;
        let height = ctx.screen_height() as i32;

        ctx.queue_quad(layers::OVERLAY, UNTEXTURED, Quad::solid(0, 0, width, height, SHADE_COLOR));
        ctx.queue_quad(
            layers::OVERLAY_UI,
            UNTEXTURED,
            Quad::solid(
                (width - PANEL_WIDTH) / 2,
                (height - PANEL_HEIGHT) / 2,
                PANEL_WIDTH,
                PANEL_HEIGHT,
                PANEL_COLOR,
            ),
        );
    }

    fn is_transparent(&self) -> bool {
        true
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
