//=========================================================================
// Static Tile
//=========================================================================
//
// A state that only draws: a fixed set of textured or solid quads.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::core::app::{GameState, RenderContext, StateContext};
use crate::core::video::{Quad, UNTEXTURED};
use crate::error::Result;

//=== StaticTile ==========================================================

struct Tile {
    layer: u8,
    texture: String,
    quad: Quad,
}

/// Fixed background made of tiles. Its logic does nothing.
#[derive(Default)]
pub struct StaticTile {
    tiles: Vec<Tile>,
}

impl StaticTile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a tile drawn with `texture_id` ([`UNTEXTURED`] for a solid quad).
    pub fn with_tile(mut self, layer: u8, texture_id: &str, quad: Quad) -> Self {
        self.tiles.push(Tile {
            layer,
            texture: texture_id.to_string(),
            quad,
        });
        self
    }

    /// Adds an untextured tile.
    pub fn with_solid(self, layer: u8, quad: Quad) -> Self {
        self.with_tile(layer, UNTEXTURED, quad)
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

impl GameState for StaticTile {
    fn name(&self) -> &str {
        "StaticTile"
    }

    fn logic(&mut self, _ctx: &mut StateContext<'_>) -> Result<()> {
        Ok(())
    }

    fn render(&self, ctx: &mut RenderContext<'_>) {
        for tile in &self.tiles {
            ctx.queue_quad(tile.layer, &tile.texture, tile.quad);
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
