//=========================================================================
// Stock States
//=========================================================================
//
// Ready-made game states used by the demo binary.
//
// Flow:
// ```text
//   TitleScreen ──Enter──> Gameplay ──Escape──> PauseMenu (pushed, transparent)
//        │                    ↑                      │
//        └─Escape: quit       └──────Escape: pop─────┘
//                                                    └─Q: quit
// ```
//
// `StaticTile` is the smallest possible state: it draws fixed quads and
// never changes. It makes a handy floor beneath overlays.
//
//=========================================================================

//=== Module Declarations =================================================

mod gameplay;
mod pause_menu;
mod static_tile;
mod title_screen;

//=== Public API ==========================================================

pub use gameplay::Gameplay;
pub use pause_menu::PauseMenu;
pub use static_tile::StaticTile;
pub use title_screen::TitleScreen;

//=== Draw Layers =========================================================

/// Layers shared by the stock states; higher layers draw on top.
pub mod layers {
    pub const BACKGROUND: u8 = 0;
    pub const WORLD: u8 = 10;
    pub const ACTORS: u8 = 20;
    pub const OVERLAY: u8 = 200;
    pub const OVERLAY_UI: u8 = 210;
}

//=========================================================================
// Test Support
//=========================================================================
