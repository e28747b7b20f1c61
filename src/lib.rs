//=========================================================================
// Strata Engine — Library Root
//
// A small 2D game runtime: a stack of game states driven by a frame
// loop, with audio and batched-quad video services.
//
// Typical usage:
// ```no_run
// use strata_engine::prelude::*;
//
// fn main() -> Result<()> {
//     let config = EngineConfig::load("strata.toml")?;
//     EngineBuilder::new().with_config(config).build().run(TitleScreen::new())
// }
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` holds the state machine and services. `states` ships ready-made
// states used by the demo and as examples of the `GameState` contract.
//
pub mod config;
pub mod core;
pub mod error;
pub mod prelude;
pub mod states;

//--- Internal Modules ----------------------------------------------------
//
// `platform` is the winit host and is not part of the public API.
//
mod engine;
mod platform;

//--- Public Exports ------------------------------------------------------

pub use config::EngineConfig;
pub use engine::{Engine, EngineBuilder};
pub use error::{Error, Result};
