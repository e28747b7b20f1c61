//=========================================================================
// Strata Demo
//
// Title screen → ground strip with a movable player → pause overlay.
//
// Usage:
//   strata_demo [config.toml]
//
// Logging follows RUST_LOG (defaults to `info`).
//
//=========================================================================

use std::env;

use log::{error, info};
use strata_engine::prelude::*;

const STARTUP_SOUND: &str = "assets/startup.mp3";
const MUSIC: &str = "assets/music.mp3";

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let config = match env::args().nth(1) {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    info!("Window {}x{}", config.window.width, config.window.height);

    let title = TitleScreen::new()
        .with_startup_sound(STARTUP_SOUND)
        .with_music(MUSIC);

    EngineBuilder::new().with_config(config).build().run(title)
}
