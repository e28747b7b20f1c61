//=========================================================================
// Strata Engine
//
// Entry point: configures the runtime, then runs the core and the host.
//
// Architecture:
// ```text
//     EngineBuilder  ──build()──>  Engine  ──run(initial)──>  [Runtime]
//         │                          │
//         ├─ with_config()           ├─ core thread: AppManager::start
//         ├─ with_target_fps()       └─ main thread: winit Platform
//         ├─ with_channel_capacity()
//         └─ with_services()         ──run_headless(initial, host)──>
//                                        AppManager on the calling thread
// ```
//
// Shutdown:
//   window closed → WindowClosed → core loop exits → shutdown flag → platform exits
//   state quits   → core loop exits → shutdown flag → platform exits
//
//=========================================================================

//=== Standard Library ====================================================

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

//=== External Dependencies ===============================================

use crossbeam_channel::{bounded, Receiver, Sender};
use log::{error, info};

//=== Internal Dependencies ===============================================

use crate::config::EngineConfig;
use crate::core::app::{AppManager, GameState};
use crate::core::audio::AudioService;
use crate::core::platform_bridge::{EventCollector, HostEvents, PlatformEvent};
use crate::core::video::VideoService;
use crate::error::{PlatformError, Result};
use crate::platform::Platform;

//=== EngineBuilder =======================================================

/// Builder for an [`Engine`].
///
/// # Default Values
///
/// - **Config**: [`EngineConfig::default`] (800x600 window, unpaced loop)
/// - **Channel capacity**: 128 events
/// - **Services**: headless audio and video backends
///
/// # Examples
///
/// ```no_run
/// use strata_engine::prelude::*;
///
/// struct Idle;
///
/// impl GameState for Idle {
///     fn logic(&mut self, _ctx: &mut StateContext<'_>) -> Result<()> {
///         Ok(())
///     }
/// }
///
/// EngineBuilder::new()
///     .with_target_fps(60.0)
///     .with_channel_capacity(256)
///     .build()
///     .run(Idle)?;
/// # Ok::<(), strata_engine::Error>(())
/// ```
pub struct EngineBuilder {
    config: EngineConfig,
    audio: AudioService,
    video: VideoService,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            audio: AudioService::headless(),
            video: VideoService::headless(),
        }
    }

    /// Replaces the whole configuration, typically one loaded with
    /// [`EngineConfig::load`]. Validated when the engine runs.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Paces the frame loop towards `fps` frames per second.
    ///
    /// # Panics
    ///
    /// Panics if `fps <= 0.0`.
    pub fn with_target_fps(mut self, fps: f64) -> Self {
        assert!(fps > 0.0, "Target FPS must be positive, got {}", fps);
        self.config.frame.target_fps = Some(fps);
        self
    }

    /// Sets the capacity of the platform → core channel.
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        assert!(capacity > 0, "Channel capacity must be positive");
        self.config.frame.channel_capacity = capacity;
        self
    }

    /// Swaps in services built over other backends.
    pub fn with_services(mut self, audio: AudioService, video: VideoService) -> Self {
        self.audio = audio;
        self.video = video;
        self
    }

    pub fn build(self) -> Engine {
        info!(
            "Building engine (target fps: {:?}, channel: {})",
            self.config.frame.target_fps, self.config.frame.channel_capacity
        );

        Engine {
            config: self.config,
            app: AppManager::new(self.audio, self.video),
        }
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//=== Engine ==============================================================

/// Configured runtime, consumed by [`run`](Self::run) or
/// [`run_headless`](Self::run_headless).
pub struct Engine {
    config: EngineConfig,
    app: AppManager,
}

impl Engine {
    /// Opens the window and runs `initial` until the window closes or a
    /// state quits.
    ///
    /// Blocks the calling thread, which must be the main thread on macOS.
    /// The first error from the core (state hooks, service allocation) is
    /// returned ahead of platform errors.
    pub fn run(self, initial: impl GameState + 'static) -> Result<()> {
        let Self { config, app } = self;
        config.validate()?;
        info!("Starting engine runtime");

        //--- 1. Create communication channel -----------------------------
        let (tx, rx): (Sender<PlatformEvent>, Receiver<PlatformEvent>) =
            bounded(config.frame.channel_capacity);
        let shutdown = Arc::new(AtomicBool::new(false));

        //--- 2. Spawn the core thread --------------------------------------
        let core_config = config.clone();
        let core_shutdown = Arc::clone(&shutdown);
        let core_handle = thread::spawn(move || {
            let mut collector =
                EventCollector::with_max_events(rx, core_config.frame.max_events_per_frame);
            let result = run_core(app, &core_config, initial, &mut collector);
            core_shutdown.store(true, Ordering::Release);
            result
        });
        info!("Core thread spawned");

        //--- 3. Run the platform on this thread ----------------------------
        let platform_result = Platform::new(tx, config.window.clone(), shutdown).run();
        if let Err(e) = &platform_result {
            error!("Platform error: {}", e);
        }
        info!("Platform event loop exited");

        //--- 4. Wait for the core --------------------------------------------
        let core_result = core_handle.join().map_err(|_| {
            error!("Core thread panicked");
            PlatformError::CoreThreadPanicked
        })?;

        info!("Engine shutdown complete");
        core_result?;
        platform_result.map_err(Into::into)
    }

    /// Runs `initial` on the calling thread with events from `host`.
    pub fn run_headless(self, initial: impl GameState + 'static, host: &mut dyn HostEvents) -> Result<()> {
        info!("Starting engine runtime (headless)");
        run_core(self.app, &self.config, initial, host)
    }
}

/// Allocate, run, deallocate.
fn run_core(
    mut app: AppManager,
    config: &EngineConfig,
    initial: impl GameState + 'static,
    host: &mut dyn HostEvents,
) -> Result<()> {
    app.allocate(config)?;
    let result = app.start(initial, host);
    if let Err(e) = &result {
        error!("Frame loop aborted: {}", e);
    }
    app.deallocate();
    result
}

//=========================================================================
// Unit Tests
//=========================================================================
