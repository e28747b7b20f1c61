//=========================================================================
// Application
//=========================================================================
//
// Game states and the manager that stacks them.
//
// Architecture:
//   AppManager
//     ├─ stack: Vec<Box<dyn GameState>>   bottom = floor, top = active
//     ├─ request: StateRequest            at most one, applied per frame
//     ├─ audio: AudioService
//     └─ video: VideoService
//
// Frame:
//   host.poll() → poll_state_request() → top.logic() → render pass
//     → video.update() → audio.update()
//
//=========================================================================

//=== Module Declarations =================================================

mod app_manager;
mod context;
mod state_request;

//=== Public API ==========================================================

pub use app_manager::AppManager;
pub use context::{RenderContext, StateContext};
pub use state_request::{RequestKind, StateRequest};

//=== Internal Dependencies ===============================================

use crate::error::Result;

//=== GameState Trait =====================================================

/// One mode of the application: title screen, gameplay, pause menu...
///
/// The manager owns every stacked state and drives its hooks:
///
/// - `enter` once, before any `logic`/`render`
/// - `pause`/`resume` around periods where another state sits on top;
///   `logic` does not run in between
/// - `exit` once, after which the state is dropped
///
/// A state whose `enter` fails is dropped without `exit`, so `enter` must
/// release whatever it acquired before returning the error.
///
/// Only `logic` is required:
///
/// ```rust
/// use strata_engine::prelude::*;
///
/// struct Title;
///
/// impl GameState for Title {
///     fn logic(&mut self, ctx: &mut StateContext<'_>) -> Result<()> {
///         if ctx.input().is_key_pressed(KeyCode::Escape) {
///             ctx.request_quit();
///         }
///         Ok(())
///     }
/// }
/// ```
///
/// An error from any hook stops the frame loop and is returned from
/// [`AppManager::start`].
pub trait GameState: Send {
    /// Name used in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Called when the state is installed on the stack. Load resources here.
    fn enter(&mut self, _ctx: &mut StateContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Called right before the state is dropped. Release resources here.
    fn exit(&mut self, _ctx: &mut StateContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Another state was pushed on top of this one.
    fn pause(&mut self, _ctx: &mut StateContext<'_>) -> Result<()> {
        Ok(())
    }

    /// The state above this one was popped.
    fn resume(&mut self, _ctx: &mut StateContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Per-frame update of the active state.
    fn logic(&mut self, ctx: &mut StateContext<'_>) -> Result<()>;

    /// Queues this frame's draw primitives.
    fn render(&self, _ctx: &mut RenderContext<'_>) {}

    /// Whether the state beneath this one should still be rendered.
    ///
    /// Overlays such as pause menus return `true` so the paused scene
    /// stays visible. Only the top state ever receives `logic`.
    fn is_transparent(&self) -> bool {
        false
    }
}
