//=========================================================================
// Platform Bridge Interface
//=========================================================================
//
// Contract between whatever hosts the window and the frame loop.
//
// The winit platform sends `PlatformEvent`s over a channel; the core
// consumes them through `HostEvents`, which tests implement directly
// with scripted hosts.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::core::input::{InputEvent, InputState};

//=== PlatformEvent =======================================================

/// Events sent from the platform thread to the core.
#[derive(Debug, Clone, PartialEq)]
pub enum PlatformEvent {
    /// Input gathered since the previous batch.
    Inputs {
        discrete: Vec<InputEvent>,
        continuous: Vec<InputEvent>,
    },

    /// Window inner size changed, in physical pixels.
    Resized { width: u32, height: u32 },

    /// Window close requested.
    WindowClosed,
}

//=== TickControl =========================================================

/// Frame loop control signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickControl {
    Continue,
    Exit,
}

//=== HostEvents ==========================================================

/// Per-frame event source polled by the application manager.
pub trait HostEvents {
    /// Folds this frame's input into `input` and reports whether the host
    /// wants the loop to keep running.
    fn poll(&mut self, input: &mut InputState) -> TickControl;

    /// Latest window size reported since the previous call, if any.
    fn take_resize(&mut self) -> Option<(u32, u32)> {
        None
    }
}
