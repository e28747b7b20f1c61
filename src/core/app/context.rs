//=========================================================================
// State Contexts
//=========================================================================
//
// What a game state can reach while the application manager calls it.
//
//   StateContext   lifecycle hooks and logic: services, input, requests
//   RenderContext  render pass: quad queueing only
//
// Neither exposes the state stack. Stack changes go through the request
// slot and apply at the next poll.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::Duration;

//=== Internal Dependencies ===============================================

use super::state_request::{RequestKind, StateRequest};
use super::GameState;
use crate::core::audio::AudioService;
use crate::core::input::InputState;
use crate::core::video::{Quad, VideoService};

//=== StateContext ========================================================

/// Services, input and the transition back-channel for one hook call.
pub struct StateContext<'a> {
    pub(crate) request: &'a mut StateRequest,
    pub(crate) quit: &'a mut bool,
    pub(crate) audio: &'a mut AudioService,
    pub(crate) video: &'a mut VideoService,
    pub(crate) input: &'a InputState,
    pub(crate) delta: Duration,
}

impl<'a> StateContext<'a> {
    //--- Transition Requests ----------------------------------------------

    /// Replaces the active state at the next poll.
    pub fn change_state(&mut self, target: impl GameState + 'static) {
        self.request.arm(StateRequest::Change(Box::new(target)));
    }

    /// Pauses the active state and stacks `target` on it at the next poll.
    pub fn push_state(&mut self, target: impl GameState + 'static) {
        self.request.arm(StateRequest::Push(Box::new(target)));
    }

    /// Removes the active state at the next poll. No effect on the floor state.
    pub fn pop_state(&mut self) {
        self.request.arm(StateRequest::Pop);
    }

    /// Ends the frame loop once the current frame has been presented.
    pub fn request_quit(&mut self) {
        *self.quit = true;
    }

    pub fn pending_request(&self) -> RequestKind {
        self.request.kind()
    }

    //--- Services ---------------------------------------------------------

    pub fn audio(&mut self) -> &mut AudioService {
        self.audio
    }

    pub fn video(&mut self) -> &mut VideoService {
        self.video
    }

    pub fn input(&self) -> &InputState {
        self.input
    }

    /// Time since the previous frame started. Zero on the first frame and
    /// in lifecycle hooks.
    pub fn delta(&self) -> Duration {
        self.delta
    }
}

//=== RenderContext =======================================================

/// Draw-side view handed to [`GameState::render`].
pub struct RenderContext<'a> {
    pub(crate) video: &'a mut VideoService,
}

impl<'a> RenderContext<'a> {
    /// Queues a quad for this frame. See [`VideoService::queue_quad`].
    pub fn queue_quad(&mut self, layer: u8, texture_id: &str, quad: Quad) {
        self.video.queue_quad(layer, texture_id, quad);
    }

    pub fn screen_width(&self) -> u32 {
        self.video.screen_width()
    }

    pub fn screen_height(&self) -> u32 {
        self.video.screen_height()
    }

    pub fn frame_rate(&self) -> u32 {
        self.video.frame_rate()
    }
}
