//=========================================================================
// Event Collector
//=========================================================================
//
// Channel-backed `HostEvents` with bounded draining.
//
// Architecture:
//   Receiver<PlatformEvent> → poll() → InputState (+ pending resize) → TickControl
//
// At most `max_events` messages are drained per frame so a flood of
// input cannot starve the loop; the rest wait for the next frame.
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::{Receiver, TryRecvError};
use log::{info, warn};

//=== Internal Dependencies ===============================================

use super::interface::{HostEvents, PlatformEvent, TickControl};
use crate::core::input::InputState;

//=== EventCollector ======================================================

/// Drains platform events into the frame's input snapshot.
pub struct EventCollector {
    receiver: Receiver<PlatformEvent>,
    max_events: usize,
    resize: Option<(u32, u32)>,
}

impl EventCollector {
    pub const DEFAULT_MAX_EVENTS: usize = 100;

    pub fn new(receiver: Receiver<PlatformEvent>) -> Self {
        Self::with_max_events(receiver, Self::DEFAULT_MAX_EVENTS)
    }

    /// # Panics
    ///
    /// Panics if `max_events == 0`.
    pub fn with_max_events(receiver: Receiver<PlatformEvent>, max_events: usize) -> Self {
        assert!(max_events > 0, "Event limit must be positive");
        Self {
            receiver,
            max_events,
            resize: None,
        }
    }

    fn handle_event(&mut self, event: PlatformEvent, input: &mut InputState) -> TickControl {
        match event {
            PlatformEvent::Inputs { discrete, continuous } => {
                input.apply(&discrete);
                input.apply(&continuous);
                TickControl::Continue
            }
            PlatformEvent::Resized { width, height } => {
                self.resize = Some((width, height));
                TickControl::Continue
            }
            PlatformEvent::WindowClosed => {
                info!(target: "platform", "Window closed");
                TickControl::Exit
            }
        }
    }
}

impl HostEvents for EventCollector {
    fn poll(&mut self, input: &mut InputState) -> TickControl {
        let mut drained = 0;

        while drained < self.max_events {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.handle_event(event, input) == TickControl::Exit {
                        return TickControl::Exit;
                    }
                    drained += 1;
                }
                Err(TryRecvError::Disconnected) => return TickControl::Exit,
                Err(TryRecvError::Empty) => break,
            }
        }

        if drained >= self.max_events {
            warn!(target: "platform", "Event queue backlog: drained {} events this frame", drained);
        }

        TickControl::Continue
    }

    fn take_resize(&mut self) -> Option<(u32, u32)> {
        self.resize.take()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
