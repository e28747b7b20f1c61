//=========================================================================
// Input Buffer
//=========================================================================
//
// Holds the input gathered between two redraws.
//
// Discrete events (keys, buttons) keep their order; held keys that the OS
// auto-repeats collapse into one entry. Cursor motion is coalesced to the
// latest position, since the core only reads where the cursor ended up.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::core::input::InputEvent;

//=== InputBuffer =========================================================

pub(crate) struct InputBuffer {
    discrete: Vec<InputEvent>,
    cursor: Option<InputEvent>,
}

impl InputBuffer {
    const DISCRETE_CAPACITY: usize = 64;

    pub(crate) fn new() -> Self {
        Self {
            discrete: Vec::with_capacity(Self::DISCRETE_CAPACITY),
            cursor: None,
        }
    }

    //--- Recording --------------------------------------------------------

    pub(crate) fn push_discrete(&mut self, event: InputEvent) {
        if self.discrete.last() != Some(&event) {
            self.discrete.push(event);
        }
    }

    /// Replaces any cursor position recorded earlier in the frame.
    pub(crate) fn push_continuous(&mut self, event: InputEvent) {
        debug_assert!(event.is_continuous());
        self.cursor = Some(event);
    }

    //--- Flushing ---------------------------------------------------------

    /// Takes the frame's events, or `None` when nothing was recorded.
    pub(crate) fn drain(&mut self) -> Option<(Vec<InputEvent>, Vec<InputEvent>)> {
        if self.is_empty() {
            return None;
        }

        let discrete = std::mem::replace(
            &mut self.discrete,
            Vec::with_capacity(Self::DISCRETE_CAPACITY),
        );
        let continuous = self.cursor.take().into_iter().collect();
        Some((discrete, continuous))
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.discrete.is_empty() && self.cursor.is_none()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
