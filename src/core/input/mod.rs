//=========================================================================
// Input
//=========================================================================
//
// Input is an event source consumed once per frame: the host boundary
// folds the frame's events into `InputState`, then game states query it
// through their context.
//
//=========================================================================

//=== Module Declarations =================================================

pub mod event;
mod input_state;

//=== Public API ==========================================================

pub use event::{InputEvent, KeyCode, Modifiers, MouseButton};
pub use input_state::InputState;
