//=========================================================================
// Input Translator
//=========================================================================
//
// Turns winit window events into engine `InputEvent`s.
//
//   WindowEvent → InputTranslator → InputEvent → InputBuffer
//
// Modifier state arrives as its own event (`ModifiersChanged`), so the
// translator caches it and stamps it onto every following key or button.
// OS key repeat is dropped: `InputState` already reports held keys.
//
//=========================================================================

//=== External Dependencies ===============================================

use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, KeyEvent, MouseButton as WinitMouseButton},
    keyboard::{KeyCode as WinitKeyCode, ModifiersState, PhysicalKey},
};

//=== Internal Dependencies ===============================================

use crate::core::input::{InputEvent, KeyCode, Modifiers, MouseButton};

//=== InputTranslator =====================================================

pub(crate) struct InputTranslator {
    modifiers: Modifiers,
}

impl InputTranslator {
    pub(crate) fn new() -> Self {
        Self { modifiers: Modifiers::NONE }
    }

    pub(crate) fn set_modifiers(&mut self, state: ModifiersState) {
        self.modifiers = Modifiers::from(state);
    }

    pub(crate) fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    //--- Translation ------------------------------------------------------

    /// `None` for auto-repeat and for keys the engine does not bind.
    pub(crate) fn key(&self, event: &KeyEvent) -> Option<InputEvent> {
        if event.repeat {
            return None;
        }
        let PhysicalKey::Code(code) = event.physical_key else {
            return None;
        };
        translate_key(code).map(|key| self.key_transition(key, event.state))
    }

    pub(crate) fn mouse_button(&self, button: WinitMouseButton, state: ElementState) -> InputEvent {
        let button = MouseButton::from(button);
        let modifiers = self.modifiers;
        match state {
            ElementState::Pressed => InputEvent::MouseButtonDown { button, modifiers },
            ElementState::Released => InputEvent::MouseButtonUp { button, modifiers },
        }
    }

    pub(crate) fn cursor(&self, position: PhysicalPosition<f64>) -> InputEvent {
        InputEvent::MouseMoved {
            x: position.x as f32,
            y: position.y as f32,
        }
    }

    fn key_transition(&self, key: KeyCode, state: ElementState) -> InputEvent {
        let modifiers = self.modifiers;
        match state {
            ElementState::Pressed => InputEvent::KeyDown { key, modifiers },
            ElementState::Released => InputEvent::KeyUp { key, modifiers },
        }
    }
}

//=========================================================================
// Winit Conversions
//=========================================================================

impl From<ModifiersState> for Modifiers {
    fn from(state: ModifiersState) -> Self {
        Self {
            shift: state.shift_key(),
            ctrl: state.control_key(),
            alt: state.alt_key(),
        }
    }
}

impl From<WinitMouseButton> for MouseButton {
    fn from(button: WinitMouseButton) -> Self {
        match button {
            WinitMouseButton::Left => Self::Left,
            WinitMouseButton::Right => Self::Right,
            WinitMouseButton::Middle => Self::Middle,
            _ => Self::Other,
        }
    }
}

/// Winit and engine key codes share variant names for every key the
/// engine binds.
macro_rules! key_table {
    ($code:expr; $($key:ident)*) => {
        match $code {
            $(WinitKeyCode::$key => Some(KeyCode::$key),)*
            _ => None,
        }
    };
}

pub(crate) fn translate_key(code: WinitKeyCode) -> Option<KeyCode> {
    key_table!(code;
        Digit0 Digit1 Digit2 Digit3 Digit4 Digit5 Digit6 Digit7 Digit8 Digit9
        KeyA KeyB KeyC KeyD KeyE KeyF KeyG KeyH KeyI KeyJ KeyK KeyL KeyM
        KeyN KeyO KeyP KeyQ KeyR KeyS KeyT KeyU KeyV KeyW KeyX KeyY KeyZ
        ArrowUp ArrowDown ArrowLeft ArrowRight
        Space Enter Escape Tab Backspace Delete
    )
}

//=========================================================================
// Unit Tests
//=========================================================================
