use winit::event::{ElementState, KeyEvent, Modifiers};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::input::{Key, KeyPress};

/// What a winit key event means to the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Press(KeyPress),
    Quit,
}

/// Turns winit keyboard events into scene key presses
#[derive(Debug, Clone, Default)]
pub struct WinitKeyboard {
    shift: bool,
}

impl WinitKeyboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_modifiers(&mut self, modifiers: &Modifiers) {
        self.shift = modifiers.state().shift_key();
    }

    /// Pressed (and repeated) keys only; releases are ignored
    pub fn process_key(&self, event: &KeyEvent) -> Option<KeyAction> {
        if event.state != ElementState::Pressed {
            return None;
        }
        let PhysicalKey::Code(code) = event.physical_key else {
            return None;
        };
        self.map_code(code)
    }

    pub fn map_code(&self, code: KeyCode) -> Option<KeyAction> {
        if code == KeyCode::Escape {
            return Some(KeyAction::Quit);
        }

        Self::keycode_to_key(code).map(|key| KeyAction::Press(KeyPress { key, shift: self.shift }))
    }

    fn keycode_to_key(code: KeyCode) -> Option<Key> {
        match code {
            KeyCode::KeyW => Some(Key::W),
            KeyCode::KeyA => Some(Key::A),
            KeyCode::KeyS => Some(Key::S),
            KeyCode::KeyD => Some(Key::D),
            KeyCode::Space => Some(Key::Space),
            KeyCode::KeyX => Some(Key::X),
            KeyCode::KeyY => Some(Key::Y),
            KeyCode::KeyZ => Some(Key::Z),
            KeyCode::KeyO => Some(Key::O),
            KeyCode::KeyF => Some(Key::F),
            KeyCode::KeyP => Some(Key::P),
            KeyCode::KeyC => Some(Key::C),
            KeyCode::KeyH => Some(Key::H),
            KeyCode::KeyV => Some(Key::V),
            KeyCode::KeyB => Some(Key::B),
            KeyCode::KeyL => Some(Key::L),
            KeyCode::Digit1 => Some(Key::Digit1),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // KeyEvent has private fields, so these go through map_code

    #[test]
    fn test_new_keyboard_unshifted() {
        assert_eq!(
            WinitKeyboard::new().map_code(KeyCode::KeyX),
            Some(KeyAction::Press(KeyPress { key: Key::X, shift: false }))
        );
    }

    #[test]
    fn test_key_mapping() {
        let keyboard = WinitKeyboard::new();
        assert_eq!(
            keyboard.map_code(KeyCode::KeyW),
            Some(KeyAction::Press(KeyPress::new(Key::W)))
        );
        assert_eq!(
            keyboard.map_code(KeyCode::Digit1),
            Some(KeyAction::Press(KeyPress::new(Key::Digit1)))
        );
        assert_eq!(keyboard.map_code(KeyCode::KeyQ), None);
    }

    #[test]
    fn test_escape_quits() {
        assert_eq!(WinitKeyboard::new().map_code(KeyCode::Escape), Some(KeyAction::Quit));
    }

    #[test]
    fn test_shift_carries_into_press() {
        let keyboard = WinitKeyboard { shift: true };
        assert_eq!(
            keyboard.map_code(KeyCode::KeyX),
            Some(KeyAction::Press(KeyPress::shifted(Key::X)))
        );
    }
}
