use crate::events::{KeyCode, KeyState, Modifiers};

/// Физически зажатые модификаторы на отслеживаемой клавиатуре
#[derive(Debug, Default)]
pub struct ModifierState {
    left_ctrl: bool,
    right_ctrl: bool,
    alt: bool,
    left_shift: bool,
    right_shift: bool,
    left_meta: bool,
    right_meta: bool,
}

impl ModifierState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn to_modifiers(&self) -> Modifiers {
        Modifiers {
            ctrl: self.left_ctrl || self.right_ctrl,
            alt: self.alt,
            shift: self.shift_held(),
            super_key: self.left_meta || self.right_meta,
        }
    }

    pub fn shift_held(&self) -> bool {
        self.left_shift || self.right_shift
    }

    /// Нажатие и автоповтор означают, что клавиша зажата
    pub fn update_key(&mut self, key: KeyCode, state: KeyState) {
        let held = state.is_down();
        match key {
            KeyCode::KEY_LEFTCTRL => self.left_ctrl = held,
            KeyCode::KEY_RIGHTCTRL => self.right_ctrl = held,
            // AltGr (правый Alt) печатает символы третьего уровня, это не сочетание клавиш
            KeyCode::KEY_LEFTALT => self.alt = held,
            KeyCode::KEY_LEFTSHIFT => self.left_shift = held,
            KeyCode::KEY_RIGHTSHIFT => self.right_shift = held,
            KeyCode::KEY_LEFTMETA => self.left_meta = held,
            KeyCode::KEY_RIGHTMETA => self.right_meta = held,
            _ => {}
        }
    }
}
