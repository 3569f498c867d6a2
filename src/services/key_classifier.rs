use crate::events::{KeyCode, Modifiers};
use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Поведение клавиши в главном цикле. Каждая клавиша попадает ровно в один класс.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyClass {
    /// Клавиша жеста двойного нажатия
    Trigger,
    /// Печатная клавиша (или Backspace), попадает в буфер
    Trackable,
    /// Навигация и границы ввода: понятие "текущего слова" теряет смысл
    Reset,
    /// Всё остальное: модификаторы, F-клавиши, мультимедиа
    Ignored,
}

// Печатные клавиши основного блока
static TRACKABLE_KEYS: Lazy<HashSet<u16>> = Lazy::new(|| {
    [
        // Буквы
        KeyCode::KEY_A, KeyCode::KEY_B, KeyCode::KEY_C, KeyCode::KEY_D,
        KeyCode::KEY_E, KeyCode::KEY_F, KeyCode::KEY_G, KeyCode::KEY_H,
        KeyCode::KEY_I, KeyCode::KEY_J, KeyCode::KEY_K, KeyCode::KEY_L,
        KeyCode::KEY_M, KeyCode::KEY_N, KeyCode::KEY_O, KeyCode::KEY_P,
        KeyCode::KEY_Q, KeyCode::KEY_R, KeyCode::KEY_S, KeyCode::KEY_T,
        KeyCode::KEY_U, KeyCode::KEY_V, KeyCode::KEY_W, KeyCode::KEY_X,
        KeyCode::KEY_Y, KeyCode::KEY_Z,
        // Цифры верхнего ряда
        KeyCode::KEY_1, KeyCode::KEY_2, KeyCode::KEY_3, KeyCode::KEY_4,
        KeyCode::KEY_5, KeyCode::KEY_6, KeyCode::KEY_7, KeyCode::KEY_8,
        KeyCode::KEY_9, KeyCode::KEY_0,
        // Пунктуация
        KeyCode::KEY_MINUS, KeyCode::KEY_EQUAL, KeyCode::KEY_LEFTBRACE,
        KeyCode::KEY_RIGHTBRACE, KeyCode::KEY_BACKSLASH, KeyCode::KEY_SEMICOLON,
        KeyCode::KEY_APOSTROPHE, KeyCode::KEY_GRAVE, KeyCode::KEY_COMMA,
        KeyCode::KEY_DOT, KeyCode::KEY_SLASH,
        // Пробел и Backspace (последний не хранится, а откатывает буфер)
        KeyCode::KEY_SPACE, KeyCode::KEY_BACKSPACE,
    ]
    .iter()
    .map(|key| key.code())
    .collect()
});

static RESET_KEYS: Lazy<HashSet<u16>> = Lazy::new(|| {
    [
        KeyCode::KEY_ENTER, KeyCode::KEY_KPENTER, KeyCode::KEY_TAB, KeyCode::KEY_ESC,
        KeyCode::KEY_UP, KeyCode::KEY_DOWN, KeyCode::KEY_LEFT, KeyCode::KEY_RIGHT,
        KeyCode::KEY_HOME, KeyCode::KEY_END, KeyCode::KEY_PAGEUP, KeyCode::KEY_PAGEDOWN,
        KeyCode::KEY_INSERT, KeyCode::KEY_DELETE,
    ]
    .iter()
    .map(|key| key.code())
    .collect()
});

pub fn is_trackable(key: KeyCode) -> bool {
    TRACKABLE_KEYS.contains(&key.code())
}

pub fn is_reset(key: KeyCode) -> bool {
    RESET_KEYS.contains(&key.code())
}

/// Статическая классификация клавиш с настраиваемым триггером
#[derive(Debug, Clone)]
pub struct KeyClassifier {
    trigger: KeyCode,
    reset_on_navigation: bool,
}

impl KeyClassifier {
    pub fn new(trigger: KeyCode, reset_on_navigation: bool) -> Self {
        Self {
            trigger,
            reset_on_navigation,
        }
    }

    pub fn trigger(&self) -> KeyCode {
        self.trigger
    }

    pub fn classify(&self, key: KeyCode) -> KeyClass {
        if key == self.trigger {
            KeyClass::Trigger
        } else if is_trackable(key) {
            KeyClass::Trackable
        } else if self.reset_on_navigation && is_reset(key) {
            KeyClass::Reset
        } else {
            KeyClass::Ignored
        }
    }

    /// Класс с учётом зажатых модификаторов: Ctrl+C, Super+L и т.п. не набор текста
    pub fn classify_with(&self, key: KeyCode, modifiers: &Modifiers) -> KeyClass {
        match self.classify(key) {
            KeyClass::Trackable if modifiers.is_shortcut() => {
                if self.reset_on_navigation {
                    KeyClass::Reset
                } else {
                    KeyClass::Ignored
                }
            }
            class => class,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> KeyClassifier {
        KeyClassifier::new(KeyCode::KEY_RIGHTSHIFT, true)
    }

    #[test]
    fn test_printable_keys_are_trackable() {
        let c = classifier();
        assert_eq!(c.classify(KeyCode::KEY_A), KeyClass::Trackable);
        assert_eq!(c.classify(KeyCode::KEY_0), KeyClass::Trackable);
        assert_eq!(c.classify(KeyCode::KEY_SLASH), KeyClass::Trackable);
        assert_eq!(c.classify(KeyCode::KEY_SPACE), KeyClass::Trackable);
        assert_eq!(c.classify(KeyCode::KEY_BACKSPACE), KeyClass::Trackable);
    }

    #[test]
    fn test_navigation_keys_reset() {
        let c = classifier();
        assert_eq!(c.classify(KeyCode::KEY_ENTER), KeyClass::Reset);
        assert_eq!(c.classify(KeyCode::KEY_TAB), KeyClass::Reset);
        assert_eq!(c.classify(KeyCode::KEY_ESC), KeyClass::Reset);
        assert_eq!(c.classify(KeyCode::KEY_LEFT), KeyClass::Reset);
        assert_eq!(c.classify(KeyCode::KEY_PAGEDOWN), KeyClass::Reset);
    }

    #[test]
    fn test_modifiers_and_function_keys_ignored() {
        let c = classifier();
        assert_eq!(c.classify(KeyCode::KEY_LEFTSHIFT), KeyClass::Ignored);
        assert_eq!(c.classify(KeyCode::KEY_LEFTCTRL), KeyClass::Ignored);
        assert_eq!(c.classify(KeyCode::KEY_F5), KeyClass::Ignored);
        assert_eq!(c.classify(KeyCode::KEY_CAPSLOCK), KeyClass::Ignored);
    }

    #[test]
    fn test_trigger_wins_over_other_classes() {
        assert_eq!(classifier().classify(KeyCode::KEY_RIGHTSHIFT), KeyClass::Trigger);

        let on_letter = KeyClassifier::new(KeyCode::KEY_GRAVE, true);
        assert_eq!(on_letter.classify(KeyCode::KEY_GRAVE), KeyClass::Trigger);
    }

    #[test]
    fn test_reset_disabled_turns_navigation_into_ignored() {
        let c = KeyClassifier::new(KeyCode::KEY_RIGHTSHIFT, false);
        assert_eq!(c.classify(KeyCode::KEY_ENTER), KeyClass::Ignored);
        assert_eq!(c.classify(KeyCode::KEY_A), KeyClass::Trackable);
    }

    #[test]
    fn test_shortcut_is_not_typing() {
        let c = classifier();
        let ctrl = Modifiers::new().with_ctrl(true);
        let shift = Modifiers::new().with_shift(true);

        assert_eq!(c.classify_with(KeyCode::KEY_C, &ctrl), KeyClass::Reset);
        assert_eq!(c.classify_with(KeyCode::KEY_C, &shift), KeyClass::Trackable);
        assert_eq!(c.classify_with(KeyCode::KEY_F5, &ctrl), KeyClass::Ignored);

        let passive = KeyClassifier::new(KeyCode::KEY_RIGHTSHIFT, false);
        assert_eq!(passive.classify_with(KeyCode::KEY_C, &ctrl), KeyClass::Ignored);
    }
}
