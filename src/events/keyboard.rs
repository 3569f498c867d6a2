use evdev::EventType;
use std::fmt;
use std::time::Instant;

/// Код клавиши (evdev коды)
pub use evdev::KeyCode;

/// Состояние клавиши
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyState {
    Pressed,
    Released,
    Repeat,
}

impl KeyState {
    /// Значение поля `value` в событии EV_KEY
    pub fn from_value(value: i32) -> Option<Self> {
        match value {
            0 => Some(KeyState::Released),
            1 => Some(KeyState::Pressed),
            2 => Some(KeyState::Repeat),
            _ => None,
        }
    }

    pub fn value(&self) -> i32 {
        match self {
            KeyState::Released => 0,
            KeyState::Pressed => 1,
            KeyState::Repeat => 2,
        }
    }

    /// Клавиша удерживается (нажатие или автоповтор)
    pub fn is_down(&self) -> bool {
        !matches!(self, KeyState::Released)
    }
}

/// Модификаторы клавиш
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub super_key: bool,
}

impl Modifiers {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn with_ctrl(mut self, ctrl: bool) -> Self {
        self.ctrl = ctrl;
        self
    }

    #[cfg(test)]
    pub fn with_shift(mut self, shift: bool) -> Self {
        self.shift = shift;
        self
    }

    /// Зажат модификатор сочетания клавиш: такой ввод не является набором текста
    pub fn is_shortcut(&self) -> bool {
        self.ctrl || self.alt || self.super_key
    }

    pub fn to_vec(&self) -> Vec<&'static str> {
        let mut result = Vec::new();
        if self.ctrl { result.push("ctrl"); }
        if self.alt { result.push("alt"); }
        if self.shift { result.push("shift"); }
        if self.super_key { result.push("super"); }
        result
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let modifiers = self.to_vec();
        if modifiers.is_empty() {
            write!(f, "none")
        } else {
            write!(f, "{}", modifiers.join("+"))
        }
    }
}

/// Событие клавиатуры от физического устройства
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key_code: KeyCode,
    pub state: KeyState,
    /// Модификаторы, зажатые с учётом этого события
    pub modifiers: Modifiers,
    pub timestamp: Instant,
}

impl KeyEvent {
    pub fn new(key_code: KeyCode, state: KeyState, timestamp: Instant) -> Self {
        Self {
            key_code,
            state,
            modifiers: Modifiers::new(),
            timestamp,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Собрать событие из сырых полей evdev.
    ///
    /// Всё, что не является EV_KEY (SYN, MSC, LED), и неизвестные значения
    /// `value` отбрасываются.
    pub fn from_raw(event_type: EventType, code: u16, value: i32, timestamp: Instant) -> Option<Self> {
        if event_type != EventType::KEY {
            return None;
        }

        let state = KeyState::from_value(value)?;
        Some(Self::new(KeyCode::new(code), state, timestamp))
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}[{}] {:?} ({}мс назад)",
            self.key_code,
            self.modifiers,
            self.state,
            self.timestamp.elapsed().as_millis()
        )
    }
}
