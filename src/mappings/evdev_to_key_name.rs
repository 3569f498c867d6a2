use crate::services::capture_buffer::BufferedKey;
use evdev::KeyCode;

/// Преобразование evdev::KeyCode в символы US-раскладки.
/// Используется только для логов: реальную раскладку применяет ОС при перенаборе.
pub struct EvdevToKeyName;

impl EvdevToKeyName {
    /// Символ клавиши без Shift
    pub fn translate(key: KeyCode) -> Option<char> {
        match key {
            // Буквенные клавиши
            KeyCode::KEY_A => Some('a'),
            KeyCode::KEY_B => Some('b'),
            KeyCode::KEY_C => Some('c'),
            KeyCode::KEY_D => Some('d'),
            KeyCode::KEY_E => Some('e'),
            KeyCode::KEY_F => Some('f'),
            KeyCode::KEY_G => Some('g'),
            KeyCode::KEY_H => Some('h'),
            KeyCode::KEY_I => Some('i'),
            KeyCode::KEY_J => Some('j'),
            KeyCode::KEY_K => Some('k'),
            KeyCode::KEY_L => Some('l'),
            KeyCode::KEY_M => Some('m'),
            KeyCode::KEY_N => Some('n'),
            KeyCode::KEY_O => Some('o'),
            KeyCode::KEY_P => Some('p'),
            KeyCode::KEY_Q => Some('q'),
            KeyCode::KEY_R => Some('r'),
            KeyCode::KEY_S => Some('s'),
            KeyCode::KEY_T => Some('t'),
            KeyCode::KEY_U => Some('u'),
            KeyCode::KEY_V => Some('v'),
            KeyCode::KEY_W => Some('w'),
            KeyCode::KEY_X => Some('x'),
            KeyCode::KEY_Y => Some('y'),
            KeyCode::KEY_Z => Some('z'),

            // Цифровые клавиши
            KeyCode::KEY_1 => Some('1'),
            KeyCode::KEY_2 => Some('2'),
            KeyCode::KEY_3 => Some('3'),
            KeyCode::KEY_4 => Some('4'),
            KeyCode::KEY_5 => Some('5'),
            KeyCode::KEY_6 => Some('6'),
            KeyCode::KEY_7 => Some('7'),
            KeyCode::KEY_8 => Some('8'),
            KeyCode::KEY_9 => Some('9'),
            KeyCode::KEY_0 => Some('0'),

            // Пунктуация
            KeyCode::KEY_MINUS => Some('-'),
            KeyCode::KEY_EQUAL => Some('='),
            KeyCode::KEY_LEFTBRACE => Some('['),
            KeyCode::KEY_RIGHTBRACE => Some(']'),
            KeyCode::KEY_BACKSLASH => Some('\\'),
            KeyCode::KEY_SEMICOLON => Some(';'),
            KeyCode::KEY_APOSTROPHE => Some('\''),
            KeyCode::KEY_GRAVE => Some('`'),
            KeyCode::KEY_COMMA => Some(','),
            KeyCode::KEY_DOT => Some('.'),
            KeyCode::KEY_SLASH => Some('/'),

            KeyCode::KEY_SPACE => Some(' '),

            _ => None,
        }
    }

    /// Символ клавиши с учётом Shift
    pub fn translate_shifted(key: KeyCode, shift: bool) -> Option<char> {
        let plain = Self::translate(key)?;
        if !shift {
            return Some(plain);
        }

        let shifted = match plain {
            c if c.is_ascii_alphabetic() => c.to_ascii_uppercase(),
            '1' => '!',
            '2' => '@',
            '3' => '#',
            '4' => '$',
            '5' => '%',
            '6' => '^',
            '7' => '&',
            '8' => '*',
            '9' => '(',
            '0' => ')',
            '-' => '_',
            '=' => '+',
            '[' => '{',
            ']' => '}',
            '\\' => '|',
            ';' => ':',
            '\'' => '"',
            ',' => '<',
            '.' => '>',
            '/' => '?',
            '`' => '~',
            c => c,
        };

        Some(shifted)
    }

    /// Читаемое представление буфера для логов; неизвестные клавиши выводятся как '?'
    pub fn decode_keys(keys: &[BufferedKey]) -> String {
        keys.iter()
            .map(|key| Self::translate_shifted(key.code, key.shift_held).unwrap_or('?'))
            .collect()
    }
}
