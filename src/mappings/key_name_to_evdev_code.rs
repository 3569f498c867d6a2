use evdev::KeyCode;

/// Преобразование имён клавиш из конфигурации в evdev коды
/// Принимает как короткие имена ("rightshift", "super"), так и evdev-имена ("KEY_RIGHTSHIFT")
pub struct KeyNameToEvdevCode;

impl KeyNameToEvdevCode {
    /// Получить evdev код клавиши по её имени
    pub fn translate(key_name: &str) -> Result<KeyCode, String> {
        // "KEY_RIGHT_CTRL", "right-ctrl" и "right ctrl" сводятся к "rightctrl"
        let lowered = key_name.trim().to_lowercase();
        let normalized = lowered
            .strip_prefix("key_")
            .unwrap_or(&lowered)
            .replace(['-', '_', ' '], "");

        let code = match normalized.as_str() {
            // Буквенные клавиши
            "a" => KeyCode::KEY_A,
            "b" => KeyCode::KEY_B,
            "c" => KeyCode::KEY_C,
            "d" => KeyCode::KEY_D,
            "e" => KeyCode::KEY_E,
            "f" => KeyCode::KEY_F,
            "g" => KeyCode::KEY_G,
            "h" => KeyCode::KEY_H,
            "i" => KeyCode::KEY_I,
            "j" => KeyCode::KEY_J,
            "k" => KeyCode::KEY_K,
            "l" => KeyCode::KEY_L,
            "m" => KeyCode::KEY_M,
            "n" => KeyCode::KEY_N,
            "o" => KeyCode::KEY_O,
            "p" => KeyCode::KEY_P,
            "q" => KeyCode::KEY_Q,
            "r" => KeyCode::KEY_R,
            "s" => KeyCode::KEY_S,
            "t" => KeyCode::KEY_T,
            "u" => KeyCode::KEY_U,
            "v" => KeyCode::KEY_V,
            "w" => KeyCode::KEY_W,
            "x" => KeyCode::KEY_X,
            "y" => KeyCode::KEY_Y,
            "z" => KeyCode::KEY_Z,

            // Специальные клавиши
            "space" => KeyCode::KEY_SPACE,
            "enter" => KeyCode::KEY_ENTER,
            "esc" | "escape" => KeyCode::KEY_ESC,
            "backspace" => KeyCode::KEY_BACKSPACE,
            "tab" => KeyCode::KEY_TAB,
            "capslock" => KeyCode::KEY_CAPSLOCK,
            "scrolllock" => KeyCode::KEY_SCROLLLOCK,
            "pause" => KeyCode::KEY_PAUSE,
            "insert" => KeyCode::KEY_INSERT,
            "compose" | "menu" => KeyCode::KEY_COMPOSE,

            // Модификаторы: короткое имя означает левую клавишу
            "ctrl" | "leftctrl" | "lctrl" => KeyCode::KEY_LEFTCTRL,
            "rightctrl" | "rctrl" => KeyCode::KEY_RIGHTCTRL,
            "alt" | "leftalt" | "lalt" => KeyCode::KEY_LEFTALT,
            "rightalt" | "ralt" | "altgr" => KeyCode::KEY_RIGHTALT,
            "shift" | "leftshift" | "lshift" => KeyCode::KEY_LEFTSHIFT,
            "rightshift" | "rshift" => KeyCode::KEY_RIGHTSHIFT,
            "super" | "meta" | "leftmeta" | "lmeta" => KeyCode::KEY_LEFTMETA,
            "rightmeta" | "rmeta" => KeyCode::KEY_RIGHTMETA,

            // Функциональные клавиши
            "f1" => KeyCode::KEY_F1,
            "f2" => KeyCode::KEY_F2,
            "f3" => KeyCode::KEY_F3,
            "f4" => KeyCode::KEY_F4,
            "f5" => KeyCode::KEY_F5,
            "f6" => KeyCode::KEY_F6,
            "f7" => KeyCode::KEY_F7,
            "f8" => KeyCode::KEY_F8,
            "f9" => KeyCode::KEY_F9,
            "f10" => KeyCode::KEY_F10,
            "f11" => KeyCode::KEY_F11,
            "f12" => KeyCode::KEY_F12,

            _ => return Err(format!("Неизвестная клавиша: {}", key_name)),
        };

        Ok(code)
    }

    /// Проверить, является ли клавиша модификатором
    pub fn is_modifier(key: KeyCode) -> bool {
        matches!(
            key,
            KeyCode::KEY_LEFTCTRL
                | KeyCode::KEY_RIGHTCTRL
                | KeyCode::KEY_LEFTALT
                | KeyCode::KEY_RIGHTALT
                | KeyCode::KEY_LEFTSHIFT
                | KeyCode::KEY_RIGHTSHIFT
                | KeyCode::KEY_LEFTMETA
                | KeyCode::KEY_RIGHTMETA
        )
    }
}
