use crate::events::KeyState;
use std::time::{Duration, Instant};

pub const DEFAULT_DOUBLE_PRESS_WINDOW: Duration = Duration::from_millis(500);

/// Результат обработки события клавиши-триггера
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerSignal {
    /// Первое нажатие записано, ждём второе
    Armed,
    /// Двойное нажатие: пора исправлять слово
    Fire,
    /// Клавиша отпущена, следующее нажатие может засчитаться
    Released,
    /// Автоповтор удерживаемой клавиши
    Ignored,
}

/// Детектор двойного нажатия.
///
/// Второе нажатие засчитывается только если клавиша была честно отпущена после первого:
/// иначе поток автоповтора от зажатого Shift выглядел бы как серия двойных нажатий.
#[derive(Debug)]
pub struct TriggerDetector {
    window: Duration,
    last_press_time: Option<Instant>,
    released_since_press: bool,
}

impl Default for TriggerDetector {
    fn default() -> Self {
        Self::new(DEFAULT_DOUBLE_PRESS_WINDOW)
    }
}

impl TriggerDetector {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_press_time: None,
            released_since_press: true,
        }
    }

    pub fn on_trigger(&mut self, state: KeyState, now: Instant) -> TriggerSignal {
        match state {
            KeyState::Pressed => {
                let within_window = self
                    .last_press_time
                    .map(|last| now.saturating_duration_since(last) < self.window)
                    .unwrap_or(false);
                let qualifies = within_window && self.released_since_press;

                self.released_since_press = false;

                if qualifies {
                    self.last_press_time = None;
                    TriggerSignal::Fire
                } else {
                    self.last_press_time = Some(now);
                    TriggerSignal::Armed
                }
            }
            KeyState::Released => {
                self.released_since_press = true;
                TriggerSignal::Released
            }
            KeyState::Repeat => TriggerSignal::Ignored,
        }
    }

    /// Отменить ожидание второго нажатия (между нажатиями был набор текста)
    pub fn cancel(&mut self) {
        self.last_press_time = None;
    }

    /// Первое нажатие записано и ещё может образовать пару
    pub fn is_armed(&self) -> bool {
        self.last_press_time.is_some()
    }
}
