use crate::error::Result;
use crate::events::{KeyCode, VirtualKeyEvent};
use crate::services::capture_buffer::{BufferedKey, ReplaySpan};
use crate::services::virtual_device::OutputSink;
use crate::trace_if_enabled;
use smallvec::{smallvec, SmallVec};
use std::thread;
use std::time::Duration;

/// Аккорд переключения раскладки; обычно 2-3 клавиши
pub type LayoutChord = SmallVec<[KeyCode; 4]>;

pub fn default_layout_chord() -> LayoutChord {
    smallvec![KeyCode::KEY_LEFTMETA, KeyCode::KEY_SPACE]
}

/// Задержки перенабора. Это контракт с принимающим приложением, а не оптимизационный параметр:
/// без пауз часть символов теряется.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayTiming {
    /// После каждой пары нажатие/отпускание Backspace
    pub backspace_delay: Duration,
    /// До аккорда, между нажатием и отпусканием и после него
    pub chord_delay: Duration,
    /// Ожидание применения новой раскладки перед перенабором
    pub layout_settle: Duration,
    /// После каждой перенабранной клавиши
    pub key_delay: Duration,
}

impl Default for ReplayTiming {
    fn default() -> Self {
        Self {
            backspace_delay: Duration::from_millis(2),
            chord_delay: Duration::from_millis(20),
            layout_settle: Duration::from_millis(100),
            key_delay: Duration::from_millis(5),
        }
    }
}

impl ReplayTiming {
    #[cfg(test)]
    pub fn zero() -> Self {
        Self {
            backspace_delay: Duration::ZERO,
            chord_delay: Duration::ZERO,
            layout_settle: Duration::ZERO,
            key_delay: Duration::ZERO,
        }
    }
}

/// Способ исправить последнее слово
pub trait CorrectionStrategy {
    /// Выполнить исправление. Ошибка записи прерывает последовательность без отката.
    fn correct(&self, span: &ReplaySpan, sink: &mut dyn OutputSink) -> Result<()>;
}

/// Исправление прямым перенабором: стереть, переключить раскладку, набрать заново те же клавиши
#[derive(Debug, Clone)]
pub struct BufferReplay {
    chord: LayoutChord,
    timing: ReplayTiming,
}

impl Default for BufferReplay {
    fn default() -> Self {
        Self::new(default_layout_chord(), ReplayTiming::default())
    }
}

impl BufferReplay {
    pub fn new(chord: LayoutChord, timing: ReplayTiming) -> Self {
        Self { chord, timing }
    }

    fn tap(sink: &mut dyn OutputSink, key: KeyCode) -> Result<()> {
        sink.send(VirtualKeyEvent::press(key))?;
        sink.send(VirtualKeyEvent::release(key))
    }

    fn erase(&self, sink: &mut dyn OutputSink, count: usize) -> Result<()> {
        for _ in 0..count {
            Self::tap(sink, KeyCode::KEY_BACKSPACE)?;
            pause(self.timing.backspace_delay);
        }
        Ok(())
    }

    fn switch_layout(&self, sink: &mut dyn OutputSink) -> Result<()> {
        pause(self.timing.chord_delay);

        for key in &self.chord {
            sink.send(VirtualKeyEvent::press(*key))?;
        }
        pause(self.timing.chord_delay);

        for key in self.chord.iter().rev() {
            sink.send(VirtualKeyEvent::release(*key))?;
        }
        pause(self.timing.chord_delay);

        pause(self.timing.layout_settle);
        Ok(())
    }

    fn retype(&self, sink: &mut dyn OutputSink, keys: &[BufferedKey]) -> Result<()> {
        for key in keys {
            trace_if_enabled!("Перенабор {:?} (shift: {})", key.code, key.shift_held);

            if key.shift_held {
                sink.send(VirtualKeyEvent::press(KeyCode::KEY_LEFTSHIFT))?;
                Self::tap(sink, key.code)?;
                sink.send(VirtualKeyEvent::release(KeyCode::KEY_LEFTSHIFT))?;
            } else {
                Self::tap(sink, key.code)?;
            }
            pause(self.timing.key_delay);
        }
        Ok(())
    }
}

impl CorrectionStrategy for BufferReplay {
    fn correct(&self, span: &ReplaySpan, sink: &mut dyn OutputSink) -> Result<()> {
        if span.word.is_empty() {
            return Ok(());
        }

        self.erase(sink, span.erase_count())?;
        self.switch_layout(sink)?;
        self.retype(sink, &span.word)?;
        self.retype(sink, &span.separator)
    }
}

fn pause(duration: Duration) {
    if !duration.is_zero() {
        thread::sleep(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::KeyState;
    use crate::services::virtual_device::testing::RecordingSink;

    fn press(key: KeyCode) -> VirtualKeyEvent {
        VirtualKeyEvent::press(key)
    }

    fn release(key: KeyCode) -> VirtualKeyEvent {
        VirtualKeyEvent::release(key)
    }

    fn span(word: &[BufferedKey], separator: &[BufferedKey]) -> ReplaySpan {
        ReplaySpan {
            word: word.to_vec(),
            separator: separator.to_vec(),
        }
    }

    #[test]
    fn test_plain_word_sequence() {
        let replay = BufferReplay::new(default_layout_chord(), ReplayTiming::zero());
        let mut sink = RecordingSink::default();
        let word = [
            BufferedKey::new(KeyCode::KEY_H, false),
            BufferedKey::new(KeyCode::KEY_I, false),
        ];

        replay.correct(&span(&word, &[]), &mut sink).unwrap();

        assert_eq!(
            sink.events,
            vec![
                press(KeyCode::KEY_BACKSPACE),
                release(KeyCode::KEY_BACKSPACE),
                press(KeyCode::KEY_BACKSPACE),
                release(KeyCode::KEY_BACKSPACE),
                press(KeyCode::KEY_LEFTMETA),
                press(KeyCode::KEY_SPACE),
                release(KeyCode::KEY_SPACE),
                release(KeyCode::KEY_LEFTMETA),
                press(KeyCode::KEY_H),
                release(KeyCode::KEY_H),
                press(KeyCode::KEY_I),
                release(KeyCode::KEY_I),
            ]
        );
    }

    #[test]
    fn test_shifted_key_is_wrapped_in_shift() {
        let replay = BufferReplay::new(smallvec![KeyCode::KEY_LEFTALT, KeyCode::KEY_LEFTSHIFT], ReplayTiming::zero());
        let mut sink = RecordingSink::default();
        let word = [BufferedKey::new(KeyCode::KEY_Q, true)];

        replay.correct(&span(&word, &[]), &mut sink).unwrap();

        assert_eq!(
            &sink.events[2..],
            &[
                press(KeyCode::KEY_LEFTALT),
                press(KeyCode::KEY_LEFTSHIFT),
                release(KeyCode::KEY_LEFTSHIFT),
                release(KeyCode::KEY_LEFTALT),
                press(KeyCode::KEY_LEFTSHIFT),
                press(KeyCode::KEY_Q),
                release(KeyCode::KEY_Q),
                release(KeyCode::KEY_LEFTSHIFT),
            ]
        );
    }

    #[test]
    fn test_separator_is_erased_and_retyped() {
        let replay = BufferReplay::new(default_layout_chord(), ReplayTiming::zero());
        let mut sink = RecordingSink::default();
        let word = [BufferedKey::new(KeyCode::KEY_A, false)];
        let separator = [BufferedKey::new(KeyCode::KEY_SPACE, false)];

        replay.correct(&span(&word, &separator), &mut sink).unwrap();

        let backspaces = sink
            .events
            .iter()
            .filter(|e| e.key_code == KeyCode::KEY_BACKSPACE && e.state == KeyState::Pressed)
            .count();
        assert_eq!(backspaces, 2);
        assert_eq!(
            &sink.events[sink.events.len() - 4..],
            &[
                press(KeyCode::KEY_A),
                release(KeyCode::KEY_A),
                press(KeyCode::KEY_SPACE),
                release(KeyCode::KEY_SPACE),
            ]
        );
    }

    #[test]
    fn test_empty_word_emits_nothing() {
        let replay = BufferReplay::default();
        let mut sink = RecordingSink::default();

        replay.correct(&ReplaySpan::default(), &mut sink).unwrap();
        assert!(sink.events.is_empty());
    }

    #[test]
    fn test_write_failure_aborts_sequence() {
        let replay = BufferReplay::new(default_layout_chord(), ReplayTiming::zero());
        let mut sink = RecordingSink::failing_after(3);
        let word = [
            BufferedKey::new(KeyCode::KEY_H, false),
            BufferedKey::new(KeyCode::KEY_I, false),
        ];

        assert!(replay.correct(&span(&word, &[]), &mut sink).is_err());
        assert_eq!(sink.events.len(), 3);
    }

    #[test]
    fn test_default_timing_really_waits() {
        let replay = BufferReplay::default();
        let mut sink = RecordingSink::default();
        let word = [BufferedKey::new(KeyCode::KEY_A, false)];

        let started = std::time::Instant::now();
        replay.correct(&span(&word, &[]), &mut sink).unwrap();

        // 2 + 3 * 20 + 100 + 5 мс
        assert!(started.elapsed() >= Duration::from_millis(167));
    }
}
