use crate::debug_if_enabled;
use crate::events::KeyCode;
use crate::services::key_classifier::is_trackable;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

pub const DEFAULT_CAPACITY: usize = 100;
pub const MAX_CAPACITY: usize = 10_000;
pub const DEFAULT_TYPING_TIMEOUT: Duration = Duration::from_secs(3);

/// Нажатая печатная клавиша в том виде, в каком её набрали (без привязки к раскладке)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferedKey {
    pub code: KeyCode,
    pub shift_held: bool,
}

impl BufferedKey {
    pub fn new(code: KeyCode, shift_held: bool) -> Self {
        Self { code, shift_held }
    }

    pub fn is_space(&self) -> bool {
        self.code == KeyCode::KEY_SPACE
    }
}

/// Последнее слово и пробелы после него, в порядке набора
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaySpan {
    pub word: Vec<BufferedKey>,
    pub separator: Vec<BufferedKey>,
}

impl ReplaySpan {
    /// Сколько символов нужно стереть перед перенабором
    pub fn erase_count(&self) -> usize {
        self.word.len() + self.separator.len()
    }
}

/// Буфер недавно набранных клавиш.
///
/// Хранит только печатные клавиши, ограничен по размеру (старые вытесняются первыми)
/// и сбрасывается целиком, если между нажатиями прошло больше `typing_timeout`.
#[derive(Debug)]
pub struct CaptureBuffer {
    keys: VecDeque<BufferedKey>,
    capacity: usize,
    typing_timeout: Duration,
    last_record_time: Option<Instant>,
}

impl Default for CaptureBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_TYPING_TIMEOUT)
    }
}

impl CaptureBuffer {
    pub fn new(capacity: usize, typing_timeout: Duration) -> Self {
        Self {
            keys: VecDeque::new(),
            capacity,
            typing_timeout,
            last_record_time: None,
        }
    }

    /// Записать нажатие. Непечатные клавиши молча игнорируются, Backspace откатывает последнюю запись.
    pub fn record(&mut self, code: KeyCode, shift_held: bool, now: Instant) {
        if !is_trackable(code) {
            return;
        }

        if let Some(last) = self.last_record_time {
            if now.saturating_duration_since(last) > self.typing_timeout && !self.keys.is_empty() {
                debug_if_enabled!(
                    "Пауза больше {:?}: буфер ({} клавиш) очищен",
                    self.typing_timeout,
                    self.keys.len()
                );
                self.keys.clear();
            }
        }
        self.last_record_time = Some(now);

        if code == KeyCode::KEY_BACKSPACE {
            self.keys.pop_back();
            return;
        }

        self.keys.push_back(BufferedKey::new(code, shift_held));
        while self.keys.len() > self.capacity {
            self.keys.pop_front();
        }
    }

    /// Последнее слово без завершающих пробелов. Буфер не изменяется.
    pub fn extract_last_word(&self) -> Vec<BufferedKey> {
        let mut word: Vec<BufferedKey> = self
            .keys
            .iter()
            .rev()
            .skip_while(|key| key.is_space())
            .take_while(|key| !key.is_space())
            .copied()
            .collect();
        word.reverse();
        word
    }

    /// Последнее слово вместе с пробелами, набранными после него
    pub fn replay_span(&self) -> ReplaySpan {
        let word = self.extract_last_word();
        if word.is_empty() {
            return ReplaySpan::default();
        }

        let separator = self.keys.iter().rev().take_while(|key| key.is_space()).copied().collect();
        ReplaySpan { word, separator }
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    #[cfg(test)]
    pub fn keys(&self) -> impl Iterator<Item = &BufferedKey> {
        self.keys.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> BufferedKey {
        BufferedKey::new(code, false)
    }

    fn type_keys(buffer: &mut CaptureBuffer, codes: &[KeyCode], at: Instant) {
        for code in codes {
            buffer.record(*code, false, at);
        }
    }

    #[test]
    fn test_extract_last_word_after_space() {
        let mut buffer = CaptureBuffer::default();
        let t0 = Instant::now();
        type_keys(
            &mut buffer,
            &[KeyCode::KEY_A, KeyCode::KEY_B, KeyCode::KEY_SPACE, KeyCode::KEY_C, KeyCode::KEY_D],
            t0,
        );

        assert_eq!(buffer.extract_last_word(), vec![key(KeyCode::KEY_C), key(KeyCode::KEY_D)]);
        // Идемпотентно и без изменения буфера
        assert_eq!(buffer.extract_last_word(), vec![key(KeyCode::KEY_C), key(KeyCode::KEY_D)]);
        assert_eq!(buffer.len(), 5);
    }

    #[test]
    fn test_trailing_space_is_skipped() {
        let mut buffer = CaptureBuffer::default();
        let t0 = Instant::now();
        type_keys(
            &mut buffer,
            &[KeyCode::KEY_A, KeyCode::KEY_SPACE, KeyCode::KEY_H, KeyCode::KEY_I, KeyCode::KEY_SPACE],
            t0,
        );

        assert_eq!(buffer.extract_last_word(), vec![key(KeyCode::KEY_H), key(KeyCode::KEY_I)]);

        let span = buffer.replay_span();
        assert_eq!(span.separator, vec![key(KeyCode::KEY_SPACE)]);
        assert_eq!(span.erase_count(), 3);
    }

    #[test]
    fn test_spaces_only_yield_empty_word() {
        let mut buffer = CaptureBuffer::default();
        let t0 = Instant::now();
        type_keys(&mut buffer, &[KeyCode::KEY_SPACE, KeyCode::KEY_SPACE], t0);

        assert!(buffer.extract_last_word().is_empty());
        assert_eq!(buffer.replay_span(), ReplaySpan::default());
        assert!(CaptureBuffer::default().extract_last_word().is_empty());
    }

    #[test]
    fn test_extracted_word_is_space_free_suffix() {
        let mut buffer = CaptureBuffer::default();
        let t0 = Instant::now();
        let typed = [
            KeyCode::KEY_SPACE, KeyCode::KEY_Q, KeyCode::KEY_SPACE, KeyCode::KEY_SPACE,
            KeyCode::KEY_W, KeyCode::KEY_E, KeyCode::KEY_1, KeyCode::KEY_SPACE, KeyCode::KEY_SPACE,
        ];

        for (i, code) in typed.iter().enumerate() {
            buffer.record(*code, false, t0);
            let word = buffer.extract_last_word();
            let recorded: Vec<BufferedKey> = buffer.keys().copied().collect();

            assert!(word.iter().all(|k| !k.is_space()), "шаг {}", i);
            let span = buffer.replay_span();
            let mut tail = span.word.clone();
            tail.extend(span.separator.iter().copied());
            assert!(recorded.ends_with(&tail), "шаг {}", i);
        }
    }

    #[test]
    fn test_capacity_evicts_oldest_first() {
        let mut buffer = CaptureBuffer::new(3, DEFAULT_TYPING_TIMEOUT);
        let t0 = Instant::now();
        type_keys(
            &mut buffer,
            &[KeyCode::KEY_A, KeyCode::KEY_B, KeyCode::KEY_C, KeyCode::KEY_D, KeyCode::KEY_E],
            t0,
        );

        assert_eq!(buffer.len(), 3);
        let kept: Vec<KeyCode> = buffer.keys().map(|k| k.code).collect();
        assert_eq!(kept, vec![KeyCode::KEY_C, KeyCode::KEY_D, KeyCode::KEY_E]);
        // Слово, начало которого вытеснено, возвращается частично
        assert_eq!(buffer.extract_last_word().len(), 3);
    }

    #[test]
    fn test_default_capacity_never_exceeded() {
        let mut buffer = CaptureBuffer::default();
        let t0 = Instant::now();
        for _ in 0..250 {
            buffer.record(KeyCode::KEY_X, false, t0);
        }
        assert_eq!(buffer.len(), DEFAULT_CAPACITY);
    }

    #[test]
    fn test_typing_timeout_clears_history() {
        let mut buffer = CaptureBuffer::default();
        let t0 = Instant::now();
        type_keys(&mut buffer, &[KeyCode::KEY_A, KeyCode::KEY_B], t0);

        let later = t0 + Duration::from_millis(3100);
        buffer.record(KeyCode::KEY_C, false, later);

        assert_eq!(buffer.extract_last_word(), vec![key(KeyCode::KEY_C)]);
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_gap_at_timeout_keeps_history() {
        let mut buffer = CaptureBuffer::default();
        let t0 = Instant::now();
        buffer.record(KeyCode::KEY_A, false, t0);
        buffer.record(KeyCode::KEY_B, false, t0 + DEFAULT_TYPING_TIMEOUT);

        assert_eq!(buffer.len(), 2);
    }

    #[test]
    fn test_backspace_pops_tail() {
        let mut buffer = CaptureBuffer::default();
        let t0 = Instant::now();
        type_keys(&mut buffer, &[KeyCode::KEY_A, KeyCode::KEY_B, KeyCode::KEY_BACKSPACE], t0);

        assert_eq!(buffer.keys().copied().collect::<Vec<_>>(), vec![key(KeyCode::KEY_A)]);
    }

    #[test]
    fn test_backspace_on_empty_is_noop() {
        let mut buffer = CaptureBuffer::default();
        buffer.record(KeyCode::KEY_BACKSPACE, false, Instant::now());
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_backspace_refreshes_typing_time() {
        let mut buffer = CaptureBuffer::default();
        let t0 = Instant::now();
        type_keys(&mut buffer, &[KeyCode::KEY_A, KeyCode::KEY_B], t0);

        buffer.record(KeyCode::KEY_BACKSPACE, false, t0 + Duration::from_secs(2));
        buffer.record(KeyCode::KEY_C, false, t0 + Duration::from_secs(4));

        assert_eq!(
            buffer.extract_last_word(),
            vec![key(KeyCode::KEY_A), key(KeyCode::KEY_C)]
        );
    }

    #[test]
    fn test_non_trackable_is_ignored() {
        let mut buffer = CaptureBuffer::default();
        let t0 = Instant::now();
        buffer.record(KeyCode::KEY_A, false, t0);
        buffer.record(KeyCode::KEY_ENTER, false, t0 + Duration::from_secs(10));
        buffer.record(KeyCode::KEY_LEFTSHIFT, false, t0 + Duration::from_secs(10));

        // Непечатная клавиша не обновляет время последнего нажатия
        assert_eq!(buffer.len(), 1);
        buffer.record(KeyCode::KEY_B, false, t0 + Duration::from_secs(1));
        assert_eq!(buffer.len(), 2);
    }

    #[test]
    fn test_shift_state_is_kept() {
        let mut buffer = CaptureBuffer::default();
        let t0 = Instant::now();
        buffer.record(KeyCode::KEY_H, true, t0);
        buffer.record(KeyCode::KEY_I, false, t0);

        assert_eq!(
            buffer.extract_last_word(),
            vec![BufferedKey::new(KeyCode::KEY_H, true), key(KeyCode::KEY_I)]
        );
    }

    #[test]
    fn test_clear_keeps_last_record_time() {
        let mut buffer = CaptureBuffer::default();
        let t0 = Instant::now();
        buffer.record(KeyCode::KEY_A, false, t0);
        buffer.clear();
        assert!(buffer.is_empty());

        buffer.record(KeyCode::KEY_B, false, t0 + Duration::from_secs(1));
        buffer.record(KeyCode::KEY_C, false, t0 + Duration::from_secs(2));
        assert_eq!(buffer.len(), 2);
    }
}
