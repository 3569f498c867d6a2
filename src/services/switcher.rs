use crate::config::Config;
use crate::debug_if_enabled;
use crate::error::Result;
use crate::events::KeyEvent;
use crate::mappings::EvdevToKeyName;
use crate::services::capture_buffer::CaptureBuffer;
use crate::services::corrector::{BufferReplay, CorrectionStrategy};
use crate::services::key_classifier::{KeyClass, KeyClassifier};
use crate::services::trigger_detector::{TriggerDetector, TriggerSignal};
use crate::services::virtual_device::OutputSink;
use std::time::Duration;
use tracing::{error, info};

/// Что произошло с событием в главном цикле
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    Ignored,
    Recorded,
    Reset,
    TriggerArmed,
    TriggerReleased,
    /// `keys`: длина слова без пробелов после него (они стираются и набираются заново отдельно)
    Corrected { keys: usize },
    NothingToCorrect,
    CorrectionFailed,
}

/// Всё состояние исправителя: буфер, детектор жеста и виртуальная клавиатура.
///
/// Единственный владелец и единственный изменяющий код, поэтому блокировки не нужны.
pub struct Switcher<S: OutputSink> {
    classifier: KeyClassifier,
    buffer: CaptureBuffer,
    trigger: TriggerDetector,
    strategy: Box<dyn CorrectionStrategy + Send>,
    sink: S,
    clear_after_correction: bool,
}

impl<S: OutputSink> Switcher<S> {
    pub fn new(
        classifier: KeyClassifier,
        buffer: CaptureBuffer,
        trigger: TriggerDetector,
        strategy: Box<dyn CorrectionStrategy + Send>,
        sink: S,
    ) -> Self {
        Self {
            classifier,
            buffer,
            trigger,
            strategy,
            sink,
            clear_after_correction: false,
        }
    }

    /// Собрать исправитель по конфигурации
    pub fn from_config(config: &Config, sink: S) -> Result<Self> {
        let classifier = KeyClassifier::new(config.trigger_key()?, config.buffer.reset_on_navigation);
        let buffer = CaptureBuffer::new(
            config.buffer.capacity,
            Duration::from_millis(config.buffer.typing_timeout_ms),
        );
        let trigger = TriggerDetector::new(Duration::from_millis(config.trigger.double_press_ms));
        let strategy = BufferReplay::new(config.layout_chord()?, config.replay.timing());

        info!(
            "Триггер: двойное нажатие {:?} за {} мс, аккорд раскладки: {}",
            classifier.trigger(),
            config.trigger.double_press_ms,
            config.replay.layout_switch_chord.join("+")
        );

        Ok(Self::new(classifier, buffer, trigger, Box::new(strategy), sink)
            .with_clear_after_correction(config.buffer.clear_after_correction))
    }

    pub fn with_clear_after_correction(mut self, clear: bool) -> Self {
        self.clear_after_correction = clear;
        self
    }

    #[cfg(test)]
    pub fn buffer(&self) -> &CaptureBuffer {
        &self.buffer
    }

    #[cfg(test)]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Обработать одно событие до конца, включая возможное исправление
    pub fn handle_event(&mut self, event: &KeyEvent) -> EventOutcome {
        debug_if_enabled!("Событие клавиши: {}", event);

        match self.classifier.classify_with(event.key_code, &event.modifiers) {
            KeyClass::Trigger => self.handle_trigger(event),
            KeyClass::Trackable if event.state.is_down() => {
                self.buffer.record(event.key_code, event.modifiers.shift, event.timestamp);
                if self.trigger.is_armed() {
                    debug_if_enabled!("Набор между нажатиями триггера, ожидание отменено");
                    self.trigger.cancel();
                }
                EventOutcome::Recorded
            }
            KeyClass::Reset if event.state.is_down() => {
                if !self.buffer.is_empty() {
                    debug_if_enabled!("{:?}: буфер ({} клавиш) сброшен", event.key_code, self.buffer.len());
                }
                self.buffer.clear();
                self.trigger.cancel();
                EventOutcome::Reset
            }
            _ => EventOutcome::Ignored,
        }
    }

    fn handle_trigger(&mut self, event: &KeyEvent) -> EventOutcome {
        match self.trigger.on_trigger(event.state, event.timestamp) {
            TriggerSignal::Fire => self.correct_last_word(),
            TriggerSignal::Armed => EventOutcome::TriggerArmed,
            TriggerSignal::Released => EventOutcome::TriggerReleased,
            TriggerSignal::Ignored => EventOutcome::Ignored,
        }
    }

    fn correct_last_word(&mut self) -> EventOutcome {
        let span = self.buffer.replay_span();

        if span.word.is_empty() {
            info!("Буфер пуст или слово не найдено, исправлять нечего");
            return EventOutcome::NothingToCorrect;
        }

        info!(
            "Перенабор: '{}' ({} клавиш)",
            EvdevToKeyName::decode_keys(&span.word),
            span.word.len()
        );

        if let Err(e) = self.strategy.correct(&span, &mut self.sink) {
            error!("Исправление прервано: {}", e);
            return EventOutcome::CorrectionFailed;
        }

        if self.clear_after_correction {
            self.buffer.clear();
        }

        EventOutcome::Corrected { keys: span.word.len() }
    }
}
