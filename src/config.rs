use crate::events::KeyCode;
use crate::mappings::KeyNameToEvdevCode;
use crate::services::capture_buffer::{DEFAULT_CAPACITY, DEFAULT_TYPING_TIMEOUT, MAX_CAPACITY};
use crate::services::corrector::{LayoutChord, ReplayTiming};
use crate::services::key_classifier::is_trackable;
use crate::services::trigger_detector::DEFAULT_DOUBLE_PRESS_WINDOW;
use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const ENV_PREFIX: &str = "RELAYOUT_";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub logging: LoggingConfig,
    pub input: InputConfig,
    pub trigger: TriggerConfig,
    pub buffer: BufferConfig,
    pub replay: ReplayConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InputConfig {
    /// Путь к устройству или "auto"
    pub device_path: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TriggerConfig {
    pub key: String,
    pub double_press_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BufferConfig {
    pub capacity: usize,
    pub typing_timeout_ms: u64,
    /// Enter, Tab, Esc, стрелки и сочетания клавиш сбрасывают буфер
    pub reset_on_navigation: bool,
    /// false: буфер переживает исправление, повторный жест переключает раскладку дальше
    pub clear_after_correction: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReplayConfig {
    pub virtual_device_name: String,
    pub layout_switch_chord: Vec<String>,
    pub backspace_delay_ms: u64,
    pub chord_delay_ms: u64,
    pub layout_settle_ms: u64,
    pub key_delay_ms: u64,
}

impl ReplayConfig {
    pub fn timing(&self) -> ReplayTiming {
        ReplayTiming {
            backspace_delay: Duration::from_millis(self.backspace_delay_ms),
            chord_delay: Duration::from_millis(self.chord_delay_ms),
            layout_settle: Duration::from_millis(self.layout_settle_ms),
            key_delay: Duration::from_millis(self.key_delay_ms),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let timing = ReplayTiming::default();
        Self {
            logging: LoggingConfig {
                level: "warn".to_string(),
                format: "compact".to_string(),
            },
            input: InputConfig {
                device_path: "auto".to_string(),
            },
            trigger: TriggerConfig {
                key: "rightshift".to_string(),
                double_press_ms: DEFAULT_DOUBLE_PRESS_WINDOW.as_millis() as u64,
            },
            buffer: BufferConfig {
                capacity: DEFAULT_CAPACITY,
                typing_timeout_ms: DEFAULT_TYPING_TIMEOUT.as_millis() as u64,
                reset_on_navigation: true,
                clear_after_correction: false,
            },
            replay: ReplayConfig {
                virtual_device_name: "Relayout Virtual Keyboard".to_string(),
                layout_switch_chord: vec!["leftmeta".to_string(), "space".to_string()],
                backspace_delay_ms: timing.backspace_delay.as_millis() as u64,
                chord_delay_ms: timing.chord_delay.as_millis() as u64,
                layout_settle_ms: timing.layout_settle.as_millis() as u64,
                key_delay_ms: timing.key_delay.as_millis() as u64,
            },
        }
    }
}

impl Config {
    /// Значения по умолчанию, поверх них TOML-файл (если есть), поверх него переменные RELAYOUT_*
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment
            .extract()
            .with_context(|| format!("Не удалось загрузить конфигурацию из {:?}", config_path))?;

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        // Валидация настроек логирования
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Неверный уровень логирования: {}", self.logging.level),
        }

        match self.logging.format.as_str() {
            "compact" | "full" => {}
            _ => anyhow::bail!("Неверный формат логирования: {}", self.logging.format),
        }

        if self.input.device_path.trim().is_empty() {
            anyhow::bail!("input.device_path не может быть пустым (используйте \"auto\")");
        }

        // Валидация триггера
        let trigger = self.trigger_key()?;
        if is_trackable(trigger) {
            anyhow::bail!(
                "Печатная клавиша '{}' не может быть триггером: она нужна для набора текста",
                self.trigger.key
            );
        }

        if self.trigger.double_press_ms == 0 {
            anyhow::bail!("double_press_ms должно быть больше 0");
        }

        // Валидация буфера
        if self.buffer.capacity == 0 || self.buffer.capacity > MAX_CAPACITY {
            anyhow::bail!(
                "buffer.capacity должно быть от 1 до {}, получено {}",
                MAX_CAPACITY,
                self.buffer.capacity
            );
        }

        if self.buffer.typing_timeout_ms == 0 {
            anyhow::bail!("typing_timeout_ms должно быть больше 0");
        }

        // Валидация перенабора
        if self.replay.virtual_device_name.trim().is_empty() {
            anyhow::bail!("replay.virtual_device_name не может быть пустым");
        }

        let chord = self.layout_chord()?;
        if chord.contains(&trigger) {
            anyhow::bail!("Аккорд переключения раскладки не должен содержать клавишу-триггер");
        }

        // Все клавиши аккорда, кроме последней, удерживаются как модификаторы
        if let Some((_, held)) = chord.split_last() {
            if let Some(key) = held.iter().find(|key| !KeyNameToEvdevCode::is_modifier(**key)) {
                anyhow::bail!("В аккорде {:?} должна быть последней клавишей", key);
            }
        }

        Ok(())
    }

    pub fn trigger_key(&self) -> Result<KeyCode> {
        KeyNameToEvdevCode::translate(&self.trigger.key)
            .map_err(|e| anyhow::anyhow!("trigger.key: {}", e))
    }

    pub fn layout_chord(&self) -> Result<LayoutChord> {
        if self.replay.layout_switch_chord.is_empty() {
            anyhow::bail!("layout_switch_chord не может быть пустым");
        }

        self.replay
            .layout_switch_chord
            .iter()
            .enumerate()
            .map(|(i, name)| {
                KeyNameToEvdevCode::translate(name)
                    .map_err(|e| anyhow::anyhow!("layout_switch_chord[{}]: {}", i, e))
            })
            .collect()
    }

    /// Явный путь из CLI перекрывает конфигурацию
    pub fn with_device_override(mut self, device: Option<String>) -> Self {
        if let Some(path) = device {
            self.input.device_path = path;
        }
        self
    }
}
