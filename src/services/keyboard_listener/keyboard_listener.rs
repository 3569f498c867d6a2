use crate::error::{RelayoutError, Result};
use crate::events::KeyEvent;
use crate::services::switcher::Switcher;
use crate::services::virtual_device::OutputSink;
use crate::utils::DeviceFinder;
use evdev::Device;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, warn};

use super::modifier_state::ModifierState;

/// Пассивный читатель физической клавиатуры.
///
/// Устройство не захватывается: события продолжают идти в приложения как обычно,
/// а мы только наблюдаем за ними.
pub struct KeyboardListener {
    device: Device,
    device_path: PathBuf,
    modifier_state: ModifierState,
}

impl KeyboardListener {
    pub fn open(device_path: &str, own_device_name: &str) -> Result<Self> {
        info!("Инициализация KeyboardListener");

        let device_path = DeviceFinder::find_keyboard_device(device_path, own_device_name)?;

        let mut device = Device::open(&device_path).map_err(|e| {
            if e.kind() == ErrorKind::PermissionDenied {
                RelayoutError::Permission(format!(
                    "Нет прав на чтение {:?}: {}. Добавьте пользователя в группу 'input'",
                    device_path, e
                ))
            } else {
                RelayoutError::DeviceUnavailable(format!(
                    "Не удалось открыть устройство {:?}: {}",
                    device_path, e
                ))
            }
        })?;

        Self::log_device(&device);
        Self::probe_grab(&mut device, &device_path);

        Ok(Self {
            device,
            device_path,
            modifier_state: ModifierState::new(),
        })
    }

    pub fn device_path(&self) -> &Path {
        &self.device_path
    }

    /// Читать события до ошибки чтения. Каждое событие обрабатывается до конца,
    /// включая перенабор, прежде чем читается следующее.
    pub fn run<S: OutputSink>(mut self, switcher: &mut Switcher<S>) -> Result<()> {
        info!("KeyboardListener запущен, читаем события {:?}", self.device_path);

        loop {
            let events = match self.device.fetch_events() {
                Ok(events) => events,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    error!("Ошибка чтения событий из {:?}: {}", self.device_path, e);
                    return Err(RelayoutError::Io(e));
                }
            };

            for event in events {
                let Some(key_event) =
                    KeyEvent::from_raw(event.event_type(), event.code(), event.value(), Instant::now())
                else {
                    continue;
                };

                self.modifier_state.update_key(key_event.key_code, key_event.state);
                let key_event = key_event.with_modifiers(self.modifier_state.to_modifiers());

                switcher.handle_event(&key_event);
            }
        }
    }

    fn log_device(device: &Device) {
        info!("Устройство: {}", device.name().unwrap_or("Unknown"));
        debug!("Физический путь: {:?}", device.physical_path());
        debug!("Уникальный ID: {:?}", device.unique_name());
    }

    /// Кратковременный захват только для диагностики: если устройство уже
    /// захвачено другим процессом, события до нас не дойдут.
    fn probe_grab(device: &mut Device, device_path: &Path) {
        match device.grab() {
            Ok(()) => {
                if let Err(e) = device.ungrab() {
                    error!("Не удалось освободить устройство {:?}: {}", device_path, e);
                }
            }
            Err(e) => {
                warn!(
                    "Устройство {} захвачено другим процессом ({}), события могут не поступать",
                    device_path.display(),
                    e
                );
                warn!("Закройте программы, перехватывающие клавиатуру (keyd, kmonad, interception)");
            }
        }
    }
}
