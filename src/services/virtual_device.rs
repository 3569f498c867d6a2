use crate::error::{RelayoutError, Result};
use crate::events::VirtualKeyEvent;
use crate::relayout_error;
use tracing::{debug, info};

// Коды типов событий input-подсистемы
const EV_SYN: i32 = 0x00;
const EV_KEY: i32 = 0x01;
const SYN_REPORT: i32 = 0;

/// Получатель синтетических нажатий.
///
/// Каждый вызов `send` должен дойти до ОС отдельным пакетом (событие + SYN_REPORT),
/// иначе приложение увидит нажатия пачкой и может потерять символы.
pub trait OutputSink {
    fn send(&mut self, event: VirtualKeyEvent) -> Result<()>;
}

pub struct VirtualDevice {
    device: Option<uinput::Device>,
    device_name: String,
    dry_run: bool,
}

impl VirtualDevice {
    pub fn new(device_name: &str, dry_run: bool) -> Result<Self> {
        info!("Инициализация VirtualDevice '{}' (dry_run: {})", device_name, dry_run);

        let device = if dry_run {
            None
        } else {
            Some(Self::create_virtual_device(device_name)?)
        };

        Ok(Self {
            device,
            device_name: device_name.to_string(),
            dry_run,
        })
    }

    fn create_virtual_device(device_name: &str) -> Result<uinput::Device> {
        info!("Создание виртуального устройства uinput '{}' для перенабора", device_name);

        let virtual_device = uinput::default()
            .and_then(|builder| builder.name(device_name))
            .and_then(|builder| builder.event(uinput::event::Keyboard::All))
            .and_then(|builder| builder.create())
            .map_err(|e| {
                RelayoutError::DeviceUnavailable(format!(
                    "Не удалось создать виртуальное устройство '{}': {}",
                    device_name, e
                ))
            })?;

        info!("Виртуальное устройство '{}' создано успешно", device_name);
        Ok(virtual_device)
    }

    pub fn name(&self) -> &str {
        &self.device_name
    }
}

impl OutputSink for VirtualDevice {
    fn send(&mut self, event: VirtualKeyEvent) -> Result<()> {
        if self.dry_run {
            info!("[DRY RUN] Виртуальное событие: {:?} {:?}", event.key_code, event.state);
            return Ok(());
        }

        let device = self
            .device
            .as_mut()
            .ok_or_else(|| relayout_error!(internal, "Виртуальное устройство '{}' не создано", self.device_name))?;

        let keycode = event.key_code.code() as i32;

        device.write(EV_KEY, keycode, event.state.value()).map_err(|e| {
            RelayoutError::SinkWrite(format!("событие клавиши {:?}: {}", event.key_code, e))
        })?;

        // Синхронизируем события
        device
            .write(EV_SYN, SYN_REPORT, 0)
            .map_err(|e| RelayoutError::SinkWrite(format!("синхронизация: {}", e)))?;

        debug!("Виртуальное событие {:?} {:?} отправлено", event.key_code, event.state);
        Ok(())
    }
}

impl Drop for VirtualDevice {
    fn drop(&mut self) {
        if !self.dry_run {
            info!("Закрытие виртуального устройства '{}'", self.device_name);
        }
    }
}
