use crate::error::{RelayoutError, Result};
use crate::relayout_error;
use evdev::{Device, KeyCode};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace};

/// Подстроки имён устройств, которые точно не являются основной клавиатурой
const IGNORED_NAME_KEYWORDS: &[&str] = &[
    "mouse", "webcam", "audio", "video", "consumer", "control", "headset", "receiver", "solaar",
    "hotkeys", "button", "switch", "hda", "dock",
];

/// Клавиши, без которых устройство не считается клавиатурой
const REQUIRED_KEYS: [KeyCode; 4] = [KeyCode::KEY_SPACE, KeyCode::KEY_ENTER, KeyCode::KEY_A, KeyCode::KEY_Z];

/// Устройство ввода, увиденное при перечислении
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceCandidate {
    pub path: PathBuf,
    pub name: String,
    pub has_required_keys: bool,
}

impl DeviceCandidate {
    fn from_device(path: PathBuf, device: &Device) -> Self {
        let has_required_keys = device
            .supported_keys()
            .map_or(false, |keys| REQUIRED_KEYS.iter().all(|key| keys.contains(*key)));

        Self {
            path,
            name: device.name().unwrap_or("Unknown").to_string(),
            has_required_keys,
        }
    }
}

pub struct DeviceFinder;

impl DeviceFinder {
    /// Найти клавиатуру: явный путь или "auto".
    ///
    /// `own_device_name` исключает собственное виртуальное устройство, иначе
    /// исправитель услышал бы свой же перенабор.
    pub fn find_keyboard_device(device_path: &str, own_device_name: &str) -> Result<PathBuf> {
        if device_path != "auto" {
            let path = PathBuf::from(device_path);
            return if path.exists() {
                info!("Используется указанное устройство: {:?}", path);
                Ok(path)
            } else {
                RelayoutError::device_unavailable(format!("Указанное устройство не найдено: {:?}", path))
            };
        }

        info!("Автопоиск клавиатурного устройства...");
        let candidates = Self::scan()?;
        let selected = Self::select_candidate(&candidates, own_device_name).ok_or_else(|| {
            relayout_error!(
                device_unavailable,
                "Клавиатура не найдена среди {} устройств. Проверьте членство в группе 'input' или укажите --device",
                candidates.len()
            )
        })?;

        info!("Выбрана клавиатура: {} ({:?})", selected.name, selected.path);
        Ok(selected.path.clone())
    }

    /// Выбор клавиатуры из уже перечисленных устройств, по порядку путей
    pub fn select_candidate<'a>(
        candidates: &'a [DeviceCandidate],
        own_device_name: &str,
    ) -> Option<&'a DeviceCandidate> {
        let mut suitable: Vec<&DeviceCandidate> = candidates
            .iter()
            .filter(|c| c.has_required_keys && !Self::is_ignored(&c.name, own_device_name))
            .collect();
        suitable.sort_by(|a, b| a.path.cmp(&b.path));

        suitable
            .iter()
            .copied()
            .find(|c| {
                let name = c.name.to_lowercase();
                name.contains("keyboard") || name.contains("kbd")
            })
            .or_else(|| suitable.first().copied())
    }

    fn is_ignored(name: &str, own_device_name: &str) -> bool {
        if name == own_device_name {
            return true;
        }

        let name = name.to_lowercase();
        IGNORED_NAME_KEYWORDS.iter().any(|keyword| name.contains(keyword))
    }

    /// Все доступные устройства ввода, отсортированные по пути
    pub fn list_devices() -> Vec<DeviceCandidate> {
        let mut devices: Vec<DeviceCandidate> = evdev::enumerate()
            .map(|(path, device)| DeviceCandidate::from_device(path, &device))
            .collect();
        devices.sort_by(|a, b| a.path.cmp(&b.path));
        devices
    }

    fn scan() -> Result<Vec<DeviceCandidate>> {
        let input_dir = Path::new("/dev/input");
        let entries = std::fs::read_dir(input_dir).map_err(|e| {
            relayout_error!(permission, "Нет доступа к {}: {}", input_dir.display(), e)
        })?;

        let mut candidates = Vec::new();
        let mut denied = 0usize;

        for entry in entries {
            let path = entry?.path();
            let is_event_device = path
                .file_name()
                .and_then(|n| n.to_str())
                .map_or(false, |n| n.starts_with("event"));

            if !is_event_device {
                continue;
            }

            match Device::open(&path) {
                Ok(device) => {
                    let candidate = DeviceCandidate::from_device(path, &device);
                    debug!(
                        "Устройство {:?}: '{}' (клавиатурные клавиши: {})",
                        candidate.path, candidate.name, candidate.has_required_keys
                    );
                    candidates.push(candidate);
                }
                Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                    trace!("Нет прав на {:?}", path);
                    denied += 1;
                }
                Err(e) => trace!("Пропуск {:?}: {}", path, e),
            }
        }

        if candidates.is_empty() && denied > 0 {
            return Err(relayout_error!(
                permission,
                "Нет прав на чтение {} устройств в /dev/input. Добавьте пользователя в группу 'input'",
                denied
            ));
        }

        Ok(candidates)
    }
}
