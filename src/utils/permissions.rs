use crate::error::{RelayoutError, Result};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use tracing::{info, warn};

const INPUT_DIR: &str = "/dev/input";
const UINPUT_DEVICE: &str = "/dev/uinput";

/// Проверить права доступа к необходимым ресурсам.
///
/// В режиме сухого запуска /dev/uinput не нужен.
pub fn check_permissions(dry_run: bool) -> Result<()> {
    info!("Проверка прав доступа...");

    check_input_devices_access()?;

    if dry_run {
        info!("Сухой запуск: проверка {} пропущена", UINPUT_DEVICE);
    } else {
        check_uinput_access()?;
    }

    check_not_root();

    info!("Проверка прав доступа завершена успешно");
    Ok(())
}

fn check_input_devices_access() -> Result<()> {
    if !Path::new(INPUT_DIR).exists() {
        return Err(RelayoutError::Permission(format!(
            "Директория {} не существует",
            INPUT_DIR
        )));
    }

    match fs::read_dir(INPUT_DIR) {
        Ok(_) => {
            info!("Доступ к {} подтвержден", INPUT_DIR);
            Ok(())
        }
        Err(e) => Err(RelayoutError::Permission(format!(
            "Нет доступа к {}: {}. Добавьте пользователя в группу 'input'",
            INPUT_DIR, e
        ))),
    }
}

fn check_uinput_access() -> Result<()> {
    if !Path::new(UINPUT_DEVICE).exists() {
        // Создание виртуального устройства всё равно сообщит точную ошибку
        warn!("{} не существует, возможно модуль uinput не загружен (sudo modprobe uinput)", UINPUT_DEVICE);
        return Ok(());
    }

    let metadata = fs::metadata(UINPUT_DEVICE).map_err(|e| {
        RelayoutError::Permission(format!(
            "Не удалось проверить права доступа к {}: {}",
            UINPUT_DEVICE, e
        ))
    })?;

    if !mode_allows_group_or_other(metadata.permissions().mode()) {
        return Err(RelayoutError::Permission(format!(
            "Нет прав доступа к {}. Добавьте пользователя в группу 'uinput' или 'input'",
            UINPUT_DEVICE
        )));
    }

    info!("Доступ к {} подтвержден", UINPUT_DEVICE);
    Ok(())
}

/// Права 660 или 666: доступ через группу или для всех
fn mode_allows_group_or_other(mode: u32) -> bool {
    mode & 0o006 != 0 || mode & 0o060 != 0
}

fn check_not_root() {
    match std::env::var("USER") {
        Ok(user) if user == "root" => {
            warn!("⚠️  Приложение запущено от имени root!");
            warn!("   Рекомендуется запускать от обычного пользователя в группах 'input' и 'uinput':");
            warn!("   sudo usermod -a -G input,uinput $USER");
        }
        Ok(user) => info!("Приложение запущено от имени пользователя: {}", user),
        Err(_) => warn!("Не удалось определить пользователя"),
    }
}
