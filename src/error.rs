use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayoutError {
    #[error("Ошибка конфигурации: {0}")]
    Config(#[from] anyhow::Error),

    #[error("Ошибка ввода-вывода: {0}")]
    Io(#[from] std::io::Error),

    #[error("Устройство недоступно: {0}")]
    DeviceUnavailable(String),

    #[error("Недостаточно прав доступа: {0}")]
    Permission(String),

    #[error("Не удалось записать событие в виртуальное устройство: {0}")]
    SinkWrite(String),

    #[error("Внутренняя ошибка: {0}")]
    Internal(String),
}

impl RelayoutError {
    pub fn device_unavailable<T>(msg: impl Into<String>) -> Result<T> {
        Err(RelayoutError::DeviceUnavailable(msg.into()))
    }
}

pub type Result<T> = std::result::Result<T, RelayoutError>;

// Удобные макросы для создания ошибок
#[macro_export]
macro_rules! relayout_error {
    (device_unavailable, $($arg:tt)*) => {
        $crate::error::RelayoutError::DeviceUnavailable(format!($($arg)*))
    };
    (permission, $($arg:tt)*) => {
        $crate::error::RelayoutError::Permission(format!($($arg)*))
    };
    (sink_write, $($arg:tt)*) => {
        $crate::error::RelayoutError::SinkWrite(format!($($arg)*))
    };
    (internal, $($arg:tt)*) => {
        $crate::error::RelayoutError::Internal(format!($($arg)*))
    };
}
