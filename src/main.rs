use anyhow::Result;
use clap::Parser;
use tokio::signal;
use tokio::sync::oneshot;
use tracing::{error, info, warn};
mod config;
mod error;
mod events;
mod mappings;
mod services;
mod utils;

use config::Config;
use services::{KeyboardListener, Switcher, VirtualDevice};
use utils::DeviceFinder;

#[derive(Parser, Debug)]
#[command(name = "relayout")]
#[command(about = "Исправление слова, набранного не в той раскладке, двойным нажатием правого Shift")]
struct Args {
    /// Путь к файлу конфигурации
    #[arg(short, long, default_value = "relayout.toml")]
    config: String,

    /// Устройство ввода (по умолчанию из конфигурации, обычно автопоиск)
    #[arg(short, long)]
    device: Option<String>,

    /// Подробный вывод: -v для info, -vv для debug
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Показать устройства ввода и выйти
    #[arg(long)]
    list: bool,

    /// Режим сухого запуска (события перенабора только логируются)
    #[arg(long)]
    dry_run: bool,
}

impl Args {
    fn log_level<'a>(&self, configured: &'a str) -> &'a str {
        match self.verbose {
            0 => configured,
            1 => "info",
            _ => "debug",
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.list {
        print_devices();
        return Ok(());
    }

    let config = Config::load(&args.config)?.with_device_override(args.device.clone());

    // Инициализация системы логирования
    init_tracing(args.log_level(&config.logging.level), &config.logging.format)?;

    info!("Запуск Relayout v{}", env!("CARGO_PKG_VERSION"));
    info!("Конфигурация загружена из: {}", args.config);

    if args.dry_run {
        warn!("Режим сухого запуска - перенабор только логируется");
    }

    // Проверка прав доступа
    utils::permissions::check_permissions(args.dry_run)?;

    // Устройство ввода ищется до создания виртуального, чтобы автопоиск его не увидел
    let listener = KeyboardListener::open(&config.input.device_path, &config.replay.virtual_device_name)?;
    let virtual_device = VirtualDevice::new(&config.replay.virtual_device_name, args.dry_run)?;
    info!("Перенабор через виртуальную клавиатуру '{}'", virtual_device.name());
    let mut switcher = Switcher::from_config(&config, virtual_device)?;

    info!("Слушаем {:?}", listener.device_path());

    let (exit_tx, exit_rx) = oneshot::channel();
    std::thread::Builder::new()
        .name("relayout-events".to_string())
        .spawn(move || {
            let result = listener.run(&mut switcher);
            // Получатель пропадает только при завершении main
            let _ = exit_tx.send(result);
        })?;

    tokio::select! {
        result = signal::ctrl_c() => {
            match result {
                Ok(()) => info!("Получен сигнал завершения (Ctrl+C)"),
                Err(e) => error!("Ошибка при ожидании сигнала завершения: {}", e),
            }
            info!("Relayout завершил работу");
            Ok(())
        }
        exit = exit_rx => {
            match exit {
                Ok(Ok(())) => Ok(()),
                Ok(Err(e)) => {
                    error!("Цикл обработки событий остановлен: {}", e);
                    Err(e.into())
                }
                Err(_) => Err(anyhow::anyhow!("Поток обработки событий завершился аварийно")),
            }
        }
    }
}

fn print_devices() {
    let devices = DeviceFinder::list_devices();

    if devices.is_empty() {
        println!("Устройства ввода не найдены (нужны права группы 'input')");
        return;
    }

    println!("{:<24} | {}", "PATH", "NAME");
    for device in devices {
        let marker = if device.has_required_keys { "" } else { " (не клавиатура)" };
        println!("{:<24} | {}{}", device.path.display(), device.name, marker);
    }
}

fn init_tracing(level: &str, format: &str) -> Result<()> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))?;

    let registry = tracing_subscriber::registry().with(filter);

    match format {
        "full" => registry.with(fmt::layer()).init(),
        _ => registry.with(fmt::layer().compact()).init(),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_overrides_configured_level() {
        let args = Args::parse_from(["relayout", "-vv", "--dry-run"]);
        assert_eq!(args.log_level("warn"), "debug");
        assert!(args.dry_run);

        let args = Args::parse_from(["relayout", "-v"]);
        assert_eq!(args.log_level("warn"), "info");

        let args = Args::parse_from(["relayout", "-c", "other.toml", "-d", "/dev/input/event4"]);
        assert_eq!(args.log_level("warn"), "warn");
        assert_eq!(args.config, "other.toml");
        assert_eq!(args.device.as_deref(), Some("/dev/input/event4"));
    }
}
