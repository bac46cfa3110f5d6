use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_FILE_PREFIX: &str = "ecolog.log";

/// Keeps the non-blocking file writer alive for the process lifetime.
pub struct LogGuard {
    _file: Option<WorkerGuard>,
}

pub fn init_tracing(log_level: &str) -> LogGuard {
    let env_filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_layer = fmt::layer().with_target(true);

    let file_writer = file_logging_dir().and_then(|dir| {
        if let Err(err) = std::fs::create_dir_all(&dir) {
            eprintln!("failed to create log directory {dir}: {err}");
            return None;
        }
        let appender = RollingFileAppender::new(Rotation::DAILY, dir, LOG_FILE_PREFIX);
        Some(tracing_appender::non_blocking(appender))
    });

    match file_writer {
        Some((writer, guard)) => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(stdout_layer)
                .with(fmt::layer().with_writer(writer).with_ansi(false).with_target(true))
                .init();
            LogGuard { _file: Some(guard) }
        }
        None => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(stdout_layer)
                .init();
            LogGuard { _file: None }
        }
    }
}

fn file_logging_dir() -> Option<String> {
    let enabled = std::env::var("ENABLE_FILE_LOGS")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false);
    if !enabled {
        return None;
    }
    Some(std::env::var("LOG_DIR").unwrap_or_else(|_| "./logs".to_string()))
}
