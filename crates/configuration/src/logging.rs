use crate::error::ConfigError;
use crate::settings::LoggingConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the global subscriber: one stderr layer and one layer appending
/// to `<directory>/<file_name>`.
///
/// `RUST_LOG` takes precedence over the configured filter. The returned guard
/// flushes the file writer on drop and must be held for the life of the program.
pub fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard, ConfigError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.filter)
            .map_err(|e| ConfigError::Logging(format!("invalid filter '{}': {}", config.filter, e)))?,
    };

    let file_appender = file_appender(config)?;
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(
            fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .with_writer(file_writer),
        )
        .try_init()
        .map_err(|e| ConfigError::Logging(e.to_string()))?;

    Ok(guard)
}

/// Opens `<directory>/<file_name>` for appending, creating the directory if needed.
fn file_appender(config: &LoggingConfig) -> Result<RollingFileAppender, ConfigError> {
    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(&config.file_name)
        .build(&config.directory)
        .map_err(|e| {
            ConfigError::Logging(format!(
                "cannot open log file in {}: {}",
                config.directory.display(),
                e
            ))
        })
}
