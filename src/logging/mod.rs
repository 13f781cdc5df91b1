//! Logging setup: `EnvFilter`, a console layer on stderr and an optional
//! daily rolling file layer.

pub mod config;
mod filters;
mod formatter;
pub mod handle;
pub mod sinks;

pub use config::{ConsoleConfig, FileConfig, LogFormat, LoggingConfig};
pub use handle::LoggingHandle;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub type LoggingResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Initialize the global subscriber from `config`.
///
/// `RUST_LOG` overrides the configured level. Fails if a global subscriber
/// is already installed.
pub fn init_logging(config: LoggingConfig) -> LoggingResult<LoggingHandle> {
    config.validate()?;
    config.ensure_log_dir()?;

    let env_filter = filters::build_filter_from_config(&config);
    let mut layers = Vec::new();

    if config.console.enabled {
        layers.push(sinks::console::layer_with_config(&config));
    }

    let file_guard = if config.file.enabled {
        let (file_layer, guard) = sinks::file::layer_with_config(&config);
        layers.push(file_layer);
        Some(guard)
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .try_init()?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        log_level = %config.level,
        log_dir = %config.log_dir.display(),
        console_format = %config.console.format,
        file_enabled = config.file.enabled,
        "Logging system initialized"
    );

    Ok(LoggingHandle::new(file_guard))
}
