use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{fmt, layer::Layer as LayerTrait, registry::LookupSpan};

use crate::logging::config::{LogFormat, LoggingConfig};

/// Daily rolling, non-blocking file layer. The returned guard flushes the
/// writer on drop and must outlive the subscriber.
pub fn layer_with_config<S>(
    config: &LoggingConfig
) -> (Box<dyn LayerTrait<S> + Send + Sync>, WorkerGuard)
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    let appender = rolling::daily(&config.log_dir, &config.file.filename);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let layer: Box<dyn LayerTrait<S> + Send + Sync> = match config.file.format {
        LogFormat::Json => Box::new(
            fmt::layer()
                .event_format(fmt::format().json().with_current_span(true))
                .with_ansi(false)
                .with_writer(writer),
        ),
        LogFormat::Pretty => Box::new(
            fmt::layer()
                .event_format(fmt::format().pretty())
                .with_ansi(false)
                .with_writer(writer),
        ),
        LogFormat::Compact => Box::new(
            fmt::layer()
                .event_format(fmt::format().compact())
                .with_ansi(false)
                .with_writer(writer),
        ),
    };

    (layer, guard)
}
