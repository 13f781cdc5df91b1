use tracing_subscriber::EnvFilter;

use crate::logging::config::LoggingConfig;

/// `RUST_LOG` wins over the configured level; an invalid configured directive
/// falls back to `info`.
pub fn build_filter_from_config(config: &LoggingConfig) -> EnvFilter {
    let directive = config.build_filter_directive();

    match EnvFilter::try_from_default_env() {
        Ok(env_filter) => env_filter,
        Err(_) => match EnvFilter::try_new(&directive) {
            Ok(filter) => filter,
            Err(e) => {
                eprintln!(
                    "Invalid log filter directive from config ('{directive}'): {e}; falling back to 'info'"
                );
                EnvFilter::new("info")
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use std::{
        env,
        sync::{Arc, Mutex},
    };

    use serial_test::serial;
    use tracing_subscriber::{fmt, prelude::*, registry::Registry};

    use super::*;

    // Мини-буферный writer для тестов
    struct VecMakeWriter(Arc<Mutex<Vec<u8>>>);

    impl<'a> fmt::MakeWriter<'a> for VecMakeWriter {
        type Writer = VecWriterGuard;

        fn make_writer(&'a self) -> Self::Writer {
            VecWriterGuard(self.0.clone())
        }
    }

    struct VecWriterGuard(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for VecWriterGuard {
        fn write(
            &mut self,
            buf: &[u8],
        ) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn capture(
        filter: EnvFilter,
        emit: impl FnOnce(),
    ) -> String {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let layer = fmt::layer()
            .with_ansi(false)
            .with_writer(VecMakeWriter(buffer.clone()))
            .with_filter(filter);
        let subscriber = Registry::default().with(layer);

        tracing::subscriber::with_default(subscriber, emit);

        let out = buffer.lock().unwrap();
        String::from_utf8_lossy(&out).into_owned()
    }

    /// Тест проверяет, что уровень из конфигурации отсекает события ниже него.
    #[test]
    #[serial]
    fn test_config_level_filters_events() {
        env::remove_var("RUST_LOG");
        let config = LoggingConfig {
            level: "warn".to_string(),
            ..LoggingConfig::default()
        };

        let out = capture(build_filter_from_config(&config), || {
            tracing::info!("info message filtered out");
            tracing::warn!("warn message passes");
        });

        assert!(out.contains("warn message passes"));
        assert!(!out.contains("info message filtered out"));
    }

    /// Тест проверяет, что RUST_LOG переопределяет уровень из конфигурации.
    #[test]
    #[serial]
    fn test_rust_log_overrides_config() {
        env::set_var("RUST_LOG", "error");
        let config = LoggingConfig {
            level: "debug".to_string(),
            ..LoggingConfig::default()
        };

        let out = capture(build_filter_from_config(&config), || {
            tracing::warn!("warn message filtered out");
            tracing::error!("error message passes");
        });
        env::remove_var("RUST_LOG");

        assert!(out.contains("error message passes"));
        assert!(!out.contains("warn message filtered out"));
    }

    /// Тест проверяет fallback на `info` при некорректной директиве.
    #[test]
    #[serial]
    fn test_invalid_directive_falls_back_to_info() {
        env::remove_var("RUST_LOG");
        let config = LoggingConfig {
            level: "proxima=notalevel".to_string(),
            ..LoggingConfig::default()
        };

        let out = capture(build_filter_from_config(&config), || {
            tracing::debug!("debug message filtered out");
            tracing::info!("info message passes");
        });

        assert!(out.contains("info message passes"));
        assert!(!out.contains("debug message filtered out"));
    }
}
