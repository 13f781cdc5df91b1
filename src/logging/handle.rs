use std::time::{Duration, Instant};

use tracing_appender::non_blocking::WorkerGuard;

/// Handle для управления lifecycle логирования.
///
/// Держит guard файлового writer-а: пока handle жив, фоновый поток пишет
/// буфер в файл; при drop оставшиеся записи сбрасываются.
pub struct LoggingHandle {
    file_guard: Option<WorkerGuard>,
    started_at: Instant,
}

impl LoggingHandle {
    pub fn new(file_guard: Option<WorkerGuard>) -> Self {
        Self {
            file_guard,
            started_at: Instant::now(),
        }
    }

    /// Включён ли файловый sink.
    pub fn has_file_sink(&self) -> bool {
        self.file_guard.is_some()
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Graceful shutdown: последнее событие и flush файлового writer-а.
    pub fn shutdown(mut self) {
        tracing::info!(
            uptime_ms = self.uptime().as_millis() as u64,
            file_sink = self.has_file_sink(),
            "Logging shutdown"
        );

        drop(self.file_guard.take());
    }
}

impl std::fmt::Debug for LoggingHandle {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("LoggingHandle")
            .field("file_sink", &self.has_file_sink())
            .field("uptime", &self.uptime())
            .finish()
    }
}
