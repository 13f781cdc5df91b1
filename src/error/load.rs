//! Ошибки слоя ввода-вывода: чтение набора точек, разбор обновлений позиций
//! и цикл перезагрузки.

use std::{any::Any, io, path::PathBuf};

use proxima_error::{BuildError, ErrorExt, StatusCode};
use thiserror::Error;

/// Не удалось получить [`PointSet`](crate::PointSet) или обновление позиции.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Файл источника не открылся или не прочитался.
    #[error("Failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Битая строка файла с разделителями. `line` считается с 1.
    #[error("Invalid row at line {line}: {reason}")]
    InvalidRow { line: usize, reason: String },
    /// Обновление позиции не является корректным JSON или неполно.
    #[error("Invalid position update: {0}")]
    InvalidUpdate(#[from] serde_json::Error),
}

/// Сбой одного цикла загрузка → сборка → подмена.
#[derive(Debug, Error)]
pub enum ReloadError {
    #[error("Reload failed: {0}")]
    Load(#[from] LoadError),
    #[error("Reload failed: {0}")]
    Build(#[from] BuildError),
    /// Блокирующая задача перезагрузки запаниковала или была отменена.
    #[error("Reload task failed: {0}")]
    Task(String),
}

impl LoadError {
    pub fn io(
        path: impl Into<PathBuf>,
        source: io::Error,
    ) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn invalid_row(
        line: usize,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidRow {
            line,
            reason: reason.into(),
        }
    }
}

impl ErrorExt for LoadError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Io { source, .. } => match source.kind() {
                io::ErrorKind::NotFound => StatusCode::NotFound,
                io::ErrorKind::PermissionDenied => StatusCode::PermissionDenied,
                io::ErrorKind::TimedOut => StatusCode::Timeout,
                io::ErrorKind::UnexpectedEof => StatusCode::UnexpectedEof,
                io::ErrorKind::InvalidData => StatusCode::InvalidUtf8,
                _ => StatusCode::Io,
            },
            Self::InvalidRow { .. } => StatusCode::InvalidData,
            Self::InvalidUpdate(_) => StatusCode::InvalidJson,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn metrics_tags(&self) -> Vec<(&'static str, String)> {
        let mut tags = vec![
            ("error_type", self.type_name()),
            ("status_code", self.status_code().to_string()),
        ];
        if let Self::InvalidRow { line, .. } = self {
            tags.push(("line", line.to_string()));
        }
        tags
    }
}

impl ErrorExt for ReloadError {
    /// Ошибки загрузки сохраняют свой код; любая ошибка сборки сообщается как
    /// `IndexBuildFailed`, причина доступна через `source()`.
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Load(err) => err.status_code(),
            Self::Build(_) => StatusCode::IndexBuildFailed,
            Self::Task(_) => StatusCode::Internal,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn metrics_tags(&self) -> Vec<(&'static str, String)> {
        let mut tags = vec![
            ("error_type", self.type_name()),
            ("status_code", self.status_code().to_string()),
        ];
        if let Self::Build(err) = self {
            tags.push(("cause", err.status_code().to_string()));
        }
        tags
    }
}
