use std::any::Any;

use crate::{ErrorExt, StatusCode};

/// Некорректный запрос к движку сопоставления.
///
/// Запрос не повторяется внутри движка: ошибка сразу уходит вызывающей
/// стороне.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryError {
    /// Координата запроса NaN или бесконечность.
    InvalidCoordinate { x: f64, y: f64 },
    /// `k` должен быть не меньше 1.
    InvalidK { k: usize },
}

impl std::fmt::Display for QueryError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Self::InvalidCoordinate { x, y } => {
                write!(f, "Invalid query: non-finite location ({x}, {y})")
            }
            Self::InvalidK { k } => write!(f, "Invalid query: k must be at least 1, got {k}"),
        }
    }
}

impl std::error::Error for QueryError {}

impl ErrorExt for QueryError {
    fn status_code(&self) -> StatusCode {
        StatusCode::InvalidQuery
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
