use std::any::Any;

use crate::{ErrorExt, StatusCode};

/// Нечисловая или бесконечная координата во входном наборе точек.
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidCoordinateError {
    /// Идентификатор точки (в текстовом виде).
    pub id: String,
    /// Позиция точки во входном наборе.
    pub position: usize,
    pub x: f64,
    pub y: f64,
}

/// Два элемента набора с одинаковым идентификатором.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateIdError {
    pub id: String,
    /// Позиция первого вхождения.
    pub first: usize,
    /// Позиция повторного вхождения.
    pub second: usize,
}

/// Ошибки сборки пространственного индекса.
///
/// Возвращаются только из `IndexBuilder::build`; битый набор точек никогда не
/// доходит до подмены активного индекса.
#[derive(Debug, Clone, PartialEq)]
pub enum BuildError {
    InvalidCoordinate(InvalidCoordinateError),
    DuplicateId(DuplicateIdError),
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl BuildError {
    /// Позиция во входном наборе, на которой сборка остановилась.
    pub fn position(&self) -> usize {
        match self {
            Self::InvalidCoordinate(e) => e.position,
            Self::DuplicateId(e) => e.second,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов
////////////////////////////////////////////////////////////////////////////////

impl std::fmt::Display for InvalidCoordinateError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(
            f,
            "Invalid coordinate for point '{}' at position {}: ({}, {})",
            self.id, self.position, self.x, self.y
        )
    }
}

impl std::fmt::Display for DuplicateIdError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(
            f,
            "Duplicate point id '{}' at positions {} and {}",
            self.id, self.first, self.second
        )
    }
}

impl std::fmt::Display for BuildError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Self::InvalidCoordinate(e) => write!(f, "Index build failed: {e}"),
            Self::DuplicateId(e) => write!(f, "Index build failed: {e}"),
        }
    }
}

impl std::error::Error for InvalidCoordinateError {}

impl std::error::Error for DuplicateIdError {}

impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidCoordinate(e) => Some(e),
            Self::DuplicateId(e) => Some(e),
        }
    }
}

impl From<InvalidCoordinateError> for BuildError {
    fn from(e: InvalidCoordinateError) -> Self {
        Self::InvalidCoordinate(e)
    }
}

impl From<DuplicateIdError> for BuildError {
    fn from(e: DuplicateIdError) -> Self {
        Self::DuplicateId(e)
    }
}

impl ErrorExt for BuildError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidCoordinate(_) => StatusCode::InvalidCoordinate,
            Self::DuplicateId(_) => StatusCode::DuplicateId,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn metrics_tags(&self) -> Vec<(&'static str, String)> {
        vec![
            ("error_type", "build".to_string()),
            ("status_code", self.status_code().to_string()),
            ("position", self.position().to_string()),
        ]
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
