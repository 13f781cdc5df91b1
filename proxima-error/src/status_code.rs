use std::fmt;

use num_enum::TryFromPrimitive;
#[cfg(feature = "serde_repr")]
use serde_repr::{Deserialize_repr, Serialize_repr};
#[cfg(feature = "strum")]
use strum_macros::{AsRefStr, EnumIter};

/// Коды статуса для категоризации ошибок.
///
/// # Диапазоны:
/// - 0xxx: Успех
/// - 1xxx: Общие ошибки
/// - 2xxx: Ошибки входных данных (точки, запросы)
/// - 5xxx: Пространственный индекс
/// - 6xxx: IO
/// - 8xxx: Разбор входных форматов (CSV, JSON)
///
/// `num_enum::TryFromPrimitive` даёт нативную реализацию `TryFrom<u32>`.
#[cfg_attr(feature = "strum", derive(AsRefStr, EnumIter))]
#[cfg_attr(feature = "serde_repr", derive(Serialize_repr, Deserialize_repr))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u32)]
#[non_exhaustive]
pub enum StatusCode {
    // === 0xxx: Успех ===
    Success = 0,

    // === 1xxx: Общие ошибки ===
    Internal = 1000,
    InvalidConfig = 1001,

    // === 2xxx: Ошибки входных данных ===
    NotFound = 2000,
    InvalidData = 2001,
    InvalidCoordinate = 2002,
    DuplicateId = 2003,
    InvalidQuery = 2004,
    EmptyIndex = 2005,

    // === 5xxx: Индекс ===
    IndexBuildFailed = 5000,

    // === 6xxx: IO ===
    Io = 6000,
    PermissionDenied = 6001,
    Timeout = 6002,
    UnexpectedEof = 6003,

    // === 8xxx: Разбор ===
    InvalidUtf8 = 8000,
    InvalidJson = 8001,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl StatusCode {
    /// Числовое представление кода статуса.
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Пытается получить вариант `StatusCode` из `u32`.
    pub fn from_u32(v: u32) -> Option<Self> {
        Self::try_from(v).ok()
    }

    /// Возвращает `true`, если операцию имеет смысл повторить (например,
    /// следующий тик перезагрузки может прочитать исправленный файл).
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout | Self::Io | Self::UnexpectedEof)
    }

    /// Вернёт `true`, если переданный `code` означает успешный результат.
    pub fn is_success(code: u32) -> bool {
        Self::Success as u32 == code
    }

    /// Ошибка во входных данных вызывающей стороны (диапазон 2xxx).
    pub fn is_client_error(&self) -> bool {
        (2000..=2999).contains(&self.code())
    }

    /// Внутренняя или инфраструктурная ошибка (1xxx, 5xxx, 6xxx).
    pub fn is_server_error(&self) -> bool {
        let c = self.code();
        matches!(c, 1000..=1999 | 5000..=6999)
    }

    /// Ошибка разбора входного формата (диапазон 8xxx).
    pub fn is_parse_error(&self) -> bool {
        (8000..=8999).contains(&self.code())
    }

    /// Требуется ли логировать как критическую ошибку.
    pub fn is_critical(&self) -> bool {
        matches!(self, Self::Internal)
    }

    /// Рекомендуемый уровень логирования для данного кода.
    pub fn log_level(&self) -> LogLevel {
        match self {
            Self::Success => LogLevel::Trace,
            Self::NotFound => LogLevel::Debug,
            Self::InvalidQuery | Self::InvalidData | Self::InvalidJson => LogLevel::Info,
            Self::Internal | Self::InvalidConfig => LogLevel::Error,
            _ => LogLevel::Warn,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов для StatusCode
////////////////////////////////////////////////////////////////////////////////

impl From<StatusCode> for u32 {
    fn from(c: StatusCode) -> Self {
        c.code()
    }
}

impl fmt::Display for StatusCode {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        #[cfg(feature = "strum")]
        {
            write!(f, "{} ({})", self.as_ref(), self.code())
        }
        #[cfg(not(feature = "strum"))]
        {
            write!(f, "{:?} ({})", self, self.code())
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable() {
        assert!(StatusCode::Io.is_retryable());
        assert!(StatusCode::Timeout.is_retryable());
        assert!(!StatusCode::DuplicateId.is_retryable());
        assert!(!StatusCode::InvalidQuery.is_retryable());
    }

    /// Тест проверяет разделение ошибок входных данных и внутренних ошибок.
    #[test]
    fn test_client_vs_server() {
        assert!(StatusCode::InvalidQuery.is_client_error());
        assert!(StatusCode::EmptyIndex.is_client_error());
        assert!(!StatusCode::InvalidQuery.is_server_error());
        assert!(StatusCode::Internal.is_server_error());
        assert!(StatusCode::InvalidConfig.is_server_error());
        assert!(StatusCode::IndexBuildFailed.is_server_error());
    }

    #[test]
    fn test_from_try_from_u32() {
        let n = StatusCode::DuplicateId.code();
        assert_eq!(StatusCode::try_from(n).unwrap(), StatusCode::DuplicateId);
        assert!(StatusCode::from_u32(99999).is_none());
    }

    #[test]
    fn test_code_and_into() {
        let c = StatusCode::InvalidCoordinate;
        assert_eq!(c.code(), 2002);
        let n: u32 = c.into();
        assert_eq!(n, 2002);
        assert!(StatusCode::is_success(StatusCode::Success.code()));
        assert!(!StatusCode::is_success(StatusCode::NotFound.code()));
    }

    #[test]
    fn test_is_parse_error() {
        assert!(StatusCode::InvalidJson.is_parse_error());
        assert!(!StatusCode::NotFound.is_parse_error());
    }

    /// Пустой индекс — деградация, а не авария: уровень warn.
    #[test]
    fn test_log_level_mappings() {
        assert_eq!(StatusCode::Success.log_level(), LogLevel::Trace);
        assert_eq!(StatusCode::EmptyIndex.log_level(), LogLevel::Warn);
        assert_eq!(StatusCode::IndexBuildFailed.log_level(), LogLevel::Warn);
        assert_eq!(StatusCode::InvalidQuery.log_level(), LogLevel::Info);
        assert_eq!(StatusCode::Internal.log_level(), LogLevel::Error);
    }

    #[test]
    fn test_display_contains_name_and_code() {
        let s = format!("{}", StatusCode::DuplicateId);
        assert!(s.contains("2003"), "Display must contain code, got: {s}");
        assert!(s.contains("DuplicateId"), "Display must contain name, got: {s}");
    }

    /// Тест проверяет, что код сериализуется числом, а не именем варианта.
    #[cfg(feature = "serde_repr")]
    #[test]
    fn test_serde_repr_numeric() {
        let json = serde_json::to_string(&StatusCode::EmptyIndex).unwrap();
        assert_eq!(json, "2005");
        let back: StatusCode = serde_json::from_str("5000").unwrap();
        assert_eq!(back, StatusCode::IndexBuildFailed);
    }
}
