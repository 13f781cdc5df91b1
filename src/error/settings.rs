use std::any::Any;

use proxima_error::{ErrorExt, StatusCode};
use thiserror::Error;

/// Ошибка загрузки или проверки настроек.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Слой `config` не смог прочитать или десериализовать источники.
    #[error("Failed to load settings: {0}")]
    Source(#[from] config::ConfigError),
    #[error("Invalid settings: {0}")]
    Invalid(String),
}

impl SettingsError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid(reason.into())
    }
}

impl ErrorExt for SettingsError {
    fn status_code(&self) -> StatusCode {
        StatusCode::InvalidConfig
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_error_is_invalid_config() {
        let err = SettingsError::invalid("k must be at least 1");
        assert_eq!(err.status_code(), StatusCode::InvalidConfig);
        assert!(err.to_string().contains("k must be at least 1"));

        let err = SettingsError::from(config::ConfigError::NotFound("k".to_string()));
        assert_eq!(err.status_code(), StatusCode::InvalidConfig);
        assert!(err.status_code().is_server_error());
    }
}
