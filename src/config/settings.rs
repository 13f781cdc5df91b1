use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::{
    logging::LoggingConfig, DelimitedFileSource, IndexBuilder, IndexConfig, MetricKind,
    SettingsError, DEFAULT_LEAF_CAPACITY,
};

/// Настройки бинарника `proxima`.
///
/// Слои от младшего к старшему: значения по умолчанию, необязательный файл
/// конфигурации, переменные окружения `PROXIMA_*` (`PROXIMA_LOGGING__LEVEL`
/// для вложенных ключей). Флаги CLI применяются поверх в самом бинарнике.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// Файл с разделителями со статическим набором точек.
    pub clients_path: Option<PathBuf>,
    /// Односимвольный разделитель полей файла клиентов.
    pub delimiter: String,
    pub has_header: bool,
    /// Сколько соседей возвращать на одно обновление.
    pub k: usize,
    pub metric: MetricKind,
    pub leaf_capacity: usize,
    /// Период перезагрузки в секундах; 0 отключает перезагрузку.
    pub reload_secs: u64,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Settings {
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        let mut builder = Config::builder()
            // Adding default values
            .set_default("delimiter", ",")?
            .set_default("has_header", false)?
            .set_default("k", 1)?
            .set_default("metric", "euclidean")?
            .set_default("leaf_capacity", DEFAULT_LEAF_CAPACITY as i64)?
            .set_default("reload_secs", 0)?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        let cfg = builder
            // Add environment variables with the PROXIMA_ prefix
            .add_source(
                Environment::with_prefix("PROXIMA")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = cfg.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        self.delimiter_char()?;
        if self.k == 0 {
            return Err(SettingsError::invalid("k must be at least 1"));
        }
        if self.leaf_capacity == 0 {
            return Err(SettingsError::invalid("leaf_capacity must be at least 1"));
        }
        self.logging.validate().map_err(SettingsError::Invalid)
    }

    pub fn delimiter_char(&self) -> Result<char, SettingsError> {
        let mut chars = self.delimiter.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(SettingsError::invalid(format!(
                "delimiter must be a single character, got '{}'",
                self.delimiter
            ))),
        }
    }

    pub fn index_builder(&self) -> IndexBuilder {
        IndexBuilder::new(
            IndexConfig::default()
                .with_leaf_capacity(self.leaf_capacity)
                .with_metric(self.metric.into_metric()),
        )
    }

    /// Источник точек для `clients_path`, если путь задан.
    pub fn point_source(&self) -> Result<Option<DelimitedFileSource>, SettingsError> {
        let delimiter = self.delimiter_char()?;
        Ok(self.clients_path.as_ref().map(|path| {
            DelimitedFileSource::new(path)
                .with_delimiter(delimiter)
                .with_header(self.has_header)
        }))
    }
}
