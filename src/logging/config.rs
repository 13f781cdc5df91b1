use std::{fmt, path::PathBuf, str::FromStr};

use serde::{Deserialize, Serialize};

/// Output format of a log layer.
#[derive(Debug, Default, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    #[default]
    Compact,
    Json,
}

/// Console (stderr) sink.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ConsoleConfig {
    pub enabled: bool,
    pub format: LogFormat,
    pub with_ansi: bool,
    pub with_target: bool,
    pub with_thread_ids: bool,
    pub with_line_numbers: bool,
}

/// Daily rolling file sink.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct FileConfig {
    pub enabled: bool,
    pub format: LogFormat,
    /// File name prefix; the appender adds the date suffix.
    pub filename: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level or full filter directive, e.g. `info` or `proxima=debug,warn`.
    pub level: String,
    pub log_dir: PathBuf,
    pub console: ConsoleConfig,
    pub file: FileConfig,
}

impl LoggingConfig {
    /// Filter directive for `EnvFilter` when `RUST_LOG` is not set.
    ///
    /// A bare level applies to this crate and its error crate; anything else
    /// is passed through untouched.
    pub fn build_filter_directive(&self) -> String {
        let level = self.level.trim();
        if level.contains('=') || level.contains(',') {
            return level.to_string();
        }
        format!("warn,proxima={level},proxima_error={level}")
    }

    pub fn validate(&self) -> Result<(), String> {
        let level = self.level.trim();
        if level.is_empty() {
            return Err("log level must not be empty".to_string());
        }
        if !level.contains('=')
            && !level.contains(',')
            && !["trace", "debug", "info", "warn", "error", "off"]
                .contains(&level.to_ascii_lowercase().as_str())
        {
            return Err(format!("unknown log level '{level}'"));
        }
        if self.file.enabled && self.file.filename.trim().is_empty() {
            return Err("log file name must not be empty".to_string());
        }
        Ok(())
    }

    pub fn ensure_log_dir(&self) -> std::io::Result<()> {
        if self.file.enabled {
            std::fs::create_dir_all(&self.log_dir)?;
        }
        Ok(())
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            format: LogFormat::Compact,
            with_ansi: true,
            with_target: true,
            with_thread_ids: false,
            with_line_numbers: false,
        }
    }
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            format: LogFormat::Json,
            filename: "proxima.log".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: PathBuf::from("logs"),
            console: ConsoleConfig::default(),
            file: FileConfig::default(),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(match self {
            LogFormat::Pretty => "pretty",
            LogFormat::Compact => "compact",
            LogFormat::Json => "json",
        })
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}
