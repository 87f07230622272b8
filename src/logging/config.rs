use serde::{Deserialize, Serialize};
use tracing_subscriber::filter::LevelFilter;

use crate::error::LoggingError;

/// Формат вывода логов.
#[derive(Debug, Default, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
    Json,
}

/// Конфигурация логирования.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Уровень по умолчанию: trace, debug, info, warn, error, off.
    pub level: String,
    /// Формат вывода.
    pub format: LogFormat,
    /// ANSI-цвета в консоли.
    pub with_ansi: bool,
    /// Выводить target события.
    pub with_target: bool,
    /// Выводить id потока.
    pub with_thread_ids: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
            with_ansi: true,
            with_target: true,
            with_thread_ids: false,
        }
    }
}

impl LoggingConfig {
    /// Проверяет, что уровень логирования распознаётся.
    pub fn validate(&self) -> Result<(), LoggingError> {
        self.level_filter().map(|_| ())
    }

    pub fn level_filter(&self) -> Result<LevelFilter, LoggingError> {
        self.level
            .trim()
            .parse::<LevelFilter>()
            .map_err(|_| LoggingError::InvalidLevel(self.level.clone()))
    }

    /// Директива для `EnvFilter`: уровень по умолчанию для всего процесса.
    pub fn build_filter_directive(&self) -> String {
        self.level.trim().to_lowercase()
    }
}
