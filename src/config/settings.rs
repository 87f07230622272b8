use std::path::Path;

use ::config::{builder::DefaultState, Config, ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};

use crate::{error::SettingsError, logging::LoggingConfig};

/// Префикс переменных окружения.
pub const ENV_PREFIX: &str = "TOPICBUS";

/// Настройки брокера.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerSettings {
    /// Ёмкость очереди команд брокера.
    pub command_buffer: usize,
    /// Ёмкость буфера подписки, создаваемой через `BrokerClient::channel`.
    pub subscriber_capacity: usize,
}

impl Default for BrokerSettings {
    fn default() -> Self {
        Self {
            command_buffer: 64,
            subscriber_capacity: 16,
        }
    }
}

impl BrokerSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.command_buffer == 0 {
            return Err(SettingsError::Invalid {
                field: "broker.command_buffer",
                reason: "must be greater than zero".into(),
            });
        }
        if self.subscriber_capacity == 0 {
            return Err(SettingsError::Invalid {
                field: "broker.subscriber_capacity",
                reason: "must be greater than zero".into(),
            });
        }
        Ok(())
    }
}

/// Полная конфигурация процесса.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub broker: BrokerSettings,
    pub logging: LoggingConfig,
}

impl Settings {
    /// Загружает настройки из переменных окружения вида
    /// `TOPICBUS_BROKER__COMMAND_BUFFER=8`.
    pub fn load() -> Result<Self, SettingsError> {
        Self::build(Config::builder())
    }

    /// Загружает настройки из файла (TOML, YAML, JSON по расширению);
    /// переменные окружения имеют приоритет над файлом.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        Self::build(Config::builder().add_source(File::from(path).required(true)))
    }

    fn build(
        builder: ConfigBuilder<DefaultState>
    ) -> Result<Self, SettingsError> {
        let cfg = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
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
        self.broker.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{env, io::Write};

    use serial_test::serial;

    use super::*;
    use crate::logging::LogFormat;

    fn clear_env() {
        for (key, _) in env::vars() {
            if key.starts_with(ENV_PREFIX) {
                env::remove_var(key);
            }
        }
    }

    /// Тест проверяет значения по умолчанию при пустом окружении.
    #[test]
    #[serial]
    fn test_load_defaults() {
        clear_env();
        let settings = Settings::load().unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.broker.command_buffer, 64);
        assert_eq!(settings.broker.subscriber_capacity, 16);
    }

    /// Тест проверяет переопределение через переменные окружения.
    #[test]
    #[serial]
    fn test_load_env_overrides() {
        clear_env();
        env::set_var("TOPICBUS_BROKER__COMMAND_BUFFER", "8");
        env::set_var("TOPICBUS_LOGGING__LEVEL", "debug");
        let settings = Settings::load();
        clear_env();

        let settings = settings.unwrap();
        assert_eq!(settings.broker.command_buffer, 8);
        assert_eq!(settings.broker.subscriber_capacity, 16);
        assert_eq!(settings.logging.level, "debug");
    }

    /// Тест проверяет, что нулевая ёмкость отклоняется.
    #[test]
    #[serial]
    fn test_zero_capacity_rejected() {
        clear_env();
        env::set_var("TOPICBUS_BROKER__SUBSCRIBER_CAPACITY", "0");
        let result = Settings::load();
        clear_env();

        assert!(matches!(
            result,
            Err(SettingsError::Invalid {
                field: "broker.subscriber_capacity",
                ..
            })
        ));
    }

    /// Тест проверяет загрузку из TOML-файла.
    #[test]
    #[serial]
    fn test_load_from_file() {
        clear_env();
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[broker]\ncommand_buffer = 4\n\n[logging]\nformat = \"json\""
        )
        .unwrap();

        let settings = Settings::load_from_file(file.path()).unwrap();
        assert_eq!(settings.broker.command_buffer, 4);
        assert_eq!(settings.logging.format, LogFormat::Json);
    }

    /// Тест проверяет ошибку при отсутствующем файле.
    #[test]
    #[serial]
    fn test_missing_file_is_error() {
        clear_env();
        let result = Settings::load_from_file("/definitely/not/here.toml");
        assert!(matches!(result, Err(SettingsError::Config(_))));
    }
}
