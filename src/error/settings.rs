use std::any::Any;

use thiserror::Error;
use topicbus_error::{ErrorExt, StatusCode};

use super::LoggingError;

/// Ошибки загрузки и проверки настроек.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("invalid setting `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },

    #[error(transparent)]
    Logging(#[from] LoggingError),
}

impl ErrorExt for SettingsError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Config(_) | Self::Invalid { .. } => StatusCode::InvalidConfig,
            Self::Logging(e) => e.status_code(),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Тест проверяет текст и статус-код ошибок настроек.
    #[test]
    fn test_display_and_status() {
        let e = SettingsError::Invalid {
            field: "broker.command_buffer",
            reason: "must be greater than zero".into(),
        };
        assert_eq!(
            e.to_string(),
            "invalid setting `broker.command_buffer`: must be greater than zero"
        );
        assert_eq!(e.status_code(), StatusCode::InvalidConfig);

        let e: SettingsError = LoggingError::InvalidLevel("loud".into()).into();
        assert_eq!(e.to_string(), "invalid log level: \"loud\"");
        assert_eq!(e.status_code(), StatusCode::InvalidConfig);
    }
}
