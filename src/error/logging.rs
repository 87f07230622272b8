use std::any::Any;

use thiserror::Error;
use topicbus_error::{ErrorExt, StatusCode};

/// Ошибки инициализации логирования.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoggingError {
    #[error("invalid log level: {0:?}")]
    InvalidLevel(String),

    #[error("global tracing subscriber already set: {0}")]
    AlreadyInitialized(String),
}

impl ErrorExt for LoggingError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidLevel(_) => StatusCode::InvalidConfig,
            Self::AlreadyInitialized(_) => StatusCode::LoggingInit,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
