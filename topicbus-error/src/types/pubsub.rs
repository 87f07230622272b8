use std::any::Any;

use thiserror::Error;

use crate::{ErrorExt, StatusCode};

/// Ошибки операций брокера.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum BrokerError {
    /// Тот же обработчик уже подписан на ту же тему.
    #[error("duplicate subscription")]
    DuplicateSubscription,

    /// Брокер остановлен (или ещё не был запущен и уже уничтожен), команда
    /// не будет выполнена.
    #[error("broker stopped")]
    Stopped,
}

/// Ошибка неблокирующего чтения из подписки.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum TryRecvError {
    #[error("no values available")]
    Empty,

    #[error("subscription is closed")]
    Closed,
}

impl ErrorExt for BrokerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::DuplicateSubscription => StatusCode::AlreadyExists,
            Self::Stopped => StatusCode::Stopped,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl ErrorExt for TryRecvError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Empty => StatusCode::Empty,
            Self::Closed => StatusCode::ConnectionClosed,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
