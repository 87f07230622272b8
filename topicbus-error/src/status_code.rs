use std::fmt;

#[cfg(feature = "strum")]
use strum_macros::AsRefStr;

/// Коды статуса для категоризации ошибок брокера.
///
/// # Диапазоны:
/// - 1xxx: Внутренние ошибки
/// - 2xxx: Подписки
/// - 4xxx: Доставка
/// - 6xxx: Жизненный цикл брокера и каналов
/// - 9xxx: Конфигурация и окружение
#[cfg_attr(feature = "strum", derive(AsRefStr))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
#[non_exhaustive]
pub enum StatusCode {
    // === 1xxx: Внутренние ===
    Internal = 1003,

    // === 2xxx: Подписки ===
    AlreadyExists = 2001,

    // === 4xxx: Доставка ===
    Empty = 4000,

    // === 6xxx: Жизненный цикл ===
    ConnectionClosed = 6001,
    Stopped = 6008,

    // === 9xxx: Конфигурация ===
    InvalidConfig = 9000,
    LoggingInit = 9001,
}

/// Уровень, на котором стоит логировать ошибку с данным кодом.
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

    /// Ошибки, после которых брокер больше не обслуживает команды.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Stopped | Self::ConnectionClosed)
    }

    /// Рекомендуемый уровень логирования для данного кода.
    pub fn log_level(&self) -> LogLevel {
        match self {
            Self::Empty => LogLevel::Trace,
            Self::AlreadyExists => LogLevel::Debug,
            Self::ConnectionClosed => LogLevel::Info,
            Self::Stopped => LogLevel::Warn,
            Self::Internal | Self::InvalidConfig | Self::LoggingInit => LogLevel::Error,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов для StatusCode
////////////////////////////////////////////////////////////////////////////////

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
