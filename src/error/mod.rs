pub mod logging;
pub mod settings;

pub use logging::LoggingError;
pub use settings::SettingsError;
pub use topicbus_error::{
    BrokerError, BrokerResult, ErrorExt, LogLevel, StatusCode, TryRecvError,
};
