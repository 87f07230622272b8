/// Broker settings loading.
pub mod config;
/// Error types: broker operations, settings, logging.
pub mod error;
/// Logging setup (filters, formats).
pub mod logging;
/// Pub/Sub: topic router, broker actor, subscriber handles.
pub mod pubsub;

// -----------------------------------------------------------------------------
//  Frequently used public types
// -----------------------------------------------------------------------------

/// Settings.
pub use self::config::{BrokerSettings, Settings};
/// Operation errors and result types.
pub use error::{
    BrokerError, BrokerResult, ErrorExt, LogLevel, LoggingError, SettingsError, StatusCode,
    TryRecvError,
};
/// Logging.
pub use logging::{init_logging, LogFormat, LoggingConfig};
/// Pub/Sub API.
pub use pubsub::{
    subscription_channel, Broker, BrokerClient, BrokerReport, BrokerStats, Delivery, HandleId,
    PublishReport, Router, StatsSnapshot, Subscriber, SubscriberHandle, Subscription, TopicPath,
};
