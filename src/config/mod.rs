pub mod settings;

pub use settings::{BrokerSettings, Settings, ENV_PREFIX};
