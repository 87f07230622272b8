pub mod ext;
pub mod status_code;
pub mod types;

// Publicly re-export all error types so that the broker crate can pull them
// from a single place.
pub use ext::*;
pub use status_code::*;
pub use types::*;

pub type BrokerResult<T> = Result<T, BrokerError>;
