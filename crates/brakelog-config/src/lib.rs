//! Delivery configuration for brakelog
//!
//! Turns flat named settings into the immutable [`DeliveryConfig`] shared by
//! every pipeline stage.

mod delivery;
mod error;
mod settings;
mod template;

pub use delivery::{
    DEFAULT_LOGLEVEL, DEFAULT_MESSAGE_REGEXP, DEFAULT_MESSAGE_TEMPLATE, DEFAULT_OPEN_TIMEOUT,
    DEFAULT_READ_TIMEOUT, DeliveryConfig, DumpKeys, ProxyConfig,
};
pub use error::ConfigurationError;
pub use settings::Settings;
pub use template::MessageTemplate;
