use thiserror::Error;

/// Startup failure while materializing the delivery configuration
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("api_key is required")]
    MissingApiKey,

    #[error("invalid message_regexp '{pattern}': {source}")]
    InvalidMessagePattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("cannot resolve loglevel: {0}")]
    UnknownSeverity(#[from] brakelog_types::UnknownLevel),
}
