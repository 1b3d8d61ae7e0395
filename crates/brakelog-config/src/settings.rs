use serde::Deserialize;

/// Flat named settings, as read from the host configuration.
///
/// Every field is optional; defaults are applied when the settings are
/// materialized into a [`DeliveryConfig`](crate::DeliveryConfig).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub proxy_host: Option<String>,
    pub proxy_port: Option<u16>,
    pub proxy_user: Option<String>,
    pub proxy_pass: Option<String>,

    /// Whitespace separated field names to redact
    pub param_filters: Option<String>,
    /// Whitespace separated environment names that are never reported
    pub development_environments: Option<String>,
    pub development_lookup: Option<bool>,
    pub environment_name: Option<String>,
    pub project_root: Option<String>,

    pub notifier_name: Option<String>,
    pub notifier_version: Option<String>,
    pub notifier_url: Option<String>,
    pub user_information: Option<String>,
    pub framework: Option<String>,

    pub secure: Option<bool>,
    pub use_system_ssl_cert_chain: Option<bool>,
    /// Seconds
    pub http_open_timeout: Option<u64>,
    /// Seconds
    pub http_read_timeout: Option<u64>,

    pub project_id: Option<String>,
    pub api_key: Option<String>,

    pub message_regexp: Option<String>,
    pub message_template: Option<String>,
    /// Integer or Python level name
    #[serde(with = "level_setting")]
    pub loglevel: Option<String>,

    pub cgi_data_dump_key: Option<String>,
    pub parameters_dump_key: Option<String>,
    pub session_dump_key: Option<String>,
}

/// Accepts `loglevel = 40` as well as `loglevel = "ERROR"`
mod level_setting {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Level {
        Number(i64),
        Name(String),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(
            Option::<Level>::deserialize(deserializer)?.map(|level| match level {
                Level::Number(n) => n.to_string(),
                Level::Name(name) => name,
            }),
        )
    }
}
