use std::time::Duration;

use regex::{Regex, RegexBuilder};

use brakelog_types::{NoticeEnvironment, resolve_threshold};

use crate::error::ConfigurationError;
use crate::settings::Settings;
use crate::template::MessageTemplate;

pub const DEFAULT_MESSAGE_REGEXP: &str = ".*";
pub const DEFAULT_MESSAGE_TEMPLATE: &str = "\\0";
pub const DEFAULT_LOGLEVEL: &str = "DEBUG";
pub const DEFAULT_OPEN_TIMEOUT: Duration = Duration::from_secs(2);
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Proxy used by the delivery client
#[derive(Clone)]
pub struct ProxyConfig {
    pub host: String,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub pass: Option<String>,
}

impl std::fmt::Debug for ProxyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("pass", &self.pass.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Record keys holding the CGI, session and parameter dumps
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DumpKeys {
    pub cgi_data: Option<String>,
    pub session: Option<String>,
    pub parameters: Option<String>,
}

/// Immutable delivery configuration, resolved once at startup.
///
/// Build it with [`DeliveryConfig::from_settings`]; every stage of the
/// pipeline borrows the same instance.
#[derive(Clone)]
pub struct DeliveryConfig {
    pub host: Option<String>,
    pub port: u16,
    pub proxy: Option<ProxyConfig>,
    pub secure: bool,
    pub use_system_ssl_cert_chain: bool,
    pub open_timeout: Duration,
    pub read_timeout: Duration,

    pub param_filters: Vec<String>,
    pub development_environments: Vec<String>,
    /// Passed through for network delivery clients, which look up the
    /// notice id after delivering from a development environment
    pub development_lookup: bool,

    /// `None` when unset or empty; notices then fall back to the tag
    pub project_id: Option<String>,
    pub api_key: String,

    /// Minimum `sys_levelno` that gets reported
    pub threshold: i64,

    /// Compiled `message_regexp`; `^`/`$` match at line boundaries and dot
    /// matches newline
    pub message_pattern: Regex,
    pub message_template: MessageTemplate,

    pub dump_keys: DumpKeys,

    /// Copied onto every notice
    pub environment: NoticeEnvironment,
}

impl DeliveryConfig {
    /// Materialize settings, failing fast on anything that cannot be used
    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigurationError> {
        let api_key = settings
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or(ConfigurationError::MissingApiKey)?
            .to_string();

        let pattern = settings
            .message_regexp
            .as_deref()
            .unwrap_or(DEFAULT_MESSAGE_REGEXP);
        let message_pattern = RegexBuilder::new(pattern)
            .multi_line(true)
            .dot_matches_new_line(true)
            .build()
            .map_err(|source| ConfigurationError::InvalidMessagePattern {
                pattern: pattern.to_string(),
                source,
            })?;
        let message_template = MessageTemplate::parse(
            settings
                .message_template
                .as_deref()
                .unwrap_or(DEFAULT_MESSAGE_TEMPLATE),
        );

        let threshold =
            resolve_threshold(settings.loglevel.as_deref().unwrap_or(DEFAULT_LOGLEVEL))?;

        let secure = settings.secure.unwrap_or(true);
        let port = settings.port.unwrap_or(if secure { 443 } else { 80 });

        let proxy = settings.proxy_host.as_ref().map(|host| ProxyConfig {
            host: host.clone(),
            port: settings.proxy_port,
            user: settings.proxy_user.clone(),
            pass: settings.proxy_pass.clone(),
        });

        let defaults = NoticeEnvironment::default();
        let environment = NoticeEnvironment {
            environment_name: settings
                .environment_name
                .clone()
                .unwrap_or(defaults.environment_name),
            project_root: settings
                .project_root
                .clone()
                .unwrap_or(defaults.project_root),
            notifier_name: settings
                .notifier_name
                .clone()
                .unwrap_or(defaults.notifier_name),
            notifier_version: settings
                .notifier_version
                .clone()
                .unwrap_or(defaults.notifier_version),
            notifier_url: settings.notifier_url.clone(),
            user_information: settings.user_information.clone(),
            framework: settings.framework.clone(),
        };

        let config = Self {
            host: settings.host.clone(),
            port,
            proxy,
            secure,
            use_system_ssl_cert_chain: settings.use_system_ssl_cert_chain.unwrap_or(true),
            open_timeout: settings
                .http_open_timeout
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_OPEN_TIMEOUT),
            read_timeout: settings
                .http_read_timeout
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_READ_TIMEOUT),
            param_filters: split_words(settings.param_filters.as_deref()),
            development_environments: split_words(settings.development_environments.as_deref()),
            development_lookup: settings.development_lookup.unwrap_or(false),
            project_id: settings
                .project_id
                .clone()
                .filter(|id| !id.is_empty()),
            api_key,
            threshold,
            message_pattern,
            message_template,
            dump_keys: DumpKeys {
                cgi_data: settings.cgi_data_dump_key.clone(),
                session: settings.session_dump_key.clone(),
                parameters: settings.parameters_dump_key.clone(),
            },
            environment,
        };

        tracing::debug!(
            host = ?config.host,
            port = config.port,
            secure = config.secure,
            threshold = config.threshold,
            environment = %config.environment.environment_name,
            "Delivery configuration materialized"
        );

        Ok(config)
    }

    /// Whether notices for the configured environment should be withheld
    pub fn is_development(&self) -> bool {
        self.development_environments
            .iter()
            .any(|env| *env == self.environment.environment_name)
    }
}

impl std::fmt::Debug for DeliveryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeliveryConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("proxy", &self.proxy)
            .field("secure", &self.secure)
            .field("project_id", &self.project_id)
            .field("threshold", &self.threshold)
            .field("message_pattern", &self.message_pattern.as_str())
            .field("dump_keys", &self.dump_keys)
            .field("environment", &self.environment)
            .finish_non_exhaustive()
    }
}

fn split_words(value: Option<&str>) -> Vec<String> {
    value
        .map(|s| s.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings {
            api_key: Some("secret".to_string()),
            ..Settings::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = DeliveryConfig::from_settings(&settings()).unwrap();

        assert!(config.host.is_none());
        assert!(config.proxy.is_none());
        assert!(config.secure);
        assert_eq!(config.port, 443);
        assert!(config.use_system_ssl_cert_chain);
        assert!(!config.development_lookup);
        assert_eq!(config.threshold, 10);
        assert_eq!(config.environment.environment_name, "production");
        assert_eq!(config.environment.project_root, "");
        assert!(config.param_filters.is_empty());
        assert!(config.development_environments.is_empty());
        assert_eq!(config.open_timeout, DEFAULT_OPEN_TIMEOUT);
        assert_eq!(
            config
                .message_template
                .rewrite(&config.message_pattern, "line one\nline two"),
            "line one\nline two"
        );
        assert_eq!(config.dump_keys, DumpKeys::default());
    }

    #[test]
    fn test_insecure_port_default() {
        let config = DeliveryConfig::from_settings(&Settings {
            secure: Some(false),
            ..settings()
        })
        .unwrap();
        assert_eq!(config.port, 80);

        let config = DeliveryConfig::from_settings(&Settings {
            secure: Some(false),
            port: Some(8080),
            ..settings()
        })
        .unwrap();
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_missing_api_key() {
        let err = DeliveryConfig::from_settings(&Settings::default()).unwrap_err();
        assert!(matches!(err, ConfigurationError::MissingApiKey));

        let err = DeliveryConfig::from_settings(&Settings {
            api_key: Some(String::new()),
            ..Settings::default()
        })
        .unwrap_err();
        assert!(matches!(err, ConfigurationError::MissingApiKey));
    }

    #[test]
    fn test_invalid_message_pattern() {
        let err = DeliveryConfig::from_settings(&Settings {
            message_regexp: Some("(unclosed".to_string()),
            ..settings()
        })
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::InvalidMessagePattern { ref pattern, .. } if pattern == "(unclosed"
        ));
    }

    #[test]
    fn test_development_lookup_passes_through() {
        let config = DeliveryConfig::from_settings(&Settings {
            development_lookup: Some(true),
            ..settings()
        })
        .unwrap();
        assert!(config.development_lookup);
    }

    #[test]
    fn test_anchors_match_at_line_boundaries() {
        let config = DeliveryConfig::from_settings(&Settings {
            message_regexp: Some("^second$".to_string()),
            message_template: Some("X".to_string()),
            ..settings()
        })
        .unwrap();
        assert_eq!(
            config
                .message_template
                .rewrite(&config.message_pattern, "first\nsecond\nthird"),
            "first\nX\nthird"
        );
    }

    #[test]
    fn test_threshold_resolution() {
        let resolve = |level: &str| {
            DeliveryConfig::from_settings(&Settings {
                loglevel: Some(level.to_string()),
                ..settings()
            })
        };

        assert_eq!(resolve("ERROR").unwrap().threshold, 40);
        assert_eq!(resolve("25").unwrap().threshold, 25);
        assert!(matches!(
            resolve("LOUD"),
            Err(ConfigurationError::UnknownSeverity(_))
        ));
    }

    #[test]
    fn test_word_lists_and_project_id() {
        let config = DeliveryConfig::from_settings(&Settings {
            param_filters: Some("password  token\tsecret".to_string()),
            development_environments: Some("development test".to_string()),
            environment_name: Some("test".to_string()),
            project_id: Some(String::new()),
            ..settings()
        })
        .unwrap();

        assert_eq!(config.param_filters, ["password", "token", "secret"]);
        assert!(config.is_development());
        assert!(config.project_id.is_none());
    }

    #[test]
    fn test_proxy_and_debug_redaction() {
        let config = DeliveryConfig::from_settings(&Settings {
            proxy_host: Some("proxy.local".to_string()),
            proxy_port: Some(3128),
            proxy_pass: Some("hunter2".to_string()),
            ..settings()
        })
        .unwrap();

        let proxy = config.proxy.as_ref().unwrap();
        assert_eq!(proxy.host, "proxy.local");
        assert_eq!(proxy.port, Some(3128));

        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("secret"));
    }
}
