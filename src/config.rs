use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
    #[error("failed to parse {name} as integer: {source}")]
    ParseInt {
        name: String,
        #[source]
        source: std::num::ParseIntError,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Database
    pub database_path: PathBuf,

    // WordPress target
    pub wp_url: String,
    pub wp_user: String,
    pub wp_app_password: String,

    // Facebook target
    pub fb_page_id: String,
    pub fb_access_token: String,
    pub fb_graph_url: String,

    /// Public base URL of this service, used to rewrite locally hosted
    /// image paths into something the social platform can fetch.
    pub public_base_url: Option<String>,

    // Scheduler
    pub publish_interval: Duration,
    pub scheduled_check_interval: Duration,

    // Adapter timeouts
    pub adapter_timeout: Duration,

    // Web server
    pub web_host: String,
    pub web_port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required environment variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            database_path: PathBuf::from(env_or_default("DATABASE_PATH", "./data/posts.sqlite")),

            wp_url: required_env("WP_URL")?,
            wp_user: required_env("WP_USER")?,
            wp_app_password: required_env("WP_APP_PASSWORD")?,

            fb_page_id: required_env("FACEBOOK_PAGE_ID")?,
            fb_access_token: required_env("FACEBOOK_ACCESS_TOKEN")?,
            fb_graph_url: env_or_default("FACEBOOK_GRAPH_URL", "https://graph.facebook.com/v18.0"),

            public_base_url: optional_env("PUBLIC_API_URL"),

            publish_interval: Duration::from_secs(parse_env_u64(
                "PUBLISH_INTERVAL_SECS",
                45 * 60,
            )?),
            scheduled_check_interval: Duration::from_secs(parse_env_u64(
                "SCHEDULED_CHECK_INTERVAL_SECS",
                60,
            )?),

            adapter_timeout: Duration::from_secs(parse_env_u64("ADAPTER_TIMEOUT_SECS", 60)?),

            web_host: env_or_default("WEB_HOST", "0.0.0.0"),
            web_port: parse_env_u16("WEB_PORT", 8000)?,
        })
    }

    /// Validate that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.wp_url.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "WP_URL".to_string(),
                message: "cannot be empty".to_string(),
            });
        }
        if self.fb_page_id.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "FACEBOOK_PAGE_ID".to_string(),
                message: "cannot be empty".to_string(),
            });
        }
        if self.publish_interval.is_zero() || self.scheduled_check_interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: "PUBLISH_INTERVAL_SECS".to_string(),
                message: "intervals must be at least 1 second".to_string(),
            });
        }
        if let Some(base) = &self.public_base_url {
            if !base.starts_with("http") {
                return Err(ConfigError::InvalidValue {
                    name: "PUBLIC_API_URL".to_string(),
                    message: "must be an absolute http(s) URL".to_string(),
                });
            }
        }
        Ok(())
    }
}

fn required_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_u16(name: &str, default: u16) -> Result<u16, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}
