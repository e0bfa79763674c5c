//! Configuration management for the AQI monitor
//!
//! Settings are read once at start-up from an optional TOML file and the
//! process environment (after `.env` has been loaded), validated, and then
//! handed around as an immutable [`AppConfig`].

use crate::{MonitorError, Result};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration for one run
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// OpenWeatherMap API key
    pub api_key: String,
    /// SMTP submission settings
    pub smtp: SmtpConfig,
    /// HTTP timeout and retry settings
    pub http: HttpConfig,
    /// Upstream endpoints
    pub endpoints: EndpointConfig,
}

/// SMTP credentials and server; the alert is enabled only when user,
/// password and recipient are all set
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub user: Option<String>,
    pub password: Option<String>,
    pub recipient: Option<String>,
    pub host: String,
    pub port: u16,
}

/// HTTP request settings shared by all upstream calls
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub timeout_seconds: u64,
    pub max_attempts: u32,
    pub retry_delay_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct EndpointConfig {
    /// Base URL of the weather and air-pollution API
    pub weather_base_url: String,
    /// IP geolocation endpoint
    pub geolocation_url: String,
}

/// Everything needed to send one alert
#[derive(Debug, Clone, PartialEq)]
pub struct AlertSettings {
    pub smtp_user: String,
    pub smtp_password: String,
    pub recipient: String,
    pub host: String,
    pub port: u16,
}

/// Flat view of the configuration sources; keys match the environment
/// variable names
#[derive(Debug, Deserialize)]
struct RawSettings {
    #[serde(alias = "WEATHER_API_KEY")]
    weather_api_key: Option<String>,
    #[serde(alias = "SMTP_EMAIL")]
    smtp_email: Option<String>,
    #[serde(alias = "SMTP_PASS")]
    smtp_pass: Option<String>,
    #[serde(alias = "ALERT_EMAIL_TO")]
    alert_email_to: Option<String>,
    #[serde(default = "default_smtp_host")]
    #[serde(alias = "SMTP_HOST")]
    smtp_host: String,
    #[serde(default = "default_smtp_port")]
    #[serde(alias = "SMTP_PORT")]
    smtp_port: u16,
    #[serde(default = "default_http_timeout")]
    #[serde(alias = "HTTP_TIMEOUT_SECONDS")]
    http_timeout_seconds: u64,
    #[serde(default = "default_http_max_attempts")]
    #[serde(alias = "HTTP_MAX_ATTEMPTS")]
    http_max_attempts: u32,
    #[serde(default = "default_http_retry_delay")]
    #[serde(alias = "HTTP_RETRY_DELAY_SECONDS")]
    http_retry_delay_seconds: u64,
    #[serde(default = "default_weather_base_url")]
    #[serde(alias = "WEATHER_BASE_URL")]
    weather_base_url: String,
    #[serde(default = "default_geolocation_url")]
    #[serde(alias = "GEOLOCATION_URL")]
    geolocation_url: String,
}

// Default value functions
fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    465
}

fn default_http_timeout() -> u64 {
    8
}

fn default_http_max_attempts() -> u32 {
    3
}

fn default_http_retry_delay() -> u64 {
    2
}

fn default_weather_base_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

fn default_geolocation_url() -> String {
    "https://ipapi.co/json".to_string()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_http_timeout(),
            max_attempts: default_http_max_attempts(),
            retry_delay_seconds: default_http_retry_delay(),
        }
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            weather_base_url: default_weather_base_url(),
            geolocation_url: default_geolocation_url(),
        }
    }
}

impl HttpConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    #[must_use]
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_seconds)
    }
}

/// Treat blank values the same as missing ones
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl AppConfig {
    /// Config with only an API key set; everything else at defaults
    #[must_use]
    pub fn with_api_key<S: Into<String>>(api_key: S) -> Self {
        Self {
            api_key: api_key.into(),
            smtp: SmtpConfig {
                user: None,
                password: None,
                recipient: None,
                host: default_smtp_host(),
                port: default_smtp_port(),
            },
            http: HttpConfig::default(),
            endpoints: EndpointConfig::default(),
        }
    }

    /// Load `.env`, then the config file and process environment
    pub fn load(config_path: Option<PathBuf>) -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => tracing::debug!("No .env file found"),
            Err(e) => tracing::warn!("Ignoring unreadable .env file: {}", e),
        }

        Self::load_from_sources(config_path, None)
    }

    /// Load from a config file and the environment.
    ///
    /// `env_override` replaces the process environment, which keeps tests
    /// independent of the machine they run on.
    pub fn load_from_sources(
        config_path: Option<PathBuf>,
        env_override: Option<HashMap<String, String>>,
    ) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.or_else(Self::get_config_path);
        if let Some(config_file) = config_file {
            if config_file.exists() {
                tracing::debug!("Reading config file {}", config_file.display());
                builder = builder.add_source(
                    File::from(config_file)
                        .required(false)
                        .format(FileFormat::Toml),
                );
            }
        }

        builder = builder.add_source(Environment::default().source(env_override));

        let settings = builder
            .build()
            .map_err(|e| MonitorError::config(format!("Failed to build configuration: {e}")))?;

        let raw: RawSettings = settings
            .try_deserialize()
            .map_err(|e| MonitorError::config(format!("Invalid configuration: {e}")))?;

        let config = Self::from_raw(raw)?;
        config.validate()?;
        Ok(config)
    }

    fn from_raw(raw: RawSettings) -> Result<Self> {
        let api_key = non_blank(raw.weather_api_key)
            .ok_or_else(|| MonitorError::config("Missing WEATHER_API_KEY"))?;

        Ok(Self {
            api_key,
            smtp: SmtpConfig {
                user: non_blank(raw.smtp_email),
                password: non_blank(raw.smtp_pass),
                recipient: non_blank(raw.alert_email_to),
                host: raw.smtp_host.trim().to_string(),
                port: raw.smtp_port,
            },
            http: HttpConfig {
                timeout_seconds: raw.http_timeout_seconds,
                max_attempts: raw.http_max_attempts,
                retry_delay_seconds: raw.http_retry_delay_seconds,
            },
            endpoints: EndpointConfig {
                weather_base_url: raw.weather_base_url.trim_end_matches('/').to_string(),
                geolocation_url: raw.geolocation_url,
            },
        })
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("aqi-monitor").join("config.toml"))
    }

    /// Validate numeric ranges and URLs
    pub fn validate(&self) -> Result<()> {
        if !(1..=60).contains(&self.http.timeout_seconds) {
            return Err(MonitorError::config(
                "HTTP timeout must be between 1 and 60 seconds",
            ));
        }

        if !(1..=10).contains(&self.http.max_attempts) {
            return Err(MonitorError::config(
                "HTTP max attempts must be between 1 and 10",
            ));
        }

        if self.http.retry_delay_seconds > 30 {
            return Err(MonitorError::config(
                "HTTP retry delay cannot exceed 30 seconds",
            ));
        }

        for (name, url) in [
            ("weather_base_url", &self.endpoints.weather_base_url),
            ("geolocation_url", &self.endpoints.geolocation_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(MonitorError::config(format!(
                    "{name} must be a valid HTTP or HTTPS URL"
                )));
            }
        }

        if self.smtp.port == 0 || self.smtp.host.is_empty() {
            return Err(MonitorError::config("SMTP host and port must be set"));
        }

        Ok(())
    }

    /// SMTP settings, or `None` when any of user, password or recipient is
    /// missing
    #[must_use]
    pub fn alert_settings(&self) -> Option<AlertSettings> {
        Some(AlertSettings {
            smtp_user: self.smtp.user.clone()?,
            smtp_password: self.smtp.password.clone()?,
            recipient: self.smtp.recipient.clone()?,
            host: self.smtp.host.clone(),
            port: self.smtp.port,
        })
    }
}
