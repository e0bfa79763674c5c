//! `aqi-monitor` - current weather and air quality for a city
//!
//! Resolves a city (explicitly or from the caller's IP), fetches current
//! weather and air pollution from OpenWeatherMap, classifies the AQI, renders
//! a text report and emails an alert when the air is poor.

pub mod alert;
pub mod api;
pub mod config;
pub mod email;
pub mod error;
pub mod location_resolver;
pub mod models;
pub mod monitor;
pub mod report;
pub mod weather;

#[cfg(test)]
mod test_support;

// Re-export core types for public API
pub use alert::{AQI_ALERT_THRESHOLD, AlertDecision, SendResult, decide, send};
pub use api::{HttpJsonSource, JsonSource, RetryPolicy};
pub use config::{AlertSettings, AppConfig};
pub use email::{AlertEmail, Mailer, SmtpMailer};
pub use error::MonitorError;
pub use location_resolver::{CityLocator, IpApiLocator, LocationResolver, ResolvedCity};
pub use models::{AirQualityIndex, AqiCategory, AqiClassification, Location, WeatherReading, classify};
pub use monitor::{Monitor, RunSummary};
pub use report::format_report;
pub use weather::{Conditions, WeatherApiClient};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, MonitorError>;
