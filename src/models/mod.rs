//! Data models for the AQI monitor
//!
//! - Location: where the reading was taken
//! - Weather: the current conditions for one run
//! - Air quality: AQI index, categories and the classifier

pub mod air_quality;
pub mod location;
pub mod weather;

// Re-export all public types for convenient access
pub use air_quality::{AirQualityIndex, AqiCategory, AqiClassification, classify};
pub use location::Location;
pub use weather::WeatherReading;
