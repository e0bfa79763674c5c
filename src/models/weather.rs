//! Weather reading model and display helpers

use super::Location;
use chrono::{DateTime, FixedOffset, Offset, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder for fields the upstream did not send
pub const NOT_AVAILABLE: &str = "N/A";

/// Current conditions for one city, built once per run
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WeatherReading {
    pub location: Location,
    /// Human-readable description of weather conditions, title-cased
    pub description: String,
    /// Temperature in Celsius
    pub temperature_c: f64,
    /// Apparent temperature in Celsius
    pub feels_like_c: Option<f64>,
    /// Relative humidity in percent
    pub humidity_pct: Option<u8>,
    /// Wind speed in m/s
    pub wind_speed_mps: Option<f64>,
    /// Sea-level pressure in hPa
    pub pressure_hpa: Option<u32>,
    /// Visibility in metres
    pub visibility_m: Option<u32>,
    /// Sunrise as a unix timestamp (UTC)
    pub sunrise: Option<i64>,
    /// Sunset as a unix timestamp (UTC)
    pub sunset: Option<i64>,
    /// Shift of the city's local time from UTC, in seconds
    pub utc_offset_seconds: i32,
}

impl WeatherReading {
    /// Format temperature with unit
    #[must_use]
    pub fn format_temperature(&self) -> String {
        format!("{:.1}°C", self.temperature_c)
    }

    #[must_use]
    pub fn format_humidity(&self) -> String {
        self.humidity_pct
            .map_or_else(|| NOT_AVAILABLE.to_string(), |h| format!("{h}%"))
    }

    #[must_use]
    pub fn format_wind_speed(&self) -> String {
        self.wind_speed_mps
            .map_or_else(|| NOT_AVAILABLE.to_string(), |w| format!("{w} m/s"))
    }

    /// Format atmospheric pressure with unit
    #[must_use]
    pub fn format_pressure(&self) -> String {
        self.pressure_hpa
            .map_or_else(|| NOT_AVAILABLE.to_string(), |p| format!("{p} hPa"))
    }

    #[must_use]
    pub fn format_visibility(&self) -> String {
        self.visibility_m
            .map_or_else(|| NOT_AVAILABLE.to_string(), |v| format!("{v} m"))
    }

    /// The city's fixed UTC offset, falling back to UTC when the upstream
    /// value is out of range
    #[must_use]
    pub fn local_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_seconds).unwrap_or_else(|| Utc.fix())
    }

    /// Convert a unix timestamp into the city's local time
    #[must_use]
    pub fn to_local_time(&self, timestamp: i64) -> Option<DateTime<FixedOffset>> {
        self.local_offset().timestamp_opt(timestamp, 0).single()
    }
}

/// `clear sky` -> `Clear Sky`
#[must_use]
pub fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
