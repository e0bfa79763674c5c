//! Location model for the city a reading belongs to

use serde::{Deserialize, Serialize};

/// Resolved city with coordinates
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Location {
    /// City name as reported by the weather API
    pub name: String,
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Country code (ISO 3166-1 alpha-2), empty when unknown
    pub country_code: String,
}

impl Location {
    /// Create a new location
    #[must_use]
    pub fn new(name: String, latitude: f64, longitude: f64, country_code: String) -> Self {
        Self {
            name,
            latitude,
            longitude,
            country_code,
        }
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }

    /// `Zurich, CH`, or just the name when the country is unknown
    #[must_use]
    pub fn display_name(&self) -> String {
        if self.country_code.is_empty() {
            self.name.clone()
        } else {
            format!("{}, {}", self.name, self.country_code)
        }
    }
}
