//! City resolution
//!
//! An explicit city always wins. Without one, the city is looked up from the
//! caller's public IP, and any failure there falls back to [`DEFAULT_CITY`].

use crate::api::JsonSource;
use crate::{MonitorError, Result};
use serde::Deserialize;
use tracing::{debug, info, warn};

/// City used when geolocation is unavailable
pub const DEFAULT_CITY: &str = "Zurich";

/// Looks up the current city from somewhere outside the process
pub trait CityLocator {
    fn resolve_city(&self) -> Result<String>;
}

/// Where the resolved city name came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CityOrigin {
    Explicit,
    Detected,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCity {
    pub name: String,
    pub origin: CityOrigin,
}

/// Service for resolving the city to report on
pub struct LocationResolver;

impl LocationResolver {
    /// Return `explicit` when it is non-blank, otherwise ask `locator` once
    pub fn resolve(explicit: &str, locator: &dyn CityLocator) -> ResolvedCity {
        let explicit = explicit.trim();
        if !explicit.is_empty() {
            debug!("Using explicit city: {}", explicit);
            return ResolvedCity {
                name: explicit.to_string(),
                origin: CityOrigin::Explicit,
            };
        }

        match locator.resolve_city() {
            Ok(name) if !name.trim().is_empty() => {
                info!("Auto-detected city: {}", name);
                ResolvedCity {
                    name: name.trim().to_string(),
                    origin: CityOrigin::Detected,
                }
            }
            Ok(_) => {
                warn!("Geolocation returned an empty city, using {}", DEFAULT_CITY);
                Self::fallback()
            }
            Err(e) => {
                warn!("Geolocation failed: {}, using {}", e, DEFAULT_CITY);
                Self::fallback()
            }
        }
    }

    fn fallback() -> ResolvedCity {
        ResolvedCity {
            name: DEFAULT_CITY.to_string(),
            origin: CityOrigin::Fallback,
        }
    }
}

/// ipapi.co style lookup (no API key)
#[derive(Debug, Deserialize)]
struct IpLookup {
    city: Option<String>,
    region: Option<String>,
    country: Option<String>,
    #[serde(default)]
    error: bool,
    reason: Option<String>,
}

impl IpLookup {
    /// City, else region, else country
    fn best_name(self) -> Option<String> {
        [self.city, self.region, self.country]
            .into_iter()
            .flatten()
            .map(|name| name.trim().to_string())
            .find(|name| !name.is_empty())
    }
}

/// IP geolocation through a JSON endpoint
pub struct IpApiLocator {
    source: Box<dyn JsonSource>,
    url: String,
}

impl IpApiLocator {
    pub fn new<U: Into<String>>(source: Box<dyn JsonSource>, url: U) -> Self {
        Self {
            source,
            url: url.into(),
        }
    }
}

impl CityLocator for IpApiLocator {
    fn resolve_city(&self) -> Result<String> {
        debug!("Geolocating via {}", self.url);

        let body = self.source.get_json(&self.url)?;
        let lookup: IpLookup = serde_json::from_value(body)
            .map_err(|e| MonitorError::api(format!("Invalid geolocation response: {e}")))?;

        if lookup.error {
            return Err(MonitorError::api(format!(
                "Geolocation refused: {}",
                lookup.reason.as_deref().unwrap_or("no reason given")
            )));
        }

        lookup
            .best_name()
            .ok_or_else(|| MonitorError::api("Geolocation response has no city, region or country"))
    }
}
