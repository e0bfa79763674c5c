//! Weather and air-pollution client for the OpenWeatherMap API
//!
//! Two sequential calls: current weather by city name, then air pollution by
//! the coordinates from the first response. A failed weather call ends the
//! run; missing pollution data only leaves the AQI unknown.

use crate::api::{JsonSource, redact_url};
use crate::models::{Location, WeatherReading};
use crate::{MonitorError, Result};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

/// Weather reading plus the raw AQI value, if the pollution API had one
#[derive(Debug, Clone, PartialEq)]
pub struct Conditions {
    pub reading: WeatherReading,
    pub aqi: Option<i64>,
}

/// OpenWeatherMap client
pub struct WeatherApiClient {
    source: Box<dyn JsonSource>,
    base_url: String,
    api_key: String,
}

impl WeatherApiClient {
    pub fn new<B: Into<String>, K: Into<String>>(
        source: Box<dyn JsonSource>,
        base_url: B,
        api_key: K,
    ) -> Self {
        Self {
            source,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Fetch current weather for `city`, then the AQI at its coordinates
    #[instrument(skip(self))]
    pub fn fetch_conditions(&self, city: &str) -> Result<Conditions> {
        let reading = self.fetch_weather(city)?;

        let aqi = match self.fetch_aqi(&reading.location) {
            Ok(aqi) => Some(aqi),
            Err(e) if !e.is_fatal() => {
                warn!("No air quality data for {}: {}", reading.location.name, e);
                None
            }
            Err(e) => return Err(e),
        };

        Ok(Conditions { reading, aqi })
    }

    /// Get current weather by city name
    pub fn fetch_weather(&self, city: &str) -> Result<WeatherReading> {
        let url = format!(
            "{}/weather?q={}&appid={}&units=metric",
            self.base_url,
            urlencoding::encode(city),
            urlencoding::encode(&self.api_key)
        );
        debug!("Weather API request URL: {}", redact_url(&url));

        let body = self
            .source
            .get_json(&url)
            .map_err(|e| escalate(e, "weather"))?;

        let reading = openweather::parse_weather(body, city)?;
        info!(
            "Retrieved weather for {} ({})",
            reading.location.display_name(),
            reading.location.format_coordinates()
        );
        Ok(reading)
    }

    /// Get the AQI at a location. Missing or malformed pollution data is
    /// reported as `DataAbsent`.
    pub fn fetch_aqi(&self, location: &Location) -> Result<i64> {
        let url = format!(
            "{}/air_pollution?lat={}&lon={}&appid={}",
            self.base_url,
            location.latitude,
            location.longitude,
            urlencoding::encode(&self.api_key)
        );
        debug!("Air pollution API request URL: {}", redact_url(&url));

        let body = self
            .source
            .get_json(&url)
            .map_err(|e| escalate(e, "air pollution"))?;

        let aqi = openweather::parse_aqi(body)?;
        info!("Retrieved AQI {} for {}", aqi, location.name);
        Ok(aqi)
    }
}

/// Exhausted retries are fatal for the run, reported as an API failure
fn escalate(error: MonitorError, what: &str) -> MonitorError {
    match error {
        MonitorError::Transport { message, attempts } => MonitorError::api(format!(
            "Failed to fetch {what} data after {attempts} attempt(s): {message}"
        )),
        other => other,
    }
}

/// OpenWeatherMap response structures and conversion utilities
pub mod openweather {
    use super::{Location, MonitorError, Result, Value, WeatherReading};
    use crate::models::weather::title_case;
    use serde::Deserialize;

    /// Status code; the API sends it as a number on success and often as a
    /// string on errors
    #[derive(Debug, Deserialize)]
    #[serde(untagged)]
    pub enum Cod {
        Number(i64),
        Text(String),
    }

    impl Cod {
        #[must_use]
        pub fn is_success(&self) -> bool {
            match self {
                Cod::Number(code) => *code == 200,
                Cod::Text(code) => code.trim() == "200",
            }
        }
    }

    /// Current weather response
    #[derive(Debug, Deserialize)]
    pub struct CurrentWeatherResponse {
        pub cod: Option<Cod>,
        pub message: Option<Value>,
        pub name: Option<String>,
        pub coord: Option<Coord>,
        pub sys: Option<Sys>,
        pub weather: Option<Vec<Condition>>,
        pub main: Option<Main>,
        pub wind: Option<Wind>,
        pub visibility: Option<f64>,
        /// Shift in seconds from UTC
        pub timezone: Option<i64>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Coord {
        pub lat: Option<f64>,
        pub lon: Option<f64>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Sys {
        pub country: Option<String>,
        pub sunrise: Option<i64>,
        pub sunset: Option<i64>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Condition {
        pub description: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Main {
        pub temp: Option<f64>,
        pub feels_like: Option<f64>,
        pub pressure: Option<f64>,
        pub humidity: Option<f64>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Wind {
        pub speed: Option<f64>,
    }

    /// Air pollution response; only the first entry is decoded
    #[derive(Debug, Deserialize)]
    pub struct PollutionResponse {
        pub list: Option<Vec<Value>>,
    }

    #[derive(Debug, Deserialize)]
    pub struct PollutionEntry {
        pub main: Option<PollutionMain>,
    }

    #[derive(Debug, Deserialize)]
    pub struct PollutionMain {
        pub aqi: Option<i64>,
    }

    fn message_text(message: Option<Value>) -> String {
        match message {
            Some(Value::String(text)) if !text.is_empty() => text,
            Some(Value::Null) | None => "Unknown error from weather API".to_string(),
            Some(other) => other.to_string(),
        }
    }

    /// Convert a current-weather body into a reading. `requested` names the
    /// location when the API leaves the name out.
    pub fn parse_weather(body: Value, requested: &str) -> Result<WeatherReading> {
        let response: CurrentWeatherResponse = serde_json::from_value(body)
            .map_err(|e| MonitorError::api(format!("Invalid weather data received: {e}")))?;

        if let Some(cod) = &response.cod {
            if !cod.is_success() {
                return Err(MonitorError::api(message_text(response.message)));
            }
        }

        let (latitude, longitude) = match &response.coord {
            Some(Coord {
                lat: Some(lat),
                lon: Some(lon),
            }) => (*lat, *lon),
            _ => return Err(MonitorError::api("missing coordinates")),
        };

        let main = response.main.unwrap_or(Main {
            temp: None,
            feels_like: None,
            pressure: None,
            humidity: None,
        });
        let temperature_c = main
            .temp
            .ok_or_else(|| MonitorError::api("missing temperature"))?;

        let sys = response.sys.unwrap_or(Sys {
            country: None,
            sunrise: None,
            sunset: None,
        });

        let description = response
            .weather
            .unwrap_or_default()
            .into_iter()
            .next()
            .and_then(|condition| condition.description)
            .map_or_else(|| "N/A".to_string(), |d| title_case(&d));

        let name = response
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| requested.to_string());

        Ok(WeatherReading {
            location: Location::new(name, latitude, longitude, sys.country.unwrap_or_default()),
            description,
            temperature_c,
            feels_like_c: main.feels_like,
            humidity_pct: main.humidity.map(|h| h.round().clamp(0.0, 100.0) as u8),
            wind_speed_mps: response.wind.and_then(|w| w.speed),
            pressure_hpa: main.pressure.map(|p| p.round().max(0.0) as u32),
            visibility_m: response.visibility.map(|v| v.round().max(0.0) as u32),
            sunrise: sys.sunrise,
            sunset: sys.sunset,
            utc_offset_seconds: response
                .timezone
                .and_then(|tz| i32::try_from(tz).ok())
                .unwrap_or(0),
        })
    }

    /// Extract the first entry's AQI from an air-pollution body
    pub fn parse_aqi(body: Value) -> Result<i64> {
        let response: PollutionResponse = serde_json::from_value(body).map_err(|e| {
            MonitorError::data_absent(format!("Invalid air pollution data received: {e}"))
        })?;

        let first = response
            .list
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| MonitorError::data_absent("empty pollution list"))?;

        let entry: PollutionEntry = serde_json::from_value(first).map_err(|e| {
            MonitorError::data_absent(format!("Invalid air pollution entry: {e}"))
        })?;

        entry
            .main
            .and_then(|main| main.aqi)
            .ok_or_else(|| MonitorError::data_absent("pollution entry has no AQI"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeJsonSource, pollution_body, weather_body};
    use serde_json::json;

    fn client(source: FakeJsonSource) -> WeatherApiClient {
        WeatherApiClient::new(Box::new(source), "https://owm.test/data/2.5", "DUMMY_KEY")
    }

    #[test]
    fn test_parse_weather_full_body() {
        let reading = openweather::parse_weather(weather_body(), "zurich").unwrap();

        assert_eq!(reading.location.name, "Zurich");
        assert_eq!(reading.location.country_code, "CH");
        assert_eq!(reading.location.latitude, 47.37);
        assert_eq!(reading.location.longitude, 8.55);
        assert_eq!(reading.description, "Clear Sky");
        assert_eq!(reading.temperature_c, 12.24);
        assert_eq!(reading.humidity_pct, Some(68));
        assert_eq!(reading.wind_speed_mps, Some(1.5));
        assert_eq!(reading.pressure_hpa, Some(1015));
        assert_eq!(reading.utc_offset_seconds, 3600);
    }

    #[test]
    fn test_parse_weather_minimal_body() {
        let body = json!({
            "cod": 200,
            "coord": { "lon": 8.55, "lat": 47.37 },
            "main": { "temp": 3.0 }
        });
        let reading = openweather::parse_weather(body, "Zurich").unwrap();

        assert_eq!(reading.location.name, "Zurich");
        assert_eq!(reading.location.country_code, "");
        assert_eq!(reading.description, "N/A");
        assert_eq!(reading.humidity_pct, None);
        assert_eq!(reading.pressure_hpa, None);
        assert_eq!(reading.sunrise, None);
    }

    #[test]
    fn test_error_code_as_string() {
        let body = json!({ "cod": "404", "message": "city not found" });
        let err = openweather::parse_weather(body, "Nowhere").unwrap_err();
        match err {
            MonitorError::Api { message } => assert_eq!(message, "city not found"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_error_code_as_number_without_message() {
        let body = json!({ "cod": 401 });
        let err = openweather::parse_weather(body, "Zurich").unwrap_err();
        assert!(err.to_string().contains("Unknown error from weather API"));
    }

    #[test]
    fn test_missing_coordinates() {
        let mut body = weather_body();
        body.as_object_mut().unwrap().remove("coord");
        let err = openweather::parse_weather(body, "Zurich").unwrap_err();
        match err {
            MonitorError::Api { message } => assert_eq!(message, "missing coordinates"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_null_weather_list_renders_placeholder() {
        let body = json!({
            "cod": 200,
            "coord": { "lon": 8.55, "lat": 47.37 },
            "main": { "temp": 3.0 },
            "weather": null
        });
        let reading = openweather::parse_weather(body, "Zurich").unwrap();
        assert_eq!(reading.description, "N/A");
    }

    #[test]
    fn test_parse_aqi() {
        assert_eq!(openweather::parse_aqi(pollution_body(2)).unwrap(), 2);
    }

    #[test]
    fn test_parse_aqi_ignores_entries_after_the_first() {
        let body = json!({ "list": [{ "main": { "aqi": 4 } }, "junk"] });
        assert_eq!(openweather::parse_aqi(body).unwrap(), 4);
    }

    #[test]
    fn test_parse_aqi_absent_cases() {
        for body in [
            json!({ "list": [] }),
            json!({}),
            json!({ "list": [{}] }),
            json!({ "list": [{ "main": {} }] }),
            json!({ "list": "garbage" }),
            json!({ "list": null }),
            json!({ "list": ["junk"] }),
            json!({ "cod": "400", "message": "wrong latitude" }),
        ] {
            let err = openweather::parse_aqi(body).unwrap_err();
            assert!(matches!(err, MonitorError::DataAbsent { .. }));
        }
    }

    #[test]
    fn test_fetch_conditions() {
        let source = FakeJsonSource::new()
            .respond("/weather", Ok(weather_body()))
            .respond("/air_pollution", Ok(pollution_body(4)));
        let requests = source.requests();

        let conditions = client(source).fetch_conditions("Zurich").unwrap();

        assert_eq!(conditions.aqi, Some(4));
        assert_eq!(conditions.reading.location.name, "Zurich");

        let requests = requests.borrow();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].contains("/weather?q=Zurich&appid=DUMMY_KEY&units=metric"));
        assert!(requests[1].contains("/air_pollution?lat=47.37&lon=8.55&appid=DUMMY_KEY"));
    }

    #[test]
    fn test_city_name_is_url_encoded() {
        let source = FakeJsonSource::new()
            .respond("/weather", Ok(weather_body()))
            .respond("/air_pollution", Ok(pollution_body(1)));
        let requests = source.requests();

        client(source).fetch_conditions("New Delhi").unwrap();

        assert!(requests.borrow()[0].contains("q=New%20Delhi"));
    }

    #[test]
    fn test_empty_pollution_list_is_not_fatal() {
        let source = FakeJsonSource::new()
            .respond("/weather", Ok(weather_body()))
            .respond("/air_pollution", Ok(json!({ "list": [] })));

        let conditions = client(source).fetch_conditions("Zurich").unwrap();
        assert_eq!(conditions.aqi, None);
    }

    #[test]
    fn test_missing_coordinates_skips_pollution_call() {
        let mut body = weather_body();
        body.as_object_mut().unwrap().remove("coord");
        let source = FakeJsonSource::new().respond("/weather", Ok(body));
        let requests = source.requests();

        let result = client(source).fetch_conditions("Zurich");

        assert!(matches!(result, Err(MonitorError::Api { .. })));
        assert_eq!(requests.borrow().len(), 1);
    }

    #[test]
    fn test_exhausted_retries_escalate_to_api_error() {
        let source = FakeJsonSource::new()
            .respond("/weather", Err(MonitorError::transport("timed out", 3)));

        let err = client(source).fetch_conditions("Zurich").unwrap_err();
        match err {
            MonitorError::Api { message } => {
                assert!(message.contains("after 3 attempt(s)"));
                assert!(message.contains("timed out"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_pollution_transport_failure_is_fatal() {
        let source = FakeJsonSource::new()
            .respond("/weather", Ok(weather_body()))
            .respond("/air_pollution", Err(MonitorError::transport("reset", 3)));

        let err = client(source).fetch_conditions("Zurich").unwrap_err();
        assert!(matches!(err, MonitorError::Api { .. }));
    }
}
