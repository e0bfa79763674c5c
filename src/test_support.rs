//! Fakes and fixtures shared by unit tests

use crate::api::JsonSource;
use crate::config::{AlertSettings, AppConfig};
use crate::email::{AlertEmail, Mailer};
use crate::location_resolver::CityLocator;
use crate::models::{Location, WeatherReading};
use crate::{MonitorError, Result};
use serde_json::{Value, json};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

/// Canned responses keyed by a URL substring, consumed in order
#[derive(Default)]
pub struct FakeJsonSource {
    responses: RefCell<Vec<(String, VecDeque<Result<Value>>)>>,
    requests: Rc<RefCell<Vec<String>>>,
}

impl FakeJsonSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, url_part: &str, response: Result<Value>) -> Self {
        {
            let mut responses = self.responses.borrow_mut();
            match responses.iter_mut().find(|(part, _)| part == url_part) {
                Some((_, queue)) => queue.push_back(response),
                None => responses.push((url_part.to_string(), VecDeque::from([response]))),
            }
        }
        self
    }

    /// Handle on the URLs requested so far
    pub fn requests(&self) -> Rc<RefCell<Vec<String>>> {
        Rc::clone(&self.requests)
    }
}

impl JsonSource for FakeJsonSource {
    fn get_json(&self, url: &str) -> Result<Value> {
        self.requests.borrow_mut().push(url.to_string());
        self.responses
            .borrow_mut()
            .iter_mut()
            .find(|(part, _)| url.contains(part.as_str()))
            .and_then(|(_, queue)| queue.pop_front())
            .unwrap_or_else(|| Err(MonitorError::transport(format!("no response for {url}"), 1)))
    }
}

pub struct FixedLocator {
    city: Option<String>,
}

impl FixedLocator {
    pub fn city(name: &str) -> Self {
        Self {
            city: Some(name.to_string()),
        }
    }

    pub fn failing() -> Self {
        Self { city: None }
    }
}

impl CityLocator for FixedLocator {
    fn resolve_city(&self) -> Result<String> {
        self.city
            .clone()
            .ok_or_else(|| MonitorError::api("geolocation unavailable"))
    }
}

#[derive(Default)]
pub struct RecordingMailer {
    sent: RefCell<Vec<AlertEmail>>,
    attempts: Cell<u32>,
    failure: Option<String>,
}

impl RecordingMailer {
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<AlertEmail> {
        self.sent.borrow().clone()
    }

    pub fn attempts(&self) -> u32 {
        self.attempts.get()
    }
}

impl Mailer for RecordingMailer {
    fn send_mail(&self, message: &AlertEmail) -> Result<()> {
        self.attempts.set(self.attempts.get() + 1);
        if let Some(failure) = &self.failure {
            return Err(MonitorError::notification(failure.clone()));
        }
        self.sent.borrow_mut().push(message.clone());
        Ok(())
    }
}

pub fn sample_reading() -> WeatherReading {
    WeatherReading {
        location: Location::new("Zurich".to_string(), 47.37, 8.55, "CH".to_string()),
        description: "Clear Sky".to_string(),
        temperature_c: 12.24,
        feels_like_c: Some(11.0),
        humidity_pct: Some(68),
        wind_speed_mps: Some(1.5),
        pressure_hpa: Some(1015),
        visibility_m: Some(10000),
        sunrise: Some(1_700_000_000),
        sunset: Some(1_700_036_000),
        utc_offset_seconds: 3600,
    }
}

pub fn weather_body() -> Value {
    json!({
        "cod": 200,
        "name": "Zurich",
        "sys": { "country": "CH", "sunrise": 1_700_000_000, "sunset": 1_700_036_000 },
        "weather": [{ "description": "clear sky" }],
        "main": { "temp": 12.24, "feels_like": 11.0, "pressure": 1015, "humidity": 68 },
        "wind": { "speed": 1.5 },
        "visibility": 10000,
        "timezone": 3600,
        "coord": { "lon": 8.55, "lat": 47.37 }
    })
}

pub fn pollution_body(aqi: i64) -> Value {
    json!({ "list": [{ "main": { "aqi": aqi } }] })
}

pub fn alert_settings() -> AlertSettings {
    AlertSettings {
        smtp_user: "monitor@example.com".to_string(),
        smtp_password: "app-password".to_string(),
        recipient: "me@example.com".to_string(),
        host: "smtp.example.com".to_string(),
        port: 465,
    }
}

pub fn config_with_smtp() -> AppConfig {
    let mut config = AppConfig::with_api_key("DUMMY_KEY");
    config.smtp.user = Some("monitor@example.com".to_string());
    config.smtp.password = Some("app-password".to_string());
    config.smtp.recipient = Some("me@example.com".to_string());
    config.smtp.host = "smtp.example.com".to_string();
    config
}
