//! One monitoring run: resolve, fetch, classify, format, alert.
//!
//! Every step is sequential. The fetch is the only fatal step; once a report
//! exists the run succeeds whatever happens to the alert.

use crate::alert::{self, AlertDecision, SendResult};
use crate::config::AppConfig;
use crate::email::Mailer;
use crate::location_resolver::{CityLocator, LocationResolver, ResolvedCity};
use crate::models::{AqiClassification, classify};
use crate::report::format_report;
use crate::weather::{Conditions, WeatherApiClient};
use crate::Result;
use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};

/// Everything a run produced
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub city: ResolvedCity,
    pub conditions: Conditions,
    pub classification: AqiClassification,
    pub decision: AlertDecision,
    pub report: String,
    /// `None` when alerts were disabled for this run
    pub send_result: Option<SendResult>,
}

/// Wires the collaborators of a run together
pub struct Monitor<'a> {
    config: &'a AppConfig,
    locator: &'a dyn CityLocator,
    client: &'a WeatherApiClient,
    mailer: Option<&'a dyn Mailer>,
    alerts_enabled: bool,
}

impl<'a> Monitor<'a> {
    pub fn new(
        config: &'a AppConfig,
        locator: &'a dyn CityLocator,
        client: &'a WeatherApiClient,
        mailer: Option<&'a dyn Mailer>,
    ) -> Self {
        Self {
            config,
            locator,
            client,
            mailer,
            alerts_enabled: true,
        }
    }

    /// Keep the decision but never send
    #[must_use]
    pub fn without_alerts(mut self) -> Self {
        self.alerts_enabled = false;
        self
    }

    /// Turn the user's input into a city name
    pub fn resolve_city(&self, input: &str) -> ResolvedCity {
        LocationResolver::resolve(input, self.locator)
    }

    /// Fetch, classify, format and alert for an already resolved city
    #[instrument(skip(self, city, now), fields(city = %city.name))]
    pub fn report_on(&self, city: ResolvedCity, now: DateTime<Utc>) -> Result<RunSummary> {
        let conditions = self.client.fetch_conditions(&city.name)?;
        let classification = classify(conditions.aqi);
        let decision = alert::decide(&classification);
        debug!("AQI {:?} classified as {}", conditions.aqi, classification.category());

        let local_now = now.with_timezone(&conditions.reading.local_offset());
        let report = format_report(&conditions.reading, &classification, local_now);

        let send_result = if self.alerts_enabled {
            Some(alert::send(
                &decision,
                self.config,
                &conditions.reading,
                &classification,
                self.mailer,
            ))
        } else {
            info!("Alerts disabled for this run");
            None
        };

        Ok(RunSummary {
            city,
            conditions,
            classification,
            decision,
            report,
            send_result,
        })
    }

    /// Full run from raw user input
    pub fn run(&self, input: &str, now: DateTime<Utc>) -> Result<RunSummary> {
        let city = self.resolve_city(input);
        self.report_on(city, now)
    }
}
