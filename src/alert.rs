//! Alert decision and dispatch
//!
//! [`decide`] is pure; [`send`] performs the one network side effect of the
//! alert path and never fails the run. Callers invoke `send` at most once.

use crate::config::AppConfig;
use crate::email::{Mailer, compose_alert};
use crate::models::{AqiClassification, WeatherReading};
use serde::Serialize;
use tracing::{info, warn};

/// Alert when the AQI is at or above this level (Poor)
pub const AQI_ALERT_THRESHOLD: u8 = 4;

/// Error text for a skipped send because SMTP settings are incomplete
pub const CONFIGURATION_MISSING: &str = "configuration missing";

/// Error text for a skipped send because no SMTP transport could be set up
pub const TRANSPORT_UNAVAILABLE: &str = "mail transport unavailable";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DecisionReason {
    /// Index at or above the threshold
    AboveThreshold,
    /// Index below the threshold
    BelowThreshold,
    /// No usable AQI reading
    NoData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AlertDecision {
    pub should_send: bool,
    pub reason: DecisionReason,
}

/// What happened to the alert
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendResult {
    pub sent: bool,
    pub error: Option<String>,
}

impl SendResult {
    fn sent() -> Self {
        Self {
            sent: true,
            error: None,
        }
    }

    fn not_sent(error: Option<String>) -> Self {
        Self { sent: false, error }
    }
}

/// Send iff the index is present and at or above [`AQI_ALERT_THRESHOLD`]
#[must_use]
pub fn decide(classification: &AqiClassification) -> AlertDecision {
    match classification.index() {
        Some(index) if index.value() >= AQI_ALERT_THRESHOLD => AlertDecision {
            should_send: true,
            reason: DecisionReason::AboveThreshold,
        },
        Some(_) => AlertDecision {
            should_send: false,
            reason: DecisionReason::BelowThreshold,
        },
        None => AlertDecision {
            should_send: false,
            reason: DecisionReason::NoData,
        },
    }
}

/// Submit the alert once if `decision` says so.
///
/// Incomplete SMTP settings yield [`CONFIGURATION_MISSING`]. `mailer` is
/// `None` when no transport could be set up, which yields
/// [`TRANSPORT_UNAVAILABLE`]. Transport and auth failures are reported in
/// `error`, never retried.
pub fn send(
    decision: &AlertDecision,
    config: &AppConfig,
    reading: &WeatherReading,
    classification: &AqiClassification,
    mailer: Option<&dyn Mailer>,
) -> SendResult {
    if !decision.should_send {
        return SendResult::not_sent(None);
    }

    let Some(settings) = config.alert_settings() else {
        warn!("Alert due but SMTP credentials or recipient are missing");
        return SendResult::not_sent(Some(CONFIGURATION_MISSING.to_string()));
    };

    let Some(mailer) = mailer else {
        warn!("Alert due but no SMTP transport is available");
        return SendResult::not_sent(Some(TRANSPORT_UNAVAILABLE.to_string()));
    };

    let message = compose_alert(&settings, reading, classification);
    match mailer.send_mail(&message) {
        Ok(()) => {
            info!("Alert sent to {}", message.to);
            SendResult::sent()
        }
        Err(e) => {
            warn!("Alert email failed: {}", e);
            SendResult::not_sent(Some(e.to_string()))
        }
    }
}
