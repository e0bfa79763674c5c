//! HTTP JSON client with bounded retry
//!
//! Every upstream call in the monitor is a GET returning JSON. [`JsonSource`]
//! is the seam the weather client and the geolocation resolver fetch through;
//! [`HttpJsonSource`] is the blocking reqwest implementation with a fixed
//! number of attempts and a fixed delay between them.

use crate::{MonitorError, Result};
use reqwest::blocking::Client;
use serde_json::Value;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, instrument, warn};

/// Fetches a JSON document from a URL
pub trait JsonSource {
    /// GET `url` and decode the body.
    ///
    /// Non-2xx responses whose body is valid JSON are returned as `Ok`, since
    /// upstream error payloads carry their own code and message.
    fn get_json(&self, url: &str) -> Result<Value>;
}

/// How many times to try and how long to wait in between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    #[must_use]
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// One attempt, no waiting
    #[must_use]
    pub fn single() -> Self {
        Self::new(1, Duration::ZERO)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(2))
    }
}

/// Outcome of one failed attempt
#[derive(Debug)]
pub enum AttemptError {
    /// Timeout, connection failure, non-2xx without a JSON body
    Retryable(String),
    /// Anything retrying cannot fix
    Fatal(MonitorError),
}

/// Run `attempt` until it succeeds, fails fatally, or the policy is used up.
/// The last retryable failure becomes a `Transport` error.
pub fn with_retry<T, F>(policy: RetryPolicy, mut attempt: F) -> Result<T>
where
    F: FnMut(u32) -> std::result::Result<T, AttemptError>,
{
    let mut last_failure = String::from("no attempt made");

    for number in 1..=policy.max_attempts {
        debug!("Attempt {}/{}", number, policy.max_attempts);

        match attempt(number) {
            Ok(value) => return Ok(value),
            Err(AttemptError::Fatal(e)) => return Err(e),
            Err(AttemptError::Retryable(message)) => {
                warn!(
                    "Attempt {}/{} failed: {}",
                    number, policy.max_attempts, message
                );
                last_failure = message;

                if number < policy.max_attempts && !policy.delay.is_zero() {
                    debug!("Waiting {:.1}s before retry", policy.delay.as_secs_f64());
                    thread::sleep(policy.delay);
                }
            }
        }
    }

    error!(
        "Request failed after {} attempt(s): {}",
        policy.max_attempts, last_failure
    );
    Err(MonitorError::transport(last_failure, policy.max_attempts))
}

/// Strip the query string so API keys never reach the logs
#[must_use]
pub fn redact_url(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}

/// Blocking reqwest client
pub struct HttpJsonSource {
    /// HTTP client
    client: Client,
    retry: RetryPolicy,
}

impl HttpJsonSource {
    /// Create a client with a per-request timeout
    pub fn new(timeout: Duration, retry: RetryPolicy) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("aqi-monitor/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| MonitorError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, retry })
    }

    fn attempt(&self, url: &str) -> std::result::Result<Value, AttemptError> {
        let attempt_start = Instant::now();

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| AttemptError::Retryable(format!("Network error: {e}")))?;

        let status = response.status();
        debug!(
            "HTTP response received: {} in {:.3}s",
            status,
            attempt_start.elapsed().as_secs_f64()
        );

        if status.is_success() {
            return response.json::<Value>().map_err(|e| {
                AttemptError::Fatal(MonitorError::api(format!(
                    "Invalid JSON in response: {e}"
                )))
            });
        }

        // Upstream errors usually come with a JSON body naming the problem
        match response.json::<Value>() {
            Ok(body) => {
                debug!("HTTP {} with error body", status);
                Ok(body)
            }
            Err(_) => Err(AttemptError::Retryable(format!(
                "API request failed with status: {} - {}",
                status,
                status.canonical_reason().unwrap_or("Unknown error")
            ))),
        }
    }
}

impl JsonSource for HttpJsonSource {
    #[instrument(skip(self, url), fields(url = %redact_url(url)))]
    fn get_json(&self, url: &str) -> Result<Value> {
        let request_start = Instant::now();
        let body = with_retry(self.retry, |_| self.attempt(url))?;

        info!(
            "Successful API request in {:.3}s",
            request_start.elapsed().as_secs_f64()
        );
        Ok(body)
    }
}
