//! Error types and handling for the AQI monitor
//!
//! The split between fatal and recoverable errors lives here: `Config`, `Api`
//! and `Transport` stop a run, while `DataAbsent` and `Notification` are
//! recovered by the component that raises them.

use thiserror::Error;

/// Main error type for the AQI monitor
#[derive(Error, Debug)]
pub enum MonitorError {
    /// Missing or invalid configuration
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Upstream reported a failure, or a required field was missing
    #[error("API error: {message}")]
    Api { message: String },

    /// Timeout, connection failure or unusable HTTP response
    #[error("Transport error after {attempts} attempt(s): {message}")]
    Transport { message: String, attempts: u32 },

    /// Optional upstream data (pollution) was missing or malformed
    #[error("Data absent: {message}")]
    DataAbsent { message: String },

    /// Alert email could not be sent
    #[error("Notification error: {message}")]
    Notification { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl MonitorError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a new transport error
    pub fn transport<S: Into<String>>(message: S, attempts: u32) -> Self {
        Self::Transport {
            message: message.into(),
            attempts,
        }
    }

    /// Create a new data-absent error
    pub fn data_absent<S: Into<String>>(message: S) -> Self {
        Self::DataAbsent {
            message: message.into(),
        }
    }

    /// Create a new notification error
    pub fn notification<S: Into<String>>(message: S) -> Self {
        Self::Notification {
            message: message.into(),
        }
    }

    /// Whether this error ends the run
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            MonitorError::DataAbsent { .. } | MonitorError::Notification { .. }
        )
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            MonitorError::Config { message } => {
                format!("Configuration error: {message}. Check your .env file or environment.")
            }
            MonitorError::Api { message } => format!("Weather API error: {message}"),
            MonitorError::Transport { .. } => {
                "Unable to reach the weather service. Please check your internet connection."
                    .to_string()
            }
            MonitorError::DataAbsent { .. } => "Air quality data not available.".to_string(),
            MonitorError::Notification { message } => format!("Email not sent: {message}"),
            MonitorError::Io { .. } => "Reading input failed.".to_string(),
        }
    }
}
