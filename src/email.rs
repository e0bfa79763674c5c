use crate::config::AlertSettings;
use crate::models::{AqiClassification, WeatherReading};
use crate::{MonitorError, Result};
use lettre::{
    Message, Transport,
    message::{Mailbox, header::ContentType},
    transport::smtp::SmtpTransport,
    transport::smtp::authentication::Credentials,
};

/// Port that selects STARTTLS instead of implicit TLS
const STARTTLS_PORT: u16 = 587;

/// A single plaintext alert to one recipient
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Submits one message
pub trait Mailer {
    fn send_mail(&self, message: &AlertEmail) -> Result<()>;
}

/// Fill the alert template
#[must_use]
pub fn compose_alert(
    settings: &AlertSettings,
    reading: &WeatherReading,
    classification: &AqiClassification,
) -> AlertEmail {
    let location = &reading.location;
    let aqi = classification
        .summary()
        .unwrap_or_else(|| classification.category().label().to_string());

    let subject = format!("⚠️ Air Quality Alert: {} - AQI {}", location.name, aqi);

    let body = format!(
        "🚨 AIR QUALITY ALERT 🚨\n\
\n\
City: {}\n\
AQI Level: {}\n\
\n\
🌡️ Temperature: {:.1}°C\n\
💧 Humidity: {}\n\
💨 Wind Speed: {}\n\
🧭 Pressure: {}\n\
🌥️ Condition: {}\n\
\n\
⚕️ Health Advisory:\n\
{}\n\
\n\
Stay safe and avoid outdoor activity if possible.\n\
— Automated Weather Monitor\n",
        location.display_name(),
        aqi,
        reading.temperature_c,
        reading.format_humidity(),
        reading.format_wind_speed(),
        reading.format_pressure(),
        reading.description,
        classification.advice()
    );

    AlertEmail {
        from: settings.smtp_user.clone(),
        to: settings.recipient.clone(),
        subject,
        body,
    }
}

/// Authenticated SMTP submission over TLS
pub struct SmtpMailer {
    transport: SmtpTransport,
}

impl SmtpMailer {
    pub fn new(settings: &AlertSettings) -> Result<Self> {
        let credentials =
            Credentials::new(settings.smtp_user.clone(), settings.smtp_password.clone());

        let builder = if settings.port == STARTTLS_PORT {
            SmtpTransport::starttls_relay(&settings.host)
        } else {
            SmtpTransport::relay(&settings.host)
        }
        .map_err(|e| MonitorError::notification(format!("Invalid SMTP relay: {e}")))?;

        let transport = builder
            .port(settings.port)
            .credentials(credentials)
            .build();

        Ok(Self { transport })
    }
}

impl Mailer for SmtpMailer {
    fn send_mail(&self, message: &AlertEmail) -> Result<()> {
        let email = Message::builder()
            .from(
                format!("Weather Monitor <{}>", message.from)
                    .parse::<Mailbox>()
                    .map_err(|e| {
                        MonitorError::notification(format!("Failed to parse from address: {e}"))
                    })?,
            )
            .to(message.to.parse::<Mailbox>().map_err(|e| {
                MonitorError::notification(format!("Failed to parse to address: {e}"))
            })?)
            .subject(message.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(message.body.clone())
            .map_err(|e| MonitorError::notification(format!("Failed to build email: {e}")))?;

        self.transport
            .send(&email)
            .map_err(|e| MonitorError::notification(format!("Failed to send email: {e}")))?;

        tracing::info!("Sent air quality alert to {}", message.to);

        Ok(())
    }
}
