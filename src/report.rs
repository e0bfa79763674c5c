//! Plain-text weather and air quality report

use crate::models::weather::NOT_AVAILABLE;
use crate::models::{AqiClassification, WeatherReading};
use chrono::{DateTime, FixedOffset};

const WIDTH: usize = 50;
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const TITLE: &str = "WEATHER & AIR QUALITY REPORT";

/// Render the report. `timestamp` is shown as the update time and should
/// already be in the city's local offset.
#[must_use]
pub fn format_report(
    reading: &WeatherReading,
    classification: &AqiClassification,
    timestamp: DateTime<FixedOffset>,
) -> String {
    let heavy_rule = "=".repeat(WIDTH);
    let light_rule = "-".repeat(WIDTH);
    let mut lines = Vec::new();

    lines.push(heavy_rule.clone());
    lines.push(format!("{:^width$}", TITLE, width = WIDTH).trim_end().to_string());
    lines.push(heavy_rule.clone());
    lines.push(format!("🌍 City: {}", reading.location.display_name()));
    lines.push(format!("🕒 Updated (local): {}", timestamp.format(TIME_FORMAT)));
    lines.push(light_rule.clone());

    let feels = reading
        .feels_like_c
        .map(|f| format!(" (Feels {f:.1}°C)"))
        .unwrap_or_default();
    lines.push(format!(
        "🌡️ Temperature: {}{}   💧 Humidity: {}",
        reading.format_temperature(),
        feels,
        reading.format_humidity()
    ));
    lines.push(format!(
        "💨 Wind: {}   🌥️ Condition: {}",
        reading.format_wind_speed(),
        reading.description
    ));
    lines.push(format!(
        "Pressure: {}   Visibility: {}",
        reading.format_pressure(),
        reading.format_visibility()
    ));

    if let (Some(sunrise), Some(sunset)) = (reading.sunrise, reading.sunset) {
        lines.push(format!(
            "Sunrise: {}   Sunset: {}",
            local_time(reading, sunrise),
            local_time(reading, sunset)
        ));
    }

    lines.push(light_rule);

    match classification.summary() {
        Some(summary) => {
            lines.push(format!("⚠️ AQI: {summary}"));
            lines.push(format!("⚕️ Health Advice: {}", classification.advice()));
        }
        None => lines.push("⚠️ AQI: Not available".to_string()),
    }

    lines.push(heavy_rule);
    lines.join("\n")
}

fn local_time(reading: &WeatherReading, timestamp: i64) -> String {
    reading
        .to_local_time(timestamp)
        .map_or_else(|| NOT_AVAILABLE.to_string(), |t| t.format(TIME_FORMAT).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::classify;
    use crate::test_support::sample_reading;
    use chrono::TimeZone;

    fn timestamp() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 1, 14, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_full_report_layout() {
        let report = format_report(&sample_reading(), &classify(Some(5)), timestamp());
        let lines: Vec<&str> = report.lines().collect();

        assert_eq!(lines[0], "=".repeat(50));
        assert!(lines[1].contains("WEATHER & AIR QUALITY REPORT"));
        assert_eq!(lines[3], "🌍 City: Zurich, CH");
        assert_eq!(lines[4], "🕒 Updated (local): 2024-03-01 14:30:00");
        assert_eq!(
            lines[6],
            "🌡️ Temperature: 12.2°C (Feels 11.0°C)   💧 Humidity: 68%"
        );
        assert_eq!(lines[7], "💨 Wind: 1.5 m/s   🌥️ Condition: Clear Sky");
        assert_eq!(lines[8], "Pressure: 1015 hPa   Visibility: 10000 m");
        assert_eq!(
            lines[9],
            "Sunrise: 2023-11-14 23:13:20   Sunset: 2023-11-15 09:13:20"
        );
        assert!(report.contains("⚠️ AQI: 5 (Very Poor)"));
        assert!(report.contains(
            "⚕️ Health Advice: Health alert! Everyone may experience serious effects. Stay indoors."
        ));
        assert_eq!(*lines.last().unwrap(), "=".repeat(50));
    }

    #[test]
    fn test_section_order() {
        let report = format_report(&sample_reading(), &classify(Some(2)), timestamp());
        let city = report.find("City:").unwrap();
        let temperature = report.find("Temperature:").unwrap();
        let pressure = report.find("Pressure:").unwrap();
        let sunrise = report.find("Sunrise:").unwrap();
        let aqi = report.find("AQI:").unwrap();
        assert!(city < temperature && temperature < pressure && pressure < sunrise && sunrise < aqi);
    }

    #[test]
    fn test_missing_aqi_renders_not_available() {
        let report = format_report(&sample_reading(), &classify(None), timestamp());
        assert!(report.contains("⚠️ AQI: Not available"));
        assert!(!report.contains("Health Advice"));
    }

    #[test]
    fn test_optional_fields_render_placeholders() {
        let mut reading = sample_reading();
        reading.feels_like_c = None;
        reading.humidity_pct = None;
        reading.wind_speed_mps = None;
        reading.pressure_hpa = None;
        reading.visibility_m = None;
        reading.sunset = None;

        let report = format_report(&reading, &classify(Some(1)), timestamp());

        assert!(report.contains("🌡️ Temperature: 12.2°C   💧 Humidity: N/A"));
        assert!(report.contains("💨 Wind: N/A   🌥️"));
        assert!(report.contains("Pressure: N/A   Visibility: N/A"));
        assert!(!report.contains("Sunrise:"));
    }
}
