use anyhow::Result;
use aqi_monitor::alert::{CONFIGURATION_MISSING, DecisionReason, TRANSPORT_UNAVAILABLE};
use aqi_monitor::location_resolver::CityOrigin;
use aqi_monitor::{
    AppConfig, HttpJsonSource, IpApiLocator, Mailer, Monitor, MonitorError, RetryPolicy,
    RunSummary, SmtpMailer, WeatherApiClient,
};
use chrono::Utc;
use clap::Parser;
use colored::Colorize;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Geolocation is best effort: one short attempt
const GEOLOCATION_TIMEOUT: Duration = Duration::from_secs(6);

#[derive(Parser, Debug)]
#[command(name = "aqi-monitor", version)]
#[command(about = "Current weather and air quality for a city, with email alerts on poor air")]
struct Cli {
    /// City to report on. Without it you are prompted; an empty answer
    /// detects the city from your IP address.
    city: Option<String>,

    /// Path to a TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Show debug logging on stderr
    #[arg(short, long, default_value_t = false)]
    verbose: bool,

    /// Never send the alert email
    #[arg(long, default_value_t = false)]
    no_alert: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let message = e
                .downcast_ref::<MonitorError>()
                .map_or_else(|| e.to_string(), MonitorError::user_message);
            eprintln!("{} {}", "Error:".red().bold(), message);
            if cli.verbose {
                eprintln!("{e:?}");
            }
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "aqi_monitor=debug,warn"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let config = AppConfig::load(cli.config.clone())?;

    let input = match &cli.city {
        Some(city) => city.clone(),
        None => prompt_city()?,
    };

    let locator = IpApiLocator::new(
        Box::new(HttpJsonSource::new(GEOLOCATION_TIMEOUT, RetryPolicy::single())?),
        config.endpoints.geolocation_url.clone(),
    );
    let client = WeatherApiClient::new(
        Box::new(HttpJsonSource::new(
            config.http.timeout(),
            RetryPolicy::new(config.http.max_attempts, config.http.retry_delay()),
        )?),
        config.endpoints.weather_base_url.clone(),
        config.api_key.clone(),
    );
    let mailer = build_mailer(&config);

    let mut monitor = Monitor::new(
        &config,
        &locator,
        &client,
        mailer.as_ref().map(|m| m as &dyn Mailer),
    );
    if cli.no_alert {
        monitor = monitor.without_alerts();
    }

    let city = monitor.resolve_city(&input);
    match city.origin {
        CityOrigin::Detected => println!("{} {}", "Auto-detected city:".green(), city.name),
        CityOrigin::Fallback => println!(
            "{}",
            format!("Could not auto-detect city. Using default: {}", city.name).yellow()
        ),
        CityOrigin::Explicit => {}
    }

    let summary = monitor.report_on(city, Utc::now())?;
    println!("{}", summary.report);
    print_alert_status(&summary, &config);

    Ok(())
}

fn prompt_city() -> Result<String> {
    println!("{}", "This is a friendly Weather + AQI app.".bold());
    println!("It uses the OpenWeatherMap API. Press Enter to auto-detect your city via IP.");
    print!("Enter city name: ");
    io::stdout().flush().map_err(MonitorError::from)?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(MonitorError::from)?;
    Ok(line.trim().to_string())
}

/// A mailer that cannot be built only disables the alert
fn build_mailer(config: &AppConfig) -> Option<SmtpMailer> {
    let settings = config.alert_settings()?;
    match SmtpMailer::new(&settings) {
        Ok(mailer) => Some(mailer),
        Err(e) => {
            tracing::warn!("Email alerts disabled: {}", e);
            None
        }
    }
}

fn print_alert_status(summary: &RunSummary, config: &AppConfig) {
    let Some(result) = &summary.send_result else {
        let due = if summary.decision.should_send { "yes" } else { "no" };
        println!("Alert email disabled for this run (alert due: {due}).");
        return;
    };

    if result.sent {
        let recipient = config.smtp.recipient.as_deref().unwrap_or_default();
        println!("{}", format!("Email alert sent to {recipient}").green());
        return;
    }

    match result.error.as_deref() {
        Some(CONFIGURATION_MISSING) => println!(
            "{} SMTP credentials or recipient missing in .env",
            "Email not sent:".yellow()
        ),
        Some(TRANSPORT_UNAVAILABLE) => println!(
            "{} SMTP transport could not be set up for {}:{}",
            "Email not sent:".yellow(),
            config.smtp.host,
            config.smtp.port
        ),
        Some(error) => println!("{} {}", "Failed to send email:".red(), error),
        None => match summary.decision.reason {
            DecisionReason::NoData => {
                println!("{}", "No AQI alert necessary (AQI not available).".green());
            }
            _ => println!("{}", "No AQI alert necessary (AQI below threshold).".green()),
        },
    }
}
