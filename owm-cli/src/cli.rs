use anyhow::{Context, Result, bail};
use chrono::Local;
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Text};
use owm_core::{
    DEFAULT_BASE_URL, FileConfig, HttpResult, OpenWeatherClient, Settings, Units, WeatherApi,
    WeatherRequest, WeatherResponse,
};
use tracing::{info, warn};

/// Place used when the tool runs without a subcommand.
const DEMO_PLACE: &str = "Belgrade";

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Current weather from OpenWeatherMap")]
pub struct Cli {
    /// Without a subcommand, prints the raw response for Belgrade.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the API key and base URL in the settings file.
    Configure,

    /// Show current weather for a place name or a coordinate pair.
    Show {
        /// Place name, e.g. "Belgrade" or "London,GB".
        #[arg(required_unless_present = "lat", conflicts_with_all = ["lat", "lon"])]
        place: Option<String>,

        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,

        /// metric, imperial or standard.
        #[arg(long, default_value_t = Units::Metric)]
        units: Units,

        /// Print a decoded one-line summary instead of the raw body.
        #[arg(long)]
        summary: bool,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            None => show(WeatherRequest::city(DEMO_PLACE), false).await,
            Some(Command::Configure) => configure(),
            Some(Command::Show { place, lat, lon, units, summary }) => {
                let request = match (place, lat, lon) {
                    (Some(place), _, _) => WeatherRequest::city(place),
                    (None, Some(lat), Some(lon)) => WeatherRequest::coordinates(lat, lon),
                    _ => bail!("Provide a place name or both --lat and --lon."),
                };

                show(request.with_units(units), summary).await
            }
        }
    }
}

async fn show(request: WeatherRequest, summary: bool) -> Result<()> {
    let settings = Settings::load().context("Failed to load OpenWeatherMap settings")?;
    let client = OpenWeatherClient::new(settings).context("Failed to build HTTP client")?;

    let result = client.fetch(&request).await;

    let response = match &result {
        HttpResult::Response(response) => response,
        HttpResult::TransportFailure(err) => {
            bail!("Weather request for '{}' failed: {err}", request.place)
        }
    };

    if !response.status.is_success() {
        warn!(status = %response.status, "service rejected the request");
        println!("{}", response.body);
        return Ok(());
    }

    if summary {
        let weather = result.decode().context("Failed to decode weather response")?;
        println!("{}", format_summary(&weather, request.units));
    } else {
        println!("{}", response.body);
    }

    Ok(())
}

fn configure() -> Result<()> {
    let path = FileConfig::default_path()?;
    let mut cfg = FileConfig::load_from(&path)?;
    let current = cfg.open_weather_map.clone().unwrap_or_default();

    let base_url = Text::new("Base URL:")
        .with_default(current.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL))
        .prompt()?;

    let api_key = Password::new("API key:")
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .prompt()?;

    // Validate before writing anything.
    let settings = Settings::new(base_url, api_key)?;

    cfg.set_credentials(settings.base_url().to_string(), settings.api_key().to_string());
    cfg.save_to(&path)?;

    info!(path = %path.display(), "saved settings");
    println!("Saved OpenWeatherMap settings to {}", path.display());

    Ok(())
}

fn format_summary(weather: &WeatherResponse, units: Units) -> String {
    let mut place = weather.name.clone().unwrap_or_else(|| "Unknown place".to_string());
    if let Some(country) = weather.country() {
        place = format!("{place}, {country}");
    }

    let mut line = format!(
        "{place}: {:.1}{} {}",
        weather.main.temp,
        units.temperature_symbol(),
        weather.condition().unwrap_or("no conditions reported"),
    );

    if let Some(humidity) = weather.main.humidity {
        line.push_str(&format!(", humidity {humidity:.0}%"));
    }

    if let Some(observed) = weather.observed_at() {
        let local = observed.with_timezone(&Local);
        line.push_str(&format!(" (observed {})", local.format("%Y-%m-%d %H:%M")));
    }

    line
}
