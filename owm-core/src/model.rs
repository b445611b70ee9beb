use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Measurement system requested from the API. Only the temperature scale changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
    Standard,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
            Units::Standard => "standard",
        }
    }

    pub const fn all() -> &'static [Units] {
        &[Units::Metric, Units::Imperial, Units::Standard]
    }

    /// Symbol of the temperature scale returned for these units.
    pub fn temperature_symbol(&self) -> &'static str {
        match self {
            Units::Metric => "°C",
            Units::Imperial => "°F",
            Units::Standard => "K",
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown units '{0}'. Supported units: metric, imperial, standard.")]
pub struct UnknownUnits(pub String);

impl FromStr for Units {
    type Err = UnknownUnits;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            "standard" => Ok(Units::Standard),
            _ => Err(UnknownUnits(value.to_string())),
        }
    }
}

/// Where to look up the weather: a free-text place name or a coordinate pair.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaceQuery {
    City(String),
    Coordinates { lat: f64, lon: f64 },
}

impl fmt::Display for PlaceQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaceQuery::City(name) => f.write_str(name),
            PlaceQuery::Coordinates { lat, lon } => write!(f, "{lat},{lon}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeatherRequest {
    pub place: PlaceQuery,
    pub units: Units,
}

impl WeatherRequest {
    pub fn city(name: impl Into<String>) -> Self {
        Self { place: PlaceQuery::City(name.into()), units: Units::default() }
    }

    pub fn coordinates(lat: f64, lon: f64) -> Self {
        Self { place: PlaceQuery::Coordinates { lat, lon }, units: Units::default() }
    }

    pub fn with_units(mut self, units: Units) -> Self {
        self.units = units;
        self
    }

    /// Query parameters for the request, without the API key.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = match &self.place {
            PlaceQuery::City(name) => vec![("q", name.clone())],
            PlaceQuery::Coordinates { lat, lon } => {
                vec![("lat", lat.to_string()), ("lon", lon.to_string())]
            }
        };

        params.push(("units", self.units.as_str().to_string()));
        params
    }
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("No response received: {0}")]
    NoResponse(String),

    #[error("Response body is empty")]
    EmptyBody,

    #[error("'main' section missing in API response")]
    MissingMain,

    #[error("Failed to parse weather JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Decoded body of a successful `weather` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherResponse {
    pub main: MainInfo,

    #[serde(default)]
    pub weather: Vec<WeatherDescription>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub sys: Option<SysInfo>,

    #[serde(default)]
    pub coord: Option<Coord>,

    /// Observation time, unix seconds.
    #[serde(default)]
    pub dt: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MainInfo {
    pub temp: f64,

    #[serde(default)]
    pub feels_like: Option<f64>,

    #[serde(default)]
    pub humidity: Option<f64>,

    #[serde(default)]
    pub pressure: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherDescription {
    #[serde(default)]
    pub id: Option<u32>,

    #[serde(default)]
    pub main: Option<String>,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SysInfo {
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    pub lat: f64,
    pub lon: f64,
}

impl WeatherResponse {
    /// Decode a response body.
    ///
    /// A body without a `main` object is reported as [`DecodeError::MissingMain`]
    /// rather than a generic shape error, since that is what the service sends
    /// back alongside error statuses.
    pub fn from_json(body: &str) -> Result<Self, DecodeError> {
        if body.trim().is_empty() {
            return Err(DecodeError::EmptyBody);
        }

        let value: serde_json::Value = serde_json::from_str(body)?;

        if !value.get("main").is_some_and(serde_json::Value::is_object) {
            return Err(DecodeError::MissingMain);
        }

        Ok(serde_json::from_value(value)?)
    }

    pub fn country(&self) -> Option<&str> {
        self.sys.as_ref().and_then(|s| s.country.as_deref())
    }

    /// First condition description, if the service sent any.
    pub fn condition(&self) -> Option<&str> {
        self.weather.first().map(|w| w.description.as_str())
    }

    pub fn observed_at(&self) -> Option<DateTime<Utc>> {
        self.dt.and_then(|ts| DateTime::from_timestamp(ts, 0))
    }
}
