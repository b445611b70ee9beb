use crate::model::{DecodeError, Units, WeatherRequest, WeatherResponse};
use async_trait::async_trait;
use reqwest::{StatusCode, header::HeaderMap};
use std::fmt::{self, Debug};
use thiserror::Error;

pub mod openweather;

/// Everything the server sent back, uninterpreted.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub headers: HeaderMap,
    pub body: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportErrorKind {
    Timeout,
    Connect,
    /// Headers arrived but the body could not be read.
    Body,
    Request,
}

impl TransportErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportErrorKind::Timeout => "timeout",
            TransportErrorKind::Connect => "connect",
            TransportErrorKind::Body => "body",
            TransportErrorKind::Request => "request",
        }
    }
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request that never produced an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} failure: {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }
}

/// Outcome of one call. Network failures are values here, not errors, so
/// callers branch on the variant before touching a body.
#[derive(Debug, Clone)]
pub enum HttpResult {
    Response(RawResponse),
    TransportFailure(TransportError),
}

impl HttpResult {
    pub fn status(&self) -> Option<StatusCode> {
        self.response().map(|r| r.status)
    }

    pub fn body(&self) -> Option<&str> {
        self.response().map(|r| r.body.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.response().and_then(|r| r.content_type.as_deref())
    }

    /// True only for a received 2xx response.
    pub fn is_success(&self) -> bool {
        self.status().is_some_and(|s| s.is_success())
    }

    pub fn response(&self) -> Option<&RawResponse> {
        match self {
            HttpResult::Response(r) => Some(r),
            HttpResult::TransportFailure(_) => None,
        }
    }

    pub fn transport_error(&self) -> Option<&TransportError> {
        match self {
            HttpResult::Response(_) => None,
            HttpResult::TransportFailure(e) => Some(e),
        }
    }

    /// Decode the body as a [`WeatherResponse`], whatever the status was.
    pub fn decode(&self) -> Result<WeatherResponse, DecodeError> {
        match self {
            HttpResult::Response(r) => WeatherResponse::from_json(&r.body),
            HttpResult::TransportFailure(e) => Err(DecodeError::NoResponse(e.to_string())),
        }
    }
}

/// The single capability this crate offers: look up current weather.
#[async_trait]
pub trait WeatherApi: Send + Sync + Debug {
    async fn fetch(&self, request: &WeatherRequest) -> HttpResult;

    /// Current weather for a place name, in metric units.
    async fn fetch_weather(&self, place: &str) -> HttpResult {
        self.fetch(&WeatherRequest::city(place)).await
    }

    async fn fetch_coordinates(&self, lat: f64, lon: f64, units: Units) -> HttpResult {
        self.fetch(&WeatherRequest::coordinates(lat, lon).with_units(units)).await
    }
}
