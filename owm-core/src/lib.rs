//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - Settings resolution (environment, `.env`, settings file)
//! - The OpenWeatherMap current-weather client, behind the [`WeatherApi`] trait
//! - The request and response models
//!
//! The client never fails for network or HTTP outcomes: every call yields an
//! [`HttpResult`], and decoding the body is left to the caller.

pub mod config;
pub mod model;
pub mod provider;

pub use config::{ConfigError, DEFAULT_BASE_URL, FileConfig, Settings};
pub use model::{DecodeError, PlaceQuery, Units, WeatherRequest, WeatherResponse};
pub use provider::{
    HttpResult, RawResponse, TransportError, TransportErrorKind, WeatherApi,
    openweather::OpenWeatherClient,
};
