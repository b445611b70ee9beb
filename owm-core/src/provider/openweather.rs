use async_trait::async_trait;
use reqwest::{Client, header::CONTENT_TYPE};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::{config::Settings, model::WeatherRequest};

use super::{HttpResult, RawResponse, TransportError, TransportErrorKind, WeatherApi};

/// Upper bound on a whole call, connect through body.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

const USER_AGENT: &str = concat!("owm-client/", env!("CARGO_PKG_VERSION"));

/// Client for `<BaseUrl>/weather`. Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    settings: Settings,
    endpoint: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(settings: Settings) -> Result<Self, reqwest::Error> {
        Self::with_timeout(settings, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(settings: Settings, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder().user_agent(USER_AGENT).timeout(timeout).build()?;
        let endpoint = format!("{}/weather", settings.base_url().trim_end_matches('/'));

        Ok(Self { settings, endpoint, http })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// GET the endpoint with exactly `params`; the API key is not added.
    pub async fn fetch_raw(&self, params: &[(&str, &str)]) -> HttpResult {
        self.send(params).await
    }

    async fn send<P>(&self, params: &P) -> HttpResult
    where
        P: Serialize + ?Sized + Sync,
    {
        let res = match self.http.get(&self.endpoint).query(params).send().await {
            Ok(res) => res,
            Err(err) => return transport_failure(err),
        };

        let status = res.status();
        let headers = res.headers().clone();
        let content_type =
            headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()).map(str::to_string);

        match res.text().await {
            Ok(body) => {
                debug!(%status, bytes = body.len(), "received response");
                HttpResult::Response(RawResponse { status, content_type, headers, body })
            }
            Err(err) => transport_failure(err),
        }
    }
}

#[async_trait]
impl WeatherApi for OpenWeatherClient {
    #[instrument(skip(self, request), fields(place = %request.place, units = %request.units))]
    async fn fetch(&self, request: &WeatherRequest) -> HttpResult {
        let mut params = request.query_params();
        params.push(("appid", self.settings.api_key().to_string()));

        self.send(&params).await
    }
}

fn transport_failure(err: reqwest::Error) -> HttpResult {
    let kind = classify(&err);
    // The URL carries the API key in its query string.
    let message = err.without_url().to_string();

    warn!(%kind, error = %message, "request failed before a response was received");
    HttpResult::TransportFailure(TransportError::new(kind, message))
}

fn classify(err: &reqwest::Error) -> TransportErrorKind {
    if err.is_timeout() {
        TransportErrorKind::Timeout
    } else if err.is_connect() {
        TransportErrorKind::Connect
    } else if err.is_body() || err.is_decode() {
        TransportErrorKind::Body
    } else {
        TransportErrorKind::Request
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(base_url: &str) -> Settings {
        Settings::new(base_url, "KEY").expect("settings must build")
    }

    #[test]
    fn endpoint_appends_weather_path() {
        let client = OpenWeatherClient::new(settings("https://api.openweathermap.org/data/2.5"))
            .expect("client must build");

        assert_eq!(client.endpoint(), "https://api.openweathermap.org/data/2.5/weather");
    }

    #[test]
    fn endpoint_ignores_trailing_slash() {
        let client = OpenWeatherClient::new(settings("https://api.openweathermap.org/data/2.5/"))
            .expect("client must build");

        assert_eq!(client.endpoint(), "https://api.openweathermap.org/data/2.5/weather");
    }

    #[tokio::test]
    async fn refused_connection_is_a_value_not_an_error() {
        // Port 1 is reserved and nothing listens on it.
        let client = OpenWeatherClient::with_timeout(
            settings("http://127.0.0.1:1"),
            Duration::from_secs(2),
        )
        .expect("client must build");

        let result = client.fetch_weather("Belgrade").await;

        let err = result.transport_error().expect("expected a transport failure");
        assert!(matches!(err.kind, TransportErrorKind::Connect | TransportErrorKind::Timeout));
        assert!(!err.message.contains("KEY"));
        assert_eq!(result.status(), None);
    }
}
