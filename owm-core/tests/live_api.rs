//! Checks against the real OpenWeatherMap service.
//!
//! Ignored by default. Run with credentials in the environment (or `.env`):
//!
//! ```text
//! OPENWEATHERMAP_API_KEY=... OPENWEATHERMAP_BASE_URL=https://api.openweathermap.org/data/2.5 \
//!     cargo test -p owm-core --test live_api -- --ignored
//! ```

use owm_core::{OpenWeatherClient, Settings, Units, WeatherApi, WeatherRequest};
use reqwest::StatusCode;

/// Client built from the ambient settings, or `None` to skip the test.
fn live_client() -> Option<(Settings, OpenWeatherClient)> {
    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("skipping live test, settings unavailable: {err}");
            return None;
        }
    };

    let client = OpenWeatherClient::new(settings.clone()).expect("client must build");
    Some((settings, client))
}

#[tokio::test]
#[ignore = "calls the live OpenWeatherMap API"]
async fn valid_city_returns_success() {
    let Some((_, client)) = live_client() else { return };

    let result = client.fetch_weather("Belgrade").await;
    eprintln!("status: {:?}\nbody: {}", result.status(), result.body().unwrap_or("<none>"));

    assert_eq!(result.status(), Some(StatusCode::OK));
    let weather = result.decode().expect("body must decode");
    assert!(weather.main.temp > -100.0);
    assert!(!weather.weather.is_empty());
}

#[tokio::test]
#[ignore = "calls the live OpenWeatherMap API"]
async fn malformed_key_yields_401() {
    let Some((settings, _)) = live_client() else { return };

    let bad = Settings::new(settings.base_url(), "00000000000000000000000000000000")
        .expect("settings must build");
    let client = OpenWeatherClient::new(bad).expect("client must build");

    let result = client.fetch_weather("Belgrade").await;

    assert_eq!(result.status(), Some(StatusCode::UNAUTHORIZED));
    assert!(result.body().is_some_and(|b| b.contains("Invalid API key")));
}

#[tokio::test]
#[ignore = "calls the live OpenWeatherMap API"]
async fn empty_key_yields_401() {
    let Some((_, client)) = live_client() else { return };

    let result = client.fetch_raw(&[("q", "Belgrade"), ("appid", "")]).await;

    assert_eq!(result.status(), Some(StatusCode::UNAUTHORIZED));
}

#[tokio::test]
#[ignore = "calls the live OpenWeatherMap API"]
async fn coordinates_resolve_to_novi_sad() {
    let Some((_, client)) = live_client() else { return };

    let result = client.fetch_coordinates(45.2517, 19.8369, Units::Metric).await;

    assert_eq!(result.status(), Some(StatusCode::OK));
    let weather = result.decode().expect("body must decode");
    assert!(
        weather.name.as_deref().is_some_and(|n| n.contains("Novi Sad")),
        "unexpected place {:?}",
        weather.name
    );
    assert_eq!(weather.country(), Some("RS"));
}

#[tokio::test]
#[ignore = "calls the live OpenWeatherMap API"]
async fn symbol_only_place_yields_404() {
    let Some((_, client)) = live_client() else { return };

    let result = client.fetch_weather("@@@###").await;

    assert_eq!(result.status(), Some(StatusCode::NOT_FOUND));
}

#[tokio::test]
#[ignore = "calls the live OpenWeatherMap API"]
async fn no_parameters_is_rejected() {
    let Some((_, client)) = live_client() else { return };

    let status = client.fetch_raw(&[]).await.status().expect("expected a response");

    assert!(
        status == StatusCode::UNAUTHORIZED || status == StatusCode::BAD_REQUEST,
        "unexpected status {status}"
    );
}

#[tokio::test]
#[ignore = "calls the live OpenWeatherMap API"]
async fn very_long_place_name_is_not_a_server_error() {
    let Some((_, client)) = live_client() else { return };

    let status = client
        .fetch_weather(&"a".repeat(500))
        .await
        .status()
        .expect("expected a response");

    assert!(!status.is_server_error(), "server error {status}");
    assert!(status == StatusCode::NOT_FOUND || status == StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "calls the live OpenWeatherMap API"]
async fn every_unit_system_decodes() {
    let Some((_, client)) = live_client() else { return };

    for units in Units::all() {
        let result = client.fetch(&WeatherRequest::city("Belgrade").with_units(*units)).await;

        assert_eq!(result.status(), Some(StatusCode::OK), "units={units}");
        let weather = result.decode().unwrap_or_else(|e| panic!("units={units}: {e}"));
        assert!(weather.main.temp.is_finite());
    }
}
