use crate::{
    Config,
    model::{
        AirQuality, Coordinates, LocationLabel, RawCurrentConditions, RawDailyForecastEntry,
        RawHourlyEntry, UnitSystem,
    },
    provider::{openmeteo::OpenMeteoClient, openweather::OpenWeatherGeocoder},
};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::{fmt::Debug, sync::Arc, time::Duration};

pub mod openmeteo;
pub mod openweather;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Coordinates to place-name candidates, best first.
#[async_trait]
pub trait LocationProvider: Send + Sync + Debug {
    async fn reverse_geocode(&self, coordinates: Coordinates) -> Result<Vec<LocationLabel>>;
}

/// Current, hourly and daily forecast data, already in the requested unit system.
#[async_trait]
pub trait ForecastProvider: Send + Sync + Debug {
    async fn current(
        &self,
        coordinates: Coordinates,
        units: UnitSystem,
    ) -> Result<RawCurrentConditions>;

    /// Next 24 hours, ascending.
    async fn hourly(&self, coordinates: Coordinates, units: UnitSystem)
    -> Result<Vec<RawHourlyEntry>>;

    /// Seven calendar days starting today, ascending.
    async fn daily(
        &self,
        coordinates: Coordinates,
        units: UnitSystem,
    ) -> Result<Vec<RawDailyForecastEntry>>;
}

#[async_trait]
pub trait AirQualityProvider: Send + Sync + Debug {
    async fn current_aqi(&self, coordinates: Coordinates) -> Result<AirQuality>;
}

/// The set of upstream clients one dashboard build talks to.
#[derive(Debug, Clone)]
pub struct Upstreams {
    /// `None` when no geocoding credential is configured; only needed without a location override.
    pub location: Option<Arc<dyn LocationProvider>>,
    pub forecast: Arc<dyn ForecastProvider>,
    pub air_quality: Arc<dyn AirQualityProvider>,
}

/// Construct the upstream clients from config. `api_key` overrides the configured key.
pub fn upstreams_from_config(config: &Config, api_key: Option<String>) -> Result<Upstreams> {
    let location = match api_key.or_else(|| config.api_key().map(str::to_owned)) {
        Some(key) => {
            let geocoder = OpenWeatherGeocoder::with_base_url(key, &config.endpoints.geocoding)?;
            Some(Arc::new(geocoder) as Arc<dyn LocationProvider>)
        }
        None => None,
    };

    let meteo = Arc::new(OpenMeteoClient::with_base_urls(
        &config.endpoints.forecast,
        &config.endpoints.air_quality,
    )?);

    Ok(Upstreams {
        location,
        forecast: meteo.clone(),
        air_quality: meteo,
    })
}

pub(crate) fn http_client() -> Result<Client> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")
}

/// GET `url` and decode a JSON body, treating any non-2xx status as failure.
pub(crate) async fn get_json<T: DeserializeOwned>(
    http: &Client,
    url: &str,
    query: &[(&str, String)],
    what: &str,
) -> Result<T> {
    let res = http
        .get(url)
        .query(query)
        .send()
        .await
        .map_err(reqwest::Error::without_url)
        .with_context(|| format!("Failed to send {what} request"))?;

    let status = res.status();
    let body = res
        .text()
        .await
        .with_context(|| format!("Failed to read {what} response body"))?;

    if !status.is_success() {
        return Err(anyhow!(
            "{what} request failed with status {status}: {}",
            truncate_body(&body),
        ));
    }

    serde_json::from_str(&body).with_context(|| format!("Failed to parse {what} JSON"))
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_body_keeps_short_bodies() {
        assert_eq!(truncate_body("{\"error\":true}"), "{\"error\":true}");
    }

    #[test]
    fn truncate_body_cuts_on_char_boundary() {
        let body = "é".repeat(300);
        let cut = truncate_body(&body);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), 203);
    }

    #[test]
    fn upstreams_without_api_key_have_no_geocoder() {
        let cfg = Config::default();
        let upstreams = upstreams_from_config(&cfg, None).expect("clients build");
        assert!(upstreams.location.is_none());
    }

    #[test]
    fn explicit_api_key_enables_geocoder() {
        let cfg = Config::default();
        let upstreams =
            upstreams_from_config(&cfg, Some("KEY".to_string())).expect("clients build");
        assert!(upstreams.location.is_some());
    }

    #[test]
    fn configured_api_key_enables_geocoder() {
        let mut cfg = Config::default();
        cfg.set_api_key("OPEN_KEY".to_string());
        let upstreams = upstreams_from_config(&cfg, None).expect("clients build");
        assert!(upstreams.location.is_some());
    }
}
