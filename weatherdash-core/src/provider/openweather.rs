use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::model::{Coordinates, LocationLabel};

use super::{LocationProvider, get_json, http_client};

pub const OPENWEATHER_BASE_URL: &str = "https://api.openweathermap.org";

/// Reverse geocoding through the OpenWeather geo API.
#[derive(Debug, Clone)]
pub struct OpenWeatherGeocoder {
    api_key: String,
    http: Client,
    base_url: String,
}

impl OpenWeatherGeocoder {
    pub fn with_base_url(api_key: String, base_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            api_key,
            http: http_client()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct OwGeoCandidate {
    name: String,
    state: Option<String>,
    country: Option<String>,
}

#[async_trait]
impl LocationProvider for OpenWeatherGeocoder {
    async fn reverse_geocode(&self, coordinates: Coordinates) -> Result<Vec<LocationLabel>> {
        let url = format!("{}/geo/1.0/reverse", self.base_url);

        let parsed: Vec<OwGeoCandidate> = get_json(
            &self.http,
            &url,
            &[
                ("lat", coordinates.latitude.to_string()),
                ("lon", coordinates.longitude.to_string()),
                ("limit", "1".to_string()),
                ("appid", self.api_key.clone()),
            ],
            "OpenWeather reverse geocoding",
        )
        .await?;

        Ok(parsed
            .into_iter()
            .map(|c| LocationLabel {
                name: c.name,
                state: c.state,
                country: c.country,
            })
            .collect())
    }
}
