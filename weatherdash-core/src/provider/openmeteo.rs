use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, TimeZone};
use reqwest::Client;
use serde::Deserialize;

use crate::model::{
    AirQuality, Coordinates, RawCurrentConditions, RawDailyForecastEntry, RawHourlyEntry,
    UnitSystem,
};

use super::{AirQualityProvider, ForecastProvider, get_json, http_client};

pub const FORECAST_BASE_URL: &str = "https://api.open-meteo.com";
pub const AIR_QUALITY_BASE_URL: &str = "https://air-quality-api.open-meteo.com";

const KELVIN_OFFSET: f64 = 273.15;
const FEET_PER_METRE: f64 = 3.28084;

const CURRENT_VARIABLES: &str = "temperature_2m,relative_humidity_2m,apparent_temperature,weather_code,surface_pressure,wind_speed_10m,visibility";
const CURRENT_DAILY_VARIABLES: &str =
    "uv_index_max,sunset,sunrise,apparent_temperature_max,apparent_temperature_min";
const HOURLY_VARIABLES: &str = "temperature_2m,precipitation_probability";
const DAILY_VARIABLES: &str = "apparent_temperature_max,apparent_temperature_min,weather_code";

/// Open-Meteo forecast and air-quality APIs. Neither needs a credential.
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    http: Client,
    forecast_url: String,
    air_quality_url: String,
}

impl OpenMeteoClient {
    pub fn with_base_urls(forecast_base: &str, air_quality_base: &str) -> Result<Self> {
        Ok(Self {
            http: http_client()?,
            forecast_url: format!("{}/v1/forecast", forecast_base.trim_end_matches('/')),
            air_quality_url: format!("{}/v1/air-quality", air_quality_base.trim_end_matches('/')),
        })
    }

    fn forecast_query(
        coordinates: Coordinates,
        units: UnitSystem,
        forecast_days: u8,
    ) -> Vec<(&'static str, String)> {
        let (temperature_unit, wind_speed_unit, precipitation_unit) = unit_selectors(units);
        vec![
            ("latitude", coordinates.latitude.to_string()),
            ("longitude", coordinates.longitude.to_string()),
            ("forecast_days", forecast_days.to_string()),
            ("timezone", "auto".to_string()),
            ("timeformat", "unixtime".to_string()),
            ("temperature_unit", temperature_unit.to_string()),
            ("wind_speed_unit", wind_speed_unit.to_string()),
            ("precipitation_unit", precipitation_unit.to_string()),
        ]
    }
}

/// Provider selectors for temperature, wind speed and precipitation.
///
/// There is no Kelvin selector; standard requests Celsius and is shifted on the way out.
fn unit_selectors(units: UnitSystem) -> (&'static str, &'static str, &'static str) {
    match units {
        UnitSystem::Imperial => ("fahrenheit", "mph", "inch"),
        UnitSystem::Metric | UnitSystem::Standard => ("celsius", "ms", "mm"),
    }
}

fn temperature_in(units: UnitSystem, value: f64) -> f64 {
    match units {
        UnitSystem::Standard => value + KELVIN_OFFSET,
        UnitSystem::Metric | UnitSystem::Imperial => value,
    }
}

/// Visibility in feet. The provider reports metres unless Fahrenheit was requested.
fn visibility_in(units: UnitSystem, value: f64) -> f64 {
    match units {
        UnitSystem::Imperial => value,
        UnitSystem::Metric | UnitSystem::Standard => value * FEET_PER_METRE,
    }
}

fn response_offset(utc_offset_seconds: i32) -> Result<FixedOffset> {
    FixedOffset::east_opt(utc_offset_seconds)
        .ok_or_else(|| anyhow!("Open-Meteo returned invalid utc_offset_seconds {utc_offset_seconds}"))
}

fn local_time(offset: &FixedOffset, unix: i64) -> Result<DateTime<FixedOffset>> {
    offset
        .timestamp_opt(unix, 0)
        .single()
        .ok_or_else(|| anyhow!("Open-Meteo returned out-of-range timestamp {unix}"))
}

fn first_value<T: Copy>(values: &[Option<T>]) -> Option<T> {
    values.first().copied().flatten()
}

#[derive(Debug, Deserialize)]
struct OmCurrentResponse {
    utc_offset_seconds: i32,
    current: OmCurrent,
    daily: OmCurrentDaily,
}

#[derive(Debug, Deserialize)]
struct OmCurrent {
    time: i64,
    temperature_2m: f64,
    relative_humidity_2m: f64,
    apparent_temperature: f64,
    weather_code: i32,
    surface_pressure: f64,
    wind_speed_10m: f64,
    visibility: f64,
}

#[derive(Debug, Deserialize)]
struct OmCurrentDaily {
    #[serde(default)]
    uv_index_max: Vec<Option<f64>>,
    #[serde(default)]
    sunrise: Vec<Option<i64>>,
    #[serde(default)]
    sunset: Vec<Option<i64>>,
    #[serde(default)]
    apparent_temperature_max: Vec<Option<f64>>,
    #[serde(default)]
    apparent_temperature_min: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct OmHourlyResponse {
    utc_offset_seconds: i32,
    hourly: OmHourly,
}

#[derive(Debug, Deserialize)]
struct OmHourly {
    time: Vec<i64>,
    temperature_2m: Vec<Option<f64>>,
    precipitation_probability: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct OmDailyResponse {
    utc_offset_seconds: i32,
    daily: OmDaily,
}

#[derive(Debug, Deserialize)]
struct OmDaily {
    time: Vec<i64>,
    apparent_temperature_max: Vec<Option<f64>>,
    apparent_temperature_min: Vec<Option<f64>>,
    weather_code: Vec<Option<i32>>,
}

#[derive(Debug, Deserialize)]
struct OmAirQualityResponse {
    current: Option<OmAirQualityCurrent>,
}

#[derive(Debug, Deserialize)]
struct OmAirQualityCurrent {
    us_aqi: Option<f64>,
}

fn parse_current(parsed: OmCurrentResponse, units: UnitSystem) -> Result<RawCurrentConditions> {
    let offset = response_offset(parsed.utc_offset_seconds)?;
    let current = parsed.current;
    let daily = parsed.daily;

    let sunrise = first_value(&daily.sunrise)
        .map(|ts| local_time(&offset, ts))
        .transpose()?;
    let sunset = first_value(&daily.sunset)
        .map(|ts| local_time(&offset, ts))
        .transpose()?;

    let max_temp = first_value(&daily.apparent_temperature_max)
        .map(|t| temperature_in(units, t))
        .unwrap_or_default();
    let min_temp = first_value(&daily.apparent_temperature_min)
        .map(|t| temperature_in(units, t))
        .unwrap_or_default();

    Ok(RawCurrentConditions {
        time: local_time(&offset, current.time)?,
        temperature: temperature_in(units, current.temperature_2m),
        feels_like: temperature_in(units, current.apparent_temperature),
        humidity: current.relative_humidity_2m,
        pressure: current.surface_pressure,
        wind_speed: current.wind_speed_10m,
        uv_index: first_value(&daily.uv_index_max).unwrap_or_default(),
        visibility: visibility_in(units, current.visibility).round(),
        weather_code: current.weather_code,
        sunrise,
        sunset,
        min_temp,
        max_temp,
    })
}

fn parse_hourly(parsed: OmHourlyResponse, units: UnitSystem) -> Result<Vec<RawHourlyEntry>> {
    let offset = response_offset(parsed.utc_offset_seconds)?;
    let hourly = parsed.hourly;

    let mut out = Vec::with_capacity(hourly.time.len());
    for (idx, ts) in hourly.time.iter().enumerate() {
        let Some(temperature) = hourly.temperature_2m.get(idx).copied().flatten() else {
            tracing::debug!(timestamp = ts, "hourly entry without temperature skipped");
            continue;
        };

        out.push(RawHourlyEntry {
            time: local_time(&offset, *ts)?,
            temperature: temperature_in(units, temperature),
            precipitation_probability: hourly
                .precipitation_probability
                .get(idx)
                .copied()
                .flatten()
                .unwrap_or_default(),
        });
    }
    Ok(out)
}

fn parse_daily(parsed: OmDailyResponse, units: UnitSystem) -> Result<Vec<RawDailyForecastEntry>> {
    let offset = response_offset(parsed.utc_offset_seconds)?;
    let daily = parsed.daily;

    let mut out = Vec::with_capacity(daily.time.len());
    for (idx, ts) in daily.time.iter().enumerate() {
        let max = daily.apparent_temperature_max.get(idx).copied().flatten();
        let min = daily.apparent_temperature_min.get(idx).copied().flatten();
        let code = daily.weather_code.get(idx).copied().flatten();

        let (Some(max), Some(min), Some(code)) = (max, min, code) else {
            tracing::debug!(timestamp = ts, "incomplete daily entry skipped");
            continue;
        };

        out.push(RawDailyForecastEntry {
            time: local_time(&offset, *ts)?,
            weather_code: code,
            min_temp: temperature_in(units, min),
            max_temp: temperature_in(units, max),
        });
    }
    Ok(out)
}

#[async_trait]
impl ForecastProvider for OpenMeteoClient {
    async fn current(
        &self,
        coordinates: Coordinates,
        units: UnitSystem,
    ) -> Result<RawCurrentConditions> {
        let mut query = Self::forecast_query(coordinates, units, 1);
        query.push(("current", CURRENT_VARIABLES.to_string()));
        query.push(("daily", CURRENT_DAILY_VARIABLES.to_string()));

        let parsed: OmCurrentResponse =
            get_json(&self.http, &self.forecast_url, &query, "Open-Meteo current").await?;

        parse_current(parsed, units).context("Failed to interpret Open-Meteo current conditions")
    }

    async fn hourly(
        &self,
        coordinates: Coordinates,
        units: UnitSystem,
    ) -> Result<Vec<RawHourlyEntry>> {
        let mut query = Self::forecast_query(coordinates, units, 1);
        query.push(("hourly", HOURLY_VARIABLES.to_string()));

        let parsed: OmHourlyResponse =
            get_json(&self.http, &self.forecast_url, &query, "Open-Meteo hourly").await?;

        parse_hourly(parsed, units).context("Failed to interpret Open-Meteo hourly forecast")
    }

    async fn daily(
        &self,
        coordinates: Coordinates,
        units: UnitSystem,
    ) -> Result<Vec<RawDailyForecastEntry>> {
        let mut query = Self::forecast_query(coordinates, units, 7);
        query.push(("daily", DAILY_VARIABLES.to_string()));

        let parsed: OmDailyResponse =
            get_json(&self.http, &self.forecast_url, &query, "Open-Meteo daily").await?;

        parse_daily(parsed, units).context("Failed to interpret Open-Meteo daily forecast")
    }
}

#[async_trait]
impl AirQualityProvider for OpenMeteoClient {
    async fn current_aqi(&self, coordinates: Coordinates) -> Result<AirQuality> {
        let query = [
            ("latitude", coordinates.latitude.to_string()),
            ("longitude", coordinates.longitude.to_string()),
            ("current", "us_aqi".to_string()),
            ("timezone", "auto".to_string()),
        ];

        let parsed: OmAirQualityResponse = get_json(
            &self.http,
            &self.air_quality_url,
            &query,
            "Open-Meteo air quality",
        )
        .await?;

        Ok(AirQuality {
            us_aqi: parsed.current.and_then(|c| c.us_aqi).map(f64::round),
        })
    }
}
