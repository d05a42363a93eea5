use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::{error::DashboardError, icon::IconBucket, moon::MoonPhase};

/// Decimal-degree position handed to every upstream call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Parse coordinates as they arrive from a query string or the command line.
    ///
    /// Range checking is left to the providers; only unparsable or non-finite
    /// values are rejected here.
    pub fn parse(latitude: &str, longitude: &str) -> Result<Self, DashboardError> {
        let parse_one = |raw: &str, what: &str| -> Result<f64, DashboardError> {
            let value: f64 = raw.trim().parse().map_err(|_| {
                DashboardError::InvalidCoordinates(format!("{what} '{raw}' is not a number"))
            })?;
            if !value.is_finite() {
                return Err(DashboardError::InvalidCoordinates(format!(
                    "{what} '{raw}' is not finite"
                )));
            }
            Ok(value)
        };

        Ok(Self {
            latitude: parse_one(latitude, "latitude")?,
            longitude: parse_one(longitude, "longitude")?,
        })
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    Standard,
    Metric,
    #[default]
    Imperial,
}

impl UnitSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitSystem::Standard => "standard",
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
        }
    }

    pub const fn all() -> &'static [UnitSystem] {
        &[UnitSystem::Standard, UnitSystem::Metric, UnitSystem::Imperial]
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for UnitSystem {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "standard" => Ok(UnitSystem::Standard),
            "metric" => Ok(UnitSystem::Metric),
            "imperial" => Ok(UnitSystem::Imperial),
            _ => Err(anyhow::anyhow!(
                "Unknown unit system '{value}'. Supported unit systems: standard, metric, imperial."
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimeFormat {
    #[default]
    #[serde(rename = "12h")]
    TwelveHour,
    #[serde(rename = "24h")]
    TwentyFourHour,
}

impl TimeFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeFormat::TwelveHour => "12h",
            TimeFormat::TwentyFourHour => "24h",
        }
    }

    pub const fn all() -> &'static [TimeFormat] {
        &[TimeFormat::TwelveHour, TimeFormat::TwentyFourHour]
    }
}

impl fmt::Display for TimeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TimeFormat {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "12h" | "12" => Ok(TimeFormat::TwelveHour),
            "24h" | "24" => Ok(TimeFormat::TwentyFourHour),
            _ => Err(anyhow::anyhow!(
                "Unknown time format '{value}'. Supported time formats: 12h, 24h."
            )),
        }
    }
}

/// Everything the normalizer needs to know about one dashboard refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardRequest {
    pub coordinates: Coordinates,
    /// When set, used verbatim as the header label and reverse geocoding is skipped.
    pub location_override: Option<String>,
    pub units: UnitSystem,
    pub time_format: TimeFormat,
}

impl DashboardRequest {
    pub fn new(coordinates: Coordinates) -> Self {
        Self {
            coordinates,
            location_override: None,
            units: UnitSystem::default(),
            time_format: TimeFormat::default(),
        }
    }

    pub fn with_location_override(mut self, name: impl Into<String>) -> Self {
        self.location_override = Some(name.into());
        self
    }

    pub fn with_units(mut self, units: UnitSystem) -> Self {
        self.units = units;
        self
    }

    pub fn with_time_format(mut self, time_format: TimeFormat) -> Self {
        self.time_format = time_format;
        self
    }
}

/// Resolved place name. Renders as `"{name}, {state}"`, falling back to the country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationLabel {
    pub name: String,
    pub state: Option<String>,
    pub country: Option<String>,
}

impl fmt::Display for LocationLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let region = self
            .state
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.country.as_deref().filter(|c| !c.is_empty()));

        match region {
            Some(region) => write!(f, "{}, {}", self.name, region),
            None => f.write_str(&self.name),
        }
    }
}

/// Snapshot of current conditions as returned by the forecast provider.
#[derive(Debug, Clone, PartialEq)]
pub struct RawCurrentConditions {
    pub time: DateTime<FixedOffset>,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: f64,
    pub pressure: f64,
    pub wind_speed: f64,
    pub uv_index: f64,
    /// Feet in every unit system; divided by 5280 for display.
    pub visibility: f64,
    pub weather_code: i32,
    /// Absent in polar day/night.
    pub sunrise: Option<DateTime<FixedOffset>>,
    pub sunset: Option<DateTime<FixedOffset>>,
    /// Today's apparent-temperature range.
    pub min_temp: f64,
    pub max_temp: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawDailyForecastEntry {
    pub time: DateTime<FixedOffset>,
    pub weather_code: i32,
    pub min_temp: f64,
    pub max_temp: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawHourlyEntry {
    pub time: DateTime<FixedOffset>,
    pub temperature: f64,
    pub precipitation_probability: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AirQuality {
    pub us_aqi: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Sunrise,
    Sunset,
    Wind,
    Humidity,
    Pressure,
    UvIndex,
    Visibility,
    AirQuality,
}

impl MetricKind {
    pub fn label(&self) -> &'static str {
        match self {
            MetricKind::Sunrise => "Sunrise",
            MetricKind::Sunset => "Sunset",
            MetricKind::Wind => "Wind",
            MetricKind::Humidity => "Humidity",
            MetricKind::Pressure => "Pressure",
            MetricKind::UvIndex => "UV Index",
            MetricKind::Visibility => "Visibility",
            MetricKind::AirQuality => "Air Quality",
        }
    }
}

/// One entry of the metrics strip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metric {
    pub kind: MetricKind,
    pub label: String,
    pub measurement: String,
    pub unit: String,
}

impl Metric {
    pub fn new(kind: MetricKind, measurement: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            kind,
            label: kind.label().to_string(),
            measurement: measurement.into(),
            unit: unit.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyPoint {
    pub time: DateTime<FixedOffset>,
    pub temperature: f64,
    pub precipitation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub day: String,
    pub icon: IconBucket,
    pub high: f64,
    pub low: f64,
    pub moon_phase: MoonPhase,
    pub moon_phase_percent: String,
}

/// Provider-agnostic shape consumed by the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayModel {
    pub current_date: String,
    pub location: String,
    pub current_icon: IconBucket,
    pub current_temperature: String,
    pub feels_like: String,
    pub today_high: String,
    pub today_low: String,
    pub temperature_unit: String,
    pub units: UnitSystem,
    pub time_format: TimeFormat,
    pub metrics: Vec<Metric>,
    pub hourly: Vec<HourlyPoint>,
    pub forecast: Vec<ForecastDay>,
}

impl DisplayModel {
    pub fn metric(&self, kind: MetricKind) -> Option<&Metric> {
        self.metrics.iter().find(|m| m.kind == kind)
    }
}
