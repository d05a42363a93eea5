//! Folds the geocoding, forecast and air-quality results into one [`DisplayModel`].

use chrono::Duration;

use crate::{
    error::{DashboardError, UpstreamCall},
    icon::code_to_icon_bucket,
    metrics::{build_metrics, format_whole},
    model::{
        AirQuality, DashboardRequest, DisplayModel, ForecastDay, HourlyPoint,
        RawCurrentConditions, RawDailyForecastEntry, RawHourlyEntry,
    },
    moon::{MoonPhase, illumination_percent, phase_fraction},
    provider::Upstreams,
    units::units_for,
};

/// Fetch everything the dashboard needs for `request` and assemble the display model.
///
/// All upstream calls run concurrently. A failed geocoding, current, hourly or
/// daily call fails the whole build; a failed air-quality call only drops the
/// air quality metric.
pub async fn build_display_model(
    upstreams: &Upstreams,
    request: &DashboardRequest,
) -> Result<DisplayModel, DashboardError> {
    let coordinates = request.coordinates;
    let units = request.units;

    let (location, current, hourly, daily, air_quality) = tokio::join!(
        resolve_location(upstreams, request),
        upstreams.forecast.current(coordinates, units),
        upstreams.forecast.hourly(coordinates, units),
        upstreams.forecast.daily(coordinates, units),
        upstreams.air_quality.current_aqi(coordinates),
    );

    let location = location?;
    let current = current.map_err(|e| DashboardError::upstream(UpstreamCall::Current, e))?;
    let hourly = hourly.map_err(|e| DashboardError::upstream(UpstreamCall::Hourly, e))?;
    let daily = daily.map_err(|e| DashboardError::upstream(UpstreamCall::Daily, e))?;
    let air_quality = air_quality.unwrap_or_else(|err| {
        tracing::warn!(error = %format!("{err:#}"), "air quality unavailable, metric omitted");
        AirQuality::default()
    });

    let model = assemble_display_model(request, location, &current, hourly, &daily, air_quality);

    tracing::info!(
        location = %model.location,
        metrics = model.metrics.len(),
        hourly = model.hourly.len(),
        forecast_days = model.forecast.len(),
        "display model built"
    );

    Ok(model)
}

async fn resolve_location(
    upstreams: &Upstreams,
    request: &DashboardRequest,
) -> Result<String, DashboardError> {
    if let Some(name) = &request.location_override {
        return Ok(name.clone());
    }

    let geocoder = upstreams
        .location
        .as_ref()
        .ok_or(DashboardError::MissingApiKey)?;

    let candidates = geocoder
        .reverse_geocode(request.coordinates)
        .await
        .map_err(|e| DashboardError::upstream(UpstreamCall::Geocoding, e))?;

    candidates
        .into_iter()
        .next()
        .map(|label| label.to_string())
        .ok_or(DashboardError::LocationNotFound(request.coordinates))
}

/// Pure assembly step, split out so it can be tested without upstreams.
pub fn assemble_display_model(
    request: &DashboardRequest,
    location: String,
    current: &RawCurrentConditions,
    hourly: Vec<RawHourlyEntry>,
    daily: &[RawDailyForecastEntry],
    air_quality: AirQuality,
) -> DisplayModel {
    DisplayModel {
        current_date: current.time.format("%A, %B %-d").to_string(),
        location,
        current_icon: code_to_icon_bucket(current.weather_code),
        current_temperature: format_whole(current.temperature),
        feels_like: format_whole(current.feels_like),
        today_high: format_whole(current.max_temp),
        today_low: format_whole(current.min_temp),
        temperature_unit: units_for(request.units).temperature.to_string(),
        units: request.units,
        time_format: request.time_format,
        metrics: build_metrics(current, air_quality, request.units, request.time_format),
        hourly: build_hourly(hourly),
        forecast: build_forecast(daily),
    }
}

/// Forecast days after today; the first daily entry is covered by the current block.
pub fn build_forecast(daily: &[RawDailyForecastEntry]) -> Vec<ForecastDay> {
    daily
        .iter()
        .skip(1)
        .map(|day| {
            let phase = phase_fraction(&(day.time + Duration::hours(12)));
            ForecastDay {
                day: day.time.format("%a").to_string(),
                icon: code_to_icon_bucket(day.weather_code),
                high: day.max_temp,
                low: day.min_temp,
                moon_phase: MoonPhase::from_fraction(phase),
                moon_phase_percent: illumination_percent(phase),
            }
        })
        .collect()
}

pub fn build_hourly(hourly: Vec<RawHourlyEntry>) -> Vec<HourlyPoint> {
    hourly
        .into_iter()
        .map(|h| HourlyPoint {
            time: h.time,
            temperature: h.temperature,
            precipitation: h.precipitation_probability,
        })
        .collect()
}
