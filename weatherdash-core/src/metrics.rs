//! The metrics strip: sunrise/sunset, wind, humidity, pressure, UV, visibility and air quality.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    model::{AirQuality, Metric, MetricKind, RawCurrentConditions, TimeFormat, UnitSystem},
    time_format::format_time,
    units::units_for,
};

const FEET_PER_MILE: f64 = 5280.0;

/// US AQI band, using the dashboard's own wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AqiCategory {
    Good,
    Fair,
    Moderate,
    Poor,
    VeryPoor,
    Hazardous,
}

impl AqiCategory {
    /// Upper bounds are inclusive: 50 is still `Good`.
    pub fn from_aqi(aqi: f64) -> Self {
        if aqi <= 50.0 {
            AqiCategory::Good
        } else if aqi <= 100.0 {
            AqiCategory::Fair
        } else if aqi <= 150.0 {
            AqiCategory::Moderate
        } else if aqi <= 200.0 {
            AqiCategory::Poor
        } else if aqi <= 300.0 {
            AqiCategory::VeryPoor
        } else {
            AqiCategory::Hazardous
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AqiCategory::Good => "Good",
            AqiCategory::Fair => "Fair",
            AqiCategory::Moderate => "Moderate",
            AqiCategory::Poor => "Poor",
            AqiCategory::VeryPoor => "Very Poor",
            AqiCategory::Hazardous => "Hazardous",
        }
    }
}

impl fmt::Display for AqiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Render visibility given in feet as miles; anything from 10 miles up reads `>10`.
pub fn format_visibility(feet: f64) -> String {
    format_visibility_miles(feet / FEET_PER_MILE)
}

pub fn format_visibility_miles(miles: f64) -> String {
    if miles >= 10.0 {
        ">10".to_string()
    } else {
        format!("{miles:.1}")
    }
}

/// Round to a whole number without ever printing `-0`.
pub fn format_whole(value: f64) -> String {
    let rounded = value.round();
    if rounded == 0.0 {
        "0".to_string()
    } else {
        format!("{rounded:.0}")
    }
}

/// Build the metric list in display order. Absent optional readings are left out.
pub fn build_metrics(
    current: &RawCurrentConditions,
    air_quality: AirQuality,
    units: UnitSystem,
    time_format: TimeFormat,
) -> Vec<Metric> {
    let mut metrics = Vec::with_capacity(8);

    match current.sunrise {
        Some(sunrise) => {
            let formatted = format_time(&sunrise, time_format, true);
            metrics.push(Metric::new(MetricKind::Sunrise, formatted.time, formatted.unit));
        }
        None => tracing::warn!("sunrise missing from forecast response; expected for polar areas"),
    }

    match current.sunset {
        Some(sunset) => {
            let formatted = format_time(&sunset, time_format, true);
            metrics.push(Metric::new(MetricKind::Sunset, formatted.time, formatted.unit));
        }
        None => tracing::warn!("sunset missing from forecast response; expected for polar areas"),
    }

    metrics.push(Metric::new(
        MetricKind::Wind,
        format!("{:.1}", current.wind_speed),
        units_for(units).speed,
    ));

    metrics.push(Metric::new(
        MetricKind::Humidity,
        format_whole(current.humidity),
        "%",
    ));

    // The provider has no pressure unit selector.
    metrics.push(Metric::new(
        MetricKind::Pressure,
        format_whole(current.pressure),
        "hPa",
    ));

    metrics.push(Metric::new(
        MetricKind::UvIndex,
        format!("{:.1}", current.uv_index),
        "",
    ));

    metrics.push(Metric::new(
        MetricKind::Visibility,
        format_visibility(current.visibility),
        "mi",
    ));

    match air_quality.us_aqi {
        Some(aqi) => metrics.push(Metric::new(
            MetricKind::AirQuality,
            format_whole(aqi),
            AqiCategory::from_aqi(aqi).label(),
        )),
        None => tracing::debug!("no air quality reading, metric omitted"),
    }

    metrics
}
