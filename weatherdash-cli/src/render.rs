use std::fmt;

use chrono::Timelike;
use weatherdash_core::{DisplayModel, IconBucket, format_time};

fn glyph(icon: IconBucket) -> &'static str {
    match icon {
        IconBucket::Clear => "☀",
        IconBucket::MostlyClear => "🌤",
        IconBucket::Cloudy => "⛅",
        IconBucket::Overcast => "☁",
        IconBucket::Fog => "🌫",
        IconBucket::Drizzle => "🌦",
        IconBucket::Rain => "🌧",
        IconBucket::Snow => "❄",
        IconBucket::Thunderstorm => "⛈",
    }
}

fn precipitation_bar(probability: f64) -> String {
    let cells = (probability.clamp(0.0, 100.0) / 10.0).round() as usize;
    "▮".repeat(cells)
}

/// Plain-text rendering of the whole dashboard.
pub struct Dashboard<'a>(pub &'a DisplayModel);

impl fmt::Display for Dashboard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let model = self.0;
        let unit = &model.temperature_unit;

        writeln!(f, "{}", model.location)?;
        writeln!(f, "{}", model.current_date)?;
        writeln!(f)?;
        writeln!(
            f,
            "  {} {}  {}{unit}  (feels like {}{unit})",
            glyph(model.current_icon),
            model.current_icon,
            model.current_temperature,
            model.feels_like,
        )?;
        writeln!(
            f,
            "  today {}{unit} / {}{unit}",
            model.today_high, model.today_low
        )?;
        writeln!(f)?;

        for metric in &model.metrics {
            if metric.unit.is_empty() {
                writeln!(f, "  {:<12} {}", metric.label, metric.measurement)?;
            } else {
                writeln!(
                    f,
                    "  {:<12} {} {}",
                    metric.label, metric.measurement, metric.unit
                )?;
            }
        }

        if !model.hourly.is_empty() {
            writeln!(f)?;
            writeln!(f, "Hourly")?;
            for (idx, point) in model.hourly.iter().enumerate() {
                let with_marker = idx == 0 || point.time.hour() % 12 == 0;
                let time = format_time(&point.time, model.time_format, with_marker);
                writeln!(
                    f,
                    "  {:>5} {:<2}  {:>4.0}{unit}  {:>3.0}% {}",
                    time.time,
                    time.unit,
                    point.temperature,
                    point.precipitation,
                    precipitation_bar(point.precipitation),
                )?;
            }
        }

        if !model.forecast.is_empty() {
            writeln!(f)?;
            writeln!(f, "Forecast")?;
            for day in &model.forecast {
                writeln!(
                    f,
                    "  {:<4} {} {:<13} {:>4.0}° / {:>4.0}°   moon {:>3}%",
                    day.day,
                    glyph(day.icon),
                    day.icon.as_str(),
                    day.high,
                    day.low,
                    day.moon_phase_percent,
                )?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};
    use weatherdash_core::{
        ForecastDay, HourlyPoint, Metric, MetricKind, TimeFormat, UnitSystem, moon::MoonPhase,
    };

    fn model() -> DisplayModel {
        let offset = FixedOffset::west_opt(7 * 3600).expect("valid offset");
        let hourly = (10..14)
            .map(|h| HourlyPoint {
                time: offset
                    .with_ymd_and_hms(2025, 6, 4, h, 0, 0)
                    .single()
                    .expect("valid time"),
                temperature: 60.0 + h as f64,
                precipitation: 35.0,
            })
            .collect();

        DisplayModel {
            current_date: "Wednesday, June 4".into(),
            location: "San Francisco, California".into(),
            current_icon: IconBucket::Clear,
            current_temperature: "68".into(),
            feels_like: "65".into(),
            today_high: "71".into(),
            today_low: "54".into(),
            temperature_unit: "°F".into(),
            units: UnitSystem::Imperial,
            time_format: TimeFormat::TwelveHour,
            metrics: vec![
                Metric::new(MetricKind::Humidity, "55", "%"),
                Metric::new(MetricKind::UvIndex, "4.2", ""),
                Metric::new(MetricKind::AirQuality, "42", "Good"),
            ],
            hourly,
            forecast: vec![ForecastDay {
                day: "Thu".into(),
                icon: IconBucket::Rain,
                high: 73.0,
                low: 54.0,
                moon_phase: MoonPhase::WaxingGibbous,
                moon_phase_percent: "62".into(),
            }],
        }
    }

    #[test]
    fn renders_header_and_current_block() {
        let text = Dashboard(&model()).to_string();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("San Francisco, California"));
        assert_eq!(lines.next(), Some("Wednesday, June 4"));
        assert!(text.contains("68°F  (feels like 65°F)"));
        assert!(text.contains("today 71°F / 54°F"));
    }

    #[test]
    fn metrics_without_unit_have_no_trailing_space() {
        let text = Dashboard(&model()).to_string();
        assert!(text.contains("UV Index     4.2\n"));
        assert!(text.contains("Air Quality  42 Good"));
    }

    #[test]
    fn hourly_marker_only_on_first_row_and_noon() {
        let text = Dashboard(&model()).to_string();
        assert!(text.contains("10:00 AM"));
        assert!(!text.contains("11:00 AM"));
        assert!(text.contains("12:00 PM"));
        assert!(!text.contains("1:00 PM"));
        assert!(text.contains("▮▮▮▮"));
    }

    #[test]
    fn forecast_rows_show_high_low_and_moon() {
        let text = Dashboard(&model()).to_string();
        assert!(text.contains("Thu"));
        assert!(text.contains("73° /   54°"));
        assert!(text.contains("moon  62%"));
    }
}
