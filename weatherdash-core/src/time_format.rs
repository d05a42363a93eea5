use std::fmt::Display;

use chrono::{DateTime, TimeZone};
use serde::Serialize;

use crate::model::TimeFormat;

/// A clock reading split so the AM/PM marker can be rendered like a unit suffix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormattedTime {
    pub time: String,
    pub unit: String,
}

/// Format `instant` in its own offset.
///
/// `24h` gives `HH:MM` with an empty unit. `12h` gives `H:MM` and, when
/// `include_marker` is set, `AM`/`PM` as the unit.
pub fn format_time<Tz>(instant: &DateTime<Tz>, mode: TimeFormat, include_marker: bool) -> FormattedTime
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match mode {
        TimeFormat::TwentyFourHour => FormattedTime {
            time: instant.format("%H:%M").to_string(),
            unit: String::new(),
        },
        TimeFormat::TwelveHour => FormattedTime {
            time: instant.format("%-I:%M").to_string(),
            unit: if include_marker {
                instant.format("%p").to_string()
            } else {
                String::new()
            },
        },
    }
}
