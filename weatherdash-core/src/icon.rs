use std::fmt;

use serde::{Deserialize, Serialize};

/// Display category for a weather condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IconBucket {
    Clear,
    MostlyClear,
    Cloudy,
    Overcast,
    Fog,
    Drizzle,
    Rain,
    Snow,
    Thunderstorm,
}

impl IconBucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            IconBucket::Clear => "clear",
            IconBucket::MostlyClear => "mostly-clear",
            IconBucket::Cloudy => "cloudy",
            IconBucket::Overcast => "overcast",
            IconBucket::Fog => "fog",
            IconBucket::Drizzle => "drizzle",
            IconBucket::Rain => "rain",
            IconBucket::Snow => "snow",
            IconBucket::Thunderstorm => "thunderstorm",
        }
    }
}

impl fmt::Display for IconBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a WMO weather interpretation code to its icon bucket.
///
/// Codes outside the WMO table fall back to [`IconBucket::Clear`].
pub fn code_to_icon_bucket(code: i32) -> IconBucket {
    match code {
        0 => IconBucket::Clear,
        1 => IconBucket::MostlyClear,
        2 => IconBucket::Cloudy,
        3 => IconBucket::Overcast,
        45 | 48 => IconBucket::Fog,
        51 | 53 | 55 | 56 | 57 => IconBucket::Drizzle,
        61 | 63 | 65 | 66 | 67 => IconBucket::Rain,
        71 | 73 | 75 | 77 => IconBucket::Snow,
        // Showers share the drizzle icon.
        80..=82 => IconBucket::Drizzle,
        85 | 86 => IconBucket::Snow,
        95 | 96 | 99 => IconBucket::Thunderstorm,
        other => {
            tracing::debug!(code = other, "unrecognized weather code, using clear icon");
            IconBucket::Clear
        }
    }
}
