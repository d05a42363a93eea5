use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::metrics::format_whole;

/// Mean length of a lunation in days.
const SYNODIC_MONTH_DAYS: f64 = 29.530588853;

/// 2000-01-06 18:14 UTC, a new moon.
const REFERENCE_NEW_MOON_UNIX: i64 = 947_182_440;

/// Tolerance for snapping a phase fraction onto a named quarter.
const QUARTER_EPSILON: f64 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MoonPhase {
    New,
    WaxingCrescent,
    FirstQuarter,
    WaxingGibbous,
    Full,
    WaningGibbous,
    LastQuarter,
    WaningCrescent,
}

impl MoonPhase {
    /// Pick the phase icon for a fraction of the lunation, `0.0` and `1.0` both being new moon.
    pub fn from_fraction(phase: f64) -> Self {
        const QUARTERS: [(f64, MoonPhase); 5] = [
            (0.0, MoonPhase::New),
            (0.25, MoonPhase::FirstQuarter),
            (0.5, MoonPhase::Full),
            (0.75, MoonPhase::LastQuarter),
            (1.0, MoonPhase::New),
        ];

        if let Some((_, named)) = QUARTERS
            .iter()
            .find(|(value, _)| (phase - value).abs() < QUARTER_EPSILON)
        {
            return *named;
        }

        if phase > 0.0 && phase < 0.25 {
            MoonPhase::WaxingCrescent
        } else if phase > 0.25 && phase < 0.5 {
            MoonPhase::WaxingGibbous
        } else if phase > 0.5 && phase < 0.75 {
            MoonPhase::WaningGibbous
        } else {
            MoonPhase::WaningCrescent
        }
    }
}

/// Fraction of the current lunation elapsed at `instant`, in `[0, 1)`.
pub fn phase_fraction<Tz: TimeZone>(instant: &DateTime<Tz>) -> f64 {
    let elapsed_days = (instant.timestamp() - REFERENCE_NEW_MOON_UNIX) as f64 / 86_400.0;
    (elapsed_days / SYNODIC_MONTH_DAYS).rem_euclid(1.0)
}

/// Illuminated share of the disc as a whole percent, e.g. `"50"`.
pub fn illumination_percent(phase: f64) -> String {
    let fraction = (1.0 - (2.0 * std::f64::consts::PI * phase).cos()) / 2.0;
    format_whole(fraction * 100.0)
}
