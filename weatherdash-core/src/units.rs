use serde::Serialize;

use crate::model::UnitSystem;

/// Display suffixes for one unit system. Values are never converted with these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UnitRecord {
    pub temperature: &'static str,
    pub speed: &'static str,
    pub precipitation: &'static str,
    pub distance: &'static str,
}

pub fn units_for(system: UnitSystem) -> UnitRecord {
    match system {
        UnitSystem::Standard => UnitRecord {
            temperature: "K",
            speed: "m/s",
            precipitation: "mm",
            distance: "km",
        },
        UnitSystem::Metric => UnitRecord {
            temperature: "°C",
            speed: "m/s",
            precipitation: "mm",
            distance: "km",
        },
        UnitSystem::Imperial => UnitRecord {
            temperature: "°F",
            speed: "mph",
            precipitation: "in",
            distance: "mi",
        },
    }
}
