use std::fmt;

use thiserror::Error;

use crate::model::Coordinates;

/// Names the upstream request that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpstreamCall {
    Geocoding,
    Current,
    Hourly,
    Daily,
    AirQuality,
}

impl UpstreamCall {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpstreamCall::Geocoding => "reverse geocoding",
            UpstreamCall::Current => "current conditions",
            UpstreamCall::Hourly => "hourly forecast",
            UpstreamCall::Daily => "daily forecast",
            UpstreamCall::AirQuality => "air quality",
        }
    }
}

impl fmt::Display for UpstreamCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of a whole display-model build.
///
/// Optional data (sunrise/sunset, air quality) and unknown weather codes are
/// recovered inside the normalizer and never show up here.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Upstream {call} request failed")]
    UpstreamUnavailable {
        call: UpstreamCall,
        #[source]
        source: anyhow::Error,
    },

    #[error("Reverse geocoding returned no location for ({0})")]
    LocationNotFound(Coordinates),

    #[error(
        "No API key configured for reverse geocoding.\n\
         Hint: run `weatherdash configure`, pass --api-key, or pass --name to skip the lookup."
    )]
    MissingApiKey,
}

impl DashboardError {
    pub fn upstream(call: UpstreamCall, source: anyhow::Error) -> Self {
        Self::UpstreamUnavailable { call, source }
    }

    /// Text for the caller's "unable to load weather" state.
    pub fn user_message(&self) -> &'static str {
        match self {
            DashboardError::InvalidCoordinates(_) => "Unable to load weather: invalid coordinates.",
            DashboardError::UpstreamUnavailable { .. } => {
                "Unable to load weather: a weather service is unavailable."
            }
            DashboardError::LocationNotFound(_) => {
                "Unable to load weather: no place name found for these coordinates."
            }
            DashboardError::MissingApiKey => {
                "Unable to load weather: no API key configured for location lookup."
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn upstream_error_keeps_source_chain() {
        let err = DashboardError::upstream(
            UpstreamCall::Daily,
            anyhow::anyhow!("status 502 Bad Gateway"),
        );

        assert_eq!(err.to_string(), "Upstream daily forecast request failed");
        let source = err.source().expect("source must be set");
        assert!(source.to_string().contains("502"));
    }

    #[test]
    fn location_not_found_mentions_coordinates() {
        let err = DashboardError::LocationNotFound(Coordinates::new(1.5, -2.25));
        assert!(err.to_string().contains("1.5000, -2.2500"));
    }
}
