//! Keeps only the newest display model when refreshes overlap.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::RwLock;

use crate::{
    error::DashboardError,
    model::{DashboardRequest, DisplayModel},
    normalizer::build_display_model,
    provider::Upstreams,
};

/// Identity of one build, increasing with every [`DashboardSession::begin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

#[derive(Debug, Default)]
pub struct DashboardSession {
    latest: AtomicU64,
    published: RwLock<Option<(RequestId, DisplayModel)>>,
}

impl DashboardSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new build, making every earlier one stale.
    pub fn begin(&self) -> RequestId {
        RequestId(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, id: RequestId) -> bool {
        self.latest.load(Ordering::SeqCst) == id.0
    }

    /// Build a model for `request` and publish it unless a newer refresh began meanwhile.
    ///
    /// Returns `Ok(None)` for a stale build, whether it succeeded or failed.
    pub async fn refresh(
        &self,
        upstreams: &Upstreams,
        request: &DashboardRequest,
    ) -> Result<Option<DisplayModel>, DashboardError> {
        let id = self.begin();
        let result = build_display_model(upstreams, request).await;
        self.complete(id, result).await
    }

    /// Settle the build `id` with its result.
    pub async fn complete(
        &self,
        id: RequestId,
        result: Result<DisplayModel, DashboardError>,
    ) -> Result<Option<DisplayModel>, DashboardError> {
        if !self.is_current(id) {
            tracing::debug!(request = id.0, "discarding stale dashboard build");
            return Ok(None);
        }

        let model = result?;

        let mut published = self.published.write().await;
        if published.as_ref().is_some_and(|(newest, _)| *newest > id) || !self.is_current(id) {
            tracing::debug!(request = id.0, "discarding stale dashboard build");
            return Ok(None);
        }
        *published = Some((id, model.clone()));

        Ok(Some(model))
    }

    /// Most recently published model, if any build has completed.
    pub async fn latest(&self) -> Option<DisplayModel> {
        self.published
            .read()
            .await
            .as_ref()
            .map(|(_, model)| model.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::{
            AirQuality, Coordinates, LocationLabel, RawCurrentConditions, RawDailyForecastEntry,
            RawHourlyEntry, TimeFormat, UnitSystem,
        },
        provider::{AirQualityProvider, ForecastProvider, LocationProvider},
    };
    use async_trait::async_trait;
    use chrono::{FixedOffset, TimeZone};
    use std::sync::Arc;
    use tokio::sync::Notify;

    fn model(location: &str) -> DisplayModel {
        DisplayModel {
            current_date: "Wednesday, June 4".into(),
            location: location.into(),
            current_icon: crate::icon::IconBucket::Clear,
            current_temperature: "68".into(),
            feels_like: "65".into(),
            today_high: "71".into(),
            today_low: "54".into(),
            temperature_unit: "°F".into(),
            units: UnitSystem::Imperial,
            time_format: TimeFormat::TwelveHour,
            metrics: vec![],
            hourly: vec![],
            forecast: vec![],
        }
    }

    #[tokio::test]
    async fn newer_request_wins_over_late_older_result() {
        let session = DashboardSession::new();
        let first = session.begin();
        let second = session.begin();

        let published = session.complete(second, Ok(model("B"))).await.expect("ok");
        assert_eq!(published.map(|m| m.location), Some("B".to_string()));

        let stale = session.complete(first, Ok(model("A"))).await.expect("ok");
        assert!(stale.is_none());

        let latest = session.latest().await.expect("published");
        assert_eq!(latest.location, "B");
    }

    #[tokio::test]
    async fn stale_failure_is_swallowed() {
        let session = DashboardSession::new();
        let first = session.begin();
        let _second = session.begin();

        let outcome = session
            .complete(first, Err(DashboardError::MissingApiKey))
            .await
            .expect("stale failures are not reported");
        assert!(outcome.is_none());
        assert!(session.latest().await.is_none());
    }

    #[tokio::test]
    async fn current_failure_is_reported() {
        let session = DashboardSession::new();
        let id = session.begin();

        let err = session
            .complete(id, Err(DashboardError::MissingApiKey))
            .await
            .unwrap_err();
        assert!(matches!(err, DashboardError::MissingApiKey));
    }

    /// Forecast that parks requests for latitude 1.0 until released.
    #[derive(Debug, Default)]
    struct GatedForecast {
        gate: Notify,
    }

    #[async_trait]
    impl ForecastProvider for GatedForecast {
        async fn current(
            &self,
            coordinates: Coordinates,
            _units: UnitSystem,
        ) -> anyhow::Result<RawCurrentConditions> {
            if coordinates.latitude == 1.0 {
                self.gate.notified().await;
            }
            let time = FixedOffset::east_opt(0)
                .expect("valid offset")
                .with_ymd_and_hms(2025, 6, 4, 12, 0, 0)
                .single()
                .expect("valid time");
            Ok(RawCurrentConditions {
                time,
                temperature: 20.0,
                feels_like: 19.0,
                humidity: 40.0,
                pressure: 1010.0,
                wind_speed: 2.0,
                uv_index: 1.0,
                visibility: 10_000.0,
                weather_code: 3,
                sunrise: None,
                sunset: None,
                min_temp: 15.0,
                max_temp: 22.0,
            })
        }

        async fn hourly(
            &self,
            _coordinates: Coordinates,
            _units: UnitSystem,
        ) -> anyhow::Result<Vec<RawHourlyEntry>> {
            Ok(vec![])
        }

        async fn daily(
            &self,
            _coordinates: Coordinates,
            _units: UnitSystem,
        ) -> anyhow::Result<Vec<RawDailyForecastEntry>> {
            Ok(vec![])
        }
    }

    #[derive(Debug)]
    struct NoAirQuality;

    #[async_trait]
    impl AirQualityProvider for NoAirQuality {
        async fn current_aqi(&self, _coordinates: Coordinates) -> anyhow::Result<AirQuality> {
            Ok(AirQuality::default())
        }
    }

    #[derive(Debug)]
    struct NoGeocoder;

    #[async_trait]
    impl LocationProvider for NoGeocoder {
        async fn reverse_geocode(
            &self,
            _coordinates: Coordinates,
        ) -> anyhow::Result<Vec<LocationLabel>> {
            anyhow::bail!("not used")
        }
    }

    #[tokio::test]
    async fn overlapping_refreshes_publish_only_the_newest() {
        let forecast = Arc::new(GatedForecast::default());
        let upstreams = Upstreams {
            location: Some(Arc::new(NoGeocoder)),
            forecast: forecast.clone(),
            air_quality: Arc::new(NoAirQuality),
        };
        let session = DashboardSession::new();

        let slow_request =
            DashboardRequest::new(Coordinates::new(1.0, 1.0)).with_location_override("Old");
        let fast_request =
            DashboardRequest::new(Coordinates::new(2.0, 2.0)).with_location_override("New");

        let (slow, fast) = tokio::join!(session.refresh(&upstreams, &slow_request), async {
            let result = session.refresh(&upstreams, &fast_request).await;
            forecast.gate.notify_one();
            result
        });

        assert!(slow.expect("stale build is not an error").is_none());
        let fast = fast.expect("fast build ok").expect("fast build published");
        assert_eq!(fast.location, "New");
        assert_eq!(session.latest().await.map(|m| m.location), Some("New".to_string()));
    }
}
