//! Core library for the `weatherdash` dashboard.
//!
//! This crate defines:
//! - Upstream clients for reverse geocoding, forecasts and air quality
//! - The normalizer that folds their payloads into a single [`DisplayModel`]
//! - Display helpers: icon buckets, unit suffixes, time formatting, moon phases
//! - Configuration & credentials handling
//!
//! It is used by `weatherdash-cli`, but can also back other front ends.

pub mod config;
pub mod error;
pub mod icon;
pub mod metrics;
pub mod model;
pub mod moon;
pub mod normalizer;
pub mod provider;
pub mod session;
pub mod time_format;
pub mod units;

pub use config::{Config, Endpoints};
pub use error::{DashboardError, UpstreamCall};
pub use icon::{IconBucket, code_to_icon_bucket};
pub use model::{
    Coordinates, DashboardRequest, DisplayModel, ForecastDay, HourlyPoint, LocationLabel, Metric,
    MetricKind, TimeFormat, UnitSystem,
};
pub use normalizer::build_display_model;
pub use provider::{Upstreams, upstreams_from_config};
pub use session::DashboardSession;
pub use time_format::{FormattedTime, format_time};
pub use units::{UnitRecord, units_for};
