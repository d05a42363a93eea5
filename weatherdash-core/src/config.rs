use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    model::{TimeFormat, UnitSystem},
    provider::{
        openmeteo::{AIR_QUALITY_BASE_URL, FORECAST_BASE_URL},
        openweather::OPENWEATHER_BASE_URL,
    },
};

/// Base URLs of the upstream services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub geocoding: String,
    pub forecast: String,
    pub air_quality: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            geocoding: OPENWEATHER_BASE_URL.to_string(),
            forecast: FORECAST_BASE_URL.to_string(),
            air_quality: AIR_QUALITY_BASE_URL.to_string(),
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// units = "metric"
/// time_format = "24h"
///
/// [endpoints]
/// forecast = "https://api.open-meteo.com"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// OpenWeather key, only used for reverse geocoding.
    pub api_key: Option<String>,
    pub units: UnitSystem,
    pub time_format: TimeFormat,
    pub endpoints: Endpoints,
}

impl Config {
    /// Returns the API key, treating a blank entry as unset.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key.trim().to_string());
    }

    pub fn is_api_key_configured(&self) -> bool {
        self.api_key().is_some()
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weatherdash", "weatherdash")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_imperial_twelve_hour_without_key() {
        let cfg = Config::default();
        assert_eq!(cfg.units, UnitSystem::Imperial);
        assert_eq!(cfg.time_format, TimeFormat::TwelveHour);
        assert!(!cfg.is_api_key_configured());
        assert_eq!(cfg.endpoints.forecast, "https://api.open-meteo.com");
    }

    #[test]
    fn blank_api_key_counts_as_unset() {
        let mut cfg = Config::default();
        cfg.set_api_key("   ".to_string());
        assert_eq!(cfg.api_key(), None);

        cfg.set_api_key(" OPEN_KEY ".to_string());
        assert_eq!(cfg.api_key(), Some("OPEN_KEY"));
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            units = "metric"
            time_format = "24h"

            [endpoints]
            forecast = "http://localhost:9000"
            "#,
        )
        .expect("valid toml");

        assert_eq!(cfg.units, UnitSystem::Metric);
        assert_eq!(cfg.time_format, TimeFormat::TwentyFourHour);
        assert_eq!(cfg.endpoints.forecast, "http://localhost:9000");
        assert_eq!(cfg.endpoints.geocoding, "https://api.openweathermap.org");
        assert_eq!(cfg.api_key, None);
    }

    #[test]
    fn save_then_load_roundtrips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.set_api_key("OPEN_KEY".to_string());
        cfg.units = UnitSystem::Standard;
        cfg.save_to(&path).expect("save");

        let loaded = Config::load_from(&path).expect("load");
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let loaded = Config::load_from(&dir.path().join("absent.toml")).expect("load");
        assert_eq!(loaded, Config::default());
    }

    #[test]
    fn invalid_file_reports_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "units = \"nautical\"").expect("write");

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
