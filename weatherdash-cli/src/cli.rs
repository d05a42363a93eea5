use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{Select, Text};
use weatherdash_core::{
    Config, Coordinates, DashboardRequest, TimeFormat, UnitSystem, build_display_model,
    upstreams_from_config,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherdash", version, about = "Weather dashboard for a pair of coordinates")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure the geocoding API key and display defaults.
    Configure,

    /// Show the dashboard for a location.
    Show {
        /// Latitude in decimal degrees.
        #[arg(long, allow_hyphen_values = true)]
        lat: String,

        /// Longitude in decimal degrees.
        #[arg(long, allow_hyphen_values = true)]
        lon: String,

        /// Place name to display; skips reverse geocoding.
        #[arg(long)]
        name: Option<String>,

        /// Unit system: standard, metric or imperial. Defaults to the configured value.
        #[arg(long)]
        units: Option<String>,

        /// Clock style: 12h or 24h. Defaults to the configured value.
        #[arg(long)]
        time_format: Option<String>,

        /// OpenWeather API key, overriding the configured one.
        #[arg(long)]
        api_key: Option<String>,

        /// Print the display model as JSON instead of text.
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show {
                lat,
                lon,
                name,
                units,
                time_format,
                api_key,
                json,
            } => {
                let cfg = Config::load()?;

                let mut request = DashboardRequest::new(Coordinates::parse(&lat, &lon)?)
                    .with_units(match units {
                        Some(u) => UnitSystem::try_from(u.as_str())?,
                        None => cfg.units,
                    })
                    .with_time_format(match time_format {
                        Some(f) => TimeFormat::try_from(f.as_str())?,
                        None => cfg.time_format,
                    });
                if let Some(name) = name {
                    request = request.with_location_override(name);
                }

                show(&cfg, api_key, &request, json).await
            }
        }
    }
}

async fn show(
    cfg: &Config,
    api_key: Option<String>,
    request: &DashboardRequest,
    json: bool,
) -> anyhow::Result<()> {
    let upstreams = upstreams_from_config(cfg, api_key)?;

    let model = match build_display_model(&upstreams, request).await {
        Ok(model) => model,
        Err(err) => {
            tracing::error!(error = %err, "dashboard build failed");
            let message = err.user_message();
            return Err(anyhow::Error::new(err).context(message));
        }
    };

    if json {
        let out = serde_json::to_string_pretty(&model)
            .context("Failed to serialize display model to JSON")?;
        println!("{out}");
    } else {
        print!("{}", render::Dashboard(&model));
    }

    Ok(())
}

fn configure() -> anyhow::Result<()> {
    let mut cfg = Config::load()?;

    let mut key_prompt = Text::new("OpenWeather API key (used for place names):")
        .with_help_message("Leave empty to keep the current value");
    if cfg.is_api_key_configured() {
        key_prompt = key_prompt.with_placeholder("configured");
    }
    let key = key_prompt.prompt()?;
    if !key.trim().is_empty() {
        cfg.set_api_key(key);
    }

    let units = UnitSystem::all().to_vec();
    let cursor = units.iter().position(|u| *u == cfg.units).unwrap_or_default();
    cfg.units = Select::new("Unit system:", units)
        .with_starting_cursor(cursor)
        .prompt()?;

    let formats = TimeFormat::all().to_vec();
    let cursor = formats
        .iter()
        .position(|f| *f == cfg.time_format)
        .unwrap_or_default();
    cfg.time_format = Select::new("Time format:", formats)
        .with_starting_cursor(cursor)
        .prompt()?;

    let path = cfg.save()?;
    println!("Configuration saved to {}", path.display());

    Ok(())
}
