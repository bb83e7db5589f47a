use anyhow::Context;
use clap::{Parser, Subcommand};
use cityweather_core::{Config, WeatherGateway};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "cityweather", version, about = "Current conditions and two-day forecasts for your cities")]
pub struct Cli {
    /// Print JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key (and optionally a base URL) in the config file.
    Configure,

    /// Show the current location.
    Location,

    /// Show current conditions for several cities.
    List {
        /// City names; the configured default list when omitted.
        cities: Vec<String>,
    },

    /// Show current conditions plus today's and tomorrow's forecast for a city.
    Show {
        /// City name, e.g. "Stockholm".
        city: String,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load()?;

        match self.command {
            Command::Configure => configure(config)?,
            Command::Location => {
                let gateway = WeatherGateway::from_config(&config);
                let city = gateway.resolve_current_location().await;
                if self.json {
                    println!("{}", serde_json::to_string_pretty(&city)?);
                } else {
                    println!("Current location: {city}");
                }
            }
            Command::List { cities } => {
                let gateway = WeatherGateway::from_config(&config);
                let snapshots = gateway.fetch_cities_weather(&cities).await;
                if self.json {
                    println!("{}", serde_json::to_string_pretty(&snapshots)?);
                } else {
                    print!("{}", render::city_table(&snapshots));
                }
            }
            Command::Show { city } => {
                let gateway = WeatherGateway::from_config(&config);
                let detailed = gateway.fetch_detailed_weather(&city).await;
                if self.json {
                    println!("{}", serde_json::to_string_pretty(&detailed)?);
                } else {
                    print!("{}", render::detail(&detailed));
                }
            }
        }

        Ok(())
    }
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    let api_key = inquire::Password::new("OpenWeather API key:")
        .without_confirmation()
        .with_help_message("Leave empty to rely on $OPENWEATHER_API_KEY only")
        .prompt()
        .context("Failed to read API key")?;
    config.set_api_key(api_key);

    let base_url = inquire::Text::new("Provider base URL:")
        .with_default(config.base_url())
        .prompt()
        .context("Failed to read base URL")?;
    config.base_url = Some(base_url.trim().to_string())
        .filter(|url| !url.is_empty() && url != cityweather_core::config::DEFAULT_BASE_URL);

    let path = config.save()?;
    println!("Saved configuration to {}", path.display());

    Ok(())
}
