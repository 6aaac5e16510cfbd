use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Text};
use skycast_core::{Config, FileStore, Persistence, provider_from_config};

use crate::{render, session};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skycast", version, about = "Search a city and see its weather")]
pub struct Cli {
    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the weatherapi.com API key and the default city.
    Configure,

    /// Show current weather and forecast once.
    Show {
        /// City name; defaults to the last selected city.
        city: Option<String>,

        /// Number of forecast days.
        #[arg(long)]
        days: Option<u8>,
    },

    /// Interactive search: type a city, pick a match, see its weather.
    Search,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load()?;

        match self.command {
            Command::Configure => configure(config),
            Command::Show { city, days } => show(&config, city, days).await,
            Command::Search => session::run(&config, open_memory()).await,
        }
    }
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    let api_key = Password::new("weatherapi.com API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()?;

    let default_city =
        Text::new("Default city:").with_default(&config.default_city).prompt()?;

    config.set_api_key(api_key.trim().to_string());
    config.default_city = default_city.trim().to_string();
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn show(config: &Config, city: Option<String>, days: Option<u8>) -> anyhow::Result<()> {
    let provider = provider_from_config(config)?;
    let memory = open_memory();

    let (city, remember) = match city {
        Some(city) => (city, true),
        None => (memory.last_city().await.unwrap_or_else(|| config.default_city.clone()), false),
    };
    let days = days.unwrap_or(config.forecast_days);

    let snapshot = provider
        .fetch_forecast(&city, days)
        .await
        .with_context(|| format!("Could not load weather for '{city}'"))?;

    if remember {
        memory.remember_city(&city).await;
    }

    print!("{}", render::snapshot(&snapshot));
    Ok(())
}

/// File-backed memory in the platform data dir, or process memory if there is none.
fn open_memory() -> Persistence {
    match Config::data_dir() {
        Ok(dir) => Persistence::new(Arc::new(FileStore::in_dir(&dir))),
        Err(e) => {
            tracing::warn!(error = %e, "no data directory, last city will not be remembered");
            Persistence::in_memory()
        }
    }
}
