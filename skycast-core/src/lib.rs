//! Core library for the `skycast` weather app.
//!
//! This crate defines:
//! - Configuration handling
//! - The weather provider client (location search, forecast)
//! - Best-effort persistence of the last selected city
//! - The search controller that drives the weather screen
//!
//! It is used by `skycast-cli`, but can also back other front ends.

pub mod config;
pub mod controller;
pub mod debounce;
pub mod error;
pub mod model;
pub mod provider;
pub mod storage;

pub use config::{Config, ProviderConfig};
pub use controller::{Command, Controller, ControllerHandle, ControllerSettings, ControllerStopped};
pub use error::WeatherError;
pub use model::{
    Astro, CITY_KEY, Condition, CurrentConditions, DailyForecast, Location, Phase, Place,
    SearchState, ViewState, WeatherSnapshot,
};
pub use provider::{WeatherProvider, provider_from_config};
pub use storage::{FileStore, KeyValueStore, MemoryStore, Persistence};
