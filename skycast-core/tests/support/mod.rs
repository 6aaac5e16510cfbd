//! Scripted in-memory provider for controller tests.

#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use chrono::NaiveDate;
use skycast_core::{
    Astro, Condition, Controller, ControllerHandle, ControllerSettings, CurrentConditions,
    DailyForecast, Location, Persistence, Place, WeatherError, WeatherProvider, WeatherSnapshot,
};

#[derive(Debug, Default)]
pub struct ScriptedProvider {
    searches: Mutex<Vec<String>>,
    forecasts: Mutex<Vec<(String, u8)>>,
    search_results: HashMap<String, Vec<Location>>,
    search_delays: HashMap<String, Duration>,
    forecast_delays: HashMap<String, Duration>,
    failing_cities: HashSet<String>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_results(mut self, query: &str, results: Vec<Location>) -> Self {
        self.search_results.insert(query.to_string(), results);
        self
    }

    pub fn with_search_delay(mut self, query: &str, delay: Duration) -> Self {
        self.search_delays.insert(query.to_string(), delay);
        self
    }

    pub fn with_forecast_delay(mut self, city: &str, delay: Duration) -> Self {
        self.forecast_delays.insert(city.to_string(), delay);
        self
    }

    pub fn failing_for(mut self, city: &str) -> Self {
        self.failing_cities.insert(city.to_string());
        self
    }

    pub fn searches(&self) -> Vec<String> {
        self.searches.lock().unwrap().clone()
    }

    pub fn forecasts(&self) -> Vec<(String, u8)> {
        self.forecasts.lock().unwrap().clone()
    }
}

#[async_trait]
impl WeatherProvider for ScriptedProvider {
    async fn search_locations(&self, query: &str) -> Result<Vec<Location>, WeatherError> {
        self.searches.lock().unwrap().push(query.to_string());

        if let Some(delay) = self.search_delays.get(query) {
            tokio::time::sleep(*delay).await;
        }

        Ok(self.search_results.get(query).cloned().unwrap_or_default())
    }

    async fn fetch_forecast(&self, city: &str, days: u8) -> Result<WeatherSnapshot, WeatherError> {
        self.forecasts.lock().unwrap().push((city.to_string(), days));

        if let Some(delay) = self.forecast_delays.get(city) {
            tokio::time::sleep(*delay).await;
        }

        if self.failing_cities.contains(city) {
            return Err(WeatherError::network("simulated outage"));
        }

        Ok(snapshot(city, days))
    }
}

pub fn location(id: u64, name: &str, country: &str) -> Location {
    Location { id, name: name.to_string(), region: String::new(), country: country.to_string() }
}

pub fn snapshot(city: &str, days: u8) -> WeatherSnapshot {
    let first = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
    let sunny = Condition { text: "Sunny".to_string(), icon: String::new() };

    WeatherSnapshot {
        location: Place {
            name: city.to_string(),
            region: String::new(),
            country: "Testland".to_string(),
            localtime: None,
        },
        current: CurrentConditions {
            temperature_c: 21.0,
            condition: sunny.clone(),
            wind_kph: 9.0,
            humidity_pct: 40,
        },
        forecast: first
            .iter_days()
            .take(days as usize)
            .map(|date| DailyForecast {
                date,
                avg_temp_c: 18.5,
                condition: sunny.clone(),
                astro: Astro { sunrise: "06:10 AM".to_string(), ..Astro::default() },
            })
            .collect(),
    }
}

pub fn start(provider: Arc<ScriptedProvider>, memory: Persistence) -> ControllerHandle {
    Controller::new(provider, memory, ControllerSettings::default()).spawn()
}

/// Wait for the initial load to settle.
pub async fn loaded(handle: &mut ControllerHandle) -> skycast_core::ViewState {
    handle
        .wait_for(|s| !s.loading && (s.weather.is_some() || s.error.is_some()))
        .await
        .expect("controller running")
}
