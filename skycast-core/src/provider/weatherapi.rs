use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

use crate::{
    error::WeatherError,
    model::{
        Astro, Condition, CurrentConditions, DailyForecast, Location, Place, WeatherSnapshot,
    },
};

use super::WeatherProvider;

/// weatherapi.com error code for "No matching location found."
const NO_MATCHING_LOCATION: u32 = 1006;

#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl WeatherApiProvider {
    pub fn new(
        api_key: String,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, WeatherError> {
        let http = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self { api_key, base_url, http })
    }

    async fn get_json(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<String, WeatherError> {
        let url = format!("{}/{endpoint}", self.base_url);
        tracing::debug!(%url, ?query, "weatherapi request");

        let res = self
            .http
            .get(&url)
            .query(&[("key", self.api_key.as_str())])
            .query(query)
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if status.is_success() {
            return Ok(body);
        }

        // The provider reports unknown places as a 400 with a JSON error body.
        if status == StatusCode::BAD_REQUEST {
            if let Ok(WaErrorResponse { error }) = serde_json::from_str(&body) {
                if error.code == NO_MATCHING_LOCATION {
                    return Err(WeatherError::not_found(error.message));
                }
            }
        }

        Err(WeatherError::network(format!(
            "WeatherAPI {endpoint} request failed with status {status}: {}",
            truncate_body(&body),
        )))
    }
}

#[derive(Debug, Deserialize)]
struct WaSearchHit {
    id: u64,
    name: String,
    #[serde(default)]
    region: String,
    country: String,
}

#[derive(Debug, Deserialize)]
struct WaLocation {
    name: String,
    #[serde(default)]
    region: String,
    country: String,
    localtime: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WaCondition {
    text: String,
    #[serde(default)]
    icon: String,
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    temp_c: f64,
    humidity: u8,
    wind_kph: f64,
    condition: WaCondition,
}

#[derive(Debug, Deserialize)]
struct WaDay {
    avgtemp_c: f64,
    condition: WaCondition,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WaAstro {
    sunrise: String,
    sunset: String,
    moonrise: String,
    moonset: String,
}

#[derive(Debug, Deserialize)]
struct WaForecastDay {
    date: NaiveDate,
    day: WaDay,
    #[serde(default)]
    astro: WaAstro,
}

#[derive(Debug, Deserialize)]
struct WaForecast {
    forecastday: Vec<WaForecastDay>,
}

#[derive(Debug, Deserialize)]
struct WaForecastResponse {
    location: WaLocation,
    current: WaCurrent,
    forecast: WaForecast,
}

#[derive(Debug, Deserialize)]
struct WaError {
    code: u32,
    message: String,
}

#[derive(Debug, Deserialize)]
struct WaErrorResponse {
    error: WaError,
}

impl WaCondition {
    fn into_condition(self) -> Condition {
        Condition { text: self.text, icon: self.icon }
    }
}

impl WaForecastResponse {
    fn into_snapshot(self) -> WeatherSnapshot {
        WeatherSnapshot {
            location: Place {
                name: self.location.name,
                region: self.location.region,
                country: self.location.country,
                localtime: self.location.localtime,
            },
            current: CurrentConditions {
                temperature_c: self.current.temp_c,
                condition: self.current.condition.into_condition(),
                wind_kph: self.current.wind_kph,
                humidity_pct: self.current.humidity,
            },
            forecast: self
                .forecast
                .forecastday
                .into_iter()
                .map(|d| DailyForecast {
                    date: d.date,
                    avg_temp_c: d.day.avgtemp_c,
                    condition: d.day.condition.into_condition(),
                    astro: Astro {
                        sunrise: d.astro.sunrise,
                        sunset: d.astro.sunset,
                        moonrise: d.astro.moonrise,
                        moonset: d.astro.moonset,
                    },
                })
                .collect(),
        }
    }
}

#[async_trait]
impl WeatherProvider for WeatherApiProvider {
    async fn search_locations(&self, query: &str) -> Result<Vec<Location>, WeatherError> {
        let body = self.get_json("search.json", &[("q", query)]).await?;

        let hits: Vec<WaSearchHit> = serde_json::from_str(&body)?;

        Ok(hits
            .into_iter()
            .map(|h| Location { id: h.id, name: h.name, region: h.region, country: h.country })
            .collect())
    }

    async fn fetch_forecast(&self, city: &str, days: u8) -> Result<WeatherSnapshot, WeatherError> {
        let days = days.to_string();
        let body = self
            .get_json(
                "forecast.json",
                &[("q", city), ("days", days.as_str()), ("aqi", "no"), ("alerts", "no")],
            )
            .await?;

        let parsed: WaForecastResponse = serde_json::from_str(&body)?;

        Ok(parsed.into_snapshot())
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_bodies() {
        assert_eq!(truncate_body("oops"), "oops");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let body = "é".repeat(300);
        let out = truncate_body(&body);
        assert!(out.ends_with("..."));
        assert_eq!(out.chars().count(), 203);
    }

    #[test]
    fn forecast_payload_maps_to_snapshot() {
        let body = r#"{
            "location": {"name": "London", "region": "City of London, Greater London",
                         "country": "United Kingdom", "localtime": "2026-10-19 09:00"},
            "current": {"temp_c": 12.0, "humidity": 81, "wind_kph": 14.4,
                        "condition": {"text": "Partly cloudy", "icon": "//cdn/116.png", "code": 1003}},
            "forecast": {"forecastday": [
                {"date": "2026-10-19", "day": {"avgtemp_c": 11.3, "condition": {"text": "Light rain"}},
                 "astro": {"sunrise": "07:26 AM", "sunset": "06:00 PM"}},
                {"date": "2026-10-20", "day": {"avgtemp_c": 10.1, "condition": {"text": "Sunny"}}}
            ]}
        }"#;

        let parsed: WaForecastResponse = serde_json::from_str(body).expect("valid payload");
        let snapshot = parsed.into_snapshot();

        assert_eq!(snapshot.location.name, "London");
        assert_eq!(snapshot.current.humidity_pct, 81);
        assert_eq!(snapshot.current.condition.text, "Partly cloudy");
        assert_eq!(snapshot.forecast.len(), 2);
        assert_eq!(snapshot.sunrise_today(), Some("07:26 AM"));
        assert_eq!(snapshot.forecast[1].astro, Astro::default());
        assert_eq!(snapshot.forecast[1].date, NaiveDate::from_ymd_opt(2026, 10, 20).unwrap());
    }
}
