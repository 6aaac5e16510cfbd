use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Key under which the last selected city is persisted.
pub const CITY_KEY: &str = "city";

/// A location search candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub region: String,
    pub country: String,
}

impl Location {
    /// "London, United Kingdom"
    pub fn label(&self) -> String {
        format!("{}, {}", self.name, self.country)
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label())
    }
}

/// Resolved place a snapshot belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    pub region: String,
    pub country: String,
    pub localtime: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub text: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temperature_c: f64,
    pub condition: Condition,
    pub wind_kph: f64,
    pub humidity_pct: u8,
}

/// Sun and moon times, kept as the provider formats them ("06:12 AM").
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Astro {
    pub sunrise: String,
    pub sunset: String,
    pub moonrise: String,
    pub moonset: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub avg_temp_c: f64,
    pub condition: Condition,
    pub astro: Astro,
}

/// Complete current + multi-day payload for one city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub location: Place,
    pub current: CurrentConditions,
    /// Chronological, index 0 is today.
    pub forecast: Vec<DailyForecast>,
}

impl WeatherSnapshot {
    pub fn sunrise_today(&self) -> Option<&str> {
        self.forecast.first().map(|day| day.astro.sunrise.as_str())
    }
}

/// Transient state of the search affordance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    pub query: String,
    pub candidates: Vec<Location>,
    pub is_visible: bool,
    /// Set while a typed query is waiting on the debounce timer or its response.
    pub is_pending: bool,
}

/// Coarse screen phase derived from [`ViewState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Searching,
    Selecting,
    Loading,
    Displaying,
    Failed,
}

/// Everything the screen renders. Owned and mutated only by the controller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub loading: bool,
    pub weather: Option<WeatherSnapshot>,
    pub search: SearchState,
    /// City of the most recently issued forecast request.
    pub requested_city: Option<String>,
    /// Message for the visible error line; cleared by the next successful fetch.
    pub error: Option<String>,
    /// Bumped for every forecast request issued.
    pub fetch_seq: u64,
    /// Bumped for every accepted keystroke in the search field.
    pub input_seq: u64,
}

impl ViewState {
    pub fn phase(&self) -> Phase {
        if self.loading {
            Phase::Loading
        } else if self.search.is_visible && !self.search.candidates.is_empty() {
            Phase::Selecting
        } else if self.search.is_visible {
            Phase::Searching
        } else if self.weather.is_some() {
            Phase::Displaying
        } else if self.error.is_some() {
            Phase::Failed
        } else {
            Phase::Idle
        }
    }

    /// Candidates to render: only with the search box open and more than one match.
    pub fn visible_candidates(&self) -> &[Location] {
        if self.search.is_visible && self.search.candidates.len() > 1 {
            &self.search.candidates
        } else {
            &[]
        }
    }
}
