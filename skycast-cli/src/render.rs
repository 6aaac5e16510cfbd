use std::fmt::Write;

use skycast_core::{ViewState, WeatherSnapshot};

/// Full screen: error line, then the weather panel (or a placeholder).
pub fn screen(state: &ViewState) -> String {
    let mut out = String::new();

    if let Some(error) = &state.error {
        let _ = writeln!(out, "! {error}");
    }

    match &state.weather {
        Some(weather) => out.push_str(&snapshot(weather)),
        None if state.loading => out.push_str("Loading...\n"),
        None => out.push_str("No weather loaded yet.\n"),
    }

    out
}

/// Current-conditions panel followed by the daily forecast strip.
pub fn snapshot(weather: &WeatherSnapshot) -> String {
    let mut out = String::new();
    let current = &weather.current;

    let _ = writeln!(out);
    let _ = writeln!(out, "{}, {}", weather.location.name, weather.location.country);
    let _ = writeln!(
        out,
        "  {}  {}°  {}",
        glyph(&current.condition.text),
        current.temperature_c,
        current.condition.text
    );
    let _ = writeln!(
        out,
        "  wind {} km/h   humidity {}%   sunrise {}",
        current.wind_kph,
        current.humidity_pct,
        weather.sunrise_today().unwrap_or("-")
    );

    if !weather.forecast.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Daily forecast");
        for day in &weather.forecast {
            let _ = writeln!(
                out,
                "  {:<10} {}  {}°",
                day.date.format("%A").to_string(),
                glyph(&day.condition.text),
                day.avg_temp_c
            );
        }
    }
    let _ = writeln!(out);

    out
}

/// Icon for a provider condition text ("Patchy rain possible" -> rain).
fn glyph(condition: &str) -> &'static str {
    let text = condition.to_lowercase();
    let has = |words: &[&str]| words.iter().any(|w| text.contains(w));

    if has(&["thunder"]) {
        "⛈"
    } else if has(&["snow", "sleet", "blizzard", "ice"]) {
        "🌨"
    } else if has(&["rain", "drizzle", "shower"]) {
        "🌧"
    } else if has(&["fog", "mist"]) {
        "🌫"
    } else if has(&["partly"]) {
        "⛅"
    } else if has(&["cloud", "overcast"]) {
        "☁"
    } else if has(&["sun", "clear"]) {
        "☀"
    } else {
        "🌡"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use skycast_core::{Astro, Condition, CurrentConditions, DailyForecast, Place};

    fn condition(text: &str) -> Condition {
        Condition { text: text.to_string(), icon: String::new() }
    }

    fn weather() -> WeatherSnapshot {
        WeatherSnapshot {
            location: Place {
                name: "London".into(),
                region: String::new(),
                country: "United Kingdom".into(),
                localtime: None,
            },
            current: CurrentConditions {
                temperature_c: 12.0,
                condition: condition("Partly cloudy"),
                wind_kph: 14.4,
                humidity_pct: 81,
            },
            forecast: vec![DailyForecast {
                // A Monday.
                date: NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
                avg_temp_c: 11.3,
                condition: condition("Light rain"),
                astro: Astro { sunrise: "07:26 AM".into(), ..Astro::default() },
            }],
        }
    }

    #[test]
    fn glyphs_follow_condition_text() {
        assert_eq!(glyph("Moderate or heavy rain with thunder"), "⛈");
        assert_eq!(glyph("Patchy light snow"), "🌨");
        assert_eq!(glyph("Patchy rain possible"), "🌧");
        assert_eq!(glyph("Partly cloudy"), "⛅");
        assert_eq!(glyph("Overcast"), "☁");
        assert_eq!(glyph("Sunny"), "☀");
        assert_eq!(glyph("Something new"), "🌡");
    }

    #[test]
    fn snapshot_shows_panel_and_strip() {
        let out = snapshot(&weather());

        assert!(out.contains("London, United Kingdom"));
        assert!(out.contains("12°  Partly cloudy"));
        assert!(out.contains("wind 14.4 km/h"));
        assert!(out.contains("humidity 81%"));
        assert!(out.contains("sunrise 07:26 AM"));
        assert!(out.contains("Monday"));
        assert!(out.contains("11.3°"));
    }

    #[test]
    fn screen_shows_error_above_stale_weather() {
        let state = ViewState {
            weather: Some(weather()),
            error: Some("The weather service took too long to answer.".into()),
            ..ViewState::default()
        };

        let out = screen(&state);
        assert!(out.starts_with("! The weather service took too long"));
        assert!(out.contains("London"));
    }

    #[test]
    fn screen_without_weather() {
        let loading = ViewState { loading: true, ..ViewState::default() };
        assert_eq!(screen(&loading), "Loading...\n");
        assert_eq!(screen(&ViewState::default()), "No weather loaded yet.\n");
    }
}
