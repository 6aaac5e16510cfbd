use inquire::{InquireError, Select, Text};
use skycast_core::{Config, Controller, Persistence, provider_from_config};

use crate::render;

/// Interactive search loop on top of the controller.
pub async fn run(config: &Config, memory: Persistence) -> anyhow::Result<()> {
    let provider = provider_from_config(config)?;
    let settings = config.controller_settings();
    let min_chars = settings.min_query_chars;
    let mut handle = Controller::new(provider, memory, settings).spawn();

    let state = handle
        .wait_for(|s| !s.loading && (s.weather.is_some() || s.error.is_some()))
        .await?;
    print!("{}", render::screen(&state));

    loop {
        let query = prompt(|| {
            Text::new("Search city:").with_help_message("empty to quit").prompt_skippable()
        })
        .await?;

        let query = query.unwrap_or_default().trim().to_string();
        if query.is_empty() {
            break;
        }
        if query.chars().count() < min_chars {
            println!("Type at least {min_chars} letters.");
            continue;
        }

        let state = handle.search_and_settle(query.clone()).await?;

        let candidates = state.visible_candidates().to_vec();
        if candidates.is_empty() {
            println!("No matches to choose from for \"{query}\".");
            handle.close_search().await?;
            continue;
        }

        let Some(location) =
            prompt(move || Select::new("Pick a location:", candidates).prompt_skippable()).await?
        else {
            handle.close_search().await?;
            continue;
        };

        let state = handle.select_and_settle(location).await?;
        print!("{}", render::screen(&state));
    }

    handle.shutdown().await;
    Ok(())
}

/// Run a blocking inquire prompt off the async workers.
async fn prompt<T, F>(f: F) -> anyhow::Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, InquireError> + Send + 'static,
{
    Ok(tokio::task::spawn_blocking(f).await??)
}
