use crate::{
    Config,
    error::WeatherError,
    model::{Location, WeatherSnapshot},
    provider::weatherapi::WeatherApiProvider,
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod weatherapi;

/// Remote weather source: location search and multi-day forecast.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Candidates for partial city text, in provider order.
    async fn search_locations(&self, query: &str) -> Result<Vec<Location>, WeatherError>;

    /// Current conditions plus `days` of forecast for `city`.
    async fn fetch_forecast(&self, city: &str, days: u8) -> Result<WeatherSnapshot, WeatherError>;
}

/// Construct the provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    let api_key = config.api_key().ok_or_else(|| {
        anyhow::anyhow!(
            "No API key configured for weatherapi.com.\n\
                 Hint: run `skycast configure` or set {}.",
            crate::config::API_KEY_ENV
        )
    })?;

    let provider =
        WeatherApiProvider::new(api_key, config.provider.base_url.clone(), config.timeout())?;

    Ok(Arc::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_from_config_works_when_key_is_set() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".to_string());

        assert!(provider_from_config(&cfg).is_ok());
    }

    #[test]
    fn provider_from_config_errors_on_blank_key() {
        let mut cfg = Config::default();
        cfg.set_api_key("   ".to_string());

        if std::env::var(crate::config::API_KEY_ENV).is_err() {
            let err = provider_from_config(&cfg).unwrap_err();
            let msg = err.to_string();
            assert!(msg.contains("No API key configured"));
            assert!(msg.contains("Hint: run `skycast configure`"));
        }
    }
}
