use thiserror::Error;

/// Failure kinds surfaced by the weather client and the persistence layer.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// Provider unreachable or answered with a non-success status.
    #[error("Network error: {0}")]
    Network(String),

    /// The request did not complete within the client-side timeout.
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// The provider answered with a body we could not decode.
    #[error("Parse error: {0}")]
    Parse(String),

    /// No usable result for the requested city.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Key-value store failure. Never shown to the user.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl WeatherError {
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network(message.into())
    }

    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse(message.into())
    }

    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound(message.into())
    }

    pub fn storage<S: Into<String>>(message: S) -> Self {
        Self::Storage(message.into())
    }

    /// Short text for the on-screen error line.
    pub fn user_message(&self) -> String {
        match self {
            WeatherError::Network(_) => {
                "Unable to reach the weather service. Check your connection.".to_string()
            }
            WeatherError::Timeout(_) => "The weather service took too long to answer.".to_string(),
            WeatherError::Parse(_) => "The weather service sent an unexpected response.".to_string(),
            WeatherError::NotFound(message) => message.clone(),
            WeatherError::Storage(_) => "Could not access local storage.".to_string(),
        }
    }
}

impl From<reqwest::Error> for WeatherError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_decode() {
            Self::Parse(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for WeatherError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}
