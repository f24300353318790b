use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Telemetry error: {0}")]
    Telemetry(String),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    pub fn invalid_url(url: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        CoreError::InvalidUrl {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}
