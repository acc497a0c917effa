use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://api.sarvam.ai";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Runtime configuration, loaded from the environment (a local `.env` file
/// is honored when present).
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Sarvam API subscription key, sent as `api-subscription-key`.
    pub api_key: String,
    /// API origin. Overridable for testing against a stub server.
    pub base_url: String,
    /// Shared HTTP client timeout.
    pub request_timeout_secs: u64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("SARVAM_API_KEY not set")]
    MissingApiKey,

    #[error("Invalid SARVAM_TIMEOUT_SECS value: {0}")]
    InvalidTimeout(String),
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let api_key = std::env::var("SARVAM_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let base_url = std::env::var("SARVAM_BASE_URL")
            .ok()
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let request_timeout_secs = match std::env::var("SARVAM_TIMEOUT_SECS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidTimeout(raw))?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            api_key: api_key.trim().to_string(),
            base_url,
            request_timeout_secs,
        })
    }

    /// Config pointing at a custom origin, used by tests and local stubs.
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}
