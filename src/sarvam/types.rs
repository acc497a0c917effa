// src/sarvam/types.rs
// Shared types and error definitions for the Sarvam API clients

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Output of the document parse stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedDocument {
    /// Extracted text, original language preserved.
    pub text: String,
    pub page_count: u32,
}

/// Output of the speech-to-text stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub text: String,
    /// Best-guess language code from the STT model (e.g. "hi-IN"),
    /// "unknown" when the model could not tell.
    pub language_code: String,
}

/// Output of the text language-identification stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectedLanguage {
    pub language_code: String,
    pub script_code: String,
}

impl DetectedLanguage {
    /// Whether the detection carries a usable language code.
    pub fn is_conclusive(&self) -> bool {
        !self.language_code.is_empty() && self.language_code != "unknown"
    }
}

/// Uniform failure contract for every Sarvam endpoint: non-2xx responses
/// surface as `ProviderError` with the response body as detail.
#[derive(Debug, Error)]
pub enum SarvamError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    TimeoutError,

    #[error("Authentication failed")]
    AuthenticationError,

    #[error("Rate limit exceeded")]
    RateLimitError,

    #[error("HTTP {status}: {body}")]
    ProviderError { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Document processing job failed: {0}")]
    JobFailed(String),

    #[error("Document processing timed out")]
    JobTimedOut,
}

impl SarvamError {
    /// Map a failed `reqwest` send into the transport variants.
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SarvamError::TimeoutError
        } else {
            SarvamError::NetworkError(err.to_string())
        }
    }

    /// Map a non-2xx response into the status variants, consuming the body.
    pub(crate) async fn from_response(resp: reqwest::Response) -> Self {
        let status = resp.status().as_u16();
        match status {
            401 | 403 => SarvamError::AuthenticationError,
            429 => SarvamError::RateLimitError,
            _ => {
                let body = resp.text().await.unwrap_or_default();
                SarvamError::ProviderError { status, body }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_detection_is_inconclusive() {
        let detected = DetectedLanguage {
            language_code: "unknown".to_string(),
            script_code: String::new(),
        };
        assert!(!detected.is_conclusive());
    }

    #[test]
    fn empty_detection_is_inconclusive() {
        let detected = DetectedLanguage {
            language_code: String::new(),
            script_code: String::new(),
        };
        assert!(!detected.is_conclusive());
    }

    #[test]
    fn concrete_detection_is_conclusive() {
        let detected = DetectedLanguage {
            language_code: "ta-IN".to_string(),
            script_code: "Taml".to_string(),
        };
        assert!(detected.is_conclusive());
    }
}
