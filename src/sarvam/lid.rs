// src/sarvam/lid.rs — text language identification client

use super::types::{DetectedLanguage, SarvamError};
use super::SarvamClient;
use serde::{Deserialize, Serialize};

const LID_PATH: &str = "/text-lid";

#[derive(Serialize)]
struct LidRequest<'a> {
    input: &'a str,
}

#[derive(Deserialize)]
struct LidResponse {
    #[serde(default)]
    language_code: Option<String>,
    #[serde(default)]
    script_code: Option<String>,
}

impl SarvamClient {
    pub(super) async fn detect_language_impl(
        &self,
        text: &str,
    ) -> Result<DetectedLanguage, SarvamError> {
        let response = self
            .post(LID_PATH)
            .json(&LidRequest { input: text })
            .send()
            .await
            .map_err(SarvamError::from_transport)?;

        if !response.status().is_success() {
            return Err(SarvamError::from_response(response).await);
        }

        let body: LidResponse = response
            .json()
            .await
            .map_err(|e| SarvamError::InvalidResponse(e.to_string()))?;

        Ok(DetectedLanguage {
            language_code: body.language_code.unwrap_or_else(|| "unknown".to_string()),
            script_code: body.script_code.unwrap_or_default(),
        })
    }
}
