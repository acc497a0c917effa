// src/sarvam/translate.rs — Mayura translation client

use super::types::SarvamError;
use super::SarvamClient;
use serde::{Deserialize, Serialize};

const TRANSLATE_PATH: &str = "/translate";
const MODEL: &str = "mayura:v1";
const MODE: &str = "modern-colloquial";

#[derive(Serialize)]
struct TranslateRequest<'a> {
    input: &'a str,
    source_language_code: &'a str,
    target_language_code: &'a str,
    model: &'static str,
    mode: &'static str,
    enable_preprocessing: bool,
}

#[derive(Deserialize)]
struct TranslateResponse {
    #[serde(default)]
    translated_text: String,
}

impl SarvamClient {
    pub(super) async fn translate_impl(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, SarvamError> {
        let request = TranslateRequest {
            input: text,
            source_language_code: source_lang,
            target_language_code: target_lang,
            model: MODEL,
            mode: MODE,
            enable_preprocessing: true,
        };

        let response = self
            .post(TRANSLATE_PATH)
            .json(&request)
            .send()
            .await
            .map_err(SarvamError::from_transport)?;

        if !response.status().is_success() {
            return Err(SarvamError::from_response(response).await);
        }

        let body: TranslateResponse = response
            .json()
            .await
            .map_err(|e| SarvamError::InvalidResponse(e.to_string()))?;

        if body.translated_text.is_empty() {
            return Err(SarvamError::InvalidResponse(
                "empty translation".to_string(),
            ));
        }

        tracing::info!(
            "Translate: {} -> {} ({} chars)",
            source_lang,
            target_lang,
            body.translated_text.len()
        );

        Ok(body.translated_text)
    }
}
