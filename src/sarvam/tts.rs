// src/sarvam/tts.rs — Bulbul text-to-speech client

use super::types::SarvamError;
use super::SarvamClient;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

const TTS_PATH: &str = "/text-to-speech";
const MODEL: &str = "bulbul:v3";
const SAMPLE_RATE: u32 = 24_000;
const AUDIO_CODEC: &str = "mp3";

#[derive(Serialize)]
struct TtsRequest<'a> {
    text: &'a str,
    target_language_code: &'a str,
    speaker: &'a str,
    model: &'static str,
    speech_sample_rate: u32,
    output_audio_codec: &'static str,
    enable_preprocessing: bool,
}

#[derive(Deserialize)]
struct TtsResponse {
    #[serde(default)]
    audios: Vec<String>,
}

impl SarvamClient {
    pub(super) async fn synthesize_impl(
        &self,
        text: &str,
        target_lang: &str,
        voice: &str,
    ) -> Result<Vec<u8>, SarvamError> {
        let request = TtsRequest {
            text,
            target_language_code: target_lang,
            speaker: voice,
            model: MODEL,
            speech_sample_rate: SAMPLE_RATE,
            output_audio_codec: AUDIO_CODEC,
            enable_preprocessing: true,
        };

        let response = self
            .post(TTS_PATH)
            .json(&request)
            .send()
            .await
            .map_err(SarvamError::from_transport)?;

        if !response.status().is_success() {
            return Err(SarvamError::from_response(response).await);
        }

        let body: TtsResponse = response
            .json()
            .await
            .map_err(|e| SarvamError::InvalidResponse(e.to_string()))?;

        let encoded = body
            .audios
            .into_iter()
            .next()
            .filter(|a| !a.is_empty())
            .ok_or_else(|| SarvamError::InvalidResponse("no audio returned".to_string()))?;

        let bytes = BASE64_STANDARD
            .decode(encoded)
            .map_err(|e| SarvamError::InvalidResponse(format!("bad audio base64: {}", e)))?;

        tracing::info!("TTS: synthesized {} bytes for {}", bytes.len(), target_lang);

        Ok(bytes)
    }
}
