// src/sarvam/stt.rs — Saarika speech-to-text client (saaras:v3 model)

use super::types::{SarvamError, Transcript};
use super::SarvamClient;
use reqwest::multipart;
use serde::Deserialize;

const STT_PATH: &str = "/speech-to-text";
const MODEL: &str = "saaras:v3";

#[derive(Deserialize)]
struct SttResponse {
    #[serde(default)]
    transcript: String,
    #[serde(default)]
    language_code: Option<String>,
}

impl SarvamClient {
    /// Transcribe a spoken question. The language code is left as "unknown"
    /// so Saarika reports its own best guess alongside the transcript.
    pub(super) async fn transcribe_impl(
        &self,
        audio_wav: &[u8],
    ) -> Result<Transcript, SarvamError> {
        let file_part = multipart::Part::bytes(audio_wav.to_vec())
            .file_name("audio.wav")
            .mime_str("audio/wav")
            .map_err(|e| SarvamError::InvalidResponse(e.to_string()))?;

        let form = multipart::Form::new()
            .text("language_code", "unknown")
            .text("model", MODEL)
            .text("with_diarization", "false")
            .text("with_timestamps", "false")
            .part("file", file_part);

        let response = self
            .post(STT_PATH)
            .multipart(form)
            .send()
            .await
            .map_err(SarvamError::from_transport)?;

        if !response.status().is_success() {
            return Err(SarvamError::from_response(response).await);
        }

        let body: SttResponse = response
            .json()
            .await
            .map_err(|e| SarvamError::InvalidResponse(e.to_string()))?;

        tracing::info!("STT: transcribed {} chars", body.transcript.len());

        Ok(Transcript {
            text: body.transcript,
            language_code: body
                .language_code
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| "unknown".to_string()),
        })
    }
}
