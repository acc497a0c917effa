// src/sarvam/mod.rs — Sarvam API clients, one submodule per model

mod lid;
mod llm;
mod parse;
mod stt;
mod translate;
mod tts;
mod types;

pub use types::{DetectedLanguage, ParsedDocument, SarvamError, Transcript};

use crate::config::AppConfig;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

const API_KEY_HEADER: &str = "api-subscription-key";

/// The six external operations the pipeline orchestrates. The orchestrator
/// depends on this seam so stage policy can be tested against mocks.
#[async_trait]
pub trait SarvamApi: Send + Sync {
    /// Extract text from an uploaded document (pdf or image bytes).
    async fn parse_document(
        &self,
        file_name: &str,
        bytes: &[u8],
        mime_type: &str,
    ) -> Result<ParsedDocument, SarvamError>;

    /// Transcribe a recorded question (wav bytes).
    async fn transcribe(&self, audio_wav: &[u8]) -> Result<Transcript, SarvamError>;

    /// Identify the language of a piece of text.
    async fn detect_language(&self, text: &str) -> Result<DetectedLanguage, SarvamError>;

    /// Answer a question against the document text. Answers are English.
    async fn ask(&self, document_text: &str, question: &str) -> Result<String, SarvamError>;

    /// Translate text between two supported language codes.
    async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, SarvamError>;

    /// Synthesize speech, returning mp3 bytes.
    async fn synthesize(
        &self,
        text: &str,
        target_lang: &str,
        voice: &str,
    ) -> Result<Vec<u8>, SarvamError>;
}

/// HTTP client for the Sarvam API. Implements [`SarvamApi`]; the individual
/// endpoints live in the per-model submodules.
pub struct SarvamClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl SarvamClient {
    pub fn new(config: &AppConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .unwrap_or_default();

        tracing::info!("Sarvam client initialized: {}", config.base_url);

        Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
        }
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .post(self.url(path))
            .header(API_KEY_HEADER, &self.api_key)
    }

    pub(crate) fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .get(self.url(path))
            .header(API_KEY_HEADER, &self.api_key)
    }
}

#[async_trait]
impl SarvamApi for SarvamClient {
    async fn parse_document(
        &self,
        file_name: &str,
        bytes: &[u8],
        mime_type: &str,
    ) -> Result<ParsedDocument, SarvamError> {
        self.parse_document_impl(file_name, bytes, mime_type).await
    }

    async fn transcribe(&self, audio_wav: &[u8]) -> Result<Transcript, SarvamError> {
        self.transcribe_impl(audio_wav).await
    }

    async fn detect_language(&self, text: &str) -> Result<DetectedLanguage, SarvamError> {
        self.detect_language_impl(text).await
    }

    async fn ask(&self, document_text: &str, question: &str) -> Result<String, SarvamError> {
        self.ask_impl(document_text, question).await
    }

    async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, SarvamError> {
        self.translate_impl(text, source_lang, target_lang).await
    }

    async fn synthesize(
        &self,
        text: &str,
        target_lang: &str,
        voice: &str,
    ) -> Result<Vec<u8>, SarvamError> {
        self.synthesize_impl(text, target_lang, voice).await
    }
}
