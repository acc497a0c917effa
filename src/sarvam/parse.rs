// src/sarvam/parse.rs — document text extraction client
//
// PDFs go through the job-based Document Intelligence API (create -> upload
// -> start -> poll -> download). Images, and PDFs when job creation is
// unavailable, fall back to a Sarvam-M extraction prompt.

use super::llm::{ChatResponse, CHAT_PATH, MODEL as CHAT_MODEL};
use super::types::{ParsedDocument, SarvamError};
use super::SarvamClient;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;
use reqwest::multipart;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

const JOB_CREATE_PATH: &str = "/documents-intelligence/create-job";
const JOB_UPLOAD_PATH: &str = "/documents-intelligence/upload";
const JOB_START_PATH: &str = "/documents-intelligence/start";
const JOB_STATUS_PATH: &str = "/documents-intelligence/status";
const JOB_DOWNLOAD_PATH: &str = "/documents-intelligence/download";

const POLL_ATTEMPTS: u32 = 30;
const POLL_INTERVAL: Duration = Duration::from_secs(1);

const IMAGE_EXTRACT_PROMPT: &str = "Extract ALL text from this document image. Preserve the \
original language and formatting. Return only the extracted text, nothing else.";
const PDF_EXTRACT_PROMPT: &str = "Extract ALL text from this PDF document (provided as base64). \
Preserve the original language.";
// Keeps the fallback prompt inside the model's context window.
const PDF_BASE64_LIMIT: usize = 50_000;
const EXTRACT_MAX_TOKENS: u32 = 4096;

#[derive(Deserialize)]
struct CreateJobResponse {
    job_id: String,
}

#[derive(Deserialize)]
struct JobStatusResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct JobResultResponse {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    page_count: Option<u32>,
}

impl SarvamClient {
    pub(super) async fn parse_document_impl(
        &self,
        file_name: &str,
        bytes: &[u8],
        mime_type: &str,
    ) -> Result<ParsedDocument, SarvamError> {
        tracing::info!(
            "Parse: {} ({} bytes, {})",
            file_name,
            bytes.len(),
            mime_type
        );

        if mime_type.starts_with("image/") {
            return self.extract_from_image(bytes, mime_type).await;
        }

        match self.create_parse_job().await {
            Ok(job_id) => self.run_parse_job(&job_id, bytes, mime_type).await,
            Err(e) => {
                tracing::warn!("Parse: job creation unavailable ({}), using LLM fallback", e);
                self.extract_from_pdf_fallback(bytes).await
            }
        }
    }

    /// Single-shot extraction for images via the multimodal chat endpoint.
    async fn extract_from_image(
        &self,
        bytes: &[u8],
        mime_type: &str,
    ) -> Result<ParsedDocument, SarvamError> {
        let encoded = BASE64_STANDARD.encode(bytes);
        let request = json!({
            "model": CHAT_MODEL,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": IMAGE_EXTRACT_PROMPT },
                    {
                        "type": "image_url",
                        "image_url": { "url": format!("data:{};base64,{}", mime_type, encoded) }
                    }
                ]
            }],
            "max_tokens": EXTRACT_MAX_TOKENS,
        });

        let text = self.chat_extract(&request).await?;
        Ok(ParsedDocument { text, page_count: 1 })
    }

    /// PDF fallback when the Document Intelligence API is unavailable: hand
    /// a truncated base64 of the file to Sarvam-M with an extraction prompt.
    async fn extract_from_pdf_fallback(&self, bytes: &[u8]) -> Result<ParsedDocument, SarvamError> {
        let mut encoded = BASE64_STANDARD.encode(bytes);
        encoded.truncate(PDF_BASE64_LIMIT);

        let request = json!({
            "model": CHAT_MODEL,
            "messages": [{
                "role": "user",
                "content": format!("{}\n\nBase64 PDF:\n{}", PDF_EXTRACT_PROMPT, encoded),
            }],
            "max_tokens": EXTRACT_MAX_TOKENS,
        });

        let text = self.chat_extract(&request).await?;
        Ok(ParsedDocument { text, page_count: 1 })
    }

    async fn chat_extract(&self, request: &serde_json::Value) -> Result<String, SarvamError> {
        let response = self
            .post(CHAT_PATH)
            .json(request)
            .send()
            .await
            .map_err(SarvamError::from_transport)?;

        if !response.status().is_success() {
            return Err(SarvamError::from_response(response).await);
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| SarvamError::InvalidResponse(e.to_string()))?;

        body.first_content()
            .ok_or_else(|| SarvamError::InvalidResponse("empty extraction".to_string()))
    }

    async fn create_parse_job(&self) -> Result<String, SarvamError> {
        let response = self
            .post(JOB_CREATE_PATH)
            .json(&json!({ "file_type": "pdf", "page_count": 0 }))
            .send()
            .await
            .map_err(SarvamError::from_transport)?;

        if !response.status().is_success() {
            return Err(SarvamError::from_response(response).await);
        }

        let body: CreateJobResponse = response
            .json()
            .await
            .map_err(|e| SarvamError::InvalidResponse(e.to_string()))?;

        Ok(body.job_id)
    }

    async fn run_parse_job(
        &self,
        job_id: &str,
        bytes: &[u8],
        mime_type: &str,
    ) -> Result<ParsedDocument, SarvamError> {
        // Upload the file
        let file_part = multipart::Part::bytes(bytes.to_vec())
            .file_name("document.pdf")
            .mime_str(mime_type)
            .map_err(|e| SarvamError::InvalidResponse(e.to_string()))?;

        let response = self
            .post(&format!("{}/{}", JOB_UPLOAD_PATH, job_id))
            .multipart(multipart::Form::new().part("file", file_part))
            .send()
            .await
            .map_err(SarvamError::from_transport)?;

        if !response.status().is_success() {
            return Err(SarvamError::from_response(response).await);
        }

        // Start processing
        let response = self
            .post(&format!("{}/{}", JOB_START_PATH, job_id))
            .send()
            .await
            .map_err(SarvamError::from_transport)?;

        if !response.status().is_success() {
            return Err(SarvamError::from_response(response).await);
        }

        // Poll until the job completes
        for attempt in 1..=POLL_ATTEMPTS {
            tokio::time::sleep(POLL_INTERVAL).await;

            let response = match self
                .get(&format!("{}/{}", JOB_STATUS_PATH, job_id))
                .send()
                .await
            {
                Ok(resp) if resp.status().is_success() => resp,
                // Transient status failures just consume a poll attempt
                _ => continue,
            };

            let status: JobStatusResponse = match response.json().await {
                Ok(s) => s,
                Err(_) => continue,
            };

            match status.status.as_str() {
                "completed" => {
                    tracing::info!("Parse: job {} completed after {} polls", job_id, attempt);
                    return self.download_parse_result(job_id).await;
                }
                "failed" => {
                    return Err(SarvamError::JobFailed(
                        status.error.unwrap_or_else(|| "unknown".to_string()),
                    ));
                }
                _ => {}
            }
        }

        Err(SarvamError::JobTimedOut)
    }

    async fn download_parse_result(&self, job_id: &str) -> Result<ParsedDocument, SarvamError> {
        let response = self
            .get(&format!("{}/{}", JOB_DOWNLOAD_PATH, job_id))
            .send()
            .await
            .map_err(SarvamError::from_transport)?;

        if !response.status().is_success() {
            return Err(SarvamError::from_response(response).await);
        }

        let body: JobResultResponse = response
            .json()
            .await
            .map_err(|e| SarvamError::InvalidResponse(e.to_string()))?;

        let text = body
            .text
            .or(body.content)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| SarvamError::InvalidResponse("empty parse result".to_string()))?;

        Ok(ParsedDocument {
            text,
            page_count: body.page_count.unwrap_or(1),
        })
    }
}
