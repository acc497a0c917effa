// src/sarvam/llm.rs — Sarvam-M chat completion client

use super::types::SarvamError;
use super::SarvamClient;
use serde::{Deserialize, Serialize};

pub(super) const CHAT_PATH: &str = "/v1/chat/completions";
pub(super) const MODEL: &str = "sarvam-m";
const MAX_TOKENS: u32 = 1024;

const SYSTEM_PROMPT: &str = "You are a helpful document assistant. Answer questions based on \
the following document content. If the answer is not in the document, say so. Keep answers concise.";

#[derive(Serialize)]
pub(super) struct ChatRequest {
    pub model: &'static str,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
}

#[derive(Serialize)]
pub(super) struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

#[derive(Deserialize)]
pub(super) struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
pub(super) struct ChatChoice {
    pub message: ChatChoiceMessage,
}

#[derive(Deserialize)]
pub(super) struct ChatChoiceMessage {
    #[serde(default)]
    pub content: String,
}

impl ChatResponse {
    pub(super) fn first_content(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .filter(|text| !text.is_empty())
    }
}

impl SarvamClient {
    /// Ask a question about the document. The document rides in the system
    /// prompt; the answer comes back in English.
    pub(super) async fn ask_impl(
        &self,
        document_text: &str,
        question: &str,
    ) -> Result<String, SarvamError> {
        let request = ChatRequest {
            model: MODEL,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: format!("{}\n\nDocument:\n{}", SYSTEM_PROMPT, document_text),
                },
                ChatMessage {
                    role: "user",
                    content: question.to_string(),
                },
            ],
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .post(CHAT_PATH)
            .json(&request)
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
            .ok_or_else(|| SarvamError::InvalidResponse("empty chat completion".to_string()))
    }
}
