// src/session.rs
// Per-session state: the uploaded document and the question/answer history

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use uuid::Uuid;

const HISTORY_LIMIT: usize = 50;

/// The currently uploaded document. Replaced wholesale on a new upload,
/// never mutated in place.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    pub file_name: String,
    pub text: String,
    pub page_count: u32,
}

/// One completed question-and-answer exchange. Immutable after creation.
#[derive(Debug, Clone, Serialize)]
pub struct QaTurn {
    pub id: String,
    /// Transcribed question, in the language it was asked in.
    pub question: String,
    /// LLM answer, assumed English regardless of the question's language.
    pub answer_english: String,
    /// Answer in the detected language. Equals `answer_english` when the
    /// translate stage was skipped or degraded.
    pub answer_translated: String,
    /// Language code the answer was delivered in.
    pub language_code: String,
    /// Synthesized speech (mp3). `None` when the tts stage degraded.
    #[serde(skip_serializing)]
    pub audio: Option<Vec<u8>>,
    pub total_elapsed: Duration,
    pub created_at: DateTime<Utc>,
}

impl QaTurn {
    pub fn has_audio(&self) -> bool {
        self.audio.is_some()
    }
}

/// Session state owned exclusively by one pipeline runner.
#[derive(Debug, Default)]
pub struct SessionState {
    document: Option<Document>,
    /// Newest first.
    history: Vec<QaTurn>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn history(&self) -> &[QaTurn] {
        &self.history
    }

    /// Install a freshly parsed document, discarding all prior turns.
    pub fn replace_document(&mut self, document: Document) {
        tracing::info!(
            "Document replaced: {} ({} chars, {} pages), clearing {} turns",
            document.file_name,
            document.text.len(),
            document.page_count,
            self.history.len()
        );
        self.document = Some(document);
        self.history.clear();
    }

    /// Drop the document and all turns, returning to the pre-upload state.
    pub fn clear(&mut self) {
        self.document = None;
        self.history.clear();
    }

    pub fn record_turn(&mut self, turn: QaTurn) {
        self.history.insert(0, turn);
        if self.history.len() > HISTORY_LIMIT {
            self.history.truncate(HISTORY_LIMIT);
        }
    }

    pub fn new_turn_id() -> String {
        Uuid::new_v4().to_string()
    }
}
