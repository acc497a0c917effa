// src/pipeline/runner.rs
// Pipeline orchestrator — drives the fixed parse → stt → lid → llm →
// translate → tts chain for one session.
//
// Failure policy per stage:
//   parse, stt, llm  — fatal: the turn aborts, prior state is preserved
//                      (except parse, which resets the session)
//   lid              — advisory: the stt language guess is kept
//   translate        — degrades to the untranslated English answer
//   tts              — degrades to a turn without audio

use crate::language;
use crate::pipeline::outcome::StageOutcome;
use crate::pipeline::stage::PipelineStage;
use crate::pipeline::tracker::{StageTracker, TrackerSnapshot};
use crate::sarvam::{SarvamApi, SarvamError};
use crate::session::{Document, QaTurn, SessionState};
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use thiserror::Error;
use tokio::sync::watch;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("A pipeline run is already in flight")]
    Busy,

    #[error("No document uploaded")]
    NoDocument,

    #[error("Document parse failed: {0}")]
    Parse(SarvamError),

    #[error("Transcription failed: {0}")]
    Transcribe(SarvamError),

    #[error("Answer generation failed: {0}")]
    Ask(SarvamError),
}

/// Owns one session's state (document, history, stage tracker) and runs the
/// six-stage chain against the service seam. At most one run is in flight at
/// a time; a concurrent call fails fast with [`PipelineError::Busy`].
pub struct PipelineRunner {
    services: Arc<dyn SarvamApi>,
    tracker: StageTracker,
    session: Mutex<SessionState>,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag when the run ends, including on early return.
struct RunGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

impl PipelineRunner {
    pub fn new(services: Arc<dyn SarvamApi>) -> Self {
        Self {
            services,
            tracker: StageTracker::new(),
            session: Mutex::new(SessionState::new()),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Subscribe to stage snapshots for progress display.
    pub fn subscribe(&self) -> watch::Receiver<TrackerSnapshot> {
        self.tracker.subscribe()
    }

    pub fn stage_snapshot(&self) -> TrackerSnapshot {
        self.tracker.snapshot()
    }

    pub fn document(&self) -> Option<Document> {
        self.lock_session().document().cloned()
    }

    /// Completed turns, newest first.
    pub fn history(&self) -> Vec<QaTurn> {
        self.lock_session().history().to_vec()
    }

    /// Parse an uploaded document. Runs once per document, not per question.
    /// On success the document replaces any prior one and all turn history
    /// is cleared; on failure the session returns to the pre-upload state.
    pub async fn upload_document(
        &self,
        file_name: &str,
        bytes: &[u8],
        mime_type: &str,
    ) -> Result<Document, PipelineError> {
        let _guard = self.begin_run()?;

        self.tracker.reset();
        self.tracker.begin(PipelineStage::Parse);

        match self.services.parse_document(file_name, bytes, mime_type).await {
            Ok(parsed) => {
                self.tracker.finish(PipelineStage::Parse);
                let document = Document {
                    file_name: file_name.to_string(),
                    text: parsed.text,
                    page_count: parsed.page_count,
                };
                self.lock_session().replace_document(document.clone());
                Ok(document)
            }
            Err(e) => {
                tracing::error!("Parse failed for {}: {}", file_name, e);
                self.tracker.fail(PipelineStage::Parse);
                self.lock_session().clear();
                Err(PipelineError::Parse(e))
            }
        }
    }

    /// Run one question turn: transcribe the recorded audio, answer against
    /// the uploaded document, and deliver the answer in the speaker's
    /// language, by voice. Appends a [`QaTurn`] on completion.
    pub async fn ask(&self, audio_wav: &[u8]) -> Result<QaTurn, PipelineError> {
        let _guard = self.begin_run()?;

        let document = self
            .lock_session()
            .document()
            .cloned()
            .ok_or(PipelineError::NoDocument)?;

        let turn_started = Instant::now();
        self.tracker.reset_for_followup();

        // stt — fatal
        self.tracker.begin(PipelineStage::Stt);
        let transcript = match self.services.transcribe(audio_wav).await {
            Ok(t) => {
                self.tracker.finish(PipelineStage::Stt);
                tracing::info!(
                    "STT: {} chars, language guess {}",
                    t.text.len(),
                    t.language_code
                );
                t
            }
            Err(e) => {
                tracing::error!("STT failed: {}", e);
                self.tracker.fail(PipelineStage::Stt);
                return Err(PipelineError::Transcribe(e));
            }
        };

        // lid — advisory: any failure keeps the stt guess
        self.tracker.begin(PipelineStage::Lid);
        let language = match self.services.detect_language(&transcript.text).await {
            Ok(detected) if detected.is_conclusive() => {
                self.tracker.finish(PipelineStage::Lid);
                StageOutcome::Success(detected.language_code)
            }
            Ok(_) => {
                self.tracker.finish(PipelineStage::Lid);
                StageOutcome::degraded(transcript.language_code.clone(), "inconclusive detection")
            }
            Err(e) => {
                tracing::warn!("LID failed, keeping stt guess: {}", e);
                self.tracker.fail(PipelineStage::Lid);
                StageOutcome::degraded(transcript.language_code.clone(), e.to_string())
            }
        };
        let language_code = language.into_value();

        // llm — fatal
        self.tracker.begin(PipelineStage::Llm);
        let answer_english = match self.services.ask(&document.text, &transcript.text).await {
            Ok(answer) => {
                self.tracker.finish(PipelineStage::Llm);
                tracing::info!("LLM: answered with {} chars", answer.len());
                answer
            }
            Err(e) => {
                tracing::error!("LLM failed: {}", e);
                self.tracker.fail(PipelineStage::Llm);
                return Err(PipelineError::Ask(e));
            }
        };

        // translate — skipped for the base language and unsupported codes;
        // call failure degrades to the English answer
        self.tracker.begin(PipelineStage::Translate);
        let translated = if language_code == language::BASE_LANGUAGE
            || !language::is_supported(&language_code)
        {
            self.tracker.finish(PipelineStage::Translate);
            StageOutcome::Success(answer_english.clone())
        } else {
            match self
                .services
                .translate(&answer_english, language::BASE_LANGUAGE, &language_code)
                .await
            {
                Ok(text) => {
                    self.tracker.finish(PipelineStage::Translate);
                    StageOutcome::Success(text)
                }
                Err(e) => {
                    tracing::warn!("Translate failed, using English answer: {}", e);
                    self.tracker.fail(PipelineStage::Translate);
                    StageOutcome::degraded(answer_english.clone(), e.to_string())
                }
            }
        };
        let answer_translated = translated.into_value();

        // tts — failure records the turn without audio
        let (tts_lang, voice) = language::voice_for(&language_code);
        self.tracker.begin(PipelineStage::Tts);
        let audio = match self
            .services
            .synthesize(&answer_translated, tts_lang, voice)
            .await
        {
            Ok(bytes) => {
                self.tracker.finish(PipelineStage::Tts);
                Some(bytes)
            }
            Err(e) => {
                tracing::warn!("TTS failed, turn recorded without audio: {}", e);
                self.tracker.fail(PipelineStage::Tts);
                None
            }
        };

        let turn = QaTurn {
            id: SessionState::new_turn_id(),
            question: transcript.text,
            answer_english,
            answer_translated,
            language_code,
            audio,
            total_elapsed: turn_started.elapsed(),
            created_at: Utc::now(),
        };

        self.lock_session().record_turn(turn.clone());
        tracing::info!(
            "Turn complete in {:.1}s ({} turns in history)",
            turn.total_elapsed.as_secs_f32(),
            self.lock_session().history().len()
        );

        Ok(turn)
    }

    fn begin_run(&self) -> Result<RunGuard<'_>, PipelineError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(PipelineError::Busy);
        }
        Ok(RunGuard {
            flag: &self.in_flight,
        })
    }

    fn lock_session(&self) -> std::sync::MutexGuard<'_, SessionState> {
        self.session.lock().expect("session lock poisoned")
    }
}
