// Orchestrator behavior against a mocked service seam: stage failure
// policy, fallbacks, session state, and the reentrancy guard.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use vaani::pipeline::{PipelineError, PipelineRunner, PipelineStage, StageStatus};
use vaani::sarvam::{DetectedLanguage, ParsedDocument, SarvamApi, SarvamError, Transcript};

const DOC_TEXT: &str = "PM-KISAN subsidy form. Applications close on 31 March.";
const QUESTION: &str = "आवेदन की अंतिम तिथि क्या है?";
const ANSWER_EN: &str = "The deadline is 31 March.";

struct MockServices {
    fail_parse_on_call: Option<usize>,
    fail_transcribe: bool,
    fail_detect: bool,
    fail_ask: bool,
    fail_translate: bool,
    fail_synthesize: bool,
    /// Code returned by lid; `None` means an inconclusive "unknown".
    detect_code: Option<&'static str>,
    /// Best-guess code returned by stt.
    transcribe_code: &'static str,
    transcribe_delay: Option<Duration>,
    parse_calls: AtomicUsize,
    translate_calls: AtomicUsize,
    synth_args: Mutex<Option<(String, String)>>,
}

impl MockServices {
    fn happy() -> Self {
        Self {
            fail_parse_on_call: None,
            fail_transcribe: false,
            fail_detect: false,
            fail_ask: false,
            fail_translate: false,
            fail_synthesize: false,
            detect_code: Some("hi-IN"),
            transcribe_code: "hi-IN",
            transcribe_delay: None,
            parse_calls: AtomicUsize::new(0),
            translate_calls: AtomicUsize::new(0),
            synth_args: Mutex::new(None),
        }
    }

    fn provider_down() -> SarvamError {
        SarvamError::ProviderError {
            status: 500,
            body: "upstream unavailable".to_string(),
        }
    }
}

#[async_trait]
impl SarvamApi for MockServices {
    async fn parse_document(
        &self,
        _file_name: &str,
        _bytes: &[u8],
        _mime_type: &str,
    ) -> Result<ParsedDocument, SarvamError> {
        let call = self.parse_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_parse_on_call == Some(call) {
            return Err(Self::provider_down());
        }
        Ok(ParsedDocument {
            text: DOC_TEXT.to_string(),
            page_count: 2,
        })
    }

    async fn transcribe(&self, _audio_wav: &[u8]) -> Result<Transcript, SarvamError> {
        if let Some(delay) = self.transcribe_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_transcribe {
            return Err(SarvamError::NetworkError("connection reset".to_string()));
        }
        Ok(Transcript {
            text: QUESTION.to_string(),
            language_code: self.transcribe_code.to_string(),
        })
    }

    async fn detect_language(&self, _text: &str) -> Result<DetectedLanguage, SarvamError> {
        if self.fail_detect {
            return Err(Self::provider_down());
        }
        Ok(DetectedLanguage {
            language_code: self.detect_code.unwrap_or("unknown").to_string(),
            script_code: String::new(),
        })
    }

    async fn ask(&self, document_text: &str, question: &str) -> Result<String, SarvamError> {
        assert_eq!(document_text, DOC_TEXT);
        assert_eq!(question, QUESTION);
        if self.fail_ask {
            return Err(Self::provider_down());
        }
        Ok(ANSWER_EN.to_string())
    }

    async fn translate(
        &self,
        text: &str,
        _source_lang: &str,
        target_lang: &str,
    ) -> Result<String, SarvamError> {
        self.translate_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_translate {
            return Err(Self::provider_down());
        }
        Ok(format!("[{}] {}", target_lang, text))
    }

    async fn synthesize(
        &self,
        _text: &str,
        target_lang: &str,
        voice: &str,
    ) -> Result<Vec<u8>, SarvamError> {
        *self.synth_args.lock().unwrap() = Some((target_lang.to_string(), voice.to_string()));
        if self.fail_synthesize {
            return Err(Self::provider_down());
        }
        Ok(vec![0x49, 0x44, 0x33])
    }
}

fn runner_with(mock: MockServices) -> (PipelineRunner, Arc<MockServices>) {
    let services = Arc::new(mock);
    (PipelineRunner::new(services.clone()), services)
}

async fn upload(runner: &PipelineRunner) {
    runner
        .upload_document("form.pdf", b"%PDF-1.4", "application/pdf")
        .await
        .expect("upload should succeed");
}

#[tokio::test]
async fn end_to_end_turn_appends_one_translated_turn_with_audio() {
    let (runner, _) = runner_with(MockServices::happy());
    upload(&runner).await;

    let turn = runner.ask(b"wav").await.expect("turn should complete");

    assert_eq!(turn.question, QUESTION);
    assert_eq!(turn.answer_english, ANSWER_EN);
    assert_eq!(turn.language_code, "hi-IN");
    assert_ne!(
        turn.answer_translated, turn.answer_english,
        "hi-IN answer must differ from the English answer"
    );
    assert!(turn.has_audio());

    let history = runner.history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, turn.id);

    let snap = runner.stage_snapshot();
    for (stage, state) in snap.iter() {
        assert_eq!(state.status, StageStatus::Done, "{} not done", stage.label());
        assert!(state.elapsed.is_some());
    }
}

#[tokio::test]
async fn followup_turn_reuses_parse_and_orders_history_newest_first() {
    let (runner, services) = runner_with(MockServices::happy());
    upload(&runner).await;

    runner.ask(b"wav-1").await.expect("first turn");
    let parse_elapsed = runner
        .stage_snapshot()
        .get(PipelineStage::Parse)
        .elapsed
        .expect("parse elapsed recorded");

    runner.ask(b"wav-2").await.expect("second turn");

    // Parse ran once for both turns and kept its completed state
    assert_eq!(services.parse_calls.load(Ordering::SeqCst), 1);
    let snap = runner.stage_snapshot();
    assert_eq!(snap.get(PipelineStage::Parse).status, StageStatus::Done);
    assert_eq!(snap.get(PipelineStage::Parse).elapsed, Some(parse_elapsed));

    let history = runner.history();
    assert_eq!(history.len(), 2);
    assert!(history[0].created_at >= history[1].created_at);
}

#[tokio::test]
async fn translate_is_skipped_for_base_language() {
    let (runner, services) = runner_with(MockServices {
        detect_code: Some("en-IN"),
        ..MockServices::happy()
    });
    upload(&runner).await;

    let turn = runner.ask(b"wav").await.expect("turn should complete");

    assert_eq!(services.translate_calls.load(Ordering::SeqCst), 0);
    assert_eq!(turn.answer_translated, turn.answer_english);
    assert_eq!(
        runner.stage_snapshot().get(PipelineStage::Translate).status,
        StageStatus::Done
    );
}

#[tokio::test]
async fn translate_failure_falls_back_to_english_answer() {
    let (runner, _) = runner_with(MockServices {
        fail_translate: true,
        ..MockServices::happy()
    });
    upload(&runner).await;

    let turn = runner.ask(b"wav").await.expect("turn must still complete");

    assert_eq!(turn.answer_translated, ANSWER_EN);
    assert!(turn.has_audio(), "tts still runs on the fallback text");
    assert_eq!(runner.history().len(), 1);
    assert_eq!(
        runner.stage_snapshot().get(PipelineStage::Translate).status,
        StageStatus::Error
    );
}

#[tokio::test]
async fn synthesize_failure_records_turn_without_audio() {
    let (runner, _) = runner_with(MockServices {
        fail_synthesize: true,
        ..MockServices::happy()
    });
    upload(&runner).await;

    let turn = runner.ask(b"wav").await.expect("turn must still complete");

    assert!(!turn.has_audio());
    assert_eq!(runner.history().len(), 1);
    assert_eq!(
        runner.stage_snapshot().get(PipelineStage::Tts).status,
        StageStatus::Error
    );
}

#[tokio::test]
async fn transcribe_failure_appends_no_turn_and_preserves_document() {
    let (runner, _) = runner_with(MockServices {
        fail_transcribe: true,
        ..MockServices::happy()
    });
    upload(&runner).await;

    let err = runner.ask(b"wav").await.expect_err("turn must abort");

    assert!(matches!(err, PipelineError::Transcribe(_)));
    assert!(runner.history().is_empty());
    assert!(runner.document().is_some(), "document survives for retry");
    assert_eq!(
        runner.stage_snapshot().get(PipelineStage::Stt).status,
        StageStatus::Error
    );
}

#[tokio::test]
async fn llm_failure_aborts_turn_but_preserves_state() {
    let (runner, _) = runner_with(MockServices {
        fail_ask: true,
        ..MockServices::happy()
    });
    upload(&runner).await;

    let err = runner.ask(b"wav").await.expect_err("turn must abort");

    assert!(matches!(err, PipelineError::Ask(_)));
    assert!(runner.history().is_empty());
    assert!(runner.document().is_some());
}

#[tokio::test]
async fn lid_failure_keeps_the_stt_language_guess() {
    let (runner, _) = runner_with(MockServices {
        fail_detect: true,
        transcribe_code: "ta-IN",
        ..MockServices::happy()
    });
    upload(&runner).await;

    let turn = runner.ask(b"wav").await.expect("lid is advisory only");

    assert_eq!(turn.language_code, "ta-IN");
    assert_eq!(turn.answer_translated, format!("[ta-IN] {}", ANSWER_EN));
}

#[tokio::test]
async fn inconclusive_lid_keeps_the_stt_language_guess() {
    let (runner, _) = runner_with(MockServices {
        detect_code: None,
        transcribe_code: "bn-IN",
        ..MockServices::happy()
    });
    upload(&runner).await;

    let turn = runner.ask(b"wav").await.expect("turn should complete");

    assert_eq!(turn.language_code, "bn-IN");
    assert_eq!(
        runner.stage_snapshot().get(PipelineStage::Lid).status,
        StageStatus::Done
    );
}

#[tokio::test]
async fn unsupported_language_skips_translate_and_uses_default_voice() {
    let (runner, services) = runner_with(MockServices {
        detect_code: Some("fr-FR"),
        ..MockServices::happy()
    });
    upload(&runner).await;

    let turn = runner.ask(b"wav").await.expect("turn should complete");

    assert_eq!(services.translate_calls.load(Ordering::SeqCst), 0);
    assert_eq!(turn.answer_translated, turn.answer_english);
    assert!(turn.has_audio());

    let args = services.synth_args.lock().unwrap().clone();
    assert_eq!(args, Some(("en-IN".to_string(), "ananya".to_string())));
}

#[tokio::test]
async fn uploading_a_new_document_clears_history() {
    let (runner, _) = runner_with(MockServices::happy());
    upload(&runner).await;
    runner.ask(b"wav").await.expect("turn should complete");
    assert_eq!(runner.history().len(), 1);

    upload(&runner).await;

    assert!(runner.history().is_empty());
    let snap = runner.stage_snapshot();
    assert_eq!(snap.get(PipelineStage::Stt).status, StageStatus::Idle);
    assert_eq!(snap.get(PipelineStage::Parse).status, StageStatus::Done);
}

#[tokio::test]
async fn parse_failure_resets_session_to_pre_upload() {
    let (runner, _) = runner_with(MockServices {
        fail_parse_on_call: Some(2),
        ..MockServices::happy()
    });
    upload(&runner).await;
    runner.ask(b"wav").await.expect("turn should complete");

    let err = runner
        .upload_document("broken.pdf", b"%PDF-1.4", "application/pdf")
        .await
        .expect_err("second upload must fail");

    assert!(matches!(err, PipelineError::Parse(_)));
    assert!(runner.document().is_none());
    assert!(runner.history().is_empty());
    assert_eq!(
        runner.stage_snapshot().get(PipelineStage::Parse).status,
        StageStatus::Error
    );
}

#[tokio::test]
async fn ask_without_document_is_rejected() {
    let (runner, _) = runner_with(MockServices::happy());

    let err = runner.ask(b"wav").await.expect_err("no document uploaded");
    assert!(matches!(err, PipelineError::NoDocument));
}

#[tokio::test]
async fn concurrent_run_is_rejected_as_busy() {
    let (runner, _) = runner_with(MockServices {
        transcribe_delay: Some(Duration::from_millis(200)),
        ..MockServices::happy()
    });
    let runner = Arc::new(runner);
    upload(&runner).await;

    let background = {
        let runner = runner.clone();
        tokio::spawn(async move { runner.ask(b"wav-1").await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    let err = runner.ask(b"wav-2").await.expect_err("run is in flight");
    assert!(matches!(err, PipelineError::Busy));

    let err = runner
        .upload_document("form.pdf", b"%PDF-1.4", "application/pdf")
        .await
        .expect_err("uploads are also guarded");
    assert!(matches!(err, PipelineError::Busy));

    let first = background.await.expect("task join");
    assert!(first.is_ok(), "the in-flight turn completes normally");
    assert_eq!(runner.history().len(), 1);
}
