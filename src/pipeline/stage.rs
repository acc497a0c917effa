// src/pipeline/stage.rs
// The fixed six-stage registry

use serde::Serialize;
use std::time::Duration;

/// One step of the question-answering chain. Ordering is fixed and not
/// configurable; see [`PipelineStage::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStage {
    Parse,
    Stt,
    Lid,
    Llm,
    Translate,
    Tts,
}

pub const STAGE_COUNT: usize = 6;

impl PipelineStage {
    /// Execution order of the chain.
    pub const ALL: [PipelineStage; STAGE_COUNT] = [
        PipelineStage::Parse,
        PipelineStage::Stt,
        PipelineStage::Lid,
        PipelineStage::Llm,
        PipelineStage::Translate,
        PipelineStage::Tts,
    ];

    pub fn index(self) -> usize {
        match self {
            PipelineStage::Parse => 0,
            PipelineStage::Stt => 1,
            PipelineStage::Lid => 2,
            PipelineStage::Llm => 3,
            PipelineStage::Translate => 4,
            PipelineStage::Tts => 5,
        }
    }

    /// Short label for progress display.
    pub fn label(self) -> &'static str {
        match self {
            PipelineStage::Parse => "OCR",
            PipelineStage::Stt => "STT",
            PipelineStage::Lid => "LID",
            PipelineStage::Llm => "LLM",
            PipelineStage::Translate => "Trans",
            PipelineStage::Tts => "TTS",
        }
    }

    /// Name of the external model backing the stage.
    pub fn service_name(self) -> &'static str {
        match self {
            PipelineStage::Parse => "Document Intelligence",
            PipelineStage::Stt => "Saarika",
            PipelineStage::Lid => "Language ID",
            PipelineStage::Llm => "Sarvam-M",
            PipelineStage::Translate => "Mayura",
            PipelineStage::Tts => "Bulbul",
        }
    }
}

/// Lifecycle of one stage within a run. Statuses only move
/// Idle -> Active -> (Done | Error); Error is terminal for the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    Idle,
    Active,
    Done,
    Error,
}

/// Status and timing of one stage, as seen by observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageState {
    pub status: StageStatus,
    /// Wall-clock active -> done delta. `None` while idle/active and after
    /// an error.
    pub elapsed: Option<Duration>,
}

impl Default for StageState {
    fn default() -> Self {
        Self {
            status: StageStatus::Idle,
            elapsed: None,
        }
    }
}
