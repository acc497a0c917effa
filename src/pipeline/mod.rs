// src/pipeline/mod.rs — Pipeline Orchestration

mod outcome;
mod runner;
mod stage;
mod tracker;

pub use outcome::StageOutcome;
pub use runner::{PipelineError, PipelineRunner};
pub use stage::{PipelineStage, StageState, StageStatus, STAGE_COUNT};
pub use tracker::{StageTracker, TrackerSnapshot};
