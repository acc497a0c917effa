//! Vaani — voice document Q&A over the Sarvam AI model chain.
//!
//! Upload a document, ask a question by voice, hear the answer in your own
//! language. Six external models run in a fixed sequence:
//!
//! ```text
//! parse (Document Intelligence) → stt (Saarika) → lid (Language ID)
//!   → llm (Sarvam-M) → translate (Mayura) → tts (Bulbul)
//! ```
//!
//! [`pipeline::PipelineRunner`] orchestrates the chain for one session,
//! tracking per-stage status and timing and absorbing partial failures:
//! lid, translate, and tts degrade to fallbacks, while parse, stt, and llm
//! abort the turn.

pub mod config;
pub mod language;
pub mod pipeline;
pub mod sarvam;
pub mod session;

pub use config::AppConfig;
pub use pipeline::{PipelineError, PipelineRunner, PipelineStage, StageStatus};
pub use sarvam::{SarvamApi, SarvamClient, SarvamError};
pub use session::{Document, QaTurn};
