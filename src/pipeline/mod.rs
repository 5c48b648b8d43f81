//! Voice-driven breed search pipeline.

pub mod orchestrator;
pub mod stage;

pub use orchestrator::{SearchOutcome, VoiceSearch};
pub use stage::{PipelineStage, render_stage};
