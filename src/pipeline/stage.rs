//! Voice search stages and their user-facing text.

use crate::audio::capture::CaptureProgress;
use crate::audio::meter::format_level_bar;
use std::fmt;

/// Current phase of a voice search run.
///
/// A run walks Idle → Listening → Processing → Transcribing → Searching → Idle
/// without skipping; any stage may drop straight back to Idle on failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelineStage {
    #[default]
    Idle,
    Listening,
    Processing,
    Transcribing,
    Searching,
}

impl PipelineStage {
    /// The stage a successful step leads to.
    pub fn next(self) -> Self {
        match self {
            PipelineStage::Idle => PipelineStage::Listening,
            PipelineStage::Listening => PipelineStage::Processing,
            PipelineStage::Processing => PipelineStage::Transcribing,
            PipelineStage::Transcribing => PipelineStage::Searching,
            PipelineStage::Searching => PipelineStage::Idle,
        }
    }

    /// Whether moving from `self` to `to` is a legal transition.
    pub fn can_advance_to(self, to: Self) -> bool {
        to == PipelineStage::Idle || to == self.next()
    }

    pub fn is_active(self) -> bool {
        self != PipelineStage::Idle
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PipelineStage::Idle => "idle",
            PipelineStage::Listening => "listening",
            PipelineStage::Processing => "processing",
            PipelineStage::Transcribing => "transcribing",
            PipelineStage::Searching => "searching",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status line for a stage. Idle has none.
pub fn render_stage(stage: PipelineStage, progress: &CaptureProgress) -> Option<String> {
    match stage {
        PipelineStage::Idle => None,
        PipelineStage::Listening => Some(format!(
            "Listening... say a breed  {}  {}s left",
            format_level_bar(progress.level),
            progress.remaining_secs
        )),
        PipelineStage::Processing => Some("Processing recording...".to_string()),
        PipelineStage::Transcribing => Some("Transcribing...".to_string()),
        PipelineStage::Searching => Some("Searching for dogs...".to_string()),
    }
}
