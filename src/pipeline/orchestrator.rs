//! Voice search orchestrator.
//!
//! Sequences capture → transcription → image search → narration and
//! publishes the current [`PipelineStage`] for the UI. Only one run may be
//! active; a second call while one is in flight is rejected with
//! [`SearchOutcome::Busy`].

use crate::audio::capture::{CaptureProgress, Recorder};
use crate::breed::BreedQuery;
use crate::config::ConfigSource;
use crate::error::DogshError;
use crate::image::{DogImage, ImageSource};
use crate::phrase::narration_text;
use crate::pipeline::stage::PipelineStage;
use crate::speech::narrator::Speaker;
use crate::speech::transcribe::SpeechToBreed;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// How a voice search run ended.
#[derive(Debug)]
pub enum SearchOutcome {
    /// A matching image was found. Narration, if enabled, is still playing
    /// in the background.
    Found {
        query: BreedQuery,
        image: DogImage,
        narration: Option<JoinHandle<()>>,
    },
    /// The breed search endpoint did not know the breed.
    BreedNotFound { query: BreedQuery },
    /// A step failed; `stage` is where it happened.
    Failed {
        stage: PipelineStage,
        message: String,
    },
    /// Another run was already active; nothing was done.
    Busy,
}

/// Resets the active flag and stage even if the run is dropped mid-flight.
struct ActiveRun<'a> {
    search: &'a VoiceSearch,
}

impl Drop for ActiveRun<'_> {
    fn drop(&mut self) {
        self.search.stage.send_replace(PipelineStage::Idle);
        self.search.active.store(false, Ordering::Release);
    }
}

pub struct VoiceSearch {
    config: Arc<dyn ConfigSource>,
    recorder: Arc<dyn Recorder>,
    transcriber: Arc<dyn SpeechToBreed>,
    images: Arc<dyn ImageSource>,
    speaker: Arc<dyn Speaker>,
    stage: watch::Sender<PipelineStage>,
    progress: watch::Sender<CaptureProgress>,
    active: AtomicBool,
}

impl VoiceSearch {
    pub fn new(
        config: Arc<dyn ConfigSource>,
        recorder: Arc<dyn Recorder>,
        transcriber: Arc<dyn SpeechToBreed>,
        images: Arc<dyn ImageSource>,
        speaker: Arc<dyn Speaker>,
    ) -> Self {
        let (stage, _) = watch::channel(PipelineStage::Idle);
        let (progress, _) = watch::channel(CaptureProgress::default());
        Self {
            config,
            recorder,
            transcriber,
            images,
            speaker,
            stage,
            progress,
            active: AtomicBool::new(false),
        }
    }

    /// Observe stage changes.
    pub fn subscribe(&self) -> watch::Receiver<PipelineStage> {
        self.stage.subscribe()
    }

    /// Observe recording countdown and level while listening.
    pub fn subscribe_progress(&self) -> watch::Receiver<CaptureProgress> {
        self.progress.subscribe()
    }

    pub fn stage(&self) -> PipelineStage {
        *self.stage.borrow()
    }

    pub fn progress(&self) -> CaptureProgress {
        *self.progress.borrow()
    }

    /// Run one voice search from recording to result.
    pub async fn run(&self) -> SearchOutcome {
        if self
            .active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::info!("voice search already running, ignoring request");
            return SearchOutcome::Busy;
        }
        let _active = ActiveRun { search: self };

        let outcome = self.run_stages().await;
        self.advance(PipelineStage::Idle);
        outcome
    }

    async fn run_stages(&self) -> SearchOutcome {
        self.advance(PipelineStage::Listening);
        let recording = match self.recorder.record(&self.progress).await {
            Ok(recording) => recording,
            Err(e) => return self.fail(PipelineStage::Listening, e),
        };

        self.advance(PipelineStage::Processing);
        self.progress.send_replace(CaptureProgress::default());

        self.advance(PipelineStage::Transcribing);
        let query = match self.transcriber.transcribe(recording).await {
            Ok(query) => query,
            Err(e) => return self.fail(PipelineStage::Transcribing, e),
        };
        tracing::info!(heard = %query.raw, path = %query.path, "searching for breed");

        self.advance(PipelineStage::Searching);
        match self.images.fetch(Some(&query.path)).await {
            Ok(image) => {
                let narration = self.start_narration(&image);
                SearchOutcome::Found {
                    query,
                    image,
                    narration,
                }
            }
            Err(DogshError::BreedNotFound { path }) => {
                tracing::info!(%path, "breed not found");
                SearchOutcome::BreedNotFound { query }
            }
            Err(e) => self.fail(PipelineStage::Searching, e),
        }
    }

    fn advance(&self, to: PipelineStage) {
        let from = self.stage();
        debug_assert!(from.can_advance_to(to), "illegal stage change {from} -> {to}");
        tracing::debug!(%from, %to, "voice search stage");
        self.stage.send_replace(to);
    }

    fn fail(&self, stage: PipelineStage, error: DogshError) -> SearchOutcome {
        tracing::warn!(%stage, "voice search failed: {error}");
        SearchOutcome::Failed {
            stage,
            message: error.to_string(),
        }
    }

    /// Narrate the breed in the background if narration is enabled.
    fn start_narration(&self, image: &DogImage) -> Option<JoinHandle<()>> {
        let enabled = match self.config.current() {
            Ok(config) => config.narration.enabled,
            Err(e) => {
                tracing::warn!("skipping narration, config unreadable: {e}");
                false
            }
        };
        if !enabled {
            return None;
        }
        Some(spawn_narration(
            self.speaker.clone(),
            narration_text(&image.breed),
        ))
    }
}

/// Speak `text` on a background task; failures are logged, never returned.
pub fn spawn_narration(speaker: Arc<dyn Speaker>, text: String) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = speaker.speak(&text).await {
            tracing::warn!("narration failed: {e}");
        }
    })
}
