//! Interactive session state and actions.
//!
//! Holds what the user currently sees (image, transcript, notice) and maps
//! each menu action onto the clients. Every failure ends up as a notice;
//! nothing here is fatal to the session.

use crate::audio::capture::{CaptureProgress, SoxRecorder};
use crate::breed::BreedQuery;
use crate::config::{ConfigSource, Voice};
use crate::error::DogshError;
use crate::image::{DogApiClient, DogImage, ImageSource};
use crate::phrase::narration_text;
use crate::pipeline::orchestrator::{SearchOutcome, VoiceSearch, spawn_narration};
use crate::pipeline::stage::{PipelineStage, render_stage};
use crate::speech::narrator::{Narrator, Speaker};
use crate::speech::transcribe::BreedTranscriber;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// A message shown below the image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Warning(String),
    Error(String),
}

/// What the presentation layer renders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub image: Option<DogImage>,
    /// What the user said during the last voice search.
    pub transcript: Option<String>,
    pub notice: Option<Notice>,
}

impl SessionState {
    fn clear(&mut self) {
        *self = Self::default();
    }
}

pub struct Session {
    config: Arc<dyn ConfigSource>,
    images: Arc<dyn ImageSource>,
    speaker: Arc<dyn Speaker>,
    search: VoiceSearch,
    state: SessionState,
    narration: Option<JoinHandle<()>>,
}

impl Session {
    pub fn new(
        config: Arc<dyn ConfigSource>,
        images: Arc<dyn ImageSource>,
        speaker: Arc<dyn Speaker>,
        search: VoiceSearch,
    ) -> Self {
        Self {
            config,
            images,
            speaker,
            search,
            state: SessionState::default(),
            narration: None,
        }
    }

    /// Session wired to the real services.
    pub fn cloud(config: Arc<dyn ConfigSource>, max_recording: Option<Duration>) -> Self {
        let images: Arc<dyn ImageSource> = Arc::new(DogApiClient::new(config.clone()));
        let speaker: Arc<dyn Speaker> = Arc::new(Narrator::cloud(config.clone()));
        let mut recorder = SoxRecorder::new(config.clone());
        if let Some(max) = max_recording {
            recorder = recorder.with_max_duration(max);
        }
        let search = VoiceSearch::new(
            config.clone(),
            Arc::new(recorder),
            Arc::new(BreedTranscriber::new(config.clone())),
            images.clone(),
            speaker.clone(),
        );
        Self::new(config, images, speaker, search)
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn subscribe_stage(&self) -> watch::Receiver<PipelineStage> {
        self.search.subscribe()
    }

    pub fn subscribe_progress(&self) -> watch::Receiver<CaptureProgress> {
        self.search.subscribe_progress()
    }

    /// Fetch a new random image, optionally restricted to a typed breed.
    pub async fn new_random_image(&mut self, breed_text: Option<&str>) {
        self.state.clear();

        let query = match breed_text.map(BreedQuery::from_text).transpose() {
            Ok(query) => query,
            Err(_) => {
                self.state.notice = Some(Notice::Warning(
                    "Type a breed name, e.g. \"husky\" or \"golden retriever\"".to_string(),
                ));
                return;
            }
        };

        match self.images.fetch(query.as_ref().map(|q| &q.path)).await {
            Ok(image) => self.show(image),
            Err(e @ DogshError::BreedNotFound { .. }) => {
                self.state.notice = Some(Notice::Warning(e.to_string()));
            }
            Err(e) => {
                tracing::warn!("image fetch failed: {e}");
                self.state.notice = Some(Notice::Error(e.to_string()));
            }
        }
    }

    /// Record a spoken breed and search for it.
    pub async fn start_voice_search(&mut self) {
        if self.search.stage().is_active() {
            self.state.notice = Some(Notice::Info(DogshError::SearchInProgress.to_string()));
            return;
        }
        self.state.clear();

        match self.search.run().await {
            SearchOutcome::Found {
                query,
                image,
                narration,
            } => {
                self.state.transcript = Some(query.raw);
                self.state.image = Some(image);
                self.narration = narration;
            }
            SearchOutcome::BreedNotFound { query } => {
                self.state.notice = Some(Notice::Warning(format!(
                    "Could not find a breed called \"{}\"",
                    query.raw
                )));
                self.state.transcript = Some(query.raw);
            }
            SearchOutcome::Failed { message, .. } => {
                self.state.notice = Some(Notice::Error(message));
            }
            SearchOutcome::Busy => {
                self.state.notice = Some(Notice::Info(DogshError::SearchInProgress.to_string()));
            }
        }
    }

    /// Narrate the breed of the current image.
    pub async fn speak_current_breed(&mut self) {
        let Some(image) = &self.state.image else {
            self.state.notice = Some(Notice::Info("No dog to talk about yet".to_string()));
            return;
        };
        let text = narration_text(&image.breed);
        if let Err(e) = self.speaker.speak(&text).await {
            tracing::warn!("narration failed: {e}");
            self.state.notice = Some(Notice::Warning(e.to_string()));
        }
    }

    /// Speak a short sample with `voice`, or the configured voice.
    pub async fn test_selected_voice(&mut self, voice: Option<Voice>) {
        let voice = match voice {
            Some(v) => v,
            None => match self.config.current() {
                Ok(config) => config.narration.voice,
                Err(e) => {
                    self.state.notice = Some(Notice::Error(e.to_string()));
                    return;
                }
            },
        };
        let text = format!("Woof! This is the {voice} voice.");
        if let Err(e) = self.speaker.speak_as(&text, Some(voice)).await {
            tracing::warn!("voice test failed: {e}");
            self.state.notice = Some(Notice::Warning(e.to_string()));
        }
    }

    /// Wait for background narration started by the last action.
    pub async fn wait_for_narration(&mut self) {
        if let Some(handle) = self.narration.take()
            && let Err(e) = handle.await
        {
            tracing::warn!("narration task ended abnormally: {e}");
        }
    }

    /// Render the current view.
    pub fn render(&self) -> String {
        render_view(&self.state, self.search.stage(), &self.search.progress())
    }

    fn show(&mut self, image: DogImage) {
        let enabled = self
            .config
            .current()
            .map(|c| c.narration.enabled)
            .unwrap_or(false);
        if enabled {
            self.narration = Some(spawn_narration(
                self.speaker.clone(),
                narration_text(&image.breed),
            ));
        }
        self.state.image = Some(image);
    }
}

/// Render session state as plain text, one item per line.
pub fn render_view(
    state: &SessionState,
    stage: PipelineStage,
    progress: &CaptureProgress,
) -> String {
    let mut lines = Vec::new();

    if let Some(image) = &state.image {
        lines.push(format!("Breed: {}", image.breed));
        lines.push(format!("Image: {}", image.url));
    }
    if let Some(transcript) = &state.transcript {
        lines.push(format!("Heard: \"{transcript}\""));
    }
    if let Some(status) = render_stage(stage, progress) {
        lines.push(status);
    }
    match &state.notice {
        Some(Notice::Info(msg)) => lines.push(msg.clone()),
        Some(Notice::Warning(msg)) => lines.push(format!("Warning: {msg}")),
        Some(Notice::Error(msg)) => lines.push(format!("Error: {msg}")),
        None => {}
    }
    if lines.is_empty() {
        lines.push("No dog yet. Fetch one!".to_string());
    }

    lines.join("\n")
}
