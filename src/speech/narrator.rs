//! Breed narration: synthesize → temp file → play → delete.

use crate::config::{ConfigSource, Voice};
use crate::error::{DogshError, Result};
use crate::speech::openai::{OpenAiClient, SpeechRequest};
use crate::speech::parse_speed;
use crate::speech::player::{AudioPlayer, ConfiguredPlayer};
use async_trait::async_trait;
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

/// Trait for text-to-speech backends.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Return encoded audio for the request.
    async fn synthesize(&self, request: &SpeechRequest<'_>) -> Result<Vec<u8>>;
}

/// Synthesizer backed by the cloud speech endpoint.
pub struct CloudSynthesizer {
    config: Arc<dyn ConfigSource>,
}

impl CloudSynthesizer {
    pub fn new(config: Arc<dyn ConfigSource>) -> Self {
        Self { config }
    }
}

#[async_trait]
impl SpeechSynthesizer for CloudSynthesizer {
    async fn synthesize(&self, request: &SpeechRequest<'_>) -> Result<Vec<u8>> {
        let config = self.config.current()?;
        OpenAiClient::from_config(&config)?
            .synthesize(request)
            .await
    }
}

/// Anything that can say a sentence out loud.
#[async_trait]
pub trait Speaker: Send + Sync {
    /// Speak with an explicit voice, or the configured one when `None`.
    async fn speak_as(&self, text: &str, voice: Option<Voice>) -> Result<()>;

    /// Speak with the configured voice.
    async fn speak(&self, text: &str) -> Result<()> {
        self.speak_as(text, None).await
    }
}

/// Speech output client.
///
/// Each call reads the current voice, model and speed, writes the audio to
/// its own temp file and removes that file before returning, whether or not
/// playback succeeded.
pub struct Narrator {
    config: Arc<dyn ConfigSource>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    player: Arc<dyn AudioPlayer>,
}

impl Narrator {
    pub fn new(
        config: Arc<dyn ConfigSource>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        player: Arc<dyn AudioPlayer>,
    ) -> Self {
        Self {
            config,
            synthesizer,
            player,
        }
    }

    /// Narrator using the cloud synthesizer and the configured player.
    pub fn cloud(config: Arc<dyn ConfigSource>) -> Self {
        Self::new(
            config.clone(),
            Arc::new(CloudSynthesizer::new(config.clone())),
            Arc::new(ConfiguredPlayer::new(config)),
        )
    }
}

/// Create the narration file, unique per call (timestamp plus random suffix).
fn narration_file(audio: &[u8]) -> Result<NamedTempFile> {
    let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S%3f");
    let mut file = tempfile::Builder::new()
        .prefix(&format!("dogsh-speech-{stamp}-"))
        .suffix(".mp3")
        .tempfile()
        .map_err(|e| DogshError::Playback {
            message: format!("failed to create narration file: {e}"),
        })?;
    file.write_all(audio)
        .and_then(|()| file.flush())
        .map_err(|e| DogshError::Playback {
            message: format!("failed to write narration file: {e}"),
        })?;
    Ok(file)
}

#[async_trait]
impl Speaker for Narrator {
    async fn speak_as(&self, text: &str, voice: Option<Voice>) -> Result<()> {
        let config = self.config.current()?;
        let voice = voice.unwrap_or(config.narration.voice);
        let speed = parse_speed(&config.narration.speed);

        let request = SpeechRequest {
            model: config.narration.model.as_str(),
            voice: voice.as_str(),
            input: text,
            speed,
        };
        tracing::debug!(%voice, model = request.model, speed, "synthesizing narration");

        let audio = self.synthesizer.synthesize(&request).await?;
        let file = narration_file(&audio)?;

        let played = self.player.play(file.path()).await;

        let path = file.path().to_path_buf();
        if let Err(e) = file.close() {
            tracing::warn!(path = %path.display(), "failed to remove narration file: {e}");
        }

        played
    }
}
