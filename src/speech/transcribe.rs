//! Speech input client: recording → transcript → breed path.
//!
//! Two cloud calls: a transcription steered towards dog breed vocabulary,
//! then a deterministic chat completion that rewrites the transcript into
//! the image API's path format. The recording is consumed and deleted
//! whatever the outcome.

use crate::audio::capture::Recording;
use crate::breed::{BreedPath, BreedQuery, text_to_search_path};
use crate::config::ConfigSource;
use crate::defaults;
use crate::error::{DogshError, Result};
use crate::speech::openai::{OpenAiClient, TranscriptionRequest};
use async_trait::async_trait;
use std::sync::Arc;

/// Prompt steering the transcription towards breed names.
pub const TRANSCRIPTION_PROMPT: &str = "The speaker says the name of a dog breed, \
for example husky, pug, beagle, golden retriever, german shepherd or french bulldog. \
Transcribe only the breed name.";

/// System instruction for normalizing a transcript into a breed path.
pub const FORMATTING_INSTRUCTION: &str = "You convert a spoken dog breed into a search path \
for a dog image API. Reply with the breed only, in lowercase, without punctuation or quotes. \
Return a single-word breed as it is, for example: husky. \
Return a two-word breed as the main breed, a slash, then the sub-breed, \
for example: golden retriever becomes retriever/golden and french bulldog becomes bulldog/french.";

/// Trait for turning a recording into a breed query.
///
/// This trait allows swapping implementations (cloud service vs mock).
#[async_trait]
pub trait SpeechToBreed: Send + Sync {
    /// Transcribe and normalize. The recording is deleted before returning.
    async fn transcribe(&self, recording: Recording) -> Result<BreedQuery>;
}

/// Cloud-backed speech input client.
pub struct BreedTranscriber {
    config: Arc<dyn ConfigSource>,
}

impl BreedTranscriber {
    pub fn new(config: Arc<dyn ConfigSource>) -> Self {
        Self { config }
    }

    async fn transcribe_file(&self, recording: &Recording) -> Result<BreedQuery> {
        let config = self.config.current()?;
        let client = OpenAiClient::from_config(&config)?;

        let audio = tokio::fs::read(recording.path())
            .await
            .map_err(|e| DogshError::Transcription {
                message: format!("failed to read recording: {e}"),
            })?;
        let file_name = recording
            .path()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "recording.wav".to_string());

        let transcript = client
            .transcribe(TranscriptionRequest {
                audio,
                file_name: &file_name,
                model: &config.openai.transcription_model,
                prompt: TRANSCRIPTION_PROMPT,
                language: defaults::TRANSCRIPTION_LANGUAGE,
            })
            .await?;
        let transcript = transcript.trim().to_string();
        if transcript.is_empty() {
            return Err(DogshError::Transcription {
                message: "no speech recognized".to_string(),
            });
        }
        tracing::debug!(%transcript, "transcribed recording");

        let formatted = client
            .complete(
                &config.openai.classification_model,
                FORMATTING_INSTRUCTION,
                &transcript,
            )
            .await?;
        tracing::debug!(%formatted, "formatted breed path");

        to_query(transcript, &formatted)
    }
}

/// Pair the transcript with the formatted path, rejecting unusable replies.
fn to_query(transcript: String, formatted: &str) -> Result<BreedQuery> {
    let path = text_to_search_path(formatted);
    if path.is_empty() {
        return Err(DogshError::Formatting {
            message: format!("no breed in reply '{}'", formatted.trim()),
        });
    }
    Ok(BreedQuery {
        raw: transcript,
        path: BreedPath::parse(&path)?,
    })
}

#[async_trait]
impl SpeechToBreed for BreedTranscriber {
    async fn transcribe(&self, recording: Recording) -> Result<BreedQuery> {
        let result = self.transcribe_file(&recording).await;
        recording.discard();
        result
    }
}
