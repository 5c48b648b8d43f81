//! HTTP client for the cloud speech and chat endpoints.
//!
//! Covers the three calls dogsh makes:
//! - `POST /audio/speech`: narration, returns raw audio bytes
//! - `POST /audio/transcriptions`: multipart upload, returns `{text}`
//! - `POST /chat/completions`: breed normalization, returns `choices[0].message.content`
//!
//! A client is built from the current config for every operation so that a
//! changed API key is picked up immediately.

use crate::config::Config;
use crate::error::{DogshError, Result};
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Narration request body.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SpeechRequest<'a> {
    pub model: &'a str,
    pub voice: &'a str,
    pub input: &'a str,
    pub speed: f32,
}

/// Transcription request fields (sent as multipart form data).
#[derive(Debug, Clone)]
pub struct TranscriptionRequest<'a> {
    pub audio: Vec<u8>,
    pub file_name: &'a str,
    pub model: &'a str,
    pub prompt: &'a str,
    pub language: &'a str,
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenAiClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Build a client from config. Fails with `MissingApiKey` when no key is set.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(config.api_key()?, config.openai.base_url.clone()))
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    /// Synthesize speech. Returns the encoded audio bytes.
    pub async fn synthesize(&self, request: &SpeechRequest<'_>) -> Result<Vec<u8>> {
        let synthesis_error = |message: String| DogshError::Synthesis { message };

        let response = self
            .client
            .post(self.url("audio/speech"))
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| synthesis_error(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(synthesis_error(format!(
                "service returned {status}: {}",
                extract_error_message(&body)
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| synthesis_error(format!("failed to read audio: {e}")))?;
        if bytes.is_empty() {
            return Err(synthesis_error("service returned no audio".to_string()));
        }
        Ok(bytes.to_vec())
    }

    /// Transcribe an audio file.
    pub async fn transcribe(&self, request: TranscriptionRequest<'_>) -> Result<String> {
        let transcription_error = |message: String| DogshError::Transcription { message };

        let file = Part::bytes(request.audio)
            .file_name(request.file_name.to_string())
            .mime_str("audio/wav")
            .map_err(|e| transcription_error(format!("invalid upload: {e}")))?;
        let form = Form::new()
            .part("file", file)
            .text("model", request.model.to_string())
            .text("prompt", request.prompt.to_string())
            .text("language", request.language.to_string());

        let response = self
            .client
            .post(self.url("audio/transcriptions"))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| transcription_error(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(transcription_error(format!(
                "service returned {status}: {}",
                extract_error_message(&body)
            )));
        }

        let parsed: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| transcription_error(format!("unexpected response: {e}")))?;
        Ok(parsed.text)
    }

    /// Run a deterministic (temperature 0) chat completion and return the reply text.
    pub async fn complete(&self, model: &str, system: &str, user: &str) -> Result<String> {
        let formatting_error = |message: String| DogshError::Formatting { message };

        let body = json!({
            "model": model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user},
            ],
            "temperature": 0,
        });

        let response = self
            .client
            .post(self.url("chat/completions"))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| formatting_error(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(formatting_error(format!(
                "service returned {status}: {}",
                extract_error_message(&body)
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| formatting_error(format!("unexpected response: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| formatting_error("response contained no message".to_string()))
    }
}

/// Pull `error.message` out of an API error body, falling back to the raw body.
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}
