//! Error types for dogsh.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DogshError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("No API key configured. Set openai.api_key or OPENAI_API_KEY")]
    MissingApiKey,

    // Image fetch errors
    #[error("Failed to fetch dog image: {message}")]
    Fetch { message: String },

    #[error("Could not find breed '{path}'")]
    BreedNotFound { path: String },

    // Narration errors
    #[error("Speech synthesis failed: {message}")]
    Synthesis { message: String },

    #[error("Audio playback failed: {message}")]
    Playback { message: String },

    // Capture errors
    #[error("Recording tool not found at {path}")]
    ToolNotFound { path: String },

    #[error("Recording failed: {message}")]
    Recording { message: String },

    // Speech input errors
    #[error("Transcription failed: {message}")]
    Transcription { message: String },

    #[error("Could not format breed from transcript: {message}")]
    Formatting { message: String },

    #[error("A voice search is already running")]
    SearchInProgress,

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, DogshError>;
