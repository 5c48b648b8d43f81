//! dogsh - Random dog pictures with narrated breeds
//!
//! Fetches dog images, speaks the breed aloud, and finds a breed from a
//! spoken name (record → transcribe → normalize → search).

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
pub mod breed;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod defaults;
#[cfg(feature = "cli")]
pub mod diagnostics;
pub mod error;
pub mod image;
#[cfg(feature = "cli")]
pub mod output;
pub mod phrase;
pub mod pipeline;
pub mod session;
pub mod speech;

// Composition root
#[cfg(feature = "cli")]
pub mod app;

// Client traits (real vs mock)
pub use audio::capture::Recorder;
pub use image::ImageSource;
pub use speech::narrator::{Speaker, SpeechSynthesizer};
pub use speech::player::AudioPlayer;
pub use speech::transcribe::SpeechToBreed;

// Voice search
pub use pipeline::{PipelineStage, SearchOutcome, VoiceSearch};
pub use session::{Session, SessionState};

// Error handling
pub use error::{DogshError, Result};

// Config
pub use config::{Config, ConfigSource, FileConfigSource, StaticConfigSource, Voice};

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
