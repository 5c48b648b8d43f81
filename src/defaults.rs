//! Default configuration constants for dogsh.
//!
//! Shared by the config layer and the clients so a missing config file
//! behaves exactly like a freshly dumped template.

/// Base URL of the public dog image API.
pub const DOG_API_BASE_URL: &str = "https://dog.ceo/api";

/// Base URL of the speech / chat API.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Marker preceding the breed segment in image URLs
/// (`https://images.dog.ceo/breeds/hound-afghan/n02088094_1003.jpg`).
pub const BREED_URL_MARKER: &str = "/breeds/";

/// Label used when no breed can be derived from an image URL.
pub const FALLBACK_BREED_LABEL: &str = "dog";

/// Default narration voice preset.
pub const DEFAULT_VOICE: &str = "alloy";

/// Default narration model tier.
pub const DEFAULT_TTS_MODEL: &str = "tts-1";

/// Default narration speed, stored as text like any user preference.
pub const DEFAULT_SPEED: &str = "1.0";

/// Speed used when the configured value is not a number.
pub const FALLBACK_SPEED: f32 = 1.0;

/// Slowest speed accepted by the narration service.
pub const MIN_SPEED: f32 = 0.25;

/// Fastest speed accepted by the narration service.
pub const MAX_SPEED: f32 = 4.0;

/// Transcription model.
pub const TRANSCRIPTION_MODEL: &str = "whisper-1";

/// Model used to normalize a transcript into a breed path.
pub const CLASSIFICATION_MODEL: &str = "gpt-4o-mini";

/// Transcription language.
pub const TRANSCRIPTION_LANGUAGE: &str = "en";

/// Default location of the recording tool.
pub const RECORDING_TOOL: &str = "/usr/bin/sox";

/// Hard ceiling on a single voice recording, in seconds.
pub const MAX_RECORDING_SECS: u64 = 7;

/// How long the recorder gets to finalize its file after SIGTERM before it is killed.
pub const RECORDER_STOP_GRACE_MS: u64 = 500;

/// Amplitude threshold for the silence gate (start and stop).
pub const SILENCE_THRESHOLD: &str = "3%";

/// Sound must stay above the threshold this long to start recording.
pub const SILENCE_START_SECS: &str = "0.1";

/// Recording stops after this much continuous silence.
pub const SILENCE_STOP_SECS: &str = "2.0";

/// Number of steps in the recording level bar.
pub const LEVEL_STEPS: u8 = 10;

/// Default audio player command and its arguments (the file path is appended).
#[cfg(target_os = "macos")]
pub const AUDIO_PLAYER: (&str, &[&str]) = ("afplay", &[]);

/// Default audio player command and its arguments (the file path is appended).
#[cfg(not(target_os = "macos"))]
pub const AUDIO_PLAYER: (&str, &[&str]) = ("ffplay", &["-nodisp", "-autoexit", "-loglevel", "quiet"]);
