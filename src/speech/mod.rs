//! Cloud speech: narration out, breed transcription in.

pub mod narrator;
pub mod openai;
pub mod player;
pub mod transcribe;

use crate::defaults;

/// Parse a user-entered narration speed.
///
/// Non-numeric input falls back to 1.0; the result is clamped to the range
/// the speech service accepts.
pub fn parse_speed(input: &str) -> f32 {
    let speed = input
        .trim()
        .parse::<f32>()
        .ok()
        .filter(|s| s.is_finite())
        .unwrap_or(defaults::FALLBACK_SPEED);
    speed.clamp(defaults::MIN_SPEED, defaults::MAX_SPEED)
}
