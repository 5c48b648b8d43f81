//! Filler phrases spoken before the breed name.

use rand::seq::SliceRandom;

/// Phrases prefixed to the breed label when narrating.
pub const PHRASES: [&str; 5] = [
    "Here's a",
    "Look at this",
    "Check out this",
    "Say hello to this",
    "What a lovely",
];

/// Pick one of [`PHRASES`] uniformly at random.
pub fn pick_phrase() -> &'static str {
    PHRASES
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(PHRASES[0])
}

/// Sentence narrated for a breed label, e.g. "Look at this afghan hound".
pub fn narration_text(label: &str) -> String {
    format!("{} {}", pick_phrase(), label)
}
