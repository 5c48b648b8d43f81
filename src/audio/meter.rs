//! Level meter parsing for the recorder's progress output.
//!
//! With `-S`, sox rewrites a status line on stderr several times per second:
//!
//! ```text
//! In:0.00% 00:00:01.54 [00:00:00.00] Out:24.6k [ -====|====- ] Hd:1.2 Clip:0
//! ```
//!
//! The bracket containing `|` is a stereo meter: the left half fills from the
//! right, the right half from the left. `=` is a full step, `-` a half step
//! and `!` marks clipping.

use crate::defaults::LEVEL_STEPS;

/// Parse a status line into a level between 0 and [`LEVEL_STEPS`].
///
/// Returns `None` when the line carries no meter.
pub fn parse_level(line: &str) -> Option<u8> {
    let meter = line
        .split('[')
        .skip(1)
        .filter_map(|chunk| chunk.split_once(']').map(|(inner, _)| inner))
        .find(|inner| inner.contains('|'))?;

    let (left, right) = meter.split_once('|')?;
    let level = half_level(left).max(half_level(right));
    Some(level)
}

fn half_level(half: &str) -> u8 {
    let width = half.chars().count();
    if width == 0 {
        return 0;
    }
    let filled: f32 = half
        .chars()
        .map(|c| match c {
            '=' | '!' => 1.0,
            '-' => 0.5,
            _ => 0.0,
        })
        .sum();
    let steps = (filled / width as f32 * f32::from(LEVEL_STEPS)).round();
    (steps as u8).min(LEVEL_STEPS)
}

/// Tracks the latest level, keeping the previous value on unparsable lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LevelMeter {
    level: u8,
}

impl LevelMeter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one status line and return the current level.
    pub fn update(&mut self, line: &str) -> u8 {
        if let Some(level) = parse_level(line) {
            self.level = level;
        }
        self.level
    }
}

/// Render a level as a fixed-width bar.
pub fn format_level_bar(level: u8) -> String {
    let filled = usize::from(level.min(LEVEL_STEPS));
    let empty = usize::from(LEVEL_STEPS) - filled;
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}
