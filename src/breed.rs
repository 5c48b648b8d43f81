//! Breed name handling.
//!
//! Converts between the three spellings a breed goes through:
//! - image URL segment: `hound-afghan`
//! - human label: `afghan hound`
//! - API search path: `hound/afghan` (main breed first, sub-breed second)

use crate::defaults;
use crate::error::{DogshError, Result};
use std::fmt;

/// Derive a readable breed label from an image URL.
///
/// Never fails: anything without a usable breed segment becomes `"dog"`.
pub fn url_to_breed_label(url: &str) -> String {
    let Some((_, rest)) = url.split_once(defaults::BREED_URL_MARKER) else {
        return defaults::FALLBACK_BREED_LABEL.to_string();
    };

    let segment = rest.split('/').next().unwrap_or_default();
    let tokens: Vec<&str> = segment.split('-').filter(|t| !t.is_empty()).collect();
    if tokens.is_empty() {
        return defaults::FALLBACK_BREED_LABEL.to_string();
    }

    tokens.into_iter().rev().collect::<Vec<_>>().join(" ")
}

/// Normalize free text ("Golden Retriever!") into an API search path
/// ("retriever/golden").
///
/// Two words are read as `sub main` and flipped into `main/sub`. Any other
/// word count falls back to the first word. Text that already contains a
/// `/` is treated as a path and only cleaned up, so normalized input maps
/// to itself.
pub fn text_to_search_path(text: &str) -> String {
    let cleaned = strip_punctuation(&text.to_lowercase());

    if cleaned.contains('/') {
        return cleaned
            .split('/')
            .map(|segment| segment.split_whitespace().collect::<String>())
            .filter(|segment| !segment.is_empty())
            .take(2)
            .collect::<Vec<_>>()
            .join("/");
    }

    let tokens: Vec<&str> = cleaned.split_whitespace().collect();
    match tokens.as_slice() {
        [sub, main] => format!("{main}/{sub}"),
        [first, ..] => (*first).to_string(),
        [] => String::new(),
    }
}

/// Keep letters, digits, whitespace and the path separator.
fn strip_punctuation(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '/')
        .collect()
}

/// A validated breed search path: `main` or `main/sub`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreedPath(String);

impl BreedPath {
    /// Parse an already-normalized path.
    pub fn parse(path: &str) -> Result<Self> {
        let normalized = text_to_search_path(path);
        if normalized.is_empty() {
            return Err(DogshError::Other(format!("not a breed name: '{path}'")));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Main breed (first segment).
    pub fn main(&self) -> &str {
        self.0.split('/').next().unwrap_or(&self.0)
    }

    /// Sub-breed, if the path has two segments.
    pub fn sub(&self) -> Option<&str> {
        self.0.split_once('/').map(|(_, sub)| sub)
    }
}

impl fmt::Display for BreedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A breed search request: what was heard or typed, plus the derived path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreedQuery {
    pub raw: String,
    pub path: BreedPath,
}

impl BreedQuery {
    /// Build a query from user text. Fails when nothing usable remains
    /// after normalization.
    pub fn from_text(raw: &str) -> Result<Self> {
        Ok(Self {
            raw: raw.trim().to_string(),
            path: BreedPath::parse(raw)?,
        })
    }
}
