//! Dog image API client.
//!
//! Talks to the public dog image API:
//! - `GET {base}/breeds/image/random`
//! - `GET {base}/breed/{main}[/{sub}]/images/random`
//!
//! Both return `{"message": "<image url>", "status": "success"}`.

use crate::breed::{BreedPath, url_to_breed_label};
use crate::config::ConfigSource;
use crate::error::{DogshError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

/// A fetched dog picture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DogImage {
    pub url: String,
    /// Human-readable breed derived from the URL.
    pub breed: String,
}

impl DogImage {
    pub fn from_url(url: impl Into<String>) -> Self {
        let url = url.into();
        let breed = url_to_breed_label(&url);
        Self { url, breed }
    }
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    message: String,
    #[serde(default)]
    status: String,
}

/// Trait for dog image sources.
///
/// This trait allows swapping implementations (real API vs mock).
#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Fetch a random image, optionally restricted to a breed.
    ///
    /// # Errors
    /// `BreedNotFound` when the breed-scoped endpoint rejects the path,
    /// `Fetch` for network or protocol failures.
    async fn fetch(&self, breed: Option<&BreedPath>) -> Result<DogImage>;
}

/// HTTP client for the dog image API.
pub struct DogApiClient {
    config: Arc<dyn ConfigSource>,
    client: reqwest::Client,
}

impl DogApiClient {
    pub fn new(config: Arc<dyn ConfigSource>) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(base_url: &str, breed: Option<&BreedPath>) -> String {
        let base = base_url.trim_end_matches('/');
        match breed {
            Some(path) => match path.sub() {
                Some(sub) => format!("{base}/breed/{}/{sub}/images/random", path.main()),
                None => format!("{base}/breed/{}/images/random", path.main()),
            },
            None => format!("{base}/breeds/image/random"),
        }
    }
}

#[async_trait]
impl ImageSource for DogApiClient {
    async fn fetch(&self, breed: Option<&BreedPath>) -> Result<DogImage> {
        let config = self.config.current()?;
        let url = Self::endpoint(&config.image.base_url, breed);
        tracing::debug!(%url, "fetching dog image");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DogshError::Fetch {
                message: format!("request to {url} failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(match breed {
                Some(path) => DogshError::BreedNotFound {
                    path: path.to_string(),
                },
                None => DogshError::Fetch {
                    message: format!("dog API returned status {status}"),
                },
            });
        }

        let body: ImageResponse = response.json().await.map_err(|e| DogshError::Fetch {
            message: format!("unexpected response body: {e}"),
        })?;

        if body.status != "success" || body.message.is_empty() {
            return Err(DogshError::Fetch {
                message: format!("dog API reported status '{}'", body.status),
            });
        }

        Ok(DogImage::from_url(body.message))
    }
}
