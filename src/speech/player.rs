//! Local audio playback through an external player command.

use crate::config::{ConfigSource, NarrationConfig};
use crate::error::{DogshError, Result};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tokio::process::Command;

/// Trait for playing an audio file to completion.
///
/// This trait allows swapping implementations (real player vs mock).
#[async_trait]
pub trait AudioPlayer: Send + Sync {
    /// Play the file and return once playback has finished.
    async fn play(&self, path: &Path) -> Result<()>;
}

/// Plays files with a command such as `afplay` or `ffplay`.
#[derive(Debug, Clone)]
pub struct CommandPlayer {
    program: String,
    args: Vec<String>,
}

impl CommandPlayer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn from_config(config: &NarrationConfig) -> Self {
        Self::new(config.player.clone(), config.player_args.clone())
    }
}

#[async_trait]
impl AudioPlayer for CommandPlayer {
    async fn play(&self, path: &Path) -> Result<()> {
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .status()
            .await
            .map_err(|e| DogshError::Playback {
                message: if e.kind() == std::io::ErrorKind::NotFound {
                    format!("audio player '{}' not found", self.program)
                } else {
                    format!("failed to run '{}': {e}", self.program)
                },
            })?;

        if !status.success() {
            return Err(DogshError::Playback {
                message: format!("'{}' exited with {status}", self.program),
            });
        }
        Ok(())
    }
}

/// Player that looks up the configured command on every call.
pub struct ConfiguredPlayer {
    config: Arc<dyn ConfigSource>,
}

impl ConfiguredPlayer {
    pub fn new(config: Arc<dyn ConfigSource>) -> Self {
        Self { config }
    }
}

#[async_trait]
impl AudioPlayer for ConfiguredPlayer {
    async fn play(&self, path: &Path) -> Result<()> {
        let config = self.config.current()?;
        CommandPlayer::from_config(&config.narration).play(path).await
    }
}
