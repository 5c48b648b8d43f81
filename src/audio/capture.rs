//! Voice capture through the sox command-line recorder.
//!
//! Recording is silence-gated: sox waits for sound above the threshold,
//! then stops by itself after a stretch of silence. A hard ceiling kills the
//! process if it is still running after `max_duration`; that counts as a
//! normal stop.

use crate::audio::meter::LevelMeter;
use crate::config::ConfigSource;
use crate::defaults;
use crate::error::{DogshError, Result};
use async_trait::async_trait;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempPath;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, interval_at, sleep, timeout};

/// A captured audio clip on disk.
///
/// The file belongs to this value and is deleted when it is dropped.
#[derive(Debug)]
pub struct Recording {
    path: TempPath,
}

impl Recording {
    pub fn from_temp_path(path: TempPath) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the file now, logging instead of failing.
    pub fn discard(self) {
        let path = self.path.to_path_buf();
        if let Err(e) = self.path.close() {
            tracing::warn!(path = %path.display(), "failed to remove recording: {e}");
        }
    }
}

/// Recorder lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Starting,
    Listening,
    Stopped,
    Failed,
}

/// Live feedback published while recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureProgress {
    pub state: CaptureState,
    pub remaining_secs: u64,
    /// Input level, 0..=10.
    pub level: u8,
}

impl CaptureProgress {
    pub fn starting(max_duration: Duration) -> Self {
        Self {
            state: CaptureState::Starting,
            remaining_secs: max_duration.as_secs(),
            level: 0,
        }
    }
}

impl Default for CaptureProgress {
    fn default() -> Self {
        Self::starting(Duration::from_secs(defaults::MAX_RECORDING_SECS))
    }
}

/// Trait for voice recorders.
///
/// This trait allows swapping implementations (real recorder vs mock).
#[async_trait]
pub trait Recorder: Send + Sync {
    /// Record one utterance, publishing progress while listening.
    async fn record(&self, progress: &watch::Sender<CaptureProgress>) -> Result<Recording>;
}

/// Arguments for a silence-gated recording into `output`.
pub fn sox_args(output: &Path) -> Vec<String> {
    vec![
        "-d".to_string(),
        "-S".to_string(),
        output.display().to_string(),
        "silence".to_string(),
        "1".to_string(),
        defaults::SILENCE_START_SECS.to_string(),
        defaults::SILENCE_THRESHOLD.to_string(),
        "1".to_string(),
        defaults::SILENCE_STOP_SECS.to_string(),
        defaults::SILENCE_THRESHOLD.to_string(),
    ]
}

/// Recorder that runs sox from the configured path.
pub struct SoxRecorder {
    config: Arc<dyn ConfigSource>,
    max_duration: Option<Duration>,
}

impl SoxRecorder {
    pub fn new(config: Arc<dyn ConfigSource>) -> Self {
        Self {
            config,
            max_duration: None,
        }
    }

    /// Override the configured ceiling.
    pub fn with_max_duration(mut self, max_duration: Duration) -> Self {
        self.max_duration = Some(max_duration);
        self
    }
}

#[async_trait]
impl Recorder for SoxRecorder {
    async fn record(&self, progress: &watch::Sender<CaptureProgress>) -> Result<Recording> {
        let config = self.config.current()?;
        let max_duration = self
            .max_duration
            .unwrap_or_else(|| Duration::from_secs(config.capture.max_secs));
        record_with_tool(&config.capture.tool, max_duration, progress).await
    }
}

enum Finish {
    Exited(std::io::Result<ExitStatus>),
    Ceiling,
}

/// Run the recorder binary at `tool` until it stops or `max_duration` passes.
pub async fn record_with_tool(
    tool: &Path,
    max_duration: Duration,
    progress: &watch::Sender<CaptureProgress>,
) -> Result<Recording> {
    progress.send_replace(CaptureProgress::starting(max_duration));

    let result = run_recorder(tool, max_duration, progress).await;
    let state = if result.is_ok() {
        CaptureState::Stopped
    } else {
        CaptureState::Failed
    };
    progress.send_modify(|p| p.state = state);
    result
}

async fn run_recorder(
    tool: &Path,
    max_duration: Duration,
    progress: &watch::Sender<CaptureProgress>,
) -> Result<Recording> {
    if !tool.exists() {
        return Err(DogshError::ToolNotFound {
            path: tool.display().to_string(),
        });
    }

    let recording = Recording::from_temp_path(new_recording_path()?);

    let mut child = Command::new(tool)
        .args(sox_args(recording.path()))
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| DogshError::Recording {
            message: format!("failed to start {}: {e}", tool.display()),
        })?;
    tracing::debug!(tool = %tool.display(), ?max_duration, "recording started");

    let (line_tx, mut line_rx) = mpsc::unbounded_channel::<String>();
    let reader = child.stderr.take().map(|stderr| {
        tokio::spawn(async move {
            // Status lines are rewritten in place with '\r'
            let mut reader = BufReader::new(stderr);
            let mut buf = Vec::new();
            loop {
                buf.clear();
                match reader.read_until(b'\r', &mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(_) => {
                        if line_tx.send(String::from_utf8_lossy(&buf).into_owned()).is_err() {
                            break;
                        }
                    }
                }
            }
        })
    });

    progress.send_modify(|p| p.state = CaptureState::Listening);

    let tick = Duration::from_secs(1);
    let mut ticker = interval_at(Instant::now() + tick, tick);
    let ceiling = sleep(max_duration);
    tokio::pin!(ceiling);
    let mut remaining = max_duration.as_secs();
    let mut meter = LevelMeter::new();

    let finish = loop {
        tokio::select! {
            status = child.wait() => break Finish::Exited(status),
            _ = &mut ceiling => break Finish::Ceiling,
            _ = ticker.tick() => {
                remaining = remaining.saturating_sub(1);
                progress.send_modify(|p| p.remaining_secs = remaining);
            }
            Some(line) = line_rx.recv() => {
                let level = meter.update(&line);
                progress.send_modify(|p| p.level = level);
            }
        }
    };

    if let Some(reader) = reader {
        reader.abort();
    }

    match finish {
        Finish::Exited(Ok(status)) => match status.code() {
            None | Some(0) => {
                tracing::debug!(%status, "recording finished");
                Ok(recording)
            }
            Some(code) => Err(DogshError::Recording {
                message: format!("recorder exited with code {code}"),
            }),
        },
        Finish::Exited(Err(e)) => Err(DogshError::Recording {
            message: format!("failed waiting for recorder: {e}"),
        }),
        Finish::Ceiling => {
            tracing::debug!(?max_duration, "recording hit time limit, stopping");
            stop_recorder(&mut child).await?;
            Ok(recording)
        }
    }
}

/// Ask the recorder to finish its file (SIGTERM), killing it only if it
/// has not exited within the grace period.
async fn stop_recorder(child: &mut Child) -> Result<()> {
    #[cfg(unix)]
    {
        if let Some(pid) = child.id() {
            // SAFETY: kill(2) has no memory preconditions; `pid` is our own
            // child, which has not been reaped yet.
            let signalled = unsafe { libc::kill(pid as libc::pid_t, libc::SIGTERM) } == 0;
            if signalled {
                let grace = Duration::from_millis(defaults::RECORDER_STOP_GRACE_MS);
                match timeout(grace, child.wait()).await {
                    Ok(Ok(status)) => {
                        tracing::debug!(%status, "recorder stopped");
                        return Ok(());
                    }
                    Ok(Err(e)) => {
                        return Err(DogshError::Recording {
                            message: format!("failed waiting for recorder: {e}"),
                        });
                    }
                    Err(_) => tracing::warn!(?grace, "recorder ignored SIGTERM, killing it"),
                }
            }
        }
    }

    child.kill().await.map_err(|e| DogshError::Recording {
        message: format!("failed to stop recorder: {e}"),
    })
}

fn new_recording_path() -> Result<TempPath> {
    tempfile::Builder::new()
        .prefix("dogsh-recording-")
        .suffix(".wav")
        .tempfile()
        .map(|file| file.into_temp_path())
        .map_err(|e| DogshError::Recording {
            message: format!("failed to create recording file: {e}"),
        })
}
