use crate::defaults;
use crate::error::{DogshError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub openai: ApiConfig,
    pub narration: NarrationConfig,
    pub capture: CaptureConfig,
    pub image: ImageConfig,
}

/// Speech / chat API configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    pub api_key: String,
    pub base_url: String,
    pub transcription_model: String,
    pub classification_model: String,
}

/// Breed narration configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NarrationConfig {
    pub enabled: bool,
    pub voice: Voice,
    pub model: TtsModel,
    /// Free text, parsed with `speech::parse_speed` on every use.
    pub speed: String,
    pub player: String,
    pub player_args: Vec<String>,
}

/// Voice recording configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CaptureConfig {
    pub tool: PathBuf,
    pub max_secs: u64,
}

/// Dog image API configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ImageConfig {
    pub base_url: String,
}

/// Narration voice presets
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Voice {
    #[default]
    Alloy,
    Echo,
    Fable,
    Onyx,
    Nova,
    Shimmer,
}

impl Voice {
    pub const ALL: [Voice; 6] = [
        Voice::Alloy,
        Voice::Echo,
        Voice::Fable,
        Voice::Onyx,
        Voice::Nova,
        Voice::Shimmer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Voice::Alloy => "alloy",
            Voice::Echo => "echo",
            Voice::Fable => "fable",
            Voice::Onyx => "onyx",
            Voice::Nova => "nova",
            Voice::Shimmer => "shimmer",
        }
    }
}

impl fmt::Display for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Voice {
    type Err = DogshError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        Voice::ALL
            .into_iter()
            .find(|v| v.as_str() == wanted)
            .ok_or_else(|| DogshError::ConfigInvalidValue {
                key: "narration.voice".to_string(),
                message: format!(
                    "unknown voice '{s}' (expected one of: {})",
                    Voice::ALL.map(|v| v.as_str()).join(", ")
                ),
            })
    }
}

/// Narration model tiers
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum TtsModel {
    #[default]
    #[serde(rename = "tts-1")]
    Standard,
    #[serde(rename = "tts-1-hd")]
    Hd,
}

impl TtsModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            TtsModel::Standard => "tts-1",
            TtsModel::Hd => "tts-1-hd",
        }
    }
}

impl fmt::Display for TtsModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TtsModel {
    type Err = DogshError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "tts-1" => Ok(TtsModel::Standard),
            "tts-1-hd" => Ok(TtsModel::Hd),
            _ => Err(DogshError::ConfigInvalidValue {
                key: "narration.model".to_string(),
                message: format!("unknown model '{s}' (expected tts-1 or tts-1-hd)"),
            }),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: defaults::OPENAI_BASE_URL.to_string(),
            transcription_model: defaults::TRANSCRIPTION_MODEL.to_string(),
            classification_model: defaults::CLASSIFICATION_MODEL.to_string(),
        }
    }
}

impl Default for NarrationConfig {
    fn default() -> Self {
        let (player, args) = defaults::AUDIO_PLAYER;
        Self {
            enabled: true,
            voice: Voice::default(),
            model: TtsModel::default(),
            speed: defaults::DEFAULT_SPEED.to_string(),
            player: player.to_string(),
            player_args: args.iter().map(|a| a.to_string()).collect(),
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            tool: PathBuf::from(defaults::RECORDING_TOOL),
            max_secs: defaults::MAX_RECORDING_SECS,
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::DOG_API_BASE_URL.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DogshError::ConfigFileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                DogshError::Io(e)
            }
        })?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if the file doesn't exist.
    ///
    /// Invalid TOML is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(DogshError::ConfigFileNotFound { .. }) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - DOGSH_API_KEY, then OPENAI_API_KEY → openai.api_key
    /// - DOGSH_VOICE → narration.voice
    /// - DOGSH_MODEL → narration.model
    /// - DOGSH_SPEED → narration.speed
    pub fn with_env_overrides(mut self) -> Self {
        let api_key = ["DOGSH_API_KEY", "OPENAI_API_KEY"]
            .iter()
            .filter_map(|k| std::env::var(k).ok())
            .find(|v| !v.is_empty());
        if let Some(key) = api_key {
            self.openai.api_key = key;
        }

        if let Ok(voice) = std::env::var("DOGSH_VOICE")
            && !voice.is_empty()
        {
            match voice.parse() {
                Ok(v) => self.narration.voice = v,
                Err(e) => tracing::warn!("ignoring DOGSH_VOICE: {e}"),
            }
        }

        if let Ok(model) = std::env::var("DOGSH_MODEL")
            && !model.is_empty()
        {
            match model.parse() {
                Ok(m) => self.narration.model = m,
                Err(e) => tracing::warn!("ignoring DOGSH_MODEL: {e}"),
            }
        }

        if let Ok(speed) = std::env::var("DOGSH_SPEED")
            && !speed.is_empty()
        {
            self.narration.speed = speed;
        }

        self
    }

    /// The configured API key, or `MissingApiKey` when none is set.
    pub fn api_key(&self) -> Result<&str> {
        let key = self.openai.api_key.trim();
        if key.is_empty() {
            Err(DogshError::MissingApiKey)
        } else {
            Ok(key)
        }
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/dogsh/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join("dogsh")
            .join("config.toml")
    }

    /// Render the configuration as TOML, with the API key masked.
    pub fn to_display_toml(&self) -> Result<String> {
        let mut shown = self.clone();
        if !shown.openai.api_key.is_empty() {
            shown.openai.api_key = "********".to_string();
        }
        toml::to_string_pretty(&shown).map_err(|e| DogshError::Other(e.to_string()))
    }

    /// A fully populated template with every default spelled out.
    pub fn dump_template() -> Result<String> {
        toml::to_string_pretty(&Config::default()).map_err(|e| DogshError::Other(e.to_string()))
    }
}

/// Where clients obtain their settings.
///
/// Implementations are asked on every call, so credential or voice changes
/// take effect without restarting a long-lived session.
pub trait ConfigSource: Send + Sync {
    fn current(&self) -> Result<Config>;
}

/// Re-reads the config file and environment on every call.
#[derive(Debug, Clone)]
pub struct FileConfigSource {
    path: PathBuf,
}

impl FileConfigSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Source backed by `--config` if given, otherwise the default path.
    pub fn from_cli(custom_path: Option<&Path>) -> Self {
        Self::new(
            custom_path
                .map(Path::to_path_buf)
                .unwrap_or_else(Config::default_path),
        )
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigSource for FileConfigSource {
    fn current(&self) -> Result<Config> {
        Ok(Config::load_or_default(&self.path)?.with_env_overrides())
    }
}

/// Fixed configuration, used in tests and for one-shot overrides.
#[derive(Debug, Clone)]
pub struct StaticConfigSource(pub Config);

impl ConfigSource for StaticConfigSource {
    fn current(&self) -> Result<Config> {
        Ok(self.0.clone())
    }
}
