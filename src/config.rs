//! Configuration management
//!
//! Load and save user preferences to a TOML config file.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{CardError, Result};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub generation: GenerationPreferences,
    pub timing: TimingPreferences,
    pub audio: AudioPreferences,
    pub export: ExportPreferences,
    pub logging: LoggingPreferences,
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from an explicit path; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents).map_err(|e| CardError::Config(e.to_string()))
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents =
            toml::to_string_pretty(self).map_err(|e| CardError::Config(e.to_string()))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> PathBuf {
        if let Some(proj_dirs) = project_dirs() {
            proj_dirs.config_dir().join("config.toml")
        } else {
            // Fallback to current directory
            PathBuf::from("amourcard.toml")
        }
    }
}

pub(crate) fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "amourcard", "amourcard")
}

/// Text generation service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationPreferences {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub request_timeout_secs: u64,
    /// Falls back to `GEMINI_API_KEY` / `API_KEY` when unset
    pub api_key: Option<String>,
}

impl Default for GenerationPreferences {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-3-flash-preview".to_string(),
            temperature: 1.0,
            request_timeout_secs: 30,
            api_key: None,
        }
    }
}

impl GenerationPreferences {
    /// Configured key, else the environment
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
            .or_else(|| std::env::var("API_KEY").ok())
            .filter(|k| !k.trim().is_empty())
    }
}

/// Durations of the card's timed effects, in milliseconds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingPreferences {
    pub gift_open_ms: u64,
    pub autoplay_delay_ms: u64,
    pub confetti_ms: u64,
}

impl Default for TimingPreferences {
    fn default() -> Self {
        Self {
            gift_open_ms: 1200,
            autoplay_delay_ms: 2000,
            confetti_ms: 3000,
        }
    }
}

impl TimingPreferences {
    pub fn gift_open(&self) -> Duration {
        Duration::from_millis(self.gift_open_ms)
    }

    pub fn autoplay_delay(&self) -> Duration {
        Duration::from_millis(self.autoplay_delay_ms)
    }

    pub fn confetti(&self) -> Duration {
        Duration::from_millis(self.confetti_ms)
    }
}

/// Background music
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioPreferences {
    pub enabled: bool,
    /// Player executable and its arguments; `{track}` is replaced by `track`
    pub player: Vec<String>,
    pub track: String,
}

impl Default for AudioPreferences {
    fn default() -> Self {
        Self {
            enabled: true,
            player: vec![
                "mpv".to_string(),
                "--no-video".to_string(),
                "--really-quiet".to_string(),
                "--loop=inf".to_string(),
                "{track}".to_string(),
            ],
            track: "https://www.soundhelix.com/examples/mp3/SoundHelix-Song-1.mp3".to_string(),
        }
    }
}

/// PNG export
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportPreferences {
    pub output_dir: PathBuf,
    /// TrueType/OpenType font; common system fonts are tried when unset
    pub font_path: Option<PathBuf>,
    pub width: u32,
    pub height: u32,
}

impl Default for ExportPreferences {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            font_path: None,
            width: 800,
            height: 1000,
        }
    }
}

/// Log file settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingPreferences {
    /// `EnvFilter` directive used when `RUST_LOG` is not set
    pub level: String,
    /// Defaults to the platform data directory
    pub file: Option<PathBuf>,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}
