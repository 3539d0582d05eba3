//! Configuration system using TOML files.
//!
//! Config is stored in the OS-standard config directory:
//! - Windows: %APPDATA%\song-fetcher\config.toml
//! - macOS: ~/Library/Application Support/song-fetcher/config.toml
//! - Linux: ~/.config/song-fetcher/config.toml
//!
//! The config file is human-readable and editable. Command-line flags
//! override whatever it says for a single run.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::engine::{AudioCodec, BEST_AUDIO_FORMAT, DownloadOptions};
use crate::model::NameOrder;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where and how finished files are written
    pub output: OutputConfig,

    /// Search phase settings
    pub search: SearchConfig,

    /// Download engine settings
    pub download: DownloadConfig,
}

/// Output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for finished files (created if missing)
    pub directory: PathBuf,

    /// Filename order: "title_first" or "artist_first"
    pub name_order: NameOrder,

    /// Rewrite artist/title tags after renaming
    pub write_tags: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./downloads/"),
            name_order: NameOrder::TitleFirst,
            write_tags: true,
        }
    }
}

/// Search settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Pause after every search request, in seconds
    pub delay_secs: f64,

    /// Word appended to every query to steer results toward audio uploads
    pub query_suffix: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            delay_secs: 2.0,
            query_suffix: "audio".to_string(),
        }
    }
}

impl SearchConfig {
    /// Delay as a Duration; negative or non-finite values mean no delay.
    pub fn delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.delay_secs).unwrap_or(Duration::ZERO)
    }
}

/// Download settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// yt-dlp executable (bare name is looked up on the PATH)
    pub engine: PathBuf,

    /// Target audio codec
    pub codec: AudioCodec,

    /// Target bitrate in kbps
    pub quality_kbps: u32,

    /// Retries per item
    pub retries: u32,

    /// Retries per media fragment
    pub fragment_retries: u32,

    /// Save the thumbnail next to each download
    pub write_thumbnail: bool,

    /// Save the engine's info JSON next to each download
    pub write_info_json: bool,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            engine: PathBuf::from("yt-dlp"),
            codec: AudioCodec::Mp3,
            quality_kbps: 192,
            retries: 10,
            fragment_retries: 10,
            write_thumbnail: true,
            write_info_json: true,
        }
    }
}

impl DownloadConfig {
    /// Engine options for a bulk download into `scratch`.
    pub fn options_for(&self, scratch: &Path) -> DownloadOptions {
        DownloadOptions {
            retries: self.retries,
            fragment_retries: self.fragment_retries,
            continue_on_error: true,
            output_template: DownloadOptions::template_in(scratch),
            format: BEST_AUDIO_FORMAT.to_string(),
            codec: self.codec,
            quality_kbps: self.quality_kbps,
            write_thumbnail: self.write_thumbnail,
            write_info_json: self.write_info_json,
        }
    }
}

// ============================================================================
// Config File Operations
// ============================================================================

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("song-fetcher"))
}

/// Get the full path to the config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load configuration from the default location
///
/// Returns default config if file doesn't exist or can't be parsed.
/// Logs warnings but doesn't fail - we always return a usable config.
pub fn load() -> Config {
    let Some(path) = config_path() else {
        tracing::warn!("Could not determine config directory, using defaults");
        return Config::default();
    };
    load_from(&path)
}

/// Load configuration from a specific file, falling back to defaults
pub fn load_from(path: &Path) -> Config {
    if !path.exists() {
        tracing::debug!("No config file found at {:?}, using defaults", path);
        return Config::default();
    }

    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => {
                tracing::info!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                tracing::error!("Failed to parse config file {:?}: {}", path, e);
                tracing::warn!("Using default configuration");
                Config::default()
            }
        },
        Err(e) => {
            tracing::error!("Failed to read config file {:?}: {}", path, e);
            Config::default()
        }
    }
}

/// Save configuration to the default location
pub fn save(config: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path().ok_or(ConfigError::NoConfigDir)?;
    save_to(config, &path)?;
    Ok(path)
}

/// Save configuration to a specific file
///
/// Creates the parent directory if it doesn't exist.
pub fn save_to(config: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::CreateDir(dir.to_path_buf(), e))?;
    }

    // Serialize to pretty TOML
    let contents = toml::to_string_pretty(config).map_err(ConfigError::Serialize)?;

    // Write atomically (write to temp, then rename)
    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, &contents).map_err(|e| ConfigError::Write(temp_path.clone(), e))?;
    std::fs::rename(&temp_path, path)
        .map_err(|e| ConfigError::Rename(temp_path, path.to_path_buf(), e))?;

    tracing::info!("Saved config to {:?}", path);
    Ok(())
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to create config directory {0}: {1}")]
    CreateDir(PathBuf, std::io::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),

    #[error("Failed to write config to {0}: {1}")]
    Write(PathBuf, std::io::Error),

    #[error("Failed to rename temp file {0} to {1}: {2}")]
    Rename(PathBuf, PathBuf, std::io::Error),
}

// ============================================================================
// Tests
// ============================================================================
