//! Internal domain models for the remote search and acquisition engines.
//!
//! These types are OUR types - they don't change when the engine's output
//! format changes. Engine responses get converted into these types via
//! adapters.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Format preference used for both search and download.
pub const BEST_AUDIO_FORMAT: &str = "bestaudio/best";

/// A free-text search against the remote engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub text: String,
    /// Upper bound on candidates returned (1 = top result only)
    pub max_results: usize,
    /// Quality preference passed through to the engine
    pub format: String,
}

impl SearchQuery {
    /// Query restricted to the single top result, best audio preferred.
    pub fn top_audio(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            max_results: 1,
            format: BEST_AUDIO_FORMAT.to_string(),
        }
    }
}

/// One search hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCandidate {
    /// Remote identifier (may be empty if the engine omitted it)
    pub id: String,
    pub url: String,
    pub title: String,
}

/// Target codec for audio extraction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioCodec {
    #[default]
    Mp3,
    M4a,
    Opus,
    Vorbis,
    Flac,
    Wav,
}

impl AudioCodec {
    /// Name the engine expects for `--audio-format`.
    pub fn as_arg(self) -> &'static str {
        match self {
            AudioCodec::Mp3 => "mp3",
            AudioCodec::M4a => "m4a",
            AudioCodec::Opus => "opus",
            AudioCodec::Vorbis => "vorbis",
            AudioCodec::Flac => "flac",
            AudioCodec::Wav => "wav",
        }
    }

    /// File extension of the extracted audio.
    pub fn extension(self) -> &'static str {
        match self {
            AudioCodec::Vorbis => "ogg",
            other => other.as_arg(),
        }
    }
}

impl fmt::Display for AudioCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_arg())
    }
}

impl FromStr for AudioCodec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mp3" => Ok(AudioCodec::Mp3),
            "m4a" | "aac" => Ok(AudioCodec::M4a),
            "opus" => Ok(AudioCodec::Opus),
            "vorbis" | "ogg" => Ok(AudioCodec::Vorbis),
            "flac" => Ok(AudioCodec::Flac),
            "wav" => Ok(AudioCodec::Wav),
            other => Err(format!(
                "unsupported codec '{other}' (expected mp3, m4a, opus, vorbis, flac or wav)"
            )),
        }
    }
}

/// Placeholder the engine replaces with each item's remote identifier.
pub const ID_PLACEHOLDER: &str = "%(id)s";
/// Placeholder the engine replaces with each item's file extension.
pub const EXT_PLACEHOLDER: &str = "%(ext)s";

/// Options for one bulk download call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOptions {
    /// Retries per item on transient failure
    pub retries: u32,
    /// Retries per media fragment
    pub fragment_retries: u32,
    /// Keep going when one item fails
    pub continue_on_error: bool,
    /// Output path template keyed by identifier, e.g. `<dir>/%(id)s.%(ext)s`
    pub output_template: String,
    pub format: String,
    pub codec: AudioCodec,
    /// Target bitrate in kbps
    pub quality_kbps: u32,
    pub write_thumbnail: bool,
    pub write_info_json: bool,
}

impl DownloadOptions {
    /// Template writing `<identifier>.<ext>` into `dir`.
    pub fn template_in(dir: &Path) -> String {
        dir.join(format!("{ID_PLACEHOLDER}.{EXT_PLACEHOLDER}"))
            .to_string_lossy()
            .into_owned()
    }
}

/// Errors from the remote engines
#[derive(Debug, Clone, thiserror::Error)]
pub enum EngineError {
    /// The engine could not be started at all
    #[error("Engine unavailable: {0}")]
    Unavailable(String),

    /// The engine ran but reported a failure
    #[error("Engine failed: {0}")]
    Failed(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Rate limited - try again later")]
    RateLimited,

    #[error("Failed to parse engine output: {0}")]
    Parse(String),
}
