//! yt-dlp process client
//!
//! Shells out to the `yt-dlp` executable for both searching and bulk
//! downloading. Audio extraction additionally needs `ffmpeg` on the PATH;
//! yt-dlp invokes it itself.
//!
//! Install yt-dlp:
//! - Windows: `winget install yt-dlp.yt-dlp`
//! - macOS: `brew install yt-dlp`
//! - Linux: `pipx install yt-dlp` or your distribution's package

use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;

use super::adapter;
use crate::engine::domain::{DownloadOptions, EngineError, SearchCandidate, SearchQuery};

/// Exit code yt-dlp uses when some items failed but the run completed.
const EXIT_PARTIAL_FAILURE: i32 = 1;

/// yt-dlp process wrapper
#[derive(Debug, Clone)]
pub struct YtDlp {
    binary: PathBuf,
}

impl YtDlp {
    /// Use the given executable (a bare name is looked up on the PATH).
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Search for candidates without downloading anything.
    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchCandidate>, EngineError> {
        let output = Command::new(&self.binary)
            .args(search_args(query))
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| spawn_error(&self.binary, e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(adapter::classify_failure(&stderr));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        adapter::to_candidates(&stdout)
    }

    /// Download every URL in one engine run.
    ///
    /// Per-item failures are only logged: the engine skips them and their
    /// files simply do not appear. Only a run that cannot start, or that
    /// rejects its own invocation, is an error.
    pub async fn download(
        &self,
        urls: &[String],
        options: &DownloadOptions,
    ) -> Result<(), EngineError> {
        tracing::debug!(
            target: "song_fetcher::engine::ytdlp",
            count = urls.len(),
            template = %options.output_template,
            "Starting bulk download"
        );

        let output = Command::new(&self.binary)
            .args(download_args(urls, options))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .output()
            .await
            .map_err(|e| spawn_error(&self.binary, e))?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        match output.status.code() {
            Some(EXIT_PARTIAL_FAILURE) if options.continue_on_error => {
                tracing::warn!(
                    target: "song_fetcher::engine::ytdlp",
                    error = %adapter::last_error_line(&stderr),
                    "Some downloads failed; continuing with the rest"
                );
                Ok(())
            }
            _ => Err(EngineError::Failed(adapter::last_error_line(&stderr))),
        }
    }

    /// Version string, or `None` if the executable cannot be run.
    pub async fn version(&self) -> Option<String> {
        tool_version(&self.binary, "--version").await
    }
}

impl Default for YtDlp {
    fn default() -> Self {
        Self::new("yt-dlp")
    }
}

/// First line of `<binary> <flag>` output, if the tool runs successfully.
pub async fn tool_version(binary: &Path, flag: &str) -> Option<String> {
    Command::new(binary)
        .arg(flag)
        .stdin(Stdio::null())
        .output()
        .await
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| {
            String::from_utf8_lossy(&o.stdout)
                .lines()
                .next()
                .map(|l| l.trim().to_string())
        })
}

fn spawn_error(binary: &Path, e: io::Error) -> EngineError {
    if e.kind() == io::ErrorKind::NotFound {
        EngineError::Unavailable(format!("{} not found", binary.display()))
    } else {
        EngineError::Unavailable(format!("failed to run {}: {}", binary.display(), e))
    }
}

/// Arguments for a flat (metadata-only) search.
fn search_args(query: &SearchQuery) -> Vec<String> {
    vec![
        "--flat-playlist".to_string(),
        "--dump-single-json".to_string(),
        "--no-warnings".to_string(),
        "--format".to_string(),
        query.format.clone(),
        format!("ytsearch{}:{}", query.max_results, query.text),
    ]
}

/// Arguments for one bulk download.
fn download_args(urls: &[String], options: &DownloadOptions) -> Vec<String> {
    let mut args = vec![
        "--format".to_string(),
        options.format.clone(),
        "--retries".to_string(),
        options.retries.to_string(),
        "--fragment-retries".to_string(),
        options.fragment_retries.to_string(),
        "--output".to_string(),
        options.output_template.clone(),
        "--extract-audio".to_string(),
        "--audio-format".to_string(),
        options.codec.as_arg().to_string(),
        "--audio-quality".to_string(),
        format!("{}K", options.quality_kbps),
        "--no-keep-video".to_string(),
        "--no-write-subs".to_string(),
        "--no-write-auto-subs".to_string(),
        "--no-progress".to_string(),
    ];

    if options.continue_on_error {
        args.push("--ignore-errors".to_string());
        args.push("--no-abort-on-error".to_string());
    } else {
        args.push("--abort-on-error".to_string());
    }

    args.push(if options.write_thumbnail {
        "--write-thumbnail".to_string()
    } else {
        "--no-write-thumbnail".to_string()
    });
    args.push(if options.write_info_json {
        "--write-info-json".to_string()
    } else {
        "--no-write-info-json".to_string()
    });

    // URLs after the separator so nothing in them is read as an option
    args.push("--".to_string());
    args.extend(urls.iter().cloned());
    args
}
