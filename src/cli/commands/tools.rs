//! Tool checks, title cleaning and configuration commands.

use std::path::Path;
use tokio::runtime::Runtime;

use crate::config::{self, Config};
use crate::engine::YtDlp;
use crate::engine::ytdlp::tool_version;
use crate::normalize::{clean_title, sanitize_filename};

/// Check if yt-dlp and ffmpeg are installed
pub fn cmd_check_tools(rt: &Runtime, yt_dlp: &Path) -> anyhow::Result<()> {
    println!("Checking download tools...\n");

    let engine = YtDlp::new(yt_dlp);
    let (ytdlp_version, ffmpeg_version) = rt.block_on(async {
        (
            engine.version().await,
            tool_version(Path::new("ffmpeg"), "-version").await,
        )
    });

    let mut missing = false;

    if let Some(version) = ytdlp_version {
        println!("✓ yt-dlp: {}", version);
    } else {
        println!("✗ yt-dlp: NOT FOUND ({})", engine.binary().display());
        println!("  Install: pip install -U yt-dlp  (or see https://github.com/yt-dlp/yt-dlp)");
        missing = true;
    }

    if let Some(version) = ffmpeg_version {
        println!("✓ ffmpeg: {}", version);
    } else {
        println!("✗ ffmpeg: NOT FOUND (needed for audio extraction)");
        println!("  Windows: winget install Gyan.FFmpeg");
        println!("  macOS:   brew install ffmpeg");
        println!("  Linux:   apt install ffmpeg");
        missing = true;
    }

    if missing {
        anyhow::bail!("Required tools are missing");
    }
    Ok(())
}

/// Print a cleaned title and the filename it would produce
pub fn cmd_clean_title(text: &str) {
    let cleaned = clean_title(text);
    println!("Title:    {}", cleaned);
    println!("Filename: {}", sanitize_filename(&cleaned));
}

/// Show (and optionally create) the configuration file
pub fn cmd_config(config: &Config, path: Option<&Path>, init: bool) -> anyhow::Result<()> {
    let explicit = path.is_some();
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => config::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?,
    };

    if init {
        if path.exists() {
            println!("Config already exists: {}", path.display());
        } else if explicit {
            config::save_to(&Config::default(), &path)?;
            println!("Wrote default config: {}", path.display());
        } else {
            let written = config::save(&Config::default())?;
            println!("Wrote default config: {}", written.display());
        }
    }

    let state = if path.exists() { "" } else { " (not created, showing defaults)" };
    println!("Config file: {}{}\n", path.display(), state);
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}
