//! CLI command definitions and dispatch.
//!
//! Each subcommand is implemented in its own submodule:
//! - `fetch`: the full pipeline, and the search-only dry run
//! - `tools`: tool checks, title cleaning, and configuration

mod fetch;
mod tools;

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tokio::runtime::Runtime;

use crate::config::{self, Config};
use crate::descriptor::{self, ParsedList};
use crate::engine::AudioCodec;
use crate::progress::{ProgressEvent, ProgressObserver};

pub use fetch::{cmd_fetch, cmd_resolve};
pub use tools::{cmd_check_tools, cmd_clean_title, cmd_config};

/// Song Fetcher CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Show debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Use this config file instead of the default location
    #[arg(long, global = true, env = "SONG_FETCHER_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where the song list comes from
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct SongInput {
    /// Inline list: "Title:Artist, Title:Artist"
    #[arg(short, long)]
    pub songs: Option<String>,

    /// File with one "Title:Artist" or "Title - Artist" per line
    #[arg(short, long)]
    pub file: Option<PathBuf>,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Search, download, rename and tag songs
    Fetch {
        #[command(flatten)]
        input: SongInput,
        /// Output directory (created if missing)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
        /// Name files "Artist - Title" instead of "Title - Artist"
        #[arg(long)]
        artist_first: bool,
        /// Don't rewrite artist/title tags
        #[arg(long)]
        no_tags: bool,
        /// Seconds to wait after each search
        #[arg(long)]
        delay: Option<f64>,
        /// Audio codec: mp3, m4a, opus, vorbis, flac, wav
        #[arg(long)]
        codec: Option<AudioCodec>,
        /// Path to the yt-dlp executable
        #[arg(long, env = "YT_DLP")]
        yt_dlp: Option<PathBuf>,
    },
    /// Search only; show what each song would resolve to
    Resolve {
        #[command(flatten)]
        input: SongInput,
        /// Seconds to wait after each search
        #[arg(long)]
        delay: Option<f64>,
        /// Path to the yt-dlp executable
        #[arg(long, env = "YT_DLP")]
        yt_dlp: Option<PathBuf>,
    },
    /// Print a title with promotional noise removed
    CleanTitle {
        /// Raw title, e.g. "Song (Official Video) [2019]"
        text: String,
    },
    /// Check that yt-dlp and ffmpeg are installed
    CheckTools {
        /// Path to the yt-dlp executable
        #[arg(long, env = "YT_DLP")]
        yt_dlp: Option<PathBuf>,
    },
    /// Show the effective configuration
    Config {
        /// Write the default configuration file if none exists
        #[arg(long)]
        init: bool,
    },
}

/// Run the specified CLI command.
pub fn run_command(cli: &Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref());

    match &cli.command {
        Commands::Fetch {
            input,
            output_dir,
            artist_first,
            no_tags,
            delay,
            codec,
            yt_dlp,
        } => {
            let rt = Runtime::new()?;
            let mut config = with_overrides(config, *delay, yt_dlp.as_deref());
            if let Some(dir) = output_dir {
                config.output.directory = dir.clone();
            }
            if *artist_first {
                config.output.name_order = crate::model::NameOrder::ArtistFirst;
            }
            if *no_tags {
                config.output.write_tags = false;
            }
            if let Some(codec) = codec {
                config.download.codec = *codec;
            }
            cmd_fetch(&rt, input, config)
        }
        Commands::Resolve {
            input,
            delay,
            yt_dlp,
        } => {
            let rt = Runtime::new()?;
            cmd_resolve(&rt, input, with_overrides(config, *delay, yt_dlp.as_deref()))
        }
        Commands::CleanTitle { text } => {
            cmd_clean_title(text);
            Ok(())
        }
        Commands::CheckTools { yt_dlp } => {
            let rt = Runtime::new()?;
            let config = with_overrides(config, None, yt_dlp.as_deref());
            cmd_check_tools(&rt, &config.download.engine)
        }
        Commands::Config { init } => cmd_config(&config, cli.config.as_deref(), *init),
    }
}

// ============================================================================
// Shared helper functions
// ============================================================================

fn load_config(path: Option<&Path>) -> Config {
    match path {
        Some(path) => config::load_from(path),
        None => config::load(),
    }
}

/// Apply the flags shared by the search commands.
fn with_overrides(mut config: Config, delay: Option<f64>, yt_dlp: Option<&Path>) -> Config {
    if let Some(delay) = delay {
        config.search.delay_secs = delay;
    }
    if let Some(binary) = yt_dlp {
        config.download.engine = binary.to_path_buf();
    }
    config
}

/// Parse the song list from whichever input was given
pub(crate) fn read_songs(input: &SongInput) -> anyhow::Result<ParsedList> {
    let parsed = match (&input.songs, &input.file) {
        (Some(songs), _) => descriptor::parse_comma_list(songs),
        (None, Some(file)) => descriptor::parse_file(file)?,
        (None, None) => anyhow::bail!("Provide songs with --songs or --file"),
    };

    for error in &parsed.errors {
        eprintln!("⚠ Skipping {}", error);
    }
    Ok(parsed)
}

/// Prints pipeline progress to the terminal
pub(crate) struct ConsoleObserver;

impl ProgressObserver for ConsoleObserver {
    fn on_event(&self, event: &ProgressEvent<'_>) {
        match event {
            ProgressEvent::Searching {
                index,
                total,
                descriptor,
            } => println!("[{}/{}] Searching: {}", index, total, descriptor),
            ProgressEvent::Matched(source) => {
                println!("  ✓ {} ({})", source.remote_title, source.remote_url)
            }
            ProgressEvent::Unmatched(entry) => println!("  ✗ {}", entry.reason),
            ProgressEvent::DownloadStarted { count } => {
                println!("\nDownloading {} songs...", count)
            }
            ProgressEvent::DownloadFinished { ok } => {
                if *ok {
                    println!("Download finished, renaming files...\n");
                }
            }
            ProgressEvent::Reconciled(result) => match (&result.final_path, &result.warning) {
                (Some(path), None) => println!("  ✓ {}", path.display()),
                (Some(path), Some(warning)) => println!("  ⚠ {} ({})", path.display(), warning),
                (None, warning) => println!(
                    "  ✗ {}: {}",
                    result.descriptor,
                    warning.as_deref().unwrap_or("not saved")
                ),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_fetch_requires_an_input() {
        let result = Cli::try_parse_from(["song-fetcher", "fetch"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_fetch_rejects_both_inputs() {
        let result = Cli::try_parse_from([
            "song-fetcher",
            "fetch",
            "--songs",
            "A:B",
            "--file",
            "songs.txt",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_fetch_parses_flags() {
        let cli = Cli::try_parse_from([
            "song-fetcher",
            "fetch",
            "-s",
            "Imagine:John Lennon",
            "-o",
            "/tmp/music",
            "--artist-first",
            "--codec",
            "opus",
            "-v",
        ])
        .unwrap();

        assert!(cli.verbose);
        match cli.command {
            Commands::Fetch {
                input,
                output_dir,
                artist_first,
                codec,
                ..
            } => {
                assert_eq!(input.songs.as_deref(), Some("Imagine:John Lennon"));
                assert_eq!(output_dir, Some(PathBuf::from("/tmp/music")));
                assert!(artist_first);
                assert_eq!(codec, Some(AudioCodec::Opus));
            }
            _ => panic!("expected fetch"),
        }
    }

    #[test]
    fn test_read_songs_from_inline_list() {
        let input = SongInput {
            songs: Some("Imagine:John Lennon, bad".to_string()),
            file: None,
        };
        let parsed = read_songs(&input).unwrap();
        assert_eq!(parsed.descriptors.len(), 1);
        assert_eq!(parsed.errors.len(), 1);
    }

    #[test]
    fn test_read_songs_missing_file_errors() {
        let input = SongInput {
            songs: None,
            file: Some(PathBuf::from("/definitely/not/here.txt")),
        };
        assert!(read_songs(&input).is_err());
    }

    #[test]
    fn test_overrides_apply() {
        let config = with_overrides(Config::default(), Some(0.5), Some(Path::new("/opt/yt-dlp")));
        assert_eq!(config.search.delay_secs, 0.5);
        assert_eq!(config.download.engine, PathBuf::from("/opt/yt-dlp"));
    }
}
