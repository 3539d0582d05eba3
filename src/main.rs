//! Song Fetcher - resolve song lists to audio files.
//!
//! Takes a list of "Title:Artist" descriptors, finds one remote source per
//! song, downloads the audio in a single batch, and leaves cleanly named,
//! tagged files in the output directory.

pub mod acquisition;
pub mod cli;
pub mod config;
pub mod descriptor;
pub mod engine;
pub mod error;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod progress;
pub mod reconciler;
pub mod report;
pub mod resolver;
pub mod tags;
#[cfg(test)]
pub mod test_utils;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Initialize logging
    let level = if args.verbose {
        "song_fetcher=debug"
    } else {
        "song_fetcher=info"
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive(level.parse()?))
        .init();

    cli::run_command(&args)
}
