//! Command-line interface for song-fetcher.
//!
//! This module provides CLI commands for fetching songs, previewing
//! matches, and checking the external tools the fetcher relies on.

mod commands;

pub use commands::{Cli, Commands, run_command};
