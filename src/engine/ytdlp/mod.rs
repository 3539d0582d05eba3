//! yt-dlp integration
//!
//! Production implementation of both engine traits, backed by the `yt-dlp`
//! command-line tool.
//!
//! Docs: https://github.com/yt-dlp/yt-dlp#usage-and-options

pub mod dto;
mod adapter;
mod client;

pub use client::{YtDlp, tool_version};
