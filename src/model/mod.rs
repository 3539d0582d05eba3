//! Core data models for the fetch pipeline.
//!
//! Defines the records that flow between stages: [`SongDescriptor`] from the
//! parser, [`ResolvedSource`] / [`UnresolvedEntry`] from the resolver,
//! [`AcquisitionMap`] between the download and reconciliation phases, and
//! [`ReconciliationResult`] for the final report.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Base URL for canonical watch links built from a remote identifier.
pub const WATCH_URL_PREFIX: &str = "https://www.youtube.com/watch?v=";

/// A user-supplied (title, artist) pair.
///
/// Both fields are trimmed and non-empty; construct through
/// [`SongDescriptor::new`] or the descriptor parser.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SongDescriptor {
    title: String,
    artist: String,
}

impl SongDescriptor {
    /// Build a descriptor, trimming both fields.
    ///
    /// Returns `None` if either field is empty after trimming.
    pub fn new(title: impl AsRef<str>, artist: impl AsRef<str>) -> Option<Self> {
        let title = title.as_ref().trim();
        let artist = artist.as_ref().trim();
        if title.is_empty() || artist.is_empty() {
            return None;
        }
        Some(Self {
            title: title.to_string(),
            artist: artist.to_string(),
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn artist(&self) -> &str {
        &self.artist
    }
}

impl fmt::Display for SongDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.title, self.artist)
    }
}

/// A descriptor matched to exactly one remote source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSource {
    pub descriptor: SongDescriptor,
    /// Canonical watch URL of the match
    pub remote_url: String,
    /// Title as reported by the remote engine (noisy, display only)
    pub remote_title: String,
}

/// A descriptor that could not be matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedEntry {
    pub descriptor: SongDescriptor,
    pub reason: String,
}

/// Build the canonical watch URL for a remote identifier.
pub fn watch_url(id: &str) -> String {
    format!("{WATCH_URL_PREFIX}{id}")
}

/// Extract the remote identifier from a watch URL.
///
/// Takes whatever follows the last `v=` up to the next `&` or `#`. Short
/// links without a query (`https://youtu.be/<id>`) fall back to the last path
/// segment.
pub fn extract_identifier(url: &str) -> Option<String> {
    let tail = match url.rfind("v=") {
        Some(pos) => &url[pos + 2..],
        None => url.trim_end_matches('/').rsplit('/').next()?,
    };
    let id = tail.split(['&', '#', '?']).next().unwrap_or_default().trim();
    if id.is_empty() || id.contains(':') {
        return None;
    }
    Some(id.to_string())
}

/// One entry of an [`AcquisitionMap`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquisitionEntry {
    pub identifier: String,
    pub url: String,
    pub descriptor: SongDescriptor,
}

/// Remote identifier → originating descriptor, for a single download batch.
///
/// Keeps first-insertion order so reports follow input order. Inserting an
/// identifier that is already present replaces its descriptor (last write
/// wins) and hands back the one it displaced.
#[derive(Debug, Clone, Default)]
pub struct AcquisitionMap {
    entries: Vec<AcquisitionEntry>,
}

impl AcquisitionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a mapping; returns the displaced descriptor on collision.
    pub fn insert(
        &mut self,
        identifier: String,
        url: String,
        descriptor: SongDescriptor,
    ) -> Option<SongDescriptor> {
        if let Some(existing) = self.entries.iter_mut().find(|e| e.identifier == identifier) {
            existing.url = url;
            return Some(std::mem::replace(&mut existing.descriptor, descriptor));
        }
        self.entries.push(AcquisitionEntry {
            identifier,
            url,
            descriptor,
        });
        None
    }

    pub fn get(&self, identifier: &str) -> Option<&SongDescriptor> {
        self.entries
            .iter()
            .find(|e| e.identifier == identifier)
            .map(|e| &e.descriptor)
    }

    /// URLs to hand to the bulk download, one per entry.
    pub fn urls(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.url.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AcquisitionEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Outcome of reconciling one acquired item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationResult {
    pub descriptor: SongDescriptor,
    /// Where the file ended up, if it was found and moved
    pub final_path: Option<PathBuf>,
    pub tags_written: bool,
    pub warning: Option<String>,
}

impl ReconciliationResult {
    /// Result for an item whose downloaded file never materialized.
    pub fn not_found(descriptor: SongDescriptor) -> Self {
        Self {
            descriptor,
            final_path: None,
            tags_written: false,
            warning: Some("not found".to_string()),
        }
    }

    /// Result for an item that was never handed to the download.
    pub fn rejected(descriptor: SongDescriptor, warning: impl Into<String>) -> Self {
        Self {
            descriptor,
            final_path: None,
            tags_written: false,
            warning: Some(warning.into()),
        }
    }

    /// Whether the item produced a file in the output directory.
    pub fn is_saved(&self) -> bool {
        self.final_path.is_some()
    }
}

/// Order of the two name components in the final filename.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameOrder {
    /// `"{title} - {artist}.ext"`
    #[default]
    TitleFirst,
    /// `"{artist} - {title}.ext"`
    ArtistFirst,
}

impl NameOrder {
    /// Join already-sanitized components into a file stem.
    pub fn file_stem(self, title: &str, artist: &str) -> String {
        match self {
            NameOrder::TitleFirst => format!("{title} - {artist}"),
            NameOrder::ArtistFirst => format!("{artist} - {title}"),
        }
    }
}
