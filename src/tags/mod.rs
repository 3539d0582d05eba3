//! Audio tag writing.
//!
//! Uses the lofty crate for format-independent tag access. Only the two
//! fields the reconciler owns are touched: artist and title. Everything else
//! already in the file (including whatever the engine embedded) is kept.
//!
//! Tag writing is an optional capability: the reconciler takes an
//! `Option<&dyn TagWriter>` and treats `None` as a per-item warning.

use std::path::Path;

use lofty::config::WriteOptions;
use lofty::file::TaggedFileExt;
use lofty::probe::Probe;
use lofty::tag::{Accessor, Tag, TagExt};

/// The fields written after reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagUpdate {
    pub artist: String,
    pub title: String,
}

/// Tag read/write failures
#[derive(Debug, thiserror::Error)]
pub enum TagError {
    #[error("Failed to open audio file: {0}")]
    Open(String),

    #[error("Unsupported or corrupt audio header: {0}")]
    Read(String),

    #[error("Failed to write tags: {0}")]
    Write(String),
}

/// Something that can rewrite artist/title tags.
pub trait TagWriter: Send + Sync {
    fn write_tags(&self, path: &Path, update: &TagUpdate) -> Result<(), TagError>;
}

/// [`TagWriter`] backed by lofty.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoftyTagWriter;

impl TagWriter for LoftyTagWriter {
    fn write_tags(&self, path: &Path, update: &TagUpdate) -> Result<(), TagError> {
        let mut tagged_file = Probe::open(path)
            .map_err(|e| TagError::Open(e.to_string()))?
            .read()
            .map_err(|e| TagError::Read(e.to_string()))?;

        // Get the primary tag type for this format, or create one
        let tag_type = tagged_file.primary_tag_type();
        if tagged_file.tag(tag_type).is_none() {
            tagged_file.insert_tag(Tag::new(tag_type));
        }
        let Some(tag) = tagged_file.tag_mut(tag_type) else {
            return Err(TagError::Write(format!("no {tag_type:?} tag available")));
        };

        tag.set_artist(update.artist.clone());
        tag.set_title(update.title.clone());

        tag.save_to_path(path, WriteOptions::default())
            .map_err(|e| TagError::Write(e.to_string()))
    }
}
