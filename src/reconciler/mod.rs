//! Reconciliation: turn per-identifier downloads into named, tagged files.
//!
//! The bulk download leaves `<identifier>.<ext>` files in a scratch
//! directory. For every entry of the [`AcquisitionMap`] the reconciler finds
//! that file, moves it into the output directory under a name built from the
//! user's original descriptor, and rewrites its artist/title tags. Every
//! failure is recorded on the item it belongs to; the scratch directory is
//! removed afterwards no matter how many items failed.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::engine::AudioCodec;
use crate::error::{Result, ResultExt};
use crate::model::{AcquisitionMap, NameOrder, ReconciliationResult, SongDescriptor};
use crate::normalize::{clean_title, sanitize_filename};
use crate::progress::{ProgressEvent, ProgressObserver, notify};
use crate::tags::{TagUpdate, TagWriter};

/// How tags are handled after a file is moved.
#[derive(Clone, Copy)]
enum Tagging<'a> {
    Writer(&'a dyn TagWriter),
    /// No tag writer could be provided; each item gets a warning
    Unavailable,
    /// Tagging switched off by the user; nothing is recorded
    Disabled,
}

/// Renames and tags acquired files.
pub struct Reconciler<'a> {
    output_dir: PathBuf,
    codec: AudioCodec,
    name_order: NameOrder,
    tagging: Tagging<'a>,
}

impl<'a> Reconciler<'a> {
    /// Reconciler writing into `output_dir`, expecting `codec` files.
    ///
    /// Tagging starts out unavailable; supply a writer with
    /// [`with_tag_writer`](Self::with_tag_writer).
    pub fn new(output_dir: impl Into<PathBuf>, codec: AudioCodec) -> Self {
        Self {
            output_dir: output_dir.into(),
            codec,
            name_order: NameOrder::default(),
            tagging: Tagging::Unavailable,
        }
    }

    pub fn with_name_order(mut self, name_order: NameOrder) -> Self {
        self.name_order = name_order;
        self
    }

    /// Use `writer` for tags, or record a warning per item if `None`.
    pub fn with_tag_writer(mut self, writer: Option<&'a dyn TagWriter>) -> Self {
        self.tagging = match writer {
            Some(w) => Tagging::Writer(w),
            None => Tagging::Unavailable,
        };
        self
    }

    /// Skip tagging entirely.
    pub fn without_tags(mut self) -> Self {
        self.tagging = Tagging::Disabled;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Reconcile every map entry in order, then delete the scratch directory.
    pub fn reconcile(
        &self,
        map: &AcquisitionMap,
        scratch: TempDir,
        observer: Option<&dyn ProgressObserver>,
    ) -> Vec<ReconciliationResult> {
        let mut results = Vec::with_capacity(map.len());

        for entry in map.iter() {
            let result = self.reconcile_item(&entry.identifier, &entry.descriptor, scratch.path());
            notify(observer, ProgressEvent::Reconciled(&result));
            results.push(result);
        }

        let scratch_path = scratch.path().to_path_buf();
        if let Err(e) = scratch.close() {
            tracing::warn!(
                target: "song_fetcher::reconciler",
                "Failed to remove scratch directory {:?}: {}",
                scratch_path,
                e
            );
        }

        let saved = results.iter().filter(|r| r.is_saved()).count();
        tracing::info!(target: "song_fetcher::reconciler", saved, total = results.len(), "Reconciliation complete");
        results
    }

    /// Reconcile a single downloaded item found (or not) in `scratch`.
    pub fn reconcile_item(
        &self,
        identifier: &str,
        descriptor: &SongDescriptor,
        scratch: &Path,
    ) -> ReconciliationResult {
        let ext = self.codec.extension();
        let source = scratch.join(format!("{identifier}.{ext}"));

        if !source.is_file() {
            tracing::warn!(target: "song_fetcher::reconciler", identifier, "No downloaded file for {}", descriptor);
            return ReconciliationResult::not_found(descriptor.clone());
        }

        let mut warnings = Vec::new();
        let (title, artist) = self.name_parts(identifier, descriptor, &mut warnings);
        let destination = self
            .output_dir
            .join(format!("{}.{ext}", self.name_order.file_stem(&title, &artist)));

        if let Err(e) = move_file(&source, &destination) {
            tracing::warn!(target: "song_fetcher::reconciler", "Could not save {}: {}", descriptor, e);
            warnings.push(format!("move failed: {e}"));
            return ReconciliationResult {
                descriptor: descriptor.clone(),
                final_path: None,
                tags_written: false,
                warning: Some(warnings.join("; ")),
            };
        }
        tracing::debug!(target: "song_fetcher::reconciler", "Saved {:?}", destination);

        let tags_written = match self.tagging {
            Tagging::Writer(writer) => {
                let update = TagUpdate {
                    artist: descriptor.artist().to_string(),
                    title: clean_title(descriptor.title()),
                };
                match writer.write_tags(&destination, &update) {
                    Ok(()) => true,
                    Err(e) => {
                        tracing::warn!(target: "song_fetcher::reconciler", "Tagging failed for {:?}: {}", destination, e);
                        warnings.push(format!("tags not written: {e}"));
                        false
                    }
                }
            }
            Tagging::Unavailable => {
                warnings.push("tags not written: no tag writer available".to_string());
                false
            }
            Tagging::Disabled => false,
        };

        ReconciliationResult {
            descriptor: descriptor.clone(),
            final_path: Some(destination),
            tags_written,
            warning: (!warnings.is_empty()).then(|| warnings.join("; ")),
        }
    }

    /// Sanitized (title, artist); an empty part falls back to the identifier.
    fn name_parts(
        &self,
        identifier: &str,
        descriptor: &SongDescriptor,
        warnings: &mut Vec<String>,
    ) -> (String, String) {
        let fallback = || {
            let id = sanitize_filename(identifier);
            if id.is_empty() { "unknown".to_string() } else { id }
        };

        let mut title = sanitize_filename(descriptor.title());
        if title.is_empty() {
            warnings.push(format!("title '{}' has no usable filename characters", descriptor.title()));
            title = fallback();
        }
        let mut artist = sanitize_filename(descriptor.artist());
        if artist.is_empty() {
            warnings.push(format!("artist '{}' has no usable filename characters", descriptor.artist()));
            artist = fallback();
        }
        (title, artist)
    }
}

/// Move `source` to `destination`, replacing any existing file.
///
/// Falls back to copy + delete when a plain rename is not possible.
fn move_file(source: &Path, destination: &Path) -> Result<()> {
    if fs::rename(source, destination).is_err() {
        fs::copy(source, destination)
            .with_context(format!("Failed to copy file to: {:?}", destination))?;
        fs::remove_file(source)
            .with_context(format!("Failed to remove source file: {:?}", source))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::watch_url;
    use crate::progress::mocks::RecordingObserver;
    use crate::tags::mocks::{FailingTagWriter, RecordingTagWriter};
    use crate::test_utils::song;
    use tempfile::tempdir;

    fn scratch_in(dir: &Path) -> TempDir {
        tempfile::Builder::new()
            .prefix("_temp_dl")
            .tempdir_in(dir)
            .unwrap()
    }

    fn map_of(items: &[(&str, SongDescriptor)]) -> AcquisitionMap {
        let mut map = AcquisitionMap::new();
        for (id, d) in items {
            map.insert(id.to_string(), watch_url(id), d.clone());
        }
        map
    }

    #[test]
    fn test_reconcile_moves_and_tags() {
        let out = tempdir().unwrap();
        let scratch = scratch_in(out.path());
        fs::write(scratch.path().join("id1.mp3"), b"audio").unwrap();

        let writer = RecordingTagWriter::default();
        let reconciler = Reconciler::new(out.path(), AudioCodec::Mp3).with_tag_writer(Some(&writer));

        let map = map_of(&[("id1", song("Let It Be (Remastered 2009)", "Beatles"))]);
        let results = reconciler.reconcile(&map, scratch, None);

        assert_eq!(results.len(), 1);
        let expected = out.path().join("Let It Be (Remastered 2009) - Beatles.mp3");
        assert_eq!(results[0].final_path.as_deref(), Some(expected.as_path()));
        assert!(results[0].tags_written);
        assert_eq!(results[0].warning, None);
        assert_eq!(fs::read(&expected).unwrap(), b"audio");

        let update = writer
            .update_for("Let It Be (Remastered 2009) - Beatles.mp3")
            .unwrap();
        assert_eq!(update.artist, "Beatles");
        assert_eq!(update.title, "Let It Be");
    }

    #[test]
    fn test_artist_first_order() {
        let out = tempdir().unwrap();
        let scratch = scratch_in(out.path());
        fs::write(scratch.path().join("id1.mp3"), b"audio").unwrap();

        let reconciler = Reconciler::new(out.path(), AudioCodec::Mp3)
            .with_name_order(NameOrder::ArtistFirst)
            .without_tags();
        let result = reconciler.reconcile_item("id1", &song("Imagine", "John Lennon"), scratch.path());

        assert_eq!(
            result.final_path,
            Some(out.path().join("John Lennon - Imagine.mp3"))
        );
        assert!(!result.tags_written);
        assert_eq!(result.warning, None);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let out = tempdir().unwrap();
        let scratch = scratch_in(out.path());
        let writer = RecordingTagWriter::default();
        let reconciler = Reconciler::new(out.path(), AudioCodec::Mp3).with_tag_writer(Some(&writer));

        let result = reconciler.reconcile_item("gone", &song("A", "B"), scratch.path());

        assert_eq!(result.warning.as_deref(), Some("not found"));
        assert!(!result.is_saved());
        assert!(writer.writes.lock().unwrap().is_empty());
    }

    #[test]
    fn test_looks_for_codec_extension() {
        let out = tempdir().unwrap();
        let scratch = scratch_in(out.path());
        fs::write(scratch.path().join("id1.mp3"), b"audio").unwrap();

        let reconciler = Reconciler::new(out.path(), AudioCodec::Opus).without_tags();
        let result = reconciler.reconcile_item("id1", &song("A", "B"), scratch.path());
        assert_eq!(result.warning.as_deref(), Some("not found"));
    }

    #[test]
    fn test_tag_failure_keeps_file() {
        let out = tempdir().unwrap();
        let scratch = scratch_in(out.path());
        fs::write(scratch.path().join("id1.mp3"), b"audio").unwrap();

        let reconciler =
            Reconciler::new(out.path(), AudioCodec::Mp3).with_tag_writer(Some(&FailingTagWriter));
        let result = reconciler.reconcile_item("id1", &song("A", "B"), scratch.path());

        assert!(result.is_saved());
        assert!(!result.tags_written);
        assert!(result.warning.unwrap().contains("corrupt header"));
        assert!(out.path().join("A - B.mp3").exists());
    }

    #[test]
    fn test_missing_tag_writer_is_warning() {
        let out = tempdir().unwrap();
        let scratch = scratch_in(out.path());
        fs::write(scratch.path().join("id1.mp3"), b"audio").unwrap();

        let reconciler = Reconciler::new(out.path(), AudioCodec::Mp3).with_tag_writer(None);
        let result = reconciler.reconcile_item("id1", &song("A", "B"), scratch.path());

        assert!(result.is_saved());
        assert!(result.warning.unwrap().contains("no tag writer"));
    }

    #[test]
    fn test_empty_sanitized_name_uses_identifier() {
        let out = tempdir().unwrap();
        let scratch = scratch_in(out.path());
        fs::write(scratch.path().join("abc123.mp3"), b"audio").unwrap();

        let reconciler = Reconciler::new(out.path(), AudioCodec::Mp3).without_tags();
        let result = reconciler.reconcile_item("abc123", &song("???", "Artist"), scratch.path());

        assert_eq!(
            result.final_path,
            Some(out.path().join("abc123 - Artist.mp3"))
        );
        assert!(result.warning.unwrap().contains("no usable filename characters"));
    }

    #[test]
    fn test_overwrites_existing_file() {
        let out = tempdir().unwrap();
        let scratch = scratch_in(out.path());
        fs::write(out.path().join("A - B.mp3"), b"old").unwrap();
        fs::write(scratch.path().join("id1.mp3"), b"new").unwrap();

        let reconciler = Reconciler::new(out.path(), AudioCodec::Mp3).without_tags();
        let result = reconciler.reconcile_item("id1", &song("A", "B"), scratch.path());

        assert!(result.is_saved());
        assert_eq!(fs::read(out.path().join("A - B.mp3")).unwrap(), b"new");
    }

    #[test]
    fn test_cleanup_after_partial_failure() {
        let out = tempdir().unwrap();
        let scratch = scratch_in(out.path());
        let scratch_path = scratch.path().to_path_buf();
        fs::write(scratch_path.join("id1.mp3"), b"audio").unwrap();
        fs::write(scratch_path.join("id1.info.json"), b"{}").unwrap();
        fs::write(scratch_path.join("id1.webp"), b"thumb").unwrap();
        fs::write(scratch_path.join("id3.mp3"), b"audio").unwrap();

        let observer = RecordingObserver::default();
        let reconciler = Reconciler::new(out.path(), AudioCodec::Mp3).without_tags();
        let map = map_of(&[
            ("id1", song("One", "X")),
            ("id2", song("Two", "Y")),
            ("id3", song("Three", "Z")),
        ]);
        let results = reconciler.reconcile(&map, scratch, Some(&observer));

        let saved: Vec<_> = results.iter().map(|r| r.is_saved()).collect();
        assert_eq!(saved, vec![true, false, true]);
        assert!(!scratch_path.exists());
        assert_eq!(
            observer.events(),
            vec!["reconciled One", "reconciled Two", "reconciled Three"]
        );

        // Only the final files remain
        let mut names: Vec<_> = fs::read_dir(out.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        assert_eq!(names, vec!["One - X.mp3", "Three - Z.mp3"]);
    }

    #[test]
    fn test_move_file_moves() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("source.mp3");
        let destination = dir.path().join("dest.mp3");
        fs::write(&source, b"fake mp3 content").unwrap();

        move_file(&source, &destination).unwrap();

        assert!(!source.exists());
        assert_eq!(fs::read_to_string(&destination).unwrap(), "fake mp3 content");
    }

    #[test]
    fn test_move_file_missing_source_errors() {
        let dir = tempdir().unwrap();
        let result = move_file(&dir.path().join("nope.mp3"), &dir.path().join("dest.mp3"));
        assert!(result.is_err());
    }
}
