//! Acquisition: one bulk download for every resolved source.
//!
//! The coordinator maps each remote identifier back to the descriptor it
//! came from, asks the engine to download all URLs in a single call into a
//! private scratch directory, and then hands the map and the directory to
//! the [`Reconciler`]. Items that fail inside the engine simply never show up
//! on disk; only an engine that cannot run at all aborts the batch.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::config::DownloadConfig;
use crate::engine::{AcquisitionEngine, EngineError};
use crate::model::{AcquisitionMap, ReconciliationResult, ResolvedSource, extract_identifier};
use crate::progress::{ProgressEvent, ProgressObserver, notify};
use crate::reconciler::Reconciler;

/// Prefix of the scratch directory created inside the output directory.
pub const SCRATCH_PREFIX: &str = "_temp_dl";

/// Batch-level acquisition failures
#[derive(Debug, thiserror::Error)]
pub enum AcquisitionError {
    /// The bulk download call itself failed
    #[error("Bulk download failed: {0}")]
    Fatal(#[from] EngineError),

    /// Output or scratch directory could not be created
    #[error("Failed to prepare {path:?}: {source}")]
    Scratch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Drives one download batch and its reconciliation.
pub struct AcquisitionCoordinator<'a> {
    engine: &'a dyn AcquisitionEngine,
    download: DownloadConfig,
    reconciler: Reconciler<'a>,
    observer: Option<&'a dyn ProgressObserver>,
}

impl<'a> AcquisitionCoordinator<'a> {
    /// The reconciler's codec should match `download.codec`.
    pub fn new(
        engine: &'a dyn AcquisitionEngine,
        download: DownloadConfig,
        reconciler: Reconciler<'a>,
    ) -> Self {
        Self {
            engine,
            download,
            reconciler,
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: &'a dyn ProgressObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Build the identifier → descriptor map for `sources`.
    ///
    /// Sources that cannot be downloaded come back as failed results, each
    /// tagged with its index in `sources`: a URL that carries no identifier,
    /// or a descriptor displaced because a later source shares its
    /// identifier (last write wins).
    pub fn build_map(
        sources: &[ResolvedSource],
    ) -> (AcquisitionMap, Vec<(usize, ReconciliationResult)>) {
        let mut map = AcquisitionMap::new();
        let mut rejected = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for (index, source) in sources.iter().enumerate() {
            let Some(id) = extract_identifier(&source.remote_url) else {
                tracing::warn!(
                    target: "song_fetcher::acquisition",
                    url = %source.remote_url,
                    "No remote identifier for {}",
                    source.descriptor
                );
                rejected.push((
                    index,
                    ReconciliationResult::rejected(
                        source.descriptor.clone(),
                        format!("no remote identifier in {}", source.remote_url),
                    ),
                ));
                continue;
            };

            let displaced_at = positions.insert(id.clone(), index);
            if let Some(displaced) =
                map.insert(id.clone(), source.remote_url.clone(), source.descriptor.clone())
            {
                tracing::warn!(
                    target: "song_fetcher::acquisition",
                    identifier = %id,
                    "{} and {} resolved to the same source; keeping the latter",
                    displaced,
                    source.descriptor
                );
                rejected.push((
                    displaced_at.unwrap_or(index),
                    ReconciliationResult::rejected(
                        displaced,
                        format!("same remote source as {}", source.descriptor),
                    ),
                ));
            }
        }

        (map, rejected)
    }

    /// Index in `sources` of the descriptor each map entry now holds.
    fn kept_positions(map: &AcquisitionMap, sources: &[ResolvedSource]) -> Vec<usize> {
        let mut last: HashMap<String, usize> = HashMap::new();
        for (index, source) in sources.iter().enumerate() {
            if let Some(id) = extract_identifier(&source.remote_url) {
                last.insert(id, index);
            }
        }
        map.iter()
            .map(|entry| last.get(&entry.identifier).copied().unwrap_or(usize::MAX))
            .collect()
    }

    /// Download every source and reconcile the results.
    ///
    /// An empty `sources` returns immediately without touching the
    /// filesystem. On a fatal engine error nothing is reconciled and the
    /// scratch directory is removed.
    pub async fn acquire(
        &self,
        sources: &[ResolvedSource],
    ) -> Result<Vec<ReconciliationResult>, AcquisitionError> {
        if sources.is_empty() {
            return Ok(Vec::new());
        }

        let (map, rejected) = Self::build_map(sources);
        if map.is_empty() {
            return Ok(in_source_order(Vec::new(), rejected));
        }

        let output_dir = self.reconciler.output_dir();
        std::fs::create_dir_all(output_dir).map_err(|source| AcquisitionError::Scratch {
            path: output_dir.to_path_buf(),
            source,
        })?;
        let scratch = tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .tempdir_in(output_dir)
            .map_err(|source| AcquisitionError::Scratch {
                path: output_dir.to_path_buf(),
                source,
            })?;

        let options = self.download.options_for(scratch.path());
        let urls = map.urls();

        tracing::info!(
            target: "song_fetcher::acquisition",
            count = urls.len(),
            codec = %options.codec,
            "Downloading"
        );
        notify(self.observer, ProgressEvent::DownloadStarted { count: urls.len() });

        if let Err(e) = self.engine.download(&urls, &options).await {
            notify(self.observer, ProgressEvent::DownloadFinished { ok: false });
            tracing::error!(target: "song_fetcher::acquisition", "Bulk download failed: {}", e);
            if let Err(cleanup) = scratch.close() {
                tracing::warn!(target: "song_fetcher::acquisition", "Failed to remove scratch directory: {}", cleanup);
            }
            return Err(AcquisitionError::Fatal(e));
        }
        notify(self.observer, ProgressEvent::DownloadFinished { ok: true });

        let positions = Self::kept_positions(&map, sources);
        let reconciled = self.reconciler.reconcile(&map, scratch, self.observer);
        let reconciled = positions.into_iter().zip(reconciled).collect();
        Ok(in_source_order(reconciled, rejected))
    }
}

/// Merge reconciled and rejected results back into input order.
fn in_source_order(
    mut results: Vec<(usize, ReconciliationResult)>,
    rejected: Vec<(usize, ReconciliationResult)>,
) -> Vec<ReconciliationResult> {
    results.extend(rejected);
    results.sort_by_key(|(index, _)| *index);
    results.into_iter().map(|(_, result)| result).collect()
}
