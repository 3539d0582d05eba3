//! Progress notification for long-running stages.
//!
//! The resolver and the acquisition coordinator accept an optional
//! [`ProgressObserver`]. Front ends implement it to stream progress to the
//! user.

use crate::model::{ReconciliationResult, ResolvedSource, SongDescriptor, UnresolvedEntry};

/// Something that happened during a run.
#[derive(Debug, Clone)]
pub enum ProgressEvent<'a> {
    /// About to search for item `index` (1-based) of `total`
    Searching {
        index: usize,
        total: usize,
        descriptor: &'a SongDescriptor,
    },
    Matched(&'a ResolvedSource),
    Unmatched(&'a UnresolvedEntry),
    /// Bulk download of `count` sources is starting
    DownloadStarted { count: usize },
    /// Bulk download returned (successfully or not)
    DownloadFinished { ok: bool },
    Reconciled(&'a ReconciliationResult),
}

/// Receives [`ProgressEvent`]s. Must not block for long.
pub trait ProgressObserver: Send + Sync {
    fn on_event(&self, event: &ProgressEvent<'_>);
}

/// Notify `observer` if there is one.
pub(crate) fn notify(observer: Option<&dyn ProgressObserver>, event: ProgressEvent<'_>) {
    if let Some(observer) = observer {
        observer.on_event(&event);
    }
}
