//! Resolution: match each descriptor to exactly one remote source.
//!
//! One search per descriptor, top result only. Searches run strictly one
//! after another with a fixed pause after every attempt, matched or not, to
//! stay under the remote engine's abuse limits. A failed search only marks
//! its own descriptor unmatched.

use std::time::Duration;

use crate::engine::{SearchEngine, SearchQuery};
use crate::model::{ResolvedSource, SongDescriptor, UnresolvedEntry, watch_url};
use crate::progress::{ProgressEvent, ProgressObserver, notify};

/// Default pause after each search request.
pub const DEFAULT_SEARCH_DELAY: Duration = Duration::from_secs(2);

/// Outcome of resolving one descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    Matched(ResolvedSource),
    Unmatched(UnresolvedEntry),
}

/// Outcome of resolving a batch, both halves in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub resolved: Vec<ResolvedSource>,
    pub unresolved: Vec<UnresolvedEntry>,
}

impl Resolution {
    pub fn total(&self) -> usize {
        self.resolved.len() + self.unresolved.len()
    }
}

/// Sequential, throttled resolver.
pub struct Resolver<'a> {
    engine: &'a dyn SearchEngine,
    delay: Duration,
    query_suffix: String,
    observer: Option<&'a dyn ProgressObserver>,
}

impl<'a> Resolver<'a> {
    pub fn new(engine: &'a dyn SearchEngine) -> Self {
        Self {
            engine,
            delay: DEFAULT_SEARCH_DELAY,
            query_suffix: "audio".to_string(),
            observer: None,
        }
    }

    /// Pause inserted after every search attempt.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Qualifier appended to every query (empty for none).
    pub fn with_query_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.query_suffix = suffix.into();
        self
    }

    pub fn with_observer(mut self, observer: &'a dyn ProgressObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Build the search text for a descriptor.
    pub fn query_for(&self, descriptor: &SongDescriptor) -> String {
        let suffix = self.query_suffix.trim();
        if suffix.is_empty() {
            format!("{} {}", descriptor.title(), descriptor.artist())
        } else {
            format!("{} {} {}", descriptor.title(), descriptor.artist(), suffix)
        }
    }

    /// Resolve one descriptor with exactly one search request.
    ///
    /// Never fails: engine errors become an [`UnresolvedEntry`].
    pub async fn resolve(&self, descriptor: &SongDescriptor) -> Resolved {
        let query = SearchQuery::top_audio(self.query_for(descriptor));
        tracing::debug!(target: "song_fetcher::resolver", query = %query.text, "Searching");

        let unmatched = |reason: String| {
            Resolved::Unmatched(UnresolvedEntry {
                descriptor: descriptor.clone(),
                reason,
            })
        };

        match self.engine.search(&query).await {
            Ok(candidates) => match candidates.into_iter().next() {
                Some(candidate) if !candidate.id.trim().is_empty() => {
                    let id = candidate.id.trim();
                    tracing::debug!(
                        target: "song_fetcher::resolver",
                        id,
                        url = %candidate.url,
                        "Top result: {}",
                        candidate.title
                    );
                    Resolved::Matched(ResolvedSource {
                        descriptor: descriptor.clone(),
                        remote_url: watch_url(id),
                        remote_title: candidate.title,
                    })
                }
                Some(_) => unmatched("top result has no identifier".to_string()),
                None => unmatched("no search results".to_string()),
            },
            Err(e) => {
                tracing::warn!(target: "song_fetcher::resolver", error = %e, "Search failed for {}", descriptor);
                unmatched(format!("search failed: {e}"))
            }
        }
    }

    /// Resolve a batch sequentially, pausing after every attempt.
    pub async fn resolve_all(&self, descriptors: &[SongDescriptor]) -> Resolution {
        let total = descriptors.len();
        let mut resolution = Resolution::default();

        tracing::info!(target: "song_fetcher::resolver", total, "Searching for songs");

        for (i, descriptor) in descriptors.iter().enumerate() {
            notify(
                self.observer,
                ProgressEvent::Searching {
                    index: i + 1,
                    total,
                    descriptor,
                },
            );

            match self.resolve(descriptor).await {
                Resolved::Matched(source) => {
                    notify(self.observer, ProgressEvent::Matched(&source));
                    resolution.resolved.push(source);
                }
                Resolved::Unmatched(entry) => {
                    notify(self.observer, ProgressEvent::Unmatched(&entry));
                    resolution.unresolved.push(entry);
                }
            }

            // Rate limiting
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
        }

        tracing::info!(
            target: "song_fetcher::resolver",
            matched = resolution.resolved.len(),
            unmatched = resolution.unresolved.len(),
            "Search phase complete"
        );
        resolution
    }
}
