//! Trait definitions for the remote engines.
//!
//! These traits enable dependency injection and mocking for tests.
//! Production code uses [`YtDlp`](super::ytdlp::YtDlp), while tests
//! substitute the mocks below.

use async_trait::async_trait;

use super::domain::{DownloadOptions, EngineError, SearchCandidate, SearchQuery};

/// Remote search engine.
#[async_trait]
pub trait SearchEngine: Send + Sync {
    /// Run one query and return zero or more candidates, best first.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchCandidate>, EngineError>;
}

/// Remote acquisition (download + transcode) engine.
#[async_trait]
pub trait AcquisitionEngine: Send + Sync {
    /// Download all URLs in one call, writing files per `options.output_template`.
    ///
    /// Returns `Err` only when the engine as a whole cannot run. Items that
    /// fail individually are left out of the filesystem.
    async fn download(&self, urls: &[String], options: &DownloadOptions)
    -> Result<(), EngineError>;
}

// Implement traits for the real client

#[async_trait]
impl SearchEngine for super::ytdlp::YtDlp {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchCandidate>, EngineError> {
        self.search(query).await
    }
}

#[async_trait]
impl AcquisitionEngine for super::ytdlp::YtDlp {
    async fn download(
        &self,
        urls: &[String],
        options: &DownloadOptions,
    ) -> Result<(), EngineError> {
        self.download(urls, options).await
    }
}
