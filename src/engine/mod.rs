//! Remote engines - search for sources and download their audio.
//!
//! # Architecture
//!
//! Same separation as any external integration:
//! - **Domain models** (`domain.rs`) - queries, candidates, download options
//! - **Traits** (`traits.rs`) - [`SearchEngine`] and [`AcquisitionEngine`],
//!   the seams the pipeline depends on
//! - **yt-dlp** (`ytdlp/`) - the production implementation: DTOs for its
//!   JSON output, an adapter, and a process client
//!
//! # Usage
//!
//! ```ignore
//! use engine::{SearchEngine, SearchQuery, YtDlp};
//!
//! let engine = YtDlp::default();
//! let hits = engine.search(&SearchQuery::top_audio("Let It Be Beatles audio")).await?;
//! ```

pub mod domain;
pub mod traits;
pub mod ytdlp;

pub use domain::{
    AudioCodec, BEST_AUDIO_FORMAT, DownloadOptions, EngineError, SearchCandidate, SearchQuery,
};
pub use traits::{AcquisitionEngine, SearchEngine};
pub use ytdlp::YtDlp;
