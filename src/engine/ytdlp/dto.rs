//! yt-dlp JSON Data Transfer Objects
//!
//! These types match what `yt-dlp -J --flat-playlist "ytsearchN:<query>"`
//! prints. DO NOT use these types outside the ytdlp module - convert to
//! domain types.
//!
//! Example output (trimmed):
//! ```json
//! {
//!   "_type": "playlist",
//!   "id": "let it be beatles audio",
//!   "entries": [{
//!     "_type": "url",
//!     "ie_key": "Youtube",
//!     "id": "QDYfEBY9NM4",
//!     "url": "https://www.youtube.com/watch?v=QDYfEBY9NM4",
//!     "title": "The Beatles - Let It Be (Official Video)",
//!     "duration": 243.0,
//!     "channel": "The Beatles"
//!   }]
//! }
//! ```

use serde::{Deserialize, Serialize};

/// Top-level search playlist
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub entries: Vec<Entry>,
}

/// A flat (unresolved) search entry
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Entry {
    pub id: Option<String>,
    pub url: Option<String>,
    pub title: Option<String>,
}
