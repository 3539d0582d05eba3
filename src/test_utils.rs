//! Test utilities and fixtures for song-fetcher tests.
//!
//! Common constructors for descriptors, resolved sources and configs, so
//! tests don't repeat the same boilerplate.
//!
//! # Example
//!
//! ```ignore
//! use crate::test_utils::{resolved, song};
//!
//! let source = resolved(song("Let It Be", "Beatles"), "QDYfEBY9NM4");
//! ```

use crate::config::{Config, DownloadConfig};
use crate::model::{ResolvedSource, SongDescriptor, watch_url};

/// Creates a descriptor, panicking on blank input.
pub fn song(title: &str, artist: &str) -> SongDescriptor {
    SongDescriptor::new(title, artist).expect("test descriptor must not be blank")
}

/// Creates a resolved source pointing at the watch URL for `id`.
///
/// The remote title is deliberately noisy, as real search results are.
pub fn resolved(descriptor: SongDescriptor, id: &str) -> ResolvedSource {
    ResolvedSource {
        remote_title: format!("{} - {} (Official Video)", descriptor.artist(), descriptor.title()),
        remote_url: watch_url(id),
        descriptor,
    }
}

/// Download settings without sidecar files.
pub fn test_download_config() -> DownloadConfig {
    DownloadConfig {
        write_thumbnail: false,
        write_info_json: false,
        ..DownloadConfig::default()
    }
}

/// Config with no search delay, writing into `output`.
pub fn test_config(output: &std::path::Path) -> Config {
    let mut config = Config::default();
    config.output.directory = output.to_path_buf();
    config.search.delay_secs = 0.0;
    config.download = test_download_config();
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::extract_identifier;

    #[test]
    fn test_resolved_url_carries_identifier() {
        let source = resolved(song("Imagine", "John Lennon"), "abc123");
        assert_eq!(extract_identifier(&source.remote_url).as_deref(), Some("abc123"));
        assert_eq!(source.descriptor.title(), "Imagine");
    }

    #[test]
    fn test_config_has_no_delay() {
        let config = test_config(std::path::Path::new("/tmp/out"));
        assert!(config.search.delay().is_zero());
        assert!(!config.download.write_info_json);
    }
}
