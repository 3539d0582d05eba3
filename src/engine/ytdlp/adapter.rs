//! Adapter layer: Convert yt-dlp output to domain models
//!
//! This is the ONLY place where yt-dlp DTOs and stderr text are interpreted.

use super::dto;
use crate::engine::domain::{EngineError, SearchCandidate};
use crate::model::watch_url;

/// Parse `-J` search output into candidates, preserving engine order.
pub fn to_candidates(json: &str) -> Result<Vec<SearchCandidate>, EngineError> {
    let response: dto::SearchResponse =
        serde_json::from_str(json).map_err(|e| EngineError::Parse(e.to_string()))?;

    Ok(response.entries.into_iter().map(to_candidate).collect())
}

fn to_candidate(entry: dto::Entry) -> SearchCandidate {
    let id = entry.id.unwrap_or_default();
    let url = match entry.url {
        Some(url) if !url.is_empty() => url,
        _ if !id.is_empty() => watch_url(&id),
        _ => String::new(),
    };
    SearchCandidate {
        id,
        url,
        title: entry.title.unwrap_or_default(),
    }
}

/// Classify a failed run by its stderr.
pub fn classify_failure(stderr: &str) -> EngineError {
    let lower = stderr.to_lowercase();
    let summary = last_error_line(stderr);

    if lower.contains("http error 429") || lower.contains("too many requests") {
        EngineError::RateLimited
    } else if lower.contains("unable to download")
        || lower.contains("getaddrinfo")
        || lower.contains("timed out")
        || lower.contains("connection")
    {
        EngineError::Network(summary)
    } else {
        EngineError::Failed(summary)
    }
}

/// Most useful line of stderr: the last `ERROR:` line, else the last non-empty one.
pub fn last_error_line(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    lines
        .iter()
        .rev()
        .find(|l| l.starts_with("ERROR:"))
        .or_else(|| lines.last())
        .map(|l| l.to_string())
        .unwrap_or_else(|| "no error output".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_candidates_keeps_order() {
        let json = r#"{"entries": [
            {"id": "first", "url": "https://www.youtube.com/watch?v=first", "title": "One"},
            {"id": "second", "title": "Two"}
        ]}"#;

        let candidates = to_candidates(json).unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].id, "first");
        assert_eq!(candidates[0].title, "One");
        // Missing url is rebuilt from the id
        assert_eq!(candidates[1].url, "https://www.youtube.com/watch?v=second");
    }

    #[test]
    fn test_to_candidates_missing_id() {
        let candidates = to_candidates(r#"{"entries": [{"title": "Orphan"}]}"#).unwrap();
        assert_eq!(candidates[0].id, "");
        assert_eq!(candidates[0].url, "");
    }

    #[test]
    fn test_to_candidates_invalid_json() {
        let result = to_candidates("WARNING: not json");
        assert!(matches!(result, Err(EngineError::Parse(_))));
    }

    #[test]
    fn test_classify_rate_limit() {
        let err = classify_failure("ERROR: [youtube] abc: HTTP Error 429: Too Many Requests");
        assert!(matches!(err, EngineError::RateLimited));
    }

    #[test]
    fn test_classify_network() {
        let err = classify_failure("ERROR: Unable to download webpage: <urlopen error timed out>");
        assert!(matches!(err, EngineError::Network(_)));
    }

    #[test]
    fn test_classify_generic_failure() {
        let err = classify_failure("WARNING: something\nERROR: Video unavailable\n");
        match err {
            EngineError::Failed(msg) => assert_eq!(msg, "ERROR: Video unavailable"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_last_error_line_fallbacks() {
        assert_eq!(last_error_line("first\nsecond\n"), "second");
        assert_eq!(last_error_line(""), "no error output");
    }
}
