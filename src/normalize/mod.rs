//! Text normalization for filenames and tag titles.
//!
//! Two pure functions:
//! - [`sanitize_filename`] strips everything outside a small allow-list so a
//!   string can be used as a single path segment.
//! - [`clean_title`] removes promotional noise that remote engines attach to
//!   titles ("(Official Video)", "[HD]", "(2019 Remaster)", ...).

use once_cell::sync::Lazy;
use regex::Regex;

// ============================================================================
// REGEX PATTERNS
// ============================================================================

/// Anything outside word characters, `-`, `.`, `,`, parentheses, brackets, space.
static DISALLOWED_FILENAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\-.,() \[\]]+").unwrap());

/// Title noise patterns (applied in order, case-insensitive).
///
/// Bracketed patterns are greedy inside their delimiters, so
/// `"(Official Music Video HD)"` goes in one removal.
static TITLE_NOISE: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\(.*official.*video.*\)",
        r"\(.*lyrics? video.*\)",
        r"\[.*official.*video.*\]",
        r"\[.*lyrics? video.*\]",
        r"official music video",
        r"official video",
        r"lyrics? video",
        r"\(.*audio.*\)",
        r"\[.*audio.*\]",
        r"\(.*HD.*\)",
        r"\[.*HD.*\]",
        r"\(.*remaster.*\)",
        r"\[.*remaster.*\]",
        r"\(.*live.*\)",
        r"\[.*live.*\]",
        r"\(.*explicit.*\)",
        r"\[.*explicit.*\]",
        r"\(.*visuali[sz]er.*\)",
        r"\[.*visuali[sz]er.*\]",
        r"\(.*colou?r coded.*\)",
        r"\[.*colou?r coded.*\]",
        r"\(.*video.*\)",
        r"\[.*video.*\]",
        // Bracketed years: "(2019)", "[1997 Remaster]"
        r"\(.*\d{4}.*\)",
        r"\[.*\d{4}.*\]",
    ]
    .iter()
    .map(|p| Regex::new(&format!("(?i){p}")).unwrap())
    .collect()
});

/// Runs of hyphens/underscores become a single space.
static SEPARATOR_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[-_]+").unwrap());

static WHITESPACE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

// ============================================================================
// PUBLIC API
// ============================================================================

/// Strip characters that are unsafe in a filename, then trim.
///
/// The result never contains a path separator. It may be empty; callers
/// decide what an empty name means for them.
pub fn sanitize_filename(s: &str) -> String {
    DISALLOWED_FILENAME_CHARS.replace_all(s, "").trim().to_string()
}

/// Remove promotional noise from a title.
///
/// Idempotent: `clean_title(&clean_title(x)) == clean_title(x)`. A single
/// pass can expose new matches (collapsing `"official-video"` to
/// `"official video"`), so passes repeat until nothing changes. Each pass
/// either shortens the string or trades a `-`/`_` for a space, so the loop
/// terminates.
pub fn clean_title(raw: &str) -> String {
    let mut current = clean_title_pass(raw);
    loop {
        let next = clean_title_pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn clean_title_pass(title: &str) -> String {
    let mut t = title.to_string();
    for pattern in TITLE_NOISE.iter() {
        if pattern.is_match(&t) {
            t = pattern.replace_all(&t, "").into_owned();
        }
    }
    let t = SEPARATOR_RUNS.replace_all(&t, " ");
    let t = WHITESPACE_RUNS.replace_all(&t, " ");
    t.trim_matches([' ', '-', '_']).to_string()
}
