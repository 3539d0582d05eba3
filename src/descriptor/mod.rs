//! Descriptor parsing.
//!
//! Turns raw user input into [`SongDescriptor`]s. Two input shapes are
//! accepted:
//! - line-oriented text (files), each line `Title:Artist` or `Title - Artist`
//! - an inline comma-separated list using only the `Title:Artist` form
//!
//! Malformed entries never fail the batch; they come back as [`ParseError`]s
//! next to the descriptors that did parse.

use std::path::Path;

use crate::error::{Error, ResultExt};
use crate::model::SongDescriptor;

/// Separator tried when a line has no `:`.
const DASH_SEPARATOR: &str = " - ";

/// An input entry that could not be turned into a descriptor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{location}: expected 'Title:Artist' or 'Title - Artist', got '{input}'")]
pub struct ParseError {
    /// Human-readable position ("line 3", "entry 2")
    pub location: String,
    pub input: String,
}

/// Descriptors and errors from one parse, both in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedList {
    pub descriptors: Vec<SongDescriptor>,
    pub errors: Vec<ParseError>,
}

impl ParsedList {
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

/// Parse a single line in either `Title:Artist` or `Title - Artist` form.
///
/// Returns `None` for blank lines and for lines without a usable separator.
/// Only the first separator occurrence splits, so the artist half may
/// contain further colons or dashes.
pub fn parse_line(line: &str) -> Option<SongDescriptor> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let (title, artist) = line
        .split_once(':')
        .or_else(|| line.split_once(DASH_SEPARATOR))?;

    SongDescriptor::new(title, artist)
}

/// Parse line-oriented text. Blank lines are skipped silently.
pub fn parse_lines(text: &str) -> ParsedList {
    let mut parsed = ParsedList::default();

    for (index, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_line(line) {
            Some(descriptor) => parsed.descriptors.push(descriptor),
            None => {
                tracing::warn!(line = index + 1, input = line.trim(), "Skipping unparsable line");
                parsed.errors.push(ParseError {
                    location: format!("line {}", index + 1),
                    input: line.trim().to_string(),
                });
            }
        }
    }

    parsed
}

/// Read and parse a song list file (one descriptor per line).
pub fn parse_file(path: &Path) -> Result<ParsedList, Error> {
    if !path.exists() {
        return Err(Error::not_found(path));
    }
    let text = std::fs::read_to_string(path)
        .with_context(format!("Failed to read song list {}", path.display()))?;
    Ok(parse_lines(&text))
}

/// Parse an inline comma-separated list of `Title:Artist` entries.
///
/// The dash form is not accepted here, matching the inline input contract.
pub fn parse_comma_list(s: &str) -> ParsedList {
    let mut parsed = ParsedList::default();

    for (index, segment) in s.split(',').enumerate() {
        if segment.trim().is_empty() {
            continue;
        }
        let descriptor = segment
            .split_once(':')
            .and_then(|(title, artist)| SongDescriptor::new(title, artist));

        match descriptor {
            Some(descriptor) => parsed.descriptors.push(descriptor),
            None => {
                tracing::warn!(
                    entry = index + 1,
                    input = segment.trim(),
                    "Invalid song format, expected 'Title:Artist'"
                );
                parsed.errors.push(ParseError {
                    location: format!("entry {}", index + 1),
                    input: segment.trim().to_string(),
                });
            }
        }
    }

    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn song(title: &str, artist: &str) -> SongDescriptor {
        SongDescriptor::new(title, artist).unwrap()
    }

    #[test]
    fn test_parse_line_colon_form() {
        assert_eq!(
            parse_line("Imagine:John Lennon"),
            Some(song("Imagine", "John Lennon"))
        );
    }

    #[test]
    fn test_parse_line_dash_form() {
        assert_eq!(
            parse_line("Imagine - John Lennon"),
            Some(song("Imagine", "John Lennon"))
        );
    }

    #[test]
    fn test_parse_line_rejects_blank_and_garbage() {
        assert_eq!(parse_line(""), None);
        assert_eq!(parse_line("   \t"), None);
        assert_eq!(parse_line("garbage-no-separator"), None);
    }

    #[test]
    fn test_parse_line_colon_takes_precedence() {
        // Colon wins even when a dash separator appears first
        assert_eq!(
            parse_line("Song - Part 2:Artist"),
            Some(song("Song - Part 2", "Artist"))
        );
    }

    #[test]
    fn test_parse_line_splits_on_first_separator_only() {
        assert_eq!(
            parse_line("Title:Artist: The Band"),
            Some(song("Title", "Artist: The Band"))
        );
        assert_eq!(
            parse_line("Title - Artist - Remix"),
            Some(song("Title", "Artist - Remix"))
        );
    }

    #[test]
    fn test_parse_line_trims_halves() {
        assert_eq!(
            parse_line("   Let It Be  :  Beatles   "),
            Some(song("Let It Be", "Beatles"))
        );
    }

    #[test]
    fn test_parse_line_empty_half_is_unparsable() {
        assert_eq!(parse_line(":Artist"), None);
        assert_eq!(parse_line("Title:"), None);
        assert_eq!(parse_line("Title:   "), None);
    }

    #[test]
    fn test_parse_lines_skips_blanks_and_reports_garbage() {
        let text = "Imagine:John Lennon\n\n   \nnot a song\nLet It Be - Beatles\n";
        let parsed = parse_lines(text);

        assert_eq!(
            parsed.descriptors,
            vec![song("Imagine", "John Lennon"), song("Let It Be", "Beatles")]
        );
        assert_eq!(parsed.errors.len(), 1);
        assert_eq!(parsed.errors[0].location, "line 4");
        assert_eq!(parsed.errors[0].input, "not a song");
    }

    #[test]
    fn test_parse_comma_list() {
        let parsed = parse_comma_list("Song1:Artist1, Song2 : Artist2");
        assert_eq!(
            parsed.descriptors,
            vec![song("Song1", "Artist1"), song("Song2", "Artist2")]
        );
        assert!(parsed.errors.is_empty());
    }

    #[test]
    fn test_parse_comma_list_rejects_dash_form() {
        let parsed = parse_comma_list("Good:One,Bad - Form,Also:Good");
        assert_eq!(
            parsed.descriptors,
            vec![song("Good", "One"), song("Also", "Good")]
        );
        assert_eq!(parsed.errors.len(), 1);
        assert_eq!(parsed.errors[0].location, "entry 2");
        assert!(parsed.errors[0].to_string().contains("Bad - Form"));
    }

    #[test]
    fn test_parse_comma_list_ignores_empty_segments() {
        let parsed = parse_comma_list("A:B,,  ,C:D,");
        assert_eq!(parsed.descriptors.len(), 2);
        assert!(parsed.errors.is_empty());
    }

    #[test]
    fn test_parse_file_reads_lines() {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        writeln!(file, "Imagine:John Lennon").unwrap();
        writeln!(file, "Let It Be - Beatles").unwrap();

        let parsed = parse_file(file.path()).unwrap();
        assert_eq!(parsed.descriptors.len(), 2);
        assert!(parsed.errors.is_empty());
    }

    #[test]
    fn test_parse_file_missing_returns_not_found() {
        let result = parse_file(Path::new("/nonexistent/songs.txt"));
        assert!(matches!(result, Err(Error::NotFound(_))));
    }
}

/// Property-based tests using proptest
#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Field text without either separator
    fn field() -> impl Strategy<Value = String> {
        prop::string::string_regex("[A-Za-z0-9'&.()]{1,12}( [A-Za-z0-9'&.()]{1,12}){0,3}").unwrap()
    }

    proptest! {
        /// Both canonical forms parse to the same descriptor
        #[test]
        fn canonical_forms_agree(title in field(), artist in field()) {
            let colon = parse_line(&format!("{title}:{artist}"));
            let dash = parse_line(&format!("{title} - {artist}"));
            prop_assert_eq!(&colon, &dash);
            let descriptor = colon.unwrap();
            prop_assert_eq!(descriptor.title(), title.as_str());
            prop_assert_eq!(descriptor.artist(), artist.as_str());
        }

        /// Every non-blank line is either a descriptor or an error
        #[test]
        fn parse_lines_accounts_for_every_line(lines in prop::collection::vec("[A-Za-z :-]{1,20}", 0..10)) {
            let text = lines.join("\n");
            let parsed = parse_lines(&text);
            let non_blank = lines.iter().filter(|l| !l.trim().is_empty()).count();
            prop_assert_eq!(parsed.descriptors.len() + parsed.errors.len(), non_blank);
        }
    }
}
