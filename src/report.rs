//! Run report: everything that happened to every input, in one place.
//!
//! Nothing a run does is silently dropped. The report lists parse errors,
//! unmatched descriptors with their reasons, saved files, per-item warnings,
//! and a fatal acquisition failure if there was one.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::descriptor::ParseError;
use crate::model::{ReconciliationResult, ResolvedSource, UnresolvedEntry};

/// Summary of one pipeline run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub started: DateTime<Utc>,
    pub finished: DateTime<Utc>,
    pub parse_errors: Vec<ParseError>,
    pub matched: Vec<ResolvedSource>,
    pub unresolved: Vec<UnresolvedEntry>,
    pub results: Vec<ReconciliationResult>,
    /// Set when the bulk download could not run at all
    pub acquisition_error: Option<String>,
}

impl RunReport {
    /// Empty report stamped with the current time.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            started: now,
            finished: now,
            parse_errors: Vec::new(),
            matched: Vec::new(),
            unresolved: Vec::new(),
            results: Vec::new(),
            acquisition_error: None,
        }
    }

    pub fn finish(&mut self) {
        self.finished = Utc::now();
    }

    /// Items that ended up as files in the output directory.
    pub fn saved_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_saved()).count()
    }

    /// Results carrying a warning.
    pub fn warnings(&self) -> impl Iterator<Item = &ReconciliationResult> {
        self.results.iter().filter(|r| r.warning.is_some())
    }

    /// Whether the run as a whole failed.
    ///
    /// Per-item failures don't count; only "nothing to do" and a fatal
    /// acquisition do.
    pub fn is_failure(&self) -> bool {
        self.attempted() == 0 || self.acquisition_error.is_some()
    }

    /// Descriptors that reached the search phase.
    pub fn attempted(&self) -> usize {
        self.matched.len() + self.unresolved.len()
    }
}

impl Default for RunReport {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Run Report ({})", self.started.to_rfc3339())?;
        writeln!(f, "==========")?;
        writeln!(
            f,
            "Matched {} of {} songs, saved {} files in {}s",
            self.matched.len(),
            self.attempted(),
            self.saved_count(),
            (self.finished - self.started).num_seconds()
        )?;

        if !self.parse_errors.is_empty() {
            writeln!(f, "\nSkipped input ({}):", self.parse_errors.len())?;
            for e in &self.parse_errors {
                writeln!(f, "  ✗ {}", e)?;
            }
        }

        if !self.unresolved.is_empty() {
            writeln!(f, "\nNot found ({}):", self.unresolved.len())?;
            for entry in &self.unresolved {
                writeln!(f, "  ✗ {}: {}", entry.descriptor, entry.reason)?;
            }
        }

        if let Some(ref e) = self.acquisition_error {
            writeln!(f, "\nDownload failed: {}", e)?;
        }

        let saved: Vec<_> = self.results.iter().filter(|r| r.is_saved()).collect();
        if !saved.is_empty() {
            writeln!(f, "\nSaved ({}):", saved.len())?;
            for r in saved {
                if let Some(ref path) = r.final_path {
                    writeln!(f, "  ✓ {}", path.display())?;
                }
            }
        }

        let warned: Vec<_> = self.warnings().collect();
        if !warned.is_empty() {
            writeln!(f, "\nWarnings ({}):", warned.len())?;
            for r in warned {
                if let Some(ref w) = r.warning {
                    writeln!(f, "  ⚠ {}: {}", r.descriptor, w)?;
                }
            }
        }

        Ok(())
    }
}
