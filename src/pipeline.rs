//! End-to-end pipeline: parsed descriptors in, run report out.
//!
//! Wires the [`Resolver`], the [`AcquisitionCoordinator`] and the
//! [`Reconciler`] together from one [`Config`]. Collaborators are borrowed
//! trait objects so tests can run the whole flow against mocks.

use crate::acquisition::AcquisitionCoordinator;
use crate::config::Config;
use crate::descriptor::ParsedList;
use crate::engine::{AcquisitionEngine, SearchEngine};
use crate::model::SongDescriptor;
use crate::progress::ProgressObserver;
use crate::reconciler::Reconciler;
use crate::report::RunReport;
use crate::resolver::{Resolution, Resolver};
use crate::tags::TagWriter;

pub struct Pipeline<'a> {
    search: &'a dyn SearchEngine,
    acquisition: &'a dyn AcquisitionEngine,
    tag_writer: Option<&'a dyn TagWriter>,
    observer: Option<&'a dyn ProgressObserver>,
    config: Config,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        search: &'a dyn SearchEngine,
        acquisition: &'a dyn AcquisitionEngine,
        config: Config,
    ) -> Self {
        Self {
            search,
            acquisition,
            tag_writer: None,
            observer: None,
            config,
        }
    }

    pub fn with_tag_writer(mut self, writer: Option<&'a dyn TagWriter>) -> Self {
        self.tag_writer = writer;
        self
    }

    pub fn with_observer(mut self, observer: &'a dyn ProgressObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    fn resolver(&self) -> Resolver<'a> {
        let resolver = Resolver::new(self.search)
            .with_delay(self.config.search.delay())
            .with_query_suffix(self.config.search.query_suffix.clone());
        match self.observer {
            Some(observer) => resolver.with_observer(observer),
            None => resolver,
        }
    }

    fn coordinator(&self) -> AcquisitionCoordinator<'a> {
        let output = &self.config.output;
        let reconciler = Reconciler::new(&output.directory, self.config.download.codec)
            .with_name_order(output.name_order);
        let reconciler = if output.write_tags {
            reconciler.with_tag_writer(self.tag_writer)
        } else {
            reconciler.without_tags()
        };

        let coordinator =
            AcquisitionCoordinator::new(self.acquisition, self.config.download.clone(), reconciler);
        match self.observer {
            Some(observer) => coordinator.with_observer(observer),
            None => coordinator,
        }
    }

    /// Search phase only.
    pub async fn resolve(&self, descriptors: &[SongDescriptor]) -> Resolution {
        self.resolver().resolve_all(descriptors).await
    }

    /// Resolve, download and reconcile everything in `parsed`.
    pub async fn run(&self, parsed: ParsedList) -> RunReport {
        let mut report = RunReport::new();
        report.parse_errors = parsed.errors;

        if parsed.descriptors.is_empty() {
            tracing::warn!("No songs to fetch");
            report.finish();
            return report;
        }

        let resolution = self.resolve(&parsed.descriptors).await;

        match self.coordinator().acquire(&resolution.resolved).await {
            Ok(results) => report.results = results,
            Err(e) => {
                tracing::error!("Acquisition aborted: {}", e);
                report.acquisition_error = Some(e.to_string());
            }
        }

        report.matched = resolution.resolved;
        report.unresolved = resolution.unresolved;
        report.finish();
        report
    }
}
