//! # Import Pipeline
//!
//! Turns a listening-history export into a populated playlist:
//!
//! ```text
//! Start → RecordsLoaded → Resolved → PlaylistCreated → TracksUploaded → CoverAttempted → Done
//!   └──────────────┴─────────────┴──────────── (fatal) ──→ Failed
//!                   └── cancelled ──→ Aborted
//! ```
//!
//! ## Components
//!
//! - [`source`] - ordered title/artist records from a CSV export
//! - [`resolver`] - one search per record, first hit or nothing
//! - [`uploader`] - ordered add-items calls of at most [`uploader::LIMIT`] ids
//! - [`provisioner`] - playlist creation and cover image
//! - [`retry`] - bounded backoff around single transient failures
//! - [`report`] - the [`ImportReport`] and the [`ProgressSink`] seam
//!
//! ## Failure handling
//!
//! Loading the source, looking up the current user and creating the playlist are
//! fatal: the run stops in [`RunState::Failed`] and returns the partial report with
//! the error. A failed search, chunk or cover upload is written to the report and
//! the run continues. A partially filled playlist is left as it is.

pub mod provisioner;
pub mod report;
pub mod resolver;
pub mod retry;
pub mod source;
pub mod uploader;

use std::{path::PathBuf, pin::pin};

use futures::StreamExt;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::{
    catalog::CatalogService,
    error::{ImportError, SourceLoadError},
    types::{ResolvedTrack, SourceRecord},
};

pub use provisioner::PlaylistProvisioner;
pub use report::{ImportReport, ProgressSink, ReportError, RunState, SilentSink, Stage};
pub use resolver::TrackResolver;
pub use retry::RetryPolicy;
pub use source::{CsvSource, RecordSource};
pub use uploader::{BatchUploader, UploadOutcome};

pub const DEFAULT_PLAYLIST_NAME: &str = "Shazam Songs";
pub const DEFAULT_PLAYLIST_DESCRIPTION: &str = "Playlist containing all tagged songs from Shazam";
pub const DEFAULT_CONCURRENCY: usize = 4;
/// Spotify only accepts JPEG covers, at most 256 KB once encoded.
pub const DEFAULT_COVER_IMAGE: &str = "logo.jpg";

#[derive(Debug, Clone)]
pub struct ImportOptions {
    pub playlist_name: String,
    pub playlist_description: String,
    /// `None` skips the cover step without recording an error.
    pub cover_image: Option<PathBuf>,
    /// Searches in flight at once. `1` resolves strictly one after another.
    pub concurrency: usize,
    pub retry: RetryPolicy,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            playlist_name: DEFAULT_PLAYLIST_NAME.to_string(),
            playlist_description: DEFAULT_PLAYLIST_DESCRIPTION.to_string(),
            cover_image: Some(PathBuf::from(DEFAULT_COVER_IMAGE)),
            concurrency: DEFAULT_CONCURRENCY,
            retry: RetryPolicy::default(),
        }
    }
}

/// A run that ended in `Failed` or `Aborted`, with everything recorded up to there.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct ImportFailure {
    pub report: ImportReport,
    #[source]
    pub error: ImportError,
}

impl ImportFailure {
    /// A run that never got past loading its records. No remote call was made.
    pub fn source_load(error: SourceLoadError) -> Self {
        let error = ImportError::SourceLoad(error);
        let mut report = ImportReport::default();
        report.record_error(Stage::Source, error.to_string());
        report.state = RunState::Failed;
        Self { report, error }
    }
}

/// Drives one import from source records to a finished playlist.
pub struct ImportOrchestrator<'a> {
    catalog: &'a dyn CatalogService,
    sink: &'a dyn ProgressSink,
    options: ImportOptions,
    cancel: CancellationToken,
}

impl<'a> ImportOrchestrator<'a> {
    pub fn new(
        catalog: &'a dyn CatalogService,
        sink: &'a dyn ProgressSink,
        options: ImportOptions,
    ) -> Self {
        Self {
            catalog,
            sink,
            options,
            cancel: CancellationToken::new(),
        }
    }

    /// Uses `cancel` to stop the run between searches or between chunks.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub async fn run(&self, source: &dyn RecordSource) -> Result<ImportReport, ImportFailure> {
        let mut report = ImportReport::default();
        let retry = &self.options.retry;
        let provisioner = PlaylistProvisioner::new(self.catalog, self.sink, retry, &self.cancel);

        // Start → RecordsLoaded
        self.sink.stage_started(Stage::Source, 1);
        let records = match source.load().await {
            Ok(records) => records,
            Err(e) => {
                let failure = ImportFailure::source_load(e);
                self.sink.warn(Stage::Source, &failure.error.to_string());
                return Err(failure);
            }
        };
        report.records = records.len();
        report.state = RunState::RecordsLoaded;
        self.sink.stage_finished(Stage::Source);
        self.sink.info(&format!("Loaded {} records.", report.records));

        // RecordsLoaded → Resolved
        let Some(resolved) = self.resolve_all(&records, &mut report).await else {
            return Err(self.abort(report, Stage::Resolve));
        };
        report.state = RunState::Resolved;
        self.sink.info(&format!(
            "Resolved {} of {} records ({} without match).",
            report.resolved, report.records, report.unresolved
        ));

        // Resolved → PlaylistCreated
        if self.cancel.is_cancelled() {
            return Err(self.abort(report, Stage::Identity));
        }
        let owner = match retry.run(&self.cancel, || self.catalog.current_user()).await {
            Ok(user) => user,
            Err(e) => return Err(self.fail(report, Stage::Identity, ImportError::Identity(e))),
        };
        let playlist = match provisioner
            .provision(
                &owner.id,
                &self.options.playlist_name,
                &self.options.playlist_description,
            )
            .await
        {
            Ok(playlist) => playlist,
            Err(e) => return Err(self.fail(report, Stage::Provision, e.into())),
        };
        report.playlist_id = Some(playlist.id.clone());
        report.state = RunState::PlaylistCreated;
        self.sink.info(&format!(
            "Created playlist `{}` ({}).",
            self.options.playlist_name, playlist.id
        ));

        // PlaylistCreated → TracksUploaded
        let catalog_ids: Vec<String> = resolved
            .into_iter()
            .filter_map(|track| track.catalog_id)
            .collect();
        let uploader = BatchUploader::new(self.catalog, self.sink, retry, &self.cancel);
        let outcome = uploader.upload(&playlist.id, &catalog_ids).await;
        report.tracks_added = outcome.added_count;
        report.batches = outcome.submitted_batches;
        report.failed_batches = outcome.failures.len();
        for failure in &outcome.failures {
            report.record_error(Stage::Upload, failure.to_string());
        }
        if outcome.cancelled {
            return Err(self.abort(report, Stage::Upload));
        }
        report.state = RunState::TracksUploaded;

        // TracksUploaded → CoverAttempted
        match &self.options.cover_image {
            Some(path) => match provisioner.try_attach_cover(&playlist.id, path).await {
                Ok(()) => {
                    report.cover_attached = true;
                    self.sink.info("Added thumbnail to the playlist.");
                }
                Err(e) => {
                    let message = format!("Failed to upload thumbnail: {}", e);
                    self.sink.warn(Stage::Cover, &message);
                    report.record_error(Stage::Cover, message);
                }
            },
            None => self.sink.info("No cover image configured, skipping thumbnail."),
        }
        report.state = RunState::CoverAttempted;
        self.sink.info(&format!(
            "Added {} of {} resolved tracks to `{}`.",
            report.tracks_added, report.resolved, self.options.playlist_name
        ));

        report.state = RunState::Done;
        Ok(report)
    }

    /// Resolves every record, keeping input order whatever order the searches
    /// complete in. `None` when cancelled before the last record.
    async fn resolve_all(
        &self,
        records: &[SourceRecord],
        report: &mut ImportReport,
    ) -> Option<Vec<ResolvedTrack>> {
        if self.cancel.is_cancelled() {
            return None;
        }

        let resolver = TrackResolver::new(self.catalog, &self.options.retry, &self.cancel);
        self.sink.stage_started(Stage::Resolve, records.len());

        let mut results = pin!(resolver.resolve_in_order(records, self.options.concurrency));

        let mut resolved = Vec::with_capacity(records.len());
        while let Some((record, result)) = results.next().await {
            let catalog_id = match result {
                Ok(Some(id)) => {
                    report.resolved += 1;
                    Some(id)
                }
                Ok(None) => {
                    report.unresolved += 1;
                    None
                }
                Err(_) if self.cancel.is_cancelled() => return None,
                Err(e) => {
                    report.unresolved += 1;
                    self.sink.warn(Stage::Resolve, &e.to_string());
                    report.record_error(Stage::Resolve, e.to_string());
                    None
                }
            };
            resolved.push(ResolvedTrack {
                record: record.clone(),
                catalog_id,
            });
            self.sink.advance(Stage::Resolve);

            if self.cancel.is_cancelled() && resolved.len() < records.len() {
                return None;
            }
        }

        self.sink.stage_finished(Stage::Resolve);
        Some(resolved)
    }

    fn fail(&self, mut report: ImportReport, stage: Stage, error: ImportError) -> ImportFailure {
        self.sink.warn(stage, &error.to_string());
        report.record_error(stage, error.to_string());
        report.state = RunState::Failed;
        ImportFailure { report, error }
    }

    fn abort(&self, mut report: ImportReport, stage: Stage) -> ImportFailure {
        let error = ImportError::Cancelled { stage };
        self.sink.warn(stage, &error.to_string());
        report.record_error(stage, error.to_string());
        report.state = RunState::Aborted;
        ImportFailure { report, error }
    }
}
