use tokio_util::sync::CancellationToken;

use crate::{
    catalog::{ADD_ITEMS_LIMIT, CatalogService},
    error::BatchSubmitError,
    import::{
        report::{ProgressSink, Stage},
        retry::RetryPolicy,
    },
};

/// Ids per add-items call.
pub const LIMIT: usize = ADD_ITEMS_LIMIT;

/// Splits `ids` into consecutive chunks of `limit`; only the last may be shorter.
pub fn partition(ids: &[String], limit: usize) -> std::slice::Chunks<'_, String> {
    ids.chunks(limit.max(1))
}

#[derive(Debug, Default)]
pub struct UploadOutcome {
    pub added_count: usize,
    pub submitted_batches: usize,
    pub failures: Vec<BatchSubmitError>,
    /// Set when the run was cancelled before every chunk was submitted. A chunk
    /// cut short while waiting to retry counts neither as submitted nor as failed.
    pub cancelled: bool,
}

/// Adds catalog ids to a playlist one chunk at a time, in order.
///
/// A failed chunk is recorded and skipped; the following chunks are still sent.
pub struct BatchUploader<'a> {
    catalog: &'a dyn CatalogService,
    sink: &'a dyn ProgressSink,
    retry: &'a RetryPolicy,
    cancel: &'a CancellationToken,
    limit: usize,
}

impl<'a> BatchUploader<'a> {
    pub fn new(
        catalog: &'a dyn CatalogService,
        sink: &'a dyn ProgressSink,
        retry: &'a RetryPolicy,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            catalog,
            sink,
            retry,
            cancel,
            limit: LIMIT,
        }
    }

    pub async fn upload(&self, playlist_id: &str, catalog_ids: &[String]) -> UploadOutcome {
        let mut outcome = UploadOutcome::default();
        let chunks: Vec<&[String]> = partition(catalog_ids, self.limit).collect();
        self.sink.stage_started(Stage::Upload, chunks.len());

        for (index, chunk) in chunks.into_iter().enumerate() {
            if self.cancel.is_cancelled() {
                outcome.cancelled = true;
                break;
            }

            let result = self
                .retry
                .run(self.cancel, || self.catalog.add_items(playlist_id, chunk))
                .await;

            // A chunk interrupted while waiting to retry was not rejected
            if result.is_err() && self.cancel.is_cancelled() {
                outcome.cancelled = true;
                break;
            }

            outcome.submitted_batches += 1;
            match result {
                Ok(()) => {
                    outcome.added_count += chunk.len();
                    self.sink
                        .info(&format!("Added {} tracks to the playlist.", chunk.len()));
                }
                Err(source) => {
                    let error = BatchSubmitError {
                        index,
                        size: chunk.len(),
                        source,
                    };
                    self.sink.warn(Stage::Upload, &error.to_string());
                    outcome.failures.push(error);
                }
            }
            self.sink.advance(Stage::Upload);
        }

        self.sink.stage_finished(Stage::Upload);
        outcome
    }
}
