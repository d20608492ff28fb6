use futures::{Stream, StreamExt, stream};
use tokio_util::sync::CancellationToken;

use crate::{
    catalog::CatalogService, error::ResolutionError, import::retry::RetryPolicy,
    types::SourceRecord,
};

/// Builds the free-text search query for a record: title and artist joined by a
/// space, no quoting or field filters.
pub fn build_query(record: &SourceRecord) -> String {
    format!("{} {}", record.title, record.artist)
}

/// Maps a [`SourceRecord`] to at most one catalog id.
///
/// The first search hit wins. No relevance threshold is applied, so a weak match is
/// still a match.
pub struct TrackResolver<'a> {
    catalog: &'a dyn CatalogService,
    retry: &'a RetryPolicy,
    cancel: &'a CancellationToken,
}

impl<'a> TrackResolver<'a> {
    pub fn new(
        catalog: &'a dyn CatalogService,
        retry: &'a RetryPolicy,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            catalog,
            retry,
            cancel,
        }
    }

    /// `Ok(None)` means the search succeeded and found nothing.
    pub async fn resolve(&self, record: &SourceRecord) -> Result<Option<String>, ResolutionError> {
        let query = build_query(record);

        let items = self
            .retry
            .run(self.cancel, || self.catalog.search_track(&query, 1))
            .await
            .map_err(|source| ResolutionError {
                query: query.clone(),
                source,
            })?;

        Ok(items.into_iter().next().map(|track| track.id))
    }

    /// Resolves `records` with up to `concurrency` searches in flight.
    ///
    /// Items come out in input order regardless of which search finishes first.
    pub fn resolve_in_order<'r>(
        &'r self,
        records: &'r [SourceRecord],
        concurrency: usize,
    ) -> impl Stream<Item = (&'r SourceRecord, Result<Option<String>, ResolutionError>)> + 'r {
        stream::iter(records)
            .map(move |record| async move { (record, self.resolve(record).await) })
            .buffered(concurrency.max(1))
    }
}
