use std::path::Path;

use tokio_util::sync::CancellationToken;

use crate::{
    catalog::CatalogService,
    error::{CoverAttachError, ProvisionError},
    import::{
        report::{ProgressSink, Stage},
        retry::RetryPolicy,
    },
    types::Playlist,
    utils,
};

/// Creates the destination playlist and dresses it with a cover image.
pub struct PlaylistProvisioner<'a> {
    catalog: &'a dyn CatalogService,
    sink: &'a dyn ProgressSink,
    retry: &'a RetryPolicy,
    cancel: &'a CancellationToken,
}

impl<'a> PlaylistProvisioner<'a> {
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
        }
    }

    /// Creates a playlist owned by `owner_id`.
    ///
    /// Sent exactly once: a repeated create after a lost response would leave a
    /// second, empty playlist behind.
    pub async fn provision(
        &self,
        owner_id: &str,
        name: &str,
        description: &str,
    ) -> Result<Playlist, ProvisionError> {
        let created = self
            .catalog
            .create_playlist(owner_id, name, description)
            .await
            .map_err(|source| ProvisionError {
                name: name.to_string(),
                source,
            })?;

        Ok(Playlist {
            id: created.id,
            owner_id: owner_id.to_string(),
        })
    }

    /// Reads, encodes and uploads the cover image.
    pub async fn try_attach_cover(
        &self,
        playlist_id: &str,
        image_path: &Path,
    ) -> Result<(), CoverAttachError> {
        let bytes = async_fs::read(image_path)
            .await
            .map_err(|source| CoverAttachError::Io {
                path: image_path.to_path_buf(),
                source,
            })?;

        if bytes.is_empty() {
            return Err(CoverAttachError::EmptyImage(image_path.to_path_buf()));
        }

        let encoded = utils::encode_image(&bytes);
        self.retry
            .run(self.cancel, || {
                self.catalog.upload_cover_image(playlist_id, &encoded)
            })
            .await?;

        Ok(())
    }

    /// Attaches the cover and reports whether it worked.
    ///
    /// Failures are logged to the sink and never returned: a missing cover does not
    /// make an import fail.
    pub async fn attach_cover(&self, playlist_id: &str, image_path: &Path) -> bool {
        match self.try_attach_cover(playlist_id, image_path).await {
            Ok(()) => {
                self.sink.info("Added thumbnail to the playlist.");
                true
            }
            Err(e) => {
                self.sink
                    .warn(Stage::Cover, &format!("Failed to upload thumbnail: {}", e));
                false
            }
        }
    }
}
