//! The remote music catalog as seen by the import pipeline.
//!
//! The pipeline only ever talks to a [`CatalogService`]. The Spotify implementation
//! lives in [`crate::spotify::SpotifyClient`]; tests drive the pipeline with an
//! in-memory fake.

use async_trait::async_trait;

use crate::{
    error::CatalogError,
    types::{CreatePlaylistResponse, CurrentUser, Track},
};

/// Maximum number of items a single add-items call accepts.
pub const ADD_ITEMS_LIMIT: usize = 100;

#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Free-text track search, best match first.
    async fn search_track(&self, query: &str, limit: u32) -> Result<Vec<Track>, CatalogError>;

    async fn current_user(&self) -> Result<CurrentUser, CatalogError>;

    async fn create_playlist(
        &self,
        owner_id: &str,
        name: &str,
        description: &str,
    ) -> Result<CreatePlaylistResponse, CatalogError>;

    /// Appends `item_ids` to the playlist. At most [`ADD_ITEMS_LIMIT`] ids per call.
    async fn add_items(&self, playlist_id: &str, item_ids: &[String]) -> Result<(), CatalogError>;

    async fn upload_cover_image(
        &self,
        playlist_id: &str,
        image_base64: &str,
    ) -> Result<(), CatalogError>;
}
