use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    Client, Response, StatusCode,
    header::{CONTENT_TYPE, RETRY_AFTER},
};

use crate::{
    Res,
    catalog::{ADD_ITEMS_LIMIT, CatalogService},
    config,
    error::CatalogError,
    management::TokenManager,
    types::{
        AddTrackToPlaylistRequest, AddTrackToPlaylistResponse, ApiErrorResponse,
        CreatePlaylistRequest, CreatePlaylistResponse, CurrentUser, SearchResponse, Track,
    },
    utils,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Spotify Web API implementation of [`CatalogService`].
///
/// The access token is fixed at construction and never refreshed during a run;
/// tokens are valid for an hour and [`TokenManager`] hands out one with at least a
/// few minutes left.
pub struct SpotifyClient {
    http: Client,
    base_url: String,
    access_token: String,
    public_playlists: bool,
}

impl SpotifyClient {
    pub fn new(
        base_url: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Result<Self, CatalogError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
            public_playlists: true,
        })
    }

    /// Builds a client from the cached token of a previous `shazport auth`.
    pub async fn from_token_cache() -> Res<Self> {
        let mut token_mgr = TokenManager::load().await.map_err(|e| {
            format!("No usable token ({}). Please run `shazport auth` first.", e)
        })?;
        let token = token_mgr.get_valid_token().await?;
        Ok(Self::new(config::spotify_apiurl(), token)?)
    }

    /// Whether playlists created by this client are public.
    pub fn with_public_playlists(mut self, public: bool) -> Self {
        self.public_playlists = public;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Turns non-success answers into a [`CatalogError`].
///
/// A 429 carries the `Retry-After` hint (seconds) when Spotify sends one.
async fn check(response: Response) -> Result<Response, CatalogError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs);
        return Err(CatalogError::RateLimited { retry_after });
    }

    if status.is_server_error() {
        return Err(CatalogError::Server { status });
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorResponse>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body);
    Err(CatalogError::Api { status, message })
}

#[async_trait]
impl CatalogService for SpotifyClient {
    async fn search_track(&self, query: &str, limit: u32) -> Result<Vec<Track>, CatalogError> {
        let limit = limit.to_string();
        let response = self
            .http
            .get(self.url("/search"))
            .bearer_auth(&self.access_token)
            .query(&[("q", query), ("type", "track"), ("limit", limit.as_str())])
            .send()
            .await?;

        let json = check(response)
            .await?
            .json::<SearchResponse>()
            .await
            .map_err(|e| CatalogError::Decode(e.to_string()))?;

        Ok(json.tracks.items)
    }

    async fn current_user(&self) -> Result<CurrentUser, CatalogError> {
        let response = self
            .http
            .get(self.url("/me"))
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        check(response)
            .await?
            .json::<CurrentUser>()
            .await
            .map_err(|e| CatalogError::Decode(e.to_string()))
    }

    async fn create_playlist(
        &self,
        owner_id: &str,
        name: &str,
        description: &str,
    ) -> Result<CreatePlaylistResponse, CatalogError> {
        let body = CreatePlaylistRequest {
            name: name.to_string(),
            description: description.to_string(),
            public: self.public_playlists,
        };

        let response = self
            .http
            .post(self.url(&format!("/users/{}/playlists", owner_id)))
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await?;

        check(response)
            .await?
            .json::<CreatePlaylistResponse>()
            .await
            .map_err(|e| CatalogError::Decode(e.to_string()))
    }

    async fn add_items(&self, playlist_id: &str, item_ids: &[String]) -> Result<(), CatalogError> {
        if item_ids.len() > ADD_ITEMS_LIMIT {
            return Err(CatalogError::InvalidRequest(format!(
                "{} items exceed the limit of {} per call",
                item_ids.len(),
                ADD_ITEMS_LIMIT
            )));
        }

        let body = AddTrackToPlaylistRequest {
            uris: item_ids.iter().map(|id| utils::track_uri(id)).collect(),
        };

        let response = self
            .http
            .post(self.url(&format!("/playlists/{}/tracks", playlist_id)))
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await?;

        check(response)
            .await?
            .json::<AddTrackToPlaylistResponse>()
            .await
            .map_err(|e| CatalogError::Decode(e.to_string()))?;

        Ok(())
    }

    async fn upload_cover_image(
        &self,
        playlist_id: &str,
        image_base64: &str,
    ) -> Result<(), CatalogError> {
        let response = self
            .http
            .put(self.url(&format!("/playlists/{}/images", playlist_id)))
            .bearer_auth(&self.access_token)
            .header(CONTENT_TYPE, "image/jpeg")
            .body(image_base64.to_string())
            .send()
            .await?;

        check(response).await?;
        Ok(())
    }
}
