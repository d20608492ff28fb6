//! # Spotify Integration Module
//!
//! The Spotify Web API behind the [`crate::catalog::CatalogService`] seam, plus the
//! OAuth flow that produces the token it runs on.
//!
//! ## Architecture
//!
//! ```text
//! Import pipeline (crate::import)
//!          ↓
//! CatalogService trait
//!          ↓
//! SpotifyClient ── token from management::TokenManager
//!          ↓
//! HTTP Layer (reqwest, JSON)
//!          ↓
//! Spotify Web API
//! ```
//!
//! ## Modules
//!
//! - [`auth`] - OAuth 2.0 authorization-code flow with PKCE: verifier and challenge,
//!   local callback server, browser launch, code exchange and token refresh.
//! - [`client`] - [`SpotifyClient`], one method per catalog operation.
//!
//! ## API Coverage
//!
//! - `GET /search?type=track` - best-effort free-text track search
//! - `GET /me` - the authenticated user
//! - `POST /users/{user_id}/playlists` - create a playlist
//! - `POST /playlists/{playlist_id}/tracks` - add up to 100 tracks
//! - `PUT /playlists/{playlist_id}/images` - upload a base64 JPEG cover
//! - `POST /api/token` - code exchange and refresh
//!
//! ## Errors
//!
//! Every call returns [`crate::error::CatalogError`]. Status 429 becomes
//! `RateLimited` with the `Retry-After` hint, 5xx becomes `Server`; both count as
//! transient for the retry layer in [`crate::import::retry`]. The client itself never
//! retries or sleeps.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let client = SpotifyClient::from_token_cache().await?;
//! let user = client.current_user().await?;
//! let playlist = client.create_playlist(&user.id, "Shazam Songs", "").await?;
//! client.add_items(&playlist.id, &ids[..100]).await?;
//! ```

pub mod auth;
pub mod client;

pub use client::SpotifyClient;
