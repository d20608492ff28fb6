//! # API Module
//!
//! HTTP endpoints of the short-lived local server that runs during `shazport auth`.
//!
//! - [`callback`] - Receives the authorization code from Spotify's redirect and
//!   exchanges it, together with the PKCE verifier, for an access token.
//! - [`health`] - Reports that the server is up and whether a token arrived.
//!
//! ```rust,ignore
//! use axum::{Router, routing::get};
//! use shazport::api::{callback, health};
//!
//! let app = Router::new()
//!     .route("/callback", get(callback))
//!     .route("/health", get(health));
//! ```

mod callback;
mod health;

pub use callback::callback;
pub use health::health;
