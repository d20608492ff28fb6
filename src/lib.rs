//! Shazam Library Importer
//!
//! This library turns a Shazam library export into a Spotify playlist. It resolves
//! every exported title/artist pair to a Spotify track, creates a playlist for the
//! authenticated user, adds the tracks in batches of 100 and uploads a cover image.
//!
//! # Modules
//!
//! - `api` - HTTP API endpoints for the local callback server
//! - `catalog` - The catalog service seam the import pipeline talks to
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration management and environment variables
//! - `error` - Error types for catalog calls and import stages
//! - `import` - The import pipeline: source, resolver, uploader, provisioner
//! - `management` - Token cache management
//! - `server` - Local HTTP server for OAuth callbacks
//! - `spotify` - Spotify Web API client implementation
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//!
//! # Example
//!
//! ```
//! use shazport::{import::{CsvSource, ImportOptions, ImportOrchestrator, SilentSink}, spotify::SpotifyClient};
//!
//! #[tokio::main]
//! async fn main() -> shazport::Res<()> {
//!     shazport::config::load_env().await?;
//!     let client = SpotifyClient::from_token_cache().await?;
//!     let report = ImportOrchestrator::new(&client, &SilentSink, ImportOptions::default())
//!         .run(&CsvSource::new("shazamlibrary.csv"))
//!         .await?;
//!     println!("{} tracks added", report.tracks_added);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod import;
pub mod management;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

/// Boxed-error result used by the command layer, where errors only get printed.
///
/// Library code returns the typed errors from [`error`] instead.
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Status line with a blue `o` marker.
///
/// ```ignore
/// info!("Reading {}", path.display());
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Status line with a green check mark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a red `!` line and exits with status 1.
///
/// Only the binary's top level uses this; library code returns errors and reports
/// recoverable problems through [`warning!`] or an [`import::ProgressSink`].
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Status line with a yellow `!` marker for problems the run survives, such as
/// an unresolved record or a cover that could not be uploaded.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
