//! # CLI Module
//!
//! User-facing commands of `shazport`. Each command wires configuration, the
//! Spotify client and terminal output around the library modules.
//!
//! ## Commands
//!
//! - [`auth`] - Runs the Spotify OAuth flow and caches the token
//! - [`import`] - Imports a Shazam library export into a new playlist
//! - [`cover`] - Attaches a cover image to an existing playlist
//!
//! ## Output
//!
//! Progress goes through [`ConsoleSink`]: colored status lines, progress bars for
//! resolution and upload, and an optional log file. The final report is printed as
//! tables and can be saved as JSON.
//!
//! ## Usage Patterns
//!
//! ```bash
//! shazport auth                                  # Authenticate with Spotify
//! shazport import                                # Import ./shazamlibrary.csv
//! shazport import --file export.csv --no-cover   # Other file, no thumbnail
//! shazport import --concurrency 8 --report out.json --log-file app.log
//! shazport cover --playlist 37i9dQZF1DXcBWIGoYBM5M --image logo.jpg
//! ```

mod auth;
mod cover;
mod import;
mod sink;

pub use auth::auth;
pub use cover::cover;
pub use import::{ImportArgs, import};
pub use sink::ConsoleSink;
