use std::{path::PathBuf, sync::Arc};

use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use shazport::{
    cli, config, error,
    import::{
        DEFAULT_CONCURRENCY, DEFAULT_COVER_IMAGE, DEFAULT_PLAYLIST_DESCRIPTION,
        DEFAULT_PLAYLIST_NAME,
    },
    types::PkceToken,
};
use tokio::sync::Mutex;

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Authorize with Spotify API
    Auth,

    /// Import a Shazam library export into a new playlist
    Import(ImportOptions),

    /// Attach a cover image to an existing playlist
    Cover(CoverOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct ImportOptions {
    /// Shazam library export (CSV)
    #[clap(long, default_value = "shazamlibrary.csv")]
    file: PathBuf,

    /// Lines to discard before the CSV header
    #[clap(long, default_value_t = 1)]
    skip_lines: usize,

    /// Name of the playlist to create
    #[clap(long, default_value = DEFAULT_PLAYLIST_NAME)]
    name: String,

    /// Description of the playlist to create
    #[clap(long, default_value = DEFAULT_PLAYLIST_DESCRIPTION)]
    description: String,

    /// Cover image for the playlist; must be a JPEG of at most 256 KB
    #[clap(long, default_value = DEFAULT_COVER_IMAGE, conflicts_with = "no_cover")]
    cover: PathBuf,

    /// Do not upload a cover image
    #[clap(long)]
    no_cover: bool,

    /// Create a private playlist
    #[clap(long)]
    private: bool,

    /// Number of searches in flight at once
    #[clap(long, default_value_t = DEFAULT_CONCURRENCY)]
    concurrency: usize,

    /// Retries per request on rate limits and server errors
    #[clap(long, default_value_t = 3)]
    retries: u32,

    /// Write the import report as JSON
    #[clap(long)]
    report: Option<PathBuf>,

    /// Append a timestamped log to this file
    #[clap(long)]
    log_file: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct CoverOptions {
    /// Spotify playlist id
    #[clap(long)]
    playlist: String,

    /// Cover image; must be a JPEG of at most 256 KB
    #[clap(long, default_value = DEFAULT_COVER_IMAGE)]
    image: PathBuf,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Auth => {
            let oauth_result: Arc<Mutex<Option<PkceToken>>> = Arc::new(Mutex::new(None));
            cli::auth(Arc::clone(&oauth_result)).await
        }
        Command::Import(opt) => {
            cli::import(cli::ImportArgs {
                file: opt.file,
                skip_lines: opt.skip_lines,
                name: opt.name,
                description: opt.description,
                cover: (!opt.no_cover).then_some(opt.cover),
                public: !opt.private,
                concurrency: opt.concurrency,
                retries: opt.retries,
                report: opt.report,
                log_file: opt.log_file,
            })
            .await
        }
        Command::Cover(opt) => cli::cover(opt.playlist, opt.image).await,
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        error!("{}", e);
    }
}
