use std::path::{Path, PathBuf};

use tabled::Table;
use tokio_util::sync::CancellationToken;

use crate::{
    Res,
    cli::ConsoleSink,
    import::{
        CsvSource, ImportFailure, ImportOptions, ImportOrchestrator, ImportReport, ProgressSink,
        RecordSource, RetryPolicy, Stage,
    },
    info,
    spotify::SpotifyClient,
    success,
    types::{ErrorTableRow, SourceRecord, SummaryTableRow},
    utils, warning,
};

#[derive(Debug, Clone)]
pub struct ImportArgs {
    pub file: PathBuf,
    pub skip_lines: usize,
    pub name: String,
    pub description: String,
    pub cover: Option<PathBuf>,
    pub public: bool,
    pub concurrency: usize,
    pub retries: u32,
    pub report: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
}

pub async fn import(args: ImportArgs) -> Res<()> {
    let sink = ConsoleSink::new(args.log_file.as_deref())?;

    // Read the export before touching the network: an unusable file must not
    // cost a single API call.
    info!("Reading {}", args.file.display());
    let result = match CsvSource::new(&args.file)
        .skip_lines(args.skip_lines)
        .load()
        .await
    {
        Ok(records) => run(&args, records, &sink).await?,
        Err(e) => {
            let failure = ImportFailure::source_load(e);
            sink.warn(Stage::Source, &failure.error.to_string());
            Err(failure)
        }
    };

    let report = match &result {
        Ok(report) => report,
        Err(failure) => &failure.report,
    };
    print_report(report);
    if let Some(path) = &args.report {
        write_report(report, path).await?;
        info!("Report written to {}", path.display());
    }

    let report = result?;
    if report.errors_for(Stage::Cover).next().is_some() {
        if let Some(playlist_id) = &report.playlist_id {
            info!(
                "Retry the cover with `shazport cover --playlist {}`.",
                playlist_id
            );
        }
    }
    success!(
        "Import finished: {} tracks added, {} unresolved.",
        report.tracks_added,
        report.unresolved
    );
    Ok(())
}

async fn run(
    args: &ImportArgs,
    records: Vec<SourceRecord>,
    sink: &ConsoleSink,
) -> Res<Result<ImportReport, ImportFailure>> {
    let client = SpotifyClient::from_token_cache()
        .await?
        .with_public_playlists(args.public);

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warning!("Cancelling import after the current request...");
            ctrl_c.cancel();
        }
    });

    let options = ImportOptions {
        playlist_name: args.name.clone(),
        playlist_description: args.description.clone(),
        cover_image: args.cover.clone(),
        concurrency: args.concurrency.max(1),
        retry: RetryPolicy::with_retries(args.retries),
    };

    Ok(ImportOrchestrator::new(&client, sink, options)
        .with_cancellation(cancel)
        .run(&records)
        .await)
}

fn print_report(report: &ImportReport) {
    let playlist = report.playlist_id.clone().unwrap_or_else(|| "-".to_string());
    let summary = vec![
        row("State", report.state.to_string()),
        row("Playlist", playlist),
        row("Records", report.records.to_string()),
        row("Resolved", report.resolved.to_string()),
        row("Unresolved", report.unresolved.to_string()),
        row("Tracks added", report.tracks_added.to_string()),
        row(
            "Batches (failed)",
            format!("{} ({})", report.batches, report.failed_batches),
        ),
        row("Cover attached", report.cover_attached.to_string()),
    ];
    println!("{}", Table::new(summary));

    if !report.errors.is_empty() {
        let errors = report.errors.iter().map(|e| ErrorTableRow {
            stage: e.stage.to_string(),
            message: utils::truncate(&e.message, 100),
        });
        println!("{}", Table::new(errors));
    }
}

fn row(metric: &str, value: String) -> SummaryTableRow {
    SummaryTableRow {
        metric: metric.to_string(),
        value,
    }
}

async fn write_report(report: &ImportReport, path: &Path) -> Res<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        async_fs::create_dir_all(parent).await?;
    }
    let json = serde_json::to_string_pretty(report)?;
    async_fs::write(path, json).await?;
    Ok(())
}
