use std::fmt;

use serde::Serialize;

/// Pipeline stage a message or error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Source,
    Resolve,
    Identity,
    Provision,
    Upload,
    Cover,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Source => "source",
            Stage::Resolve => "resolve",
            Stage::Identity => "identity",
            Stage::Provision => "provision",
            Stage::Upload => "upload",
            Stage::Cover => "cover",
        };
        write!(f, "{}", s)
    }
}

/// Progress of a run. Advances strictly forward; `Done`, `Failed` and `Aborted`
/// are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Start,
    RecordsLoaded,
    Resolved,
    PlaylistCreated,
    TracksUploaded,
    CoverAttempted,
    Done,
    Failed,
    Aborted,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunState::Start => "start",
            RunState::RecordsLoaded => "records loaded",
            RunState::Resolved => "resolved",
            RunState::PlaylistCreated => "playlist created",
            RunState::TracksUploaded => "tracks uploaded",
            RunState::CoverAttempted => "cover attempted",
            RunState::Done => "done",
            RunState::Failed => "failed",
            RunState::Aborted => "aborted",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportError {
    pub stage: Stage,
    pub message: String,
}

/// Summary of one run, filled in stage by stage.
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub state: RunState,
    pub records: usize,
    pub resolved: usize,
    pub unresolved: usize,
    pub tracks_added: usize,
    pub batches: usize,
    pub failed_batches: usize,
    pub cover_attached: bool,
    pub playlist_id: Option<String>,
    pub errors: Vec<ReportError>,
}

impl Default for ImportReport {
    fn default() -> Self {
        Self {
            state: RunState::Start,
            records: 0,
            resolved: 0,
            unresolved: 0,
            tracks_added: 0,
            batches: 0,
            failed_batches: 0,
            cover_attached: false,
            playlist_id: None,
            errors: Vec::new(),
        }
    }
}

impl ImportReport {
    pub fn record_error(&mut self, stage: Stage, message: impl Into<String>) {
        self.errors.push(ReportError {
            stage,
            message: message.into(),
        });
    }

    pub fn errors_for(&self, stage: Stage) -> impl Iterator<Item = &ReportError> {
        self.errors.iter().filter(move |e| e.stage == stage)
    }
}

/// Where the pipeline sends human-readable progress.
///
/// Every method has an empty default so sinks only implement what they show.
pub trait ProgressSink: Send + Sync {
    fn stage_started(&self, _stage: Stage, _total: usize) {}

    fn advance(&self, _stage: Stage) {}

    fn stage_finished(&self, _stage: Stage) {}

    fn info(&self, _message: &str) {}

    fn warn(&self, _stage: Stage, _message: &str) {}
}

/// Discards all progress.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentSink;

impl ProgressSink for SilentSink {}
