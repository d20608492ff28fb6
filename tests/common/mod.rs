#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet},
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use reqwest::StatusCode;
use shazport::{
    catalog::CatalogService,
    error::CatalogError,
    import::{ProgressSink, Stage},
    types::{CreatePlaylistResponse, CurrentUser, SourceRecord, Track},
};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Search(String),
    CurrentUser,
    CreatePlaylist { owner_id: String, name: String },
    AddItems { playlist_id: String, ids: Vec<String> },
    UploadCover { playlist_id: String, image: String },
}

/// Scripted in-memory catalog. Every query resolves to `id:<query>` unless listed
/// as unresolvable or failing.
#[derive(Default)]
pub struct FakeCatalog {
    unresolvable: HashSet<String>,
    failing_searches: HashSet<String>,
    rate_limited_searches: HashSet<String>,
    search_delays: HashMap<String, Duration>,
    fail_user: bool,
    fail_create: bool,
    failing_batches: HashSet<usize>,
    transient_add_failures: AtomicUsize,
    fail_cover: bool,
    cancel_after_searches: Option<(usize, CancellationToken)>,
    cancel_after_batches: Option<(usize, CancellationToken)>,
    cancel_on_rate_limit: Option<CancellationToken>,
    add_calls: AtomicUsize,
    search_calls: AtomicUsize,
    calls: Mutex<Vec<Call>>,
}

pub fn id_for(record: &SourceRecord) -> String {
    format!("id:{} {}", record.title, record.artist)
}

pub fn records(n: usize) -> Vec<SourceRecord> {
    (0..n)
        .map(|i| SourceRecord::new(format!("Song {}", i), format!("Artist {}", i)))
        .collect()
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unresolvable(mut self, record: &SourceRecord) -> Self {
        self.unresolvable
            .insert(format!("{} {}", record.title, record.artist));
        self
    }

    pub fn failing_search(mut self, record: &SourceRecord) -> Self {
        self.failing_searches
            .insert(format!("{} {}", record.title, record.artist));
        self
    }

    /// Searches for `record` always answer 429 without a retry hint.
    pub fn rate_limited_search(mut self, record: &SourceRecord) -> Self {
        self.rate_limited_searches
            .insert(format!("{} {}", record.title, record.artist));
        self
    }

    pub fn search_delay(mut self, record: &SourceRecord, delay: Duration) -> Self {
        self.search_delays
            .insert(format!("{} {}", record.title, record.artist), delay);
        self
    }

    pub fn failing_user(mut self) -> Self {
        self.fail_user = true;
        self
    }

    pub fn failing_create(mut self) -> Self {
        self.fail_create = true;
        self
    }

    /// Chunk submissions (0-based call index) that are rejected by the service.
    pub fn failing_batch(mut self, index: usize) -> Self {
        self.failing_batches.insert(index);
        self
    }

    /// The first `n` add-items calls answer 429 without a retry hint.
    pub fn rate_limited_adds(self, n: usize) -> Self {
        self.transient_add_failures.store(n, Ordering::SeqCst);
        self
    }

    pub fn failing_cover(mut self) -> Self {
        self.fail_cover = true;
        self
    }

    pub fn cancel_after_searches(mut self, n: usize, token: CancellationToken) -> Self {
        self.cancel_after_searches = Some((n, token));
        self
    }

    pub fn cancel_after_batches(mut self, n: usize, token: CancellationToken) -> Self {
        self.cancel_after_batches = Some((n, token));
        self
    }

    /// Cancels `token` whenever a call is answered with 429.
    pub fn cancel_on_rate_limit(mut self, token: CancellationToken) -> Self {
        self.cancel_on_rate_limit = Some(token);
        self
    }

    fn rate_limited(&self) -> CatalogError {
        if let Some(token) = &self.cancel_on_rate_limit {
            token.cancel();
        }
        CatalogError::RateLimited { retry_after: None }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn added_batches(&self) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::AddItems { ids, .. } => Some(ids),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    fn push(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

fn rejected(message: &str) -> CatalogError {
    CatalogError::Api {
        status: StatusCode::BAD_REQUEST,
        message: message.to_string(),
    }
}

#[async_trait]
impl CatalogService for FakeCatalog {
    async fn search_track(&self, query: &str, limit: u32) -> Result<Vec<Track>, CatalogError> {
        assert_eq!(limit, 1, "resolver must ask for the single best match");
        self.push(Call::Search(query.to_string()));

        if let Some(delay) = self.search_delays.get(query) {
            tokio::time::sleep(*delay).await;
        }

        let done = self.search_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some((n, token)) = &self.cancel_after_searches {
            if done >= *n {
                token.cancel();
            }
        }

        if self.rate_limited_searches.contains(query) {
            return Err(self.rate_limited());
        }
        if self.failing_searches.contains(query) {
            return Err(rejected("search failed"));
        }
        if self.unresolvable.contains(query) {
            return Ok(Vec::new());
        }

        Ok(vec![
            Track {
                id: format!("id:{}", query),
                name: query.to_string(),
                uri: format!("spotify:track:id:{}", query),
            },
            Track {
                id: format!("other:{}", query),
                name: query.to_string(),
                uri: String::new(),
            },
        ])
    }

    async fn current_user(&self) -> Result<CurrentUser, CatalogError> {
        self.push(Call::CurrentUser);
        if self.fail_user {
            return Err(rejected("invalid token"));
        }
        Ok(CurrentUser {
            id: "user-1".to_string(),
            display_name: Some("Test User".to_string()),
        })
    }

    async fn create_playlist(
        &self,
        owner_id: &str,
        name: &str,
        _description: &str,
    ) -> Result<CreatePlaylistResponse, CatalogError> {
        self.push(Call::CreatePlaylist {
            owner_id: owner_id.to_string(),
            name: name.to_string(),
        });
        if self.fail_create {
            return Err(rejected("cannot create playlist"));
        }
        Ok(CreatePlaylistResponse {
            id: "playlist-1".to_string(),
            name: name.to_string(),
            description: None,
        })
    }

    async fn add_items(&self, playlist_id: &str, item_ids: &[String]) -> Result<(), CatalogError> {
        assert!(item_ids.len() <= 100, "chunk larger than the add-items limit");
        let index = self.add_calls.fetch_add(1, Ordering::SeqCst);

        let pending = self.transient_add_failures.load(Ordering::SeqCst);
        if pending > 0 {
            self.transient_add_failures
                .store(pending - 1, Ordering::SeqCst);
            return Err(self.rate_limited());
        }

        self.push(Call::AddItems {
            playlist_id: playlist_id.to_string(),
            ids: item_ids.to_vec(),
        });

        if let Some((n, token)) = &self.cancel_after_batches {
            if index + 1 >= *n {
                token.cancel();
            }
        }

        if self.failing_batches.contains(&index) {
            return Err(rejected("batch rejected"));
        }
        Ok(())
    }

    async fn upload_cover_image(
        &self,
        playlist_id: &str,
        image_base64: &str,
    ) -> Result<(), CatalogError> {
        self.push(Call::UploadCover {
            playlist_id: playlist_id.to_string(),
            image: image_base64.to_string(),
        });
        if self.fail_cover {
            return Err(rejected("image too large"));
        }
        Ok(())
    }
}

/// Sink that keeps every warning for assertions.
#[derive(Default)]
pub struct RecordingSink {
    pub warnings: Mutex<Vec<(Stage, String)>>,
    pub infos: Mutex<Vec<String>>,
}

impl ProgressSink for RecordingSink {
    fn info(&self, message: &str) {
        self.infos.lock().unwrap().push(message.to_string());
    }

    fn warn(&self, stage: Stage, message: &str) {
        self.warnings
            .lock()
            .unwrap()
            .push((stage, message.to_string()));
    }
}
