//! The tabular data source: a Shazam library export.
//!
//! Shazam writes a one-line banner (`Shazam Library`) before the real CSV header, so
//! the first `skip_lines` lines are dropped before parsing. Columns are matched by
//! header name; only `Title` and `Artist` are read.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::{error::SourceLoadError, types::SourceRecord};

pub const TITLE_COLUMN: &str = "Title";
pub const ARTIST_COLUMN: &str = "Artist";

/// Ordered rows of title/artist pairs.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Loads every record in input order. An empty source is an error.
    async fn load(&self) -> Result<Vec<SourceRecord>, SourceLoadError>;
}

#[async_trait]
impl RecordSource for Vec<SourceRecord> {
    async fn load(&self) -> Result<Vec<SourceRecord>, SourceLoadError> {
        if self.is_empty() {
            return Err(SourceLoadError::Empty(PathBuf::from("<memory>")));
        }
        Ok(self.clone())
    }
}

#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
    skip_lines: usize,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            skip_lines: 1,
        }
    }

    /// Number of lines before the CSV header that are discarded (default 1).
    pub fn skip_lines(mut self, skip_lines: usize) -> Self {
        self.skip_lines = skip_lines;
        self
    }
}

#[async_trait]
impl RecordSource for CsvSource {
    async fn load(&self) -> Result<Vec<SourceRecord>, SourceLoadError> {
        let content = async_fs::read_to_string(&self.path)
            .await
            .map_err(|source| SourceLoadError::Io {
                path: self.path.clone(),
                source,
            })?;

        parse_records(&content, self.skip_lines, &self.path)
    }
}

/// Parses an export held in memory. `path` is only used in error messages.
pub fn parse_records(
    content: &str,
    skip_lines: usize,
    path: &Path,
) -> Result<Vec<SourceRecord>, SourceLoadError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let body = skip_leading_lines(content, skip_lines);
    if body.trim().is_empty() {
        return Err(SourceLoadError::Empty(path.to_path_buf()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let headers = reader
        .headers()
        .map_err(|source| SourceLoadError::Malformed {
            path: path.to_path_buf(),
            source,
        })?
        .clone();

    for column in [TITLE_COLUMN, ARTIST_COLUMN] {
        if !headers.iter().any(|h| h == column) {
            return Err(SourceLoadError::MissingColumn {
                path: path.to_path_buf(),
                column,
            });
        }
    }

    let records = reader
        .deserialize::<SourceRecord>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| SourceLoadError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;

    if records.is_empty() {
        return Err(SourceLoadError::Empty(path.to_path_buf()));
    }

    Ok(records)
}

fn skip_leading_lines(content: &str, skip_lines: usize) -> &str {
    let mut rest = content;
    for _ in 0..skip_lines {
        match rest.find('\n') {
            Some(pos) => rest = &rest[pos + 1..],
            None => return "",
        }
    }
    rest
}
