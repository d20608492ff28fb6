use std::{io::Write, path::Path};

use shazport::{
    error::SourceLoadError,
    import::{CsvSource, RecordSource, source::parse_records},
    types::SourceRecord,
};
use tempfile::NamedTempFile;

const SHAZAM_EXPORT: &str = "Shazam Library\n\
Index,TagTime,Title,Artist,URL,TrackKey\n\
1,2023-10-01,Midnight City,M83,https://www.shazam.com/track/1,1\n\
2,2023-10-02,\"Hello, Goodbye\",The Beatles,https://www.shazam.com/track/2,2\n\
3,2023-10-03,Midnight City,M83,https://www.shazam.com/track/1,1\n";

fn path() -> &'static Path {
    Path::new("shazamlibrary.csv")
}

#[test]
fn test_parse_shazam_export() {
    let records = parse_records(SHAZAM_EXPORT, 1, path()).unwrap();

    assert_eq!(
        records,
        vec![
            SourceRecord::new("Midnight City", "M83"),
            SourceRecord::new("Hello, Goodbye", "The Beatles"),
            // duplicates are kept
            SourceRecord::new("Midnight City", "M83"),
        ]
    );
}

#[test]
fn test_skipped_lines_are_never_data() {
    let content = "Title,Artist\nBanner Song,Banner Artist\nReal Song,Real Artist\n";
    let records = parse_records(content, 1, path());

    // With the first line skipped, "Banner Song,Banner Artist" becomes the header
    assert!(matches!(
        records,
        Err(SourceLoadError::MissingColumn { column: "Title", .. })
    ));

    let records = parse_records(content, 0, path()).unwrap();
    assert_eq!(records.len(), 2);
}

#[test]
fn test_byte_order_mark_is_ignored() {
    let content = format!("\u{feff}{}", SHAZAM_EXPORT);
    let records = parse_records(&content, 1, path()).unwrap();
    assert_eq!(records.len(), 3);
}

#[test]
fn test_crlf_line_endings() {
    let content = "Shazam Library\r\nTitle,Artist\r\nSong,Singer\r\n";
    let records = parse_records(content, 1, path()).unwrap();
    assert_eq!(records, vec![SourceRecord::new("Song", "Singer")]);
}

#[test]
fn test_missing_artist_column() {
    let content = "Shazam Library\nIndex,Title\n1,Song\n";
    let result = parse_records(content, 1, path());
    assert!(matches!(
        result,
        Err(SourceLoadError::MissingColumn {
            column: "Artist",
            ..
        })
    ));
}

#[test]
fn test_header_only_is_empty() {
    let content = "Shazam Library\nIndex,TagTime,Title,Artist\n";
    let result = parse_records(content, 1, path());
    assert!(matches!(result, Err(SourceLoadError::Empty(_))));
}

#[test]
fn test_blank_file_is_empty() {
    assert!(matches!(
        parse_records("", 1, path()),
        Err(SourceLoadError::Empty(_))
    ));
    assert!(matches!(
        parse_records("Shazam Library\n", 1, path()),
        Err(SourceLoadError::Empty(_))
    ));
}

#[test]
fn test_short_row_is_malformed() {
    let content = "Shazam Library\nTitle,Artist\nOnly Title\n";
    let result = parse_records(content, 1, path());
    assert!(matches!(result, Err(SourceLoadError::Malformed { .. })));
}

#[tokio::test]
async fn test_csv_source_reads_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(SHAZAM_EXPORT.as_bytes()).unwrap();

    let source = CsvSource::new(file.path());
    let records = source.load().await.unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[1].artist, "The Beatles");
}

#[tokio::test]
async fn test_csv_source_missing_file() {
    let source = CsvSource::new("definitely/missing.csv");
    let result = source.load().await;
    assert!(matches!(result, Err(SourceLoadError::Io { .. })));
}

#[tokio::test]
async fn test_empty_vec_source_is_an_error() {
    let source: Vec<SourceRecord> = Vec::new();
    assert!(matches!(source.load().await, Err(SourceLoadError::Empty(_))));
}
