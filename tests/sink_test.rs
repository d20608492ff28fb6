use shazport::{
    cli::ConsoleSink,
    import::{ProgressSink, Stage},
};
use tempfile::tempdir;

#[test]
fn test_log_file_lines() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("import.log");

    let sink = ConsoleSink::new(Some(&path)).unwrap();
    sink.info("Loaded 3 records.");
    sink.warn(Stage::Upload, "batch 1 (100 tracks) was not added");
    drop(sink);

    let log = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with(" - INFO - Loaded 3 records."));
    assert!(lines[1].ends_with(" - WARNING - [upload] batch 1 (100 tracks) was not added"));

    // "YYYY-MM-DD HH:MM:SS - "
    let timestamp = &lines[0][..19];
    assert_eq!(timestamp.len(), 19);
    assert_eq!(&timestamp[4..5], "-");
    assert_eq!(&timestamp[13..14], ":");
}

#[test]
fn test_log_file_is_appended() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("import.log");

    ConsoleSink::new(Some(&path)).unwrap().info("first run");
    ConsoleSink::new(Some(&path)).unwrap().info("second run");

    let log = std::fs::read_to_string(&path).unwrap();
    assert_eq!(log.lines().count(), 2);
    assert!(log.contains("first run"));
    assert!(log.contains("second run"));
}

#[test]
fn test_unopenable_log_file_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing").join("import.log");

    assert!(ConsoleSink::new(Some(&path)).is_err());
}
