use std::fs;

use hugo_export_engine::{ensure_output_dir, AtomicFileWriter, FileStore, LocalFileStore, PersistError};
use tempfile::TempDir;

#[test]
fn creates_missing_output_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("out").join("post");
    assert!(!new_dir.exists());
    ensure_output_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn atomic_write_replaces_existing_file() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let first = writer.write("index.md", b"hello").unwrap();
    assert_eq!(first.file_name().unwrap(), "index.md");
    assert_eq!(fs::read_to_string(&first).unwrap(), "hello");

    let second = writer.write("index.md", b"world").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&second).unwrap(), "world");
}

#[test]
fn no_partial_file_when_dir_is_a_file() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = AtomicFileWriter::new(file_path.clone());
    let result = writer.write("index.md", b"data");
    assert!(result.is_err());
    assert!(!file_path.with_file_name("index.md").exists());
}

#[test]
fn local_store_copies_and_reads_back() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("uploads").join("a.png");
    fs::create_dir_all(source.parent().unwrap()).unwrap();
    fs::write(&source, b"png").unwrap();

    let store = LocalFileStore;
    let target = temp.path().join("bundle").join("a.png");
    store.create_dir_all(target.parent().unwrap()).unwrap();
    store.copy(&source, &target).unwrap();

    assert!(store.exists(&target));
    assert_eq!(store.read(&target).unwrap(), b"png");
}

#[test]
fn local_store_copy_reports_missing_source() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("nope.png");

    let err = LocalFileStore
        .copy(&missing, &temp.path().join("out.png"))
        .unwrap_err();
    assert!(matches!(err, PersistError::MissingSource(path) if path == missing));
}
