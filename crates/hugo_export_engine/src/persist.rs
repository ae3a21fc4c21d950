use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("source file not found: {0}")]
    MissingSource(PathBuf),
    #[error("path has no file name: {0}")]
    InvalidPath(PathBuf),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Filesystem capability used by every stage that touches the export tree.
pub trait FileStore: Send + Sync {
    fn create_dir_all(&self, dir: &Path) -> Result<(), PersistError>;

    fn copy(&self, from: &Path, to: &Path) -> Result<(), PersistError>;

    fn read(&self, path: &Path) -> Result<Vec<u8>, PersistError>;

    /// Whole-file write; an existing file is replaced.
    fn write(&self, path: &Path, contents: &[u8]) -> Result<(), PersistError>;

    fn exists(&self, path: &Path) -> bool;
}

/// `FileStore` over the local disk with atomic writes.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFileStore;

impl FileStore for LocalFileStore {
    fn create_dir_all(&self, dir: &Path) -> Result<(), PersistError> {
        ensure_output_dir(dir)
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<(), PersistError> {
        if !from.is_file() {
            return Err(PersistError::MissingSource(from.to_path_buf()));
        }
        let bytes = fs::read(from)?;
        self.write(to, &bytes)
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>, PersistError> {
        Ok(fs::read(path)?)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<(), PersistError> {
        let (Some(dir), Some(filename)) = (path.parent(), path.file_name()) else {
            return Err(PersistError::InvalidPath(path.to_path_buf()));
        };
        AtomicFileWriter::new(dir.to_path_buf()).write(&filename.to_string_lossy(), contents)?;
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// Ensure output directory exists; create if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::OutputDir(format!(
                "{} is not a directory",
                dir.display()
            )));
        }
    } else {
        fs::create_dir_all(dir)
            .map_err(|e| PersistError::OutputDir(format!("{}: {e}", dir.display())))?;
    }
    Ok(())
}

/// Atomically write content to `{dir}/{filename}` by writing a temp file then renaming.
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn write(&self, filename: &str, content: &[u8]) -> Result<PathBuf, PersistError> {
        ensure_output_dir(&self.dir)?;

        let target = self.dir.join(filename);
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(content)?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;

        if target.exists() {
            fs::remove_file(&target)?;
        }
        tmp.persist(&target).map_err(|e| PersistError::Io(e.error))?;
        Ok(target)
    }
}
