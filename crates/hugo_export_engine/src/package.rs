use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use zip::result::ZipError;
use zip::write::{FileOptions, ZipWriter};

/// Folder every entry of the archive lives under.
pub const ARCHIVE_PREFIX: &str = "hugo-export/";

/// Entries written between two finish-and-reopen checkpoints.
pub const CHECKPOINT_ENTRIES: usize = 250;

#[derive(Debug, thiserror::Error)]
pub enum PackageError {
    #[error("failed to package {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to package {}: {source}", path.display())]
    Zip {
        path: PathBuf,
        #[source]
        source: ZipError,
    },
}

/// Zip `source_dir` into `target` with every entry under `hugo-export/`.
/// Returns the number of entries written.
pub fn package(source_dir: &Path, target: &Path) -> Result<usize, PackageError> {
    let io_err = |source: io::Error| PackageError::Io {
        path: target.to_path_buf(),
        source,
    };
    let zip_err = |source: ZipError| PackageError::Zip {
        path: target.to_path_buf(),
        source,
    };

    let mut entries = Vec::new();
    collect_entries(source_dir, source_dir, &mut entries).map_err(io_err)?;

    let file = File::create(target).map_err(io_err)?;
    let mut zip = ZipWriter::new(file);
    zip.add_directory::<_, ()>(ARCHIVE_PREFIX, FileOptions::default())
        .map_err(zip_err)?;
    let mut written = 1;

    for entry in &entries {
        let name = format!("{ARCHIVE_PREFIX}{}", entry.name);
        if entry.is_dir {
            zip.add_directory::<_, ()>(name, FileOptions::default())
                .map_err(zip_err)?;
        } else {
            let bytes = fs::read(&entry.path).map_err(io_err)?;
            zip.start_file::<_, ()>(name, FileOptions::default())
                .map_err(zip_err)?;
            zip.write_all(&bytes).map_err(io_err)?;
        }
        written += 1;

        if written % CHECKPOINT_ENTRIES == 0 {
            zip.finish().map_err(zip_err)?;
            let reopened = OpenOptions::new()
                .read(true)
                .write(true)
                .open(target)
                .map_err(io_err)?;
            zip = ZipWriter::new_append(reopened).map_err(zip_err)?;
            export_logging::export_debug!("{} entries checkpointed to {}", written, target.display());
        }
    }

    zip.finish().map_err(zip_err)?;
    export_logging::export_info!("packaged {} entries into {}", written, target.display());
    Ok(written)
}

struct Entry {
    path: PathBuf,
    /// `/`-separated path relative to the packaged root.
    name: String,
    is_dir: bool,
}

fn collect_entries(root: &Path, dir: &Path, entries: &mut Vec<Entry>) -> io::Result<()> {
    let mut children: Vec<_> = fs::read_dir(dir)?.collect::<Result<_, _>>()?;
    children.sort_by_key(|child| child.file_name());

    for child in children {
        let path = child.path();
        let relative = path
            .strip_prefix(root)
            .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
        let mut name = relative
            .components()
            .map(|part| part.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        if child.file_type()?.is_dir() {
            name.push('/');
            entries.push(Entry {
                path: path.clone(),
                name,
                is_dir: true,
            });
            collect_entries(root, &path, entries)?;
        } else {
            entries.push(Entry {
                path,
                name,
                is_dir: false,
            });
        }
    }
    Ok(())
}
