//! Single-file JSON snapshot of a [`VectorIndex`].
//!
//! Writes go to a temporary file in the target directory which is then
//! renamed over the destination, so readers see either the old snapshot or
//! the new one, never a partial file.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::index::{IndexEntry, IndexError, VectorIndex};

const FORMAT_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("no index snapshot at {}", .0.display())]
    NotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("snapshot rejected: {0}")]
    Index(#[from] IndexError),

    #[error("unsupported snapshot version {0}")]
    UnsupportedVersion(u32),
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    dimension: usize,
    entries: &'a [IndexEntry],
}

#[derive(Deserialize)]
struct SnapshotOwned {
    version: u32,
    entries: Vec<IndexEntry>,
}

/// Persist `index` at `path`, replacing any previous snapshot.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file cannot be
/// written and renamed into place.
pub fn save(index: &VectorIndex, path: &Path) -> Result<(), SnapshotError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        serde_json::to_writer(
            &mut writer,
            &SnapshotRef {
                version: FORMAT_VERSION,
                dimension: index.dimension(),
                entries: index.entries(),
            },
        )?;
        writer.flush()?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| SnapshotError::Io(e.error))?;

    tracing::info!(path = %path.display(), entries = index.len(), "index snapshot saved");
    Ok(())
}

/// Read a snapshot written by [`save`].
///
/// # Errors
///
/// Returns [`SnapshotError::NotFound`] if `path` does not exist, or another
/// variant if the file is unreadable or its contents are not a valid index.
pub fn load(path: &Path) -> Result<VectorIndex, SnapshotError> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(SnapshotError::NotFound(path.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };

    let snapshot: SnapshotOwned = serde_json::from_reader(BufReader::new(file))?;
    if snapshot.version != FORMAT_VERSION {
        return Err(SnapshotError::UnsupportedVersion(snapshot.version));
    }
    let index = VectorIndex::build(snapshot.entries)?;
    tracing::debug!(path = %path.display(), entries = index.len(), "index snapshot loaded");
    Ok(index)
}
