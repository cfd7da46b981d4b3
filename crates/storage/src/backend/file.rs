//! Directory-backed storage: one `<id>.ver` file per version.
//!
//! Writes go to `<id>.ver.tmp` first and are renamed into place, so a
//! crash mid-write never leaves a truncated record under the real name.
//! Stray `.tmp` files are ignored by [`StorageBackend::keys`].

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

use vellum_core::{Result, VersionId};

use super::traits::StorageBackend;

/// Record file extension
pub const RECORD_EXTENSION: &str = "ver";

/// File-per-version storage in a single directory
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Open (creating if needed) a backend rooted at `dir`
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(FileBackend { dir })
    }

    /// Root directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, id: &VersionId) -> PathBuf {
        self.dir.join(format!("{}.{}", id, RECORD_EXTENSION))
    }
}

impl StorageBackend for FileBackend {
    fn put(&self, id: &VersionId, bytes: &[u8]) -> Result<()> {
        let path = self.record_path(id);
        let temp_path = path.with_extension(format!("{}.tmp", RECORD_EXTENSION));

        let write = || -> io::Result<()> {
            let mut file = fs::File::create(&temp_path)?;
            file.write_all(bytes)?;
            file.sync_all()?;
            fs::rename(&temp_path, &path)
        };
        if let Err(e) = write() {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }
        Ok(())
    }

    fn get(&self, id: &VersionId) -> Result<Option<Vec<u8>>> {
        match fs::read(self.record_path(id)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn remove(&self, id: &VersionId) -> Result<bool> {
        match fs::remove_file(self.record_path(id)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn keys(&self) -> Result<Vec<VersionId>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match VersionId::from_string(stem) {
                Some(id) => ids.push(id),
                None => warn!(path = %path.display(), "Ignoring record file with a non-uuid name"),
            }
        }
        Ok(ids)
    }

    fn name(&self) -> &'static str {
        "file"
    }
}
