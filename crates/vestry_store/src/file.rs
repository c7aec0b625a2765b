//! File-based storage backend for persistent snapshots.

use crate::backend::StoreBackend;
use crate::error::StoreResult;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// A file-based snapshot backend.
///
/// Saves write to a sibling temporary file, fsync it, and rename it
/// over the target path, so a crash mid-save leaves either the old
/// snapshot or the new one, never a torn file.
///
/// # Example
///
/// ```no_run
/// use vestry_store::{FileBackend, StoreBackend};
/// use std::path::Path;
///
/// let mut backend = FileBackend::open(Path::new("books.vestry")).unwrap();
/// backend.save(b"snapshot").unwrap();
/// ```
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    tmp_path: PathBuf,
}

impl FileBackend {
    /// Creates a backend for the given snapshot path.
    ///
    /// The file does not need to exist yet; the first `load` then
    /// returns `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the path has no valid file name.
    pub fn open(path: &Path) -> StoreResult<Self> {
        let mut tmp_name = path
            .file_name()
            .ok_or_else(|| {
                std::io::Error::new(ErrorKind::InvalidInput, "snapshot path has no file name")
            })?
            .to_os_string();
        tmp_name.push(".tmp");

        Ok(Self {
            path: path.to_path_buf(),
            tmp_path: path.with_file_name(tmp_name),
        })
    }

    /// Like [`FileBackend::open`], creating parent directories first.
    ///
    /// # Errors
    ///
    /// Returns an error if the directories cannot be created.
    pub fn open_with_create_dirs(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Self::open(path)
    }

    /// Returns the snapshot path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StoreBackend for FileBackend {
    fn load(&self) -> StoreResult<Option<Vec<u8>>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&mut self, bytes: &[u8]) -> StoreResult<()> {
        let mut file = File::create(&self.tmp_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        drop(file);

        fs::rename(&self.tmp_path, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn load_before_first_save_is_none() {
        let dir = TempDir::new().unwrap();
        let backend = FileBackend::open(&dir.path().join("books.vestry")).unwrap();
        assert!(backend.load().unwrap().is_none());
    }

    #[test]
    fn save_then_load_roundtrips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("books.vestry");

        let mut backend = FileBackend::open(&path).unwrap();
        backend.save(b"snapshot one").unwrap();
        assert_eq!(backend.load().unwrap().unwrap(), b"snapshot one");

        backend.save(b"snapshot two").unwrap();
        assert_eq!(backend.load().unwrap().unwrap(), b"snapshot two");
    }

    #[test]
    fn survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("books.vestry");

        let mut backend = FileBackend::open(&path).unwrap();
        backend.save(b"durable").unwrap();
        drop(backend);

        let backend = FileBackend::open(&path).unwrap();
        assert_eq!(backend.load().unwrap().unwrap(), b"durable");
    }

    #[test]
    fn save_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("books.vestry");

        let mut backend = FileBackend::open(&path).unwrap();
        backend.save(b"clean").unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("books.vestry")]);
    }

    #[test]
    fn create_dirs_variant_builds_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/deeper/books.vestry");

        let mut backend = FileBackend::open_with_create_dirs(&path).unwrap();
        backend.save(b"nested").unwrap();
        assert_eq!(backend.load().unwrap().unwrap(), b"nested");
    }
}
