//! Local-filesystem backend.

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use filetime::FileTime;

use crate::error::{io_err, StorageError};
use crate::storage::{normalize_relative, Storage, UploadStream};
use crate::types::StoreEntry;

/// Storage over a local directory tree.
///
/// Contract paths are resolved lexically against the canonicalized root;
/// components that escape it are rejected with
/// [`StorageError::OutOfRoot`]. The process is not chrooted; callers
/// wanting real isolation must arrange it themselves.
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    /// Open a local storage rooted at `root`.
    ///
    /// Canonicalizes the root and probes it for writability by creating and
    /// writing a temporary file.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, StorageError> {
        let root = root.as_ref();
        let root = fs::canonicalize(root).map_err(|e| io_err(root, e))?;
        let mut probe = tempfile::tempfile_in(&root).map_err(|e| io_err(&root, e))?;
        probe.write_all(b"hello").map_err(|e| io_err(&root, e))?;
        Ok(Self { root })
    }

    fn resolve(&self, relative: &Path) -> Result<PathBuf, StorageError> {
        Ok(self.root.join(normalize_relative(relative)?))
    }
}

impl Storage for LocalStorage {
    fn list(&self, path: &Path) -> Result<Vec<StoreEntry>, StorageError> {
        let abs = self.resolve(path)?;
        let mut entries = Vec::new();
        for dirent in fs::read_dir(&abs).map_err(|e| io_err(&abs, e))? {
            let dirent = dirent.map_err(|e| io_err(&abs, e))?;
            let meta = dirent.metadata().map_err(|e| io_err(dirent.path(), e))?;
            entries.push(StoreEntry {
                is_dir: meta.is_dir(),
                modified: meta.modified().ok().map(DateTime::<Utc>::from),
                name: dirent.file_name().to_string_lossy().into_owned(),
                // Directory sizes are filesystem-dependent noise; the
                // contract only promises sizes for files.
                size: if meta.is_dir() { 0 } else { meta.len() },
            });
        }
        Ok(entries)
    }

    fn download(&self, path: &Path) -> Result<Box<dyn Read>, StorageError> {
        let abs = self.resolve(path)?;
        let file = File::open(&abs).map_err(|e| io_err(&abs, e))?;
        Ok(Box::new(file))
    }

    fn upload(
        &self,
        path: &Path,
        modified: Option<DateTime<Utc>>,
    ) -> Result<Box<dyn UploadStream>, StorageError> {
        let abs = self.resolve(path)?;
        let file = File::create(&abs).map_err(|e| io_err(&abs, e))?;
        Ok(Box::new(LocalUpload {
            file,
            abs,
            modified,
        }))
    }

    fn mkdir(&self, path: &Path) -> Result<(), StorageError> {
        let abs = self.resolve(path)?;
        fs::create_dir_all(&abs).map_err(|e| io_err(&abs, e))
    }

    fn rename(&self, src: &Path, dst: &Path) -> Result<(), StorageError> {
        let src_abs = self.resolve(src)?;
        let dst_abs = self.resolve(dst)?;
        let meta = fs::metadata(&src_abs).map_err(|e| io_err(&src_abs, e))?;
        if meta.is_dir() {
            return Err(StorageError::IsDirectory { path: src_abs });
        }
        fs::rename(&src_abs, &dst_abs).map_err(|e| io_err(&src_abs, e))
    }

    fn remove(&self, path: &Path) -> Result<(), StorageError> {
        let abs = self.resolve(path)?;
        let meta = fs::metadata(&abs).map_err(|e| io_err(&abs, e))?;
        if meta.is_dir() {
            fs::remove_dir(&abs).map_err(|e| io_err(&abs, e))
        } else {
            fs::remove_file(&abs).map_err(|e| io_err(&abs, e))
        }
    }
}

/// Upload stream that restores the recorded modification time on close.
struct LocalUpload {
    file: File,
    abs: PathBuf,
    modified: Option<DateTime<Utc>>,
}

impl Write for LocalUpload {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

impl UploadStream for LocalUpload {
    fn close(self: Box<Self>) -> io::Result<()> {
        let LocalUpload {
            mut file,
            abs,
            modified,
        } = *self;
        file.flush()?;
        drop(file);
        if let Some(ts) = modified {
            let mtime = FileTime::from_unix_time(ts.timestamp(), ts.timestamp_subsec_nanos());
            // Restoration is best-effort per the contract.
            if let Err(err) = filetime::set_file_mtime(&abs, mtime) {
                tracing::debug!("failed to restore mtime on {}: {err}", abs.display());
            }
        }
        Ok(())
    }
}
