//! The capability contract every storage backend satisfies.

use std::io::{self, Read, Write};
use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::error::StorageError;
use crate::types::StoreEntry;

/// Writable stream returned by [`Storage::upload`].
///
/// `close` consumes the stream and reports failures. On close the backend
/// restores the object's modification time to the value passed to `upload`
/// (best-effort); dropping the stream without closing abandons that
/// restoration.
pub trait UploadStream: Write {
    fn close(self: Box<Self>) -> io::Result<()>;
}

/// The six-operation contract a backend must satisfy.
///
/// Paths are relative to an implementation-defined root. A compliant backend
/// MUST reject any path resolving outside that root with
/// [`StorageError::OutOfRoot`]; the check exists to catch programming
/// errors, not as a security boundary.
pub trait Storage {
    /// List the entries directly under `path`.
    ///
    /// Fails with [`StorageError::NotFound`] if `path` is absent.
    fn list(&self, path: &Path) -> Result<Vec<StoreEntry>, StorageError>;

    /// Open `path` for reading from offset zero.
    ///
    /// Fails with [`StorageError::NotFound`] if `path` is absent.
    fn download(&self, path: &Path) -> Result<Box<dyn Read>, StorageError>;

    /// Open `path` for writing: creates it if absent, truncates it if
    /// present. `modified` is restored as the object's modification time
    /// when the returned stream is closed.
    fn upload(
        &self,
        path: &Path,
        modified: Option<DateTime<Utc>>,
    ) -> Result<Box<dyn UploadStream>, StorageError>;

    /// Create a directory at `path`, including missing ancestors.
    /// Idempotent.
    fn mkdir(&self, path: &Path) -> Result<(), StorageError>;

    /// Rename a file. Directories are rejected with
    /// [`StorageError::IsDirectory`].
    fn rename(&self, src: &Path, dst: &Path) -> Result<(), StorageError>;

    /// Delete a file or an empty directory.
    fn remove(&self, path: &Path) -> Result<(), StorageError>;
}

/// Normalize a contract-relative path lexically.
///
/// `.` components are dropped and `..` pops the previous segment; a `..`
/// with nothing left to pop, or an absolute component, escapes the root and
/// is rejected with [`StorageError::OutOfRoot`]. The empty result addresses
/// the root itself.
pub(crate) fn normalize_relative(relative: &Path) -> Result<PathBuf, StorageError> {
    let mut normalized = PathBuf::new();
    let mut depth = 0usize;
    for component in relative.components() {
        match component {
            Component::CurDir => {}
            Component::Normal(part) => {
                normalized.push(part);
                depth += 1;
            }
            Component::ParentDir => {
                if depth == 0 {
                    return Err(StorageError::OutOfRoot {
                        path: relative.to_path_buf(),
                    });
                }
                normalized.pop();
                depth -= 1;
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(StorageError::OutOfRoot {
                    path: relative.to_path_buf(),
                });
            }
        }
    }
    Ok(normalized)
}
