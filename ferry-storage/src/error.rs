//! Error types for ferry-storage.

use std::path::PathBuf;

use thiserror::Error;

/// All errors a storage backend can report.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The path does not exist in the backend.
    #[error("path not found: {path}")]
    NotFound { path: PathBuf },

    /// The path resolves outside the backend's root. Catches programming
    /// errors; not a security boundary.
    #[error("path escapes the storage root: {path}")]
    OutOfRoot { path: PathBuf },

    /// The operation only applies to files, but the path is a directory.
    #[error("path is a directory: {path}")]
    IsDirectory { path: PathBuf },

    /// Underlying I/O failure, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor mapping an `io::Error` to [`StorageError`],
/// folding `NotFound` kinds into the dedicated variant.
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> StorageError {
    if source.kind() == std::io::ErrorKind::NotFound {
        return StorageError::NotFound { path: path.into() };
    }
    StorageError::Io {
        path: path.into(),
        source,
    }
}

/// All errors that can arise from snapshot building and sync orchestration.
///
/// Every variant wraps the first failure observed, with the failing path(s)
/// attached; no layer attempts partial recovery.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Listing failed while building a snapshot.
    #[error("failed to list {path}: {source}")]
    Snapshot {
        path: PathBuf,
        #[source]
        source: StorageError,
    },

    /// Creating a destination directory failed. Its subtree is never
    /// attempted.
    #[error("failed to create directory {path}: {source}")]
    Mkdir {
        path: PathBuf,
        #[source]
        source: StorageError,
    },

    /// Opening a source file for download failed.
    #[error("failed to open {path} for download: {source}")]
    Download {
        path: PathBuf,
        #[source]
        source: StorageError,
    },

    /// Opening a destination file for upload failed.
    #[error("failed to open {path} for upload: {source}")]
    Upload {
        path: PathBuf,
        #[source]
        source: StorageError,
    },

    /// The byte copy from source to destination failed.
    #[error("failed to copy {src} to {dst}: {source}")]
    Copy {
        src: PathBuf,
        dst: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Closing the destination stream failed.
    #[error("failed to close {path}: {source}")]
    Close {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
