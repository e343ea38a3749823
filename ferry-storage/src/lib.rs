//! # ferry-storage
//!
//! Tree-based diff-and-synchronize engine over pluggable storage backends.
//!
//! The [`Storage`] trait is the capability contract every backend satisfies;
//! [`build_snapshot`] turns a (backend, path) pair into an in-memory tree of
//! the whole subtree; [`diff_tree`] computes the minimal subtree of the
//! source snapshot that differs from the destination; [`sync`] realizes that
//! subtree against the destination backend.
//!
//! Everything is synchronous and blocking, and no state survives a sync
//! call: each run builds its snapshots from scratch.

pub mod diff;
pub mod error;
pub mod local;
pub mod memory;
pub mod snapshot;
pub mod storage;
pub mod sync;
pub mod types;

pub use diff::diff_tree;
pub use error::{StorageError, SyncError};
pub use local::LocalStorage;
pub use memory::MemoryStorage;
pub use snapshot::{build_snapshot, TreeNode};
pub use storage::{Storage, UploadStream};
pub use sync::{sync, sync_with_observer, NullObserver, SyncObserver};
pub use types::StoreEntry;
