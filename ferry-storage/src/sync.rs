//! Sync orchestrator — realize a diff tree against the destination backend.

use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::diff::diff_tree;
use crate::error::SyncError;
use crate::snapshot::{build_snapshot, TreeNode};
use crate::storage::Storage;
use crate::types::StoreEntry;

/// Observation points of a sync run.
///
/// Injected into [`sync_with_observer`] instead of ambient verbosity state.
/// All methods default to no-ops.
pub trait SyncObserver {
    /// A sync run is starting.
    fn sync_started(&self, src_root: &Path, dst_root: &Path) {
        let _ = (src_root, dst_root);
    }

    /// One file finished copying to the destination.
    fn file_copied(&self, dst_path: &Path, bytes: u64) {
        let _ = (dst_path, bytes);
    }

    /// The trees were already identical; nothing was done.
    fn already_in_sync(&self) {}
}

/// The do-nothing observer behind [`sync`].
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl SyncObserver for NullObserver {}

/// Mirror `dst_root` on `dst` to match `src_root` on `src`.
///
/// Strictly additive/overwrite-only: entries present only on the
/// destination are never inspected, altered, or removed. Execution is
/// sequential and first-error-stops: no partial-success bookkeeping, no
/// retry, no rollback of already-applied changes.
pub fn sync(
    src: &dyn Storage,
    src_root: &Path,
    dst: &dyn Storage,
    dst_root: &Path,
) -> Result<(), SyncError> {
    sync_with_observer(src, src_root, dst, dst_root, &NullObserver)
}

/// [`sync`] with an explicit [`SyncObserver`].
pub fn sync_with_observer(
    src: &dyn Storage,
    src_root: &Path,
    dst: &dyn Storage,
    dst_root: &Path,
    observer: &dyn SyncObserver,
) -> Result<(), SyncError> {
    observer.sync_started(src_root, dst_root);

    // Root probe: a listing failure means "not a directory" here and is not
    // propagated. A truly unlistable root still fails just below, in the
    // snapshot build, so the leniency only affects the root entry's kind.
    let src_self = probe_root(src, src_root);
    let dst_self = probe_root(dst, dst_root);

    let src_tree = build_snapshot(src, src_self, src_root)?;
    let dst_tree = build_snapshot(dst, dst_self, dst_root)?;

    let diff = diff_tree(&src_tree, &dst_tree);
    if diff.is_zero() {
        observer.already_in_sync();
        return Ok(());
    }
    apply(src, src_root, dst, dst_root, &diff, observer)
}

fn probe_root(storage: &dyn Storage, root: &Path) -> StoreEntry {
    StoreEntry {
        is_dir: storage.list(root).is_ok(),
        ..StoreEntry::default()
    }
}

struct Frame<'a> {
    node: &'a TreeNode,
    src_dir: PathBuf,
    dst_dir: PathBuf,
}

/// Depth-first apply-walk over the diff tree.
///
/// Runs on an explicit work stack rather than the call stack, so directory
/// depth cannot overflow; children are pushed in reverse, which keeps the
/// traversal order identical to the recursive formulation. A directory that
/// fails to create never has its subtree attempted; the first error stops
/// the whole walk.
fn apply(
    src: &dyn Storage,
    src_root: &Path,
    dst: &dyn Storage,
    dst_root: &Path,
    diff: &TreeNode,
    observer: &dyn SyncObserver,
) -> Result<(), SyncError> {
    let mut stack = vec![Frame {
        node: diff,
        src_dir: src_root.to_path_buf(),
        dst_dir: dst_root.to_path_buf(),
    }];

    while let Some(frame) = stack.pop() {
        let src_path = join_entry(&frame.src_dir, &frame.node.entry.name);
        let dst_path = join_entry(&frame.dst_dir, &frame.node.entry.name);

        if frame.node.entry.is_dir {
            dst.mkdir(&dst_path).map_err(|source| SyncError::Mkdir {
                path: dst_path.clone(),
                source,
            })?;
            for child in frame.node.children.iter().rev() {
                stack.push(Frame {
                    node: child,
                    src_dir: src_path.clone(),
                    dst_dir: dst_path.clone(),
                });
            }
        } else {
            copy_file(
                src,
                &src_path,
                dst,
                &dst_path,
                frame.node.entry.modified,
                observer,
            )?;
        }
    }
    Ok(())
}

/// The root diff node carries an empty name; joining it must leave the path
/// unchanged.
fn join_entry(dir: &Path, name: &str) -> PathBuf {
    if name.is_empty() {
        dir.to_path_buf()
    } else {
        dir.join(name)
    }
}

/// Copy one file from source to destination, restoring `modified`.
///
/// The read and write streams are scoped to this one copy and released
/// before any sibling is attempted.
fn copy_file(
    src: &dyn Storage,
    src_path: &Path,
    dst: &dyn Storage,
    dst_path: &Path,
    modified: Option<DateTime<Utc>>,
    observer: &dyn SyncObserver,
) -> Result<(), SyncError> {
    let mut reader = src
        .download(src_path)
        .map_err(|source| SyncError::Download {
            path: src_path.to_path_buf(),
            source,
        })?;
    let mut writer = dst
        .upload(dst_path, modified)
        .map_err(|source| SyncError::Upload {
            path: dst_path.to_path_buf(),
            source,
        })?;
    let bytes = io::copy(&mut reader, &mut writer).map_err(|source| SyncError::Copy {
        src: src_path.to_path_buf(),
        dst: dst_path.to_path_buf(),
        source,
    })?;
    writer.close().map_err(|source| SyncError::Close {
        path: dst_path.to_path_buf(),
        source,
    })?;
    observer.file_copied(dst_path, bytes);
    Ok(())
}
