//! Snapshot builder — an in-memory tree describing one storage subtree.

use std::path::Path;

use crate::error::SyncError;
use crate::storage::Storage;
use crate::types::{sort_by_name, StoreEntry};

/// A [`StoreEntry`] with its ordered children. Only directories have
/// children. The default value is the zero sentinel: "nothing here".
///
/// The same shape serves as snapshot node and diff node: a diff is the
/// minimal subtree of the source snapshot to materialize on the
/// destination, every entry copied verbatim from the source, never
/// synthesized. Trees are built fresh per sync call, immutable thereafter,
/// and discarded once consumed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeNode {
    pub entry: StoreEntry,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// The zero sentinel: empty entry, no children.
    pub fn zero() -> Self {
        Self::default()
    }

    /// A node with no children.
    pub fn leaf(entry: StoreEntry) -> Self {
        Self {
            entry,
            children: Vec::new(),
        }
    }

    /// Whether this is the zero sentinel.
    pub fn is_zero(&self) -> bool {
        self.entry.is_zero() && self.children.is_empty()
    }
}

/// Build a snapshot of the subtree of `storage` under `path`.
///
/// `self_entry` becomes the root node's entry. Children are sorted by name
/// because listing order is not assumed stable and downstream comparison
/// must be deterministic. Directories recurse depth-first, one branch fully
/// before the next; files become leaves.
///
/// Any `list` failure at any depth aborts the whole build with the failing
/// path attached; partial snapshots are never returned.
pub fn build_snapshot(
    storage: &dyn Storage,
    self_entry: StoreEntry,
    path: &Path,
) -> Result<TreeNode, SyncError> {
    let mut listing = storage.list(path).map_err(|source| SyncError::Snapshot {
        path: path.to_path_buf(),
        source,
    })?;
    sort_by_name(&mut listing);

    let mut children = Vec::with_capacity(listing.len());
    for child in listing {
        if child.is_dir {
            let child_path = path.join(&child.name);
            children.push(build_snapshot(storage, child, &child_path)?);
        } else {
            children.push(TreeNode::leaf(child));
        }
    }
    Ok(TreeNode {
        entry: self_entry,
        children,
    })
}
