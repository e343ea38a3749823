//! Structural tree diff.

use std::collections::HashMap;

use crate::snapshot::TreeNode;

/// Compute the minimal subtree of `source` that must be materialized on the
/// destination for it to mirror `source`.
///
/// Pure and infallible. If the two entries differ per
/// [`StoreEntry::same_identity`](crate::StoreEntry::same_identity), the
/// whole source subtree is returned unchanged: once identity itself
/// differs, the destination subtree is treated as wholly stale and nothing
/// below it is reconciled. Otherwise destination children are indexed by
/// name. Source children with a same-named counterpart recurse, keeping
/// only non-zero results; source-only children are kept whole;
/// destination-only children are invisible and never scheduled for
/// removal. A node with no kept children collapses to the zero sentinel.
///
/// Diffing is purely structural (name, kind, size-when-both-nonzero). There
/// is no content hashing, so two entries judged identical can still carry
/// different bytes when either side reports a zero size.
pub fn diff_tree(source: &TreeNode, destination: &TreeNode) -> TreeNode {
    if !source.entry.same_identity(&destination.entry) {
        return source.clone();
    }

    let by_name: HashMap<&str, &TreeNode> = destination
        .children
        .iter()
        .map(|child| (child.entry.name.as_str(), child))
        .collect();

    let mut changed = Vec::new();
    for child in &source.children {
        match by_name.get(child.entry.name.as_str()) {
            Some(counterpart) => {
                let node = diff_tree(child, counterpart);
                if !node.is_zero() {
                    changed.push(node);
                }
            }
            None => changed.push(child.clone()),
        }
    }

    if changed.is_empty() {
        return TreeNode::zero();
    }
    TreeNode {
        entry: source.entry.clone(),
        children: changed,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};

    use crate::types::StoreEntry;

    use super::*;

    fn file(name: &str, size: u64, modified: DateTime<Utc>) -> TreeNode {
        TreeNode::leaf(StoreEntry {
            is_dir: false,
            modified: Some(modified),
            name: name.to_owned(),
            size,
        })
    }

    fn dir(name: &str, children: Vec<TreeNode>) -> TreeNode {
        TreeNode {
            entry: StoreEntry {
                is_dir: true,
                modified: None,
                name: name.to_owned(),
                size: 0,
            },
            children,
        }
    }

    #[test]
    fn identical_trees_diff_to_zero() {
        let d1 = Utc.with_ymd_and_hms(2017, 1, 10, 9, 55, 3).unwrap();
        let tree = dir(
            "/",
            vec![
                file("file_a", 10, d1),
                dir("folder_a", vec![file("file_aa", 10, d1)]),
            ],
        );
        assert!(diff_tree(&tree, &tree).is_zero());
    }

    #[test]
    fn mismatched_identity_returns_whole_source_subtree() {
        let d1 = Utc.with_ymd_and_hms(2017, 1, 10, 9, 55, 3).unwrap();
        let source = dir("x", vec![file("child", 10, d1)]);
        // Same name but a file, not a directory.
        let destination = file("x", 10, d1);
        assert_eq!(diff_tree(&source, &destination), source);
    }

    #[test]
    fn destination_only_children_are_invisible() {
        let d1 = Utc.with_ymd_and_hms(2017, 1, 10, 9, 55, 3).unwrap();
        let source = dir("/", vec![file("keep", 10, d1)]);
        let destination = dir("/", vec![file("extra", 5, d1), file("keep", 10, d1)]);
        assert!(diff_tree(&source, &destination).is_zero());
    }

    #[test]
    fn source_only_child_is_kept_whole() {
        let d1 = Utc.with_ymd_and_hms(2017, 1, 10, 9, 55, 3).unwrap();
        let nested = dir("new_dir", vec![file("deep", 3, d1)]);
        let source = dir("/", vec![nested.clone()]);
        let destination = dir("/", vec![]);
        let diff = diff_tree(&source, &destination);
        assert_eq!(diff.children, vec![nested]);
    }

    /// Source:
    ///
    /// ```text
    /// /file_a           (10, d1)
    /// /file_b           (10, d1)
    /// /file_c           (10, d1)
    /// /folder_a/file_aa (10, d1)
    /// /folder_a/file_ab (10, d1)
    /// /folder_b/file_ba (10, d1)
    /// ```
    ///
    /// Destination:
    ///
    /// ```text
    /// /file_a           (10, d2)  same size, different date
    /// /file_b           (25, d1)  different size
    /// /file_d           (10, d1)  destination-only
    /// /folder_a/file_aa (10, d1)
    /// /folder_b/file_ba (10, d1)
    /// ```
    ///
    /// `file_a` matches by name/kind/size despite the differing dates, so it
    /// is absent from the diff; `file_b` differs by size; `file_c` and
    /// `folder_a/file_ab` exist only in the source; `file_d` is invisible.
    #[test]
    fn date_insensitive_size_aware_diff() {
        let d1 = Utc.with_ymd_and_hms(2017, 1, 10, 9, 55, 3).unwrap();
        let d2 = Utc.with_ymd_and_hms(2017, 1, 10, 8, 55, 3).unwrap();

        let source = dir(
            "/",
            vec![
                file("file_a", 10, d1),
                file("file_b", 10, d1),
                file("file_c", 10, d1),
                dir(
                    "folder_a",
                    vec![file("file_aa", 10, d1), file("file_ab", 10, d1)],
                ),
                dir("folder_b", vec![file("file_ba", 10, d1)]),
            ],
        );

        let destination = dir(
            "/",
            vec![
                file("file_a", 10, d2),
                file("file_b", 25, d1),
                file("file_d", 10, d1),
                dir("folder_a", vec![file("file_aa", 10, d1)]),
                dir("folder_b", vec![file("file_ba", 10, d1)]),
            ],
        );

        let expected = dir(
            "/",
            vec![
                file("file_b", 10, d1),
                file("file_c", 10, d1),
                dir("folder_a", vec![file("file_ab", 10, d1)]),
            ],
        );

        assert_eq!(diff_tree(&source, &destination), expected);
    }

    #[test]
    fn zero_reported_size_matches_any_size() {
        let d1 = Utc.with_ymd_and_hms(2017, 1, 10, 9, 55, 3).unwrap();
        let source = dir("/", vec![file("f", 0, d1)]);
        let destination = dir("/", vec![file("f", 4096, d1)]);
        assert!(diff_tree(&source, &destination).is_zero());
    }

    #[test]
    fn diff_entries_are_copied_verbatim_from_source() {
        let d1 = Utc.with_ymd_and_hms(2017, 1, 10, 9, 55, 3).unwrap();
        let d2 = Utc.with_ymd_and_hms(2020, 6, 1, 0, 0, 0).unwrap();
        let source = dir("/", vec![file("f", 10, d1)]);
        let destination = dir("/", vec![file("f", 25, d2)]);
        let diff = diff_tree(&source, &destination);
        assert_eq!(diff.children[0].entry, source.children[0].entry);
    }
}
