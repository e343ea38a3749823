//! Domain types for the storage layer.

use std::fmt;

use chrono::{DateTime, Utc};

/// One filesystem object as reported by [`Storage::list`](crate::Storage::list).
///
/// `name` is a single path segment relative to the listed directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreEntry {
    /// Whether the entry is a directory.
    pub is_dir: bool,
    /// Last modification time, when the backend reports one. Carried so an
    /// upload can restore it; never part of diffing identity.
    pub modified: Option<DateTime<Utc>>,
    /// Entry name, a single path segment.
    pub name: String,
    /// Size in bytes. `0` means zero-length or unknown; backends only
    /// promise sizes for files.
    pub size: u64,
}

impl StoreEntry {
    /// Whether this is the empty entry (every field at its default).
    pub fn is_zero(&self) -> bool {
        *self == StoreEntry::default()
    }

    /// Identity equality used by the tree differ.
    ///
    /// Two entries are the same object when they share kind and name and,
    /// only when both sides report a nonzero size, the same size.
    /// Modification time is never compared. Two same-named, same-kind
    /// entries that both report size `0` therefore always compare identical,
    /// whatever their content; that blind spot is part of the contract, not
    /// something callers should patch around.
    pub fn same_identity(&self, other: &StoreEntry) -> bool {
        if self.is_dir != other.is_dir {
            return false;
        }
        if self.size != 0 && other.size != 0 && self.size != other.size {
            return false;
        }
        self.name == other.name
    }
}

impl fmt::Display for StoreEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.name.fmt(f)
    }
}

/// Sort a listing by entry name, the canonical order for snapshots.
pub fn sort_by_name(entries: &mut [StoreEntry]) {
    entries.sort_by(|a, b| a.name.cmp(&b.name));
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn file(name: &str, size: u64) -> StoreEntry {
        StoreEntry {
            name: name.to_owned(),
            size,
            ..StoreEntry::default()
        }
    }

    #[test]
    fn default_entry_is_zero() {
        assert!(StoreEntry::default().is_zero());
        assert!(!file("a", 0).is_zero());
    }

    #[test]
    fn identity_requires_same_kind_and_name() {
        let dir = StoreEntry {
            is_dir: true,
            name: "x".to_owned(),
            ..StoreEntry::default()
        };
        assert!(!dir.same_identity(&file("x", 0)));
        assert!(!file("x", 0).same_identity(&file("y", 0)));
        assert!(file("x", 0).same_identity(&file("x", 0)));
    }

    #[test]
    fn size_compared_only_when_both_nonzero() {
        assert!(!file("x", 10).same_identity(&file("x", 25)));
        assert!(file("x", 10).same_identity(&file("x", 10)));
        // A zero-reported size on either side is a wildcard.
        assert!(file("x", 0).same_identity(&file("x", 25)));
        assert!(file("x", 10).same_identity(&file("x", 0)));
    }

    #[test]
    fn modified_time_never_part_of_identity() {
        let mut a = file("x", 10);
        let mut b = file("x", 10);
        a.modified = Some(Utc.with_ymd_and_hms(2017, 1, 10, 9, 55, 3).unwrap());
        b.modified = Some(Utc.with_ymd_and_hms(2017, 1, 10, 8, 55, 3).unwrap());
        assert!(a.same_identity(&b));
    }

    #[test]
    fn sort_orders_by_name() {
        let mut entries = vec![file("b", 1), file("a", 1), file("c", 1)];
        sort_by_name(&mut entries);
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn display_shows_name() {
        assert_eq!(file("hello", 0).to_string(), "hello");
    }
}
