//! Checks of a flat map proof which run before any hashing.

use super::{MapProofEntry, MapProofStatus};
use crate::{error::MalformedKey, key::KeyChecks};

/// Validate the keys of the pruned nodes. Requested keys are plain 256-bit keys and always valid.
pub(super) fn check_keys(entries: &[MapProofEntry], checks: KeyChecks) -> Result<(), MalformedKey> {
    for entry in entries {
        if let MapProofEntry::Branch { key, .. } = entry {
            key.validate(checks)?;
        }
    }
    Ok(())
}

/// Check that the entries are strictly ascending and that no entry lies under the entry before
/// it.
///
/// In a strictly ascending sequence, all keys under a pruned branch directly follow it. A
/// requested key under a pruned branch therefore makes the entry right after the branch one of
/// its descendants, which the adjacent prefix test rejects.
pub(super) fn check_structure(entries: &[MapProofEntry]) -> Result<(), MapProofStatus> {
    use core::cmp::Ordering;

    for pair in entries.windows(2) {
        let (key, next) = (pair[0].db_key(), pair[1].db_key());
        match key.cmp(&next) {
            Ordering::Less if key.is_prefix_of(&next) => {
                return Err(MapProofStatus::InvalidStructure)
            }
            Ordering::Less => {}
            Ordering::Equal => return Err(MapProofStatus::DuplicatePath),
            Ordering::Greater => return Err(MapProofStatus::InvalidOrder),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::{
        tests::{branch_key, slice_from_bits},
        DbKey,
    };
    use alloc::vec;

    fn pruned(bits: &str) -> MapProofEntry {
        MapProofEntry::Branch {
            key: branch_key(bits),
            hash: [0; 32],
        }
    }

    fn absent(bits: &str) -> MapProofEntry {
        MapProofEntry::Absent {
            key: slice_from_bits(bits),
        }
    }

    #[test]
    fn ascending_siblings() {
        let entries = vec![pruned("00"), absent("01"), pruned("1")];
        assert_eq!(check_structure(&entries), Ok(()));
    }

    #[test]
    fn branch_followed_by_its_descendant() {
        let entries = vec![pruned("0"), pruned("01")];
        assert_eq!(
            check_structure(&entries),
            Err(MapProofStatus::InvalidStructure)
        );
    }

    #[test]
    fn requested_key_under_a_distant_branch() {
        // "011" lies under "0", two entries further on.
        let entries = vec![pruned("0"), pruned("0100"), absent("011"), pruned("1")];
        assert_eq!(
            check_structure(&entries),
            Err(MapProofStatus::InvalidStructure)
        );

        let entries = vec![pruned("0"), absent("011"), pruned("1")];
        assert_eq!(
            check_structure(&entries),
            Err(MapProofStatus::InvalidStructure)
        );
    }

    #[test]
    fn relaxed_branch_with_garbage_before_its_descendant() {
        let sloppy =
            DbKey::branch_with_checks(slice_from_bits("0001"), 2, KeyChecks::Relaxed).unwrap();
        let entries = vec![
            MapProofEntry::Branch {
                key: sloppy,
                hash: [0; 32],
            },
            absent("001"),
        ];
        assert_eq!(
            check_structure(&entries),
            Err(MapProofStatus::InvalidStructure)
        );
    }

    #[test]
    fn descending_entries() {
        let entries = vec![absent("1"), absent("0")];
        assert_eq!(check_structure(&entries), Err(MapProofStatus::InvalidOrder));
    }

    #[test]
    fn equal_entries() {
        let entries = vec![absent("1"), absent("1")];
        assert_eq!(check_structure(&entries), Err(MapProofStatus::DuplicatePath));
    }

    #[test]
    fn only_pruned_keys_are_validated() {
        let sloppy = DbKey::branch_with_checks(
            slice_from_bits("11"),
            1,
            KeyChecks::Relaxed,
        )
        .unwrap();
        let entries = vec![MapProofEntry::Branch {
            key: sloppy,
            hash: [0; 32],
        }];
        assert_eq!(
            check_keys(&entries, KeyChecks::Strict),
            Err(MalformedKey::TrailingBits {
                significant_bits: 1
            })
        );
        assert_eq!(check_keys(&entries, KeyChecks::Relaxed), Ok(()));
        assert_eq!(check_keys(&[absent("1")], KeyChecks::Strict), Ok(()));
    }
}
