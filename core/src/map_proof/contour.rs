//! Root hash recomputation from the sorted frontier of a map proof.
//!
//! The frontier is walked left to right while keeping a stack, the contour, of sub-trie roots
//! whose parents are not yet known. The common prefix of two adjacent entries is the key of
//! their lowest common ancestor. When the prefix shared with the next entry is shorter than the
//! prefix shared by the top two entries of the contour, the top two can no longer gain siblings
//! and are folded into their parent.

use alloc::vec::Vec;

use super::MapProofStatus;
use crate::{
    hasher::{Hash, ProofHasher, EMPTY_MAP_HASH},
    key::DbKey,
};

#[derive(Debug, Clone, Copy)]
pub(super) struct ContourEntry {
    pub key: DbKey,
    pub hash: Hash,
}

/// Compute the root hash of a map from its sorted, structurally checked frontier.
pub(super) fn root_hash<H: ProofHasher>(
    entries: Vec<ContourEntry>,
) -> Result<Hash, MapProofStatus> {
    let mut entries = entries.into_iter();
    match (entries.next(), entries.next()) {
        (None, _) => Ok(EMPTY_MAP_HASH),
        (Some(single), None) if single.key.is_leaf() => {
            Ok(H::hash_map_single(&single.key, &single.hash))
        }
        (Some(_), None) => Err(MapProofStatus::NonTerminalNode),
        (Some(first), Some(second)) => Ok(fold_contour::<H>(first, second, entries)),
    }
}

fn fold_contour<H: ProofHasher>(
    first: ContourEntry,
    second: ContourEntry,
    rest: impl Iterator<Item = ContourEntry>,
) -> Hash {
    let mut last_prefix = first.key.common_prefix(&second.key);
    let mut contour = Vec::with_capacity(rest.size_hint().0 + 2);
    contour.extend([first, second]);

    for entry in rest {
        let top = contour[contour.len() - 1];
        let new_prefix = top.key.common_prefix(&entry.key);
        while contour.len() > 1 && new_prefix.significant_bits() < last_prefix.significant_bits()
        {
            if let Some(prefix) = fold::<H>(&mut contour, last_prefix) {
                last_prefix = prefix;
            }
        }
        contour.push(entry);
        last_prefix = new_prefix;
    }

    while contour.len() > 1 {
        if let Some(prefix) = fold::<H>(&mut contour, last_prefix) {
            last_prefix = prefix;
        }
    }
    contour[0].hash
}

// Replace the two topmost entries with their parent keyed by `prefix`. Returns the common
// prefix of the parent and the entry below it, if there is one.
fn fold<H: ProofHasher>(contour: &mut Vec<ContourEntry>, prefix: DbKey) -> Option<DbKey> {
    let right = contour.pop()?;
    let left = contour.pop()?;
    let parent = ContourEntry {
        key: prefix,
        hash: H::hash_map_branch(&left.hash, &right.hash, &left.key, &right.key),
    };

    let next_prefix = contour
        .last()
        .map(|below| below.key.common_prefix(&parent.key));
    contour.push(parent);
    next_prefix
}
