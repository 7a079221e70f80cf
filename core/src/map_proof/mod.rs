//! Proofs of presence and absence of keys in a Merkle-Patricia map.
//!
//! The map is a binary trie over 256-bit keys in which every branch stores only the longest
//! common prefix of the keys below it. A flat proof does not reconstruct that trie. It lists the
//! frontier needed to recompute the root, sorted by [`DbKey`] order:
//!   - pruned nodes, given by their database key and hash. A pruned node is usually a branch,
//!     but may be a leaf whose key was not requested, in which case the hash is the hash of its
//!     value.
//!   - requested keys which are present, with their values.
//!   - requested keys which are absent.
//!
//! Verification first checks the order of the frontier and that no requested key is hidden
//! under a pruned branch. It then folds the frontier bottom-up into the root hash, using the
//! common prefix of adjacent entries as a proxy for their depth in the trie (see the `contour`
//! module).

use alloc::{
    collections::{BTreeMap, BTreeSet},
    vec::Vec,
};
use core::fmt;

use crate::{
    codec::ValueCodec,
    error::ProofError,
    hasher::{Hash, ProofHasher},
    key::{DbKey, Key},
    options::Options,
};

pub use checked::CheckedMapProof;

mod check;
mod checked;
mod contour;

/// An entry of a flat map proof.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "borsh",
    derive(borsh::BorshDeserialize, borsh::BorshSerialize)
)]
pub enum MapProofEntry {
    /// A pruned node of the trie. For a leaf key, `hash` is the hash of the leaf's value.
    Branch {
        /// The database key of the node.
        key: DbKey,
        /// The hash of the node.
        hash: Hash,
    },
    /// A requested key which is present in the map.
    Leaf {
        /// The requested key.
        key: Key,
        /// Its value, in serialized form.
        value: Vec<u8>,
    },
    /// A requested key which is absent from the map.
    Absent {
        /// The requested key.
        key: Key,
    },
}

impl MapProofEntry {
    /// The database key this entry is ordered by.
    pub fn db_key(&self) -> DbKey {
        match self {
            MapProofEntry::Branch { key, .. } => *key,
            MapProofEntry::Leaf { key, .. } | MapProofEntry::Absent { key } => DbKey::leaf(*key),
        }
    }
}

/// A flat map proof: a sequence of entries sorted by [`DbKey`] order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "borsh",
    derive(borsh::BorshDeserialize, borsh::BorshSerialize)
)]
pub struct FlatMapProof {
    entries: Vec<MapProofEntry>,
}

impl FlatMapProof {
    /// Create a proof from entries which are expected to be sorted already. The order is
    /// checked during verification.
    pub fn new(entries: Vec<MapProofEntry>) -> Self {
        FlatMapProof { entries }
    }

    /// Assemble a proof from its three parts: the pruned nodes, the requested entries which are
    /// present and the requested keys which are absent. The entries are sorted.
    pub fn from_parts(
        proof: Vec<(DbKey, Hash)>,
        entries: Vec<(Key, Vec<u8>)>,
        missing_keys: Vec<Key>,
    ) -> Self {
        let mut flat = Vec::with_capacity(proof.len() + entries.len() + missing_keys.len());
        flat.extend(
            proof
                .into_iter()
                .map(|(key, hash)| MapProofEntry::Branch { key, hash }),
        );
        flat.extend(
            entries
                .into_iter()
                .map(|(key, value)| MapProofEntry::Leaf { key, value }),
        );
        flat.extend(
            missing_keys
                .into_iter()
                .map(|key| MapProofEntry::Absent { key }),
        );
        flat.sort_by_key(MapProofEntry::db_key);
        FlatMapProof { entries: flat }
    }

    /// The entries of the proof.
    pub fn entries(&self) -> &[MapProofEntry] {
        &self.entries
    }
}

/// The structural status of a map proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapProofStatus {
    /// The proof is well-formed.
    Correct,
    /// An entry precedes one with a lesser key.
    InvalidOrder,
    /// Two entries have the same key.
    DuplicatePath,
    /// A requested key lies under a pruned node, or an entry lies under the entry before it.
    InvalidStructure,
    /// The proof consists of a single branch, which cannot be a root on its own.
    NonTerminalNode,
}

impl fmt::Display for MapProofStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MapProofStatus::Correct => "correct",
            MapProofStatus::InvalidOrder => "entries are out of order",
            MapProofStatus::DuplicatePath => "duplicate entry keys",
            MapProofStatus::InvalidStructure => "entry key is embedded in another entry",
            MapProofStatus::NonTerminalNode => "single branch entry",
        };
        f.write_str(s)
    }
}

/// Verify a map proof against an expected root hash with the default [`Options`].
///
/// Malformed keys and undecodable values are errors. Structural defects and root mismatches are
/// reported by the returned [`CheckedMapProof`].
pub fn verify<H: ProofHasher, C: ValueCodec>(
    proof: &FlatMapProof,
    expected_root: &Hash,
    codec: &C,
) -> Result<CheckedMapProof<C::Value>, ProofError> {
    verify_with_options::<H, C>(proof, expected_root, codec, &Options::default())
}

/// Verify a map proof against an expected root hash.
pub fn verify_with_options<H: ProofHasher, C: ValueCodec>(
    proof: &FlatMapProof,
    expected_root: &Hash,
    codec: &C,
    options: &Options,
) -> Result<CheckedMapProof<C::Value>, ProofError> {
    tracing::trace!(entries = proof.entries.len(), "verifying map proof");
    check::check_keys(&proof.entries, options.key_checks)?;

    if let Err(status) = check::check_structure(&proof.entries) {
        tracing::debug!(%status, "map proof is malformed");
        return Ok(CheckedMapProof::malformed(status, *expected_root));
    }

    let mut contour_entries = Vec::with_capacity(proof.entries.len());
    let mut entries = BTreeMap::new();
    let mut missing_keys = BTreeSet::new();
    for entry in &proof.entries {
        match entry {
            MapProofEntry::Branch { key, hash } => {
                contour_entries.push(contour::ContourEntry {
                    key: *key,
                    hash: *hash,
                });
            }
            MapProofEntry::Leaf { key, value } => {
                entries.insert(*key, codec.decode(value)?);
                contour_entries.push(contour::ContourEntry {
                    key: DbKey::leaf(*key),
                    hash: H::hash_value(value),
                });
            }
            MapProofEntry::Absent { key } => {
                missing_keys.insert(*key);
            }
        }
    }

    let root_hash = match contour::root_hash::<H>(contour_entries) {
        Ok(root_hash) => root_hash,
        Err(status) => {
            tracing::debug!(%status, "map proof is malformed");
            return Ok(CheckedMapProof::malformed(status, *expected_root));
        }
    };
    if root_hash != *expected_root {
        tracing::debug!(
            expected = %hex::encode(expected_root),
            actual = %hex::encode(root_hash),
            "map proof root hash mismatch"
        );
    }

    Ok(CheckedMapProof::correct(
        root_hash,
        *expected_root,
        entries,
        missing_keys,
    ))
}
