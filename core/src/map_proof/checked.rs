use alloc::collections::{BTreeMap, BTreeSet};

use super::MapProofStatus;
use crate::{
    error::{InvalidProof, ProofError},
    hasher::Hash,
    key::Key,
};

/// The result of checking a map proof.
///
/// The data of the proof is handed out only if the proof is well-formed and its root hash
/// matches the expected one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckedMapProof<V> {
    status: MapProofStatus,
    root_hash: Option<Hash>,
    expected_root: Hash,
    entries: BTreeMap<Key, V>,
    missing_keys: BTreeSet<Key>,
}

impl<V> CheckedMapProof<V> {
    pub(super) fn correct(
        root_hash: Hash,
        expected_root: Hash,
        entries: BTreeMap<Key, V>,
        missing_keys: BTreeSet<Key>,
    ) -> Self {
        CheckedMapProof {
            status: MapProofStatus::Correct,
            root_hash: Some(root_hash),
            expected_root,
            entries,
            missing_keys,
        }
    }

    pub(super) fn malformed(status: MapProofStatus, expected_root: Hash) -> Self {
        CheckedMapProof {
            status,
            root_hash: None,
            expected_root,
            entries: BTreeMap::new(),
            missing_keys: BTreeSet::new(),
        }
    }

    /// The structural status of the proof.
    pub fn status(&self) -> MapProofStatus {
        self.status
    }

    /// The root hash recomputed from the proof. `None` if the proof is malformed.
    pub fn root_hash(&self) -> Option<&Hash> {
        self.root_hash.as_ref()
    }

    /// Whether the proof is well-formed and proves the expected root hash.
    pub fn is_valid(&self) -> bool {
        self.check_valid().is_ok()
    }

    /// Compare the recomputed root hash against another root than the one the proof was checked
    /// against. Fails only if the proof is malformed.
    pub fn compare_with_root_hash(&self, root: &Hash) -> Result<bool, ProofError> {
        match self.root_hash {
            Some(ref root_hash) => Ok(root_hash == root),
            None => Err(InvalidProof::Map(self.status).into()),
        }
    }

    /// The requested entries which are present in the map.
    pub fn entries(&self) -> Result<&BTreeMap<Key, V>, ProofError> {
        self.check_valid()?;
        Ok(&self.entries)
    }

    /// The requested keys which are absent from the map.
    pub fn missing_keys(&self) -> Result<&BTreeSet<Key>, ProofError> {
        self.check_valid()?;
        Ok(&self.missing_keys)
    }

    /// Consume the proof, returning the present entries and the absent keys.
    pub fn into_parts(self) -> Result<(BTreeMap<Key, V>, BTreeSet<Key>), ProofError> {
        self.check_valid()?;
        Ok((self.entries, self.missing_keys))
    }

    /// Whether a requested key is present in the map.
    pub fn contains_key(&self, key: &Key) -> Result<bool, ProofError> {
        self.get(key).map(|value| value.is_some())
    }

    /// Look up a requested key.
    ///
    /// Returns `Ok(None)` if the proof shows the key to be absent and fails with
    /// [`ProofError::UnrequestedKey`] if the proof says nothing about the key.
    pub fn get(&self, key: &Key) -> Result<Option<&V>, ProofError> {
        self.check_valid()?;
        if let Some(value) = self.entries.get(key) {
            Ok(Some(value))
        } else if self.missing_keys.contains(key) {
            Ok(None)
        } else {
            Err(ProofError::UnrequestedKey(*key))
        }
    }

    fn check_valid(&self) -> Result<(), InvalidProof> {
        match self.root_hash {
            None => Err(InvalidProof::Map(self.status)),
            Some(actual) if actual != self.expected_root => Err(InvalidProof::RootMismatch {
                expected: self.expected_root,
                actual,
            }),
            Some(_) => Ok(()),
        }
    }
}
