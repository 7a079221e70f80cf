use std::collections::{BTreeMap, BTreeSet};

use stateproof_core::{
    hasher::Sha2Hasher, DbKey, FlatMapProof, Hash, Key, ListProofNode, ProofHasher,
    EMPTY_MAP_HASH,
};

pub type Hasher = Sha2Hasher;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A pseudo-random key derived from `id`.
#[allow(dead_code)]
pub fn random_key(id: u64) -> Key {
    use rand::{RngCore as _, SeedableRng as _};
    let mut seed = [0; 16];
    seed[0..8].copy_from_slice(&id.to_le_bytes());
    let mut rng = rand_pcg::Lcg64Xsh32::from_seed(seed);
    let mut key = [0; 32];
    rng.fill_bytes(&mut key);
    key
}

/// A key whose bits are zero after the first byte. Keys made this way share long prefixes,
/// which gives tries with a deep structure.
#[allow(dead_code)]
pub fn short_key(id: u8) -> Key {
    let mut key = [0; 32];
    key[0] = id;
    key
}

// Lists: a complete binary tree, where the last node of every level is hashed alone if it has
// no sibling.

#[allow(dead_code)]
pub fn list_root(values: &[Vec<u8>]) -> Hash {
    let mut level: Vec<Hash> = values.iter().map(|v| Hasher::hash_value(v)).collect();
    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| Hasher::hash_list_branch(&pair[0], pair.get(1)))
            .collect();
    }
    level[0]
}

/// Build a proof for the elements at `indices`, pruning everything else.
#[allow(dead_code)]
pub fn list_proof(values: &[Vec<u8>], indices: &BTreeSet<u64>) -> ListProofNode {
    assert!(!values.is_empty());
    let height = (values.len() as u64).next_power_of_two().trailing_zeros();
    list_node(values, indices, 0, height)
}

fn list_node(
    values: &[Vec<u8>],
    indices: &BTreeSet<u64>,
    start: u64,
    height: u32,
) -> ListProofNode {
    let end = start + (1 << height);
    if indices.range(start..end).next().is_none() {
        return ListProofNode::hash(list_subtree_hash(values, start, height));
    }
    if height == 0 {
        return ListProofNode::element(values[start as usize].clone());
    }

    let half = 1 << (height - 1);
    let left = list_node(values, indices, start, height - 1);
    if start + half >= values.len() as u64 {
        ListProofNode::left_branch(left)
    } else {
        ListProofNode::branch(left, list_node(values, indices, start + half, height - 1))
    }
}

fn list_subtree_hash(values: &[Vec<u8>], start: u64, height: u32) -> Hash {
    if height == 0 {
        return Hasher::hash_value(&values[start as usize]);
    }
    let half = 1 << (height - 1);
    let left = list_subtree_hash(values, start, height - 1);
    if start + half >= values.len() as u64 {
        Hasher::hash_list_branch(&left, None)
    } else {
        let right = list_subtree_hash(values, start + half, height - 1);
        Hasher::hash_list_branch(&left, Some(&right))
    }
}

// Maps: a binary Patricia trie, where every branch is keyed by the longest common prefix of the
// keys below it.

// Trie order is bit order, which differs from the byte order of `BTreeMap<Key, _>`.
fn sorted_leaves(map: &BTreeMap<Key, Vec<u8>>) -> Vec<(Key, Vec<u8>)> {
    let mut leaves: Vec<_> = map.iter().map(|(k, v)| (*k, v.clone())).collect();
    leaves.sort_by_key(|(key, _)| DbKey::leaf(*key));
    leaves
}

fn root_prefix(leaves: &[(Key, Vec<u8>)]) -> DbKey {
    DbKey::leaf(leaves[0].0).common_prefix(&DbKey::leaf(leaves[leaves.len() - 1].0))
}

struct TrieNode {
    key: DbKey,
    hash: Hash,
}

fn split_point(leaves: &[(Key, Vec<u8>)], depth: usize) -> usize {
    leaves
        .iter()
        .position(|(key, _)| DbKey::leaf(*key).bits()[depth])
        .unwrap_or(leaves.len())
}

// `leaves` is sorted in bit order and non-empty.
fn trie_node(leaves: &[(Key, Vec<u8>)]) -> TrieNode {
    if let [(key, value)] = leaves {
        return TrieNode {
            key: DbKey::leaf(*key),
            hash: Hasher::hash_value(value),
        };
    }

    let prefix = root_prefix(leaves);
    let split = split_point(leaves, prefix.significant_bits() as usize);
    let left = trie_node(&leaves[..split]);
    let right = trie_node(&leaves[split..]);
    TrieNode {
        key: prefix,
        hash: Hasher::hash_map_branch(&left.hash, &right.hash, &left.key, &right.key),
    }
}

#[allow(dead_code)]
pub fn map_root(map: &BTreeMap<Key, Vec<u8>>) -> Hash {
    let leaves = sorted_leaves(map);
    match leaves.as_slice() {
        [] => EMPTY_MAP_HASH,
        [(key, value)] => {
            Hasher::hash_map_single(&DbKey::leaf(*key), &Hasher::hash_value(value))
        }
        _ => trie_node(&leaves).hash,
    }
}

/// Build a minimal proof for `requested` keys against `map`.
#[allow(dead_code)]
pub fn map_proof(map: &BTreeMap<Key, Vec<u8>>, requested: &BTreeSet<Key>) -> FlatMapProof {
    let leaves = sorted_leaves(map);
    let mut pruned = Vec::new();
    let mut entries = Vec::new();

    if leaves.len() == 1 {
        collect(&leaves, requested, &mut pruned, &mut entries);
    } else if leaves.len() > 1 {
        // the root is never pruned: a lone branch cannot be verified.
        let prefix = root_prefix(&leaves);
        let split = split_point(&leaves, prefix.significant_bits() as usize);
        collect(&leaves[..split], requested, &mut pruned, &mut entries);
        collect(&leaves[split..], requested, &mut pruned, &mut entries);
    }

    let missing = requested
        .iter()
        .filter(|key| !map.contains_key(*key))
        .copied()
        .collect();
    FlatMapProof::from_parts(pruned, entries, missing)
}

fn collect(
    leaves: &[(Key, Vec<u8>)],
    requested: &BTreeSet<Key>,
    pruned: &mut Vec<(DbKey, Hash)>,
    entries: &mut Vec<(Key, Vec<u8>)>,
) {
    let node = trie_node(leaves);
    let relevant = requested
        .iter()
        .any(|key| node.key.is_prefix_of(&DbKey::leaf(*key)));

    match leaves {
        _ if !relevant => pruned.push((node.key, node.hash)),
        [(key, value)] => entries.push((*key, value.clone())),
        _ => {
            let split = split_point(leaves, node.key.significant_bits() as usize);
            collect(&leaves[..split], requested, pruned, entries);
            collect(&leaves[split..], requested, pruned, entries);
        }
    }
}
