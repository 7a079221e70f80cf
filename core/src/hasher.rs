//! Hashers (feature-gated) and utilities for implementing them.

use crate::key::DbKey;

/// A 256-bit hash, as produced by every hasher in this crate.
pub type Hash = [u8; 32];

/// The root hash of an empty map.
pub const EMPTY_MAP_HASH: Hash = [0u8; 32];

/// The hash schema of list and map proofs.
///
/// Implementations must be deterministic and stateless: proofs are verified by calling these
/// functions with no verifier-owned context.
pub trait ProofHasher {
    /// Hash an arbitrary-length value: a list element or a map value.
    fn hash_value(value: &[u8]) -> Hash;

    /// Hash a list branch from the hashes of its children. A missing right child means the
    /// branch covers an odd number of nodes at its level.
    fn hash_list_branch(left: &Hash, right: Option<&Hash>) -> Hash;

    /// Hash a map branch from the hashes and database keys of its children.
    fn hash_map_branch(left: &Hash, right: &Hash, left_key: &DbKey, right_key: &DbKey) -> Hash;

    /// Hash a map that consists of a single leaf.
    fn hash_map_single(key: &DbKey, value_hash: &Hash) -> Hash;
}

/// A simple trait for representing binary hash functions.
pub trait BinaryHash {
    /// Given a bit-string, produce a 32-byte hash.
    fn hash(input: &[u8]) -> Hash;

    /// An optional specialization of `hash` where there are two 32-byte inputs, left and right.
    fn hash2_32_concat(left: &Hash, right: &Hash) -> Hash {
        let mut buf = [0u8; 64];
        buf[0..32].copy_from_slice(left);
        buf[32..64].copy_from_slice(right);
        Self::hash(&buf)
    }

    /// An optional specialization of `hash` over the concatenation of `parts`.
    fn hash_parts(parts: &[&[u8]]) -> Hash {
        Self::hash(&parts.concat())
    }
}

/// A proof hasher constructed from a simple binary hasher.
///
/// The binary hash wrapped by this structure must behave approximately like a random oracle over
/// the space 2^256. Functions like Sha2/Blake3/Keccak all meet this criterion.
pub struct BinaryHasher<H>(core::marker::PhantomData<H>);

impl<H: BinaryHash> ProofHasher for BinaryHasher<H> {
    fn hash_value(value: &[u8]) -> Hash {
        H::hash(value)
    }

    fn hash_list_branch(left: &Hash, right: Option<&Hash>) -> Hash {
        match right {
            Some(right) => H::hash2_32_concat(left, right),
            None => H::hash(left),
        }
    }

    fn hash_map_branch(left: &Hash, right: &Hash, left_key: &DbKey, right_key: &DbKey) -> Hash {
        H::hash_parts(&[left, right, &left_key.to_raw(), &right_key.to_raw()])
    }

    fn hash_map_single(key: &DbKey, value_hash: &Hash) -> Hash {
        H::hash_parts(&[&key.to_raw(), value_hash])
    }
}

/// Blanket implementation for all implementations of `Digest`
#[cfg(feature = "sha2-hasher")]
impl<D: ::sha2::digest::Digest<OutputSize = ::sha2::digest::typenum::U32>> BinaryHash for D {
    fn hash(input: &[u8]) -> Hash {
        D::digest(input).into()
    }

    fn hash_parts(parts: &[&[u8]]) -> Hash {
        let mut hasher = D::new();
        for part in parts {
            hasher.update(part);
        }
        hasher.finalize().into()
    }
}

#[cfg(any(feature = "blake3-hasher", test))]
pub use self::blake3::Blake3Hasher;

/// A proof hasher making use of blake3.
#[cfg(any(feature = "blake3-hasher", test))]
pub mod blake3 {
    use super::{BinaryHash, BinaryHasher, Hash};

    /// A [`BinaryHash`] implementation for Blake3.
    pub struct Blake3BinaryHasher;

    /// A wrapper around Blake3 for proof verification.
    pub type Blake3Hasher = BinaryHasher<Blake3BinaryHasher>;

    impl BinaryHash for Blake3BinaryHasher {
        fn hash(value: &[u8]) -> Hash {
            blake3::hash(value).into()
        }

        fn hash_parts(parts: &[&[u8]]) -> Hash {
            let mut hasher = blake3::Hasher::new();
            for part in parts {
                hasher.update(part);
            }
            hasher.finalize().into()
        }
    }
}

#[cfg(feature = "sha2-hasher")]
pub use self::sha2::Sha2Hasher;

/// A proof hasher making use of sha2-256. This is the default schema of the store.
#[cfg(feature = "sha2-hasher")]
pub mod sha2 {
    use super::BinaryHasher;

    /// A wrapper around sha2-256 for proof verification.
    pub type Sha2Hasher = BinaryHasher<::sha2::Sha256>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::tests::{branch_key, leaf_key};
    use hex_literal::hex;

    #[test]
    fn sha2_value_hash() {
        assert_eq!(
            Sha2Hasher::hash_value(b"abc"),
            hex!("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"),
        );
    }

    #[test]
    fn list_branch_hash_concatenates_children() {
        let left = [1u8; 32];
        let right = [2u8; 32];
        let mut buf = [0u8; 64];
        buf[..32].copy_from_slice(&left);
        buf[32..].copy_from_slice(&right);

        assert_eq!(
            Sha2Hasher::hash_list_branch(&left, Some(&right)),
            Sha2Hasher::hash_value(&buf)
        );
        assert_eq!(
            Sha2Hasher::hash_list_branch(&left, None),
            Sha2Hasher::hash_value(&left)
        );
    }

    #[test]
    fn map_branch_hash_layout() {
        let left_key = branch_key("01");
        let right_key = leaf_key("1");
        let preimage = [
            &[3u8; 32][..],
            &[4u8; 32][..],
            &left_key.to_raw()[..],
            &right_key.to_raw()[..],
        ]
        .concat();
        assert_eq!(preimage.len(), 132);

        assert_eq!(
            Sha2Hasher::hash_map_branch(&[3; 32], &[4; 32], &left_key, &right_key),
            Sha2Hasher::hash_value(&preimage)
        );
        assert_eq!(
            Blake3Hasher::hash_map_branch(&[3; 32], &[4; 32], &left_key, &right_key),
            Blake3Hasher::hash_value(&preimage)
        );
    }

    #[test]
    fn single_leaf_map_hash_layout() {
        let key = leaf_key("1101");
        let value_hash = Sha2Hasher::hash_value(b"x");
        let preimage = [&key.to_raw()[..], &value_hash[..]].concat();
        assert_eq!(
            Sha2Hasher::hash_map_single(&key, &value_hash),
            Sha2Hasher::hash_value(&preimage)
        );
    }
}
