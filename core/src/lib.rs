//! Verification of Merkle proofs returned by an authenticated key-value store.
//!
//! Two kinds of proofs are supported:
//!   - list proofs: a pruned binary Merkle tree over a list, proving the elements at some
//!     indices. See [`list_proof`].
//!   - map proofs: the sorted frontier of a binary Merkle-Patricia trie over 256-bit keys,
//!     proving the presence or absence of some keys. See [`map_proof`].
//!
//! Verifiers are generic over the hash function, through [`ProofHasher`], and over the encoding
//! of values, through [`ValueCodec`]. A verifier never trusts the proof: it checks the shape of
//! the proof, recomputes the root hash and hands out data only if the root matches the expected
//! one.
//!
//! The crate does not require the standard library, but does require Rust's alloc crate.

#![cfg_attr(all(not(feature = "std"), not(test)), no_std)]

extern crate alloc;

pub mod codec;
pub mod error;
pub mod hasher;
pub mod key;
pub mod list_proof;
pub mod map_proof;
pub mod options;

pub use codec::{RawCodec, U64Codec, Utf8Codec, ValueCodec};
pub use error::{DecodeError, EncodeError, InvalidProof, MalformedKey, ProofError};
pub use hasher::{Hash, ProofHasher, EMPTY_MAP_HASH};
pub use key::{DbKey, Key, KeyChecks, KeyKind};
pub use list_proof::{
    verify as verify_list_proof, CheckedListProof, ListProofNode, ListProofStatus,
};
pub use map_proof::{
    verify as verify_map_proof, CheckedMapProof, FlatMapProof, MapProofEntry, MapProofStatus,
};
pub use options::Options;

#[cfg(feature = "borsh")]
pub use codec::BorshCodec;
