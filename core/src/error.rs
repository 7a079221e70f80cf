//! Errors of proof verification.
//!
//! Structural defects of a proof are not errors: they are reported through
//! [`ListProofStatus`] and [`MapProofStatus`]. The types here cover malformed input, value
//! (de)serialization failures and misuse of a checked proof.

use alloc::string::String;

use thiserror::Error;

use crate::{hasher::Hash, key::Key, list_proof::ListProofStatus, map_proof::MapProofStatus};

/// A database key that violates a structural invariant.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedKey {
    /// The raw key does not have the expected length of 34 bytes.
    #[error("database key has illegal size: {0}")]
    InvalidSize(usize),
    /// The tag byte is neither a branch nor a leaf.
    #[error("invalid node tag: {0}")]
    UnknownTag(u8),
    /// A branch key declares 256 or more significant bits.
    #[error("branch key has {0} significant bits, must be below 256")]
    BitsOutOfRange(u16),
    /// A branch key has set bits after its significant bits.
    #[error("branch key has set bits after its {significant_bits} significant bits")]
    TrailingBits {
        /// The declared number of significant bits.
        significant_bits: u16,
    },
    /// The length byte of a raw leaf key is not zero.
    #[error("leaf key length byte must be zero, got {0}")]
    LeafLengthByte(u8),
}

/// Failure to turn the raw bytes of an element or a map value into a typed value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The bytes are not valid UTF-8.
    #[error("value is not valid UTF-8")]
    Utf8,
    /// The value has a fixed size which the bytes do not match.
    #[error("value has length {actual}, expected {expected}")]
    Length {
        /// The required length.
        expected: usize,
        /// The length of the supplied bytes.
        actual: usize,
    },
    /// A codec-specific failure.
    #[error("cannot decode value: {0}")]
    Custom(String),
}

/// Failure to serialize a typed value into raw bytes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot encode value: {0}")]
pub struct EncodeError(pub String);

/// The reason a checked proof refuses to hand out its data.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidProof {
    /// The list proof is malformed.
    #[error("malformed list proof: {0}")]
    List(ListProofStatus),
    /// The map proof is malformed.
    #[error("malformed map proof: {0}")]
    Map(MapProofStatus),
    /// The proof is well-formed but proves a different state.
    #[error(
        "root hash mismatch: expected 0x{}, computed 0x{}",
        hex::encode(.expected),
        hex::encode(.actual)
    )]
    RootMismatch {
        /// The root hash the proof was checked against.
        expected: Hash,
        /// The root hash recomputed from the proof.
        actual: Hash,
    },
}

/// Errors returned by the verifiers and by the accessors of checked proofs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProofError {
    /// A key of the proof is malformed. Reported before any hashing takes place.
    #[error(transparent)]
    MalformedKey(#[from] MalformedKey),
    /// A value of the proof could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// Data was requested from a proof which is not valid.
    #[error("proof is not valid: {0}")]
    ProofInvalid(#[from] InvalidProof),
    /// A key was queried that is not among the keys the proof was requested for.
    #[error("key 0x{} was not requested in this proof", hex::encode(.0))]
    UnrequestedKey(Key),
}
