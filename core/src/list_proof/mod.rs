//! Proofs of elements of a Merkle list.
//!
//! A Merkle list is a balanced binary hash tree over an index-addressed sequence. A list proof
//! retains a subtree of it: the requested elements, the branches above them, and a hash for
//! every pruned subtree next to them. Verification happens in two passes over the proof tree:
//!   1. A structural check that the tree is complete, bounded in depth, and retains neither
//!      too little (no element at all) nor too much pruning (a subtree with only hashes).
//!   2. A fold that recomputes the root hash and decodes the retained elements, each keyed by
//!      its position in the list.

use alloc::{boxed::Box, collections::BTreeMap, vec::Vec};
use core::fmt;

use crate::{
    codec::ValueCodec,
    error::{InvalidProof, ProofError},
    hasher::{Hash, ProofHasher},
    options::Options,
};

mod calculator;
mod validator;

/// The maximum depth of a list proof node: the bit width of the list's 64-bit index domain.
pub const MAX_LIST_DEPTH: u8 = 64;

/// A node of a list proof tree.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "borsh",
    derive(borsh::BorshDeserialize, borsh::BorshSerialize)
)]
pub enum ListProofNode {
    /// A retained list element, in its serialized form.
    Element(Vec<u8>),
    /// A pruned subtree, represented only by its hash.
    Hash(Hash),
    /// An internal node. A missing right child means the subtree has an odd number of nodes
    /// at the level below.
    Branch {
        /// The left child.
        left: Box<ListProofNode>,
        /// The right child, if any.
        right: Option<Box<ListProofNode>>,
    },
}

impl ListProofNode {
    /// A retained element.
    pub fn element(bytes: impl Into<Vec<u8>>) -> Self {
        ListProofNode::Element(bytes.into())
    }

    /// A pruned subtree.
    pub fn hash(hash: Hash) -> Self {
        ListProofNode::Hash(hash)
    }

    /// A branch with both children.
    pub fn branch(left: ListProofNode, right: ListProofNode) -> Self {
        ListProofNode::Branch {
            left: Box::new(left),
            right: Some(Box::new(right)),
        }
    }

    /// The number of nodes in the proof tree.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = alloc::vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            if let ListProofNode::Branch { left, right } = node {
                stack.push(left);
                stack.extend(right.as_deref());
            }
        }
        count
    }

    /// A branch with a left child only.
    pub fn left_branch(left: ListProofNode) -> Self {
        ListProofNode::Branch {
            left: Box::new(left),
            right: None,
        }
    }
}

/// The structural status of a list proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListProofStatus {
    /// The proof is well-formed.
    Valid,
    /// The proof retains no element.
    NoElements,
    /// An element lies deeper than the maximum depth.
    ElementNodeTooDeep,
    /// A pruned subtree lies deeper than the maximum depth.
    HashNodeTooDeep,
    /// An element or a branch sits at a depth which a complete tree does not allow.
    NodeAtWrongDepth,
    /// A subtree consists of pruned subtrees only and should have been pruned as a whole.
    WrongHashNodeCount,
}

impl fmt::Display for ListProofStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ListProofStatus::Valid => "valid",
            ListProofStatus::NoElements => "proof retains no elements",
            ListProofStatus::ElementNodeTooDeep => "element node exceeds the maximum depth",
            ListProofStatus::HashNodeTooDeep => "hash node exceeds the maximum depth",
            ListProofStatus::NodeAtWrongDepth => "node at a wrong depth",
            ListProofStatus::WrongHashNodeCount => "subtree consists of hash nodes only",
        };
        f.write_str(s)
    }
}

/// The outcome of verifying a list proof.
///
/// A checked proof hands out its elements only if it is both well-formed and matches the
/// expected root hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckedListProof<V> {
    status: ListProofStatus,
    root_hash: Option<Hash>,
    expected_root: Hash,
    elements: BTreeMap<u64, V>,
}

impl<V> CheckedListProof<V> {
    fn malformed(status: ListProofStatus, expected_root: Hash) -> Self {
        CheckedListProof {
            status,
            root_hash: None,
            expected_root,
            elements: BTreeMap::new(),
        }
    }

    /// The structural status of the proof.
    pub fn status(&self) -> ListProofStatus {
        self.status
    }

    /// The root hash recomputed from the proof. `None` if the proof is malformed.
    pub fn root_hash(&self) -> Option<&Hash> {
        self.root_hash.as_ref()
    }

    /// Whether the proof is well-formed and its root hash equals the expected one.
    pub fn is_valid(&self) -> bool {
        self.check_valid().is_ok()
    }

    fn check_valid(&self) -> Result<(), InvalidProof> {
        match self.root_hash {
            None => Err(InvalidProof::List(self.status)),
            Some(actual) if actual != self.expected_root => Err(InvalidProof::RootMismatch {
                expected: self.expected_root,
                actual,
            }),
            Some(_) => Ok(()),
        }
    }

    /// The proven elements, keyed by their index in the list.
    pub fn elements(&self) -> Result<&BTreeMap<u64, V>, ProofError> {
        self.check_valid()?;
        Ok(&self.elements)
    }

    /// Consume the proof, returning the proven elements keyed by their index in the list.
    pub fn into_elements(self) -> Result<BTreeMap<u64, V>, ProofError> {
        self.check_valid()?;
        Ok(self.elements)
    }

    /// The proven element at `index`. `None` if the proof does not retain that index.
    pub fn get(&self, index: u64) -> Result<Option<&V>, ProofError> {
        self.check_valid()?;
        Ok(self.elements.get(&index))
    }
}

/// Verify a list proof against an expected root hash with the default [`Options`].
///
/// Returns an error only if a retained element cannot be decoded; structural defects and root
/// mismatches are reported by the returned [`CheckedListProof`].
pub fn verify<H: ProofHasher, C: ValueCodec>(
    proof: &ListProofNode,
    expected_root: &Hash,
    codec: &C,
) -> Result<CheckedListProof<C::Value>, ProofError> {
    verify_with_options::<H, C>(proof, expected_root, codec, &Options::default())
}

/// Verify a list proof against an expected root hash.
pub fn verify_with_options<H: ProofHasher, C: ValueCodec>(
    proof: &ListProofNode,
    expected_root: &Hash,
    codec: &C,
    options: &Options,
) -> Result<CheckedListProof<C::Value>, ProofError> {
    tracing::trace!(
        nodes = proof.node_count(),
        max_depth = options.max_list_depth,
        "verifying list proof"
    );
    let shape = match validator::check(proof, options.max_list_depth) {
        Ok(shape) => shape,
        Err(status) => {
            tracing::debug!(%status, "list proof is malformed");
            return Ok(CheckedListProof::malformed(status, *expected_root));
        }
    };

    let (root_hash, elements) = calculator::compute::<H, C>(proof, &shape, codec)?;
    tracing::trace!(
        elements = elements.len(),
        depth = shape.element_depth,
        "list proof root recomputed"
    );
    if root_hash != *expected_root {
        tracing::debug!(
            expected = %hex::encode(expected_root),
            actual = %hex::encode(root_hash),
            "list proof root hash mismatch"
        );
    }

    Ok(CheckedListProof {
        status: ListProofStatus::Valid,
        root_hash: Some(root_hash),
        expected_root: *expected_root,
        elements,
    })
}
