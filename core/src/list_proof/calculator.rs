//! Root hash recomputation and element extraction for well-formed list proofs.

use alloc::collections::BTreeMap;

use super::{validator::ListShape, ListProofNode};
use crate::{
    codec::ValueCodec,
    error::DecodeError,
    hasher::{Hash, ProofHasher},
};

type Fold<V> = (Hash, BTreeMap<u64, V>);

/// Recompute the root hash of a structurally valid proof and decode its elements.
///
/// Elements are keyed by their position in the list: the bit-path from the root to the element,
/// read as an integer at the depth of the element leaves.
pub(super) fn compute<H: ProofHasher, C: ValueCodec>(
    proof: &ListProofNode,
    shape: &ListShape,
    codec: &C,
) -> Result<Fold<C::Value>, DecodeError> {
    fold::<H, C>(proof, 0, 0, shape, codec)
}

fn fold<H: ProofHasher, C: ValueCodec>(
    node: &ListProofNode,
    depth: u8,
    path: u64,
    shape: &ListShape,
    codec: &C,
) -> Result<Fold<C::Value>, DecodeError> {
    match node {
        ListProofNode::Element(bytes) => {
            // the last leaf may sit one level above the others.
            debug_assert!(depth <= shape.element_depth);
            let index = path << (shape.element_depth - depth);
            let value = codec.decode(bytes)?;
            Ok((H::hash_value(bytes), BTreeMap::from([(index, value)])))
        }
        ListProofNode::Hash(hash) => Ok((*hash, BTreeMap::new())),
        ListProofNode::Branch { left, right } => {
            let (left_hash, mut elements) = fold::<H, C>(left, depth + 1, path << 1, shape, codec)?;
            let right = right
                .as_deref()
                .map(|right| fold::<H, C>(right, depth + 1, path << 1 | 1, shape, codec))
                .transpose()?;

            let hash = H::hash_list_branch(&left_hash, right.as_ref().map(|(hash, _)| hash));
            if let Some((_, mut right_elements)) = right {
                elements.append(&mut right_elements);
            }
            Ok((hash, elements))
        }
    }
}
