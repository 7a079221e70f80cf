//! Structural validation of list proofs.
//!
//! The proof tree must be complete: all elements lie at the same depth, except the last leaf
//! of the tree, which may be one level shallower. Only the rightmost spine of the tree may
//! contain branches without a right child, and the root never does.
//!
//! The check is a left-to-right fold over the tree. The depth of the first element becomes the
//! reference every later element is compared against.

use super::{ListProofNode, ListProofStatus};

/// The shape of a well-formed list proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct ListShape {
    /// The depth of the element leaves. Only the last leaf may sit one level above.
    pub element_depth: u8,
}

#[derive(Debug, Clone, Copy)]
struct Position {
    depth: u8,
    // whether the node is on the path from the root along the last child of every branch.
    on_spine: bool,
}

impl Position {
    fn child(&self, on_spine: bool) -> Self {
        Position {
            depth: self.depth + 1,
            on_spine: self.on_spine && on_spine,
        }
    }
}

// accumulated over all leaves visited so far, in left-to-right order.
#[derive(Debug, Default, Clone, Copy)]
struct Walk {
    element_depth: Option<u8>,
    hash_only_branch: bool,
}

#[derive(Debug, Clone, Copy)]
struct Subtree {
    walk: Walk,
    has_elements: bool,
}

/// Check the structure of a list proof whose nodes may lie no deeper than `max_depth`.
pub(super) fn check(proof: &ListProofNode, max_depth: u8) -> Result<ListShape, ListProofStatus> {
    let root = Position {
        depth: 0,
        on_spine: true,
    };
    let subtree = check_node(proof, root, max_depth, Walk::default())?;

    match subtree.walk.element_depth {
        None => Err(ListProofStatus::NoElements),
        Some(_) if subtree.walk.hash_only_branch => Err(ListProofStatus::WrongHashNodeCount),
        Some(element_depth) => Ok(ListShape { element_depth }),
    }
}

// Recursion stops at `max_depth + 1`.
fn check_node(
    node: &ListProofNode,
    pos: Position,
    max_depth: u8,
    walk: Walk,
) -> Result<Subtree, ListProofStatus> {
    if pos.depth > max_depth {
        return Err(too_deep(node));
    }

    match node {
        ListProofNode::Element(_) => {
            let element_depth = match walk.element_depth {
                None => pos.depth,
                Some(depth) if depth == pos.depth => depth,
                Some(depth) if pos.on_spine && pos.depth + 1 == depth => depth,
                Some(_) => return Err(ListProofStatus::NodeAtWrongDepth),
            };
            Ok(Subtree {
                walk: Walk {
                    element_depth: Some(element_depth),
                    ..walk
                },
                has_elements: true,
            })
        }
        ListProofNode::Hash(_) => Ok(Subtree {
            walk,
            has_elements: false,
        }),
        ListProofNode::Branch { left, right } => {
            if right.is_none() && (!pos.on_spine || pos.depth == 0) {
                return Err(ListProofStatus::NodeAtWrongDepth);
            }

            let left = check_node(left, pos.child(right.is_none()), max_depth, walk)?;
            let right = match right {
                Some(right) => check_node(right, pos.child(true), max_depth, left.walk)?,
                None => Subtree {
                    walk: left.walk,
                    has_elements: false,
                },
            };

            let has_elements = left.has_elements || right.has_elements;
            Ok(Subtree {
                walk: Walk {
                    hash_only_branch: right.walk.hash_only_branch || !has_elements,
                    ..right.walk
                },
                has_elements,
            })
        }
    }
}

// Classify a node below the maximum depth by its leftmost leaf, without descending recursively.
fn too_deep(mut node: &ListProofNode) -> ListProofStatus {
    loop {
        match node {
            ListProofNode::Element(_) => return ListProofStatus::ElementNodeTooDeep,
            ListProofNode::Hash(_) => return ListProofStatus::HashNodeTooDeep,
            ListProofNode::Branch { left, .. } => node = left,
        }
    }
}
