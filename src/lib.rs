//! Ordered maps over an arena of tree nodes.
//!
//! [`AvlTree`] keeps itself balanced with AVL rotations, so lookups,
//! inserts and deletes take logarithmic time. [`BinaryTree`] is the plain,
//! unbalanced binary search tree it is built on.
//!
//! Nodes live in a generational arena and refer to each other by
//! [`NodeId`]; the parent link is a plain id, so there are no reference
//! cycles. All traversals are iterative and use the [`Stack`] and [`Queue`]
//! scratch containers instead of the call stack.
//!
//! ```
//! use arena_avl::{AvlTree, TraversalOrder};
//!
//! let mut tree = AvlTree::new();
//! for key in [40, 4, 34, 45, 14, 55, 48, 13, 15, 49, 47] {
//!     tree.insert(key, key * 2);
//! }
//! assert!(tree.delete(&55));
//!
//! let mut keys = Vec::new();
//! tree.traverse(TraversalOrder::InOrder, |key, _| keys.push(*key));
//! assert_eq!(keys, [4, 13, 14, 15, 34, 40, 45, 47, 48, 49]);
//! ```

mod avl;
mod bst;
mod node;
mod rotate;
mod scratch;
mod traverse;

pub use avl::AvlTree;
pub use bst::BinaryTree;
pub use node::{NodeId, NodeRef};
pub use scratch::{Queue, Stack};
pub use traverse::{Iter, ParseOrderError, TraversalOrder};
