//! Iterative depth-first and breadth-first traversals.
//!
//! None of the traversals recurse: the depth-first orders keep their
//! pending nodes on a [`Stack`], level order keeps them on a [`Queue`].

use std::fmt;
use std::iter::FusedIterator;
use std::str::FromStr;

use thiserror::Error;

use crate::bst::BinaryTree;
use crate::node::NodeId;
use crate::scratch::{Queue, Stack};

/// The order in which a traversal visits the nodes of a tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TraversalOrder {
    /// Node, left subtree, right subtree.
    PreOrder,
    /// Left subtree, node, right subtree.
    InOrder,
    /// Left subtree, right subtree, node.
    PostOrder,
    /// Breadth first, level by level.
    LevelOrder,
}

impl TraversalOrder {
    pub const ALL: [TraversalOrder; 4] = [
        TraversalOrder::PreOrder,
        TraversalOrder::InOrder,
        TraversalOrder::PostOrder,
        TraversalOrder::LevelOrder,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TraversalOrder::PreOrder => "pre-order",
            TraversalOrder::InOrder => "in-order",
            TraversalOrder::PostOrder => "post-order",
            TraversalOrder::LevelOrder => "level-order",
        }
    }
}

impl fmt::Display for TraversalOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseOrderError {
    #[error("unknown traversal order: {0:?}")]
    Unknown(String),
}

impl FromStr for TraversalOrder {
    type Err = ParseOrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pre" | "preorder" | "pre-order" => Ok(TraversalOrder::PreOrder),
            "in" | "inorder" | "in-order" => Ok(TraversalOrder::InOrder),
            "post" | "postorder" | "post-order" => Ok(TraversalOrder::PostOrder),
            "level" | "levelorder" | "level-order" | "bfs" => Ok(TraversalOrder::LevelOrder),
            _ => Err(ParseOrderError::Unknown(s.to_string())),
        }
    }
}

impl<K, V> BinaryTree<K, V> {
    /// Calls `visitor` once per entry, in the given order.
    pub fn traverse<F: FnMut(&K, &V)>(&self, order: TraversalOrder, mut visitor: F) {
        let visit = |id: NodeId| {
            let (key, value) = self.entry(id);
            visitor(key, value);
        };
        match order {
            TraversalOrder::PreOrder => self.walk_pre_order(visit),
            TraversalOrder::InOrder => self.walk_in_order(visit),
            TraversalOrder::PostOrder => self.walk_post_order(visit),
            TraversalOrder::LevelOrder => self.walk_level_order(visit),
        }
    }

    /// Visits node, left subtree, right subtree.
    pub fn traverse_pre_order<F: FnMut(&K, &V)>(&self, visitor: F) {
        self.traverse(TraversalOrder::PreOrder, visitor);
    }

    /// Visits left subtree, node, right subtree, i.e. in key order.
    pub fn traverse_in_order<F: FnMut(&K, &V)>(&self, visitor: F) {
        self.traverse(TraversalOrder::InOrder, visitor);
    }

    /// Visits left subtree, right subtree, node.
    pub fn traverse_post_order<F: FnMut(&K, &V)>(&self, visitor: F) {
        self.traverse(TraversalOrder::PostOrder, visitor);
    }

    /// Visits the nodes level by level, each level from left to right.
    pub fn traverse_level_order<F: FnMut(&K, &V)>(&self, visitor: F) {
        self.traverse(TraversalOrder::LevelOrder, visitor);
    }

    /// Gets an iterator over the entries of the tree, sorted by key.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(self)
    }

    pub(crate) fn walk_pre_order<F: FnMut(NodeId)>(&self, mut visit: F) {
        let mut stack = Stack::new();
        if let Some(root) = self.root {
            stack.push(root);
        }
        while let Some(id) = stack.pop() {
            visit(id);
            let node = self.at(id);
            // Right first, so the left subtree is popped first
            if let Some(right) = node.right {
                stack.push(right);
            }
            if let Some(left) = node.left {
                stack.push(left);
            }
        }
    }

    pub(crate) fn walk_in_order<F: FnMut(NodeId)>(&self, mut visit: F) {
        let mut stack = Stack::new();
        let mut current = self.root;
        loop {
            while let Some(id) = current {
                stack.push(id);
                current = self.at(id).left;
            }
            let Some(id) = stack.pop() else {
                break;
            };
            visit(id);
            current = self.at(id).right;
        }
    }

    pub(crate) fn walk_post_order<F: FnMut(NodeId)>(&self, mut visit: F) {
        let mut stack = Stack::new();
        let mut current = self.root;
        let mut last_visited: Option<NodeId> = None;
        loop {
            while let Some(id) = current {
                stack.push(id);
                current = self.at(id).left;
            }
            let Some(&top) = stack.peek() else {
                break;
            };
            let right = self.at(top).right;
            if right.is_some() && right != last_visited {
                // Right subtree not done yet
                current = right;
            } else {
                visit(top);
                last_visited = Some(top);
                stack.pop();
            }
        }
    }

    pub(crate) fn walk_level_order<F: FnMut(NodeId)>(&self, mut visit: F) {
        let mut queue = Queue::new();
        if let Some(root) = self.root {
            queue.enqueue(root);
        }
        while let Some(id) = queue.dequeue() {
            visit(id);
            let node = self.at(id);
            if let Some(left) = node.left {
                queue.enqueue(left);
            }
            if let Some(right) = node.right {
                queue.enqueue(right);
            }
        }
    }
}

impl<'a, K, V> IntoIterator for &'a BinaryTree<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An iterator over the entries of a tree, sorted by key.
///
/// Holds the unvisited left spine on a stack, so it needs memory
/// proportional to the height of the tree only.
pub struct Iter<'a, K, V> {
    tree: &'a BinaryTree<K, V>,
    stack: Stack<NodeId>,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    fn new(tree: &'a BinaryTree<K, V>) -> Self {
        let mut iter = Self {
            tree,
            stack: Stack::new(),
            remaining: tree.len(),
        };
        iter.push_left_spine(tree.root);
        iter
    }

    fn push_left_spine(&mut self, mut current: Option<NodeId>) {
        while let Some(id) = current {
            self.stack.push(id);
            current = self.tree.at(id).left;
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let tree = self.tree;
        self.push_left_spine(tree.at(id).right);
        self.remaining -= 1;
        Some(tree.entry(id))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{ParseOrderError, TraversalOrder};
    use crate::{AvlTree, BinaryTree};

    const DEMO_KEYS: [i32; 11] = [40, 4, 34, 45, 14, 55, 48, 13, 15, 49, 47];

    fn keys_of(tree: &BinaryTree<i32, i32>, order: TraversalOrder) -> Vec<i32> {
        let mut keys = Vec::new();
        tree.traverse(order, |&key, _| keys.push(key));
        keys
    }

    fn avl_keys_of(tree: &AvlTree<i32, i32>, order: TraversalOrder) -> Vec<i32> {
        let mut keys = Vec::new();
        tree.traverse(order, |&key, _| keys.push(key));
        keys
    }

    #[rstest]
    #[case(TraversalOrder::PreOrder, &[40, 4, 34, 14, 13, 15, 45, 55, 48, 47, 49])]
    #[case(TraversalOrder::InOrder, &[4, 13, 14, 15, 34, 40, 45, 47, 48, 49, 55])]
    #[case(TraversalOrder::PostOrder, &[13, 15, 14, 34, 4, 47, 49, 48, 55, 45, 40])]
    #[case(TraversalOrder::LevelOrder, &[40, 4, 45, 34, 55, 14, 48, 13, 15, 47, 49])]
    fn test_binary_tree_orders(#[case] order: TraversalOrder, #[case] expected: &[i32]) {
        let tree: BinaryTree<i32, i32> = DEMO_KEYS.iter().map(|&key| (key, key)).collect();
        assert_eq!(keys_of(&tree, order), expected);
    }

    #[rstest]
    #[case(TraversalOrder::PreOrder, &[40, 4, 34, 15, 13, 45, 48, 47, 49])]
    #[case(TraversalOrder::InOrder, &[4, 13, 15, 34, 40, 45, 47, 48, 49])]
    #[case(TraversalOrder::PostOrder, &[13, 15, 34, 4, 47, 49, 48, 45, 40])]
    #[case(TraversalOrder::LevelOrder, &[40, 4, 45, 34, 48, 15, 47, 49, 13])]
    fn test_binary_tree_orders_after_delete(
        #[case] order: TraversalOrder,
        #[case] expected: &[i32],
    ) {
        let mut tree: BinaryTree<i32, i32> = DEMO_KEYS.iter().map(|&key| (key, key)).collect();
        assert!(tree.delete(&55));
        assert!(tree.delete(&14));
        assert!(!tree.delete(&11));
        assert_eq!(keys_of(&tree, order), expected);
    }

    #[rstest]
    #[case(TraversalOrder::PreOrder, &[34, 13, 4, 14, 15, 48, 45, 40, 47, 49, 55])]
    #[case(TraversalOrder::InOrder, &[4, 13, 14, 15, 34, 40, 45, 47, 48, 49, 55])]
    #[case(TraversalOrder::PostOrder, &[4, 15, 14, 13, 40, 47, 45, 55, 49, 48, 34])]
    #[case(TraversalOrder::LevelOrder, &[34, 13, 48, 4, 14, 45, 49, 15, 40, 47, 55])]
    fn test_avl_tree_orders(#[case] order: TraversalOrder, #[case] expected: &[i32]) {
        let tree: AvlTree<i32, i32> = DEMO_KEYS.iter().map(|&key| (key, key)).collect();
        assert_eq!(avl_keys_of(&tree, order), expected);
    }

    #[test]
    fn test_empty_tree_visits_nothing() {
        let tree = BinaryTree::<i32, i32>::new();
        for order in TraversalOrder::ALL {
            assert!(keys_of(&tree, order).is_empty());
        }
        assert!(tree.iter().next().is_none());
    }

    #[test]
    fn test_skewed_tree_does_not_recurse() {
        let tree: BinaryTree<i32, ()> = (0..10_000).map(|key| (key, ())).collect();
        let mut count = 0;
        for order in TraversalOrder::ALL {
            tree.traverse(order, |_, _| count += 1);
        }
        assert_eq!(count, 4 * 10_000);
        assert_eq!(tree.height(), 10_000);
    }

    #[test]
    fn test_iter_matches_in_order() {
        let tree: AvlTree<i32, i32> = DEMO_KEYS.iter().map(|&key| (key, -key)).collect();
        let iter = tree.iter();
        assert_eq!(iter.len(), DEMO_KEYS.len());
        let entries: Vec<(i32, i32)> = iter.map(|(&k, &v)| (k, v)).collect();
        let mut expected: Vec<(i32, i32)> = DEMO_KEYS.iter().map(|&key| (key, -key)).collect();
        expected.sort();
        assert_eq!(entries, expected);
    }

    #[rstest]
    #[case("pre", TraversalOrder::PreOrder)]
    #[case("Pre-Order", TraversalOrder::PreOrder)]
    #[case("inorder", TraversalOrder::InOrder)]
    #[case(" post ", TraversalOrder::PostOrder)]
    #[case("level", TraversalOrder::LevelOrder)]
    #[case("BFS", TraversalOrder::LevelOrder)]
    fn test_parse_order(#[case] name: &str, #[case] expected: TraversalOrder) {
        assert_eq!(name.parse::<TraversalOrder>(), Ok(expected));
    }

    #[test]
    fn test_parse_order_round_trips_display() {
        for order in TraversalOrder::ALL {
            assert_eq!(order.to_string().parse::<TraversalOrder>(), Ok(order));
        }
    }

    #[test]
    fn test_parse_unknown_order() {
        let err = "zigzag".parse::<TraversalOrder>().unwrap_err();
        assert_eq!(err, ParseOrderError::Unknown("zigzag".to_string()));
        assert_eq!(err.to_string(), r#"unknown traversal order: "zigzag""#);
    }
}
