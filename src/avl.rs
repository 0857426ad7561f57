//! An ordered map implemented with an AVL tree.

use std::borrow::Borrow;
use std::fmt;
use std::iter::FromIterator;

use tracing::trace;

use crate::bst::BinaryTree;
use crate::node::{NodeId, NodeRef, Side};
use crate::traverse::{Iter, TraversalOrder};

/// An ordered map implemented with an AVL tree.
///
/// ```
/// use arena_avl::AvlTree;
/// let mut tree = AvlTree::new();
/// tree.insert(0, "zero");
/// tree.insert(1, "one");
/// tree.insert(2, "two");
/// assert_eq!(tree.root().map(|node| *node.key()), Some(1));
/// assert_eq!(tree.get(&1), Some(&"one"));
/// tree.delete(&1);
/// assert!(tree.get(&1).is_none());
/// ```
#[derive(Clone)]
pub struct AvlTree<K, V> {
    tree: BinaryTree<K, V>,
}

enum Ascent {
    Stop,
    Continue(NodeId),
}

impl<K, V> AvlTree<K, V> {
    /// Creates an empty tree.
    /// No memory is allocated until the first item is inserted.
    pub fn new() -> Self {
        Self {
            tree: BinaryTree::new(),
        }
    }

    /// Returns true if the tree contains no elements.
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns the number of elements in the tree.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns the number of levels on the longest root-to-leaf path.
    ///
    /// Follows the balance factors down the taller side, so it runs in
    /// logarithmic time.
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut current = self.tree.root;
        while let Some(id) = current {
            height += 1;
            let node = self.tree.at(id);
            current = if node.balance > 0 { node.right } else { node.left };
        }
        height
    }

    /// Removes all elements.
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Returns the root node.
    pub fn root(&self) -> Option<NodeRef<'_, K, V>> {
        self.tree.root()
    }

    /// Resolves a node handle, or returns `None` if the node has been removed.
    pub fn node(&self, id: NodeId) -> Option<NodeRef<'_, K, V>> {
        self.tree.node(id)
    }

    /// Returns the entry with the smallest key.
    pub fn first(&self) -> Option<(&K, &V)> {
        self.tree.first()
    }

    /// Returns the entry with the largest key.
    pub fn last(&self) -> Option<(&K, &V)> {
        self.tree.last()
    }

    /// Gets an iterator over the entries of the tree, sorted by key.
    pub fn iter(&self) -> Iter<'_, K, V> {
        self.tree.iter()
    }

    /// Calls `visitor` once per entry, in the given order.
    pub fn traverse<F: FnMut(&K, &V)>(&self, order: TraversalOrder, visitor: F) {
        self.tree.traverse(order, visitor);
    }

    /// Visits node, left subtree, right subtree.
    pub fn traverse_pre_order<F: FnMut(&K, &V)>(&self, visitor: F) {
        self.tree.traverse_pre_order(visitor);
    }

    /// Visits left subtree, node, right subtree, i.e. in key order.
    pub fn traverse_in_order<F: FnMut(&K, &V)>(&self, visitor: F) {
        self.tree.traverse_in_order(visitor);
    }

    /// Visits left subtree, right subtree, node.
    pub fn traverse_post_order<F: FnMut(&K, &V)>(&self, visitor: F) {
        self.tree.traverse_post_order(visitor);
    }

    /// Visits the nodes level by level, each level from left to right.
    pub fn traverse_level_order<F: FnMut(&K, &V)>(&self, visitor: F) {
        self.tree.traverse_level_order(visitor);
    }

    // Restores balance on the way up from a freshly attached leaf.
    // A single (possibly double) rotation always restores the height the
    // subtree had before the insert, so the ascent ends after it.
    fn rebalance_after_insert(&mut self, inserted: NodeId) {
        let tree = &mut self.tree;
        let mut current = inserted;
        while let Some(parent) = tree.at(current).parent {
            let parent_balance = tree.at(parent).balance;
            match tree.side_of(parent, current) {
                Side::Right => {
                    if parent_balance > 0 {
                        if tree.at(current).balance < 0 {
                            tree.rotate_right_left(parent, current);
                        } else {
                            tree.rotate_left(parent, current);
                        }
                        return;
                    }
                    tree.at_mut(parent).balance += 1;
                }
                Side::Left => {
                    if parent_balance < 0 {
                        if tree.at(current).balance > 0 {
                            tree.rotate_left_right(parent, current);
                        } else {
                            tree.rotate_right(parent, current);
                        }
                        return;
                    }
                    tree.at_mut(parent).balance -= 1;
                }
            }
            if tree.at(parent).balance == 0 {
                trace!("insert absorbed, subtree height unchanged");
                return;
            }
            current = parent;
        }
    }

    // Restores balance on the way up from `parent`, whose subtree on `side`
    // lost a level. Unlike insert, a rotation may shorten the subtree and
    // pass the shrink on to the next level up.
    fn rebalance_after_delete(&mut self, mut parent: NodeId, mut side: Side) {
        loop {
            let above = self.tree.at(parent).parent;
            let subtree = match self.rebalance_shrunk(parent, side) {
                Ascent::Stop => {
                    trace!("delete absorbed, subtree height unchanged");
                    return;
                }
                Ascent::Continue(subtree) => subtree,
            };
            match above {
                None => return,
                Some(above) => {
                    side = self.tree.side_of(above, subtree);
                    parent = above;
                }
            }
        }
    }

    // One step of the delete ascent. Returns the root of the shortened
    // subtree, or `Stop` when its height did not change.
    fn rebalance_shrunk(&mut self, parent: NodeId, side: Side) -> Ascent {
        let tree = &mut self.tree;
        let balance = tree.at(parent).balance;
        match side {
            Side::Left => {
                if balance > 0 {
                    let heavy = tree
                        .at(parent)
                        .right
                        .expect("right-heavy node has a right child");
                    let heavy_balance = tree.at(heavy).balance;
                    let subtree = if heavy_balance < 0 {
                        tree.rotate_right_left(parent, heavy)
                    } else {
                        tree.rotate_left(parent, heavy)
                    };
                    if heavy_balance == 0 {
                        return Ascent::Stop;
                    }
                    return Ascent::Continue(subtree);
                }
                tree.at_mut(parent).balance += 1;
            }
            Side::Right => {
                if balance < 0 {
                    let heavy = tree
                        .at(parent)
                        .left
                        .expect("left-heavy node has a left child");
                    let heavy_balance = tree.at(heavy).balance;
                    let subtree = if heavy_balance > 0 {
                        tree.rotate_left_right(parent, heavy)
                    } else {
                        tree.rotate_right(parent, heavy)
                    };
                    if heavy_balance == 0 {
                        return Ascent::Stop;
                    }
                    return Ascent::Continue(subtree);
                }
                tree.at_mut(parent).balance -= 1;
            }
        }
        if tree.at(parent).balance == 0 {
            // Was leaning towards the removed side, now one level shorter
            Ascent::Continue(parent)
        } else {
            Ascent::Stop
        }
    }
}

impl<K: Ord, V> AvlTree<K, V> {
    /// Returns the node holding `key`.
    ///
    /// The key may be any borrowed form of the tree's key type, but the ordering
    /// on the borrowed form *must* match the ordering on the key type.
    pub fn search<Q>(&self, key: &Q) -> Option<NodeRef<'_, K, V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.search(key)
    }

    /// Returns a reference to the value corresponding to the key.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.get(key)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.get_mut(key)
    }

    /// Returns true if the tree contains a value for the key.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.contains_key(key)
    }

    /// Inserts a key-value pair and rebalances the tree.
    ///
    /// Returns false, leaving the tree untouched, if the key is already present.
    /// The stored value is not replaced in that case.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        match self.tree.insert_node(key, value) {
            Some(id) => {
                self.rebalance_after_insert(id);
                true
            }
            None => false,
        }
    }

    /// Removes a key from the tree.
    /// Returns whether the key was present.
    pub fn delete<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.remove(key).is_some()
    }

    /// Removes a key from the tree and rebalances it.
    /// Returns the value at the key if the key was previously in the tree.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let id = self.tree.find(key)?;
        let (node, shrunk) = self.tree.unlink(id);
        if let Some((parent, side)) = shrunk {
            self.rebalance_after_delete(parent, side);
        }
        Some(node.value)
    }

    /// Asserts that the internal tree structure is consistent and balanced.
    #[cfg(any(test, feature = "consistency_check"))]
    pub fn check_consistency(&self) {
        self.tree.check_tree(true);
    }
}

impl<K, V> Default for AvlTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, K, V> IntoIterator for &'a AvlTree<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for AvlTree<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<K: Ord, V> Extend<(K, V)> for AvlTree<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for AvlTree<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.tree, f)
    }
}

/// Renders the tree shape as `(left<-root:key->right)`.
impl<K: fmt::Display, V> fmt::Display for AvlTree<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.tree, f)
    }
}
