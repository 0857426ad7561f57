//! An unbalanced binary search tree over an arena of nodes.
//!
//! [`BinaryTree`] is the structural core shared with [`AvlTree`](crate::AvlTree):
//! ordered insert, search and delete with in-order successor splicing.
//! It can also be used directly as a plain BST.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::iter::FromIterator;
use std::mem;

use generational_arena::Arena;
use tracing::{debug, trace};

use crate::node::{Node, NodeId, NodeRef, Side};
use crate::scratch::{Queue, Stack};

/// An ordered map implemented with an unbalanced binary search tree.
///
/// ```
/// use arena_avl::BinaryTree;
/// let mut tree = BinaryTree::new();
/// tree.insert(2, "two");
/// tree.insert(1, "one");
/// assert!(!tree.insert(1, "uno"));
/// assert_eq!(tree.get(&1), Some(&"one"));
/// assert!(tree.delete(&1));
/// assert!(tree.search(&1).is_none());
/// ```
#[derive(Clone)]
pub struct BinaryTree<K, V> {
    pub(crate) nodes: Arena<Node<K, V>>,
    pub(crate) root: Option<NodeId>,
}

impl<K, V> BinaryTree<K, V> {
    /// Creates an empty tree.
    /// No memory is allocated until the first item is inserted.
    pub fn new() -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
        }
    }

    /// Returns true if the tree contains no elements.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the number of elements in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of levels on the longest root-to-leaf path.
    pub fn height(&self) -> usize {
        self.subtree_height(self.root)
    }

    /// Removes all elements.
    pub fn clear(&mut self) {
        debug!(len = self.len(), "clearing tree");
        self.nodes.clear();
        self.root = None;
    }

    /// Returns the root node.
    pub fn root(&self) -> Option<NodeRef<'_, K, V>> {
        self.root.map(|id| NodeRef::new(self, id))
    }

    /// Resolves a node handle, or returns `None` if the node has been removed.
    pub fn node(&self, id: NodeId) -> Option<NodeRef<'_, K, V>> {
        self.nodes.get(id.0).map(|_| NodeRef::new(self, id))
    }

    /// Returns the entry with the smallest key.
    pub fn first(&self) -> Option<(&K, &V)> {
        self.root.map(|root| self.entry(self.leftmost(root)))
    }

    /// Returns the entry with the largest key.
    pub fn last(&self) -> Option<(&K, &V)> {
        self.root.map(|root| self.entry(self.rightmost(root)))
    }

    pub(crate) fn at(&self, id: NodeId) -> &Node<K, V> {
        &self.nodes[id.0]
    }

    pub(crate) fn at_mut(&mut self, id: NodeId) -> &mut Node<K, V> {
        &mut self.nodes[id.0]
    }

    pub(crate) fn entry(&self, id: NodeId) -> (&K, &V) {
        let node = self.at(id);
        (&node.key, &node.value)
    }

    /// Returns which child slot of `parent` holds `child`.
    pub(crate) fn side_of(&self, parent: NodeId, child: NodeId) -> Side {
        let node = self.at(parent);
        if node.left == Some(child) {
            Side::Left
        } else {
            debug_assert_eq!(node.right, Some(child));
            Side::Right
        }
    }

    /// Puts `new` into the slot of `parent` that currently holds `old`
    /// (or makes it the root) and points its parent link back.
    pub(crate) fn replace_child(
        &mut self,
        parent: Option<NodeId>,
        old: NodeId,
        new: Option<NodeId>,
    ) {
        match parent {
            None => self.root = new,
            Some(parent_id) => {
                let side = self.side_of(parent_id, old);
                self.at_mut(parent_id).set_child(side, new);
            }
        }
        if let Some(new_id) = new {
            self.at_mut(new_id).parent = parent;
        }
    }

    pub(crate) fn leftmost(&self, mut id: NodeId) -> NodeId {
        while let Some(left) = self.at(id).left {
            id = left;
        }
        id
    }

    pub(crate) fn rightmost(&self, mut id: NodeId) -> NodeId {
        while let Some(right) = self.at(id).right {
            id = right;
        }
        id
    }

    /// Counts the levels below `top`, walking level by level.
    pub(crate) fn subtree_height(&self, top: Option<NodeId>) -> usize {
        let mut height = 0;
        let mut queue = Queue::new();
        if let Some(id) = top {
            queue.enqueue(id);
        }
        while !queue.is_empty() {
            height += 1;
            for _ in 0..queue.len() {
                if let Some(id) = queue.dequeue() {
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
        height
    }

    /// Asserts BST order, parent links and the node count.
    /// With `balanced`, also asserts that every stored balance factor is
    /// exact and within `-1..=1`.
    #[cfg(any(test, feature = "consistency_check"))]
    pub(crate) fn check_tree(&self, balanced: bool)
    where
        K: Ord,
    {
        // Check root link
        if let Some(root) = self.root {
            assert!(self.at(root).parent.is_none());
        }

        // Post-order leaves the heights of the left and right subtree on top
        let mut heights: Stack<usize> = Stack::new();
        let mut num_nodes = 0;
        self.walk_post_order(|id| {
            let node = self.at(id);

            let right_height = match node.right {
                None => 0,
                Some(right) => {
                    assert_eq!(self.at(right).parent, Some(id));
                    assert!(self.at(right).key > node.key);
                    heights.pop().expect("right subtree height")
                }
            };
            let left_height = match node.left {
                None => 0,
                Some(left) => {
                    assert_eq!(self.at(left).parent, Some(id));
                    assert!(self.at(left).key < node.key);
                    heights.pop().expect("left subtree height")
                }
            };

            if balanced {
                let expected = right_height as isize - left_height as isize;
                assert_eq!(node.balance as isize, expected);
                assert!((-1..=1).contains(&expected));
            }

            heights.push(1 + left_height.max(right_height));
            num_nodes += 1;
        });

        assert_eq!(heights.len(), usize::from(self.root.is_some()));
        assert_eq!(num_nodes, self.len());
    }
}

impl<K: Ord, V> BinaryTree<K, V> {
    /// Returns the node holding `key`.
    ///
    /// The key may be any borrowed form of the tree's key type, but the ordering
    /// on the borrowed form *must* match the ordering on the key type.
    pub fn search<Q>(&self, key: &Q) -> Option<NodeRef<'_, K, V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).map(|id| NodeRef::new(self, id))
    }

    /// Returns a reference to the value corresponding to the key.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).map(|id| &self.at(id).value)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let id = self.find(key)?;
        Some(&mut self.at_mut(id).value)
    }

    /// Returns true if the tree contains a value for the key.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).is_some()
    }

    /// Inserts a key-value pair.
    ///
    /// Returns false, leaving the tree untouched, if the key is already present.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        self.insert_node(key, value).is_some()
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

    /// Removes a key from the tree.
    /// Returns the value at the key if the key was previously in the tree.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let id = self.find(key)?;
        let (node, _) = self.unlink(id);
        Some(node.value)
    }

    /// Asserts that the internal tree structure is consistent.
    #[cfg(any(test, feature = "consistency_check"))]
    pub fn check_consistency(&self) {
        self.check_tree(false);
    }

    pub(crate) fn find<Q>(&self, key: &Q) -> Option<NodeId>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut current = self.root;
        while let Some(id) = current {
            let node = self.at(id);
            current = match key.cmp(node.key.borrow()) {
                Ordering::Equal => break,
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
            };
        }
        current
    }

    /// Attaches a new leaf for `key` and returns it, or returns `None` if the
    /// key is already present.
    pub(crate) fn insert_node(&mut self, key: K, value: V) -> Option<NodeId> {
        let (parent, side) = self.find_insert_pos(&key)?;
        let id = NodeId(self.nodes.insert(Node::new(key, value, parent)));
        match parent {
            None => self.root = Some(id),
            Some(parent_id) => self.at_mut(parent_id).set_child(side, Some(id)),
        }
        Some(id)
    }

    fn find_insert_pos(&self, key: &K) -> Option<(Option<NodeId>, Side)> {
        let mut parent = None;
        let mut side = Side::Left;
        let mut current = self.root;
        while let Some(id) = current {
            let node = self.at(id);
            side = match key.cmp(&node.key) {
                Ordering::Equal => return None,
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
            };
            parent = Some(id);
            current = node.child(side);
        }
        Some((parent, side))
    }

    /// Removes the entry held by `id` from the tree.
    ///
    /// A node with two children takes over the entry of its in-order successor,
    /// and the successor (which has no left child) is spliced out instead.
    /// Returns the physically removed node together with the parent whose
    /// subtree on the returned side lost a level.
    pub(crate) fn unlink(&mut self, id: NodeId) -> (Node<K, V>, Option<(NodeId, Side)>) {
        let target = match (self.at(id).left, self.at(id).right) {
            (Some(_), Some(right)) => {
                let successor = self.leftmost(right);
                self.swap_entries(id, successor);
                successor
            }
            _ => id,
        };

        let node = self.at(target);
        debug_assert!(node.left.is_none() || node.right.is_none());
        let child = node.left.or(node.right);
        let parent = node.parent;
        let shrunk = parent.map(|parent_id| (parent_id, self.side_of(parent_id, target)));
        trace!(successor = (target != id), "splicing out node");

        self.replace_child(parent, target, child);
        let node = self.nodes.remove(target.0).expect("unlinked node is live");
        (node, shrunk)
    }

    fn swap_entries(&mut self, a: NodeId, b: NodeId) {
        if let (Some(a), Some(b)) = self.nodes.get2_mut(a.0, b.0) {
            mem::swap(&mut a.key, &mut b.key);
            mem::swap(&mut a.value, &mut b.value);
        }
    }
}

impl<K, V> Default for BinaryTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for BinaryTree<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<K: Ord, V> Extend<(K, V)> for BinaryTree<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for BinaryTree<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Renders the tree shape as `(left<-root:key->right)`.
impl<K: fmt::Display, V> fmt::Display for BinaryTree<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        enum Piece {
            Subtree(NodeId),
            Key(NodeId),
            Text(&'static str),
        }

        let Some(root) = self.root else {
            return f.write_str("()");
        };

        let mut pieces = Stack::new();
        pieces.push(Piece::Subtree(root));
        while let Some(piece) = pieces.pop() {
            match piece {
                Piece::Text(text) => f.write_str(text)?,
                Piece::Key(id) => write!(f, "{}", self.at(id).key)?,
                Piece::Subtree(id) => {
                    // Pushed in reverse so they pop in reading order
                    let node = self.at(id);
                    pieces.push(Piece::Text(")"));
                    if let Some(right) = node.right {
                        pieces.push(Piece::Subtree(right));
                    }
                    pieces.push(Piece::Text("->"));
                    pieces.push(Piece::Key(id));
                    if node.parent.is_none() {
                        pieces.push(Piece::Text("root:"));
                    }
                    pieces.push(Piece::Text("<-"));
                    if let Some(left) = node.left {
                        pieces.push(Piece::Subtree(left));
                    }
                    pieces.push(Piece::Text("("));
                }
            }
        }
        Ok(())
    }
}
