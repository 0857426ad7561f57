//! Tree nodes, stable node handles and borrowed node views.

use std::fmt;

use generational_arena::Index;

use crate::bst::BinaryTree;

/// A stable handle to a node stored in a tree's arena.
///
/// Handles stay valid across rotations. Once the node is removed the handle
/// resolves to nothing, even if its arena slot is reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) Index);

/// Child slot of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Side {
    Left,
    Right,
}

#[derive(Clone)]
pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) left: Option<NodeId>,
    pub(crate) right: Option<NodeId>,
    pub(crate) parent: Option<NodeId>,
    // height(right) - height(left), maintained by the AVL rebalancer only
    pub(crate) balance: i8,
}

impl<K, V> Node<K, V> {
    pub(crate) fn new(key: K, value: V, parent: Option<NodeId>) -> Self {
        Self {
            key,
            value,
            left: None,
            right: None,
            parent,
            balance: 0,
        }
    }

    pub(crate) fn child(&self, side: Side) -> Option<NodeId> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    pub(crate) fn set_child(&mut self, side: Side, child: Option<NodeId>) {
        match side {
            Side::Left => self.left = child,
            Side::Right => self.right = child,
        }
    }
}

/// A read-only view of one node of a tree.
///
/// Returned by `search` and `node`; it borrows the tree, so the tree cannot
/// change while the view is alive.
pub struct NodeRef<'a, K, V> {
    tree: &'a BinaryTree<K, V>,
    id: NodeId,
}

impl<'a, K, V> NodeRef<'a, K, V> {
    pub(crate) fn new(tree: &'a BinaryTree<K, V>, id: NodeId) -> Self {
        Self { tree, id }
    }

    /// Returns the stable handle of this node.
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn key(&self) -> &'a K {
        &self.tree.at(self.id).key
    }

    pub fn value(&self) -> &'a V {
        &self.tree.at(self.id).value
    }

    /// Returns the parent node, or `None` for the root.
    pub fn parent(&self) -> Option<NodeRef<'a, K, V>> {
        self.link(self.tree.at(self.id).parent)
    }

    pub fn left(&self) -> Option<NodeRef<'a, K, V>> {
        self.link(self.tree.at(self.id).left)
    }

    pub fn right(&self) -> Option<NodeRef<'a, K, V>> {
        self.link(self.tree.at(self.id).right)
    }

    pub fn is_root(&self) -> bool {
        self.tree.at(self.id).parent.is_none()
    }

    pub fn is_leaf(&self) -> bool {
        let node = self.tree.at(self.id);
        node.left.is_none() && node.right.is_none()
    }

    /// Returns the number of levels of the subtree rooted at this node.
    /// A leaf has height 1.
    ///
    /// Runs in time linear in the size of the subtree.
    pub fn height(&self) -> usize {
        self.tree.subtree_height(Some(self.id))
    }

    /// Returns `height(right) - height(left)`.
    ///
    /// Computed from the subtree, so it is meaningful for unbalanced trees too.
    pub fn balance_factor(&self) -> isize {
        let node = self.tree.at(self.id);
        let right = self.tree.subtree_height(node.right) as isize;
        let left = self.tree.subtree_height(node.left) as isize;
        right - left
    }

    fn link(&self, id: Option<NodeId>) -> Option<NodeRef<'a, K, V>> {
        id.map(|id| NodeRef::new(self.tree, id))
    }
}

impl<K, V> Clone for NodeRef<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for NodeRef<'_, K, V> {}

impl<K, V> PartialEq for NodeRef<'_, K, V> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for NodeRef<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("key", self.key())
            .field("value", self.value())
            .finish()
    }
}
