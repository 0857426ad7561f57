//! Single and double rotations with AVL balance factor bookkeeping.
//!
//! Every rotation takes the unbalanced `sub_root` and its heavier child
//! `node`, hooks the new local root into the slot `sub_root` occupied and
//! returns it. Balance factors are derived from the pre-rotation factors,
//! with `sub_root` taken to be two levels out of balance.

use tracing::trace;

use crate::bst::BinaryTree;
use crate::node::NodeId;

impl<K, V> BinaryTree<K, V> {
    /// Rotates `node` (the right child of `sub_root`) up into its place.
    pub(crate) fn rotate_left(&mut self, sub_root: NodeId, node: NodeId) -> NodeId {
        self.relink_left(sub_root, node);
        if self.at(node).balance == 0 {
            // Only after a delete: the height of the subtree does not change
            self.at_mut(sub_root).balance = 1;
            self.at_mut(node).balance = -1;
        } else {
            self.at_mut(sub_root).balance = 0;
            self.at_mut(node).balance = 0;
        }
        trace!(kind = "left", "rotated subtree");
        node
    }

    /// Rotates `node` (the left child of `sub_root`) up into its place.
    pub(crate) fn rotate_right(&mut self, sub_root: NodeId, node: NodeId) -> NodeId {
        self.relink_right(sub_root, node);
        if self.at(node).balance == 0 {
            self.at_mut(sub_root).balance = -1;
            self.at_mut(node).balance = 1;
        } else {
            self.at_mut(sub_root).balance = 0;
            self.at_mut(node).balance = 0;
        }
        trace!(kind = "right", "rotated subtree");
        node
    }

    /// Handles a left-heavy `sub_root` whose left child `node` is right-heavy.
    /// The right child of `node` becomes the new local root.
    pub(crate) fn rotate_left_right(&mut self, sub_root: NodeId, node: NodeId) -> NodeId {
        let pivot = self
            .at(node)
            .right
            .expect("left-right rotation needs a right grandchild");
        self.relink_left(node, pivot);
        self.relink_right(sub_root, pivot);

        let (sub_root_balance, node_balance) = match self.at(pivot).balance {
            0 => (0, 0),
            b if b > 0 => (0, -1),
            _ => (1, 0),
        };
        self.at_mut(sub_root).balance = sub_root_balance;
        self.at_mut(node).balance = node_balance;
        self.at_mut(pivot).balance = 0;
        trace!(kind = "left-right", "rotated subtree");
        pivot
    }

    /// Handles a right-heavy `sub_root` whose right child `node` is left-heavy.
    /// The left child of `node` becomes the new local root.
    pub(crate) fn rotate_right_left(&mut self, sub_root: NodeId, node: NodeId) -> NodeId {
        let pivot = self
            .at(node)
            .left
            .expect("right-left rotation needs a left grandchild");
        self.relink_right(node, pivot);
        self.relink_left(sub_root, pivot);

        let (sub_root_balance, node_balance) = match self.at(pivot).balance {
            0 => (0, 0),
            b if b > 0 => (-1, 0),
            _ => (0, 1),
        };
        self.at_mut(sub_root).balance = sub_root_balance;
        self.at_mut(node).balance = node_balance;
        self.at_mut(pivot).balance = 0;
        trace!(kind = "right-left", "rotated subtree");
        pivot
    }

    // Structural part of a left rotation, balance factors are left alone.
    fn relink_left(&mut self, sub_root: NodeId, node: NodeId) {
        debug_assert_eq!(self.at(sub_root).right, Some(node));
        let above = self.at(sub_root).parent;

        let inner = self.at(node).left;
        self.at_mut(sub_root).right = inner;
        if let Some(inner) = inner {
            self.at_mut(inner).parent = Some(sub_root);
        }

        self.replace_child(above, sub_root, Some(node));
        self.at_mut(node).left = Some(sub_root);
        self.at_mut(sub_root).parent = Some(node);
    }

    // Structural part of a right rotation, balance factors are left alone.
    fn relink_right(&mut self, sub_root: NodeId, node: NodeId) {
        debug_assert_eq!(self.at(sub_root).left, Some(node));
        let above = self.at(sub_root).parent;

        let inner = self.at(node).right;
        self.at_mut(sub_root).left = inner;
        if let Some(inner) = inner {
            self.at_mut(inner).parent = Some(sub_root);
        }

        self.replace_child(above, sub_root, Some(node));
        self.at_mut(node).right = Some(sub_root);
        self.at_mut(sub_root).parent = Some(node);
    }
}

#[cfg(test)]
mod tests {
    use crate::bst::BinaryTree;
    use crate::node::NodeId;

    // Builds an unbalanced tree and stores exact balance factors on it,
    // as the rebalancer would have before deciding to rotate.
    fn chain(keys: &[i32]) -> BinaryTree<i32, ()> {
        let mut tree: BinaryTree<i32, ()> = keys.iter().map(|&key| (key, ())).collect();
        let ids: Vec<NodeId> = tree.nodes.iter().map(|(index, _)| NodeId(index)).collect();
        for id in ids {
            let balance = tree.node(id).unwrap().balance_factor();
            tree.at_mut(id).balance = balance as i8;
        }
        tree
    }

    fn id_of(tree: &BinaryTree<i32, ()>, key: i32) -> NodeId {
        tree.search(&key).unwrap().id()
    }

    fn shape(tree: &BinaryTree<i32, ()>) -> (i32, Option<i32>, Option<i32>) {
        let root = tree.root().unwrap();
        (
            *root.key(),
            root.left().map(|node| *node.key()),
            root.right().map(|node| *node.key()),
        )
    }

    #[test]
    fn test_rotate_left() {
        // 1            2
        //  \          / \
        //   2   ->   1   3
        //    \
        //     3
        let mut tree = chain(&[1, 2, 3]);
        let new_root = tree.rotate_left(id_of(&tree, 1), id_of(&tree, 2));
        assert_eq!(new_root, id_of(&tree, 2));
        assert_eq!(shape(&tree), (2, Some(1), Some(3)));
        tree.check_tree(true);
    }

    #[test]
    fn test_rotate_right() {
        let mut tree = chain(&[3, 2, 1]);
        tree.rotate_right(id_of(&tree, 3), id_of(&tree, 2));
        assert_eq!(shape(&tree), (2, Some(1), Some(3)));
        tree.check_tree(true);
    }

    #[test]
    fn test_rotate_left_right() {
        //   3          2
        //  /          / \
        // 1     ->   1   3
        //  \
        //   2
        let mut tree = chain(&[3, 1, 2]);
        let new_root = tree.rotate_left_right(id_of(&tree, 3), id_of(&tree, 1));
        assert_eq!(new_root, id_of(&tree, 2));
        assert_eq!(shape(&tree), (2, Some(1), Some(3)));
        tree.check_tree(true);
    }

    #[test]
    fn test_rotate_right_left() {
        let mut tree = chain(&[1, 3, 2]);
        tree.rotate_right_left(id_of(&tree, 1), id_of(&tree, 3));
        assert_eq!(shape(&tree), (2, Some(1), Some(3)));
        tree.check_tree(true);
    }

    #[test]
    fn test_rotate_below_root_keeps_parent_slot() {
        //   5              5
        //  / \            / \
        // 0   6          0   7
        //      \   ->       / \
        //       7          6   8
        //        \
        //         8
        let mut tree = chain(&[5, 0, 6, 7, 8]);
        tree.rotate_left(id_of(&tree, 6), id_of(&tree, 7));
        let right = tree.root().unwrap().right().unwrap();
        assert_eq!(*right.key(), 7);
        assert_eq!(right.parent().map(|node| *node.key()), Some(5));
        assert_eq!(right.left().map(|node| *node.key()), Some(6));
        assert_eq!(right.right().map(|node| *node.key()), Some(8));
        tree.check_tree(false);
    }

    #[test]
    fn test_rotate_left_with_balanced_child() {
        // 1              3
        //  \            / \
        //   3    ->    1   4
        //  / \          \
        // 2   4          2
        // The shape left behind once 0 is deleted from under 1: the heavy
        // child is balanced, which only a delete can produce.
        let mut tree = chain(&[1, 0, 3, 2, 4]);
        tree.delete(&0);
        tree.at_mut(id_of(&tree, 1)).balance = 2;
        tree.rotate_left(id_of(&tree, 1), id_of(&tree, 3));
        assert_eq!(shape(&tree), (3, Some(1), Some(4)));
        assert_eq!(tree.search(&1).unwrap().balance_factor(), 1);
        assert_eq!(tree.search(&3).unwrap().balance_factor(), -1);
        tree.check_tree(true);
    }
}
