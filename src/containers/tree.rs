use std::cmp::Ordering;

use super::Comparator;

pub struct TreeNode<T> {
    pub(crate) value: T,
    pub(crate) left: Option<Box<TreeNode<T>>>,
    pub(crate) right: Option<Box<TreeNode<T>>>,
    /// Maintained by `AvlTree` only; plain binary trees leave it at 1.
    pub(crate) height: i64,
}

impl<T> TreeNode<T> {
    fn leaf(value: T) -> Self {
        TreeNode {
            value,
            left: None,
            right: None,
            height: 1,
        }
    }

    fn stored_height(node: &Option<Box<TreeNode<T>>>) -> i64 {
        node.as_ref().map_or(0, |node| node.height)
    }

    fn update_height(&mut self) {
        self.height = 1 + Self::stored_height(&self.left).max(Self::stored_height(&self.right));
    }

    fn balance_factor(&self) -> i64 {
        Self::stored_height(&self.left) - Self::stored_height(&self.right)
    }
}

/// Unbalanced binary search tree.
pub struct BinaryTree<T> {
    root: Option<Box<TreeNode<T>>>,
    comparator: Comparator<T>,
    len: usize,
}

impl<T> BinaryTree<T> {
    pub fn new(comparator: Comparator<T>) -> Self {
        BinaryTree {
            root: None,
            comparator,
            len: 0,
        }
    }

    /// Equal values go to the right subtree.
    pub fn insert(&mut self, value: T) {
        Self::insert_node(&mut self.root, value, &self.comparator);
        self.len += 1;
    }

    fn insert_node(node: &mut Option<Box<TreeNode<T>>>, value: T, comparator: &Comparator<T>) {
        match node {
            None => *node = Some(Box::new(TreeNode::leaf(value))),
            Some(current) => {
                if comparator(&value, &current.value) == Ordering::Less {
                    Self::insert_node(&mut current.left, value, comparator)
                } else {
                    Self::insert_node(&mut current.right, value, comparator)
                }
            }
        }
    }

    pub fn search(&self, value: &T) -> bool {
        Self::search_node(&self.root, value, &self.comparator)
    }

    fn search_node(node: &Option<Box<TreeNode<T>>>, value: &T, comparator: &Comparator<T>) -> bool {
        match node {
            None => false,
            Some(current) => match comparator(value, &current.value) {
                Ordering::Equal => true,
                Ordering::Less => Self::search_node(&current.left, value, comparator),
                Ordering::Greater => Self::search_node(&current.right, value, comparator),
            },
        }
    }

    pub fn pre_order(&self) -> Vec<&T> {
        let mut visited = vec![];
        let mut stack: Vec<&TreeNode<T>> = self.root.iter().map(|node| &**node).collect();

        while let Some(node) = stack.pop() {
            visited.push(&node.value);
            if let Some(right) = &node.right {
                stack.push(right);
            }
            if let Some(left) = &node.left {
                stack.push(left);
            }
        }

        visited
    }

    pub fn in_order(&self) -> Vec<&T> {
        let mut visited = vec![];
        let mut stack: Vec<&TreeNode<T>> = vec![];
        let mut current = self.root.as_deref();

        while current.is_some() || !stack.is_empty() {
            while let Some(node) = current {
                stack.push(node);
                current = node.left.as_deref();
            }
            if let Some(node) = stack.pop() {
                visited.push(&node.value);
                current = node.right.as_deref();
            }
        }

        visited
    }

    pub fn post_order(&self) -> Vec<&T> {
        let mut output: Vec<&TreeNode<T>> = vec![];
        let mut stack: Vec<&TreeNode<T>> = self.root.iter().map(|node| &**node).collect();

        while let Some(node) = stack.pop() {
            output.push(node);
            if let Some(left) = &node.left {
                stack.push(left);
            }
            if let Some(right) = &node.right {
                stack.push(right);
            }
        }

        output.into_iter().rev().map(|node| &node.value).collect()
    }

    /// Height of the tree shape, 0 when empty.
    pub fn height(&self) -> i64 {
        fn shape_height<T>(node: &Option<Box<TreeNode<T>>>) -> i64 {
            match node {
                None => 0,
                Some(node) => 1 + shape_height(&node.left).max(shape_height(&node.right)),
            }
        }
        shape_height(&self.root)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn root(&self) -> Option<&TreeNode<T>> {
        self.root.as_deref()
    }
}

/// Self-balancing search tree.
///
/// Shares node layout, search, traversals and height with `BinaryTree`;
/// only insertion differs.
pub struct AvlTree<T> {
    tree: BinaryTree<T>,
}

impl<T> AvlTree<T> {
    pub fn new(comparator: Comparator<T>) -> Self {
        AvlTree {
            tree: BinaryTree::new(comparator),
        }
    }

    /// Inserting a value the comparator considers already present does nothing.
    pub fn insert(&mut self, value: T) {
        let mut inserted = false;
        let root = self.tree.root.take();
        let (root, _) = Self::insert_balanced(root, value, &self.tree.comparator, &mut inserted);
        self.tree.root = Some(root);
        if inserted {
            self.tree.len += 1;
        }
    }

    /// Returns the rebuilt subtree and the direction the value took at its root.
    fn insert_balanced(
        node: Option<Box<TreeNode<T>>>,
        value: T,
        comparator: &Comparator<T>,
        inserted: &mut bool,
    ) -> (Box<TreeNode<T>>, Ordering) {
        let mut node = match node {
            None => {
                *inserted = true;
                return (Box::new(TreeNode::leaf(value)), Ordering::Equal);
            }
            Some(node) => node,
        };

        let direction = comparator(&value, &node.value);
        let child_direction = match direction {
            Ordering::Equal => return (node, Ordering::Equal),
            Ordering::Less => {
                let (left, taken) = Self::insert_balanced(node.left.take(), value, comparator, inserted);
                node.left = Some(left);
                taken
            }
            Ordering::Greater => {
                let (right, taken) = Self::insert_balanced(node.right.take(), value, comparator, inserted);
                node.right = Some(right);
                taken
            }
        };

        node.update_height();
        let balance = node.balance_factor();

        let node = if balance > 1 {
            match child_direction {
                // LL
                Ordering::Less => Self::rotate_right(node),
                // LR
                _ => {
                    if let Some(left) = node.left.take() {
                        node.left = Some(Self::rotate_left(left));
                    }
                    Self::rotate_right(node)
                }
            }
        } else if balance < -1 {
            match child_direction {
                // RR
                Ordering::Greater => Self::rotate_left(node),
                // RL
                _ => {
                    if let Some(right) = node.right.take() {
                        node.right = Some(Self::rotate_right(right));
                    }
                    Self::rotate_left(node)
                }
            }
        } else {
            node
        };

        (node, direction)
    }

    fn rotate_right(mut node: Box<TreeNode<T>>) -> Box<TreeNode<T>> {
        match node.left.take() {
            None => node,
            Some(mut pivot) => {
                node.left = pivot.right.take();
                node.update_height();
                pivot.right = Some(node);
                pivot.update_height();
                pivot
            }
        }
    }

    fn rotate_left(mut node: Box<TreeNode<T>>) -> Box<TreeNode<T>> {
        match node.right.take() {
            None => node,
            Some(mut pivot) => {
                node.right = pivot.left.take();
                node.update_height();
                pivot.left = Some(node);
                pivot.update_height();
                pivot
            }
        }
    }

    pub fn search(&self, value: &T) -> bool {
        self.tree.search(value)
    }

    pub fn pre_order(&self) -> Vec<&T> {
        self.tree.pre_order()
    }

    pub fn in_order(&self) -> Vec<&T> {
        self.tree.in_order()
    }

    pub fn post_order(&self) -> Vec<&T> {
        self.tree.post_order()
    }

    pub fn height(&self) -> i64 {
        self.tree.height()
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub fn root(&self) -> Option<&TreeNode<T>> {
        self.tree.root()
    }
}
