use core::borrow::Borrow;
use core::cmp::Ordering;
use core::fmt;

use smallvec::SmallVec;

use super::arena::Arena;
use super::handle::Handle;
use super::node::{Node, RightLink};

/// Explicit stack for the preorder copy walk. Sized for the right-spine depth
/// of a typical tree; deeper (degenerate) trees spill to the heap.
type PreorderStack = SmallVec<[Handle; 16]>;

/// The core threaded binary search tree backing `ThreadedBstMap`.
///
/// Plain, unbalanced BST augmented with threads: wherever a node has no right
/// child, its right slot holds a non-owning reference to the node's inorder
/// successor instead. Threads are what make a full inorder traversal possible
/// in O(1) space, without recursion, a stack, or parent links.
pub(crate) struct RawThreadedMap<K, V> {
    /// Arena storing all tree nodes.
    nodes: Arena<Node<K>>,
    /// Arena storing all values (separate from nodes so key-only walks never
    /// touch value memory).
    values: Arena<V>,
    /// Handle to the root node, if the tree is non-empty.
    root: Option<Handle>,
    /// Total number of key-value pairs in the tree.
    len: usize,
    /// Traversal state: the node the next `next()` call will report, set by
    /// `begin()` and absent once the traversal is exhausted.
    cursor: Option<Handle>,
}

impl<K, V> RawThreadedMap<K, V> {
    /// Creates a new, empty tree.
    pub(crate) const fn new() -> Self {
        Self {
            nodes: Arena::new(),
            values: Arena::new(),
            root: None,
            len: 0,
            cursor: None,
        }
    }

    /// Creates a new tree with the specified capacity. One node per pair, so
    /// both arenas get the same reservation.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity),
            values: Arena::with_capacity(capacity),
            root: None,
            len: 0,
            cursor: None,
        }
    }

    /// Returns the number of key-value pairs in the tree.
    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the tree contains no elements.
    pub(crate) const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the capacity of the tree.
    pub(crate) fn capacity(&self) -> usize {
        self.values.capacity()
    }

    /// Clears all elements from the tree.
    ///
    /// Whole-arena teardown: no per-node walk, and in particular no risk of
    /// releasing a node twice through a thread that aliases an ancestor.
    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.values.clear();
        self.root = None;
        self.len = 0;
        self.cursor = None;
        debug_assert!(self.nodes.is_empty());
    }

    /// Returns a reference to a node by handle.
    pub(crate) fn node(&self, handle: Handle) -> &Node<K> {
        self.nodes.get(handle)
    }

    /// Returns a reference to a value by handle.
    pub(crate) fn value(&self, handle: Handle) -> &V {
        self.values.get(handle)
    }

    /// Walks left links from `handle` to the minimum of that subtree.
    fn leftmost_from(&self, mut handle: Handle) -> Handle {
        while let Some(left) = self.nodes.get(handle).left() {
            handle = left;
        }
        handle
    }

    /// Returns the first node in inorder, if any.
    pub(crate) fn first_inorder(&self) -> Option<Handle> {
        self.root.map(|root| self.leftmost_from(root))
    }

    /// Advances one inorder position from `handle`.
    ///
    /// A threaded node hops straight to its successor in O(1); a node with a
    /// true right child descends to that subtree's leftmost node.
    pub(crate) fn step_inorder(&self, handle: Handle) -> Option<Handle> {
        match self.nodes.get(handle).right() {
            RightLink::Thread(next) => Some(next),
            RightLink::End => None,
            RightLink::Child(child) => Some(self.leftmost_from(child)),
        }
    }

    /// Resets the traversal cursor to the first inorder node.
    ///
    /// Any traversal already in progress is abandoned.
    pub(crate) fn begin(&mut self) {
        self.cursor = self.first_inorder();
    }

    /// Reports the cursor's key and advances the cursor, or returns `None`
    /// once the traversal is exhausted.
    pub(crate) fn next(&mut self) -> Option<&K> {
        let current = self.cursor?;
        self.cursor = self.step_inorder(current);
        Some(self.nodes.get(current).key())
    }

    /// Drains all key-value pairs in inorder, leaving the tree empty.
    pub(crate) fn drain_to_vec(&mut self) -> alloc::vec::Vec<(K, V)> {
        let mut result = alloc::vec::Vec::with_capacity(self.len);

        let mut cursor = self.first_inorder();
        while let Some(handle) = cursor {
            // Step before taking: the step reads this node's right link.
            cursor = self.step_inorder(handle);
            let (key, value_handle) = self.nodes.take(handle).into_parts();
            result.push((key, self.values.take(value_handle)));
        }

        self.clear();
        result
    }
}

impl<K: Ord, V> RawThreadedMap<K, V> {
    /// Searches for a key, returning its node handle if present.
    ///
    /// Standard BST descent; the right direction exists only through a true
    /// child link. Reaching a thread (or the end slot) means the key is not
    /// in the tree.
    pub(crate) fn search<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = self.root;

        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            current = match key.cmp(node.key().borrow()) {
                Ordering::Equal => return Some(handle),
                Ordering::Less => node.left(),
                Ordering::Greater => node.right().child(),
            };
        }

        None
    }

    /// Returns a reference to the value corresponding to the key.
    pub(crate) fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let handle = self.search(key)?;
        Some(self.values.get(self.nodes.get(handle).value()))
    }

    /// Returns the key-value pair corresponding to the key.
    pub(crate) fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let handle = self.search(key)?;
        let node = self.nodes.get(handle);
        Some((node.key(), self.values.get(node.value())))
    }

    /// Returns true if the tree contains the specified key.
    pub(crate) fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.search(key).is_some()
    }

    /// Returns the first (minimum-key) pair in the tree.
    pub(crate) fn first_key_value(&self) -> Option<(&K, &V)> {
        let handle = self.first_inorder()?;
        let node = self.nodes.get(handle);
        Some((node.key(), self.values.get(node.value())))
    }

    /// Returns the last (maximum-key) pair in the tree.
    pub(crate) fn last_key_value(&self) -> Option<(&K, &V)> {
        let mut handle = self.root?;
        while let RightLink::Child(child) = self.nodes.get(handle).right() {
            handle = child;
        }
        let node = self.nodes.get(handle);
        Some((node.key(), self.values.get(node.value())))
    }

    /// Returns the key of the node linked to the right of `key`, through
    /// either a thread or a true child link.
    ///
    /// For a threaded node that is the inorder successor. For a node with a
    /// real right subtree it is the immediate right child's key, which is the
    /// successor only when that child has no left spine.
    pub(crate) fn right_of<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let handle = self.search(key)?;
        match self.nodes.get(handle).right() {
            RightLink::End => None,
            RightLink::Thread(next) | RightLink::Child(next) => Some(self.nodes.get(next).key()),
        }
    }

    /// Inserts a key-value pair into the tree.
    ///
    /// Returns false, without touching the tree or the stored value, if the
    /// key is already present.
    pub(crate) fn insert(&mut self, key: K, value: V) -> bool {
        // Descend as in search, remembering the last node visited and the
        // direction taken out of it.
        let mut parent: Option<(Handle, Ordering)> = None;
        let mut current = self.root;

        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            let ordering = key.cmp(node.key());
            current = match ordering {
                Ordering::Equal => return false,
                Ordering::Less => node.left(),
                Ordering::Greater => node.right().child(),
            };
            parent = Some((handle, ordering));
        }

        let value_handle = self.values.alloc(value);

        match parent {
            None => {
                // Only node in the tree: no successor.
                let handle = self.nodes.alloc(Node::new(key, value_handle, RightLink::End));
                self.root = Some(handle);
            }
            Some((parent, Ordering::Less)) => {
                // Left child: the parent is now the new node's inorder
                // successor.
                let handle = self.nodes.alloc(Node::new(key, value_handle, RightLink::Thread(parent)));
                self.nodes.get_mut(parent).set_left(Some(handle));
            }
            Some((parent, Ordering::Greater)) => {
                // Right child: descent only moves right past a threaded node,
                // so the parent's right slot is a thread (or the end). The new
                // node inherits it - every node that used to reach its
                // successor through the parent's thread now does so through
                // the new node.
                let inherited = self.nodes.get(parent).right();
                debug_assert!(inherited.is_threaded());
                let handle = self.nodes.alloc(Node::new(key, value_handle, inherited));
                self.nodes.get_mut(parent).set_right(RightLink::Child(handle));
            }
            Some((_, Ordering::Equal)) => unreachable!("descent returns on an equal key"),
        }

        self.len += 1;
        debug_assert_eq!(self.nodes.len(), self.len);
        true
    }

    /// Re-inserts every pair of `source` into `self` from a preorder walk.
    ///
    /// Preorder insertion into a fresh BST reproduces the source's shape, and
    /// letting `insert` run again rebuilds every thread from scratch; the
    /// source's links are never copied, so the two trees share nothing.
    fn extend_preorder(&mut self, source: &Self)
    where
        K: Clone,
        V: Clone,
    {
        let mut stack: PreorderStack = SmallVec::new();
        stack.extend(source.root);

        while let Some(handle) = stack.pop() {
            let node = source.nodes.get(handle);
            self.insert(node.key().clone(), source.values.get(node.value()).clone());

            // Right pushed first so the left subtree is visited first. A
            // thread is not a subtree and is not followed.
            if let RightLink::Child(right) = node.right() {
                stack.push(right);
            }
            if let Some(left) = node.left() {
                stack.push(left);
            }
        }
    }
}

impl<K: Clone + Ord, V: Clone> Clone for RawThreadedMap<K, V> {
    fn clone(&self) -> Self {
        let mut tree = Self::with_capacity(self.len);
        tree.extend_preorder(self);
        tree
    }

    fn clone_from(&mut self, source: &Self) {
        self.clear();
        self.extend_preorder(source);
    }
}

impl<K: fmt::Display, V: fmt::Display> RawThreadedMap<K, V> {
    /// Writes the structural listing: one inorder line per node, with the
    /// thread target's key as a third tuple element where one exists.
    pub(crate) fn dump_into<W: fmt::Write>(&self, output: &mut W) -> fmt::Result {
        let mut cursor = self.first_inorder();
        while let Some(handle) = cursor {
            let node = self.nodes.get(handle);
            let key = node.key();
            let value = self.values.get(node.value());
            match node.right() {
                RightLink::Thread(next) => {
                    writeln!(output, "({key},{value},{})", self.nodes.get(next).key())?;
                }
                RightLink::Child(_) | RightLink::End => writeln!(output, "({key},{value})")?,
            }
            cursor = self.step_inorder(handle);
        }
        Ok(())
    }
}
