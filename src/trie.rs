/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/*!

An ownership-exclusive binary trie holding values at its leaves.

The trie is used in two modes. During code construction it starts as a
single leaf and grows by [merging](BinaryTrie::merge) with other tries: the
merged tree gets a fresh unvalued root whose left subtree is `self` and
whose right subtree is the argument. During decoding it starts
[empty](BinaryTrie::default) and leaves are [inserted](BinaryTrie::insert)
at explicit bit paths.

[Iteration](BinaryTrie::leaves) yields the leaves in left-to-right order
together with the [`BinaryPath`] leading to each of them; for a trie built
by merges this is the order in which the leaves were created. A
[`Traverser`] walks the trie edge by edge without consuming it, which is
how the decoder resolves one code at a time.

Nodes live in an arena: a growable vector with child and parent links
stored as `u32` indices, and a sentinel marking absent links. The parent
links let the leaf iterator climb without an auxiliary stack.

*/

use core::cmp::Ordering;

/// Index value marking an absent node link.
const NIL: u32 = !0;

/// A path from the root of a trie to one of its nodes.
///
/// Bit `i` of `code` is the direction of the `i`-th edge taken from the
/// root: 0 goes left, 1 goes right. Bits at positions `len` and above are
/// always zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BinaryPath {
    pub code: u64,
    pub len: usize,
}

impl BinaryPath {
    pub fn new(code: u64, len: usize) -> Self {
        debug_assert!(len == 64 || code >> len == 0, "path has bits beyond its length");
        Self { code, len }
    }

    /// The direction of the `i`-th edge from the root.
    #[inline(always)]
    pub fn bit(&self, i: usize) -> bool {
        debug_assert!(i < self.len);
        (self.code >> i) & 1 == 1
    }
}

/// Lexicographic order on the bit sequences, a strict prefix coming before
/// any path that extends it.
impl Ord for BinaryPath {
    fn cmp(&self, other: &Self) -> Ordering {
        for i in 0..self.len.min(other.len) {
            let order = self.bit(i).cmp(&other.bit(i));
            if order != Ordering::Equal {
                return order;
            }
        }
        self.len.cmp(&other.len)
    }
}

impl PartialOrd for BinaryPath {
    #[inline(always)]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug)]
struct Node<V> {
    value: Option<V>,
    left: u32,
    right: u32,
    parent: u32,
}

impl<V> Node<V> {
    fn new(value: Option<V>, parent: u32) -> Self {
        Self {
            value,
            left: NIL,
            right: NIL,
            parent,
        }
    }
}

/// A binary trie over values of type `V`. See the [module documentation](self).
#[derive(Debug)]
pub struct BinaryTrie<V> {
    nodes: Vec<Node<V>>,
    root: u32,
    /// The leftmost leaf, where iteration starts. `NIL` while the trie has
    /// no valued node.
    begin: u32,
    begin_path: BinaryPath,
}

impl<V> Default for BinaryTrie<V> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            root: NIL,
            begin: NIL,
            begin_path: BinaryPath::default(),
        }
    }
}

impl<V> BinaryTrie<V> {
    /// Create a trie consisting of a single leaf holding `value`.
    pub fn new(value: V) -> Self {
        Self {
            nodes: vec![Node::new(Some(value), NIL)],
            root: 0,
            begin: 0,
            begin_path: BinaryPath::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.root == NIL
    }

    fn node(&self, index: u32) -> &Node<V> {
        &self.nodes[index as usize]
    }

    fn node_mut(&mut self, index: u32) -> &mut Node<V> {
        &mut self.nodes[index as usize]
    }

    fn alloc(&mut self, value: Option<V>, parent: u32) -> u32 {
        let index = self.nodes.len() as u32;
        self.nodes.push(Node::new(value, parent));
        index
    }

    /// Merge `other` into `self`.
    ///
    /// If `other` is empty this is a no-op; if `self` is empty it becomes
    /// `other`. Otherwise a fresh unvalued root is created with the old
    /// `self` as its left subtree and `other` as its right subtree, and
    /// iteration still starts at the leftmost leaf.
    pub fn merge(&mut self, other: BinaryTrie<V>) {
        if other.root == NIL {
            return;
        }

        if self.root == NIL {
            *self = other;
            return;
        }

        // Graft other's arena behind ours, shifting its links.
        let offset = self.nodes.len() as u32;
        for mut node in other.nodes {
            if node.left != NIL {
                node.left += offset;
            }
            if node.right != NIL {
                node.right += offset;
            }
            if node.parent != NIL {
                node.parent += offset;
            }
            self.nodes.push(node);
        }

        let left = self.root;
        let right = other.root + offset;
        let new_root = self.alloc(None, NIL);
        self.node_mut(new_root).left = left;
        self.node_mut(new_root).right = right;
        self.node_mut(left).parent = new_root;
        self.node_mut(right).parent = new_root;
        self.root = new_root;

        // The old leftmost leaf is now one left edge deeper.
        self.begin_path = BinaryPath::new(self.begin_path.code << 1, self.begin_path.len + 1);
    }

    /// Insert a leaf holding `value` at `path`, creating the intermediate
    /// nodes as needed. Inserting at an existing path overwrites its value.
    ///
    /// The path must not pass through or end on an already valued node;
    /// well-formed canonical headers never produce such paths.
    pub fn insert(&mut self, value: V, path: BinaryPath) {
        debug_assert!(path.len > 0, "cannot insert a leaf at the root");

        if self.root == NIL {
            self.root = self.alloc(None, NIL);
        }

        let mut current = self.root;

        for i in 0..path.len {
            debug_assert!(
                self.node(current).value.is_none(),
                "path passes through a valued node"
            );

            let right = path.bit(i);
            let next = if right {
                self.node(current).right
            } else {
                self.node(current).left
            };

            current = if next == NIL {
                let node = self.alloc(None, current);
                if right {
                    self.node_mut(current).right = node;
                } else {
                    self.node_mut(current).left = node;
                }
                node
            } else {
                next
            };
        }

        debug_assert!(
            self.node(current).left == NIL && self.node(current).right == NIL,
            "path ends on an internal node"
        );
        self.node_mut(current).value = Some(value);

        if self.begin == NIL || path < self.begin_path {
            self.begin = current;
            self.begin_path = path;
        }
    }

    /// Iterate over the leaves in left-to-right order, yielding each leaf's
    /// path and a reference to its value.
    pub fn leaves(&self) -> Leaves<'_, V> {
        Leaves {
            trie: self,
            node: self.begin,
            path: self.begin_path,
        }
    }

    /// A cursor positioned on the root, ready to descend one edge at a time.
    pub fn traverser(&self) -> Traverser<'_, V> {
        Traverser {
            trie: self,
            node: self.root,
            path: BinaryPath::default(),
        }
    }
}

/// Iterator over the leaves of a [`BinaryTrie`] in left-to-right order.
pub struct Leaves<'a, V> {
    trie: &'a BinaryTrie<V>,
    node: u32,
    path: BinaryPath,
}

impl<'a, V> Iterator for Leaves<'a, V> {
    type Item = (BinaryPath, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.node == NIL {
            return None;
        }

        let value = self
            .trie
            .node(self.node)
            .value
            .as_ref()
            .expect("iteration cursor is always on a valued node");
        let path = self.path;
        self.advance();
        Some((path, value))
    }
}

impl<V> Leaves<'_, V> {
    /// Move the cursor to the next leaf in left-to-right order: climb
    /// through parent links until an unvisited right subtree appears, then
    /// descend to its leftmost leaf. No auxiliary stack is needed, the
    /// bit popped off the path tells which child the cursor came from.
    fn advance(&mut self) {
        loop {
            let parent = self.trie.node(self.node).parent;

            if parent == NIL {
                // Came back up from the rightmost leaf.
                self.node = NIL;
                return;
            }

            self.path.len -= 1;
            let came_from_right = (self.path.code >> self.path.len) & 1 == 1;
            self.path.code &= !(1 << self.path.len);
            self.node = parent;

            if !came_from_right && self.trie.node(parent).right != NIL {
                self.node = self.trie.node(parent).right;
                self.path.code |= 1 << self.path.len;
                self.path.len += 1;
                break;
            }
        }

        // Descend to the leftmost leaf of the subtree just entered.
        loop {
            let node = self.trie.node(self.node);

            if node.value.is_some() {
                return;
            }

            if node.left != NIL {
                self.node = node.left;
                self.path.len += 1;
            } else {
                debug_assert!(node.right != NIL, "internal node with no children");
                self.node = node.right;
                self.path.code |= 1 << self.path.len;
                self.path.len += 1;
            }
        }
    }
}

/// A single-position cursor walking a [`BinaryTrie`] edge by edge.
pub struct Traverser<'a, V> {
    trie: &'a BinaryTrie<V>,
    node: u32,
    path: BinaryPath,
}

impl<'a, V> Traverser<'a, V> {
    /// The path from the root to the current node.
    #[inline(always)]
    pub fn path(&self) -> BinaryPath {
        self.path
    }

    /// The value at the current node, if it is a leaf.
    #[inline(always)]
    pub fn value(&self) -> Option<&'a V> {
        if self.node == NIL {
            return None;
        }
        self.trie.node(self.node).value.as_ref()
    }

    #[inline(always)]
    pub fn can_go_left(&self) -> bool {
        self.node != NIL && self.trie.node(self.node).left != NIL
    }

    #[inline(always)]
    pub fn can_go_right(&self) -> bool {
        self.node != NIL && self.trie.node(self.node).right != NIL
    }

    pub fn go_left(&mut self) {
        debug_assert!(self.can_go_left());
        self.node = self.trie.node(self.node).left;
        self.path.len += 1;
    }

    pub fn go_right(&mut self) {
        debug_assert!(self.can_go_right());
        self.node = self.trie.node(self.node).right;
        self.path.code |= 1 << self.path.len;
        self.path.len += 1;
    }
}
