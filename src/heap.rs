/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/*!

A size-balanced binary min-heap.

Every node holds a value no greater than the values of its children, so the
root is the minimum. [`push`](PriorityQueue::push) sinks the new value down
the tree, swapping it with any larger value met on the way and always
descending into the smaller subtree, which keeps the tree balanced without
storing it in an array. [`pop`](PriorityQueue::pop) removes the root value
by cascading it down through the smaller-valued child at each level and
deleting the leaf it reaches.

`push` and `pop` are O(log n); [`peek`](PriorityQueue::peek),
[`len`](PriorityQueue::len) and [`is_empty`](PriorityQueue::is_empty) are
O(1). The observable pop order matches a standard binary heap under the
same ordering.

*/

use core::mem;

#[derive(Debug)]
struct Node<T> {
    value: T,
    /// Number of proper descendants.
    below: usize,
    left: Option<Box<Node<T>>>,
    right: Option<Box<Node<T>>>,
}

impl<T> Node<T> {
    fn new(value: T) -> Self {
        Self {
            value,
            below: 0,
            left: None,
            right: None,
        }
    }

    #[inline(always)]
    fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

/// A min-heap over values of type `T`. See the [module documentation](self).
#[derive(Debug)]
pub struct PriorityQueue<T> {
    root: Option<Box<Node<T>>>,
    len: usize,
}

impl<T> Default for PriorityQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PriorityQueue<T> {
    pub fn new() -> Self {
        Self { root: None, len: 0 }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The smallest value, if any.
    #[inline(always)]
    pub fn peek(&self) -> Option<&T> {
        self.root.as_ref().map(|node| &node.value)
    }
}

impl<T: Ord> PriorityQueue<T> {
    pub fn push(&mut self, value: T) {
        Self::sink(&mut self.root, value);
        self.len += 1;
    }

    fn sink(slot: &mut Option<Box<Node<T>>>, mut value: T) {
        match slot {
            None => *slot = Some(Box::new(Node::new(value))),
            Some(node) => {
                node.below += 1;
                if value < node.value {
                    mem::swap(&mut value, &mut node.value);
                }

                let child = if node.left.is_none() {
                    &mut node.left
                } else if node.right.is_none() {
                    &mut node.right
                } else if node.left.as_ref().unwrap().below < node.right.as_ref().unwrap().below {
                    &mut node.left
                } else {
                    &mut node.right
                };

                Self::sink(child, value);
            }
        }
    }

    /// Remove and return the smallest value.
    pub fn pop(&mut self) -> Option<T> {
        if self.root.is_none() {
            return None;
        }
        self.len -= 1;
        Some(Self::extract(&mut self.root))
    }

    /// Remove the root value: cascade it down through the smaller-valued
    /// child at each level and detach the leaf it reaches.
    fn extract(slot: &mut Option<Box<Node<T>>>) -> T {
        if slot.as_ref().unwrap().is_leaf() {
            return slot.take().unwrap().value;
        }

        let node = slot.as_mut().unwrap();
        node.below -= 1;

        let go_right = match (&node.left, &node.right) {
            (Some(_), None) => false,
            (None, Some(_)) => true,
            (Some(left), Some(right)) => right.value < left.value,
            (None, None) => unreachable!(),
        };

        if go_right {
            mem::swap(&mut node.value, &mut node.right.as_mut().unwrap().value);
            Self::extract(&mut node.right)
        } else {
            mem::swap(&mut node.value, &mut node.left.as_mut().unwrap().value);
            Self::extract(&mut node.left)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::{RngExt, SeedableRng};
    use std::cmp::Reverse;
    use std::collections::BinaryHeap;

    #[test]
    fn test_push_pop_phases() {
        let mut rng = SmallRng::seed_from_u64(0);
        let mut reference = BinaryHeap::new();
        let mut queue = PriorityQueue::new();

        for max_value in [10_u64, 1000, 1_000_000] {
            const N: usize = 100_000;

            for _ in 0..N {
                assert_eq!(queue.len(), reference.len());
                assert_eq!(queue.is_empty(), reference.is_empty());

                let value = rng.random_range(0..max_value);
                reference.push(Reverse(value));
                queue.push(value);

                assert_eq!(*queue.peek().unwrap(), reference.peek().unwrap().0);
            }

            for _ in 0..N {
                assert_eq!(queue.len(), reference.len());
                assert_eq!(*queue.peek().unwrap(), reference.peek().unwrap().0);
                assert_eq!(queue.pop().unwrap(), reference.pop().unwrap().0);
            }

            assert!(queue.is_empty());
            assert!(reference.is_empty());
        }
    }

    #[test]
    fn test_mixed_workload() {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut reference = BinaryHeap::new();
        let mut queue = PriorityQueue::new();

        for _ in 0..1_000_000 {
            if reference.is_empty() || rng.random_range(0..3) != 0 {
                let value = rng.random_range(0..1000_u32);
                reference.push(Reverse(value));
                queue.push(value);
            } else {
                assert_eq!(queue.pop().unwrap(), reference.pop().unwrap().0);
            }
            assert_eq!(queue.len(), reference.len());
            assert_eq!(queue.peek(), reference.peek().map(|value| &value.0));
        }

        while let Some(Reverse(expected)) = reference.pop() {
            assert_eq!(queue.pop(), Some(expected));
        }
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn test_pop_empty() {
        let mut queue = PriorityQueue::<u32>::new();
        assert!(queue.peek().is_none());
        assert!(queue.pop().is_none());

        queue.push(3);
        assert_eq!(queue.pop(), Some(3));
        assert!(queue.pop().is_none());
    }
}
