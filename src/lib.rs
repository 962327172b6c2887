//! A threaded binary search tree map for Rust.
//!
//! This crate provides [`ThreadedBstMap`], an ordered key-value container
//! built on a plain (unbalanced) binary search tree whose null right-child
//! links are replaced by *threads*: non-owning references to each node's
//! inorder successor. Threads let the tree hand out its keys in sorted order
//! one O(1)-amortized step at a time, with no recursion, no auxiliary stack,
//! and no parent pointers:
//!
//! - [`iter`](ThreadedBstMap::iter) - borrowing inorder iteration in O(1) space
//! - [`begin`](ThreadedBstMap::begin) / [`next`](ThreadedBstMap::next) - a
//!   resumable single-cursor traversal
//! - [`right_of`](ThreadedBstMap::right_of) - the key linked immediately to
//!   the right of a given key
//!
//! # Example
//!
//! ```
//! use weft_tree::ThreadedBstMap;
//!
//! let mut scores = ThreadedBstMap::new();
//! scores.insert("Alice", 100);
//! scores.insert("Bob", 85);
//! scores.insert("Carol", 92);
//!
//! // Lookups work as in the standard ordered maps.
//! assert_eq!(scores.get(&"Bob"), Some(&85));
//! assert_eq!(scores.len(), 3);
//!
//! // Re-inserting an existing key is a no-op: the stored value stays.
//! assert!(!scores.insert("Bob", 0));
//! assert_eq!(scores.get(&"Bob"), Some(&85));
//!
//! // Iteration follows the threads, yielding keys in sorted order.
//! let names: Vec<_> = scores.keys().copied().collect();
//! assert_eq!(names, ["Alice", "Bob", "Carol"]);
//! ```
//!
//! # Implementation
//!
//! Nodes live in an arena and link to each other through compact indices, so
//! a thread - a reference into the middle of the owned structure - can never
//! dangle or be freed twice. Each node's right slot is a tagged union: an
//! owned right subtree, a thread to the successor, or nothing (the last node
//! in order). The tree does not rebalance and does not support deletion;
//! lookups and insertion are O(log n) on random input and O(n) on sorted
//! input, like any plain BST.

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]

extern crate alloc;

#[cfg(test)]
extern crate std;

mod raw;

pub mod threaded_map;

pub use threaded_map::ThreadedBstMap;
