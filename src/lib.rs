#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

/// A hash table using separate chaining.
///
/// This module provides `ChainedTable`, which resolves collisions by keeping
/// an owned singly linked chain of entries per bucket. The bucket count is
/// fixed at construction and the table never resizes.
pub mod chained;

pub mod hash;

/// A hash table using open addressing with linear probing.
///
/// This module provides `ProbedTable`, which resolves collisions by probing
/// forward through a flat slot array and marks deletions with tombstones. The
/// table grows and shrinks itself to keep its load factor in range.
pub mod probed;

/// A last-in-first-out stack over an owned singly linked list.
pub mod stack;

/// An ordered map over an unbalanced binary search tree.
pub mod tree;

pub use chained::ChainedTable;
pub use probed::ProbedTable;
pub use stack::Stack;
pub use tree::TreeMap;
