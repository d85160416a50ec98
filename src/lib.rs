//! An adaptive order-maintenance sequence for Rust.
//!
//! This crate provides [`Omt`], a mutable ordered sequence of values with
//! O(log n) positional access, insertion, and deletion, plus a family of
//! comparator-driven searches for keeping the sequence in a caller-defined
//! order. It is intended as a building block for storage-engine leaf
//! structures, where many small ordered collections must be maintained with
//! predictable latency and minimal memory overhead.
//!
//! # Example
//!
//! ```
//! use omtree::Omt;
//!
//! let mut seq = Omt::from_sorted_slice(&[10, 20, 30, 40, 50]);
//! assert_eq!(seq.len(), 5);
//! assert_eq!(seq.get(2), Some(&30));
//!
//! // Comparator-guided insert keeps the order and rejects duplicates.
//! assert_eq!(seq.insert_by(25, |x| x.cmp(&25)), Ok(2));
//! assert!(seq.insert_by(25, |x| x.cmp(&25)).is_err());
//!
//! let values: Vec<i32> = seq.iter().copied().collect();
//! assert_eq!(values, [10, 20, 25, 30, 40, 50]);
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library
//!   dependency
//! - **Adaptive representation** - A freshly built or append-only sequence
//!   stays a packed array; positional churn in the middle switches it to a
//!   weight-balanced tree, and sparse trees fall back to the array
//! - **O(log n) amortized mutation** - Subtree weights guide positional
//!   descent; an out-of-balance subtree is flattened and rebuilt perfectly
//!   balanced
//! - **Comparator searches** - `find_zero`, directional `find`, and
//!   duplicate-rejecting `insert_by` share one monotonicity contract
//!
//! # Implementation
//!
//! The sequence is stored either as a deque of values (packed form) or as a
//! binary tree whose nodes live in an index-addressed pool (tree form).
//! Nodes carry the weight of their subtree, so the i-th element is found by
//! comparing i against left-subtree weights on the way down. Freed node
//! slots are threaded into a free list through the slots themselves, so the
//! allocator is a single `Vec` plus a head index.

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod direction;
mod error;
mod raw;

pub mod omt;

pub use direction::Direction;
pub use error::Error;
pub use omt::Omt;
