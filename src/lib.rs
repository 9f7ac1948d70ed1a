//! A doubly-linked list with stable positions, atop the Store API.
//!
//! The list is a ring of nodes threaded through a sentinel, whose links are handles into a `Store` rather than
//! pointers. Every structural operation -- insertion, splicing, merging, sorting, reversing -- is expressed as the
//! relinking of existing nodes, hence never moves nor copies an element, and never invalidates the position of an
//! element which survives the operation.
//!
//! The crate is organized in layers:
//!
//! -   `interface`: the `Store` trait, an untyped handle-based memory API.
//! -   `store`: implementations of `Store`, on the global heap and inline.
//! -   `extension`: typed layers atop `Store`, including the rebindable `TypedAllocator`.
//! -   `cursor`: cursor categories, and the algorithms dispatching on them.
//! -   `collection`: the `List` itself.

#![cfg_attr(not(test), no_std)]
//  Lints
#![deny(missing_docs)]
#![deny(unsafe_op_in_unsafe_fn)]

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod collection;
pub mod cursor;
pub mod extension;
pub mod interface;
pub mod store;

mod polyfill;
