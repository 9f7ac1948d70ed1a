//! Typed layers atop the untyped `Store` API.

pub mod typed;
pub mod typed_allocator;
