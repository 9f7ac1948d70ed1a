//! Collections implemented in terms of `Store`.
//!
//! For now, a single one: the doubly-linked `List`, whose every algorithm relinks nodes rather than moving elements.

mod linked_list;
mod node;

#[cfg(all(test, feature = "alloc"))]
mod utils;

pub use linked_list::{Cursor, InlineList, IntoIter, Iter, IterMut, List, Position};
pub use node::Node as ListNode;
