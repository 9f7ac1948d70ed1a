//! The nodes of a `List`, and the relinking primitives operating on rings of nodes.
//!
//! A ring is threaded through a sentinel: a bare `Links` block carrying no element, whose `next` is the first node
//! of the ring and whose `prev` is the last. An empty ring is a sentinel linked to itself.
//!
//! For every node `x` of a ring, `x.next.prev == x` and `x.prev.next == x`.

use core::ptr::{self, NonNull};

use crate::interface::Store;

/// The links of a node, or of a sentinel.
#[repr(C)]
pub(crate) struct Links<H> {
    pub(crate) next: H,
    pub(crate) prev: H,
}

/// A node of a `List`, embedding its element.
///
/// Exposed so that stores may be sized after it, see `InlineList`.
#[repr(C)]
pub struct Node<T, H> {
    //  First, so that a handle to a node is also a handle to its links; only ever accessed as such.
    #[allow(dead_code)]
    links: Links<H>,
    element: T,
}

/// A view over the rings of nodes allocated within a store.
pub(crate) struct Ring<'s, S> {
    store: &'s S,
}

impl<'s, S: Store> Ring<'s, S> {
    /// Creates a view over the rings of `store`.
    pub(crate) const fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Links `sentinel` to itself.
    ///
    /// #   Safety
    ///
    /// -   `sentinel` must be a valid handle to a `Links` block of the store.
    pub(crate) unsafe fn init(&self, sentinel: S::Handle) {
        //  Safety:
        //  -   `sentinel` is valid, as per pre-conditions.
        unsafe {
            self.set_next(sentinel, sentinel);
            self.set_prev(sentinel, sentinel);
        }
    }

    /// Returns the successor of `node`.
    ///
    /// #   Safety
    ///
    /// -   `node` must be a valid handle to a linked node, or sentinel.
    pub(crate) unsafe fn next(&self, node: S::Handle) -> S::Handle {
        //  Safety:
        //  -   `node` is valid, and its links initialized, as per pre-conditions.
        unsafe { (*self.links(node)).next }
    }

    /// Returns the predecessor of `node`.
    ///
    /// #   Safety
    ///
    /// -   `node` must be a valid handle to a linked node, or sentinel.
    pub(crate) unsafe fn prev(&self, node: S::Handle) -> S::Handle {
        //  Safety:
        //  -   `node` is valid, and its links initialized, as per pre-conditions.
        unsafe { (*self.links(node)).prev }
    }

    /// Returns a pointer to the element of `node`.
    ///
    /// #   Safety
    ///
    /// -   `node` must be a valid handle to a `Node<T, S::Handle>`, not a sentinel.
    pub(crate) unsafe fn element<T>(&self, node: S::Handle) -> NonNull<T> {
        //  Safety:
        //  -   `node` is valid, as per pre-conditions.
        let node = unsafe { self.store.resolve(node) };
        let node = node.cast::<Node<T, S::Handle>>().as_ptr();

        //  Safety:
        //  -   `node` points to a block fitting a `Node<T, S::Handle>`, as per pre-conditions.
        let element = unsafe { ptr::addr_of_mut!((*node).element) };

        //  Safety:
        //  -   `element` is derived from the non-null `node`.
        unsafe { NonNull::new_unchecked(element) }
    }

    /// Links the unlinked `node` immediately before `position`.
    ///
    /// #   Safety
    ///
    /// -   `position` must be a valid handle to a linked node, or sentinel.
    /// -   `node` must be a valid handle to a node which is not linked in any ring.
    pub(crate) unsafe fn link_before(&self, position: S::Handle, node: S::Handle) {
        //  Safety:
        //  -   `position` and `node` are valid, as per pre-conditions.
        //  -   `prev` is valid, as `position` is linked.
        unsafe {
            let prev = self.prev(position);

            self.set_next(node, position);
            self.set_prev(node, prev);
            self.set_next(prev, node);
            self.set_prev(position, node);
        }
    }

    /// Unlinks `node` from its ring, returning its former successor.
    ///
    /// The links of `node` itself are left as is.
    ///
    /// #   Safety
    ///
    /// -   `node` must be a valid handle to a linked node, not a sentinel.
    pub(crate) unsafe fn unlink(&self, node: S::Handle) -> S::Handle {
        //  Safety:
        //  -   `node` is valid and linked, as per pre-conditions, hence so are its neighbours.
        unsafe {
            let (prev, next) = (self.prev(node), self.next(node));

            self.set_next(prev, next);
            self.set_prev(next, prev);

            next
        }
    }

    /// Moves the nodes `[first, last)` immediately before `position`.
    ///
    /// The range may belong to the ring of `position`, or to another ring of the store. No element is touched, and
    /// nothing is allocated nor deallocated.
    ///
    /// An empty range is a no-op, as is a `position` equal to `first` or `last`, the range being in place already.
    ///
    /// #   Safety
    ///
    /// -   `position`, `first`, and `last` must be valid handles to linked nodes, or sentinels.
    /// -   `last` must be reachable from `first`, without crossing a sentinel other than `last` itself.
    /// -   `position` must not be within `(first, last)`.
    pub(crate) unsafe fn transfer(&self, position: S::Handle, first: S::Handle, last: S::Handle) {
        if first == last || position == first || position == last {
            return;
        }

        #[cfg(debug_assertions)]
        {
            let mut node = first;

            while node != last {
                debug_assert!(node != position, "cannot transfer a range within itself");

                //  Safety:
                //  -   `node` is within `[first, last)`, hence valid and linked, as per pre-conditions.
                node = unsafe { self.next(node) };
            }
        }

        //  Safety:
        //  -   `position`, `first`, and `last` are valid and linked, as per pre-conditions.
        //  -   Their predecessors are valid and linked, as a consequence.
        unsafe {
            let before_last = self.prev(last);
            let before_first = self.prev(first);
            let before_position = self.prev(position);

            self.set_next(before_last, position);
            self.set_next(before_first, last);
            self.set_next(before_position, first);

            self.set_prev(position, before_last);
            self.set_prev(last, before_first);
            self.set_prev(first, before_position);
        }
    }

    /// Merges the sorted ring of `from` into the sorted ring of `into`, leaving the former empty.
    ///
    /// A node of `from` is moved before a node of `into` only if `is_less(from, into)`, hence on ties the nodes of
    /// `into` come first. `moved` is incremented after each node moved, so that on unwinding out of `is_less` it
    /// counts the nodes moved so far; the final batch is not counted.
    ///
    /// #   Safety
    ///
    /// -   `into` and `from` must be valid sentinels of distinct rings.
    /// -   All nodes of both rings must be valid handles to `Node<T, S::Handle>`.
    pub(crate) unsafe fn merge<T, F>(&self, into: S::Handle, from: S::Handle, is_less: &mut F, moved: &mut usize)
    where
        F: FnMut(&T, &T) -> bool,
    {
        //  Safety:
        //  -   `into` and `from` are valid sentinels, as per pre-conditions.
        let (mut first1, mut first2) = unsafe { (self.next(into), self.next(from)) };

        while first1 != into && first2 != from {
            //  Safety:
            //  -   `first1` and `first2` are data nodes of their rings, as per pre-conditions.
            //  -   The references are only used for the duration of the comparison, during which no link is touched.
            let less = unsafe {
                let (left, right) = (self.element::<T>(first2), self.element::<T>(first1));

                is_less(left.as_ref(), right.as_ref())
            };

            if less {
                //  Safety:
                //  -   `first2` is a data node of `from`, hence its successor is valid.
                //  -   `first1` does not belong to the ring of `from`.
                unsafe {
                    let next = self.next(first2);

                    self.transfer(first1, first2, next);

                    first2 = next;
                }

                *moved += 1;
            } else {
                //  Safety:
                //  -   `first1` is a data node of `into`.
                first1 = unsafe { self.next(first1) };
            }
        }

        if first2 != from {
            //  Safety:
            //  -   `[first2, from)` is the tail of the ring of `from`, and `into` does not belong to it.
            unsafe { self.transfer(into, first2, from) };
        }
    }

    /// Merges, in place, the sorted adjacent runs `[first, middle)` and `[middle, last)`, returning the first node of
    /// the merged run.
    ///
    /// A node of the second run is moved before a node of the first only if `is_less(second, first)`, hence on ties
    /// the nodes of the first run come first. `last` is never moved.
    ///
    /// Each node is moved by a single `transfer`, so that the ring remains well-formed should `is_less` panic.
    ///
    /// #   Safety
    ///
    /// -   `[first, middle)` and `[middle, last)` must be non-empty ranges of valid handles to `Node<T, S::Handle>`,
    ///     within a single ring.
    /// -   `last` must be a valid handle to a linked node, or sentinel.
    pub(crate) unsafe fn merge_runs<T, F>(
        &self,
        first: S::Handle,
        middle: S::Handle,
        last: S::Handle,
        is_less: &mut F,
    ) -> S::Handle
    where
        F: FnMut(&T, &T) -> bool,
    {
        let (mut head, mut first1, mut first2) = (first, first, middle);

        while first1 != first2 && first2 != last {
            //  Safety:
            //  -   `first1` and `first2` are data nodes of the runs, as per pre-conditions.
            //  -   The references are only used for the duration of the comparison, during which no link is touched.
            let less = unsafe {
                let (left, right) = (self.element::<T>(first2), self.element::<T>(first1));

                is_less(left.as_ref(), right.as_ref())
            };

            if less {
                //  Safety:
                //  -   `first2` is a data node of the second run, hence its successor is valid.
                //  -   `first1` precedes `first2`, hence is not within `[first2, next)`.
                unsafe {
                    let next = self.next(first2);

                    self.transfer(first1, first2, next);

                    if first1 == head {
                        head = first2;
                    }

                    first2 = next;
                }
            } else {
                //  Safety:
                //  -   `first1` is a data node of the first run.
                first1 = unsafe { self.next(first1) };
            }
        }

        head
    }
}

impl<S> Clone for Ring<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for Ring<'_, S> {}

//
//  Implementation
//

impl<S: Store> Ring<'_, S> {
    //  #   Safety
    //
    //  -   `node` must be a valid handle to a block fitting `Links`.
    #[inline(always)]
    unsafe fn links(&self, node: S::Handle) -> *mut Links<S::Handle> {
        //  Safety:
        //  -   `node` is valid, as per pre-conditions.
        let pointer = unsafe { self.store.resolve(node) };

        pointer.cast().as_ptr()
    }

    //  #   Safety
    //
    //  -   `node` must be a valid handle to a block fitting `Links`.
    #[inline(always)]
    unsafe fn set_next(&self, node: S::Handle, next: S::Handle) {
        //  Safety:
        //  -   `node` is valid, as per pre-conditions.
        unsafe { (*self.links(node)).next = next };
    }

    //  #   Safety
    //
    //  -   `node` must be a valid handle to a block fitting `Links`.
    #[inline(always)]
    unsafe fn set_prev(&self, node: S::Handle, prev: S::Handle) {
        //  Safety:
        //  -   `node` is valid, as per pre-conditions.
        unsafe { (*self.links(node)).prev = prev };
    }
}

// mod tests
