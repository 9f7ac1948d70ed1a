//! A doubly-linked list, with stable positions.
//!
//! The nodes of the list form a ring threaded through a sentinel, the sentinel standing for the past-the-end position.
//! All structural operations relink nodes, and never move an element: the position of an element remains valid
//! until the element itself is erased, even as its node is spliced, merged, or sorted into another place, or another
//! list.
//!
//! #   Positions
//!
//! A `Position` is a detached handle to a node, which does not borrow the list. A position is _of_ a list if it is
//! the `end()` of the list, or if its node is currently linked in the list. Operations taking positions are `unsafe`,
//! and require the positions to be of the list; detectable misuses, such as erasing the end, panic.
//!
//! A `Cursor` is a position borrowing its list, and may be used safely.

use core::{
    alloc::Layout,
    cmp, fmt, hash,
    iter::{self, FusedIterator},
    marker::PhantomData,
    mem,
    ptr::{self, NonNull},
};

use crate::{
    collection::node::{Links, Node, Ring},
    cursor::{self, BidirectionalCursor, BidirectionalTag, ForwardCursor, InputCursor, Reverse},
    extension::{
        typed::TypedHandle,
        typed_allocator::{Rebind, TypedAllocator},
    },
    interface::{AllocError, Store, StoreSharing},
    polyfill,
    store::InlineSlabStore,
};

/// A doubly-linked list.
pub struct List<T, S: Store> {
    //  Invariant: number of nodes in the ring of `sentinel`.
    length: usize,
    //  Invariant: allocated by `store`, valid for the lifetime of the list, linked to itself when the list is empty.
    sentinel: S::Handle,
    store: S,
    _marker: PhantomData<T>,
}

/// A list whose nodes, and sentinel, live inline in `N` slots.
pub type InlineList<T, const N: usize> = List<T, InlineSlabStore<u16, Node<T, u16>, N>>;

/// The position of an element of a list, or of its end.
pub struct Position<T, H> {
    node: H,
    _marker: PhantomData<fn() -> T>,
}

impl<T, S: Store> List<T, S> {
    /// Creates a new, empty, list.
    pub fn new() -> Self
    where
        S: Default,
    {
        Self::new_in(S::default())
    }

    /// Creates a new, empty, list with the specified `store`.
    ///
    /// Aborts if the sentinel cannot be allocated.
    pub fn new_in(store: S) -> Self {
        Self::try_new_in(store).unwrap_or_else(|_| polyfill::handle_alloc_error(Layout::new::<Links<S::Handle>>()))
    }

    /// Attempts to create a new, empty, list with the specified `store`.
    ///
    /// #   Errors
    ///
    /// Returns an error if the sentinel cannot be allocated.
    pub fn try_new_in(store: S) -> Result<Self, AllocError> {
        let sentinel = TypedAllocator::<Links<S::Handle>, S>::new(&store).allocate(1)?.to_raw();

        //  Safety:
        //  -   `sentinel` was just allocated by `store`, for a `Links`.
        unsafe { Ring::new(&store).init(sentinel) };

        Ok(Self {
            length: 0,
            sentinel,
            store,
            _marker: PhantomData,
        })
    }

    /// Creates a list of `n` clones of `value`.
    pub fn filled(n: usize, value: T) -> Self
    where
        T: Clone,
        S: Default,
    {
        Self::unwrap_alloc(Self::try_filled_in(n, value, S::default()))
    }

    /// Attempts to create a list of `n` clones of `value`, with the specified `store`.
    ///
    /// #   Errors
    ///
    /// Returns an error if the store cannot provide the sentinel and `n` nodes.
    pub fn try_filled_in(n: usize, value: T, store: S) -> Result<Self, AllocError>
    where
        T: Clone,
    {
        let mut result = Self::try_new_in(store)?;

        //  Safety:
        //  -   `result.end()` is a position of `result`.
        unsafe { result.try_insert_n(result.end(), n, &value)? };

        Ok(result)
    }

    /// Creates a list of clones of the elements of `[first, last)`.
    pub fn from_range<'c, C>(first: C, last: C) -> Self
    where
        C: InputCursor<Item = &'c T>,
        T: 'c + Clone,
        S: Default,
    {
        Self::unwrap_alloc(Self::try_from_range_in(first, last, S::default()))
    }

    /// Attempts to create a list of clones of the elements of `[first, last)`, with the specified `store`.
    ///
    /// #   Errors
    ///
    /// Returns an error if the store cannot provide the sentinel and the nodes.
    pub fn try_from_range_in<'c, C>(first: C, last: C, store: S) -> Result<Self, AllocError>
    where
        C: InputCursor<Item = &'c T>,
        T: 'c + Clone,
    {
        let mut result = Self::try_new_in(store)?;

        //  Safety:
        //  -   `result.end()` is a position of `result`.
        unsafe { result.try_insert_iter(result.end(), cloned_range(first, last))? };

        Ok(result)
    }

    /// Returns whether the list is empty, or not.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns the number of elements in the list.
    pub fn len(&self) -> usize {
        self.length
    }

    /// Returns the maximum number of elements the store could ever hold.
    pub fn max_size(&self) -> usize {
        self.allocator().rebind::<Node<T, S::Handle>>().max_size()
    }

    /// Returns the allocator of elements.
    pub fn allocator(&self) -> TypedAllocator<'_, T, S> {
        TypedAllocator::new(&self.store)
    }

    /// Returns the store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the position of the first element, or `end()` if the list is empty.
    pub fn begin(&self) -> Position<T, S::Handle> {
        //  Safety:
        //  -   `self.sentinel` is valid, as per invariant.
        Position::new(unsafe { self.ring().next(self.sentinel) })
    }

    /// Returns the past-the-end position.
    pub fn end(&self) -> Position<T, S::Handle> {
        Position::new(self.sentinel)
    }

    /// Returns a reference to the front element, if any.
    pub fn front(&self) -> Option<&T> {
        if self.is_empty() {
            return None;
        }

        //  Safety:
        //  -   `self.begin()` is a data node, since the list is not empty.
        //  -   Access to the element is shared, as guaranteed by `self` being borrowed immutably.
        Some(unsafe { self.element(self.begin().node).as_ref() })
    }

    /// Returns a reference to the back element, if any.
    pub fn back(&self) -> Option<&T> {
        if self.is_empty() {
            return None;
        }

        //  Safety:
        //  -   The predecessor of the sentinel is a data node, since the list is not empty.
        //  -   Access to the element is shared, as guaranteed by `self` being borrowed immutably.
        Some(unsafe { self.element(self.ring().prev(self.sentinel)).as_ref() })
    }

    /// Returns a mutable reference to the front element, if any.
    pub fn front_mut(&mut self) -> Option<&mut T> {
        if self.is_empty() {
            return None;
        }

        //  Safety:
        //  -   `self.begin()` is a data node, since the list is not empty.
        //  -   Access to the element is exclusive, as guaranteed by `self` being borrowed mutably.
        Some(unsafe { self.element(self.begin().node).as_mut() })
    }

    /// Returns a mutable reference to the back element, if any.
    pub fn back_mut(&mut self) -> Option<&mut T> {
        if self.is_empty() {
            return None;
        }

        //  Safety:
        //  -   The predecessor of the sentinel is a data node, since the list is not empty.
        //  -   Access to the element is exclusive, as guaranteed by `self` being borrowed mutably.
        Some(unsafe { self.element(self.ring().prev(self.sentinel)).as_mut() })
    }

    /// Pops the element at the front of the list, if any.
    pub fn pop_front(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }

        let node = self.begin().node;

        //  Safety:
        //  -   `node` is a data node of `self`, since the list is not empty.
        unsafe { self.ring().unlink(node) };

        self.length -= 1;

        //  Safety:
        //  -   `node` is an unlinked data node, no longer used.
        Some(unsafe { self.take_node(node) })
    }

    /// Pops the element at the back of the list, if any.
    pub fn pop_back(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }

        //  Safety:
        //  -   `self.sentinel` is valid, as per invariant.
        let node = unsafe { self.ring().prev(self.sentinel) };

        //  Safety:
        //  -   `node` is a data node of `self`, since the list is not empty.
        unsafe { self.ring().unlink(node) };

        self.length -= 1;

        //  Safety:
        //  -   `node` is an unlinked data node, no longer used.
        Some(unsafe { self.take_node(node) })
    }

    /// Clears the list, removing every element.
    ///
    /// The resulting list is empty.
    pub fn clear(&mut self) {
        let length = mem::replace(&mut self.length, 0);

        //  Safety:
        //  -   `self.sentinel` is valid, as per invariant.
        let mut node = unsafe { self.ring().next(self.sentinel) };

        //  The ring is detached first, so that the list remains valid should the destruction of an element panic.
        //
        //  Safety:
        //  -   `self.sentinel` is valid, as per invariant.
        unsafe { self.ring().init(self.sentinel) };

        for _ in 0..length {
            //  Safety:
            //  -   `node` is one of the `length` data nodes formerly linked, whose links are untouched.
            //  -   `node` is no longer reachable from `self`.
            unsafe {
                let next = self.ring().next(node);

                self.destroy_node(node);

                node = next;
            }
        }
    }

    /// Returns an iterator of references to the elements.
    pub fn iter(&self) -> Iter<'_, T, S> {
        //  Safety:
        //  -   `self.sentinel` is valid, as per invariant.
        let (head, tail) = unsafe { (self.ring().next(self.sentinel), self.ring().prev(self.sentinel)) };

        Iter {
            length: self.length,
            head,
            tail,
            store: &self.store,
            _marker: PhantomData,
        }
    }

    /// Returns an iterator of mutable references to the elements.
    pub fn iter_mut(&mut self) -> IterMut<'_, T, S> {
        //  Safety:
        //  -   `self.sentinel` is valid, as per invariant.
        let (head, tail) = unsafe { (self.ring().next(self.sentinel), self.ring().prev(self.sentinel)) };

        IterMut {
            length: self.length,
            head,
            tail,
            store: &self.store,
            _marker: PhantomData,
        }
    }

    /// Returns a cursor to the first element, or to the end if the list is empty.
    pub fn cursor_front(&self) -> Cursor<'_, T, S> {
        Cursor::new(self.begin().node, self)
    }

    /// Returns a cursor to the end.
    pub fn cursor_end(&self) -> Cursor<'_, T, S> {
        Cursor::new(self.sentinel, self)
    }

    /// Returns the range of reverse cursors, from the last element to past the first.
    pub fn reverse_cursors(&self) -> (Reverse<Cursor<'_, T, S>>, Reverse<Cursor<'_, T, S>>) {
        (Reverse::new(self.cursor_end()), Reverse::new(self.cursor_front()))
    }

    /// Returns a cursor to `position`.
    ///
    /// #   Safety
    ///
    /// -   `position` must be a position of `self`.
    pub unsafe fn cursor_at(&self, position: Position<T, S::Handle>) -> Cursor<'_, T, S> {
        Cursor::new(position.node, self)
    }

    /// Returns a reference to the element at `position`.
    ///
    /// #   Safety
    ///
    /// -   `position` must be a position of `self`.
    ///
    /// #   Panics
    ///
    /// Panics if `position` is `self.end()`.
    pub unsafe fn get(&self, position: Position<T, S::Handle>) -> &T {
        assert!(position.node != self.sentinel, "cannot dereference the end position");

        //  Safety:
        //  -   `position` is a data node of `self`, as per pre-conditions and the above check.
        //  -   Access to the element is shared, as guaranteed by `self` being borrowed immutably.
        unsafe { self.element(position.node).as_ref() }
    }

    /// Returns a mutable reference to the element at `position`.
    ///
    /// #   Safety
    ///
    /// -   `position` must be a position of `self`.
    ///
    /// #   Panics
    ///
    /// Panics if `position` is `self.end()`.
    pub unsafe fn get_mut(&mut self, position: Position<T, S::Handle>) -> &mut T {
        assert!(position.node != self.sentinel, "cannot dereference the end position");

        //  Safety:
        //  -   `position` is a data node of `self`, as per pre-conditions and the above check.
        //  -   Access to the element is exclusive, as guaranteed by `self` being borrowed mutably.
        unsafe { self.element(position.node).as_mut() }
    }

    /// Returns the position following `position`, wrapping from the end to the first element.
    ///
    /// #   Safety
    ///
    /// -   `position` must be a position of `self`.
    pub unsafe fn next(&self, position: Position<T, S::Handle>) -> Position<T, S::Handle> {
        //  Safety:
        //  -   `position` is linked in `self`, as per pre-conditions.
        Position::new(unsafe { self.ring().next(position.node) })
    }

    /// Returns the position preceding `position`, wrapping from the first element to the end.
    ///
    /// #   Safety
    ///
    /// -   `position` must be a position of `self`.
    pub unsafe fn prev(&self, position: Position<T, S::Handle>) -> Position<T, S::Handle> {
        //  Safety:
        //  -   `position` is linked in `self`, as per pre-conditions.
        Position::new(unsafe { self.ring().prev(position.node) })
    }

    /// Pushes an element to the front of the list, unless memory allocation fails.
    ///
    /// #   Errors
    ///
    /// Returns an error, dropping `value`, if the node cannot be allocated.
    pub fn try_push_front(&mut self, value: T) -> Result<(), AllocError> {
        //  Safety:
        //  -   `self.begin()` is a position of `self`.
        unsafe { self.try_insert(self.begin(), value) }.map(|_| ())
    }

    /// Pushes an element to the back of the list, unless memory allocation fails.
    ///
    /// #   Errors
    ///
    /// Returns an error, dropping `value`, if the node cannot be allocated.
    pub fn try_push_back(&mut self, value: T) -> Result<(), AllocError> {
        //  Safety:
        //  -   `self.end()` is a position of `self`.
        unsafe { self.try_insert(self.end(), value) }.map(|_| ())
    }

    /// Pushes an element to the front of the list, aborting if memory allocation fails.
    pub fn push_front(&mut self, value: T) {
        Self::unwrap_alloc(self.try_push_front(value));
    }

    /// Pushes an element to the back of the list, aborting if memory allocation fails.
    pub fn push_back(&mut self, value: T) {
        Self::unwrap_alloc(self.try_push_back(value));
    }

    /// Inserts `value` before `position`, returning the position of the inserted element.
    ///
    /// #   Errors
    ///
    /// Returns an error, dropping `value`, if the node cannot be allocated.
    ///
    /// #   Safety
    ///
    /// -   `position` must be a position of `self`.
    pub unsafe fn try_insert(
        &mut self,
        position: Position<T, S::Handle>,
        value: T,
    ) -> Result<Position<T, S::Handle>, AllocError> {
        let node = self.construct_node(value)?;

        //  Safety:
        //  -   `position` is linked in `self`, as per pre-conditions.
        //  -   `node` was just allocated, and is not linked.
        unsafe { self.ring().link_before(position.node, node) };

        self.length += 1;

        Ok(Position::new(node))
    }

    /// Inserts `value` before `position`, returning the position of the inserted element.
    ///
    /// Aborts if memory allocation fails.
    ///
    /// #   Safety
    ///
    /// -   `position` must be a position of `self`.
    pub unsafe fn insert(&mut self, position: Position<T, S::Handle>, value: T) -> Position<T, S::Handle> {
        //  Safety:
        //  -   `position` is a position of `self`, as per pre-conditions.
        Self::unwrap_alloc(unsafe { self.try_insert(position, value) })
    }

    /// Inserts `n` clones of `value` before `position`.
    ///
    /// Returns the position of the first inserted element, or `position` if `n` is 0.
    ///
    /// #   Errors
    ///
    /// Returns an error if the nodes cannot be allocated, in which case the list is left unmodified.
    ///
    /// #   Safety
    ///
    /// -   `position` must be a position of `self`.
    pub unsafe fn try_insert_n(
        &mut self,
        position: Position<T, S::Handle>,
        n: usize,
        value: &T,
    ) -> Result<Position<T, S::Handle>, AllocError>
    where
        T: Clone,
    {
        //  Safety:
        //  -   `position` is a position of `self`, as per pre-conditions.
        unsafe { self.try_insert_iter(position, (0..n).map(|_| value.clone())) }
    }

    /// Inserts `n` clones of `value` before `position`.
    ///
    /// Returns the position of the first inserted element, or `position` if `n` is 0. Aborts if memory allocation fails.
    ///
    /// #   Safety
    ///
    /// -   `position` must be a position of `self`.
    pub unsafe fn insert_n(&mut self, position: Position<T, S::Handle>, n: usize, value: &T) -> Position<T, S::Handle>
    where
        T: Clone,
    {
        //  Safety:
        //  -   `position` is a position of `self`, as per pre-conditions.
        Self::unwrap_alloc(unsafe { self.try_insert_n(position, n, value) })
    }

    /// Inserts clones of the elements of `[first, last)` before `position`.
    ///
    /// Returns the position of the first inserted element, or `position` if the range is empty.
    ///
    /// #   Errors
    ///
    /// Returns an error if the nodes cannot be allocated, in which case the list is left unmodified.
    ///
    /// #   Safety
    ///
    /// -   `position` must be a position of `self`.
    pub unsafe fn try_insert_range<'c, C>(
        &mut self,
        position: Position<T, S::Handle>,
        first: C,
        last: C,
    ) -> Result<Position<T, S::Handle>, AllocError>
    where
        C: InputCursor<Item = &'c T>,
        T: 'c + Clone,
    {
        //  Safety:
        //  -   `position` is a position of `self`, as per pre-conditions.
        unsafe { self.try_insert_iter(position, cloned_range(first, last)) }
    }

    /// Inserts clones of the elements of `[first, last)` before `position`.
    ///
    /// Returns the position of the first inserted element, or `position` if the range is empty. Aborts if memory
    /// allocation fails.
    ///
    /// #   Safety
    ///
    /// -   `position` must be a position of `self`.
    pub unsafe fn insert_range<'c, C>(
        &mut self,
        position: Position<T, S::Handle>,
        first: C,
        last: C,
    ) -> Position<T, S::Handle>
    where
        C: InputCursor<Item = &'c T>,
        T: 'c + Clone,
    {
        //  Safety:
        //  -   `position` is a position of `self`, as per pre-conditions.
        Self::unwrap_alloc(unsafe { self.try_insert_range(position, first, last) })
    }

    /// Erases the element at `position`, returning the position of its successor.
    ///
    /// #   Safety
    ///
    /// -   `position` must be a position of `self`.
    ///
    /// #   Panics
    ///
    /// Panics if `position` is `self.end()`.
    pub unsafe fn erase(&mut self, position: Position<T, S::Handle>) -> Position<T, S::Handle> {
        assert!(position.node != self.sentinel, "cannot erase the end position");

        //  Safety:
        //  -   `position` is a data node of `self`, as per pre-conditions and the above check.
        let next = unsafe { self.ring().unlink(position.node) };

        self.length -= 1;

        //  Safety:
        //  -   `position` is an unlinked data node, no longer used.
        unsafe { self.destroy_node(position.node) };

        Position::new(next)
    }

    /// Erases the elements of `[first, last)`, returning `last`.
    ///
    /// #   Safety
    ///
    /// -   `first` and `last` must be positions of `self`.
    /// -   `last` must be reachable from `first`.
    pub unsafe fn erase_range(
        &mut self,
        mut first: Position<T, S::Handle>,
        last: Position<T, S::Handle>,
    ) -> Position<T, S::Handle> {
        while first != last {
            //  Safety:
            //  -   `first` is a data node of `self`, as `last` is reachable from it.
            first = unsafe { self.erase(first) };
        }

        last
    }

    /// Resizes the list to `n` elements, erasing the elements beyond, or appending clones of `value`.
    ///
    /// Aborts if memory allocation fails.
    pub fn resize(&mut self, n: usize, value: T)
    where
        T: Clone,
    {
        Self::unwrap_alloc(self.try_resize(n, value));
    }

    /// Resizes the list to `n` elements, erasing the elements beyond, or appending clones of `value`.
    ///
    /// #   Errors
    ///
    /// Returns an error if the nodes cannot be allocated, in which case the list is left unmodified.
    pub fn try_resize(&mut self, n: usize, value: T) -> Result<(), AllocError>
    where
        T: Clone,
    {
        let mut position = self.begin();
        let mut length = 0;

        while length < n && position != self.end() {
            //  Safety:
            //  -   `position` is a position of `self`.
            position = unsafe { self.next(position) };
            length += 1;
        }

        if length == n {
            //  Safety:
            //  -   `position` and `self.end()` are positions of `self`, the latter reachable from the former.
            unsafe { self.erase_range(position, self.end()) };
        } else {
            //  Safety:
            //  -   `self.end()` is a position of `self`.
            unsafe { self.try_insert_n(self.end(), n - length, &value)? };
        }

        Ok(())
    }

    /// Replaces the elements of the list by `n` clones of `value`.
    ///
    /// Aborts if memory allocation fails.
    pub fn assign(&mut self, n: usize, value: T)
    where
        T: Clone,
    {
        Self::unwrap_alloc(self.try_assign(n, value));
    }

    /// Replaces the elements of the list by `n` clones of `value`.
    ///
    /// The existing nodes are reused.
    ///
    /// #   Errors
    ///
    /// Returns an error if the additional nodes cannot be allocated, in which case the existing elements have been
    /// replaced, but none added.
    pub fn try_assign(&mut self, n: usize, value: T) -> Result<(), AllocError>
    where
        T: Clone,
    {
        self.try_assign_iter((0..n).map(|_| value.clone()))
    }

    /// Replaces the elements of the list by clones of the elements of `[first, last)`.
    ///
    /// Aborts if memory allocation fails.
    pub fn assign_range<'c, C>(&mut self, first: C, last: C)
    where
        C: InputCursor<Item = &'c T>,
        T: 'c + Clone,
    {
        Self::unwrap_alloc(self.try_assign_range(first, last));
    }

    /// Replaces the elements of the list by clones of the elements of `[first, last)`.
    ///
    /// The existing nodes are reused.
    ///
    /// #   Errors
    ///
    /// Returns an error if the additional nodes cannot be allocated, in which case the existing elements have been
    /// replaced, but none added.
    pub fn try_assign_range<'c, C>(&mut self, first: C, last: C) -> Result<(), AllocError>
    where
        C: InputCursor<Item = &'c T>,
        T: 'c + Clone,
    {
        self.try_assign_iter(cloned_range(first, last))
    }

    /// Erases every element equal to `value`.
    pub fn remove(&mut self, value: &T)
    where
        T: PartialEq,
    {
        self.remove_if(|element| element == value);
    }

    /// Erases every element for which `predicate` returns true.
    pub fn remove_if<F>(&mut self, mut predicate: F)
    where
        F: FnMut(&T) -> bool,
    {
        let mut position = self.begin();

        while position != self.end() {
            //  Safety:
            //  -   `position` is a data node of `self`, since it is not the end.
            //  -   `next` is captured before `position` is erased.
            unsafe {
                let next = self.next(position);

                if predicate(self.get(position)) {
                    self.erase(position);
                }

                position = next;
            }
        }
    }

    /// Collapses each run of consecutive equal elements into its first element.
    pub fn unique(&mut self)
    where
        T: PartialEq,
    {
        self.unique_by(|kept, candidate| kept == candidate);
    }

    /// Collapses each run of consecutive elements for which `same(kept, candidate)` holds into its first element.
    ///
    /// `kept` is the first element of the run, and `candidate` the element following the run so far.
    pub fn unique_by<F>(&mut self, mut same: F)
    where
        F: FnMut(&T, &T) -> bool,
    {
        if self.is_empty() {
            return;
        }

        let mut kept = self.begin();

        //  Safety:
        //  -   `kept` is a data node of `self`, and `candidate` is a position of `self` until the end is reached.
        unsafe {
            let mut candidate = self.next(kept);

            while candidate != self.end() {
                if same(self.get(kept), self.get(candidate)) {
                    candidate = self.erase(candidate);
                } else {
                    kept = candidate;
                    candidate = self.next(candidate);
                }
            }
        }
    }

    /// Reverses the order of the elements, in place.
    pub fn reverse(&mut self) {
        if self.length < 2 {
            return;
        }

        let ring = self.ring();

        //  Safety:
        //  -   `self.sentinel` is valid, as per invariant, and the list has at least 2 elements.
        //  -   `first` is always a position of `self`, and never the current front.
        unsafe {
            let mut first = ring.next(ring.next(self.sentinel));

            while first != self.sentinel {
                let moved = first;
                first = ring.next(first);

                ring.transfer(ring.next(self.sentinel), moved, first);
            }
        }
    }

    /// Moves the elements `[first, last)` of the list before `position`.
    ///
    /// A `position` equal to `first` or `last` is a no-op.
    ///
    /// #   Safety
    ///
    /// -   `position`, `first`, and `last` must be positions of `self`.
    /// -   `last` must be reachable from `first`.
    /// -   `[first, last)` must not contain `self.end()`.
    /// -   `position` must not be within `(first, last)`.
    pub unsafe fn relocate(
        &mut self,
        position: Position<T, S::Handle>,
        first: Position<T, S::Handle>,
        last: Position<T, S::Handle>,
    ) {
        //  Safety:
        //  -   `first` and `last` are positions of `self`, as per pre-conditions.
        unsafe { self.debug_assert_excludes_end(first, last) };

        //  Safety:
        //  -   All positions are linked in `self`, as per pre-conditions.
        //  -   `position` is not within `(first, last)`, as per pre-conditions.
        unsafe { self.ring().transfer(position.node, first.node, last.node) };
    }

    /// Sorts the list, in place.
    ///
    /// The sort is stable, and never moves an element: all positions remain valid.
    pub fn sort(&mut self)
    where
        T: Ord,
    {
        self.sort_by(T::cmp);
    }

    /// Sorts the list with the `compare` function, in place.
    ///
    /// A bottom-up merge sort, on a binary counter of buckets: the i-th bucket holds either nothing, or a sorted run of
    /// `2^i` elements. Each element, in turn, is carried into the first bucket, merging with each full bucket it
    /// encounters. The buckets are finally merged together, from the smallest.
    ///
    /// The runs are kept in place, within the list: the non-empty buckets are laid out from the largest to the
    /// smallest, followed by the carry, followed by the elements yet to sort. Each merge is thus a merge of adjacent
    /// runs, and nothing is ever allocated.
    ///
    /// O(n log n) comparisons. The sort is stable, and never moves an element: all positions remain valid. Should
    /// `compare` panic, the list holds the same elements, in an unspecified order.
    pub fn sort_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(&T, &T) -> cmp::Ordering,
    {
        if self.length < 2 {
            return;
        }

        let mut is_less = |left: &T, right: &T| compare(left, right) == cmp::Ordering::Less;

        let ring = self.ring();

        //  The first node of the run of each bucket, if any.
        let mut buckets: [Option<S::Handle>; BUCKETS] = [None; BUCKETS];
        let mut fill = 0;

        //  Safety:
        //  -   `self.sentinel` is valid, as per invariant.
        //  -   Every run is a range of data nodes of `self`, immediately followed by the next run, the carry, or
        //      `unsorted`.
        unsafe {
            let mut unsorted = ring.next(self.sentinel);

            while unsorted != self.sentinel {
                let mut carry = unsorted;
                unsorted = ring.next(unsorted);

                let mut i = 0;

                while let Some(run) = buckets[i].take() {
                    carry = ring.merge_runs(run, carry, unsorted, &mut is_less);
                    i += 1;
                }

                buckets[i] = Some(carry);
                fill = cmp::max(fill, i + 1);
            }

            let mut sorted: Option<S::Handle> = None;

            for &run in buckets[..fill].iter().flatten() {
                sorted = Some(match sorted {
                    Some(smaller) => ring.merge_runs(run, smaller, self.sentinel, &mut is_less),
                    None => run,
                });
            }
        }

        log::trace!("sorted {} elements, with {} buckets", self.length, fill);
    }

    /// Exchanges the elements of `self` and `other`, in O(1).
    ///
    /// The stores are exchanged alongside, hence all positions remain valid, each designating the same element in
    /// its new list.
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }
}

impl<T, S: StoreSharing> List<T, S> {
    /// Moves all the elements of `other` to the back of `self`, leaving `other` empty.
    ///
    /// #   Panics
    ///
    /// Panics if the store of `other` is not sharing with the store of `self`.
    pub fn append(&mut self, other: &mut Self) {
        //  Safety:
        //  -   `self.end()` is a position of `self`.
        unsafe { self.splice(self.end(), other) };
    }

    /// Moves all the elements of `other` before `position`, leaving `other` empty.
    ///
    /// No element is moved nor copied: the positions of the elements of `other` remain valid, as positions of `self`.
    ///
    /// #   Safety
    ///
    /// -   `position` must be a position of `self`.
    ///
    /// #   Panics
    ///
    /// Panics if the store of `other` is not sharing with the store of `self`.
    pub unsafe fn splice(&mut self, position: Position<T, S::Handle>, other: &mut Self) {
        self.assert_sharing(other);

        if other.is_empty() {
            return;
        }

        //  Safety:
        //  -   `position` is linked in `self`, as per pre-conditions.
        //  -   `[other.begin(), other.end())` is the ring of `other`, resolvable through `self.store` as it is sharing.
        unsafe { self.ring().transfer(position.node, other.begin().node, other.sentinel) };

        self.length += mem::replace(&mut other.length, 0);
    }

    /// Moves the element at `element` of `other` before `position`.
    ///
    /// #   Safety
    ///
    /// -   `position` must be a position of `self`.
    /// -   `element` must be a position of `other`.
    ///
    /// #   Panics
    ///
    /// Panics if the store of `other` is not sharing with the store of `self`, or if `element` is `other.end()`.
    pub unsafe fn splice_one(
        &mut self,
        position: Position<T, S::Handle>,
        other: &mut Self,
        element: Position<T, S::Handle>,
    ) {
        self.assert_sharing(other);

        assert!(element.node != other.sentinel, "cannot splice the end position");

        //  Safety:
        //  -   `element` is a data node of `other`, as per pre-conditions and the above check.
        let next = unsafe { other.ring().next(element.node) };

        //  Safety:
        //  -   `position` is linked in `self`, as per pre-conditions.
        //  -   `[element, next)` is a single node of `other`, resolvable through `self.store` as it is sharing.
        unsafe { self.ring().transfer(position.node, element.node, next) };

        self.length += 1;
        other.length -= 1;
    }

    /// Moves the elements `[first, last)` of `other` before `position`.
    ///
    /// O(n) in the number of elements moved, to count them.
    ///
    /// #   Safety
    ///
    /// -   `position` must be a position of `self`.
    /// -   `first` and `last` must be positions of `other`.
    /// -   `last` must be reachable from `first`.
    /// -   `[first, last)` must not contain `other.end()`.
    ///
    /// #   Panics
    ///
    /// Panics if the store of `other` is not sharing with the store of `self`.
    pub unsafe fn splice_range(
        &mut self,
        position: Position<T, S::Handle>,
        other: &mut Self,
        first: Position<T, S::Handle>,
        last: Position<T, S::Handle>,
    ) {
        self.assert_sharing(other);

        if first == last {
            return;
        }

        //  Safety:
        //  -   `first` and `last` are positions of `other`, as per pre-conditions.
        unsafe { other.debug_assert_excludes_end(first, last) };

        //  Safety:
        //  -   `first` and `last` are positions of `other`, as per pre-conditions.
        let count = unsafe { cursor::distance(&other.cursor_at(first), &other.cursor_at(last)) };

        //  Safety:
        //  -   `position` is linked in `self`, as per pre-conditions.
        //  -   `[first, last)` is a range of `other`, resolvable through `self.store` as it is sharing.
        unsafe { self.ring().transfer(position.node, first.node, last.node) };

        self.length += count;
        other.length -= count;
    }

    /// Merges the sorted `other` into the sorted `self`, leaving `other` empty.
    ///
    /// The merge is stable: on ties, the elements of `self` come first. No element is moved nor copied.
    ///
    /// #   Panics
    ///
    /// Panics if the store of `other` is not sharing with the store of `self`.
    pub fn merge(&mut self, other: &mut Self)
    where
        T: Ord,
    {
        self.merge_by(other, T::cmp);
    }

    /// Merges `other` into `self`, both sorted according to `compare`, leaving `other` empty.
    ///
    /// The merge is stable: on ties, the elements of `self` come first. No element is moved nor copied.
    ///
    /// #   Panics
    ///
    /// Panics if the store of `other` is not sharing with the store of `self`.
    pub fn merge_by<F>(&mut self, other: &mut Self, mut compare: F)
    where
        F: FnMut(&T, &T) -> cmp::Ordering,
    {
        self.assert_sharing(other);

        let mut is_less = |left: &T, right: &T| compare(left, right) == cmp::Ordering::Less;

        let mut lengths = Lengths {
            into: &mut self.length,
            from: &mut other.length,
            moved: 0,
        };

        //  Safety:
        //  -   `self.sentinel` and `other.sentinel` are valid sentinels of distinct rings, as per invariant.
        //  -   The nodes of `other` are resolvable through `self.store`, as it is sharing.
        unsafe {
            Ring::new(&self.store).merge(self.sentinel, other.sentinel, &mut is_less, &mut lengths.moved);
        }

        lengths.moved = *lengths.from;
    }
}

impl<T: Clone, S: Store + Default> Clone for List<T, S> {
    fn clone(&self) -> Self {
        self.iter().cloned().collect()
    }

    fn clone_from(&mut self, source: &Self) {
        Self::unwrap_alloc(self.try_assign_iter(source.iter().cloned()));
    }
}

impl<T: fmt::Debug, S: Store> fmt::Debug for List<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        f.debug_list().entries(self).finish()
    }
}

impl<T, S: Store + Default> Default for List<T, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, S: Store> Drop for List<T, S> {
    fn drop(&mut self) {
        self.clear();

        let sentinels = self.allocator().rebind::<Links<S::Handle>>();

        //  Safety:
        //  -   `self.sentinel` was allocated by `self.store`, for a `Links`, and is still valid.
        unsafe { sentinels.deallocate(TypedHandle::from_raw(self.sentinel), 1) };
    }
}

unsafe impl<T, S> Send for List<T, S>
where
    T: Send,
    S: Store + Send,
{
}

unsafe impl<T, S> Sync for List<T, S>
where
    T: Sync,
    S: Store + Sync,
{
}

//
//  Comparison
//

impl<T, S, OS> cmp::PartialEq<List<T, OS>> for List<T, S>
where
    T: cmp::PartialEq,
    S: Store,
    OS: Store,
{
    fn eq(&self, other: &List<T, OS>) -> bool {
        self.len() == other.len() && self.iter().eq(other)
    }
}

impl<T, S> cmp::Eq for List<T, S>
where
    T: cmp::Eq,
    S: Store,
{
}

impl<T: hash::Hash, S: Store> hash::Hash for List<T, S> {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        state.write_usize(self.len());

        for element in self {
            element.hash(state);
        }
    }
}

impl<T, S, OS> cmp::PartialOrd<List<T, OS>> for List<T, S>
where
    T: cmp::PartialOrd,
    S: Store,
    OS: Store,
{
    fn partial_cmp(&self, other: &List<T, OS>) -> Option<cmp::Ordering> {
        self.iter().partial_cmp(other)
    }
}

impl<T, S> cmp::Ord for List<T, S>
where
    T: cmp::Ord,
    S: Store,
{
    fn cmp(&self, other: &List<T, S>) -> cmp::Ordering {
        self.iter().cmp(other)
    }
}

//
//  Conversion
//

impl<T, S: Store + Default, const N: usize> TryFrom<[T; N]> for List<T, S> {
    type Error = AllocError;

    fn try_from(value: [T; N]) -> Result<Self, Self::Error> {
        let mut result = List::try_new_in(S::default())?;

        for element in value {
            result.try_push_back(element)?;
        }

        Ok(result)
    }
}

//
//  Iteration
//

impl<'a, T: 'a + Clone, S: Store> Extend<&'a T> for List<T, S> {
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = &'a T>,
    {
        self.extend(iter.into_iter().cloned());
    }
}

impl<T, S: Store> Extend<T> for List<T, S> {
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = T>,
    {
        for element in iter {
            self.push_back(element);
        }
    }
}

impl<T, S: Store + Default> FromIterator<T> for List<T, S> {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let mut result = List::new();

        result.extend(iter);

        result
    }
}

impl<T, S: Store> IntoIterator for List<T, S> {
    type Item = T;
    type IntoIter = IntoIter<T, S>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter(self)
    }
}

impl<'a, T, S: Store> IntoIterator for &'a List<T, S> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, S: Store> IntoIterator for &'a mut List<T, S> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// Iterator over a linked list.
pub struct IntoIter<T, S: Store>(List<T, S>);

impl<T, S: Store> Iterator for IntoIter<T, S> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.0.len(), Some(self.0.len()))
    }
}

impl<T, S: Store> DoubleEndedIterator for IntoIter<T, S> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0.pop_back()
    }
}

impl<T, S: Store> ExactSizeIterator for IntoIter<T, S> {}

impl<T, S: Store> FusedIterator for IntoIter<T, S> {}

/// Iterator over a reference to a linked list.
pub struct Iter<'a, T, S: Store> {
    //  Only `length` handles are valid.
    length: usize,
    head: S::Handle,
    tail: S::Handle,
    store: &'a S,
    _marker: PhantomData<&'a T>,
}

impl<T, S: Store> Clone for Iter<'_, T, S> {
    fn clone(&self) -> Self {
        Self {
            length: self.length,
            head: self.head,
            tail: self.tail,
            store: self.store,
            _marker: PhantomData,
        }
    }
}

impl<'a, T: 'a, S: Store> Iterator for Iter<'a, T, S> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.length == 0 {
            return None;
        }

        let ring = Ring::new(self.store);

        //  Safety:
        //  -   `self.head` is a data node, since `length` is not 0.
        //  -   Access to the element is shared, as guaranteed by the list being borrowed immutably.
        let element = unsafe { ring.element::<T>(self.head).as_ref() };

        //  Safety:
        //  -   `self.head` is a data node, hence linked.
        self.head = unsafe { ring.next(self.head) };
        self.length -= 1;

        Some(element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.length, Some(self.length))
    }
}

impl<'a, T: 'a, S: Store> DoubleEndedIterator for Iter<'a, T, S> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.length == 0 {
            return None;
        }

        let ring = Ring::new(self.store);

        //  Safety:
        //  -   `self.tail` is a data node, since `length` is not 0.
        //  -   Access to the element is shared, as guaranteed by the list being borrowed immutably.
        let element = unsafe { ring.element::<T>(self.tail).as_ref() };

        //  Safety:
        //  -   `self.tail` is a data node, hence linked.
        self.tail = unsafe { ring.prev(self.tail) };
        self.length -= 1;

        Some(element)
    }
}

impl<'a, T: 'a, S: Store> ExactSizeIterator for Iter<'a, T, S> {}

impl<'a, T: 'a, S: Store> FusedIterator for Iter<'a, T, S> {}

/// Iterator over a mutable reference to a linked list.
pub struct IterMut<'a, T, S: Store> {
    //  Only `length` handles are valid.
    length: usize,
    head: S::Handle,
    tail: S::Handle,
    store: &'a S,
    _marker: PhantomData<&'a mut T>,
}

impl<'a, T: 'a, S: Store> Iterator for IterMut<'a, T, S> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.length == 0 {
            return None;
        }

        let ring = Ring::new(self.store);

        //  Safety:
        //  -   `self.head` is a data node, since `length` is not 0.
        //  -   Access to the element is exclusive, as guaranteed by the list being borrowed mutably, and each node
        //      being yielded once.
        let element = unsafe { ring.element::<T>(self.head).as_mut() };

        //  Safety:
        //  -   `self.head` is a data node, hence linked.
        self.head = unsafe { ring.next(self.head) };
        self.length -= 1;

        Some(element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.length, Some(self.length))
    }
}

impl<'a, T: 'a, S: Store> DoubleEndedIterator for IterMut<'a, T, S> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.length == 0 {
            return None;
        }

        let ring = Ring::new(self.store);

        //  Safety:
        //  -   `self.tail` is a data node, since `length` is not 0.
        //  -   Access to the element is exclusive, as guaranteed by the list being borrowed mutably, and each node
        //      being yielded once.
        let element = unsafe { ring.element::<T>(self.tail).as_mut() };

        //  Safety:
        //  -   `self.tail` is a data node, hence linked.
        self.tail = unsafe { ring.prev(self.tail) };
        self.length -= 1;

        Some(element)
    }
}

impl<'a, T: 'a, S: Store> ExactSizeIterator for IterMut<'a, T, S> {}

impl<'a, T: 'a, S: Store> FusedIterator for IterMut<'a, T, S> {}

//
//  Positions and cursors
//

impl<T, H> Position<T, H> {
    const fn new(node: H) -> Self {
        Self {
            node,
            _marker: PhantomData,
        }
    }
}

impl<T, H: Copy> Clone for Position<T, H> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, H: Copy> Copy for Position<T, H> {}

impl<T, H: PartialEq> PartialEq for Position<T, H> {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node
    }
}

impl<T, H: Eq> Eq for Position<T, H> {}

impl<T, H: hash::Hash> hash::Hash for Position<T, H> {
    fn hash<HS: hash::Hasher>(&self, state: &mut HS) {
        self.node.hash(state);
    }
}

impl<T, H: fmt::Debug> fmt::Debug for Position<T, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        f.debug_tuple("Position").field(&self.node).finish()
    }
}

/// A bidirectional cursor over a list.
///
/// Stepping wraps around: past the last element is the end, and past the end is the first element.
pub struct Cursor<'a, T, S: Store> {
    node: S::Handle,
    list: &'a List<T, S>,
}

impl<'a, T, S: Store> Cursor<'a, T, S> {
    /// Returns the position of the cursor.
    pub fn position(&self) -> Position<T, S::Handle> {
        Position::new(self.node)
    }

    /// Returns whether the cursor is at the end of the list.
    pub fn is_end(&self) -> bool {
        self.node == self.list.sentinel
    }

    /// Returns the element designated by the cursor, unless it is at the end.
    pub fn current(&self) -> Option<&'a T> {
        if self.is_end() {
            return None;
        }

        //  Safety:
        //  -   `self.node` is a data node of `self.list`, as it is not the end.
        //  -   Access to the element is shared, as guaranteed by `self.list` being borrowed immutably for `'a`.
        Some(unsafe { self.list.element(self.node).as_ref() })
    }

    fn new(node: S::Handle, list: &'a List<T, S>) -> Self {
        Self { node, list }
    }
}

impl<T, S: Store> Clone for Cursor<'_, T, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, S: Store> Copy for Cursor<'_, T, S> {}

impl<T, S: Store> PartialEq for Cursor<'_, T, S> {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node && ptr::eq(self.list, other.list)
    }
}

impl<T, S: Store> Eq for Cursor<'_, T, S> {}

impl<T: fmt::Debug, S: Store> fmt::Debug for Cursor<'_, T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        f.debug_tuple("Cursor").field(&self.current()).finish()
    }
}

impl<'a, T, S: Store> InputCursor for Cursor<'a, T, S> {
    type Item = &'a T;
    type Category = BidirectionalTag;

    fn get(&self) -> &'a T {
        match self.current() {
            Some(element) => element,
            None => panic!("cannot dereference the end cursor"),
        }
    }

    fn step(&mut self) {
        //  Safety:
        //  -   `self.node` is linked in `self.list`, which is borrowed immutably.
        self.node = unsafe { self.list.ring().next(self.node) };
    }
}

impl<T, S: Store> ForwardCursor for Cursor<'_, T, S> {}

impl<T, S: Store> BidirectionalCursor for Cursor<'_, T, S> {
    fn step_back(&mut self) {
        //  Safety:
        //  -   `self.node` is linked in `self.list`, which is borrowed immutably.
        self.node = unsafe { self.list.ring().prev(self.node) };
    }
}

//
//  Implementation
//

//  Enough for lists of up to `2^64` elements.
const BUCKETS: usize = 64;

//  Keeps the lengths of two lists in sync with the nodes moved from one to the other, even when unwinding.
struct Lengths<'a> {
    into: &'a mut usize,
    from: &'a mut usize,
    moved: usize,
}

impl Drop for Lengths<'_> {
    fn drop(&mut self) {
        *self.into += self.moved;
        *self.from -= self.moved;
    }
}

impl<T, S: Store> List<T, S> {
    fn ring(&self) -> Ring<'_, S> {
        Ring::new(&self.store)
    }

    fn unwrap_alloc<R>(result: Result<R, AllocError>) -> R {
        result.unwrap_or_else(|_| polyfill::handle_alloc_error(Layout::new::<Node<T, S::Handle>>()))
    }

    #[track_caller]
    fn assert_sharing(&self, other: &Self)
    where
        S: StoreSharing,
    {
        assert!(
            self.store.is_sharing_with(&other.store),
            "cannot move nodes between lists whose stores do not share"
        );
    }

    //  In debug, panics if `[first, last)` contains the end.
    //
    //  #   Safety
    //
    //  -   `first` and `last` must be positions of `self`, `last` reachable from `first`.
    #[track_caller]
    unsafe fn debug_assert_excludes_end(&self, first: Position<T, S::Handle>, last: Position<T, S::Handle>) {
        if !cfg!(debug_assertions) {
            return;
        }

        let mut node = first.node;

        while node != last.node {
            assert!(node != self.sentinel, "cannot move the end position");

            //  Safety:
            //  -   `node` is linked in `self`, as it lies between two positions of `self`.
            node = unsafe { self.ring().next(node) };
        }
    }

    //  #   Safety
    //
    //  -   `node` must be a data node allocated by `self.store`, or a store sharing with it, and still valid.
    unsafe fn element(&self, node: S::Handle) -> NonNull<T> {
        //  Safety:
        //  -   `node` is a valid data node, as per pre-conditions.
        unsafe { self.ring().element(node) }
    }

    //  Allocates a node, and constructs `value` within; the node is not linked.
    fn construct_node(&self, value: T) -> Result<S::Handle, AllocError> {
        let node = self.allocator().rebind::<Node<T, S::Handle>>().allocate(1)?.to_raw();

        //  Safety:
        //  -   `node` was just allocated, for a `Node<T, S::Handle>`.
        //  -   The element slot is uninitialized, hence there is nothing to drop.
        unsafe { self.allocator().construct(self.element(node), value) };

        Ok(node)
    }

    //  #   Safety
    //
    //  -   `node` must be an unlinked data node, whose element is live, and which is no longer used afterwards.
    unsafe fn destroy_node(&self, node: S::Handle) {
        //  Safety:
        //  -   The element of `node` is live, and no longer used, as per pre-conditions.
        unsafe { self.allocator().destroy(self.element(node)) };

        //  Safety:
        //  -   `node` is no longer used, as per pre-conditions.
        unsafe { self.deallocate_node(node) };
    }

    //  #   Safety
    //
    //  -   `node` must be an unlinked data node, whose element is live, and which is no longer used afterwards.
    unsafe fn take_node(&self, node: S::Handle) -> T {
        //  Safety:
        //  -   The element of `node` is live, and no longer used, as per pre-conditions.
        let value = unsafe { ptr::read(self.element(node).as_ptr()) };

        //  Safety:
        //  -   `node` is no longer used, as per pre-conditions.
        unsafe { self.deallocate_node(node) };

        value
    }

    //  #   Safety
    //
    //  -   `node` must be a data node allocated by `self.store`, or a store sharing with it, and still valid.
    //  -   `node` must no longer be used afterwards.
    unsafe fn deallocate_node(&self, node: S::Handle) {
        let nodes = self.allocator().rebind::<Node<T, S::Handle>>();

        //  Safety:
        //  -   `node` was allocated for a single `Node<T, S::Handle>`, and is still valid, as per pre-conditions.
        unsafe { nodes.deallocate(TypedHandle::from_raw(node), 1) };
    }

    //  Inserts the elements of `iter` before `position`, all or nothing.
    //
    //  #   Safety
    //
    //  -   `position` must be a position of `self`.
    unsafe fn try_insert_iter<I>(
        &mut self,
        position: Position<T, S::Handle>,
        iter: I,
    ) -> Result<Position<T, S::Handle>, AllocError>
    where
        I: Iterator<Item = T>,
    {
        let mut first = position;

        for value in iter {
            //  Safety:
            //  -   `position` is a position of `self`, as per pre-conditions.
            let inserted = match unsafe { self.try_insert(position, value) } {
                Ok(inserted) => inserted,
                Err(error) => {
                    //  Safety:
                    //  -   `[first, position)` are the elements inserted so far.
                    unsafe { self.erase_range(first, position) };

                    return Err(error);
                }
            };

            if first == position {
                first = inserted;
            }
        }

        Ok(first)
    }

    //  Overwrites the existing elements, then erases the remaining ones or appends the remaining values.
    fn try_assign_iter<I>(&mut self, mut iter: I) -> Result<(), AllocError>
    where
        I: Iterator<Item = T>,
    {
        let mut position = self.begin();

        while position != self.end() {
            let Some(value) = iter.next() else {
                //  Safety:
                //  -   `position` and `self.end()` are positions of `self`, the latter reachable from the former.
                unsafe { self.erase_range(position, self.end()) };

                return Ok(());
            };

            //  Safety:
            //  -   `position` is a data node of `self`, since it is not the end.
            unsafe {
                *self.get_mut(position) = value;

                position = self.next(position);
            }
        }

        //  Safety:
        //  -   `self.end()` is a position of `self`.
        unsafe { self.try_insert_iter(self.end(), iter) }.map(|_| ())
    }
}

fn cloned_range<'c, T, C>(mut first: C, last: C) -> impl Iterator<Item = T>
where
    C: InputCursor<Item = &'c T>,
    T: 'c + Clone,
{
    iter::from_fn(move || {
        if first == last {
            return None;
        }

        let value = first.get().clone();
        first.step();

        Some(value)
    })
}

// mod allocator_tests

// mod inline_slab_tests
