//! A typed allocator, atop a `Store`.
//!
//! Where the `Store` deals in raw blocks of memory, the `TypedAllocator` deals in arrays of `T`: it allocates and
//! deallocates them, and constructs and destroys the `T` within. The allocator for another type `U`, sharing the same
//! store, is obtained by `Rebind`-ing it, which is how a container of `T` comes to allocate nodes embedding a `T`.

use core::{
    alloc::Layout,
    fmt,
    marker::PhantomData,
    ptr::{self, NonNull},
};

use crate::{
    extension::typed::TypedHandle,
    interface::{AllocError, Store, StoreSharing},
};

/// Produces the equivalent allocator for another element type.
pub trait Rebind {
    /// The allocator of `U`s, equivalent to `Self`.
    type Rebound<U>;

    /// Returns the allocator of `U`s, drawing from the same memory as `self`.
    fn rebind<U>(&self) -> Self::Rebound<U>;
}

/// An allocator of `T`s, borrowing its store.
pub struct TypedAllocator<'s, T, S: Store> {
    store: &'s S,
    _marker: PhantomData<fn() -> T>,
}

impl<'s, T, S: Store> TypedAllocator<'s, T, S> {
    /// Creates an allocator of `T`s, drawing from `store`.
    pub const fn new(store: &'s S) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    /// Returns the underlying store.
    pub const fn store(&self) -> &'s S {
        self.store
    }

    /// Returns the maximum number of `T`s the store could ever provide.
    pub fn max_size(&self) -> usize {
        self.store.max_count(Layout::new::<T>())
    }

    /// Allocates uninitialized storage for `n` contiguous `T`s.
    ///
    /// #   Errors
    ///
    /// Returns an error if `n` exceeds `self.max_size()`, or if the store cannot satisfy the request.
    pub fn allocate(&self, n: usize) -> Result<TypedHandle<T, S::Handle>, AllocError> {
        if n > self.max_size() {
            return Err(AllocError);
        }

        let layout = Layout::array::<T>(n).map_err(|_| AllocError)?;

        self.store.allocate(layout).map(TypedHandle::from_raw)
    }

    /// Deallocates the storage for `n` contiguous `T`s.
    ///
    /// Any `T` still living in this storage is leaked, not destroyed.
    ///
    /// #   Safety
    ///
    /// -   `handle` must have been allocated by this allocator, or an allocator equal to it.
    /// -   `handle` must still be valid.
    /// -   `n` must be the number of `T`s it was allocated for.
    pub unsafe fn deallocate(&self, handle: TypedHandle<T, S::Handle>, n: usize) {
        //  Safety:
        //  -   `n` was valid when allocating, hence is valid now.
        let layout = unsafe { Layout::array::<T>(n).unwrap_unchecked() };

        //  Safety:
        //  -   `handle` was allocated by `self.store`, and is still valid, as per pre-conditions.
        //  -   `layout` fits the block of memory, as per pre-conditions.
        unsafe { self.store.deallocate(handle.to_raw(), layout) };
    }

    /// Resolves the handle into a pointer to the first `T`.
    ///
    /// #   Safety
    ///
    /// -   `handle` must have been allocated by this allocator, or an allocator equal to it.
    /// -   `handle` must still be valid.
    pub unsafe fn resolve(&self, handle: TypedHandle<T, S::Handle>) -> NonNull<T> {
        //  Safety:
        //  -   `handle` was allocated by `self.store`, and is still valid, as per pre-conditions.
        unsafe { handle.resolve_raw(self.store) }
    }

    /// Constructs `value` in place, at `slot`.
    ///
    /// #   Safety
    ///
    /// -   `slot` must be valid for writes, and suitably aligned.
    /// -   Any `T` previously living at `slot` is overwritten, without being destroyed.
    pub unsafe fn construct(&self, slot: NonNull<T>, value: T) {
        //  Safety:
        //  -   `slot` is valid for writes, and suitably aligned, as per pre-conditions.
        unsafe { ptr::write(slot.as_ptr(), value) };
    }

    /// Destroys the `T` living at `slot`, without releasing its storage.
    ///
    /// #   Safety
    ///
    /// -   `slot` must point to a live instance of `T`, which is no longer used afterwards.
    /// -   No reference to this instance of `T` may be active.
    pub unsafe fn destroy(&self, slot: NonNull<T>) {
        //  Safety:
        //  -   `slot` points to a live instance of `T`, which is no longer used, as per pre-conditions.
        unsafe { ptr::drop_in_place(slot.as_ptr()) };
    }
}

impl<'s, T, S: Store> Rebind for TypedAllocator<'s, T, S> {
    type Rebound<U> = TypedAllocator<'s, U, S>;

    fn rebind<U>(&self) -> TypedAllocator<'s, U, S> {
        TypedAllocator::new(self.store)
    }
}

impl<T, S: Store> Clone for TypedAllocator<'_, T, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, S: Store> Copy for TypedAllocator<'_, T, S> {}

//  Two allocators are equal if what one allocates, the other may deallocate.
impl<T, U, S: StoreSharing> PartialEq<TypedAllocator<'_, U, S>> for TypedAllocator<'_, T, S> {
    fn eq(&self, other: &TypedAllocator<'_, U, S>) -> bool {
        self.store.is_sharing_with(other.store)
    }
}

impl<T, S: Store + fmt::Debug> fmt::Debug for TypedAllocator<'_, T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        f.debug_struct("TypedAllocator")
            .field("element", &core::any::type_name::<T>())
            .field("store", self.store)
            .finish()
    }
}

#[cfg(all(test, feature = "alloc"))]
mod allocator_tests {
    use std::{cell::Cell, rc::Rc};

    use crate::store::HeapStore;

    use super::*;

    #[test]
    fn allocate_construct_destroy() {
        let store = HeapStore;
        let allocator = TypedAllocator::<String, _>::new(&store);

        let handle = allocator.allocate(1).unwrap();

        //  Safety:
        //  -   `handle` was allocated by `allocator`, and is still valid.
        let slot = unsafe { allocator.resolve(handle) };

        //  Safety:
        //  -   `slot` is valid for writes, and suitably aligned.
        unsafe { allocator.construct(slot, String::from("0")) };

        //  Safety:
        //  -   `slot` points to a live `String`.
        assert_eq!("0", unsafe { slot.as_ref() });

        //  Safety:
        //  -   `slot` points to a live `String`, no longer used.
        unsafe { allocator.destroy(slot) };

        //  Safety:
        //  -   `handle` was allocated by `allocator`, for 1 element, and is still valid.
        unsafe { allocator.deallocate(handle, 1) };
    }

    #[test]
    fn destroy_runs_drop() {
        struct Tracker(Rc<Cell<usize>>);

        impl Drop for Tracker {
            fn drop(&mut self) {
                self.0.set(self.0.get() + 1);
            }
        }

        let drops = Rc::new(Cell::new(0));
        let store = HeapStore;
        let allocator = TypedAllocator::<Tracker, _>::new(&store);

        let handle = allocator.allocate(1).unwrap();

        //  Safety:
        //  -   `handle` was allocated by `allocator`, and is still valid.
        let slot = unsafe { allocator.resolve(handle) };

        //  Safety:
        //  -   `slot` is valid for writes, and suitably aligned.
        unsafe { allocator.construct(slot, Tracker(drops.clone())) };

        assert_eq!(0, drops.get());

        //  Safety:
        //  -   `slot` points to a live `Tracker`, no longer used.
        unsafe { allocator.destroy(slot) };

        assert_eq!(1, drops.get());

        //  Safety:
        //  -   `handle` was allocated by `allocator`, for 1 element, and is still valid.
        unsafe { allocator.deallocate(handle, 1) };
    }

    #[test]
    fn allocate_beyond_max_size() {
        let store = HeapStore;
        let allocator = TypedAllocator::<u64, _>::new(&store);

        assert_eq!(isize::MAX as usize / 8, allocator.max_size());
        assert_eq!(Err(AllocError), allocator.allocate(allocator.max_size() + 1).map(|_| ()));
    }

    #[test]
    fn allocate_array() {
        let store = HeapStore;
        let allocator = TypedAllocator::<u32, _>::new(&store);

        let handle = allocator.allocate(4).unwrap();

        //  Safety:
        //  -   `handle` was allocated by `allocator`, and is still valid.
        let first = unsafe { allocator.resolve(handle) };

        for i in 0..4 {
            //  Safety:
            //  -   `first.add(i)` is within the 4 elements allocated, valid for writes, and suitably aligned.
            unsafe { allocator.construct(first.add(i), i as u32) };
        }

        //  Safety:
        //  -   The 4 elements were initialized above.
        let elements = unsafe { core::slice::from_raw_parts(first.as_ptr(), 4) };

        assert_eq!(&[0, 1, 2, 3], elements);

        //  Safety:
        //  -   `handle` was allocated by `allocator`, for 4 elements, and is still valid.
        unsafe { allocator.deallocate(handle, 4) };
    }

    #[test]
    fn rebind_equal() {
        let store = HeapStore;
        let other = HeapStore;

        let allocator = TypedAllocator::<u8, _>::new(&store);
        let rebound: TypedAllocator<'_, [u64; 3], _> = allocator.rebind();

        assert_eq!(isize::MAX as usize / 24, rebound.max_size());
        assert!(allocator == rebound);
        assert!(rebound == TypedAllocator::<u16, _>::new(&other));
    }
} // mod allocator_tests

// mod inline_slab_tests
