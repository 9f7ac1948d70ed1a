//! Wraps the global allocator to provide a `Store` API.

use core::{alloc::Layout, ptr::NonNull};

use alloc::alloc::{alloc, dealloc};

use crate::interface::{AllocError, Store, StoreSharing};

/// A `Store` over the global allocator.
///
/// All instances draw from the same global heap, hence all instances are sharing with one another.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct HeapStore;

unsafe impl Store for HeapStore {
    type Handle = NonNull<u8>;

    fn dangling(&self) -> Self::Handle {
        NonNull::dangling()
    }

    fn allocate(&self, layout: Layout) -> Result<Self::Handle, AllocError> {
        if layout.size() == 0 {
            //  A well-aligned, non-null, address; never dereferenced for zero-sized blocks.
            return NonNull::new(layout.align() as *mut u8).ok_or(AllocError);
        }

        //  Safety:
        //  -   `layout` has a non-zero size.
        let pointer = unsafe { alloc(layout) };

        NonNull::new(pointer).ok_or(AllocError)
    }

    unsafe fn deallocate(&self, handle: Self::Handle, layout: Layout) {
        if layout.size() == 0 {
            return;
        }

        //  Safety:
        //  -   `handle` was allocated by the global allocator with `layout`, as per the pre-conditions of
        //      `deallocate`.
        //  -   `handle` is still valid, as per the pre-conditions of `deallocate`.
        unsafe { dealloc(handle.as_ptr(), layout) };
    }

    unsafe fn resolve(&self, handle: Self::Handle) -> NonNull<u8> {
        handle
    }
}

//  Safety:
//  -   All instances allocate from, and deallocate to, the one global heap.
unsafe impl StoreSharing for HeapStore {
    fn is_sharing_with(&self, _other: &Self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_deallocate() {
        let store = HeapStore;
        let layout = Layout::new::<u64>();

        let handle = store.allocate(layout).unwrap();

        //  Safety:
        //  -   `handle` was allocated by `store`, and is still valid.
        let pointer = unsafe { store.resolve(handle) };

        assert_eq!(0, pointer.as_ptr() as usize % layout.align());

        //  Safety:
        //  -   `pointer` is valid for writes of a `u64`, and suitably aligned.
        unsafe { pointer.cast::<u64>().as_ptr().write(42) };

        //  Safety:
        //  -   `handle` was allocated by `store`, with `layout`, and is still valid.
        unsafe { store.deallocate(handle, layout) };
    }

    #[test]
    fn allocate_zero_sized() {
        let store = HeapStore;
        let layout = Layout::new::<()>();

        let handle = store.allocate(layout).unwrap();

        assert_eq!(0, handle.as_ptr() as usize % layout.align());

        //  Safety:
        //  -   `handle` was allocated by `store`, with `layout`, and is still valid.
        unsafe { store.deallocate(handle, layout) };
    }

    #[test]
    fn max_count() {
        let store = HeapStore;

        assert_eq!(isize::MAX as usize / 8, store.max_count(Layout::new::<u64>()));
        assert_eq!(usize::MAX, store.max_count(Layout::new::<()>()));
    }

    #[test]
    fn sharing() {
        assert!(HeapStore.is_sharing_with(&HeapStore));
    }
} // mod tests
