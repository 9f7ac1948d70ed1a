use core::{alloc::Layout, cell::Cell, ptr::NonNull};

use std::rc::Rc;

use crate::{
    interface::{AllocError, Store, StoreSharing},
    store::HeapStore,
};

#[derive(Debug, Default)]
struct Counters {
    allocations: Cell<usize>,
    deallocations: Cell<usize>,
    //  Number of further allocations to succeed, unlimited if `None`.
    limit: Cell<Option<usize>>,
}

/// A heap store counting its allocations, and optionally failing them.
///
/// Clones share their counters, and are sharing with one another.
#[derive(Clone, Debug, Default)]
pub(crate) struct CountingStore {
    counters: Rc<Counters>,
}

impl CountingStore {
    pub(crate) fn allocations(&self) -> usize {
        self.counters.allocations.get()
    }

    pub(crate) fn deallocations(&self) -> usize {
        self.counters.deallocations.get()
    }

    pub(crate) fn live(&self) -> usize {
        self.allocations() - self.deallocations()
    }

    //  Only `remaining` further allocations succeed.
    pub(crate) fn limit(&self, remaining: usize) {
        self.counters.limit.set(Some(remaining));
    }
}

unsafe impl Store for CountingStore {
    type Handle = NonNull<u8>;

    fn dangling(&self) -> Self::Handle {
        HeapStore.dangling()
    }

    fn allocate(&self, layout: Layout) -> Result<Self::Handle, AllocError> {
        let counters = &self.counters;

        if let Some(remaining) = counters.limit.get() {
            if remaining == 0 {
                return Err(AllocError);
            }

            counters.limit.set(Some(remaining - 1));
        }

        let handle = HeapStore.allocate(layout)?;

        counters.allocations.set(counters.allocations.get() + 1);

        Ok(handle)
    }

    unsafe fn deallocate(&self, handle: Self::Handle, layout: Layout) {
        //  Safety:
        //  -   `handle` was allocated by a `HeapStore`, with `layout`, as per pre-conditions.
        unsafe { HeapStore.deallocate(handle, layout) };

        let counters = &self.counters;

        counters.deallocations.set(counters.deallocations.get() + 1);
    }

    unsafe fn resolve(&self, handle: Self::Handle) -> NonNull<u8> {
        //  Safety:
        //  -   `handle` was allocated by a `HeapStore`, and is still valid, as per pre-conditions.
        unsafe { HeapStore.resolve(handle) }
    }
}

//  Safety:
//  -   All instances allocate from the global heap, only the counters differ.
unsafe impl StoreSharing for CountingStore {
    fn is_sharing_with(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.counters, &other.counters)
    }
}
