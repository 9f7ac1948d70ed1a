//! Typed handle, for bonus type safety.

use core::{fmt, marker::PhantomData, ptr::NonNull};

use crate::interface::Store;

/// Arbitrary typed handle, for type safety.
///
/// A typed handle may be invalid, either because it was created dangling, or because it became invalid following an
/// operation on the store that allocated it. It is the responsibility of the user to ensure that the typed handle
/// is valid when necessary.
pub struct TypedHandle<T, H> {
    handle: H,
    _marker: PhantomData<fn() -> T>,
}

impl<T, H: Copy> TypedHandle<T, H> {
    /// Creates a typed handle from a raw handle.
    ///
    /// If `handle` is valid, and associated to a block of memory which fits an instance of `T`, then the resulting
    /// typed handle is valid, otherwise it is invalid.
    #[inline(always)]
    pub const fn from_raw(handle: H) -> Self {
        Self {
            handle,
            _marker: PhantomData,
        }
    }

    /// Returns the raw handle.
    #[inline(always)]
    pub fn to_raw(self) -> H {
        self.handle
    }

    /// Resolves the handle to a pointer.
    ///
    /// #   Safety
    ///
    /// -   `self` must have been allocated by `store`.
    /// -   `self` must still be valid.
    /// -   The resulting pointer is only valid for as long as `self` is valid, and `store` is not moved.
    #[inline(always)]
    pub unsafe fn resolve_raw<S>(self, store: &S) -> NonNull<T>
    where
        S: Store<Handle = H>,
    {
        //  Safety:
        //  -   `self.handle` was allocated by `store`, as per pre-conditions.
        //  -   `self.handle` is still valid, as per pre-conditions.
        let pointer = unsafe { store.resolve(self.handle) };

        pointer.cast()
    }
}

impl<T, H: Copy> Clone for TypedHandle<T, H> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, H: Copy> Copy for TypedHandle<T, H> {}

impl<T, H: PartialEq> PartialEq for TypedHandle<T, H> {
    fn eq(&self, other: &Self) -> bool {
        self.handle == other.handle
    }
}

impl<T, H: Eq> Eq for TypedHandle<T, H> {}

impl<T, H: fmt::Debug> fmt::Debug for TypedHandle<T, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        f.debug_tuple("TypedHandle").field(&self.handle).finish()
    }
}

#[cfg(test)]
mod tests {
    use core::alloc::Layout;

    use super::*;

    use crate::store::InlineSlabStore;

    type TestStore = InlineSlabStore<u8, u64, 2>;

    #[test]
    fn raw_round_trip() {
        let store = TestStore::default();

        let raw = store.allocate(Layout::new::<u32>()).unwrap();
        let handle = TypedHandle::<u32, u8>::from_raw(raw);

        assert_eq!(raw, handle.to_raw());
        assert_eq!(TypedHandle::from_raw(raw), handle);
        assert_ne!(TypedHandle::from_raw(store.dangling()), handle);
    }

    #[test]
    fn resolve_raw() {
        let store = TestStore::default();

        let first = TypedHandle::<u32, u8>::from_raw(store.allocate(Layout::new::<u32>()).unwrap());
        let second = TypedHandle::<u32, u8>::from_raw(store.allocate(Layout::new::<u32>()).unwrap());

        //  Safety:
        //  -   `first` and `second` were allocated by `store`, and are still valid.
        let (a, b) = unsafe { (first.resolve_raw(&store), second.resolve_raw(&store)) };

        assert_ne!(a, b);

        //  Safety:
        //  -   `a` and `b` are valid for writes and reads of a `u32`, and suitably aligned.
        unsafe {
            a.as_ptr().write(7);
            b.as_ptr().write(8);

            assert_eq!(7, a.as_ptr().read());
        }
    }
} // mod tests
