//! The `Store` trait itself, the API for allocation used by the collections of this crate.

use core::{alloc::Layout, error, fmt, ptr::NonNull};

/// The error returned when a `Store` cannot satisfy an allocation request.
///
/// Either the memory is exhausted, or the requested layout does not meet the store's size and alignment constraints.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct AllocError;

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("memory allocation failed")
    }
}

impl error::Error for AllocError {}

/// A trait abstracting memory storage.
///
/// This trait returns handles to allocated memory, which can be freely copied and stored, then resolved into actual
/// pointers at a later time.
///
/// #   Safety
///
/// Only valid handles may be safely resolved. When a handle is invalidated, all its copies are also invalidated at the
/// same time, and all pointers resolved from the handle or any of its copies are invalidated as well.
///
/// Invalidation:
///
/// -   A handle is immediately invalidated when used as an argument to the `Store::deallocate` method.
/// -   Allocating NEVER invalidates existing handles.
///
/// Pointers resolved from a valid handle remain valid for as long as the handle is valid and the store is not moved.
pub unsafe trait Store {
    /// A Handle to memory allocated by the instance of Store which creates it.
    type Handle: Copy + Eq;

    /// Returns a dangling handle, which may never be resolved.
    fn dangling(&self) -> Self::Handle;

    /// Attempts to allocate a block of memory.
    ///
    /// On success, returns a `Handle` to a block of memory meeting the size and alignment guarantees of `Layout`.
    ///
    /// #   Errors
    ///
    /// Returning `Err` indicates that either the memory is exhausted, or `layout` does not meet the store's size and
    /// alignment constraints.
    fn allocate(&self, layout: Layout) -> Result<Self::Handle, AllocError>;

    /// Deallocates the memory referenced by `handle`.
    ///
    /// #   Safety
    ///
    /// -   `handle` must have been allocated by `self`.
    /// -   `handle` must still be valid.
    /// -   `layout` must fit the associated block of memory.
    unsafe fn deallocate(&self, handle: Self::Handle, layout: Layout);

    /// Resolves the `handle` into a pointer to the first byte of allocated memory.
    ///
    /// #   Safety
    ///
    /// -   `handle` must have been allocated by `self`.
    /// -   `handle` must still be valid.
    /// -   The block of memory associated to the handle is only valid for as long as the `handle` is valid itself.
    unsafe fn resolve(&self, handle: Self::Handle) -> NonNull<u8>;

    /// Returns the maximum number of blocks fitting `layout` that this store could ever hand out.
    ///
    /// This is an upper bound, not a promise: an allocation may still fail before the bound is reached.
    fn max_count(&self, layout: Layout) -> usize {
        let size = layout.pad_to_align().size();

        if size == 0 {
            return usize::MAX;
        }

        isize::MAX as usize / size
    }
}

/// A refinement of `Store` which may share its memory with other instances.
///
/// #   Safety
///
/// Implementers of this trait must guarantee that if `a.is_sharing_with(&b)` then any handle allocated by `a` may be
/// resolved and deallocated by `b`, and vice-versa, for as long as both live.
///
/// `is_sharing_with` must be reflexive and symmetric.
pub unsafe trait StoreSharing: Store {
    /// Returns whether `self` and `other` share the same memory.
    fn is_sharing_with(&self, other: &Self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_error_display() {
        assert_eq!("memory allocation failed", AllocError.to_string());
    }
} // mod tests
