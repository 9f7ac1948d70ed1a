//! A dead simple "slab allocator" Store.
//!
//! This store is suitable for node-based containers -- such as `List` -- whose blocks are all of (about) the same size.
//! It is not sharing, hence operations moving nodes between two containers -- such as `List::append` or
//! `List::merge` -- are not available, although operations moving nodes within a container are.

use core::{
    alloc::Layout,
    array,
    cell::{Cell, UnsafeCell},
    fmt,
    marker::PhantomData,
    mem::{self, MaybeUninit},
    ptr::NonNull,
};

use crate::interface::{AllocError, Store};

/// An implementation of `Store` providing `N` inline slots.
///
/// Generic parameters:
///
/// -   `H` is the handle type, it must be convertible to and from `usize`, and able to represent `N`.
/// -   Each slot is aligned and sized as per `T`; a block fits in a slot if its layout fits `T`'s.
/// -   `N` is the number of slots.
pub struct InlineSlabStore<H, T, const N: usize> {
    //  Number of slots ever handed out; slots in `watermark..N` have never been used.
    watermark: Cell<usize>,
    //  Head of the chain of released slots, `N` if none.
    free: Cell<usize>,
    //  For each released slot, the next released slot, `N` if none.
    next_free: [Cell<usize>; N],
    slots: UnsafeCell<MaybeUninit<[T; N]>>,
    _marker: PhantomData<H>,
}

impl<H, T, const N: usize> InlineSlabStore<H, T, N>
where
    H: TryFrom<usize>,
{
    /// Creates a new, empty, instance.
    ///
    /// #   Errors
    ///
    /// Returns an error if `N` cannot be represented by `H`, as `N` is used as the dangling handle.
    pub fn new() -> Result<Self, AllocError> {
        let _ = Self::from_index(N)?;

        let watermark = Cell::new(0);
        let free = Cell::new(N);
        let next_free = array::from_fn(|_| Cell::new(N));
        let slots = UnsafeCell::new(MaybeUninit::uninit());
        let _marker = PhantomData;

        Ok(Self {
            watermark,
            free,
            next_free,
            slots,
            _marker,
        })
    }
}

impl<H, T, const N: usize> InlineSlabStore<H, T, N> {
    /// Returns the number of slots currently handed out.
    pub fn in_use(&self) -> usize {
        let mut released = 0;
        let mut index = self.free.get();

        while index < N {
            released += 1;
            index = self.next_free[index].get();
        }

        self.watermark.get() - released
    }

    /// Returns the total number of slots.
    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<H, T, const N: usize> Default for InlineSlabStore<H, T, N>
where
    H: TryFrom<usize>,
{
    fn default() -> Self {
        Self::new().unwrap_or_else(|_| panic!("{N} slots to be representable by the handle type"))
    }
}

unsafe impl<H, T, const N: usize> Store for InlineSlabStore<H, T, N>
where
    H: Copy + Eq + TryFrom<usize> + TryInto<usize>,
{
    type Handle = H;

    fn dangling(&self) -> Self::Handle {
        //  Checked on construction.
        Self::into_handle(N)
    }

    fn allocate(&self, layout: Layout) -> Result<Self::Handle, AllocError> {
        if !Self::fits(layout) {
            return Err(AllocError);
        }

        let free = self.free.get();

        if free < N {
            self.free.set(self.next_free[free].get());

            return Self::from_index(free);
        }

        let watermark = self.watermark.get();

        if watermark == N {
            log::debug!("inline slab store exhausted, all {N} slots in use");

            return Err(AllocError);
        }

        self.watermark.set(watermark + 1);

        Self::from_index(watermark)
    }

    unsafe fn deallocate(&self, handle: Self::Handle, _layout: Layout) {
        let index = Self::into_index(handle);

        debug_assert!(index < self.watermark.get());

        self.next_free[index].set(self.free.get());
        self.free.set(index);
    }

    #[inline(always)]
    unsafe fn resolve(&self, handle: Self::Handle) -> NonNull<u8> {
        let index = Self::into_index(handle);

        debug_assert!(index < N);

        let pointer = self.slots.get() as *mut T;

        //  Safety:
        //  -   `index` is within bounds of `self.slots`, as `handle` was allocated by `self` as per pre-conditions.
        let pointer = unsafe { pointer.add(index) };

        //  Safety:
        //  -   `pointer` is non null as `self` is non null.
        unsafe { NonNull::new_unchecked(pointer as *mut u8) }
    }

    fn max_count(&self, layout: Layout) -> usize {
        if Self::fits(layout) {
            N
        } else {
            0
        }
    }
}

impl<H, T, const N: usize> fmt::Debug for InlineSlabStore<H, T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        let layout = Layout::new::<T>();

        f.debug_struct("InlineSlabStore")
            .field("size", &layout.size())
            .field("align", &layout.align())
            .field("capacity", &N)
            .field("in_use", &self.in_use())
            .finish()
    }
}

//
//  Implementation
//

impl<H, T, const N: usize> InlineSlabStore<H, T, N> {
    #[inline(always)]
    fn fits(layout: Layout) -> bool {
        layout.size() <= mem::size_of::<T>() && layout.align() <= mem::align_of::<T>()
    }
}

impl<H, T, const N: usize> InlineSlabStore<H, T, N>
where
    H: TryFrom<usize>,
{
    #[inline(always)]
    fn from_index(index: usize) -> Result<H, AllocError> {
        debug_assert!(index <= N);

        index.try_into().map_err(|_| AllocError)
    }

    #[inline(always)]
    fn into_handle(index: usize) -> H {
        let handle = Self::from_index(index);

        debug_assert!(handle.is_ok());

        //  Safety:
        //  -   Every index up to `N` included is representable, as checked on construction.
        unsafe { handle.unwrap_unchecked() }
    }
}

impl<H, T, const N: usize> InlineSlabStore<H, T, N>
where
    H: TryInto<usize>,
{
    #[inline(always)]
    fn into_index(handle: H) -> usize {
        let index = handle.try_into();

        debug_assert!(index.is_ok());

        //  Safety:
        //  -   `handle` was created from `usize`, hence converting back always succeeds.
        unsafe { index.unwrap_unchecked() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestStore = InlineSlabStore<u8, [u64; 2], 3>;

    #[test]
    fn new_unrepresentable() {
        assert_eq!(AllocError, InlineSlabStore::<u8, u64, 256>::new().unwrap_err());
        assert!(InlineSlabStore::<u8, u64, 255>::new().is_ok());
    }

    #[test]
    fn allocate_until_exhausted() {
        let store = TestStore::default();
        let layout = Layout::new::<u64>();

        let handles: Vec<_> = (0..3).map(|_| store.allocate(layout).unwrap()).collect();

        assert_eq!(vec![0, 1, 2], handles);
        assert_eq!(3, store.in_use());
        assert_eq!(Err(AllocError), store.allocate(layout));
        assert_eq!(3, store.dangling());
    }

    #[test]
    fn allocate_too_large() {
        let store = TestStore::default();

        assert_eq!(Err(AllocError), store.allocate(Layout::new::<[u64; 3]>()));
        assert_eq!(Err(AllocError), store.allocate(Layout::from_size_align(8, 32).unwrap()));

        assert_eq!(0, store.max_count(Layout::new::<[u64; 3]>()));
        assert_eq!(3, store.max_count(Layout::new::<[u64; 2]>()));
    }

    #[test]
    fn deallocate_reuses() {
        let store = TestStore::default();
        let layout = Layout::new::<u64>();

        let a = store.allocate(layout).unwrap();
        let b = store.allocate(layout).unwrap();

        //  Safety:
        //  -   `a` was allocated by `store`, and is still valid.
        unsafe { store.deallocate(a, layout) };

        assert_eq!(1, store.in_use());

        let c = store.allocate(layout).unwrap();

        assert_eq!(a, c);
        assert_ne!(b, c);
        assert_eq!(2, store.in_use());
    }

    #[test]
    fn resolve_distinct() {
        let store = TestStore::default();
        let layout = Layout::new::<u64>();

        let a = store.allocate(layout).unwrap();
        let b = store.allocate(layout).unwrap();

        //  Safety:
        //  -   `a` and `b` were allocated by `store`, and are still valid.
        let (pa, pb) = unsafe { (store.resolve(a), store.resolve(b)) };

        assert_eq!(16, pb.as_ptr() as usize - pa.as_ptr() as usize);
    }
} // mod tests
