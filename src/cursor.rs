//! Cursor categories, and the algorithms dispatching on them.
//!
//! A cursor designates a position in a sequence, possibly the past-the-end position. Unlike an `Iterator`, a cursor
//! does not know where the sequence ends: ranges are expressed as a half-open pair of cursors, `[first, last)`.
//!
//! Cursors are classified by capability, each category refining the previous one:
//!
//! -   `InputTag`: may be dereferenced and stepped forward.
//! -   `ForwardTag`: may additionally be copied and stepped over the same range repeatedly.
//! -   `BidirectionalTag`: may additionally be stepped backward.
//! -   `RandomAccessTag`: may additionally jump by an arbitrary offset, and measure a distance in O(1).
//!
//! Algorithms, such as `distance`, dispatch on the category at compile-time to select the most efficient variant.

use core::{cmp, fmt, ptr};

/// Category of cursors which may only be dereferenced and stepped forward.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct InputTag;

/// Category of cursors which may be stepped forward over the same range repeatedly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ForwardTag;

/// Category of cursors which may be stepped forward and backward.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct BidirectionalTag;

/// Category of cursors which may jump by an arbitrary offset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct RandomAccessTag;

/// The algorithms specialized per category.
///
/// Implemented by each category tag, for each cursor type which supports the category.
pub trait CursorCategory<C: ?Sized> {
    /// Returns the number of steps from `first` to `last`.
    ///
    /// `last` must be reachable from `first`.
    fn distance(first: &C, last: &C) -> usize;
}

/// A cursor which may be dereferenced, and stepped forward.
pub trait InputCursor: Clone + PartialEq {
    /// The element designated by the cursor.
    type Item;

    /// The finest category this cursor satisfies.
    type Category;

    /// Returns the element designated by the cursor.
    ///
    /// #   Panics
    ///
    /// May panic if the cursor is past-the-end.
    fn get(&self) -> Self::Item;

    /// Steps to the next position.
    fn step(&mut self);
}

/// A cursor which may be stepped forward over the same range repeatedly.
pub trait ForwardCursor: InputCursor {}

/// A cursor which may be stepped forward and backward.
pub trait BidirectionalCursor: ForwardCursor {
    /// Steps to the previous position.
    fn step_back(&mut self);
}

/// A cursor which may jump by an arbitrary offset.
pub trait RandomAccessCursor: BidirectionalCursor {
    /// Jumps by `offset` positions, forward if positive and backward if negative.
    fn offset(&mut self, offset: isize);

    /// Returns the signed number of steps from `self` to `other`.
    fn distance_to(&self, other: &Self) -> isize;
}

impl<C: InputCursor> CursorCategory<C> for InputTag {
    fn distance(first: &C, last: &C) -> usize {
        walk(first, last)
    }
}

impl<C: ForwardCursor> CursorCategory<C> for ForwardTag {
    fn distance(first: &C, last: &C) -> usize {
        walk(first, last)
    }
}

impl<C: BidirectionalCursor> CursorCategory<C> for BidirectionalTag {
    fn distance(first: &C, last: &C) -> usize {
        walk(first, last)
    }
}

impl<C: RandomAccessCursor> CursorCategory<C> for RandomAccessTag {
    fn distance(first: &C, last: &C) -> usize {
        let distance = first.distance_to(last);

        debug_assert!(distance >= 0, "`last` is not reachable from `first`");

        distance as usize
    }
}

/// Returns the number of steps from `first` to `last`.
///
/// O(1) for random-access cursors, O(n) otherwise. `last` must be reachable from `first`.
pub fn distance<C>(first: &C, last: &C) -> usize
where
    C: InputCursor,
    C::Category: CursorCategory<C>,
{
    <C::Category as CursorCategory<C>>::distance(first, last)
}

/// Returns whether the range `[first1, last1)` is lexicographically less than the range `[first2, last2)`.
pub fn lexicographical_compare<C1, C2>(mut first1: C1, last1: C1, mut first2: C2, last2: C2) -> bool
where
    C1: InputCursor,
    C2: InputCursor<Item = C1::Item>,
    C1::Item: PartialOrd,
{
    while first1 != last1 && first2 != last2 {
        let (left, right) = (first1.get(), first2.get());

        if left < right {
            return true;
        }

        if right < left {
            return false;
        }

        first1.step();
        first2.step();
    }

    first1 == last1 && first2 != last2
}

/// A cursor walking its base cursor backward.
///
/// Dereferencing a `Reverse` yields the element immediately _before_ its base, so that the reversed range of
/// `[first, last)` is `[Reverse::new(last), Reverse::new(first))`, yielding `last - 1` down to `first`.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Reverse<C> {
    base: C,
}

impl<C> Reverse<C> {
    /// Creates a cursor walking `base` backward.
    pub const fn new(base: C) -> Self {
        Self { base }
    }

    /// Returns the underlying cursor.
    pub fn base(&self) -> C
    where
        C: Clone,
    {
        self.base.clone()
    }

    /// Returns the underlying cursor.
    pub fn into_base(self) -> C {
        self.base
    }
}

impl<C: BidirectionalCursor> InputCursor for Reverse<C> {
    type Item = C::Item;
    type Category = C::Category;

    fn get(&self) -> Self::Item {
        let mut previous = self.base.clone();
        previous.step_back();

        previous.get()
    }

    fn step(&mut self) {
        self.base.step_back();
    }
}

impl<C: BidirectionalCursor> ForwardCursor for Reverse<C> {}

impl<C: BidirectionalCursor> BidirectionalCursor for Reverse<C> {
    fn step_back(&mut self) {
        self.base.step();
    }
}

impl<C: RandomAccessCursor> RandomAccessCursor for Reverse<C> {
    fn offset(&mut self, offset: isize) {
        self.base.offset(-offset);
    }

    fn distance_to(&self, other: &Self) -> isize {
        other.base.distance_to(&self.base)
    }
}

//  The further along a reversed range, the further back the base.
impl<C: PartialOrd> PartialOrd for Reverse<C> {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        other.base.partial_cmp(&self.base)
    }
}

impl<C: Ord> Ord for Reverse<C> {
    fn cmp(&self, other: &Self) -> cmp::Ordering {
        other.base.cmp(&self.base)
    }
}

impl<C: fmt::Debug> fmt::Debug for Reverse<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        f.debug_tuple("Reverse").field(&self.base).finish()
    }
}

/// A random-access cursor over a slice.
pub struct SliceCursor<'a, T> {
    slice: &'a [T],
    //  In `0..=slice.len()`.
    index: usize,
}

impl<'a, T> SliceCursor<'a, T> {
    /// Returns the cursors to the first element, and past the last element, of `slice`.
    pub fn range(slice: &'a [T]) -> (Self, Self) {
        (Self::begin(slice), Self::end(slice))
    }

    /// Returns a cursor to the first element of `slice`.
    pub const fn begin(slice: &'a [T]) -> Self {
        Self { slice, index: 0 }
    }

    /// Returns a cursor past the last element of `slice`.
    pub const fn end(slice: &'a [T]) -> Self {
        Self {
            slice,
            index: slice.len(),
        }
    }

    /// Returns the index of the element designated by the cursor.
    pub const fn index(&self) -> usize {
        self.index
    }
}

impl<T> Clone for SliceCursor<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for SliceCursor<'_, T> {}

//  Cursors into different slices never compare equal, even if the slices do.
impl<T> PartialEq for SliceCursor<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.slice, other.slice) && self.index == other.index
    }
}

impl<T> Eq for SliceCursor<'_, T> {}

impl<T> PartialOrd for SliceCursor<'_, T> {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        ptr::eq(self.slice, other.slice).then(|| self.index.cmp(&other.index))
    }
}

impl<T> fmt::Debug for SliceCursor<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        f.debug_struct("SliceCursor")
            .field("index", &self.index)
            .field("len", &self.slice.len())
            .finish()
    }
}

impl<'a, T> InputCursor for SliceCursor<'a, T> {
    type Item = &'a T;
    type Category = RandomAccessTag;

    fn get(&self) -> &'a T {
        &self.slice[self.index]
    }

    fn step(&mut self) {
        debug_assert!(self.index < self.slice.len());

        self.index += 1;
    }
}

impl<T> ForwardCursor for SliceCursor<'_, T> {}

impl<T> BidirectionalCursor for SliceCursor<'_, T> {
    fn step_back(&mut self) {
        debug_assert!(self.index > 0);

        self.index -= 1;
    }
}

impl<T> RandomAccessCursor for SliceCursor<'_, T> {
    fn offset(&mut self, offset: isize) {
        let index = self.index.checked_add_signed(offset);

        debug_assert!(index.is_some_and(|index| index <= self.slice.len()));

        self.index = index.unwrap_or(self.index);
    }

    fn distance_to(&self, other: &Self) -> isize {
        other.index as isize - self.index as isize
    }
}

//
//  Implementation
//

fn walk<C: InputCursor>(first: &C, last: &C) -> usize {
    let mut first = first.clone();
    let mut result = 0;

    while first != *last {
        first.step();
        result += 1;
    }

    result
}

#[cfg(test)]
mod tests {
    use core::cell::Cell;

    use super::*;

    //  A forward-only cursor over a slice, counting its steps.
    #[derive(Clone)]
    struct CountingCursor<'a> {
        inner: SliceCursor<'a, i32>,
        steps: &'a Cell<usize>,
    }

    impl PartialEq for CountingCursor<'_> {
        fn eq(&self, other: &Self) -> bool {
            self.inner == other.inner
        }
    }

    impl<'a> InputCursor for CountingCursor<'a> {
        type Item = &'a i32;
        type Category = ForwardTag;

        fn get(&self) -> &'a i32 {
            self.inner.get()
        }

        fn step(&mut self) {
            self.steps.set(self.steps.get() + 1);
            self.inner.step();
        }
    }

    impl ForwardCursor for CountingCursor<'_> {}

    #[test]
    fn distance_random_access() {
        let array = [1, 2, 3, 4, 5];
        let (first, last) = SliceCursor::range(&array);

        assert_eq!(5, distance(&first, &last));
        assert_eq!(0, distance(&last, &last));
    }

    #[test]
    fn distance_forward_walks() {
        let array = [1, 2, 3, 4, 5];
        let steps = Cell::new(0);

        let first = CountingCursor {
            inner: SliceCursor::begin(&array),
            steps: &steps,
        };
        let last = CountingCursor {
            inner: SliceCursor::end(&array),
            steps: &steps,
        };

        assert_eq!(5, distance(&first, &last));
        assert_eq!(5, steps.get());
    }

    #[test]
    fn reverse_dereferences_previous() {
        let array = [1, 2, 3];
        let (first, last) = SliceCursor::range(&array);

        let mut cursor = Reverse::new(last);
        let end = Reverse::new(first);

        let mut collected = Vec::new();

        while cursor != end {
            collected.push(*cursor.get());
            cursor.step();
        }

        assert_eq!(vec![3, 2, 1], collected);
        assert_eq!(first, cursor.base());
    }

    #[test]
    fn reverse_random_access() {
        let array = [1, 2, 3, 4];
        let (first, last) = SliceCursor::range(&array);

        let (rfirst, rlast) = (Reverse::new(last), Reverse::new(first));

        assert_eq!(4, distance(&rfirst, &rlast));
        assert!(rfirst < rlast);

        let mut cursor = rfirst;
        cursor.offset(2);

        assert_eq!(2, *cursor.get());
        assert_eq!(2, rfirst.distance_to(&cursor));

        cursor.step_back();

        assert_eq!(3, *cursor.get());
    }

    #[test]
    fn slice_cursor_identity() {
        let one = [1, 2];
        let two = [1, 2];

        assert_ne!(SliceCursor::begin(&one), SliceCursor::begin(&two));
        assert_eq!(None, SliceCursor::begin(&one).partial_cmp(&SliceCursor::begin(&two)));
        assert!(SliceCursor::begin(&one) < SliceCursor::end(&one));
    }

    #[test]
    fn lexicographical() {
        let short = [1, 2];
        let long = [1, 2, 3];
        let high = [1, 3];

        let less = |a: &[i32], b: &[i32]| {
            let (first1, last1) = SliceCursor::range(a);
            let (first2, last2) = SliceCursor::range(b);

            lexicographical_compare(first1, last1, first2, last2)
        };

        assert!(less(&short, &long));
        assert!(!less(&long, &short));
        assert!(less(&long, &high));
        assert!(!less(&high, &long));
        assert!(!less(&short, &short));
        assert!(less(&[], &short));
        assert!(!less(&[], &[]));
    }
} // mod tests
