//! Iterators over the live elements of an [`AlignedArray`].
//!
//! All three iterators walk `[front, back)` slot indices and compute each
//! address as `base + index * stride`, so advancing by `n` (`nth`,
//! `nth_back`) and measuring the remaining distance (`len`) are O(1).

use std::fmt;
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::mem::ManuallyDrop;
use std::ptr::{self, NonNull};

use super::raw::RawBlocks;
use super::AlignedArray;

/// Read-only iterator returned by [`AlignedArray::iter`].
pub struct Iter<'a, T> {
    base: NonNull<u8>,
    stride: usize,
    front: usize,
    back: usize,
    _marker: PhantomData<&'a T>,
}

/// Mutable iterator returned by [`AlignedArray::iter_mut`].
pub struct IterMut<'a, T> {
    base: NonNull<u8>,
    stride: usize,
    front: usize,
    back: usize,
    _marker: PhantomData<&'a mut T>,
}

/// Owning iterator returned by `AlignedArray::into_iter`.
///
/// Elements not yielded are dropped together with the buffer.
pub struct IntoIter<T> {
    buf: RawBlocks,
    stride: usize,
    front: usize,
    back: usize,
    _marker: PhantomData<T>,
}

impl<'a, T> Iter<'a, T> {
    pub(super) fn new(array: &'a AlignedArray<T>) -> Self {
        Self {
            base: array.base(),
            stride: array.block_stride(),
            front: 0,
            back: array.len(),
            _marker: PhantomData,
        }
    }

    /// Index of the next element yielded from the front.
    #[inline]
    pub fn position(&self) -> usize {
        self.front
    }

    /// # Safety
    ///
    /// `index` must be a live slot of the borrowed array.
    #[inline]
    unsafe fn slot(&self, index: usize) -> &'a T {
        &*self.base.as_ptr().add(index * self.stride).cast::<T>()
    }
}

impl<'a, T> IterMut<'a, T> {
    pub(super) fn new(array: &'a mut AlignedArray<T>) -> Self {
        Self {
            base: array.base(),
            stride: array.block_stride(),
            front: 0,
            back: array.len(),
            _marker: PhantomData,
        }
    }

    /// Index of the next element yielded from the front.
    #[inline]
    pub fn position(&self) -> usize {
        self.front
    }

    /// # Safety
    ///
    /// `index` must be a live slot of the borrowed array, yielded at most once.
    #[inline]
    unsafe fn slot(&mut self, index: usize) -> &'a mut T {
        &mut *self.base.as_ptr().add(index * self.stride).cast::<T>()
    }
}

impl<T> IntoIter<T> {
    pub(super) fn new(array: AlignedArray<T>) -> Self {
        let array = ManuallyDrop::new(array);
        let stride = array.block_stride();
        let back = array.len();
        // SAFETY: the array is never dropped, so the buffer is moved exactly once.
        let buf = unsafe { ptr::read(array.raw()) };
        Self {
            buf,
            stride,
            front: 0,
            back,
            _marker: PhantomData,
        }
    }

    #[inline]
    fn slot_ptr(&self, index: usize) -> *mut T {
        // SAFETY: index <= capacity, so the offset stays within the allocation.
        unsafe { self.buf.as_ptr().add(index * self.stride).cast::<T>() }
    }
}

macro_rules! slot_iterator {
    ($name:ident, $item:ty) => {
        impl<'a, T> Iterator for $name<'a, T> {
            type Item = $item;

            #[inline]
            fn next(&mut self) -> Option<Self::Item> {
                if self.front == self.back {
                    return None;
                }
                let index = self.front;
                self.front += 1;
                // SAFETY: front < back <= len and each index is yielded once.
                Some(unsafe { self.slot(index) })
            }

            #[inline]
            fn size_hint(&self) -> (usize, Option<usize>) {
                let remaining = self.back - self.front;
                (remaining, Some(remaining))
            }

            #[inline]
            fn nth(&mut self, n: usize) -> Option<Self::Item> {
                self.front = self.front.saturating_add(n).min(self.back);
                self.next()
            }

            #[inline]
            fn count(self) -> usize {
                self.back - self.front
            }
        }

        impl<'a, T> DoubleEndedIterator for $name<'a, T> {
            #[inline]
            fn next_back(&mut self) -> Option<Self::Item> {
                if self.front == self.back {
                    return None;
                }
                self.back -= 1;
                let index = self.back;
                // SAFETY: front <= back < len and each index is yielded once.
                Some(unsafe { self.slot(index) })
            }

            #[inline]
            fn nth_back(&mut self, n: usize) -> Option<Self::Item> {
                self.back = self.back.saturating_sub(n).max(self.front);
                self.next_back()
            }
        }

        impl<'a, T> ExactSizeIterator for $name<'a, T> {}
        impl<'a, T> FusedIterator for $name<'a, T> {}
    };
}

slot_iterator!(Iter, &'a T);
slot_iterator!(IterMut, &'a mut T);

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        if self.front == self.back {
            return None;
        }
        let index = self.front;
        self.front += 1;
        // SAFETY: the slot is live and is moved out exactly once.
        Some(unsafe { ptr::read(self.slot_ptr(index)) })
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    #[inline]
    fn next_back(&mut self) -> Option<T> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        // SAFETY: the slot is live and is moved out exactly once.
        Some(unsafe { ptr::read(self.slot_ptr(self.back)) })
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}
impl<T> FusedIterator for IntoIter<T> {}

impl<T> Drop for IntoIter<T> {
    fn drop(&mut self) {
        while self.back > self.front {
            self.back -= 1;
            // SAFETY: slots in [front, back) are still live.
            unsafe { ptr::drop_in_place(self.slot_ptr(self.back)) };
        }
    }
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self { ..*self }
    }
}

impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<T> fmt::Debug for IterMut<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IterMut")
            .field("front", &self.front)
            .field("back", &self.back)
            .finish()
    }
}

impl<T> fmt::Debug for IntoIter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntoIter")
            .field("front", &self.front)
            .field("back", &self.back)
            .finish()
    }
}

// SAFETY: the iterators behave like `&[T]`, `&mut [T]` and `Vec<T>` iterators.
unsafe impl<T: Sync> Send for Iter<'_, T> {}
unsafe impl<T: Sync> Sync for Iter<'_, T> {}
unsafe impl<T: Send> Send for IterMut<'_, T> {}
unsafe impl<T: Sync> Sync for IterMut<'_, T> {}
unsafe impl<T: Send> Send for IntoIter<T> {}
unsafe impl<T: Sync> Sync for IntoIter<T> {}
