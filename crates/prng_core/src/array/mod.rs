//! Fixed-capacity arrays whose elements never share a cache line.
//!
//! [`AlignedArray`] owns one contiguous allocation split into equally sized
//! slots (see [`BlockLayout`]). Elements are constructed in place in the
//! next free slot and dropped individually, so the buffer is allocated once
//! and never moves for the lifetime of the array.
//!
//! # Design Goals
//!
//! - **No false sharing**: slot `i` starts at `base + i * stride`, where the
//!   stride is a whole number of alignment blocks
//! - **Stable addresses**: no reallocation, ever; `push` past capacity panics
//! - **RAII buffer**: the allocation is released by its guard on every exit
//!   path, including panics inside element constructors or destructors
//!
//! # Example
//!
//! ```rust
//! use prng_core::AlignedArray;
//!
//! let mut slots: AlignedArray<[f64; 2]> = AlignedArray::new(3, 64).unwrap();
//! slots.push([1.0, 2.0]);
//! slots.push([3.0, 4.0]);
//!
//! assert_eq!(slots.len(), 2);
//! assert_eq!(slots.capacity(), 3);
//! assert_eq!(slots.at(1).unwrap()[0], 3.0);
//! assert!(slots.at(2).is_err());
//! ```

mod iter;
mod raw;

use std::fmt;
use std::marker::PhantomData;
use std::mem;
use std::ops::{Index, IndexMut};
use std::ptr::{self, NonNull};

use crate::cache_line::cache_alignment;
use crate::error::AlignedArrayError;
use crate::layout::BlockLayout;

pub use iter::{IntoIter, Iter, IterMut};
use raw::RawBlocks;

/// Fixed-capacity container placing every element on its own aligned block.
///
/// # Invariants
///
/// - `len <= capacity`
/// - slots `[0, len)` hold initialised elements, slots `[len, capacity)` are
///   uninitialised
/// - the address of slot `i` is `base + i * block_stride` and is a multiple
///   of `alignment`
///
/// # Thread Safety
///
/// `AlignedArray<T>` is `Send`/`Sync` exactly when `T` is. Disjoint mutable
/// borrows of different slots (for example via [`iter_mut`](Self::iter_mut))
/// may be handed to different threads without any cache line contention.
pub struct AlignedArray<T> {
    buf: RawBlocks,
    block: BlockLayout,
    capacity: usize,
    len: usize,
    _marker: PhantomData<T>,
}

// SAFETY: the array uniquely owns its elements, like Vec<T>.
unsafe impl<T: Send> Send for AlignedArray<T> {}
unsafe impl<T: Sync> Sync for AlignedArray<T> {}

impl<T> AlignedArray<T> {
    /// Creates an empty array with room for `capacity` elements, each slot
    /// aligned to `alignment` bytes.
    ///
    /// # Errors
    ///
    /// - [`AlignedArrayError::InvalidAlignment`] if `alignment` is not a power
    ///   of two, or is smaller than `T`'s alignment or a pointer's size
    /// - [`AlignedArrayError::CapacityOverflow`] if the buffer size overflows
    ///
    /// # Examples
    ///
    /// ```rust
    /// use prng_core::{AlignedArray, AlignedArrayError};
    ///
    /// let array: AlignedArray<u32> = AlignedArray::new(8, 128).unwrap();
    /// assert!(array.is_empty());
    /// assert_eq!(array.alignment(), 128);
    ///
    /// let err = AlignedArray::<u32>::new(8, 96).unwrap_err();
    /// assert!(matches!(err, AlignedArrayError::InvalidAlignment { .. }));
    /// ```
    pub fn new(capacity: usize, alignment: usize) -> Result<Self, AlignedArrayError> {
        let block = BlockLayout::new::<T>(alignment)?;
        let layout = block.buffer_layout(capacity)?;

        Ok(Self {
            buf: RawBlocks::allocate(layout),
            block,
            capacity,
            len: 0,
            _marker: PhantomData,
        })
    }

    /// Creates an empty array aligned to the host cache line size.
    ///
    /// # Errors
    ///
    /// As [`new`](Self::new); the cache line size is always a power of two,
    /// so only over-aligned `T` or an overflowing capacity can fail.
    pub fn with_cache_alignment(capacity: usize) -> Result<Self, AlignedArrayError> {
        Self::new(capacity, cache_alignment().max(BlockLayout::required_alignment::<T>()))
    }

    /// Creates an array with every slot filled with a clone of `value`.
    ///
    /// # Errors
    ///
    /// As [`new`](Self::new).
    pub fn from_elem(capacity: usize, alignment: usize, value: T) -> Result<Self, AlignedArrayError>
    where
        T: Clone,
    {
        let mut array = Self::new(capacity, alignment)?;
        array.fill(value);
        Ok(array)
    }

    /// An empty, buffer-less array with the same slot layout.
    fn empty_like(&self) -> Self {
        Self {
            buf: RawBlocks::dangling(self.block.alignment()),
            block: self.block,
            capacity: 0,
            len: 0,
            _marker: PhantomData,
        }
    }

    // ------------------------------------------------------------------------
    // Capacity
    // ------------------------------------------------------------------------

    /// Returns the number of live elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if there are no live elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns true if every slot holds a live element.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == self.capacity
    }

    /// Returns the fixed number of slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Alias of [`capacity`](Self::capacity); the array never grows.
    #[inline]
    pub fn max_size(&self) -> usize {
        self.capacity
    }

    /// Returns the slot alignment in bytes.
    #[inline]
    pub fn alignment(&self) -> usize {
        self.block.alignment()
    }

    /// Returns the number of bytes between consecutive slots.
    #[inline]
    pub fn block_stride(&self) -> usize {
        self.block.block_stride()
    }

    /// Returns the slot layout.
    #[inline]
    pub fn layout(&self) -> BlockLayout {
        self.block
    }

    // ------------------------------------------------------------------------
    // Construction and destruction of elements
    // ------------------------------------------------------------------------

    /// Constructs a new element in place at the end of the array.
    ///
    /// # Panics
    ///
    /// Panics if the array is full. The array never reallocates.
    pub fn emplace_with<F>(&mut self, f: F) -> &mut T
    where
        F: FnOnce() -> T,
    {
        assert!(
            !self.is_full(),
            "AlignedArray capacity {} exceeded",
            self.capacity
        );
        let slot = self.slot_ptr(self.len);
        // SAFETY: slot len < capacity is inside the buffer and uninitialised.
        unsafe { slot.write(f()) };
        self.len += 1;
        // SAFETY: the slot was initialised just above.
        unsafe { &mut *slot }
    }

    /// Appends `value`.
    ///
    /// # Panics
    ///
    /// Panics if the array is full.
    #[inline]
    pub fn push(&mut self, value: T) -> &mut T {
        self.emplace_with(|| value)
    }

    /// Appends `value`, handing it back if the array is full.
    pub fn try_push(&mut self, value: T) -> Result<&mut T, T> {
        if self.is_full() {
            return Err(value);
        }
        Ok(self.push(value))
    }

    /// Removes and returns the last element, or `None` if empty.
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        // SAFETY: the slot was live and is no longer counted by len.
        Some(unsafe { ptr::read(self.slot_ptr(self.len)) })
    }

    /// Constructs elements from `f` until the array is full.
    pub fn fill_with<F>(&mut self, mut f: F)
    where
        F: FnMut() -> T,
    {
        while !self.is_full() {
            self.emplace_with(&mut f);
        }
    }

    /// Fills every free slot with a clone of `value`.
    pub fn fill(&mut self, value: T)
    where
        T: Clone,
    {
        self.fill_with(|| value.clone());
    }

    /// Drops elements from the back until `len <= new_len`.
    pub fn truncate(&mut self, new_len: usize) {
        while self.len > new_len {
            self.len -= 1;
            // SAFETY: the slot was live; len is decremented first so a
            // panicking destructor can never cause a second drop.
            unsafe { ptr::drop_in_place(self.slot_ptr(self.len)) };
        }
    }

    /// Drops every element, last to first. The buffer is retained.
    #[inline]
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Moves the contents out, leaving `self` empty and buffer-less.
    ///
    /// Element addresses are preserved in the returned array; no element is
    /// moved, cloned or dropped.
    pub fn take(&mut self) -> Self {
        let empty = self.empty_like();
        mem::replace(self, empty)
    }

    /// Exchanges the full state of two arrays in O(1).
    ///
    /// No element is moved, cloned or dropped.
    #[inline]
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }

    // ------------------------------------------------------------------------
    // Element access
    // ------------------------------------------------------------------------

    /// Bounds-checked access.
    ///
    /// # Errors
    ///
    /// Returns [`AlignedArrayError::IndexOutOfRange`] if `index >= len`.
    pub fn at(&self, index: usize) -> Result<&T, AlignedArrayError> {
        self.get(index).ok_or(AlignedArrayError::IndexOutOfRange {
            index,
            len: self.len,
        })
    }

    /// Bounds-checked mutable access.
    ///
    /// # Errors
    ///
    /// Returns [`AlignedArrayError::IndexOutOfRange`] if `index >= len`.
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T, AlignedArrayError> {
        let len = self.len;
        self.get_mut(index)
            .ok_or(AlignedArrayError::IndexOutOfRange { index, len })
    }

    /// Returns the element at `index`, or `None` if out of range.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        if index < self.len {
            // SAFETY: index is a live slot.
            Some(unsafe { self.get_unchecked(index) })
        } else {
            None
        }
    }

    /// Returns the element at `index` mutably, or `None` if out of range.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index < self.len {
            // SAFETY: index is a live slot.
            Some(unsafe { self.get_unchecked_mut(index) })
        } else {
            None
        }
    }

    /// Unchecked access.
    ///
    /// # Safety
    ///
    /// `index` must be less than [`len`](Self::len).
    #[inline]
    pub unsafe fn get_unchecked(&self, index: usize) -> &T {
        debug_assert!(index < self.len);
        &*self.slot_ptr(index)
    }

    /// Unchecked mutable access.
    ///
    /// # Safety
    ///
    /// `index` must be less than [`len`](Self::len).
    #[inline]
    pub unsafe fn get_unchecked_mut(&mut self, index: usize) -> &mut T {
        debug_assert!(index < self.len);
        &mut *self.slot_ptr(index)
    }

    /// Returns the first element, or `None` if empty.
    #[inline]
    pub fn front(&self) -> Option<&T> {
        self.get(0)
    }

    /// Returns the first element mutably, or `None` if empty.
    #[inline]
    pub fn front_mut(&mut self) -> Option<&mut T> {
        self.get_mut(0)
    }

    /// Returns the last element, or `None` if empty.
    #[inline]
    pub fn back(&self) -> Option<&T> {
        self.len.checked_sub(1).and_then(|last| self.get(last))
    }

    /// Returns the last element mutably, or `None` if empty.
    #[inline]
    pub fn back_mut(&mut self) -> Option<&mut T> {
        match self.len.checked_sub(1) {
            Some(last) => self.get_mut(last),
            None => None,
        }
    }

    /// Iterates over the live elements.
    #[inline]
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self)
    }

    /// Iterates mutably over the live elements.
    ///
    /// The yielded references are disjoint and may be sent to different
    /// threads.
    #[inline]
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut::new(self)
    }

    // ------------------------------------------------------------------------
    // Raw slot addressing
    // ------------------------------------------------------------------------

    /// Address of slot `index`; valid for `index <= capacity`.
    #[inline]
    fn slot_ptr(&self, index: usize) -> *mut T {
        debug_assert!(index <= self.capacity);
        // SAFETY: offset_of(index) <= capacity * stride stays within (or one
        // past) the allocation.
        unsafe { self.buf.as_ptr().add(self.block.offset_of(index)).cast::<T>() }
    }

    #[inline]
    fn base(&self) -> NonNull<u8> {
        // SAFETY: RawBlocks never holds a null pointer.
        unsafe { NonNull::new_unchecked(self.buf.as_ptr()) }
    }

    #[inline]
    fn raw(&self) -> &RawBlocks {
        &self.buf
    }
}

impl<T> Drop for AlignedArray<T> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T: Clone> Clone for AlignedArray<T> {
    /// Allocates a fresh buffer and clones each live element into it, in
    /// order. Raw bytes are never copied.
    fn clone(&self) -> Self {
        let mut out = Self {
            buf: RawBlocks::allocate(self.buf.layout()),
            block: self.block,
            capacity: self.capacity,
            len: 0,
            _marker: PhantomData,
        };
        for item in self.iter() {
            out.push(item.clone());
        }
        out
    }

    /// Drops the current elements and frees the current buffer before
    /// cloning `source`.
    fn clone_from(&mut self, source: &Self) {
        self.clear();
        drop(self.take());
        *self = source.clone();
    }
}

impl<T> Index<usize> for AlignedArray<T> {
    type Output = T;

    /// # Panics
    ///
    /// Panics if `index >= len`.
    #[inline]
    fn index(&self, index: usize) -> &T {
        match self.get(index) {
            Some(item) => item,
            None => panic!(
                "index {} out of range for AlignedArray of length {}",
                index, self.len
            ),
        }
    }
}

impl<T> IndexMut<usize> for AlignedArray<T> {
    /// # Panics
    ///
    /// Panics if `index >= len`.
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut T {
        let len = self.len;
        match self.get_mut(index) {
            Some(item) => item,
            None => panic!(
                "index {} out of range for AlignedArray of length {}",
                index, len
            ),
        }
    }
}

impl<'a, T> IntoIterator for &'a AlignedArray<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut AlignedArray<T> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T> IntoIterator for AlignedArray<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self)
    }
}

impl<T: fmt::Debug> fmt::Debug for AlignedArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq> PartialEq for AlignedArray<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for AlignedArray<T> {}
