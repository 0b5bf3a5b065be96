//! Owned raw buffer backing an aligned array.

use std::alloc::{self, Layout};
use std::ptr::NonNull;

/// A single aligned allocation, released when dropped.
///
/// The allocation origin is the first slot, so deallocation needs only the
/// stored [`Layout`]. Zero-sized layouts never touch the allocator; they hold
/// a dangling pointer carrying the requested alignment.
pub(crate) struct RawBlocks {
    ptr: NonNull<u8>,
    layout: Layout,
}

impl RawBlocks {
    /// Allocates a buffer for `layout`, aborting via
    /// [`alloc::handle_alloc_error`] on allocator failure.
    pub(crate) fn allocate(layout: Layout) -> Self {
        if layout.size() == 0 {
            return Self::dangling(layout.align());
        }

        // SAFETY: layout has a non-zero size.
        let raw = unsafe { alloc::alloc(layout) };
        let ptr = NonNull::new(raw).unwrap_or_else(|| alloc::handle_alloc_error(layout));
        Self { ptr, layout }
    }

    /// An empty buffer whose pointer is aligned to `align`.
    pub(crate) fn dangling(align: usize) -> Self {
        debug_assert!(align.is_power_of_two());
        // SAFETY: a power of two is never zero, and the pointer is never
        // dereferenced because the buffer has no bytes.
        let ptr = unsafe { NonNull::new_unchecked(align as *mut u8) };
        // SAFETY: size 0 with a power-of-two alignment is always valid.
        let layout = unsafe { Layout::from_size_align_unchecked(0, align) };
        Self { ptr, layout }
    }

    #[inline]
    pub(crate) fn as_ptr(&self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    #[inline]
    pub(crate) fn layout(&self) -> Layout {
        self.layout
    }
}

impl Drop for RawBlocks {
    fn drop(&mut self) {
        if self.layout.size() != 0 {
            // SAFETY: ptr was returned by alloc::alloc with this exact layout.
            unsafe { alloc::dealloc(self.ptr.as_ptr(), self.layout) };
        }
    }
}
