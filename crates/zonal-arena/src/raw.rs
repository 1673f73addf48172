//! Low-level primitives for zone memory.
//!
//! [`RawBlock`] is the only type in the crate that talks to `std::alloc`
//! directly. Every `unsafe` block carries a `// SAFETY:` comment.

#![allow(unsafe_code)]

use std::alloc::{self, Layout};
use std::ptr::NonNull;

/// Alignment of every block and of every allocation handed out of one.
pub(crate) const ALIGN: usize = std::mem::align_of::<usize>();

/// An owned, zero-initialised, pointer-aligned heap buffer.
///
/// The buffer is allocated once and never moves, so interior pointers stay
/// valid until the block is dropped.
pub(crate) struct RawBlock {
    ptr: NonNull<u8>,
    layout: Layout,
}

impl RawBlock {
    /// Allocate `size` zeroed bytes (at least one).
    ///
    /// Allocation failure goes through [`alloc::handle_alloc_error`].
    pub(crate) fn zeroed(size: usize) -> Self {
        let layout = match Layout::from_size_align(size.max(1), ALIGN) {
            Ok(layout) => layout,
            Err(_) => panic!("zone block of {size} bytes exceeds the address space"),
        };
        // SAFETY: `layout` has a non-zero size.
        let raw = unsafe { alloc::alloc_zeroed(layout) };
        let Some(ptr) = NonNull::new(raw) else {
            alloc::handle_alloc_error(layout)
        };
        Self { ptr, layout }
    }

    /// Address of the first byte.
    pub(crate) fn addr(&self) -> usize {
        self.ptr.as_ptr() as usize
    }

    /// Size of the buffer in bytes.
    pub(crate) fn len(&self) -> usize {
        self.layout.size()
    }

    /// Pointer `offset` bytes into the buffer.
    ///
    /// # Panics
    ///
    /// Panics if `offset` is past one-beyond-the-end.
    pub(crate) fn pointer_at(&self, offset: usize) -> NonNull<u8> {
        assert!(offset <= self.len(), "offset {offset} outside block");
        // SAFETY: `offset <= len`, so the result stays within (or one past)
        // the allocation and cannot wrap to null.
        unsafe { self.ptr.add(offset) }
    }

    /// Copy `bytes` into the buffer starting at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if the destination range does not fit in the buffer.
    pub(crate) fn write(&mut self, offset: usize, bytes: &[u8]) {
        assert!(
            offset <= self.len() && bytes.len() <= self.len() - offset,
            "write of {} bytes at offset {offset} outside block",
            bytes.len()
        );
        // SAFETY: the destination range is bounds-checked above and `self`
        // is borrowed mutably, so `bytes` cannot alias it.
        unsafe {
            std::ptr::copy_nonoverlapping(
                bytes.as_ptr(),
                self.ptr.as_ptr().add(offset),
                bytes.len(),
            );
        }
    }
}

impl Drop for RawBlock {
    fn drop(&mut self) {
        // SAFETY: `ptr` was returned by `alloc_zeroed` with exactly `layout`
        // and is freed only here.
        unsafe { alloc::dealloc(self.ptr.as_ptr(), self.layout) };
    }
}
