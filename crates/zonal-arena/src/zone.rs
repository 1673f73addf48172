//! A single fixed-size zone.
//!
//! A [`Zone`] owns one [`RawBlock`] and counts the allocations carved out of
//! it that have not been deallocated yet. The `older`/`newer` links thread
//! every zone into the creation-ordered list kept by
//! [`ZoneList`](crate::list::ZoneList).

use std::ptr::NonNull;

use crate::handle::ZoneId;
use crate::raw::RawBlock;

/// A fixed-size buffer from which many small allocations are bumped.
pub(crate) struct Zone {
    /// Backing storage. Allocated to full capacity at creation.
    block: RawBlock,
    /// Live allocations carved from this zone.
    pub(crate) refs: usize,
    /// Next older zone in creation order.
    pub(crate) older: Option<ZoneId>,
    /// Next newer zone in creation order.
    pub(crate) newer: Option<ZoneId>,
}

impl Zone {
    /// Create an unlinked zone with a zeroed buffer of `size` bytes.
    pub(crate) fn new(size: usize) -> Self {
        Self {
            block: RawBlock::zeroed(size),
            refs: 0,
            older: None,
            newer: None,
        }
    }

    /// Address of the first byte of the buffer.
    pub(crate) fn begin(&self) -> usize {
        self.block.addr()
    }

    /// Capacity in bytes.
    pub(crate) fn size(&self) -> usize {
        self.block.len()
    }

    /// Whether `addr` falls inside `[begin, begin + size)`.
    pub(crate) fn contains(&self, addr: usize) -> bool {
        addr >= self.begin() && addr - self.begin() < self.size()
    }

    /// Pointer `offset` bytes into the buffer.
    pub(crate) fn pointer_at(&self, offset: usize) -> NonNull<u8> {
        self.block.pointer_at(offset)
    }

    /// Copy `bytes` to `ptr`, which must point into this zone.
    ///
    /// # Panics
    ///
    /// Panics if `ptr..ptr + bytes.len()` is not inside the buffer.
    pub(crate) fn write(&mut self, ptr: NonNull<u8>, bytes: &[u8]) {
        let offset = (ptr.as_ptr() as usize).wrapping_sub(self.begin());
        self.block.write(offset, bytes);
    }
}
