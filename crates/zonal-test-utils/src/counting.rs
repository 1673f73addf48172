//! Per-thread allocation accounting.
//!
//! Install [`CountingAllocator`] as the `#[global_allocator]` of a test
//! binary, then compare [`AllocationSnapshot::take`] before and after the
//! code under test. Counters are thread-local so concurrently running tests
//! do not see each other's traffic.

#![allow(unsafe_code)]

use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;

thread_local! {
    static LIVE_BYTES: Cell<isize> = const { Cell::new(0) };
    static LIVE_ALLOCATIONS: Cell<isize> = const { Cell::new(0) };
}

fn record(bytes: isize, allocations: isize) {
    // `try_with` fails during thread teardown; those frees are not counted.
    let _ = LIVE_BYTES.try_with(|live| live.set(live.get() + bytes));
    let _ = LIVE_ALLOCATIONS.try_with(|live| live.set(live.get() + allocations));
}

/// [`System`] allocator that counts live bytes and allocations per thread.
pub struct CountingAllocator;

// SAFETY: every method forwards to `System` unchanged and only updates
// thread-local counters, which never allocate.
unsafe impl GlobalAlloc for CountingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        // SAFETY: forwarded with the caller's guarantees.
        let ptr = unsafe { System.alloc(layout) };
        if !ptr.is_null() {
            record(layout.size() as isize, 1);
        }
        ptr
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        // SAFETY: forwarded with the caller's guarantees.
        let ptr = unsafe { System.alloc_zeroed(layout) };
        if !ptr.is_null() {
            record(layout.size() as isize, 1);
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        // SAFETY: forwarded with the caller's guarantees.
        unsafe { System.dealloc(ptr, layout) };
        record(-(layout.size() as isize), -1);
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        // SAFETY: forwarded with the caller's guarantees.
        let new_ptr = unsafe { System.realloc(ptr, layout, new_size) };
        if !new_ptr.is_null() {
            record(new_size as isize - layout.size() as isize, 0);
        }
        new_ptr
    }
}

/// Live allocation counters of the current thread at one point in time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AllocationSnapshot {
    /// Bytes allocated and not yet freed.
    pub live_bytes: isize,
    /// Allocations not yet freed.
    pub live_allocations: isize,
}

impl AllocationSnapshot {
    /// Read the current thread's counters.
    ///
    /// Always zero unless [`CountingAllocator`] is the global allocator.
    pub fn take() -> Self {
        Self {
            live_bytes: LIVE_BYTES.try_with(Cell::get).unwrap_or(0),
            live_allocations: LIVE_ALLOCATIONS.try_with(Cell::get).unwrap_or(0),
        }
    }

    /// Change in live counters from `earlier` to `self`.
    pub fn since(self, earlier: Self) -> Self {
        Self {
            live_bytes: self.live_bytes - earlier.live_bytes,
            live_allocations: self.live_allocations - earlier.live_allocations,
        }
    }

    /// Whether nothing is live relative to the baseline.
    pub fn is_balanced(&self) -> bool {
        self.live_bytes == 0 && self.live_allocations == 0
    }
}
