//! Point-in-time allocator statistics.

/// Snapshot of a [`ZoneAllocator`](crate::ZoneAllocator)'s bookkeeping.
///
/// Produced by [`ZoneAllocator::stats`](crate::ZoneAllocator::stats). All
/// values are copied out; the snapshot does not borrow the allocator.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ZoneStats {
    /// Number of live zones, including the current one.
    pub zone_count: usize,
    /// Capacity of every zone in bytes.
    pub block_size: usize,
    /// Bytes held in zone buffers (`zone_count * block_size`).
    pub memory_bytes: usize,
    /// Sum of every zone's reference count.
    ///
    /// `free_since` does not adjust reference counts, so this is an upper
    /// bound on the allocations still in use.
    pub live_allocations: usize,
    /// Reference count of the current zone, if one exists.
    pub current_refs: Option<usize>,
    /// Bump offset into the current zone, if one exists.
    pub current_offset: Option<usize>,
    /// Buckets in the hash index (zero before it is first built).
    pub hash_buckets: usize,
    /// Whether the hash index will be rebuilt before the next lookup.
    pub hash_dirty: bool,
}

impl ZoneStats {
    /// Bytes still free in the current zone.
    pub fn current_remaining(&self) -> usize {
        self.current_offset
            .map_or(0, |offset| self.block_size - offset)
    }
}
