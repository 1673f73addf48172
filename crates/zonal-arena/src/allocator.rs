//! The zone allocator.
//!
//! [`ZoneAllocator`] bump-allocates out of the newest zone and opens a new
//! zone whenever a request does not fit. Zones are reference counted per
//! allocation; a zone is released when its count drops to zero, unless it
//! is the current zone, which is rewound instead.

use std::fmt;
use std::ptr::NonNull;

use tracing::{trace, warn};

use crate::config::ZoneConfig;
use crate::error::ZoneError;
use crate::handle::ZoneId;
use crate::hash::HashIndex;
use crate::list::ZoneList;
use crate::raw::ALIGN;
use crate::stats::ZoneStats;
use crate::zone::Zone;

/// A zone allocator for many small objects that share a lifetime.
///
/// Every zone holds exactly [`block_size`](Self::block_size) bytes. Requests
/// are rounded up to pointer alignment and bumped out of the current zone.
/// The allocator records nothing per allocation beyond a per-zone count, so
/// it never knows how large an individual allocation was.
///
/// Not thread-safe: all operations take `&mut self` and the type is meant
/// to have a single owner (one parser, one batch job).
///
/// Dropping the allocator frees every zone, whether or not allocations are
/// still outstanding.
///
/// # Example
///
/// ```
/// use zonal_arena::ZoneAllocator;
///
/// let mut zones = ZoneAllocator::new(4096);
/// let mark = zones.allocate(24).unwrap();
/// let _scratch = zones.allocate(100).unwrap();
/// zones.free_since(mark);
/// assert_eq!(zones.allocate(24).unwrap(), mark);
/// ```
pub struct ZoneAllocator {
    /// Owner of every zone. Its newest entry is the current zone.
    zones: ZoneList,
    block_size: usize,
    /// Bump offset into the current zone. Always `<= block_size`.
    cursor: usize,
    hash: HashIndex,
}

impl ZoneAllocator {
    /// Create an allocator whose zones are `initial_block_size` bytes,
    /// rounded up to the next power of two.
    ///
    /// No memory is allocated until the first [`allocate`](Self::allocate).
    pub fn new(initial_block_size: usize) -> Self {
        Self::with_config(ZoneConfig::new(initial_block_size))
    }

    /// Create an allocator from a [`ZoneConfig`].
    pub fn with_config(config: ZoneConfig) -> Self {
        let block_size = config.block_size();
        Self {
            zones: ZoneList::new(),
            block_size,
            cursor: 0,
            hash: HashIndex::new(&config),
        }
    }

    /// Allocate `size` bytes, rounded up to pointer alignment.
    ///
    /// `size == 0` is legal and returns a zero-length marker that still
    /// lies inside a live zone. The returned memory is valid until its zone
    /// is reclaimed by [`deallocate`](Self::deallocate),
    /// [`free_since`](Self::free_since) or dropping the allocator.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::CapacityExceeded`] if the rounded request is
    /// larger than a zone. No zone can ever satisfy such a request.
    pub fn allocate(&mut self, size: usize) -> Result<NonNull<u8>, ZoneError> {
        let Some(rounded) = align_up(size) else {
            return Err(self.capacity_exceeded(size));
        };

        // A full zone never serves another request, not even a zero-length
        // one, so every returned pointer stays strictly inside its zone.
        let fits = self.cursor < self.block_size && rounded <= self.block_size - self.cursor;
        let zone_id = match self.current() {
            Some(id) if fits => id,
            _ => {
                if rounded > self.block_size {
                    return Err(self.capacity_exceeded(size));
                }
                self.cursor = 0;
                self.add_block(Zone::new(self.block_size))
            }
        };

        let zone = &mut self.zones[zone_id];
        let ptr = zone.pointer_at(self.cursor);
        zone.refs += 1;
        self.cursor += rounded;
        Ok(ptr)
    }

    /// Allocate space for `bytes` and copy them in.
    ///
    /// # Errors
    ///
    /// Same as [`allocate`](Self::allocate).
    pub fn allocate_copy(&mut self, bytes: &[u8]) -> Result<NonNull<u8>, ZoneError> {
        let ptr = self.allocate(bytes.len())?;
        if let Some(id) = self.current() {
            self.zones[id].write(ptr, bytes);
        }
        Ok(ptr)
    }

    /// Release one allocation.
    ///
    /// `ptr` must have come from [`allocate`](Self::allocate) on this
    /// allocator and must not have been reclaimed by
    /// [`free_since`](Self::free_since) already. When the owning zone's
    /// count reaches zero it is released, or rewound if it is the current
    /// zone.
    ///
    /// A pointer that does not resolve to a live zone is ignored. That
    /// happens legitimately when `free_since` and `deallocate` are mixed.
    pub fn deallocate(&mut self, ptr: NonNull<u8>) {
        if self.hash.is_dirty() {
            self.rebuild_hash();
        }

        let addr = ptr.as_ptr() as usize;
        let Some(id) = self.hash.resolve(addr, &self.zones) else {
            trace!(addr, "deallocate: pointer not in any live zone");
            return;
        };

        let zone = &mut self.zones[id];
        let Some(refs) = zone.refs.checked_sub(1) else {
            trace!(addr, zone = %id, "deallocate: zone has no live allocations");
            return;
        };
        zone.refs = refs;

        if refs == 0 {
            if self.current() == Some(id) {
                self.cursor = 0;
            } else {
                self.del_block(id);
            }
        }
    }

    /// Release every allocation made at or after `ptr`.
    ///
    /// `ptr` is a high-water mark previously returned by
    /// [`allocate`](Self::allocate) whose zone is still on the stack. Zones
    /// newer than the one containing `ptr` are released, and the next
    /// allocation starts at `ptr` again.
    ///
    /// Zone reference counts are not adjusted, so a zone that kept
    /// allocations past the mark is only reclaimed when the allocator is
    /// rewound past it or dropped. A pointer outside every zone on the
    /// stack is ignored.
    pub fn free_since(&mut self, ptr: NonNull<u8>) {
        let addr = ptr.as_ptr() as usize;
        let Some(removed) = self.zones.iter().position(|(_, zone)| zone.contains(addr)) else {
            trace!(addr, "free_since: pointer not in any zone on the stack");
            return;
        };

        // Dropping this many zones would leave the table mostly empty;
        // rebuild it later instead of patching it once per zone.
        if self.hash.is_clean() && self.hash.bucket_count() >= 4 * (self.zones.len() - removed) {
            self.hash.mark_dirty();
        }

        for _ in 0..removed {
            if let Some(top) = self.current() {
                self.del_block(top);
            }
        }

        if let Some(owner) = self.current() {
            self.cursor = addr - self.zones[owner].begin();
        }
    }

    /// Capacity of every zone in bytes.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Number of live zones, including the current one.
    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }

    /// Bytes held in zone buffers.
    pub fn memory_bytes(&self) -> usize {
        self.zones.len() * self.block_size
    }

    /// Snapshot the allocator's bookkeeping.
    pub fn stats(&self) -> ZoneStats {
        let current = self.current().map(|id| &self.zones[id]);
        ZoneStats {
            zone_count: self.zones.len(),
            block_size: self.block_size,
            memory_bytes: self.memory_bytes(),
            live_allocations: self.zones.iter().map(|(_, zone)| zone.refs).sum(),
            current_refs: current.map(|zone| zone.refs),
            current_offset: current.map(|_| self.cursor),
            hash_buckets: self.hash.bucket_count(),
            hash_dirty: self.hash.is_dirty(),
        }
    }

    /// The zone `allocate` bumps into: always the newest live zone.
    fn current(&self) -> Option<ZoneId> {
        self.zones.newest()
    }

    /// Push `zone` as the new current zone and keep the hash index in step.
    fn add_block(&mut self, zone: Zone) -> ZoneId {
        let id = self.zones.push(zone);

        let buckets = self.hash.bucket_count();
        if self.hash.is_clean()
            && self.zones.len() / 4 > buckets
            && buckets < ZoneConfig::MAX_HASH_BUCKETS
        {
            self.hash.mark_dirty();
        }
        if self.hash.is_clean() {
            let begin = self.zones[id].begin();
            self.hash.insert(id, begin);
        }

        trace!(zone = %id, zones = self.zones.len(), "zone created");
        id
    }

    /// Unlink and free a zone. Removing the current zone makes the next
    /// older zone current; the caller is responsible for the cursor.
    fn del_block(&mut self, id: ZoneId) {
        let Some(zone) = self.zones.remove(id) else {
            return;
        };
        if self.hash.is_clean() {
            self.hash.remove(id, zone.begin());
        }
        trace!(zone = %id, zones = self.zones.len(), "zone released");
    }

    fn rebuild_hash(&mut self) {
        self.hash.rebuild(&self.zones);
    }

    fn capacity_exceeded(&self, requested: usize) -> ZoneError {
        warn!(
            requested,
            block_size = self.block_size,
            "allocation larger than a zone"
        );
        ZoneError::CapacityExceeded {
            requested,
            block_size: self.block_size,
        }
    }
}

impl Default for ZoneAllocator {
    fn default() -> Self {
        Self::with_config(ZoneConfig::default())
    }
}

impl fmt::Debug for ZoneAllocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZoneAllocator")
            .field("block_size", &self.block_size)
            .field("zones", &self.zones.len())
            .field("cursor", &self.cursor)
            .field("hash_buckets", &self.hash.bucket_count())
            .field("hash_dirty", &self.hash.is_dirty())
            .finish()
    }
}

/// Round `size` up to pointer alignment, or `None` on overflow.
fn align_up(size: usize) -> Option<usize> {
    Some(size.checked_add(ALIGN - 1)? & !(ALIGN - 1))
}
