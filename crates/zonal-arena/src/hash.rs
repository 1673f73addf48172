//! Page-keyed index from interior addresses to their owning zone.
//!
//! Each zone buffer is `block_size` bytes but is only pointer-aligned, so
//! it straddles at most two `block_size`-aligned pages. The index keys every
//! page a zone touches as `(page >> log2) & (buckets - 1)` and stores the
//! zone's [`ZoneId`] in that bucket. A lookup hashes the address the same
//! way and scans one bucket for the zone that actually contains it.
//!
//! The index is maintained incrementally while it is clean. When it is
//! marked dirty, updates are skipped and the owner rebuilds it from the
//! zone list before the next lookup.

use smallvec::SmallVec;

use crate::config::ZoneConfig;
use crate::handle::ZoneId;
use crate::list::ZoneList;

/// Zones whose buffer touches one page key. Inline until it spills.
type Bucket = SmallVec<[ZoneId; 2]>;

/// Lazily rebuilt address → zone index.
pub(crate) struct HashIndex {
    buckets: Vec<Bucket>,
    block_size: usize,
    shift: u32,
    /// Stale or never built.
    dirty: bool,
}

impl HashIndex {
    /// Create an index for the zones `config` describes. No table exists
    /// until the first [`rebuild`](Self::rebuild).
    pub(crate) fn new(config: &ZoneConfig) -> Self {
        Self {
            buckets: Vec::new(),
            block_size: config.block_size(),
            shift: config.block_shift(),
            dirty: true,
        }
    }

    /// Whether a table has been built at least once.
    pub(crate) fn is_built(&self) -> bool {
        !self.buckets.is_empty()
    }

    /// Whether the table must be rebuilt before the next lookup.
    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// A table exists and is up to date, so incremental updates apply.
    pub(crate) fn is_clean(&self) -> bool {
        self.is_built() && !self.dirty
    }

    /// Defer all maintenance to the next rebuild.
    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Number of buckets in the current table (zero before the first build).
    pub(crate) fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Throw the table away and index every zone in `zones` afresh.
    ///
    /// The bucket count is the smallest power of two covering the zone
    /// count, clamped to the configured bounds.
    pub(crate) fn rebuild(&mut self, zones: &ZoneList) {
        let size = zones
            .len()
            .next_power_of_two()
            .clamp(ZoneConfig::MIN_HASH_BUCKETS, ZoneConfig::MAX_HASH_BUCKETS);
        self.buckets = vec![Bucket::new(); size];
        self.dirty = false;
        for (id, zone) in zones.iter() {
            self.insert(id, zone.begin());
        }
        tracing::debug!(
            buckets = size,
            zones = zones.len(),
            "rebuilt zone hash index"
        );
    }

    /// Record zone `id`, whose buffer starts at `begin`, in every bucket its
    /// pages map to.
    pub(crate) fn insert(&mut self, id: ZoneId, begin: usize) {
        for page in pages(begin, self.block_size) {
            let key = self.key(page);
            self.buckets[key].push(id);
        }
    }

    /// Drop zone `id` from every bucket its pages map to.
    pub(crate) fn remove(&mut self, id: ZoneId, begin: usize) {
        for page in pages(begin, self.block_size) {
            let key = self.key(page);
            let bucket = &mut self.buckets[key];
            if let Some(pos) = bucket.iter().position(|&z| z == id) {
                bucket.swap_remove(pos);
            }
        }
    }

    /// Find the live zone in `zones` whose buffer contains `addr`.
    pub(crate) fn resolve(&self, addr: usize, zones: &ZoneList) -> Option<ZoneId> {
        if !self.is_built() {
            return None;
        }
        self.buckets[self.key(addr)]
            .iter()
            .copied()
            .find(|&id| zones.get(id).is_some_and(|zone| zone.contains(addr)))
    }

    fn key(&self, addr: usize) -> usize {
        (addr >> self.shift) & (self.buckets.len() - 1)
    }
}

/// `block_size`-aligned page addresses in `[align_down(begin), begin + block_size)`.
fn pages(begin: usize, block_size: usize) -> impl Iterator<Item = usize> {
    let start = begin & !(block_size - 1);
    let end = begin.saturating_add(block_size);
    std::iter::successors(Some(start), move |&page| page.checked_add(block_size))
        .take_while(move |&page| page < end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zone::Zone;

    #[test]
    fn aligned_zone_covers_one_page() {
        let pages: Vec<_> = pages(4096, 4096).collect();
        assert_eq!(pages, vec![4096]);
    }

    #[test]
    fn unaligned_zone_covers_two_pages() {
        let pages: Vec<_> = pages(4096 + 8, 4096).collect();
        assert_eq!(pages, vec![4096, 8192]);
    }

    #[test]
    fn new_index_is_dirty_and_unbuilt() {
        let index = HashIndex::new(&ZoneConfig::new(64));
        assert!(index.is_dirty());
        assert!(!index.is_built());
        assert!(!index.is_clean());
        assert_eq!(index.bucket_count(), 0);
        assert_eq!(index.resolve(1234, &ZoneList::new()), None);
    }

    #[test]
    fn rebuild_clamps_to_minimum_buckets() {
        let mut list = ZoneList::new();
        list.push(Zone::new(64));
        let mut index = HashIndex::new(&ZoneConfig::new(64));
        index.rebuild(&list);
        assert!(index.is_clean());
        assert_eq!(index.bucket_count(), ZoneConfig::MIN_HASH_BUCKETS);
    }

    #[test]
    fn resolves_interior_addresses() {
        let mut list = ZoneList::new();
        let a = list.push(Zone::new(64));
        let b = list.push(Zone::new(64));
        let mut index = HashIndex::new(&ZoneConfig::new(64));
        index.rebuild(&list);

        let a_begin = list[a].begin();
        let b_begin = list[b].begin();
        assert_eq!(index.resolve(a_begin, &list), Some(a));
        assert_eq!(index.resolve(a_begin + 63, &list), Some(a));
        assert_eq!(index.resolve(b_begin + 8, &list), Some(b));
    }

    #[test]
    fn incremental_insert_and_remove() {
        let mut list = ZoneList::new();
        let a = list.push(Zone::new(64));
        let mut index = HashIndex::new(&ZoneConfig::new(64));
        index.rebuild(&list);

        let b = list.push(Zone::new(64));
        let b_begin = list[b].begin();
        assert_eq!(index.resolve(b_begin, &list), None);
        index.insert(b, b_begin);
        assert_eq!(index.resolve(b_begin, &list), Some(b));

        index.remove(b, b_begin);
        assert_eq!(index.resolve(b_begin, &list), None);
        assert_eq!(index.resolve(list[a].begin(), &list), Some(a));
    }

    #[test]
    fn stale_entries_for_removed_zones_do_not_resolve() {
        let mut list = ZoneList::new();
        let a = list.push(Zone::new(64));
        let mut index = HashIndex::new(&ZoneConfig::new(64));
        index.rebuild(&list);

        let begin = list[a].begin();
        list.remove(a);
        assert_eq!(index.resolve(begin, &list), None);
    }
}
