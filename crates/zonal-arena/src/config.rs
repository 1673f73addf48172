//! Zone allocator configuration parameters.

/// Configuration for a [`ZoneAllocator`](crate::ZoneAllocator).
///
/// The only tunable is the zone size. It is rounded up to a power of two
/// at construction and immutable afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ZoneConfig {
    block_size: usize,
}

impl ZoneConfig {
    /// Smallest zone size: one pointer-aligned word, the smallest rounded
    /// non-zero request.
    pub const MIN_BLOCK_SIZE: usize = std::mem::align_of::<usize>();

    /// Default zone size: 8 KiB.
    pub const DEFAULT_BLOCK_SIZE: usize = 8 * 1024;

    /// Largest zone size a config will round to.
    pub const MAX_BLOCK_SIZE: usize = 1 << (usize::BITS - 2);

    /// Lower bound on the number of hash index buckets.
    pub const MIN_HASH_BUCKETS: usize = 1024;

    /// Upper bound on the number of hash index buckets.
    pub const MAX_HASH_BUCKETS: usize = 64 * 1024;

    /// Create a config whose zone size is `initial_block_size` rounded up
    /// to the next power of two.
    ///
    /// The result is clamped between [`Self::MIN_BLOCK_SIZE`] and
    /// [`Self::MAX_BLOCK_SIZE`], so every zone can hold at least one
    /// non-empty allocation.
    pub fn new(initial_block_size: usize) -> Self {
        let block_size = initial_block_size
            .checked_next_power_of_two()
            .unwrap_or(Self::MAX_BLOCK_SIZE)
            .clamp(Self::MIN_BLOCK_SIZE, Self::MAX_BLOCK_SIZE);
        Self { block_size }
    }

    /// Capacity of every zone in bytes. Always a power of two.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// `log2(block_size)`, the shift used for hash keys.
    pub fn block_shift(&self) -> u32 {
        self.block_size.trailing_zeros()
    }
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BLOCK_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_up_to_power_of_two() {
        assert_eq!(ZoneConfig::new(50).block_size(), 64);
        assert_eq!(ZoneConfig::new(64).block_size(), 64);
        assert_eq!(ZoneConfig::new(65).block_size(), 128);
    }

    #[test]
    fn tiny_sizes_clamp_to_one_word() {
        let word = std::mem::align_of::<usize>();
        for size in [0, 1, 2, word - 1, word] {
            assert_eq!(ZoneConfig::new(size).block_size(), word, "size {size}");
        }
        assert_eq!(ZoneConfig::new(1).block_shift(), word.trailing_zeros());
    }

    #[test]
    fn shift_matches_block_size() {
        let config = ZoneConfig::new(3000);
        assert_eq!(config.block_size(), 4096);
        assert_eq!(1usize << config.block_shift(), config.block_size());
    }

    #[test]
    fn huge_request_clamps_to_max() {
        let config = ZoneConfig::new(usize::MAX);
        assert_eq!(config.block_size(), ZoneConfig::MAX_BLOCK_SIZE);
        assert!(config.block_size().is_power_of_two());
    }

    #[test]
    fn default_is_8k() {
        assert_eq!(ZoneConfig::default().block_size(), 8192);
    }
}
