//! Benchmark profiles for the zonal zone allocator.
//!
//! Each profile pairs a [`ZoneConfig`] with a seeded operation sequence:
//!
//! - [`small_objects_profile`]: 8 KiB zones, objects up to 64 bytes,
//!   steady per-pointer frees (tree-node style usage)
//! - [`parser_profile`]: 8 KiB zones, objects up to 256 bytes, frequent
//!   `free_since` rewinds (backtracking parser style usage)

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use zonal_arena::ZoneConfig;
use zonal_test_utils::{generate, Op, WorkloadConfig};

/// Operations per generated profile.
pub const PROFILE_OPS: usize = 20_000;

/// Small fixed-lifetime objects with per-pointer frees.
pub fn small_objects_profile(seed: u64) -> (ZoneConfig, Vec<Op>) {
    let workload = WorkloadConfig::churn(seed, PROFILE_OPS, 64);
    (ZoneConfig::default(), generate(&workload))
}

/// Larger objects released mostly in bulk via `free_since`.
pub fn parser_profile(seed: u64) -> (ZoneConfig, Vec<Op>) {
    let workload = WorkloadConfig {
        seed,
        ops: PROFILE_OPS,
        max_size: 256,
        deallocate_percent: 5,
        free_since_percent: 10,
    };
    (ZoneConfig::default(), generate(&workload))
}
