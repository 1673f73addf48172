//! Seeded allocation workloads and a verifying replayer.
//!
//! [`generate`] produces a deterministic [`Op`] sequence from a
//! [`WorkloadConfig`] using a ChaCha8 RNG. [`replay`] drives a
//! [`ZoneAllocator`] with it, fills every allocation with a tag byte and
//! checks each tag before the allocation is released and again at the end.
//! Any clobbered tag means two live allocations overlapped.

#![allow(unsafe_code)]

use std::ptr::NonNull;

use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use zonal_arena::ZoneAllocator;

/// One step of a workload.
///
/// `pick` values are reduced modulo the number of live allocations at
/// replay time, so any value is valid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    /// Allocate `size` bytes.
    Allocate { size: usize },
    /// Deallocate one live allocation.
    Deallocate { pick: usize },
    /// `free_since` a live allocation, releasing it and everything newer.
    FreeSince { pick: usize },
}

/// Shape of a generated workload.
#[derive(Clone, Debug)]
pub struct WorkloadConfig {
    pub seed: u64,
    /// Number of operations to generate.
    pub ops: usize,
    /// Largest allocation size (inclusive).
    pub max_size: usize,
    /// Percentage of operations that deallocate.
    pub deallocate_percent: u64,
    /// Percentage of operations that call `free_since`.
    pub free_since_percent: u64,
}

impl WorkloadConfig {
    /// Mostly allocations with steady per-pointer frees and rare rewinds.
    pub fn churn(seed: u64, ops: usize, max_size: usize) -> Self {
        Self {
            seed,
            ops,
            max_size,
            deallocate_percent: 35,
            free_since_percent: 2,
        }
    }
}

/// Generate the operation sequence for `config`.
pub fn generate(config: &WorkloadConfig) -> Vec<Op> {
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let free_since_cut = config.free_since_percent;
    let deallocate_cut = free_since_cut + config.deallocate_percent;
    (0..config.ops)
        .map(|_| {
            let roll = rng.next_u64() % 100;
            if roll < free_since_cut {
                Op::FreeSince {
                    pick: rng.next_u64() as usize,
                }
            } else if roll < deallocate_cut {
                Op::Deallocate {
                    pick: rng.next_u64() as usize,
                }
            } else {
                Op::Allocate {
                    size: (rng.next_u64() % (config.max_size as u64 + 1)) as usize,
                }
            }
        })
        .collect()
}

/// A live allocation overlapped another one.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("allocation #{serial} ({len} bytes) was overwritten")]
pub struct Corruption {
    /// Sequence number of the damaged allocation.
    pub serial: usize,
    /// Its requested length.
    pub len: usize,
}

/// Counters collected during a replay.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReplayReport {
    pub allocations: usize,
    pub deallocations: usize,
    pub rewinds: usize,
    /// Allocation requests rejected with a capacity error.
    pub rejected: usize,
    /// Largest zone count observed.
    pub peak_zones: usize,
    /// Allocations still live at the end.
    pub live: usize,
}

struct Live {
    ptr: NonNull<u8>,
    len: usize,
    serial: usize,
}

impl Live {
    fn tag(&self) -> u8 {
        (self.serial % 251) as u8 + 1
    }

    fn fill(&self) {
        // SAFETY: `ptr` was just returned by `allocate` for `len` bytes.
        unsafe { std::ptr::write_bytes(self.ptr.as_ptr(), self.tag(), self.len) };
    }

    fn verify(&self) -> Result<(), Corruption> {
        // SAFETY: the replayer only verifies allocations it still holds,
        // whose zones are alive.
        let bytes = unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) };
        if bytes.iter().all(|&b| b == self.tag()) {
            Ok(())
        } else {
            Err(Corruption {
                serial: self.serial,
                len: self.len,
            })
        }
    }
}

/// Run `ops` against `alloc`, verifying every allocation's contents.
///
/// # Errors
///
/// Returns [`Corruption`] for the first allocation whose contents changed
/// while it was live.
pub fn replay(alloc: &mut ZoneAllocator, ops: &[Op]) -> Result<ReplayReport, Corruption> {
    let mut report = ReplayReport::default();
    // Allocation order. `free_since` truncates it.
    let mut live: Vec<Live> = Vec::new();
    let mut serial = 0;

    for op in ops {
        match *op {
            Op::Allocate { size } => match alloc.allocate(size) {
                Ok(ptr) => {
                    let entry = Live {
                        ptr,
                        len: size,
                        serial,
                    };
                    serial += 1;
                    entry.fill();
                    live.push(entry);
                    report.allocations += 1;
                }
                Err(_) => report.rejected += 1,
            },
            Op::Deallocate { pick } => {
                if live.is_empty() {
                    continue;
                }
                let entry = live.remove(pick % live.len());
                entry.verify()?;
                alloc.deallocate(entry.ptr);
                report.deallocations += 1;
            }
            Op::FreeSince { pick } => {
                if live.is_empty() {
                    continue;
                }
                let index = pick % live.len();
                for entry in &live[index..] {
                    entry.verify()?;
                }
                let mark = live[index].ptr;
                live.truncate(index);
                alloc.free_since(mark);
                report.rewinds += 1;
            }
        }
        report.peak_zones = report.peak_zones.max(alloc.zone_count());
    }

    for entry in &live {
        entry.verify()?;
    }
    report.live = live.len();
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_is_deterministic() {
        let config = WorkloadConfig::churn(7, 500, 64);
        assert_eq!(generate(&config), generate(&config));
        let other = WorkloadConfig::churn(8, 500, 64);
        assert_ne!(generate(&config), generate(&other));
    }

    #[test]
    fn sizes_stay_within_bound() {
        let config = WorkloadConfig::churn(1, 2000, 48);
        for op in generate(&config) {
            if let Op::Allocate { size } = op {
                assert!(size <= 48);
            }
        }
    }

    #[test]
    fn replay_of_plain_allocations() {
        let mut alloc = ZoneAllocator::new(64);
        let ops = vec![Op::Allocate { size: 10 }; 10];
        let report = replay(&mut alloc, &ops).unwrap();
        assert_eq!(report.allocations, 10);
        assert_eq!(report.live, 10);
        assert_eq!(report.peak_zones, 3);
    }

    #[test]
    fn replay_counts_rejections() {
        let mut alloc = ZoneAllocator::new(16);
        let ops = [Op::Allocate { size: 17 }, Op::Allocate { size: 16 }];
        let report = replay(&mut alloc, &ops).unwrap();
        assert_eq!(report.rejected, 1);
        assert_eq!(report.allocations, 1);
    }

    #[test]
    fn releases_on_empty_live_set_are_skipped() {
        let mut alloc = ZoneAllocator::new(64);
        let ops = [Op::Deallocate { pick: 3 }, Op::FreeSince { pick: 9 }];
        let report = replay(&mut alloc, &ops).unwrap();
        assert_eq!(report, ReplayReport::default());
    }
}
