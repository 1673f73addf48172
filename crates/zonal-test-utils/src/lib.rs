//! Test harness for the zonal zone allocator.
//!
//! - [`counting`]: a [`GlobalAlloc`](std::alloc::GlobalAlloc) wrapper that
//!   keeps per-thread live byte and allocation counts, for leak checks.
//! - [`workload`]: seeded allocate/deallocate/free_since sequences and a
//!   replayer that tags every live allocation and verifies the tags.

#![deny(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod counting;
pub mod workload;

pub use counting::{AllocationSnapshot, CountingAllocator};
pub use workload::{generate, replay, Corruption, Op, ReplayReport, WorkloadConfig};
