//! Zone allocation for large numbers of small, same-lifetime objects.
//!
//! Memory is handed out from fixed-size zones obtained from the global
//! allocator. Zones are never compacted. Two deallocation disciplines are
//! supported and may be mixed:
//!
//! - **Per-pointer:** [`ZoneAllocator::deallocate`] drops a zone's
//!   reference count; a zone whose count reaches zero is released (or, if it
//!   is the zone currently being filled, rewound for reuse).
//! - **Stack-style:** [`ZoneAllocator::free_since`] pops everything allocated
//!   after a remembered pointer in one step.
//!
//! # Architecture
//!
//! ```text
//! ZoneAllocator
//! ├── ZoneList (slot arena, sole owner of every Zone)
//! │   └── Zone[] (pointer-aligned RawBlock, refs, older/newer ZoneId links)
//! ├── cursor (bump offset into the newest zone)
//! └── HashIndex (page key → ZoneId buckets, rebuilt lazily when dirty)
//! ```
//!
//! `allocate` only touches the newest zone and the list. `deallocate` and
//! `free_since` consult the hash index to map an interior pointer back to
//! its owning zone.
//!
//! # Safety
//!
//! All `unsafe` code lives in the private `raw` module. Pointers returned by
//! the allocator are plain `NonNull<u8>` values; reading or writing through
//! them is the caller's `unsafe` responsibility, and they must not be used
//! after their zone has been reclaimed.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod allocator;
pub mod config;
pub mod error;
mod handle;
mod hash;
mod list;
mod raw;
pub mod stats;
mod zone;

// Public re-exports for the primary API surface.
pub use allocator::ZoneAllocator;
pub use config::ZoneConfig;
pub use error::ZoneError;
pub use stats::ZoneStats;

#[cfg(doctest)]
#[doc = include_str!("../README.md")]
struct ReadmeDoctests;
