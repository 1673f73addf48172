//! Zonal: a zone allocator for large numbers of small, same-lifetime objects.
//!
//! This is the top-level facade crate that re-exports the public API of the
//! Zonal sub-crates. For most users, adding `zonal` as a single dependency
//! is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use zonal::prelude::*;
//!
//! let mut zones = ZoneAllocator::new(1024);
//!
//! // Per-pointer release.
//! let node = zones.allocate(48).unwrap();
//! zones.deallocate(node);
//!
//! // Stack-style release: everything from `mark` on goes in one call.
//! let mark = zones.allocate_copy(b"checkpoint").unwrap();
//! for _ in 0..100 {
//!     zones.allocate(64).unwrap();
//! }
//! zones.free_since(mark);
//! assert_eq!(zones.zone_count(), 1);
//!
//! // Requests larger than a zone are refused, not panicked on.
//! assert!(matches!(
//!     zones.allocate(4096),
//!     Err(ZoneError::CapacityExceeded { .. })
//! ));
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`arena`] | `zonal-arena` | `ZoneAllocator`, configuration, errors, statistics |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Zone allocator, configuration, errors and statistics (`zonal-arena`).
pub use zonal_arena as arena;

/// Common imports for typical usage.
///
/// ```rust
/// use zonal::prelude::*;
/// ```
pub mod prelude {
    pub use zonal_arena::{ZoneAllocator, ZoneConfig, ZoneError, ZoneStats};
}

#[cfg(doctest)]
#[doc = include_str!("../README.md")]
struct ReadmeDoctests;
