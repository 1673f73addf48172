//! Zone allocator error types.

use thiserror::Error;

/// Errors that can occur during zone allocation.
///
/// Pointers that cannot be resolved to a live zone during `deallocate` or
/// `free_since` are not errors; those calls are silent no-ops.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ZoneError {
    /// A single request is larger than a zone, so no zone can ever hold it.
    ///
    /// Retrying will not help. Callers fall back to another allocator or
    /// propagate the failure.
    #[error("zone capacity exceeded: requested {requested} bytes, block size {block_size} bytes")]
    CapacityExceeded {
        /// Number of bytes requested (before alignment rounding).
        requested: usize,
        /// Capacity of every zone in bytes.
        block_size: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_message_names_both_sizes() {
        let err = ZoneError::CapacityExceeded {
            requested: 100,
            block_size: 64,
        };
        assert_eq!(
            err.to_string(),
            "zone capacity exceeded: requested 100 bytes, block size 64 bytes"
        );
    }
}
