//! Zone handles.
//!
//! A [`ZoneId`] names a slot in the zone list's arena. Links between zones
//! and hash index buckets hold `ZoneId`s, never owning pointers, so the
//! list stays the sole owner of every zone.

use std::fmt;

/// Stable handle to a zone slot.
///
/// Slots are reused after their zone is destroyed, so a handle is only
/// meaningful while the zone it was issued for is alive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct ZoneId(pub(crate) usize);

impl ZoneId {
    /// Slot index in the zone list.
    pub(crate) fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "zone#{}", self.0)
    }
}
