//! Creation-ordered zone list backed by a slot arena.
//!
//! [`ZoneList`] owns every [`Zone`]. Zones live in `Option` slots indexed by
//! [`ZoneId`]; destroyed zones leave a vacant slot that the next push
//! reuses. The `older`/`newer` links inside each zone form a doubly linked
//! stack whose top is the newest zone.

use std::ops::{Index, IndexMut};

use crate::handle::ZoneId;
use crate::zone::Zone;

/// Arena of zones threaded into a creation-ordered stack.
pub(crate) struct ZoneList {
    slots: Vec<Option<Zone>>,
    /// Indices of empty slots available for reuse.
    vacant: Vec<usize>,
    /// Top of the stack.
    newest: Option<ZoneId>,
    len: usize,
}

impl ZoneList {
    /// Create an empty list.
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            vacant: Vec::new(),
            newest: None,
            len: 0,
        }
    }

    /// Push `zone` on top of the stack and return its handle.
    pub(crate) fn push(&mut self, mut zone: Zone) -> ZoneId {
        zone.older = self.newest;
        zone.newer = None;

        let id = match self.vacant.pop() {
            Some(index) => {
                self.slots[index] = Some(zone);
                ZoneId(index)
            }
            None => {
                self.slots.push(Some(zone));
                ZoneId(self.slots.len() - 1)
            }
        };

        if let Some(prev) = self.newest {
            self[prev].newer = Some(id);
        }
        self.newest = Some(id);
        self.len += 1;
        id
    }

    /// Unlink and return the zone at `id`, relinking its neighbours.
    ///
    /// Returns `None` if the slot is vacant.
    pub(crate) fn remove(&mut self, id: ZoneId) -> Option<Zone> {
        let zone = self.slots.get_mut(id.index())?.take()?;

        if let Some(older) = zone.older {
            self[older].newer = zone.newer;
        }
        if let Some(newer) = zone.newer {
            self[newer].older = zone.older;
        }
        if self.newest == Some(id) {
            self.newest = zone.older;
        }

        self.vacant.push(id.index());
        self.len -= 1;
        Some(zone)
    }

    /// The zone at `id`, if its slot is occupied.
    pub(crate) fn get(&self, id: ZoneId) -> Option<&Zone> {
        self.slots.get(id.index())?.as_ref()
    }

    /// Top of the stack: the most recently pushed live zone.
    pub(crate) fn newest(&self) -> Option<ZoneId> {
        self.newest
    }

    /// Number of live zones.
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Walk from the newest zone towards the oldest via `older` links.
    pub(crate) fn iter(&self) -> Iter<'_> {
        Iter {
            list: self,
            next: self.newest,
        }
    }
}

impl Index<ZoneId> for ZoneList {
    type Output = Zone;

    /// # Panics
    ///
    /// Panics if the slot is vacant.
    fn index(&self, id: ZoneId) -> &Zone {
        match self.get(id) {
            Some(zone) => zone,
            None => panic!("{id} is not a live zone"),
        }
    }
}

impl IndexMut<ZoneId> for ZoneList {
    fn index_mut(&mut self, id: ZoneId) -> &mut Zone {
        match self.slots.get_mut(id.index()).and_then(Option::as_mut) {
            Some(zone) => zone,
            None => panic!("{id} is not a live zone"),
        }
    }
}

/// Newest-to-oldest iterator over a [`ZoneList`].
pub(crate) struct Iter<'a> {
    list: &'a ZoneList,
    next: Option<ZoneId>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (ZoneId, &'a Zone);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        let zone = self.list.get(id)?;
        self.next = zone.older;
        Some((id, zone))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(list: &ZoneList) -> Vec<ZoneId> {
        list.iter().map(|(id, _)| id).collect()
    }

    #[test]
    fn push_links_newest_on_top() {
        let mut list = ZoneList::new();
        let a = list.push(Zone::new(16));
        let b = list.push(Zone::new(16));
        let c = list.push(Zone::new(16));

        assert_eq!(list.len(), 3);
        assert_eq!(list.newest(), Some(c));
        assert_eq!(ids(&list), vec![c, b, a]);
        assert_eq!(list[b].older, Some(a));
        assert_eq!(list[b].newer, Some(c));
        assert_eq!(list[a].older, None);
    }

    #[test]
    fn remove_middle_relinks_neighbours() {
        let mut list = ZoneList::new();
        let a = list.push(Zone::new(16));
        let b = list.push(Zone::new(16));
        let c = list.push(Zone::new(16));

        assert!(list.remove(b).is_some());
        assert_eq!(list.len(), 2);
        assert_eq!(list[c].older, Some(a));
        assert_eq!(list[a].newer, Some(c));
        assert_eq!(ids(&list), vec![c, a]);
    }

    #[test]
    fn remove_top_moves_newest_down() {
        let mut list = ZoneList::new();
        let a = list.push(Zone::new(16));
        let b = list.push(Zone::new(16));

        list.remove(b);
        assert_eq!(list.newest(), Some(a));
        assert_eq!(list[a].newer, None);

        list.remove(a);
        assert_eq!(list.newest(), None);
        assert_eq!(list.len(), 0);
        assert_eq!(list.iter().count(), 0);
    }

    #[test]
    fn vacant_slots_are_reused() {
        let mut list = ZoneList::new();
        let a = list.push(Zone::new(16));
        let _b = list.push(Zone::new(16));
        list.remove(a);
        let c = list.push(Zone::new(16));
        assert_eq!(c.index(), a.index());
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn remove_vacant_slot_is_none() {
        let mut list = ZoneList::new();
        let a = list.push(Zone::new(16));
        assert!(list.remove(a).is_some());
        assert!(list.remove(a).is_none());
        assert!(list.remove(ZoneId(99)).is_none());
        assert!(list.get(a).is_none());
    }

    #[test]
    #[should_panic(expected = "is not a live zone")]
    fn indexing_vacant_slot_panics() {
        let list = ZoneList::new();
        let _ = &list[ZoneId(0)];
    }
}
