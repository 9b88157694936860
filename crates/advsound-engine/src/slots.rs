//! Fixed-capacity id allocation and handle storage.
//!
//! Every id in `[0, capacity)` owns one slot. A slot is free, reserved by
//! [`HandleSlots::allocate`] while a sound is being set up, or live with a
//! [`SoundHandle`]. An id is in use exactly when its slot is not free, so
//! allocation and registration can never disagree.

use advsound_core::{Error, Result, SoundId};

use crate::handle::SoundHandle;

#[derive(Debug, Clone, PartialEq)]
enum Slot {
    Free,
    Reserved,
    Live(SoundHandle),
}

/// Bounded arena of sound handles indexed by [`SoundId`].
#[derive(Debug, Clone)]
pub struct HandleSlots {
    slots: Vec<Slot>,
    live: usize,
}

impl HandleSlots {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![Slot::Free; capacity],
            live: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of live handles. Reserved ids are not counted.
    pub const fn len(&self) -> usize {
        self.live
    }

    pub const fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// True if `id` is reserved or live.
    pub fn is_in_use(&self, id: SoundId) -> bool {
        matches!(self.slots.get(id.index()), Some(Slot::Reserved | Slot::Live(_)))
    }

    /// Reserve the lowest free id.
    pub fn allocate(&mut self) -> Result<SoundId> {
        let exhausted = Error::AllocationExhausted {
            capacity: self.capacity(),
        };
        let index = self
            .slots
            .iter()
            .position(|slot| matches!(slot, Slot::Free))
            .ok_or(exhausted)?;
        let id = u32::try_from(index).map_err(|_| Error::AllocationExhausted {
            capacity: self.capacity(),
        })?;

        self.slots[index] = Slot::Reserved;
        Ok(SoundId::new(id))
    }

    /// Return `id` to the free pool, dropping its handle if live.
    ///
    /// Releasing a free or out-of-range id does nothing.
    pub fn release(&mut self, id: SoundId) {
        self.take(id);
    }

    /// Make `handle` live under `id`.
    ///
    /// Fails with [`Error::NotFound`] if `id` is outside the capacity.
    pub fn insert(&mut self, id: SoundId, handle: SoundHandle) -> Result<()> {
        let slot = self.slots.get_mut(id.index()).ok_or(Error::NotFound(id))?;
        if !matches!(slot, Slot::Live(_)) {
            self.live += 1;
        }
        *slot = Slot::Live(handle);
        Ok(())
    }

    pub fn get(&self, id: SoundId) -> Option<&SoundHandle> {
        match self.slots.get(id.index()) {
            Some(Slot::Live(handle)) => Some(handle),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, id: SoundId) -> Option<&mut SoundHandle> {
        match self.slots.get_mut(id.index()) {
            Some(Slot::Live(handle)) => Some(handle),
            _ => None,
        }
    }

    /// Remove the live handle under `id` and free the id.
    pub fn remove(&mut self, id: SoundId) -> Option<SoundHandle> {
        match self.slots.get(id.index()) {
            Some(Slot::Live(_)) => self.take(id),
            _ => None,
        }
    }

    /// Live handles in id order.
    pub fn iter(&self) -> impl Iterator<Item = &SoundHandle> {
        self.slots.iter().filter_map(|slot| match slot {
            Slot::Live(handle) => Some(handle),
            _ => None,
        })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut SoundHandle> {
        self.slots.iter_mut().filter_map(|slot| match slot {
            Slot::Live(handle) => Some(handle),
            _ => None,
        })
    }

    /// Ids of live handles in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = SoundId> + '_ {
        self.iter().map(SoundHandle::id)
    }

    /// Free every slot, returning the handles that were live.
    pub fn drain(&mut self) -> Vec<SoundHandle> {
        let handles = self
            .slots
            .iter_mut()
            .filter_map(|slot| match std::mem::replace(slot, Slot::Free) {
                Slot::Live(handle) => Some(handle),
                _ => None,
            })
            .collect();
        self.live = 0;
        handles
    }

    fn take(&mut self, id: SoundId) -> Option<SoundHandle> {
        let slot = self.slots.get_mut(id.index())?;
        match std::mem::replace(slot, Slot::Free) {
            Slot::Live(handle) => {
                self.live -= 1;
                Some(handle)
            }
            Slot::Free | Slot::Reserved => None,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)] // Tests use unwrap for brevity

    use super::*;
    use advsound_core::SoundResource;
    use proptest::prelude::*;

    fn handle(id: SoundId) -> SoundHandle {
        let resource = SoundResource::resolve("file:///tmp/a.wav", "a.wav").unwrap();
        SoundHandle::new(id, format!("{id}:a.wav"), resource, false, false)
    }

    fn live(slots: &mut HandleSlots) -> SoundId {
        let id = slots.allocate().unwrap();
        slots.insert(id, handle(id)).unwrap();
        id
    }

    #[test]
    fn test_allocates_lowest_free_id() {
        let mut slots = HandleSlots::new(4);
        let ids: Vec<_> = (0..4).map(|_| live(&mut slots)).collect();
        assert_eq!(ids, (0..4).map(SoundId::new).collect::<Vec<_>>());

        slots.release(SoundId::new(2));
        slots.release(SoundId::new(1));
        assert_eq!(slots.allocate().unwrap(), SoundId::new(1));
        assert_eq!(slots.allocate().unwrap(), SoundId::new(2));
    }

    #[test]
    fn test_exhaustion() {
        let mut slots = HandleSlots::new(2);
        live(&mut slots);
        slots.allocate().unwrap();
        assert!(matches!(
            slots.allocate(),
            Err(Error::AllocationExhausted { capacity: 2 })
        ));
    }

    #[test]
    fn test_zero_capacity_never_allocates() {
        let mut slots = HandleSlots::new(0);
        assert!(slots.allocate().is_err());
        assert!(slots.is_empty());
    }

    #[test]
    fn test_reserved_id_is_in_use_but_not_live() {
        let mut slots = HandleSlots::new(2);
        let id = slots.allocate().unwrap();
        assert!(slots.is_in_use(id));
        assert!(slots.get(id).is_none());
        assert_eq!(slots.len(), 0);

        slots.release(id);
        assert!(!slots.is_in_use(id));
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut slots = HandleSlots::new(2);
        let id = live(&mut slots);
        slots.release(id);
        slots.release(id);
        slots.release(SoundId::new(99));
        assert_eq!(slots.len(), 0);
        assert_eq!(slots.allocate().unwrap(), id);
    }

    #[test]
    fn test_remove_only_takes_live_handles() {
        let mut slots = HandleSlots::new(2);
        let reserved = slots.allocate().unwrap();
        assert!(slots.remove(reserved).is_none());
        assert!(slots.is_in_use(reserved));

        let id = live(&mut slots);
        assert_eq!(slots.remove(id).as_ref().map(SoundHandle::id), Some(id));
        assert!(slots.remove(id).is_none());
    }

    #[test]
    fn test_insert_out_of_range() {
        let mut slots = HandleSlots::new(1);
        let id = SoundId::new(5);
        assert!(matches!(slots.insert(id, handle(id)), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_iteration_and_drain() {
        let mut slots = HandleSlots::new(4);
        for _ in 0..3 {
            live(&mut slots);
        }
        slots.release(SoundId::new(1));
        assert_eq!(
            slots.ids().collect::<Vec<_>>(),
            vec![SoundId::new(0), SoundId::new(2)]
        );

        for handle in slots.iter_mut() {
            handle.set_state(advsound_core::PlaybackState::Playing);
        }
        assert!(slots.iter().all(|h| h.state().is_playing()));

        assert_eq!(slots.drain().len(), 2);
        assert!(slots.is_empty());
        assert_eq!(slots.allocate().unwrap(), SoundId::new(0));
    }

    proptest! {
        #[test]
        fn prop_live_ids_unique_and_lowest_first(ops in proptest::collection::vec(any::<Option<u8>>(), 0..64)) {
            let capacity = 8;
            let mut slots = HandleSlots::new(capacity);
            let mut model = std::collections::BTreeSet::new();

            for op in ops {
                match op {
                    None => {
                        let expected = (0..capacity).find(|i| !model.contains(i));
                        match slots.allocate() {
                            Ok(id) => {
                                prop_assert_eq!(Some(id.index()), expected);
                                slots.insert(id, handle(id)).unwrap();
                                model.insert(id.index());
                            }
                            Err(_) => prop_assert_eq!(expected, None),
                        }
                    }
                    Some(raw) => {
                        let id = SoundId::new(u32::from(raw % 10));
                        slots.release(id);
                        model.remove(&id.index());
                    }
                }

                let ids: Vec<_> = slots.ids().map(SoundId::index).collect();
                prop_assert_eq!(ids, model.iter().copied().collect::<Vec<_>>());
                prop_assert_eq!(slots.len(), model.len());
            }
        }
    }
}
