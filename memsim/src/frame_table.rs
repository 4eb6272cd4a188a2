/*
 *  Copyright (C) 2025  Markus Elias Gerber
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

use std::collections::{HashMap, VecDeque};

use log::warn;

use crate::{error::EngineError, page::Page};

/// Fixed number of frame slots of one storage tier.
///
/// Invariants:
/// - an index is inside `free_list` iff its slot is empty
/// - `free_list` never holds an index twice
/// - `lookup` contains exactly the occupied slots
pub(crate) struct FrameTable {
    slots: Vec<Option<Page>>,

    /// free indices, handed out from the front
    free_list: VecDeque<usize>,

    /// owner -> (virtual page -> frame index)
    lookup: HashMap<String, HashMap<usize, usize>>,
}

impl FrameTable {
    pub(crate) fn new(frame_count: usize) -> Result<Self, EngineError> {
        if frame_count == 0 {
            return Err(EngineError::InvalidConfiguration(
                "a frame table needs at least one frame",
            ));
        }

        Ok(Self {
            slots: vec![None; frame_count],
            free_list: (0..frame_count).collect(),
            lookup: HashMap::new(),
        })
    }

    /// Places `page` into the first free slot and returns its index.
    pub(crate) fn allocate(&mut self, page: Page) -> Result<usize, EngineError> {
        if page.owner.is_empty() {
            return Err(EngineError::InvalidOwner);
        }
        if self.contains(&page.owner, page.virtual_page) {
            return Err(EngineError::AlreadyAllocated);
        }

        while let Some(index) = self.free_list.pop_front() {
            if self.slots[index].is_some() {
                // stale entry, never hand out an occupied slot
                warn!("frame {} was listed as free but is occupied", index);
                continue;
            }

            self.insert_lookup(&page, index);
            self.slots[index] = Some(page);
            return Ok(index);
        }

        Err(EngineError::Full)
    }

    /// Puts `page` back into the exact slot `index`, which has to be empty.
    pub(crate) fn occupy(&mut self, index: usize, page: Page) -> Result<(), EngineError> {
        match self.slots.get(index) {
            Some(None) => {}
            _ => return Err(EngineError::AllocationInconsistency),
        }
        if self.contains(&page.owner, page.virtual_page) {
            return Err(EngineError::AlreadyAllocated);
        }

        self.free_list.retain(|free| *free != index);
        self.insert_lookup(&page, index);
        self.slots[index] = Some(page);
        Ok(())
    }

    /// Clears the slot at `index`. Releasing an empty slot does nothing.
    pub(crate) fn release(&mut self, index: usize) -> Option<Page> {
        let page = self.slots.get_mut(index)?.take()?;

        if let Some(pages) = self.lookup.get_mut(&page.owner) {
            pages.remove(&page.virtual_page);
            if pages.is_empty() {
                self.lookup.remove(&page.owner);
            }
        }

        self.free_list.push_back(index);
        Some(page)
    }

    pub(crate) fn find(&self, owner: &str, virtual_page: usize) -> Result<usize, EngineError> {
        self.lookup
            .get(owner)
            .and_then(|pages| pages.get(&virtual_page))
            .copied()
            .ok_or(EngineError::NotFound)
    }

    #[inline]
    pub(crate) fn contains(&self, owner: &str, virtual_page: usize) -> bool {
        self.find(owner, virtual_page).is_ok()
    }

    /// Frees every slot that belongs to `owner` and returns the freed indices
    /// in ascending order.
    pub(crate) fn remove_all_for_owner(&mut self, owner: &str) -> Vec<usize> {
        let mut freed: Vec<usize> = match self.lookup.remove(owner) {
            Some(pages) => pages.into_values().collect(),
            None => return Vec::new(),
        };
        freed.sort_unstable();

        for index in freed.iter() {
            debug_assert!(self.slots[*index]
                .as_ref()
                .is_some_and(|page| page.owner == owner));

            self.slots[*index] = None;
            self.free_list.push_back(*index);
        }

        freed
    }

    #[cfg(test)]
    pub(crate) fn get(&self, index: usize) -> Option<&Page> {
        self.slots.get(index)?.as_ref()
    }

    pub(crate) fn pages_of(&self, owner: &str) -> usize {
        self.lookup.get(owner).map_or(0, |pages| pages.len())
    }

    pub(crate) fn snapshot(&self) -> Vec<Option<Page>> {
        self.slots.clone()
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub(crate) fn free_count(&self) -> usize {
        self.free_list.len()
    }

    #[inline]
    pub(crate) fn occupied_count(&self) -> usize {
        self.capacity() - self.free_count()
    }

    /// panics if one of the invariants of this table does not hold
    #[cfg(test)]
    pub(crate) fn check_integrity(&self) {
        let mut seen = vec![false; self.capacity()];
        for index in self.free_list.iter() {
            assert!(!seen[*index], "index {} is listed twice as free", index);
            seen[*index] = true;
            assert!(self.slots[*index].is_none(), "free index {} is occupied", index);
        }

        let mut lookup_entries = 0;
        for (index, slot) in self.slots.iter().enumerate() {
            match slot {
                Some(page) => {
                    assert!(!seen[index], "occupied index {} is listed as free", index);
                    assert_eq!(self.find(&page.owner, page.virtual_page), Ok(index));
                    lookup_entries += 1;
                }
                None => assert!(seen[index], "empty index {} is missing in free list", index),
            }
        }

        let indexed: usize = self.lookup.values().map(|pages| pages.len()).sum();
        assert_eq!(indexed, lookup_entries);
        assert_eq!(self.free_count() + self.occupied_count(), self.capacity());
    }

    fn insert_lookup(&mut self, page: &Page, index: usize) {
        self.lookup
            .entry(page.owner.clone())
            .or_default()
            .insert(page.virtual_page, index);
    }
}

#[cfg(test)]
mod test {
    use rand::{rngs::SmallRng, Rng, SeedableRng};

    use super::FrameTable;
    use crate::{error::EngineError, page::Page};

    #[test]
    fn test_zero_frames_rejected() {
        assert!(matches!(
            FrameTable::new(0),
            Err(EngineError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_allocate_until_full() {
        let mut table = FrameTable::new(3).unwrap();

        assert_eq!(table.allocate(Page::new("a", 0)), Ok(0));
        assert_eq!(table.allocate(Page::new("a", 1)), Ok(1));
        assert_eq!(table.allocate(Page::new("b", 0)), Ok(2));
        assert_eq!(table.allocate(Page::new("b", 1)), Err(EngineError::Full));

        assert_eq!(table.free_count(), 0);
        assert_eq!(table.occupied_count(), 3);
        table.check_integrity();
    }

    #[test]
    fn test_released_slots_are_reused_last() {
        let mut table = FrameTable::new(3).unwrap();
        table.allocate(Page::new("a", 0)).unwrap();
        table.allocate(Page::new("a", 1)).unwrap();

        assert_eq!(table.release(0), Some(Page::new("a", 0)));

        // slot 2 was free before slot 0 was released
        assert_eq!(table.allocate(Page::new("b", 0)), Ok(2));
        assert_eq!(table.allocate(Page::new("b", 1)), Ok(0));
        table.check_integrity();
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut table = FrameTable::new(2).unwrap();
        table.allocate(Page::new("a", 0)).unwrap();

        assert!(table.release(0).is_some());
        assert!(table.release(0).is_none());
        assert!(table.release(1).is_none());
        assert!(table.release(17).is_none());

        assert_eq!(table.free_count(), 2);
        table.check_integrity();
    }

    #[test]
    fn test_rejects_empty_owner_and_duplicates() {
        let mut table = FrameTable::new(2).unwrap();

        assert_eq!(table.allocate(Page::new("", 0)), Err(EngineError::InvalidOwner));
        table.allocate(Page::new("a", 4)).unwrap();
        assert_eq!(
            table.allocate(Page::new("a", 4)),
            Err(EngineError::AlreadyAllocated)
        );
        assert_eq!(table.free_count(), 1);
        table.check_integrity();
    }

    #[test]
    fn test_find() {
        let mut table = FrameTable::new(4).unwrap();
        table.allocate(Page::new("a", 0)).unwrap();
        table.allocate(Page::new("b", 0)).unwrap();
        table.allocate(Page::new("a", 1)).unwrap();

        assert_eq!(table.find("a", 1), Ok(2));
        assert_eq!(table.find("b", 0), Ok(1));
        assert_eq!(table.find("b", 1), Err(EngineError::NotFound));
        assert_eq!(table.find("c", 0), Err(EngineError::NotFound));
    }

    #[test]
    fn test_remove_all_for_owner() {
        let mut table = FrameTable::new(4).unwrap();
        table.allocate(Page::new("a", 0)).unwrap();
        table.allocate(Page::new("b", 0)).unwrap();
        table.allocate(Page::new("a", 1)).unwrap();

        assert_eq!(table.remove_all_for_owner("a"), vec![0, 2]);
        assert!(table.remove_all_for_owner("a").is_empty());
        assert!(table.remove_all_for_owner("unknown").is_empty());

        assert_eq!(table.pages_of("a"), 0);
        assert_eq!(table.pages_of("b"), 1);
        assert_eq!(
            table.snapshot(),
            vec![None, Some(Page::new("b", 0)), None, None]
        );
        table.check_integrity();
    }

    #[test]
    fn test_occupy_exact_slot() {
        let mut table = FrameTable::new(3).unwrap();
        table.allocate(Page::new("a", 0)).unwrap();
        table.allocate(Page::new("a", 1)).unwrap();
        let page = table.release(1).unwrap();

        assert_eq!(
            table.occupy(0, Page::new("b", 0)),
            Err(EngineError::AllocationInconsistency)
        );
        assert_eq!(table.occupy(1, page), Ok(()));
        assert_eq!(table.find("a", 1), Ok(1));
        assert_eq!(table.free_count(), 1);
        table.check_integrity();
    }

    #[test]
    fn test_snapshot_does_not_mutate() {
        let mut table = FrameTable::new(2).unwrap();
        table.allocate(Page::new("a", 3)).unwrap();

        let first = table.snapshot();
        let second = table.snapshot();
        assert_eq!(first, second);
        assert_eq!(first, vec![Some(Page::new("a", 3)), None]);
        assert_eq!(table.free_count(), 1);
    }

    // random allocate/release/remove sequences never break the bookkeeping
    #[test]
    fn test_random_operations_keep_invariants() {
        const SEED: u64 = 5446535461589659585;
        const CAPACITY: usize = 16;
        const OWNERS: [&str; 4] = ["a", "b", "c", "d"];

        let mut rand = SmallRng::seed_from_u64(SEED);
        let mut table = FrameTable::new(CAPACITY).unwrap();

        for _ in 0..2000 {
            let owner = OWNERS[rand.gen_range(0..OWNERS.len())];
            match rand.gen_range(0..4) {
                0 | 1 => {
                    let page = Page::new(owner, rand.gen_range(0..8));
                    let was_full = table.free_count() == 0;
                    match table.allocate(page) {
                        Ok(index) => assert!(index < CAPACITY),
                        Err(EngineError::Full) => assert!(was_full),
                        Err(EngineError::AlreadyAllocated) => {}
                        Err(err) => panic!("unexpected error {}", err),
                    }
                }
                2 => {
                    table.release(rand.gen_range(0..CAPACITY));
                }
                _ => {
                    let before = table.occupied_count();
                    let freed = table.remove_all_for_owner(owner);
                    assert_eq!(table.occupied_count(), before - freed.len());
                }
            }

            assert!(table.occupied_count() <= CAPACITY);
            table.check_integrity();
        }
    }
}
