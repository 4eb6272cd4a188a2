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

use log::trace;

use crate::{error::EngineError, frame_table::FrameTable, page::Page, util::split_address};

/// A page that was taken out of swap together with the slot it used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RetrievedPage {
    pub(crate) slot: usize,
    pub(crate) page: Page,
}

/// The secondary storage tier.
///
/// Pages never get evicted from here, they only leave through
/// [`SwapStore::retrieve_page`] or [`SwapStore::remove_pages`].
pub(crate) struct SwapStore {
    frames: FrameTable,
    page_size: usize,
}

impl SwapStore {
    pub(crate) fn new(frame_count: usize, page_size: usize) -> Result<Self, EngineError> {
        if page_size == 0 {
            return Err(EngineError::InvalidConfiguration("page size must not be zero"));
        }

        Ok(Self {
            frames: FrameTable::new(frame_count)?,
            page_size,
        })
    }

    pub(crate) fn store_page(&mut self, page: Page) -> Result<usize, EngineError> {
        match self.frames.allocate(page) {
            Ok(slot) => {
                trace!("stored page in swap slot {}", slot);
                Ok(slot)
            }
            Err(EngineError::Full) => Err(EngineError::SwapExhausted),
            Err(err) => Err(err),
        }
    }

    /// Takes the page containing `virtual_address` out of swap.
    pub(crate) fn retrieve_page(&mut self, owner: &str, virtual_address: usize) -> Result<RetrievedPage, EngineError> {
        let (virtual_page, _) = split_address(virtual_address, self.page_size);
        let slot = self.frames.find(owner, virtual_page)?;

        match self.frames.release(slot) {
            Some(page) => Ok(RetrievedPage { slot, page }),
            None => Err(EngineError::AllocationInconsistency),
        }
    }

    /// Puts a retrieved page back into the slot it came from.
    pub(crate) fn reinstate(&mut self, retrieved: RetrievedPage) -> Result<(), EngineError> {
        self.frames.occupy(retrieved.slot, retrieved.page)
    }

    pub(crate) fn remove_pages(&mut self, owner: &str) -> bool {
        !self.frames.remove_all_for_owner(owner).is_empty()
    }

    #[inline]
    pub(crate) fn contains(&self, owner: &str, virtual_page: usize) -> bool {
        self.frames.contains(owner, virtual_page)
    }

    pub(crate) fn pages_of(&self, owner: &str) -> usize {
        self.frames.pages_of(owner)
    }

    pub(crate) fn capacity(&self) -> usize {
        self.frames.capacity()
    }

    pub(crate) fn occupied_count(&self) -> usize {
        self.frames.occupied_count()
    }

    pub(crate) fn snapshot(&self) -> Vec<Option<Page>> {
        self.frames.snapshot()
    }

    #[cfg(test)]
    pub(crate) fn check_integrity(&self) {
        self.frames.check_integrity();
    }
}

#[cfg(test)]
mod test {
    use super::{RetrievedPage, SwapStore};
    use crate::{error::EngineError, page::Page};

    #[test]
    fn test_invalid_configuration() {
        assert!(matches!(
            SwapStore::new(4, 0),
            Err(EngineError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            SwapStore::new(0, 16),
            Err(EngineError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_store_until_exhausted() {
        let mut swap = SwapStore::new(2, 16).unwrap();
        assert_eq!(swap.store_page(Page::new("a", 0)), Ok(0));
        assert_eq!(swap.store_page(Page::new("a", 1)), Ok(1));
        assert_eq!(
            swap.store_page(Page::new("a", 2)),
            Err(EngineError::SwapExhausted)
        );
        swap.check_integrity();
    }

    #[test]
    fn test_retrieve_removes_page() {
        let mut swap = SwapStore::new(4, 16).unwrap();
        swap.store_page(Page::new("a", 0)).unwrap();
        swap.store_page(Page::new("a", 2)).unwrap();

        // address 32 is the first byte of page 2
        assert_eq!(
            swap.retrieve_page("a", 32),
            Ok(RetrievedPage {
                slot: 1,
                page: Page::new("a", 2)
            })
        );
        assert_eq!(swap.retrieve_page("a", 32), Err(EngineError::NotFound));
        assert_eq!(swap.retrieve_page("b", 0), Err(EngineError::NotFound));
        assert_eq!(swap.occupied_count(), 1);
        swap.check_integrity();
    }

    #[test]
    fn test_reinstate_uses_same_slot() {
        let mut swap = SwapStore::new(3, 16).unwrap();
        swap.store_page(Page::new("a", 0)).unwrap();
        swap.store_page(Page::new("b", 0)).unwrap();
        let before = swap.snapshot();

        let retrieved = swap.retrieve_page("a", 5).unwrap();
        swap.reinstate(retrieved).unwrap();

        assert_eq!(swap.snapshot(), before);
        swap.check_integrity();
    }

    #[test]
    fn test_remove_pages() {
        let mut swap = SwapStore::new(3, 16).unwrap();
        assert!(!swap.remove_pages("a"));

        swap.store_page(Page::new("a", 0)).unwrap();
        swap.store_page(Page::new("b", 0)).unwrap();
        assert!(swap.remove_pages("a"));
        assert!(!swap.contains("a", 0));
        assert!(swap.contains("b", 0));
        assert_eq!(swap.pages_of("b"), 1);
        swap.check_integrity();
    }
}
