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

use crate::{
    error::EngineError, frame_table::FrameTable,
    modules::eviction_policy::EvictionPolicyModule, page::Page, util::split_address,
};

/// A page that was just pushed out of real memory together with the frame
/// it occupied, so the eviction can be undone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EvictedPage {
    pub(crate) frame: usize,
    pub(crate) page: Page,
}

/// The primary storage tier.
///
/// The frame table is only reachable through this wrapper, so every change
/// of occupancy is reported to the eviction policy.
pub(crate) struct RealMemory<P: EvictionPolicyModule> {
    frames: FrameTable,
    policy: P,
    page_size: usize,
}

impl<P: EvictionPolicyModule> RealMemory<P> {
    pub(crate) fn new(frame_count: usize, page_size: usize, policy: P) -> Result<Self, EngineError> {
        if page_size == 0 {
            return Err(EngineError::InvalidConfiguration("page size must not be zero"));
        }

        Ok(Self {
            frames: FrameTable::new(frame_count)?,
            policy,
            page_size,
        })
    }

    pub(crate) fn allocate_page(&mut self, page: Page) -> Result<usize, EngineError> {
        let frame = self.frames.allocate(page)?;
        self.policy.on_allocate(frame);
        Ok(frame)
    }

    /// Translates `virtual_address` of `owner` into a real address.
    pub(crate) fn access_page(&mut self, owner: &str, virtual_address: usize) -> Result<usize, EngineError> {
        let (virtual_page, displacement) = split_address(virtual_address, self.page_size);
        let frame = self.frames.find(owner, virtual_page)?;
        self.policy.on_access(frame);

        trace!(
            "translated {}:{} to frame {} (+{})",
            owner,
            virtual_address,
            frame,
            displacement
        );
        Ok(frame * self.page_size + displacement)
    }

    /// Removes all pages of `owner`, returns `false` if there were none.
    pub(crate) fn remove_pages(&mut self, owner: &str) -> bool {
        let freed = self.frames.remove_all_for_owner(owner);
        for frame in freed.iter() {
            self.policy.on_release(*frame);
        }

        !freed.is_empty()
    }

    /// Vacates the frame chosen by the eviction policy.
    ///
    /// The caller has to store the returned page somewhere else or hand it
    /// back via [`RealMemory::reinstate`].
    pub(crate) fn next_eviction_victim(&mut self) -> Result<EvictedPage, EngineError> {
        let frame = self
            .policy
            .select_victim()
            .ok_or(EngineError::NoSwappingCandidate)?;

        match self.frames.release(frame) {
            Some(page) => Ok(EvictedPage { frame, page }),
            None => Err(EngineError::AllocationInconsistency),
        }
    }

    /// Undoes [`RealMemory::next_eviction_victim`]: the page returns to its
    /// frame and is the next victim again.
    pub(crate) fn reinstate(&mut self, evicted: EvictedPage) -> Result<(), EngineError> {
        self.frames.occupy(evicted.frame, evicted.page)?;
        self.policy.on_reinstate(evicted.frame);
        Ok(())
    }

    #[inline]
    pub(crate) fn contains(&self, owner: &str, virtual_page: usize) -> bool {
        self.frames.contains(owner, virtual_page)
    }

    pub(crate) fn pages_of(&self, owner: &str) -> usize {
        self.frames.pages_of(owner)
    }

    pub(crate) fn has_free_frame(&self) -> bool {
        self.frames.free_count() > 0
    }

    pub(crate) fn capacity(&self) -> usize {
        self.frames.capacity()
    }

    pub(crate) fn occupied_count(&self) -> usize {
        self.frames.occupied_count()
    }

    pub(crate) fn policy(&self) -> &P {
        &self.policy
    }

    pub(crate) fn snapshot(&self) -> Vec<Option<Page>> {
        self.frames.snapshot()
    }

    #[cfg(test)]
    pub(crate) fn check_integrity(&self) {
        self.frames.check_integrity();

        let mut tracked = self.policy.eviction_order();
        tracked.sort_unstable();
        let occupied: Vec<usize> = (0..self.frames.capacity())
            .filter(|frame| self.frames.get(*frame).is_some())
            .collect();
        assert_eq!(tracked, occupied, "policy does not mirror occupied frames");
    }
}
