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

use log::{debug, info, trace, warn};

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::{
    error::EngineError,
    modules::eviction_policy::{DynamicEvictionPolicyModule, EvictionPolicyModule},
    page::Page,
    real_memory::{EvictedPage, RealMemory},
    swap_store::SwapStore,
    MmuConfig,
};

/// Result of a successful address translation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Translation {
    /// address inside of real memory
    pub address: usize,

    /// `true` if the page had to be swapped in first
    pub page_fault: bool,
}

/// Content of every real memory frame and every swap slot, taken at the
/// same instant. `None` marks an unused slot.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Snapshot {
    pub real: Vec<Option<Page>>,
    pub swap: Vec<Option<Page>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct MmuStats {
    /// pages moved from real memory to swap
    pub swap_outs: u64,

    /// pages moved from swap back to real memory
    pub swap_ins: u64,

    /// translations that needed a swap in
    pub page_faults: u64,
}

/// Combines real memory and swap into one address space per process.
///
/// Every public operation either completes or leaves both tiers exactly
/// as they were before the call.
pub struct Mmu<P: EvictionPolicyModule> {
    real_memory: RealMemory<P>,
    swap: SwapStore,
    page_size: usize,
    stats: MmuStats,
}

impl Mmu<DynamicEvictionPolicyModule> {
    /// Creates a new MMU which uses the policy named in `config`
    pub fn new(config: &MmuConfig) -> Result<Self, EngineError> {
        Self::with_policy(config, DynamicEvictionPolicyModule::new(config.policy))
    }
}

impl<P: EvictionPolicyModule> Mmu<P> {
    pub fn with_policy(config: &MmuConfig, policy: P) -> Result<Self, EngineError> {
        config.validate()?;

        let real_memory = RealMemory::new(config.real_frames(), config.page_size, policy)?;
        let swap = SwapStore::new(config.swap_frames(), config.page_size)?;

        info!(
            "Created MMU with {} real frames, {} swap frames and page size {}",
            real_memory.capacity(),
            swap.capacity(),
            config.page_size
        );

        Ok(Self {
            real_memory,
            swap,
            page_size: config.page_size,
            stats: MmuStats::default(),
        })
    }

    /// Allocates page `virtual_page` of `owner`, evicting another page to
    /// swap if real memory is full.
    pub fn allocate_page(&mut self, owner: &str, virtual_page: usize) -> Result<(), EngineError> {
        trace!("Allocate page {} of {}", virtual_page, owner);

        if owner.is_empty() {
            return Err(EngineError::InvalidOwner);
        }
        if self.real_memory.contains(owner, virtual_page) || self.swap.contains(owner, virtual_page) {
            return Err(EngineError::AlreadyAllocated);
        }

        let page = Page::new(owner, virtual_page);
        if self.real_memory.has_free_frame() {
            self.real_memory.allocate_page(page)?;
            return Ok(());
        }

        let victim = self.real_memory.next_eviction_victim()?;
        self.swap_out(victim)?;

        self.real_memory.allocate_page(page).map_err(|err| {
            warn!("could not allocate page after eviction: {}", err);
            EngineError::AllocationInconsistency
        })?;
        Ok(())
    }

    /// Translates `virtual_address` of `owner`. Pages that live in swap are
    /// exchanged with the next eviction victim first.
    pub fn access_page(&mut self, owner: &str, virtual_address: usize) -> Result<Translation, EngineError> {
        trace!("Access address {} of {}", virtual_address, owner);

        match self.real_memory.access_page(owner, virtual_address) {
            Ok(address) => {
                return Ok(Translation {
                    address,
                    page_fault: false,
                })
            }
            Err(EngineError::NotFound) => {}
            Err(err) => return Err(err),
        }

        let retrieved = match self.swap.retrieve_page(owner, virtual_address) {
            Ok(retrieved) => retrieved,
            Err(EngineError::NotFound) => return Err(EngineError::AddressNotFound),
            Err(err) => return Err(err),
        };
        debug!(
            "Page fault: page {} of {} is in swap slot {}",
            retrieved.page.virtual_page, owner, retrieved.slot
        );

        if !self.real_memory.has_free_frame() {
            let victim = match self.real_memory.next_eviction_victim() {
                Ok(victim) => victim,
                Err(err) => {
                    self.swap.reinstate(retrieved)?;
                    return Err(err);
                }
            };

            if let Err(err) = self.swap.store_page(victim.page.clone()) {
                warn!("rolling back page exchange: {}", err);
                self.real_memory.reinstate(victim)?;
                self.swap.reinstate(retrieved)?;
                return Err(err);
            }

            debug!(
                "Swapped out page {} of {} from frame {}",
                victim.page.virtual_page, victim.page.owner, victim.frame
            );
            self.stats.swap_outs += 1;
        }

        self.real_memory
            .allocate_page(retrieved.page)
            .map_err(|_| EngineError::AllocationInconsistency)?;
        self.stats.swap_ins += 1;
        self.stats.page_faults += 1;

        let address = self
            .real_memory
            .access_page(owner, virtual_address)
            .map_err(|_| EngineError::AllocationInconsistency)?;

        Ok(Translation {
            address,
            page_fault: true,
        })
    }

    /// Removes all pages of `owner` from both tiers.
    ///
    /// Returns [`EngineError::NotFound`] if neither tier held a page of `owner`.
    pub fn remove_pages(&mut self, owner: &str) -> Result<(), EngineError> {
        trace!("Remove pages of {}", owner);

        let found_real = self.real_memory.remove_pages(owner);
        let found_swap = self.swap.remove_pages(owner);

        if found_real || found_swap {
            Ok(())
        } else {
            Err(EngineError::NotFound)
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            real: self.real_memory.snapshot(),
            swap: self.swap.snapshot(),
        }
    }

    pub fn stats(&self) -> MmuStats {
        self.stats
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn policy(&self) -> &P {
        self.real_memory.policy()
    }

    /// Number of pages of `owner` that are currently in real memory
    pub fn resident_pages(&self, owner: &str) -> usize {
        self.real_memory.pages_of(owner)
    }

    /// Number of pages of `owner` that are currently in swap
    pub fn swapped_pages(&self, owner: &str) -> usize {
        self.swap.pages_of(owner)
    }

    /// `(occupied, capacity)` of real memory
    pub fn real_memory_usage(&self) -> (usize, usize) {
        (self.real_memory.occupied_count(), self.real_memory.capacity())
    }

    /// `(occupied, capacity)` of swap
    pub fn swap_usage(&self) -> (usize, usize) {
        (self.swap.occupied_count(), self.swap.capacity())
    }

    fn swap_out(&mut self, victim: EvictedPage) -> Result<(), EngineError> {
        match self.swap.store_page(victim.page.clone()) {
            Ok(slot) => {
                debug!(
                    "Swapped out page {} of {} from frame {} to slot {}",
                    victim.page.virtual_page, victim.page.owner, victim.frame, slot
                );
                self.stats.swap_outs += 1;
                Ok(())
            }
            Err(err) => {
                warn!("rolling back eviction of frame {}: {}", victim.frame, err);
                self.real_memory.reinstate(victim)?;
                Err(err)
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn check_integrity(&self) {
        self.real_memory.check_integrity();
        self.swap.check_integrity();

        // a page never lives in both tiers
        for page in self.real_memory.snapshot().into_iter().flatten() {
            assert!(
                !self.swap.contains(&page.owner, page.virtual_page),
                "{:?} is in real memory and swap",
                page
            );
        }
    }
}
