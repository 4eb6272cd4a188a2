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

use crate::{
    modules::eviction_policy::{DynamicEvictionPolicyModule, PolicyKind},
    Mmu, MmuConfig, Snapshot,
};


pub(crate) const TEST_PAGE_SIZE: usize = 16;

pub(crate) fn get_test_mmu(
    real_frames: usize,
    swap_frames: usize,
    policy: PolicyKind,
) -> Mmu<DynamicEvictionPolicyModule> {
    let _ = env_logger::builder().is_test(true).try_init();

    Mmu::new(&MmuConfig {
        real_memory_size: real_frames * TEST_PAGE_SIZE,
        swap_size: swap_frames * TEST_PAGE_SIZE,
        page_size: TEST_PAGE_SIZE,
        policy,
    })
    .unwrap()
}

/// owner and page of every occupied slot, `None` for free slots
pub(crate) fn slot_names(slots: &[Option<crate::Page>]) -> Vec<Option<(String, usize)>> {
    slots
        .iter()
        .map(|slot| slot.as_ref().map(|page| (page.owner.clone(), page.virtual_page)))
        .collect()
}

pub(crate) fn total_pages(snapshot: &Snapshot) -> usize {
    snapshot.real.iter().flatten().count() + snapshot.swap.iter().flatten().count()
}
