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

use std::thread;

use try_lock::{Locked, TryLock};

use crate::{
    error::EngineError,
    mmu::{Mmu, MmuStats, Snapshot, Translation},
    modules::eviction_policy::EvictionPolicyModule,
};

/// An [`Mmu`] behind one exclusive lock, so monitoring threads can take
/// snapshots while another thread processes instructions.
///
/// There is no reader/writer split: a snapshot has to show real memory and
/// swap from the same instant.
pub struct SharedMmu<P: EvictionPolicyModule> {
    inner: TryLock<Mmu<P>>,
}

impl<P: EvictionPolicyModule> SharedMmu<P> {
    pub fn new(mmu: Mmu<P>) -> Self {
        Self {
            inner: TryLock::new(mmu),
        }
    }

    /// Waits until the lock is free.
    fn lock(&self) -> Locked<'_, Mmu<P>> {
        loop {
            if let Some(guard) = self.inner.try_lock() {
                return guard;
            }
            thread::yield_now();
        }
    }

    pub fn allocate_page(&self, owner: &str, virtual_page: usize) -> Result<(), EngineError> {
        self.lock().allocate_page(owner, virtual_page)
    }

    pub fn access_page(&self, owner: &str, virtual_address: usize) -> Result<Translation, EngineError> {
        self.lock().access_page(owner, virtual_address)
    }

    pub fn remove_pages(&self, owner: &str) -> Result<(), EngineError> {
        self.lock().remove_pages(owner)
    }

    pub fn snapshot(&self) -> Snapshot {
        self.lock().snapshot()
    }

    /// Like [`SharedMmu::snapshot`] but returns `None` instead of waiting
    /// if an operation is in progress.
    pub fn try_snapshot(&self) -> Option<Snapshot> {
        self.inner.try_lock().map(|mmu| mmu.snapshot())
    }

    pub fn stats(&self) -> MmuStats {
        self.lock().stats()
    }

    pub fn into_inner(self) -> Mmu<P> {
        self.inner.into_inner()
    }
}
