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

use std::collections::VecDeque;

use super::EvictionPolicyModule;

/// Evicts frames in the order they were allocated. Accesses are ignored.
pub struct FifoEvictionPolicyModule {
    queue: VecDeque<usize>,
}

impl FifoEvictionPolicyModule {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }

    fn remove(&mut self, frame: usize) {
        if let Some(pos) = self.queue.iter().position(|item| *item == frame) {
            self.queue.remove(pos);
        }
    }
}

impl Default for FifoEvictionPolicyModule {
    fn default() -> Self {
        Self::new()
    }
}

impl EvictionPolicyModule for FifoEvictionPolicyModule {
    fn on_allocate(&mut self, frame: usize) {
        // a frame is only ever queued once
        self.remove(frame);
        self.queue.push_back(frame);
    }

    fn on_access(&mut self, _frame: usize) {}

    fn select_victim(&mut self) -> Option<usize> {
        self.queue.pop_front()
    }

    fn on_release(&mut self, frame: usize) {
        self.remove(frame);
    }

    fn on_reinstate(&mut self, frame: usize) {
        self.remove(frame);
        self.queue.push_front(frame);
    }

    fn eviction_order(&self) -> Vec<usize> {
        self.queue.iter().copied().collect()
    }
}
