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

/// Evicts the frame that was least recently allocated or accessed.
pub struct LruEvictionPolicyModule {
    /// least recently used at the front, most recently used at the back
    access_order: VecDeque<usize>,
}

impl LruEvictionPolicyModule {
    pub fn new() -> Self {
        Self {
            access_order: VecDeque::new(),
        }
    }

    fn remove(&mut self, frame: usize) {
        if let Some(pos) = self.access_order.iter().position(|item| *item == frame) {
            self.access_order.remove(pos);
        }
    }

    fn touch(&mut self, frame: usize) {
        self.remove(frame);
        self.access_order.push_back(frame);
    }
}

impl Default for LruEvictionPolicyModule {
    fn default() -> Self {
        Self::new()
    }
}

impl EvictionPolicyModule for LruEvictionPolicyModule {
    fn on_allocate(&mut self, frame: usize) {
        self.touch(frame);
    }

    fn on_access(&mut self, frame: usize) {
        self.touch(frame);
    }

    fn select_victim(&mut self) -> Option<usize> {
        self.access_order.pop_front()
    }

    fn on_release(&mut self, frame: usize) {
        self.remove(frame);
    }

    fn on_reinstate(&mut self, frame: usize) {
        self.remove(frame);
        self.access_order.push_front(frame);
    }

    fn eviction_order(&self) -> Vec<usize> {
        self.access_order.iter().copied().collect()
    }
}
