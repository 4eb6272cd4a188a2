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

use crate::{error::EngineError, modules::eviction_policy::PolicyKind};

/// Parameters of one simulation run. All sizes are in bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MmuConfig {
    pub real_memory_size: usize,
    pub swap_size: usize,
    pub page_size: usize,

    /// only used by [`Mmu::new`](crate::Mmu::new)
    pub policy: PolicyKind,
}

impl Default for MmuConfig {
    fn default() -> Self {
        Self {
            real_memory_size: 2048,
            swap_size: 4096,
            page_size: 16,
            policy: PolicyKind::Fifo,
        }
    }
}

impl MmuConfig {
    /// Number of whole frames of real memory
    pub fn real_frames(&self) -> usize {
        self.real_memory_size.checked_div(self.page_size).unwrap_or(0)
    }

    /// Number of whole frames of swap
    pub fn swap_frames(&self) -> usize {
        self.swap_size.checked_div(self.page_size).unwrap_or(0)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.page_size == 0 {
            return Err(EngineError::InvalidConfiguration("page size must not be zero"));
        }
        if self.real_frames() == 0 {
            return Err(EngineError::InvalidConfiguration(
                "real memory has to hold at least one page",
            ));
        }
        if self.swap_frames() == 0 {
            return Err(EngineError::InvalidConfiguration(
                "swap has to hold at least one page",
            ));
        }

        Ok(())
    }
}
