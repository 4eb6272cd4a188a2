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

mod error;
mod frame_table;
mod mmu;
mod mmu_config;
mod page;
mod real_memory;
mod shared_mmu;
mod swap_store;
mod util;

#[cfg(test)]
mod test;

pub use crate::mmu::{Mmu, MmuStats, Snapshot, Translation};
pub use crate::shared_mmu::SharedMmu;
pub use error::EngineError;
pub use mmu_config::MmuConfig;
pub use page::Page;
pub use util::ceil_div;
pub mod modules;
