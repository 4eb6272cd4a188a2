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

use core::fmt;

/// Everything that can go wrong inside the paging engine.
///
/// All variants are recoverable at the [`Mmu`](crate::Mmu) boundary except
/// [`EngineError::InvalidConfiguration`], which can only be returned while
/// constructing a tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The frame table of a tier has no free slot left
    Full,

    /// The requested owner/page is not present in a tier
    NotFound,

    /// An eviction was requested but real memory holds no page
    NoSwappingCandidate,

    /// Swap is full while an evicted page had to be stored
    SwapExhausted,

    /// Internal bookkeeping is inconsistent, this should never happen
    AllocationInconsistency,

    /// The page is neither resident in real memory nor in swap
    AddressNotFound,

    /// Zero page size or a tier with zero frames
    InvalidConfiguration(&'static str),

    /// Pages always need a non-empty owner
    InvalidOwner,

    /// The (owner, virtual page) pair already lives in real memory or swap
    AlreadyAllocated,

    /// Policy name that is neither FIFO nor LRU
    UnknownPolicy(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Full => write!(f, "no free frame available"),
            EngineError::NotFound => write!(f, "page not found"),
            EngineError::NoSwappingCandidate => write!(f, "no swapping candidate found"),
            EngineError::SwapExhausted => write!(f, "no space available in swap"),
            EngineError::AllocationInconsistency => {
                write!(f, "frame bookkeeping is inconsistent")
            }
            EngineError::AddressNotFound => write!(f, "address not found in memory or swap"),
            EngineError::InvalidConfiguration(reason) => {
                write!(f, "invalid configuration: {}", reason)
            }
            EngineError::InvalidOwner => write!(f, "page owner must not be empty"),
            EngineError::AlreadyAllocated => write!(f, "page is already allocated"),
            EngineError::UnknownPolicy(name) => write!(f, "{} is not a known policy", name),
        }
    }
}

impl std::error::Error for EngineError {}
