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

use core::{fmt, str::FromStr};

use crate::error::EngineError;

mod fifo;
mod lru;

pub use fifo::FifoEvictionPolicyModule;
pub use lru::LruEvictionPolicyModule;

/// Decides which occupied real memory frame is sacrificed next.
///
/// The tracked set of frame indices always has to mirror the occupied
/// frames of real memory. Real memory calls these hooks in the same
/// operation that changes its occupancy.
pub trait EvictionPolicyModule {
    /// `frame` was just filled with a new page
    fn on_allocate(&mut self, frame: usize);

    /// the page in `frame` was accessed
    fn on_access(&mut self, frame: usize);

    /// Removes the next victim from the tracked set and returns it,
    /// or `None` if no frame is tracked.
    fn select_victim(&mut self) -> Option<usize>;

    /// `frame` was freed without being evicted (e.g. its owner was removed)
    fn on_release(&mut self, frame: usize);

    /// Undoes the last `select_victim` which returned `frame`, so that
    /// `frame` is the next victim again.
    fn on_reinstate(&mut self, frame: usize);

    /// All tracked frames, the next victim first
    fn eviction_order(&self) -> Vec<usize>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PolicyKind {
    #[default]
    Fifo,
    Lru,
}

impl FromStr for PolicyKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fifo" => Ok(PolicyKind::Fifo),
            "lru" => Ok(PolicyKind::Lru),
            _ => Err(EngineError::UnknownPolicy(s.to_string())),
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyKind::Fifo => write!(f, "FIFO"),
            PolicyKind::Lru => write!(f, "LRU"),
        }
    }
}

/// Policy that is chosen at runtime, e.g. from a command line flag.
pub enum DynamicEvictionPolicyModule {
    Fifo(FifoEvictionPolicyModule),
    Lru(LruEvictionPolicyModule),
}

impl DynamicEvictionPolicyModule {
    pub fn new(kind: PolicyKind) -> Self {
        match kind {
            PolicyKind::Fifo => Self::Fifo(FifoEvictionPolicyModule::new()),
            PolicyKind::Lru => Self::Lru(LruEvictionPolicyModule::new()),
        }
    }

    pub fn kind(&self) -> PolicyKind {
        match self {
            Self::Fifo(_) => PolicyKind::Fifo,
            Self::Lru(_) => PolicyKind::Lru,
        }
    }
}

macro_rules! delegate {
    ($self: ident, $inner: ident => $call: expr) => {
        match $self {
            DynamicEvictionPolicyModule::Fifo($inner) => $call,
            DynamicEvictionPolicyModule::Lru($inner) => $call,
        }
    };
}

impl EvictionPolicyModule for DynamicEvictionPolicyModule {
    fn on_allocate(&mut self, frame: usize) {
        delegate!(self, inner => inner.on_allocate(frame))
    }

    fn on_access(&mut self, frame: usize) {
        delegate!(self, inner => inner.on_access(frame))
    }

    fn select_victim(&mut self) -> Option<usize> {
        delegate!(self, inner => inner.select_victim())
    }

    fn on_release(&mut self, frame: usize) {
        delegate!(self, inner => inner.on_release(frame))
    }

    fn on_reinstate(&mut self, frame: usize) {
        delegate!(self, inner => inner.on_reinstate(frame))
    }

    fn eviction_order(&self) -> Vec<usize> {
        delegate!(self, inner => inner.eviction_order())
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::{DynamicEvictionPolicyModule, EvictionPolicyModule, PolicyKind};
    use crate::error::EngineError;

    /// behaviour that both policies share
    pub(crate) fn test_policy_common<P: EvictionPolicyModule>(mut policy: P) {
        assert_eq!(policy.select_victim(), None);

        policy.on_allocate(3);
        policy.on_allocate(1);
        policy.on_allocate(2);

        // released frames are never chosen
        policy.on_release(1);
        policy.on_release(7);
        assert_eq!(policy.eviction_order(), vec![3, 2]);

        // reinstating puts the victim back in front
        let victim = policy.select_victim().unwrap();
        assert_eq!(victim, 3);
        policy.on_reinstate(victim);
        assert_eq!(policy.eviction_order(), vec![3, 2]);

        assert_eq!(policy.select_victim(), Some(3));
        assert_eq!(policy.select_victim(), Some(2));
        assert_eq!(policy.select_victim(), None);
    }

    #[test]
    fn test_parse_policy_kind() {
        assert_eq!("fifo".parse::<PolicyKind>(), Ok(PolicyKind::Fifo));
        assert_eq!("FIFO".parse::<PolicyKind>(), Ok(PolicyKind::Fifo));
        assert_eq!("Lru".parse::<PolicyKind>(), Ok(PolicyKind::Lru));
        assert_eq!(
            "clock".parse::<PolicyKind>(),
            Err(EngineError::UnknownPolicy("clock".into()))
        );
        assert_eq!(PolicyKind::default(), PolicyKind::Fifo);
    }

    #[test]
    fn test_dynamic_policy_common() {
        test_policy_common(DynamicEvictionPolicyModule::new(PolicyKind::Fifo));
        test_policy_common(DynamicEvictionPolicyModule::new(PolicyKind::Lru));
    }

    #[test]
    fn test_dynamic_policy_dispatch() {
        let mut fifo = DynamicEvictionPolicyModule::new(PolicyKind::Fifo);
        let mut lru = DynamicEvictionPolicyModule::new(PolicyKind::Lru);
        assert_eq!(fifo.kind(), PolicyKind::Fifo);
        assert_eq!(lru.kind(), PolicyKind::Lru);

        for policy in [&mut fifo, &mut lru] {
            policy.on_allocate(0);
            policy.on_allocate(1);
            policy.on_access(0);
        }

        assert_eq!(fifo.select_victim(), Some(0));
        assert_eq!(lru.select_victim(), Some(1));
    }
}
