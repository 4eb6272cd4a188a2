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
use std::{
    collections::BTreeMap,
    io::{self, Write},
    time::{Duration, Instant},
};

use log::{debug, warn};
use memsim::{
    ceil_div, modules::eviction_policy::DynamicEvictionPolicyModule, EngineError, Mmu,
    MmuConfig, Snapshot, Translation,
};

/// Bookkeeping of one process, the MMU itself knows nothing about processes.
#[derive(Debug, Clone)]
pub struct ProcessRecord {
    pub live: bool,
    pub size: usize,
    pub start: Instant,
    pub end: Option<Instant>,
    pub page_faults: u64,
}

impl ProcessRecord {
    fn turnaround(&self, now: Instant) -> Duration {
        self.end.unwrap_or(now) - self.start
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CpuError {
    ZeroSize,
    AlreadyLoaded(String),
    NotLoaded(String),
    AddressOutOfRange { pid: String, address: usize, size: usize },
    Engine(EngineError),
}

impl fmt::Display for CpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CpuError::ZeroSize => write!(f, "size should not be 0"),
            CpuError::AlreadyLoaded(pid) => write!(f, "PID {} is already in cpu", pid),
            CpuError::NotLoaded(pid) => write!(f, "PID {} is not present in cpu", pid),
            CpuError::AddressOutOfRange { pid, address, size } => write!(
                f,
                "address {} is outside of PID {} (size {})",
                address, pid, size
            ),
            CpuError::Engine(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for CpuError {}

impl From<EngineError> for CpuError {
    fn from(err: EngineError) -> Self {
        CpuError::Engine(err)
    }
}

/// The process registry: maps process ids to their pages inside the MMU.
pub struct Cpu {
    mmu: Mmu<DynamicEvictionPolicyModule>,
    processes: BTreeMap<String, ProcessRecord>,
}

impl Cpu {
    pub fn new(config: &MmuConfig) -> Result<Self, EngineError> {
        Ok(Self {
            mmu: Mmu::new(config)?,
            processes: BTreeMap::new(),
        })
    }

    /// Loads a process of `size` bytes, allocating all of its pages.
    pub fn create_process(&mut self, pid: &str, size: usize) -> Result<(), CpuError> {
        if size == 0 {
            return Err(CpuError::ZeroSize);
        }
        if self.processes.get(pid).is_some_and(|process| process.live) {
            return Err(CpuError::AlreadyLoaded(pid.to_string()));
        }

        let page_count = ceil_div(size, self.mmu.page_size());
        debug!("PID {} needs {} pages", pid, page_count);

        for page in 0..page_count {
            if let Err(err) = self.mmu.allocate_page(pid, page) {
                // do not keep half loaded processes around
                if page > 0 {
                    if let Err(cleanup) = self.mmu.remove_pages(pid) {
                        warn!("could not unload PID {}: {}", pid, cleanup);
                    }
                }
                return Err(err.into());
            }
        }

        self.processes.insert(
            pid.to_string(),
            ProcessRecord {
                live: true,
                size,
                start: Instant::now(),
                end: None,
                page_faults: 0,
            },
        );
        Ok(())
    }

    pub fn access_process(&mut self, pid: &str, address: usize) -> Result<Translation, CpuError> {
        let process = match self.processes.get_mut(pid) {
            Some(process) if process.live => process,
            _ => return Err(CpuError::NotLoaded(pid.to_string())),
        };
        if address >= process.size {
            return Err(CpuError::AddressOutOfRange {
                pid: pid.to_string(),
                address,
                size: process.size,
            });
        }

        let translation = self.mmu.access_page(pid, address)?;
        if translation.page_fault {
            process.page_faults += 1;
        }

        Ok(translation)
    }

    pub fn delete_process(&mut self, pid: &str) -> Result<(), CpuError> {
        let process = match self.processes.get_mut(pid) {
            Some(process) if process.live => process,
            _ => return Err(CpuError::NotLoaded(pid.to_string())),
        };

        self.mmu.remove_pages(pid)?;
        process.live = false;
        process.end = Some(Instant::now());
        Ok(())
    }

    #[cfg(test)]
    pub fn process(&self, pid: &str) -> Option<&ProcessRecord> {
        self.processes.get(pid)
    }

    pub fn mmu(&self) -> &Mmu<DynamicEvictionPolicyModule> {
        &self.mmu
    }

    /// Prints turnaround times (in µs), page faults and swap counts.
    pub fn report<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let now = Instant::now();

        writeln!(w, "\n** Stats **")?;
        writeln!(w, "(times in µs)")?;

        writeln!(w, "\nTurnaround time")?;
        let mut total = Duration::ZERO;
        for (pid, process) in self.processes.iter() {
            let turnaround = process.turnaround(now);
            total += turnaround;
            writeln!(w, "PID: {}\t-  {}", pid, turnaround.as_micros())?;
        }

        writeln!(w, "\nAverage turnaround time")?;
        match u32::try_from(self.processes.len()) {
            Ok(count) if count > 0 => writeln!(w, "{}", (total / count).as_micros())?,
            _ => writeln!(w, "-")?,
        }

        writeln!(w, "\nPage Faults per process")?;
        for (pid, process) in self.processes.iter() {
            writeln!(w, "PID: {}\t-  {}", pid, process.page_faults)?;
        }

        let stats = self.mmu.stats();
        writeln!(w, "\nTotal swaps")?;
        writeln!(w, "out: {}\tin: {}", stats.swap_outs, stats.swap_ins)?;
        writeln!(w, "\n** End of Stats **\n")?;
        Ok(())
    }
}

/// Renders real memory and swap side by side.
pub fn print_snapshot<W: Write>(snapshot: &Snapshot, w: &mut W) -> io::Result<()> {
    writeln!(w, "RAM\t\tSWAP")?;

    let rows = snapshot.real.len().max(snapshot.swap.len());
    for row in 0..rows {
        match snapshot.real.get(row) {
            Some(Some(page)) => write!(w, "{}\t{}\t", page.owner, page.virtual_page)?,
            _ => write!(w, "\t\t")?,
        }
        match snapshot.swap.get(row) {
            Some(Some(page)) => writeln!(w, "{}\t{}", page.owner, page.virtual_page)?,
            _ => writeln!(w)?,
        }
    }
    Ok(())
}
