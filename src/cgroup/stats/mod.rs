//! This module provides typed parsers for the cgroup v1 files this crate reads.
//!
//! Each file shape has a matching trait from [`parser`]:
//!
//! - `label value` lines (`memory.stat`, `cpuacct.stat`, `/proc/meminfo`) implement [`KeyValueStat`].
//! - Single-line files (`memory.kmem.usage_in_bytes`, `memory.limit_in_bytes`,
//!   `cpuacct.usage`, `cpuacct.usage_percpu`) implement [`SingleLineStat`].
//!
//! Parsers never substitute defaults for values that are present but unreadable; they
//! fail with a [`StatParseError`] instead.

mod cpu;
mod error;
mod meminfo;
mod memory;
mod parser;

pub use cpu::{CpuacctStat, CpuacctUsage, CpuacctUsagePercpu};
pub use error::StatParseError;
pub use meminfo::MemInfo;
pub use memory::{KmemUsage, MemoryLimit, MemoryStat, UNLIMITED_MEMORY_SENTINEL};
pub use parser::{KeyValueStat, SingleLineStat};
