use std::fmt;
use std::path::PathBuf;

/// The cgroup v1 files this crate knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    /// `memory/memory.stat`
    MemoryStat,
    /// `memory/memory.kmem.usage_in_bytes`
    MemoryKmemUsage,
    /// `memory/memory.limit_in_bytes`
    MemoryLimit,
    /// `cpuacct/cpuacct.usage`
    CpuacctUsage,
    /// `cpuacct/cpuacct.stat`
    CpuacctStat,
    /// `cpuacct/cpuacct.usage_percpu`
    CpuacctUsagePercpu,
}

impl Metric {
    pub const ALL: [Metric; 6] = [
        Metric::MemoryStat,
        Metric::MemoryKmemUsage,
        Metric::MemoryLimit,
        Metric::CpuacctUsage,
        Metric::CpuacctStat,
        Metric::CpuacctUsagePercpu,
    ];

    /// The controller directory the file lives in.
    pub const fn subsystem(&self) -> &'static str {
        match self {
            Metric::MemoryStat | Metric::MemoryKmemUsage | Metric::MemoryLimit => "memory",
            Metric::CpuacctUsage | Metric::CpuacctStat | Metric::CpuacctUsagePercpu => "cpuacct",
        }
    }

    pub const fn file_name(&self) -> &'static str {
        match self {
            Metric::MemoryStat => "memory.stat",
            Metric::MemoryKmemUsage => "memory.kmem.usage_in_bytes",
            Metric::MemoryLimit => "memory.limit_in_bytes",
            Metric::CpuacctUsage => "cpuacct.usage",
            Metric::CpuacctStat => "cpuacct.stat",
            Metric::CpuacctUsagePercpu => "cpuacct.usage_percpu",
        }
    }

    /// Name used for the file's value in error reports.
    ///
    /// Label/value files report the offending label instead, so this is only
    /// meaningful for single-value files.
    pub const fn field_name(&self) -> &'static str {
        match self {
            Metric::MemoryStat => "memory_stat",
            Metric::MemoryKmemUsage => "kmem_usage",
            Metric::MemoryLimit => "limit",
            Metric::CpuacctUsage => "usage",
            Metric::CpuacctStat => "cpuacct_stat",
            Metric::CpuacctUsagePercpu => "usage_percpu",
        }
    }

    /// Path relative to the cgroup root, e.g. `memory/memory.stat`.
    pub fn relative_path(&self) -> PathBuf {
        PathBuf::from(self.subsystem()).join(self.file_name())
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}
