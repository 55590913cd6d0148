//! Container memory usage and its share of the memory limit.
//!
//! Usage is the resident set (`rss` from `memory.stat`) plus kernel memory
//! (`memory.kmem.usage_in_bytes`). The limit is `memory.limit_in_bytes`, except when the
//! kernel reports no limit: then the host's total memory is the effective limit.

use serde::Serialize;

use crate::cgroup::stats::{KmemUsage, MemoryLimit, MemoryStat};
use crate::cgroup::{self, CgroupReader, MalformedField, MalformedMetric, Metric, Result};

/// One reading of the memory controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MemorySnapshot {
    /// `rss` from `memory.stat`.
    pub resident_bytes: u64,
    /// `memory.kmem.usage_in_bytes`.
    pub kernel_memory_bytes: u64,
    /// `memory.limit_in_bytes` as reported, possibly the unlimited sentinel.
    pub limit_bytes: u64,
}

impl MemorySnapshot {
    /// Returns `resident_bytes + kernel_memory_bytes`.
    pub fn container_usage_bytes(&self) -> std::result::Result<u64, MalformedMetric> {
        container_usage(self.resident_bytes, self.kernel_memory_bytes)
    }

    /// Returns `true` if the cgroup has no memory limit configured.
    pub fn is_unlimited(&self) -> bool {
        MemoryLimit {
            limit_bytes: self.limit_bytes,
        }
        .is_unlimited()
    }

    /// Returns the limit usage should be measured against.
    pub fn effective_limit(&self, host_total_bytes: u64) -> u64 {
        effective_limit(self.limit_bytes, host_total_bytes)
    }
}

/// Adds resident and kernel memory.
///
/// # Errors
///
/// Returns [`MalformedMetric`] naming both operands if the sum does not fit in a `u64`.
pub fn container_usage(
    resident_bytes: u64,
    kernel_memory_bytes: u64,
) -> std::result::Result<u64, MalformedMetric> {
    resident_bytes
        .checked_add(kernel_memory_bytes)
        .ok_or_else(|| MalformedMetric {
            fields: vec![
                MalformedField::new("rss", resident_bytes.to_string()),
                MalformedField::new("kmem_usage", kernel_memory_bytes.to_string()),
            ],
        })
}

/// Returns `raw_limit_bytes`, or `host_total_bytes` if the raw limit means "unlimited".
///
/// # Examples
///
/// ```
/// use cgroup_metrics::cgroup::stats::UNLIMITED_MEMORY_SENTINEL;
/// use cgroup_metrics::metrics::effective_limit;
///
/// assert_eq!(effective_limit(9999, 80_000), 9999);
/// assert_eq!(effective_limit(UNLIMITED_MEMORY_SENTINEL, 80_000), 80_000);
/// assert_eq!(effective_limit(0, 80_000), 80_000);
/// ```
pub fn effective_limit(raw_limit_bytes: u64, host_total_bytes: u64) -> u64 {
    let limit = MemoryLimit {
        limit_bytes: raw_limit_bytes,
    };
    if limit.is_unlimited() {
        host_total_bytes
    } else {
        raw_limit_bytes
    }
}

/// Returns `usage / limit * 100`.
///
/// # Errors
///
/// Returns [`MalformedMetric`] naming the limit if it is zero.
pub fn usage_percentage(
    usage_bytes: u64,
    limit_bytes: u64,
) -> std::result::Result<f64, MalformedMetric> {
    if limit_bytes == 0 {
        return Err(MalformedMetric::single("limit", "0"));
    }
    Ok(usage_bytes as f64 / limit_bytes as f64 * 100.0)
}

impl CgroupReader {
    /// Reads and parses `memory.stat`.
    pub fn read_memory_stat(&self) -> Result<MemoryStat> {
        self.read_key_value(Metric::MemoryStat)
    }

    /// Reads `memory.kmem.usage_in_bytes`.
    pub fn read_kmem_usage(&self) -> Result<u64> {
        self.read_single::<KmemUsage>(Metric::MemoryKmemUsage)
            .map(|kmem| kmem.usage_bytes)
    }

    /// Reads `memory.limit_in_bytes` without any fallback applied.
    pub fn read_raw_memory_limit(&self) -> Result<u64> {
        self.read_single::<MemoryLimit>(Metric::MemoryLimit)
            .map(|limit| limit.limit_bytes)
    }

    /// Reads all three memory files.
    ///
    /// # Errors
    ///
    /// Fails as a whole if any file fails. If both `rss` and kernel memory are
    /// malformed, the error names both.
    pub fn read_memory_snapshot(&self) -> Result<MemorySnapshot> {
        let (resident_bytes, kernel_memory_bytes) = self.read_usage_operands()?;
        let limit_bytes = self.read_raw_memory_limit()?;
        Ok(MemorySnapshot {
            resident_bytes,
            kernel_memory_bytes,
            limit_bytes,
        })
    }

    /// Reads the container's memory usage in bytes: `rss + kmem usage`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use cgroup_metrics::cgroup::CgroupReader;
    /// let usage = CgroupReader::default().read_memory_usage()?;
    /// println!("container uses {usage} bytes");
    /// # Ok::<(), cgroup_metrics::cgroup::Error>(())
    /// ```
    pub fn read_memory_usage(&self) -> Result<u64> {
        let (rss, kmem) = self.read_usage_operands()?;
        Ok(container_usage(rss, kmem)?)
    }

    /// Reads the effective memory limit in bytes.
    ///
    /// When `memory.limit_in_bytes` is the unlimited sentinel or zero, the host's
    /// total memory is returned instead.
    pub fn read_memory_limit(&self) -> Result<u64> {
        let raw = self.read_raw_memory_limit()?;
        if !(MemoryLimit { limit_bytes: raw }).is_unlimited() {
            return Ok(raw);
        }

        let host_total = self.read_host_total_memory()?;
        log::debug!(
            "memory limit {} means unlimited, using host total memory {}",
            raw,
            host_total
        );
        Ok(effective_limit(raw, host_total))
    }

    /// Reads memory usage and returns it as a percentage of the effective limit.
    pub fn read_memory_usage_percentage(&self) -> Result<f64> {
        let usage = self.read_memory_usage()?;
        self.memory_usage_percentage_of(usage)
    }

    /// Returns an already known `usage_bytes` as a percentage of the effective limit.
    ///
    /// Only the limit is read; use this when usage was read moments before to
    /// avoid reading `memory.stat` twice.
    pub fn memory_usage_percentage_of(&self, usage_bytes: u64) -> Result<f64> {
        let limit = self.read_memory_limit()?;
        Ok(usage_percentage(usage_bytes, limit)?)
    }

    fn read_usage_operands(&self) -> Result<(u64, u64)> {
        let rss = self.read_memory_stat().map(|stat| stat.rss);
        let kmem = self.read_kmem_usage();
        cgroup::join(rss, kmem)
    }
}
