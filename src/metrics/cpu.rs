//! CPU accounting samples and the utilization rate between two of them.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::cgroup::stats::{CpuacctStat, CpuacctUsage, CpuacctUsagePercpu};
use crate::cgroup::{CgroupReader, Error, Metric, Result};

const NANOS_PER_MILLI: f64 = 1_000_000.0;

/// A cumulative CPU counter captured at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CpuSample {
    /// CPU time consumed by the cgroup since it was created, in nanoseconds.
    pub cumulative_nanos: u64,
    /// Capture time in milliseconds since the UNIX epoch.
    pub timestamp_millis: u64,
}

impl CpuSample {
    pub fn new(cumulative_nanos: u64, timestamp_millis: u64) -> Self {
        Self {
            cumulative_nanos,
            timestamp_millis,
        }
    }
}

/// The `user` and `system` counters of `cpuacct.stat`, captured together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CpuStatSample {
    pub user: CpuSample,
    pub system: CpuSample,
}

/// Returns the CPU utilization in percent between two samples of the same counter.
///
/// The result is `Δnanos / (Δmillis * 1e6) * 100`, so a container saturating two
/// cores reports 200.
///
/// # Errors
///
/// - [`Error::UnorderedSamples`] unless `second` was taken strictly after `first`.
/// - [`Error::CounterReset`] if the counter of `second` is lower than that of `first`.
///
/// # Examples
///
/// ```
/// use cgroup_metrics::metrics::{CpuSample, compute_cpu_utilization};
///
/// let first = CpuSample::new(400_000_029, 100_000);
/// let second = CpuSample::new(430_000_029, 102_000);
/// assert_eq!(compute_cpu_utilization(&first, &second).unwrap(), 1.5);
/// ```
pub fn compute_cpu_utilization(first: &CpuSample, second: &CpuSample) -> Result<f64> {
    if second.timestamp_millis <= first.timestamp_millis {
        return Err(Error::UnorderedSamples {
            first_millis: first.timestamp_millis,
            second_millis: second.timestamp_millis,
        });
    }
    let Some(delta_nanos) = second.cumulative_nanos.checked_sub(first.cumulative_nanos) else {
        return Err(Error::CounterReset {
            first_nanos: first.cumulative_nanos,
            second_nanos: second.cumulative_nanos,
        });
    };

    let elapsed_nanos = (second.timestamp_millis - first.timestamp_millis) as f64 * NANOS_PER_MILLI;
    Ok(delta_nanos as f64 / elapsed_nanos * 100.0)
}

/// Returns the current wall-clock time in milliseconds since the UNIX epoch.
pub(crate) fn now_millis() -> Result<u64> {
    let elapsed = SystemTime::now().duration_since(UNIX_EPOCH)?;
    Ok(elapsed.as_millis() as u64)
}

impl CgroupReader {
    /// Reads `cpuacct.usage` and stamps it with the current time.
    pub fn read_cpu_usage_sample(&self) -> Result<CpuSample> {
        let usage: CpuacctUsage = self.read_single(Metric::CpuacctUsage)?;
        Ok(CpuSample::new(usage.usage_nanos, now_millis()?))
    }

    /// Reads `cpuacct.stat`; both counters share one capture timestamp.
    pub fn read_cpu_stat(&self) -> Result<CpuStatSample> {
        let stat: CpuacctStat = self.read_key_value(Metric::CpuacctStat)?;
        let timestamp_millis = now_millis()?;
        Ok(CpuStatSample {
            user: CpuSample::new(stat.user, timestamp_millis),
            system: CpuSample::new(stat.system, timestamp_millis),
        })
    }

    /// Reads `cpuacct.usage_percpu`: cumulative nanoseconds indexed by CPU.
    pub fn read_cpu_usage_percpu(&self) -> Result<Vec<u64>> {
        let percpu: CpuacctUsagePercpu = self.read_single(Metric::CpuacctUsagePercpu)?;
        Ok(percpu.usage_nanos)
    }
}
