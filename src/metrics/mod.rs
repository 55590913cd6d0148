//! Derived container metrics computed from cgroup readings.
//!
//! Every function here reads fresh values through a [`CgroupReader`], so each call
//! reflects the moment it was made. Composite values fail as a whole: if any input
//! cannot be read or parsed, no partial result is returned.
//!
//! # Main types
//!
//! - [`MetricsResult`]: memory and CPU readings taken in one pass, nested by controller.
//! - [`MemorySnapshot`]: raw memory readings with helpers for usage and effective limit.
//! - [`CpuSample`] / [`CpuStatSample`]: cumulative CPU counters with their capture time.
//!
//! # Example
//!
//! ```no_run
//! use cgroup_metrics::cgroup::CgroupReader;
//! use cgroup_metrics::metrics::compute_cpu_utilization;
//!
//! let reader = CgroupReader::default();
//! let first = reader.read_cpu_usage_sample()?;
//! std::thread::sleep(std::time::Duration::from_secs(1));
//! let second = reader.read_cpu_usage_sample()?;
//! println!("cpu: {:.2}%", compute_cpu_utilization(&first, &second)?);
//! # Ok::<(), cgroup_metrics::cgroup::Error>(())
//! ```

mod cpu;
mod memory;

#[cfg(test)]
pub(crate) mod fixtures;

pub use cpu::{CpuSample, CpuStatSample, compute_cpu_utilization};
pub use memory::{MemorySnapshot, container_usage, effective_limit, usage_percentage};

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::cgroup::{CgroupReader, Result};

/// Memory metrics of one collection pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MemoryMetrics {
    /// `rss + kmem usage`, in bytes.
    pub container_usage: u64,
    /// `container_usage` as a percentage of the effective memory limit.
    pub container_usage_percentage: f64,
}

/// CPU accounting metrics of one collection pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CpuacctMetrics {
    /// `cpuacct.usage`.
    pub usage: CpuSample,
    /// `cpuacct.stat`.
    pub stat: CpuStatSample,
}

/// All metrics read in one pass, nested by controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricsResult {
    pub memory: MemoryMetrics,
    pub cpuacct: CpuacctMetrics,
}

impl MetricsResult {
    /// Flattens the nested result into a single level keyed by dotted paths,
    /// e.g. `memory.container_usage` or `cpuacct.stat.user.cumulative_nanos`.
    ///
    /// # Errors
    ///
    /// Fails only if the result cannot be represented as JSON.
    pub fn flatten(&self) -> serde_json::Result<BTreeMap<String, Value>> {
        let value = serde_json::to_value(self)?;
        let mut out = BTreeMap::new();
        flatten_into(String::new(), value, &mut out);
        Ok(out)
    }

    /// Wraps the result as [`MetricsOutput`], flattened if `flatten` is set.
    pub fn into_output(self, flatten: bool) -> MetricsOutput {
        if !flatten {
            return MetricsOutput::Nested(self);
        }

        // Every field is a plain number, so conversion cannot fail.
        match self.flatten() {
            Ok(flat) => MetricsOutput::Flat(flat),
            Err(err) => {
                log::error!("failed to flatten metrics, returning them nested: {err}");
                MetricsOutput::Nested(self)
            }
        }
    }
}

/// Output of [`CgroupReader::collect_all_metrics`]: nested or flattened.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricsOutput {
    Nested(MetricsResult),
    Flat(BTreeMap<String, Value>),
}

fn flatten_into(prefix: String, value: Value, out: &mut BTreeMap<String, Value>) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, value) in map {
                let path = if prefix.is_empty() {
                    key
                } else {
                    format!("{prefix}.{key}")
                };
                flatten_into(path, value, out);
            }
        }
        leaf => {
            out.insert(prefix, leaf);
        }
    }
}

impl CgroupReader {
    /// Reads memory and CPU metrics in one pass.
    ///
    /// Memory usage is read once and reused for the percentage.
    ///
    /// # Errors
    ///
    /// Fails if any of the underlying reads or computations fails.
    pub fn collect_metrics(&self) -> Result<MetricsResult> {
        let container_usage = self.read_memory_usage()?;
        let container_usage_percentage = self.memory_usage_percentage_of(container_usage)?;
        let usage = self.read_cpu_usage_sample()?;
        let stat = self.read_cpu_stat()?;

        Ok(MetricsResult {
            memory: MemoryMetrics {
                container_usage,
                container_usage_percentage,
            },
            cpuacct: CpuacctMetrics { usage, stat },
        })
    }

    /// Collects all metrics, flattened into dotted keys if `flatten` is set.
    pub fn collect_all_metrics(&self, flatten: bool) -> Result<MetricsOutput> {
        Ok(self.collect_metrics()?.into_output(flatten))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cgroup::Error;

    #[test]
    fn test_collect_metrics() {
        let dir = fixtures::cgroup_tree(fixtures::STANDARD);
        let reader = fixtures::reader(&dir);

        let metrics = reader.collect_metrics().unwrap();
        assert_eq!(metrics.memory.container_usage, 6666);
        assert_eq!(
            metrics.memory.container_usage_percentage,
            6666.0 / 9999.0 * 100.0
        );
        assert_eq!(metrics.cpuacct.usage.cumulative_nanos, 1000);
        assert_eq!(metrics.cpuacct.stat.user.cumulative_nanos, 2000);
        assert_eq!(metrics.cpuacct.stat.system.cumulative_nanos, 3000);
    }

    #[test]
    fn test_collect_all_metrics_nested() {
        let dir = fixtures::cgroup_tree(fixtures::STANDARD);
        let reader = fixtures::reader(&dir);

        match reader.collect_all_metrics(false).unwrap() {
            MetricsOutput::Nested(metrics) => assert_eq!(metrics.memory.container_usage, 6666),
            other => panic!("Expected nested output, got {other:?}"),
        }
    }

    #[test]
    fn test_collect_all_metrics_flat() {
        let dir = fixtures::cgroup_tree(fixtures::STANDARD);
        let reader = fixtures::reader(&dir);

        let flat = match reader.collect_all_metrics(true).unwrap() {
            MetricsOutput::Flat(flat) => flat,
            other => panic!("Expected flat output, got {other:?}"),
        };

        assert_eq!(flat["memory.container_usage"], 6666);
        assert_eq!(
            flat["memory.container_usage_percentage"],
            6666.0 / 9999.0 * 100.0
        );
        assert_eq!(flat["cpuacct.usage.cumulative_nanos"], 1000);
        assert_eq!(flat["cpuacct.stat.user.cumulative_nanos"], 2000);
        assert_eq!(flat["cpuacct.stat.system.cumulative_nanos"], 3000);
        assert!(flat["cpuacct.usage.timestamp_millis"].is_u64());
        assert!(flat["cpuacct.stat.user.timestamp_millis"].is_u64());
        assert!(flat["cpuacct.stat.system.timestamp_millis"].is_u64());
        assert_eq!(flat.len(), 8);
    }

    #[test]
    fn test_flat_output_serializes_as_single_level_object() {
        let dir = fixtures::cgroup_tree(fixtures::STANDARD);
        let reader = fixtures::reader(&dir);

        let output = reader.collect_all_metrics(true).unwrap();
        let json = serde_json::to_value(&output).unwrap();
        let object = json.as_object().unwrap();
        assert!(object.values().all(|value| !value.is_object()));
        assert_eq!(object["memory.container_usage"], 6666);
    }

    #[test]
    fn test_collect_metrics_fails_as_a_whole() {
        let dir = fixtures::standard_tree_with(&[("cpuacct/cpuacct.stat", "")]);
        let reader = fixtures::reader(&dir);

        match reader.collect_all_metrics(true).unwrap_err() {
            Error::Read(err) => assert!(err.is_empty_file()),
            other => panic!("Expected Read error, got {other:?}"),
        }
    }
}
