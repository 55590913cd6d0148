use std::path::{Path, PathBuf};

use crate::fsutil::{self, ReadError};

use super::error::{Error, MalformedMetric, Result};
use super::metric::Metric;
use super::stats::{KeyValueStat, MemInfo, SingleLineStat};

/// Default mount point of the cgroup v1 hierarchy.
pub const DEFAULT_CGROUP_ROOT: &str = "/sys/fs/cgroup";
/// Default location of the host memory summary.
pub const DEFAULT_MEMINFO_PATH: &str = "/proc/meminfo";

/// Reads and parses cgroup v1 metric files below a cgroup root.
///
/// Every call reads the file afresh; nothing is cached between calls.
#[derive(Debug, Clone)]
pub struct CgroupReader {
    cgroup_root: PathBuf,
    meminfo_path: PathBuf,
}

impl Default for CgroupReader {
    fn default() -> Self {
        Self {
            cgroup_root: PathBuf::from(DEFAULT_CGROUP_ROOT),
            meminfo_path: PathBuf::from(DEFAULT_MEMINFO_PATH),
        }
    }
}

impl CgroupReader {
    /// Creates a reader for the given cgroup root, using the host's `/proc/meminfo`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use cgroup_metrics::cgroup::{CgroupReader, Metric};
    /// let reader = CgroupReader::new("/sys/fs/cgroup");
    /// assert_eq!(
    ///     reader.path_of(Metric::CpuacctUsage).to_str(),
    ///     Some("/sys/fs/cgroup/cpuacct/cpuacct.usage")
    /// );
    /// ```
    pub fn new(cgroup_root: impl Into<PathBuf>) -> Self {
        Self {
            cgroup_root: cgroup_root.into(),
            ..Self::default()
        }
    }

    pub fn builder() -> CgroupReaderBuilder {
        CgroupReaderBuilder::default()
    }

    pub fn cgroup_root(&self) -> &Path {
        &self.cgroup_root
    }

    pub fn meminfo_path(&self) -> &Path {
        &self.meminfo_path
    }

    /// Resolves the absolute path of `metric` below the cgroup root.
    pub fn path_of(&self, metric: Metric) -> PathBuf {
        self.cgroup_root.join(metric.relative_path())
    }

    /// Reads the raw contents of `metric`.
    ///
    /// # Errors
    ///
    /// Returns a [`ReadError`] if the file is missing, unreadable, or empty.
    /// Outside of a container this is the expected failure, and the error names
    /// the path that was tried.
    pub fn read(&self, metric: Metric) -> std::result::Result<String, ReadError> {
        let path = self.path_of(metric);
        log::debug!("reading {} from {}", metric, path.display());
        fsutil::read_metric_file(path)
    }

    /// Reads and parses a single-line metric file.
    pub(crate) fn read_single<T: SingleLineStat>(&self, metric: Metric) -> Result<T> {
        let raw = self.read(metric)?;
        T::from_reader(&mut raw.as_bytes())
            .map_err(|err| Error::from_parse(metric.field_name(), self.path_of(metric), err))
    }

    /// Reads and parses a `label value` metric file.
    pub(crate) fn read_key_value<T: KeyValueStat>(&self, metric: Metric) -> Result<T> {
        let raw = self.read(metric)?;
        T::from_reader(&mut raw.as_bytes())
            .map_err(|err| Error::from_parse(metric.field_name(), self.path_of(metric), err))
    }

    /// Reads the host's total physical memory in bytes.
    ///
    /// # Errors
    ///
    /// Fails if the meminfo file cannot be read, lacks `MemTotal`, or reports zero.
    pub fn read_host_total_memory(&self) -> Result<u64> {
        let raw = fsutil::read_metric_file(&self.meminfo_path)?;
        let info = MemInfo::from_reader(&mut raw.as_bytes())
            .map_err(|err| Error::from_parse("MemTotal", self.meminfo_path.clone(), err))?;

        match info.total_bytes() {
            0 => Err(MalformedMetric::single("MemTotal", "0").into()),
            total => Ok(total),
        }
    }
}

/// Builder for [`CgroupReader`].
#[derive(Debug, Default)]
pub struct CgroupReaderBuilder {
    cgroup_root: Option<PathBuf>,
    meminfo_path: Option<PathBuf>,
}

impl CgroupReaderBuilder {
    /// Sets the directory the `memory` and `cpuacct` controllers are mounted under.
    pub fn set_cgroup_root(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.cgroup_root = Some(path.into());
        self
    }

    /// Sets the file consulted for host total memory.
    pub fn set_meminfo_path(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.meminfo_path = Some(path.into());
        self
    }

    /// Builds the reader. Unset paths fall back to [`DEFAULT_CGROUP_ROOT`] and
    /// [`DEFAULT_MEMINFO_PATH`].
    pub fn build(&self) -> CgroupReader {
        CgroupReader {
            cgroup_root: self
                .cgroup_root
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CGROUP_ROOT)),
            meminfo_path: self
                .meminfo_path
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MEMINFO_PATH)),
        }
    }
}
