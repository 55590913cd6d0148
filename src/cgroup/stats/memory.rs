//! This module provides parsing utilities for memory statistics as reported in cgroup v1 files.
//!
//! It supports parsing of:
//!
//! - **Label/value statistics** from `memory.stat`. Fields are looked up by label, and
//!   `rss` is required since container usage is derived from it.
//! - **Single-line scalar statistics** from `memory.kmem.usage_in_bytes` and
//!   `memory.limit_in_bytes`. These are parsed into [`KmemUsage`] and [`MemoryLimit`].
//!
//! # Examples
//!
//! ```rust
//! use cgroup_metrics::cgroup::stats::{KeyValueStat, KmemUsage, MemoryLimit, MemoryStat, SingleLineStat};
//!
//! let mem_stat = MemoryStat::from_reader(&mut "cache 2453\nrss 1234\n".as_bytes()).unwrap();
//! assert_eq!(mem_stat.rss, 1234);
//!
//! let kmem = KmemUsage::from_reader(&mut "5432\n".as_bytes()).unwrap();
//! assert_eq!(kmem.usage_bytes, 5432);
//!
//! let limit = MemoryLimit::from_reader(&mut "9223372036854771712\n".as_bytes()).unwrap();
//! assert!(limit.is_unlimited());
//! ```

use std::collections::HashMap;
use std::io::BufRead;
use std::sync::LazyLock;

use super::parser::{KeyValueStat, read_scalar};
use super::{SingleLineStat, StatParseError};

/// The value the kernel reports in `memory.limit_in_bytes` when no limit is configured.
///
/// This is `i64::MAX` rounded down to the 4 KiB page size.
pub const UNLIMITED_MEMORY_SENTINEL: u64 = 9_223_372_036_854_771_712;

/// Represents memory usage statistics from `memory.stat`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MemoryStat {
    /// Page cache memory.
    pub cache: u64,
    /// Resident set size: anonymous and swap cache memory, excluding kernel memory.
    pub rss: u64,
    /// Anonymous transparent huge pages.
    pub rss_huge: u64,
    /// Shared memory.
    pub shmem: u64,
    /// Mapped file memory.
    pub mapped_file: u64,
    /// Swap usage.
    pub swap: u64,
}

impl MemoryStat {
    fn set_cache(&mut self, v: u64) {
        self.cache = v;
    }

    fn set_rss(&mut self, v: u64) {
        self.rss = v;
    }

    fn set_rss_huge(&mut self, v: u64) {
        self.rss_huge = v;
    }

    fn set_shmem(&mut self, v: u64) {
        self.shmem = v;
    }

    fn set_mapped_file(&mut self, v: u64) {
        self.mapped_file = v;
    }

    fn set_swap(&mut self, v: u64) {
        self.swap = v;
    }
}

type Setter = fn(&mut MemoryStat, u64);

static SETTERS: LazyLock<HashMap<&'static str, Setter>> = LazyLock::new(|| {
    let mut m: HashMap<&'static str, Setter> = HashMap::with_capacity(6);

    m.insert("cache", MemoryStat::set_cache);
    m.insert("rss", MemoryStat::set_rss);
    m.insert("rss_huge", MemoryStat::set_rss_huge);
    m.insert("shmem", MemoryStat::set_shmem);
    m.insert("mapped_file", MemoryStat::set_mapped_file);
    m.insert("swap", MemoryStat::set_swap);

    m
});

impl KeyValueStat for MemoryStat {
    const ALLOW_DUPLICATE_KEYS: bool = false;
    const REQUIRED_KEYS: &'static [&'static str] = &["rss"];

    fn field_handlers() -> &'static HashMap<&'static str, fn(&mut Self, u64)> {
        &SETTERS
    }
}

/// Represents kernel memory usage from `memory.kmem.usage_in_bytes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KmemUsage {
    /// Kernel memory charged to the cgroup, in bytes.
    pub usage_bytes: u64,
}

impl SingleLineStat for KmemUsage {
    fn from_reader<R: BufRead>(buf: &mut R) -> Result<Self, StatParseError> {
        Ok(KmemUsage {
            usage_bytes: read_scalar(buf)?,
        })
    }
}

/// Represents the raw memory limit from `memory.limit_in_bytes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MemoryLimit {
    /// Memory limit in bytes, exactly as reported by the kernel.
    pub limit_bytes: u64,
}

impl MemoryLimit {
    /// Returns `true` if the limit means "no limit": the kernel sentinel
    /// (or anything above it), or zero.
    pub fn is_unlimited(&self) -> bool {
        self.limit_bytes >= UNLIMITED_MEMORY_SENTINEL || self.limit_bytes == 0
    }
}

impl SingleLineStat for MemoryLimit {
    /// Parses a `memory.limit_in_bytes` file.
    ///
    /// Unlike cgroup v2's `memory.max`, the v1 file never contains `max`;
    /// an unconfigured limit is reported as [`UNLIMITED_MEMORY_SENTINEL`].
    fn from_reader<R: BufRead>(buf: &mut R) -> Result<Self, StatParseError> {
        Ok(MemoryLimit {
            limit_bytes: read_scalar(buf)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_memory_stat() {
        let data = "cache 2453\nrss 1234\n";
        let stat = MemoryStat::from_reader(&mut data.as_bytes()).unwrap();
        assert_eq!(stat.cache, 2453);
        assert_eq!(stat.rss, 1234);
    }

    #[test]
    fn test_parse_real_memory_stat() {
        let data = "\
cache 1073741824
rss 524288000
rss_huge 0
shmem 4096
mapped_file 8192
dirty 0
writeback 0
swap 0
pgpgin 123456
pgpgout 654321
total_cache 1073741824
total_rss 524288000
";
        let stat = MemoryStat::from_reader(&mut data.as_bytes()).unwrap();
        assert_eq!(
            stat,
            MemoryStat {
                cache: 1_073_741_824,
                rss: 524_288_000,
                rss_huge: 0,
                shmem: 4096,
                mapped_file: 8192,
                swap: 0,
            }
        );
    }

    #[test]
    fn test_rss_found_regardless_of_line() {
        let data = "cache 1\nmapped_file 2\nshmem 3\nrss 4\n";
        let stat = MemoryStat::from_reader(&mut data.as_bytes()).unwrap();
        assert_eq!(stat.rss, 4);
    }

    #[test]
    fn test_total_rss_is_not_rss() {
        let data = "total_rss 99\n";
        let err = MemoryStat::from_reader(&mut data.as_bytes()).unwrap_err();
        assert!(matches!(err, StatParseError::MissingField { ref field } if field == "rss"));
    }

    #[test]
    fn test_parse_malformed_memory_stat() {
        let err = MemoryStat::from_reader(&mut "malformed data".as_bytes()).unwrap_err();
        match err {
            StatParseError::MissingField { field } => assert_eq!(field, "rss"),
            other => panic!("Expected MissingField error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_invalid_rss() {
        let data = "cache 2453\nrss abc\n";
        let err = MemoryStat::from_reader(&mut data.as_bytes()).unwrap_err();
        match err {
            StatParseError::InvalidKeyValue {
                key, value, line, ..
            } => {
                assert_eq!(key, "rss");
                assert_eq!(value, "abc");
                assert_eq!(line, 2);
            }
            other => panic!("Expected InvalidKeyValue error, got {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_memory_stat_field() {
        let data = "rss 1000\nrss 2000\n";
        let err = MemoryStat::from_reader(&mut data.as_bytes()).unwrap_err();
        match err {
            StatParseError::DuplicateField { field, line } => {
                assert_eq!(field, "rss");
                assert_eq!(line, 2);
            }
            other => panic!("Expected DuplicateField error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_kmem_usage() {
        let kmem = KmemUsage::from_reader(&mut "5432".as_bytes()).unwrap();
        assert_eq!(kmem.usage_bytes, 5432);
    }

    #[test]
    fn test_parse_invalid_kmem_usage() {
        let err = KmemUsage::from_reader(&mut "malformed data".as_bytes()).unwrap_err();
        match err {
            StatParseError::InvalidValue { value, line, .. } => {
                assert_eq!(value, "malformed data");
                assert_eq!(line, 1);
            }
            other => panic!("Expected InvalidValue error, got {other:?}"),
        }
    }

    #[test]
    fn test_memory_limit_unlimited() {
        let limit = MemoryLimit::from_reader(&mut "9999\n".as_bytes()).unwrap();
        assert_eq!(limit.limit_bytes, 9999);
        assert!(!limit.is_unlimited());

        let limit = MemoryLimit::from_reader(&mut "9223372036854771712\n".as_bytes()).unwrap();
        assert_eq!(limit.limit_bytes, UNLIMITED_MEMORY_SENTINEL);
        assert!(limit.is_unlimited());

        let limit = MemoryLimit::from_reader(&mut "18446744073709551615\n".as_bytes()).unwrap();
        assert!(limit.is_unlimited());

        let limit = MemoryLimit::from_reader(&mut "0\n".as_bytes()).unwrap();
        assert!(limit.is_unlimited());
    }

    #[test]
    fn test_negative_memory_limit_is_invalid() {
        let err = MemoryLimit::from_reader(&mut "-1\n".as_bytes()).unwrap_err();
        assert!(matches!(err, StatParseError::InvalidValue { .. }));
    }
}
