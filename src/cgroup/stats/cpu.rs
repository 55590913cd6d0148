//! This module provides parsing utilities for CPU accounting statistics as reported in the
//! cgroup v1 `cpuacct` controller.
//!
//! It supports parsing of:
//!
//! - **Label/value statistics** from `cpuacct.stat`, with the `user` and `system` lines
//!   both required. These are parsed into [`CpuacctStat`].
//! - **Single-line statistics** from `cpuacct.usage` (a single cumulative counter in
//!   nanoseconds) and `cpuacct.usage_percpu` (one counter per CPU, space separated).
//!
//! # Examples
//!
//! ```rust
//! use cgroup_metrics::cgroup::stats::{CpuacctStat, CpuacctUsage, CpuacctUsagePercpu, KeyValueStat, SingleLineStat};
//!
//! let stat = CpuacctStat::from_reader(&mut "user 2000\nsystem 3000\n".as_bytes()).unwrap();
//! assert_eq!((stat.user, stat.system), (2000, 3000));
//!
//! let usage = CpuacctUsage::from_reader(&mut "1000\n".as_bytes()).unwrap();
//! assert_eq!(usage.usage_nanos, 1000);
//!
//! let percpu = CpuacctUsagePercpu::from_reader(&mut "10 20 30\n".as_bytes()).unwrap();
//! assert_eq!(percpu.usage_nanos, vec![10, 20, 30]);
//! ```

use std::collections::HashMap;
use std::io::BufRead;
use std::sync::LazyLock;

use super::parser::read_scalar;
use super::{KeyValueStat, SingleLineStat, StatParseError};

/// Represents parsed data from a cgroup `cpuacct.stat` file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CpuacctStat {
    /// CPU time spent in user space.
    pub user: u64,
    /// CPU time spent in kernel (system) space.
    pub system: u64,
}

impl CpuacctStat {
    fn set_user(&mut self, user: u64) {
        self.user = user;
    }

    fn set_system(&mut self, system: u64) {
        self.system = system;
    }
}

type Setter = fn(&mut CpuacctStat, u64);

static SETTERS: LazyLock<HashMap<&'static str, Setter>> = LazyLock::new(|| {
    let mut m: HashMap<&'static str, Setter> = HashMap::with_capacity(2);

    m.insert("user", CpuacctStat::set_user);
    m.insert("system", CpuacctStat::set_system);

    m
});

impl KeyValueStat for CpuacctStat {
    const ALLOW_DUPLICATE_KEYS: bool = false;
    const REQUIRED_KEYS: &'static [&'static str] = &["user", "system"];

    fn field_handlers() -> &'static HashMap<&'static str, fn(&mut Self, u64)> {
        &SETTERS
    }
}

/// Represents the cumulative CPU time from `cpuacct.usage`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CpuacctUsage {
    /// Total CPU time consumed by the cgroup since its creation, in nanoseconds.
    pub usage_nanos: u64,
}

impl SingleLineStat for CpuacctUsage {
    fn from_reader<R: BufRead>(buf: &mut R) -> Result<Self, StatParseError> {
        Ok(CpuacctUsage {
            usage_nanos: read_scalar(buf)?,
        })
    }
}

/// Represents per-CPU cumulative usage from `cpuacct.usage_percpu`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CpuacctUsagePercpu {
    /// CPU time in nanoseconds, indexed by CPU number.
    pub usage_nanos: Vec<u64>,
}

impl SingleLineStat for CpuacctUsagePercpu {
    /// Parses the space-separated counter list of `cpuacct.usage_percpu`.
    ///
    /// # Errors
    ///
    /// - [`StatParseError::InvalidValue`] if any element is not a number.
    /// - [`StatParseError::MissingField`] if the line holds no elements.
    fn from_reader<R: BufRead>(buf: &mut R) -> Result<Self, StatParseError> {
        let mut line = String::new();
        buf.read_line(&mut line)?;

        let usage_nanos = line
            .split_whitespace()
            .map(|value| {
                value
                    .parse::<u64>()
                    .map_err(|source| StatParseError::InvalidValue {
                        value: value.to_string(),
                        line: 1,
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if usage_nanos.is_empty() {
            return Err(StatParseError::MissingField {
                field: "usage_percpu".to_string(),
            });
        }

        Ok(CpuacctUsagePercpu { usage_nanos })
    }
}
