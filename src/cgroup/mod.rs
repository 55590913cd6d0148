//! Access to container resource accounting through the cgroup v1 filesystem.
//!
//! This module resolves, reads and parses the small set of pseudo-files the
//! `memory` and `cpuacct` controllers expose for the cgroup the process runs in.
//! The derived metrics built on top of these readings live in [`crate::metrics`].
//!
//! # Key Components
//!
//! - [`Metric`]: The closed set of files this crate reads.
//! - [`CgroupReader`]: Resolves a [`Metric`] below a cgroup root, reads it and parses it.
//! - [`stats`]: Typed parsers for each file shape.
//! - [`Error`]: Read, parse and malformed-value failures.
//!
//! # Supported Files
//!
//! - `memory/memory.stat`, `memory/memory.kmem.usage_in_bytes`, `memory/memory.limit_in_bytes`
//! - `cpuacct/cpuacct.usage`, `cpuacct/cpuacct.stat`, `cpuacct/cpuacct.usage_percpu`
//! - `/proc/meminfo` for the host total memory
//!
//! # Platform Requirements
//!
//! - Linux with the cgroup v1 `memory` and `cpuacct` controllers mounted.
//! - Read access to `/sys/fs/cgroup` and `/proc/meminfo`.
mod error;
mod metric;
mod reader;
pub mod stats;

pub(crate) use error::join;
pub use error::{Error, MalformedField, MalformedMetric, Result};
pub use metric::Metric;
pub use reader::{CgroupReader, CgroupReaderBuilder, DEFAULT_CGROUP_ROOT, DEFAULT_MEMINFO_PATH};
