//! Runtime configuration of the polling binary, read from environment variables.

use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use crate::cgroup::{CgroupReader, DEFAULT_CGROUP_ROOT, DEFAULT_MEMINFO_PATH};

pub const CGROUP_ROOT_VAR: &str = "CGROUP_ROOT";
pub const MEMINFO_PATH_VAR: &str = "MEMINFO_PATH";
pub const POLL_INTERVAL_VAR: &str = "POLL_INTERVAL_SECS";
pub const FLATTEN_VAR: &str = "FLATTEN_METRICS";

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Errors raised for invalid configuration values.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("environment variable `{var}` is not valid unicode")]
    NotUnicode { var: &'static str },
    #[error("environment variable `{var}` must be a positive integer, got `{value}`")]
    InvalidInterval { var: &'static str, value: String },
    #[error("environment variable `{var}` must be a boolean, got `{value}`")]
    InvalidFlag { var: &'static str, value: String },
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub cgroup_root: PathBuf,
    pub meminfo_path: PathBuf,
    pub poll_interval: Duration,
    pub flatten: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cgroup_root: PathBuf::from(DEFAULT_CGROUP_ROOT),
            meminfo_path: PathBuf::from(DEFAULT_MEMINFO_PATH),
            poll_interval: DEFAULT_POLL_INTERVAL,
            flatten: false,
        }
    }
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|var| std::env::var_os(var))
    }

    /// Reads the configuration through `lookup`, falling back to defaults for unset variables.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<OsString>) -> Result<Self> {
        let defaults = Self::default();

        let cgroup_root = lookup(CGROUP_ROOT_VAR)
            .map(PathBuf::from)
            .unwrap_or(defaults.cgroup_root);
        let meminfo_path = lookup(MEMINFO_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or(defaults.meminfo_path);

        let poll_interval = match lookup(POLL_INTERVAL_VAR) {
            Some(raw) => parse_interval(POLL_INTERVAL_VAR, raw)?,
            None => defaults.poll_interval,
        };
        let flatten = match lookup(FLATTEN_VAR) {
            Some(raw) => parse_flag(FLATTEN_VAR, raw)?,
            None => defaults.flatten,
        };

        Ok(Self {
            cgroup_root,
            meminfo_path,
            poll_interval,
            flatten,
        })
    }

    pub fn reader(&self) -> CgroupReader {
        CgroupReader::builder()
            .set_cgroup_root(&self.cgroup_root)
            .set_meminfo_path(&self.meminfo_path)
            .build()
    }
}

fn to_str(var: &'static str, raw: OsString) -> Result<String> {
    raw.into_string().map_err(|_| Error::NotUnicode { var })
}

fn parse_interval(var: &'static str, raw: OsString) -> Result<Duration> {
    let value = to_str(var, raw)?;
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(Error::InvalidInterval { var, value }),
    }
}

fn parse_flag(var: &'static str, raw: OsString) -> Result<bool> {
    let value = to_str(var, raw)?;
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "" | "0" | "false" | "no" => Ok(false),
        _ => Err(Error::InvalidFlag { var, value }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<OsString> {
        let vars: HashMap<String, OsString> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), OsString::from(v)))
            .collect();
        move |var: &str| vars.get(var).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.cgroup_root, PathBuf::from("/sys/fs/cgroup"));
        assert_eq!(config.meminfo_path, PathBuf::from("/proc/meminfo"));
        assert_eq!(config.poll_interval, Duration::from_secs(1));
        assert!(!config.flatten);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("CGROUP_ROOT", "/tmp/cgroup"),
            ("MEMINFO_PATH", "/tmp/meminfo"),
            ("POLL_INTERVAL_SECS", "5"),
            ("FLATTEN_METRICS", "Yes"),
        ]))
        .unwrap();

        assert_eq!(config.cgroup_root, PathBuf::from("/tmp/cgroup"));
        assert_eq!(config.meminfo_path, PathBuf::from("/tmp/meminfo"));
        assert_eq!(config.poll_interval, Duration::from_secs(5));
        assert!(config.flatten);

        let reader = config.reader();
        assert_eq!(reader.cgroup_root(), config.cgroup_root.as_path());
        assert_eq!(reader.meminfo_path(), config.meminfo_path.as_path());
    }

    #[test]
    fn test_invalid_interval() {
        for value in ["0", "-1", "abc", "1.5"] {
            let err = Config::from_lookup(lookup(&[("POLL_INTERVAL_SECS", value)])).unwrap_err();
            match err {
                Error::InvalidInterval { var, value: got } => {
                    assert_eq!(var, POLL_INTERVAL_VAR);
                    assert_eq!(got, value);
                }
                other => panic!("Expected InvalidInterval error, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_flag_values() {
        for (value, expected) in [("1", true), ("true", true), ("0", false), ("no", false)] {
            let config = Config::from_lookup(lookup(&[("FLATTEN_METRICS", value)])).unwrap();
            assert_eq!(config.flatten, expected, "value `{value}`");
        }

        let err = Config::from_lookup(lookup(&[("FLATTEN_METRICS", "maybe")])).unwrap_err();
        assert!(matches!(err, Error::InvalidFlag { .. }));
    }
}
