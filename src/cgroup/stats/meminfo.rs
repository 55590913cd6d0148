//! Parsing of the host's `/proc/meminfo`.
//!
//! Only `MemTotal` is needed: it stands in for the container's memory limit when
//! the cgroup reports no limit at all.

use std::collections::HashMap;
use std::sync::LazyLock;

use super::KeyValueStat;

/// Represents the subset of `/proc/meminfo` used by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MemInfo {
    /// Total usable physical memory, in kibibytes as reported by the kernel.
    pub mem_total_kb: u64,
}

impl MemInfo {
    /// Returns the total physical memory in bytes.
    pub fn total_bytes(&self) -> u64 {
        self.mem_total_kb.saturating_mul(1024)
    }

    fn set_mem_total(&mut self, v: u64) {
        self.mem_total_kb = v;
    }
}

type Setter = fn(&mut MemInfo, u64);

// meminfo labels keep their trailing colon, e.g. `MemTotal:       16318412 kB`.
static SETTERS: LazyLock<HashMap<&'static str, Setter>> = LazyLock::new(|| {
    let mut m: HashMap<&'static str, Setter> = HashMap::with_capacity(1);
    m.insert("MemTotal:", MemInfo::set_mem_total);
    m
});

impl KeyValueStat for MemInfo {
    const ALLOW_DUPLICATE_KEYS: bool = false;
    const REQUIRED_KEYS: &'static [&'static str] = &["MemTotal:"];

    fn field_handlers() -> &'static HashMap<&'static str, fn(&mut Self, u64)> {
        &SETTERS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cgroup::stats::StatParseError;

    #[test]
    fn test_parse_meminfo() {
        let data = "\
MemTotal:       16318412 kB
MemFree:         1234567 kB
MemAvailable:    8765432 kB
";
        let info = MemInfo::from_reader(&mut data.as_bytes()).unwrap();
        assert_eq!(info.mem_total_kb, 16_318_412);
        assert_eq!(info.total_bytes(), 16_318_412 * 1024);
    }

    #[test]
    fn test_meminfo_missing_total() {
        let err = MemInfo::from_reader(&mut "MemFree: 1 kB\n".as_bytes()).unwrap_err();
        assert!(matches!(err, StatParseError::MissingField { ref field } if field == "MemTotal:"));
    }
}
