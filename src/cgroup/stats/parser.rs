//! Provides generic traits for parsing Linux cgroup statistics files into structured types.
//!
//! This module defines reusable parsing abstractions for extracting metrics from files such as
//! `memory.stat`, `cpuacct.stat` and `cpuacct.usage` found under `/sys/fs/cgroup`, and
//! `/proc/meminfo`.
//!
//! # Traits
//!
//! - [`KeyValueStat`]: A trait for parsing multi-line `label value` files. Fields are looked up
//!   by label, so the order in which the kernel prints them does not matter.
//! - [`SingleLineStat`]: A trait for parsing single-line statistics, such as `cpuacct.usage`
//!   or `memory.limit_in_bytes`.
//!
//! # Example: Implementing `KeyValueStat`
//!
//! ```rust
//! use std::collections::HashMap;
//! use std::sync::LazyLock;
//! use cgroup_metrics::cgroup::stats::KeyValueStat;
//!
//! #[derive(Default)]
//! struct MyStat {
//!     foo: u64,
//!     bar: u64,
//! }
//!
//! static HANDLERS: LazyLock<HashMap<&'static str, fn(&mut MyStat, u64)>> = LazyLock::new(|| {
//!     let mut map: HashMap<&'static str, fn(&mut MyStat, u64)> = HashMap::new();
//!     map.insert("foo", |s, v| s.foo = v);
//!     map.insert("bar", |s, v| s.bar = v);
//!     map
//! });
//!
//! impl KeyValueStat for MyStat {
//!     const ALLOW_DUPLICATE_KEYS: bool = false;
//!     const REQUIRED_KEYS: &'static [&'static str] = &["foo"];
//!
//!     fn field_handlers() -> &'static HashMap<&'static str, fn(&mut Self, u64)> {
//!         &HANDLERS
//!     }
//! }
//!
//! let stat = MyStat::from_reader(&mut "bar 2\nfoo 1\n".as_bytes()).unwrap();
//! assert_eq!((stat.foo, stat.bar), (1, 2));
//! ```

use std::collections::{HashMap, HashSet};
use std::io::BufRead;

use super::StatParseError;

/// A trait for parsing `label value` style files such as `memory.stat`,
/// `cpuacct.stat` or `/proc/meminfo`.
///
/// Implementors define a set of known labels and how to set values for them.
/// Each line is split on whitespace; the first token is the label, the second its value,
/// and any further tokens (such as the `kB` unit in `/proc/meminfo`) are ignored.
pub trait KeyValueStat: Default
where
    Self: 'static,
{
    /// If `true`, repeated keys are allowed in the file (the last value wins).
    /// If `false`, encountering the same key more than once will cause an error.
    const ALLOW_DUPLICATE_KEYS: bool;

    /// Labels that must appear in the input. Parsing fails with
    /// [`StatParseError::MissingField`] if any of them is absent.
    const REQUIRED_KEYS: &'static [&'static str] = &[];

    /// Returns a map of known field names and corresponding handler functions
    /// that apply parsed values to the struct's fields.
    fn field_handlers() -> &'static HashMap<&'static str, fn(&mut Self, u64)>;

    /// Parses a `label value` formatted buffer into a struct implementing `KeyValueStat`.
    ///
    /// Unknown labels are ignored (see [`KeyValueStat::on_unknown_key`]).
    /// Once every known label has been seen and duplicates are disallowed,
    /// the rest of the input is not read.
    ///
    /// # Errors
    ///
    /// - [`StatParseError::InvalidKeyValue`] if a known label carries a non-numeric value.
    /// - [`StatParseError::DuplicateField`] if a known label repeats and duplicates are disallowed.
    /// - [`StatParseError::MissingField`] if a label from [`KeyValueStat::REQUIRED_KEYS`] is absent.
    /// - [`StatParseError::Io`] if reading fails.
    fn from_reader<R: BufRead>(buf: &mut R) -> Result<Self, StatParseError> {
        let mut stat = Self::default();
        let handlers = Self::field_handlers();
        let field_count = handlers.len();
        let mut seen_keys = HashSet::with_capacity(field_count);

        let mut line = String::new();
        let mut lineno = 0;
        while buf.read_line(&mut line)? != 0 {
            lineno += 1;
            Self::parse_line(&mut stat, &line, lineno, handlers, &mut seen_keys)?;
            if !Self::ALLOW_DUPLICATE_KEYS && seen_keys.len() == field_count {
                break;
            }

            line.clear();
        }

        if let Some(missing) = Self::REQUIRED_KEYS
            .iter()
            .find(|key| !seen_keys.contains(*key))
        {
            return Err(StatParseError::MissingField {
                field: missing.to_string(),
            });
        }

        Ok(stat)
    }

    /// Parses the first `label value` pair of a single line.
    ///
    /// Lines with fewer than two tokens carry no value and are skipped.
    fn parse_line(
        stat: &mut Self,
        line: &str,
        lineno: usize,
        handlers: &HashMap<&'static str, fn(&mut Self, u64)>,
        seen_keys: &mut HashSet<&'static str>,
    ) -> Result<(), StatParseError> {
        let mut parts = line.split_whitespace();
        match (parts.next(), parts.next()) {
            (Some(key), Some(val)) => {
                Self::parse_and_set(key, val, stat, lineno, handlers, seen_keys)
            }
            _ => Ok(()),
        }
    }

    /// Parses a single key-value pair and updates the target struct via the field handler.
    ///
    /// If the key is unknown, `on_unknown_key` is called.
    ///
    /// # Errors
    ///
    /// Returns a `StatParseError::InvalidKeyValue` if the value cannot be parsed as `u64`,
    /// or `StatParseError::DuplicateField` if the key appears more than once and duplicates are disallowed.
    fn parse_and_set(
        key: &str,
        val: &str,
        stat: &mut Self,
        lineno: usize,
        handlers: &HashMap<&'static str, fn(&mut Self, u64)>,
        seen_keys: &mut HashSet<&'static str>,
    ) -> Result<(), StatParseError> {
        if let Some((k, handler)) = handlers.get_key_value(key) {
            let parsed = val
                .parse::<u64>()
                .map_err(|source| StatParseError::InvalidKeyValue {
                    key: key.to_string(),
                    value: val.to_string(),
                    line: lineno,
                    source,
                })?;
            if !seen_keys.insert(k) && !Self::ALLOW_DUPLICATE_KEYS {
                return Err(StatParseError::DuplicateField {
                    field: key.to_string(),
                    line: lineno,
                });
            }
            handler(stat, parsed);
            return Ok(());
        }

        Self::on_unknown_key(key, val, lineno)
    }

    /// Called when a key in the input is not found in the `field_handlers()` map.
    ///
    /// By default, unknown keys are silently ignored.
    #[inline]
    fn on_unknown_key(_key: &str, _val: &str, _lineno: usize) -> Result<(), StatParseError> {
        Ok(())
    }
}

/// A trait for parsing single-line statistics, such as `cpuacct.usage`,
/// `memory.limit_in_bytes` or `cpuacct.usage_percpu`.
pub trait SingleLineStat: Sized {
    /// Parses a single-line statistic from the provided buffered reader.
    ///
    /// # Errors
    ///
    /// Returns a [`StatParseError`] if reading or parsing fails.
    fn from_reader<R: BufRead>(buf: &mut R) -> Result<Self, StatParseError>;
}

/// Reads the first line of `buf` and parses it, trimmed, as a single `u64`.
///
/// # Errors
///
/// Returns [`StatParseError::InvalidValue`] if the line is blank or not a number.
pub(super) fn read_scalar<R: BufRead>(buf: &mut R) -> Result<u64, StatParseError> {
    let mut line = String::new();
    buf.read_line(&mut line)?;
    let line = line.trim();
    line.parse::<u64>()
        .map_err(|source| StatParseError::InvalidValue {
            value: line.to_string(),
            line: 1,
            source,
        })
}
