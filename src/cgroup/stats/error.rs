//! Defines structured error types for parsing cgroup statistics.
//!
//! This module provides the [`StatParseError`] enum, which carries detailed
//! error reporting for parsing failures encountered while processing cgroup stat files.
//!
//! # Error Types
//!
//! - [`StatParseError::InvalidKeyValue`]: A labelled value (e.g., `rss` in `memory.stat`) is not a number.
//! - [`StatParseError::InvalidValue`]: A single numeric value (e.g., in `cpuacct.usage`) failed to parse.
//! - [`StatParseError::DuplicateField`]: A label appeared twice where that is disallowed.
//! - [`StatParseError::MissingField`]: A required label or value was not present at all.
//! - [`StatParseError::Io`]: Wraps underlying I/O errors during reads.
//!
//! # Example
//!
//! ```rust
//! use cgroup_metrics::cgroup::stats::StatParseError;
//!
//! fn parse_line(val: &str) -> Result<u64, StatParseError> {
//!     val.parse::<u64>().map_err(|e| StatParseError::InvalidValue {
//!         value: val.to_string(),
//!         line: 1,
//!         source: e,
//!     })
//! }
//!
//! parse_line("not-a-number").unwrap_err();
//! ```

use std::num::ParseIntError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StatParseError {
    #[error("duplicate field '{field}' at line {line}")]
    DuplicateField { field: String, line: usize },

    #[error("missing field '{field}'")]
    MissingField { field: String },

    #[error("invalid value for '{key}' at line {line}: '{value}': {source}")]
    InvalidKeyValue {
        key: String,
        value: String,
        line: usize,
        #[source]
        source: ParseIntError,
    },

    #[error("invalid value at line {line}: '{value}': {source}")]
    InvalidValue {
        value: String,
        line: usize,
        #[source]
        source: ParseIntError,
    },

    #[error("error during I/O: {0}")]
    Io(#[from] std::io::Error),
}
