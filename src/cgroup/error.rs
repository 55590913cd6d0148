use std::fmt;
use std::path::PathBuf;

use crate::fsutil::ReadError;

use super::stats::StatParseError;

/// A field whose raw text did not yield a usable number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedField {
    pub name: String,
    pub raw: String,
}

impl MalformedField {
    pub fn new(name: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            raw: raw.into(),
        }
    }
}

impl fmt::Display for MalformedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: `{}`", self.name, self.raw)
    }
}

/// One or more numeric fields of a composite metric are malformed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("one or more metrics are malformed: {}", display_fields(.fields))]
pub struct MalformedMetric {
    pub fields: Vec<MalformedField>,
}

impl MalformedMetric {
    pub fn single(name: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            fields: vec![MalformedField::new(name, raw)],
        }
    }

    /// Returns `true` if a field with the given name is part of this error.
    pub fn names(&self, name: &str) -> bool {
        self.fields.iter().any(|field| field.name == name)
    }
}

fn display_fields(fields: &[MalformedField]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Read(#[from] ReadError),
    #[error("failed to parse file `{path}`: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: StatParseError,
    },
    #[error(transparent)]
    Malformed(#[from] MalformedMetric),
    #[error(
        "cpu samples are not ordered in time: first taken at {first_millis}ms, second at {second_millis}ms"
    )]
    UnorderedSamples { first_millis: u64, second_millis: u64 },
    #[error("cpu usage counter went backwards from {first_nanos}ns to {second_nanos}ns")]
    CounterReset { first_nanos: u64, second_nanos: u64 },
    #[error("system clock is set before the UNIX epoch: {0}")]
    Clock(#[from] std::time::SystemTimeError),
}

impl Error {
    /// Converts a parse failure of the file at `path` into a crate error.
    ///
    /// Non-numeric values become [`Error::Malformed`], naming the offending label,
    /// or `field` for single-value files. Layout problems stay [`Error::Parse`].
    pub(crate) fn from_parse(field: &str, path: PathBuf, err: StatParseError) -> Self {
        match err {
            StatParseError::InvalidKeyValue { key, value, .. } => {
                MalformedMetric::single(key, value).into()
            }
            StatParseError::InvalidValue { value, .. } => {
                MalformedMetric::single(field, value).into()
            }
            source => Error::Parse { path, source },
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Joins two independent reads, reporting every malformed field if both fail that way.
pub(crate) fn join<A, B>(a: Result<A>, b: Result<B>) -> Result<(A, B)> {
    match (a, b) {
        (Ok(a), Ok(b)) => Ok((a, b)),
        (Err(Error::Malformed(mut first)), Err(Error::Malformed(second))) => {
            first.fields.extend(second.fields);
            Err(first.into())
        }
        (Err(err), _) | (_, Err(err)) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_metric_message() {
        let err = MalformedMetric {
            fields: vec![
                MalformedField::new("rss", "abc"),
                MalformedField::new("kmem_usage", "malformed data"),
            ],
        };
        assert_eq!(
            err.to_string(),
            "one or more metrics are malformed: rss: `abc`, kmem_usage: `malformed data`"
        );
        assert!(err.names("rss"));
        assert!(!err.names("limit"));
    }

    #[test]
    fn test_join_merges_malformed() {
        let a: Result<u64> = Err(MalformedMetric::single("rss", "x").into());
        let b: Result<u64> = Err(MalformedMetric::single("kmem_usage", "y").into());
        match join(a, b) {
            Err(Error::Malformed(err)) => {
                assert!(err.names("rss"));
                assert!(err.names("kmem_usage"));
            }
            other => panic!("Expected Malformed error, got {other:?}"),
        }
    }

    #[test]
    fn test_join_prefers_first_non_malformed_error() {
        let a: Result<u64> = Ok(1);
        let b: Result<u64> = Err(MalformedMetric::single("kmem_usage", "y").into());
        assert!(matches!(join(a, b), Err(Error::Malformed(_))));

        let a: Result<u64> = Ok(1);
        let b: Result<u64> = Ok(2);
        assert_eq!(join(a, b).unwrap(), (1, 2));
    }
}
