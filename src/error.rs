//! Helpers for logging errors that are handled by skipping work.

use std::fmt::Write;

/// Converts a `Result` into an `Option`, logging the error and its sources on failure.
pub trait ResultOkLogExt<T, E> {
    /// Logs the error at `error` level, prefixed by `context`.
    fn ok_log(self, context: &str) -> Option<T>;
}

impl<T, E> ResultOkLogExt<T, E> for std::result::Result<T, E>
where
    E: std::error::Error,
{
    fn ok_log(self, context: &str) -> Option<T> {
        match self {
            Ok(ok) => Some(ok),
            Err(err) => {
                log::error!("{context}: {}", error_chain(&err));
                None
            }
        }
    }
}

/// Renders `err` followed by each of its sources not already contained in its message.
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let message = cause.to_string();
        if !out.contains(&message) {
            let _ = write!(out, ": {message}");
        }
        source = cause.source();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fsutil::read_metric_file;

    #[test]
    fn test_ok_log() {
        let ok: Result<u32, std::io::Error> = Ok(7);
        assert_eq!(ok.ok_log("reading"), Some(7));

        let dir = tempfile::tempdir().unwrap();
        let err = read_metric_file(dir.path().join("missing"));
        assert_eq!(err.ok_log("reading"), None);
    }

    #[test]
    fn test_error_chain_skips_repeated_sources() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty");
        std::fs::write(&path, "").unwrap();

        let err = read_metric_file(&path).unwrap_err();
        let rendered = error_chain(&err);
        assert!(rendered.contains("file is empty"));
        assert_eq!(rendered.matches("file is empty").count(), 1);
    }
}
