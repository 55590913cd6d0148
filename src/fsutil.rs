use std::io;
use std::path::{Path, PathBuf};

/// Error that occurs when reading a metric file fails.
#[derive(Debug, thiserror::Error)]
#[error("failed to read file `{path}`: {cause}")]
pub struct ReadError {
    pub path: PathBuf,
    #[source]
    pub cause: ReadErrorCause,
}

/// The reason a metric file could not be read.
#[derive(Debug, thiserror::Error)]
pub enum ReadErrorCause {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("file is empty")]
    Empty,
}

impl ReadError {
    /// Returns the underlying I/O error kind, or `None` if the file was read but empty.
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match &self.cause {
            ReadErrorCause::Io(err) => Some(err.kind()),
            ReadErrorCause::Empty => None,
        }
    }

    /// Returns `true` if the file was readable but contained no data.
    pub fn is_empty_file(&self) -> bool {
        matches!(self.cause, ReadErrorCause::Empty)
    }
}

/// Reads the whole file at `path` into a string.
///
/// Pseudo-files under `/sys/fs/cgroup` and `/proc` always carry data, so an empty
/// read is treated as an error rather than an empty value.
///
/// # Errors
///
/// Returns a [`ReadError`] if the file cannot be opened or read, or if it is empty.
///
/// # Example
/// ```no_run
/// # use cgroup_metrics::fsutil;
/// let raw = fsutil::read_metric_file("/sys/fs/cgroup/cpuacct/cpuacct.usage")?;
/// # Ok::<(), fsutil::ReadError>(())
/// ```
pub fn read_metric_file(path: impl AsRef<Path>) -> Result<String, ReadError> {
    let path = path.as_ref();
    let data = std::fs::read_to_string(path).map_err(|source| ReadError {
        path: path.to_path_buf(),
        cause: source.into(),
    })?;

    if data.is_empty() {
        return Err(ReadError {
            path: path.to_path_buf(),
            cause: ReadErrorCause::Empty,
        });
    }

    log::trace!("read {} bytes from {}", data.len(), path.display());
    Ok(data)
}
