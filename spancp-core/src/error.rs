use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpanError {
    #[error("Source file disappeared: {path}: {source}")]
    SourceMissing {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("No space left on device while writing {path}")]
    StorageFull { path: PathBuf },

    #[error("Copy was interrupted")]
    Interrupted,

    #[error("Failed to copy {path}: {source}")]
    Copy {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Scan failed: {0}")]
    Scan(String),

    #[error("Invalid entry on line {line} of resume list: {entry}")]
    InvalidResumeEntry { line: usize, entry: String },

    #[error("Path is not valid UTF-8: {0}")]
    NonUtf8Path(PathBuf),

    #[error("Destination prompt failed: {0}")]
    Prompt(#[source] io::Error),

    #[error("Destination prompt was cancelled")]
    PromptCancelled,

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl SpanError {
    /// Wrap an I/O error raised while writing `path`, promoting out-of-space
    /// conditions to [`SpanError::StorageFull`].
    pub fn from_write(path: impl Into<PathBuf>, err: io::Error) -> Self {
        let path = path.into();
        if is_storage_full(&err) {
            SpanError::StorageFull { path }
        } else {
            SpanError::Copy { path, source: err }
        }
    }

    pub fn is_storage_full(&self) -> bool {
        match self {
            SpanError::StorageFull { .. } => true,
            SpanError::Copy { source, .. } | SpanError::Io(source) => {
                is_storage_full(source)
            }
            _ => false,
        }
    }
}

/// Out-of-space detection from the error kind or raw OS code, never from message text.
pub fn is_storage_full(err: &io::Error) -> bool {
    if err.kind() == io::ErrorKind::StorageFull {
        return true;
    }
    #[cfg(unix)]
    {
        if matches!(err.raw_os_error(), Some(libc::ENOSPC | libc::EDQUOT)) {
            return true;
        }
    }
    false
}

pub type Result<T> = std::result::Result<T, SpanError>;
