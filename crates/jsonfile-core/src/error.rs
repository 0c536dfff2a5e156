//! Error handling
//!
//! Every failure a store operation can surface, each carrying the file path
//! it concerns and the underlying cause.

use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::codec::CodecError;

/// Errors that can occur during document operations
#[derive(Error, Debug)]
pub enum Error {
    /// The lock could not be acquired within the configured budget
    #[error("Timed out acquiring lock '{lock_path}' after {attempts} attempts ({waited:?})")]
    LockTimeout {
        lock_path: PathBuf,
        attempts: u32,
        waited: Duration,
    },

    /// Creating the lock file failed for a reason other than contention
    #[error("Failed to create lock '{lock_path}': {source}")]
    Lock {
        lock_path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Removing the lock file failed
    #[error("Failed to release lock '{lock_path}': {source}")]
    Unlock {
        lock_path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Document file could not be read
    #[error("Can't read JSON file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Document content could not be decoded
    #[error("Error parsing JSON file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: CodecError,
    },

    /// A value could not be serialized
    #[error("Couldn't serialize value for file '{path}': {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: CodecError,
    },

    /// Atomic write of the document failed
    #[error("Failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// No value at the requested key path and no default supplied
    #[error("No value at key path \"{key}\" in JSON object from '{path}'")]
    KeyNotFound { path: PathBuf, key: String },

    /// A key path string could not be parsed
    #[error("Invalid key path \"{key_path}\": {reason}")]
    InvalidKeyPath {
        key_path: String,
        reason: &'static str,
    },

    /// A top-level operation needs an object where something else was found
    #[error("Cannot {operation} '{path}': value is not a JSON object")]
    NotAnObject {
        path: PathBuf,
        operation: &'static str,
    },

    /// Options file could not be read or parsed
    #[error("Invalid configuration in '{path}': {details}")]
    Config { path: PathBuf, details: String },

    /// A blocking task backing an async operation failed
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl Error {
    /// Check if retrying the same call later could succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::LockTimeout { .. })
    }

    /// Get a recovery suggestion for this error
    pub fn recovery_suggestion(&self) -> Option<String> {
        match self {
            Error::LockTimeout { lock_path, .. } => Some(format!(
                "Another process may be holding the lock. If no process is using the file, \
                 the lock is stale: remove '{}' and try again.",
                lock_path.display()
            )),
            Error::Lock { source, .. } | Error::Write { source, .. }
                if source.kind() == io::ErrorKind::PermissionDenied =>
            {
                Some("Check file and directory permissions.".to_string())
            }
            Error::Lock { source, .. } if source.kind() == io::ErrorKind::NotFound => {
                Some("Check that the directory containing the file exists.".to_string())
            }
            Error::Write { source, .. } if is_disk_full_error(source) => {
                Some("Free up disk space and try again.".to_string())
            }
            Error::Parse { .. } => Some(
                "Fix the file contents, or configure a parse error default to replace them."
                    .to_string(),
            ),
            _ => None,
        }
    }
}

/// Check if an I/O error indicates disk full condition
fn is_disk_full_error(error: &io::Error) -> bool {
    let msg = error.to_string().to_lowercase();
    msg.contains("no space left")
        || msg.contains("disk full")
        || msg.contains("quota exceeded")
        || msg.contains("not enough space")
}

/// Result type for document operations
pub type Result<T> = std::result::Result<T, Error>;
