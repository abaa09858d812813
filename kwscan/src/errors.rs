/// Error types for kwscan.
///
/// Two families matter to a run:
///
/// 1. **File access errors** (`FileNotFound`, `PermissionDenied`, `EncodingError`,
///    `FileRead`) are raised per file. Workers log them with the offending path and skip the
///    file; they never reach the driver.
///
/// 2. **Run errors** (`InvalidArgument`, `WorkerFailed`, `ConfigError`, ...) abort the run
///    and are returned to the caller:
///    ```rust,ignore
///    match ThreadScanner::new().scan(&files, &keywords, 0) {
///        Ok(result) => println!("{:?}", result.hits),
///        Err(ScanError::InvalidArgument(msg)) => eprintln!("bad input: {}", msg),
///        Err(e) => eprintln!("scan failed: {}", e),
///    }
///    ```
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for scan operations
pub type ScanResult<T> = Result<T, ScanError>;

/// Errors that can occur while scanning
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),
    #[error("Invalid UTF-8 in file {path}: {source}")]
    EncodingError {
        path: PathBuf,
        source: std::string::FromUtf8Error,
    },
    #[error("Failed to read {path}: {source}")]
    FileRead { path: PathBuf, source: io::Error },
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Worker failed: {0}")]
    WorkerFailed(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl ScanError {
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound(path.into())
    }

    pub fn permission_denied(path: impl Into<PathBuf>) -> Self {
        Self::PermissionDenied(path.into())
    }

    pub fn encoding_error(path: impl Into<PathBuf>, source: std::string::FromUtf8Error) -> Self {
        Self::EncodingError {
            path: path.into(),
            source,
        }
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn worker_failed(msg: impl Into<String>) -> Self {
        Self::WorkerFailed(msg.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Maps an I/O error raised while reading `path` to the matching file access variant.
    pub fn from_read_error(path: impl Into<PathBuf>, err: io::Error) -> Self {
        let path = path.into();
        match err.kind() {
            io::ErrorKind::NotFound => Self::FileNotFound(path),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            _ => Self::FileRead { path, source: err },
        }
    }
}

impl From<config::ConfigError> for ScanError {
    fn from(err: config::ConfigError) -> Self {
        Self::ConfigError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_error_creation() {
        let path = Path::new("test.txt");
        let err = ScanError::file_not_found(path);
        assert!(matches!(err, ScanError::FileNotFound(_)));

        let err = ScanError::permission_denied(path);
        assert!(matches!(err, ScanError::PermissionDenied(_)));

        let err = ScanError::invalid_argument("worker count must be at least 1");
        assert!(matches!(err, ScanError::InvalidArgument(_)));

        let err = ScanError::worker_failed("exit status 1");
        assert!(matches!(err, ScanError::WorkerFailed(_)));
    }

    #[test]
    fn test_error_messages() {
        let err = ScanError::invalid_argument("worker count must be at least 1");
        assert_eq!(
            err.to_string(),
            "Invalid argument: worker count must be at least 1"
        );

        let err = ScanError::config_error("Missing required field");
        assert_eq!(err.to_string(), "Configuration error: Missing required field");

        let err = ScanError::file_not_found("test.txt");
        assert_eq!(err.to_string(), "File not found: test.txt");
    }

    #[test]
    fn test_from_read_error_kinds() {
        let err = ScanError::from_read_error(
            "a.txt",
            io::Error::new(io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, ScanError::FileNotFound(_)));

        let err = ScanError::from_read_error(
            "a.txt",
            io::Error::new(io::ErrorKind::PermissionDenied, "nope"),
        );
        assert!(matches!(err, ScanError::PermissionDenied(_)));

        let err = ScanError::from_read_error("a.txt", io::Error::new(io::ErrorKind::Other, "x"));
        assert!(matches!(err, ScanError::FileRead { .. }));
    }
}
