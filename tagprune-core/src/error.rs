//! Typed error handling for tagprune.
//!
//! Every fatal condition of an audit or prune run surfaces as a
//! [`TagpruneError`] so callers can match on what went wrong before any
//! output has been written.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for tagprune operations.
#[derive(Error, Debug)]
pub enum TagpruneError {
    /// I/O error when reading/writing files
    #[error("I/O error at {path}: {message}")]
    Io {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// The `INSERT INTO` statement for a required table is absent
    #[error("Unable to locate data block for table `{table}` (expected `{marker}`)")]
    MissingBlock { table: String, marker: String },

    /// The insert statement was found but never terminated
    #[error("Data block for table `{table}` has no statement terminator")]
    UnterminatedBlock { table: String },

    /// Configuration file errors
    #[error("Config error at {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// Source tree traversal errors
    #[error("Scan error at {path}: {message}")]
    Scan { path: PathBuf, message: String },

    /// Report serialization errors
    #[error("Report error: {message}")]
    Report { message: String },
}

impl TagpruneError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create a missing-block error for `table`.
    pub fn missing_block(table: impl Into<String>, marker: impl Into<String>) -> Self {
        Self::MissingBlock {
            table: table.into(),
            marker: marker.into(),
        }
    }

    /// Create an unterminated-block error for `table`.
    pub fn unterminated(table: impl Into<String>) -> Self {
        Self::UnterminatedBlock {
            table: table.into(),
        }
    }

    /// Create a config error.
    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a scan error.
    pub fn scan(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Scan {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a report error.
    pub fn report(message: impl Into<String>) -> Self {
        Self::Report {
            message: message.into(),
        }
    }

    /// Whether the error stems from the dump's structure rather than the environment.
    pub fn is_dump_structure(&self) -> bool {
        matches!(
            self,
            Self::MissingBlock { .. } | Self::UnterminatedBlock { .. }
        )
    }

    /// Get the path associated with this error, if any.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::Io { path, .. } => Some(path),
            Self::Config { path, .. } => Some(path),
            Self::Scan { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// Convenience type alias for tagprune results.
pub type TagpruneResult<T> = Result<T, TagpruneError>;

/// Extension trait for converting std::io::Error with path context.
pub trait IoResultExt<T> {
    /// Add path context to an I/O error.
    fn with_path(self, path: impl Into<PathBuf>) -> TagpruneResult<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> TagpruneResult<T> {
        self.map_err(|e| TagpruneError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error() {
        let err = TagpruneError::io(
            PathBuf::from("/data/database.sql"),
            std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
        );
        assert!(matches!(err, TagpruneError::Io { .. }));
        assert_eq!(err.path(), Some(&PathBuf::from("/data/database.sql")));
        assert!(err.to_string().contains("/data/database.sql"));
    }

    #[test]
    fn test_missing_block_message() {
        let err = TagpruneError::missing_block("share_lang_tags", "INSERT INTO `share_lang_tags` VALUES");
        assert!(err.is_dump_structure());
        assert!(err.to_string().contains("share_lang_tags"));
        assert_eq!(err.path(), None);
    }

    #[test]
    fn test_unterminated_is_structural() {
        assert!(TagpruneError::unterminated("share_languages").is_dump_structure());
        assert!(!TagpruneError::report("boom").is_dump_structure());
    }

    #[test]
    fn test_io_result_ext() {
        let result: std::io::Result<()> =
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "missing"));
        let mapped = result.with_path("/missing/database.sql");
        assert!(matches!(mapped, Err(TagpruneError::Io { .. })));
    }
}
