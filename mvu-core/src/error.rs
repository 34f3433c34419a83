//! Error types for MicroVu program conversion.

use std::path::PathBuf;
use thiserror::Error;

/// Error codes for program processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// File not found (-1)
    FileNotFound = -1,
    /// Empty file (-2)
    EmptyFile = -2,
    /// Undecodable file content (-3)
    InvalidEncoding = -3,
    /// Settings file could not be read (-4)
    InvalidSetting = -4,
    /// Read or write failure other than a missing file (-5)
    Io = -5,
    /// Requested node absent from a line (E100)
    NodeNotFound = 100,
    /// Required anchor line missing (E101)
    AnchorNotFound = 101,
    /// Program failed pre-conversion checks (E102)
    ValidationFailed = 102,
    /// Boilerplate text block missing (E200)
    BoilerplateMissing = 200,
    /// Output file already exists (E300)
    OutputExists = 300,
}

/// Main error type for the converter.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Empty file: {path}")]
    EmptyFile { path: PathBuf },

    #[error("Cannot decode {path}: {message}")]
    InvalidEncoding { path: PathBuf, message: String },

    #[error("Node '{key}' not found")]
    NodeNotFound { key: String },

    #[error("Anchor '{anchor}' not found: {message}")]
    AnchorNotFound { anchor: String, message: String },

    #[error("Validation failed: {}", .errors.join("; "))]
    ValidationFailed { errors: Vec<String> },

    #[error("Can't find '{name}' file.")]
    BoilerplateMissing { name: String },

    #[error("File '{}' already exists in output directory '{}'.", file_name(.path), parent_dir(.path))]
    OutputExists { path: PathBuf },

    #[error("Invalid settings: {message}")]
    InvalidSetting { message: String },

    #[error("{}: {source}", .path.display())]
    Program {
        path: PathBuf,
        #[source]
        source: Box<ConvertError>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConvertError {
    /// Shorthand for a missing anchor line.
    pub fn anchor(anchor: impl Into<String>, message: impl Into<String>) -> Self {
        ConvertError::AnchorNotFound {
            anchor: anchor.into(),
            message: message.into(),
        }
    }

    /// Attach the identity of the program being processed.
    pub fn in_program(self, path: impl Into<PathBuf>) -> Self {
        match self {
            already @ ConvertError::Program { .. } => already,
            other => ConvertError::Program {
                path: path.into(),
                source: Box::new(other),
            },
        }
    }

    /// Get the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            ConvertError::FileNotFound { .. } => ErrorCode::FileNotFound,
            ConvertError::EmptyFile { .. } => ErrorCode::EmptyFile,
            ConvertError::InvalidEncoding { .. } => ErrorCode::InvalidEncoding,
            ConvertError::NodeNotFound { .. } => ErrorCode::NodeNotFound,
            ConvertError::AnchorNotFound { .. } => ErrorCode::AnchorNotFound,
            ConvertError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            ConvertError::BoilerplateMissing { .. } => ErrorCode::BoilerplateMissing,
            ConvertError::OutputExists { .. } => ErrorCode::OutputExists,
            ConvertError::InvalidSetting { .. } => ErrorCode::InvalidSetting,
            ConvertError::Program { source, .. } => source.code(),
            ConvertError::Io(e) if e.kind() == std::io::ErrorKind::NotFound => ErrorCode::FileNotFound,
            ConvertError::Io(_) => ErrorCode::Io,
        }
    }

    /// Get the numeric error code value.
    pub fn code_value(&self) -> i32 {
        self.code() as i32
    }
}

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn parent_dir(path: &std::path::Path) -> String {
    path.parent()
        .map(|p| p.display().to_string())
        .unwrap_or_default()
}

/// Recoverable outcome of a dimension name that cannot be classified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassificationDefect {
    #[error("decimal point has no digits on one side")]
    DanglingDot,

    #[error("no letter for position {0}")]
    LetterOutOfRange(u32),

    #[error("'{0}' is not a letter position")]
    NotAPosition(String),
}

/// Result type alias for converter operations.
pub type Result<T> = std::result::Result<T, ConvertError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_program_wrapper_keeps_code() {
        let err = ConvertError::BoilerplateMissing {
            name: "TextKill_text.txt".into(),
        }
        .in_program("C:/programs/1234_REVA.iwp");
        assert_eq!(err.code(), ErrorCode::BoilerplateMissing);
        assert_eq!(err.code_value(), 200);
    }

    #[test]
    fn test_program_wrapper_not_nested_twice() {
        let err = ConvertError::anchor("AutoExpFile", "missing")
            .in_program("a.iwp")
            .in_program("b.iwp");
        match err {
            ConvertError::Program { path, source } => {
                assert_eq!(path, PathBuf::from("a.iwp"));
                assert!(matches!(*source, ConvertError::AnchorNotFound { .. }));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_output_exists_message() {
        let err = ConvertError::OutputExists {
            path: PathBuf::from("out/parts/1234.iwp"),
        };
        assert_eq!(
            err.to_string(),
            "File '1234.iwp' already exists in output directory 'out/parts'."
        );
    }

    #[test]
    fn test_io_error_codes() {
        let denied = ConvertError::from(std::io::Error::from(std::io::ErrorKind::PermissionDenied));
        assert_eq!(denied.code(), ErrorCode::Io);
        assert_eq!(denied.code_value(), -5);

        let missing = ConvertError::from(std::io::Error::from(std::io::ErrorKind::NotFound));
        assert_eq!(missing.code(), ErrorCode::FileNotFound);
    }
}
