//! Error types for the tagged-file library
//!
//! Splitting, validation, the stage pipeline and module generation all report
//! through [`TaggedFileError`]. The loader boundary distinguishes four kinds of
//! failure: malformed tags, corrupted tags, metadata validation failures and
//! pipeline failures. The remaining variants cover configuration and I/O.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for all library operations
#[derive(Error, Debug)]
pub enum TaggedFileError {
    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing or serialization errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Regular expression errors
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// File not found or invalid path
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// No well-formed metadata block at the top of the file
    #[error("Markdown file is not tagged with a metadata block: {reason}")]
    MalformedTag { reason: String },

    /// Closing brackets outnumber opening ones before the block closed
    #[error("Corrupted JSON tag found on top of markdown file (byte {offset})")]
    CorruptedTag { offset: usize },

    /// Metadata does not satisfy the configured schema
    #[error("Invalid metadata in {resource}: {message}")]
    Validation { resource: String, message: String },

    /// A content pipeline stage rejected the body
    #[error("Stage '{stage}' failed: {reason}")]
    Pipeline { stage: String, reason: String },

    /// A stage descriptor names a loader nobody registered
    #[error("Unknown stage: {loader}")]
    UnknownStage { loader: String },

    /// The pipeline tried to read something other than the resource
    #[error("Path not supported by virtual file system: {path}")]
    VirtualFs { path: PathBuf },

    /// Loader or stage options could not be interpreted
    #[error("Invalid options: {reason}")]
    InvalidOptions { reason: String },

    /// The resource path has too few segments to derive a slug
    #[error("Cannot derive slug from path: {path}")]
    InvalidResourcePath { path: PathBuf },
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, TaggedFileError>;

impl TaggedFileError {
    /// Create a new file not found error
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Create a new malformed tag error
    pub fn malformed_tag(reason: impl Into<String>) -> Self {
        Self::MalformedTag {
            reason: reason.into(),
        }
    }

    /// Create a new corrupted tag error
    pub fn corrupted_tag(offset: usize) -> Self {
        Self::CorruptedTag { offset }
    }

    /// Create a new validation error
    pub fn validation(resource: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            resource: resource.into(),
            message: message.into(),
        }
    }

    /// Create a new pipeline error
    pub fn pipeline(stage: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Pipeline {
            stage: stage.into(),
            reason: reason.into(),
        }
    }

    /// Create a new unknown stage error
    pub fn unknown_stage(loader: impl Into<String>) -> Self {
        Self::UnknownStage {
            loader: loader.into(),
        }
    }

    /// Create a new virtual filesystem error
    pub fn virtual_fs(path: impl Into<PathBuf>) -> Self {
        Self::VirtualFs { path: path.into() }
    }

    /// Create a new invalid options error
    pub fn invalid_options(reason: impl Into<String>) -> Self {
        Self::InvalidOptions {
            reason: reason.into(),
        }
    }

    /// Create a new invalid resource path error
    pub fn invalid_resource_path(path: impl Into<PathBuf>) -> Self {
        Self::InvalidResourcePath { path: path.into() }
    }

    /// Whether processing of the file may continue after this error.
    ///
    /// Only validation failures can be downgraded to warnings.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Get the severity level of this error
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::FileNotFound { .. } | Self::Io(_) => ErrorSeverity::Critical,
            Self::MalformedTag { .. } | Self::CorruptedTag { .. } | Self::Pipeline { .. } => {
                ErrorSeverity::High
            }
            Self::Validation { .. } => ErrorSeverity::Low,
            _ => ErrorSeverity::Medium,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::High => write!(f, "HIGH"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}
