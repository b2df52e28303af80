//! Error types for the deployer CLI.
//!
//! Every failure is fatal for the run: `main` prints the message and exits
//! with status 1. The variants carry enough context for that single line to
//! tell the maintainer what to fix.

use crate::arch::Architecture;
use crate::version::VersionTuple;
use camino::Utf8PathBuf;
use std::fmt;
use thiserror::Error;

/// The external build step that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStep {
    /// `cmake -S . -B <dir>`.
    Configure,
    /// `cmake --build <dir>`.
    Build,
}

impl fmt::Display for BuildStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configure => f.write_str("configure"),
            Self::Build => f.write_str("build"),
        }
    }
}

/// Errors that can occur during a release run.
#[derive(Debug, Error)]
pub enum DeployError {
    /// The resource descriptor does not contain a recognisable version.
    #[error("cannot read version from {path}: {reason}")]
    VersionParse {
        /// Path to the resource descriptor.
        path: Utf8PathBuf,
        /// Description of what was missing or malformed.
        reason: String,
    },

    /// Bumping would push a version component past 16 bits.
    #[error("cannot bump {version}: a component would exceed {max}", max = u16::MAX)]
    VersionOverflow {
        /// The version that could not be bumped.
        version: VersionTuple,
    },

    /// An external configure or build command failed.
    #[error("{step} failed for {arch}: {reason}")]
    BuildFailed {
        /// Architecture being built.
        arch: Architecture,
        /// Which of the two build steps failed.
        step: BuildStep,
        /// Captured diagnostics or exit status.
        reason: String,
    },

    /// The archive destination already exists.
    #[error("archive {path} already exists; remove it before deploying again")]
    ArchiveCollision {
        /// Path of the existing archive.
        path: Utf8PathBuf,
    },

    /// The registry document has no entry for the product.
    #[error("no entry named {name} in {document}")]
    EntryNotFound {
        /// Name of the registry document.
        document: String,
        /// Display name that was looked up.
        name: String,
    },

    /// The registry entry exists but lacks a field that must be updated.
    #[error("entry {name} has no field {field}")]
    FieldNotFound {
        /// Display name of the entry.
        name: String,
        /// Missing field.
        field: String,
    },

    /// A registry document could not be understood.
    #[error("invalid registry document {document}: {reason}")]
    InvalidDocument {
        /// Name of the registry document.
        document: String,
        /// Description of the problem.
        reason: String,
    },

    /// The changelog has no section for the released version.
    #[error("changelog has no section for v{version}")]
    ChangelogEntryNotFound {
        /// Version that was searched for.
        version: String,
    },

    /// A git command failed.
    #[error("git {operation} failed: {message}")]
    Git {
        /// The git operation that failed (add, commit, tag...).
        operation: &'static str,
        /// Description of the failure.
        message: String,
    },

    /// The configuration file could not be parsed.
    #[error("invalid configuration {path}: {reason}")]
    Config {
        /// Path to the configuration file.
        path: Utf8PathBuf,
        /// Description of the parse error.
        reason: String,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Writing a zip archive failed.
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// JSON serialisation failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Test stub received an unexpected or mismatched command invocation.
    #[cfg(any(test, feature = "test-support"))]
    #[error("stub mismatch: {message}")]
    StubMismatch {
        /// Description of what was expected versus what was received.
        message: String,
    },
}

/// Result type alias using [`DeployError`].
pub type Result<T> = std::result::Result<T, DeployError>;
