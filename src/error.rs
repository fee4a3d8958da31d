//! Error taxonomy for a backup run.
//!
//! [`ValidationError`] covers everything that can be rejected before any
//! external tool is touched. [`PipelineError`] covers the stage failures;
//! every variant aborts the run except [`PipelineError::CompactFailed`].

use std::path::PathBuf;
use thiserror::Error;

/// The unit characters accepted at the end of a retention token.
pub const ACCEPTED_UNITS: [char; 5] = ['h', 'd', 'w', 'm', 'y'];

/// Rejected input, detected while building the run configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid timeframe unit '{found}' in '{token}', expected one of: h, d, w, m, y")]
    InvalidUnit { token: String, found: String },
    #[error("invalid timeframe count '{count}' in '{token}', expected a base-10 integer")]
    InvalidNumber { token: String, count: String },
    #[error("archive name must not be empty")]
    EmptyName,
    #[error("pruning is enabled but no retention timeframe was given (use --keep or --no-prune)")]
    MissingRetention,
    #[error("--sync requires an rclone remote (use --rclone-remote)")]
    MissingRemote,
    #[error("at least one path to back up is required")]
    NoPaths,
}

/// A failed pipeline stage.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("missing `{program}` binary")]
    EngineMissing {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("missing `{program}` binary")]
    SyncToolMissing {
        program: String,
        #[source]
        source: Option<std::io::Error>,
    },
    #[error("backup repo '{}' does not exist and `--no-init` was passed", .0.display())]
    RepoMissingNoInit(PathBuf),
    #[error("failed to init repo '{}'", .path.display())]
    RepoInitFailed {
        path: PathBuf,
        #[source]
        source: Option<std::io::Error>,
    },
    #[error("failed to create backup")]
    ArchiveCreateFailed(#[source] Option<std::io::Error>),
    #[error("failed to prune repo")]
    PruneFailed(#[source] Option<std::io::Error>),
    #[error("failed to compact repo")]
    CompactFailed(#[source] Option<std::io::Error>),
    #[error("failed to sync repo to '{target}'")]
    SyncFailed {
        target: String,
        #[source]
        source: Option<std::io::Error>,
    },
}

impl PipelineError {
    /// Whether this failure ends the run.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, PipelineError::CompactFailed(_))
    }

    /// Installation hint printed after a missing-tool error.
    pub fn guidance(&self) -> Option<&'static str> {
        match self {
            PipelineError::EngineMissing { .. } => Some(crate::constants::BORG_INSTALL_URL),
            PipelineError::SyncToolMissing { .. } => Some(crate::constants::RCLONE_INSTALL_URL),
            _ => None,
        }
    }
}
