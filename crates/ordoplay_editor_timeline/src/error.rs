// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error types for the fallible parts of the timeline core.
//!
//! Editing actions never fail with an error: they are either unavailable or
//! report that they did nothing. Errors are reserved for loading and saving
//! settings and projects, and for undo snapshots.

use crate::track::TrackId;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by settings, persistence and undo snapshots
#[derive(Debug, Error)]
pub enum TimelineError {
    /// RON parse error
    #[error("RON parse error: {0}")]
    RonParse(#[from] ron::error::SpannedError),

    /// RON serialization error
    #[error("RON serialization error: {0}")]
    RonSerialize(#[from] ron::Error),

    /// Snapshot encoding error
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] bincode::Error),

    /// IO error while reading or writing a file
    #[error("IO error on {path:?}: {source}")]
    Io {
        /// File being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Track not found in any timeline of the project
    #[error("Track not found: {0:?}")]
    TrackNotFound(TrackId),

    /// Shortcut string could not be parsed
    #[error("Invalid shortcut '{0}'")]
    InvalidShortcut(String),

    /// Shortcut override names an action that does not exist
    #[error("Unknown action '{0}'")]
    UnknownAction(String),

    /// Settings written by a newer version of the editor
    #[error("Settings version {found} is newer than supported version {supported}")]
    UnsupportedVersion {
        /// Version found in the file
        found: u32,
        /// Newest version this build reads
        supported: u32,
    },

    /// Nothing to undo
    #[error("Nothing to undo")]
    NothingToUndo,
}

/// Result type for timeline operations
pub type Result<T> = std::result::Result<T, TimelineError>;
