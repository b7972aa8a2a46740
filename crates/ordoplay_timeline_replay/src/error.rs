// SPDX-License-Identifier: MIT OR Apache-2.0
//! Errors of the replay host.

use ordoplay_editor_timeline::TimelineError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or running a replay script
#[derive(Debug, Error)]
pub enum ReplayError {
    /// Bad command line
    #[error("{0}\n\nusage: timeline_replay <project.ron> <script.ron> [--settings settings.ron] [--out out.ron]")]
    Usage(String),

    /// Project, settings or undo failure from the timeline core
    #[error(transparent)]
    Timeline(#[from] TimelineError),

    /// Script file could not be read
    #[error("Could not read script {path:?}: {source}")]
    ReadScript {
        /// Script path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Script is not valid RON
    #[error("Invalid script: {0}")]
    ParseScript(#[from] ron::error::SpannedError),

    /// The project holds no timeline to edit
    #[error("Project contains no timeline")]
    NoTimeline,

    /// A step names a track that does not exist
    #[error("Step {step}: no track named '{name}'")]
    UnknownTrack {
        /// Step index
        step: usize,
        /// Track name
        name: String,
    },

    /// A step names an item that does not exist
    #[error("Step {step}: no item matches {description}")]
    UnknownItem {
        /// Step index
        step: usize,
        /// What was looked for
        description: String,
    },

    /// A step names an action that does not exist
    #[error("Step {step}: unknown action '{id}'")]
    UnknownAction {
        /// Step index
        step: usize,
        /// Action id
        id: String,
    },

    /// A step carries an unparsable shortcut or modifier string
    #[error("Step {step}: invalid key '{text}'")]
    InvalidKey {
        /// Step index
        step: usize,
        /// Offending text
        text: String,
    },
}

/// Result type for the replay host
pub type Result<T> = std::result::Result<T, ReplayError>;
