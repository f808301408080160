// SPDX-License-Identifier: GPL-3.0-or-later

use crate::tag_writer::TagWriteError;
use std::path::PathBuf;
use thiserror::Error;
use tunetag_spotify::SpotifyError;

/// Errors that end the processing of one file.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Path does not exist, is not a regular file, or is not an MP3
    #[error("Invalid input {path}: {reason}")]
    Input { path: PathBuf, reason: String },

    /// Search, album lookup or token acquisition failed
    #[error("Catalog request failed: {0}")]
    Catalog(#[from] SpotifyError),

    #[error(transparent)]
    Tagging(#[from] TagWriteError),
}

/// Coarse classification of a [`PipelineError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Input,
    Network,
    Parse,
    Persist,
}

impl PipelineError {
    pub fn input(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Input {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Input { .. } => ErrorKind::Input,
            Self::Catalog(_) => ErrorKind::Network,
            Self::Tagging(error) => match error {
                TagWriteError::CoverFetch { .. }
                | TagWriteError::CoverStatus { .. }
                | TagWriteError::HttpClient(_) => ErrorKind::Network,
                TagWriteError::Io { .. } | TagWriteError::Parse { .. } => ErrorKind::Parse,
                TagWriteError::InvalidFrame { .. } | TagWriteError::Persist { .. } => {
                    ErrorKind::Persist
                }
            },
        }
    }
}

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
