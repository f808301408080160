// SPDX-License-Identifier: GPL-3.0-or-later

//! The single-file tagging pipeline.
//!
//! resolve → select → merge → write → (rename), strictly in that order.

use crate::error::{PipelineError, PipelineResult};
use crate::merge::merge;
use crate::operator::Operator;
use crate::resolver::{CandidateResolver, Resolution, TrackCatalog};
use crate::selector::{select, Selection};
use crate::tag_writer::{TagContainerOpener, TagWriter};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tunetag_domain::{ResolutionOptions, TrackCandidate};

/// How processing of one file ended, short of an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Tagged {
        path: PathBuf,
        /// Set when the file was renamed after tagging.
        renamed_to: Option<PathBuf>,
    },
    /// The operator gave up; nothing was written.
    Abandoned,
}

/// Drives one file at a time through resolution, selection, merge and write.
pub struct TaggingPipeline<'a, C: ?Sized, O> {
    catalog: &'a C,
    writer: TagWriter<O>,
}

impl<'a, C, O> TaggingPipeline<'a, C, O>
where
    C: TrackCatalog + ?Sized,
    O: TagContainerOpener,
{
    pub fn new(catalog: &'a C, writer: TagWriter<O>) -> Self {
        Self { catalog, writer }
    }

    #[tracing::instrument(skip(self, path, options, operator), fields(path = %path.display()))]
    pub async fn process_file<P: Operator + ?Sized>(
        &self,
        path: &Path,
        options: &ResolutionOptions,
        operator: &mut P,
    ) -> PipelineResult<FileOutcome> {
        validate_input(path)?;

        let term = match &options.term {
            Some(term) => term.clone(),
            None => term_from_filename(path),
        };
        if term.trim().is_empty() {
            return Err(PipelineError::input(path, "no search term could be derived"));
        }

        let candidates = match CandidateResolver::new(self.catalog)
            .resolve_with_revisions(term, &mut *operator)
            .await?
        {
            Resolution::Found { candidates, .. } => candidates,
            Resolution::Abandoned => {
                info!(target: "resolver", "no candidate found, file skipped");
                return Ok(FileOutcome::Abandoned);
            }
        };

        let candidate = match select(candidates, &mut *operator).await {
            Selection::Chosen(candidate) => candidate,
            Selection::Abandoned => {
                info!(target: "selector", "selection abandoned, file skipped");
                return Ok(FileOutcome::Abandoned);
            }
        };

        let candidate = merge(candidate, options, &mut *operator).await;
        self.writer.write(&candidate, path, options.reset).await?;

        let renamed_to = if options.rename {
            rename_to_track(path, &candidate)
        } else {
            None
        };

        Ok(FileOutcome::Tagged {
            path: path.to_path_buf(),
            renamed_to,
        })
    }
}

/// Whether `path` carries an `.mp3` extension, in any case.
pub fn is_mp3(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("mp3"))
}

/// The file name without directory and extension.
pub fn term_from_filename(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn validate_input(path: &Path) -> PipelineResult<()> {
    if !path.exists() {
        return Err(PipelineError::input(path, "file does not exist"));
    }
    if !path.is_file() {
        return Err(PipelineError::input(path, "not a regular file"));
    }
    if !is_mp3(path) {
        return Err(PipelineError::input(path, "not an mp3 file"));
    }
    Ok(())
}

/// Rename a freshly tagged file to `"Artist, Artist - Title.ext"` in its
/// directory. Failures are logged; the tags already written stand.
pub fn rename_to_track(path: &Path, candidate: &TrackCandidate) -> Option<PathBuf> {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().into_owned())
        .unwrap_or_default();
    let target = path.with_file_name(candidate.file_name(&extension));

    if target == path {
        return None;
    }
    if target.exists() {
        warn!(
            target: "tagging",
            from = %path.display(),
            to = %target.display(),
            "rename target already exists, keeping original name"
        );
        return None;
    }

    match std::fs::rename(path, &target) {
        Ok(()) => {
            info!(target: "tagging", to = %target.display(), "file renamed");
            Some(target)
        }
        Err(error) => {
            warn!(
                target: "tagging",
                from = %path.display(),
                to = %target.display(),
                %error,
                "rename failed"
            );
            None
        }
    }
}
