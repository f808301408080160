// SPDX-License-Identifier: GPL-3.0-or-later

//! Directory sweeps: the single-file pipeline applied to every MP3 in a folder.

use crate::operator::Operator;
use crate::pipeline::{is_mp3, FileOutcome, TaggingPipeline};
use crate::resolver::TrackCatalog;
use crate::tag_writer::TagContainerOpener;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tunetag_domain::ResolutionOptions;

/// Processing state of one file in a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileState {
    Pending,
    InProgress,
    Done,
    /// The operator abandoned the file.
    Skipped,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub path: PathBuf,
    pub state: FileState,
    /// Set for `Failed` files.
    pub error: Option<String>,
    /// Set when the file was renamed after tagging.
    pub renamed_to: Option<PathBuf>,
}

impl FileReport {
    fn pending(path: PathBuf) -> Self {
        Self {
            path,
            state: FileState::Pending,
            error: None,
            renamed_to: None,
        }
    }
}

/// Per-file results of one directory sweep, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub files: Vec<FileReport>,
}

impl BatchReport {
    pub fn count(&self, state: FileState) -> usize {
        self.files.iter().filter(|f| f.state == state).count()
    }

    pub fn state_of(&self, path: &Path) -> Option<FileState> {
        self.files.iter().find(|f| f.path == path).map(|f| f.state)
    }

    pub fn has_failures(&self) -> bool {
        self.count(FileState::Failed) > 0
    }
}

/// MP3 files directly inside `dir`, sorted by name.
///
/// Subdirectories are not descended into.
pub fn list_audio_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            continue;
        }
        let path = entry.path();
        if is_mp3(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Tag every MP3 in `dir`.
///
/// A failing file is recorded and the sweep moves on; only an unreadable
/// directory is an error. The search term override in `options` is ignored.
#[tracing::instrument(skip(pipeline, options, operator), fields(dir = %dir.display()))]
pub async fn run_directory<C, O, P>(
    pipeline: &TaggingPipeline<'_, C, O>,
    dir: &Path,
    options: &ResolutionOptions,
    operator: &mut P,
) -> std::io::Result<BatchReport>
where
    C: TrackCatalog + ?Sized,
    O: TagContainerOpener,
    P: Operator + ?Sized,
{
    let options = options.for_directory();
    let mut report = BatchReport {
        files: list_audio_files(dir)?
            .into_iter()
            .map(FileReport::pending)
            .collect(),
    };
    info!(target: "batch", files = report.files.len(), "starting directory sweep");

    for file in report.files.iter_mut() {
        file.state = FileState::InProgress;
        info!(target: "batch", path = %file.path.display(), "processing file");

        match pipeline.process_file(&file.path, &options, &mut *operator).await {
            Ok(FileOutcome::Tagged { renamed_to, .. }) => {
                file.state = FileState::Done;
                file.renamed_to = renamed_to;
            }
            Ok(FileOutcome::Abandoned) => file.state = FileState::Skipped,
            Err(err) => {
                error!(
                    target: "batch",
                    path = %file.path.display(),
                    error = %err,
                    "file failed, continuing"
                );
                file.state = FileState::Failed;
                file.error = Some(err.to_string());
            }
        }
    }

    info!(
        target: "batch",
        done = report.count(FileState::Done),
        skipped = report.count(FileState::Skipped),
        failed = report.count(FileState::Failed),
        "directory sweep completed"
    );

    Ok(report)
}
