// SPDX-License-Identifier: GPL-3.0-or-later
pub mod batch;
pub mod error;
pub mod id3;
pub mod merge;
pub mod operator;
pub mod pipeline;
pub mod resolver;
pub mod selector;
pub mod tag_writer;

pub use batch::{list_audio_files, run_directory, BatchReport, FileReport, FileState};
pub use error::{ErrorKind, PipelineError, PipelineResult};
pub use id3::{Id3v2Container, Id3v2Opener};
pub use merge::merge;
pub use operator::{
    AutoSelect, Choice, DecisionProvider, GenreSource, Operator, ScriptedOperator, TermReviser,
    TerminalPrompt,
};
pub use pipeline::{FileOutcome, TaggingPipeline};
pub use resolver::{CandidateResolver, Resolution, TrackCatalog};
pub use selector::{select, Selection};
pub use tag_writer::{
    CoverArtFetcher, TagContainer, TagContainerOpener, TagWriteError, TagWriteResult, TagWriter,
};
