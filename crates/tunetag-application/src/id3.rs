// SPDX-License-Identifier: GPL-3.0-or-later

//! ID3v2 tag containers for MP3 files, backed by lofty.
//!
//! lofty upgrades whatever it reads to ID3v2.4 and always writes v2.4, so
//! every frame the tag writer produces is representable regardless of the
//! version the file started with.

use crate::tag_writer::{TagContainer, TagContainerOpener, TagWriteError, TagWriteResult};
use lofty::config::{ParseOptions, WriteOptions};
use lofty::file::AudioFile;
use lofty::id3::v2::{
    CommentFrame, Frame, FrameId, Id3v2Tag, TextInformationFrame, UrlLinkFrame,
};
use lofty::mpeg::MpegFile;
use lofty::picture::{MimeType, Picture, PictureType};
use lofty::tag::TagExt;
use lofty::TextEncoding;
use std::borrow::Cow;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Opens MP3 files for ID3v2 tagging.
#[derive(Debug, Default, Clone, Copy)]
pub struct Id3v2Opener;

impl TagContainerOpener for Id3v2Opener {
    type Container = Id3v2Container;

    fn open(&self, path: &Path, parse_existing: bool) -> TagWriteResult<Id3v2Container> {
        if !parse_existing {
            return Ok(Id3v2Container::empty(path));
        }
        Id3v2Container::read(path)
    }
}

/// The ID3v2 tag of one MP3 file, held in memory until saved.
#[derive(Debug, Clone)]
pub struct Id3v2Container {
    path: PathBuf,
    tag: Id3v2Tag,
}

impl Id3v2Container {
    fn empty(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            tag: Id3v2Tag::new(),
        }
    }

    /// Parse the existing ID3v2 tag of `path`; a file without one yields an empty tag.
    pub fn read(path: &Path) -> TagWriteResult<Self> {
        let mut file = File::open(path).map_err(|source| TagWriteError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut mpeg = MpegFile::read_from(&mut file, ParseOptions::new().read_properties(false))
            .map_err(|source| TagWriteError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let tag = mpeg.remove_id3v2().unwrap_or_default();
        debug!(target: "tagging", path = %path.display(), frames = tag.len(), "tag container opened");

        Ok(Self {
            path: path.to_path_buf(),
            tag,
        })
    }

    /// Content of a text frame, if present.
    ///
    /// Date frames such as `TDRC` are parsed into timestamps when read and
    /// are rendered back in ISO 8601 form.
    pub fn text(&self, id: &str) -> Option<String> {
        let id = FrameId::new(id).ok()?;
        match self.tag.get(&id)? {
            Frame::Text(frame) => Some(frame.value.clone()),
            Frame::Timestamp(frame) => Some(frame.timestamp.to_string()),
            _ => None,
        }
    }

    /// Ids of all frames currently held, in tag order.
    pub fn frame_ids(&self) -> Vec<String> {
        let tag: &Id3v2Tag = &self.tag;
        tag.into_iter()
            .map(|frame| frame.id_str().to_string())
            .collect()
    }
}

fn frame_id(id: &str) -> TagWriteResult<FrameId<'static>> {
    FrameId::new(Cow::Owned(id.to_string())).map_err(|e| TagWriteError::InvalidFrame {
        id: id.to_string(),
        reason: e.to_string(),
    })
}

impl TagContainer for Id3v2Container {
    fn delete_all_frames(&mut self) {
        self.tag.clear();
    }

    fn set_text_frame(&mut self, id: &str, value: &str) -> TagWriteResult<()> {
        let frame = TextInformationFrame::new(frame_id(id)?, TextEncoding::UTF8, value.to_string());
        self.tag.insert(Frame::Text(frame));
        Ok(())
    }

    fn set_comment(
        &mut self,
        language: [u8; 3],
        description: &str,
        text: &str,
    ) -> TagWriteResult<()> {
        let frame = CommentFrame::new(
            TextEncoding::UTF8,
            language,
            description.to_string(),
            text.to_string(),
        );
        self.tag.insert(Frame::Comment(frame));
        Ok(())
    }

    fn set_url_frame(&mut self, id: &str, url: &str) -> TagWriteResult<()> {
        let frame = UrlLinkFrame::new(frame_id(id)?, url.to_string());
        self.tag.insert(Frame::Url(frame));
        Ok(())
    }

    fn set_picture(&mut self, data: Vec<u8>, mime_type: &str, description: &str) {
        let picture = Picture::new_unchecked(
            PictureType::CoverFront,
            Some(MimeType::from_str(mime_type)),
            Some(description.to_string()),
            data,
        );
        self.tag.insert_picture(picture);
    }

    fn save(&mut self) -> TagWriteResult<()> {
        self.tag
            .save_to_path(&self.path, WriteOptions::default())
            .map_err(|source| TagWriteError::Persist {
                path: self.path.clone(),
                source,
            })
    }
}
