// SPDX-License-Identifier: GPL-3.0-or-later

//! Writing a resolved track into a file's tag container.

use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};
use tunetag_domain::TrackCandidate;

pub const FRAME_TITLE: &str = "TIT2";
pub const FRAME_ALBUM: &str = "TALB";
pub const FRAME_ARTIST: &str = "TPE1";
pub const FRAME_GENRE: &str = "TCON";
pub const FRAME_RECORDING_DATE: &str = "TDRC";
pub const FRAME_TRACK_NUMBER: &str = "TRCK";
pub const FRAME_DISC_NUMBER: &str = "TPOS";
pub const FRAME_LENGTH: &str = "TLEN";
pub const FRAME_PUBLISHER: &str = "TPUB";
pub const FRAME_COPYRIGHT: &str = "TCOP";
pub const FRAME_COMMERCIAL_URL: &str = "WCOM";

pub const COMMENT_LANGUAGE: [u8; 3] = *b"eng";
pub const COMMENT_DESCRIPTION: &str = "Spotify URL";
pub const COVER_MIME_TYPE: &str = "image/jpeg";
pub const COVER_DESCRIPTION: &str = "Front cover";

/// Errors that can occur while tagging a file.
#[derive(Debug, Error)]
pub enum TagWriteError {
    #[error("Failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse tags in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: lofty::error::LoftyError,
    },

    #[error("Invalid frame {id}: {reason}")]
    InvalidFrame { id: String, reason: String },

    #[error("Failed to fetch cover art from {url}: {source}")]
    CoverFetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("Cover art request to {url} returned {status}")]
    CoverStatus { url: String, status: u16 },

    #[error("Failed to save tags to {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: lofty::error::LoftyError,
    },
}

/// Result type used throughout the tag writing module.
pub type TagWriteResult<T> = Result<T, TagWriteError>;

/// An open tag container, exclusively owned from open until save.
pub trait TagContainer {
    /// Drop every frame, pictures included.
    fn delete_all_frames(&mut self);

    /// Set a text frame, replacing any frame with the same id.
    fn set_text_frame(&mut self, id: &str, value: &str) -> TagWriteResult<()>;

    /// Set a comment frame, replacing any comment with the same language and description.
    fn set_comment(&mut self, language: [u8; 3], description: &str, text: &str)
        -> TagWriteResult<()>;

    /// Set a URL link frame, replacing any frame with the same id.
    fn set_url_frame(&mut self, id: &str, url: &str) -> TagWriteResult<()>;

    /// Set the front cover picture.
    fn set_picture(&mut self, data: Vec<u8>, mime_type: &str, description: &str);

    /// Persist the container back to the file it was opened from.
    fn save(&mut self) -> TagWriteResult<()>;
}

/// Opens tag containers for files.
pub trait TagContainerOpener: Send + Sync {
    type Container: TagContainer + Send;

    /// With `parse_existing`, the file's current tag is loaded and any parse
    /// failure is returned; otherwise the container starts empty.
    fn open(&self, path: &Path, parse_existing: bool) -> TagWriteResult<Self::Container>;
}

/// Downloads cover images.
#[derive(Debug, Clone)]
pub struct CoverArtFetcher {
    client: Client,
}

impl CoverArtFetcher {
    pub fn new(timeout: Duration) -> TagWriteResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("tunetag/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(TagWriteError::HttpClient)?;
        Ok(Self { client })
    }

    pub async fn fetch(&self, url: &str) -> TagWriteResult<Vec<u8>> {
        debug!(target: "tagging", url = %url, "fetching cover art");

        let cover_error = |source| TagWriteError::CoverFetch {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(cover_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(TagWriteError::CoverStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(cover_error)?;
        Ok(bytes.to_vec())
    }
}

/// Writes candidates into files through a [`TagContainerOpener`].
pub struct TagWriter<O> {
    opener: O,
    covers: CoverArtFetcher,
}

impl<O: TagContainerOpener> TagWriter<O> {
    pub fn new(opener: O, covers: CoverArtFetcher) -> Self {
        Self { opener, covers }
    }

    /// Tag `path` with `candidate`.
    ///
    /// With `reset` every existing frame is dropped first; otherwise only the
    /// frames written here are replaced. The cover is downloaded before
    /// anything is saved, so a failed download leaves the file untouched.
    #[tracing::instrument(skip(self, candidate, path), fields(path = %path.display(), title = %candidate.track_title))]
    pub async fn write(
        &self,
        candidate: &TrackCandidate,
        path: &Path,
        reset: bool,
    ) -> TagWriteResult<()> {
        let mut container = self.opener.open(path, true)?;

        if reset {
            debug!(target: "tagging", "removing existing frames");
            container.delete_all_frames();
        }

        if let Some(url) = candidate.cover_url.as_deref().filter(|u| !u.is_empty()) {
            let image = self.covers.fetch(url).await?;
            container.set_picture(image, COVER_MIME_TYPE, COVER_DESCRIPTION);
        }

        apply_fields(&mut container, candidate)?;
        container.save()?;

        info!(target: "tagging", "tags written");
        Ok(())
    }
}

/// Write every candidate field into its frame.
///
/// The recording date frame is only written when the date is known.
pub fn apply_fields<C: TagContainer + ?Sized>(
    container: &mut C,
    candidate: &TrackCandidate,
) -> TagWriteResult<()> {
    container.set_text_frame(FRAME_TITLE, &candidate.track_title)?;
    container.set_text_frame(FRAME_ALBUM, &candidate.album_title)?;
    container.set_text_frame(FRAME_ARTIST, &candidate.joined_artists())?;
    container.set_text_frame(FRAME_GENRE, &candidate.joined_genres())?;
    if candidate.release_date.is_some() {
        container.set_text_frame(FRAME_RECORDING_DATE, &candidate.release_date_string())?;
    }
    container.set_text_frame(FRAME_TRACK_NUMBER, &candidate.track_number.to_string())?;
    container.set_text_frame(FRAME_DISC_NUMBER, &candidate.disc_number.to_string())?;
    container.set_text_frame(FRAME_LENGTH, &candidate.duration_ms.to_string())?;
    container.set_text_frame(FRAME_PUBLISHER, &candidate.publishing.join(", "))?;
    container.set_text_frame(FRAME_COPYRIGHT, &candidate.copyright.join(", "))?;
    container.set_comment(
        COMMENT_LANGUAGE,
        COMMENT_DESCRIPTION,
        &format!("Spotify URL: {}", candidate.url),
    )?;
    container.set_url_frame(FRAME_COMMERCIAL_URL, &candidate.url)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::{BTreeMap, HashMap};
    use std::sync::{Arc, Mutex};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Clone, Default, PartialEq)]
    struct StoredTag {
        frames: BTreeMap<String, String>,
        picture: Option<(Vec<u8>, String)>,
    }

    type Store = Arc<Mutex<HashMap<PathBuf, StoredTag>>>;

    struct MemoryContainer {
        path: PathBuf,
        tag: StoredTag,
        store: Store,
    }

    impl TagContainer for MemoryContainer {
        fn delete_all_frames(&mut self) {
            self.tag = StoredTag::default();
        }

        fn set_text_frame(&mut self, id: &str, value: &str) -> TagWriteResult<()> {
            self.tag.frames.insert(id.to_string(), value.to_string());
            Ok(())
        }

        fn set_comment(
            &mut self,
            language: [u8; 3],
            description: &str,
            text: &str,
        ) -> TagWriteResult<()> {
            let key = format!(
                "COMM:{}:{}",
                String::from_utf8_lossy(&language),
                description
            );
            self.tag.frames.insert(key, text.to_string());
            Ok(())
        }

        fn set_url_frame(&mut self, id: &str, url: &str) -> TagWriteResult<()> {
            self.tag.frames.insert(id.to_string(), url.to_string());
            Ok(())
        }

        fn set_picture(&mut self, data: Vec<u8>, mime_type: &str, _description: &str) {
            self.tag.picture = Some((data, mime_type.to_string()));
        }

        fn save(&mut self) -> TagWriteResult<()> {
            self.store
                .lock()
                .unwrap()
                .insert(self.path.clone(), self.tag.clone());
            Ok(())
        }
    }

    #[derive(Default, Clone)]
    struct MemoryOpener {
        store: Store,
    }

    impl MemoryOpener {
        fn seed(&self, path: &str, frames: &[(&str, &str)]) {
            let tag = StoredTag {
                frames: frames
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                picture: None,
            };
            self.store.lock().unwrap().insert(PathBuf::from(path), tag);
        }

        fn stored(&self, path: &str) -> Option<StoredTag> {
            self.store.lock().unwrap().get(Path::new(path)).cloned()
        }
    }

    impl TagContainerOpener for MemoryOpener {
        type Container = MemoryContainer;

        fn open(&self, path: &Path, parse_existing: bool) -> TagWriteResult<MemoryContainer> {
            let tag = if parse_existing {
                self.store
                    .lock()
                    .unwrap()
                    .get(path)
                    .cloned()
                    .unwrap_or_default()
            } else {
                StoredTag::default()
            };
            Ok(MemoryContainer {
                path: path.to_path_buf(),
                tag,
                store: self.store.clone(),
            })
        }
    }

    fn bohemian(cover_url: Option<String>) -> TrackCandidate {
        TrackCandidate {
            ordinal: 1,
            track_title: "Bohemian Rhapsody".to_string(),
            album_title: "A Night at the Opera".to_string(),
            album_type: "album".to_string(),
            artist_names: vec!["Queen".to_string()],
            copyright: vec!["© 1975 Queen Productions Ltd".to_string()],
            publishing: vec!["℗ 1975 EMI".to_string(), "℗ 2011 Hollywood".to_string()],
            cover_url,
            disc_number: 1,
            track_number: 11,
            duration_ms: 354_320,
            release_date: NaiveDate::from_ymd_opt(1975, 10, 31),
            genres: vec!["rock".to_string()],
            url: "https://open.spotify.com/track/4u7EnebtmKWzUH433cf5Qv".to_string(),
        }
    }

    fn writer(opener: MemoryOpener) -> TagWriter<MemoryOpener> {
        TagWriter::new(opener, CoverArtFetcher::new(Duration::from_secs(5)).unwrap())
    }

    #[tokio::test]
    async fn writes_every_field() {
        let opener = MemoryOpener::default();
        let writer = writer(opener.clone());

        writer
            .write(&bohemian(None), Path::new("/music/a.mp3"), false)
            .await
            .unwrap();

        let tag = opener.stored("/music/a.mp3").unwrap();
        let frame = |id: &str| tag.frames.get(id).map(String::as_str);
        assert_eq!(frame(FRAME_TITLE), Some("Bohemian Rhapsody"));
        assert_eq!(frame(FRAME_ALBUM), Some("A Night at the Opera"));
        assert_eq!(frame(FRAME_ARTIST), Some("Queen"));
        assert_eq!(frame(FRAME_GENRE), Some("rock"));
        assert_eq!(frame(FRAME_RECORDING_DATE), Some("1975-10-31"));
        assert_eq!(frame(FRAME_TRACK_NUMBER), Some("11"));
        assert_eq!(frame(FRAME_DISC_NUMBER), Some("1"));
        assert_eq!(frame(FRAME_LENGTH), Some("354320"));
        assert_eq!(frame(FRAME_PUBLISHER), Some("℗ 1975 EMI, ℗ 2011 Hollywood"));
        assert_eq!(frame(FRAME_COPYRIGHT), Some("© 1975 Queen Productions Ltd"));
        assert_eq!(
            frame("COMM:eng:Spotify URL"),
            Some("Spotify URL: https://open.spotify.com/track/4u7EnebtmKWzUH433cf5Qv")
        );
        assert_eq!(
            frame(FRAME_COMMERCIAL_URL),
            Some("https://open.spotify.com/track/4u7EnebtmKWzUH433cf5Qv")
        );
        assert!(tag.picture.is_none());
    }

    #[tokio::test]
    async fn reset_leaves_only_written_frames() {
        let opener = MemoryOpener::default();
        opener.seed("/music/a.mp3", &[("TCOM", "Freddie Mercury"), ("TIT2", "old")]);
        let writer = writer(opener.clone());

        writer
            .write(&bohemian(None), Path::new("/music/a.mp3"), true)
            .await
            .unwrap();

        let tag = opener.stored("/music/a.mp3").unwrap();
        let ids: Vec<&str> = tag.frames.keys().map(String::as_str).collect();
        assert_eq!(
            ids,
            vec![
                "COMM:eng:Spotify URL",
                FRAME_ALBUM,
                FRAME_GENRE,
                FRAME_COPYRIGHT,
                FRAME_RECORDING_DATE,
                FRAME_TITLE,
                FRAME_LENGTH,
                FRAME_ARTIST,
                FRAME_DISC_NUMBER,
                FRAME_PUBLISHER,
                FRAME_TRACK_NUMBER,
                FRAME_COMMERCIAL_URL,
            ]
        );
    }

    #[tokio::test]
    async fn without_reset_unrelated_frames_survive() {
        let opener = MemoryOpener::default();
        opener.seed(
            "/music/a.mp3",
            &[("TCOM", "Freddie Mercury"), ("TIT2", "old"), ("TPE1", "old")],
        );
        let writer = writer(opener.clone());

        writer
            .write(&bohemian(None), Path::new("/music/a.mp3"), false)
            .await
            .unwrap();

        let tag = opener.stored("/music/a.mp3").unwrap();
        assert_eq!(tag.frames.get("TCOM").map(String::as_str), Some("Freddie Mercury"));
        assert_eq!(tag.frames.get(FRAME_TITLE).map(String::as_str), Some("Bohemian Rhapsody"));
        assert_eq!(tag.frames.get(FRAME_ARTIST).map(String::as_str), Some("Queen"));
    }

    #[tokio::test]
    async fn unknown_release_date_is_not_written() {
        let opener = MemoryOpener::default();
        let writer = writer(opener.clone());
        let mut candidate = bohemian(None);
        candidate.release_date = None;

        writer
            .write(&candidate, Path::new("/music/a.mp3"), true)
            .await
            .unwrap();

        let tag = opener.stored("/music/a.mp3").unwrap();
        assert!(!tag.frames.contains_key(FRAME_RECORDING_DATE));
    }

    #[tokio::test]
    async fn embeds_downloaded_cover() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cover.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xFF, 0xD8, 0xFF, 0xE0]))
            .expect(1)
            .mount(&server)
            .await;

        let opener = MemoryOpener::default();
        let writer = writer(opener.clone());

        writer
            .write(
                &bohemian(Some(format!("{}/cover.jpg", server.uri()))),
                Path::new("/music/a.mp3"),
                false,
            )
            .await
            .unwrap();

        let tag = opener.stored("/music/a.mp3").unwrap();
        assert_eq!(
            tag.picture,
            Some((vec![0xFF, 0xD8, 0xFF, 0xE0], "image/jpeg".to_string()))
        );
    }

    #[tokio::test]
    async fn failed_cover_download_saves_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cover.jpg"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let opener = MemoryOpener::default();
        opener.seed("/music/a.mp3", &[("TIT2", "untouched")]);
        let writer = writer(opener.clone());

        let result = writer
            .write(
                &bohemian(Some(format!("{}/cover.jpg", server.uri()))),
                Path::new("/music/a.mp3"),
                true,
            )
            .await;

        assert!(matches!(result, Err(TagWriteError::CoverStatus { status: 503, .. })));
        let tag = opener.stored("/music/a.mp3").unwrap();
        assert_eq!(tag.frames.len(), 1);
        assert_eq!(tag.frames.get("TIT2").map(String::as_str), Some("untouched"));
    }
}
