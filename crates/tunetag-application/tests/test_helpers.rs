//! Fixtures shared by the pipeline integration tests: silent MP3 files and a
//! mocked Spotify Web API.

#![allow(dead_code)]

use serde_json::json;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tunetag_application::{
    CoverArtFetcher, Id3v2Opener, TagContainer, TagContainerOpener, TagWriter,
};
use tunetag_spotify::{Credentials, SpotifyClient};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Write an untagged file of silent MPEG-1 Layer III frames.
pub fn write_silent_mp3(path: &Path) {
    let mut frame = vec![0u8; 417];
    frame[..4].copy_from_slice(&[0xFF, 0xFB, 0x90, 0x64]);
    let mut file = File::create(path).unwrap();
    for _ in 0..8 {
        file.write_all(&frame).unwrap();
    }
}

pub fn silent_mp3_in(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    write_silent_mp3(&path);
    path
}

/// Write `frames` into the file's ID3v2 tag before the pipeline sees it.
pub fn seed_frames(path: &Path, frames: &[(&str, &str)]) {
    let mut container = Id3v2Opener.open(path, true).unwrap();
    for (id, value) in frames {
        container.set_text_frame(id, value).unwrap();
    }
    container.save().unwrap();
}

/// Frame ids of the file's tag, sorted.
pub fn sorted_frame_ids(path: &Path) -> Vec<String> {
    let mut ids = Id3v2Opener.open(path, true).unwrap().frame_ids();
    ids.sort();
    ids
}

pub fn spotify_client(server: &MockServer) -> SpotifyClient {
    SpotifyClient::builder(Credentials::new("id", "secret"))
        .base_url(server.uri())
        .accounts_base_url(server.uri())
        .min_request_interval(Duration::ZERO)
        .build()
        .unwrap()
}

pub fn tag_writer() -> TagWriter<Id3v2Opener> {
    TagWriter::new(
        Id3v2Opener,
        CoverArtFetcher::new(Duration::from_secs(5)).unwrap(),
    )
}

pub async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "test-token",
            "token_type": "Bearer",
            "expires_in": 3600
        })))
        .mount(server)
        .await;
}

/// A catalog track as the mock will serve it.
pub struct MockTrack<'a> {
    pub term: &'a str,
    pub title: &'a str,
    pub artist: &'a str,
    pub album_id: &'a str,
    pub album: &'a str,
    pub release_date: &'a str,
    /// Status served for the album's cover image.
    pub cover_status: u16,
}

/// Mount search, album and cover endpoints for `track`.
pub async fn mount_track(server: &MockServer, track: &MockTrack<'_>) {
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("q", track.term))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tracks": {
                "items": [{
                    "id": format!("{}-track", track.album_id),
                    "name": track.title,
                    "artists": [{ "name": track.artist }],
                    "album": { "id": track.album_id, "name": track.album },
                    "disc_number": 1,
                    "track_number": 11,
                    "duration_ms": 354320,
                    "external_urls": {
                        "spotify": format!("https://open.spotify.com/track/{}", track.album_id)
                    }
                }],
                "total": 1,
                "offset": 0
            }
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/v1/albums/{}", track.album_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": track.album_id,
            "name": track.album,
            "album_type": "album",
            "release_date": track.release_date,
            "release_date_precision": "day",
            "genres": [],
            "copyrights": [
                { "text": "© 1975 Queen Productions Ltd", "type": "C" },
                { "text": "℗ 1975 EMI", "type": "P" }
            ],
            "images": [{ "url": format!("{}/covers/{}.jpg", server.uri(), track.album_id) }]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/covers/{}.jpg", track.album_id)))
        .respond_with(
            ResponseTemplate::new(track.cover_status).set_body_bytes(vec![0xFF, 0xD8, 0xFF, 0xE0]),
        )
        .mount(server)
        .await;
}

/// Mount a search for `term` that finds nothing.
pub async fn mount_empty_search(server: &MockServer, term: &str) {
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("q", term))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tracks": { "items": [], "total": 0, "offset": 0 }
        })))
        .mount(server)
        .await;
}
