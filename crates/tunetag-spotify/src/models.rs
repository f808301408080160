// SPDX-License-Identifier: GPL-3.0-or-later

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Track object as returned inside search results.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Track {
    /// Spotify track ID.
    #[serde(default)]
    pub id: Option<String>,
    /// Track name.
    pub name: String,
    /// Credited artists, in catalog order.
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
    /// Album the track appears on (simplified).
    pub album: AlbumRef,
    #[serde(default)]
    pub disc_number: u32,
    #[serde(default)]
    pub track_number: u32,
    #[serde(default)]
    pub duration_ms: u64,
    /// Known external URLs, keyed by service (e.g. "spotify").
    #[serde(default)]
    pub external_urls: HashMap<String, String>,
}

impl Track {
    /// Canonical open.spotify.com URL of the track, if present.
    pub fn spotify_url(&self) -> Option<&str> {
        self.external_urls.get("spotify").map(String::as_str)
    }
}

/// Reference to an artist (minimal info).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArtistRef {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
}

/// Reference to an album (minimal info).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlbumRef {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Full album object from `/v1/albums/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Album {
    pub id: String,
    pub name: String,
    /// "album", "single" or "compilation".
    #[serde(default)]
    pub album_type: String,
    /// Release date (YYYY, YYYY-MM, or YYYY-MM-DD).
    #[serde(default)]
    pub release_date: String,
    /// "year", "month" or "day".
    #[serde(default)]
    pub release_date_precision: Option<String>,
    /// Often empty; Spotify rarely classifies albums.
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub copyrights: Vec<Copyright>,
    /// Cover images, widest first.
    #[serde(default)]
    pub images: Vec<Image>,
}

impl Album {
    /// Copyright lines (type `C`).
    pub fn copyright_lines(&self) -> Vec<String> {
        self.copyrights_of_kind("C")
    }

    /// Sound recording (phonographic) lines (type `P`).
    pub fn publishing_lines(&self) -> Vec<String> {
        self.copyrights_of_kind("P")
    }

    /// URL of the first cover image; `None` when the album has none.
    pub fn cover_url(&self) -> Option<&str> {
        self.images.first().map(|image| image.url.as_str())
    }

    fn copyrights_of_kind(&self, kind: &str) -> Vec<String> {
        self.copyrights
            .iter()
            .filter(|c| c.kind == kind)
            .map(|c| c.text.clone())
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Copyright {
    pub text: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Image {
    pub url: String,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub width: Option<u32>,
}

/// Search query parameters.
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    /// Search query string.
    pub query: String,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }
}

/// Generic paging object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Paging<T> {
    #[serde(default)]
    pub items: Vec<T>,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub offset: u32,
}

/// Track search response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub tracks: Paging<Track>,
}

/// Body of a successful client-credentials token request.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    /// Lifetime in seconds.
    pub expires_in: u64,
}
