// SPDX-License-Identifier: GPL-3.0-or-later

//! Candidate resolution: one catalog search, enriched with album data.

use crate::operator::TermReviser;
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{debug, info, warn};
use tunetag_domain::{parse_release_date, DatePrecision, TrackCandidate};
use tunetag_spotify::{Album, SearchQuery, SpotifyClient, SpotifyError, Track};

/// The two catalog operations resolution depends on.
#[async_trait]
pub trait TrackCatalog: Send + Sync {
    async fn search_tracks(&self, term: &str) -> Result<Vec<Track>, SpotifyError>;
    async fn get_album(&self, id: &str) -> Result<Album, SpotifyError>;
}

#[async_trait]
impl TrackCatalog for SpotifyClient {
    async fn search_tracks(&self, term: &str) -> Result<Vec<Track>, SpotifyError> {
        let response = SpotifyClient::search_tracks(self, SearchQuery::new(term)).await?;
        Ok(response.tracks.items)
    }

    async fn get_album(&self, id: &str) -> Result<Album, SpotifyError> {
        SpotifyClient::get_album(self, id).await
    }
}

/// Outcome of a search that may be revised by the operator.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Found {
        /// The term that produced the candidates.
        term: String,
        candidates: Vec<TrackCandidate>,
    },
    /// The operator gave up on finding this file.
    Abandoned,
}

/// Turns search terms into ordered, enriched candidate lists.
pub struct CandidateResolver<'a, C: ?Sized> {
    catalog: &'a C,
}

impl<'a, C: TrackCatalog + ?Sized> CandidateResolver<'a, C> {
    pub fn new(catalog: &'a C) -> Self {
        Self { catalog }
    }

    /// Search once and enrich every hit with its album.
    ///
    /// A failed search is returned as is. A failed album lookup only drops
    /// that one hit. Ordinals are assigned after dropping, so they are always
    /// `1..=len`.
    #[tracing::instrument(skip(self))]
    pub async fn resolve(&self, term: &str) -> Result<Vec<TrackCandidate>, SpotifyError> {
        let tracks = self.catalog.search_tracks(term).await?;
        debug!(target: "resolver", hits = tracks.len(), "search returned");

        let mut albums: HashMap<String, Album> = HashMap::new();
        let mut candidates = Vec::with_capacity(tracks.len());

        for track in &tracks {
            if !albums.contains_key(&track.album.id) {
                match self.catalog.get_album(&track.album.id).await {
                    Ok(album) => {
                        albums.insert(track.album.id.clone(), album);
                    }
                    Err(error) => {
                        warn!(
                            target: "resolver",
                            track = %track.name,
                            album_id = %track.album.id,
                            %error,
                            "album lookup failed, skipping candidate"
                        );
                        continue;
                    }
                }
            }

            if let Some(album) = albums.get(&track.album.id) {
                let ordinal = candidates.len() as u32 + 1;
                candidates.push(build_candidate(ordinal, track, album));
            }
        }

        Ok(candidates)
    }

    /// Search, asking the operator for a new term each time nothing comes back.
    pub async fn resolve_with_revisions<R: TermReviser + ?Sized>(
        &self,
        term: String,
        reviser: &mut R,
    ) -> Result<Resolution, SpotifyError> {
        let mut term = term;
        loop {
            info!(target: "resolver", term = %term, "searching");
            let candidates = self.resolve(&term).await?;
            if !candidates.is_empty() {
                return Ok(Resolution::Found { term, candidates });
            }

            match reviser.revise_term(&term).await {
                Some(revised) => term = revised,
                None => return Ok(Resolution::Abandoned),
            }
        }
    }
}

fn date_precision(precision: Option<&str>) -> DatePrecision {
    match precision {
        Some("year") => DatePrecision::Year,
        Some("month") => DatePrecision::Month,
        _ => DatePrecision::Day,
    }
}

fn build_candidate(ordinal: u32, track: &Track, album: &Album) -> TrackCandidate {
    TrackCandidate {
        ordinal,
        track_title: track.name.clone(),
        album_title: album.name.clone(),
        album_type: album.album_type.clone(),
        artist_names: track.artists.iter().map(|a| a.name.clone()).collect(),
        copyright: album.copyright_lines(),
        publishing: album.publishing_lines(),
        cover_url: album.cover_url().map(str::to_string),
        disc_number: track.disc_number,
        track_number: track.track_number,
        duration_ms: track.duration_ms,
        release_date: parse_release_date(
            &album.release_date,
            date_precision(album.release_date_precision.as_deref()),
        ),
        genres: album.genres.clone(),
        url: track.spotify_url().unwrap_or_default().to_string(),
    }
}
