// SPDX-License-Identifier: GPL-3.0-or-later

//! Genre completion for a selected candidate.

use crate::operator::GenreSource;
use tracing::debug;
use tunetag_domain::{ResolutionOptions, TrackCandidate};

/// Fill in genres the catalog left empty.
///
/// Catalog genres always win. Without them the run's default genres are used,
/// and only when those are empty too is the operator asked.
pub async fn merge<G: GenreSource + ?Sized>(
    mut candidate: TrackCandidate,
    options: &ResolutionOptions,
    source: &mut G,
) -> TrackCandidate {
    if !candidate.genres.is_empty() {
        debug!(target: "merge", genres = %candidate.joined_genres(), "keeping catalog genres");
        return candidate;
    }

    if !options.default_genres.is_empty() {
        candidate.genres = options.default_genres.clone();
        debug!(target: "merge", genres = %candidate.joined_genres(), "using default genres");
        return candidate;
    }

    candidate.genres = source.ask_genres().await;
    debug!(target: "merge", genres = %candidate.joined_genres(), "using operator genres");
    candidate
}
