// SPDX-License-Identifier: GPL-3.0-or-later
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Track candidates
// ============================================================================

/// One catalog entry offered for a file, fully enriched with album data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackCandidate {
    /// 1-based position in the candidate list; the only key a selection accepts.
    pub ordinal: u32,
    pub track_title: String,
    pub album_title: String,
    pub album_type: String,
    /// Artist names in catalog order.
    pub artist_names: Vec<String>,
    pub copyright: Vec<String>,
    pub publishing: Vec<String>,
    pub cover_url: Option<String>,
    pub disc_number: u32,
    pub track_number: u32,
    pub duration_ms: u64,
    /// `None` when the catalog date could not be parsed.
    pub release_date: Option<NaiveDate>,
    pub genres: Vec<String>,
    /// Canonical external URL of the track.
    pub url: String,
}

impl TrackCandidate {
    pub fn joined_artists(&self) -> String {
        self.artist_names.join(", ")
    }

    pub fn joined_genres(&self) -> String {
        self.genres.join(", ")
    }

    /// Release date as `YYYY-MM-DD`, or an empty string when unknown.
    pub fn release_date_string(&self) -> String {
        self.release_date
            .map(|date| date.format(RELEASE_DATE_FORMAT).to_string())
            .unwrap_or_default()
    }

    /// File name (without directory) this track should be stored under,
    /// `"Artist, Artist - Title.ext"`.
    ///
    /// Path separators in artist or title are replaced by `_`.
    pub fn file_name(&self, extension: &str) -> String {
        let stem = format!("{} - {}", self.joined_artists(), self.track_title);
        let stem: String = stem
            .chars()
            .map(|c| if c == '/' || c == '\\' { '_' } else { c })
            .collect();

        if extension.is_empty() {
            stem
        } else {
            format!("{}.{}", stem, extension.trim_start_matches('.'))
        }
    }
}

impl fmt::Display for TrackCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[{}]", self.ordinal)?;
        writeln!(f, "Name: {}", self.track_title)?;
        writeln!(f, "Album: {} ({})", self.album_title, self.album_type)?;
        writeln!(f, "Artists: {}", self.joined_artists())?;
        writeln!(f, "Release Date: {}", self.release_date_string())?;
        writeln!(f, "Genres: {}", self.joined_genres())?;
        writeln!(f, "Copyright: {}", self.copyright.join(", "))?;
        writeln!(f, "Publishing: {}", self.publishing.join(", "))?;
        writeln!(f, "Cover URL: {}", self.cover_url.as_deref().unwrap_or(""))?;
        writeln!(f, "Track Number: {}", self.track_number)?;
        writeln!(f, "Disc Number: {}", self.disc_number)?;
        let seconds = self.duration_ms / 1000;
        writeln!(
            f,
            "Duration: {}:{:02} ({} ms)",
            seconds / 60,
            seconds % 60,
            self.duration_ms
        )?;
        write!(f, "URL: {}", self.url)
    }
}

// ============================================================================
// Release dates
// ============================================================================

pub const RELEASE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Precision of a catalog release date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DatePrecision {
    Year,
    Month,
    #[default]
    Day,
}

/// Parse a catalog release date.
///
/// Reduced-precision dates resolve to the first day of the period. Anything
/// that does not fit the stated precision yields `None`.
pub fn parse_release_date(value: &str, precision: DatePrecision) -> Option<NaiveDate> {
    let value = value.trim();
    match precision {
        DatePrecision::Day => NaiveDate::parse_from_str(value, RELEASE_DATE_FORMAT).ok(),
        DatePrecision::Month => {
            NaiveDate::parse_from_str(&format!("{}-01", value), RELEASE_DATE_FORMAT).ok()
        }
        DatePrecision::Year => {
            let year: i32 = value.parse().ok()?;
            NaiveDate::from_ymd_opt(year, 1, 1)
        }
    }
}

// ============================================================================
// Run options
// ============================================================================

/// Read-only options shared by every file in one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionOptions {
    /// Search term override; `None` derives the term from the file name.
    pub term: Option<String>,
    pub default_genres: Vec<String>,
    pub reset: bool,
    pub rename: bool,
}

impl ResolutionOptions {
    pub fn new(term: Option<String>, genres: &str, reset: bool, rename: bool) -> Self {
        Self {
            term: term
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),
            default_genres: split_comma_list(genres),
            reset,
            rename,
        }
    }

    /// Options for a directory sweep: the search term is always per file.
    pub fn for_directory(&self) -> Self {
        Self {
            term: None,
            ..self.clone()
        }
    }
}

/// Split comma-separated input into trimmed, non-empty entries.
pub fn split_comma_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
