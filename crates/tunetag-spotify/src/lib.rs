// SPDX-License-Identifier: GPL-3.0-or-later

//! Spotify Web API client for track search and album lookup.
//!
//! Authenticates with the client-credentials grant and caches the access
//! token until shortly before it expires. Requests are spaced by a small
//! minimum interval to stay clear of the API's rolling rate limit.

pub mod auth;
pub mod client;
pub mod error;
pub mod models;
pub mod rate_limiter;

pub use auth::Credentials;
pub use client::SpotifyClient;
pub use error::{Result, SpotifyError};
pub use models::{Album, Copyright, Image, Paging, SearchQuery, SearchResponse, Track};
