// SPDX-License-Identifier: GPL-3.0-or-later

use crate::auth::{Credentials, TokenProvider};
use crate::error::{Result, SpotifyError};
use crate::models::{Album, SearchQuery, SearchResponse};
use crate::rate_limiter::RateLimiter;
use reqwest::header::RETRY_AFTER;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, trace};
use url::Url;

const SPOTIFY_API_BASE: &str = "https://api.spotify.com";
const SPOTIFY_ACCOUNTS_BASE: &str = "https://accounts.spotify.com";
const USER_AGENT: &str = concat!("tunetag/", env!("CARGO_PKG_VERSION"));

/// Spotify Web API client.
///
/// Built once per process and shared by reference; the access token is
/// cached inside and refreshed transparently.
#[derive(Debug, Clone)]
pub struct SpotifyClient {
    client: Client,
    base_url: String,
    tokens: TokenProvider,
    rate_limiter: RateLimiter,
}

impl SpotifyClient {
    /// Create a client with default endpoints and timeouts.
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::builder(credentials).build()
    }

    /// Create a client builder for custom configuration.
    pub fn builder(credentials: Credentials) -> SpotifyClientBuilder {
        SpotifyClientBuilder::new(credentials)
    }

    /// Search the catalog for tracks.
    ///
    /// # Example
    /// ```no_run
    /// # use tunetag_spotify::{Credentials, SearchQuery, SpotifyClient};
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = SpotifyClient::new(Credentials::new("id", "secret"))?;
    /// let response = client.search_tracks(SearchQuery::new("Bohemian Rhapsody")).await?;
    /// for track in response.tracks.items {
    ///     println!("{}", track.name);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn search_tracks(&self, query: SearchQuery) -> Result<SearchResponse> {
        let mut url = Url::parse(&format!("{}/v1/search", self.base_url))
            .map_err(|e| SpotifyError::InvalidResponse(e.to_string()))?;

        url.query_pairs_mut()
            .append_pair("q", &query.query)
            .append_pair("type", "track");

        self.get(url.as_str()).await
    }

    /// Fetch the full album record (release date, genres, copyrights, images).
    pub async fn get_album(&self, id: &str) -> Result<Album> {
        let url = format!("{}/v1/albums/{}", self.base_url, id);
        self.get(&url).await
    }

    /// Internal method to perform authenticated, rate-limited GET requests.
    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let token = self.tokens.access_token(&self.client).await?;
        let _permit = self.rate_limiter.acquire().await?;

        trace!(target: "spotify", "GET {}", url);

        let response = self.client.get(url).bearer_auth(token).send().await?;

        let status = response.status();
        debug!(target: "spotify", "response status: {}", status);

        if status == StatusCode::NOT_FOUND {
            return Err(SpotifyError::NotFound(url.to_string()));
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(SpotifyError::RateLimitExceeded { retry_after });
        }

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SpotifyError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        trace!(target: "spotify", "response body: {}", body);

        Ok(serde_json::from_str(&body)?)
    }
}

/// Builder for configuring a Spotify client.
#[derive(Debug)]
pub struct SpotifyClientBuilder {
    credentials: Credentials,
    base_url: String,
    accounts_base_url: String,
    timeout: Duration,
    min_request_interval: Duration,
}

impl SpotifyClientBuilder {
    fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            base_url: SPOTIFY_API_BASE.to_string(),
            accounts_base_url: SPOTIFY_ACCOUNTS_BASE.to_string(),
            timeout: Duration::from_secs(30),
            min_request_interval: Duration::from_millis(100),
        }
    }

    /// Set a custom API base URL (useful for testing with mock servers).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set a custom accounts (token) base URL.
    pub fn accounts_base_url(mut self, url: impl Into<String>) -> Self {
        self.accounts_base_url = url.into();
        self
    }

    /// Set request timeout duration.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the minimum interval between API requests.
    pub fn min_request_interval(mut self, interval: Duration) -> Self {
        self.min_request_interval = interval;
        self
    }

    /// Build the Spotify client.
    pub fn build(self) -> Result<SpotifyClient> {
        let client = Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(SpotifyClient {
            client,
            base_url: self.base_url.trim_end_matches('/').to_string(),
            tokens: TokenProvider::new(self.credentials, &self.accounts_base_url),
            rate_limiter: RateLimiter::new(self.min_request_interval),
        })
    }
}
