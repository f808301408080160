// SPDX-License-Identifier: GPL-3.0-or-later

//! Client-credentials token acquisition and caching.

use crate::error::{Result, SpotifyError};
use crate::models::TokenResponse;
use reqwest::Client;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};
use tracing::debug;

/// Tokens are refreshed this long before Spotify says they expire.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Application credentials for the client-credentials grant.
#[derive(Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    refresh_at: Instant,
}

/// Fetches access tokens from the accounts service and reuses them until
/// they are close to expiry.
#[derive(Debug, Clone)]
pub(crate) struct TokenProvider {
    credentials: Credentials,
    token_url: String,
    cached: Arc<Mutex<Option<CachedToken>>>,
}

impl TokenProvider {
    pub(crate) fn new(credentials: Credentials, accounts_base_url: &str) -> Self {
        Self {
            credentials,
            token_url: format!("{}/api/token", accounts_base_url.trim_end_matches('/')),
            cached: Arc::new(Mutex::new(None)),
        }
    }

    /// Return a valid access token, requesting a new one when needed.
    pub(crate) async fn access_token(&self, client: &Client) -> Result<String> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.refresh_at {
                return Ok(token.access_token.clone());
            }
        }

        debug!(target: "spotify", url = %self.token_url, "requesting access token");

        let response = client
            .post(&self.token_url)
            .basic_auth(
                &self.credentials.client_id,
                Some(&self.credentials.client_secret),
            )
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SpotifyError::Unauthorized {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        let token: TokenResponse = serde_json::from_str(&body)?;

        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(EXPIRY_MARGIN);
        debug!(
            target: "spotify",
            expires_in = token.expires_in,
            token_type = %token.token_type,
            "access token acquired"
        );

        *cached = Some(CachedToken {
            access_token: token.access_token.clone(),
            refresh_at: Instant::now() + lifetime,
        });

        Ok(token.access_token)
    }
}
