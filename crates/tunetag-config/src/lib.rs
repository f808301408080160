// SPDX-License-Identifier: GPL-3.0-or-later
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub api_base_url: String,
    pub accounts_base_url: String,
    pub timeout_secs: u64,
    pub min_request_interval_ms: u64,
}

impl Default for SpotifyConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            api_base_url: "https://api.spotify.com".to_string(),
            accounts_base_url: "https://accounts.spotify.com".to_string(),
            timeout_secs: 30,
            min_request_interval_ms: 100,
        }
    }
}

impl SpotifyConfig {
    /// Client id and secret for the client-credentials grant.
    ///
    /// Both must be present and non-blank.
    pub fn credentials(&self) -> Result<(String, String)> {
        let id = self.client_id.as_deref().map(str::trim).unwrap_or_default();
        let secret = self
            .client_secret
            .as_deref()
            .map(str::trim)
            .unwrap_or_default();

        if id.is_empty() || secret.is_empty() {
            bail!(
                "spotify credentials missing: set TUNETAG_SPOTIFY__CLIENT_ID and TUNETAG_SPOTIFY__CLIENT_SECRET"
            );
        }

        Ok((id.to_string(), secret.to_string()))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn min_request_interval(&self) -> Duration {
        Duration::from_millis(self.min_request_interval_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    pub log_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub spotify: SpotifyConfig,
    pub telemetry: TelemetryConfig,
}

/// Load configuration from defaults, optional TOML file, and environment overrides (prefix: TUNETAG_).
pub fn load(config_path: Option<&Path>) -> Result<AppConfig> {
    let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));

    if let Some(path) = config_path {
        figment = figment.merge(Toml::file(path));
    }

    figment = figment.merge(Env::prefixed("TUNETAG_").split("__"));

    Ok(figment.extract()?)
}
