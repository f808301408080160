// SPDX-License-Identifier: GPL-3.0-or-later

use crate::error::{Result, SpotifyError};
use std::sync::Arc;
use tokio::sync::{Semaphore, SemaphorePermit};
use tokio::time::{sleep, Duration, Instant};

/// Spaces out Spotify API calls.
///
/// Spotify enforces a rolling 30-second window rather than a fixed rate, so a
/// short minimum interval between requests is enough to avoid bursts when a
/// search fans out into one album lookup per result.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    semaphore: Arc<Semaphore>,
    min_interval: Duration,
    last_request: Arc<tokio::sync::Mutex<Option<Instant>>>,
}

impl RateLimiter {
    /// Create a new rate limiter with the specified minimum interval between requests.
    pub fn new(min_interval: Duration) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(1)),
            min_interval,
            last_request: Arc::new(tokio::sync::Mutex::new(None)),
        }
    }

    /// Wait until a request can be made. The returned permit serialises requests
    /// for as long as it is held.
    pub async fn acquire(&self) -> Result<SemaphorePermit<'_>> {
        let permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| SpotifyError::RateLimiterClosed)?;

        let mut last = self.last_request.lock().await;

        if let Some(last_instant) = *last {
            let elapsed = last_instant.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                tracing::trace!(
                    target: "spotify",
                    "rate limiting: waiting {:?}",
                    wait_time
                );
                sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
        Ok(permit)
    }
}
