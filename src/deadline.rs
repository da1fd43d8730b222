//! Process-wide deadline shared by the network call and the CSV export.
//!
//! A single timer starts at invocation entry. When it fires it cancels a
//! [`CancellationToken`]: the API client races its request against that token,
//! and the exporter polls it between rows. Cancellation is cooperative, so a
//! write already in progress is never interrupted.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Default time budget for one invocation
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// A running deadline
///
/// Must be created inside a tokio runtime. Dropping it stops the timer
/// without cancelling the token.
#[derive(Debug)]
pub struct Deadline {
    duration: Duration,
    expires_at: Instant,
    token: CancellationToken,
    timer: JoinHandle<()>,
}

impl Deadline {
    /// Start a deadline that expires `duration` from now
    pub fn start(duration: Duration) -> Self {
        let expires_at = Instant::now() + duration;
        let token = CancellationToken::new();

        let timer_token = token.clone();
        let timer = tokio::spawn(async move {
            sleep_until(expires_at).await;
            debug!("Deadline of {:?} reached, cancelling", duration);
            timer_token.cancel();
        });

        Self {
            duration,
            expires_at,
            token,
            timer,
        }
    }

    /// Total budget this deadline was started with
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Time left before expiry, zero once expired
    pub fn remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }

    /// Whether the deadline has been observed as expired
    pub fn is_expired(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Token cancelled when the deadline expires
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Resolves once the deadline expires
    pub async fn expired(&self) {
        self.token.cancelled().await;
    }
}

impl Drop for Deadline {
    fn drop(&mut self) {
        self.timer.abort();
    }
}
