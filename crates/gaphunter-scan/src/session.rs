//! Per-submission polling session state.

use crate::backoff::BackoffSchedule;
use chrono::{DateTime, Utc};
use gaphunter_core::config::PollingConfig;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// State owned by one submit → resolve polling session.
///
/// The generation number ties the session to the poller's current-session
/// counter; a session whose generation no longer matches is stale and must
/// not deliver anything to the caller.
#[derive(Debug)]
pub(crate) struct PollSession {
    /// Correlation id for log lines
    pub id: Uuid,
    /// Generation captured at session start
    pub generation: u64,
    /// Cancellation token shared with the transport layer
    pub token: CancellationToken,
    /// Wall-clock submission time
    pub started_at: DateTime<Utc>,
    /// Poll interval schedule
    pub backoff: BackoffSchedule,
    started: Instant,
}

impl PollSession {
    pub fn new(generation: u64, token: CancellationToken, config: &PollingConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            generation,
            token,
            started_at: Utc::now(),
            backoff: BackoffSchedule::from_config(config),
            started: Instant::now(),
        }
    }

    /// Time elapsed since the session was created.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}
