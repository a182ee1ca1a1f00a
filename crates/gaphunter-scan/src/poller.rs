//! Scan job poller: submit → poll → resolve lifecycle.
//!
//! The poller drives one scan job at a time per poller instance. Submitting
//! while a session is active supersedes it: the old session's token fires,
//! its in-flight request aborts, and its late responses are recognized as
//! stale by generation number and dropped. The consumer therefore only ever
//! observes the most recently submitted session.

use crate::error::{Result, ScanError};
use crate::session::PollSession;
use chrono::{DateTime, Utc};
use gaphunter_api::{ApiClient, ApiError};
use gaphunter_core::config::PollingConfig;
use gaphunter_core::types::{ScanId, ScanRequest, ScanSnapshot, ScanStatus};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio_util::sync::CancellationToken;

/// Progress notification delivered while a scan is queued or running.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanProgress {
    /// Scan job identifier
    pub scan_id: ScanId,
    /// Label of the pipeline stage currently executing, if reported
    pub stage: Option<String>,
    /// Milliseconds elapsed since submission
    pub elapsed_ms: u64,
}

/// Final payload of a successfully completed scan.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanOutcome {
    /// Scan job identifier
    pub scan_id: ScanId,
    /// Result payload as returned by the engine
    pub report: serde_json::Value,
    /// When the completion was observed
    pub completed_at: DateTime<Utc>,
}

/// How a polling session ended, when it did not end in an error.
///
/// `Cancelled` and `Superseded` are deliberate, silent terminations:
/// no progress or error callback accompanies them.
#[derive(Debug)]
pub enum ScanResolution {
    /// The scan finished and produced a result
    Completed(ScanOutcome),
    /// The caller cancelled the session
    Cancelled,
    /// A newer submission replaced the session
    Superseded,
}

/// Submission response of `POST /scans`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartScanResponse {
    scan_id: String,
}

/// Current-session slot: the generation counter and cancellation token
/// shared by all sessions of one poller.
#[derive(Default)]
struct CurrentSlot {
    generation: u64,
    token: Option<CancellationToken>,
    scan_id: Option<ScanId>,
}

/// Drives the submit → poll → resolve lifecycle of scan jobs.
///
/// At most one session per poller delivers results to the caller; older
/// sessions are superseded on submit and resolve silently.
pub struct ScanPoller {
    api: Arc<ApiClient>,
    config: PollingConfig,
    current: Mutex<CurrentSlot>,
}

impl ScanPoller {
    /// Create a poller over the given transport with polling settings.
    #[must_use]
    pub fn new(api: Arc<ApiClient>, config: PollingConfig) -> Self {
        Self {
            api,
            config,
            current: Mutex::new(CurrentSlot::default()),
        }
    }

    /// Submit a scan and poll it to resolution.
    ///
    /// Any already-active session is cancelled and superseded first.
    /// `on_progress` is invoked once per poll that observes the job queued
    /// or running, in poll order; it is never invoked after the session is
    /// cancelled or superseded.
    ///
    /// # Errors
    /// Returns a terminal [`ScanError`] for transport failures surviving
    /// retry, engine-reported job failures, protocol violations, and the
    /// global poll ceiling. Cancellation and supersession are not errors.
    pub async fn submit<F>(&self, request: ScanRequest, mut on_progress: F) -> Result<ScanResolution>
    where
        F: FnMut(ScanProgress),
    {
        request
            .validate()
            .map_err(|e| ScanError::InvalidRequest(e.to_string()))?;

        let (generation, token) = self.begin_session();
        let mut session = PollSession::new(generation, token, &self.config);
        tracing::info!(
            "Submitting scan for tags {:?} (session {}, generation {})",
            request.tags,
            session.id,
            generation
        );

        let started: StartScanResponse = match self
            .api
            .post_json("/scans", &request, Some(session.token.clone()))
            .await
        {
            Ok(response) => response,
            Err(ApiError::Aborted) => return Ok(self.resolve_aborted(generation)),
            Err(err) => {
                if self.is_superseded(generation) {
                    return Ok(ScanResolution::Superseded);
                }
                self.finish_session(generation);
                tracing::error!("Scan submission failed: {}", err);
                return Err(err.into());
            }
        };

        let scan_id = match ScanId::new(started.scan_id) {
            Ok(id) => id,
            Err(err) => {
                self.finish_session(generation);
                return Err(ScanError::Protocol(err.to_string()));
            }
        };

        {
            let mut slot = self.slot();
            if slot.generation == generation {
                slot.scan_id = Some(scan_id.clone());
            }
        }
        tracing::debug!("Scan {} accepted (session {})", scan_id, session.id);

        self.poll_until_terminal(&mut session, &scan_id, &mut on_progress)
            .await
    }

    /// Cancel the active session, if any.
    ///
    /// Fires the session's cancellation token, which interrupts a pending
    /// backoff sleep or aborts an in-flight request within one scheduling
    /// tick. Cancellation is silent: the session resolves as
    /// [`ScanResolution::Cancelled`] and no error callback fires. When the
    /// job handle is already known, a best-effort server-side cancel is
    /// issued in the background; the client does not depend on it.
    pub fn cancel(&self) {
        let (token, scan_id) = {
            let mut slot = self.slot();
            (slot.token.take(), slot.scan_id.take())
        };

        let Some(token) = token else {
            tracing::debug!("Cancel requested with no active scan session");
            return;
        };
        token.cancel();
        tracing::info!("Cancelled active scan session");

        if let Some(scan_id) = scan_id {
            let api = Arc::clone(&self.api);
            tokio::spawn(async move {
                if let Err(err) = api.delete(&format!("/scans/{scan_id}"), None).await {
                    tracing::debug!("Server-side cancel for scan {} failed: {}", scan_id, err);
                }
            });
        }
    }

    /// Sleep-poll loop until a terminal state, cancellation, supersession,
    /// or the poll ceiling.
    async fn poll_until_terminal<F>(
        &self,
        session: &mut PollSession,
        scan_id: &ScanId,
        on_progress: &mut F,
    ) -> Result<ScanResolution>
    where
        F: FnMut(ScanProgress),
    {
        let ceiling = self.config.ceiling();
        let status_path = format!("/scans/{scan_id}");

        loop {
            let remaining = ceiling.saturating_sub(session.elapsed());
            let interval = session.backoff.advance().min(remaining);

            tokio::select! {
                () = session.token.cancelled() => {
                    return Ok(self.resolve_aborted(session.generation));
                }
                () = tokio::time::sleep(interval) => {}
            }

            if session.elapsed() >= ceiling {
                if self.is_superseded(session.generation) {
                    return Ok(ScanResolution::Superseded);
                }
                self.finish_session(session.generation);
                tracing::warn!(
                    "Scan {} exceeded the poll ceiling of {:?} (submitted at {})",
                    scan_id,
                    ceiling,
                    session.started_at
                );
                return Err(ScanError::PollTimeout { ceiling });
            }

            let snapshot: ScanSnapshot = match self
                .api
                .get_json(&status_path, Some(session.token.clone()))
                .await
            {
                Ok(snapshot) => snapshot,
                Err(ApiError::Aborted) => return Ok(self.resolve_aborted(session.generation)),
                Err(err) => {
                    if self.is_superseded(session.generation) {
                        return Ok(ScanResolution::Superseded);
                    }
                    self.finish_session(session.generation);
                    tracing::error!("Status poll for scan {} failed: {}", scan_id, err);
                    return Err(err.into());
                }
            };

            // Stale sessions must not deliver anything, even a completion
            // that already arrived.
            if self.is_superseded(session.generation) {
                tracing::debug!("Dropping poll response for superseded session {}", session.id);
                return Ok(ScanResolution::Superseded);
            }
            if session.token.is_cancelled() {
                return Ok(self.resolve_aborted(session.generation));
            }

            match snapshot.status {
                ScanStatus::Queued | ScanStatus::Running => {
                    let progress = ScanProgress {
                        scan_id: scan_id.clone(),
                        stage: snapshot.stage,
                        elapsed_ms: elapsed_millis(session),
                    };
                    tracing::debug!(
                        "Scan {} is {} (stage {:?}, {}ms elapsed)",
                        scan_id,
                        snapshot.status,
                        progress.stage,
                        progress.elapsed_ms
                    );
                    on_progress(progress);
                }
                ScanStatus::Success => {
                    let report = match snapshot.result {
                        Some(value) if !value.is_null() => value,
                        _ => {
                            self.finish_session(session.generation);
                            tracing::error!(
                                "Scan {} reported success with an empty result",
                                scan_id
                            );
                            return Err(ScanError::EmptyResult {
                                scan_id: scan_id.clone(),
                            });
                        }
                    };

                    self.finish_session(session.generation);
                    tracing::info!(
                        "Scan {} completed after {}ms (session {})",
                        scan_id,
                        elapsed_millis(session),
                        session.id
                    );
                    return Ok(ScanResolution::Completed(ScanOutcome {
                        scan_id: scan_id.clone(),
                        report,
                        completed_at: Utc::now(),
                    }));
                }
                ScanStatus::Failed => {
                    let message = snapshot.error_message.unwrap_or_else(|| {
                        "the engine reported a failure without a message".to_string()
                    });
                    self.finish_session(session.generation);
                    tracing::error!("Scan {} failed: {}", scan_id, message);
                    return Err(ScanError::ScanFailed {
                        scan_id: scan_id.clone(),
                        message,
                    });
                }
            }
        }
    }

    /// Start a new session: cancel and supersede any active one.
    fn begin_session(&self) -> (u64, CancellationToken) {
        let mut slot = self.slot();
        if let Some(previous) = slot.token.take() {
            tracing::debug!(
                "Superseding active scan session (generation {})",
                slot.generation
            );
            previous.cancel();
        }
        slot.generation += 1;
        slot.scan_id = None;
        let token = CancellationToken::new();
        slot.token = Some(token.clone());
        (slot.generation, token)
    }

    /// Resolve an aborted session as cancelled or superseded.
    fn resolve_aborted(&self, generation: u64) -> ScanResolution {
        if self.is_superseded(generation) {
            ScanResolution::Superseded
        } else {
            self.finish_session(generation);
            ScanResolution::Cancelled
        }
    }

    /// Whether a newer submission has replaced this generation.
    fn is_superseded(&self, generation: u64) -> bool {
        self.slot().generation != generation
    }

    /// Clear the slot when the session owning it reaches a terminal state.
    fn finish_session(&self, generation: u64) {
        let mut slot = self.slot();
        if slot.generation == generation {
            slot.token = None;
            slot.scan_id = None;
        }
    }

    fn slot(&self) -> MutexGuard<'_, CurrentSlot> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[allow(clippy::cast_possible_truncation)]
fn elapsed_millis(session: &PollSession) -> u64 {
    session.elapsed().as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use gaphunter_core::config::ApiConfig;

    fn test_poller() -> ScanPoller {
        let api = ApiClient::new(ApiConfig::default()).expect("create client");
        ScanPoller::new(Arc::new(api), PollingConfig::default())
    }

    #[test]
    fn test_begin_session_increments_generation() {
        let poller = test_poller();
        let (first, _token) = poller.begin_session();
        let (second, _token) = poller.begin_session();
        assert_eq!(second, first + 1);
    }

    #[test]
    fn test_begin_session_cancels_previous_token() {
        let poller = test_poller();
        let (_, first_token) = poller.begin_session();
        assert!(!first_token.is_cancelled());

        let (_, second_token) = poller.begin_session();
        assert!(first_token.is_cancelled());
        assert!(!second_token.is_cancelled());
    }

    #[test]
    fn test_staleness_by_generation() {
        let poller = test_poller();
        let (first, _token) = poller.begin_session();
        assert!(!poller.is_superseded(first));

        let (second, _token) = poller.begin_session();
        assert!(poller.is_superseded(first));
        assert!(!poller.is_superseded(second));
    }

    #[test]
    fn test_cancel_without_session_is_noop() {
        let poller = test_poller();
        poller.cancel();
        assert_eq!(poller.slot().generation, 0);
        assert!(poller.slot().token.is_none());
    }

    #[test]
    fn test_cancel_fires_token_and_keeps_generation() {
        let poller = test_poller();
        let (generation, token) = poller.begin_session();

        poller.cancel();
        assert!(token.is_cancelled());
        // Cancellation is not supersession: the generation stands
        assert!(!poller.is_superseded(generation));
        assert!(matches!(
            poller.resolve_aborted(generation),
            ScanResolution::Cancelled
        ));
    }

    #[test]
    fn test_finish_session_ignores_stale_generation() {
        let poller = test_poller();
        let (first, _token) = poller.begin_session();
        let (second, _token) = poller.begin_session();

        poller.finish_session(first);
        assert!(poller.slot().token.is_some(), "newer session must survive");

        poller.finish_session(second);
        assert!(poller.slot().token.is_none());
    }
}
