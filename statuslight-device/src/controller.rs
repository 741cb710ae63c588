//! Poll controller
//!
//! Owns the poll configuration and the last known job status, and decides
//! on every scheduler tick whether a new poll cycle is due.
//!
//! The controller is never entered re-entrantly: every mutating operation
//! takes `&mut self`, so at most one poll cycle can be in flight and a
//! configuration change can never interleave with one. The device shares a
//! single controller between the scheduler and the front end through
//! [`SharedController`].

use serde::Serialize;
use statuslight_client::StatusSource;
use statuslight_core::{JobStatus, PollConfig, parse_status};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Controller shared between the scheduler task and the HTTP handlers
pub type SharedController = Arc<Mutex<PollController>>;

/// Where the controller is in its poll cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PollPhase {
    /// No poll needed yet
    Idle,
    /// Request in flight
    Polling,
    /// A result was just applied
    Updated,
}

/// Outcome of the most recent poll attempts
#[derive(Debug, Clone, Default)]
pub struct PollState {
    last_status: JobStatus,
    last_poll_at: Option<Instant>,
    last_failure: Option<String>,
    poll_count: u64,
    failure_count: u64,
}

impl PollState {
    pub fn last_status(&self) -> JobStatus {
        self.last_status
    }

    /// Display text, always consistent with [`PollState::last_status`]
    pub fn last_status_text(&self) -> &'static str {
        self.last_status.as_text()
    }

    /// When the last poll was attempted, successful or not
    pub fn last_poll_at(&self) -> Option<Instant> {
        self.last_poll_at
    }

    /// Why the last attempt failed, if it did
    pub fn last_failure(&self) -> Option<&str> {
        self.last_failure.as_deref()
    }

    pub fn poll_count(&self) -> u64 {
        self.poll_count
    }

    pub fn failure_count(&self) -> u64 {
        self.failure_count
    }
}

/// Drives poll cycles against a [`StatusSource`]
pub struct PollController {
    config: PollConfig,
    request_path: String,
    state: PollState,
    phase: PollPhase,
    /// Set by `configure`, forces the next tick to poll
    refresh_pending: bool,
    source: Arc<dyn StatusSource>,
}

impl PollController {
    /// Creates a controller that has never polled
    ///
    /// The first call to [`PollController::maybe_poll`] always polls.
    pub fn new(config: PollConfig, source: Arc<dyn StatusSource>) -> Self {
        let request_path = config.request_path();
        Self {
            config,
            request_path,
            state: PollState::default(),
            phase: PollPhase::Idle,
            refresh_pending: false,
            source,
        }
    }

    /// Wraps the controller for sharing across tasks
    pub fn into_shared(self) -> SharedController {
        Arc::new(Mutex::new(self))
    }

    /// Replaces the whole configuration and forces a refresh on the next tick
    pub fn configure(&mut self, config: PollConfig) {
        info!(
            "Configuration updated: host={}, job={}, interval={}s",
            config.host(),
            config.job_name(),
            config.interval_secs()
        );

        self.request_path = config.request_path();
        self.config = config;
        self.refresh_pending = true;
    }

    /// Whether a poll cycle is due at `now`
    pub fn is_due(&self, now: Instant) -> bool {
        if self.refresh_pending {
            return true;
        }

        match self.state.last_poll_at {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.config.interval(),
        }
    }

    /// Scheduler tick entry point
    ///
    /// Runs one poll cycle to completion if one is due. The cycle is bounded
    /// by the transport's connect and response timeouts.
    ///
    /// # Returns
    /// `true` if a poll cycle was performed
    pub async fn maybe_poll(&mut self, now: Instant) -> bool {
        if !self.is_due(now) {
            if self.phase == PollPhase::Updated {
                self.phase = PollPhase::Idle;
            }
            return false;
        }

        self.poll_once(now).await;
        true
    }

    /// Performs one poll cycle and applies its outcome
    async fn poll_once(&mut self, now: Instant) {
        self.phase = PollPhase::Polling;
        self.refresh_pending = false;
        self.state.poll_count += 1;

        debug!("Polling {}{}", self.config.host(), self.request_path());

        match self.source.fetch_status_body(&self.config).await {
            Ok(body) => {
                let status = parse_status(&body);
                info!("Job {} status: {}", self.config.job_name(), status);

                self.state.last_status = status;
                self.state.last_failure = None;
                self.phase = PollPhase::Updated;
            }
            Err(e) => {
                // Stale but valid status is kept over flapping to unknown
                warn!("Poll of {} failed: {}", self.config.host(), e);

                self.state.last_failure = Some(e.to_string());
                self.state.failure_count += 1;
                self.phase = PollPhase::Idle;
            }
        }

        // Also on failure, so an unreachable host is retried once per interval
        self.state.last_poll_at = Some(now);
    }

    /// Current status and its display text; never polls
    pub fn current_status(&self) -> (JobStatus, &'static str) {
        (self.state.last_status(), self.state.last_status_text())
    }

    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    pub fn state(&self) -> &PollState {
        &self.state
    }

    pub fn phase(&self) -> PollPhase {
        self.phase
    }

    /// Path requested from the job server for the current configuration
    pub fn request_path(&self) -> &str {
        &self.request_path
    }

    /// Time since the last attempt, if any
    pub fn since_last_poll(&self, now: Instant) -> Option<Duration> {
        self.state
            .last_poll_at()
            .map(|last| now.saturating_duration_since(last))
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{Reply, ScriptedSource};
    use super::*;

    fn controller(replies: Vec<Reply>) -> (PollController, Arc<ScriptedSource>) {
        let source = Arc::new(ScriptedSource::new(replies));
        let config = PollConfig::new("h1", "j1", 30).unwrap();
        (PollController::new(config, source.clone()), source)
    }

    #[tokio::test]
    async fn test_initial_state() {
        let (controller, source) = controller(vec![]);
        assert_eq!(controller.current_status(), (JobStatus::Unknown, "UNKNOWN"));
        assert_eq!(controller.phase(), PollPhase::Idle);
        assert!(controller.state().last_poll_at().is_none());
        assert_eq!(
            controller.request_path(),
            "/job/j1/lastBuild/api/json?tree=result"
        );
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_first_tick_always_polls() {
        let (mut controller, source) = controller(vec![Reply::Body(r#"{"result":"SUCCESS"}"#)]);
        let now = Instant::now();

        assert!(controller.maybe_poll(now).await);
        assert_eq!(source.calls(), 1);
        assert_eq!(controller.current_status(), (JobStatus::Success, "SUCCESS"));
        assert_eq!(controller.state().last_poll_at(), Some(now));
        assert_eq!(controller.phase(), PollPhase::Updated);
    }

    #[tokio::test]
    async fn test_known_results_update_text() {
        let cases = [
            (r#"{"result":"SUCCESS"}"#, JobStatus::Success, "SUCCESS"),
            (r#"{"result":"UNSTABLE"}"#, JobStatus::Unstable, "UNSTABLE"),
            (r#"{"result":"FAILURE"}"#, JobStatus::Failed, "FAILURE"),
        ];

        for (body, status, text) in cases {
            let (mut controller, _) = controller(vec![Reply::Body(body)]);
            controller.maybe_poll(Instant::now()).await;
            assert_eq!(controller.current_status(), (status, text));
            assert_eq!(controller.state().last_status_text(), text);
        }
    }

    #[tokio::test]
    async fn test_missing_result_is_unknown() {
        let (mut controller, _) = controller(vec![
            Reply::Body(r#"{"result":"SUCCESS"}"#),
            Reply::Body(r#"{"building":true}"#),
        ]);
        let start = Instant::now();

        controller.maybe_poll(start).await;
        controller.maybe_poll(start + Duration::from_secs(30)).await;

        assert_eq!(controller.current_status(), (JobStatus::Unknown, "UNKNOWN"));
        assert!(controller.state().last_failure().is_none());
    }

    #[tokio::test]
    async fn test_no_poll_before_interval_elapses() {
        let (mut controller, source) = controller(vec![Reply::Body(r#"{"result":"FAILURE"}"#)]);
        let start = Instant::now();
        controller.maybe_poll(start).await;

        assert!(!controller.maybe_poll(start + Duration::from_secs(29)).await);
        assert_eq!(source.calls(), 1);
        assert_eq!(controller.current_status(), (JobStatus::Failed, "FAILURE"));
        assert_eq!(controller.state().last_poll_at(), Some(start));
        assert_eq!(controller.phase(), PollPhase::Idle);
    }

    #[tokio::test]
    async fn test_polls_once_interval_elapses() {
        let (mut controller, source) = controller(vec![
            Reply::Body(r#"{"result":"FAILURE"}"#),
            Reply::Body(r#"{"result":"SUCCESS"}"#),
        ]);
        let start = Instant::now();
        controller.maybe_poll(start).await;

        assert!(controller.maybe_poll(start + Duration::from_secs(30)).await);
        assert_eq!(source.calls(), 2);
        assert_eq!(controller.current_status().0, JobStatus::Success);
    }

    #[tokio::test]
    async fn test_connection_failure_keeps_status_and_advances_timestamp() {
        let (mut controller, source) = controller(vec![
            Reply::Body(r#"{"result":"UNSTABLE"}"#),
            Reply::Refused,
        ]);
        let start = Instant::now();
        controller.maybe_poll(start).await;

        let retry = start + Duration::from_secs(31);
        assert!(controller.maybe_poll(retry).await);

        assert_eq!(controller.current_status(), (JobStatus::Unstable, "UNSTABLE"));
        assert_eq!(controller.state().last_poll_at(), Some(retry));
        assert_eq!(controller.state().failure_count(), 1);
        assert!(
            controller
                .state()
                .last_failure()
                .unwrap()
                .contains("connection refused")
        );

        // Not retried again until a full interval has passed
        assert!(!controller.maybe_poll(retry + Duration::from_secs(1)).await);
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_timeout_is_treated_like_connection_failure() {
        let (mut controller, _) = controller(vec![Reply::Timeout]);
        let now = Instant::now();

        assert!(controller.maybe_poll(now).await);
        assert_eq!(controller.current_status(), (JobStatus::Unknown, "UNKNOWN"));
        assert_eq!(controller.state().last_poll_at(), Some(now));
        assert_eq!(controller.phase(), PollPhase::Idle);
    }

    #[tokio::test]
    async fn test_transport_failure_keeps_status_and_advances_timestamp() {
        let (mut controller, _) = controller(vec![
            Reply::Body(r#"{"result":"FAILURE"}"#),
            Reply::Broken,
        ]);
        let start = Instant::now();
        controller.maybe_poll(start).await;

        let retry = start + Duration::from_secs(30);
        assert!(controller.maybe_poll(retry).await);

        assert_eq!(controller.current_status(), (JobStatus::Failed, "FAILURE"));
        assert_eq!(controller.state().last_poll_at(), Some(retry));
        assert_eq!(controller.state().failure_count(), 1);
        assert!(
            controller
                .state()
                .last_failure()
                .unwrap()
                .starts_with("HTTP request failed")
        );
        assert_eq!(controller.phase(), PollPhase::Idle);
    }

    #[tokio::test]
    async fn test_success_clears_last_failure() {
        let (mut controller, _) = controller(vec![
            Reply::Refused,
            Reply::Body(r#"{"result":"SUCCESS"}"#),
        ]);
        let start = Instant::now();
        controller.maybe_poll(start).await;
        assert!(controller.state().last_failure().is_some());

        controller.maybe_poll(start + Duration::from_secs(30)).await;
        assert!(controller.state().last_failure().is_none());
        assert_eq!(controller.state().poll_count(), 2);
    }

    #[tokio::test]
    async fn test_configure_forces_refresh() {
        let (mut controller, source) = controller(vec![
            Reply::Body(r#"{"result":"SUCCESS"}"#),
            Reply::Body(r#"{"result":"FAILURE"}"#),
        ]);
        let t = Instant::now() + Duration::from_secs(100);
        controller.maybe_poll(t - Duration::from_secs(1)).await;

        controller.configure(PollConfig::new("h2", "j2", 60).unwrap());
        assert!(controller.maybe_poll(t).await);

        assert_eq!(source.calls(), 2);
        let requested = source.requests();
        assert_eq!(requested[1].host(), "h2");
        assert_eq!(requested[1].job_name(), "j2");
        assert_eq!(controller.current_status().0, JobStatus::Failed);
        assert_eq!(
            controller.request_path(),
            "/job/j2/lastBuild/api/json?tree=result"
        );

        // The forced refresh is consumed; the new interval applies again
        assert!(!controller.maybe_poll(t + Duration::from_secs(59)).await);
        assert!(controller.maybe_poll(t + Duration::from_secs(60)).await);
    }

    #[tokio::test]
    async fn test_forced_refresh_consumed_on_failure() {
        let (mut controller, source) = controller(vec![Reply::Refused]);
        let now = Instant::now();

        controller.configure(PollConfig::new("h2", "j2", 60).unwrap());
        controller.maybe_poll(now).await;
        assert!(!controller.maybe_poll(now + Duration::from_secs(1)).await);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_current_status_never_polls() {
        let (controller, source) = controller(vec![Reply::Body(r#"{"result":"SUCCESS"}"#)]);
        let _ = controller.current_status();
        let _ = controller.current_status();
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_since_last_poll() {
        let (mut controller, _) = controller(vec![Reply::Body(r#"{"result":"SUCCESS"}"#)]);
        let start = Instant::now();
        assert_eq!(controller.since_last_poll(start), None);

        controller.maybe_poll(start).await;
        assert_eq!(
            controller.since_last_poll(start + Duration::from_secs(7)),
            Some(Duration::from_secs(7))
        );
    }
}
