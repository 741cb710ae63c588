//! Status API Handlers
//!
//! The status page and its JSON form. Neither ever triggers a poll.

use axum::{Json, extract::State, response::Html};
use serde::Serialize;
use statuslight_core::JobStatus;
use std::time::Instant;

use crate::api::AppState;
use crate::api::templates::{self, LAST_FAILURE, LINK_CONFIGURE, STATUS};
use crate::controller::PollPhase;

/// Snapshot of the controller for machine consumers
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    pub status: JobStatus,
    pub text: &'static str,
    pub host: String,
    pub job_name: String,
    pub interval_secs: u64,
    pub phase: PollPhase,
    pub seconds_since_last_poll: Option<u64>,
    pub last_failure: Option<String>,
    pub poll_count: u64,
    pub failure_count: u64,
}

/// GET /
/// Status page
pub async fn status_page(State(state): State<AppState>) -> Html<String> {
    let controller = state.controller.lock().await;
    let config = controller.config();
    let (status, text) = controller.current_status();

    let summary = STATUS.render(&[
        ("host", config.host()),
        ("job", config.job_name()),
        ("color", status.color()),
        ("status", text),
    ]);
    let failure = controller
        .state()
        .last_failure()
        .map(|reason| LAST_FAILURE.render(&[("reason", reason)]))
        .unwrap_or_default();

    Html(templates::page(&[summary.as_str(), failure.as_str(), LINK_CONFIGURE]))
}

/// GET /api/status
/// Status snapshot as JSON
pub async fn status_json(State(state): State<AppState>) -> Json<StatusSnapshot> {
    let controller = state.controller.lock().await;
    let config = controller.config();
    let (status, text) = controller.current_status();

    Json(StatusSnapshot {
        status,
        text,
        host: config.host().to_string(),
        job_name: config.job_name().to_string(),
        interval_secs: config.interval_secs(),
        phase: controller.phase(),
        seconds_since_last_poll: controller
            .since_last_poll(Instant::now())
            .map(|elapsed| elapsed.as_secs()),
        last_failure: controller.state().last_failure().map(str::to_string),
        poll_count: controller.state().poll_count(),
        failure_count: controller.state().failure_count(),
    })
}
