//! Configuration API Handlers
//!
//! The configuration form and its JSON counterpart. Submitted values are
//! validated into a complete [`PollConfig`] before the controller sees
//! them; a rejected submission leaves the configuration untouched.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::Html,
};
use statuslight_core::PollConfig;
use statuslight_core::dto::config::ConfigureParams;
use tracing::debug;

use crate::api::AppState;
use crate::api::error::ApiResult;
use crate::api::templates::{self, CONFIG_ERROR, CONFIG_FORM, LINK_MAIN_PAGE};

/// GET /configure
/// Configuration form; query parameters update the configuration
pub async fn configure_page(
    State(state): State<AppState>,
    Query(params): Query<ConfigureParams>,
) -> (StatusCode, Html<String>) {
    let (status, error, shown) = match state.update_config(&params).await {
        Ok(config) => (StatusCode::OK, None, config),
        Err(e) => {
            debug!("Rejected configuration: {}", e);
            let current = state.controller.lock().await.config().clone();
            (StatusCode::BAD_REQUEST, Some(e.to_string()), current)
        }
    };

    let error = error
        .map(|message| CONFIG_ERROR.render(&[("error", message.as_str())]))
        .unwrap_or_default();
    let interval = shown.interval_secs().to_string();
    let form = CONFIG_FORM.render(&[
        ("host", shown.host()),
        ("jobname", shown.job_name()),
        ("updateinterval", interval.as_str()),
    ]);

    (
        status,
        Html(templates::page(&[error.as_str(), form.as_str(), LINK_MAIN_PAGE])),
    )
}

/// GET /api/config
/// Current configuration
pub async fn get_config(State(state): State<AppState>) -> Json<PollConfig> {
    Json(state.controller.lock().await.config().clone())
}

/// PUT /api/config
/// Update the configuration; absent fields keep their value
pub async fn update_config(
    State(state): State<AppState>,
    Json(params): Json<ConfigureParams>,
) -> ApiResult<Json<PollConfig>> {
    let config = state.update_config(&params).await?;
    Ok(Json(config))
}
