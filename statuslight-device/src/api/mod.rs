//! API Module
//!
//! HTTP front end of the device: the status page, the configuration form
//! and their JSON counterparts.

pub mod configure;
pub mod error;
pub mod health;
pub mod status;
pub mod templates;

use axum::{Router, routing::get};
use statuslight_core::PollConfig;
use statuslight_core::domain::config;
use statuslight_core::dto::config::ConfigureParams;
use std::sync::Arc;
use tokio::sync::Notify;
use tower_http::trace::TraceLayer;

use crate::controller::SharedController;

/// State shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub controller: SharedController,
    /// Wakes the scheduler so a configuration change is polled immediately
    pub refresh: Arc<Notify>,
}

impl AppState {
    pub fn new(controller: SharedController, refresh: Arc<Notify>) -> Self {
        Self {
            controller,
            refresh,
        }
    }

    /// Merges submitted parameters into the configuration
    ///
    /// The merge and the replacement happen under one lock, so concurrent
    /// submissions cannot lose each other's fields. A real change wakes the
    /// scheduler for an immediate poll.
    ///
    /// # Returns
    /// The configuration in effect afterwards
    pub async fn update_config(&self, params: &ConfigureParams) -> config::Result<PollConfig> {
        let mut controller = self.controller.lock().await;

        if let Some(config) = params.apply(controller.config())? {
            controller.configure(config);
            self.refresh.notify_one();
        }

        Ok(controller.config().clone())
    }
}

/// Create the router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Pages
        .route("/", get(status::status_page))
        .route("/configure", get(configure::configure_page))
        // JSON endpoints
        .route("/api/status", get(status::status_json))
        .route(
            "/api/config",
            get(configure::get_config).put(configure::update_config),
        )
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::controller::PollController;
    use crate::controller::testing::{Reply, ScriptedSource};
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, Response};
    use tower::ServiceExt;

    pub fn app_state(replies: Vec<Reply>) -> (AppState, Arc<ScriptedSource>) {
        let source = Arc::new(ScriptedSource::new(replies));
        let config = PollConfig::new("h1", "j1", 30).unwrap();
        let controller = PollController::new(config, source.clone()).into_shared();
        (AppState::new(controller, Arc::new(Notify::new())), source)
    }

    pub async fn send(state: &AppState, request: Request<Body>) -> Response<Body> {
        create_router(state.clone()).oneshot(request).await.unwrap()
    }

    pub async fn get(state: &AppState, uri: &str) -> Response<Body> {
        send(state, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn body_text(response: Response<Body>) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }
}
