// src/routes/health.rs
//! Liveness endpoint for the site twin backend.
//!
//! Used by container orchestrators and CI to verify the service answers HTTP
//! requests. Besides the static status it reports whether the simulation is
//! in offline mode and how many ticks have run, so a stalled loop is visible.

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use super::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: &'static str,
    offline: bool,
    ticks: u64,
}

/// Handle `GET /health`. Never calls the model backend.
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        offline: state.twin.is_offline(),
        ticks: state.twin.snapshot().tick,
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::flows::tests::StubBackend;
    use crate::routes::tests::{send_json, test_state};
    use axum::http::StatusCode;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_health_reports_ok() {
        // ---
        let state = test_state(Arc::new(StubBackend::replying("{}")), 0.0);
        let app = router().with_state(state);

        let (status, json) = send_json(app, "GET", "/health", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["offline"], false);
        assert_eq!(json["ticks"], 0);
    }
}
