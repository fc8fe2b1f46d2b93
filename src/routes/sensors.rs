use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::AppState;
use crate::error::{ApiJson, ApiPath};
use crate::models::SensorId;
use crate::twin::{ChartPoint, SensorSnapshot};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/sensors", get(current))
        .route("/sensors/{id}/history", get(history))
        .route("/offline", get(offline_status).put(set_offline))
}

/// `GET /sensors` – latest published snapshot.
async fn current(State(state): State<AppState>) -> Json<SensorSnapshot> {
    Json(state.twin.snapshot())
}

/// `GET /sensors/{id}/history` – rolling chart series, oldest first.
async fn history(
    ApiPath(id): ApiPath<SensorId>,
    State(state): State<AppState>,
) -> Json<Vec<ChartPoint>> {
    Json(state.twin.history(id))
}

#[derive(Debug, Serialize, Deserialize)]
struct OfflineStatus {
    offline: bool,
}

async fn offline_status(State(state): State<AppState>) -> Json<OfflineStatus> {
    Json(OfflineStatus {
        offline: state.twin.is_offline(),
    })
}

/// `PUT /offline` – suspend or resume the simulation from the next tick on.
async fn set_offline(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<OfflineStatus>,
) -> Json<OfflineStatus> {
    // ---
    let previous = state.twin.set_offline(body.offline);
    info!("PUT /offline {} -> {}", previous, body.offline);
    Json(OfflineStatus {
        offline: body.offline,
    })
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::flows::tests::StubBackend;
    use crate::routes::tests::{send_json, test_state};
    use axum::http::StatusCode;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_snapshot_lists_four_sensors() {
        // ---
        let state = test_state(Arc::new(StubBackend::replying("{}")), 0.0);
        let app = router().with_state(state);

        let (status, json) = send_json(app, "GET", "/sensors", None).await;

        assert_eq!(status, StatusCode::OK);
        let ids: Vec<_> = json["sensors"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["id"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(ids, ["energy", "water", "noise", "air"]);
    }

    #[tokio::test]
    async fn test_history_grows_with_ticks() {
        // ---
        let state = test_state(Arc::new(StubBackend::replying("{}")), 0.0);
        state.twin.tick();
        state.twin.tick();
        let app = router().with_state(state);

        let (status, json) = send_json(app.clone(), "GET", "/sensors/noise/history", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json.as_array().unwrap().len(), 2);

        let (status, json) = send_json(app, "GET", "/sensors/dust/history", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "ValidationError");
    }

    #[tokio::test]
    async fn test_toggle_offline() {
        // ---
        let state = test_state(Arc::new(StubBackend::replying("{}")), 0.0);
        let twin = state.twin.clone();
        let app = router().with_state(state);

        let (status, json) =
            send_json(app.clone(), "PUT", "/offline", Some(json!({ "offline": true }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["offline"], true);
        assert!(twin.is_offline());
        assert!(twin.tick().is_none());

        let (_, json) = send_json(app.clone(), "GET", "/offline", None).await;
        assert_eq!(json["offline"], true);

        let (status, json) =
            send_json(app, "PUT", "/offline", Some(json!({ "offline": "yes" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "ValidationError");
        assert!(twin.is_offline());
    }
}
