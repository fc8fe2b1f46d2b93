use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Local;
use serde::Deserialize;
use tracing::info;

use super::AppState;
use crate::error::{ApiError, ApiJson, ApiPath};
use crate::flows::{self, brief_file_name, CommunityBrief, CommunityBriefInput};
use crate::models::{Alert, NewAlert};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/alerts", get(list).post(create).delete(clear))
        .route("/alerts/{id}/community-brief", get(community_brief))
}

async fn list(State(state): State<AppState>) -> Json<Vec<Alert>> {
    Json(state.twin.alerts())
}

#[derive(Debug, Deserialize)]
struct CreateAlert {
    #[serde(flatten)]
    alert: NewAlert,
    /// Surface the alert prominently as well as logging it.
    #[serde(default)]
    notify: bool,
}

/// `POST /alerts` – record an alert raised outside the simulation.
async fn create(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateAlert>,
) -> (StatusCode, Json<Alert>) {
    (
        StatusCode::CREATED,
        Json(state.twin.add_alert(body.alert, body.notify)),
    )
}

async fn clear(State(state): State<AppState>) -> StatusCode {
    state.twin.clear_alerts();
    StatusCode::NO_CONTENT
}

/// `GET /alerts/{id}/community-brief` – generate a resident notice for the
/// alert and return it as a plain text download.
async fn community_brief(
    ApiPath(id): ApiPath<String>,
    State(state): State<AppState>,
) -> Result<Response, ApiError> {
    // ---
    let alert = state
        .twin
        .alert(&id)
        .ok_or_else(|| ApiError::NotFound(format!("alert {}", id)))?;

    info!("GET /alerts/{}/community-brief", id);
    let input = CommunityBriefInput::for_alert(&alert, &state.config.site_name, &Local);
    let brief = flows::run_flow::<CommunityBrief>(state.llm.as_ref(), &input).await?;

    let disposition = format!("attachment; filename=\"{}\"", brief_file_name(&alert.id));
    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        brief.community_brief,
    )
        .into_response())
}
