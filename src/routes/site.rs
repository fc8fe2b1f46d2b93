use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tracing::info;

use super::AppState;
use crate::error::{ApiError, ApiPath};
use crate::flows::{self, EquipmentFailureInput, EquipmentFailurePrediction, FailurePrediction};
use crate::models::{Material, SensorData};
use crate::site::{sdg_metrics, SdgMetric};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/site/assets", get(assets))
        .route("/site/assets/{id}/failure-risk", post(failure_risk))
        .route("/materials", get(materials))
        .route("/sdg", get(sdg))
}

async fn assets(State(state): State<AppState>) -> Json<Vec<SensorData>> {
    Json(state.assets.as_ref().clone())
}

/// `POST /site/assets/{id}/failure-risk` – predictive-maintenance analysis of
/// one asset's history.
async fn failure_risk(
    ApiPath(id): ApiPath<u32>,
    State(state): State<AppState>,
) -> Result<Json<Vec<FailurePrediction>>, ApiError> {
    // ---
    let asset = state
        .assets
        .iter()
        .find(|a| a.id == id)
        .ok_or_else(|| ApiError::NotFound(format!("asset {}", id)))?;

    info!("POST /site/assets/{}/failure-risk ({})", id, asset.name);
    let input = EquipmentFailureInput::for_asset(asset);
    let predictions =
        flows::run_flow::<EquipmentFailurePrediction>(state.llm.as_ref(), &input).await?;
    Ok(Json(predictions))
}

#[derive(Serialize)]
struct MaterialEntry {
    id: Material,
    label: &'static str,
}

async fn materials() -> Json<Vec<MaterialEntry>> {
    Json(
        Material::ALL
            .into_iter()
            .map(|m| MaterialEntry {
                id: m,
                label: m.label(),
            })
            .collect(),
    )
}

/// `GET /sdg` – sustainability scorecard against the live readings.
async fn sdg(State(state): State<AppState>) -> Json<Vec<SdgMetric>> {
    Json(sdg_metrics(&state.twin.sensors()))
}
