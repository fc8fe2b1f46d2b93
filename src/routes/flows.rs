//! Direct access to the model-backed flows. Each handler validates its body,
//! runs the flow and maps any failure to an [`ApiError`]; none of them touch
//! the simulation.

use axum::{extract::State, routing::post, Json, Router};
use chrono::Local;
use serde::Serialize;
use tracing::info;

use super::AppState;
use crate::error::{ApiError, ApiJson};
use crate::flows::{
    run_flow, CommunityBrief, CommunityBriefInput, CommunityBriefOutput,
    EquipmentFailureInput, EquipmentFailurePrediction, FailurePrediction, MaterialReuse,
    MaterialReuseInput, MaterialReuseSuggestion, ThresholdPrediction, ThresholdPredictionInput,
    ThresholdPredictionOutput, WhatIfInput, WhatIfOutput, WhatIfProjection, WhatIfSimulation,
};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/flows/community-brief", post(community_brief))
        .route("/flows/material-reuse", post(material_reuse))
        .route("/flows/threshold-prediction", post(threshold_prediction))
        .route("/flows/threshold-prediction/live", post(threshold_prediction_live))
        .route("/flows/equipment-failure", post(equipment_failure))
        .route("/flows/what-if", post(what_if))
}

async fn community_brief(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CommunityBriefInput>,
) -> Result<Json<CommunityBriefOutput>, ApiError> {
    info!("POST /flows/community-brief");
    Ok(Json(run_flow::<CommunityBrief>(state.llm.as_ref(), &input).await?))
}

async fn material_reuse(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<MaterialReuseInput>,
) -> Result<Json<Vec<MaterialReuseSuggestion>>, ApiError> {
    info!("POST /flows/material-reuse ({} t of {})", input.quantity, input.material);
    Ok(Json(run_flow::<MaterialReuse>(state.llm.as_ref(), &input).await?))
}

async fn threshold_prediction(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<ThresholdPredictionInput>,
) -> Result<Json<ThresholdPredictionOutput>, ApiError> {
    info!("POST /flows/threshold-prediction");
    Ok(Json(run_flow::<ThresholdPrediction>(state.llm.as_ref(), &input).await?))
}

/// Same as `threshold_prediction`, built from the current readings and the
/// server's local clock.
async fn threshold_prediction_live(
    State(state): State<AppState>,
) -> Result<Json<ThresholdPredictionOutput>, ApiError> {
    // ---
    info!("POST /flows/threshold-prediction/live");
    let input = ThresholdPredictionInput::from_sensors(&state.twin.sensors(), &Local::now())
        .ok_or_else(|| ApiError::Internal("live sensor set is incomplete".to_string()))?;
    Ok(Json(run_flow::<ThresholdPrediction>(state.llm.as_ref(), &input).await?))
}

async fn equipment_failure(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<EquipmentFailureInput>,
) -> Result<Json<Vec<FailurePrediction>>, ApiError> {
    info!("POST /flows/equipment-failure ({} sensors)", input.sensor_data.len());
    Ok(Json(
        run_flow::<EquipmentFailurePrediction>(state.llm.as_ref(), &input).await?,
    ))
}

#[derive(Serialize)]
struct WhatIfResponse {
    prediction: WhatIfOutput,
    projection: WhatIfProjection,
}

async fn what_if(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<WhatIfInput>,
) -> Result<Json<WhatIfResponse>, ApiError> {
    // ---
    info!(
        "POST /flows/what-if (delay {} h, energy {}%)",
        input.truck_delay_hours, input.energy_usage_percentage
    );
    let prediction = run_flow::<WhatIfSimulation>(state.llm.as_ref(), &input).await?;
    Ok(Json(WhatIfResponse {
        prediction,
        projection: WhatIfProjection::combine(&input, &prediction),
    }))
}
