//! Schema-checked request/response calls to an external text-generation model.
//!
//! Every flow follows the same path: validate the typed input, render a
//! prompt, ask the backend for JSON, parse it into the typed output and
//! validate that too. Any failure along the way surfaces as a [`FlowError`];
//! a caller never sees a partially populated result.
//!
//! Flows hold no shared state, so concurrent calls are independent of each
//! other and of the simulation loop.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

mod backend;
mod community_brief;
mod equipment_failure;
mod material_reuse;
mod threshold_prediction;
mod what_if;

pub use backend::HttpLlmBackend;
pub use community_brief::{
    brief_file_name, CommunityBrief, CommunityBriefInput, CommunityBriefOutput,
};
pub use equipment_failure::{
    AssetSeries, EquipmentFailureInput, EquipmentFailurePrediction, FailurePrediction,
    SeriesPoint,
};
pub use material_reuse::{MaterialReuse, MaterialReuseInput, MaterialReuseSuggestion};
pub use threshold_prediction::{
    ThresholdPrediction, ThresholdPredictionInput, ThresholdPredictionOutput,
};
pub use what_if::{WhatIfInput, WhatIfOutput, WhatIfProjection, WhatIfSimulation};

// ---

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("invalid input: {0}")]
    InvalidInput(Violation),

    #[error("model backend unreachable: {0}")]
    Transport(String),

    #[error("model backend returned HTTP {status}: {body}")]
    Service { status: u16, body: String },

    #[error("model output is not valid JSON for this flow: {0}")]
    MalformedOutput(String),

    #[error("model output failed validation: {0}")]
    InvalidOutput(Violation),
}

impl From<reqwest::Error> for FlowError {
    fn from(error: reqwest::Error) -> Self {
        FlowError::Transport(error.to_string())
    }
}

/// A field that broke a flow's schema.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{field}: {reason}")]
pub struct Violation {
    pub field: String,
    pub reason: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }

    fn nested(self, prefix: impl std::fmt::Display) -> Self {
        Self {
            field: format!("{}.{}", prefix, self.field),
            reason: self.reason,
        }
    }
}

/// Schema rules beyond what deserialization already enforces.
pub trait Validate {
    fn validate(&self) -> Result<(), Violation>;
}

impl<T: Validate> Validate for Vec<T> {
    fn validate(&self) -> Result<(), Violation> {
        self.iter()
            .enumerate()
            .try_for_each(|(i, item)| item.validate().map_err(|v| v.nested(format!("[{}]", i))))
    }
}

pub(crate) fn require_finite(field: &str, value: f64) -> Result<(), Violation> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(Violation::new(field, "must be a finite number"))
    }
}

pub(crate) fn require_at_least(field: &str, value: f64, min: f64) -> Result<(), Violation> {
    require_finite(field, value)?;
    if value < min {
        return Err(Violation::new(field, format!("must be at least {}", min)));
    }
    Ok(())
}

pub(crate) fn require_non_empty(field: &str, value: &str) -> Result<(), Violation> {
    if value.trim().is_empty() {
        Err(Violation::new(field, "must not be empty"))
    } else {
        Ok(())
    }
}

/// One prompt sent to the model.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowRequest {
    pub flow: &'static str,
    pub system: &'static str,
    pub prompt: String,
}

/// Text-generation service. Returns the model's raw text, expected to be JSON.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    async fn generate(&self, request: &FlowRequest) -> Result<String, FlowError>;
}

/// A typed prompt contract.
pub trait Flow {
    const NAME: &'static str;
    const SYSTEM: &'static str;

    type Input: Serialize + Validate + Sync;
    type Output: DeserializeOwned + Validate;

    fn prompt(input: &Self::Input) -> String;
}

/// Run flow `F` against `backend`.
pub async fn run_flow<F: Flow>(
    backend: &dyn LlmBackend,
    input: &F::Input,
) -> Result<F::Output, FlowError> {
    // ---
    input.validate().map_err(FlowError::InvalidInput)?;

    let request = FlowRequest {
        flow: F::NAME,
        system: F::SYSTEM,
        prompt: F::prompt(input),
    };

    let started = std::time::Instant::now();
    let raw = backend.generate(&request).await.map_err(|e| {
        tracing::error!(flow = F::NAME, "Flow call failed: {}", e);
        e
    })?;
    tracing::debug!(flow = F::NAME, elapsed = ?started.elapsed(), "Flow call returned");

    let output: F::Output = serde_json::from_str(strip_code_fence(&raw))
        .map_err(|e| FlowError::MalformedOutput(e.to_string()))?;
    output.validate().map_err(FlowError::InvalidOutput)?;

    Ok(output)
}

/// Models occasionally wrap JSON in a Markdown code fence; peel it off.
fn strip_code_fence(raw: &str) -> &str {
    // ---
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// JSON shape description appended to prompts so the model answers in kind.
pub(crate) fn json_instructions(shape: &str) -> String {
    format!(
        "\n\nRespond with JSON only, no prose and no Markdown, matching this shape:\n{}\n",
        shape
    )
}
