//! Predictive maintenance: failure probability per asset from its history.

use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

use super::{json_instructions, require_finite, require_non_empty, Flow, Validate, Violation};
use crate::models::SensorData;

// ---

pub struct EquipmentFailurePrediction;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentFailureInput {
    pub sensor_data: Vec<AssetSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetSeries {
    pub id: u32,
    pub name: String,
    pub unit: String,
    pub history: Vec<SeriesPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    /// RFC 3339 timestamp.
    pub timestamp: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailurePrediction {
    pub sensor_id: u32,
    pub asset_name: String,
    /// Between 0 and 1.
    pub failure_probability: f64,
    pub reason: String,
    pub recommendation: String,
}

impl From<&SensorData> for AssetSeries {
    fn from(asset: &SensorData) -> Self {
        Self {
            id: asset.id,
            name: asset.name.clone(),
            unit: asset.unit.clone(),
            history: asset
                .history
                .iter()
                .map(|h| SeriesPoint {
                    timestamp: h.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
                    value: h.value,
                })
                .collect(),
        }
    }
}

impl EquipmentFailureInput {
    /// Request covering a single asset.
    pub fn for_asset(asset: &SensorData) -> Self {
        Self {
            sensor_data: vec![AssetSeries::from(asset)],
        }
    }
}

impl Validate for EquipmentFailureInput {
    fn validate(&self) -> Result<(), Violation> {
        if self.sensor_data.is_empty() {
            return Err(Violation::new("sensorData", "must list at least one sensor"));
        }
        for (i, series) in self.sensor_data.iter().enumerate() {
            require_non_empty(&format!("sensorData[{}].name", i), &series.name)?;
            for (j, point) in series.history.iter().enumerate() {
                require_finite(&format!("sensorData[{}].history[{}].value", i, j), point.value)?;
            }
        }
        Ok(())
    }
}

impl Validate for FailurePrediction {
    fn validate(&self) -> Result<(), Violation> {
        require_finite("failureProbability", self.failure_probability)?;
        if !(0.0..=1.0).contains(&self.failure_probability) {
            return Err(Violation::new("failureProbability", "must be within [0, 1]"));
        }
        require_non_empty("assetName", &self.asset_name)?;
        require_non_empty("reason", &self.reason)?;
        require_non_empty("recommendation", &self.recommendation)
    }
}

impl Flow for EquipmentFailurePrediction {
    const NAME: &'static str = "equipment_failure";
    const SYSTEM: &'static str =
        "You are a reliability engineer who predicts equipment failures from telemetry.";

    type Input = EquipmentFailureInput;
    type Output = Vec<FailurePrediction>;

    fn prompt(input: &EquipmentFailureInput) -> String {
        // ---
        let mut prompt = String::from(
            "Look for anomalies, drifts and unusual swings in the readings below. For each \
             sensor estimate the probability that its asset fails soon, explain why and \
             recommend preventive action.\n",
        );

        for series in &input.sensor_data {
            prompt.push_str(&format!(
                "\nSensor {} ({}), unit {}:\n",
                series.id, series.name, series.unit
            ));
            for point in &series.history {
                prompt.push_str(&format!("  {} {:.3}\n", point.timestamp, point.value));
            }
        }

        prompt.push_str(&json_instructions(
            r#"[ { "sensorId": <integer>, "assetName": "<text>", "failureProbability": <0..1>, "reason": "<text>", "recommendation": "<text>" } ]"#,
        ));
        prompt
    }
}
