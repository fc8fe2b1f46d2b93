//! Likelihood that each environmental limit will be breached soon.

use chrono::{DateTime, Datelike, TimeZone, Timelike, Weekday};
use serde::{Deserialize, Serialize};

use super::{json_instructions, require_finite, require_non_empty, Flow, Validate, Violation};
use crate::models::{Sensor, SensorId};

// ---

pub struct ThresholdPrediction;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdPredictionInput {
    pub noise_level: f64,
    pub air_quality_index: f64,
    pub water_consumption_rate: f64,
    pub energy_consumption_rate: f64,
    pub time_of_day: String,
    pub day_of_week: String,
}

/// Likelihoods are free text, normally `High`, `Medium` or `Low`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdPredictionOutput {
    pub noise_violation_likelihood: String,
    pub air_quality_violation_likelihood: String,
    pub water_violation_likelihood: String,
    pub energy_violation_likelihood: String,
    pub suggested_actions: String,
}

impl ThresholdPredictionInput {
    /// Build a request from the live readings at `now`. Returns `None` if one
    /// of the four site sensors is missing.
    pub fn from_sensors<Tz: TimeZone>(sensors: &[Sensor], now: &DateTime<Tz>) -> Option<Self> {
        // ---
        let reading = |id: SensorId| sensors.iter().find(|s| s.id == id).map(|s| s.value);

        Some(Self {
            noise_level: reading(SensorId::Noise)?,
            air_quality_index: reading(SensorId::Air)?,
            water_consumption_rate: reading(SensorId::Water)?,
            energy_consumption_rate: reading(SensorId::Energy)?,
            time_of_day: time_of_day(now.hour()).to_string(),
            day_of_week: day_name(now.weekday()).to_string(),
        })
    }
}

fn time_of_day(hour: u32) -> &'static str {
    match hour {
        5..=11 => "morning",
        12..=16 => "afternoon",
        17..=20 => "evening",
        _ => "night",
    }
}

fn day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

impl Validate for ThresholdPredictionInput {
    fn validate(&self) -> Result<(), Violation> {
        require_finite("noiseLevel", self.noise_level)?;
        require_finite("airQualityIndex", self.air_quality_index)?;
        require_finite("waterConsumptionRate", self.water_consumption_rate)?;
        require_finite("energyConsumptionRate", self.energy_consumption_rate)?;
        require_non_empty("timeOfDay", &self.time_of_day)?;
        require_non_empty("dayOfWeek", &self.day_of_week)
    }
}

impl Validate for ThresholdPredictionOutput {
    fn validate(&self) -> Result<(), Violation> {
        require_non_empty("noiseViolationLikelihood", &self.noise_violation_likelihood)?;
        require_non_empty(
            "airQualityViolationLikelihood",
            &self.air_quality_violation_likelihood,
        )?;
        require_non_empty("waterViolationLikelihood", &self.water_violation_likelihood)?;
        require_non_empty("energyViolationLikelihood", &self.energy_violation_likelihood)?;
        require_non_empty("suggestedActions", &self.suggested_actions)
    }
}

impl Flow for ThresholdPrediction {
    const NAME: &'static str = "threshold_prediction";
    const SYSTEM: &'static str =
        "You forecast environmental compliance risks on construction sites.";

    type Input = ThresholdPredictionInput;
    type Output = ThresholdPredictionOutput;

    fn prompt(input: &ThresholdPredictionInput) -> String {
        let mut prompt = format!(
            "Current site readings:\n\
             - Noise level: {} dB\n\
             - Air quality index: {}\n\
             - Water consumption rate: {}\n\
             - Energy consumption rate: {}\n\
             It is {} on a {}.\n\n\
             Taking typical construction activity, weather and local regulations into account, \
             rate the likelihood of each limit being breached as High, Medium or Low, and suggest \
             actions to prevent the breaches.",
            input.noise_level,
            input.air_quality_index,
            input.water_consumption_rate,
            input.energy_consumption_rate,
            input.time_of_day,
            input.day_of_week,
        );
        prompt.push_str(&json_instructions(
            r#"{ "noiseViolationLikelihood": "High|Medium|Low", "airQualityViolationLikelihood": "High|Medium|Low", "waterViolationLikelihood": "High|Medium|Low", "energyViolationLikelihood": "High|Medium|Low", "suggestedActions": "<text>" }"#,
        ));
        prompt
    }
}
