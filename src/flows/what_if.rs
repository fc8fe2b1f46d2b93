//! What-if planning: impact of truck delays and energy use on the project.

use serde::{Deserialize, Serialize};

use super::{json_instructions, require_at_least, require_finite, Flow, Validate, Violation};

// ---

pub struct WhatIfSimulation;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhatIfInput {
    pub truck_delay_hours: f64,
    pub energy_usage_percentage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhatIfOutput {
    pub predicted_delay_days: f64,
    /// Kilograms.
    #[serde(rename = "predictedCO2Emissions")]
    pub predicted_co2_emissions: f64,
    /// US dollars.
    pub predicted_cost_savings: f64,
}

/// Project outlook after applying a scenario to the plan baseline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhatIfProjection {
    pub delay_days: f64,
    pub co2_emissions_kg: f64,
    pub cost_savings_usd: f64,
}

impl WhatIfProjection {
    /// Plan baseline before any scenario is applied.
    pub const BASELINE: WhatIfProjection = WhatIfProjection {
        delay_days: 5.0,
        co2_emissions_kg: 15_000.0,
        cost_savings_usd: 0.0,
    };

    /// Baseline plus the model's deltas. Baseline emissions scale with the
    /// scenario's energy usage percentage.
    pub fn combine(input: &WhatIfInput, output: &WhatIfOutput) -> Self {
        let base = Self::BASELINE;
        Self {
            delay_days: base.delay_days + output.predicted_delay_days,
            co2_emissions_kg: base.co2_emissions_kg * (input.energy_usage_percentage / 100.0)
                + output.predicted_co2_emissions,
            cost_savings_usd: base.cost_savings_usd + output.predicted_cost_savings,
        }
    }
}

impl Default for WhatIfInput {
    fn default() -> Self {
        Self {
            truck_delay_hours: 0.0,
            energy_usage_percentage: 100.0,
        }
    }
}

impl Validate for WhatIfInput {
    fn validate(&self) -> Result<(), Violation> {
        require_at_least("truckDelayHours", self.truck_delay_hours, 0.0)?;
        require_at_least("energyUsagePercentage", self.energy_usage_percentage, 0.0)
    }
}

impl Validate for WhatIfOutput {
    fn validate(&self) -> Result<(), Violation> {
        require_finite("predictedDelayDays", self.predicted_delay_days)?;
        require_finite("predictedCO2Emissions", self.predicted_co2_emissions)?;
        require_finite("predictedCostSavings", self.predicted_cost_savings)
    }
}

impl Flow for WhatIfSimulation {
    const NAME: &'static str = "what_if";
    const SYSTEM: &'static str =
        "You are a construction planner who models schedule, emissions and cost trade-offs.";

    type Input = WhatIfInput;
    type Output = WhatIfOutput;

    fn prompt(input: &WhatIfInput) -> String {
        let mut prompt = format!(
            "Scenario: deliveries are delayed by {} truck hours and equipment runs at {}% of its \
             planned energy use. Estimate the additional project delay in days, the change in CO2 \
             emissions in kilograms and the cost savings in US dollars. Keep the numbers \
             realistic and directionally correct.",
            input.truck_delay_hours, input.energy_usage_percentage,
        );
        prompt.push_str(&json_instructions(
            r#"{ "predictedDelayDays": <number>, "predictedCO2Emissions": <number>, "predictedCostSavings": <number> }"#,
        ));
        prompt
    }
}
