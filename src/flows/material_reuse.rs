//! Reuse suggestions for demolition material, with CO2 and cost savings.

use serde::{Deserialize, Serialize};

use super::{
    json_instructions, require_at_least, require_finite, require_non_empty, Flow, Validate,
    Violation,
};

// ---

/// Smallest quantity, in tons, worth asking about.
pub const MIN_QUANTITY_TONS: f64 = 0.1;

pub struct MaterialReuse;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialReuseInput {
    pub material: String,
    /// Tons available.
    pub quantity: f64,
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialReuseSuggestion {
    pub reuse_suggestion: String,
    /// Kilograms of CO2 avoided.
    pub co2_savings: f64,
    /// US dollars saved.
    pub cost_savings: f64,
}

impl Validate for MaterialReuseInput {
    fn validate(&self) -> Result<(), Violation> {
        require_non_empty("material", &self.material)?;
        require_at_least("quantity", self.quantity, MIN_QUANTITY_TONS)?;
        require_non_empty("location", &self.location)
    }
}

impl Validate for MaterialReuseSuggestion {
    fn validate(&self) -> Result<(), Violation> {
        require_non_empty("reuseSuggestion", &self.reuse_suggestion)?;
        require_finite("co2Savings", self.co2_savings)?;
        require_finite("costSavings", self.cost_savings)
    }
}

impl Flow for MaterialReuse {
    const NAME: &'static str = "material_reuse";
    const SYSTEM: &'static str =
        "You are a circular-economy consultant specialising in reclaimed construction materials.";

    type Input = MaterialReuseInput;
    type Output = Vec<MaterialReuseSuggestion>;

    fn prompt(input: &MaterialReuseInput) -> String {
        let mut prompt = format!(
            "A demolition job has freed up {} tons of {} in {}. Suggest several realistic ways to \
             reuse it locally. For each suggestion estimate the CO2 avoided in kilograms and the \
             cost saved in US dollars compared with sending it to landfill and buying new.",
            input.quantity, input.material, input.location,
        );
        prompt.push_str(&json_instructions(
            r#"[ { "reuseSuggestion": "<text>", "co2Savings": <number>, "costSavings": <number> } ]"#,
        ));
        prompt
    }
}
