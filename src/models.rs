//! Data models for the site twin: live sensors, alerts, and the mock asset set.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---

/// The fixed set of live site sensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorId {
    Energy,
    Water,
    Noise,
    Air,
}

impl SensorId {
    pub const ALL: [SensorId; 4] = [
        SensorId::Energy,
        SensorId::Water,
        SensorId::Noise,
        SensorId::Air,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SensorId::Energy => "energy",
            SensorId::Water => "water",
            SensorId::Noise => "noise",
            SensorId::Air => "air",
        }
    }
}

impl fmt::Display for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Live reading of one site sensor. Mutated in place each tick, never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sensor {
    // ---
    pub id: SensorId,
    pub name: String,
    pub value: f64,
    pub unit: String,
    pub limit: f64,
    pub timestamp: DateTime<Utc>,
    /// Percentage swing reported by the last tick.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change: Option<f64>,
}

impl Sensor {
    pub fn is_over_limit(&self) -> bool {
        self.value > self.limit
    }
}

/// Starting readings for the four live sensors.
pub fn initial_sensors(now: DateTime<Utc>) -> Vec<Sensor> {
    // ---
    let sensor = |id, name: &str, value, unit: &str, limit| Sensor {
        id,
        name: name.to_string(),
        value,
        unit: unit.to_string(),
        limit,
        timestamp: now,
        change: None,
    };

    vec![
        sensor(SensorId::Energy, "Energy Consumption", 450.0, "kWh", 600.0),
        sensor(SensorId::Water, "Water Usage", 1200.0, "L", 2000.0),
        sensor(SensorId::Noise, "Noise Level", 68.0, "dB", 75.0),
        sensor(SensorId::Air, "Air Quality (PM2.5)", 35.0, "μg/m³", 50.0),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// Alert content before the log assigns it an id and timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAlert {
    pub title: String,
    pub description: String,
    pub severity: Severity,
    pub mitigation_plan: String,
    pub community_impact: String,
}

/// An entry in the alert log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    // ---
    pub id: String,
    pub title: String,
    pub description: String,
    pub severity: Severity,
    pub mitigation_plan: String,
    pub community_impact: String,
    pub timestamp: DateTime<Utc>,
}

/// One hourly sample of a mock asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    pub predicted: f64,
    pub co2e: f64,
}

/// A mock site asset with a day of hourly history, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorData {
    // ---
    pub id: u32,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub unit: String,
    pub history: Vec<HistoryPoint>,
}

/// Demolition materials offered by the circularity advisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Material {
    Concrete,
    Steel,
    Wood,
    Glass,
    Copper,
}

impl Material {
    pub const ALL: [Material; 5] = [
        Material::Concrete,
        Material::Steel,
        Material::Wood,
        Material::Glass,
        Material::Copper,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Material::Concrete => "concrete",
            Material::Steel => "steel",
            Material::Wood => "wood",
            Material::Glass => "glass",
            Material::Copper => "copper",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Material::Concrete => "Concrete",
            Material::Steel => "Steel",
            Material::Wood => "Wood",
            Material::Glass => "Glass",
            Material::Copper => "Copper",
        }
    }

    pub fn parse(s: &str) -> Option<Material> {
        Material::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
    }
}
