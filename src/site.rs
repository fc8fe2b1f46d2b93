//! Mock site assets for the map and predictive-maintenance views.
//!
//! Generated once at startup and never mutated afterwards. This set is
//! independent of the live sensors in [`crate::twin`], except for the SDG
//! scorecard whose SDG 9 figure tracks the live energy reading.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::Serialize;

use crate::models::{HistoryPoint, Sensor, SensorData, SensorId};

// ---

/// Site centre (Bangalore, India).
pub const SITE_CENTER: (f64, f64) = (12.9716, 77.5946);

pub const HISTORY_HOURS: i64 = 24;

/// kg CO2e per unit of reading.
const CO2E_FACTOR: f64 = 0.45;

const ASSET_NAMES: [&str; 15] = [
    "HVAC Unit A-1",
    "Water Pump 3",
    "Lighting Grid B",
    "Solar Inverter 7",
    "Air Quality Monitor",
    "Energy Meter C4",
    "Substation T-82",
    "Water Main Inlet",
    "Perimeter Lighting",
    "Generator G-2",
    "Cooling Tower 1",
    "Exhaust Fan E-5",
    "Smart Window Actuator",
    "EV Charger 04",
    "Greywater Recycler",
];

const UNITS: [&str; 3] = ["kWh", "m³", "ppm"];

/// Build one asset per entry in the asset list, each with a day of hourly
/// history ending at `now`.
pub fn generate_site_data<R>(rng: &mut R, now: DateTime<Utc>) -> Vec<SensorData>
where
    R: Rng + ?Sized,
{
    // ---
    (0..ASSET_NAMES.len())
        .map(|i| {
            let mut history: Vec<HistoryPoint> = (0..HISTORY_HOURS)
                .map(|h| {
                    let wave = (h as f64 * 0.5 + i as f64).sin() * 20.0 + 50.0;
                    let value = (wave + rng.gen::<f64>() * 10.0).max(0.0);
                    HistoryPoint {
                        timestamp: now - Duration::hours(h),
                        value,
                        predicted: value * (1.0 + (rng.gen::<f64>() - 0.4) * 0.1),
                        co2e: value * CO2E_FACTOR,
                    }
                })
                .collect();
            history.reverse();

            SensorData {
                id: i as u32,
                name: ASSET_NAMES[i].to_string(),
                lat: SITE_CENTER.0 + (rng.gen::<f64>() - 0.5) * 0.005,
                lng: SITE_CENTER.1 + (rng.gen::<f64>() - 0.5) * 0.005,
                unit: UNITS[i % UNITS.len()].to_string(),
                history,
            }
        })
        .collect()
}

/// UN Sustainable Development Goals the project reports against.
const SDGS: [(u8, &str, &str); 4] = [
    (
        9,
        "Industry, Innovation and Infrastructure",
        "Promoting sustainable industrialization and fostering innovation.",
    ),
    (
        11,
        "Sustainable Cities and Communities",
        "Making cities inclusive, safe, resilient and sustainable.",
    ),
    (
        12,
        "Responsible Consumption and Production",
        "Ensuring sustainable consumption and production patterns.",
    ),
    (
        13,
        "Climate Action",
        "Taking urgent action to combat climate change and its impacts.",
    ),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SdgMetric {
    pub id: u8,
    pub name: &'static str,
    pub description: &'static str,
    pub value: f64,
    pub unit: &'static str,
    pub label: &'static str,
}

/// SDG scorecard. SDG 9 reports the live energy reading (0 when there is no
/// energy sensor); the others are fixed project figures.
pub fn sdg_metrics(sensors: &[Sensor]) -> Vec<SdgMetric> {
    // ---
    let energy = sensors
        .iter()
        .find(|s| s.id == SensorId::Energy)
        .map_or(0.0, |s| s.value);

    SDGS.into_iter()
        .map(|(id, name, description)| {
            let (value, unit, label) = match id {
                9 => (energy, "kWh", "Energy Saved"),
                11 => (15.0, "%", "Community Impact"),
                12 => (3.2, "tons", "Waste Reused"),
                _ => (12.5, "tCO₂e", "Emissions Reduced"),
            };
            SdgMetric {
                id,
                name,
                description,
                value,
                unit,
                label,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::models::initial_sensors;
    use crate::simulation::simulation_rng;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 26, 18, 0, 0).unwrap()
    }

    #[test]
    fn test_generates_fifteen_assets() {
        // ---
        let assets = generate_site_data(&mut simulation_rng(Some(1)), fixed_now());

        assert_eq!(assets.len(), 15);
        assert_eq!(assets[0].name, "HVAC Unit A-1");
        assert_eq!(assets[0].unit, "kWh");
        assert_eq!(assets[1].unit, "m³");
        assert_eq!(assets[2].unit, "ppm");
        assert_eq!(assets[14].id, 14);
    }

    #[test]
    fn test_history_is_oldest_first_and_ends_now() {
        // ---
        let assets = generate_site_data(&mut simulation_rng(Some(2)), fixed_now());

        for asset in &assets {
            assert_eq!(asset.history.len(), HISTORY_HOURS as usize);
            assert!(asset
                .history
                .windows(2)
                .all(|w| w[0].timestamp < w[1].timestamp));
            assert_eq!(asset.history.last().unwrap().timestamp, fixed_now());
            assert_eq!(
                asset.history[0].timestamp,
                fixed_now() - Duration::hours(HISTORY_HOURS - 1)
            );
        }
    }

    #[test]
    fn test_derived_fields() {
        // ---
        let assets = generate_site_data(&mut simulation_rng(Some(3)), fixed_now());

        for point in assets.iter().flat_map(|a| a.history.iter()) {
            assert!(point.value >= 0.0);
            assert!((point.co2e - point.value * 0.45).abs() < 1e-9);
            // predicted swings between -4% and +6% of value
            assert!(point.predicted >= point.value * 0.96 - 1e-9);
            assert!(point.predicted <= point.value * 1.06 + 1e-9);
        }
    }

    #[test]
    fn test_assets_stay_near_site_centre() {
        // ---
        let assets = generate_site_data(&mut simulation_rng(Some(4)), fixed_now());

        for asset in &assets {
            assert!((asset.lat - SITE_CENTER.0).abs() <= 0.0025);
            assert!((asset.lng - SITE_CENTER.1).abs() <= 0.0025);
        }
    }

    #[test]
    fn test_sdg_nine_tracks_energy() {
        // ---
        let mut sensors = initial_sensors(fixed_now());
        let metrics = sdg_metrics(&sensors);

        let ids: Vec<u8> = metrics.iter().map(|m| m.id).collect();
        assert_eq!(ids, [9, 11, 12, 13]);
        assert_eq!(metrics[0].value, 450.0);
        assert_eq!(metrics[0].unit, "kWh");
        assert_eq!(metrics[3].label, "Emissions Reduced");

        sensors[0].value = 512.5;
        assert_eq!(sdg_metrics(&sensors)[0].value, 512.5);

        sensors.retain(|s| s.id != SensorId::Energy);
        assert_eq!(sdg_metrics(&sensors)[0].value, 0.0);
    }
}
