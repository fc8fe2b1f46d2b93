//! Threshold evaluation and the bounded alert log.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{Alert, NewAlert, Sensor, SensorId, Severity};

// ---

/// Maximum number of alerts retained, newest first.
pub const ALERT_LOG_CAPACITY: usize = 20;

/// Compare a sensor's current reading with its next value.
///
/// Returns an alert only on a rising edge: the sensor was at or below its
/// limit and the new value is strictly above it.
pub fn evaluate(sensor: &Sensor, new_value: f64) -> Option<NewAlert> {
    // ---
    let was_over_limit = sensor.value > sensor.limit;
    let is_over_limit = new_value > sensor.limit;

    if !is_over_limit || was_over_limit {
        return None;
    }

    Some(NewAlert {
        title: format!("{} Threshold Exceeded", sensor.name),
        description: format!(
            "{} at {:.2} {} has exceeded the limit of {} {}.",
            sensor.name, new_value, sensor.unit, sensor.limit, sensor.unit
        ),
        severity: Severity::High,
        mitigation_plan: mitigation_plan(sensor.id, &sensor.name),
        community_impact: community_impact(sensor.id, &sensor.name),
    })
}

fn mitigation_plan(id: SensorId, name: &str) -> String {
    let actions = match id {
        SensorId::Energy => {
            "Shed non-critical loads, stagger heavy equipment start-up and switch idle plant off."
        }
        SensorId::Water => {
            "Inspect temporary supply lines for leaks and pause non-essential washdown and curing."
        }
        SensorId::Noise => {
            "Use quieter equipment and install temporary noise barriers along the site boundary."
        }
        SensorId::Air => {
            "Dampen haul roads and stockpiles, cover loose material and limit cutting operations."
        }
    };
    format!("Bring {} back under its limit immediately. {}", name, actions)
}

fn community_impact(id: SensorId, name: &str) -> String {
    let impact = match id {
        SensorId::Energy => "Grid demand from the site is elevated; no direct effect on residents is expected.",
        SensorId::Water => "Local water pressure may drop briefly while usage is elevated.",
        SensorId::Noise => "Nearby residents may experience temporary high noise levels.",
        SensorId::Air => "Nearby residents may notice dust; sensitive groups should limit time outdoors.",
    };
    format!(
        "{} We are working to bring {} back within limits as quickly as possible.",
        impact, name
    )
}

/// Session-scoped log of alerts, newest first, capped at [`ALERT_LOG_CAPACITY`].
#[derive(Debug, Clone)]
pub struct AlertLog {
    entries: VecDeque<Alert>,
    capacity: usize,
}

impl Default for AlertLog {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertLog {
    pub fn new() -> Self {
        Self::with_capacity(ALERT_LOG_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Stamp `alert` with an id and timestamp and prepend it to the log,
    /// evicting the oldest entries beyond capacity.
    pub fn add_alert(&mut self, alert: NewAlert, now: DateTime<Utc>) -> Alert {
        // ---
        let entry = Alert {
            id: alert_id(now),
            title: alert.title,
            description: alert.description,
            severity: alert.severity,
            mitigation_plan: alert.mitigation_plan,
            community_impact: alert.community_impact,
            timestamp: now,
        };

        self.entries.push_front(entry.clone());
        self.entries.truncate(self.capacity);
        entry
    }

    pub fn clear_alerts(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> Vec<Alert> {
        self.entries.iter().cloned().collect()
    }

    pub fn get(&self, id: &str) -> Option<&Alert> {
        self.entries.iter().find(|a| a.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// `alert-<unix millis>-<random suffix>`: unique enough for a session log,
/// not meant for durable storage.
fn alert_id(now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("alert-{}-{}", now.timestamp_millis(), &suffix[..12])
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::models::initial_sensors;
    use chrono::{Duration, TimeZone};

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 26, 18, 45, 0).unwrap()
    }

    fn noise_sensor(value: f64) -> Sensor {
        let mut sensor = initial_sensors(fixed_now()).remove(2);
        sensor.value = value;
        sensor
    }

    fn sample_alert(n: usize) -> NewAlert {
        NewAlert {
            title: format!("alert {}", n),
            description: "test".to_string(),
            severity: Severity::Low,
            mitigation_plan: String::new(),
            community_impact: String::new(),
        }
    }

    #[test]
    fn test_rising_edge_fires() {
        // ---
        let alert = evaluate(&noise_sensor(70.0), 76.0).expect("rising edge should alert");

        assert_eq!(alert.severity, Severity::High);
        assert_eq!(alert.title, "Noise Level Threshold Exceeded");
        assert!(alert.description.contains("76.00 dB"));
        assert!(alert.description.contains("limit of 75 dB"));
        assert!(alert.mitigation_plan.contains("Noise Level"));
        assert!(alert.community_impact.contains("Noise Level"));
    }

    #[test]
    fn test_no_alert_without_rising_edge() {
        // ---
        // Sustained normal
        assert!(evaluate(&noise_sensor(70.0), 74.0).is_none());
        // Sustained violation
        assert!(evaluate(&noise_sensor(80.0), 81.0).is_none());
        // Falling edge
        assert!(evaluate(&noise_sensor(80.0), 70.0).is_none());
        // Landing exactly on the limit is not a violation
        assert!(evaluate(&noise_sensor(70.0), 75.0).is_none());
    }

    #[test]
    fn test_from_exact_limit_counts_as_rising() {
        // ---
        assert!(evaluate(&noise_sensor(75.0), 75.5).is_some());
    }

    #[test]
    fn test_log_is_newest_first() {
        // ---
        let mut log = AlertLog::new();
        let first = log.add_alert(sample_alert(1), fixed_now());
        let second = log.add_alert(sample_alert(2), fixed_now() + Duration::seconds(1));

        let entries = log.entries();
        assert_eq!(entries[0].id, second.id);
        assert_eq!(entries[1].id, first.id);
        assert!(first.id.starts_with("alert-"));
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn test_log_evicts_oldest_beyond_capacity() {
        // ---
        let mut log = AlertLog::new();
        for n in 1..=ALERT_LOG_CAPACITY + 1 {
            log.add_alert(sample_alert(n), fixed_now());
        }

        let entries = log.entries();
        assert_eq!(entries.len(), ALERT_LOG_CAPACITY);
        assert_eq!(entries[0].title, "alert 21");
        assert_eq!(entries[ALERT_LOG_CAPACITY - 1].title, "alert 2");
        assert!(entries.iter().all(|a| a.title != "alert 1"));
    }

    #[test]
    fn test_clear_alerts_empties_log() {
        // ---
        let mut log = AlertLog::new();
        log.clear_alerts();
        assert!(log.is_empty());

        for n in 0..5 {
            log.add_alert(sample_alert(n), fixed_now());
        }
        assert_eq!(log.len(), 5);

        log.clear_alerts();
        assert!(log.is_empty());
    }

    #[test]
    fn test_get_by_id() {
        // ---
        let mut log = AlertLog::new();
        let alert = log.add_alert(sample_alert(1), fixed_now());

        assert_eq!(log.get(&alert.id).map(|a| a.title.as_str()), Some("alert 1"));
        assert!(log.get("alert-missing").is_none());
    }
}
