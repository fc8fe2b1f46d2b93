//! Sensor state store: the single owner of live readings and the alert log.
//!
//! All mutation goes through one mutex so there is at most one writer at a
//! time. Readers get immutable snapshots, either on demand or by subscribing
//! to the `watch` channel that every tick publishes to.

use std::{
    collections::{HashMap, VecDeque},
    sync::{Mutex, MutexGuard, PoisonError},
};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;

use crate::alerts::{self, AlertLog};
use crate::models::{Alert, NewAlert, Sensor, SensorId};
use crate::simulation::{random_walk, SimulationRng};

// ---

/// Readings kept per sensor for charting.
pub const CHART_HISTORY_LEN: usize = 30;

/// Immutable view of all live sensors, published after every tick.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorSnapshot {
    pub tick: u64,
    pub taken_at: DateTime<Utc>,
    pub sensors: Vec<Sensor>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// What a single tick changed.
#[derive(Debug, Clone)]
pub struct TickReport {
    pub tick: u64,
    pub alerts: Vec<Alert>,
}

struct TwinState {
    tick: u64,
    sensors: Vec<Sensor>,
    alerts: AlertLog,
    history: HashMap<SensorId, VecDeque<ChartPoint>>,
    rng: SimulationRng,
}

pub struct DigitalTwin {
    state: Mutex<TwinState>,
    offline: watch::Sender<bool>,
    spike_probability: f64,
    snapshots: watch::Sender<SensorSnapshot>,
}

impl DigitalTwin {
    pub fn new(sensors: Vec<Sensor>, rng: SimulationRng, spike_probability: f64) -> Self {
        // ---
        let now = Utc::now();
        let (snapshots, _) = watch::channel(SensorSnapshot {
            tick: 0,
            taken_at: now,
            sensors: sensors.clone(),
        });

        let mut history = HashMap::new();
        for sensor in &sensors {
            history.insert(sensor.id, VecDeque::with_capacity(CHART_HISTORY_LEN));
        }

        Self {
            state: Mutex::new(TwinState {
                tick: 0,
                sensors,
                alerts: AlertLog::new(),
                history,
                rng,
            }),
            offline: watch::Sender::new(false),
            spike_probability,
            snapshots,
        }
    }

    fn lock(&self) -> MutexGuard<'_, TwinState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn tick(&self) -> Option<TickReport> {
        self.tick_at(Utc::now())
    }

    /// Advance every sensor by one random-walk step.
    ///
    /// Returns `None` without touching any state while offline. Otherwise
    /// records rising-edge alerts, appends chart history and publishes a new
    /// snapshot to subscribers.
    pub fn tick_at(&self, now: DateTime<Utc>) -> Option<TickReport> {
        // ---
        if self.is_offline() {
            tracing::debug!("Offline, skipping simulation tick");
            return None;
        }

        let mut guard = self.lock();
        let state = &mut *guard;
        let mut fired = Vec::new();

        for sensor in state.sensors.iter_mut() {
            let step = random_walk(
                sensor.value,
                sensor.limit,
                self.spike_probability,
                &mut state.rng,
            );

            if let Some(alert) = alerts::evaluate(sensor, step.value) {
                let alert = state.alerts.add_alert(alert, now);
                tracing::warn!(
                    sensor = %sensor.id,
                    value = step.value,
                    limit = sensor.limit,
                    alert_id = %alert.id,
                    "{}",
                    alert.title
                );
                fired.push(alert);
            }

            sensor.value = step.value;
            sensor.timestamp = now;
            sensor.change = Some(step.change_percent);

            let points = state.history.entry(sensor.id).or_default();
            points.push_back(ChartPoint {
                timestamp: now,
                value: step.value,
            });
            while points.len() > CHART_HISTORY_LEN {
                points.pop_front();
            }
        }

        state.tick += 1;
        self.snapshots.send_replace(SensorSnapshot {
            tick: state.tick,
            taken_at: now,
            sensors: state.sensors.clone(),
        });

        tracing::debug!(tick = state.tick, alerts = fired.len(), "Simulation tick complete");

        Some(TickReport {
            tick: state.tick,
            alerts: fired,
        })
    }

    /// Record an alert raised outside the tick loop. With `notify` set the
    /// alert is also surfaced prominently in the service log.
    pub fn add_alert(&self, alert: NewAlert, notify: bool) -> Alert {
        // ---
        let alert = self.lock().alerts.add_alert(alert, Utc::now());
        if notify {
            tracing::warn!(alert_id = %alert.id, severity = ?alert.severity, "{}: {}", alert.title, alert.description);
        } else {
            tracing::info!(alert_id = %alert.id, "Alert recorded: {}", alert.title);
        }
        alert
    }

    pub fn clear_alerts(&self) {
        self.lock().alerts.clear_alerts();
        tracing::info!("Alert log cleared");
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.lock().alerts.entries()
    }

    pub fn alert(&self, id: &str) -> Option<Alert> {
        self.lock().alerts.get(id).cloned()
    }

    pub fn sensors(&self) -> Vec<Sensor> {
        self.lock().sensors.clone()
    }

    pub fn snapshot(&self) -> SensorSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SensorSnapshot> {
        self.snapshots.subscribe()
    }

    /// Chart history for one sensor, oldest first.
    pub fn history(&self, id: SensorId) -> Vec<ChartPoint> {
        self.lock()
            .history
            .get(&id)
            .map(|points| points.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn is_offline(&self) -> bool {
        *self.offline.borrow()
    }

    /// Receiver that is notified only when the offline flag actually flips.
    pub fn subscribe_offline(&self) -> watch::Receiver<bool> {
        self.offline.subscribe()
    }

    /// Toggle simulated offline mode. Takes effect at the next tick; returns
    /// the previous setting.
    pub fn set_offline(&self, offline: bool) -> bool {
        // ---
        let mut previous = offline;
        self.offline.send_if_modified(|current| {
            previous = std::mem::replace(current, offline);
            previous != offline
        });
        if previous != offline {
            if offline {
                tracing::info!("Offline mode activated, sensor updates suspended until reconnection");
            } else {
                tracing::info!("Back online, resuming sensor updates");
            }
        }
        previous
    }
}
