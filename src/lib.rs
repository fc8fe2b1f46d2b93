//! Backend for the construction-site digital twin dashboard.
//!
//! The crate simulates live site telemetry, raises alerts when a sensor
//! crosses its limit, and fronts a set of model-backed flows (community
//! briefs, material reuse, threshold and failure prediction, what-if
//! planning) behind a small HTTP API.
//!
//! Module layout follows the Explicit Module Boundary Pattern (EMBP): this
//! file is the gateway, siblings reach each other only through what it
//! re-exports.

pub mod alerts;
pub mod config;
pub mod error;
pub mod flows;
pub mod models;
pub mod routes;
pub mod scheduler;
pub mod simulation;
pub mod site;
pub mod twin;

pub use config::Config;
pub use models::{Alert, NewAlert, Sensor, SensorData, SensorId, Severity};
pub use routes::{router, AppState};
pub use scheduler::spawn_simulation;
pub use twin::{DigitalTwin, SensorSnapshot};
