use std::sync::Arc;

use axum::Router;

use crate::{flows::LlmBackend, models::SensorData, twin::DigitalTwin, Config};

mod alerts;
mod flows;
mod health;
mod sensors;
mod site;

// ---

/// Everything a handler may touch. Cloned per request; all shared parts are
/// behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub twin: Arc<DigitalTwin>,
    pub llm: Arc<dyn LlmBackend>,
    pub assets: Arc<Vec<SensorData>>,
    pub config: Config,
}

pub fn router(state: AppState) -> Router {
    // ---
    Router::new()
        .merge(sensors::router())
        .merge(alerts::router())
        .merge(site::router())
        .merge(flows::router())
        .merge(health::router())
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod tests {
    // ---
    use super::*;
    use crate::config::test_config;
    use crate::models::initial_sensors;
    use crate::simulation::simulation_rng;
    use crate::site::generate_site_data;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use chrono::Utc;
    use serde_json::Value;
    use tower::ServiceExt;

    pub(crate) fn test_state(llm: Arc<dyn LlmBackend>, spike_probability: f64) -> AppState {
        // ---
        let now = Utc::now();
        AppState {
            twin: Arc::new(DigitalTwin::new(
                initial_sensors(now),
                simulation_rng(Some(1)),
                spike_probability,
            )),
            llm,
            assets: Arc::new(generate_site_data(&mut simulation_rng(Some(2)), now)),
            config: test_config("http://unused.invalid"),
        }
    }

    pub(crate) async fn send(
        app: Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Vec<u8>) {
        // ---
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    pub(crate) async fn send_json(
        app: Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let (status, bytes) = send(app, method, uri, body).await;
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }
}
