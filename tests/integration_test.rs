use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Result;
use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sitetwin::{
    config::DEFAULT_SITE_NAME,
    flows::{HttpLlmBackend, LlmBackend},
    models::initial_sensors,
    simulation::simulation_rng,
    site::generate_site_data,
    AppState, Config, DigitalTwin,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MaterialReuseSuggestion {
    reuse_suggestion: String,
    co2_savings: f64,
    cost_savings: f64,
}

#[derive(Debug, Deserialize)]
struct Alert {
    id: String,
    title: String,
    severity: String,
}

// ---

/// Serve the full router on an ephemeral port, backed by `llm_url`.
async fn spawn_app(llm_url: &str, spike_probability: f64) -> Result<(String, Arc<DigitalTwin>)> {
    // ---
    let config = Config {
        llm_api_url: llm_url.to_string(),
        llm_api_key: None,
        llm_model: "llama3.1".to_string(),
        llm_timeout: Duration::from_secs(5),
        tick_interval: Duration::from_secs(60),
        spike_probability,
        sim_seed: Some(42),
        site_name: DEFAULT_SITE_NAME.to_string(),
        bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
    };

    let now = Utc::now();
    let mut rng = simulation_rng(config.sim_seed);
    let assets = generate_site_data(&mut rng, now);
    let twin = Arc::new(DigitalTwin::new(initial_sensors(now), rng, spike_probability));
    let llm: Arc<dyn LlmBackend> = Arc::new(HttpLlmBackend::from_config(&config)?);

    let app = sitetwin::router(AppState {
        twin: twin.clone(),
        llm,
        assets: Arc::new(assets),
        config: config.clone(),
    });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok((format!("http://{}", addr), twin))
}

async fn mock_model(reply: &str) -> MockServer {
    // ---
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "llama3.1",
            "response": reply,
            "done": true
        })))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn material_reuse_returns_backend_array_unchanged() -> Result<()> {
    // ---
    let reply = r#"[
        {"reuseSuggestion":"Crush concrete for use as road base.","co2Savings":500,"costSavings":1000},
        {"reuseSuggestion":"Reuse slabs as retaining wall blocks.","co2Savings":800,"costSavings":1500}
    ]"#;
    let model = mock_model(reply).await;
    let (base, _) = spawn_app(&model.uri(), 0.0).await?;

    let suggestions: Vec<MaterialReuseSuggestion> = Client::new()
        .post(format!("{}/flows/material-reuse", base))
        .json(&json!({ "material": "concrete", "quantity": 10, "location": "New York, NY" }))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    assert_eq!(suggestions.len(), 2);
    assert_eq!(suggestions[0].reuse_suggestion, "Crush concrete for use as road base.");
    assert_eq!(suggestions[0].co2_savings, 500.0);
    assert_eq!(suggestions[0].cost_savings, 1000.0);
    assert_eq!(suggestions[1].reuse_suggestion, "Reuse slabs as retaining wall blocks.");
    assert_eq!(suggestions[1].co2_savings, 800.0);
    assert_eq!(suggestions[1].cost_savings, 1500.0);

    Ok(())
}

#[tokio::test]
async fn schema_violation_surfaces_as_typed_failure() -> Result<()> {
    // ---
    let model = mock_model(r#"{"predictedDelayDays":2}"#).await;
    let (base, twin) = spawn_app(&model.uri(), 0.0).await?;

    let response = Client::new()
        .post(format!("{}/flows/what-if", base))
        .json(&json!({ "truckDelayHours": 3, "energyUsagePercentage": 100 }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["error"], "AssistantUnavailable");
    assert!(body.get("prediction").is_none());

    // The simulation keeps working after a failed flow call.
    assert!(twin.tick().is_some());

    Ok(())
}

#[tokio::test]
async fn forced_spike_raises_alert_and_brief_downloads() -> Result<()> {
    // ---
    let model = mock_model(r#"{"communityBrief":"Dear neighbours, noise works are paused."}"#).await;
    let (base, twin) = spawn_app(&model.uri(), 1.0).await?;
    let client = Client::new();

    let report = twin.tick().expect("simulation is online");
    assert!(!report.alerts.is_empty());

    let alerts: Vec<Alert> = client
        .get(format!("{}/alerts", base))
        .send()
        .await?
        .json()
        .await?;
    let noise = alerts
        .iter()
        .find(|a| a.title.contains("Noise Level"))
        .expect("noise alert in log");
    assert_eq!(noise.severity, "High");

    let response = client
        .get(format!("{}/alerts/{}/community-brief", base, noise.id))
        .send()
        .await?
        .error_for_status()?;
    let disposition = response
        .headers()
        .get(reqwest::header::CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert_eq!(
        disposition,
        format!("attachment; filename=\"community-brief-{}.txt\"", noise.id)
    );
    assert_eq!(response.text().await?, "Dear neighbours, noise works are paused.");

    let status = client.delete(format!("{}/alerts", base)).send().await?.status();
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(twin.alerts().is_empty());

    Ok(())
}
