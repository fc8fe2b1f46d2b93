//! Application entry point for the `codemetal-sitetwin` backend service.
//!
//! This binary orchestrates the full startup sequence for the site twin API,
//! including:
//! - Loading configuration from environment variables or `.env`
//! - Initializing structured logging/tracing
//! - Building the live sensor store and the mock asset set
//! - Starting the periodic simulation task
//! - Mounting all API routes via the `routes` gateway (EMBP pattern)
//! - Binding the Axum HTTP server and serving until Ctrl-C / SIGTERM
//!
//! # Environment Variables
//! - `LLM_API_URL` (**required**) – text-generation backend base URL
//! - `SITETWIN_LOG_LEVEL` (optional) – log verbosity (default: `debug`)
//! - `SITETWIN_SPAN_EVENTS` (optional) – span event mode for tracing
//!
//! See `config.rs` for the remaining settings.
use std::{env, sync::Arc};

use anyhow::Result;
use chrono::Utc;
use dotenvy::dotenv;
use is_terminal::IsTerminal;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

use sitetwin::{
    flows::{HttpLlmBackend, LlmBackend},
    models::initial_sensors,
    simulation::simulation_rng,
    site::generate_site_data,
    AppState, DigitalTwin,
};

// ---

#[tokio::main]
async fn main() -> Result<()> {
    // ---
    dotenv().ok();
    init_tracing();

    let cfg = sitetwin::config::load_from_env()?;
    cfg.log_config();

    let now = Utc::now();
    let mut rng = simulation_rng(cfg.sim_seed);
    let assets = generate_site_data(&mut rng, now);
    let twin = Arc::new(DigitalTwin::new(
        initial_sensors(now),
        rng,
        cfg.spike_probability,
    ));

    let llm: Arc<dyn LlmBackend> = Arc::new(HttpLlmBackend::from_config(&cfg)?);

    let shutdown = CancellationToken::new();
    let simulation = sitetwin::spawn_simulation(twin.clone(), cfg.tick_interval, shutdown.clone());

    let addr = cfg.bind_addr;
    let app = sitetwin::router(AppState {
        twin,
        llm,
        assets: Arc::new(assets),
        config: cfg,
    });

    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await?;

    shutdown.cancel();
    simulation.await?;
    Ok(())
}

// ---

/// Resolve on Ctrl-C or SIGTERM and cancel `token` so the simulation stops
/// alongside the server.
async fn shutdown_signal(token: CancellationToken) {
    // ---
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown requested");
    token.cancel();
}

/// Initialize the global tracing subscriber for structured logging.
///
/// This function configures the [`tracing_subscriber`] with:
/// - Log target, file, and line number output enabled
/// - Color output controlled by TTY detection and `FORCE_COLOR` env var:
///   - `FORCE_COLOR=1|true|yes`: force colors on
///   - `FORCE_COLOR=0|false|no`: force colors off
///   - unset or other values: auto-detect TTY
/// - Span event emission mode controlled by the `SITETWIN_SPAN_EVENTS` env var:
///   - `"full"`       : emit ENTER, EXIT, and CLOSE events with timing
///   - `"enter_exit"` : emit ENTER and EXIT only
///   - unset or other values: emit CLOSE events only (default)
/// - Log level controlled by the `SITETWIN_LOG_LEVEL` env var
///
/// This should be called once at application startup before any logging
/// or tracing macros are invoked.
fn init_tracing() {
    // ---
    let span_events = match env::var("SITETWIN_SPAN_EVENTS").as_deref() {
        Ok("full") => FmtSpan::FULL,
        Ok("enter_exit") => FmtSpan::ENTER | FmtSpan::EXIT,
        _ => FmtSpan::CLOSE,
    };

    let use_color = match env::var("FORCE_COLOR").as_deref() {
        Ok("1") | Ok("true") | Ok("yes") => true,
        Ok("0") | Ok("false") | Ok("no") => false,
        _ => std::io::stdout().is_terminal(),
    };

    // Use RUST_LOG if available, otherwise fall back to SITETWIN_LOG_LEVEL
    let env_filter = if env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match env::var("SITETWIN_LOG_LEVEL").ok().as_deref() {
            Some("trace") => "trace",
            Some("debug") => "debug",
            Some("info") => "info",
            Some("warn") => "warn",
            Some("error") => "error",
            _ => "debug",
        };
        EnvFilter::new(format!("{level},hyper=info,reqwest=info"))
    };

    tracing_subscriber::fmt()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(span_events)
        .with_env_filter(env_filter)
        .with_ansi(use_color)
        .compact()
        .init();
}
