//! Gateway HTTP server (single port): webhook, health and the widget host page.

use crate::config::Config;
use crate::helpdesk::{ChatwootClient, HelpdeskClient};
use crate::llm::{ModelClient, OpenAiClient};
use crate::relay::{Relay, RelayOutcome, SkipReason};
use crate::widget::render_host_page;
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::Html,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Service name reported by GET /health.
pub const SERVICE_NAME: &str = "Chatwoot AI Bot";

/// Shared state for the gateway: immutable config plus the relay and its clients.
#[derive(Clone)]
pub struct RelayState {
    pub config: Arc<Config>,
    pub relay: Arc<Relay>,
}

impl RelayState {
    pub fn new(
        config: Config,
        model: Arc<dyn ModelClient>,
        helpdesk: Arc<dyn HelpdeskClient>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            relay: Arc::new(Relay::new(model, helpdesk)),
        }
    }

    /// Build the OpenAI and Chatwoot clients from config. Missing credentials only warn; relays will fail until set.
    pub fn from_config(config: Config) -> Result<Self> {
        let timeout = config.http.request_timeout();
        let model = OpenAiClient::new(&config.model, timeout).context("building model client")?;
        if !model.has_api_key() {
            log::warn!("OPENAI_API_KEY not set; model calls will fail");
        }
        let helpdesk =
            ChatwootClient::new(&config.helpdesk, timeout).context("building helpdesk client")?;
        if !helpdesk.has_token() {
            log::warn!("CHATWOOT_API_TOKEN not set; replies cannot be posted");
        }
        if !helpdesk.has_account() {
            log::warn!("CHATWOOT_ACCOUNT_ID not set; replies cannot be posted");
        }
        log::info!(
            "model {} (temperature {}), helpdesk {}",
            model.model(),
            config.model.temperature,
            config.helpdesk.base_url
        );
        Ok(Self::new(config, Arc::new(model), Arc::new(helpdesk)))
    }
}

/// Routes: POST /webhook, GET /health, GET / (host page). CORS is permissive.
pub fn router(state: RelayState) -> Router {
    Router::new()
        .route("/", get(host_page))
        .route("/health", get(health_http))
        .route("/webhook", post(webhook))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve on an already bound listener until `shutdown` completes.
pub async fn serve<F>(listener: tokio::net::TcpListener, state: RelayState, shutdown: F) -> Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .context("gateway server exited")
}

/// Run the gateway server; binds to config.gateway.bind:config.gateway.port.
/// Blocks until shutdown (e.g. Ctrl+C).
pub async fn run_gateway(config: Config) -> Result<()> {
    let bind_addr = format!("{}:{}", config.gateway.bind.trim(), config.gateway.port);
    let state = RelayState::from_config(config)?;
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("gateway listening on {}", bind_addr);
    log::info!("webhook endpoint: http://{}/webhook", bind_addr);
    log::info!("health check: http://{}/health", bind_addr);

    serve(listener, state, shutdown_signal()).await?;
    log::info!("gateway stopped");
    Ok(())
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::warn!("failed to listen for Ctrl+C: {}", e);
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
                log::warn!("failed to install SIGTERM handler: {}", e);
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
    log::info!("shutdown signal received, draining connections");
}

fn log_outcome(delivery: &uuid::Uuid, outcome: &RelayOutcome) {
    match outcome {
        RelayOutcome::Relayed {
            conversation_id,
            message_id: Some(message_id),
        } => log::info!(
            "webhook {}: replied to conversation {} (message {})",
            delivery,
            conversation_id,
            message_id
        ),
        RelayOutcome::Relayed {
            conversation_id,
            message_id: None,
        } => log::info!(
            "webhook {}: replied to conversation {}",
            delivery,
            conversation_id
        ),
        RelayOutcome::Skipped(reason @ (SkipReason::Unrecognized | SkipReason::OtherEvent(_))) => {
            log::debug!("webhook {}: ignored: {}", delivery, reason)
        }
        RelayOutcome::Skipped(reason) => log::info!("webhook {}: filtered: {}", delivery, reason),
        RelayOutcome::Failed { stage, cause } => {
            log::error!("webhook {}: {} call failed: {}", delivery, stage, cause)
        }
    }
}

/// POST /webhook — always acknowledges with 200 once the relay has finished, whatever the outcome.
/// 500 only if the relay task itself dies.
async fn webhook(
    State(state): State<RelayState>,
    body: Bytes,
) -> (StatusCode, Json<serde_json::Value>) {
    let delivery = uuid::Uuid::new_v4();
    log::debug!("webhook {}: received {} bytes", delivery, body.len());
    let relay = state.relay.clone();
    let task = tokio::spawn(async move { relay.handle_payload(&body).await });
    match task.await {
        Ok(outcome) => {
            log_outcome(&delivery, &outcome);
            (StatusCode::OK, Json(json!({ "status": "success" })))
        }
        Err(e) => {
            log::error!("webhook {}: handler failed: {}", delivery, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal server error" })),
            )
        }
    }
}

/// GET /health returns a simple health JSON (for probes).
async fn health_http() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "service": SERVICE_NAME,
    }))
}

/// GET / serves the landing page with the chat widget loader.
async fn host_page(State(state): State<RelayState>) -> Html<String> {
    Html(render_host_page(&state.config.widget))
}
