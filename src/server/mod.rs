//! Webhook HTTP server
//!
//! `POST /sentry` turns one Sentry webhook into one card delivery.

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use std::sync::Arc;

use crate::card;
use crate::feishu::CardSender;
use crate::sentry;


/// Header naming the Sentry resource that fired the hook
const HOOK_RESOURCE_HEADER: &str = "sentry-hook-resource";

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub sender: Arc<dyn CardSender>,
}

impl AppState {
    pub fn new(sender: Arc<dyn CardSender>) -> Self {
        Self { sender }
    }
}

/// Build the relay router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/sentry", post(handle_webhook))
        .route("/health", get(health))
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl-C
#[cfg(not(tarpaulin_include))]
pub async fn serve(addr: &str, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("failed to listen for shutdown signal: {}", e);
            }
            tracing::info!("shutting down");
        })
        .await
        .context("Server failed")?;

    Ok(())
}

async fn health() -> &'static str {
    "OK"
}

/// Classify, render and deliver one webhook
async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, &'static str) {
    let resource = headers
        .get(HOOK_RESOURCE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");

    let variant = sentry::classify(body);
    tracing::info!(resource, kind = variant.kind(), "received sentry webhook");

    let extracted = sentry::extract(variant, chrono::Utc::now());
    let document = card::render(&extracted);

    match state.sender.send(&document).await {
        Ok(()) => {
            tracing::info!("sent to feishu");
            (StatusCode::OK, "OK")
        }
        Err(e) => {
            tracing::error!("feishu delivery failed: {:#}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error")
        }
    }
}
