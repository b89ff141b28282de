//! Application assembly.
//!
//! Wires the Stripe processor, the billing routes and the tower-http stack
//! into a single router, and runs it until a shutdown signal arrives.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::Request;
use axum::Router;
use thiserror::Error;
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::adapters::http::middleware::REQUEST_ID_HEADER;
use crate::adapters::http::{billing_router, health_routes, BillingAppState};
use crate::adapters::stripe::{StripeConfig, StripeProcessor};
use crate::config::{AppConfig, ConfigError, ValidationError};

/// Errors that stop the service from starting or serving.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] ValidationError),

    #[error("Server I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Build application state backed by the real Stripe API.
pub fn stripe_state(config: &AppConfig) -> BillingAppState {
    let mut stripe = StripeConfig::new(config.payment.stripe_api_key.clone());
    if let Some(base_url) = &config.payment.stripe_api_base_url {
        stripe = stripe.with_base_url(base_url.clone());
    }

    BillingAppState::new(
        Arc::new(StripeProcessor::new(stripe)),
        config.payment.webhook_secret(),
    )
    .with_token_ttl(config.server.token_ttl())
}

/// Build the full router with tracing, request ids and timeouts.
pub fn build_router(state: BillingAppState, request_timeout: Duration) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-");
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id,
                )
            }),
        )
        .layer(TimeoutLayer::new(request_timeout))
        .layer(PropagateRequestIdLayer::x_request_id());

    billing_router()
        .merge(health_routes())
        .with_state(state)
        .layer(middleware)
}

/// Bind and serve until SIGINT or SIGTERM.
pub async fn serve(config: AppConfig) -> Result<(), ServeError> {
    config.validate()?;

    let addr = config.server.socket_addr()?;
    let state = stripe_state(&config);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = config.server.environment.as_str(),
        stripe_test_mode = config.payment.is_test_mode(),
        token_ttl_secs = config.server.token_ttl_secs,
        request_timeout_secs = config.server.request_timeout_secs,
        "Starting payment service"
    );

    let app = build_router(state, config.server.request_timeout());
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(%addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let signal = tokio::select! {
        _ = ctrl_c => "SIGINT",
        _ = terminate => "SIGTERM",
    };

    tracing::info!(signal, "Shutdown signal received, draining connections");
}
