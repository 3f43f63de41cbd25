//! HTTP Server configuration and startup.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use payments_types::{PaymentGateway, PaymentLookup, StoreGateway, TransactionLedger};

use super::handlers::{self, AppState};
use crate::{PaymentService, ReconciliationService};

/// HTTP Server for the Payments API.
pub struct HttpServer<S, P>
where
    S: StoreGateway + TransactionLedger,
    P: PaymentGateway + PaymentLookup,
{
    state: Arc<AppState<S, P>>,
}

impl<S, P> HttpServer<S, P>
where
    S: StoreGateway + TransactionLedger,
    P: PaymentGateway + PaymentLookup,
{
    /// Creates a new HTTP server over the given services.
    pub fn new(
        payments: PaymentService<S, P>,
        reconciliation: ReconciliationService<S, P>,
    ) -> Self {
        Self {
            state: Arc::new(AppState {
                payments,
                reconciliation,
            }),
        }
    }

    /// Builds the Axum router with all routes.
    pub fn router(&self) -> Router {
        // Uses the globally set MeterProvider; a no-op until one is installed.
        let metrics = axum_otel_metrics::HttpMetricsLayerBuilder::new().build();

        Router::new()
            .route("/", get(handlers::index))
            .route("/payments/credit", post(handlers::credit::<S, P>))
            .route("/payments/debit", post(handlers::debit::<S, P>))
            .route("/payments/{reference}", get(handlers::lookup::<S, P>))
            .route("/api-docs/openapi.json", get(handlers::openapi_json))
            .layer(metrics)
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Runs the server on the given address with graceful shutdown.
    pub async fn run(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Server listening on {}", listener.local_addr()?);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
