//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use payments_types::{
    PaymentError, PaymentGateway, PaymentLookup, PaymentRequest, StatusPolicy, StoreGateway,
    TransactionLedger,
};

use crate::{PaymentService, ReconciliationService};

/// Application state shared across handlers.
pub struct AppState<S, P>
where
    S: StoreGateway + TransactionLedger,
    P: PaymentGateway + PaymentLookup,
{
    pub payments: PaymentService<S, P>,
    pub reconciliation: ReconciliationService<S, P>,
}

impl<S, P> AppState<S, P>
where
    S: StoreGateway + TransactionLedger,
    P: PaymentGateway + PaymentLookup,
{
    fn status_policy(&self) -> StatusPolicy {
        self.payments.settings().status_policy
    }
}

/// A workflow error paired with the status it maps to.
///
/// Callers only ever see the status code: the error detail is logged,
/// never written to the response body.
pub struct ApiError {
    status: StatusCode,
    error: PaymentError,
}

impl ApiError {
    pub fn new(error: PaymentError, policy: StatusPolicy) -> Self {
        let status = StatusCode::from_u16(policy.status_code(&error))
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self { status, error }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = self.status.as_u16(), error = %self.error, "Request failed");
        } else {
            tracing::warn!(status = self.status.as_u16(), error = %self.error, "Request rejected");
        }
        self.status.into_response()
    }
}

/// Service check endpoint.
pub async fn index() -> &'static str {
    "a simple banking app service"
}

/// Credit an account through the provider.
///
/// The body is decoded here rather than through the `Json` extractor so
/// that every decoding failure answers 400.
#[tracing::instrument(skip(state, body))]
pub async fn credit<S, P>(
    State(state): State<Arc<AppState<S, P>>>,
    body: Bytes,
) -> Result<StatusCode, ApiError>
where
    S: StoreGateway + TransactionLedger,
    P: PaymentGateway + PaymentLookup,
{
    let policy = state.status_policy();
    let request = PaymentRequest::from_json(&body).map_err(|e| ApiError::new(e, policy))?;

    state
        .payments
        .credit(request)
        .await
        .map_err(|e| ApiError::new(e, policy))?;
    Ok(StatusCode::OK)
}

/// Debit an account through the provider.
#[tracing::instrument(skip(state, body))]
pub async fn debit<S, P>(
    State(state): State<Arc<AppState<S, P>>>,
    body: Bytes,
) -> Result<StatusCode, ApiError>
where
    S: StoreGateway + TransactionLedger,
    P: PaymentGateway + PaymentLookup,
{
    let policy = state.status_policy();
    let request = PaymentRequest::from_json(&body).map_err(|e| ApiError::new(e, policy))?;

    state
        .payments
        .debit(request)
        .await
        .map_err(|e| ApiError::new(e, policy))?;
    Ok(StatusCode::OK)
}

/// Compare the local ledger and the provider for one reference.
#[tracing::instrument(skip(state))]
pub async fn lookup<S, P>(
    State(state): State<Arc<AppState<S, P>>>,
    Path(reference): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    S: StoreGateway + TransactionLedger,
    P: PaymentGateway + PaymentLookup,
{
    let report = state
        .reconciliation
        .lookup(&reference)
        .await
        .map_err(|e| ApiError::new(e, state.status_policy()))?;
    Ok(Json(report))
}

/// Serve the OpenAPI document.
pub async fn openapi_json() -> impl IntoResponse {
    use utoipa::OpenApi;
    Json(crate::openapi::ApiDoc::openapi())
}
